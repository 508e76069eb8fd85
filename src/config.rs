//! Editor configuration read from `STAGEPLAN_*` environment variables.
//!
//! Every variable is optional. Unset variables take the defaults in
//! [`crate::consts`]; set-but-invalid variables are an error rather than being
//! silently ignored, so a typo in a deployment shows up at startup.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use tracing::info;

use crate::consts::{DEFAULT_BRUSH_SIZE, DEFAULT_COLOR, DEFAULT_FONT_SIZE, DEFAULT_HISTORY_CAP, GRID_SIZE};
use crate::doc::clamp_font_size;
use crate::error::ErrorCode;

pub const ENV_HISTORY_CAP: &str = "STAGEPLAN_HISTORY_CAP";
pub const ENV_SNAP_TO_GRID: &str = "STAGEPLAN_SNAP_TO_GRID";
pub const ENV_GRID_SIZE: &str = "STAGEPLAN_GRID_SIZE";
pub const ENV_CLAMP_GROUP_DRAG: &str = "STAGEPLAN_CLAMP_GROUP_DRAG";
pub const ENV_BRUSH_SIZE: &str = "STAGEPLAN_BRUSH_SIZE";
pub const ENV_STROKE_COLOR: &str = "STAGEPLAN_STROKE_COLOR";
pub const ENV_LABEL_FONT_SIZE: &str = "STAGEPLAN_LABEL_FONT_SIZE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

/// Tunables for an editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Maximum stored history snapshots (at least 1).
    pub history_cap: usize,
    /// Initial state of single-drag grid snapping.
    pub snap_to_grid: bool,
    pub grid_size: f64,
    /// Clamp objects and labels to `x, y >= 0` during group drags too.
    pub clamp_group_drag: bool,
    /// Pen width; the brush doubles it.
    pub brush_size: f64,
    /// Color for new strokes, lines, and labels.
    pub stroke_color: String,
    pub label_font_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_cap: DEFAULT_HISTORY_CAP,
            snap_to_grid: false,
            grid_size: GRID_SIZE,
            clamp_group_drag: false,
            brush_size: DEFAULT_BRUSH_SIZE,
            stroke_color: DEFAULT_COLOR.to_owned(),
            label_font_size: DEFAULT_FONT_SIZE,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str, default: T, valid: impl Fn(&T) -> bool) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => Ok(value),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

impl EditorConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first variable that is set but
    /// cannot be parsed or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })?;
        info!(
            history_cap = config.history_cap,
            snap_to_grid = config.snap_to_grid,
            grid_size = config.grid_size,
            clamp_group_drag = config.clamp_group_drag,
            "editor config loaded"
        );
        Ok(config)
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`EditorConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let positive = |v: &f64| v.is_finite() && *v > 0.0;
        Ok(Self {
            history_cap: parse_var(&lookup, ENV_HISTORY_CAP, defaults.history_cap, |v| *v >= 1)?,
            snap_to_grid: parse_flag(&lookup, ENV_SNAP_TO_GRID, defaults.snap_to_grid)?,
            grid_size: parse_var(&lookup, ENV_GRID_SIZE, defaults.grid_size, positive)?,
            clamp_group_drag: parse_flag(&lookup, ENV_CLAMP_GROUP_DRAG, defaults.clamp_group_drag)?,
            brush_size: parse_var(&lookup, ENV_BRUSH_SIZE, defaults.brush_size, positive)?,
            stroke_color: match lookup(ENV_STROKE_COLOR) {
                Some(color) if !color.trim().is_empty() => color.trim().to_owned(),
                Some(color) => return Err(ConfigError::Invalid { key: ENV_STROKE_COLOR, value: color }),
                None => defaults.stroke_color,
            },
            label_font_size: clamp_font_size(parse_var(
                &lookup,
                ENV_LABEL_FONT_SIZE,
                defaults.label_font_size,
                positive,
            )?),
        })
    }
}
