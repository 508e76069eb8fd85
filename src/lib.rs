//! Scene editing engine for stage-plan layouts.
//!
//! Users place library objects, connectors, text labels, and freehand strokes
//! on a pan/zoom canvas, then move, resize, rotate, and group-scale them with
//! bounded undo/redo. The engine owns all document and interaction state; the
//! host only forwards raw input events, paints what the [`render::Renderer`]
//! is told, and persists documents through [`persist::Persistence`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EditorSession`] aggregate and the input state machine driver |
//! | [`doc`] | Element types, the scene document, id generation, property patches |
//! | [`camera`] | Pan/zoom camera and screen/logical conversions |
//! | [`geom`] | Axis-aligned bounds |
//! | [`selection`] | Selection set, group bounds, marquee hit-testing |
//! | [`hit`] | Handle and body hit-testing |
//! | [`transform`] | Drag, snap, resize, rotate, font resize, group scale |
//! | [`history`] | Bounded snapshot undo/redo |
//! | [`input`] | Tools, modifiers, keys, and the gesture state record |
//! | [`render`] | Renderer interface, overlays, render queue |
//! | [`persist`] | Async persistence interface with memory and file stores |
//! | [`script`] | Serializable input scripts and replay |
//! | [`config`] | Environment-driven session settings |
//! | [`error`] | Error code trait |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod geom;
pub mod history;
pub mod hit;
pub mod input;
pub mod persist;
pub mod render;
pub mod script;
pub mod selection;
pub mod transform;
