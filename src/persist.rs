//! Persistence interface for designs, templates, and the object library.
//!
//! DESIGN
//! ======
//! The editing engine never awaits persistence. A host loads a document, hands
//! it to the session, and later saves `EditorSession::document()` back; the
//! in-memory scene stays editable while a call is outstanding. Two stores
//! implement [`Persistence`]: [`MemoryStore`] for tests and embedding, and
//! [`FileStore`], which keeps one JSON file per record under a directory.
//!
//! ERROR HANDLING
//! ==============
//! Failures are reported as [`PersistError`]. Only I/O failures are marked
//! retryable; missing records, rejected input, and undecodable files are not.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::doc::SceneData;
use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

/// Numeric id of a stored design, template, or library item.
pub type RecordId = i64;

/// Which collection a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Design,
    Template,
    LibraryItem,
}

impl RecordKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Design => "design",
            Self::Template => "template",
            Self::LibraryItem => "library item",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: RecordId },
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored record is malformed: {0}")]
    Codec(#[from] serde_json::Error),
}

impl ErrorCode for PersistError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Rejected(_) => "E_REJECTED",
            Self::Io(_) => "E_STORAGE_IO",
            Self::Codec(_) => "E_STORAGE_CODEC",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// A named scene document, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDesign {
    pub id: RecordId,
    pub name: String,
    pub elements: SceneData,
}

/// Listing entry for a stored design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSummary {
    pub id: RecordId,
    pub name: String,
    pub element_count: usize,
    pub has_thumbnail: bool,
}

/// An image the user can drop onto the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    /// Reference placed objects carry as their image.
    pub image_ref: String,
    pub default_width: f64,
    pub default_height: f64,
}

/// Upload request for a new library item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLibraryItem {
    pub name: String,
    pub category: String,
    pub image: Vec<u8>,
    pub default_width: f64,
    pub default_height: f64,
}

/// Image reference for a library item id.
#[must_use]
pub fn library_image_ref(id: RecordId) -> String {
    format!("library://{id}")
}

fn validate_name(name: &str) -> Result<String, PersistError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PersistError::Rejected("name must not be empty".into()));
    }
    Ok(trimmed.to_owned())
}

fn validate_upload(item: &NewLibraryItem) -> Result<(), PersistError> {
    validate_name(&item.name)?;
    if item.image.is_empty() {
        return Err(PersistError::Rejected("image must not be empty".into()));
    }
    let dims_ok = |v: f64| v.is_finite() && v > 0.0;
    if !dims_ok(item.default_width) || !dims_ok(item.default_height) {
        return Err(PersistError::Rejected("default size must be positive".into()));
    }
    Ok(())
}

/// Backend for designs, templates, and the object library.
#[async_trait::async_trait]
pub trait Persistence: Send + Sync {
    /// Load a stored design.
    ///
    /// # Errors
    ///
    /// [`PersistError::NotFound`] when no design has this id.
    async fn load_document(&self, id: RecordId) -> Result<StoredDesign, PersistError>;

    /// Create (`id == None`) or overwrite a design. Returns its id.
    ///
    /// # Errors
    ///
    /// [`PersistError::Rejected`] for an empty name, [`PersistError::NotFound`]
    /// when overwriting an id that does not exist.
    async fn save_document(
        &self,
        id: Option<RecordId>,
        name: &str,
        elements: &SceneData,
        thumbnail: Option<&[u8]>,
    ) -> Result<RecordId, PersistError>;

    /// List stored designs, ordered by id.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    async fn list_documents(&self) -> Result<Vec<DesignSummary>, PersistError>;

    /// Load a stored template.
    ///
    /// # Errors
    ///
    /// [`PersistError::NotFound`] when no template has this id.
    async fn load_template(&self, id: RecordId) -> Result<StoredDesign, PersistError>;

    /// Create or overwrite a template. Returns its id.
    ///
    /// # Errors
    ///
    /// Same as [`Persistence::save_document`].
    async fn save_template(
        &self,
        id: Option<RecordId>,
        name: &str,
        elements: &SceneData,
    ) -> Result<RecordId, PersistError>;

    /// Every library item, ordered by id.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    async fn list_library_items(&self) -> Result<Vec<LibraryItem>, PersistError>;

    /// Delete a library item and its image.
    ///
    /// # Errors
    ///
    /// [`PersistError::NotFound`] when no item has this id.
    async fn delete_library_item(&self, id: RecordId) -> Result<(), PersistError>;

    /// Store a new library item, assigning the next id.
    ///
    /// # Errors
    ///
    /// [`PersistError::Rejected`] for an empty name or image, or a
    /// non-positive default size.
    async fn upload_library_item(&self, item: NewLibraryItem) -> Result<LibraryItem, PersistError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Default)]
struct MemoryInner {
    designs: BTreeMap<RecordId, (StoredDesign, Option<Vec<u8>>)>,
    templates: BTreeMap<RecordId, StoredDesign>,
    library: BTreeMap<RecordId, (LibraryItem, Vec<u8>)>,
    /// Lowest library id never handed out; deleted ids are not reissued.
    next_library_id: RecordId,
}

fn next_key<V>(map: &BTreeMap<RecordId, V>) -> RecordId {
    map.keys().next_back().map_or(1, |max| max + 1)
}

/// Volatile store backed by maps behind an async lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored for a library item's image.
    pub async fn library_image(&self, id: RecordId) -> Option<Vec<u8>> {
        self.inner.read().await.library.get(&id).map(|(_, bytes)| bytes.clone())
    }

    /// Thumbnail stored with a design.
    pub async fn thumbnail(&self, id: RecordId) -> Option<Vec<u8>> {
        self.inner.read().await.designs.get(&id).and_then(|(_, thumb)| thumb.clone())
    }
}

#[async_trait::async_trait]
impl Persistence for MemoryStore {
    async fn load_document(&self, id: RecordId) -> Result<StoredDesign, PersistError> {
        let inner = self.inner.read().await;
        inner
            .designs
            .get(&id)
            .map(|(design, _)| design.clone())
            .ok_or(PersistError::NotFound { kind: RecordKind::Design, id })
    }

    async fn save_document(
        &self,
        id: Option<RecordId>,
        name: &str,
        elements: &SceneData,
        thumbnail: Option<&[u8]>,
    ) -> Result<RecordId, PersistError> {
        let name = validate_name(name)?;
        let mut inner = self.inner.write().await;
        let id = match id {
            Some(id) if inner.designs.contains_key(&id) => id,
            Some(id) => return Err(PersistError::NotFound { kind: RecordKind::Design, id }),
            None => next_key(&inner.designs),
        };
        let design = StoredDesign { id, name, elements: elements.clone() };
        inner.designs.insert(id, (design, thumbnail.map(<[u8]>::to_vec)));
        debug!(id, elements = elements.len(), "design saved to memory");
        Ok(id)
    }

    async fn list_documents(&self) -> Result<Vec<DesignSummary>, PersistError> {
        let inner = self.inner.read().await;
        Ok(inner
            .designs
            .values()
            .map(|(design, thumb)| DesignSummary {
                id: design.id,
                name: design.name.clone(),
                element_count: design.elements.len(),
                has_thumbnail: thumb.is_some(),
            })
            .collect())
    }

    async fn load_template(&self, id: RecordId) -> Result<StoredDesign, PersistError> {
        let inner = self.inner.read().await;
        inner
            .templates
            .get(&id)
            .cloned()
            .ok_or(PersistError::NotFound { kind: RecordKind::Template, id })
    }

    async fn save_template(
        &self,
        id: Option<RecordId>,
        name: &str,
        elements: &SceneData,
    ) -> Result<RecordId, PersistError> {
        let name = validate_name(name)?;
        let mut inner = self.inner.write().await;
        let id = match id {
            Some(id) if inner.templates.contains_key(&id) => id,
            Some(id) => return Err(PersistError::NotFound { kind: RecordKind::Template, id }),
            None => next_key(&inner.templates),
        };
        inner.templates.insert(id, StoredDesign { id, name, elements: elements.clone() });
        Ok(id)
    }

    async fn list_library_items(&self) -> Result<Vec<LibraryItem>, PersistError> {
        let inner = self.inner.read().await;
        Ok(inner.library.values().map(|(item, _)| item.clone()).collect())
    }

    async fn delete_library_item(&self, id: RecordId) -> Result<(), PersistError> {
        let mut inner = self.inner.write().await;
        match inner.library.remove(&id) {
            Some(_) => Ok(()),
            None => Err(PersistError::NotFound { kind: RecordKind::LibraryItem, id }),
        }
    }

    async fn upload_library_item(&self, item: NewLibraryItem) -> Result<LibraryItem, PersistError> {
        validate_upload(&item)?;
        let mut inner = self.inner.write().await;
        let id = next_key(&inner.library).max(inner.next_library_id);
        inner.next_library_id = id + 1;
        let stored = LibraryItem {
            id,
            name: item.name.trim().to_owned(),
            category: item.category,
            image_ref: library_image_ref(id),
            default_width: item.default_width,
            default_height: item.default_height,
        };
        inner.library.insert(id, (stored.clone(), item.image));
        Ok(stored)
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Store that keeps JSON records under a root directory:
///
/// ```text
/// <root>/designs/<id>.json     StoredDesign
/// <root>/designs/<id>.thumb    optional thumbnail bytes
/// <root>/templates/<id>.json   StoredDesign
/// <root>/library/<id>.json     LibraryItem
/// <root>/library/<id>.img      image bytes
/// <root>/library/next_id       library id high-water mark
/// ```
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    /// Serializes id allocation and writes.
    write_lock: Mutex<()>,
}

const DESIGNS_DIR: &str = "designs";
const TEMPLATES_DIR: &str = "templates";
const LIBRARY_DIR: &str = "library";
const LIBRARY_NEXT_ID: &str = "next_id";

async fn read_json<T: DeserializeOwned>(path: &Path, kind: RecordKind, id: RecordId) -> Result<T, PersistError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PersistError::NotFound { kind, id }),
        Err(e) => Err(PersistError::Io(e)),
    }
}

/// Write via a temporary sibling and rename so readers never see a partial file.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &bytes).await
}

/// Ids of every `<id>.json` record in `dir`, ascending. A missing directory is empty.
async fn record_ids(dir: &Path) -> Result<Vec<RecordId>, PersistError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PersistError::Io(e)),
    };
    let mut ids = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Ok(id) = stem.parse::<RecordId>() {
            ids.push(id);
        }
    }
    ids.sort_unstable();
    Ok(ids)
}

async fn remove_if_present(path: &Path) -> Result<(), PersistError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PersistError::Io(e)),
    }
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// [`PersistError::Io`] when the directories cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let root = root.into();
        for dir in [DESIGNS_DIR, TEMPLATES_DIR, LIBRARY_DIR] {
            tokio::fs::create_dir_all(root.join(dir)).await?;
        }
        info!(root = %root.display(), "file store opened");
        Ok(Self { root, write_lock: Mutex::new(()) })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, dir: &str, id: RecordId, ext: &str) -> PathBuf {
        self.root.join(dir).join(format!("{id}.{ext}"))
    }

    async fn next_id(&self, dir: &str) -> Result<RecordId, PersistError> {
        let ids = record_ids(&self.root.join(dir)).await?;
        Ok(ids.last().map_or(1, |max| max + 1))
    }

    /// Next library id. Ids of deleted items stay retired because the
    /// high-water mark is persisted alongside the records.
    async fn next_library_id(&self) -> Result<RecordId, PersistError> {
        let mark_path = self.root.join(LIBRARY_DIR).join(LIBRARY_NEXT_ID);
        let mark = match tokio::fs::read_to_string(&mark_path).await {
            Ok(raw) => raw.trim().parse::<RecordId>().map_err(|e| {
                PersistError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(PersistError::Io(e)),
        };
        let id = self.next_id(LIBRARY_DIR).await?.max(mark);
        write_atomic(&mark_path, (id + 1).to_string().as_bytes()).await?;
        Ok(id)
    }

    async fn resolve_id(&self, dir: &str, kind: RecordKind, id: Option<RecordId>) -> Result<RecordId, PersistError> {
        match id {
            Some(id) => {
                if tokio::fs::try_exists(self.record_path(dir, id, "json")).await? {
                    Ok(id)
                } else {
                    Err(PersistError::NotFound { kind, id })
                }
            }
            None => self.next_id(dir).await,
        }
    }

    /// Bytes stored for a library item's image.
    ///
    /// # Errors
    ///
    /// [`PersistError::NotFound`] when the item has no stored image.
    pub async fn library_image(&self, id: RecordId) -> Result<Vec<u8>, PersistError> {
        match tokio::fs::read(self.record_path(LIBRARY_DIR, id, "img")).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PersistError::NotFound { kind: RecordKind::LibraryItem, id })
            }
            Err(e) => Err(PersistError::Io(e)),
        }
    }
}

#[async_trait::async_trait]
impl Persistence for FileStore {
    async fn load_document(&self, id: RecordId) -> Result<StoredDesign, PersistError> {
        let design: StoredDesign = read_json(&self.record_path(DESIGNS_DIR, id, "json"), RecordKind::Design, id).await?;
        debug!(id, elements = design.elements.len(), "design loaded from disk");
        Ok(design)
    }

    async fn save_document(
        &self,
        id: Option<RecordId>,
        name: &str,
        elements: &SceneData,
        thumbnail: Option<&[u8]>,
    ) -> Result<RecordId, PersistError> {
        let name = validate_name(name)?;
        let _guard = self.write_lock.lock().await;
        let id = self.resolve_id(DESIGNS_DIR, RecordKind::Design, id).await?;
        let design = StoredDesign { id, name, elements: elements.clone() };
        write_json(&self.record_path(DESIGNS_DIR, id, "json"), &design).await?;
        let thumb_path = self.record_path(DESIGNS_DIR, id, "thumb");
        match thumbnail {
            Some(bytes) => write_atomic(&thumb_path, bytes).await?,
            None => remove_if_present(&thumb_path).await?,
        }
        info!(id, elements = elements.len(), "design saved to disk");
        Ok(id)
    }

    async fn list_documents(&self) -> Result<Vec<DesignSummary>, PersistError> {
        let mut out = Vec::new();
        for id in record_ids(&self.root.join(DESIGNS_DIR)).await? {
            let design: StoredDesign =
                read_json(&self.record_path(DESIGNS_DIR, id, "json"), RecordKind::Design, id).await?;
            let has_thumbnail = tokio::fs::try_exists(self.record_path(DESIGNS_DIR, id, "thumb")).await?;
            out.push(DesignSummary {
                id,
                name: design.name,
                element_count: design.elements.len(),
                has_thumbnail,
            });
        }
        Ok(out)
    }

    async fn load_template(&self, id: RecordId) -> Result<StoredDesign, PersistError> {
        read_json(&self.record_path(TEMPLATES_DIR, id, "json"), RecordKind::Template, id).await
    }

    async fn save_template(
        &self,
        id: Option<RecordId>,
        name: &str,
        elements: &SceneData,
    ) -> Result<RecordId, PersistError> {
        let name = validate_name(name)?;
        let _guard = self.write_lock.lock().await;
        let id = self.resolve_id(TEMPLATES_DIR, RecordKind::Template, id).await?;
        write_json(&self.record_path(TEMPLATES_DIR, id, "json"), &StoredDesign { id, name, elements: elements.clone() })
            .await?;
        info!(id, "template saved to disk");
        Ok(id)
    }

    async fn list_library_items(&self) -> Result<Vec<LibraryItem>, PersistError> {
        let mut out = Vec::new();
        for id in record_ids(&self.root.join(LIBRARY_DIR)).await? {
            out.push(read_json(&self.record_path(LIBRARY_DIR, id, "json"), RecordKind::LibraryItem, id).await?);
        }
        Ok(out)
    }

    async fn delete_library_item(&self, id: RecordId) -> Result<(), PersistError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(self.record_path(LIBRARY_DIR, id, "json")).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistError::NotFound { kind: RecordKind::LibraryItem, id });
            }
            Err(e) => return Err(PersistError::Io(e)),
        }
        remove_if_present(&self.record_path(LIBRARY_DIR, id, "img")).await?;
        info!(id, "library item deleted");
        Ok(())
    }

    async fn upload_library_item(&self, item: NewLibraryItem) -> Result<LibraryItem, PersistError> {
        validate_upload(&item)?;
        let _guard = self.write_lock.lock().await;
        let id = self.next_library_id().await?;
        let stored = LibraryItem {
            id,
            name: item.name.trim().to_owned(),
            category: item.category,
            image_ref: library_image_ref(id),
            default_width: item.default_width,
            default_height: item.default_height,
        };
        write_atomic(&self.record_path(LIBRARY_DIR, id, "img"), &item.image).await?;
        write_json(&self.record_path(LIBRARY_DIR, id, "json"), &stored).await?;
        info!(id, name = %stored.name, bytes = item.image.len(), "library item uploaded");
        Ok(stored)
    }
}
