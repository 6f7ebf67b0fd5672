/*!
 * In-memory audio handles.
 *
 * An uploaded audio file lives in memory for the lifetime of one preview
 * session. `BlobStore` hands out `AudioHandle`s with a `blob:` id and tracks
 * which ids are still live; a handle revokes its id when released or dropped,
 * so every exit path frees it.
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};

use bytes::Bytes;
use log::debug;
use uuid::Uuid;

use crate::errors::{AppError, MediaError};
use crate::file_utils::{FileInfo, FileManager};

type Registry = RefCell<HashMap<String, usize>>;

/// Describe a file selected for upload, accepting only audio.
///
/// A file is audio when its type starts with `audio`.
pub fn inspect_audio<P: AsRef<Path>>(path: P) -> Result<FileInfo, AppError> {
    let path = path.as_ref();
    if !FileManager::file_exists(path) {
        return Err(MediaError::NotFound(path.display().to_string()).into());
    }

    let info = FileManager::describe(path)?;
    if !info.is_audio() {
        return Err(MediaError::UnsupportedType {
            mime: info.mime_type.unwrap_or_else(|| "unknown".to_string()),
            name: info.name,
        }
        .into());
    }
    Ok(info)
}

/// Registry of live audio handles
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    live: Rc<Registry>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an in-memory payload and return its handle
    pub fn create(&self, data: impl Into<Bytes>, mime_type: &str, name: &str) -> AudioHandle {
        let data = data.into();
        let id = format!("blob:{}", Uuid::new_v4());
        self.live.borrow_mut().insert(id.clone(), data.len());
        debug!("Created audio handle {} for {} ({} bytes)", id, name, data.len());

        AudioHandle {
            id,
            data,
            mime_type: mime_type.to_string(),
            name: name.to_string(),
            store: Rc::downgrade(&self.live),
            released: false,
        }
    }

    /// Validate an audio upload on disk and load it into a handle
    pub fn open_audio<P: AsRef<Path>>(&self, path: P) -> Result<AudioHandle, AppError> {
        let path = path.as_ref();
        let info = inspect_audio(path)?;
        let data = FileManager::read_bytes(path)?;
        let mime = info.mime_type.as_deref().unwrap_or("audio/unknown");
        Ok(self.create(data, mime, &info.name))
    }

    /// Whether the id belongs to a handle that has not been released
    pub fn is_live(&self, id: &str) -> bool {
        self.live.borrow().contains_key(id)
    }

    /// Number of handles not yet released
    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }
}

/// Scoped in-memory audio payload. Released exactly once.
pub struct AudioHandle {
    id: String,
    data: Bytes,
    mime_type: String,
    name: String,
    store: Weak<Registry>,
    released: bool,
}

impl AudioHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shared view of the audio bytes
    pub fn data(&self) -> Bytes {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Revoke the handle now instead of at drop
    pub fn release(mut self) {
        self.revoke();
    }

    fn revoke(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(live) = self.store.upgrade() {
            live.borrow_mut().remove(&self.id);
        }
        debug!("Released audio handle {}", self.id);
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        self.revoke();
    }
}

impl fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}
