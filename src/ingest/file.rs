//! Local image files.
//!
//! A loaded file is kept behind a temporary object reference (`ObjectRef`)
//! issued by `ObjectUrls`. References stay live until revoked, so the owner
//! must revoke the previous reference before taking a new one.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};

use crate::frame::Frame;

/// A user-selected file.
#[derive(Clone, Debug)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            bytes,
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read image file {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Decode the file contents into a frame.
    pub fn decode(&self) -> Result<Frame, image::ImageError> {
        let image = image::load_from_memory(&self.bytes)?;
        Ok(Frame::new(image.to_rgba8()))
    }
}

/// Temporary reference to a registered file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectRef(u64);

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:leafscan/{}", self.0)
    }
}

/// Registry of live object references.
#[derive(Default)]
pub struct ObjectUrls {
    next_id: u64,
    live: HashMap<ObjectRef, Entry>,
}

struct Entry {
    name: String,
    frame: Frame,
}

impl ObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decoded file and return its reference.
    pub fn create(&mut self, name: &str, frame: Frame) -> ObjectRef {
        self.next_id += 1;
        let object = ObjectRef(self.next_id);
        self.live.insert(
            object,
            Entry {
                name: name.to_string(),
                frame,
            },
        );
        log::debug!("ObjectUrls: created {} for {}", object, name);
        object
    }

    /// Release a reference. Returns false when it was not live.
    pub fn revoke(&mut self, object: ObjectRef) -> bool {
        match self.live.remove(&object) {
            Some(entry) => {
                log::debug!("ObjectUrls: revoked {} ({})", object, entry.name);
                true
            }
            None => false,
        }
    }

    pub fn resolve(&self, object: ObjectRef) -> Option<&Frame> {
        self.live.get(&object).map(|entry| &entry.frame)
    }

    pub fn name(&self, object: ObjectRef) -> Option<&str> {
        self.live.get(&object).map(|entry| entry.name.as_str())
    }

    /// Number of references not yet revoked.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
