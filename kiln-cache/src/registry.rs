use crate::error::CacheError;
use kiln_common::ResourceKey;
use kiln_material::{Buffer, BufferHandle};
use kiln_reflect::schema::BufferSchema;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Owns every buffer created during a bake run, keyed by hierarchical
/// resource key. The map lock serializes `get_or_create` so at most one
/// writer ever creates a given key.
pub struct BufferStore {
    root: PathBuf,
    entries: RwLock<FxHashMap<ResourceKey, BufferHandle>>,
}

impl BufferStore {
    pub fn new(root: PathBuf) -> Self {
        BufferStore {
            root,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn get_or_create(&self, key: &ResourceKey, schema: &BufferSchema) -> BufferHandle {
        let mut entries = self.entries.write();
        let handle = entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(Buffer::new(key.clone(), schema.clone()))));
        Arc::clone(handle)
    }

    /// Flushes a buffer's record (schema plus bytes) to durable storage.
    pub fn persist(&self, key: &ResourceKey) -> Result<(), CacheError> {
        let handle = {
            let entries = self.entries.read();
            entries
                .get(key)
                .cloned()
                .ok_or_else(|| CacheError::NotFound(key.clone()))?
        };

        let bytes = rmp_serde::to_vec(&*handle.read())?;
        let path = self.root.join(key.as_str());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::Io(parent.to_path_buf(), e))?;
        }
        fs::write(&path, &bytes).map_err(|e| CacheError::Io(path, e))
    }
}
