use crate::error::CacheError;
use kiln_common::ResourceKey;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// A typed registry over one persisted record per resource key.
///
/// Lookups hit memory first and fall back to the on-disk record, so a
/// material bake can resolve shaders baked by an earlier invocation.
pub struct ResourceCache<T> {
    root: PathBuf,
    entries: RwLock<FxHashMap<ResourceKey, Arc<T>>>,
}

impl<T> ResourceCache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(root: PathBuf) -> Self {
        ResourceCache {
            root,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    fn path_for(&self, key: &ResourceKey) -> PathBuf {
        // Key segments become directory segments under the cache root.
        self.root.join(key.as_str())
    }

    pub fn get(&self, key: &ResourceKey) -> Result<Arc<T>, CacheError> {
        if let Some(hit) = self.entries.read().get(key) {
            return Ok(Arc::clone(hit));
        }

        let path = self.path_for(key);
        let bytes = fs::read(&path).map_err(|_| CacheError::NotFound(key.clone()))?;
        log::debug!("loaded {key} from {}", path.display());
        let value = Arc::new(rmp_serde::from_slice::<T>(&bytes)?);
        self.entries
            .write()
            .insert(key.clone(), Arc::clone(&value));
        Ok(value)
    }

    /// Registers and persists a record. With `overwrite` unset an existing
    /// entry survives and is returned instead.
    pub fn insert(
        &self,
        key: &ResourceKey,
        value: Arc<T>,
        overwrite: bool,
    ) -> Result<Arc<T>, CacheError> {
        let mut entries = self.entries.write();
        if !overwrite {
            if let Some(existing) = entries.get(key) {
                return Ok(Arc::clone(existing));
            }
        }

        let bytes = rmp_serde::to_vec(&*value)?;
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::Io(parent.to_path_buf(), e))?;
        }
        fs::write(&path, &bytes).map_err(|e| CacheError::Io(path.clone(), e))?;

        entries.insert(key.clone(), Arc::clone(&value));
        Ok(value)
    }
}
