use crate::cache::ResourceCache;
use crate::error::CacheError;
use crate::registry::BufferStore;
use kiln_common::ResourceKey;
use kiln_material::{
    BufferHandle, BufferRegistry, MaterialError, MaterialRecord, ShaderResolver, TextureResolver,
};
use kiln_reflect::schema::BufferSchema;
use kiln_reflect::Shader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The bake-wide collaborator hub: per-type caches rooted at the output
/// directory, implementing the resolver and registry seams material
/// assembly runs against.
pub struct Context {
    root: PathBuf,
    shaders: ResourceCache<Shader>,
    materials: ResourceCache<MaterialRecord>,
    buffers: BufferStore,
}

impl Context {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| CacheError::Io(root.clone(), e))?;
        // Each resource type persists under its own subdirectory so a
        // material record never collides with the directory its buffers
        // live in.
        Ok(Context {
            shaders: ResourceCache::new(root.join("shaders")),
            materials: ResourceCache::new(root.join("materials")),
            buffers: BufferStore::new(root.join("buffers")),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shaders(&self) -> &ResourceCache<Shader> {
        &self.shaders
    }

    pub fn materials(&self) -> &ResourceCache<MaterialRecord> {
        &self.materials
    }

    pub fn buffers(&self) -> &BufferStore {
        &self.buffers
    }
}

impl ShaderResolver for Context {
    fn resolve(&self, key: &ResourceKey) -> Result<Arc<Shader>, MaterialError> {
        self.shaders
            .get(key)
            .map_err(|_| MaterialError::UnresolvedShader(key.clone()))
    }
}

impl BufferRegistry for Context {
    fn get_or_create(
        &self,
        key: &ResourceKey,
        schema: &BufferSchema,
    ) -> Result<BufferHandle, MaterialError> {
        Ok(self.buffers.get_or_create(key, schema))
    }
}

impl TextureResolver for Context {
    // Texture references are forward references: textures are baked by a
    // separate pipeline, so the reference maps straight to its cache key.
    fn resolve(&self, reference: &str) -> Option<ResourceKey> {
        Some(ResourceKey::from(reference))
    }
}
