use crate::buffer::BufferHandle;
use kiln_common::{ResourceKey, ShaderStage};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A material under assembly: shader stage references, reconciled buffers
/// keyed by binding point, and resolved texture references.
///
/// Constructed empty, populated by [`assemble_material`](crate::assemble_material),
/// then persisted as a [`MaterialRecord`] and discarded.
#[derive(Debug, Default)]
pub struct Material {
    key: ResourceKey,
    shaders: Vec<(ShaderStage, ResourceKey)>,
    buffers: BTreeMap<u32, BufferHandle>,
    textures: BTreeMap<u32, ResourceKey>,
    // name -> binding point, union over all referenced stages
    texture_bindings: FxHashMap<String, u32>,
}

impl Material {
    pub fn new(key: ResourceKey) -> Self {
        Material {
            key,
            ..Default::default()
        }
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn set_shader(&mut self, stage: ShaderStage, key: ResourceKey) {
        self.shaders.push((stage, key));
    }

    pub fn shaders(&self) -> &[(ShaderStage, ResourceKey)] {
        &self.shaders
    }

    pub fn buffer(&self, binding: u32) -> Option<&BufferHandle> {
        self.buffers.get(&binding)
    }

    pub fn set_buffer(&mut self, binding: u32, handle: BufferHandle) {
        self.buffers.insert(binding, handle);
    }

    pub fn buffers(&self) -> &BTreeMap<u32, BufferHandle> {
        &self.buffers
    }

    /// Registers a texture slot declared by a stage's schema. The first
    /// stage to declare a name wins; identical redeclarations across stages
    /// are the normal case.
    pub fn add_texture_binding(&mut self, name: &str, binding: u32) {
        self.texture_bindings
            .entry(name.to_string())
            .or_insert(binding);
    }

    /// Looks up the binding point for a texture name declared by any of the
    /// material's stages.
    pub fn texture_binding_point(&self, name: &str) -> Option<u32> {
        self.texture_bindings.get(name).copied()
    }

    pub fn set_texture(&mut self, binding: u32, key: ResourceKey) {
        self.textures.insert(binding, key);
    }

    pub fn textures(&self) -> &BTreeMap<u32, ResourceKey> {
        &self.textures
    }
}

/// The persisted form of an assembled material: every reference by cache
/// key, nothing by ownership. Field order is stable so re-baking unchanged
/// inputs is bit-identical.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub shaders: BTreeMap<ShaderStage, ResourceKey>,
    pub buffers: BTreeMap<u32, ResourceKey>,
    pub textures: BTreeMap<u32, ResourceKey>,
}

impl From<&Material> for MaterialRecord {
    fn from(material: &Material) -> Self {
        MaterialRecord {
            shaders: material
                .shaders
                .iter()
                .map(|(stage, key)| (*stage, key.clone()))
                .collect(),
            buffers: material
                .buffers
                .iter()
                .map(|(binding, handle)| (*binding, handle.read().key().clone()))
                .collect(),
            textures: material.textures.clone(),
        }
    }
}
