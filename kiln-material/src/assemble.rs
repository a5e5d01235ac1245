use crate::buffer::BufferHandle;
use crate::error::MaterialError;
use crate::material::Material;
use kiln_common::{ResourceKey, ShaderStage};
use kiln_reflect::schema::{BufferSchema, ShaderSchema};
use kiln_reflect::Shader;
use serde_json::Value;
use std::sync::Arc;

/// Resolves shader stage references during assembly.
pub trait ShaderResolver {
    fn resolve(&self, key: &ResourceKey) -> Result<Arc<Shader>, MaterialError>;
}

/// Owns buffer storage keyed by hierarchical resource key. Implementations
/// must serialize concurrent `get_or_create` calls for the same key.
pub trait BufferRegistry {
    fn get_or_create(
        &self,
        key: &ResourceKey,
        schema: &BufferSchema,
    ) -> Result<BufferHandle, MaterialError>;
}

/// Resolves authored texture references to cache keys. `None` is a silent
/// skip, not an error: authored documents may mention textures a shader
/// does not reference yet.
pub trait TextureResolver {
    fn resolve(&self, reference: &str) -> Option<ResourceKey>;
}

/// Assembles one material from its authored document.
///
/// Stages are resolved and reconciled in authored order, every reconciled
/// buffer is marshaled against the full document, then authored texture
/// references are bound by name. Any failure aborts the whole assembly.
pub fn assemble_material(
    key: &ResourceKey,
    doc: &Value,
    shaders: &dyn ShaderResolver,
    buffers: &dyn BufferRegistry,
    textures: &dyn TextureResolver,
) -> Result<Material, MaterialError> {
    let Value::Object(doc) = doc else {
        return Err(MaterialError::NotAnObject);
    };

    let mut material = Material::new(key.clone());

    // Stage resolution, in authored order.
    let mut resolved = Vec::new();
    for (doc_key, value) in doc {
        let Some(stage) = ShaderStage::from_name(doc_key) else {
            continue;
        };
        let Some(reference) = value.as_str() else {
            return Err(MaterialError::MalformedDocument {
                field: doc_key.clone(),
            });
        };
        let shader_key = ResourceKey::from(stage.name()).join(reference);
        let shader = shaders.resolve(&shader_key)?;
        material.set_shader(stage, shader_key);
        resolved.push((stage, shader));
    }

    // Reconcile each stage's declared buffers into the material's buffer
    // set. Strictly sequential: later stages are checked against buffers
    // registered by earlier ones.
    for (stage, shader) in &resolved {
        merge_stage_schema(&mut material, *stage, &shader.schema, buffers)?;
    }

    // Marshal the authored document into every attached buffer. A buffer
    // only picks up keys naming its own members; a member name shared
    // between buffers receives the same value in each.
    for handle in material.buffers().values() {
        handle.write().apply_values(doc)?;
    }

    if let Some(Value::Object(entries)) = doc.get("textures") {
        for (name, reference) in entries {
            // Names no referenced shader declares are skipped, as are
            // references the resolver cannot satisfy.
            let Some(binding) = material.texture_binding_point(name) else {
                log::debug!("material {key}: no texture slot named {name}");
                continue;
            };
            let Some(reference) = reference.as_str() else {
                continue;
            };
            if let Some(texture_key) = textures.resolve(reference) {
                material.set_texture(binding, texture_key);
            }
        }
    }
    // A `cubemaps` section is accepted but not yet processed.

    Ok(material)
}

fn merge_stage_schema(
    material: &mut Material,
    stage: ShaderStage,
    schema: &ShaderSchema,
    registry: &dyn BufferRegistry,
) -> Result<(), MaterialError> {
    for buffer_schema in &schema.buffers {
        let existing = material.buffer(buffer_schema.binding).cloned();
        match existing {
            None => {
                let buffer_key = material.key().join(&buffer_schema.name);
                let handle = registry.get_or_create(&buffer_key, buffer_schema)?;
                handle.write().mark_stage(stage.mask());
                material.set_buffer(buffer_schema.binding, handle);
            }
            Some(handle) => {
                if !handle.write().merge(buffer_schema, stage.mask()) {
                    return Err(MaterialError::SchemaConflict {
                        material: material.key().clone(),
                        binding: buffer_schema.binding,
                    });
                }
            }
        }
    }

    for texture in &schema.textures {
        material.add_texture_binding(&texture.name, texture.binding);
    }

    Ok(())
}
