use anyhow::{bail, Context as _};
use kiln_cache::Context;
use kiln_common::{ResourceKey, ShaderStage};
use kiln_material::{assemble_material, MaterialRecord};
use kiln_reflect::{parse_shader_schema, Shader};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn stage_for_extension(ext: &str) -> Option<ShaderStage> {
    match ext {
        "vert_spv" => Some(ShaderStage::Vertex),
        "tesc_spv" => Some(ShaderStage::TessellationControl),
        "tese_spv" => Some(ShaderStage::TessellationEvaluation),
        "geom_spv" => Some(ShaderStage::Geometry),
        "frag_spv" => Some(ShaderStage::Fragment),
        _ => None,
    }
}

/// Bakes one input file, dispatching on its extension. A failure here is
/// fatal to this input only; the driver moves on to the next.
pub fn bake_one(context: &Context, source_root: &Path, input: &Path) -> anyhow::Result<()> {
    let absolute = input
        .canonicalize()
        .with_context(|| format!("reading {}", input.display()))?;
    let Ok(relative) = absolute.strip_prefix(source_root) else {
        bail!(
            "input is not contained in the source root {}",
            source_root.display()
        );
    };

    let key = ResourceKey::from_relative_path(relative);
    let extension = relative
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(stage) = stage_for_extension(&extension) {
        bake_shader(context, &key, &absolute, stage)
    } else if extension == "kmat" {
        bake_material(context, &key, &absolute)
    } else {
        bail!("unsupported input type: .{extension}");
    }
}

/// Bakes a compiled shader stage: the SPIR-V binary plus its sibling
/// `<input>.json` reflection document.
fn bake_shader(
    context: &Context,
    key: &ResourceKey,
    path: &Path,
    stage: ShaderStage,
) -> anyhow::Result<()> {
    let spirv = fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let mut reflect_path = OsString::from(path.as_os_str());
    reflect_path.push(".json");
    let reflection = fs::read_to_string(&reflect_path)
        .with_context(|| format!("reading reflection {}", Path::new(&reflect_path).display()))?;
    let schema = parse_shader_schema(&reflection).context("parsing reflection")?;

    // Shaders are cached under their stage name so one source key may
    // provide several stages.
    let cache_key = ResourceKey::from(stage.name()).join(key.as_str());
    let shader = Shader {
        stage,
        spirv,
        schema,
    };
    context.shaders().insert(&cache_key, Arc::new(shader), true)?;
    log::info!("baked shader {cache_key}");
    Ok(())
}

/// Bakes an authored material document: assembles it against the shaders
/// already in the cache, persists its buffers, then publishes the record.
fn bake_material(context: &Context, key: &ResourceKey, path: &Path) -> anyhow::Result<()> {
    let source = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&source).context("parsing material")?;

    let material = assemble_material(key, &doc, context, context, context)?;

    for handle in material.buffers().values() {
        let buffer_key = handle.read().key().clone();
        context.buffers().persist(&buffer_key)?;
    }

    let record = MaterialRecord::from(&material);
    context.materials().insert(key, Arc::new(record), true)?;
    log::info!("baked material {key}");
    Ok(())
}
