//! Decoding of SPIRV-Cross style reflection documents.
//!
//! Every leaf field is modelled as an `Option` and validated by hand so a
//! missing required field reports which field was missing instead of a
//! generic decode error.

use crate::error::ReflectError;
use crate::schema::{ArrayShape, BufferMember, BufferSchema, ShaderSchema, TextureBinding};
use kiln_common::{SamplerKind, ScalarKind};
use rustc_hash::FxHashMap;
use serde::Deserialize;

#[derive(Deserialize)]
struct ReflectionDoc {
    #[serde(default)]
    types: FxHashMap<String, TypeDef>,
    #[serde(default)]
    ubos: Vec<UboDecl>,
    #[serde(default)]
    textures: Vec<TextureDecl>,
}

#[derive(Deserialize)]
struct TypeDef {
    #[serde(default)]
    members: Vec<MemberDecl>,
}

#[derive(Deserialize)]
struct MemberDecl {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    offset: Option<usize>,
    #[serde(default)]
    array: Vec<usize>,
}

#[derive(Deserialize)]
struct UboDecl {
    #[serde(rename = "type")]
    ty: Option<String>,
    name: Option<String>,
    block_size: Option<usize>,
    set: Option<u32>,
    binding: Option<u32>,
}

#[derive(Deserialize)]
struct TextureDecl {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    set: Option<u32>,
    binding: Option<u32>,
}

fn require<T>(field: &'static str, value: Option<T>) -> Result<T, ReflectError> {
    value.ok_or(ReflectError::MalformedReflection { field })
}

fn scalar_kind(ty: &str) -> Result<ScalarKind, ReflectError> {
    Ok(match ty {
        "float" => ScalarKind::Float,
        "vec2" => ScalarKind::Vec2,
        "vec3" => ScalarKind::Vec3,
        "vec4" => ScalarKind::Vec4,
        "mat3" => ScalarKind::Mat3x3,
        "mat4" => ScalarKind::Mat4x4,
        _ => return Err(ReflectError::UnsupportedType(ty.to_string())),
    })
}

fn sampler_kind(ty: &str) -> Result<SamplerKind, ReflectError> {
    Ok(match ty {
        "sampler2D" => SamplerKind::Sampler2D,
        "sampler3D" => SamplerKind::Sampler3D,
        "samplerCube" => SamplerKind::SamplerCube,
        "sampler2DArray" => SamplerKind::Sampler2DArray,
        "sampler2DShadow" => SamplerKind::Sampler2DShadow,
        "sampler2DArrayShadow" => SamplerKind::Sampler2DArrayShadow,
        _ => return Err(ReflectError::UnsupportedSamplerType(ty.to_string())),
    })
}

fn parse_member(decl: &MemberDecl) -> Result<(String, BufferMember), ReflectError> {
    let name = require("name", decl.name.as_deref())?;
    let kind = scalar_kind(require("type", decl.ty.as_deref())?)?;
    let byte_offset = require("offset", decl.offset)?;
    let array = match *decl.array.as_slice() {
        [] => None,
        [element_count] => Some(ArrayShape {
            element_count,
            element_stride: kind.array_stride(),
        }),
        _ => {
            return Err(ReflectError::UnsupportedShape {
                member: name.to_string(),
            })
        }
    };
    Ok((
        name.to_string(),
        BufferMember {
            kind,
            byte_offset,
            array,
        },
    ))
}

fn parse_buffer(doc: &ReflectionDoc, decl: &UboDecl) -> Result<BufferSchema, ReflectError> {
    let ty = require("type", decl.ty.as_deref())?;
    let def = doc
        .types
        .get(ty)
        .ok_or(ReflectError::MalformedReflection { field: "types" })?;

    let mut members = FxHashMap::default();
    let byte_size = require("block_size", decl.block_size)?;
    for decl in &def.members {
        let (name, member) = parse_member(decl)?;
        // Offsets are GPU-assigned and trusted, but a member reaching past
        // the declared block size would let marshaling write out of bounds.
        let extent = member
            .extent()
            .ok_or(ReflectError::MalformedReflection { field: "offset" })?;
        if extent > byte_size {
            return Err(ReflectError::MalformedReflection {
                field: "block_size",
            });
        }
        members.insert(name, member);
    }

    Ok(BufferSchema {
        name: require("name", decl.name.as_deref())?.to_string(),
        byte_size,
        descriptor_set: require("set", decl.set)?,
        binding: require("binding", decl.binding)?,
        members,
    })
}

fn parse_texture(decl: &TextureDecl) -> Result<TextureBinding, ReflectError> {
    Ok(TextureBinding {
        name: require("name", decl.name.as_deref())?.to_string(),
        sampler: sampler_kind(require("type", decl.ty.as_deref())?)?,
        descriptor_set: require("set", decl.set)?,
        binding: require("binding", decl.binding)?,
    })
}

/// Parses a reflection document into a typed [`ShaderSchema`].
///
/// A stage that declares no buffers or textures parses to an empty schema;
/// that is not an error.
pub fn parse_shader_schema(doc: &str) -> Result<ShaderSchema, ReflectError> {
    let doc: ReflectionDoc = serde_json::from_str(doc)?;

    let mut buffers = Vec::with_capacity(doc.ubos.len());
    for decl in &doc.ubos {
        buffers.push(parse_buffer(&doc, decl)?);
    }

    let mut textures = Vec::with_capacity(doc.textures.len());
    for decl in &doc.textures {
        textures.push(parse_texture(decl)?);
    }

    Ok(ShaderSchema { buffers, textures })
}

#[cfg(test)]
mod test {
    use super::*;

    const BASIC: &str = r#"{
        "types": {
            "_28": {
                "name": "StandardBlock",
                "members": [
                    { "name": "albedo", "type": "vec3", "offset": 16 },
                    { "name": "roughness", "type": "float", "offset": 28 },
                    { "name": "bones", "type": "mat4", "offset": 32, "array": [2] }
                ]
            }
        },
        "ubos": [
            { "type": "_28", "name": "standard", "block_size": 160, "set": 0, "binding": 0 }
        ],
        "textures": [
            { "type": "sampler2D", "name": "diffuse", "set": 0, "binding": 1 },
            { "type": "sampler2DArrayShadow", "name": "shadows", "set": 0, "binding": 2 }
        ]
    }"#;

    #[test]
    fn parses_members_and_derives_strides() {
        let schema = parse_shader_schema(BASIC).unwrap();
        assert_eq!(schema.buffers.len(), 1);

        let buffer = &schema.buffers[0];
        assert_eq!(buffer.name, "standard");
        assert_eq!(buffer.byte_size, 160);
        assert_eq!((buffer.descriptor_set, buffer.binding), (0, 0));

        let albedo = &buffer.members["albedo"];
        assert_eq!(albedo.kind, ScalarKind::Vec3);
        assert_eq!(albedo.byte_offset, 16);
        assert!(albedo.array.is_none());

        let bones = &buffer.members["bones"];
        let shape = bones.array.unwrap();
        assert_eq!(shape.element_count, 2);
        assert_eq!(shape.element_stride, ScalarKind::Mat4x4.array_stride());
    }

    #[test]
    fn parses_texture_bindings() {
        let schema = parse_shader_schema(BASIC).unwrap();
        assert_eq!(schema.textures.len(), 2);
        assert_eq!(schema.textures[0].name, "diffuse");
        assert_eq!(schema.textures[0].sampler, SamplerKind::Sampler2D);
        assert_eq!(schema.textures[1].sampler, SamplerKind::Sampler2DArrayShadow);
        assert_eq!(schema.textures[1].binding, 2);
    }

    #[test]
    fn parsing_is_deterministic() {
        assert_eq!(
            parse_shader_schema(BASIC).unwrap(),
            parse_shader_schema(BASIC).unwrap()
        );
    }

    #[test]
    fn empty_document_parses_to_empty_schema() {
        let schema = parse_shader_schema("{}").unwrap();
        assert!(schema.buffers.is_empty());
        assert!(schema.textures.is_empty());
    }

    #[test]
    fn unknown_scalar_type_is_rejected() {
        let doc = r#"{
            "types": { "_1": { "members": [{ "name": "x", "type": "dmat4", "offset": 0 }] } },
            "ubos": [{ "type": "_1", "name": "b", "block_size": 128, "set": 0, "binding": 0 }]
        }"#;
        assert!(matches!(
            parse_shader_schema(doc),
            Err(ReflectError::UnsupportedType(ty)) if ty == "dmat4"
        ));
    }

    #[test]
    fn unknown_sampler_type_is_rejected() {
        let doc = r#"{ "textures": [{ "type": "samplerBuffer", "name": "t", "set": 0, "binding": 0 }] }"#;
        assert!(matches!(
            parse_shader_schema(doc),
            Err(ReflectError::UnsupportedSamplerType(ty)) if ty == "samplerBuffer"
        ));
    }

    #[test]
    fn multi_dimensional_arrays_are_rejected() {
        let doc = r#"{
            "types": { "_1": { "members": [{ "name": "m", "type": "vec4", "offset": 0, "array": [4, 4] }] } },
            "ubos": [{ "type": "_1", "name": "b", "block_size": 256, "set": 0, "binding": 0 }]
        }"#;
        assert!(matches!(
            parse_shader_schema(doc),
            Err(ReflectError::UnsupportedShape { member }) if member == "m"
        ));
    }

    #[test]
    fn missing_offset_is_malformed() {
        let doc = r#"{
            "types": { "_1": { "members": [{ "name": "x", "type": "float" }] } },
            "ubos": [{ "type": "_1", "name": "b", "block_size": 16, "set": 0, "binding": 0 }]
        }"#;
        assert!(matches!(
            parse_shader_schema(doc),
            Err(ReflectError::MalformedReflection { field: "offset" })
        ));
    }

    #[test]
    fn missing_binding_is_malformed() {
        let doc = r#"{
            "types": { "_1": { "members": [] } },
            "ubos": [{ "type": "_1", "name": "b", "block_size": 16, "set": 0 }]
        }"#;
        assert!(matches!(
            parse_shader_schema(doc),
            Err(ReflectError::MalformedReflection { field: "binding" })
        ));
    }

    #[test]
    fn overflowing_member_extents_are_malformed() {
        // offset near usize::MAX must not wrap past the block-size guard
        let doc = format!(
            r#"{{
                "types": {{ "_1": {{ "members": [{{ "name": "x", "type": "vec4", "offset": {} }}] }} }},
                "ubos": [{{ "type": "_1", "name": "b", "block_size": 16, "set": 0, "binding": 0 }}]
            }}"#,
            usize::MAX - 8
        );
        assert!(matches!(
            parse_shader_schema(&doc),
            Err(ReflectError::MalformedReflection { field: "offset" })
        ));

        // element count whose span overflows must be rejected the same way
        let doc = format!(
            r#"{{
                "types": {{ "_1": {{ "members": [{{ "name": "x", "type": "vec4", "offset": 0, "array": [{}] }}] }} }},
                "ubos": [{{ "type": "_1", "name": "b", "block_size": 16, "set": 0, "binding": 0 }}]
            }}"#,
            usize::MAX / 2
        );
        assert!(matches!(
            parse_shader_schema(&doc),
            Err(ReflectError::MalformedReflection { field: "offset" })
        ));
    }

    #[test]
    fn member_past_block_size_is_malformed() {
        let doc = r#"{
            "types": { "_1": { "members": [{ "name": "x", "type": "vec4", "offset": 16 }] } },
            "ubos": [{ "type": "_1", "name": "b", "block_size": 16, "set": 0, "binding": 0 }]
        }"#;
        assert!(matches!(
            parse_shader_schema(doc),
            Err(ReflectError::MalformedReflection { field: "block_size" })
        ));
    }
}
