use crate::schema::ShaderSchema;
use kiln_common::ShaderStage;
use serde::{Deserialize, Serialize};

/// A compiled shader stage: its SPIR-V binary plus the reflected schema.
///
/// Produced once by the shader baker and immutable thereafter; materials
/// reference shaders by cache key, never by ownership.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Shader {
    pub stage: ShaderStage,
    #[serde(with = "serde_bytes")]
    pub spirv: Vec<u8>,
    pub schema: ShaderSchema,
}
