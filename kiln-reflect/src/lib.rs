//! Parses shader reflection metadata into typed buffer and texture layouts.
//!
//! The reflection document is the JSON emitted by an external SPIR-V
//! reflector; this crate turns it into a [`ShaderSchema`](schema::ShaderSchema)
//! whose member offsets and array strides obey GPU buffer-block alignment
//! rules.

mod document;
mod error;
mod shader;

pub mod schema;

pub use document::parse_shader_schema;
pub use error::ReflectError;
pub use shader::Shader;
