use kiln_common::{ResourceKey, ScalarKind};
use kiln_reflect::ReflectError;
use thiserror::Error;

/// Error type for material assembly. Every variant aborts the enclosing
/// bake; a material is never partially published.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MaterialError {
    /// The material references a shader absent from the resolver.
    #[error("unresolved shader: {0}")]
    UnresolvedShader(ResourceKey),
    /// Two stages declared structurally different layouts for one binding
    /// point. Never resolved by picking a side.
    #[error("buffer schema mismatch in material {material} at binding {binding}")]
    SchemaConflict {
        material: ResourceKey,
        binding: u32,
    },
    /// An authored value's shape does not match its member's declared kind.
    #[error("value for {member} does not match declared {expected:?}")]
    ValueShapeMismatch {
        member: String,
        expected: ScalarKind,
    },
    /// The authored document's root is not a JSON object.
    #[error("material document root must be an object")]
    NotAnObject,
    /// An authored field had an unusable shape (e.g. a stage key mapping to
    /// a non-string).
    #[error("malformed material document field: {field}")]
    MalformedDocument { field: String },
    #[error("reflection error")]
    Reflect(#[from] ReflectError),
    /// Failure surfaced through the buffer registry seam.
    #[error("buffer registry: {0}")]
    Registry(String),
}
