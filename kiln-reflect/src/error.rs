use thiserror::Error;

/// Error type for shader reflection parsing.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ReflectError {
    /// The document names a scalar type outside the closed set.
    #[error("unsupported scalar type: {0}")]
    UnsupportedType(String),
    /// The document names a sampler type outside the closed set.
    #[error("unsupported sampler type: {0}")]
    UnsupportedSamplerType(String),
    /// Only single-dimension arrays are supported.
    #[error("multi-dimensional array on member {member}")]
    UnsupportedShape { member: String },
    /// A required reflection field was missing or inconsistent.
    #[error("malformed reflection: missing or invalid field {field}")]
    MalformedReflection { field: &'static str },
    /// The document was not valid JSON at all.
    #[error("malformed reflection document")]
    Json(#[from] serde_json::Error),
}
