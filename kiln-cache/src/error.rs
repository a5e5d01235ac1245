use kiln_common::ResourceKey;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for cache storage.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("resource not found: {0}")]
    NotFound(ResourceKey),
    #[error("io error at {0}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to encode record")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode record")]
    Decode(#[from] rmp_serde::decode::Error),
}
