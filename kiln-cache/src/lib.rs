//! The kiln content cache: one persisted record per hierarchical resource
//! key, fronted by in-memory registries so a bake run resolves resources it
//! baked earlier, in this invocation or a previous one.

mod cache;
mod context;
mod error;
mod registry;

pub use cache::ResourceCache;
pub use context::Context;
pub use error::CacheError;
pub use registry::BufferStore;
