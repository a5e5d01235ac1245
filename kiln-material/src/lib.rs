//! Material assembly for the kiln bake pipeline.
//!
//! A material references up to five shader stages. Each stage's reflected
//! buffer schemas are reconciled into one set of per-binding-point buffers,
//! authored JSON values are marshaled into those buffers at their
//! schema-dictated byte offsets, and authored texture references are bound
//! by name. A structural disagreement between stages is a hard bake error:
//! two stages disagreeing on a buffer's layout would corrupt GPU-read
//! memory with no visible error at bake time.

mod assemble;
mod buffer;
mod error;
mod material;

pub use assemble::{assemble_material, BufferRegistry, ShaderResolver, TextureResolver};
pub use buffer::{Buffer, BufferHandle};
pub use error::MaterialError;
pub use material::{Material, MaterialRecord};
