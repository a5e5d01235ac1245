//! The typed layout model a reflection document parses into.

use kiln_common::{SamplerKind, ScalarKind};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Array shape of a buffer member.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ArrayShape {
    pub element_count: usize,
    /// Always derived from the member's kind via [`ScalarKind::array_stride`],
    /// never read from the document.
    pub element_stride: usize,
}

/// One named field inside a buffer block.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BufferMember {
    pub kind: ScalarKind,
    /// GPU-assigned offset, trusted as reflected.
    pub byte_offset: usize,
    pub array: Option<ArrayShape>,
}

impl BufferMember {
    /// The last byte (exclusive) this member may touch, or `None` when the
    /// reflected offset or element count overflows. Checked so an absurd
    /// offset cannot wrap past the block-size guard.
    pub fn extent(&self) -> Option<usize> {
        let span = match self.array {
            None => 0,
            Some(shape) => (shape.element_count.max(1) - 1).checked_mul(shape.element_stride)?,
        };
        self.byte_offset
            .checked_add(span)?
            .checked_add(self.kind.size())
    }
}

/// A named GPU buffer block as declared by one shader stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BufferSchema {
    pub name: String,
    pub byte_size: usize,
    pub descriptor_set: u32,
    pub binding: u32,
    pub members: FxHashMap<String, BufferMember>,
}

impl BufferSchema {
    /// Structural compatibility: identical member maps (names, kinds,
    /// offsets, array shape). Binding metadata is the reconciler's concern,
    /// not part of member compatibility.
    pub fn compatible_with(&self, other: &BufferSchema) -> bool {
        self.members == other.members
    }
}

/// A named texture sampler slot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TextureBinding {
    pub name: String,
    pub descriptor_set: u32,
    pub binding: u32,
    pub sampler: SamplerKind,
}

/// The full reflection result for one shader stage, ordered as declared.
/// Immutable once parsed.
#[derive(Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct ShaderSchema {
    pub buffers: Vec<BufferSchema>,
    pub textures: Vec<TextureBinding>,
}
