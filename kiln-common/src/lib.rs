pub mod key;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use key::ResourceKey;

/// The closed set of GPU scalar, vector and matrix types a buffer member
/// may take.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Float = 0,
    Vec2,
    Vec3,
    Vec4,
    Mat3x3,
    Mat4x4,
}

impl ScalarKind {
    /// Number of f32 components.
    pub const fn components(self) -> usize {
        match self {
            ScalarKind::Float => 1,
            ScalarKind::Vec2 => 2,
            ScalarKind::Vec3 => 3,
            ScalarKind::Vec4 => 4,
            ScalarKind::Mat3x3 => 9,
            ScalarKind::Mat4x4 => 16,
        }
    }

    /// Natural, unpadded byte size.
    pub const fn size(self) -> usize {
        self.components() * std::mem::size_of::<f32>()
    }

    /// Byte distance between successive elements of an array member.
    ///
    /// std140 rules: every element is padded to the width of a vec4, except
    /// mat3 arrays (three vec4 columns) and mat4 arrays, whose natural size
    /// is already a multiple of the vector width.
    pub const fn array_stride(self) -> usize {
        match self {
            ScalarKind::Float | ScalarKind::Vec2 | ScalarKind::Vec3 | ScalarKind::Vec4 => {
                ScalarKind::Vec4.size()
            }
            ScalarKind::Mat3x3 => 3 * ScalarKind::Vec4.size(),
            ScalarKind::Mat4x4 => ScalarKind::Mat4x4.size(),
        }
    }
}

/// The closed set of combined image-sampler kinds a shader may declare.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SamplerKind {
    Sampler2D = 0,
    Sampler3D,
    SamplerCube,
    Sampler2DArray,
    Sampler2DShadow,
    Sampler2DArrayShadow,
}

/// A programmable pipeline stage a material may reference.
#[repr(i32)]
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum ShaderStage {
    Vertex = 0,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Fragment,
}

impl ShaderStage {
    /// All stages, in pipeline order.
    pub const ALL: [ShaderStage; 5] = [
        ShaderStage::Vertex,
        ShaderStage::TessellationControl,
        ShaderStage::TessellationEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
    ];

    /// The stage's spelling in authored material documents.
    pub const fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::TessellationControl => "tessellation_control",
            ShaderStage::TessellationEvaluation => "tessellation_evaluation",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        }
    }

    /// Looks up a stage by its authored spelling.
    pub fn from_name(name: &str) -> Option<ShaderStage> {
        match name {
            "vertex" => Some(ShaderStage::Vertex),
            "tessellation_control" => Some(ShaderStage::TessellationControl),
            "tessellation_evaluation" => Some(ShaderStage::TessellationEvaluation),
            "geometry" => Some(ShaderStage::Geometry),
            "fragment" => Some(ShaderStage::Fragment),
            _ => None,
        }
    }

    pub const fn mask(self) -> StageMask {
        match self {
            ShaderStage::Vertex => StageMask::VERTEX,
            ShaderStage::TessellationControl => StageMask::TESSELLATION_CONTROL,
            ShaderStage::TessellationEvaluation => StageMask::TESSELLATION_EVALUATION,
            ShaderStage::Geometry => StageMask::GEOMETRY,
            ShaderStage::Fragment => StageMask::FRAGMENT,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Which pipeline stages declared a binding.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
    pub struct StageMask: u8 {
        const VERTEX = 0b00001;
        const TESSELLATION_CONTROL = 0b00010;
        const TESSELLATION_EVALUATION = 0b00100;
        const GEOMETRY = 0b01000;
        const FRAGMENT = 0b10000;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn array_stride_pads_to_vec4() {
        for kind in [
            ScalarKind::Float,
            ScalarKind::Vec2,
            ScalarKind::Vec3,
            ScalarKind::Vec4,
        ] {
            assert_eq!(kind.array_stride(), ScalarKind::Vec4.size());
        }
    }

    #[test]
    fn matrix_array_strides() {
        assert_eq!(
            ScalarKind::Mat3x3.array_stride(),
            3 * ScalarKind::Vec4.array_stride()
        );
        assert_eq!(ScalarKind::Mat4x4.array_stride(), ScalarKind::Mat4x4.size());
    }

    #[test]
    fn stage_names_round_trip() {
        for stage in ShaderStage::ALL {
            assert_eq!(ShaderStage::from_name(stage.name()), Some(stage));
        }
        assert_eq!(ShaderStage::from_name("header"), None);
    }

    #[test]
    fn stage_masks_are_disjoint() {
        let mut seen = StageMask::empty();
        for stage in ShaderStage::ALL {
            assert!(!seen.intersects(stage.mask()));
            seen |= stage.mask();
        }
    }
}
