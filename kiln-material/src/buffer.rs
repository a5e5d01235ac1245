use crate::error::MaterialError;
use kiln_common::{ResourceKey, ScalarKind, StageMask};
use kiln_reflect::schema::BufferSchema;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Shared handle to a registry-owned buffer. The registry is the single
/// owner; materials hold handles whose lifetime is the cache's, not theirs.
pub type BufferHandle = Arc<RwLock<Buffer>>;

/// A named, typed byte store sized by its schema.
///
/// Zero-filled at creation and mutated only through [`Buffer::apply_values`];
/// bytes leave read-only for persistence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Buffer {
    key: ResourceKey,
    schema: BufferSchema,
    stages: StageMask,
    #[serde(with = "serde_bytes")]
    data: Box<[u8]>,
}

impl Buffer {
    pub fn new(key: ResourceKey, schema: BufferSchema) -> Self {
        let data = vec![0u8; schema.byte_size].into_boxed_slice();
        Buffer {
            key,
            schema,
            stages: StageMask::empty(),
            data,
        }
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn schema(&self) -> &BufferSchema {
        &self.schema
    }

    /// Stages that declared this buffer during reconciliation.
    pub fn stages(&self) -> StageMask {
        self.stages
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn mark_stage(&mut self, stage: StageMask) {
        self.stages |= stage;
    }

    /// Merges another stage's declaration of this buffer. Returns false on
    /// structural mismatch; the caller turns that into a `SchemaConflict`.
    #[must_use]
    pub fn merge(&mut self, schema: &BufferSchema, stage: StageMask) -> bool {
        if !self.schema.compatible_with(schema) {
            return false;
        }
        self.stages |= stage;
        true
    }

    /// Marshals authored values into the buffer.
    ///
    /// Keys that do not name a schema member are skipped: authored
    /// documents also carry stage keys, `textures` and the like. Authored
    /// arrays shorter than the member leave trailing elements at their
    /// prior value; longer ones are truncated.
    pub fn apply_values(&mut self, values: &Map<String, Value>) -> Result<(), MaterialError> {
        for (key, value) in values {
            let Some(member) = self.schema.members.get(key).copied() else {
                continue;
            };
            match member.array {
                None => write_element(&mut self.data, member.kind, member.byte_offset, key, value)?,
                Some(shape) => {
                    let Value::Array(elements) = value else {
                        return Err(mismatch(key, member.kind));
                    };
                    for (i, element) in elements.iter().take(shape.element_count).enumerate() {
                        let offset = member.byte_offset + i * shape.element_stride;
                        write_element(&mut self.data, member.kind, offset, key, element)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn mismatch(member: &str, expected: ScalarKind) -> MaterialError {
    MaterialError::ValueShapeMismatch {
        member: member.to_string(),
        expected,
    }
}

/// Transcribes one authored value into `kind.size()` bytes at `offset`.
/// The parser guarantees every member extent fits the buffer.
fn write_element(
    data: &mut [u8],
    kind: ScalarKind,
    offset: usize,
    member: &str,
    value: &Value,
) -> Result<(), MaterialError> {
    let dest = &mut data[offset..offset + kind.size()];
    match kind {
        ScalarKind::Float => {
            let v = number(value).ok_or_else(|| mismatch(member, kind))?;
            dest.copy_from_slice(bytemuck::bytes_of(&v));
        }
        ScalarKind::Vec2 => {
            let v = vector::<2>(value).ok_or_else(|| mismatch(member, kind))?;
            dest.copy_from_slice(bytemuck::cast_slice(&v));
        }
        ScalarKind::Vec3 => {
            let v = vector::<3>(value).ok_or_else(|| mismatch(member, kind))?;
            dest.copy_from_slice(bytemuck::cast_slice(&v));
        }
        ScalarKind::Vec4 => {
            let v = vector::<4>(value).ok_or_else(|| mismatch(member, kind))?;
            dest.copy_from_slice(bytemuck::cast_slice(&v));
        }
        ScalarKind::Mat3x3 => {
            let v = matrix::<9, 3>(value).ok_or_else(|| mismatch(member, kind))?;
            dest.copy_from_slice(bytemuck::cast_slice(&v));
        }
        ScalarKind::Mat4x4 => {
            let v = matrix::<16, 4>(value).ok_or_else(|| mismatch(member, kind))?;
            dest.copy_from_slice(bytemuck::cast_slice(&v));
        }
    }
    Ok(())
}

fn number(value: &Value) -> Option<f32> {
    value.as_f64().map(|v| v as f32)
}

fn vector<const N: usize>(value: &Value) -> Option<[f32; N]> {
    let Value::Array(items) = value else {
        return None;
    };
    if items.len() != N {
        return None;
    }
    let mut out = [0f32; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = number(item)?;
    }
    Some(out)
}

/// Matrices are authored either flat (`N` numbers) or as `DIM` column
/// arrays of `DIM` numbers, column-major either way.
fn matrix<const N: usize, const DIM: usize>(value: &Value) -> Option<[f32; N]> {
    let Value::Array(items) = value else {
        return None;
    };
    if items.len() == N {
        return vector::<N>(value);
    }
    if items.len() != DIM {
        return None;
    }
    let mut out = [0f32; N];
    for (column, item) in items.iter().enumerate() {
        let values = vector::<DIM>(item)?;
        out[column * DIM..(column + 1) * DIM].copy_from_slice(&values);
    }
    Some(out)
}
