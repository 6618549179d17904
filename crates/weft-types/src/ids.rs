//! Strongly-typed identifiers for simulation entities.
//!
//! Newtype wrappers prevent accidental mixing of particle indices
//! with cloth handles.

use serde::{Deserialize, Serialize};

/// Index into a cloth instance's particle buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

/// Opaque identity a solver uses to address the cloths it integrates.
///
/// Assigned by the registry; a solver never interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClothId(pub u64);

impl ParticleId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}


impl From<u32> for ParticleId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<usize> for ParticleId {
    fn from(val: usize) -> Self {
        Self(val as u32)
    }
}

impl From<u64> for ClothId {
    fn from(val: u64) -> Self {
        Self(val)
    }
}
