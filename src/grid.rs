//! Cell indexing: world coordinates to cells, cells to hashed buckets.
//!
//! Cells are squares whose side is a power of two, so the division is an
//! arithmetic shift. The bucket table also has a power-of-two size and many
//! distant cells share a bucket; bucket membership alone never proves
//! proximity.

use glam::Vec2;

use crate::config::MAX_BUCKET_COUNT;

/// Fibonacci multiplier (2^64 / golden ratio).
const FIB: u64 = 0x9E37_79B9_7F4A_7C15;

/// Largest power of two that is `<= n`, treating 0 as 1.
pub fn floor_pow2(n: u32) -> u32 {
    if n <= 1 { 1 } else { 1 << (31 - n.leading_zeros()) }
}

/// Immutable cell/bucket geometry of one collision set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridSpec {
    shift: u32,
    bucket_mask: u32,
}

impl GridSpec {
    /// Both sizes are rounded down to a power of two; zero becomes one.
    /// Bucket counts above [`MAX_BUCKET_COUNT`] are capped.
    pub fn new(cell_size: u32, bucket_count: u32) -> Self {
        Self {
            shift: floor_pow2(cell_size).trailing_zeros(),
            bucket_mask: floor_pow2(bucket_count.min(MAX_BUCKET_COUNT)) - 1,
        }
    }

    pub fn cell_size(&self) -> u32 {
        1 << self.shift
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_mask as usize + 1
    }

    /// Cell coordinate along one axis, rounding toward negative infinity.
    ///
    /// Out-of-range values saturate to the `i32` range, NaN maps to 0.
    #[inline]
    pub fn cell_coord(&self, v: f32) -> i32 {
        (v.floor() as i32) >> self.shift
    }

    #[inline]
    pub fn cell_of(&self, p: Vec2) -> (i32, i32) {
        (self.cell_coord(p.x), self.cell_coord(p.y))
    }

    /// Inclusive cell range covered by the square `center ± half`.
    #[inline]
    pub fn cell_range(&self, center: Vec2, half: f32) -> ((i32, i32), (i32, i32)) {
        (
            self.cell_of(center - Vec2::splat(half)),
            self.cell_of(center + Vec2::splat(half)),
        )
    }

    /// Hashed bucket for a cell, in `[0, bucket_count)`.
    #[inline]
    pub fn bucket(&self, x: i32, y: i32) -> u32 {
        let key = u64::from(x as u32) | (u64::from(y as u32) << 32);
        // High half of the product is the well-mixed part.
        ((key.wrapping_mul(FIB) >> 32) as u32) & self.bucket_mask
    }
}
