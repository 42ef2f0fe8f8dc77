//! Precision policies.
//!
//! This module is intentionally small and conservative. It provides:
//! - A reference-relative conversion (`ReferenceRelative`) that keeps
//!   Earth-scale coordinates small before they are narrowed to `f32`.
//! - Deterministic float ordering for sorting.

use core::cmp::Ordering;

use super::Vec3;

/// GPU-friendly position expressed relative to a reference point.
pub type RelativeF32 = [f32; 3];

/// Express world positions relative to a high-precision `origin` (typically
/// a point on the rendered shape).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReferenceRelative {
    pub origin: Vec3,
}

impl ReferenceRelative {
    pub fn new(origin: Vec3) -> Self {
        Self { origin }
    }

    #[inline]
    pub fn offset(self, world: Vec3) -> Vec3 {
        world - self.origin
    }

    #[inline]
    pub fn restore(self, relative: Vec3) -> Vec3 {
        relative + self.origin
    }

    /// Convert a world-space point (f64) to a reference-relative `f32` offset.
    #[inline]
    pub fn to_f32(self, world: Vec3) -> RelativeF32 {
        narrow_f32(self.offset(world))
    }
}

/// Narrow an already reference-relative offset to `f32`.
#[inline]
pub fn narrow_f32(v: Vec3) -> RelativeF32 {
    [v.x as f32, v.y as f32, v.z as f32]
}

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        // Handles +0.0 and -0.0.
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats.
///
/// Prefer this any time you sort floats or use them in ordered keys.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}
