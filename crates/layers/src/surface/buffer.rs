use bytemuck::{Pod, Zeroable};
use foundation::math::{Vec3, narrow_f32};
use serde::Serialize;

use super::SurfaceFragment;

/// One packed vertex, reference-relative, ready for upload.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
}

/// Contiguous run of vertices drawn as one triangle fan.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct FanRange {
    pub first: u32,
    pub count: u32,
}

/// All fragments of a shape packed into one vertex buffer plus one fan range
/// per fragment. `reference` is added back at draw time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceDrawBuffer {
    vertices: Vec<SurfaceVertex>,
    ranges: Vec<FanRange>,
    reference: Vec3,
}

impl SurfaceDrawBuffer {
    pub fn pack(fragments: &[SurfaceFragment], reference: Vec3) -> Self {
        let total: usize = fragments.iter().map(SurfaceFragment::len).sum();
        let mut vertices = Vec::with_capacity(total);
        let mut ranges = Vec::with_capacity(fragments.len());

        for fragment in fragments.iter().filter(|f| !f.is_empty()) {
            ranges.push(FanRange {
                first: vertices.len() as u32,
                count: fragment.len() as u32,
            });
            vertices.extend(fragment.vertices.iter().map(|v| SurfaceVertex {
                position: narrow_f32(*v),
            }));
        }

        Self {
            vertices,
            ranges,
            reference,
        }
    }

    pub fn vertices(&self) -> &[SurfaceVertex] {
        &self.vertices
    }

    pub fn ranges(&self) -> &[FanRange] {
        &self.ranges
    }

    pub fn reference(&self) -> Vec3 {
        self.reference
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Raw vertex bytes for a GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn firsts(&self) -> Vec<u32> {
        self.ranges.iter().map(|r| r.first).collect()
    }

    pub fn counts(&self) -> Vec<u32> {
        self.ranges.iter().map(|r| r.count).collect()
    }

    /// Fans expanded to an indexed triangle list, for renderers without
    /// multi-draw fan support.
    pub fn triangle_indices(&self) -> Vec<u32> {
        let mut out = Vec::new();
        for range in &self.ranges {
            for i in 1..range.count.saturating_sub(1) {
                out.extend([range.first, range.first + i, range.first + i + 1]);
            }
        }
        out
    }
}
