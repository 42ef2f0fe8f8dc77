use foundation::math::{ReferenceRelative, Vec3};
use terrain::TerrainGrid;

use super::Fragment;

/// Fragment in cartesian coordinates relative to a shape's reference point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceFragment {
    pub vertices: Vec<Vec3>,
}

impl SurfaceFragment {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Sum of the fan triangle areas around vertex 0.
    pub fn area(&self) -> f64 {
        let Some(&apex) = self.vertices.first() else {
            return 0.0;
        };
        self.vertices[1..]
            .windows(2)
            .map(|w| 0.5 * (w[0] - apex).cross(w[1] - apex).length())
            .sum()
    }
}

/// Place every `(longitude, latitude)` vertex on the terrain surface and
/// express it relative to `reference`.
pub fn materialize<G: TerrainGrid + ?Sized>(
    fragment: &Fragment,
    grid: &G,
    reference: Vec3,
) -> SurfaceFragment {
    let relative = ReferenceRelative::new(reference);
    SurfaceFragment {
        vertices: fragment
            .vertices()
            .iter()
            .map(|v| relative.offset(grid.cartesian_at(v.y, v.x)))
            .collect(),
    }
}
