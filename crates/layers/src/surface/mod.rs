//! Terrain-conforming surface shapes.
//!
//! A shape's ring is triangulated, triangles crossing the antimeridian are
//! split, and every triangle is scan converted against each terrain tile.
//! The resulting planar fragments are placed on the terrain relative to a
//! reference point and packed for drawing.

mod buffer;
mod clip;
mod dateline;
mod factory;
mod materialize;
mod rebuild;
mod scan;
mod shape;
mod triangle;

pub use buffer::{FanRange, SurfaceDrawBuffer, SurfaceVertex};
pub use clip::{Axis, Fragment, MAX_FRAGMENT_VERTICES};
pub use dateline::split_at_dateline;
pub use factory::{MIN_ELLIPSE_INTERVALS, circle_ring, ellipse_ring, quad_ring};
pub use materialize::{SurfaceFragment, materialize};
pub use rebuild::{RebuildState, RebuildThrottle};
pub use scan::{MIN_FRAGMENT_AREA, intersect_terrain};
pub use shape::{ShapeConfig, ShapeError, SurfaceShape};
pub use triangle::{
    EarcutTriangulator, FanTriangulator, PrimitiveMode, Triangle, TriangleAssembler,
    TriangulationError, TriangulationStrategy, Triangulator,
};

/// Tolerance, in degrees, for near-parallel and coincident tests.
pub const EPSILON: f64 = 1e-10;
