use foundation::bounds::Sector;
use foundation::math::{
    Globe, LatLon, Vec3, great_circle_azimuth, great_circle_distance, great_circle_end_position,
    ring_crosses_dateline,
};
use foundation::time::Time;
use serde::{Deserialize, Serialize};
use terrain::TerrainGrid;
use tracing::{debug, trace, warn};

use super::{
    RebuildState, RebuildThrottle, SurfaceDrawBuffer, SurfaceFragment, Triangle,
    TriangulationError, TriangulationStrategy, Triangulator, intersect_terrain, materialize,
    split_at_dateline,
};
use crate::symbology::ShapeStyle;

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeError {
    Triangulation(TriangulationError),
    TooFewPositions { count: usize },
    NonFiniteCoordinate { index: usize },
    InvalidDimension { name: &'static str, value: f64 },
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeError::Triangulation(e) => write!(f, "triangulation failed: {e}"),
            ShapeError::TooFewPositions { count } => {
                write!(f, "a surface shape needs at least 3 positions, got {count}")
            }
            ShapeError::NonFiniteCoordinate { index } => {
                write!(f, "position {index} has a non-finite coordinate")
            }
            ShapeError::InvalidDimension { name, value } => {
                write!(f, "{name} must be a positive finite length, got {value}")
            }
        }
    }
}

impl std::error::Error for ShapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShapeError::Triangulation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TriangulationError> for ShapeError {
    fn from(e: TriangulationError) -> Self {
        ShapeError::Triangulation(e)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    /// Minimum seconds between two rebuilds of an unchanged shape.
    pub throttle_interval_s: f64,
    pub triangulation: TriangulationStrategy,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            throttle_interval_s: 1.0,
            triangulation: TriangulationStrategy::Earcut,
        }
    }
}

/// A geographic polygon draped over terrain.
///
/// The shape owns its ring, the triangles cut from it (built lazily, dropped
/// on every ring change) and the fragment set produced by the last rebuild.
/// Fragments are replaced wholesale; `update` decides when.
#[derive(Debug, Clone)]
pub struct SurfaceShape {
    positions: Vec<LatLon>,
    sector: Sector,
    triangles: Option<Vec<Triangle>>,
    fragments: Vec<SurfaceFragment>,
    draw_buffer: SurfaceDrawBuffer,
    reference: Vec3,
    state: RebuildState,
    throttle: RebuildThrottle,
    config: ShapeConfig,
    pub style: ShapeStyle,
}

impl SurfaceShape {
    pub fn new(positions: Vec<LatLon>) -> Result<Self, ShapeError> {
        Self::with_config(positions, ShapeConfig::default())
    }

    pub fn with_config(positions: Vec<LatLon>, config: ShapeConfig) -> Result<Self, ShapeError> {
        validate(&positions)?;
        Ok(Self {
            sector: bounding(&positions),
            positions,
            triangles: None,
            fragments: Vec::new(),
            draw_buffer: SurfaceDrawBuffer::default(),
            reference: Vec3::ZERO,
            state: RebuildState::Dirty,
            throttle: RebuildThrottle::new(config.throttle_interval_s),
            config,
            style: ShapeStyle::default(),
        })
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn positions(&self) -> &[LatLon] {
        &self.positions
    }

    /// Replace the ring. Triangles are rebuilt lazily and the next `update`
    /// rebuilds the fragments regardless of the throttle.
    pub fn set_positions(&mut self, positions: Vec<LatLon>) -> Result<(), ShapeError> {
        validate(&positions)?;
        self.sector = bounding(&positions);
        self.positions = positions;
        self.triangles = None;
        self.state.mark_dirty();
        Ok(())
    }

    /// Force a rebuild on the next `update`, e.g. after the terrain changed.
    pub fn invalidate(&mut self) {
        self.state.mark_dirty();
    }

    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    pub fn sector(&self) -> Sector {
        self.sector
    }

    pub fn state(&self) -> RebuildState {
        self.state
    }

    /// First ring position; movement and the reference point pivot on it.
    pub fn reference_position(&self) -> LatLon {
        self.positions[0]
    }

    /// Cartesian point subtracted from every fragment vertex.
    pub fn reference_point(&self) -> Vec3 {
        self.reference
    }

    pub fn fragments(&self) -> &[SurfaceFragment] {
        &self.fragments
    }

    pub fn draw_buffer(&self) -> &SurfaceDrawBuffer {
        &self.draw_buffer
    }

    pub fn triangles(&mut self) -> Result<&[Triangle], ShapeError> {
        let triangles = match self.triangles.take() {
            Some(triangles) => triangles,
            None => self.config.triangulation.triangulate(&self.positions)?,
        };
        let triangles = self.triangles.insert(triangles);
        Ok(triangles.as_slice())
    }

    /// Rebuild the fragments against `tiles` if the rebuild is due at `now`.
    /// Returns whether a rebuild ran.
    pub fn update<G: TerrainGrid>(
        &mut self,
        now: Time,
        globe: &Globe,
        tiles: &[G],
    ) -> Result<bool, ShapeError> {
        if !self.throttle.is_due(&self.state, now) {
            trace!("surface shape rebuild not due at {:.3}s", now.seconds());
            return Ok(false);
        }

        self.state.begin();
        match self.rebuild(globe, tiles) {
            Ok(()) => {
                self.state.finish(now);
                Ok(true)
            }
            Err(err) => {
                warn!("surface shape rebuild failed: {err}");
                self.fragments.clear();
                self.draw_buffer = SurfaceDrawBuffer::default();
                self.state.fail();
                Err(err)
            }
        }
    }

    fn rebuild<G: TerrainGrid>(&mut self, globe: &Globe, tiles: &[G]) -> Result<(), ShapeError> {
        let triangles: Vec<Triangle> =
            self.triangles()?.iter().flat_map(split_at_dateline).collect();
        self.reference = self.compute_reference(globe, tiles);

        let mut fragments = Vec::new();
        let mut tiles_hit = 0;
        for tile in tiles {
            if !tile.sector().intersects(&self.sector) {
                continue;
            }
            tiles_hit += 1;
            for triangle in &triangles {
                for fragment in intersect_terrain(triangle, tile) {
                    fragments.push(materialize(&fragment, tile, self.reference));
                }
            }
        }

        debug!(
            "rebuilt surface shape: {} triangles, {} of {} tiles, {} fragments",
            triangles.len(),
            tiles_hit,
            tiles.len(),
            fragments.len()
        );
        self.draw_buffer = SurfaceDrawBuffer::pack(&fragments, self.reference);
        self.fragments = fragments;
        Ok(())
    }

    fn compute_reference<G: TerrainGrid>(&self, globe: &Globe, tiles: &[G]) -> Vec3 {
        let position = self.reference_position();
        match tiles.iter().find(|t| t.contains(position)) {
            Some(tile) => tile.cartesian_at(position.lat, position.lon),
            None => globe.cartesian_at(position, 0.0),
        }
    }

    /// Total area of the current fragments in square meters; `None` until a
    /// rebuild has produced fragments.
    pub fn area(&self) -> Option<f64> {
        if self.fragments.is_empty() {
            return None;
        }
        Some(self.fragments.iter().map(SurfaceFragment::area).sum())
    }

    /// Length of the closed ring along great circles, in meters.
    pub fn perimeter(&self, globe: &Globe) -> f64 {
        let n = self.positions.len();
        let angle: f64 = (0..n)
            .map(|i| great_circle_distance(self.positions[i], self.positions[(i + 1) % n]))
            .sum();
        angle * globe.radius_at(self.reference_position())
    }

    /// Move the shape so its reference position lands on `position`, keeping
    /// each vertex's distance and azimuth from the reference. Rings crossing
    /// the antimeridian fall back to [`SurfaceShape::shift_to`].
    pub fn move_to(&mut self, position: LatLon, globe: &Globe) -> Result<(), ShapeError> {
        if ring_crosses_dateline(&self.positions) {
            return self.shift_to(position, globe);
        }
        let origin = self.reference_position();
        let moved = self
            .positions
            .iter()
            .map(|&p| {
                great_circle_end_position(
                    position,
                    great_circle_azimuth(origin, p),
                    great_circle_distance(origin, p),
                )
            })
            .collect();
        self.set_positions(moved)
    }

    /// Translate every vertex by the cartesian offset between the current
    /// reference position and `position`, then project back onto the globe.
    pub fn shift_to(&mut self, position: LatLon, globe: &Globe) -> Result<(), ShapeError> {
        let origin = globe.cartesian_at(self.reference_position(), 0.0);
        let delta = globe.cartesian_at(position, 0.0) - origin;
        let shifted = self
            .positions
            .iter()
            .map(|&p| globe.position_at(globe.cartesian_at(p, 0.0) + delta).0.normalized())
            .collect();
        self.set_positions(shifted)
    }

    pub fn move_by(&mut self, delta: LatLon, globe: &Globe) -> Result<(), ShapeError> {
        self.move_to((self.reference_position() + delta).normalized(), globe)
    }
}

fn validate(positions: &[LatLon]) -> Result<(), ShapeError> {
    if positions.len() < 3 {
        return Err(ShapeError::TooFewPositions {
            count: positions.len(),
        });
    }
    match positions.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(ShapeError::NonFiniteCoordinate { index }),
        None => Ok(()),
    }
}

fn bounding(positions: &[LatLon]) -> Sector {
    Sector::bounding(positions).unwrap_or(Sector::FULL_SPHERE)
}
