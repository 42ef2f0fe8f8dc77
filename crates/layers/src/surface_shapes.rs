use foundation::math::Globe;
use runtime::Frame;
use serde::Serialize;
use tracing::debug;

use crate::layer::{Layer, LayerId};
use crate::surface::{SurfaceDrawBuffer, SurfaceShape};
use crate::symbology::LayerStyle;
use crate::terrain::TerrainLayer;

/// Per-frame outcome of [`SurfaceShapeLayer::update`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LayerUpdate {
    pub rebuilt: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Collection of surface shapes draped over one terrain layer.
#[derive(Debug, Clone)]
pub struct SurfaceShapeLayer {
    id: LayerId,
    pub style: LayerStyle,
    shapes: Vec<SurfaceShape>,
    terrain_generation: Option<u64>,
}

impl SurfaceShapeLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            style: LayerStyle::default(),
            shapes: Vec::new(),
            terrain_generation: None,
        }
    }

    /// Add a shape; returns its index.
    pub fn push(&mut self, shape: SurfaceShape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    pub fn shapes(&self) -> &[SurfaceShape] {
        &self.shapes
    }

    pub fn shape_mut(&mut self, index: usize) -> Option<&mut SurfaceShape> {
        self.shapes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Give every shape the chance to rebuild against the current terrain.
    /// A change of the terrain tile set invalidates every shape.
    pub fn update(&mut self, frame: &Frame, globe: &Globe, terrain: &TerrainLayer) -> LayerUpdate {
        let mut report = LayerUpdate::default();
        if !self.style.visible {
            report.skipped = self.shapes.len();
            return report;
        }

        if self.terrain_generation != Some(terrain.generation()) {
            if self.terrain_generation.is_some() {
                debug!(
                    "terrain generation {} -> {}, invalidating {} shapes",
                    self.terrain_generation.unwrap_or_default(),
                    terrain.generation(),
                    self.shapes.len()
                );
                self.shapes.iter_mut().for_each(SurfaceShape::invalidate);
            }
            self.terrain_generation = Some(terrain.generation());
        }

        for shape in &mut self.shapes {
            let tiles = terrain.intersecting(&shape.sector());
            match shape.update(frame.time, globe, &tiles) {
                Ok(true) => report.rebuilt += 1,
                Ok(false) => report.skipped += 1,
                Err(_) => report.failed += 1,
            }
        }
        report
    }

    /// Draw buffers of the shapes whose interior is drawn, by shape index.
    pub fn draw_buffers(&self) -> impl Iterator<Item = (usize, &SurfaceDrawBuffer)> {
        let visible = self.style.visible;
        self.shapes
            .iter()
            .enumerate()
            .filter(move |(_, s)| visible && s.style.draw_interior)
            .map(|(i, s)| (i, s.draw_buffer()))
    }
}

impl Layer for SurfaceShapeLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn style(&self) -> &LayerStyle {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use foundation::bounds::Sector;
    use foundation::math::{Globe, LatLon};
    use pretty_assertions::assert_eq;
    use runtime::FrameClock;
    use terrain::{Density, LatticeCache, RectTerrainGrid};

    use super::{LayerUpdate, SurfaceShapeLayer};
    use crate::surface::SurfaceShape;
    use crate::terrain::TerrainLayer;

    fn terrain(cache: &mut LatticeCache) -> TerrainLayer {
        let mut layer = TerrainLayer::new(1);
        layer.push(
            RectTerrainGrid::flat(
                Globe::sphere(6_371_000.0),
                Sector::new(0.0, 10.0, 0.0, 10.0),
                Density::new(4, 4),
                100.0,
                cache,
            )
            .unwrap(),
        );
        layer
    }

    fn triangle_shape(offset: f64) -> SurfaceShape {
        SurfaceShape::new(vec![
            LatLon::new(1.0 + offset, 1.0),
            LatLon::new(1.0 + offset, 4.0),
            LatLon::new(3.0 + offset, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn frames_drive_throttled_rebuilds() {
        let globe = Globe::sphere(6_371_000.0);
        let mut cache = LatticeCache::new();
        let mut terrain = terrain(&mut cache);
        let mut layer = SurfaceShapeLayer::new(2);
        layer.push(triangle_shape(0.0));
        layer.push(triangle_shape(4.0));

        let mut clock = FrameClock::new(0.4);
        let updates: Vec<LayerUpdate> = (0..4)
            .map(|_| layer.update(&clock.tick(), &globe, &terrain))
            .collect();
        // t = 0.0, 0.4, 0.8, 1.2
        assert_eq!(updates[0].rebuilt, 2);
        assert_eq!(updates[1].skipped, 2);
        assert_eq!(updates[2].skipped, 2);
        assert_eq!(updates[3].rebuilt, 2);
        assert_eq!(layer.draw_buffers().count(), 2);

        terrain.push(
            RectTerrainGrid::flat(
                Globe::sphere(6_371_000.0),
                Sector::new(10.0, 20.0, 0.0, 10.0),
                Density::new(4, 4),
                0.0,
                &mut cache,
            )
            .unwrap(),
        );
        let after = layer.update(&clock.tick(), &globe, &terrain);
        assert_eq!(after.rebuilt, 2);
    }

    #[test]
    fn hidden_layer_skips_work() {
        let globe = Globe::sphere(6_371_000.0);
        let mut cache = LatticeCache::new();
        let terrain = terrain(&mut cache);
        let mut layer = SurfaceShapeLayer::new(2);
        layer.push(triangle_shape(0.0));
        layer.style.visible = false;

        let update = layer.update(&FrameClock::new(0.1).tick(), &globe, &terrain);
        assert_eq!(
            update,
            LayerUpdate {
                rebuilt: 0,
                skipped: 1,
                failed: 0
            }
        );
        assert_eq!(layer.draw_buffers().count(), 0);
        assert!(layer.shapes()[0].fragments().is_empty());
    }
}
