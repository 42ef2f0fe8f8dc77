use foundation::bounds::Sector;
use terrain::{RectTerrainGrid, TerrainGrid};

use crate::layer::{Layer, LayerId};
use crate::symbology::LayerStyle;

/// Registry of the terrain tiles currently tessellated for the globe.
///
/// `generation` changes whenever the tile set changes, so dependents can
/// tell stale geometry from current geometry without comparing tiles.
#[derive(Debug, Clone)]
pub struct TerrainLayer {
    id: LayerId,
    pub style: LayerStyle,
    grids: Vec<RectTerrainGrid>,
    generation: u64,
}

impl TerrainLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            style: LayerStyle::default(),
            grids: Vec::new(),
            generation: 0,
        }
    }

    pub fn push(&mut self, grid: RectTerrainGrid) {
        self.grids.push(grid);
        self.generation += 1;
    }

    pub fn replace_grids(&mut self, grids: Vec<RectTerrainGrid>) {
        self.grids = grids;
        self.generation += 1;
    }

    pub fn grids(&self) -> &[RectTerrainGrid] {
        &self.grids
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tiles whose sector overlaps `sector`.
    pub fn intersecting(&self, sector: &Sector) -> Vec<&RectTerrainGrid> {
        self.grids
            .iter()
            .filter(|g| g.sector().intersects(sector))
            .collect()
    }
}

impl Layer for TerrainLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn style(&self) -> &LayerStyle {
        &self.style
    }
}
