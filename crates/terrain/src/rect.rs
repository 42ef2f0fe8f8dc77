use std::sync::Arc;

use foundation::bounds::Sector;
use foundation::math::{Globe, LatLon, Vec3};

use crate::{Density, GridError, Lattice, LatticeCache, TerrainGrid};

/// Rectangular terrain tile: a sector divided into `rows x columns` equal
/// cells with one elevation post per cell corner.
///
/// Posts are stored row-major starting at the south-west corner, so post
/// `(row, column)` lives at index `row * (columns + 1) + column`.
#[derive(Debug, Clone)]
pub struct RectTerrainGrid {
    globe: Globe,
    sector: Sector,
    lattice: Arc<Lattice>,
    elevations: Vec<f64>,
}

impl RectTerrainGrid {
    pub fn new(
        globe: Globe,
        sector: Sector,
        density: Density,
        elevations: Vec<f64>,
        cache: &mut LatticeCache,
    ) -> Result<Self, GridError> {
        if density.rows == 0 || density.columns == 0 {
            return Err(GridError::EmptyDensity {
                rows: density.rows,
                columns: density.columns,
            });
        }
        if !sector.is_valid() {
            return Err(GridError::InvalidSector(sector));
        }
        let expected = density.post_count();
        if elevations.len() != expected {
            return Err(GridError::PostCountMismatch {
                expected,
                actual: elevations.len(),
            });
        }
        if let Some(index) = elevations.iter().position(|e| !e.is_finite()) {
            return Err(GridError::NonFiniteElevation { index });
        }

        Ok(Self {
            globe,
            sector,
            lattice: cache.get_or_build(density),
            elevations,
        })
    }

    /// Tile with every post at the same elevation.
    pub fn flat(
        globe: Globe,
        sector: Sector,
        density: Density,
        elevation: f64,
        cache: &mut LatticeCache,
    ) -> Result<Self, GridError> {
        Self::new(globe, sector, density, vec![elevation; density.post_count()], cache)
    }

    /// Tile whose posts are sampled from `elevation(position)`.
    pub fn from_fn(
        globe: Globe,
        sector: Sector,
        density: Density,
        cache: &mut LatticeCache,
        mut elevation: impl FnMut(LatLon) -> f64,
    ) -> Result<Self, GridError> {
        let mut posts = Vec::with_capacity(density.post_count());
        for row in 0..=density.rows {
            for column in 0..=density.columns {
                let lat = sector.min_lat + sector.delta_lat() * row as f64 / density.rows.max(1) as f64;
                let lon = sector.min_lon
                    + sector.delta_lon() * column as f64 / density.columns.max(1) as f64;
                posts.push(elevation(LatLon::new(lat, lon)));
            }
        }
        Self::new(globe, sector, density, posts, cache)
    }

    pub fn globe(&self) -> &Globe {
        &self.globe
    }

    pub fn density(&self) -> Density {
        self.lattice.density()
    }

    /// Elevation post at a cell corner, if in range.
    pub fn post(&self, row: usize, column: usize) -> Option<f64> {
        let density = self.density();
        if row > density.rows || column > density.columns {
            return None;
        }
        self.elevations.get(row * (density.columns + 1) + column).copied()
    }

    /// Bilinear elevation at `position`; positions outside the tile clamp to
    /// its edges.
    pub fn elevation_at(&self, position: LatLon) -> f64 {
        let density = self.density();
        let fy = ((position.lat - self.sector.min_lat) / self.sector.delta_lat()).clamp(0.0, 1.0)
            * density.rows as f64;
        let fx = ((position.lon - self.sector.min_lon) / self.sector.delta_lon()).clamp(0.0, 1.0)
            * density.columns as f64;

        let row = (fy.floor() as usize).min(density.rows - 1);
        let column = (fx.floor() as usize).min(density.columns - 1);
        let ty = fy - row as f64;
        let tx = fx - column as f64;

        let sw = self.post(row, column).unwrap_or(0.0);
        let se = self.post(row, column + 1).unwrap_or(0.0);
        let nw = self.post(row + 1, column).unwrap_or(0.0);
        let ne = self.post(row + 1, column + 1).unwrap_or(0.0);

        let south = sw + (se - sw) * tx;
        let north = nw + (ne - nw) * tx;
        south + (north - south) * ty
    }

    fn boundary(
        min: f64,
        delta: f64,
        cells: usize,
        index: isize,
        fraction: impl Fn(usize) -> Option<f64>,
    ) -> f64 {
        if index >= 0 {
            if let Some(f) = fraction(index as usize) {
                return min + delta * f;
            }
        }
        min + delta * index as f64 / cells as f64
    }
}

impl TerrainGrid for RectTerrainGrid {
    fn min_latitude(&self) -> f64 {
        self.sector.min_lat
    }

    fn max_latitude(&self) -> f64 {
        self.sector.max_lat
    }

    fn min_longitude(&self) -> f64 {
        self.sector.min_lon
    }

    fn max_longitude(&self) -> f64 {
        self.sector.max_lon
    }

    fn row_count(&self) -> usize {
        self.density().rows
    }

    fn column_count(&self) -> usize {
        self.density().columns
    }

    fn row_at_latitude(&self, lat: f64) -> isize {
        let f = (lat - self.sector.min_lat) / self.sector.delta_lat();
        (f * self.row_count() as f64).floor() as isize
    }

    fn latitude_at_row(&self, row: isize) -> f64 {
        Self::boundary(
            self.sector.min_lat,
            self.sector.delta_lat(),
            self.row_count(),
            row,
            |r| self.lattice.row_fraction(r),
        )
    }

    fn column_at_longitude(&self, lon: f64) -> isize {
        let f = (lon - self.sector.min_lon) / self.sector.delta_lon();
        (f * self.column_count() as f64).floor() as isize
    }

    fn longitude_at_column(&self, column: isize) -> f64 {
        Self::boundary(
            self.sector.min_lon,
            self.sector.delta_lon(),
            self.column_count(),
            column,
            |c| self.lattice.column_fraction(c),
        )
    }

    fn cartesian_at(&self, lat: f64, lon: f64) -> Vec3 {
        let position = LatLon::new(lat, lon);
        self.globe.cartesian_at(position, self.elevation_at(position))
    }

    fn sector(&self) -> Sector {
        self.sector
    }
}

#[cfg(test)]
mod tests {
    use foundation::bounds::Sector;
    use foundation::math::{Globe, LatLon};
    use pretty_assertions::assert_eq;

    use super::RectTerrainGrid;
    use crate::{Density, GridError, LatticeCache, TerrainGrid};

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} != {b} (eps={eps})");
    }

    fn unit_grid(cache: &mut LatticeCache) -> RectTerrainGrid {
        RectTerrainGrid::flat(
            Globe::sphere(1.0),
            Sector::new(0.0, 10.0, 0.0, 10.0),
            Density::new(10, 10),
            0.0,
            cache,
        )
        .unwrap()
    }

    #[test]
    fn index_lookup_is_unclamped() {
        let mut cache = LatticeCache::new();
        let grid = unit_grid(&mut cache);
        assert_eq!(grid.row_at_latitude(0.0), 0);
        assert_eq!(grid.row_at_latitude(3.5), 3);
        assert_eq!(grid.row_at_latitude(-0.5), -1);
        assert_eq!(grid.row_at_latitude(10.0), 10);
        assert_eq!(grid.column_at_longitude(12.5), 12);
        assert_close(grid.latitude_at_row(-2), -2.0, 1e-12);
        assert_close(grid.longitude_at_column(10), 10.0, 0.0);
        assert_close(grid.longitude_at_column(13), 13.0, 1e-12);
    }

    #[test]
    fn bilinear_elevation_and_clamping() {
        let mut cache = LatticeCache::new();
        let grid = RectTerrainGrid::new(
            Globe::sphere(1000.0),
            Sector::new(0.0, 1.0, 0.0, 1.0),
            Density::new(1, 1),
            vec![0.0, 10.0, 20.0, 30.0],
            &mut cache,
        )
        .unwrap();
        assert_close(grid.elevation_at(LatLon::new(0.5, 0.5)), 15.0, 1e-9);
        assert_close(grid.elevation_at(LatLon::new(0.0, 1.0)), 10.0, 1e-9);
        assert_close(grid.elevation_at(LatLon::new(5.0, -5.0)), 20.0, 1e-9);

        let p = grid.cartesian_at(0.0, 0.0);
        assert_close(p.x, 1000.0, 1e-9);
    }

    #[test]
    fn sampled_slope_is_reproduced() {
        let mut cache = LatticeCache::new();
        let grid = RectTerrainGrid::from_fn(
            Globe::sphere(1000.0),
            Sector::new(0.0, 2.0, 0.0, 4.0),
            Density::new(2, 4),
            &mut cache,
            |p| 100.0 * p.lat + 10.0 * p.lon,
        )
        .unwrap();
        assert_eq!(grid.post(0, 0), Some(0.0));
        assert_eq!(grid.post(2, 4), Some(240.0));
        assert_eq!(grid.post(3, 0), None);

        // A plane survives bilinear interpolation exactly.
        assert_close(grid.elevation_at(LatLon::new(1.5, 2.5)), 175.0, 1e-9);
        assert_close(grid.elevation_at(LatLon::new(0.25, 3.75)), 62.5, 1e-9);

        assert_close(grid.cartesian_at(0.0, 0.0).x, 1000.0, 1e-9);
        assert_close(grid.cartesian_at(2.0, 4.0).length(), 1240.0, 1e-9);
        assert_close(grid.cartesian_at(1.0, 1.0).length(), 1110.0, 1e-9);
    }

    #[test]
    fn rejects_bad_inputs() {
        let mut cache = LatticeCache::new();
        let globe = Globe::sphere(1.0);
        let sector = Sector::new(0.0, 1.0, 0.0, 1.0);

        let err = RectTerrainGrid::new(globe, sector, Density::new(1, 1), vec![0.0; 3], &mut cache)
            .unwrap_err();
        assert_eq!(err, GridError::PostCountMismatch { expected: 4, actual: 3 });

        let err = RectTerrainGrid::flat(globe, sector, Density::new(0, 1), 0.0, &mut cache).unwrap_err();
        assert_eq!(err, GridError::EmptyDensity { rows: 0, columns: 1 });

        let err = RectTerrainGrid::new(
            globe,
            sector,
            Density::new(1, 1),
            vec![0.0, f64::NAN, 0.0, 0.0],
            &mut cache,
        )
        .unwrap_err();
        assert_eq!(err, GridError::NonFiniteElevation { index: 1 });

        let flipped = Sector::new(1.0, 0.0, 0.0, 1.0);
        assert!(matches!(
            RectTerrainGrid::flat(globe, flipped, Density::new(1, 1), 0.0, &mut cache),
            Err(GridError::InvalidSector(_))
        ));
    }

    #[test]
    fn grids_share_lattices() {
        let mut cache = LatticeCache::new();
        let _a = unit_grid(&mut cache);
        let _b = unit_grid(&mut cache);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);
    }
}
