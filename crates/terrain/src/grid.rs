use foundation::bounds::Sector;
use foundation::math::{LatLon, Vec3};

/// Read-only view of one terrain tile: a regular lattice of latitude rows and
/// longitude columns plus a point lookup that follows the tile's elevations.
///
/// Row `r` spans `latitude_at_row(r)..latitude_at_row(r + 1)`; column `c`
/// spans `longitude_at_column(c)..longitude_at_column(c + 1)`. Index lookups
/// are unclamped: positions south/west of the tile map to negative indices,
/// positions north/east of it to indices `>= row_count()/column_count()`.
pub trait TerrainGrid {
    fn min_latitude(&self) -> f64;
    fn max_latitude(&self) -> f64;
    fn min_longitude(&self) -> f64;
    fn max_longitude(&self) -> f64;

    fn row_count(&self) -> usize;
    fn column_count(&self) -> usize;

    fn row_at_latitude(&self, lat: f64) -> isize;
    fn latitude_at_row(&self, row: isize) -> f64;
    fn column_at_longitude(&self, lon: f64) -> isize;
    fn longitude_at_column(&self, column: isize) -> f64;

    /// Cartesian point on the terrain surface at (`lat`, `lon`), degrees.
    fn cartesian_at(&self, lat: f64, lon: f64) -> Vec3;

    fn sector(&self) -> Sector {
        Sector::new(
            self.min_latitude(),
            self.max_latitude(),
            self.min_longitude(),
            self.max_longitude(),
        )
    }

    fn contains(&self, position: LatLon) -> bool {
        self.sector().contains(position)
    }
}

impl<T: TerrainGrid + ?Sized> TerrainGrid for &T {
    fn min_latitude(&self) -> f64 {
        (**self).min_latitude()
    }

    fn max_latitude(&self) -> f64 {
        (**self).max_latitude()
    }

    fn min_longitude(&self) -> f64 {
        (**self).min_longitude()
    }

    fn max_longitude(&self) -> f64 {
        (**self).max_longitude()
    }

    fn row_count(&self) -> usize {
        (**self).row_count()
    }

    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn row_at_latitude(&self, lat: f64) -> isize {
        (**self).row_at_latitude(lat)
    }

    fn latitude_at_row(&self, row: isize) -> f64 {
        (**self).latitude_at_row(row)
    }

    fn column_at_longitude(&self, lon: f64) -> isize {
        (**self).column_at_longitude(lon)
    }

    fn longitude_at_column(&self, column: isize) -> f64 {
        (**self).longitude_at_column(column)
    }

    fn cartesian_at(&self, lat: f64, lon: f64) -> Vec3 {
        (**self).cartesian_at(lat, lon)
    }
}
