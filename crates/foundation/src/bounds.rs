use crate::math::{LatLon, ring_crosses_dateline};

/// Geographic bounding box in degrees. Bounds are inclusive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sector {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Sector {
    pub const FULL_SPHERE: Sector = Sector::new(-90.0, 90.0, -180.0, 180.0);

    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Sector {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Smallest sector holding every location. A set whose ring crosses the
    /// antimeridian gets the full longitude range, since a min/max box would
    /// wrap the wrong way around the globe.
    pub fn bounding(locations: &[LatLon]) -> Option<Sector> {
        let first = locations.first()?;
        let mut sector = Sector::new(first.lat, first.lat, first.lon, first.lon);
        for p in &locations[1..] {
            sector.min_lat = sector.min_lat.min(p.lat);
            sector.max_lat = sector.max_lat.max(p.lat);
            sector.min_lon = sector.min_lon.min(p.lon);
            sector.max_lon = sector.max_lon.max(p.lon);
        }
        if ring_crosses_dateline(locations) {
            sector.min_lon = -180.0;
            sector.max_lon = 180.0;
        }
        Some(sector)
    }

    pub fn is_valid(&self) -> bool {
        self.min_lat.is_finite()
            && self.max_lat.is_finite()
            && self.min_lon.is_finite()
            && self.max_lon.is_finite()
            && self.min_lat < self.max_lat
            && self.min_lon < self.max_lon
    }

    pub fn delta_lat(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn delta_lon(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn centroid(&self) -> LatLon {
        LatLon::new(
            0.5 * (self.min_lat + self.max_lat),
            0.5 * (self.min_lon + self.max_lon),
        )
    }

    pub fn contains(&self, p: LatLon) -> bool {
        p.lat >= self.min_lat && p.lat <= self.max_lat && p.lon >= self.min_lon && p.lon <= self.max_lon
    }

    pub fn intersects(&self, other: &Sector) -> bool {
        !(other.min_lat > self.max_lat
            || other.max_lat < self.min_lat
            || other.min_lon > self.max_lon
            || other.max_lon < self.min_lon)
    }
}
