/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// Geographic location in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn from_radians(lat_rad: f64, lon_rad: f64) -> Self {
        Self::new(lat_rad.to_degrees(), lon_rad.to_degrees())
    }

    pub fn lat_rad(self) -> f64 {
        self.lat.to_radians()
    }

    pub fn lon_rad(self) -> f64 {
        self.lon.to_radians()
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Folds latitude into [-90, 90] and longitude into [-180, 180].
    pub fn normalized(self) -> Self {
        Self::new(normalize_latitude(self.lat), normalize_longitude(self.lon))
    }

    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.lat - other.lat).abs() <= eps && (self.lon - other.lon).abs() <= eps
    }
}

impl std::ops::Add for LatLon {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.lat + other.lat, self.lon + other.lon)
    }
}

pub fn normalize_longitude(lon: f64) -> f64 {
    let lon = lon % 360.0;
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

pub fn normalize_latitude(lat: f64) -> f64 {
    let lat = lat % 180.0;
    if lat > 90.0 {
        180.0 - lat
    } else if lat < -90.0 {
        -180.0 - lat
    } else {
        lat
    }
}

/// True when the short way between `a` and `b` passes through the ±180° meridian.
pub fn crosses_longitude_boundary(a: LatLon, b: LatLon) -> bool {
    (a.lon - b.lon).abs() > 180.0
}

/// True when any edge of the closed ring crosses the ±180° meridian.
pub fn ring_crosses_dateline(ring: &[LatLon]) -> bool {
    if ring.len() < 2 {
        return false;
    }
    let closing = (ring[ring.len() - 1], ring[0]);
    ring.windows(2)
        .map(|w| (w[0], w[1]))
        .chain(std::iter::once(closing))
        .any(|(a, b)| crosses_longitude_boundary(a, b))
}
