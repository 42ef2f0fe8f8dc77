use super::{LatLon, Vec3, WGS84_A, WGS84_B};

/// Ellipsoid of revolution used to place geographic positions in
/// Earth-centered, Earth-fixed coordinates (meters). `x` points at (0°, 0°),
/// `y` at (0°, 90°E) and `z` at the north pole.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Globe {
    equatorial_radius: f64,
    polar_radius: f64,
}

impl Globe {
    pub fn wgs84() -> Self {
        Self::ellipsoid(WGS84_A, WGS84_B)
    }

    pub fn sphere(radius: f64) -> Self {
        Self::ellipsoid(radius, radius)
    }

    pub fn ellipsoid(equatorial_radius: f64, polar_radius: f64) -> Self {
        Self {
            equatorial_radius,
            polar_radius,
        }
    }

    pub fn equatorial_radius(&self) -> f64 {
        self.equatorial_radius
    }

    pub fn polar_radius(&self) -> f64 {
        self.polar_radius
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        let a2 = self.equatorial_radius * self.equatorial_radius;
        let b2 = self.polar_radius * self.polar_radius;
        (a2 - b2) / a2
    }

    /// Second eccentricity squared.
    fn ep2(&self) -> f64 {
        let a2 = self.equatorial_radius * self.equatorial_radius;
        let b2 = self.polar_radius * self.polar_radius;
        (a2 - b2) / b2
    }

    pub fn cartesian_at(&self, position: LatLon, elevation: f64) -> Vec3 {
        let (sin_lat, cos_lat) = position.lat_rad().sin_cos();
        let (sin_lon, cos_lon) = position.lon_rad().sin_cos();

        let e2 = self.e2();
        let n = self.equatorial_radius / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let x = (n + elevation) * cos_lat * cos_lon;
        let y = (n + elevation) * cos_lat * sin_lon;
        let z = (n * (1.0 - e2) + elevation) * sin_lat;

        Vec3::new(x, y, z)
    }

    /// Inverse of [`Globe::cartesian_at`]: geographic position and elevation
    /// (Bowring's closed form).
    pub fn position_at(&self, point: Vec3) -> (LatLon, f64) {
        let a = self.equatorial_radius;
        let b = self.polar_radius;
        let p = (point.x * point.x + point.y * point.y).sqrt();
        let lon = point.y.atan2(point.x);

        if p < 1e-9 {
            let lat = if point.z >= 0.0 { 90.0 } else { -90.0 };
            return (LatLon::new(lat, 0.0), point.z.abs() - b);
        }

        let theta = (point.z * a).atan2(p * b);
        let (sin_theta, cos_theta) = theta.sin_cos();

        let lat = (point.z + self.ep2() * b * sin_theta * sin_theta * sin_theta)
            .atan2(p - self.e2() * a * cos_theta * cos_theta * cos_theta);

        let sin_lat = lat.sin();
        let n = a / (1.0 - self.e2() * sin_lat * sin_lat).sqrt();
        let elevation = p / lat.cos() - n;

        (LatLon::from_radians(lat, lon), elevation)
    }

    /// Distance from the globe center to the surface at `position`.
    pub fn radius_at(&self, position: LatLon) -> f64 {
        self.cartesian_at(position, 0.0).length()
    }
}

impl Default for Globe {
    fn default() -> Self {
        Self::wgs84()
    }
}
