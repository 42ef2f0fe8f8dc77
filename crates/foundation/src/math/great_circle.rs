//! Great-circle navigation on the unit sphere. Distances are central angles
//! in radians; azimuths are radians clockwise from north.

use super::LatLon;

/// Central angle between two locations (haversine).
pub fn great_circle_distance(a: LatLon, b: LatLon) -> f64 {
    let (lat1, lat2) = (a.lat_rad(), b.lat_rad());
    let dlat = lat2 - lat1;
    let dlon = b.lon_rad() - a.lon_rad();

    let s_lat = (dlat / 2.0).sin();
    let s_lon = (dlon / 2.0).sin();
    let h = s_lat * s_lat + lat1.cos() * lat2.cos() * s_lon * s_lon;
    2.0 * h.sqrt().min(1.0).asin()
}

/// Initial azimuth of the great circle from `a` to `b`.
pub fn great_circle_azimuth(a: LatLon, b: LatLon) -> f64 {
    let (lat1, lat2) = (a.lat_rad(), b.lat_rad());
    let dlon = b.lon_rad() - a.lon_rad();
    if a.approx_eq(b, 1e-12) {
        return 0.0;
    }

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    y.atan2(x)
}

/// Location reached by travelling `distance` (radians) from `start` along
/// `azimuth`.
pub fn great_circle_end_position(start: LatLon, azimuth: f64, distance: f64) -> LatLon {
    if distance == 0.0 {
        return start;
    }
    let lat = start.lat_rad();
    let lon = start.lon_rad();

    let end_lat = (lat.sin() * distance.cos() + lat.cos() * distance.sin() * azimuth.cos()).asin();
    let end_lon = lon
        + (azimuth.sin() * distance.sin() * lat.cos())
            .atan2(distance.cos() - lat.sin() * end_lat.sin());

    LatLon::from_radians(end_lat, end_lon).normalized()
}
