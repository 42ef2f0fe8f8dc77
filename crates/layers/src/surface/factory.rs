//! Ring generators for common shapes. Lengths are meters on the globe's
//! surface; orientations are degrees counter-clockwise from east, so an
//! unrotated shape has its first axis pointing east.

use std::f64::consts::{FRAC_PI_2, TAU};

use foundation::math::{Globe, LatLon, great_circle_end_position};

use super::ShapeError;

/// Fewest intervals an ellipse ring is built with.
pub const MIN_ELLIPSE_INTERVALS: usize = 4;

/// Closed ellipse ring around `center`. `major_radius` lies at azimuth
/// `90° - orientation_deg`, `minor_radius` perpendicular to it. The ring has
/// `max(intervals, 4) + 1` vertices, the last one repeating the first.
pub fn ellipse_ring(
    globe: &Globe,
    center: LatLon,
    major_radius: f64,
    minor_radius: f64,
    orientation_deg: f64,
    intervals: usize,
) -> Result<Vec<LatLon>, ShapeError> {
    positive("major_radius", major_radius)?;
    positive("minor_radius", minor_radius)?;
    check_center(center)?;

    let count = 1 + intervals.max(MIN_ELLIPSE_INTERVALS);
    let radius = globe.radius_at(center);
    let step = TAU / (count - 1) as f64;
    let orientation = orientation_deg.to_radians();

    let ring = (0..count)
        .map(|i| {
            let angle = if i + 1 == count { 0.0 } else { i as f64 * step };
            let azimuth = FRAC_PI_2 - (angle + orientation);
            let x = major_radius * angle.cos();
            let y = minor_radius * angle.sin();
            great_circle_end_position(center, azimuth, x.hypot(y) / radius)
        })
        .collect();
    Ok(ring)
}

pub fn circle_ring(
    globe: &Globe,
    center: LatLon,
    radius: f64,
    intervals: usize,
) -> Result<Vec<LatLon>, ShapeError> {
    positive("radius", radius)?;
    ellipse_ring(globe, center, radius, radius, 0.0, intervals)
}

/// Closed rectangle of `width` x `height` centered on `center`, with the
/// width axis rotated counter-clockwise from east by `orientation_deg`.
pub fn quad_ring(
    globe: &Globe,
    center: LatLon,
    width: f64,
    height: f64,
    orientation_deg: f64,
) -> Result<Vec<LatLon>, ShapeError> {
    positive("width", width)?;
    positive("height", height)?;
    check_center(center)?;

    let (hw, hh) = (0.5 * width, 0.5 * height);
    let corners = [
        hh.atan2(hw),
        hh.atan2(-hw),
        (-hh).atan2(-hw),
        (-hh).atan2(hw),
        hh.atan2(hw),
    ];
    let distance = hw.hypot(hh) / globe.radius_at(center);
    let orientation = orientation_deg.to_radians();

    Ok(corners
        .iter()
        .map(|angle| great_circle_end_position(center, FRAC_PI_2 - (angle + orientation), distance))
        .collect())
}

fn positive(name: &'static str, value: f64) -> Result<(), ShapeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ShapeError::InvalidDimension { name, value })
    }
}

fn check_center(center: LatLon) -> Result<(), ShapeError> {
    if center.is_finite() {
        Ok(())
    } else {
        Err(ShapeError::NonFiniteCoordinate { index: 0 })
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use foundation::math::{Globe, LatLon, great_circle_azimuth, great_circle_distance};
    use pretty_assertions::assert_eq;

    use super::{circle_ring, ellipse_ring, quad_ring};
    use crate::surface::ShapeError;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} != {b} (eps={eps})");
    }

    fn assert_same_direction(a: f64, b: f64) {
        assert_close(a.sin(), b.sin(), 1e-9);
        assert_close(a.cos(), b.cos(), 1e-9);
    }

    #[test]
    fn circle_vertices_sit_on_the_radius() {
        let globe = Globe::sphere(6_371_000.0);
        let center = LatLon::new(35.0, -100.0);
        let ring = circle_ring(&globe, center, 50_000.0, 16).unwrap();

        assert_eq!(ring.len(), 17);
        assert_eq!(ring[0], ring[16]);
        let step = std::f64::consts::TAU / 16.0;
        for (i, p) in ring[..16].iter().enumerate() {
            assert_close(great_circle_distance(center, *p), 50_000.0 / 6_371_000.0, 1e-12);
            assert_same_direction(great_circle_azimuth(center, *p), FRAC_PI_2 - i as f64 * step);
        }
    }

    #[test]
    fn ellipse_axes_follow_orientation() {
        let globe = Globe::sphere(1_000_000.0);
        let center = LatLon::new(0.0, 0.0);
        let ring = ellipse_ring(&globe, center, 20_000.0, 10_000.0, 30.0, 8).unwrap();

        assert_eq!(ring.len(), 9);
        // Major axis 30° counter-clockwise from east, i.e. azimuth 60°; the
        // minor axis a quarter turn further.
        assert_close(great_circle_distance(center, ring[0]), 0.02, 1e-12);
        assert_same_direction(great_circle_azimuth(center, ring[0]), FRAC_PI_2 - 30f64.to_radians());
        assert_close(great_circle_distance(center, ring[2]), 0.01, 1e-12);

        let few = ellipse_ring(&globe, center, 2.0, 1.0, 0.0, 1).unwrap();
        assert_eq!(few.len(), 5);
    }

    #[test]
    fn quad_corners_are_equidistant() {
        let globe = Globe::sphere(1_000_000.0);
        let center = LatLon::new(10.0, 20.0);
        let ring = quad_ring(&globe, center, 6_000.0, 8_000.0, 0.0).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        for p in &ring {
            assert_close(great_circle_distance(center, *p), 5_000.0 / 1_000_000.0, 1e-12);
        }
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        let globe = Globe::sphere(1.0);
        let center = LatLon::new(0.0, 0.0);
        assert_eq!(
            ellipse_ring(&globe, center, -1.0, 1.0, 0.0, 8).unwrap_err(),
            ShapeError::InvalidDimension {
                name: "major_radius",
                value: -1.0
            }
        );
        assert!(matches!(
            quad_ring(&globe, center, 1.0, f64::NAN, 0.0),
            Err(ShapeError::InvalidDimension { name: "height", .. })
        ));
        assert!(matches!(
            circle_ring(&globe, center, 0.0, 8),
            Err(ShapeError::InvalidDimension { name: "radius", .. })
        ));
    }
}
