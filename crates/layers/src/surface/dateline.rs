use foundation::math::{LatLon, Vec2};

use super::{Fragment, Triangle};

const SEAM: f64 = -180.0;

/// Replace a dateline-spanning triangle by sub-triangles that each stay on
/// one side of the antimeridian. Other triangles are returned as they are.
///
/// The triangle is re-expressed west of the seam (positive longitudes minus
/// 360°) and cut at −180°. The western part is shifted back by +360° and
/// both parts are fanned from their first vertex.
pub fn split_at_dateline(triangle: &Triangle) -> Vec<Triangle> {
    if !triangle.spans_dateline {
        return vec![*triangle];
    }

    let mut east = Fragment::from_vertices(
        triangle
            .vertices
            .iter()
            .map(|v| {
                let lon = if v.lon > 0.0 { v.lon - 360.0 } else { v.lon };
                Vec2::new(lon, v.lat)
            })
            .collect(),
    );
    let west = east.split_at_longitude(SEAM);

    let mut out = Vec::with_capacity(4);
    if let Some(west) = west {
        fan(&west, 360.0, &mut out);
    }
    fan(&east, 0.0, &mut out);
    out
}

fn fan(fragment: &Fragment, lon_shift: f64, out: &mut Vec<Triangle>) {
    let to_latlon = |v: Vec2| LatLon::new(v.y, v.x + lon_shift);
    let vertices = fragment.vertices();
    if vertices.len() < 3 {
        return;
    }
    let apex = to_latlon(vertices[0]);
    for pair in vertices[1..].windows(2) {
        out.push(Triangle::new(apex, to_latlon(pair[0]), to_latlon(pair[1])));
    }
}
