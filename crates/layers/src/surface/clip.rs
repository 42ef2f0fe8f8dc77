use foundation::math::Vec2;

use super::EPSILON;

/// Upper bound on the vertex count of any fragment the scan converter emits.
pub const MAX_FRAGMENT_VERTICES: usize = 6;

/// Orientation of a clipping plane.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    /// Constant-longitude plane (`x = value`).
    Longitude,
    /// Constant-latitude plane (`y = value`).
    Latitude,
}

impl Axis {
    fn coordinate(self, v: Vec2) -> f64 {
        match self {
            Axis::Longitude => v.x,
            Axis::Latitude => v.y,
        }
    }

    fn crossing(self, a: Vec2, b: Vec2, value: f64) -> Option<Vec2> {
        let (ca, cb) = (self.coordinate(a), self.coordinate(b));
        let straddles = (ca < value && cb > value) || (ca > value && cb < value);
        let delta = cb - ca;
        if !straddles || delta.abs() < EPSILON {
            return None;
        }
        let t = (value - ca) / delta;
        Some(match self {
            Axis::Longitude => Vec2::new(value, a.y + t * (b.y - a.y)),
            Axis::Latitude => Vec2::new(a.x + t * (b.x - a.x), value),
        })
    }
}

/// Convex polygon in the `(longitude, latitude)` plane.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    vertices: Vec<Vec2>,
}

impl Fragment {
    pub fn from_vertices(vertices: Vec<Vec2>) -> Self {
        Self { vertices }
    }

    pub fn push(&mut self, vertex: Vec2) {
        self.vertices.push(vertex);
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Unsigned shoelace area in square degrees.
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0.0;
        for i in 0..n {
            twice += self.vertices[i].perp_dot(self.vertices[(i + 1) % n]);
        }
        0.5 * twice.abs()
    }

    /// `(min, max)` corners of the axis-aligned bounding box.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let first = *self.vertices.first()?;
        Some(self.vertices[1..].iter().fold((first, first), |(lo, hi), v| {
            (
                Vec2::new(lo.x.min(v.x), lo.y.min(v.y)),
                Vec2::new(hi.x.max(v.x), hi.y.max(v.y)),
            )
        }))
    }

    /// Vertex average.
    pub fn centroid(&self) -> Option<Vec2> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self.vertices.iter().fold(Vec2::default(), |acc, v| acc + *v);
        let n = self.vertices.len() as f64;
        Some(Vec2::new(sum.x / n, sum.y / n))
    }

    /// Collapse consecutive coincident vertices, including the wrap from the
    /// last vertex to the first.
    pub fn dedup(&mut self) {
        self.vertices.dedup_by(|b, a| a.approx_eq(*b, EPSILON));
        while self.vertices.len() > 1 {
            let first = self.vertices[0];
            let last = self.vertices[self.vertices.len() - 1];
            if !first.approx_eq(last, EPSILON) {
                break;
            }
            self.vertices.pop();
        }
    }

    pub fn split_at_longitude(&mut self, lon: f64) -> Option<Fragment> {
        self.split_at(Axis::Longitude, lon)
    }

    /// Cut the fragment with the plane `axis = value`.
    ///
    /// Afterwards `self` holds the part above the plane (east for longitude,
    /// north for latitude) and the part below it is returned. Edge crossings
    /// are copied into both parts; vertices on the plane belong to both. A
    /// side without any vertex strictly on it is empty: `None` for the lower
    /// part, no vertices left in `self` for the upper one.
    pub fn split_at(&mut self, axis: Axis, value: f64) -> Option<Fragment> {
        let n = self.vertices.len();
        let mut lower = Vec::with_capacity(n + 2);
        let mut upper = Vec::with_capacity(n + 2);
        let mut any_lower = false;
        let mut any_upper = false;

        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = axis.coordinate(a);

            if c < value {
                lower.push(a);
                any_lower = true;
            } else if c > value {
                upper.push(a);
                any_upper = true;
            } else {
                lower.push(a);
                upper.push(a);
            }

            if let Some(p) = axis.crossing(a, b, value) {
                lower.push(p);
                upper.push(p);
            }
        }

        self.vertices = if any_upper { upper } else { Vec::new() };
        any_lower.then(|| Fragment::from_vertices(lower))
    }
}
