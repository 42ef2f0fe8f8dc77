use earcutr::earcut;
use foundation::math::{LatLon, Vec2, crosses_longitude_boundary, ring_crosses_dateline};
use serde::{Deserialize, Serialize};

use super::EPSILON;

/// Planar triangle in geographic coordinates.
///
/// `spans_dateline` is derived from the vertices: it is set when any edge has
/// a longitude delta above 180°, which means the short way between the two
/// endpoints crosses the antimeridian.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [LatLon; 3],
    pub spans_dateline: bool,
}

impl Triangle {
    pub fn new(a: LatLon, b: LatLon, c: LatLon) -> Self {
        let mut triangle = Self {
            vertices: [a, b, c],
            spans_dateline: false,
        };
        triangle.update_dateline_flag();
        triangle
    }

    pub fn update_dateline_flag(&mut self) {
        let [a, b, c] = self.vertices;
        self.spans_dateline = crosses_longitude_boundary(a, b)
            || crosses_longitude_boundary(b, c)
            || crosses_longitude_boundary(c, a);
    }

    /// Vertices as `(longitude, latitude)` plane points.
    pub fn planar_vertices(&self) -> [Vec2; 3] {
        self.vertices.map(|v| Vec2::new(v.lon, v.lat))
    }

    /// Unsigned area in square degrees of the `(longitude, latitude)` plane.
    pub fn planar_area(&self) -> f64 {
        let [a, b, c] = self.planar_vertices();
        0.5 * (b - a).perp_dot(c - a).abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriangulationError {
    TooFewVertices { count: usize },
    Decomposition,
    Empty,
}

impl std::fmt::Display for TriangulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriangulationError::TooFewVertices { count } => {
                write!(f, "ring needs at least 3 distinct vertices, got {count}")
            }
            TriangulationError::Decomposition => write!(f, "polygon decomposition failed"),
            TriangulationError::Empty => write!(f, "polygon decomposition produced no triangles"),
        }
    }
}

impl std::error::Error for TriangulationError {}

/// How a raw vertex stream closes into triangles.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimitiveMode {
    Triangles,
    TriangleFan,
    TriangleStrip,
}

/// Turns a stream of vertices into triangles. Every time three vertices are
/// pending a triangle is emitted and the pending set is reseeded according to
/// the primitive mode.
#[derive(Debug, Clone)]
pub struct TriangleAssembler {
    mode: PrimitiveMode,
    pending: Vec<LatLon>,
    flip: bool,
    triangles: Vec<Triangle>,
}

impl TriangleAssembler {
    pub fn new(mode: PrimitiveMode) -> Self {
        Self {
            mode,
            pending: Vec::with_capacity(3),
            flip: false,
            triangles: Vec::new(),
        }
    }

    pub fn push(&mut self, vertex: LatLon) {
        self.pending.push(vertex);
        if self.pending.len() < 3 {
            return;
        }

        let (a, b, c) = (self.pending[0], self.pending[1], self.pending[2]);
        self.triangles.push(Triangle::new(a, b, c));
        self.pending.clear();
        match self.mode {
            PrimitiveMode::Triangles => {}
            PrimitiveMode::TriangleFan => self.pending.extend([a, c]),
            PrimitiveMode::TriangleStrip => {
                if self.flip {
                    self.pending.extend([a, c]);
                } else {
                    self.pending.extend([c, b]);
                }
                self.flip = !self.flip;
            }
        }
    }

    /// Completed triangles; an incomplete trailing triangle is dropped.
    pub fn finish(self) -> Vec<Triangle> {
        self.triangles
    }
}

/// Decomposes an outer ring into planar triangles.
pub trait Triangulator {
    fn triangulate(&self, ring: &[LatLon]) -> Result<Vec<Triangle>, TriangulationError>;
}

/// Ear clipping; handles concave rings.
#[derive(Debug, Copy, Clone, Default)]
pub struct EarcutTriangulator;

impl Triangulator for EarcutTriangulator {
    fn triangulate(&self, ring: &[LatLon]) -> Result<Vec<Triangle>, TriangulationError> {
        let ring = planar_ring(ring)?;
        let coords: Vec<f64> = ring.iter().flat_map(|p| [p.lon, p.lat]).collect();
        let holes: Vec<usize> = Vec::new();
        let indices = earcut(&coords, &holes, 2).map_err(|_| TriangulationError::Decomposition)?;

        let mut assembler = TriangleAssembler::new(PrimitiveMode::Triangles);
        for idx in indices {
            let vertex = ring.get(idx).ok_or(TriangulationError::Decomposition)?;
            assembler.push(vertex.normalized());
        }
        non_empty(assembler.finish())
    }
}

/// Fan from the first vertex. Only correct for convex rings.
#[derive(Debug, Copy, Clone, Default)]
pub struct FanTriangulator;

impl Triangulator for FanTriangulator {
    fn triangulate(&self, ring: &[LatLon]) -> Result<Vec<Triangle>, TriangulationError> {
        let ring = planar_ring(ring)?;
        let mut assembler = TriangleAssembler::new(PrimitiveMode::TriangleFan);
        for vertex in ring {
            assembler.push(vertex.normalized());
        }
        non_empty(assembler.finish())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriangulationStrategy {
    #[default]
    Earcut,
    Fan,
}

impl Triangulator for TriangulationStrategy {
    fn triangulate(&self, ring: &[LatLon]) -> Result<Vec<Triangle>, TriangulationError> {
        match self {
            TriangulationStrategy::Earcut => EarcutTriangulator.triangulate(ring),
            TriangulationStrategy::Fan => FanTriangulator.triangulate(ring),
        }
    }
}

fn non_empty(triangles: Vec<Triangle>) -> Result<Vec<Triangle>, TriangulationError> {
    if triangles.is_empty() {
        return Err(TriangulationError::Empty);
    }
    Ok(triangles)
}

/// Ring prepared for planar triangulation: repeated and closing vertices
/// removed, longitudes unwrapped west of the antimeridian when the ring
/// crosses it.
fn planar_ring(ring: &[LatLon]) -> Result<Vec<LatLon>, TriangulationError> {
    let mut out: Vec<LatLon> = Vec::with_capacity(ring.len());
    for &p in ring {
        if out.last().is_some_and(|last| last.approx_eq(p, EPSILON)) {
            continue;
        }
        out.push(p);
    }
    while out.len() > 1 && out[0].approx_eq(out[out.len() - 1], EPSILON) {
        out.pop();
    }
    if out.len() < 3 {
        return Err(TriangulationError::TooFewVertices { count: out.len() });
    }

    if ring_crosses_dateline(&out) {
        for p in &mut out {
            if p.lon > 0.0 {
                p.lon -= 360.0;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use foundation::math::LatLon;
    use pretty_assertions::assert_eq;

    use super::{
        EarcutTriangulator, FanTriangulator, PrimitiveMode, Triangle, TriangleAssembler,
        TriangulationError, TriangulationStrategy, Triangulator,
    };

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} != {b} (eps={eps})");
    }

    fn shoelace(ring: &[LatLon]) -> f64 {
        let n = ring.len();
        let mut twice = 0.0;
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            twice += a.lon * b.lat - b.lon * a.lat;
        }
        0.5 * twice.abs()
    }

    fn convex_ring() -> Vec<LatLon> {
        vec![
            LatLon::new(0.0, 0.0),
            LatLon::new(-1.0, 4.0),
            LatLon::new(1.0, 8.0),
            LatLon::new(5.0, 9.0),
            LatLon::new(8.0, 6.0),
            LatLon::new(7.0, 1.0),
        ]
    }

    #[test]
    fn convex_ring_yields_n_minus_two_triangles_with_matching_area() {
        let ring = convex_ring();
        let expected = shoelace(&ring);
        for strategy in [TriangulationStrategy::Earcut, TriangulationStrategy::Fan] {
            let triangles = strategy.triangulate(&ring).unwrap();
            assert_eq!(triangles.len(), ring.len() - 2);
            let total: f64 = triangles.iter().map(Triangle::planar_area).sum();
            assert_close(total, expected, expected * 1e-9);
            assert!(triangles.iter().all(|t| !t.spans_dateline));
        }
    }

    #[test]
    fn closing_vertex_is_ignored() {
        let mut ring = convex_ring();
        ring.push(ring[0]);
        let triangles = EarcutTriangulator.triangulate(&ring).unwrap();
        assert_eq!(triangles.len(), 4);
    }

    #[test]
    fn concave_ring_area_is_preserved() {
        let ring = vec![
            LatLon::new(0.0, 0.0),
            LatLon::new(0.0, 4.0),
            LatLon::new(4.0, 4.0),
            LatLon::new(2.0, 2.0),
            LatLon::new(4.0, 0.0),
        ];
        let triangles = EarcutTriangulator.triangulate(&ring).unwrap();
        assert_eq!(triangles.len(), 3);
        let total: f64 = triangles.iter().map(Triangle::planar_area).sum();
        assert_close(total, shoelace(&ring), 1e-9);
    }

    #[test]
    fn degenerate_rings_are_rejected() {
        let ring = vec![LatLon::new(0.0, 0.0), LatLon::new(1.0, 1.0), LatLon::new(0.0, 0.0)];
        assert_eq!(
            FanTriangulator.triangulate(&ring).unwrap_err(),
            TriangulationError::TooFewVertices { count: 2 }
        );
    }

    #[test]
    fn dateline_ring_is_flagged() {
        let ring = vec![
            LatLon::new(-10.0, 170.0),
            LatLon::new(-10.0, -170.0),
            LatLon::new(10.0, -170.0),
            LatLon::new(10.0, 170.0),
        ];
        let triangles = EarcutTriangulator.triangulate(&ring).unwrap();
        assert_eq!(triangles.len(), 2);
        assert!(triangles.iter().all(|t| t.spans_dateline));
        for t in &triangles {
            for v in t.vertices {
                assert!(v.lon >= -180.0 && v.lon <= 180.0);
            }
        }
    }

    #[test]
    fn assembler_modes() {
        let v: Vec<LatLon> = (0..5).map(|i| LatLon::new(i as f64, (i * i) as f64)).collect();

        let mut fan = TriangleAssembler::new(PrimitiveMode::TriangleFan);
        v.iter().for_each(|p| fan.push(*p));
        let fan = fan.finish();
        assert_eq!(fan.len(), 3);
        assert!(fan.iter().all(|t| t.vertices[0] == v[0]));
        assert_eq!(fan[2].vertices, [v[0], v[3], v[4]]);

        let mut strip = TriangleAssembler::new(PrimitiveMode::TriangleStrip);
        v.iter().for_each(|p| strip.push(*p));
        let strip = strip.finish();
        assert_eq!(
            strip.iter().map(|t| t.vertices).collect::<Vec<_>>(),
            vec![[v[0], v[1], v[2]], [v[2], v[1], v[3]], [v[2], v[3], v[4]]]
        );

        let mut list = TriangleAssembler::new(PrimitiveMode::Triangles);
        v.iter().chain(v.iter()).take(9).for_each(|p| list.push(*p));
        assert_eq!(list.finish().len(), 3);
    }
}
