//! Scan conversion of one triangle against a terrain grid.
//!
//! The triangle is swept upward one grid row at a time between its two
//! active edges. The slice of the triangle inside each row is a convex
//! polygon (the "row polygon"); it is cut at the grid's column boundaries so
//! every touched cell receives one fragment.

use foundation::math::{Vec2, stable_total_cmp_f64};
use terrain::TerrainGrid;
use tracing::trace;

use super::{Axis, EPSILON, Fragment, MAX_FRAGMENT_VERTICES, Triangle};

/// Fragments below this area (square degrees) are slivers from cuts through
/// a vertex and are dropped.
pub const MIN_FRAGMENT_AREA: f64 = 1e-18;

/// Triangle edge oriented from its lower-latitude endpoint to its upper one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct ActiveEdge {
    pub lon0: f64,
    pub lat0: f64,
    pub lon1: f64,
    pub lat1: f64,
    /// Longitude per degree of latitude.
    pub slope: f64,
}

impl ActiveEdge {
    /// `None` for edges whose latitude span is below `EPSILON`.
    pub fn new(a: Vec2, b: Vec2) -> Option<Self> {
        let (lo, hi) = if a.y <= b.y { (a, b) } else { (b, a) };
        let dlat = hi.y - lo.y;
        if dlat < EPSILON {
            return None;
        }
        Some(Self {
            lon0: lo.x,
            lat0: lo.y,
            lon1: hi.x,
            lat1: hi.y,
            slope: (hi.x - lo.x) / dlat,
        })
    }

    /// Longitude where the edge crosses `lat`; exact at the endpoints.
    pub fn lon_at(&self, lat: f64) -> f64 {
        if lat <= self.lat0 {
            self.lon0
        } else if lat >= self.lat1 {
            self.lon1
        } else {
            self.lon0 + (lat - self.lat0) * self.slope
        }
    }
}

/// Sorted edge list plus the two edges currently bounding the sweep.
struct Sweep {
    edges: Vec<ActiveEdge>,
    next: usize,
    a: ActiveEdge,
    b: ActiveEdge,
}

impl Sweep {
    fn new(triangle: &Triangle) -> Option<Self> {
        if triangle.planar_area() < EPSILON {
            return None;
        }
        let [p0, p1, p2] = triangle.planar_vertices();
        let mut edges: Vec<ActiveEdge> = [(p0, p1), (p1, p2), (p2, p0)]
            .into_iter()
            .filter_map(|(a, b)| ActiveEdge::new(a, b))
            .collect();
        if edges.len() < 2 {
            return None;
        }
        edges.sort_by(|x, y| stable_total_cmp_f64(x.lat0, y.lat0));
        Some(Self {
            a: edges[0],
            b: edges[1],
            next: 2,
            edges,
        })
    }

    fn min_latitude(&self) -> f64 {
        self.edges[0].lat0
    }

    fn max_latitude(&self) -> f64 {
        self.edges.iter().map(|e| e.lat1).fold(f64::NEG_INFINITY, f64::max)
    }

    fn longitude_range(&self) -> (f64, f64) {
        self.edges.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
            (lo.min(e.lon0).min(e.lon1), hi.max(e.lon0).max(e.lon1))
        })
    }

    /// Replace every active edge that ends at or below `lat`. Returns `false`
    /// when an edge ended and no replacement is left.
    fn advance_past(&mut self, lat: f64) -> bool {
        while self.a.lat1 <= lat {
            let Some(edge) = self.take_next() else {
                return false;
            };
            self.a = edge;
        }
        while self.b.lat1 <= lat {
            let Some(edge) = self.take_next() else {
                return false;
            };
            self.b = edge;
        }
        true
    }

    fn take_next(&mut self) -> Option<ActiveEdge> {
        let edge = self.edges.get(self.next).copied();
        self.next += 1;
        edge
    }
}

/// Fragments covering the intersection of a dateline-free `triangle` with
/// `grid`, in `(longitude, latitude)` coordinates.
///
/// Degenerate triangles and triangles outside the grid yield nothing.
pub fn intersect_terrain<G: TerrainGrid + ?Sized>(triangle: &Triangle, grid: &G) -> Vec<Fragment> {
    let mut out = Vec::new();

    let Some(mut sweep) = Sweep::new(triangle) else {
        trace!("skipping degenerate triangle {:?}", triangle.vertices);
        return out;
    };

    let tri_min = sweep.min_latitude();
    let tri_max = sweep.max_latitude();
    let (lon_min, lon_max) = sweep.longitude_range();
    if tri_max <= grid.min_latitude()
        || tri_min >= grid.max_latitude()
        || lon_max <= grid.min_longitude()
        || lon_min >= grid.max_longitude()
    {
        trace!("triangle outside grid sector {:?}", grid.sector());
        return out;
    }

    let rows = grid.row_count() as isize;
    let start = tri_min.max(grid.min_latitude());
    let end = tri_max.min(grid.max_latitude());
    if !sweep.advance_past(start) {
        return out;
    }

    let mut lat = start;
    let mut row = grid.row_at_latitude(start).clamp(0, rows - 1);
    let mut finished = false;

    while !finished && lat < end && row < rows {
        let row_top = grid.latitude_at_row(row + 1).min(end);
        if row_top <= lat {
            row += 1;
            continue;
        }

        let mut left = Vec::with_capacity(3);
        let mut right = Vec::with_capacity(3);
        push_ordered(&mut left, &mut right, lat, sweep.a.lon_at(lat), sweep.b.lon_at(lat));

        let mut split_lats = Vec::new();
        loop {
            let seg_top = row_top.min(sweep.a.lat1).min(sweep.b.lat1);
            if seg_top >= row_top {
                push_ordered(
                    &mut left,
                    &mut right,
                    row_top,
                    sweep.a.lon_at(row_top),
                    sweep.b.lon_at(row_top),
                );
                break;
            }

            // An edge ends inside the row: its endpoint is a triangle vertex
            // on one side of the row polygon.
            let (ended, other) = if sweep.a.lat1 <= seg_top {
                (sweep.a, sweep.b)
            } else {
                (sweep.b, sweep.a)
            };
            let vertex = Vec2::new(ended.lon1, seg_top);
            if ended.lon1 <= other.lon_at(seg_top) {
                left.push(vertex);
            } else {
                right.push(vertex);
            }
            split_lats.push(seg_top);

            if !sweep.advance_past(seg_top) {
                finished = true;
                break;
            }
        }

        left.extend(right.into_iter().rev());
        let mut polygon = Fragment::from_vertices(left);
        polygon.dedup();
        clip_to_columns(polygon, grid, &split_lats, &mut out);

        lat = row_top;
        row += 1;
    }

    out
}

fn push_ordered(left: &mut Vec<Vec2>, right: &mut Vec<Vec2>, lat: f64, lon_a: f64, lon_b: f64) {
    left.push(Vec2::new(lon_a.min(lon_b), lat));
    right.push(Vec2::new(lon_a.max(lon_b), lat));
}

/// Cut a row polygon at the grid's outer and interior column boundaries.
fn clip_to_columns<G: TerrainGrid + ?Sized>(
    mut polygon: Fragment,
    grid: &G,
    split_lats: &[f64],
    out: &mut Vec<Fragment>,
) {
    let Some((lo, hi)) = polygon.bounds() else {
        return;
    };
    if hi.x <= grid.min_longitude() || lo.x >= grid.max_longitude() {
        trace!("row polygon outside grid columns at lat {}", lo.y);
        return;
    }

    let columns = grid.column_count() as isize;
    let beg = grid.column_at_longitude(lo.x);
    let end = grid.column_at_longitude(hi.x);

    if beg < 0 {
        // Keep the part east of the grid's western edge.
        let _ = polygon.split_at_longitude(grid.min_longitude());
    }
    if end >= columns {
        match polygon.split_at_longitude(grid.max_longitude()) {
            Some(inside) => polygon = inside,
            None => return,
        }
    }

    for column in beg.max(0) + 1..=end.min(columns - 1) {
        if polygon.is_empty() {
            return;
        }
        if let Some(piece) = polygon.split_at_longitude(grid.longitude_at_column(column)) {
            emit(piece, split_lats, out);
        }
    }
    emit(polygon, split_lats, out);
}

fn emit(mut piece: Fragment, split_lats: &[f64], out: &mut Vec<Fragment>) {
    if piece.len() > MAX_FRAGMENT_VERTICES {
        for &lat in split_lats {
            if let Some(lower) = piece.split_at(Axis::Latitude, lat) {
                keep(lower, out);
            }
        }
    }
    keep(piece, out);
}

fn keep(mut piece: Fragment, out: &mut Vec<Fragment>) {
    piece.dedup();
    if piece.len() < 3 || piece.area() <= MIN_FRAGMENT_AREA {
        return;
    }
    debug_assert!(piece.len() <= MAX_FRAGMENT_VERTICES);
    out.push(piece);
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use foundation::bounds::Sector;
    use foundation::math::{Globe, LatLon, Vec2};
    use pretty_assertions::assert_eq;
    use terrain::{Density, LatticeCache, RectTerrainGrid, TerrainGrid};

    use super::{ActiveEdge, intersect_terrain};
    use crate::surface::{Fragment, MAX_FRAGMENT_VERTICES, Triangle, materialize};

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} != {b} (eps={eps})");
    }

    fn grid(sector: Sector, rows: usize, columns: usize) -> RectTerrainGrid {
        let mut cache = LatticeCache::new();
        RectTerrainGrid::flat(
            Globe::sphere(1.0),
            sector,
            Density::new(rows, columns),
            0.0,
            &mut cache,
        )
        .unwrap()
    }

    fn ten_by_ten() -> RectTerrainGrid {
        grid(Sector::new(0.0, 10.0, 0.0, 10.0), 10, 10)
    }

    fn cells_touched(
        fragments: &[Fragment],
        grid: &RectTerrainGrid,
    ) -> BTreeSet<(isize, isize)> {
        fragments
            .iter()
            .filter_map(|f| f.centroid())
            .map(|c| (grid.row_at_latitude(c.y), grid.column_at_longitude(c.x)))
            .collect()
    }

    #[test]
    fn active_edge_is_exact_at_endpoints() {
        let e = ActiveEdge::new(Vec2::new(3.0, 5.0), Vec2::new(1.0, 1.0)).unwrap();
        assert_eq!((e.lat0, e.lat1), (1.0, 5.0));
        assert_eq!(e.lon_at(1.0), 1.0);
        assert_eq!(e.lon_at(5.0), 3.0);
        assert_close(e.lon_at(3.0), 2.0, 1e-12);
        assert!(ActiveEdge::new(Vec2::new(0.0, 1.0), Vec2::new(4.0, 1.0)).is_none());
    }

    #[test]
    fn triangle_inside_one_cell_is_one_fragment() {
        let grid = ten_by_ten();
        let t = Triangle::new(
            LatLon::new(3.2, 4.1),
            LatLon::new(3.9, 4.3),
            LatLon::new(3.5, 4.8),
        );
        let fragments = intersect_terrain(&t, &grid);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].len(), 3);

        let mut got: Vec<Vec2> = fragments[0].vertices().to_vec();
        let mut want: Vec<Vec2> = t.planar_vertices().to_vec();
        got.sort_by(|a, b| a.y.total_cmp(&b.y));
        want.sort_by(|a, b| a.y.total_cmp(&b.y));
        assert_eq!(got, want);

        let reference = grid.cartesian_at(3.2, 4.1);
        let placed = materialize(&fragments[0], &grid, reference);
        let own = materialize(&Fragment::from_vertices(t.planar_vertices().to_vec()), &grid, reference);
        assert_eq!(placed.len(), 3);
        for p in &placed.vertices {
            assert!(
                own.vertices.iter().any(|q| (*p - *q).length() <= 1e-12),
                "{p:?} not among {:?}",
                own.vertices
            );
        }
    }

    #[test]
    fn spanning_triangle_stays_within_cell_budget_and_area() {
        let grid = ten_by_ten();
        let t = Triangle::new(
            LatLon::new(0.5, 0.3),
            LatLon::new(2.7, 6.6),
            LatLon::new(7.4, 3.2),
        );
        let fragments = intersect_terrain(&t, &grid);

        // Columns 0..=6, rows 0..=7.
        let (k, m) = (7, 8);
        assert!(!fragments.is_empty());
        assert!(fragments.len() <= k * m, "{} fragments", fragments.len());
        assert!(fragments.iter().all(|f| f.len() >= 3 && f.len() <= MAX_FRAGMENT_VERTICES));

        let total: f64 = fragments.iter().map(|f| f.area()).sum();
        assert_close(total, t.planar_area(), 1e-9);

        // One fragment per touched cell.
        assert_eq!(cells_touched(&fragments, &grid).len(), fragments.len());
    }

    #[test]
    fn long_row_pieces_are_split_to_the_vertex_bound() {
        // Rows are 2° tall and columns 10/7° wide, so a sliver crossing the
        // grid's north or east edge leaves row pieces with more than six
        // vertices before the latitude split.
        let grid = grid(Sector::new(0.0, 10.0, 0.0, 10.0), 5, 7);
        let cases = [
            // Exits through the north edge: columns 0..=5, rows 0..=4.
            (
                Triangle::new(
                    LatLon::new(12.5, 8.5),
                    LatLon::new(1.5, 3.5),
                    LatLon::new(0.5, 0.5),
                ),
                6 * 5,
            ),
            // Exits through the east edge: columns 0..=6, rows 0..=3.
            (
                Triangle::new(
                    LatLon::new(8.5, 12.5),
                    LatLon::new(3.5, 1.5),
                    LatLon::new(0.5, 0.5),
                ),
                7 * 4,
            ),
        ];
        for (t, cells) in cases {
            let fragments = intersect_terrain(&t, &grid);
            assert!(!fragments.is_empty());
            assert!(fragments.len() <= cells, "{} fragments", fragments.len());
            for f in &fragments {
                assert!(f.len() >= 3 && f.len() <= MAX_FRAGMENT_VERTICES, "{} vertices", f.len());
                for v in f.vertices() {
                    assert!(v.x >= -1e-9 && v.x <= 10.0 + 1e-9 && v.y >= -1e-9 && v.y <= 10.0 + 1e-9);
                }
            }
            // Area of the triangle clipped to the 10° square.
            let total: f64 = fragments.iter().map(|f| f.area()).sum();
            assert_close(total, 3521.0 / 264.0, 1e-9);
        }
    }

    #[test]
    fn triangle_clipped_to_grid_extent() {
        let grid = grid(Sector::new(0.0, 4.0, 0.0, 4.0), 4, 4);
        // Right triangle with legs 8, covering the grid's lower-left half and
        // beyond: inside the grid the covered area is the region x + y < 8,
        // which is the whole 4x4 square.
        let t = Triangle::new(
            LatLon::new(-2.0, -2.0),
            LatLon::new(-2.0, 10.0),
            LatLon::new(10.0, -2.0),
        );
        let fragments = intersect_terrain(&t, &grid);
        let total: f64 = fragments.iter().map(|f| f.area()).sum();
        assert_close(total, 16.0, 1e-9);
        assert_eq!(fragments.len(), 16);
        for f in &fragments {
            for v in f.vertices() {
                assert!(v.x >= 0.0 && v.x <= 4.0 && v.y >= 0.0 && v.y <= 4.0);
            }
        }
    }

    #[test]
    fn outside_and_degenerate_triangles_yield_nothing() {
        let grid = ten_by_ten();
        let north = Triangle::new(
            LatLon::new(20.0, 1.0),
            LatLon::new(21.0, 2.0),
            LatLon::new(22.0, 1.0),
        );
        assert!(intersect_terrain(&north, &grid).is_empty());

        let east = Triangle::new(
            LatLon::new(1.0, 20.0),
            LatLon::new(2.0, 22.0),
            LatLon::new(3.0, 21.0),
        );
        assert!(intersect_terrain(&east, &grid).is_empty());

        let colinear = Triangle::new(
            LatLon::new(1.0, 1.0),
            LatLon::new(2.0, 2.0),
            LatLon::new(3.0, 3.0),
        );
        assert!(intersect_terrain(&colinear, &grid).is_empty());

        let flat = Triangle::new(
            LatLon::new(1.0, 1.0),
            LatLon::new(1.0, 2.0),
            LatLon::new(1.0, 3.0),
        );
        assert!(intersect_terrain(&flat, &grid).is_empty());
    }

    #[test]
    fn horizontal_edges_are_handled() {
        let grid = ten_by_ten();
        let flat_bottom = Triangle::new(
            LatLon::new(1.0, 1.0),
            LatLon::new(1.0, 5.0),
            LatLon::new(4.0, 3.0),
        );
        let flat_top = Triangle::new(
            LatLon::new(4.0, 1.0),
            LatLon::new(4.0, 5.0),
            LatLon::new(1.0, 3.0),
        );
        for t in [flat_bottom, flat_top] {
            let fragments = intersect_terrain(&t, &grid);
            let total: f64 = fragments.iter().map(|f| f.area()).sum();
            assert_close(total, 6.0, 1e-9);
        }
    }
}
