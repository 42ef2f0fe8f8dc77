//! Scene description and driver behind the `drape` binary.
//!
//! A scene names a globe, a set of terrain tiles and a set of surface shapes.
//! [`run_scene`] plays a number of frames through the surface-shape layer and
//! collects what each shape ended up with.

use foundation::bounds::Sector;
use foundation::math::{Globe, LatLon};
use layers::surface::{
    FanRange, RebuildState, ShapeConfig, ShapeError, SurfaceShape, circle_ring, ellipse_ring,
    quad_ring,
};
use layers::surface_shapes::{LayerUpdate, SurfaceShapeLayer};
use layers::symbology::ShapeStyle;
use layers::terrain::TerrainLayer;
use runtime::FrameClock;
use serde::{Deserialize, Serialize};
use terrain::{Density, GridError, LatticeCache, RectTerrainGrid};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlobeSpec {
    Sphere { radius: f64 },
    #[default]
    Wgs84,
}

impl GlobeSpec {
    pub fn globe(&self) -> Globe {
        match self {
            GlobeSpec::Sphere { radius } => Globe::sphere(*radius),
            GlobeSpec::Wgs84 => Globe::wgs84(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSpec {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl From<SectorSpec> for Sector {
    fn from(s: SectorSpec) -> Self {
        Sector::new(s.min_lat, s.max_lat, s.min_lon, s.max_lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationSpec {
    /// Every post at this elevation (meters).
    Uniform(f64),
    /// Row-major posts from the south-west corner, `(rows + 1) * (columns + 1)` values.
    Posts(Vec<f64>),
}

impl Default for ElevationSpec {
    fn default() -> Self {
        ElevationSpec::Uniform(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSpec {
    pub sector: SectorSpec,
    pub rows: usize,
    pub columns: usize,
    #[serde(default)]
    pub elevation: ElevationSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometrySpec {
    /// Explicit ring of `[lat, lon]` pairs in degrees.
    Ring { positions: Vec<[f64; 2]> },
    Ellipse {
        center: [f64; 2],
        major_radius: f64,
        minor_radius: f64,
        #[serde(default)]
        orientation_deg: f64,
        #[serde(default = "default_intervals")]
        intervals: usize,
    },
    Circle {
        center: [f64; 2],
        radius: f64,
        #[serde(default = "default_intervals")]
        intervals: usize,
    },
    Quad {
        center: [f64; 2],
        width: f64,
        height: f64,
        #[serde(default)]
        orientation_deg: f64,
    },
}

fn default_intervals() -> usize {
    32
}

impl GeometrySpec {
    pub fn ring(&self, globe: &Globe) -> Result<Vec<LatLon>, ShapeError> {
        let at = |p: &[f64; 2]| LatLon::new(p[0], p[1]);
        match self {
            GeometrySpec::Ring { positions } => Ok(positions.iter().map(at).collect()),
            GeometrySpec::Ellipse {
                center,
                major_radius,
                minor_radius,
                orientation_deg,
                intervals,
            } => ellipse_ring(
                globe,
                at(center),
                *major_radius,
                *minor_radius,
                *orientation_deg,
                *intervals,
            ),
            GeometrySpec::Circle {
                center,
                radius,
                intervals,
            } => circle_ring(globe, at(center), *radius, *intervals),
            GeometrySpec::Quad {
                center,
                width,
                height,
                orientation_deg,
            } => quad_ring(globe, at(center), *width, *height, *orientation_deg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub geometry: GeometrySpec,
    #[serde(default)]
    pub config: ShapeConfig,
    #[serde(default)]
    pub style: ShapeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub globe: GlobeSpec,
    #[serde(default)]
    pub terrain: Vec<TerrainSpec>,
    #[serde(default)]
    pub shapes: Vec<ShapeSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub frames: u64,
    pub frame_dt_s: f64,
    /// Replaces every shape's configured throttle interval.
    pub throttle_interval_s: Option<f64>,
    pub dump_vertices: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: 1,
            frame_dt_s: 1.0 / 60.0,
            throttle_interval_s: None,
            dump_vertices: false,
        }
    }
}

#[derive(Debug)]
pub enum SceneError {
    Parse(serde_json::Error),
    Terrain { index: usize, source: GridError },
    Shape { name: String, source: ShapeError },
    Options(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Parse(e) => write!(f, "scene parse error: {e}"),
            SceneError::Terrain { index, source } => write!(f, "terrain tile {index}: {source}"),
            SceneError::Shape { name, source } => write!(f, "shape {name}: {source}"),
            SceneError::Options(msg) => write!(f, "invalid options: {msg}"),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Parse(e) => Some(e),
            SceneError::Terrain { source, .. } => Some(source),
            SceneError::Shape { source, .. } => Some(source),
            SceneError::Options(_) => None,
        }
    }
}

pub fn load_scene(text: &str) -> Result<Scene, SceneError> {
    serde_json::from_str(text).map_err(SceneError::Parse)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub index: u64,
    pub time_s: f64,
    pub update: LayerUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeReport {
    pub name: String,
    pub state: String,
    pub positions: usize,
    pub triangles: usize,
    pub fragments: usize,
    pub vertices: usize,
    /// Square meters; absent when no fragment was produced.
    pub area_m2: Option<f64>,
    pub perimeter_m: f64,
    pub reference_point: [f64; 3],
    pub ranges: Vec<FanRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_vertices: Option<Vec<[f32; 3]>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatticeReport {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrapeReport {
    pub frames: Vec<FrameReport>,
    pub shapes: Vec<ShapeReport>,
    pub lattices: LatticeReport,
}

pub fn run_scene(scene: &Scene, options: &RunOptions) -> Result<DrapeReport, SceneError> {
    if !(options.frame_dt_s.is_finite() && options.frame_dt_s >= 0.0) {
        return Err(SceneError::Options(format!(
            "frame dt must be a non-negative number, got {}",
            options.frame_dt_s
        )));
    }
    if let Some(t) = options.throttle_interval_s {
        if !(t.is_finite() && t >= 0.0) {
            return Err(SceneError::Options(format!(
                "throttle must be a non-negative number, got {t}"
            )));
        }
    }

    let globe = scene.globe.globe();
    let mut cache = LatticeCache::new();
    let mut terrain = TerrainLayer::new(0);
    let mut grids = Vec::with_capacity(scene.terrain.len());
    for (index, spec) in scene.terrain.iter().enumerate() {
        let grid = build_grid(spec, globe, &mut cache)
            .map_err(|source| SceneError::Terrain { index, source })?;
        grids.push(grid);
    }
    terrain.replace_grids(grids);

    let mut layer = SurfaceShapeLayer::new(1);
    let mut names = Vec::with_capacity(scene.shapes.len());
    for (index, spec) in scene.shapes.iter().enumerate() {
        let name = spec.name.clone().unwrap_or_else(|| format!("shape-{index}"));
        let shape = build_shape(spec, &globe, options).map_err(|source| SceneError::Shape {
            name: name.clone(),
            source,
        })?;
        layer.push(shape);
        names.push(name);
    }
    info!(
        "scene loaded: {} terrain tiles, {} shapes",
        terrain.grids().len(),
        layer.len()
    );

    let mut clock = FrameClock::new(options.frame_dt_s);
    let mut frames = Vec::with_capacity(options.frames as usize);
    for _ in 0..options.frames {
        let frame = clock.tick();
        let update = layer.update(&frame, &globe, &terrain);
        debug!(
            "frame {} at {:.3}s: {} rebuilt, {} skipped, {} failed",
            frame.index,
            frame.time.seconds(),
            update.rebuilt,
            update.skipped,
            update.failed
        );
        frames.push(FrameReport {
            index: frame.index,
            time_s: frame.time.seconds(),
            update,
        });
    }

    let mut shapes = Vec::with_capacity(names.len());
    for (index, name) in names.into_iter().enumerate() {
        let Some(shape) = layer.shape_mut(index) else {
            continue;
        };
        shapes.push(shape_report(name, shape, &globe, options.dump_vertices));
    }

    Ok(DrapeReport {
        frames,
        shapes,
        lattices: LatticeReport {
            entries: cache.len(),
            hits: cache.hits(),
            misses: cache.misses(),
        },
    })
}

fn build_grid(
    spec: &TerrainSpec,
    globe: Globe,
    cache: &mut LatticeCache,
) -> Result<RectTerrainGrid, GridError> {
    let density = Density::new(spec.rows, spec.columns);
    let sector = Sector::from(spec.sector);
    match &spec.elevation {
        ElevationSpec::Uniform(e) => RectTerrainGrid::flat(globe, sector, density, *e, cache),
        ElevationSpec::Posts(posts) => {
            RectTerrainGrid::new(globe, sector, density, posts.clone(), cache)
        }
    }
}

fn build_shape(
    spec: &ShapeSpec,
    globe: &Globe,
    options: &RunOptions,
) -> Result<SurfaceShape, ShapeError> {
    let mut config = spec.config;
    if let Some(t) = options.throttle_interval_s {
        config.throttle_interval_s = t;
    }
    let ring = spec.geometry.ring(globe)?;
    Ok(SurfaceShape::with_config(ring, config)?.with_style(spec.style))
}

fn shape_report(name: String, shape: &mut SurfaceShape, globe: &Globe, dump: bool) -> ShapeReport {
    let state = match shape.state() {
        RebuildState::Dirty => "dirty",
        RebuildState::Rebuilding => "rebuilding",
        RebuildState::Clean { .. } => "clean",
        RebuildState::Failed => "failed",
    };
    let triangles = shape.triangles().map(|t| t.len()).unwrap_or(0);
    let buffer = shape.draw_buffer();
    ShapeReport {
        name,
        state: state.to_string(),
        positions: shape.positions().len(),
        triangles,
        fragments: shape.fragments().len(),
        vertices: buffer.vertices().len(),
        area_m2: shape.area(),
        perimeter_m: shape.perimeter(globe),
        reference_point: shape.reference_point().as_array(),
        ranges: buffer.ranges().to_vec(),
        relative_vertices: dump.then(|| buffer.vertices().iter().map(|v| v.position).collect()),
    }
}
