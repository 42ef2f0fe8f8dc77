use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tools::{RunOptions, load_scene, run_scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drape surface shapes over terrain tiles and report the fragments")]
struct Args {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Number of frames to run
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// Seconds between frames
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame_dt: f64,

    /// Override every shape's rebuild throttle interval (seconds)
    #[arg(long)]
    throttle: Option<f64>,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Include reference-relative vertices in the report
    #[arg(long)]
    dump_vertices: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let text = fs::read_to_string(&args.scene)
        .map_err(|e| format!("read {:?}: {e}", args.scene))?;
    let scene = load_scene(&text).map_err(|e| e.to_string())?;

    let options = RunOptions {
        frames: args.frames,
        frame_dt_s: args.frame_dt,
        throttle_interval_s: args.throttle,
        dump_vertices: args.dump_vertices,
    };
    let report = run_scene(&scene, &options).map_err(|e| e.to_string())?;

    let json = serde_json::to_string_pretty(&report).map_err(|e| format!("encode report: {e}"))?;
    match args.output {
        Some(path) => {
            fs::write(&path, json).map_err(|e| format!("write {path:?}: {e}"))?;
            info!("wrote report for {} shapes to {path:?}", report.shapes.len());
        }
        None => println!("{json}"),
    }
    Ok(())
}
