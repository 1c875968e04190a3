//! triage-view - headless driver for the media triage presentation core

use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use triage_view::config::{self, CliOverrides};
use triage_view::geometry::Area;
use triage_view::manifest;
use triage_view::model::{AppError, FileId, ManifestError};
use triage_view::tiles::HeadlessSurface;
use triage_view::view::{TriageView, ViewReport};
use triage_view::window::DensityClass;

/// Drive the triage grid and overlay headlessly and print the resulting state as JSON
#[derive(Parser, Debug)]
#[command(name = "triage-view")]
#[command(version)]
#[command(about = "Headless media triage grid and overlay driver")]
pub struct Args {
    /// Path to a JSON manifest of file records (reads from stdin if not provided)
    pub manifest: Option<PathBuf>,

    /// Render area width in pixels
    #[arg(long, default_value_t = 1280.0)]
    pub width: f32,

    /// Render area height in pixels
    #[arg(long, default_value_t = 800.0)]
    pub height: f32,

    /// Grid scroll offset in pixels
    #[arg(long, default_value_t = 0.0)]
    pub scroll: f32,

    /// Tile density class for the position slider
    #[arg(long, value_parser = ["compact", "comfortable", "spacious"])]
    pub density: Option<String>,

    /// Open the overlay on this file id
    #[arg(long)]
    pub enter: Option<u64>,

    /// Use compare mode for the overlay
    #[arg(long)]
    pub compare: bool,

    /// Navigate forward this many times after entering
    #[arg(long, default_value_t = 0)]
    pub next: usize,

    /// Comma-separated file ids to show as selected
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<u64>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to log file (overrides config)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn cli_overrides(&self) -> CliOverrides {
        CliOverrides {
            density: self
                .density
                .as_deref()
                .and_then(|d| d.parse::<DensityClass>().ok()),
            compare: self.compare.then_some(true),
            log_file_path: self.log_file.clone(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let report = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run(args: &Args) -> Result<ViewReport, AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = config::load_config_with_precedence(args.config.clone())?;
        let merged = config::merge_config(config_file);
        let with_env = config::apply_env_overrides(merged);
        config::apply_cli_overrides(with_env, args.cli_overrides())
    };

    triage_view::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let files = match &args.manifest {
        Some(path) => manifest::load_manifest(path)?,
        None => read_stdin_manifest()?,
    };

    let mut view = TriageView::new(HeadlessSurface::new(), &config);
    view.set_files(files);
    view.resize(Area::new(args.width, args.height), Instant::now());
    view.set_selection(args.select.iter().copied().map(FileId::new));
    view.scroll_to(args.scroll);

    if let Some(id) = args.enter {
        if view.enter(FileId::new(id)) {
            for _ in 0..args.next {
                if !view.next() {
                    break;
                }
            }
        } else {
            info!(file_id = id, "Requested file is not in the manifest");
        }
    }

    Ok(view.report())
}

fn read_stdin_manifest() -> Result<Vec<triage_view::model::FileRecord>, ManifestError> {
    let stdin = Path::new("<stdin>");
    let mut contents = String::new();
    std::io::stdin()
        .read_to_string(&mut contents)
        .map_err(|source| ManifestError::Read {
            path: stdin.to_path_buf(),
            source,
        })?;
    manifest::parse_manifest(&contents, stdin)
}
