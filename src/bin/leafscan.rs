//! leafscan - run a detection session from the terminal
//!
//! Opens the configured camera (or loads `--image`), runs one or more
//! detection cycles, prints the results panel and optionally writes a
//! snapshot and the overlay canvas.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;

use leafscan::ui::{Ui, UiMode};
use leafscan::{CaptureState, ImageFile, LeafscanConfig, Session};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Camera device (e.g. stub://rear). Overrides config.
    #[arg(long, conflicts_with = "image")]
    camera: Option<String>,
    /// Local image to analyze instead of a camera.
    #[arg(long)]
    image: Option<PathBuf>,
    /// Number of detection cycles to trigger.
    #[arg(long, default_value_t = 1)]
    detect: u32,
    /// Save a snapshot of the camera frame.
    #[arg(long)]
    snapshot: bool,
    /// Write the overlay canvas to this PNG path.
    #[arg(long)]
    overlay: Option<PathBuf>,
    /// Snapshot output directory. Overrides config.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Seed for reproducible detections. Overrides config.
    #[arg(long)]
    seed: Option<u64>,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, env = "LEAFSCAN_UI", default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let ui = Ui::new(UiMode::parse(Some(&args.ui)), std::io::stderr().is_terminal());

    let mut cfg = LeafscanConfig::load()?;
    if let Some(device) = args.camera {
        cfg.camera.device = device;
    }
    if let Some(seed) = args.seed {
        cfg.detection.seed = Some(seed);
    }
    if let Some(out) = args.out {
        cfg.snapshot_dir = out;
    }
    cfg.validate()?;

    let mut session = Session::from_config(&cfg)?;

    match &args.image {
        Some(path) => {
            let stage = ui.stage("load image");
            let file = ImageFile::read(path)?;
            session.load_image(&file)?;
            stage.settle(session.status());
        }
        None => {
            let stage = ui.stage(&format!("open camera {}", cfg.camera.device));
            let started = session.start_camera();
            stage.settle(session.status());
            started.context("camera start failed")?;
        }
    }

    if args.detect > 0 {
        for _ in 0..args.detect {
            session.detect(Instant::now())?;
        }
        ui.status(session.status());
        let stage = ui.stage("detect");
        let finished = session.wait_for_detections();
        stage.settle(session.status());
        finished?;
        print!("{}", session.results());
    }

    if args.snapshot {
        std::fs::create_dir_all(&cfg.snapshot_dir).with_context(|| {
            format!("failed to create snapshot dir {}", cfg.snapshot_dir.display())
        })?;
        let path = session.snapshot(&cfg.snapshot_dir)?;
        println!("snapshot: {}", path.display());
    }

    if let Some(path) = &args.overlay {
        session.overlay().save_png(path)?;
        println!("overlay: {}", path.display());
    }

    if session.state() == CaptureState::CameraActive {
        session.stop_camera()?;
        ui.status(session.status());
    }
    Ok(())
}
