use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::frame::FrameSize;
use crate::ingest::CameraConfig;

const DEFAULT_CAMERA_DEVICE: &str = "stub://rear";
const DEFAULT_CAMERA_WIDTH: u32 = 640;
const DEFAULT_CAMERA_HEIGHT: u32 = 480;
const DEFAULT_DISPLAY_WIDTH: u32 = 640;
const DEFAULT_DISPLAY_HEIGHT: u32 = 480;
const DEFAULT_DETECT_DELAY_MS: u64 = 600;
const DEFAULT_BOXES: usize = 2;
const DEFAULT_SOURCE: &str = "fixture";
const DEFAULT_SNAPSHOT_DIR: &str = ".";

#[derive(Debug, Deserialize, Default)]
struct LeafscanConfigFile {
    camera: Option<CameraConfigFile>,
    display: Option<DisplayConfigFile>,
    detection: Option<DetectionConfigFile>,
    snapshot_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct DisplayConfigFile {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectionConfigFile {
    source: Option<String>,
    delay_ms: Option<u64>,
    boxes: Option<usize>,
    fixtures: Option<PathBuf>,
    seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct LeafscanConfig {
    pub camera: CameraConfig,
    /// Displayed size of the frame area, used when the frame size is unknown.
    pub display: FrameSize,
    pub detection: DetectionSettings,
    pub snapshot_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DetectionSettings {
    /// Registered name of the detection source.
    pub source: String,
    /// Simulated processing latency of one detection cycle.
    pub delay: Duration,
    /// Records per cycle.
    pub boxes: usize,
    /// JSON fixture file replacing the built-in fixtures.
    pub fixtures: Option<PathBuf>,
    /// Seed for reproducible sampling.
    pub seed: Option<u64>,
}

impl Default for LeafscanConfig {
    fn default() -> Self {
        // The defaults cannot fail validation.
        Self::from_file(LeafscanConfigFile::default())
    }
}

impl LeafscanConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("LEAFSCAN_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: LeafscanConfigFile) -> Self {
        let camera = CameraConfig {
            device: file
                .camera
                .as_ref()
                .and_then(|camera| camera.device.clone())
                .unwrap_or_else(|| DEFAULT_CAMERA_DEVICE.to_string()),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(DEFAULT_CAMERA_WIDTH),
            height: file
                .camera
                .as_ref()
                .and_then(|camera| camera.height)
                .unwrap_or(DEFAULT_CAMERA_HEIGHT),
        };
        let display = FrameSize::new(
            file.display
                .as_ref()
                .and_then(|display| display.width)
                .unwrap_or(DEFAULT_DISPLAY_WIDTH),
            file.display
                .as_ref()
                .and_then(|display| display.height)
                .unwrap_or(DEFAULT_DISPLAY_HEIGHT),
        );
        let detection = file.detection.unwrap_or_default();
        let detection = DetectionSettings {
            source: detection
                .source
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            delay: Duration::from_millis(detection.delay_ms.unwrap_or(DEFAULT_DETECT_DELAY_MS)),
            boxes: detection.boxes.unwrap_or(DEFAULT_BOXES),
            fixtures: detection.fixtures,
            seed: detection.seed,
        };
        let snapshot_dir = file
            .snapshot_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_DIR));
        Self {
            camera,
            display,
            detection,
            snapshot_dir,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(device) = std::env::var("LEAFSCAN_CAMERA") {
            if !device.trim().is_empty() {
                self.camera.device = device;
            }
        }
        if let Ok(source) = std::env::var("LEAFSCAN_SOURCE") {
            if !source.trim().is_empty() {
                self.detection.source = source;
            }
        }
        if let Ok(delay) = std::env::var("LEAFSCAN_DETECT_DELAY_MS") {
            let millis: u64 = delay.parse().map_err(|_| {
                anyhow!("LEAFSCAN_DETECT_DELAY_MS must be an integer number of milliseconds")
            })?;
            self.detection.delay = Duration::from_millis(millis);
        }
        if let Ok(boxes) = std::env::var("LEAFSCAN_BOXES") {
            self.detection.boxes = boxes
                .parse()
                .map_err(|_| anyhow!("LEAFSCAN_BOXES must be a positive integer"))?;
        }
        if let Ok(path) = std::env::var("LEAFSCAN_FIXTURES") {
            if !path.trim().is_empty() {
                self.detection.fixtures = Some(PathBuf::from(path));
            }
        }
        if let Ok(dir) = std::env::var("LEAFSCAN_SNAPSHOT_DIR") {
            if !dir.trim().is_empty() {
                self.snapshot_dir = PathBuf::from(dir);
            }
        }
        if let Ok(seed) = std::env::var("LEAFSCAN_SEED") {
            let seed: u64 = seed
                .parse()
                .map_err(|_| anyhow!("LEAFSCAN_SEED must be an unsigned integer"))?;
            self.detection.seed = Some(seed);
        }
        Ok(())
    }

    /// Check the settings. Run again after overriding fields by hand.
    pub fn validate(&self) -> Result<()> {
        if self.camera.device.trim().is_empty() {
            return Err(anyhow!("camera device must not be empty"));
        }
        if self.detection.source.trim().is_empty() {
            return Err(anyhow!("detection source must not be empty"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera resolution must be non-zero"));
        }
        if self.display.is_empty() {
            return Err(anyhow!("display size must be non-zero"));
        }
        if self.detection.boxes == 0 {
            return Err(anyhow!("detection boxes must be at least 1"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<LeafscanConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
