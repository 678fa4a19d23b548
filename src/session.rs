//! Detection session: the page-level object.
//!
//! A `Session` owns the capture manager, the overlay, the results panel, the
//! status line and the detection source. Its methods are the user actions
//! (start/stop camera, load image, detect, snapshot) and the platform signals
//! (metadata loaded, window resized, time passing via `poll`).
//!
//! Detection cycles are queued with a due time and completed by `poll`.
//! Nothing stops a second cycle from being queued while one is pending; they
//! complete in due order and the last one to complete owns the overlay.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::{anyhow, Result};

use crate::capture::{CaptureError, CaptureManager, CaptureState, Controls};
use crate::config::LeafscanConfig;
use crate::detect::{
    default_fixtures, layout, load_fixtures, BoundingBox, DetectionSource, FixtureSource,
    SourceRegistry,
};
use crate::frame::{Frame, FrameSize};
use crate::ingest::{CameraProvider, ImageFile, StubCamera};
use crate::overlay::Overlay;
use crate::present::{self, ResultPanel};
use crate::snapshot;
use crate::status::{self, Status};

pub const DEFAULT_DETECT_DELAY: Duration = Duration::from_millis(600);

/// Identifier of a queued detection cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(u64);

struct PendingCycle {
    id: CycleId,
    due: Instant,
    frame: Frame,
}

pub struct Session {
    capture: CaptureManager,
    overlay: Overlay,
    source: Box<dyn DetectionSource>,
    results: ResultPanel,
    boxes: Vec<BoundingBox>,
    status: Status,
    display: FrameSize,
    detect_delay: Duration,
    pending: Vec<PendingCycle>,
    next_cycle: u64,
}

impl Session {
    pub fn new(
        camera: Box<dyn CameraProvider>,
        source: Box<dyn DetectionSource>,
        display: FrameSize,
    ) -> Self {
        Self {
            capture: CaptureManager::new(camera),
            overlay: Overlay::new(display),
            source,
            results: ResultPanel::default(),
            boxes: Vec::new(),
            status: Status::default(),
            display,
            detect_delay: DEFAULT_DETECT_DELAY,
            pending: Vec::new(),
            next_cycle: 0,
        }
    }

    /// Override the simulated processing latency.
    pub fn with_detect_delay(mut self, delay: Duration) -> Self {
        self.detect_delay = delay;
        self
    }

    /// Build a session with the configured camera and fixture source.
    pub fn from_config(cfg: &LeafscanConfig) -> Result<Self> {
        let fixtures = match &cfg.detection.fixtures {
            Some(path) => load_fixtures(path)?,
            None => default_fixtures(),
        };
        let mut fixture_source = FixtureSource::new(fixtures).with_picks(cfg.detection.boxes);
        if let Some(seed) = cfg.detection.seed {
            fixture_source = fixture_source.with_seed(seed);
        }

        let mut registry = SourceRegistry::new();
        registry.register(fixture_source);
        registry.set_default(&cfg.detection.source).map_err(|err| {
            anyhow!("{} (available: {})", err, registry.list().join(", "))
        })?;
        let mut source = registry.take_default()?;
        source.warm_up()?;
        log::info!("detection source: {}", source.name());

        let camera = StubCamera::new(cfg.camera.clone());
        Ok(Self::new(Box::new(camera), source, cfg.display).with_detect_delay(cfg.detection.delay))
    }

    pub fn state(&self) -> CaptureState {
        self.capture.state()
    }

    pub fn controls(&self) -> Controls {
        self.capture.controls()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Boxes currently drawn on the overlay.
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn results(&self) -> &ResultPanel {
        &self.results
    }

    /// The placeholder replaces the frame while no source is active.
    pub fn placeholder_visible(&self) -> bool {
        self.state() == CaptureState::Idle
    }

    pub fn capture(&self) -> &CaptureManager {
        &self.capture
    }

    pub fn start_camera(&mut self) -> Result<(), CaptureError> {
        match self.capture.start_camera() {
            Ok(resize) => {
                self.status = Status::active(status::MSG_CAMERA_CONNECTED);
                self.apply_resize(resize);
                Ok(())
            }
            Err(CaptureError::Unavailable(reason)) => {
                log::warn!("camera unavailable: {}", reason);
                self.status = Status::attention(status::MSG_CAMERA_FAILED);
                Err(CaptureError::Unavailable(reason))
            }
            Err(err) => Err(err),
        }
    }

    pub fn stop_camera(&mut self) -> Result<(), CaptureError> {
        self.capture.stop_camera()?;
        self.clear_overlay();
        self.status = Status::attention(status::MSG_CAMERA_CLOSED);
        Ok(())
    }

    pub fn load_image(&mut self, file: &ImageFile) -> Result<(), CaptureError> {
        let resize = self.capture.load_image(file)?;
        self.status = Status::active(status::MSG_IMAGE_LOADED);
        self.apply_resize(resize);
        Ok(())
    }

    /// Frame metadata became available.
    pub fn metadata_loaded(&mut self) {
        if let Some(size) = self.capture.metadata_loaded() {
            self.apply_resize(Some(size));
        }
    }

    /// The displayed frame area changed size.
    pub fn window_resized(&mut self, displayed: FrameSize) {
        self.display = displayed;
        self.overlay.resize(self.capture.frame_size(), displayed);
        self.boxes.clear();
    }

    /// Queue a detection cycle on the current frame.
    ///
    /// Returns `None` when no source is active; the status then asks for one.
    pub fn detect(&mut self, now: Instant) -> Result<Option<CycleId>> {
        let Some(frame) = self.capture.current_frame()? else {
            self.status = Status::attention(status::MSG_NO_SOURCE);
            return Ok(None);
        };

        self.next_cycle += 1;
        let id = CycleId(self.next_cycle);
        let due = now + self.detect_delay;
        self.pending.push(PendingCycle { id, due, frame });
        self.status = Status::active(status::MSG_DETECTING);
        log::debug!("detection cycle {:?} queued ({} pending)", id, self.pending.len());
        Ok(Some(id))
    }

    /// Due time of the next pending cycle.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|cycle| cycle.due).min()
    }

    pub fn pending_cycles(&self) -> usize {
        self.pending.len()
    }

    /// Complete every cycle due at or before `now`. Returns how many completed.
    ///
    /// A failing cycle does not hold back the cycles due after it; the first
    /// failure is returned once every due cycle has run.
    pub fn poll(&mut self, now: Instant) -> Result<usize> {
        let (mut due, waiting): (Vec<PendingCycle>, Vec<PendingCycle>) = self
            .pending
            .drain(..)
            .partition(|cycle| cycle.due <= now);
        self.pending = waiting;
        due.sort_by_key(|cycle| (cycle.due, cycle.id));

        let mut completed = 0;
        let mut first_err = None;
        for cycle in due {
            let id = cycle.id;
            match self.complete(cycle) {
                Ok(()) => completed += 1,
                Err(err) => {
                    log::warn!("detection cycle {:?} failed: {:#}", id, err);
                    self.status = Status::attention(status::MSG_DETECT_FAILED);
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(completed),
        }
    }

    /// Block until every pending cycle is due, then complete them.
    pub fn wait_for_detections(&mut self) -> Result<usize> {
        let Some(last_due) = self.pending.iter().map(|cycle| cycle.due).max() else {
            return Ok(0);
        };
        let now = Instant::now();
        if last_due > now {
            std::thread::sleep(last_due - now);
        }
        self.poll(Instant::now().max(last_due))
    }

    /// Save the visible frame as `snapshot-<unix millis>.png` in `dir`.
    pub fn snapshot(&mut self, dir: &Path) -> Result<PathBuf> {
        if !self.controls().snapshot {
            return Err(anyhow!("snapshot is unavailable while {}", self.state()));
        }
        let frame = self
            .capture
            .current_frame()?
            .ok_or_else(|| anyhow!("no frame to snapshot"))?;
        let size = self.capture.frame_size().unwrap_or(self.overlay.size());
        snapshot::export_snapshot(&frame, size, dir, SystemTime::now())
    }

    fn complete(&mut self, cycle: PendingCycle) -> Result<()> {
        let records = self.source.detect(&cycle.frame)?;
        let boxes = layout(&records);
        self.overlay.draw(&boxes);
        self.boxes = boxes;
        self.results = present::render(&records);
        self.status = Status::active(status::MSG_DETECTED);
        log::info!(
            "detection cycle {:?} complete: {} finding(s)",
            cycle.id,
            records.len()
        );
        Ok(())
    }

    fn apply_resize(&mut self, resize: Option<FrameSize>) {
        if let Some(size) = resize {
            self.overlay.resize(Some(size), self.display);
            self.boxes.clear();
        }
    }

    fn clear_overlay(&mut self) {
        self.overlay.draw(&[]);
        self.boxes.clear();
    }
}
