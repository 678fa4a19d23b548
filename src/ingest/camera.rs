//! Camera acquisition.
//!
//! A `CameraProvider` answers a `StreamRequest` with either a live `MediaStream`
//! or a `CaptureUnavailable` error. Acquisition blocks until the provider
//! answers; there is no timeout and no cancellation.
//!
//! `StubCamera` serves `stub://` devices with synthetic frames:
//! - `stub://denied` refuses permission
//! - `stub://absent` reports no device
//! - any other `stub://<name>` grants a stream
//!
//! Other device names report `Unsupported`; no platform camera backend is
//! compiled in.

use anyhow::Result;

use crate::frame::{Frame, FrameSize};

/// Which camera the request prefers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacingMode {
    /// Front camera.
    User,
    /// Rear camera.
    Environment,
}

/// What the session asks the platform for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamRequest {
    pub facing: FacingMode,
    pub audio: bool,
}

impl StreamRequest {
    /// Rear-facing video with no audio track.
    pub fn rear_video() -> Self {
        Self {
            facing: FacingMode::Environment,
            audio: false,
        }
    }
}

/// Why a camera could not be opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CaptureUnavailable {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NoDevice,
    #[error("camera capture is not supported here")]
    Unsupported,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// One track of a media stream.
#[derive(Clone, Debug)]
pub struct MediaTrack {
    pub kind: TrackKind,
    pub label: String,
    state: TrackState,
}

impl MediaTrack {
    pub fn new(kind: TrackKind, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            state: TrackState::Live,
        }
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn stop(&mut self) {
        self.state = TrackState::Ended;
    }
}

/// A live camera stream owned by the capture manager.
pub trait MediaStream: Send {
    /// Device the stream was opened from.
    fn device(&self) -> &str;

    /// Intrinsic video resolution, once stream metadata is available.
    fn metadata(&self) -> Option<FrameSize>;

    /// Grab the frame currently visible on the stream.
    fn current_frame(&mut self) -> Result<Frame>;

    fn tracks(&self) -> &[MediaTrack];

    /// Stop every track. The stream produces no frames afterwards.
    fn stop_tracks(&mut self);
}

/// Source of camera streams.
pub trait CameraProvider: Send {
    fn open(&mut self, request: StreamRequest) -> Result<Box<dyn MediaStream>, CaptureUnavailable>;
}

// ----------------------------------------------------------------------------
// Stub camera (stub://) for demos and tests
// ----------------------------------------------------------------------------

/// Configuration for a camera device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraConfig {
    /// Device name (e.g., "stub://rear").
    pub device: String,
    /// Resolution reported by synthetic streams.
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "stub://rear".to_string(),
            width: 640,
            height: 480,
        }
    }
}

pub struct StubCamera {
    config: CameraConfig,
}

impl StubCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }
}

impl CameraProvider for StubCamera {
    fn open(&mut self, request: StreamRequest) -> Result<Box<dyn MediaStream>, CaptureUnavailable> {
        let Some(name) = self.config.device.strip_prefix("stub://") else {
            return Err(CaptureUnavailable::Unsupported);
        };
        match name {
            "denied" => Err(CaptureUnavailable::PermissionDenied),
            "absent" | "" => Err(CaptureUnavailable::NoDevice),
            _ => {
                log::info!(
                    "StubCamera: opened {} ({:?} facing, audio={})",
                    self.config.device,
                    request.facing,
                    request.audio
                );
                Ok(Box::new(SyntheticStream::new(&self.config, request)))
            }
        }
    }
}

struct SyntheticStream {
    device: String,
    size: FrameSize,
    tracks: Vec<MediaTrack>,
    frame_count: u64,
}

impl SyntheticStream {
    fn new(config: &CameraConfig, request: StreamRequest) -> Self {
        let mut tracks = vec![MediaTrack::new(TrackKind::Video, &config.device)];
        if request.audio {
            tracks.push(MediaTrack::new(TrackKind::Audio, &config.device));
        }
        Self {
            device: config.device.clone(),
            size: FrameSize::new(config.width, config.height),
            tracks,
            frame_count: 0,
        }
    }

    fn is_live(&self) -> bool {
        self.tracks
            .iter()
            .any(|track| track.kind == TrackKind::Video && track.state() == TrackState::Live)
    }

    /// Green gradient that drifts slowly between frames.
    fn generate_pixels(&self) -> Vec<u8> {
        let (w, h) = (self.size.width as u64, self.size.height as u64);
        let mut rgb = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                let shade = ((x + y + self.frame_count) % 96) as u8;
                rgb.extend_from_slice(&[32 + shade / 2, 96 + shade, 24 + shade / 3]);
            }
        }
        rgb
    }
}

impl MediaStream for SyntheticStream {
    fn device(&self) -> &str {
        &self.device
    }

    fn metadata(&self) -> Option<FrameSize> {
        Some(self.size)
    }

    fn current_frame(&mut self) -> Result<Frame> {
        if !self.is_live() {
            anyhow::bail!("stream {} has no live video track", self.device);
        }
        self.frame_count += 1;
        Frame::from_rgb(self.size.width, self.size.height, &self.generate_pixels())
    }

    fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    fn stop_tracks(&mut self) {
        for track in &mut self.tracks {
            track.stop();
        }
        log::debug!("SyntheticStream: stopped {} track(s) on {}", self.tracks.len(), self.device);
    }
}
