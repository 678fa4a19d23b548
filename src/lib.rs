//! Leafscan
//!
//! Capture a camera stream or a local image, run a detection source over the
//! current frame and present the findings as an overlay of labelled boxes plus
//! a results panel with advisory tips.
//!
//! The only detection source shipped is `FixtureSource`, which samples
//! canned plant-disease records. It sits behind the `DetectionSource` trait so
//! a real model can replace it without touching rendering or presentation.
//!
//! # Module Structure
//!
//! - `capture`: capture state machine (Idle, CameraActive, ImageLoaded)
//! - `ingest`: camera providers and image files
//! - `detect`: detection sources, fixtures and overlay slot layout
//! - `overlay`: transparent box/label canvas
//! - `present`: results panel and tips
//! - `session`: the page-level object tying the above together
//! - `config`: file + environment configuration

pub mod capture;
pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod overlay;
pub mod present;
pub mod session;
pub mod snapshot;
pub mod status;
pub mod ui;

pub use capture::{CaptureError, CaptureManager, CaptureState, Controls};
pub use config::{DetectionSettings, LeafscanConfig};
pub use detect::{
    confidence_percent, BoundingBox, DetectionRecord, DetectionSource, FixtureSource, RiskLevel,
    SourceRegistry,
};
pub use frame::{Frame, FrameSize};
pub use ingest::{
    CameraConfig, CameraProvider, CaptureUnavailable, FacingMode, ImageFile, MediaStream,
    MediaTrack, StreamRequest, StubCamera, TrackKind, TrackState,
};
pub use overlay::Overlay;
pub use present::{ResultCard, ResultPanel};
pub use session::{CycleId, Session, DEFAULT_DETECT_DELAY};
pub use status::Status;
