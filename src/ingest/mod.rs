//! Input sources for the session.
//!
//! - Cameras (`CameraProvider`), with a synthetic `stub://` provider
//! - Local image files, held behind revocable object references
//!
//! Sources hand frames to the capture manager on demand. Nothing here writes
//! frames to disk.

pub mod camera;
pub mod file;

pub use camera::{
    CameraConfig, CameraProvider, CaptureUnavailable, FacingMode, MediaStream, MediaTrack,
    StreamRequest, StubCamera, TrackKind, TrackState,
};
pub use file::{ImageFile, ObjectRef, ObjectUrls};
