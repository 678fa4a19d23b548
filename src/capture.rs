//! Capture source manager.
//!
//! Owns the single active input (camera stream or loaded image) and the
//! state machine around it:
//!
//! | from         | start_camera  | stop_camera | load_image  |
//! |--------------|---------------|-------------|-------------|
//! | Idle         | CameraActive  | rejected    | ImageLoaded |
//! | CameraActive | rejected      | Idle        | ImageLoaded |
//! | ImageLoaded  | CameraActive  | rejected    | ImageLoaded |
//!
//! The manager is the only owner of the camera stream. Every track is stopped
//! before the manager leaves `CameraActive`, and the object reference of a
//! loaded image is revoked before it is replaced or the manager leaves
//! `ImageLoaded`.

use std::fmt;

use anyhow::Result;

use crate::frame::{Frame, FrameSize};
use crate::ingest::{
    CameraProvider, CaptureUnavailable, ImageFile, MediaStream, ObjectRef, ObjectUrls,
    StreamRequest,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    CameraActive,
    ImageLoaded,
}

impl CaptureState {
    /// Which page controls are enabled in this state.
    pub fn controls(self) -> Controls {
        match self {
            CaptureState::Idle => Controls {
                detect: false,
                snapshot: false,
                stop: false,
            },
            CaptureState::CameraActive => Controls {
                detect: true,
                snapshot: true,
                stop: true,
            },
            CaptureState::ImageLoaded => Controls {
                detect: true,
                snapshot: false,
                stop: false,
            },
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureState::Idle => "idle",
            CaptureState::CameraActive => "camera active",
            CaptureState::ImageLoaded => "image loaded",
        };
        f.write_str(name)
    }
}

/// Enabled flags for the detect, snapshot and stop controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controls {
    pub detect: bool,
    pub snapshot: bool,
    pub stop: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Camera permission denied, no device, or no camera support.
    #[error("camera unavailable: {0}")]
    Unavailable(#[from] CaptureUnavailable),

    /// The operation's control is disabled in the current state.
    #[error("cannot {op} while {state}")]
    InvalidTransition {
        op: &'static str,
        state: CaptureState,
    },

    #[error("could not decode image {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

enum Input {
    None,
    Camera(Box<dyn MediaStream>),
    Image(ObjectRef),
}

pub struct CaptureManager {
    camera: Box<dyn CameraProvider>,
    objects: ObjectUrls,
    input: Input,
    /// Set when a transition happened before the frame size was known.
    resize_pending: bool,
}

impl CaptureManager {
    pub fn new(camera: Box<dyn CameraProvider>) -> Self {
        Self {
            camera,
            objects: ObjectUrls::new(),
            input: Input::None,
            resize_pending: false,
        }
    }

    pub fn state(&self) -> CaptureState {
        match self.input {
            Input::None => CaptureState::Idle,
            Input::Camera(_) => CaptureState::CameraActive,
            Input::Image(_) => CaptureState::ImageLoaded,
        }
    }

    pub fn controls(&self) -> Controls {
        self.state().controls()
    }

    /// Open the rear camera.
    ///
    /// Returns the frame size to resize the overlay to, when the stream already
    /// knows it. On failure the state is unchanged.
    pub fn start_camera(&mut self) -> Result<Option<FrameSize>, CaptureError> {
        let state = self.state();
        if state == CaptureState::CameraActive {
            return Err(CaptureError::InvalidTransition {
                op: "start camera",
                state,
            });
        }

        let stream = self.camera.open(StreamRequest::rear_video())?;
        log::info!("CaptureManager: camera {} granted", stream.device());

        self.release();
        self.input = Input::Camera(stream);
        Ok(self.request_resize())
    }

    /// Stop every track of the camera stream and return to idle.
    pub fn stop_camera(&mut self) -> Result<(), CaptureError> {
        let state = self.state();
        if state != CaptureState::CameraActive {
            return Err(CaptureError::InvalidTransition {
                op: "stop camera",
                state,
            });
        }
        self.release();
        log::info!("CaptureManager: camera stopped");
        Ok(())
    }

    /// Show `file` as the frame source. Valid from every state.
    ///
    /// Undecodable files leave the current input in place.
    pub fn load_image(&mut self, file: &ImageFile) -> Result<Option<FrameSize>, CaptureError> {
        let frame = file.decode().map_err(|source| CaptureError::Decode {
            name: file.name.clone(),
            source,
        })?;

        self.release();
        let object = self.objects.create(&file.name, frame);
        log::info!("CaptureManager: loaded {} as {}", file.name, object);
        self.input = Input::Image(object);
        Ok(self.request_resize())
    }

    /// Metadata signal from the frame source. Returns the size to resize to
    /// when a transition was still waiting for it.
    pub fn metadata_loaded(&mut self) -> Option<FrameSize> {
        if !self.resize_pending {
            return None;
        }
        self.request_resize()
    }

    /// Intrinsic size of the current frame source, if known.
    pub fn frame_size(&self) -> Option<FrameSize> {
        match &self.input {
            Input::None => None,
            Input::Camera(stream) => stream.metadata(),
            Input::Image(object) => self.objects.resolve(*object).map(Frame::size),
        }
    }

    /// The frame currently visible, or `None` when idle.
    pub fn current_frame(&mut self) -> Result<Option<Frame>> {
        match &mut self.input {
            Input::None => Ok(None),
            Input::Camera(stream) => stream.current_frame().map(Some),
            Input::Image(object) => Ok(self.objects.resolve(*object).cloned()),
        }
    }

    /// Object references still live. At most one while an image is loaded.
    pub fn live_objects(&self) -> usize {
        self.objects.live_count()
    }

    fn request_resize(&mut self) -> Option<FrameSize> {
        let size = self.frame_size();
        self.resize_pending = size.is_none();
        size
    }

    /// Drop the current input: stop stream tracks or revoke the object
    /// reference.
    fn release(&mut self) {
        match std::mem::replace(&mut self.input, Input::None) {
            Input::None => {}
            Input::Camera(mut stream) => {
                stream.stop_tracks();
                log::debug!("CaptureManager: released stream {}", stream.device());
            }
            Input::Image(object) => {
                self.objects.revoke(object);
            }
        }
        self.resize_pending = false;
    }
}

impl Drop for CaptureManager {
    fn drop(&mut self) {
        self.release();
    }
}
