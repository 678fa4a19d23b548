//! One-line status shown above the frame.

use std::fmt;

pub const MSG_IDLE: &str = "Start the camera or upload an image.";
pub const MSG_CAMERA_CONNECTED: &str = "Camera connected, waiting for detection.";
pub const MSG_CAMERA_FAILED: &str = "Camera connection failed, check permission settings.";
pub const MSG_CAMERA_CLOSED: &str = "Camera closed.";
pub const MSG_IMAGE_LOADED: &str = "Image loaded, start detection when ready.";
pub const MSG_NO_SOURCE: &str = "Start the camera or upload an image first.";
pub const MSG_DETECTING: &str = "Detecting, analyzing image...";
pub const MSG_DETECTED: &str = "Detection complete, results updated.";
pub const MSG_DETECT_FAILED: &str = "Detection failed, try again.";

/// Status text plus its tone: active (working/ok) or attention.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub active: bool,
}

impl Status {
    pub fn active(text: &str) -> Self {
        Self {
            text: text.to_string(),
            active: true,
        }
    }

    pub fn attention(text: &str) -> Self {
        Self {
            text: text.to_string(),
            active: false,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::attention(MSG_IDLE)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.active { "*" } else { "!" };
        write!(f, "[{}] {}", marker, self.text)
    }
}
