use anyhow::Result;

use crate::detect::result::DetectionRecord;
use crate::frame::Frame;

/// Source of detection records for a frame.
///
/// This is the seam between capture and inference. Rendering and presentation
/// only ever see the returned records, so a real model can replace the fixture
/// sampler without touching either.
pub trait DetectionSource: Send {
    /// Source identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    ///
    /// Records are returned in display order: the first record takes the first
    /// overlay slot and the first result card.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectionRecord>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
