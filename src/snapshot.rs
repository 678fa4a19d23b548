//! PNG export of the current frame.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use crate::frame::{Frame, FrameSize};

/// `snapshot-<unix millis>.png`
pub fn snapshot_file_name(at: SystemTime) -> Result<String> {
    let millis = at
        .duration_since(UNIX_EPOCH)
        .context("snapshot time is before the unix epoch")?
        .as_millis();
    Ok(format!("snapshot-{}.png", millis))
}

/// Write `frame`, scaled to `size`, into `dir`. Returns the written path.
pub fn export_snapshot(frame: &Frame, size: FrameSize, dir: &Path, at: SystemTime) -> Result<PathBuf> {
    let path = dir.join(snapshot_file_name(at)?);
    frame
        .scaled_to(size)
        .save_with_format(&path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    log::info!("snapshot written to {} ({})", path.display(), size);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn file_name_uses_unix_millis() -> Result<()> {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(snapshot_file_name(at)?, "snapshot-1700000000123.png");
        Ok(())
    }

    #[test]
    fn writes_png_at_requested_size() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let frame = Frame::from_rgb(4, 2, &[200; 24])?;
        let at = UNIX_EPOCH + Duration::from_secs(5);

        let path = export_snapshot(&frame, FrameSize::new(8, 4), dir.path(), at)?;
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("snapshot-5000.png"));

        let written = image::open(&path)?;
        assert_eq!((written.width(), written.height()), (8, 4));
        Ok(())
    }
}
