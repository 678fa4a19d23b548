use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use leafscan::status::{MSG_CAMERA_CONNECTED, MSG_CAMERA_FAILED, MSG_DETECTED, MSG_IMAGE_LOADED};
use leafscan::{
    CameraProvider, CaptureError, CaptureState, CaptureUnavailable, Controls, FixtureSource, Frame,
    FrameSize, ImageFile, MediaStream, MediaTrack, Session, StreamRequest, TrackKind,
    DEFAULT_DETECT_DELAY,
};

/// Camera whose answer and metadata timing are scripted by the test.
struct MockCamera {
    outcome: Result<(), CaptureUnavailable>,
    size: FrameSize,
    metadata_ready: Arc<AtomicBool>,
    stopped_tracks: Arc<AtomicUsize>,
    requests: Arc<AtomicUsize>,
}

struct MockStream {
    size: FrameSize,
    metadata_ready: Arc<AtomicBool>,
    stopped_tracks: Arc<AtomicUsize>,
    tracks: Vec<MediaTrack>,
}

impl CameraProvider for MockCamera {
    fn open(&mut self, request: StreamRequest) -> Result<Box<dyn MediaStream>, CaptureUnavailable> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request, StreamRequest::rear_video());
        self.outcome?;
        Ok(Box::new(MockStream {
            size: self.size,
            metadata_ready: self.metadata_ready.clone(),
            stopped_tracks: self.stopped_tracks.clone(),
            tracks: vec![MediaTrack::new(TrackKind::Video, "mock")],
        }))
    }
}

impl MediaStream for MockStream {
    fn device(&self) -> &str {
        "mock://rear"
    }

    fn metadata(&self) -> Option<FrameSize> {
        self.metadata_ready
            .load(Ordering::SeqCst)
            .then_some(self.size)
    }

    fn current_frame(&mut self) -> Result<Frame> {
        let bytes = vec![90u8; (self.size.width * self.size.height * 3) as usize];
        Frame::from_rgb(self.size.width, self.size.height, &bytes)
    }

    fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    fn stop_tracks(&mut self) {
        for track in &mut self.tracks {
            track.stop();
            self.stopped_tracks.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct Harness {
    session: Session,
    metadata_ready: Arc<AtomicBool>,
    stopped_tracks: Arc<AtomicUsize>,
    requests: Arc<AtomicUsize>,
}

fn harness(outcome: Result<(), CaptureUnavailable>, metadata_ready: bool) -> Harness {
    let metadata_ready = Arc::new(AtomicBool::new(metadata_ready));
    let stopped_tracks = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(AtomicUsize::new(0));
    let camera = MockCamera {
        outcome,
        size: FrameSize::new(1280, 720),
        metadata_ready: metadata_ready.clone(),
        stopped_tracks: stopped_tracks.clone(),
        requests: requests.clone(),
    };
    let source = FixtureSource::default().with_seed(2024);
    Harness {
        session: Session::new(Box::new(camera), Box::new(source), FrameSize::new(640, 360)),
        metadata_ready,
        stopped_tracks,
        requests,
    }
}

fn png_file(width: u32, height: u32) -> ImageFile {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 140, 60, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    ImageFile::new("field.png", out.into_inner())
}

const ALL_ENABLED: Controls = Controls {
    detect: true,
    snapshot: true,
    stop: true,
};

const ALL_DISABLED: Controls = Controls {
    detect: false,
    snapshot: false,
    stop: false,
};

#[test]
fn granted_camera_detects_two_boxes_matching_cards() -> Result<()> {
    let mut h = harness(Ok(()), true);

    h.session.start_camera()?;
    assert_eq!(h.session.state(), CaptureState::CameraActive);
    assert_eq!(h.session.controls(), ALL_ENABLED);
    assert_eq!(h.session.status().text, MSG_CAMERA_CONNECTED);
    assert!(h.session.status().active);
    assert_eq!(h.session.overlay().size(), FrameSize::new(1280, 720));

    let t0 = Instant::now();
    h.session.detect(t0)?;
    assert!(h.session.overlay().is_blank());
    h.session.poll(t0 + DEFAULT_DETECT_DELAY)?;

    let boxes = h.session.boxes();
    let cards = &h.session.results().cards;
    assert_eq!(boxes.len(), 2);
    assert_eq!(cards.len(), 2);
    assert_eq!(h.session.results().tips.len(), 2);
    for (bbox, card) in boxes.iter().zip(cards) {
        assert_eq!(bbox.label, card.name);
    }

    let labels = h.session.overlay().labels();
    assert_eq!(labels.len(), 2);
    for (label, card) in labels.iter().zip(cards) {
        assert_eq!(
            label.text,
            format!("{} {}%", card.name, card.confidence_percent)
        );
    }
    assert_eq!(h.session.status().text, MSG_DETECTED);
    Ok(())
}

#[test]
fn denied_camera_stays_idle_with_failure_message() {
    let mut h = harness(Err(CaptureUnavailable::PermissionDenied), true);

    let err = h.session.start_camera().unwrap_err();
    assert!(matches!(
        err,
        CaptureError::Unavailable(CaptureUnavailable::PermissionDenied)
    ));
    assert_eq!(h.session.state(), CaptureState::Idle);
    assert_eq!(h.session.controls(), ALL_DISABLED);
    assert_eq!(h.session.status().text, MSG_CAMERA_FAILED);
    assert!(!h.session.status().active);
    assert!(h.session.placeholder_visible());
    // One request, no automatic retry.
    assert_eq!(h.requests.load(Ordering::SeqCst), 1);
}

#[test]
fn loading_image_while_camera_active_releases_stream() -> Result<()> {
    let mut h = harness(Ok(()), true);
    h.session.start_camera()?;

    h.session.load_image(&png_file(300, 200))?;
    assert_eq!(h.session.state(), CaptureState::ImageLoaded);
    assert_eq!(
        h.session.controls(),
        Controls {
            detect: true,
            snapshot: false,
            stop: false
        }
    );
    assert_eq!(h.session.status().text, MSG_IMAGE_LOADED);
    assert_eq!(h.stopped_tracks.load(Ordering::SeqCst), 1);
    assert_eq!(h.session.overlay().size(), FrameSize::new(300, 200));
    assert_eq!(h.session.capture().live_objects(), 1);

    // Detection still works on the image.
    let t0 = Instant::now();
    assert!(h.session.detect(t0)?.is_some());
    assert_eq!(h.session.poll(t0 + DEFAULT_DETECT_DELAY)?, 1);
    assert_eq!(h.session.boxes().len(), 2);
    Ok(())
}

#[test]
fn stop_camera_stops_every_track() -> Result<()> {
    let mut h = harness(Ok(()), true);
    h.session.start_camera()?;
    h.session.stop_camera()?;

    assert_eq!(h.stopped_tracks.load(Ordering::SeqCst), 1);
    assert_eq!(h.session.state(), CaptureState::Idle);
    assert_eq!(h.session.controls(), ALL_DISABLED);
    assert!(matches!(
        h.session.stop_camera(),
        Err(CaptureError::InvalidTransition { .. })
    ));
    Ok(())
}

#[test]
fn resize_waits_for_stream_metadata() -> Result<()> {
    let mut h = harness(Ok(()), false);
    h.session.start_camera()?;
    assert_eq!(h.session.overlay().size(), FrameSize::new(640, 360));

    // Before metadata the window size is the fallback.
    h.session.window_resized(FrameSize::new(800, 450));
    assert_eq!(h.session.overlay().size(), FrameSize::new(800, 450));

    h.metadata_ready.store(true, Ordering::SeqCst);
    h.session.metadata_loaded();
    assert_eq!(h.session.overlay().size(), FrameSize::new(1280, 720));

    // Window resizes keep tracking the intrinsic size once known.
    h.session.window_resized(FrameSize::new(400, 300));
    assert_eq!(h.session.overlay().size(), FrameSize::new(1280, 720));
    Ok(())
}

#[test]
fn later_cycle_overwrites_earlier_overlay() -> Result<()> {
    let mut h = harness(Ok(()), true);
    h.session.start_camera()?;

    let t0 = Instant::now();
    h.session.detect(t0)?;
    h.session.detect(t0 + Duration::from_millis(50))?;

    assert_eq!(h.session.poll(t0 + DEFAULT_DETECT_DELAY)?, 1);
    let first = h.session.overlay().labels().to_vec();
    assert_eq!(first.len(), 2);

    assert_eq!(h.session.poll(t0 + Duration::from_secs(2))?, 1);
    let boxes = h.session.boxes();
    assert_eq!(h.session.overlay().labels().len(), 2);
    for (label, bbox) in h.session.overlay().labels().iter().zip(boxes) {
        assert!(label.text.starts_with(&bbox.label));
    }
    Ok(())
}

#[test]
fn empty_detection_clears_previous_annotations() -> Result<()> {
    let mut h = harness(Ok(()), true);
    h.session.start_camera()?;
    let t0 = Instant::now();
    h.session.detect(t0)?;
    h.session.poll(t0 + DEFAULT_DETECT_DELAY)?;
    assert!(!h.session.overlay().is_blank());

    h.session.stop_camera()?;
    assert!(h.session.overlay().is_blank());
    Ok(())
}
