//! Overlay slot layout for detection records.

use image::Rgba;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::detect::result::{BoundingBox, DetectionRecord};

pub const SLOT_WIDTH: u32 = 180;
pub const SLOT_HEIGHT: u32 = 140;
const ORIGIN_X: i64 = 60;
const ORIGIN_Y: i64 = 80;
const STEP_X: i64 = 180;
const STEP_Y: i64 = 60;

/// `#20c997`, used by even slots.
pub const EVEN_SLOT_COLOR: Rgba<u8> = Rgba([0x20, 0xc9, 0x97, 0xff]);
/// `#ff9f43`, used by odd slots.
pub const ODD_SLOT_COLOR: Rgba<u8> = Rgba([0xff, 0x9f, 0x43, 0xff]);

/// Box for the record placed in `slot`.
pub fn slot_box(record: &DetectionRecord, slot: usize) -> BoundingBox {
    let index = slot as i64;
    BoundingBox {
        label: record.label.clone(),
        score: record.confidence,
        color: if slot % 2 == 0 {
            EVEN_SLOT_COLOR
        } else {
            ODD_SLOT_COLOR
        },
        x: ORIGIN_X + index * STEP_X,
        y: ORIGIN_Y + index * STEP_Y,
        width: SLOT_WIDTH,
        height: SLOT_HEIGHT,
    }
}

/// Lay records out left to right, one slot each, in order.
pub fn layout(records: &[DetectionRecord]) -> Vec<BoundingBox> {
    records
        .iter()
        .enumerate()
        .map(|(slot, record)| slot_box(record, slot))
        .collect()
}

/// Pick `min(k, fixtures.len())` distinct fixtures in random order.
pub fn sample<R: Rng + ?Sized>(
    fixtures: &[DetectionRecord],
    k: usize,
    rng: &mut R,
) -> Vec<DetectionRecord> {
    let mut order: Vec<&DetectionRecord> = fixtures.iter().collect();
    order.shuffle(rng);
    order.truncate(k);
    order.into_iter().cloned().collect()
}

/// Sample fixtures and lay them out as overlay boxes.
pub fn simulate<R: Rng + ?Sized>(
    fixtures: &[DetectionRecord],
    k: usize,
    rng: &mut R,
) -> Vec<BoundingBox> {
    layout(&sample(fixtures, k, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::fixtures::default_fixtures;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn slots_step_right_and_down() {
        let fixtures = default_fixtures();
        let boxes = layout(&fixtures);

        assert_eq!((boxes[0].x, boxes[0].y), (60, 80));
        assert_eq!((boxes[1].x, boxes[1].y), (240, 140));
        assert_eq!((boxes[2].x, boxes[2].y), (420, 200));
        assert!(boxes
            .iter()
            .all(|b| b.width == SLOT_WIDTH && b.height == SLOT_HEIGHT));
    }

    #[test]
    fn slot_colors_alternate_by_parity() {
        let fixtures = default_fixtures();
        let boxes = layout(&fixtures);
        assert_eq!(boxes[0].color, EVEN_SLOT_COLOR);
        assert_eq!(boxes[1].color, ODD_SLOT_COLOR);
        assert_eq!(boxes[2].color, EVEN_SLOT_COLOR);
    }

    #[test]
    fn simulate_returns_min_k_distinct_records() {
        let fixtures = default_fixtures();
        let mut rng = StdRng::seed_from_u64(7);

        for k in 0..=5 {
            for _ in 0..50 {
                let boxes = simulate(&fixtures, k, &mut rng);
                assert_eq!(boxes.len(), k.min(fixtures.len()));

                let mut labels: Vec<&str> = boxes.iter().map(|b| b.label.as_str()).collect();
                labels.sort_unstable();
                labels.dedup();
                assert_eq!(labels.len(), boxes.len(), "duplicate record in one cycle");
            }
        }
    }

    #[test]
    fn simulate_on_empty_fixtures_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(simulate(&[], 2, &mut rng).is_empty());
    }

    #[test]
    fn sampling_reaches_every_fixture() {
        let fixtures = default_fixtures();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            for record in sample(&fixtures, 1, &mut rng) {
                seen.insert(record.label);
            }
        }
        assert_eq!(seen.len(), fixtures.len());
    }

    #[test]
    fn boxes_carry_record_scores() {
        let fixtures = default_fixtures();
        let mut rng = StdRng::seed_from_u64(3);
        for bbox in simulate(&fixtures, 2, &mut rng) {
            let record = fixtures
                .iter()
                .find(|r| r.label == bbox.label)
                .expect("box label from fixtures");
            assert_eq!(bbox.score, record.confidence);
        }
    }
}
