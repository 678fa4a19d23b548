use std::fmt;

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Risk attached to a detected condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk",
            RiskLevel::Medium => "Medium risk",
            RiskLevel::High => "High risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single detected condition, as produced by a `DetectionSource`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub label: String,
    /// Confidence in 0..=1.
    pub confidence: f32,
    pub risk: RiskLevel,
    /// Advice shown in the tips list.
    pub advisory: String,
}

impl DetectionRecord {
    pub fn new(label: &str, confidence: f32, risk: RiskLevel, advisory: &str) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            risk,
            advisory: advisory.to_string(),
        }
    }

    /// Rounded confidence percentage shown to the user.
    pub fn percent(&self) -> u32 {
        confidence_percent(self.confidence)
    }
}

/// Box drawn on the overlay for one record in one detection cycle.
///
/// Coordinates are canvas pixels relative to the frame's top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub label: String,
    pub score: f32,
    pub color: Rgba<u8>,
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Text placed next to the box, e.g. `"Rice blast 92%"`.
    pub fn caption(&self) -> String {
        format!("{} {}%", self.label, confidence_percent(self.score))
    }
}

/// Convert a 0..=1 score to a whole percentage, rounding half up.
///
/// The score is first fixed to six decimal places so binary float noise does not
/// decide the rounding direction (0.925 is 93, 0.885 is 89).
pub fn confidence_percent(score: f32) -> u32 {
    let clamped = if score.is_nan() {
        0.0
    } else {
        f64::from(score.clamp(0.0, 1.0))
    };
    let millionths = (clamped * 1_000_000.0).round() as u64;
    ((millionths + 5_000) / 10_000) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_at_percentage_boundary() {
        assert_eq!(confidence_percent(0.925), 93);
        assert_eq!(confidence_percent(0.885), 89);
        assert_eq!(confidence_percent(0.8849), 88);
        assert_eq!(confidence_percent(0.005), 1);
        assert_eq!(confidence_percent(0.004999), 0);
        assert_eq!(confidence_percent(0.995), 100);
    }

    #[test]
    fn exact_scores_are_unchanged() {
        assert_eq!(confidence_percent(0.92), 92);
        assert_eq!(confidence_percent(0.88), 88);
        assert_eq!(confidence_percent(0.84), 84);
        assert_eq!(confidence_percent(0.0), 0);
        assert_eq!(confidence_percent(1.0), 100);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        assert_eq!(confidence_percent(1.7), 100);
        assert_eq!(confidence_percent(-0.2), 0);
        assert_eq!(confidence_percent(f32::NAN), 0);
    }

    #[test]
    fn caption_uses_rounded_percentage() {
        let bbox = BoundingBox {
            label: "Powdery mildew".to_string(),
            score: 0.925,
            color: Rgba([0, 0, 0, 255]),
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        };
        assert_eq!(bbox.caption(), "Powdery mildew 93%");
    }
}
