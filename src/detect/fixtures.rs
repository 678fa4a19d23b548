use std::path::Path;

use anyhow::{anyhow, Result};

use crate::detect::result::{DetectionRecord, RiskLevel};

/// Built-in stand-in records.
pub fn default_fixtures() -> Vec<DetectionRecord> {
    vec![
        DetectionRecord::new(
            "Rice blast",
            0.92,
            RiskLevel::High,
            "Spray tricyclazole right away and isolate affected plants.",
        ),
        DetectionRecord::new(
            "Aphid infestation",
            0.88,
            RiskLevel::Medium,
            "Apply a low-toxicity insecticide and improve ventilation.",
        ),
        DetectionRecord::new(
            "Powdery mildew",
            0.84,
            RiskLevel::Medium,
            "Cut back nitrogen fertilizer and spray a sulfur preparation.",
        ),
    ]
}

/// Load a fixture set from a JSON array of records.
pub fn load_fixtures(path: &Path) -> Result<Vec<DetectionRecord>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read fixtures {}: {}", path.display(), e))?;
    let records: Vec<DetectionRecord> = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid fixtures {}: {}", path.display(), e))?;
    validate_fixtures(&records)?;
    Ok(records)
}

fn validate_fixtures(records: &[DetectionRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(anyhow!("fixture set is empty"));
    }
    for record in records {
        if record.label.trim().is_empty() {
            return Err(anyhow!("fixture label must not be empty"));
        }
        if !(0.0..=1.0).contains(&record.confidence) {
            return Err(anyhow!(
                "fixture '{}' confidence {} is outside 0..=1",
                record.label,
                record.confidence
            ));
        }
    }
    Ok(())
}
