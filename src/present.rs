//! Results panel: one card per detection and one tip per detection.

use std::fmt;

use crate::detect::{DetectionRecord, RiskLevel};

/// One entry in the results panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultCard {
    pub name: String,
    pub confidence_percent: u32,
    pub risk: RiskLevel,
}

impl fmt::Display for ResultCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | confidence {}% | {}",
            self.name, self.confidence_percent, self.risk
        )
    }
}

/// Contents of the results panel and tips list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultPanel {
    pub cards: Vec<ResultCard>,
    pub tips: Vec<String>,
}

impl ResultPanel {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty() && self.tips.is_empty()
    }
}

impl fmt::Display for ResultPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results:")?;
        for card in &self.cards {
            writeln!(f, "  - {}", card)?;
        }
        writeln!(f, "Tips:")?;
        for (index, tip) in self.tips.iter().enumerate() {
            writeln!(f, "  {}. {}", index + 1, tip)?;
        }
        Ok(())
    }
}

/// Build the results panel for `records`, keeping their order.
pub fn render(records: &[DetectionRecord]) -> ResultPanel {
    ResultPanel {
        cards: records
            .iter()
            .map(|record| ResultCard {
                name: record.label.clone(),
                confidence_percent: record.percent(),
                risk: record.risk,
            })
            .collect(),
        tips: records.iter().map(|record| record.advisory.clone()).collect(),
    }
}
