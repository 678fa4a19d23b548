mod backend;
mod backends;
mod fixtures;
pub mod layout;
mod registry;
mod result;

pub use backend::DetectionSource;
pub use backends::{FixtureSource, DEFAULT_PICKS};
pub use fixtures::{default_fixtures, load_fixtures};
pub use layout::{layout, sample, simulate};
pub use registry::SourceRegistry;
pub use result::{confidence_percent, BoundingBox, DetectionRecord, RiskLevel};
