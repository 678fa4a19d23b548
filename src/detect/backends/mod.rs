pub mod fixture;

pub use fixture::{FixtureSource, DEFAULT_PICKS};
