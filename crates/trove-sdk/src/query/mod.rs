//! Search parameters and the fluent builder that produces them.

mod builder;
mod params;

pub use builder::SearchBuilder;
pub use params::{SearchParams, START_CURSOR};
