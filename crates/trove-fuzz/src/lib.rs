//! Fuzzing library for trove-sdk.
//!
//! Targets cover the parsers that see untrusted text: PID extraction,
//! XML response decoding, search response models and tool arguments.
//!
//! # Usage
//!
//! ```bash
//! cd crates/trove-fuzz
//! cargo +nightly fuzz run fuzz_xml_decode -- -max_total_time=60
//! ```

pub use trove_sdk::{citation, models};
