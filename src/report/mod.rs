//! Cucumber JSON report handling
//!
//! The report model keeps only what stitching needs (scenario identity and
//! steps) and carries everything else through untouched, so a merged report
//! stays valid input for downstream formatters.

pub mod model;
pub mod stitch;

pub use model::{Feature, Scenario};
pub use stitch::stitch;
