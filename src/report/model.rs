//! Report document model
//!
//! A report is an ordered array of features, each holding an ordered array
//! of scenarios (`elements`). Fields this tool does not interpret are kept
//! in flattened maps so nothing is lost across a stitch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One feature record: a named grouping of scenarios from one spec file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Scenario records, in execution order
    #[serde(default)]
    pub elements: Vec<Scenario>,

    /// Uninterpreted feature fields (id, name, uri, keyword, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One scenario record, identified by a stable id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Stable identity used to match rerun results against the original run
    pub id: String,

    /// Step results, replaced wholesale when a rerun refreshes the scenario
    #[serde(default)]
    pub steps: Vec<Value>,

    /// Uninterpreted scenario fields (name, keyword, tags, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
