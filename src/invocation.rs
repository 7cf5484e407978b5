//! Runner invocation building
//!
//! Turns a resolved [`RunConfig`], an [`InvocationRequest`], and an
//! immutable [`Overrides`] map into the external runner's argument vector.
//! The vector is built by a fixed, ordered list of pure emission steps so
//! that identical inputs always produce identical command lines.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::common::{Error, Result, RunConfig};

/// Browser driven in direct-connection mode when none is requested
const DEFAULT_BROWSER: &str = "chrome";

/// Filename the json report is redirected to during a rerun pass, keeping
/// rerun output apart from the original report until the two are stitched
pub const RERUN_RESULTS_FILE: &str = "rerun.json";

/// Override keys consumed by dedicated emission steps; these are never
/// forwarded as generic flags. `_` is the positional-arguments key.
const RESERVED_KEYS: &[&str] = &["_", "r", "rerun", "browserName", "platform", "seleniumAddress"];

/// Parameters of one run, constructed from task arguments and consumed
/// once by the builder
#[derive(Debug, Clone, Default)]
pub struct InvocationRequest {
    /// Suite directory under the features root, empty for all suites
    pub suite: String,
    /// Feature file name within the suite, empty for all features
    pub feature: String,
    /// Raw tag expression, individual tags joined with `&&`
    pub tags: String,
    /// Browser for direct-connection runs, empty for the default
    pub browser: String,
    /// Whether this invocation re-executes previously failed scenarios
    pub rerun_mode: bool,
}

/// Explicit key/value override map, never mutated after construction
///
/// Replaces the ambient mutable option bag of classic task runners: every
/// source of overrides is merged up front and the builder only reads.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    values: BTreeMap<String, String>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an override map from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Return a new map with one additional (or replaced) entry
    pub fn with(&self, key: &str, value: &str) -> Self {
        let mut values = self.values.clone();
        values.insert(key.to_string(), value.to_string());
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Explicit browser name, switching the run into remote mode
    pub fn browser_name(&self) -> Option<&str> {
        self.get("browserName")
    }

    /// Explicit remote address; highest-priority source for this key
    pub fn selenium_address(&self) -> Option<&str> {
        self.get("seleniumAddress")
    }

    /// Explicit platform capability
    pub fn platform(&self) -> Option<&str> {
        self.get("platform")
    }

    /// Whether an automatic rerun pass was requested (`rerun` or `r`)
    pub fn rerun_requested(&self) -> bool {
        [self.get("rerun"), self.get("r")]
            .into_iter()
            .flatten()
            .any(|v| v != "false" && v != "0")
    }

    /// Entries not claimed by a dedicated emission step, in sorted order
    fn remaining(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One pure flag-emission step
type EmitStep = fn(&RunConfig, &InvocationRequest, &Overrides) -> Vec<String>;

/// Emission steps in their contractual order: spec selection, connection
/// capabilities, generic overrides, tag filters, report formats, color
/// suppression
const STEPS: &[EmitStep] = &[
    spec_selection,
    connection,
    platform,
    generic_overrides,
    tag_filters,
    report_formats,
    color_suppression,
];

/// Build the runner's argument vector
///
/// Position 0 is the runner executable, position 1 the runner config file;
/// the remaining entries come from the emission steps. Side effect: creates
/// the output directory when it does not exist yet.
pub fn build(
    config: &RunConfig,
    req: &InvocationRequest,
    overrides: &Overrides,
) -> Result<Vec<String>> {
    fs::create_dir_all(&config.output_dir).map_err(|e| Error::OutputDir {
        path: config.output_dir.display().to_string(),
        error: e.to_string(),
    })?;

    let mut argv = vec![
        config.runner_bin.display().to_string(),
        config.config_file.display().to_string(),
    ];
    for step in STEPS {
        argv.extend(step(config, req, overrides));
    }
    Ok(argv)
}

/// Step 1: spec selection. A feature selects `suite/**/*/<feature>`, a bare
/// suite selects `suite/**/*.feature`, otherwise nothing is emitted and an
/// externally supplied `specs` override flows through the generic step.
fn spec_selection(config: &RunConfig, req: &InvocationRequest, _: &Overrides) -> Vec<String> {
    let mut base = config.features_dir.clone();
    if !req.suite.is_empty() {
        base = base.join(&req.suite);
    }

    let pattern: Option<PathBuf> = if !req.feature.is_empty() {
        Some(base.join("**/*").join(&req.feature))
    } else if !req.suite.is_empty() {
        Some(base.join("**/*.feature"))
    } else {
        None
    };

    pattern
        .map(|p| vec![format!("--specs={}", p.display())])
        .unwrap_or_default()
}

/// Steps 2 and 3: connection mode. A `browserName` override selects remote
/// mode against the resolved address; otherwise the runner drives a local
/// browser directly. An explicit `seleniumAddress` override replaces the
/// configured address and is forwarded even in direct mode.
fn connection(config: &RunConfig, req: &InvocationRequest, overrides: &Overrides) -> Vec<String> {
    let mut flags = Vec::new();

    if let Some(name) = overrides.browser_name() {
        flags.push(format!("--capabilities.browserName={name}"));
        let address = overrides
            .selenium_address()
            .or(config.selenium_address.as_deref());
        if let Some(addr) = address {
            flags.push(format!("--seleniumAddress={addr}"));
        }
    } else {
        flags.push("--directConnect".to_string());
        let browser = if req.browser.is_empty() {
            DEFAULT_BROWSER
        } else {
            &req.browser
        };
        flags.push(format!("--capabilities.browserName={browser}"));
        if let Some(addr) = overrides.selenium_address() {
            flags.push(format!("--seleniumAddress={addr}"));
        }
    }

    flags
}

/// Step 4: platform capability
fn platform(_: &RunConfig, _: &InvocationRequest, overrides: &Overrides) -> Vec<String> {
    overrides
        .platform()
        .map(|p| vec![format!("--capabilities.platform={p}")])
        .unwrap_or_default()
}

/// Step 5: remaining override entries, forwarded verbatim. Values are
/// opaque strings; validating them is the runner's job.
fn generic_overrides(_: &RunConfig, _: &InvocationRequest, overrides: &Overrides) -> Vec<String> {
    overrides
        .remaining()
        .map(|(k, v)| format!("--{k}={v}"))
        .collect()
}

/// Step 6: tag filters, one flag per `&&`-separated expression, in split
/// order
fn tag_filters(_: &RunConfig, req: &InvocationRequest, _: &Overrides) -> Vec<String> {
    req.tags
        .split("&&")
        .filter(|t| !t.is_empty())
        .map(|t| format!("--cucumberOpts.tags={t}"))
        .collect()
}

/// Step 7: report formats in mapping order. During a rerun pass the json
/// report is redirected to the rerun results file so the stitcher can merge
/// two distinct documents.
fn report_formats(config: &RunConfig, req: &InvocationRequest, _: &Overrides) -> Vec<String> {
    let mut flags = Vec::new();
    for (name, target) in &config.report_formats {
        if req.rerun_mode && name == "json" {
            flags.push(format!(
                "--cucumberOpts.format=json:{}",
                config.output_dir.join(RERUN_RESULTS_FILE).display()
            ));
        } else if target == "console" {
            flags.push(format!("--cucumberOpts.format={name}"));
        } else {
            flags.push(format!(
                "--cucumberOpts.format={name}:{}",
                config.output_dir.join(target).display()
            ));
        }
    }
    flags
}

/// Step 8: named-browser runs are usually captured rather than watched, so
/// ANSI colors are disabled for them
fn color_suppression(_: &RunConfig, _: &InvocationRequest, overrides: &Overrides) -> Vec<String> {
    if overrides.browser_name().is_some() {
        vec!["--cucumberOpts.no-colors".to_string()]
    } else {
        Vec::new()
    }
}
