//! Configuration file handling and run-configuration resolution
//!
//! Two layers feed a run: the tool's own config (`e2e.toml`) names the
//! runner config file, the features root, and the optional remote WebDriver
//! endpoint; the runner config's `[report]` section supplies the output
//! directory and the report format mapping. Everything resolves into one
//! immutable [`RunConfig`] per task invocation.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Error, Result};

/// Runner executable looked up on PATH when `runner` is not configured
const DEFAULT_RUNNER: &str = "protractor";

/// Report output directory used when the runner config sets none
const DEFAULT_OUTPUT_DIR: &str = "test/output";

/// Rerun list filename used when the format mapping has no `rerun` entry
const DEFAULT_RERUN_LIST: &str = "rerun.txt";

/// Raw tool configuration as written in `e2e.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    /// Path to the external runner's configuration file
    pub config_file: PathBuf,

    /// Root directory containing the `features/` tree
    pub base_test_dir: PathBuf,

    /// Remote WebDriver endpoint for named-browser runs
    #[serde(default)]
    pub selenium_address: Option<String>,

    /// Runner executable; bare names are resolved through PATH
    #[serde(default)]
    pub runner: Option<PathBuf>,
}

impl RawConfig {
    /// Load the raw tool configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        toml::from_str(&content).map_err(|e| Error::config_parse(path, e))
    }
}

/// The `[report]` section of the runner's configuration file.
///
/// The rest of that file belongs to the runner and is deliberately not
/// parsed here.
#[derive(Debug, Default, Deserialize)]
struct ReportSection {
    /// Directory the runner writes report artifacts into
    #[serde(default)]
    output: Option<PathBuf>,

    /// Format name to target filename, or the sentinel "console"
    #[serde(default)]
    format: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct RunnerConfig {
    #[serde(default)]
    report: ReportSection,
}

/// Fully resolved run configuration
///
/// Resolved exactly once per task invocation and read-only afterward; all
/// paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Absolute path to the runner's configuration file
    pub config_file: PathBuf,
    /// Absolute path to the directory containing `features/`
    pub base_test_dir: PathBuf,
    /// `base_test_dir/features`
    pub features_dir: PathBuf,
    /// Absolute path to the runner executable
    pub runner_bin: PathBuf,
    /// Remote WebDriver endpoint, if configured
    pub selenium_address: Option<String>,
    /// Absolute path for report artifacts
    pub output_dir: PathBuf,
    /// Report format mapping, emitted in name order
    pub report_formats: BTreeMap<String, String>,
}

impl RunConfig {
    /// Load and resolve the run configuration from the tool config at `path`
    pub fn load(path: &Path) -> Result<Self> {
        Self::resolve(RawConfig::load(path)?)
    }

    /// Resolve a raw configuration into an immutable `RunConfig`
    ///
    /// Fails when `config_file` or `base_test_dir` is absent or unreadable,
    /// when the runner config cannot be parsed, or when the runner
    /// executable cannot be found. Idempotent: the same raw input always
    /// resolves to the same value.
    pub fn resolve(raw: RawConfig) -> Result<Self> {
        let config_file = fs::canonicalize(&raw.config_file).map_err(|e| {
            Error::Config(format!(
                "config_file '{}' is not readable: {}",
                raw.config_file.display(),
                e
            ))
        })?;

        let base_test_dir = fs::canonicalize(&raw.base_test_dir).map_err(|e| {
            Error::Config(format!(
                "base_test_dir '{}' is not readable: {}",
                raw.base_test_dir.display(),
                e
            ))
        })?;

        let content =
            fs::read_to_string(&config_file).map_err(|e| Error::file_read(&config_file, e))?;
        let runner_config: RunnerConfig =
            toml::from_str(&content).map_err(|e| Error::config_parse(&config_file, e))?;

        let output_dir = match runner_config.report.output {
            Some(dir) => absolutize(&dir)?,
            None => absolutize(Path::new(DEFAULT_OUTPUT_DIR))?,
        };

        let runner_bin = resolve_runner(raw.runner.as_deref())?;
        let features_dir = base_test_dir.join("features");

        Ok(Self {
            config_file,
            base_test_dir,
            features_dir,
            runner_bin,
            selenium_address: raw.selenium_address,
            output_dir,
            report_formats: runner_config.report.format,
        })
    }

    /// Path of the rerun list written by the runner's rerun formatter
    pub fn rerun_list_path(&self) -> PathBuf {
        let name = self
            .report_formats
            .get("rerun")
            .map(String::as_str)
            .unwrap_or(DEFAULT_RERUN_LIST);
        self.output_dir.join(name)
    }

    /// Target filename of the json report format, if one is configured
    pub fn json_target(&self) -> Option<&str> {
        self.report_formats.get("json").map(String::as_str)
    }
}

/// Locate the runner executable
///
/// Bare names go through a PATH lookup; anything with a path component must
/// exist on disk. A missing runner aborts before anything is spawned.
fn resolve_runner(runner: Option<&Path>) -> Result<PathBuf> {
    let name = runner.unwrap_or(Path::new(DEFAULT_RUNNER));

    if name.components().count() > 1 || name.is_absolute() {
        return fs::canonicalize(name).map_err(|e| Error::RunnerNotFound {
            name: name.display().to_string(),
            reason: e.to_string(),
        });
    }

    which::which(name).map_err(|e| Error::RunnerNotFound {
        name: name.display().to_string(),
        reason: e.to_string(),
    })
}

/// Make a path absolute against the current working directory
fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Lay out a minimal project: tool config, runner config, features dir
    fn fixture(dir: &Path, report_section: &str) -> RawConfig {
        let runner_conf = dir.join("runner.conf.toml");
        fs::write(&runner_conf, report_section).unwrap();

        let base = dir.join("e2e");
        fs::create_dir_all(base.join("features")).unwrap();

        // Any existing file stands in for the runner executable
        let runner_bin = dir.join("fake-runner");
        fs::write(&runner_bin, "#!/bin/sh\n").unwrap();

        RawConfig {
            config_file: runner_conf,
            base_test_dir: base,
            selenium_address: Some("http://localhost:4444/wd/hub".to_string()),
            runner: Some(runner_bin),
        }
    }

    #[test]
    fn resolves_paths_and_formats() {
        let dir = tempfile::tempdir().unwrap();
        let raw = fixture(
            dir.path(),
            "[report]\noutput = \"/tmp/e2e-out\"\n[report.format]\njson = \"report.json\"\npretty = \"console\"\nrerun = \"rerun.txt\"\n",
        );

        let config = RunConfig::resolve(raw).unwrap();
        assert!(config.config_file.is_absolute());
        assert_eq!(config.features_dir, config.base_test_dir.join("features"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/e2e-out"));
        assert_eq!(config.json_target(), Some("report.json"));
        assert_eq!(config.rerun_list_path(), PathBuf::from("/tmp/e2e-out/rerun.txt"));
        assert_eq!(config.report_formats.len(), 3);
    }

    #[test]
    fn defaults_output_dir_when_unset() {
        let dir = tempfile::tempdir().unwrap();
        let raw = fixture(dir.path(), "");

        let config = RunConfig::resolve(raw).unwrap();
        let expected = env::current_dir().unwrap().join(DEFAULT_OUTPUT_DIR);
        assert_eq!(config.output_dir, expected);
        // No rerun format configured: fall back to rerun.txt
        assert_eq!(config.rerun_list_path(), expected.join(DEFAULT_RERUN_LIST));
        assert_eq!(config.json_target(), None);
    }

    #[test]
    fn missing_base_test_dir_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut raw = fixture(dir.path(), "");
        raw.base_test_dir = dir.path().join("does-not-exist");

        match RunConfig::resolve(raw) {
            Err(Error::Config(msg)) => assert!(msg.contains("base_test_dir")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn missing_runner_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut raw = fixture(dir.path(), "");
        raw.config_file = dir.path().join("missing.conf.toml");

        assert!(matches!(RunConfig::resolve(raw), Err(Error::Config(_))));
    }

    #[test]
    fn missing_runner_binary_aborts_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let mut raw = fixture(dir.path(), "");
        raw.runner = Some(dir.path().join("no-such-runner"));

        assert!(matches!(
            RunConfig::resolve(raw),
            Err(Error::RunnerNotFound { .. })
        ));
    }

    #[test]
    fn resolution_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let raw = fixture(dir.path(), "[report.format]\njson = \"report.json\"\n");

        let first = RunConfig::resolve(raw.clone()).unwrap();
        let second = RunConfig::resolve(raw).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn raw_config_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e2e.toml");
        fs::write(&path, "config_file = [not toml").unwrap();

        assert!(matches!(
            RawConfig::load(&path),
            Err(Error::ConfigParse { .. })
        ));
    }
}
