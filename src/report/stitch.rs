//! Report stitching
//!
//! Merges a rerun report into the original run's report by scenario
//! identity: a rerun scenario refreshes the matching original scenario's
//! steps, rerun-only scenarios are dropped, and feature/scenario order from
//! the original is preserved. The merged report is staged through a temp
//! file and atomically renamed into place before the source files are
//! deleted, so a failed stitch never loses the original report.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::model::{Feature, Scenario};
use crate::common::{Error, Result};

/// Merge the rerun and original JSON reports found in `output_dir` and
/// write the consolidated report to `output_dir/<json_target>`
pub fn stitch(output_dir: &Path, json_target: &str) -> Result<()> {
    let (original_path, rerun_path) = find_report_pair(output_dir)?;

    tracing::debug!(
        original = %original_path.display(),
        rerun = %rerun_path.display(),
        "stitching rerun results"
    );

    let original = read_report(&original_path)?;
    let rerun = read_report(&rerun_path)?;
    let merged = merge(original, &rerun)?;

    let target = output_dir.join(json_target);
    write_staged(output_dir, &target, &merged)?;

    // Sources are consumed only once the merged report is durably in place
    fs::remove_file(&rerun_path)?;
    if original_path != target {
        fs::remove_file(&original_path)?;
    }

    Ok(())
}

/// Locate exactly one original and one rerun JSON report in `dir`
///
/// Rerun reports are named `rerun*.json`; any other `*.json` file is an
/// original-report candidate. More than one candidate per class means the
/// directory holds leftovers from another run and merging would be unsafe.
fn find_report_pair(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let mut originals = Vec::new();
    let mut reruns = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| Error::file_read(dir, e))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".json") || !path.is_file() {
            continue;
        }
        if name.starts_with("rerun") {
            reruns.push(path);
        } else {
            originals.push(path);
        }
    }

    originals.sort();
    reruns.sort();

    if originals.len() > 1 {
        return Err(Error::ambiguous_reports("original", dir, &originals));
    }
    if reruns.len() > 1 {
        return Err(Error::ambiguous_reports("rerun", dir, &reruns));
    }

    let original = originals.pop().ok_or_else(|| {
        Error::MissingReport(format!(
            "no original JSON report in '{}': nothing to merge into",
            dir.display()
        ))
    })?;
    let rerun = reruns.pop().ok_or_else(|| {
        Error::MissingReport(format!(
            "no rerun JSON report in '{}': nothing to merge",
            dir.display()
        ))
    })?;

    Ok((original, rerun))
}

fn read_report(path: &Path) -> Result<Vec<Feature>> {
    let content = fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Merge rerun scenario steps into the original report
fn merge(mut original: Vec<Feature>, rerun: &[Feature]) -> Result<Vec<Feature>> {
    // Flatten both reports into scenario lists, preserving order
    let mut flat: Vec<Scenario> = original
        .iter()
        .flat_map(|f| f.elements.iter().cloned())
        .collect();

    // Replace stale steps in place; a rerun scenario without an original
    // counterpart is dropped, rerun refreshes known scenarios only
    for fresh in rerun.iter().flat_map(|f| f.elements.iter()) {
        if let Some(stale) = flat.iter_mut().find(|s| s.id == fresh.id) {
            stale.steps = fresh.steps.clone();
        }
    }

    // Reconstruct along the original nesting, looking steps up by id. A
    // miss here means the flattened list got corrupted mid-merge.
    for feature in &mut original {
        for scenario in &mut feature.elements {
            let steps = flat
                .iter()
                .find(|s| s.id == scenario.id)
                .ok_or_else(|| Error::ReportIntegrity(scenario.id.clone()))?
                .steps
                .clone();
            scenario.steps = steps;
        }
    }

    Ok(original)
}

/// Stage the merged report in a temp file, then rename it over the target
fn write_staged(dir: &Path, target: &Path, report: &[Feature]) -> Result<()> {
    let json = serde_json::to_vec_pretty(report)?;

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| Error::file_write(target, e))?;
    staged
        .write_all(&json)
        .map_err(|e| Error::file_write(target, e))?;
    staged
        .persist(target)
        .map_err(|e| Error::file_write(target, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn write_json(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn original_report() -> Value {
        json!([
            {
                "name": "Checkout",
                "uri": "features/checkout.feature",
                "elements": [
                    { "id": "checkout;pay-by-card", "name": "Pay by card", "steps": [{"result": {"status": "passed"}}] },
                    { "id": "checkout;pay-by-invoice", "name": "Pay by invoice", "steps": [{"result": {"status": "failed"}}] }
                ]
            }
        ])
    }

    #[test]
    fn rerun_steps_replace_matching_scenario_in_place() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "report.json", &original_report());
        write_json(
            dir.path(),
            "rerun.json",
            &json!([
                {
                    "name": "Checkout",
                    "elements": [
                        { "id": "checkout;pay-by-invoice", "steps": [{"result": {"status": "passed"}}] }
                    ]
                }
            ]),
        );

        stitch(dir.path(), "report.json").unwrap();

        let merged = read_json(&dir.path().join("report.json"));
        let elements = &merged[0]["elements"];
        // Order preserved, only the rerun scenario's steps refreshed
        assert_eq!(elements[0]["id"], "checkout;pay-by-card");
        assert_eq!(elements[0]["steps"][0]["result"]["status"], "passed");
        assert_eq!(elements[1]["id"], "checkout;pay-by-invoice");
        assert_eq!(elements[1]["steps"][0]["result"]["status"], "passed");
        // The rerun source is gone
        assert!(!dir.path().join("rerun.json").exists());
    }

    #[test]
    fn rerun_only_scenarios_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "report.json", &original_report());
        write_json(
            dir.path(),
            "rerun.json",
            &json!([
                { "elements": [ { "id": "checkout;unknown", "steps": [{"ghost": true}] } ] }
            ]),
        );

        stitch(dir.path(), "report.json").unwrap();

        let merged = read_json(&dir.path().join("report.json"));
        let merged_text = serde_json::to_string(&merged).unwrap();
        assert!(!merged_text.contains("checkout;unknown"));
        assert_eq!(merged[0]["elements"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_rerun_report_leaves_original_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "report.json", &original_report());
        write_json(dir.path(), "rerun.json", &json!([]));

        stitch(dir.path(), "report.json").unwrap();

        let merged = read_json(&dir.path().join("report.json"));
        assert_eq!(merged, original_report());
    }

    #[test]
    fn uninterpreted_fields_survive_the_stitch() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "report.json", &original_report());
        write_json(dir.path(), "rerun.json", &json!([]));

        stitch(dir.path(), "report.json").unwrap();

        let merged = read_json(&dir.path().join("report.json"));
        assert_eq!(merged[0]["uri"], "features/checkout.feature");
        assert_eq!(merged[0]["elements"][0]["name"], "Pay by card");
    }

    #[test]
    fn original_source_is_deleted_when_target_differs() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "old.json", &original_report());
        write_json(dir.path(), "rerun.json", &json!([]));

        stitch(dir.path(), "report.json").unwrap();

        assert!(!dir.path().join("old.json").exists());
        assert!(!dir.path().join("rerun.json").exists());
        assert!(dir.path().join("report.json").exists());
    }

    #[test]
    fn missing_original_report_fails_before_any_deletion() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "rerun.json", &json!([]));

        assert!(matches!(
            stitch(dir.path(), "report.json"),
            Err(Error::MissingReport(_))
        ));
        assert!(dir.path().join("rerun.json").exists());
    }

    #[test]
    fn missing_rerun_report_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "report.json", &original_report());

        assert!(matches!(
            stitch(dir.path(), "report.json"),
            Err(Error::MissingReport(_))
        ));
        assert!(dir.path().join("report.json").exists());
    }

    #[test]
    fn ambiguous_original_reports_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "report.json", &original_report());
        write_json(dir.path(), "stale.json", &original_report());
        write_json(dir.path(), "rerun.json", &json!([]));

        assert!(matches!(
            stitch(dir.path(), "report.json"),
            Err(Error::AmbiguousReports { kind: "original", .. })
        ));
    }

    #[test]
    fn ambiguous_rerun_reports_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "report.json", &original_report());
        write_json(dir.path(), "rerun.json", &json!([]));
        write_json(dir.path(), "rerun-2.json", &json!([]));

        assert!(matches!(
            stitch(dir.path(), "report.json"),
            Err(Error::AmbiguousReports { kind: "rerun", .. })
        ));
    }

    #[test]
    fn non_json_files_are_ignored_by_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "report.json", &original_report());
        write_json(dir.path(), "rerun.json", &json!([]));
        fs::write(dir.path().join("rerun.txt"), "features/a.feature\n").unwrap();
        fs::write(dir.path().join("error.txt"), "boom").unwrap();

        stitch(dir.path(), "report.json").unwrap();
        assert!(dir.path().join("rerun.txt").exists());
    }

    #[test]
    fn merge_output_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "report.json", &original_report());
        write_json(dir.path(), "rerun.json", &json!([]));

        stitch(dir.path(), "report.json").unwrap();

        let text = fs::read_to_string(dir.path().join("report.json")).unwrap();
        assert!(text.contains("\n  {"));
    }
}
