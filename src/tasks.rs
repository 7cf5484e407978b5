//! Task façade: run, rerun, dry-run
//!
//! Each task resolves into one runner invocation. The run task can chain
//! an automatic rerun pass; the rerun pass re-executes the specs recorded
//! in the rerun list and stitches the fresh results into the original JSON
//! report. Task completion is only signalled once the runner process has
//! exited (and, for rerun, once stitching is done).

use std::fs;

use colored::Colorize;

use crate::common::{Error, Result, RunConfig};
use crate::invocation::{self, InvocationRequest, Overrides};
use crate::report;
use crate::runner::{self, RunOutcome};

/// Environment marker telling the runner a rerun pass is in progress
pub const RERUN_ENV: &str = "RERUN";

/// Environment marker telling the runner to invoke formatters without
/// executing the steps
pub const DRY_RUN_ENV: &str = "DRY_RUN";

/// Run the end-to-end suite, then chain a rerun pass when one was requested
pub async fn run(
    config: &RunConfig,
    suite: String,
    feature: String,
    tags: String,
    browser: String,
    overrides: &Overrides,
) -> Result<()> {
    let req = InvocationRequest {
        suite,
        feature,
        tags,
        browser,
        rerun_mode: false,
    };
    let argv = invocation::build(config, &req, overrides)?;

    println!("\n{}", "Running end-to-end suite".blue().bold());
    tracing::info!(
        suite = %req.suite,
        feature = %req.feature,
        tags = %req.tags,
        "starting main pass"
    );

    let outcome = runner::run(&argv, &[], &config.output_dir).await?;
    report_outcome(outcome);

    if overrides.rerun_requested() {
        rerun(config, req.browser, overrides).await?;
    }

    Ok(())
}

/// Re-execute previously failed scenarios and stitch the reports
///
/// Skips quietly when the rerun list is absent or empty: a rerun is a
/// refresh of known failures, and no recorded failures means there is
/// nothing to refresh.
pub async fn rerun(config: &RunConfig, browser: String, overrides: &Overrides) -> Result<()> {
    let rerun_list = config.rerun_list_path();
    let specs: Vec<String> = match fs::read_to_string(&rerun_list) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        Err(e) => {
            tracing::info!(
                list = %rerun_list.display(),
                "rerun list not readable ({e}); nothing to rerun"
            );
            Vec::new()
        }
    };

    if specs.is_empty() {
        println!("{} no failed scenarios recorded; skipping rerun", "·".dimmed());
        return Ok(());
    }

    // Stitching needs a json target; fail before spawning anything
    let json_target = config.json_target().ok_or_else(|| {
        Error::Config(
            "no json report format configured; rerun results cannot be stitched".to_string(),
        )
    })?;

    let overrides = overrides.with("specs", &specs.join(","));
    let req = InvocationRequest {
        browser,
        rerun_mode: true,
        ..Default::default()
    };
    let argv = invocation::build(config, &req, &overrides)?;

    println!(
        "\n{} {} spec file(s)",
        "Rerunning failed scenarios from".blue().bold(),
        specs.len()
    );
    tracing::info!(specs = specs.len(), "starting rerun pass");

    let outcome = runner::run(&argv, &[(RERUN_ENV, "true")], &config.output_dir).await?;
    report_outcome(outcome);

    report::stitch(&config.output_dir, json_target)?;
    println!(
        "{} merged rerun results into {}",
        "✓".green(),
        config.output_dir.join(json_target).display()
    );

    Ok(())
}

/// Invoke the runner's formatters without executing the steps
pub async fn dry_run(
    config: &RunConfig,
    suite: String,
    feature: String,
    overrides: &Overrides,
) -> Result<()> {
    let req = InvocationRequest {
        suite,
        feature,
        ..Default::default()
    };
    let argv = invocation::build(config, &req, overrides)?;

    println!("\n{}", "Dry run: formatters only".blue().bold());

    let outcome = runner::run(&argv, &[(DRY_RUN_ENV, "true")], &config.output_dir).await?;
    report_outcome(outcome);

    Ok(())
}

/// Print the runner's completion status; failures are not fatal here, the
/// error file already holds the details
fn report_outcome(outcome: RunOutcome) {
    match outcome {
        RunOutcome::Success => println!("{} runner finished", "✓".green()),
        RunOutcome::Failed => println!(
            "{} runner reported failures (see {})",
            "✗".red(),
            runner::ERROR_FILE
        ),
        RunOutcome::SpawnFailed => println!(
            "{} runner could not be started (see {})",
            "✗".red(),
            runner::ERROR_FILE
        ),
    }
}
