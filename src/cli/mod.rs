//! CLI command handling
//!
//! Resolves the run configuration once per invocation and dispatches the
//! subcommand to the task façade.

use crate::commands::Commands;
use crate::common::{Result, RunConfig};
use crate::tasks;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            suite,
            feature,
            tags,
            browser,
            rerun,
            overrides,
        } => {
            let config = RunConfig::load(&overrides.config)?;
            let mut map = overrides.to_overrides();
            if rerun {
                map = map.with("rerun", "true");
            }
            tasks::run(
                &config,
                suite.unwrap_or_default(),
                feature.unwrap_or_default(),
                tags.unwrap_or_default(),
                browser.unwrap_or_default(),
                &map,
            )
            .await
        }

        Commands::Rerun { browser, overrides } => {
            let config = RunConfig::load(&overrides.config)?;
            let map = overrides.to_overrides();
            tasks::rerun(&config, browser.unwrap_or_default(), &map).await
        }

        Commands::DryRun {
            suite,
            feature,
            overrides,
        } => {
            let config = RunConfig::load(&overrides.config)?;
            let map = overrides.to_overrides();
            tasks::dry_run(
                &config,
                suite.unwrap_or_default(),
                feature.unwrap_or_default(),
                &map,
            )
            .await
        }
    }
}
