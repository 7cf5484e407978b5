//! CLI command definitions
//!
//! Defines the clap commands for the e2e CLI. Positional parameters are
//! all optional; an empty value means "unset", matching the runner's own
//! defaulting rules.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::invocation::Overrides;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the end-to-end suite
    Run {
        /// Suite directory under the features root
        suite: Option<String>,

        /// Feature file name within the suite
        feature: Option<String>,

        /// Tag expression; individual tags joined with '&&'
        tags: Option<String>,

        /// Browser to drive in direct-connection mode (default: chrome)
        browser: Option<String>,

        /// Rerun failed scenarios after the main pass and merge the reports
        #[arg(long, short = 'r')]
        rerun: bool,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Rerun previously failed scenarios alone and stitch the reports
    Rerun {
        /// Browser to drive in direct-connection mode (default: chrome)
        browser: Option<String>,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Invoke formatters without executing the steps
    DryRun {
        /// Suite directory under the features root
        suite: Option<String>,

        /// Feature file name within the suite
        feature: Option<String>,

        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

/// Ambient overrides shared by every task
#[derive(Args)]
pub struct OverrideArgs {
    /// Path to the tool configuration file
    #[arg(long, default_value = "e2e.toml")]
    pub config: PathBuf,

    /// Browser name for a remote (Selenium) session
    #[arg(long)]
    pub browser_name: Option<String>,

    /// Remote WebDriver endpoint; replaces the configured address
    #[arg(long)]
    pub selenium_address: Option<String>,

    /// Platform capability for remote sessions
    #[arg(long)]
    pub platform: Option<String>,

    /// Extra runner option, forwarded verbatim as --KEY=VALUE
    /// (bare KEY means KEY=true); repeatable
    #[arg(short = 'O', long = "opt", value_name = "KEY[=VALUE]")]
    pub options: Vec<String>,
}

impl OverrideArgs {
    /// Merge dedicated flags and generic pairs into one immutable map
    pub fn to_overrides(&self) -> Overrides {
        let mut overrides = Overrides::new();

        for raw in &self.options {
            let (key, value) = match raw.split_once('=') {
                Some((k, v)) => (k, v),
                None => (raw.as_str(), "true"),
            };
            overrides = overrides.with(key, value);
        }

        // Dedicated flags win over generic pairs for the same key
        if let Some(name) = &self.browser_name {
            overrides = overrides.with("browserName", name);
        }
        if let Some(addr) = &self.selenium_address {
            overrides = overrides.with("seleniumAddress", addr);
        }
        if let Some(platform) = &self.platform {
            overrides = overrides.with("platform", platform);
        }

        overrides
    }
}
