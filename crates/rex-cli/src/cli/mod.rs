//! CLI for the rex build automation toolkit.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rex_core::config;

use commands::{run_exec, run_update_metapackage, run_update_readme};

/// Top-level CLI for the rex toolkit.
#[derive(Debug, Parser)]
#[command(name = "rex")]
#[command(about = "rex: resilient command execution for build automation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a shell command with bounded retries.
    Exec {
        /// Shell command line to run.
        command: String,

        /// Exit codes treated as success (repeatable).
        #[arg(long = "ok-code", value_name = "CODE", default_values_t = vec![0])]
        ok_codes: Vec<i32>,

        /// Retry up to N additional times on failure (default from config).
        #[arg(long, value_name = "N")]
        retries: Option<u32>,
    },

    /// Regenerate the versions table in the metadata repository README.
    UpdateReadme {
        /// Packages as NAME=VERSION pairs.
        #[arg(required = true, value_name = "NAME=VERSION")]
        packages: Vec<String>,
    },

    /// Update the release package's version and dependency list.
    UpdateMetapackage {
        /// Name of the release package to update.
        metapackage: String,

        /// Dependency packages as NAME=VERSION pairs.
        #[arg(required = true, value_name = "NAME=VERSION")]
        packages: Vec<String>,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Exec {
                command,
                ok_codes,
                retries,
            } => run_exec(&cfg, &command, &ok_codes, retries)?,
            CliCommand::UpdateReadme { packages } => run_update_readme(&cfg, &packages)?,
            CliCommand::UpdateMetapackage {
                metapackage,
                packages,
            } => run_update_metapackage(&cfg, &metapackage, &packages)?,
        }

        Ok(())
    }
}
