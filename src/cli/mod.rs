//
//  circleci-cli
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod completion;
mod config;
mod context;
mod open;
mod pipeline;

pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use context::ContextCommand;
pub use open::OpenCommand;
pub use pipeline::PipelineCommand;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use crate::api::RestClient;
use crate::config::Config;
use crate::context::{resolve_remote, Remote};
use crate::output::OutputFormat;

/// CircleCI CLI - Work with CircleCI from the command line
#[derive(Parser, Debug)]
#[command(
    name = "circleci",
    version,
    about = "Work with CircleCI from the command line",
    long_about = "circleci is a CLI for the CircleCI REST API.\n\n\
                  It lists and triggers pipelines and manages contexts for the \
                  project checked out in the current directory.",
    propagate_version = true,
    after_help = "Use 'circleci <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Project in VCS/ORG/PROJECT format (defaults to the git origin)
    #[arg(long, short = 'p', global = true, env = "CIRCLECI_PROJECT")]
    pub project: Option<String>,

    /// CircleCI host, e.g. https://circleci.com
    #[arg(long, global = true, env = "CIRCLECI_CLI_HOST")]
    pub host: Option<String>,

    /// API token (overrides the configured token)
    #[arg(long, global = true, env = "CIRCLECI_CLI_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long, global = true, env = "CIRCLECI_NO_PROMPT")]
    pub no_prompt: bool,
}

impl GlobalOptions {
    /// Output format selected by `--json`.
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }

    /// Loads the configuration and applies `--host` / `--token`.
    pub fn config(&self) -> Result<Config> {
        Ok(Config::load()?.with_overrides(self.host.as_deref(), self.token.as_deref()))
    }

    /// Whether the command may ask the user questions.
    pub fn interactive(&self) -> bool {
        !self.no_prompt && crate::interactive::can_prompt()
    }

    /// Builds an API client from the effective configuration.
    pub fn client(&self) -> Result<RestClient> {
        let config = self.config()?;
        if config.token.as_deref().map_or(true, str::is_empty) {
            tracing::warn!("no API token configured; requests will be unauthenticated");
        }
        RestClient::from_config(&config).context("Failed to create API client")
    }

    /// Resolves the project the command operates on.
    pub fn remote(&self) -> Result<Remote> {
        resolve_remote(self.project.as_deref()).context(
            "this command must be run from inside a git repository with an origin \
             remote on GitHub or Bitbucket (or pass --project VCS/ORG/PROJECT)",
        )
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List and trigger pipelines
    Pipeline(PipelineCommand),

    /// Open the project's pipelines page in a browser
    Open(OpenCommand),

    /// Manage contexts and their secrets
    Context(ContextCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}
