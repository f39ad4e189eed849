//
//  circleci-cli
//  cli/pipeline.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pipeline commands.
//!
//! Both commands work on the project resolved from `--project` or the git
//! `origin` remote of the working directory.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::pipelines::{Pipeline, Pipelines, TriggerParameters};
use crate::output::{format_status, OutputWriter, TableRow};
use crate::util::format_timestamp;

use super::GlobalOptions;

/// List and trigger pipelines of the current project.
#[derive(Args, Debug)]
pub struct PipelineCommand {
    #[command(subcommand)]
    pub command: PipelineSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PipelineSubcommand {
    /// List the project's most recent pipelines
    #[command(visible_alias = "ls")]
    List,

    /// Trigger a new pipeline
    Trigger(TriggerArgs),
}

#[derive(Args, Debug)]
pub struct TriggerArgs {
    /// Branch to build (defaults to the project's default branch)
    #[arg(long, short = 'b')]
    pub branch: Option<String>,
}

impl TableRow for Pipeline {
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Number",
        "Created At",
        "Updated At",
        "State",
        "Trigger Type",
        "Actor Login",
    ];

    fn cells(&self, color: bool) -> Vec<String> {
        vec![
            self.id.clone(),
            self.number.to_string(),
            format_timestamp(&self.created_at),
            self.updated_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
            format_status(self.state.as_str(), color),
            self.trigger.kind.to_string(),
            self.trigger.actor.login.clone(),
        ]
    }
}

impl PipelineCommand {
    pub async fn run(&self, global: &GlobalOptions, cancel: CancellationToken) -> Result<()> {
        match &self.command {
            PipelineSubcommand::List => self.list(global, cancel).await,
            PipelineSubcommand::Trigger(args) => self.trigger(args, global, cancel).await,
        }
    }

    fn pipelines(&self, global: &GlobalOptions, cancel: CancellationToken) -> Result<Pipelines> {
        Ok(Pipelines::new(global.client()?).with_cancellation(cancel))
    }

    /// List pipelines
    async fn list(&self, global: &GlobalOptions, cancel: CancellationToken) -> Result<()> {
        let remote = global.remote()?;
        debug!(project = %remote, "listing pipelines");

        let pipelines = self
            .pipelines(global, cancel)?
            .get(&remote)
            .await
            .with_context(|| format!("Failed to list pipelines for {}", remote))?;

        OutputWriter::new(global.format()).write_list(&pipelines, "No pipelines found")
    }

    /// Trigger a pipeline
    async fn trigger(
        &self,
        args: &TriggerArgs,
        global: &GlobalOptions,
        cancel: CancellationToken,
    ) -> Result<()> {
        let remote = global.remote()?;
        let params = TriggerParameters {
            branch: args.branch.clone(),
        };
        debug!(project = %remote, branch = ?params.branch, "triggering pipeline");

        let pipeline = self
            .pipelines(global, cancel)?
            .trigger(&remote, &params)
            .await
            .with_context(|| format!("Failed to trigger a pipeline for {}", remote))?;

        let writer = OutputWriter::new(global.format());
        if !global.json {
            writer.write_success(&format!(
                "Triggered pipeline #{} for {}",
                pipeline.number, remote
            ));
        }
        writer.write_row(&pipeline)
    }
}
