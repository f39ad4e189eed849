//
//  circleci-cli
//  cli/context.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Context commands.
//!
//! Contexts belong to an organization. Unless `--vcs` and `--org` are given,
//! the organization of the current project is used.

use std::io::IsTerminal;

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::api::contexts::{owner_slug, Context, Contexts, EnvironmentVariable};
use crate::context::VcsType;
use crate::interactive::{prompt_confirm_with_default, prompt_password, read_secret_line};
use crate::output::{
    print_field, print_header, render_rows, OutputWriter, TableOutput, TableRow,
};
use crate::util::format_timestamp;

use super::GlobalOptions;

/// Manage contexts and their secrets
#[derive(Args, Debug)]
pub struct ContextCommand {
    #[command(subcommand)]
    pub command: ContextSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ContextSubcommand {
    /// List the organization's contexts
    #[command(visible_alias = "ls")]
    List(OwnerArgs),

    /// Show a context and the names of its secrets
    Show(NameArgs),

    /// Create a new context
    Create(NameArgs),

    /// Delete a context and all of its secrets
    Delete(DeleteArgs),

    /// Manage the secrets stored in a context
    Secret(SecretCommand),
}

/// Organization that owns the contexts.
#[derive(Args, Debug, Clone)]
pub struct OwnerArgs {
    /// VCS provider of the organization (github or bitbucket)
    #[arg(long, requires = "org")]
    pub vcs: Option<String>,

    /// Organization name
    #[arg(long, requires = "vcs")]
    pub org: Option<String>,
}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Context name
    pub name: String,

    #[command(flatten)]
    pub owner: OwnerArgs,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Context name
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,

    #[command(flatten)]
    pub owner: OwnerArgs,
}

#[derive(Args, Debug)]
pub struct SecretCommand {
    #[command(subcommand)]
    pub command: SecretSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SecretSubcommand {
    /// List the names of a context's secrets
    #[command(visible_alias = "ls")]
    List(NameArgs),

    /// Store a secret, reading the value from a prompt or stdin
    Store(SecretArgs),

    /// Remove a secret
    #[command(visible_alias = "rm")]
    Remove(SecretArgs),
}

#[derive(Args, Debug)]
pub struct SecretArgs {
    /// Context name
    pub context: String,

    /// Secret (environment variable) name
    pub name: String,

    #[command(flatten)]
    pub owner: OwnerArgs,
}

impl TableRow for Context {
    const HEADERS: &'static [&'static str] = &["Name", "ID", "Created At"];

    fn cells(&self, _color: bool) -> Vec<String> {
        vec![
            self.name.clone(),
            self.id.clone(),
            format_timestamp(&self.created_at),
        ]
    }
}

impl TableRow for EnvironmentVariable {
    const HEADERS: &'static [&'static str] = &["Name", "Created At"];

    fn cells(&self, _color: bool) -> Vec<String> {
        vec![self.variable.clone(), format_timestamp(&self.created_at)]
    }
}

/// A context together with the secrets stored in it.
#[derive(Debug, serde::Serialize)]
struct ContextDetails {
    #[serde(flatten)]
    context: Context,
    secrets: Vec<EnvironmentVariable>,
}

impl TableOutput for ContextDetails {
    fn print_table(&self, color: bool) {
        print_header(&self.context.name);
        print_field("ID", &self.context.id, color);
        print_field("Created At", &format_timestamp(&self.context.created_at), color);
        println!();
        if self.secrets.is_empty() {
            println!("No secrets stored");
        } else {
            println!("{}", render_rows(&self.secrets, color));
        }
    }
}

impl OwnerArgs {
    /// The organization given on the command line, or the current project's.
    fn resolve(&self, global: &GlobalOptions) -> Result<(VcsType, String)> {
        match (&self.vcs, &self.org) {
            (Some(vcs), Some(org)) => Ok((VcsType::from(vcs.as_str()), org.clone())),
            _ => {
                let remote = global.remote()?;
                Ok((remote.vcs_type, remote.organization))
            }
        }
    }
}

impl ContextCommand {
    pub async fn run(&self, global: &GlobalOptions, cancel: CancellationToken) -> Result<()> {
        let contexts = Contexts::new(global.client()?).with_cancellation(cancel);

        match &self.command {
            ContextSubcommand::List(owner) => self.list(&contexts, owner, global).await,
            ContextSubcommand::Show(args) => self.show(&contexts, args, global).await,
            ContextSubcommand::Create(args) => self.create(&contexts, args, global).await,
            ContextSubcommand::Delete(args) => self.delete(&contexts, args, global).await,
            ContextSubcommand::Secret(secret) => match &secret.command {
                SecretSubcommand::List(args) => self.list_secrets(&contexts, args, global).await,
                SecretSubcommand::Store(args) => self.store_secret(&contexts, args, global).await,
                SecretSubcommand::Remove(args) => {
                    self.remove_secret(&contexts, args, global).await
                }
            },
        }
    }

    /// List contexts
    async fn list(
        &self,
        contexts: &Contexts,
        owner: &OwnerArgs,
        global: &GlobalOptions,
    ) -> Result<()> {
        let (vcs, org) = owner.resolve(global)?;
        let items = contexts
            .list(&vcs, &org)
            .await
            .with_context(|| format!("Failed to list contexts for {}", owner_slug(&vcs, &org)))?;

        OutputWriter::new(global.format()).write_list(&items, "No contexts found")
    }

    async fn find(
        &self,
        contexts: &Contexts,
        name: &str,
        owner: &OwnerArgs,
        global: &GlobalOptions,
    ) -> Result<Context> {
        let (vcs, org) = owner.resolve(global)?;
        contexts
            .by_name(&vcs, &org, name)
            .await
            .with_context(|| format!("Failed to find context in {}", owner_slug(&vcs, &org)))
    }

    /// Show a context
    async fn show(&self, contexts: &Contexts, args: &NameArgs, global: &GlobalOptions) -> Result<()> {
        let context = self.find(contexts, &args.name, &args.owner, global).await?;
        let secrets = contexts
            .environment_variables(&context.id)
            .await
            .context("Failed to list secrets")?;

        OutputWriter::new(global.format()).write(&ContextDetails { context, secrets })
    }

    /// Create a context
    async fn create(
        &self,
        contexts: &Contexts,
        args: &NameArgs,
        global: &GlobalOptions,
    ) -> Result<()> {
        let (vcs, org) = args.owner.resolve(global)?;
        let context = contexts
            .create(&vcs, &org, &args.name)
            .await
            .with_context(|| format!("Failed to create context '{}'", args.name))?;

        if global.json {
            println!("{}", serde_json::to_string_pretty(&context)?);
        } else {
            OutputWriter::table().write_success(&format!(
                "Created context {} ({})",
                context.name, context.id
            ));
        }
        Ok(())
    }

    /// Delete a context
    async fn delete(
        &self,
        contexts: &Contexts,
        args: &DeleteArgs,
        global: &GlobalOptions,
    ) -> Result<()> {
        let context = self.find(contexts, &args.name, &args.owner, global).await?;

        if !args.force {
            if !global.interactive() {
                bail!("Refusing to delete context '{}' without --force", context.name);
            }
            let question = format!(
                "Delete context '{}' and every secret stored in it?",
                context.name
            );
            if !prompt_confirm_with_default(&question, false)? {
                OutputWriter::table().write_info("Cancelled");
                return Ok(());
            }
        }

        contexts
            .delete(&context.id)
            .await
            .with_context(|| format!("Failed to delete context '{}'", context.name))?;

        if global.json {
            let result = serde_json::json!({ "deleted": context.id });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            OutputWriter::table().write_success(&format!("Deleted context {}", context.name));
        }
        Ok(())
    }

    /// List secrets
    async fn list_secrets(
        &self,
        contexts: &Contexts,
        args: &NameArgs,
        global: &GlobalOptions,
    ) -> Result<()> {
        let context = self.find(contexts, &args.name, &args.owner, global).await?;
        let secrets = contexts
            .environment_variables(&context.id)
            .await
            .context("Failed to list secrets")?;

        OutputWriter::new(global.format()).write_list(&secrets, "No secrets stored")
    }

    /// Store a secret
    async fn store_secret(
        &self,
        contexts: &Contexts,
        args: &SecretArgs,
        global: &GlobalOptions,
    ) -> Result<()> {
        let context = self.find(contexts, &args.context, &args.owner, global).await?;

        let value = if std::io::stdin().is_terminal() {
            if global.no_prompt {
                bail!("No secret value: pipe it on stdin or allow prompting");
            }
            prompt_password(&format!("Value for {}", args.name))?
        } else {
            read_secret_line(std::io::stdin().lock())?
        };
        if value.is_empty() {
            OutputWriter::table().write_warning(&format!("Storing an empty value for {}", args.name));
        }

        let stored = contexts
            .create_environment_variable(&context.id, &args.name, &value)
            .await
            .with_context(|| format!("Failed to store secret {}", args.name))?;

        if global.json {
            println!("{}", serde_json::to_string_pretty(&stored)?);
        } else {
            OutputWriter::table().write_success(&format!(
                "Stored {} in context {}",
                stored.variable, context.name
            ));
        }
        Ok(())
    }

    /// Remove a secret
    async fn remove_secret(
        &self,
        contexts: &Contexts,
        args: &SecretArgs,
        global: &GlobalOptions,
    ) -> Result<()> {
        let context = self.find(contexts, &args.context, &args.owner, global).await?;
        contexts
            .delete_environment_variable(&context.id, &args.name)
            .await
            .with_context(|| format!("Failed to remove secret {}", args.name))?;

        if global.json {
            let result = serde_json::json!({ "removed": args.name, "context": context.id });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            OutputWriter::table().write_success(&format!(
                "Removed {} from context {}",
                args.name, context.name
            ));
        }
        Ok(())
    }
}
