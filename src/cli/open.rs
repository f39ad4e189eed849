//
//  circleci-cli
//  cli/open.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Open command - show the project in the CircleCI web app

use anyhow::Result;
use clap::Args;
use console::style;

use crate::util::open_browser;

use super::GlobalOptions;

/// Open the project's pipelines page in a browser
#[derive(Args, Debug)]
pub struct OpenCommand {
    /// Print URL instead of opening browser
    #[arg(long)]
    pub print: bool,
}

impl OpenCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let remote = global.remote()?;
        let config = global.config()?;
        let url = remote.web_url(&config.app_url);

        if self.print {
            println!("{}", url);
        } else {
            println!("{} Opening {} in browser...", style("→").cyan(), remote);
            open_browser(&url)?;
        }

        Ok(())
    }
}
