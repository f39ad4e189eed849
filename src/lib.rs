//
//  circleci-cli
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # CircleCI CLI Library
//!
//! The library behind the `circleci` command-line tool: a typed client for
//! the CircleCI REST API plus the git awareness needed to work out which
//! project a command is about.
//!
//! ## Module Structure
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`api`]: The generic REST client and the pipelines/contexts resources
//! - [`auth`]: API token handling (`Circle-Token`)
//! - [`config`]: Configuration file management
//! - [`context`]: Git remote detection (VCS type, organization, project)
//! - [`output`]: Output formatting (table, JSON)
//! - [`interactive`]: Confirmation and secret prompts
//! - [`util`]: Utility functions
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use circleci_cli::{Config, Remote};
//!
//! let config = Config::load().expect("Failed to load config");
//! let remote = Remote::detect().expect("Not in a GitHub or Bitbucket checkout");
//! println!("{} -> {}", remote, remote.web_url(&config.app_url));
//! ```

/// Command-line interface definitions.
pub mod cli;

/// CircleCI REST API clients.
///
/// The generic client handles authentication headers, JSON encoding and
/// status-code checking; resource clients build paths and payloads on top.
pub mod api;

/// API token handling.
pub mod auth;

/// Configuration file management.
///
/// Stored in platform-specific locations:
/// - Linux: `~/.config/circleci/config.toml`
/// - macOS: `~/Library/Application Support/circleci/config.toml`
/// - Windows: `%APPDATA%\circleci\config\config.toml`
pub mod config;

/// Git repository context detection.
pub mod context;

/// Output formatting for tables and JSON.
pub mod output;

/// Interactive confirmations and secret entry.
pub mod interactive;

/// Utility functions and helpers.
pub mod util;

pub use cli::Cli;
pub use config::Config;
pub use context::Remote;

/// Application name, used for the binary name and configuration paths.
pub const APP_NAME: &str = "circleci";

/// Application version, taken from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The `User-Agent` sent with every API request.
///
/// ```rust
/// assert!(circleci_cli::user_agent().starts_with("circleci-cli/"));
/// ```
pub fn user_agent() -> String {
    format!("circleci-cli/{}", VERSION)
}

/// Exit codes for the CLI.
///
/// # Exit Code Ranges
///
/// - `0`: Success
/// - `1-3`: General errors and usage issues
/// - `4-7`: Authentication-related issues
/// - `8-15`: Resource-related issues
/// - `16-31`: Operation-related issues
pub mod exit_codes {
    use crate::api::ApiError;

    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error. Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// The API token is missing, invalid or lacks permission.
    ///
    /// Set one with `circleci config set token <TOKEN>`.
    pub const AUTH_ERROR: i32 = 4;

    /// The requested project, context or variable does not exist.
    pub const NOT_FOUND: i32 = 8;

    /// The operation was cancelled, typically with Ctrl+C.
    pub const CANCELLED: i32 = 16;

    /// Picks the exit code for an error returned by a command.
    ///
    /// API errors anywhere in the context chain decide the code; anything
    /// else is a general error.
    pub fn for_error(err: &anyhow::Error) -> i32 {
        match err.chain().find_map(|cause| cause.downcast_ref::<ApiError>()) {
            Some(ApiError::Cancelled) => CANCELLED,
            Some(api) if api.is_auth_error() => AUTH_ERROR,
            Some(api) if api.is_not_found() => NOT_FOUND,
            _ => ERROR,
        }
    }

}
