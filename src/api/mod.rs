//
//  circleci-cli
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! HTTP access to the CircleCI REST API (v2).
//!
//! ## Architecture
//!
//! - [`client`]: the generic authenticated [`RestClient`], which builds
//!   requests, sends them and turns every non-2xx response into an error
//! - [`pipelines`]: the project pipelines resource (list, trigger)
//! - [`contexts`]: organization contexts and their environment variables
//! - [`common`]: shared types ([`ApiError`], [`Page`])
//!
//! ## Usage
//!
//! ```rust,no_run
//! use circleci_cli::api::{pipelines::Pipelines, RestClient};
//! use circleci_cli::context::Remote;
//!
//! # async fn run() -> Result<(), circleci_cli::api::ApiError> {
//! let client = RestClient::new("https://circleci.com", "api/v2", "my-token")?;
//! let remote = Remote::new("github", "acme", "widgets");
//! let pipelines = Pipelines::new(client).get(&remote).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Resource clients return the client's [`ApiError`] unchanged:
//!
//! - `Transport`: the request never got a response
//! - `Domain`: the server answered with a non-2xx status
//! - `Decoding`: a 2xx body did not match the expected shape
//! - `Cancelled`: the caller's cancellation token fired

/// The generic authenticated REST client.
pub mod client;

/// Errors and pagination types shared by the resource clients.
pub mod common;

/// Contexts resource client.
pub mod contexts;

/// Pipelines resource client.
pub mod pipelines;

pub use client::{ApiResponse, RestClient};
pub use common::{ApiError, Page};
