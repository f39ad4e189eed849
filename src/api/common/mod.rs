//
//  circleci-cli
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the CircleCI REST API
//!
//! This module provides the types shared by every resource client: the
//! unified [`ApiError`] taxonomy, the [`Page`] collection envelope returned by
//! list endpoints, and the helper that extracts a human-readable message from
//! an error response body.
//!
//! # Example
//!
//! ```rust
//! use circleci_cli::api::common::ApiError;
//!
//! fn describe(err: &ApiError) -> &'static str {
//!     match err {
//!         ApiError::Transport(_) => "could not reach CircleCI",
//!         ApiError::Domain { .. } => "CircleCI rejected the request",
//!         _ => "unexpected failure",
//!     }
//! }
//! ```

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all CircleCI API operations.
///
/// | Variant | Raised when |
/// |---------|-------------|
/// | `Transport` | DNS, connection, TLS or timeout failure |
/// | `InvalidRequest` | The request could not be assembled; nothing was sent |
/// | `Encoding` | The request body could not be serialized |
/// | `Decoding` | A 2xx response body did not match the expected shape |
/// | `Domain` | The server answered with a non-2xx status |
/// | `NotFound` | A lookup by name matched nothing |
/// | `InvalidUrl` | The base URL and path do not form a valid URL |
/// | `Cancelled` | The caller cancelled the request before it finished |
///
/// # Notes
///
/// - Errors are never retried by the client layer
/// - No partially decoded value is ever returned alongside an error
#[derive(Error, Debug)]
pub enum ApiError {
    /// A network-level error occurred during the request.
    ///
    /// Covers connection failures, timeouts, DNS resolution errors,
    /// and other transport-layer issues.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request could not be built, e.g. a header value containing a
    /// newline. Nothing was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[source] reqwest::Error),

    /// The request body could not be serialized to JSON.
    #[error("Failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The response body could not be decoded into the expected type.
    ///
    /// The raw body is kept so it can be shown when debugging.
    #[error("Failed to decode response: {source} (body: {body})")]
    Decoding {
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
        /// The raw response body
        body: String,
    },

    /// The server answered with a non-success status code.
    ///
    /// `message` is the server-provided message when the body carries one,
    /// the raw body otherwise.
    #[error("{message} (HTTP {status})")]
    Domain {
        /// HTTP status returned by the server
        status: StatusCode,
        /// Message extracted from the error body
        message: String,
    },

    /// The requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The configured host and request path did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request was cancelled before a response arrived.
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Returns the HTTP status for errors that carry one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Domain { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Whether the server rejected the configured credential.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }

    /// Whether the error means the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Builds an [`ApiError::Domain`] from a non-success response.
///
/// CircleCI returns errors as `{"message": "Human readable message"}`.
/// When the body is not in that shape the raw body is used instead, and an
/// empty body falls back to the status' canonical reason.
pub fn format_api_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    ApiError::Domain { status, message }
}

/// Collection envelope used by CircleCI list endpoints.
///
/// ```json
/// {"items": [...], "next_page_token": "..."}
/// ```
///
/// Only the first page is ever fetched; `next_page_token` is decoded so
/// callers can tell whether more results exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page, in server order.
    pub items: Vec<T>,

    /// Opaque token for the following page, if any.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Whether the server reported more results after this page.
    pub fn has_next(&self) -> bool {
        self.next_page_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}
