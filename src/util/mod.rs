//
//  circleci-cli
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Common helpers used throughout the CLI.
//!
//! ## Categories
//!
//! - **URL Utilities**: [`escape_path_segment`]
//! - **Time Utilities**: [`format_timestamp`]
//! - **String Utilities**: [`mask_secret`]
//! - **System Utilities**: [`open_browser`]
//!
//! ## Example
//!
//! ```rust
//! use circleci_cli::util::escape_path_segment;
//!
//! assert_eq!(escape_path_segment("my org/name"), "my%20org%2Fname");
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Percent-escapes a single URL path segment.
///
/// Everything except unreserved characters (`A-Z a-z 0-9 - _ . ~`) is
/// escaped, so a `/` inside the value can never be read as a separator.
/// Decoding the result yields the original value.
pub fn escape_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Formats a timestamp as RFC 3339 with second precision, e.g.
/// `2020-03-01T09:30:00Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Masks all but the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

/// Opens a URL in the user's default web browser.
///
/// Honors the `BROWSER` environment variable, as the `webbrowser` crate does.
pub fn open_browser(url: &str) -> Result<()> {
    webbrowser::open(url).with_context(|| format!("Failed to open browser for {}", url))
}
