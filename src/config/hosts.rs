//
//  circleci-cli
//  config/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Host Configuration Module
//!
//! Well-known hosts and normalization helpers.
//!
//! | Host | Role |
//! |------|------|
//! | `circleci.com` | REST API host |
//! | `app.circleci.com` | Web application |
//! | `github.com` | GitHub remotes |
//! | `bitbucket.org` | Bitbucket remotes |
//!
//! ## Usage
//!
//! ```rust
//! use circleci_cli::config::{normalize_host, normalize_host_url};
//!
//! assert_eq!(normalize_host("https://GitHub.com/"), "github.com");
//! assert_eq!(normalize_host_url("circleci.com/"), "https://circleci.com");
//! ```

/// Default CircleCI API host.
pub const CIRCLECI_HOST: &str = "https://circleci.com";

/// Default CircleCI web application URL.
pub const CIRCLECI_APP_URL: &str = "https://app.circleci.com";

/// GitHub's git hostname.
pub const GITHUB_HOST: &str = "github.com";

/// Bitbucket Cloud's git hostname.
pub const BITBUCKET_HOST: &str = "bitbucket.org";

/// Normalizes a bare host for comparison: no scheme, no trailing slash, no
/// port, lowercase.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host.strip_prefix("https://").unwrap_or(host);
    let host = host.strip_prefix("http://").unwrap_or(host);
    let host = host.trim_end_matches('/');
    let host = host.split(':').next().unwrap_or(host);
    host.to_lowercase()
}

/// Normalizes a host given by the user into a base URL.
///
/// A missing scheme defaults to `https://`; trailing slashes are removed.
pub fn normalize_host_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("github.com"), "github.com");
        assert_eq!(normalize_host("https://BitBucket.org/"), "bitbucket.org");
        assert_eq!(normalize_host("github.com:22"), "github.com");
    }

    #[test]
    fn test_normalize_host_url() {
        assert_eq!(normalize_host_url("https://circleci.com/"), "https://circleci.com");
        assert_eq!(normalize_host_url("http://localhost:8080"), "http://localhost:8080");
        assert_eq!(normalize_host_url("ci.example.com"), "https://ci.example.com");
    }
}
