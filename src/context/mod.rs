//
//  circleci-cli
//  context/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Project Identity Module
//!
//! Resolves which CircleCI project a command operates on. The answer is a
//! [`Remote`]: the VCS provider, the organization and the project name, as
//! found in the `origin` remote of the surrounding git repository or given
//! explicitly with `--project`.
//!
//! ## Architecture
//!
//! - [`GitContext`]: Low-level git repository operations
//! - [`parse_remote_url`]: git remote URL parsing
//! - [`RemoteSource`]: the capability the CLI consumes to obtain a [`Remote`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use circleci_cli::context::Remote;
//!
//! match Remote::detect() {
//!     Ok(remote) => println!("Project: {}", remote.slug()),
//!     Err(e) => eprintln!("Failed to detect project: {}", e),
//! }
//! ```

mod git;
mod resolver;

pub use git::*;
pub use resolver::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::escape_path_segment;

/// A version-control provider CircleCI can build from.
///
/// Unknown provider names are kept verbatim so newer providers still reach
/// the API instead of failing locally.
///
/// # Example
///
/// ```rust
/// use circleci_cli::context::VcsType;
///
/// assert_eq!(VcsType::from("GitHub"), VcsType::GitHub);
/// assert_eq!(VcsType::from("gh").as_str(), "github");
/// assert_eq!(VcsType::from("GitLab"), VcsType::Unknown("GitLab".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VcsType {
    /// GitHub (github.com)
    GitHub,
    /// Bitbucket Cloud (bitbucket.org)
    Bitbucket,
    /// Any provider not listed above
    Unknown(String),
}

impl VcsType {
    /// Canonical lowercase name used in API paths.
    pub fn as_str(&self) -> &str {
        match self {
            Self::GitHub => "github",
            Self::Bitbucket => "bitbucket",
            Self::Unknown(name) => name,
        }
    }

    /// The provider name as it appears in a URL path segment: lowercased,
    /// then escaped.
    pub fn path_segment(&self) -> String {
        escape_path_segment(&self.as_str().to_lowercase())
    }

    /// Short prefix used in CircleCI owner and project slugs (`gh`, `bb`).
    pub fn slug_prefix(&self) -> String {
        match self {
            Self::GitHub => "gh".to_string(),
            Self::Bitbucket => "bb".to_string(),
            Self::Unknown(name) => name.to_lowercase(),
        }
    }
}

impl From<&str> for VcsType {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "github" | "gh" => Self::GitHub,
            "bitbucket" | "bb" => Self::Bitbucket,
            _ => Self::Unknown(value.to_string()),
        }
    }
}

impl From<String> for VcsType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<VcsType> for String {
    fn from(value: VcsType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for VcsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a project within a VCS provider's namespace.
///
/// # Example
///
/// ```rust
/// use circleci_cli::context::{Remote, VcsType};
///
/// let remote: Remote = "github/acme/widgets".parse().unwrap();
/// assert_eq!(remote.vcs_type, VcsType::GitHub);
/// assert_eq!(remote.slug(), "gh/acme/widgets");
/// assert_eq!(
///     remote.web_url("https://app.circleci.com"),
///     "https://app.circleci.com/pipelines/github/acme/widgets"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    /// The hosting provider
    pub vcs_type: VcsType,
    /// Organization or user that owns the project
    pub organization: String,
    /// Project (repository) name
    pub project: String,
}

impl Remote {
    /// Creates a remote from its three parts.
    pub fn new(
        vcs_type: impl Into<VcsType>,
        organization: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            vcs_type: vcs_type.into(),
            organization: organization.into(),
            project: project.into(),
        }
    }

    /// Detects the remote of the git repository containing the current
    /// directory.
    pub fn detect() -> Result<Self, RemoteError> {
        GitRemoteSource::default().remote()
    }

    /// The CircleCI project slug, e.g. `gh/acme/widgets`.
    pub fn slug(&self) -> String {
        format!(
            "{}/{}/{}",
            self.vcs_type.slug_prefix(),
            self.organization,
            self.project
        )
    }

    /// The project's pipelines page in the CircleCI web application.
    ///
    /// Every segment is lowercased (VCS only) and escaped independently.
    pub fn web_url(&self, app_url: &str) -> String {
        format!(
            "{}/pipelines/{}/{}/{}",
            app_url.trim_end_matches('/'),
            self.vcs_type.path_segment(),
            escape_path_segment(&self.organization),
            escape_path_segment(&self.project)
        )
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.vcs_type, self.organization, self.project)
    }
}

impl FromStr for Remote {
    type Err = RemoteError;

    /// Parses `VCS/ORG/PROJECT`, e.g. `github/acme/widgets` or `gh/acme/widgets`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [vcs, org, project] if !vcs.is_empty() && !org.is_empty() && !project.is_empty() => {
                Ok(Self::new(*vcs, *org, *project))
            }
            _ => Err(RemoteError::InvalidSlug(s.to_string())),
        }
    }
}

/// Errors raised while working out which project a command targets.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// No git repository contains the working directory.
    #[error("not inside a git repository")]
    NotARepository(#[source] git2::Error),

    /// The repository has no remote with the expected name.
    #[error("no git remote named '{0}' is configured")]
    MissingRemote(String),

    /// The remote URL is not in a recognized format.
    #[error("could not parse git remote URL '{0}'")]
    UnparseableUrl(String),

    /// The remote is hosted somewhere CircleCI does not build from.
    #[error("git remote host '{0}' is not GitHub or Bitbucket")]
    UnsupportedHost(String),

    /// A `--project` value was not `VCS/ORG/PROJECT`.
    #[error("invalid project '{0}': expected VCS/ORG/PROJECT (e.g. github/acme/widgets)")]
    InvalidSlug(String),

    /// Any other libgit2 failure.
    #[error(transparent)]
    Git(#[from] git2::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcs_type_is_case_insensitive() {
        assert_eq!(VcsType::from("GITHUB"), VcsType::GitHub);
        assert_eq!(VcsType::from("Bitbucket"), VcsType::Bitbucket);
        assert_eq!(VcsType::from("bb"), VcsType::Bitbucket);
    }

    #[test]
    fn test_unknown_vcs_is_lowercased_in_paths() {
        let vcs = VcsType::from("GitLab");
        assert_eq!(vcs.as_str(), "GitLab");
        assert_eq!(vcs.path_segment(), "gitlab");
        assert_eq!(vcs.slug_prefix(), "gitlab");
    }

    #[test]
    fn test_vcs_type_serde() {
        assert_eq!(serde_json::to_string(&VcsType::GitHub).unwrap(), "\"github\"");
        let vcs: VcsType = serde_json::from_str("\"bitbucket\"").unwrap();
        assert_eq!(vcs, VcsType::Bitbucket);
    }

    #[test]
    fn test_remote_from_str() {
        let remote: Remote = "bitbucket/acme/widgets".parse().unwrap();
        assert_eq!(remote, Remote::new(VcsType::Bitbucket, "acme", "widgets"));
        assert!("acme/widgets".parse::<Remote>().is_err());
        assert!("github//widgets".parse::<Remote>().is_err());
        assert!("github/a/b/c".parse::<Remote>().is_err());
    }

    #[test]
    fn test_web_url_escapes_segments() {
        let remote = Remote::new("GitHub", "the org", "the/project");
        assert_eq!(
            remote.web_url("https://app.circleci.com/"),
            "https://app.circleci.com/pipelines/github/the%20org/the%2Fproject"
        );
    }

    #[test]
    fn test_display() {
        let remote = Remote::new("gh", "acme", "widgets");
        assert_eq!(remote.to_string(), "github/acme/widgets");
        assert_eq!(remote.slug(), "gh/acme/widgets");
    }
}
