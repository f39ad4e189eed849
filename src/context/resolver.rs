//
//  circleci-cli
//  context/resolver.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Remote Resolver
//!
//! Turns git remote URLs into [`Remote`] values and exposes the
//! [`RemoteSource`] capability the commands depend on.
//!
//! ## Supported URL Formats
//!
//! - SSH: `git@github.com:org/project.git`
//! - SSH URL: `ssh://git@bitbucket.org[:port]/org/project.git`
//! - HTTPS: `https://[user@]github.com/org/project[.git]`
//!
//! Only `github.com` and `bitbucket.org` are recognized hosts.
//!
//! ## Resolution Priority
//!
//! 1. `--project VCS/ORG/PROJECT` (or `CIRCLECI_PROJECT`)
//! 2. The `origin` remote of the surrounding git repository

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{GitContext, Remote, RemoteError, VcsType};
use crate::config::{normalize_host, BITBUCKET_HOST, GITHUB_HOST};

static SSH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[^@/]+@)?([^:/]+):/?(.+)/([^/]+?)(?:\.git)?/?$").unwrap()
});

static SSH_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:ssh|git)://(?:[^@/]+@)?([^:/]+)(?::\d+)?/(.+)/([^/]+?)(?:\.git)?/?$").unwrap()
});

static HTTPS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:[^@/]+@)?([^:/]+)(?::\d+)?/(.+)/([^/]+?)(?:\.git)?/?$").unwrap()
});

/// Something that can tell which project a command should operate on.
///
/// The CLI depends on this capability rather than on git directly, so a fixed
/// [`Remote`] can stand in for detection.
pub trait RemoteSource {
    /// Resolves the current project.
    fn remote(&self) -> Result<Remote, RemoteError>;
}

impl RemoteSource for Remote {
    fn remote(&self) -> Result<Remote, RemoteError> {
        Ok(self.clone())
    }
}

/// Detects the project from a git repository's remote.
#[derive(Debug, Clone)]
pub struct GitRemoteSource {
    /// Directory to start repository discovery from
    path: PathBuf,
    /// Remote whose URL identifies the project
    remote_name: String,
}

impl Default for GitRemoteSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl GitRemoteSource {
    /// Detects from the repository containing `path`, using `origin`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            remote_name: "origin".to_string(),
        }
    }

    /// Uses the remote called `name` instead of `origin`.
    pub fn with_remote_name(mut self, name: impl Into<String>) -> Self {
        self.remote_name = name.into();
        self
    }
}

impl RemoteSource for GitRemoteSource {
    fn remote(&self) -> Result<Remote, RemoteError> {
        let git = GitContext::discover(&self.path).map_err(RemoteError::NotARepository)?;
        let url = git
            .remote_url(&self.remote_name)?
            .ok_or_else(|| RemoteError::MissingRemote(self.remote_name.clone()))?;

        debug!(remote = %self.remote_name, %url, "resolving project from git remote");
        parse_remote_url(&url)
    }
}

/// Resolves the project for a command: an explicit `VCS/ORG/PROJECT` wins,
/// otherwise the `origin` remote of the working directory's repository.
pub fn resolve_remote(project: Option<&str>) -> Result<Remote, RemoteError> {
    match project {
        Some(slug) => slug.parse(),
        None => Remote::detect(),
    }
}

/// Parses a git remote URL into a [`Remote`].
///
/// # Example
///
/// ```rust
/// use circleci_cli::context::{parse_remote_url, VcsType};
///
/// let remote = parse_remote_url("git@github.com:acme/widgets.git").unwrap();
/// assert_eq!(remote.vcs_type, VcsType::GitHub);
/// assert_eq!(remote.organization, "acme");
/// assert_eq!(remote.project, "widgets");
/// ```
pub fn parse_remote_url(url: &str) -> Result<Remote, RemoteError> {
    let url = url.trim();

    // The scheme-based patterns must win over the scp-like SSH form,
    // which would otherwise read "https" as the host.
    let caps = HTTPS_PATTERN
        .captures(url)
        .or_else(|| SSH_URL_PATTERN.captures(url))
        .or_else(|| {
            if url.contains("://") {
                None
            } else {
                SSH_PATTERN.captures(url)
            }
        })
        .ok_or_else(|| RemoteError::UnparseableUrl(url.to_string()))?;

    let host = normalize_host(&caps[1]);
    let vcs_type = vcs_for_host(&host).ok_or(RemoteError::UnsupportedHost(host))?;

    Ok(Remote {
        vcs_type,
        organization: caps[2].to_string(),
        project: caps[3].to_string(),
    })
}

/// Maps a git host to the VCS provider CircleCI knows it as.
pub fn vcs_for_host(host: &str) -> Option<VcsType> {
    match normalize_host(host).as_str() {
        GITHUB_HOST | "www.github.com" => Some(VcsType::GitHub),
        BITBUCKET_HOST | "www.bitbucket.org" => Some(VcsType::Bitbucket),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Repository;

    #[test]
    fn test_parse_github_ssh() {
        let remote = parse_remote_url("git@github.com:the-organization/the-project.git").unwrap();
        assert_eq!(
            remote,
            Remote::new(VcsType::GitHub, "the-organization", "the-project")
        );
    }

    #[test]
    fn test_parse_github_https() {
        let remote = parse_remote_url("https://github.com/acme/widgets").unwrap();
        assert_eq!(remote, Remote::new(VcsType::GitHub, "acme", "widgets"));

        let remote = parse_remote_url("https://user@github.com/acme/widgets.git/").unwrap();
        assert_eq!(remote, Remote::new(VcsType::GitHub, "acme", "widgets"));
    }

    #[test]
    fn test_parse_bitbucket() {
        let remote = parse_remote_url("git@bitbucket.org:acme/widgets.git").unwrap();
        assert_eq!(remote.vcs_type, VcsType::Bitbucket);

        let remote = parse_remote_url("https://acme@bitbucket.org/acme/widgets.git").unwrap();
        assert_eq!(remote, Remote::new(VcsType::Bitbucket, "acme", "widgets"));
    }

    #[test]
    fn test_parse_ssh_url() {
        let remote = parse_remote_url("ssh://git@github.com:22/acme/widgets.git").unwrap();
        assert_eq!(remote, Remote::new(VcsType::GitHub, "acme", "widgets"));
    }

    #[test]
    fn test_project_name_with_dots() {
        let remote = parse_remote_url("git@github.com:acme/widgets.rs.git").unwrap();
        assert_eq!(remote.project, "widgets.rs");
    }

    #[test]
    fn test_unsupported_host() {
        let err = parse_remote_url("git@gitlab.com:acme/widgets.git").unwrap_err();
        assert!(matches!(err, RemoteError::UnsupportedHost(host) if host == "gitlab.com"));
    }

    #[test]
    fn test_unparseable_url() {
        let err = parse_remote_url("/srv/git/widgets.git").unwrap_err();
        assert!(matches!(err, RemoteError::UnparseableUrl(_)));
    }

    #[test]
    fn test_git_remote_source() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        repo.remote("origin", "git@github.com:acme/widgets.git").unwrap();
        repo.remote("fork", "https://bitbucket.org/me/widgets.git").unwrap();

        let remote = GitRemoteSource::new(dir.path()).remote().unwrap();
        assert_eq!(remote, Remote::new(VcsType::GitHub, "acme", "widgets"));

        let fork = GitRemoteSource::new(dir.path())
            .with_remote_name("fork")
            .remote()
            .unwrap();
        assert_eq!(fork, Remote::new(VcsType::Bitbucket, "me", "widgets"));
    }

    #[test]
    fn test_git_remote_source_without_origin() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let err = GitRemoteSource::new(dir.path()).remote().unwrap_err();
        assert!(matches!(err, RemoteError::MissingRemote(name) if name == "origin"));
    }

    #[test]
    fn test_git_remote_source_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let err = GitRemoteSource::new(dir.path()).remote().unwrap_err();
        assert!(matches!(err, RemoteError::NotARepository(_)));
    }

    #[test]
    fn test_resolve_remote_prefers_explicit_project() {
        let remote = resolve_remote(Some("bitbucket/acme/widgets")).unwrap();
        assert_eq!(remote, Remote::new(VcsType::Bitbucket, "acme", "widgets"));
    }

    #[test]
    fn test_fixed_remote_source() {
        let fixed = Remote::new(VcsType::GitHub, "acme", "widgets");
        assert_eq!(fixed.remote().unwrap(), fixed);
    }
}
