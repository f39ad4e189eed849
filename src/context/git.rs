//
//  circleci-cli
//  context/git.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Git Repository Operations
//!
//! Thin read-only wrapper over `git2` used to find the repository around the
//! working directory and read its remotes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use circleci_cli::context::GitContext;
//!
//! if let Ok(git) = GitContext::discover(Path::new(".")) {
//!     if let Some(url) = git.remote_url("origin").unwrap() {
//!         println!("Origin URL: {}", url);
//!     }
//! }
//! ```

use std::path::Path;

use git2::{ErrorCode, Repository};

/// Provides access to git repository information.
///
/// # Notes
///
/// - The struct holds an open repository handle; create new instances as needed
/// - Bare repositories are supported for remote lookups (no working directory)
pub struct GitContext {
    /// The underlying git2 repository handle
    repo: Repository,
}

impl GitContext {
    /// Opens the git repository containing `path`.
    ///
    /// Walks up the directory tree until a `.git` directory or file is found.
    pub fn discover(path: &Path) -> Result<Self, git2::Error> {
        let repo = Repository::discover(path)?;
        Ok(Self { repo })
    }

    /// Retrieves the fetch URL of the remote called `name`.
    ///
    /// Returns `Ok(None)` if no such remote exists.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, git2::Error> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(str::to_string)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
