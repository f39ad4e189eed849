//
//  circleci-cli
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! CircleCI authenticates API calls with a personal API token sent in the
//! `Circle-Token` header. This module wraps that token so it is attached the
//! same way on every request and never printed by accident.
//!
//! ## Example
//!
//! ```rust
//! use circleci_cli::auth::AuthToken;
//!
//! let token = AuthToken::new("secret");
//! assert_eq!(format!("{:?}", token), "AuthToken(****)");
//! ```

use std::fmt;

use reqwest::RequestBuilder;

/// Header CircleCI reads the API token from.
pub const AUTH_HEADER: &str = "Circle-Token";

/// A CircleCI personal API token.
///
/// The token is passed through exactly as configured: an empty token is sent
/// as an empty header and the server decides how to answer.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no token was configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds the `Circle-Token` header to the given request.
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTH_HEADER, self.0.as_str())
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("AuthToken(<empty>)")
        } else {
            f.write_str("AuthToken(****)")
        }
    }
}
