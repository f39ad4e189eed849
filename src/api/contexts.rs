//
//  circleci-cli
//  api/contexts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Contexts API types and resource client.
//!
//! A context is a named, organization-scoped set of environment variables
//! that jobs can opt into. Variable values are write-only: the API only ever
//! returns their names.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::client::RestClient;
use super::common::{ApiError, Page};
use crate::context::VcsType;
use crate::util::escape_path_segment;

/// A context owned by an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Opaque identifier (a UUID).
    pub id: String,
    /// Name, unique within the organization.
    pub name: String,
    /// When the context was created.
    pub created_at: DateTime<Utc>,
}

/// An environment variable stored in a context. The value is never returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    /// Variable name.
    pub variable: String,
    /// Context the variable belongs to.
    pub context_id: String,
    /// When the variable was first stored.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct CreateContextRequest<'a> {
    name: &'a str,
    owner: ContextOwner<'a>,
}

#[derive(Debug, Serialize)]
struct ContextOwner<'a> {
    slug: &'a str,
    #[serde(rename = "type")]
    owner_type: &'static str,
}

#[derive(Debug, Serialize)]
struct StoreVariableRequest<'a> {
    value: &'a str,
}

/// The organization slug used to scope contexts, e.g. `gh/acme`.
pub fn owner_slug(vcs: &VcsType, organization: &str) -> String {
    format!("{}/{}", vcs.slug_prefix(), organization)
}

fn context_path(context_id: &str) -> String {
    format!("context/{}", escape_path_segment(context_id))
}

fn variables_path(context_id: &str) -> String {
    format!("{}/environment-variable", context_path(context_id))
}

fn variable_path(context_id: &str, variable: &str) -> String {
    format!(
        "{}/{}",
        variables_path(context_id),
        escape_path_segment(variable)
    )
}

/// Resource client for contexts and their environment variables.
#[derive(Debug, Clone)]
pub struct Contexts {
    client: RestClient,
    cancel: CancellationToken,
}

impl Contexts {
    pub fn new(client: RestClient) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Aborts in-flight requests when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Lists the contexts of an organization (first page only).
    pub async fn list(&self, vcs: &VcsType, organization: &str) -> Result<Vec<Context>, ApiError> {
        let path = format!(
            "context?owner-slug={}",
            escape_path_segment(&owner_slug(vcs, organization))
        );
        let request = self.client.new_request::<()>(Method::GET, &path, None)?;
        let page: Page<Context> = self
            .client
            .do_request_cancellable(request, &self.cancel)
            .await?
            .data;
        Ok(page.items)
    }

    /// Finds a context of an organization by its name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no context has that name.
    pub async fn by_name(
        &self,
        vcs: &VcsType,
        organization: &str,
        name: &str,
    ) -> Result<Context, ApiError> {
        self.list(vcs, organization)
            .await?
            .into_iter()
            .find(|context| context.name == name)
            .ok_or_else(|| ApiError::NotFound(format!("context '{}'", name)))
    }

    /// Creates a context owned by an organization.
    pub async fn create(
        &self,
        vcs: &VcsType,
        organization: &str,
        name: &str,
    ) -> Result<Context, ApiError> {
        let slug = owner_slug(vcs, organization);
        let body = CreateContextRequest {
            name,
            owner: ContextOwner {
                slug: &slug,
                owner_type: "organization",
            },
        };
        let request = self.client.new_request(Method::POST, "context", Some(&body))?;
        Ok(self
            .client
            .do_request_cancellable(request, &self.cancel)
            .await?
            .data)
    }

    /// Deletes a context and every variable stored in it.
    pub async fn delete(&self, context_id: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .new_request::<()>(Method::DELETE, &context_path(context_id), None)?;
        self.discard(request).await
    }

    /// Lists the variables stored in a context.
    pub async fn environment_variables(
        &self,
        context_id: &str,
    ) -> Result<Vec<EnvironmentVariable>, ApiError> {
        let request = self
            .client
            .new_request::<()>(Method::GET, &variables_path(context_id), None)?;
        let page: Page<EnvironmentVariable> = self
            .client
            .do_request_cancellable(request, &self.cancel)
            .await?
            .data;
        Ok(page.items)
    }

    /// Stores a variable in a context, replacing any previous value.
    pub async fn create_environment_variable(
        &self,
        context_id: &str,
        variable: &str,
        value: &str,
    ) -> Result<EnvironmentVariable, ApiError> {
        let request = self.client.new_request(
            Method::PUT,
            &variable_path(context_id, variable),
            Some(&StoreVariableRequest { value }),
        )?;
        Ok(self
            .client
            .do_request_cancellable(request, &self.cancel)
            .await?
            .data)
    }

    /// Removes a variable from a context.
    pub async fn delete_environment_variable(
        &self,
        context_id: &str,
        variable: &str,
    ) -> Result<(), ApiError> {
        let request = self.client.new_request::<()>(
            Method::DELETE,
            &variable_path(context_id, variable),
            None,
        )?;
        self.discard(request).await
    }

    async fn discard(&self, request: reqwest::Request) -> Result<(), ApiError> {
        self.client
            .do_request_discarding_cancellable(request, &self.cancel)
            .await
            .map(|_| ())
    }
}
