//
//  circleci-cli
//  api/pipelines.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pipelines API types and resource client.
//!
//! A pipeline is a single execution of a project's configuration, identified
//! by an opaque ID and a per-project number that increases with every run.
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | [`Pipelines::get`] | `GET project/{vcs}/{org}/{project}/pipeline` |
//! | [`Pipelines::trigger`] | `POST project/{vcs}/{org}/{project}/pipeline` |
//!
//! # Example
//!
//! ```rust,no_run
//! use circleci_cli::api::pipelines::{Pipelines, TriggerParameters};
//! use circleci_cli::api::RestClient;
//! use circleci_cli::context::Remote;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = RestClient::new("https://circleci.com", "api/v2", "my-token")?;
//! let pipelines = Pipelines::new(client);
//! let remote = Remote::new("github", "acme", "widgets");
//!
//! let pipeline = pipelines
//!     .trigger(&remote, &TriggerParameters::for_branch("main"))
//!     .await?;
//! println!("Triggered pipeline #{} ({})", pipeline.number, pipeline.state);
//! # Ok(())
//! # }
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::client::RestClient;
use super::common::{ApiError, Page};
use crate::context::Remote;
use crate::util::escape_path_segment;

/// A single pipeline run as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Opaque unique identifier (a UUID).
    pub id: String,

    /// Sequential number within the project.
    pub number: u64,

    /// Lifecycle state of the pipeline.
    pub state: PipelineState,

    /// When the pipeline was created.
    pub created_at: DateTime<Utc>,

    /// When the pipeline was last updated. Absent for some pipelines that
    /// never left the `created` state.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// What caused the pipeline to run.
    pub trigger: Trigger,
}

/// Lifecycle state of a pipeline.
///
/// Values the CLI does not know yet decode as [`PipelineState::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    /// The pipeline was accepted and is being set up.
    #[serde(rename = "created")]
    Created,
    /// The pipeline failed before any work ran (e.g. invalid config).
    #[serde(rename = "errored")]
    Errored,
    /// Waiting for a setup workflow to be scheduled.
    #[serde(rename = "setup-pending")]
    SetupPending,
    /// A setup workflow is generating the configuration.
    #[serde(rename = "setup")]
    Setup,
    /// Configuration is being compiled.
    #[serde(rename = "pending")]
    Pending,
    /// Any state not listed above.
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl PipelineState {
    /// The wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Errored => "errored",
            Self::SetupPending => "setup-pending",
            Self::Setup => "setup",
            Self::Pending => "pending",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The event that started a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    /// Kind of trigger.
    #[serde(rename = "type")]
    pub kind: TriggerKind,

    /// When the trigger was received.
    pub received_at: DateTime<Utc>,

    /// Who caused the trigger.
    pub actor: Actor,
}

/// How a pipeline was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Triggered through the API (including this CLI).
    #[serde(rename = "api")]
    Api,
    /// Triggered by a VCS webhook (push, pull request).
    #[serde(rename = "webhook")]
    Webhook,
    /// Triggered explicitly from the web application.
    #[serde(rename = "explicit")]
    Explicit,
    /// Triggered by a schedule.
    #[serde(rename = "scheduled_pipeline")]
    Scheduled,
    /// Any trigger type not listed above.
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl TriggerKind {
    /// The wire name of the trigger type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Webhook => "webhook",
            Self::Explicit => "explicit",
            Self::Scheduled => "scheduled_pipeline",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user behind a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// VCS login of the user.
    pub login: String,

    /// URL of the user's avatar. API and scheduled triggers report `null`,
    /// which decodes as an empty string.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub avatar_url: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request payload for triggering a pipeline.
///
/// An absent or empty branch is left out of the body entirely, letting the
/// server fall back to the project's default branch.
///
/// ```rust
/// use circleci_cli::api::pipelines::TriggerParameters;
///
/// let body = serde_json::to_string(&TriggerParameters::for_branch("main")).unwrap();
/// assert_eq!(body, r#"{"branch":"main"}"#);
///
/// let body = serde_json::to_string(&TriggerParameters::default()).unwrap();
/// assert_eq!(body, "{}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TriggerParameters {
    /// Branch to build.
    #[serde(skip_serializing_if = "is_blank")]
    pub branch: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

impl TriggerParameters {
    /// Parameters building `branch`.
    pub fn for_branch(branch: impl Into<String>) -> Self {
        Self {
            branch: Some(branch.into()),
        }
    }
}

/// Builds the pipeline collection path for `remote`.
///
/// The VCS type is lowercased; every segment is escaped on its own.
///
/// ```rust
/// use circleci_cli::api::pipelines::pipeline_path;
/// use circleci_cli::context::Remote;
///
/// let remote = Remote::new("GitHub", "acme", "widgets");
/// assert_eq!(pipeline_path(&remote), "project/github/acme/widgets/pipeline");
/// ```
pub fn pipeline_path(remote: &Remote) -> String {
    format!(
        "project/{}/{}/{}/pipeline",
        remote.vcs_type.path_segment(),
        escape_path_segment(&remote.organization),
        escape_path_segment(&remote.project)
    )
}

/// Resource client for project pipelines.
///
/// Errors from the underlying [`RestClient`] are returned unchanged.
#[derive(Debug, Clone)]
pub struct Pipelines {
    client: RestClient,
    cancel: CancellationToken,
}

impl Pipelines {
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

    /// Lists the pipelines of `remote`, in server order (most recent first).
    ///
    /// Only the first page is returned. An empty project yields an empty
    /// vector.
    pub async fn get(&self, remote: &Remote) -> Result<Vec<Pipeline>, ApiError> {
        let request = self
            .client
            .new_request::<()>(Method::GET, &pipeline_path(remote), None)?;
        let page: Page<Pipeline> = self
            .client
            .do_request_cancellable(request, &self.cancel)
            .await?
            .data;
        if page.has_next() {
            debug!(project = %remote, "more pipelines available beyond the first page");
        }
        Ok(page.items)
    }

    /// Triggers a new pipeline for `remote`.
    pub async fn trigger(
        &self,
        remote: &Remote,
        params: &TriggerParameters,
    ) -> Result<Pipeline, ApiError> {
        let request = self
            .client
            .new_request(Method::POST, &pipeline_path(remote), Some(params))?;
        Ok(self
            .client
            .do_request_cancellable(request, &self.cancel)
            .await?
            .data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};
    use reqwest::StatusCode;

    use crate::context::VcsType;

    const TRIGGER_RESPONSE: &str = r#"
{
    "id": "2bc0df8e-d258-4ae8-9c2b-3793f004725f",
    "number": 123,
    "state": "created",
    "created_at": "2020-03-01T09:30:00Z",
    "updated_at": "2020-03-01T09:32:00Z",
    "trigger": {
        "type": "api",
        "received_at": "2020-03-01T09:30:00Z",
        "actor": {
            "login": "the-actor-login",
            "avatar_url": "the-actor-avatar"
        }
    }
}"#;

    const LIST_RESPONSE: &str = r#"
{
    "items": [
        {
            "id": "673b09d4-bb6f-41e0-8923-61c486376bff",
            "number": 123,
            "state": "created",
            "created_at": "2020-03-01T09:30:00Z",
            "updated_at": "2020-03-01T09:32:00Z",
            "trigger": {
                "type": "api",
                "received_at": "2020-03-01T09:30:00Z",
                "actor": {
                    "login": "the-actor-login",
                    "avatar_url": "the-actor-avatar"
                }
            }
        },
        {
            "id": "ba7fea2b-47a4-4213-8425-dfa37d900a62",
            "number": 234,
            "state": "created",
            "created_at": "2020-04-01T09:30:00Z",
            "updated_at": "2020-04-01T09:32:00Z",
            "trigger": {
                "type": "webhook",
                "received_at": "2020-04-01T09:30:00Z",
                "actor": {
                    "login": "the-actor-login",
                    "avatar_url": "the-actor-avatar"
                }
            }
        }
    ],
    "next_page_token": null
}"#;

    const PIPELINE_PATH: &str = "/api/v2/project/github/the-organization/the-project/pipeline";

    fn remote() -> Remote {
        Remote::new(VcsType::GitHub, "the-organization", "the-project")
    }

    fn pipelines(server: &Server) -> Pipelines {
        Pipelines::new(RestClient::new(&server.url(), "api/v2", "fake-token").unwrap())
    }

    fn at(month: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, month, 1, 9, minute, 0).unwrap()
    }

    fn expected_pipeline(id: &str, number: u64, month: u32, kind: TriggerKind) -> Pipeline {
        Pipeline {
            id: id.to_string(),
            number,
            state: PipelineState::Created,
            created_at: at(month, 30),
            updated_at: Some(at(month, 32)),
            trigger: Trigger {
                kind,
                received_at: at(month, 30),
                actor: Actor {
                    login: "the-actor-login".to_string(),
                    avatar_url: "the-actor-avatar".to_string(),
                },
            },
        }
    }

    #[test]
    fn test_pipeline_path_lowercases_vcs() {
        let remote = Remote::new("GITHUB", "the-organization", "the-project");
        assert_eq!(
            pipeline_path(&remote),
            "project/github/the-organization/the-project/pipeline"
        );
    }

    #[test]
    fn test_pipeline_path_escapes_segments_independently() {
        let remote = Remote::new(VcsType::Bitbucket, "my org", "a/b");
        let path = pipeline_path(&remote);
        assert_eq!(path, "project/bitbucket/my%20org/a%2Fb/pipeline");

        let segments: Vec<&str> = path.split('/').collect();
        assert_eq!(segments.len(), 5);
        assert_eq!(urlencoding::decode(segments[2]).unwrap(), "my org");
        assert_eq!(urlencoding::decode(segments[3]).unwrap(), "a/b");
    }

    #[test]
    fn test_trigger_parameters_omit_empty_branch() {
        let empty = TriggerParameters {
            branch: Some(String::new()),
        };
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
        assert_eq!(
            serde_json::to_string(&TriggerParameters::for_branch("main")).unwrap(),
            r#"{"branch":"main"}"#
        );
    }

    #[test]
    fn test_unknown_states_decode() {
        let state: PipelineState = serde_json::from_str(r#""something-new""#).unwrap();
        assert_eq!(state, PipelineState::Unknown);
        let kind: TriggerKind = serde_json::from_str(r#""scheduled_pipeline""#).unwrap();
        assert_eq!(kind, TriggerKind::Scheduled);
        let kind: TriggerKind = serde_json::from_str(r#""carrier_pigeon""#).unwrap();
        assert_eq!(kind, TriggerKind::Unknown);
    }

    #[test]
    fn test_pipeline_serde_round_trip() {
        let pipeline = expected_pipeline("abc", 7, 3, TriggerKind::Webhook);
        let json = serde_json::to_string(&pipeline).unwrap();
        let decoded: Pipeline = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, pipeline);
    }

    #[tokio::test]
    async fn test_trigger() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PIPELINE_PATH)
            .match_header("Accept-Encoding", "gzip")
            .match_header("Accept-Type", "application/json")
            .match_header("Circle-Token", "fake-token")
            .match_header("Content-Length", "23")
            .match_header("Content-Type", "application/json")
            .match_header("User-Agent", crate::user_agent().as_str())
            .match_body(Matcher::Exact(r#"{"branch":"the-branch"}"#.to_string()))
            .with_status(200)
            .with_body(TRIGGER_RESPONSE)
            .create_async()
            .await;

        let pipeline = pipelines(&server)
            .trigger(&remote(), &TriggerParameters::for_branch("the-branch"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            pipeline,
            expected_pipeline(
                "2bc0df8e-d258-4ae8-9c2b-3793f004725f",
                123,
                3,
                TriggerKind::Api
            )
        );
    }

    #[tokio::test]
    async fn test_trigger_without_branch_sends_empty_object() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PIPELINE_PATH)
            .match_body(Matcher::Exact("{}".to_string()))
            .with_status(201)
            .with_body(TRIGGER_RESPONSE)
            .create_async()
            .await;

        let pipeline = pipelines(&server)
            .trigger(&remote(), &TriggerParameters::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pipeline.state, PipelineState::Created);
    }

    #[tokio::test]
    async fn test_get() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", PIPELINE_PATH)
            .match_header("Accept-Encoding", "gzip")
            .match_header("Accept-Type", "application/json")
            .match_header("Circle-Token", "fake-token")
            .match_header("User-Agent", crate::user_agent().as_str())
            .match_header("Content-Type", Matcher::Missing)
            .match_body(Matcher::Exact(String::new()))
            .with_status(200)
            .with_body(LIST_RESPONSE)
            .create_async()
            .await;

        let pipes = pipelines(&server).get(&remote()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            pipes,
            vec![
                expected_pipeline(
                    "673b09d4-bb6f-41e0-8923-61c486376bff",
                    123,
                    3,
                    TriggerKind::Api
                ),
                expected_pipeline(
                    "ba7fea2b-47a4-4213-8425-dfa37d900a62",
                    234,
                    4,
                    TriggerKind::Webhook
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_tolerates_null_avatar() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", PIPELINE_PATH)
            .with_status(200)
            .with_body(
                r#"{"items": [{
                    "id": "p-1", "number": 7, "state": "created",
                    "created_at": "2020-03-01T09:30:00Z",
                    "trigger": {"type": "scheduled_pipeline",
                                "received_at": "2020-03-01T09:30:00Z",
                                "actor": {"login": "scheduler", "avatar_url": null}}
                }]}"#,
            )
            .create_async()
            .await;

        let pipes = pipelines(&server).get(&remote()).await.unwrap();

        assert_eq!(pipes.len(), 1);
        assert_eq!(pipes[0].trigger.actor.avatar_url, "");
        assert_eq!(pipes[0].trigger.kind, TriggerKind::Scheduled);
        assert_eq!(pipes[0].updated_at, None);
    }

    #[test]
    fn test_actor_without_avatar() {
        let actor: Actor = serde_json::from_str(r#"{"login": "me"}"#).unwrap();
        assert_eq!(actor.avatar_url, "");
        assert!(serde_json::from_str::<Actor>(r#"{"login": "me", "avatar_url": 3}"#).is_err());
    }

    #[tokio::test]
    async fn test_get_empty_collection() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", PIPELINE_PATH)
            .with_status(200)
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let pipes = pipelines(&server).get(&remote()).await.unwrap();
        assert!(pipes.is_empty());
    }

    #[tokio::test]
    async fn test_get_escaped_project() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/project/bitbucket/my%20org/a%2Fb/pipeline")
            .with_status(200)
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let remote = Remote::new("Bitbucket", "my org", "a/b");
        pipelines(&server).get(&remote).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_trigger_error_returns_no_pipeline() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PIPELINE_PATH)
            .with_status(422)
            .with_body(r#"{"message": "Branch not found"}"#)
            .create_async()
            .await;

        let err = pipelines(&server)
            .trigger(&remote(), &TriggerParameters::for_branch("nope"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(err.to_string(), "Branch not found (HTTP 422 Unprocessable Entity)");
    }

    #[tokio::test]
    async fn test_get_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", PIPELINE_PATH)
            .with_status(404)
            .with_body(r#"{"message": "Project not found"}"#)
            .create_async()
            .await;

        let err = pipelines(&server).get(&remote()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_partial_body_is_decoding_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", PIPELINE_PATH)
            .with_status(200)
            .with_body(r#"{"items": [{"id": "x", "number": "not-a-number"}]}"#)
            .create_async()
            .await;

        let err = pipelines(&server).get(&remote()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decoding { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_response() {
        let server = Server::new_async().await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pipelines(&server)
            .with_cancellation(cancel)
            .get(&remote())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }
}
