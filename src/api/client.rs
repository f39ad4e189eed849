//
//  circleci-cli
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client Wrapper for the CircleCI API
//!
//! This module provides the generic REST client every resource client is
//! built on. It turns a verb, a relative path and an optional body into a
//! fully formed request, executes it, and decodes the JSON response.
//!
//! ## Features
//!
//! - Base URL and versioned API prefix joined once, paths supplied pre-escaped
//! - `Circle-Token` authentication on every request
//! - Fixed `Accept-Type`, `Accept-Encoding` and `User-Agent` headers
//! - Uniform mapping of non-2xx responses to [`ApiError::Domain`]
//! - Cancellation at the request boundary via [`CancellationToken`]

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT_ENCODING, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

use super::common::{format_api_error, ApiError};
use crate::auth::AuthToken;
use crate::config::Config;

/// Non-standard header CircleCI reads the accepted response type from.
pub const ACCEPT_TYPE: &str = "Accept-Type";

const JSON: &str = "application/json";

/// A decoded successful response together with its status code.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    /// The HTTP status returned by the server (always 2xx).
    pub status: StatusCode,
    /// The decoded response body.
    pub data: T,
}

/// The generic, authenticated client for the CircleCI REST API.
///
/// The client holds only configuration (HTTP connection pool, base URL, API
/// prefix and token) and no per-request state, so it can be cloned and shared
/// between tasks freely.
///
/// # Example
///
/// ```rust,no_run
/// use circleci_cli::api::RestClient;
/// use reqwest::Method;
///
/// # async fn example() -> Result<(), circleci_cli::api::ApiError> {
/// let client = RestClient::new("https://circleci.com", "api/v2", "my-token")?;
/// let request = client.new_request::<()>(Method::GET, "me", None)?;
/// let me: serde_json::Value = client.do_request(request).await?.data;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    /// The underlying HTTP client
    http: Client,
    /// Host the API is served from (e.g. `https://circleci.com`)
    base_url: Url,
    /// Versioned API prefix (e.g. `api/v2`)
    api_path: String,
    /// Credential attached to every request
    token: AuthToken,
}

impl RestClient {
    /// Creates a client for `base_url` + `api_path`, authenticating with `token`.
    ///
    /// The token is not validated; an empty token is sent as-is and the server
    /// decides what to do with it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` does not parse, or
    /// [`ApiError::Transport`] if the HTTP client could not be created.
    pub fn new(base_url: &str, api_path: &str, token: impl Into<String>) -> Result<Self, ApiError> {
        Self::build(base_url, api_path, AuthToken::new(token), None)
    }

    /// Creates a client from the loaded configuration.
    ///
    /// The configured timeout bounds every request issued by this client.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::build(
            &config.host,
            &config.rest_endpoint,
            AuthToken::new(config.token.clone().unwrap_or_default()),
            Some(Duration::from_secs(config.timeout_secs)),
        )
    }

    fn build(
        base_url: &str,
        api_path: &str,
        token: AuthToken,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: Url::parse(base_url)?,
            api_path: api_path.trim_matches('/').to_string(),
            token,
        })
    }

    /// Returns the host URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the versioned API prefix, without surrounding slashes.
    pub fn api_path(&self) -> &str {
        &self.api_path
    }

    /// Joins the base URL, API prefix and an already-escaped relative path.
    ///
    /// `path` may carry a `?query` suffix. Percent-escapes already present in
    /// `path` are preserved, so `org%2Fname` stays a single segment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use circleci_cli::api::RestClient;
    ///
    /// let client = RestClient::new("https://circleci.com", "api/v2", "").unwrap();
    /// let url = client.endpoint("project/github/acme/widgets/pipeline").unwrap();
    /// assert_eq!(
    ///     url.as_str(),
    ///     "https://circleci.com/api/v2/project/github/acme/widgets/pipeline"
    /// );
    /// ```
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let joined = if self.api_path.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{}/{path}", self.api_path)
        };
        Ok(Url::parse(&joined)?)
    }

    /// Builds a request for `method` on `path` with an optional JSON body.
    ///
    /// Every request carries `Accept-Type: application/json`,
    /// `Accept-Encoding: gzip`, the CLI `User-Agent` and the `Circle-Token`
    /// header. When `body` is present it is serialized as JSON and sent with
    /// `Content-Type: application/json`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidUrl`] if the endpoint URL does not parse
    /// - [`ApiError::Encoding`] if the body cannot be serialized
    /// - [`ApiError::InvalidRequest`] if reqwest rejects the assembled request,
    ///   e.g. a token that is not a valid header value
    pub fn new_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Request, ApiError> {
        let url = self.endpoint(path)?;

        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT_TYPE, JSON)
            .header(ACCEPT_ENCODING, "gzip")
            .header(USER_AGENT, crate::user_agent());
        request = self.token.apply_to_request(request);

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(ApiError::Encoding)?;
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static(JSON))
                .body(bytes);
        }

        request.build().map_err(ApiError::InvalidRequest)
    }

    /// Executes `request` and decodes a successful response body into `T`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] on connection, DNS or timeout failure
    /// - [`ApiError::Domain`] for any non-2xx status, carrying the server message
    /// - [`ApiError::Decoding`] if the 2xx body is not valid JSON for `T`;
    ///   the raw body is kept on the error
    pub async fn do_request<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<ApiResponse<T>, ApiError> {
        let (status, text) = self.send(request).await?;

        match serde_json::from_str::<T>(&text) {
            Ok(data) => Ok(ApiResponse { status, data }),
            Err(source) => Err(ApiError::Decoding { source, body: text }),
        }
    }

    /// Executes `request` for its side effect only.
    ///
    /// Non-2xx responses are still reported as [`ApiError::Domain`]; a success
    /// body is read and discarded.
    pub async fn do_request_discarding(&self, request: Request) -> Result<StatusCode, ApiError> {
        let (status, _) = self.send(request).await?;
        Ok(status)
    }

    /// Like [`do_request`](Self::do_request), but gives up as soon as `cancel`
    /// fires.
    ///
    /// The in-flight request future is dropped on cancellation, which closes
    /// its connection.
    pub async fn do_request_cancellable<T: DeserializeOwned>(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse<T>, ApiError> {
        until_cancelled(cancel, self.do_request(request)).await
    }

    /// Like [`do_request_discarding`](Self::do_request_discarding), but gives
    /// up as soon as `cancel` fires.
    pub async fn do_request_discarding_cancellable(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Result<StatusCode, ApiError> {
        until_cancelled(cancel, self.do_request_discarding(request)).await
    }

    async fn send(&self, request: Request) -> Result<(StatusCode, String), ApiError> {
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(%status, "received response");
        trace!(body = %text, "response body");

        if !status.is_success() {
            return Err(format_api_error(status, &text));
        }

        Ok((status, text))
    }
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    request: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("request cancelled");
            Err(ApiError::Cancelled)
        }
        result = request => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        name: String,
    }

    #[test]
    fn test_endpoint_joins_prefix() {
        let client = RestClient::new("https://circleci.com/", "/api/v2/", "t").unwrap();
        assert_eq!(
            client.endpoint("/me").unwrap().as_str(),
            "https://circleci.com/api/v2/me"
        );
    }

    #[test]
    fn test_endpoint_preserves_escapes_and_query() {
        let client = RestClient::new("https://circleci.com", "api/v2", "t").unwrap();
        let url = client
            .endpoint("context?owner-slug=gh%2Facme")
            .unwrap();
        assert_eq!(url.path(), "/api/v2/context");
        assert_eq!(url.query(), Some("owner-slug=gh%2Facme"));

        let url = client.endpoint("project/github/a%2Fb/c/pipeline").unwrap();
        assert_eq!(url.path(), "/api/v2/project/github/a%2Fb/c/pipeline");
    }

    #[test]
    fn test_endpoint_without_prefix() {
        let client = RestClient::new("http://localhost:8080", "", "t").unwrap();
        assert_eq!(
            client.endpoint("me").unwrap().as_str(),
            "http://localhost:8080/me"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = RestClient::new("not a url", "api/v2", "t").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_new_request_sets_headers_without_body() {
        let client = RestClient::new("https://circleci.com", "api/v2", "fake-token").unwrap();
        let request = client.new_request::<()>(Method::GET, "me", None).unwrap();
        let headers = request.headers();

        assert_eq!(headers[ACCEPT_TYPE], "application/json");
        assert_eq!(headers[ACCEPT_ENCODING], "gzip");
        assert_eq!(headers[USER_AGENT], crate::user_agent().as_str());
        assert_eq!(headers["Circle-Token"], "fake-token");
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(request.body().is_none());
    }

    #[test]
    fn test_new_request_serializes_body() {
        let client = RestClient::new("https://circleci.com", "api/v2", "fake-token").unwrap();
        let request = client
            .new_request(Method::POST, "thing", Some(&json!({"branch": "main"})))
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"branch":"main"}"#);
    }

    #[test]
    fn test_empty_token_passes_through() {
        let client = RestClient::new("https://circleci.com", "api/v2", "").unwrap();
        let request = client.new_request::<()>(Method::GET, "me", None).unwrap();
        assert_eq!(request.headers()["Circle-Token"], "");
    }

    #[tokio::test]
    async fn test_do_request_decodes_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/widget")
            .match_header("Circle-Token", "fake-token")
            .match_header("Accept-Type", "application/json")
            .match_header("Accept-Encoding", "gzip")
            .match_header("User-Agent", crate::user_agent().as_str())
            .with_status(200)
            .with_body(r#"{"name": "sprocket"}"#)
            .create_async()
            .await;

        let client = RestClient::new(&server.url(), "api/v2", "fake-token").unwrap();
        let request = client.new_request::<()>(Method::GET, "widget", None).unwrap();
        let response = client.do_request::<Widget>(request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.data, Widget { name: "sprocket".to_string() });
    }

    #[tokio::test]
    async fn test_do_request_maps_non_success_to_domain_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v2/widget")
            .with_status(422)
            .with_body(r#"{"message": "Invalid widget"}"#)
            .create_async()
            .await;

        let client = RestClient::new(&server.url(), "api/v2", "fake-token").unwrap();
        let request = client
            .new_request(Method::POST, "widget", Some(&json!({"name": ""})))
            .unwrap();
        let err = client.do_request::<Widget>(request).await.unwrap_err();

        match err {
            ApiError::Domain { status, message } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(message, "Invalid widget");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_do_request_keeps_raw_body_on_decode_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/widget")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = RestClient::new(&server.url(), "api/v2", "fake-token").unwrap();
        let request = client.new_request::<()>(Method::GET, "widget", None).unwrap();
        let err = client.do_request::<Widget>(request).await.unwrap_err();

        match err {
            ApiError::Decoding { body, .. } => assert_eq!(body, "<html>maintenance</html>"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_do_request_discarding_ignores_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/v2/widget/1")
            .with_status(200)
            .with_body(r#"{"message": "ok"}"#)
            .create_async()
            .await;

        let client = RestClient::new(&server.url(), "api/v2", "fake-token").unwrap();
        let request = client
            .new_request::<()>(Method::DELETE, "widget/1", None)
            .unwrap();
        let status = client.do_request_discarding(request).await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = RestClient::new("http://127.0.0.1:9", "api/v2", "t").unwrap();
        let request = client.new_request::<()>(Method::GET, "me", None).unwrap();
        let err = client.do_request::<Widget>(request).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn test_cancelled_request() {
        let server = mockito::Server::new_async().await;
        let client = RestClient::new(&server.url(), "api/v2", "t").unwrap();
        let request = client.new_request::<()>(Method::GET, "me", None).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .do_request_cancellable::<Widget>(request, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancellable_request_completes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/widget")
            .with_status(200)
            .with_body(r#"{"name": "gear"}"#)
            .create_async()
            .await;

        let client = RestClient::new(&server.url(), "api/v2", "t").unwrap();
        let request = client.new_request::<()>(Method::GET, "widget", None).unwrap();
        let response = client
            .do_request_cancellable::<Widget>(request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.data.name, "gear");
    }

    #[tokio::test]
    async fn test_body_reaches_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/widget")
            .match_header("Content-Type", "application/json")
            .match_body(Matcher::Exact(r#"{"name":"cog"}"#.to_string()))
            .with_status(201)
            .with_body(r#"{"name": "cog"}"#)
            .create_async()
            .await;

        let client = RestClient::new(&server.url(), "api/v2", "t").unwrap();
        let request = client
            .new_request(Method::POST, "widget", Some(&json!({"name": "cog"})))
            .unwrap();
        let response = client.do_request::<Widget>(request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    #[test]
    fn test_client_is_shareable() {
        fn assert_shareable<T: Clone + Send + Sync + 'static>() {}
        fn assert_sendable<T: Send + Sync + 'static>() {}
        assert_shareable::<RestClient>();
        assert_sendable::<ApiError>();
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_client() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/widget")
            .with_status(200)
            .with_body(r#"{"name": "spoke"}"#)
            .expect(2)
            .create_async()
            .await;

        let client = RestClient::new(&server.url(), "api/v2", "t").unwrap();
        let first = client.new_request::<()>(Method::GET, "widget", None).unwrap();
        let second = client.new_request::<()>(Method::GET, "widget", None).unwrap();

        let other = client.clone();
        let spawned = tokio::spawn(async move { other.do_request::<Widget>(second).await });
        let (a, b) = tokio::join!(client.do_request::<Widget>(first), spawned);

        mock.assert_async().await;
        assert_eq!(a.unwrap().data.name, "spoke");
        assert_eq!(b.unwrap().unwrap().data.name, "spoke");
    }

    #[test]
    fn test_invalid_token_is_not_a_transport_error() {
        let client = RestClient::new("https://circleci.com", "api/v2", "abc\ndef").unwrap();
        let err = client
            .new_request::<()>(Method::GET, "me", None)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert!(err.to_string().starts_with("Invalid request"));
    }

    #[tokio::test]
    async fn test_cancelled_discarding_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/v2/widget/1")
            .expect(0)
            .create_async()
            .await;

        let client = RestClient::new(&server.url(), "api/v2", "t").unwrap();
        let request = client
            .new_request::<()>(Method::DELETE, "widget/1", None)
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .do_request_discarding_cancellable(request, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
        mock.assert_async().await;
    }
}
