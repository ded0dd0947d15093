// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! HTTPS connector for the Gab API.
//!
//! Service structures in this module provide a low-level way to interact
//! with the Gab API over HTTPS, essentially a specialized HTTPS client
//! that logs in, attaches a bearer token to every request, and retries
//! failed requests up to a configured tolerance.

use crate::conf::Credentials;
use crate::http::{HTTPError, HTTPResult, HTTPService};
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::Deserialize;
use std::time::Duration;

/// Root of the Gab API.
pub const BASE_URL: &str = "https://gab.com";

const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// A service for retrieving raw API responses.
///
/// Using this trait, clients can implement different ways of connecting
/// to the Gab API, such as an actual connector for production code,
/// and an in-memory connector for testing purposes.
pub trait Service: Clone {
    /// Performs a GET request for `path` (relative to the API root) with
    /// the given query parameters and returns the raw JSON body.
    fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> impl Future<Output = HTTPResult<String>> + Send;
}

/// How many failures of each kind are retried before giving up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tolerance {
    /// Connection failures and timeouts that will be retried.
    pub connection_errors: u32,

    /// Rate-limited (429) or server error (5xx) responses that will be retried.
    pub http_errors: u32,
}

impl Tolerance {
    /// Creates a new tolerance.
    pub fn new(connection_errors: u32, http_errors: u32) -> Self {
        Self {
            connection_errors,
            http_errors,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// A service that contacts the Gab API directly on behalf of a logged-in
/// account.
#[derive(Clone, Debug)]
pub struct GabService {
    client: Client,
    base_url: String,
    token: String,
    tolerance: Tolerance,
}

impl HTTPService for GabService {}

impl GabService {
    /// Logs in to Gab and returns a service authorized to make requests
    /// as that account.
    ///
    /// `user_agent` is sent with every request; if `None`, the
    /// [default user agent](HTTPService::user_agent) is used.
    pub async fn login(
        credentials: &Credentials,
        user_agent: Option<&str>,
        tolerance: Tolerance,
    ) -> HTTPResult<Self> {
        Self::login_at(BASE_URL, credentials, user_agent, tolerance).await
    }

    /// Logs in to a Gab-compatible API rooted at `base_url`.
    pub async fn login_at(
        base_url: impl Into<String>,
        credentials: &Credentials,
        user_agent: Option<&str>,
        tolerance: Tolerance,
    ) -> HTTPResult<Self> {
        let client = Self::client(user_agent)?;
        let base_url = base_url.into();
        let mut service = Self {
            client,
            base_url,
            token: String::new(),
            tolerance,
        };

        let form = [
            ("grant_type", "password"),
            ("username", credentials.account()),
            ("password", credentials.password()),
            ("scope", "read"),
        ];
        let url = service.url("/oauth/token");
        let resp = service
            .send(|| service.client.post(&url).form(&form))
            .await?;
        let body = Self::json_body(resp).await?;
        let token: TokenResponse = serde_json::from_str(&body).map_err(|_| HTTPError::MissingToken)?;
        service.token = token.access_token.ok_or(HTTPError::MissingToken)?;

        info!("logged in as {}", credentials.account());
        Ok(service)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a request, retrying within the service's tolerance.
    ///
    /// `build` is called once per attempt since a request cannot be reused
    /// after it has been sent.
    async fn send(&self, build: impl Fn() -> RequestBuilder) -> HTTPResult<Response> {
        let mut connection_failures = 0;
        let mut http_failures = 0;

        loop {
            match build().send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp)
                    if is_retryable(resp.status())
                        && http_failures < self.tolerance.http_errors =>
                {
                    http_failures += 1;
                    let wait = retry_after(&resp).unwrap_or_else(|| backoff(http_failures));
                    warn!(
                        "{} returned HTTP {}; retry {http_failures} of {} in {}s",
                        resp.url(),
                        resp.status(),
                        self.tolerance.http_errors,
                        wait.as_secs(),
                    );
                    tokio::time::sleep(wait).await;
                }
                Ok(resp) => return Err(HTTPError::Http(resp.status())),
                Err(err)
                    if (err.is_connect() || err.is_timeout())
                        && connection_failures < self.tolerance.connection_errors =>
                {
                    connection_failures += 1;
                    let wait = backoff(connection_failures);
                    warn!(
                        "connection error: {err}; retry {connection_failures} of {} in {}s",
                        self.tolerance.connection_errors,
                        wait.as_secs(),
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => return Err(HTTPError::Request(err)),
            }
        }
    }

    async fn json_body(resp: Response) -> HTTPResult<String> {
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .ok_or(HTTPError::MissingContentType)?
            .to_str()?;
        if !content_type.starts_with("application/json") {
            Err(HTTPError::UnexpectedContentType(content_type.to_string()))
        } else {
            resp.text().await.map_err(HTTPError::Body)
        }
    }
}

impl Service for GabService {
    async fn get(&self, path: &str, params: &[(&str, String)]) -> HTTPResult<String> {
        let url = self.url(path);
        debug!("GET {url} {params:?}");
        let resp = self
            .send(|| {
                self.client
                    .get(&url)
                    .bearer_auth(&self.token)
                    .query(params)
            })
            .await?;
        Self::json_body(resp).await
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Exponential backoff: 1s, 2s, 4s, ... capped at one minute.
fn backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(6);
    Duration::from_secs(1 << exponent).min(MAX_BACKOFF)
}

fn retry_after(resp: &Response) -> Option<Duration> {
    resp.headers()
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(MAX_BACKOFF))
}
