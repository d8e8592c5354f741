//! HTTP plumbing shared by the provider clients.

use std::time::Duration;

use reqwest::{Client as HttpClient, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use super::settings::ProviderConfig;
use crate::error::{FetchError, ReservationError};

/// How a provider expects its API key.
#[derive(Clone)]
pub enum Auth {
    None,
    Bearer(String),
    Header { name: &'static str, value: String },
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer(_) => f.write_str("Bearer(***)"),
            Self::Header { name, .. } => write!(f, "Header({name}: ***)"),
        }
    }
}

/// Failure of a single provider API call.
#[derive(Debug)]
pub enum HttpFailure {
    /// Transport, timeout, or body decoding failure.
    Transport(reqwest::Error),
    /// The provider answered with a non-success status.
    Status { status: StatusCode, message: String },
}

impl std::fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "{err}"),
            Self::Status { status, message } if message.is_empty() => write!(f, "HTTP {status}"),
            Self::Status { status, message } => write!(f, "HTTP {status}: {message}"),
        }
    }
}

impl From<HttpFailure> for FetchError {
    fn from(failure: HttpFailure) -> Self {
        FetchError::Unreachable(failure.to_string())
    }
}

impl From<HttpFailure> for ReservationError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Status { status, message } if status.is_client_error() => {
                let reason = if message.is_empty() {
                    format!("HTTP {status}")
                } else {
                    message
                };
                ReservationError::Rejected(reason)
            }
            other => ReservationError::Unreachable(other.to_string()),
        }
    }
}

/// Error body shapes providers use for human-readable reasons.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error", alias = "detail")]
    message: Option<String>,
}

/// HTTP client bound to one provider API.
pub struct ProviderHttp {
    http: HttpClient,
    base: Url,
    auth: Auth,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl ProviderHttp {
    /// Build a client for `config`.
    ///
    /// # Errors
    /// Returns an error if `api_url` is not a valid URL.
    pub fn from_config(config: &ProviderConfig, auth: Auth) -> Result<Self, url::ParseError> {
        let mut raw = config.api_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)?;

        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Ok(Self {
            http,
            base,
            auth,
            retry_max_attempts: config.retry_max_attempts,
            retry_backoff_ms: config.retry_backoff_ms,
        })
    }

    /// Absolute URL for a path relative to the API base.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        self.base
            .join(path.trim_start_matches('/'))
            .map_or_else(|_| format!("{}{path}", self.base), String::from)
    }

    /// `GET` a JSON resource.
    pub async fn get_json<T>(&self, path: &str) -> Result<T, HttpFailure>
    where
        T: DeserializeOwned,
    {
        self.send(Method::GET, path, None::<&()>, self.retry_max_attempts)
            .await
    }

    /// `POST` a JSON body and decode the JSON answer.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, HttpFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body), self.retry_max_attempts)
            .await
    }

    /// `POST` a JSON body exactly once.
    ///
    /// For non-idempotent calls such as creating a hold: a timeout may mean
    /// the provider already acted, so the request is never repeated.
    pub async fn post_json_once<B, T>(&self, path: &str, body: &B) -> Result<T, HttpFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body), 1).await
    }

    fn request<B>(&self, method: Method, url: &str, body: Option<&B>) -> RequestBuilder
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.http.request(method, url);
        request = match &self.auth {
            Auth::None => request,
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::Header { name, value } => request.header(*name, value),
        };
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        max_attempts: u32,
    ) -> Result<T, HttpFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let mut attempt = 0;
        let max_attempts = max_attempts.max(1);

        loop {
            attempt += 1;
            debug!(method = %method, url = %url, attempt, "Provider request");
            let response = match self.request(method.clone(), &url, body).send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(HttpFailure::Transport(err));
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(HttpFailure::Status {
                    status,
                    message: error_message(&text),
                });
            }

            match response.json::<T>().await {
                Ok(parsed) => return Ok(parsed),
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(HttpFailure::Transport(err));
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "HTTP request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }
}

/// Pull a reason out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_relative_to_api_root() {
        let http = ProviderHttp::from_config(&ProviderConfig::new("https://alpha.test/api/v2"), Auth::None)
            .unwrap();
        assert_eq!(http.url("availability"), "https://alpha.test/api/v2/availability");
        assert_eq!(http.url("/bookings/ABC"), "https://alpha.test/api/v2/bookings/ABC");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(ProviderHttp::from_config(&ProviderConfig::new("not a url"), Auth::None).is_err());
    }

    #[test]
    fn client_errors_become_rejections() {
        let failure = HttpFailure::Status {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "fare no longer available".into(),
        };
        assert_eq!(
            ReservationError::from(failure),
            ReservationError::Rejected("fare no longer available".into())
        );

        let failure = HttpFailure::Status {
            status: StatusCode::BAD_GATEWAY,
            message: String::new(),
        };
        assert!(matches!(
            ReservationError::from(failure),
            ReservationError::Unreachable(_)
        ));
    }

    #[test]
    fn error_message_prefers_structured_reason() {
        assert_eq!(error_message(r#"{"message":"sold out"}"#), "sold out");
        assert_eq!(error_message(r#"{"error":"bad pnr"}"#), "bad pnr");
        assert_eq!(error_message("  plain text  "), "plain text");
    }

    #[test]
    fn auth_debug_hides_secrets() {
        let auth = Auth::Bearer("secret-token".into());
        assert!(!format!("{auth:?}").contains("secret"));
    }
}
