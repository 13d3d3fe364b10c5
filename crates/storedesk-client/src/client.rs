//! HTTP client for the storefront admin backend

use crate::error::{ClientError, ClientResult};
use crate::session::SessionContext;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use storedesk_core::config::ApiConfig;
use storedesk_core::ingest::StagedFile;
use storedesk_core::types::PageInfo;

/// API client for the admin endpoints
///
/// Holds an in-memory cookie jar so the session cookie set by login is sent on
/// every later request. Clones share the jar and the session context.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Create a client for `base_url` with no request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::build(base_url.into(), None, None)
    }

    /// Create a client from the API section of the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> ClientResult<Self> {
        Self::build(
            config.base_url.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
            config.connect_timeout_secs.map(Duration::from_secs),
        )
    }

    fn build(
        base_url: String,
        timeout: Option<Duration>,
        connect_timeout: Option<Duration>,
    ) -> ClientResult<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let http = builder.build().map_err(ClientError::Transport)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: SessionContext::new(),
        })
    }

    /// Backend base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session context shared by every clone of this client
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    /// The one path every call goes through
    ///
    /// A 401 from any endpoint logs the session out before the caller sees it.
    pub(crate) async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let request = request
            .build()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "request failed");
            ClientError::Transport(e)
        })?;

        let status = response.status();
        tracing::debug!(%method, %path, status = status.as_u16(), "response received");

        if status == StatusCode::UNAUTHORIZED {
            self.session.invalidate();
            let message = error_message(&response.bytes().await.unwrap_or_default());
            tracing::warn!(%method, %path, "session rejected by backend");
            return Err(ClientError::Unauthorized { message });
        }

        Ok(response)
    }
}

/// `message` field of a JSON error body, if the body is JSON and has one
fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(ToString::to_string))
        .filter(|message| !message.trim().is_empty())
}

/// Body of a response, or an [`ClientError::Api`] for a non-2xx status
pub(crate) async fn read_body(response: Response) -> ClientResult<(StatusCode, bytes::Bytes)> {
    let status = response.status();
    let body = response.bytes().await.map_err(ClientError::Transport)?;
    if status.is_success() {
        Ok((status, body))
    } else {
        let message = error_message(&body);
        tracing::warn!(status = status.as_u16(), message = ?message, "backend returned an error");
        Err(ClientError::Api { status, message })
    }
}

/// Decode a 2xx JSON body
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let (_, body) = read_body(response).await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Require a 2xx status and, when the body is JSON, no `success: false`
pub(crate) async fn expect_success(response: Response) -> ClientResult<()> {
    let (_, body) = read_body(response).await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) if value.get("success").and_then(serde_json::Value::as_bool) == Some(false) => {
            Err(ClientError::Rejected {
                message: value
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .map(ToString::to_string),
            })
        }
        _ => Ok(()),
    }
}

/// `{success, data, message, pagination}` wrapper used by the newer endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default = "assume_success")]
    pub(crate) success: bool,
    #[serde(default = "Option::default")]
    pub(crate) data: Option<T>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) pagination: Option<PageInfo>,
}

const fn assume_success() -> bool {
    true
}

impl<T> Envelope<T> {
    /// Reject `success: false`, keeping the rest of the envelope
    pub(crate) fn checked(self) -> ClientResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ClientError::Rejected {
                message: self.message,
            })
        }
    }

    /// The `data` payload of a successful envelope
    pub(crate) fn into_data(self) -> ClientResult<T> {
        self.checked()?
            .data
            .ok_or_else(|| ClientError::Decode("response has no data".to_string()))
    }
}

/// Decode a 2xx enveloped body and reject `success: false`
pub(crate) async fn read_envelope<T: DeserializeOwned>(
    response: Response,
) -> ClientResult<Envelope<T>> {
    read_json::<Envelope<T>>(response).await?.checked()
}

/// Multipart part holding a staged file's bytes
pub(crate) async fn file_part(file: &StagedFile) -> ClientResult<Part> {
    let bytes = tokio::fs::read(&file.path).await?;
    Part::bytes(bytes)
        .file_name(file.name.clone())
        .mime_str(&file.content_type)
        .map_err(|e| ClientError::InvalidRequest(format!("{}: {e}", file.name)))
}

/// Multipart form with every staged file under `field`
pub(crate) async fn files_form(field: &'static str, files: &[StagedFile]) -> ClientResult<Form> {
    let mut form = Form::new();
    for file in files {
        form = form.part(field, file_part(file).await?);
    }
    Ok(form)
}
