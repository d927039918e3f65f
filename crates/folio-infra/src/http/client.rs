//! Shared request plumbing for the blog API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use folio_core::error::GatewayError;
use folio_core::ports::CredentialProvider;
use folio_shared::ApiResponse;

/// Connection settings of the HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// API root, including the `/api` prefix.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5005/api".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Gateway speaking the blog's REST contract.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpBackend {
    pub fn new(
        config: &HttpConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        tracing::info!(base_url = %config.base_url, "HTTP backend configured");
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub(super) fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Request carrying the session's bearer credential, if any.
    pub(super) fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.credentials.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Request without credentials, for the auth endpoints.
    pub(super) fn anonymous(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Send and unwrap the response envelope's `data`.
    pub(super) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let body = self.send_raw(request).await?;
        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(GatewayError::Rejected {
                status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                message: envelope.reason().unwrap_or("Request failed").to_string(),
            });
        }
        envelope
            .data
            .ok_or_else(|| GatewayError::Decode("response carries no data".to_string()))
    }

    /// Send, checking only the status and the envelope's `success` flag.
    pub(super) async fn send_empty(&self, request: RequestBuilder) -> Result<(), GatewayError> {
        let body = self.send_raw(request).await?;
        match serde_json::from_str::<ApiResponse<serde_json::Value>>(&body) {
            Ok(envelope) if !envelope.success => Err(GatewayError::Rejected {
                status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                message: envelope.reason().unwrap_or("Request failed").to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn send_raw(&self, request: RequestBuilder) -> Result<String, GatewayError> {
        let response = request.send().await.map_err(transport_error)?;
        let body = self.check(response).await?;
        Ok(body)
    }

    /// Map a non-success status. A 401 also discards the session credential.
    async fn check(&self, response: Response) -> Result<String, GatewayError> {
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if status.is_success() {
            return Ok(body);
        }

        let err = status_error(status, &body);
        if matches!(err, GatewayError::Unauthorized) {
            self.credentials.invalidate();
        }
        tracing::debug!(status = status.as_u16(), error = %err, "Backend returned an error");
        Err(err)
    }
}

pub(super) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(super) fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_decode() {
        GatewayError::Decode(err.to_string())
    } else {
        GatewayError::Transport(err.to_string())
    }
}

/// Gateway error for a non-success status, using the envelope's reason when present.
pub(super) fn status_error(status: StatusCode, body: &str) -> GatewayError {
    let reason = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.reason().map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED => GatewayError::Unauthorized,
        StatusCode::FORBIDDEN => GatewayError::Forbidden(reason),
        StatusCode::NOT_FOUND => GatewayError::NotFound,
        other => GatewayError::Rejected {
            status: other.as_u16(),
            message: reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(
            join_url("http://localhost:5005/api/", "/posts/p-1"),
            "http://localhost:5005/api/posts/p-1"
        );
        assert_eq!(join_url("http://h/api", "auth/login"), "http://h/api/auth/login");
    }

    #[test]
    fn test_status_error_uses_envelope_reason() {
        let body = r#"{"success":false,"error":"Title is required"}"#;
        match status_error(StatusCode::BAD_REQUEST, body) {
            GatewayError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Title is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_error_without_envelope() {
        match status_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>") {
            GatewayError::Rejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_error_kinds() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            GatewayError::Unauthorized
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, ""),
            GatewayError::NotFound
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, r#"{"success":false,"message":"Admins only"}"#),
            GatewayError::Forbidden(msg) if msg == "Admins only"
        ));
    }
}
