//! HTTP client for the backend's storage REST API
//!
//! Objects are fetched with `GET {base_url}/storage/v1/object/{bucket}/{path}`
//! authenticated by the service key, sent both as bearer token and `apikey`.

use super::traits::ObjectStore;
use crate::config::{RetryConfig, SecretString, StorageConfig};
use crate::domain::{BackupError, BucketName, Result, StorageError};
use crate::log_retry_attempt;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// Longest error body kept in a [`StorageError`] message
const MAX_ERROR_BODY: usize = 200;

/// Storage REST client with bounded retry of transient failures
pub struct StorageClient {
    client: Client,
    base_url: Url,
    service_key: SecretString,
    retry: RetryConfig,
}

impl StorageClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Configuration`] if `base_url` is not a valid
    /// HTTP URL or the HTTP client cannot be built.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            BackupError::Configuration(format!("Invalid storage.base_url '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BackupError::Configuration(format!(
                "storage.base_url '{}' cannot be used as a base URL",
                config.base_url
            )));
        }

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            tracing::warn!(
                "TLS certificate verification is DISABLED for object storage - this is insecure"
            );
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            BackupError::Configuration(format!("Failed to build storage HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            base_url,
            service_key: config.service_key.clone(),
            retry: config.retry.clone(),
        })
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// URL of one object, with every path segment percent-encoded
    pub fn object_url(&self, bucket: &BucketName, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "object", bucket.as_str()])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    async fn download_once(&self, bucket: &BucketName, path: &str) -> std::result::Result<Vec<u8>, StorageError> {
        let key = self.service_key.expose_secret().as_ref();

        let response = self
            .client
            .get(self.object_url(bucket, path))
            .bearer_auth(key)
            .header("apikey", key)
            .send()
            .await
            .map_err(|e| transport_error(path, &e))?;

        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await.map_err(|e| transport_error(path, &e))?;
            return Ok(bytes.to_vec());
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(path, status, &body))
    }
}

#[async_trait]
impl ObjectStore for StorageClient {
    async fn download(&self, bucket: &BucketName, path: &str) -> std::result::Result<Vec<u8>, StorageError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match self.download_once(bucket, path).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_attempts || !e.is_transient() {
                        return Err(e);
                    }

                    let delay_ms = self.retry.delay_for_attempt(attempt);
                    log_retry_attempt!(path, attempt, max_attempts, delay_ms, e);

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

fn transport_error(path: &str, error: &reqwest::Error) -> StorageError {
    if error.is_timeout() {
        StorageError::Timeout {
            path: path.to_string(),
        }
    } else {
        StorageError::Connection {
            path: path.to_string(),
            message: error.to_string(),
        }
    }
}

/// Classify a non-success response
pub(crate) fn status_error(path: &str, status: StatusCode, body: &str) -> StorageError {
    let path = path.to_string();
    let message: String = body.chars().take(MAX_ERROR_BODY).collect();

    match status {
        StatusCode::NOT_FOUND => StorageError::NotFound { path },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StorageError::PermissionDenied { path, message }
        }
        s if s.is_server_error() => StorageError::ServerError {
            path,
            status: s.as_u16(),
            message,
        },
        s => StorageError::ClientError {
            path,
            status: s.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config(base_url: &str) -> StorageConfig {
        StorageConfig {
            base_url: base_url.to_string(),
            service_key: secret_string("service-key".to_string()),
            lead_bucket: BucketName::new("lead-documents").unwrap(),
            user_bucket: BucketName::new("user-documents").unwrap(),
            timeout_seconds: 5,
            tls_verify: true,
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 1,
                max_delay_ms: 5,
                backoff_multiplier: 2.0,
            },
        }
    }

    fn bucket() -> BucketName {
        BucketName::new("lead-documents").unwrap()
    }

    #[test]
    fn test_object_url_encodes_segments() {
        let client = StorageClient::new(&config("https://project.supabase.co/")).unwrap();
        let url = client.object_url(&bucket(), "c1/my file#1.pdf");
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/storage/v1/object/lead-documents/c1/my%20file%231.pdf"
        );
    }

    #[test]
    fn test_status_error_classification() {
        assert!(matches!(
            status_error("a", StatusCode::NOT_FOUND, ""),
            StorageError::NotFound { .. }
        ));
        assert!(matches!(
            status_error("a", StatusCode::FORBIDDEN, "denied"),
            StorageError::PermissionDenied { .. }
        ));
        assert!(matches!(
            status_error("a", StatusCode::BAD_GATEWAY, ""),
            StorageError::ServerError { status: 502, .. }
        ));
        let too_many = status_error("a", StatusCode::TOO_MANY_REQUESTS, "");
        assert!(too_many.is_transient());
        assert!(!status_error("a", StatusCode::BAD_REQUEST, "").is_transient());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(StorageClient::new(&config("not a url")).is_err());
    }

    #[tokio::test]
    async fn test_download_sends_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/storage/v1/object/lead-documents/c1/passport.pdf")
            .match_header("authorization", "Bearer service-key")
            .match_header("apikey", "service-key")
            .with_status(200)
            .with_body(b"%PDF-1.7")
            .create_async()
            .await;

        let client = StorageClient::new(&config(&server.url())).unwrap();
        let bytes = client.download(&bucket(), "c1/passport.pdf").await.unwrap();

        assert_eq!(bytes, b"%PDF-1.7");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/storage/v1/object/lead-documents/c1/missing.pdf")
            .with_status(404)
            .with_body(r#"{"error":"not_found"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = StorageClient::new(&config(&server.url())).unwrap();
        let err = client.download(&bucket(), "c1/missing.pdf").await.unwrap_err();

        assert_eq!(
            err,
            StorageError::NotFound {
                path: "c1/missing.pdf".to_string()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_errors_retried_up_to_max_attempts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/storage/v1/object/lead-documents/c1/flaky.pdf")
            .with_status(503)
            .with_body("unavailable")
            .expect(3)
            .create_async()
            .await;

        let client = StorageClient::new(&config(&server.url())).unwrap();
        let err = client.download(&bucket(), "c1/flaky.pdf").await.unwrap_err();

        assert!(matches!(err, StorageError::ServerError { status: 503, .. }));
        assert_eq!(err.path(), "c1/flaky.pdf");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_single_attempt_when_retry_disabled() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/storage/v1/object/lead-documents/c1/flaky.pdf")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let client = StorageClient::new(&config(&server.url()))
            .unwrap()
            .with_retry(RetryConfig::no_retry());
        assert!(client.download(&bucket(), "c1/flaky.pdf").await.is_err());
        mock.assert_async().await;
    }
}
