use std::time::Duration;

use reqwest::Client;

use crate::api_client::v2_client::{V2Client, DEFAULT_BASE_URL};
use crate::models::BigQueryError;

/// Builds the backend client a service talks to.
pub trait ClientFactory {
    type Client;

    fn build(&self) -> Result<Self::Client, BigQueryError>;
}

/// Transport and auth settings for a [`V2Client`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    /// OAuth2 access token sent as a bearer token.
    pub access_token: String,
    /// Per-request timeout; none by default.
    pub timeout: Option<Duration>,
}

impl ClientOptions {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            timeout: None,
        }
    }

    /// Reads `BIGQUERY_ACCESS_TOKEN` and, optionally, `BIGQUERY_BASE_URL`.
    pub fn from_env() -> Result<Self, BigQueryError> {
        let token = std::env::var("BIGQUERY_ACCESS_TOKEN").map_err(|e| {
            BigQueryError::ClientInit(format!("BIGQUERY_ACCESS_TOKEN: {}", e))
        })?;

        let mut options = Self::new(token);
        if let Ok(base_url) = std::env::var("BIGQUERY_BASE_URL") {
            options.base_url = base_url;
        }
        Ok(options)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl ClientFactory for ClientOptions {
    type Client = V2Client;

    fn build(&self) -> Result<V2Client, BigQueryError> {
        if self.access_token.is_empty() {
            return Err(BigQueryError::ClientInit("access token is empty".to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| BigQueryError::ClientInit(e.to_string()))?;

        Ok(V2Client::with_http_client(
            &self.base_url,
            &self.access_token,
            http_client,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_client_for_default_endpoint() {
        let client = ClientOptions::new("token").build().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn custom_base_url_and_timeout() {
        let client = ClientOptions::new("token")
            .with_base_url("http://localhost:9050/")
            .with_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9050");
    }

    #[test]
    fn empty_token_is_a_client_init_error() {
        let err = ClientOptions::new("").build().unwrap_err();
        assert!(matches!(err, BigQueryError::ClientInit(_)));
    }
}
