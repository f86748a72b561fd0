use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::AuthConfig;

/// Body returned by the identity service's verification endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("verifier transport failure: {0}")]
    Transport(String),
    #[error("verifier returned status {0}")]
    Status(u16),
    #[error("verifier response unreadable: {0}")]
    Decode(String),
}

/// Checks a raw `Authorization` header value with an external authority.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, authorization: &str) -> Result<VerifyResponse, VerifyError>;
}

/// `GET <base_url><path>` with the caller's header forwarded verbatim.
pub struct HttpVerifier {
    client: reqwest::Client,
    url: String,
}

impl HttpVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .read_timeout(Duration::from_millis(config.read_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                config.path
            ),
        })
    }
}

#[async_trait]
impl CredentialVerifier for HttpVerifier {
    async fn verify(&self, authorization: &str) -> Result<VerifyResponse, VerifyError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Status(status.as_u16()));
        }

        response
            .json::<VerifyResponse>()
            .await
            .map_err(|e| VerifyError::Decode(e.to_string()))
    }
}
