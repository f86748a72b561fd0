//! Client side of the classification service: fire-and-forget forwarding of original
//! uploads, and its catalog of processing models.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::models::information::AvailableModel;
use crate::store::StoredFile;

/// Receives every stored original. Implementations must not block the caller.
pub trait IngestDispatcher: Send + Sync {
    fn dispatch(&self, file: &StoredFile, authorization: Option<&str>);
}

/// Used when ingest is disabled in config.
pub struct NoopDispatcher;

impl IngestDispatcher for NoopDispatcher {
    fn dispatch(&self, file: &StoredFile, _authorization: Option<&str>) {
        debug!(file_id = file.id, "Ingest disabled, not forwarding");
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestPayload {
    owner_id: i64,
    format_id: i32,
    generation: i32,
    primary_file_id: Option<i32>,
    content: Option<String>,
    processing_model_id: Option<i32>,
}

struct IngestJob {
    file_id: i32,
    authorization: Option<String>,
    payload: IngestPayload,
}

/// Posts each job to `<base_url><path>` from a single background task.
///
/// Jobs queue on a bounded channel; when it is full the job is dropped with a warning.
/// Delivery failures are logged and never retried.
pub struct HttpIngestDispatcher {
    sender: mpsc::Sender<IngestJob>,
}

impl HttpIngestDispatcher {
    /// Spawn the delivery worker. Must be called inside a Tokio runtime.
    pub fn spawn(config: &IngestConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.path
        );
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));

        tokio::spawn(deliver_loop(client, url, receiver));

        Ok(Self { sender })
    }
}

impl IngestDispatcher for HttpIngestDispatcher {
    fn dispatch(&self, file: &StoredFile, authorization: Option<&str>) {
        let job = IngestJob {
            file_id: file.id,
            authorization: authorization.map(str::to_string),
            payload: IngestPayload {
                owner_id: file.owner_id,
                format_id: file.format_id,
                generation: file.generation,
                primary_file_id: file.primary_file_id,
                content: file.content.as_deref().map(|c| STANDARD.encode(c)),
                processing_model_id: file.processing_model_id,
            },
        };

        match self.sender.try_send(job) {
            Ok(()) => debug!(file_id = file.id, "Queued file for ingest"),
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(file_id = job.file_id, "Ingest queue full, dropping dispatch")
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                warn!(file_id = job.file_id, "Ingest worker stopped, dropping dispatch")
            }
        }
    }
}

async fn deliver_loop(client: reqwest::Client, url: String, mut receiver: mpsc::Receiver<IngestJob>) {
    info!(url = %url, "Ingest dispatcher started");

    while let Some(job) = receiver.recv().await {
        let mut request = client.post(&url).json(&job.payload);
        if let Some(auth) = &job.authorization {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        match request.send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(file_id = job.file_id, "Ingest accepted")
            }
            Ok(resp) => warn!(
                file_id = job.file_id,
                status = resp.status().as_u16(),
                "Ingest endpoint rejected file"
            ),
            Err(e) => warn!(file_id = job.file_id, error = %e, "Ingest delivery failed"),
        }
    }

    info!("Ingest dispatcher stopped");
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("classification service is not configured")]
    NotConfigured,
    #[error("classification service unreachable: {0}")]
    Transport(String),
    #[error("classification service returned status {0}")]
    Status(u16),
    #[error("classification service response unreadable: {0}")]
    Decode(String),
}

/// Lists the processing models the classification service offers. Their ids are what
/// uploads carry as `processingModelId`.
pub struct ModelCatalog {
    client: reqwest::Client,
    url: Option<String>,
}

impl ModelCatalog {
    /// Unconfigured when `base_url` is empty; `enabled` only governs dispatch.
    pub fn new(config: &IngestConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let url = (!config.base_url.is_empty()).then(|| {
            format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                config.information_path
            )
        });
        Ok(Self { client, url })
    }

    /// `GET <base_url><information_path>`, forwarding the caller's `Authorization`.
    pub async fn available_models(
        &self,
        authorization: Option<&str>,
    ) -> Result<Vec<AvailableModel>, CatalogError> {
        let url = self.url.as_deref().ok_or(CatalogError::NotConfigured)?;

        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(auth) = authorization {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        response
            .json::<Vec<AvailableModel>>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Build the dispatcher selected by `config`.
pub fn from_config(
    config: &IngestConfig,
) -> Result<std::sync::Arc<dyn IngestDispatcher>, reqwest::Error> {
    if !config.enabled || config.base_url.is_empty() {
        info!("Ingest dispatch disabled");
        return Ok(std::sync::Arc::new(NoopDispatcher));
    }
    Ok(std::sync::Arc::new(HttpIngestDispatcher::spawn(config)?))
}
