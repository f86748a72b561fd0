use std::sync::Arc;

use common::convert::ConversionPipeline;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::gateway::AuthGateway;
use crate::ingest::ModelCatalog;
use crate::store::FileStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub store: Arc<FileStore>,
    pub gateway: Arc<AuthGateway>,
    pub pipeline: Arc<ConversionPipeline>,
    pub catalog: Arc<ModelCatalog>,
}
