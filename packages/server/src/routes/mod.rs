mod v1;

use std::sync::Arc;

use utoipa_axum::router::OpenApiRouter;

use crate::gateway::AuthGateway;
use crate::state::AppState;

pub fn api_routes(gateway: Arc<AuthGateway>) -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes(gateway))
}
