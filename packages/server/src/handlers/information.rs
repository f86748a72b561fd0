use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::Caller;
use crate::models::information::AvailableModel;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/information/available_models",
    tag = "Information",
    operation_id = "listAvailableModels",
    summary = "List processing models offered by the classification service",
    description = "Proxied from the classification service with the caller's Authorization header.",
    responses(
        (status = 200, description = "Available models", body = Vec<AvailableModel>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Classification service failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, caller), fields(caller = caller.subject()))]
pub async fn available_models(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<Vec<AvailableModel>>, AppError> {
    let models = state
        .catalog
        .available_models(caller.authorization.as_deref())
        .await?;
    Ok(Json(models))
}
