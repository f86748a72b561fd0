use axum::Json;
use axum::extract::State;
use sea_orm::{EntityTrait, QueryOrder};

use crate::entity::format;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::Caller;
use crate::models::format::FormatResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/formats",
    tag = "Formats",
    operation_id = "listFormats",
    summary = "List known file formats",
    responses(
        (status = 200, description = "Formats", body = Vec<FormatResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
pub async fn list_formats(
    _caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<Vec<FormatResponse>>, AppError> {
    let formats = format::Entity::find()
        .order_by_asc(format::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(formats.into_iter().map(Into::into).collect()))
}
