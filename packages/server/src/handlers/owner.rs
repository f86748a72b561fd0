use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tracing::instrument;

use crate::entity::owner;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::Caller;
use crate::extractors::json::AppJson;
use crate::models::file::{ContentQuery, FileListResponse};
use crate::models::owner::{CreateOwnerRequest, OwnerResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/owners",
    tag = "Owners",
    operation_id = "registerOwner",
    summary = "Register a local owner mirror",
    description = "Creates the local record for an external identity. Registering an existing ID \
        returns the stored record unchanged with status 200.",
    request_body = CreateOwnerRequest,
    responses(
        (status = 201, description = "Owner created", body = OwnerResponse),
        (status = 200, description = "Owner already registered", body = OwnerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, caller, payload), fields(caller = caller.subject(), owner_id = payload.id))]
pub async fn register_owner(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateOwnerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(existing) = owner::Entity::find_by_id(payload.id).one(&state.db).await? {
        return Ok((StatusCode::OK, Json(OwnerResponse::from(existing))));
    }

    let email = payload.email.trim();
    if email.is_empty() {
        return Err(AppError::Validation("email must not be empty".into()));
    }

    let model = owner::ActiveModel {
        id: Set(payload.id),
        email: Set(email.to_string()),
        username: Set(payload.username),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(OwnerResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/owners/{id}",
    tag = "Owners",
    operation_id = "getOwner",
    summary = "Get an owner",
    params(("id" = i64, Path, description = "Owner ID")),
    responses(
        (status = 200, description = "Owner", body = OwnerResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Owner not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, _caller))]
pub async fn get_owner(
    _caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OwnerResponse>, AppError> {
    let model = owner::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Owner not found: {id}")))?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/owners/{id}/files",
    tag = "Owners",
    operation_id = "listOwnerFiles",
    summary = "List files owned by an owner",
    params(("id" = i64, Path, description = "Owner ID"), ContentQuery),
    responses(
        (status = 200, description = "Owner's files (empty if none)", body = FileListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, _caller))]
pub async fn list_owner_files(
    _caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<FileListResponse>, AppError> {
    let files = state.store.list_by_owner(id, query.content).await?;
    Ok(Json(files.into()))
}
