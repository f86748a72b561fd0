use axum::Json;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::convert::EditableDocument;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::Caller;
use crate::extractors::json::AppJson;
use crate::models::file::{ContentQuery, FileListResponse, StoredFileResponse, UploadFileRequest};
use crate::state::AppState;
use crate::store::NewFile;

pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(128 * 1024 * 1024) // 128 MB, base64 inflates by a third
}

#[utoipa::path(
    get,
    path = "/files",
    tag = "Files",
    operation_id = "listFiles",
    summary = "List all stored files",
    params(ContentQuery),
    responses(
        (status = 200, description = "All stored files", body = FileListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, _caller))]
pub async fn list_files(
    _caller: Caller,
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<FileListResponse>, AppError> {
    let files = state.store.list_all(query.content).await?;
    Ok(Json(files.into()))
}

#[utoipa::path(
    post,
    path = "/files",
    tag = "Files",
    operation_id = "uploadFile",
    summary = "Upload a file",
    description = "Stores base64 content as a new file. With `primaryFileId` the file becomes the next \
        generation of that primary. Originals are forwarded to the classification service.",
    request_body = UploadFileRequest,
    responses(
        (status = 201, description = "File stored", body = StoredFileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Owner, format or primary file not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Primary file has broken lineage (CONFLICT)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, caller, payload), fields(caller = caller.subject(), owner_id = payload.owner_id, format_id = payload.format_id))]
pub async fn upload_file(
    caller: Caller,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UploadFileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = payload.into_new_file()?;
    let file = state
        .store
        .upload(new, caller.authorization.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(StoredFileResponse::from(file))))
}

#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "Files",
    operation_id = "getFile",
    summary = "Get a stored file",
    params(("id" = i32, Path, description = "File ID"), ContentQuery),
    responses(
        (status = 200, description = "File", body = StoredFileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, _caller))]
pub async fn get_file(
    _caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<StoredFileResponse>, AppError> {
    let file = state.store.fetch(id, query.content).await?;
    Ok(Json(file.into()))
}

#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "Files",
    operation_id = "deleteFile",
    summary = "Delete a file and its derived generations",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, caller), fields(caller = caller.subject()))]
pub async fn delete_file(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/files/{id}/content",
    tag = "Files",
    operation_id = "getFileContent",
    summary = "Download raw file content",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 200, description = "Raw bytes with the format's MIME type", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, _caller))]
pub async fn get_content(
    _caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let file = state.store.fetch(id, false).await?;
    let format = state.store.find_format(file.format_id).await?;
    let bytes = state.store.fetch_content(id).await?;

    Ok(([(header::CONTENT_TYPE, format.mime_type)], bytes).into_response())
}

#[utoipa::path(
    put,
    path = "/files/{id}/content",
    tag = "Files",
    operation_id = "replaceFileContent",
    summary = "Replace raw file content",
    description = "Writes the request body under a fresh storage key and releases the old one. \
        Generation and lineage are unchanged.",
    params(("id" = i32, Path, description = "File ID")),
    request_body(content_type = "application/octet-stream", description = "New file bytes"),
    responses(
        (status = 204, description = "Content replaced"),
        (status = 400, description = "Empty body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Content replaced concurrently (CONFLICT)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, caller, body), fields(caller = caller.subject(), len = body.len()))]
pub async fn replace_content(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    state.store.replace_content(id, body.to_vec()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/files/{id}/lineage",
    tag = "Files",
    operation_id = "getFileLineage",
    summary = "Get the derivation chain of a file",
    description = "Returns the file followed by each primary up to its generation-1 original.",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 200, description = "Lineage, newest first", body = FileListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Lineage loops (CONFLICT)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, _caller))]
pub async fn get_lineage(
    _caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FileListResponse>, AppError> {
    let chain = state.store.lineage(id).await?;
    Ok(Json(chain.into()))
}

#[utoipa::path(
    get,
    path = "/files/{id}/editable",
    tag = "Conversion",
    operation_id = "getEditableForm",
    summary = "Get the editable form of a document",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 200, description = "Editable representation", body = EditableDocument),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
        (status = 415, description = "Format has no editable form (UNSUPPORTED_FORMAT)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, _caller))]
pub async fn get_editable(
    _caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EditableDocument>, AppError> {
    let file = state.store.fetch(id, false).await?;
    let format = state.store.find_format(file.format_id).await?;
    let bytes = state.store.fetch_content(id).await?;

    let document = state.pipeline.to_editable_form(&bytes, &format.code)?;
    Ok(Json(document))
}

#[utoipa::path(
    put,
    path = "/files/{id}/editable",
    tag = "Conversion",
    operation_id = "saveEditableForm",
    summary = "Save an edited document",
    description = "Encodes the representation in the file's own format and replaces its content.",
    params(("id" = i32, Path, description = "File ID")),
    request_body = EditableDocument,
    responses(
        (status = 204, description = "Content replaced"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
        (status = 415, description = "Format has no editable form (UNSUPPORTED_FORMAT)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, caller, document), fields(caller = caller.subject()))]
pub async fn save_editable(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(document): AppJson<EditableDocument>,
) -> Result<StatusCode, AppError> {
    let file = state.store.fetch(id, false).await?;
    let format = state.store.find_format(file.format_id).await?;

    let bytes = state.pipeline.from_editable_form(&document, &format.code)?;
    state.store.replace_content(id, bytes).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/files/{id}/pdf",
    tag = "Conversion",
    operation_id = "renderPdf",
    summary = "Render a document to PDF as its next generation",
    description = "Renders the file with the external renderer and stores the PDF with the source \
        as its primary. The response omits content; fetch it from `/files/{id}/content`.",
    params(("id" = i32, Path, description = "Source file ID")),
    responses(
        (status = 201, description = "PDF generation stored", body = StoredFileResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
        (status = 415, description = "Format cannot be rendered (UNSUPPORTED_FORMAT)", body = ErrorBody),
        (status = 502, description = "Renderer failed (CONVERSION_ERROR)", body = ErrorBody),
    ),
    security(("bearer" = [])),
)]
#[instrument(skip(state, caller), fields(caller = caller.subject()))]
pub async fn render_pdf(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let source = state.store.fetch(id, false).await?;
    let format = state.store.find_format(source.format_id).await?;
    let bytes = state.store.fetch_content(id).await?;

    let pdf = state.pipeline.to_pdf(&bytes, &format.code).await?;
    let pdf_format = state.store.find_format_by_code("pdf").await?;

    let mut derived = state
        .store
        .upload(
            NewFile {
                owner_id: source.owner_id,
                format_id: pdf_format.id,
                content: pdf,
                primary_file_id: Some(source.id),
                processing_model_id: source.processing_model_id,
                generation: None,
            },
            caller.authorization.as_deref(),
        )
        .await?;
    derived.content = None;

    info!(source_id = source.id, pdf_id = derived.id, "Rendered PDF generation");
    Ok((StatusCode::CREATED, Json(StoredFileResponse::from(derived))))
}
