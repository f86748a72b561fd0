use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::{NewFile, StoredFile};

/// Query parameter selecting whether file content is included.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ContentQuery {
    /// Include base64 content in the response. Default: false.
    #[param(example = false)]
    #[serde(default)]
    pub content: bool,
}

/// Request body for uploading a file.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    #[schema(example = 7)]
    pub owner_id: i64,
    #[schema(example = 1)]
    pub format_id: i32,
    /// Base64-encoded file bytes.
    #[schema(example = "aGVsbG8=")]
    pub content: String,
    /// File this one was derived from. Omit for originals.
    pub primary_file_id: Option<i32>,
    pub processing_model_id: Option<i32>,
    /// Expected generation. Derived from the primary file when omitted; a mismatch is
    /// rejected.
    pub generation: Option<i32>,
}

impl UploadFileRequest {
    pub fn into_new_file(self) -> Result<NewFile, AppError> {
        let content = STANDARD
            .decode(self.content.as_bytes())
            .map_err(|e| AppError::Validation(format!("content is not valid base64: {e}")))?;

        Ok(NewFile {
            owner_id: self.owner_id,
            format_id: self.format_id,
            content,
            primary_file_id: self.primary_file_id,
            processing_model_id: self.processing_model_id,
            generation: self.generation,
        })
    }
}

/// Response DTO for a stored file.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFileResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 7)]
    pub owner_id: i64,
    #[schema(example = 1)]
    pub format_id: i32,
    /// Opaque storage key.
    #[schema(example = "3f0c9a52-7d3e-4c55-9a0b-6c1f2e8d4b71.docx")]
    pub resource_path: String,
    /// 1 for originals, primary's generation + 1 for derived files.
    #[schema(example = 1)]
    pub generation: i32,
    pub primary_file_id: Option<i32>,
    /// Base64-encoded bytes, present only when requested.
    pub content: Option<String>,
    pub processing_model_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredFile> for StoredFileResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            id: file.id,
            owner_id: file.owner_id,
            format_id: file.format_id,
            resource_path: file.storage_key,
            generation: file.generation,
            primary_file_id: file.primary_file_id,
            content: file.content.map(|c| STANDARD.encode(c)),
            processing_model_id: file.processing_model_id,
            created_at: file.created_at,
        }
    }
}

/// Response DTO for file listings.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FileListResponse {
    pub files: Vec<StoredFileResponse>,
    pub total: usize,
}

impl From<Vec<StoredFile>> for FileListResponse {
    fn from(files: Vec<StoredFile>) -> Self {
        let files: Vec<StoredFileResponse> = files.into_iter().map(Into::into).collect();
        Self {
            total: files.len(),
            files,
        }
    }
}
