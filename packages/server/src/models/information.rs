use serde::{Deserialize, Serialize};

/// A processing model offered by the classification service.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableModel {
    /// Value to send as `processingModelId` on upload.
    #[schema(example = 4)]
    pub id: i32,
    #[schema(example = "invoice-v2")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
