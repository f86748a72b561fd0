use serde::Serialize;

use crate::entity::format;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormatResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "docx")]
    pub code: String,
    #[schema(example = "application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
    pub mime_type: String,
}

impl From<format::Model> for FormatResponse {
    fn from(model: format::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            mime_type: model.mime_type,
        }
    }
}
