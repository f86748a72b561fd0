use serde::{Deserialize, Serialize};

use crate::entity::owner;

/// Request body for registering a local owner mirror.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOwnerRequest {
    /// External user ID issued by the identity service.
    #[schema(example = 7)]
    pub id: i64,
    #[schema(example = "seven@example.com")]
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    #[schema(example = 7)]
    pub id: i64,
    #[schema(example = "seven@example.com")]
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<owner::Model> for OwnerResponse {
    fn from(model: owner::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
        }
    }
}
