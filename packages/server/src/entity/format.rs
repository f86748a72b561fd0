use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "format")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Short code, also used as the storage key extension (e.g. "docx").
    #[sea_orm(unique)]
    pub code: String,
    pub mime_type: String,

    #[sea_orm(has_many)]
    pub files: HasMany<super::stored_file::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
