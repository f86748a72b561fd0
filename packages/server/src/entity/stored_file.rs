use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stored_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub owner_id: i64,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: HasOne<super::owner::Entity>,

    pub format_id: i32,
    #[sea_orm(belongs_to, from = "format_id", to = "id")]
    pub format: HasOne<super::format::Entity>,

    /// Backend locator `<token>.<extension>`.
    #[sea_orm(unique)]
    pub storage_key: String,

    /// 1 for originals, `primary.generation + 1` for derived files.
    pub generation: i32,

    /// Immediate source this file was derived from. Deleting a primary removes its
    /// derived files with it.
    pub primary_file_id: Option<i32>,
    #[sea_orm(
        self_ref,
        relation_enum = "Primary",
        relation_reverse = "Derived",
        from = "primary_file_id",
        to = "id",
        on_delete = "Cascade"
    )]
    pub primary: BelongsTo<Option<Entity>>,
    #[sea_orm(self_ref, relation_enum = "Derived", relation_reverse = "Primary")]
    pub derived: HasMany<Entity>,

    pub processing_model_id: Option<i32>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
