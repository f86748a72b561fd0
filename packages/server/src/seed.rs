use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;

use crate::entity::format;

/// Formats seeded on startup as `(code, mime_type)`.
pub const DEFAULT_FORMATS: &[(&str, &str)] = &[
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
];

/// Seed the `format` table with defaults. Existing codes are left untouched.
pub async fn seed_formats<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let mut inserted = 0u32;
    for &(code, mime_type) in DEFAULT_FORMATS {
        let model = format::ActiveModel {
            code: Set(code.to_string()),
            mime_type: Set(mime_type.to_string()),
            ..Default::default()
        };

        let result = format::Entity::insert(model)
            .on_conflict(
                OnConflict::column(format::Column::Code)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(rows) if rows > 0 => inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} new formats", inserted);
    } else {
        info!("Formats table already populated, skipping");
    }

    Ok(())
}
