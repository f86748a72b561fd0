use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use tracing::{info, warn};

use crate::entity::{format, owner, stored_file};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    create_schema(&db).await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Create any missing tables, parents before children.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, owner::Entity).await?;
    create_table(db, format::Entity).await?;
    create_table(db, stored_file::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute_raw(backend.build(&stmt)).await?;
    Ok(())
}

/// Ensure lookup indexes exist for owner listings and lineage walks.
///
/// Failures are logged, not fatal: queries still work without them.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let indexes = [
        (
            "idx_stored_file_owner",
            Index::create()
                .if_not_exists()
                .name("idx_stored_file_owner")
                .table(stored_file::Entity)
                .col(stored_file::Column::OwnerId)
                .to_owned(),
        ),
        (
            "idx_stored_file_primary",
            Index::create()
                .if_not_exists()
                .name("idx_stored_file_primary")
                .table(stored_file::Entity)
                .col(stored_file::Column::PrimaryFileId)
                .to_owned(),
        ),
    ];

    for (name, stmt) in indexes {
        match db.execute_raw(backend.build(&stmt)).await {
            Ok(_) => info!("Ensured index {name} exists"),
            Err(e) => warn!("Failed to create index {name}: {e}"),
        }
    }

    Ok(())
}
