//! Versioned file store: entity lifecycle, lineage, and blob placement.

mod error;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::path::{PathAllocator, key_stem};
use common::storage::StorageBackend;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

pub use error::StoreError;

use crate::entity::{format, owner, stored_file};
use crate::ingest::IngestDispatcher;

/// A stored file record, optionally carrying its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: i32,
    pub owner_id: i64,
    pub format_id: i32,
    pub storage_key: String,
    pub generation: i32,
    pub primary_file_id: Option<i32>,
    pub processing_model_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub content: Option<Vec<u8>>,
}

impl StoredFile {
    fn from_model(model: stored_file::Model, content: Option<Vec<u8>>) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            format_id: model.format_id,
            storage_key: model.storage_key,
            generation: model.generation,
            primary_file_id: model.primary_file_id,
            processing_model_id: model.processing_model_id,
            created_at: model.created_at,
            content,
        }
    }
}

/// Input to [`FileStore::upload`].
#[derive(Debug, Clone)]
pub struct NewFile {
    pub owner_id: i64,
    pub format_id: i32,
    pub content: Vec<u8>,
    pub primary_file_id: Option<i32>,
    pub processing_model_id: Option<i32>,
    /// Generation the caller expects. Computed from the primary when absent; a mismatch
    /// with the computed value is rejected.
    pub generation: Option<i32>,
}

pub struct FileStore {
    db: DatabaseConnection,
    storage: Arc<dyn StorageBackend>,
    dispatcher: Arc<dyn IngestDispatcher>,
}

impl FileStore {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn StorageBackend>,
        dispatcher: Arc<dyn IngestDispatcher>,
    ) -> Self {
        Self {
            db,
            storage,
            dispatcher,
        }
    }

    /// Store a new file and its record.
    ///
    /// Bytes are written before the record is inserted, so a failed write never leaves a
    /// row behind. The insert holds a lock on the primary; a concurrent [`FileStore::delete`]
    /// of that primary either removes the new file too or makes the upload fail. Originals (generation 1) are forwarded to the ingest dispatcher with
    /// the caller's `authorization` header.
    #[instrument(skip(self, new, authorization), fields(owner_id = new.owner_id, format_id = new.format_id))]
    pub async fn upload(
        &self,
        new: NewFile,
        authorization: Option<&str>,
    ) -> Result<StoredFile, StoreError> {
        owner::Entity::find_by_id(new.owner_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Owner not found: {}", new.owner_id)))?;

        let format = self.find_format(new.format_id).await?;

        let generation = match new.primary_file_id {
            Some(primary_id) => {
                let primary = self.find_model(primary_id).await.map_err(|e| match e {
                    StoreError::NotFound(_) => {
                        StoreError::NotFound(format!("Primary file not found: {primary_id}"))
                    }
                    other => other,
                })?;
                self.verify_ancestry(&primary).await?;
                primary.generation + 1
            }
            None => 1,
        };

        if let Some(requested) = new.generation.filter(|g| *g != generation) {
            return Err(StoreError::Validation(format!(
                "Generation {requested} does not follow from the primary file (expected {generation})"
            )));
        }

        if new.content.is_empty() {
            return Err(StoreError::Validation("File content is empty".into()));
        }

        let key = self.allocate_key(&format.code).await?;
        self.storage
            .put(&key, &new.content, &format.mime_type)
            .await?;

        let record = stored_file::ActiveModel {
            owner_id: Set(new.owner_id),
            format_id: Set(new.format_id),
            storage_key: Set(key.clone()),
            generation: Set(generation),
            primary_file_id: Set(new.primary_file_id),
            processing_model_id: Set(new.processing_model_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let model = match self
            .insert_record(record, new.primary_file_id, generation)
            .await
        {
            Ok(model) => model,
            Err(e) => {
                self.reclaim(&key).await;
                return Err(e);
            }
        };

        info!(file_id = model.id, generation, key = %key, "Stored file");

        let file = StoredFile::from_model(model, Some(new.content));
        if file.generation <= 1 {
            self.dispatcher.dispatch(&file, authorization);
        }
        Ok(file)
    }

    pub async fn fetch(&self, id: i32, include_content: bool) -> Result<StoredFile, StoreError> {
        let model = self.find_model(id).await?;
        self.attach(model, include_content).await
    }

    pub async fn fetch_content(&self, id: i32) -> Result<Vec<u8>, StoreError> {
        let model = self.find_model(id).await?;
        Ok(self.storage.get(&model.storage_key).await?)
    }

    pub async fn list_all(&self, include_content: bool) -> Result<Vec<StoredFile>, StoreError> {
        let models = stored_file::Entity::find()
            .order_by_asc(stored_file::Column::Id)
            .all(&self.db)
            .await?;
        self.attach_all(models, include_content).await
    }

    /// Files owned by `owner_id`; empty when the owner has none or is unknown.
    pub async fn list_by_owner(
        &self,
        owner_id: i64,
        include_content: bool,
    ) -> Result<Vec<StoredFile>, StoreError> {
        let models = stored_file::Entity::find()
            .filter(stored_file::Column::OwnerId.eq(owner_id))
            .order_by_asc(stored_file::Column::Id)
            .all(&self.db)
            .await?;
        self.attach_all(models, include_content).await
    }

    /// The chain from `id` up to its generation-1 root, starting with the file itself.
    pub async fn lineage(&self, id: i32) -> Result<Vec<StoredFile>, StoreError> {
        let start = self.find_model(id).await?;
        let chain = self.ancestors(start).await?;
        Ok(chain
            .into_iter()
            .map(|m| StoredFile::from_model(m, None))
            .collect())
    }

    /// Write `content` under a fresh key, repoint the record, then drop the old blob.
    ///
    /// The record is only repointed if it still holds the key read at the start. A writer
    /// that loses that race gets a conflict and its own blob is dropped instead.
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub async fn replace_content(&self, id: i32, content: Vec<u8>) -> Result<(), StoreError> {
        if content.is_empty() {
            return Err(StoreError::Validation("File content is empty".into()));
        }

        let model = self.find_model(id).await?;
        let format = self.find_format(model.format_id).await?;

        let key = self.allocate_key(&format.code).await?;
        self.storage.put(&key, &content, &format.mime_type).await?;

        let updated = stored_file::Entity::update_many()
            .col_expr(stored_file::Column::StorageKey, Expr::value(key.clone()))
            .filter(stored_file::Column::Id.eq(id))
            .filter(stored_file::Column::StorageKey.eq(model.storage_key.as_str()))
            .exec(&self.db)
            .await;

        match updated {
            Ok(result) if result.rows_affected == 1 => {}
            Ok(_) => {
                self.reclaim(&key).await;
                // Gone entirely, or repointed by someone else in the meantime.
                self.find_model(id).await?;
                return Err(StoreError::Conflict(format!(
                    "File {id} was modified concurrently"
                )));
            }
            Err(e) => {
                self.reclaim(&key).await;
                return Err(e.into());
            }
        }

        info!(old_key = %model.storage_key, new_key = %key, "Replaced file content");
        self.reclaim(&model.storage_key).await;
        Ok(())
    }

    /// Delete a file and every file derived from it, then reclaim their blobs.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        let root = stored_file::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("File not found: {id}")))?;

        let mut doomed = vec![root];
        let mut frontier = vec![id];
        while !frontier.is_empty() {
            let children = stored_file::Entity::find()
                .filter(stored_file::Column::PrimaryFileId.is_in(frontier))
                .lock(LockType::Update)
                .all(&txn)
                .await?;
            frontier = children.iter().map(|c| c.id).collect();
            doomed.extend(children);
        }

        let ids: Vec<i32> = doomed.iter().map(|m| m.id).collect();
        stored_file::Entity::delete_many()
            .filter(stored_file::Column::Id.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(deleted = ?ids, "Deleted file and derived generations");

        for model in &doomed {
            self.reclaim(&model.storage_key).await;
        }
        Ok(())
    }

    pub async fn find_format(&self, id: i32) -> Result<format::Model, StoreError> {
        format::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Format not found: {id}")))
    }

    pub async fn find_format_by_code(&self, code: &str) -> Result<format::Model, StoreError> {
        format::Entity::find()
            .filter(format::Column::Code.eq(code))
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Format not found: {code}")))
    }

    async fn find_model(&self, id: i32) -> Result<stored_file::Model, StoreError> {
        stored_file::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("File not found: {id}")))
    }

    /// Insert `record` in a transaction that first re-reads its primary under a share lock.
    async fn insert_record(
        &self,
        record: stored_file::ActiveModel,
        primary_file_id: Option<i32>,
        generation: i32,
    ) -> Result<stored_file::Model, StoreError> {
        let txn = self.db.begin().await?;

        if let Some(primary_id) = primary_file_id {
            let primary = stored_file::Entity::find_by_id(primary_id)
                .lock(LockType::Share)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    StoreError::NotFound(format!("Primary file not found: {primary_id}"))
                })?;
            if primary.generation + 1 != generation {
                return Err(StoreError::Conflict(format!(
                    "Primary file {primary_id} changed generation during upload"
                )));
            }
        }

        let model = record.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => StoreError::NotFound(
                "Owner, format or primary file no longer exists".into(),
            ),
            _ => StoreError::from(e),
        })?;
        txn.commit().await?;

        Ok(model)
    }

    async fn attach(
        &self,
        model: stored_file::Model,
        include_content: bool,
    ) -> Result<StoredFile, StoreError> {
        let content = if include_content {
            Some(self.storage.get(&model.storage_key).await?)
        } else {
            None
        };
        Ok(StoredFile::from_model(model, content))
    }

    async fn attach_all(
        &self,
        models: Vec<stored_file::Model>,
        include_content: bool,
    ) -> Result<Vec<StoredFile>, StoreError> {
        let mut files = Vec::with_capacity(models.len());
        for model in models {
            files.push(self.attach(model, include_content).await?);
        }
        Ok(files)
    }

    /// Follow `primary_file_id` links upwards from `start`, inclusive.
    async fn ancestors(
        &self,
        start: stored_file::Model,
    ) -> Result<Vec<stored_file::Model>, StoreError> {
        let mut seen = HashSet::from([start.id]);
        let mut chain = vec![start];

        while let Some(parent_id) = chain.last().and_then(|m| m.primary_file_id) {
            if !seen.insert(parent_id) {
                return Err(StoreError::Conflict(format!(
                    "Lineage of file {} loops through file {parent_id}",
                    chain[0].id
                )));
            }
            let parent = stored_file::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| {
                    StoreError::Conflict(format!(
                        "Lineage of file {} references missing file {parent_id}",
                        chain[0].id
                    ))
                })?;
            chain.push(parent);
        }

        Ok(chain)
    }

    /// A primary is usable only if its chain ends at a root and generations step by one.
    async fn verify_ancestry(&self, primary: &stored_file::Model) -> Result<(), StoreError> {
        let chain = self.ancestors(primary.clone()).await?;

        for pair in chain.windows(2) {
            if pair[1].generation != pair[0].generation - 1 {
                return Err(StoreError::Conflict(format!(
                    "File {} has generation {} but its primary {} has generation {}",
                    pair[0].id, pair[0].generation, pair[1].id, pair[1].generation
                )));
            }
        }

        match chain.last() {
            Some(root) if root.generation == 1 => Ok(()),
            Some(root) => Err(StoreError::Conflict(format!(
                "Lineage root {} has generation {}, expected 1",
                root.id, root.generation
            ))),
            None => Ok(()),
        }
    }

    async fn allocate_key(&self, extension: &str) -> Result<String, StoreError> {
        let keys: Vec<String> = stored_file::Entity::find()
            .select_only()
            .column(stored_file::Column::StorageKey)
            .into_tuple()
            .all(&self.db)
            .await?;
        let taken: HashSet<String> = keys.iter().map(|k| key_stem(k).to_string()).collect();
        Ok(PathAllocator::allocate(&taken, extension))
    }

    async fn reclaim(&self, key: &str) {
        match self.storage.delete(key).await {
            Ok(true) => debug!(key, "Reclaimed blob"),
            Ok(false) => debug!(key, "Blob already gone"),
            Err(e) => warn!(key, error = %e, "Failed to reclaim blob"),
        }
    }
}
