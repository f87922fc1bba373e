//! Keeps the generated crontab file in step with the entry table.
//!
//! Every mutation goes through this manager: the database operation runs
//! first and is authoritative; the file regeneration that follows is
//! best-effort. A failed publish never rolls the mutation back and never
//! fails the request. It is downgraded to a warning so the operator
//! knows the live schedule is stale until the next successful mutation
//! rewrites the file.

use std::path::PathBuf;

use sea_orm::DatabaseConnection;
use tracing::{error, info};

use crate::db::entities::crontab_entry;
use crate::db::services::crontab_entry_service::{
    CrontabEntryError, CrontabEntryService, NewCrontabEntry, UpdateCrontabEntry,
};
use crate::services::crontab_file::{render_crontab, CrontabPublisher, PublishError};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to load active crontab entries: {0}")]
    Store(#[from] CrontabEntryError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Result of a mutation: the store outcome, plus a warning when the
/// subsequent file regeneration failed.
#[derive(Debug)]
pub struct SyncOutcome<T> {
    pub value: T,
    pub sync_warning: Option<String>,
}

#[derive(Clone)]
pub struct CrontabSyncManager {
    db: DatabaseConnection,
    publisher: CrontabPublisher,
    logs_dir: PathBuf,
}

impl CrontabSyncManager {
    pub fn new(
        db: DatabaseConnection,
        publisher: CrontabPublisher,
        logs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            db,
            publisher,
            logs_dir: logs_dir.into(),
        }
    }

    pub async fn list_entries(&self) -> Result<Vec<crontab_entry::Model>, CrontabEntryError> {
        CrontabEntryService::list(&self.db).await
    }

    pub async fn create_entry(
        &self,
        entry: NewCrontabEntry,
    ) -> Result<SyncOutcome<crontab_entry::Model>, CrontabEntryError> {
        let created = CrontabEntryService::create(&self.db, entry).await?;
        let sync_warning = self.resync_after_mutation("created").await;
        Ok(SyncOutcome {
            value: created,
            sync_warning,
        })
    }

    pub async fn update_entry(
        &self,
        entry_id: i32,
        fields: UpdateCrontabEntry,
    ) -> Result<SyncOutcome<crontab_entry::Model>, CrontabEntryError> {
        let updated = CrontabEntryService::update(&self.db, entry_id, fields).await?;
        let sync_warning = self.resync_after_mutation("updated").await;
        Ok(SyncOutcome {
            value: updated,
            sync_warning,
        })
    }

    pub async fn delete_entry(
        &self,
        entry_id: i32,
    ) -> Result<SyncOutcome<()>, CrontabEntryError> {
        CrontabEntryService::delete(&self.db, entry_id).await?;
        let sync_warning = self.resync_after_mutation("deleted").await;
        Ok(SyncOutcome {
            value: (),
            sync_warning,
        })
    }

    /// Re-renders the whole active set and atomically replaces the file.
    /// Always a full rewrite, so the file reflects one consistent
    /// snapshot of the store even when concurrent mutations race.
    pub async fn resync(&self) -> Result<(), SyncError> {
        let active = CrontabEntryService::list_active(&self.db).await?;
        let content = render_crontab(&active, &self.logs_dir);
        self.publisher.publish(&content).await?;
        Ok(())
    }

    async fn resync_after_mutation(&self, action: &str) -> Option<String> {
        match self.resync().await {
            Ok(()) => {
                info!(
                    path = %self.publisher.path().display(),
                    "Crontab file regenerated."
                );
                None
            }
            Err(e) => {
                error!(
                    error = %e,
                    path = %self.publisher.path().display(),
                    "Failed to regenerate crontab file after mutation; file is stale until the next successful mutation."
                );
                Some(format!("Entry {action} but crontab file update failed: {e}"))
            }
        }
    }
}
