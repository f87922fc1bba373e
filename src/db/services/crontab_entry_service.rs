use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};

use crate::db::entities::{crontab_entry, prelude::CrontabEntry};

#[derive(Debug, thiserror::Error)]
pub enum CrontabEntryError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Crontab entry not found: {0}")]
    NotFound(i32),
    #[error("A crontab entry with the name '{0}' already exists.")]
    DuplicateName(String),
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone)]
pub struct NewCrontabEntry {
    pub name: String,
    pub schedule: String,
    pub command: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateCrontabEntry {
    pub name: String,
    pub schedule: String,
    pub command: String,
    pub description: Option<String>,
    pub is_active: bool,
}

pub struct CrontabEntryService;

impl CrontabEntryService {
    fn validate_required(name: &str, schedule: &str, command: &str) -> Result<(), CrontabEntryError> {
        if name.trim().is_empty() || schedule.trim().is_empty() || command.trim().is_empty() {
            return Err(CrontabEntryError::Validation(
                "Name, schedule, and command are required".to_string(),
            ));
        }
        Ok(())
    }

    /// Maps the UNIQUE constraint violation on `name` to `DuplicateName`.
    /// Uniqueness is enforced by the database, not by a pre-check, so two
    /// concurrent creates with the same name cannot both succeed.
    fn map_unique_violation(err: DbErr, name: String) -> CrontabEntryError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => CrontabEntryError::DuplicateName(name),
            _ => CrontabEntryError::DbErr(err),
        }
    }

    pub async fn create(
        db: &DatabaseConnection,
        entry: NewCrontabEntry,
    ) -> Result<crontab_entry::Model, CrontabEntryError> {
        Self::validate_required(&entry.name, &entry.schedule, &entry.command)?;

        let new_entry = crontab_entry::ActiveModel {
            name: Set(entry.name.clone()),
            schedule: Set(entry.schedule),
            command: Set(entry.command),
            description: Set(entry.description),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        new_entry
            .insert(db)
            .await
            .map_err(|e| Self::map_unique_violation(e, entry.name))
    }

    /// All entries, newest first. Display order for the console.
    pub async fn list(
        db: &DatabaseConnection,
    ) -> Result<Vec<crontab_entry::Model>, CrontabEntryError> {
        Ok(CrontabEntry::find()
            .order_by_desc(crontab_entry::Column::CreatedAt)
            .order_by_desc(crontab_entry::Column::Id)
            .all(db)
            .await?)
    }

    /// Active entries in creation order. This is the render order of the
    /// generated crontab file.
    pub async fn list_active(
        db: &DatabaseConnection,
    ) -> Result<Vec<crontab_entry::Model>, CrontabEntryError> {
        Ok(CrontabEntry::find()
            .filter(crontab_entry::Column::IsActive.eq(true))
            .order_by_asc(crontab_entry::Column::CreatedAt)
            .order_by_asc(crontab_entry::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn update(
        db: &DatabaseConnection,
        entry_id: i32,
        fields: UpdateCrontabEntry,
    ) -> Result<crontab_entry::Model, CrontabEntryError> {
        Self::validate_required(&fields.name, &fields.schedule, &fields.command)?;

        let entry = CrontabEntry::find_by_id(entry_id)
            .one(db)
            .await?
            .ok_or(CrontabEntryError::NotFound(entry_id))?;

        let mut active_entry: crontab_entry::ActiveModel = entry.into();
        active_entry.name = Set(fields.name.clone());
        active_entry.schedule = Set(fields.schedule);
        active_entry.command = Set(fields.command);
        active_entry.description = Set(fields.description);
        active_entry.is_active = Set(fields.is_active);

        active_entry
            .update(db)
            .await
            .map_err(|e| Self::map_unique_violation(e, fields.name))
    }

    pub async fn delete(db: &DatabaseConnection, entry_id: i32) -> Result<(), CrontabEntryError> {
        let entry = CrontabEntry::find_by_id(entry_id)
            .one(db)
            .await?
            .ok_or(CrontabEntryError::NotFound(entry_id))?;

        entry.delete(db).await?;
        Ok(())
    }
}
