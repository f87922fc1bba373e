pub mod entities;
pub mod services;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

/// Creates the application tables if they do not exist yet.
///
/// The schema is derived from the entity definitions, so the UNIQUE
/// constraint on `crontab_entries.name` is enforced by the database
/// itself rather than by application-level checks alone.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut users = schema.create_table_from_entity(entities::user::Entity);
    db.execute(backend.build(users.if_not_exists())).await?;

    let mut entries = schema.create_table_from_entity(entities::crontab_entry::Entity);
    db.execute(backend.build(entries.if_not_exists())).await?;

    Ok(())
}
