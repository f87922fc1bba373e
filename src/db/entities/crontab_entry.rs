use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crontab_entries")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub schedule: String,
    pub command: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: ChronoDateTimeUtc,
    /// Reserved for scheduler feedback; never computed by this service.
    pub last_run_at: Option<ChronoDateTimeUtc>,
    pub next_run_at: Option<ChronoDateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
