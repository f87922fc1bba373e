//! SeaORM entities mapping to the application tables.

pub mod crontab_entry;
pub mod user;

pub mod prelude {
    pub use super::crontab_entry::Entity as CrontabEntry;
    pub use super::user::Entity as User;
}
