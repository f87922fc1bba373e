//! Database access services. Each sub-module owns the queries for one
//! domain entity and exposes a typed error enum, so HTTP handlers never
//! deal with raw `DbErr` values.

pub mod crontab_entry_service;

pub use crontab_entry_service::*;
