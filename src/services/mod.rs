pub mod auth_service;
pub mod command_runner_service;
pub mod crontab_file;
pub mod crontab_sync_service;
