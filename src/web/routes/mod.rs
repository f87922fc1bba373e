pub mod crontab_routes;
pub mod log_routes;
pub mod test_command_routes;
