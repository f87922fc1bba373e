use std::env;
use std::path::PathBuf;

pub const DEFAULT_ADMIN_USERNAME: &str = "crontab";
pub const DEFAULT_ADMIN_PASSWORD: &str = "crontab123";

#[derive(Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    /// Target file consumed by the cron daemon. Fully rewritten on every mutation.
    pub crontab_file: PathBuf,
    /// Directory holding per-job output logs; also served by the log viewer.
    pub logs_dir: PathBuf,
    pub default_admin_username: String,
    pub default_admin_password: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;

        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://crondeck.db?mode=rwc".to_string());

        let crontab_file = env::var("CRONTAB_FILE")
            .unwrap_or_else(|_| "/etc/cron.d/crontab.txt".to_string())
            .into();

        let logs_dir = env::var("LOGS_DIR")
            .unwrap_or_else(|_| "/app/logs".to_string())
            .into();

        let default_admin_username = env::var("DEFAULT_ADMIN_USERNAME")
            .unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string());
        let default_admin_password = env::var("DEFAULT_ADMIN_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());

        Ok(ServerConfig {
            listen_addr,
            database_url,
            jwt_secret,
            crontab_file,
            logs_dir,
            default_admin_username,
            default_admin_password,
        })
    }
}
