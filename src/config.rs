/**
 * Application Configuration
 * Resolved once from the environment at startup and injected into handlers.
 */
use std::path::PathBuf;

/// Placeholder secret for local development. `run()` refuses to start in
/// production while this value is in effect.
pub const DEFAULT_ADMIN_SECRET: &str = "dev-admin-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub admin_secret: String,
    pub upload_dir: PathBuf,
    pub environment: String,
    pub db_pool_max: u32,
    pub db_pool_min: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3001),
            database_url: std::env::var("DATABASE_URL").ok(),
            admin_secret: std::env::var("ADMIN_API_SECRET")
                .unwrap_or_else(|_| DEFAULT_ADMIN_SECRET.to_string()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            db_pool_max: std::env::var("DB_POOL_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            db_pool_min: std::env::var("DB_POOL_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn admin_secret_is_default(&self) -> bool {
        self.admin_secret.is_empty() || self.admin_secret == DEFAULT_ADMIN_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_has_sane_defaults() {
        let config = AppConfig::from_env();
        assert!(!config.host.is_empty());
        assert!(config.port > 0);
        assert!(config.db_pool_max >= 1);
        assert!(!config.upload_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_default_secret_is_flagged() {
        let mut config = AppConfig::from_env();
        config.admin_secret = DEFAULT_ADMIN_SECRET.to_string();
        assert!(config.admin_secret_is_default());

        config.admin_secret = "a-real-secret".to_string();
        assert!(!config.admin_secret_is_default());

        config.admin_secret = String::new();
        assert!(config.admin_secret_is_default());
    }
}
