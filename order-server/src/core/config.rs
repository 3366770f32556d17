use std::time::Duration;

/// Runtime configuration, sourced from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,

    // Collaborator endpoints
    pub payment_service_url: String,
    pub delivery_service_url: String,
    pub customer_service_url: String,

    // Operation bounds
    pub place_timeout: Duration,
    pub lock_timeout: Duration,
    pub gateway_timeout: Duration,

    // Deferred auto-completion delay window
    pub auto_complete_min: Duration,
    pub auto_complete_max: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),

            payment_service_url: std::env::var("PAYMENT_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8082".into()),
            delivery_service_url: std::env::var("DELIVERY_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8083".into()),
            customer_service_url: std::env::var("CUSTOMER_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8084".into()),

            place_timeout: secs_from_env("PLACE_TIMEOUT_SECS", 30),
            lock_timeout: secs_from_env("LOCK_TIMEOUT_SECS", 10),
            gateway_timeout: secs_from_env("GATEWAY_TIMEOUT_SECS", 10),

            auto_complete_min: secs_from_env("AUTO_COMPLETE_MIN_SECS", 30),
            auto_complete_max: secs_from_env("AUTO_COMPLETE_MAX_SECS", 45),
        }
    }

    /// Path of the embedded database under the work directory.
    pub fn db_path(&self) -> String {
        format!("{}/orders.db", self.work_dir.trim_end_matches('/'))
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn secs_from_env(key: &str, default_secs: u64) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(default_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_joins_work_dir() {
        let mut config = Config::from_env();
        config.work_dir = "/tmp/orders/".into();
        assert_eq!(config.db_path(), "/tmp/orders/orders.db");
    }

    #[test]
    fn test_auto_complete_window_defaults() {
        let config = Config::from_env();
        assert!(config.auto_complete_min <= config.auto_complete_max);
    }
}
