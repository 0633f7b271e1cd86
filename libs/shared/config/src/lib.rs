use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_BACKEND_URL: &str = "https://localhost:7043/api";
pub const DEFAULT_INTERPRETER_URL: &str = "http://127.0.0.1:8000/comando";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub interpreter_url: String,
    pub request_timeout_secs: u64,
    pub accept_invalid_certs: bool,
    pub workload_minutes_heuristic: bool,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            interpreter_url: DEFAULT_INTERPRETER_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            accept_invalid_certs: false,
            workload_minutes_heuristic: true,
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            backend_url: env::var("ORGANIZAMED_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| {
                    warn!("ORGANIZAMED_API_URL not set, using default {}", DEFAULT_BACKEND_URL);
                    DEFAULT_BACKEND_URL.to_string()
                }),
            interpreter_url: env::var("INTERPRETER_URL")
                .unwrap_or_else(|_| {
                    warn!("INTERPRETER_URL not set, using default {}", DEFAULT_INTERPRETER_URL);
                    DEFAULT_INTERPRETER_URL.to_string()
                }),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            accept_invalid_certs: parse_var("BACKEND_ACCEPT_INVALID_CERTS", false),
            workload_minutes_heuristic: parse_var("WORKLOAD_MINUTES_HEURISTIC", true),
            port: parse_var("PORT", DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - backend or interpreter URL is empty");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_url.is_empty() && !self.interpreter_url.is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", name, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {}", name, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_configured() {
        let config = AppConfig::default();
        assert!(config.is_configured());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.workload_minutes_heuristic);
    }

    #[test]
    fn test_empty_backend_url_is_not_configured() {
        let config = AppConfig {
            backend_url: String::new(),
            ..AppConfig::default()
        };
        assert!(!config.is_configured());
    }
}
