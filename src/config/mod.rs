use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub google: GoogleConfig,
    pub ai: AiConfig,
    pub scheduler: SchedulerConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Frontend origin allowed by CORS and used for OAuth redirects
    pub frontend_url: String,
    /// Public base URL of this API (sent to OpenRouter as the referer)
    pub backend_base_url: String,
    pub api_rate_limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl GoogleConfig {
    /// OAuth is optional; routes return an error when unconfigured
    pub fn is_enabled(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub openrouter_api_key: String,
}

impl AiConfig {
    pub fn is_enabled(&self) -> bool {
        !self.openrouter_api_key.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub api_max_limit: usize,
    pub max_request_body_size: usize,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/budgetpay.db".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid PORT value".to_string()))?;

        let secret_key = std::env::var("SECRET_KEY")
            .map_err(|_| Error::Config("SECRET_KEY must be set".to_string()))?;

        let access_token_expire_minutes = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "10080".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid ACCESS_TOKEN_EXPIRE_MINUTES value".to_string()))?;

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let backend_base_url =
            std::env::var("BACKEND_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

        let api_rate_limit = std::env::var("API_RATE_LIMIT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid API_RATE_LIMIT value".to_string()))?;

        let google_client_id = std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
        let google_client_secret = std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default();
        let google_redirect_uri = std::env::var("GOOGLE_REDIRECT_URI").unwrap_or_default();

        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_default();

        let scheduler_interval = std::env::var("SCHEDULER_INTERVAL")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid SCHEDULER_INTERVAL value".to_string()))?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "25".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_MAX_CONNECTIONS value".to_string()))?;

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_MIN_CONNECTIONS value".to_string()))?;

        let connection_timeout_seconds = std::env::var("DATABASE_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_CONNECTION_TIMEOUT value".to_string()))?;

        let idle_timeout_seconds = std::env::var("DATABASE_IDLE_TIMEOUT")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_IDLE_TIMEOUT value".to_string()))?;

        let api_max_limit = std::env::var("API_MAX_LIMIT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid API_MAX_LIMIT value".to_string()))?;

        let max_request_body_size = std::env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| "10485760".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_REQUEST_BODY_SIZE value".to_string()))?;

        Ok(Settings {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                min_connections,
                connection_timeout_seconds,
                idle_timeout_seconds,
            },
            server: ServerConfig {
                host,
                port,
                frontend_url,
                backend_base_url,
                api_rate_limit,
            },
            auth: AuthConfig {
                secret_key,
                access_token_expire_minutes,
            },
            google: GoogleConfig {
                client_id: google_client_id,
                client_secret: google_client_secret,
                redirect_uri: google_redirect_uri,
            },
            ai: AiConfig { openrouter_api_key },
            scheduler: SchedulerConfig {
                interval_seconds: scheduler_interval,
            },
            pagination: PaginationConfig {
                api_max_limit,
                max_request_body_size,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.auth.secret_key.len() < 16 {
            return Err(Error::Config(
                "SECRET_KEY must be at least 16 characters".to_string(),
            ));
        }

        if self.auth.access_token_expire_minutes <= 0 {
            return Err(Error::Config(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            min_connections: 1,
            connection_timeout_seconds: 30,
            idle_timeout_seconds: 600,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            frontend_url: "http://localhost:3000".to_string(),
            backend_base_url: "http://localhost:8000".to_string(),
            api_rate_limit: 100,
        },
        auth: AuthConfig {
            secret_key: "test-secret-key-at-least-16-chars".to_string(),
            access_token_expire_minutes: 60,
        },
        google: GoogleConfig {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
        },
        ai: AiConfig {
            openrouter_api_key: String::new(),
        },
        scheduler: SchedulerConfig {
            interval_seconds: 3600,
        },
        pagination: PaginationConfig {
            api_max_limit: 100,
            max_request_body_size: 10485760,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_validation() {
        let mut settings = test_settings();
        assert!(settings.validate().is_ok());

        settings.server.port = 0;
        assert!(settings.validate().is_err());

        settings.server.port = 8000;
        settings.auth.secret_key = "short".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_google_config_enabled() {
        let mut settings = test_settings();
        assert!(!settings.google.is_enabled());

        settings.google.client_id = "id".to_string();
        settings.google.client_secret = "secret".to_string();
        assert!(settings.google.is_enabled());
    }
}
