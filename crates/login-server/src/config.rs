//! Server configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults; only the backend API address is required.

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,

    /// Port to bind to.
    pub port: u16,

    /// Externally visible origin of this service, used in identity
    /// provider return URLs.
    pub base_url: String,

    /// Base URL of the identity backend API.
    pub api_url: String,

    /// Service token for the identity backend API.
    pub api_token: String,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// ## Errors
    ///
    /// Fails when `LOGIN_API_URL` is missing.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let host = std::env::var("LOGIN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("LOGIN_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url = std::env::var("LOGIN_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));

        let api_url = std::env::var("LOGIN_API_URL")
            .map_err(|_| anyhow::anyhow!("LOGIN_API_URL environment variable is required"))?;

        let api_token = std::env::var("LOGIN_API_TOKEN").unwrap_or_default();

        Ok(Self {
            host,
            port,
            base_url,
            api_url,
            api_token,
        })
    }

    /// Creates a configuration for testing.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            api_url: "http://localhost:8080".to_string(),
            api_token: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testing_config_has_local_defaults() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 0);
    }
}
