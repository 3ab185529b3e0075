use yamdb_core::confirmation::DEFAULT_CODE_TTL_MINS;

use crate::auth::jwt::JwtConfig;

/// Account promoted to administrator at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Lifetime of a mailed confirmation code in minutes (default: three days).
    pub confirmation_code_ttl_mins: i64,
    /// Administrator to create or promote at startup, if configured.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `CONFIRMATION_CODE_TTL_MINS` | `4320`                  |
    /// | `BOOTSTRAP_ADMIN_USERNAME`   | unset                   |
    /// | `BOOTSTRAP_ADMIN_EMAIL`      | unset                   |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let confirmation_code_ttl_mins: i64 = std::env::var("CONFIRMATION_CODE_TTL_MINS")
            .unwrap_or_else(|_| DEFAULT_CODE_TTL_MINS.to_string())
            .parse()
            .expect("CONFIRMATION_CODE_TTL_MINS must be a valid i64");

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_USERNAME"),
            std::env::var("BOOTSTRAP_ADMIN_EMAIL"),
        ) {
            (Ok(username), Ok(email)) => Some(BootstrapAdmin { username, email }),
            (Ok(_), Err(_)) | (Err(_), Ok(_)) => panic!(
                "BOOTSTRAP_ADMIN_USERNAME and BOOTSTRAP_ADMIN_EMAIL must be set together"
            ),
            _ => None,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            confirmation_code_ttl_mins,
            bootstrap_admin,
        }
    }
}
