/// Configuration management for the API server
///
/// Loaded once at startup from environment variables (and a `.env` file when
/// present).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3005)
/// - `FRONTEND_URL`: Allowed CORS origin (default: http://localhost:3000)
/// - `CORS_ORIGINS`: Comma-separated origins, overrides `FRONTEND_URL`; `*` allows any
/// - `SESSION_TTL_HOURS`: Session lifetime, 1 to 87600 (default: 168)
/// - `APP_ENV`: `production` enables JSON logs and `Secure` cookies
/// - `RUST_LOG`: Log filter (default: taskboard_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_PORT: u16 = 3005;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 168;

/// Ten years
pub const MAX_SESSION_TTL_HOURS: i64 = 87_600;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed browser origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Running with `APP_ENV=production`
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub ttl_hours: i64,
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::hours(self.ttl_hours)
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` is missing or a numeric variable does not
    /// parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("API_PORT") {
            Ok(port) => port.parse::<u16>()?,
            Err(_) => DEFAULT_PORT,
        };

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(origins) => parse_origins(&origins),
            Err(_) => vec![env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string())],
        };

        let ttl_hours = parse_ttl_hours(env::var("SESSION_TTL_HOURS").ok())?;

        let production = env::var("APP_ENV")
            .map(|value| value.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig { ttl_hours },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_ttl_hours(value: Option<String>) -> anyhow::Result<i64> {
    let hours = match value {
        Some(hours) => hours.trim().parse::<i64>()?,
        None => DEFAULT_SESSION_TTL_HOURS,
    };
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        anyhow::bail!(
            "SESSION_TTL_HOURS must be between 1 and {}",
            MAX_SESSION_TTL_HOURS
        );
    }
    Ok(hours)
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: DEFAULT_PORT,
                cors_origins: vec![DEFAULT_FRONTEND_URL.to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            session: SessionConfig {
                ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config().bind_address(), "127.0.0.1:3005");
    }

    #[test]
    fn test_session_ttl() {
        assert_eq!(config().session.ttl(), Duration::days(7));
    }

    #[test]
    fn test_parse_ttl_hours() {
        assert_eq!(parse_ttl_hours(None).unwrap(), DEFAULT_SESSION_TTL_HOURS);
        assert_eq!(parse_ttl_hours(Some("24".to_string())).unwrap(), 24);
        assert_eq!(
            parse_ttl_hours(Some("87600".to_string())).unwrap(),
            MAX_SESSION_TTL_HOURS
        );
        assert!(parse_ttl_hours(Some("0".to_string())).is_err());
        assert!(parse_ttl_hours(Some("87601".to_string())).is_err());
        assert!(parse_ttl_hours(Some(i64::MAX.to_string())).is_err());
        assert!(parse_ttl_hours(Some("week".to_string())).is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test,,"),
            vec!["http://a.test", "http://b.test"]
        );
        assert_eq!(parse_origins("*"), vec!["*"]);
    }
}
