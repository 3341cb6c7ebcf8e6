/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `REDIS_URL`: Redis connection string (required)
/// - `JWT_SECRET`: Secret key for session signing (required, 32+ chars)
/// - `SESSION_TTL_SECONDS`: Session lifetime (default: 3600)
/// - `PUBLIC_BASE_URL`: Base of verification links (default: http://localhost:3000/taskPro)
/// - `DEFAULT_AVATAR_URL`: Avatar given to new accounts
/// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `MAIL_FROM`:
///   SMTP relay; when `SMTP_HOST` is unset verification links are only logged
/// - `ASSETS_CLOUD_NAME`, `ASSETS_API_KEY`, `ASSETS_API_SECRET`: avatar
///   storage; when unset avatar uploads are rejected
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskpro_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use taskpro_shared::assets::CloudinarySettings;
use taskpro_shared::mail::SmtpSettings;

/// Avatar assigned at signup when `DEFAULT_AVATAR_URL` is not set
pub const DEFAULT_AVATAR_URL: &str =
    "https://res.cloudinary.com/taskpro/image/upload/avatars/default.png";

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis configuration
    pub redis: RedisSettings,

    /// Session token configuration
    pub jwt: JwtConfig,

    /// Account-facing settings
    pub identity: IdentitySettings,

    /// SMTP relay, if configured
    pub smtp: Option<SmtpSettings>,

    /// Avatar storage, if configured
    pub assets: Option<CloudinarySettings>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisSettings {
    /// Redis connection URL
    pub url: String,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session lifetime in seconds
    pub session_ttl_seconds: i64,
}

/// Settings for signup and verification
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    /// Base URL verification links point at
    pub public_base_url: String,

    /// Avatar for new accounts
    pub default_avatar_url: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    /// - An optional group (SMTP, assets) is only partly set
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };

        let api_port = var("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let session_ttl_seconds = var("SESSION_TTL_SECONDS", "3600")
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("SESSION_TTL_SECONDS is invalid: {}", e))?;
        if session_ttl_seconds <= 0 {
            anyhow::bail!("SESSION_TTL_SECONDS must be positive");
        }

        let smtp = match lookup("SMTP_HOST") {
            Some(host) => Some(SmtpSettings {
                host,
                port: var("SMTP_PORT", "587")
                    .parse::<u16>()
                    .map_err(|e| anyhow::anyhow!("SMTP_PORT is invalid: {}", e))?,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
                from_address: required("MAIL_FROM")?,
            }),
            None => None,
        };

        let assets = match lookup("ASSETS_CLOUD_NAME") {
            Some(cloud_name) => Some(CloudinarySettings {
                cloud_name,
                api_key: required("ASSETS_API_KEY")?,
                api_secret: required("ASSETS_API_SECRET")?,
            }),
            None => None,
        };

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST", "0.0.0.0"),
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections,
            },
            redis: RedisSettings {
                url: required("REDIS_URL")?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                session_ttl_seconds,
            },
            identity: IdentitySettings {
                public_base_url: var("PUBLIC_BASE_URL", "http://localhost:3000/taskPro"),
                default_avatar_url: var("DEFAULT_AVATAR_URL", DEFAULT_AVATAR_URL),
            },
            smtp,
            assets,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgresql://localhost/test"),
        ("REDIS_URL", "redis://localhost:6379"),
        ("JWT_SECRET", "test-secret-key-at-least-32-bytes-long"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(MINIMAL)).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.session_ttl_seconds, 3600);
        assert_eq!(config.identity.public_base_url, "http://localhost:3000/taskPro");
        assert_eq!(config.identity.default_avatar_url, DEFAULT_AVATAR_URL);
        assert!(config.smtp.is_none());
        assert!(config.assets.is_none());
    }

    #[test]
    fn test_missing_required_variable() {
        let err = Config::from_lookup(lookup_from(&MINIMAL[1..])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs[2] = ("JWT_SECRET", "too-short");

        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("32 characters"));
    }

    #[test]
    fn test_cors_origins_split() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("CORS_ORIGINS", "https://a.example, https://b.example,"));

        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_smtp_group() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("SMTP_HOST", "smtp.example.com"));

        // Host alone is not enough
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());

        pairs.extend([
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "hunter2"),
            ("MAIL_FROM", "noreply@example.com"),
        ]);
        let smtp = Config::from_lookup(lookup_from(&pairs)).unwrap().smtp.unwrap();
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.from_address, "noreply@example.com");
    }

    #[test]
    fn test_assets_group() {
        let mut pairs = MINIMAL.to_vec();
        pairs.extend([
            ("ASSETS_CLOUD_NAME", "taskpro"),
            ("ASSETS_API_KEY", "key"),
            ("ASSETS_API_SECRET", "secret"),
        ]);

        let assets = Config::from_lookup(lookup_from(&pairs)).unwrap().assets.unwrap();
        assert_eq!(assets.cloud_name, "taskpro");
    }

    #[test]
    fn test_invalid_port() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("API_PORT", "eighty"));

        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }
}
