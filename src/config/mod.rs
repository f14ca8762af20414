use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    /// Absent only when loaded for a run that never touches PostgreSQL.
    pub database: Option<DatabaseConfig>,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub enable_cors: bool,
}

// Keep the signing secret out of debug logs.
impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("enable_cors", &self.enable_cors)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Fails fast when the signing secret or the database location is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration for the in-memory store. The database location is
    /// still read when present but its absence is not an error.
    pub fn from_env_without_database() -> Result<Self, ConfigError> {
        Self::from_lookup_without_database(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads values through `lookup`, so callers
    /// (and tests) can supply their own source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load(lookup, true)
    }

    pub fn from_lookup_without_database<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load(lookup, false)
    }

    fn load<F>(lookup: F, require_database: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let database_url: Option<String> = match lookup("DATABASE_URL").filter(|s| !s.is_empty()) {
            Some(url) => Some(url::Url::parse(&url)?.into()),
            None if require_database || lookup("DB_HOST").is_some() => {
                Some(Self::database_url_from_parts(&lookup)?)
            }
            None => None,
        };

        let mut config = Self::defaults(environment, jwt_secret, database_url);

        if let Some(v) = lookup("PORT") {
            config.api.port = parse("PORT", &v)?;
        }
        if let Some(v) = lookup("API_REQUEST_TIMEOUT_SECS") {
            config.api.request_timeout_secs = parse("API_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(database) = config.database.as_mut() {
            if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
                database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
            }
            if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
                database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", &v)?;
            }
        }
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            config.security.jwt_expiry_hours = parse("JWT_EXPIRY_HOURS", &v)?;
        }
        if let Some(v) = lookup("BCRYPT_COST") {
            config.security.bcrypt_cost = parse("BCRYPT_COST", &v)?;
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            config.security.enable_cors = parse("SECURITY_ENABLE_CORS", &v)?;
        }

        Ok(config)
    }

    /// The PostgreSQL settings, for commands that need a connection.
    pub fn database(&self) -> Result<&DatabaseConfig, ConfigError> {
        self.database
            .as_ref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }

    /// Builds a postgres URL from the discrete DB_* variables.
    fn database_url_from_parts<F>(lookup: &F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("DB_HOST").ok_or(ConfigError::Missing("DB_HOST"))?;
        let user = lookup("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
        let name = lookup("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;
        let port = lookup("DB_PORT").unwrap_or_else(|| "5432".to_string());
        let port: u16 = parse("DB_PORT", &port)?;

        let mut url = url::Url::parse("postgres://localhost")?;
        url.set_host(Some(&host))?;
        url.set_port(Some(port)).map_err(|_| ConfigError::Invalid {
            key: "DB_PORT",
            value: port.to_string(),
        })?;
        url.set_username(&user).map_err(|_| ConfigError::Invalid {
            key: "DB_USER",
            value: user.clone(),
        })?;
        if let Some(password) = lookup("DB_PASSWORD") {
            url.set_password(Some(&password)).map_err(|_| ConfigError::Invalid {
                key: "DB_PASSWORD",
                value: "<redacted>".to_string(),
            })?;
        }
        url.set_path(&format!("/{}", name));
        if let Some(tz) = lookup("DB_TIMEZONE").filter(|s| !s.is_empty()) {
            url.query_pairs_mut()
                .append_pair("options", &format!("-c TimeZone={}", tz));
        }

        Ok(url.into())
    }

    pub fn defaults(
        environment: Environment,
        jwt_secret: String,
        database_url: Option<String>,
    ) -> Self {
        let (max_connections, connection_timeout) = match environment {
            Environment::Development => (10, 30),
            Environment::Staging => (20, 10),
            Environment::Production => (50, 5),
        };

        Self {
            environment,
            database: database_url.map(|url| DatabaseConfig {
                url,
                max_connections,
                connection_timeout,
            }),
            api: ApiConfig {
                port: 3000,
                request_timeout_secs: 10,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 1,
                bcrypt_cost: 10,
                enable_cors: environment == Environment::Development,
            },
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
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

    #[test]
    fn missing_secret_fails_fast() {
        let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://u@h/db")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn missing_database_location_fails_fast() {
        let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DB_HOST")));
    }

    #[test]
    fn builds_database_url_from_parts() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DB_HOST", "db.local"),
            ("DB_PORT", "6543"),
            ("DB_USER", "finance"),
            ("DB_PASSWORD", "pw"),
            ("DB_NAME", "finance_db"),
        ]))
        .unwrap();

        assert!(config
            .database()
            .unwrap()
            .url
            .starts_with("postgres://finance:pw@db.local:6543/finance_db"));
        assert_eq!(config.security.jwt_expiry_hours, 1);
        assert_eq!(config.api.port, 3000);
    }

    #[test]
    fn env_overrides_apply() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://u@h/db"),
            ("APP_ENV", "production"),
            ("PORT", "8080"),
            ("BCRYPT_COST", "12"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.security.bcrypt_cost, 12);
        assert_eq!(config.database().unwrap().max_connections, 50);
        assert!(!config.security.enable_cors);
    }

    #[test]
    fn in_memory_needs_only_the_secret() {
        let config =
            AppConfig::from_lookup_without_database(lookup_from(&[("JWT_SECRET", "s3cret")]))
                .unwrap();
        assert!(config.database.is_none());
        assert!(matches!(
            config.database(),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
        assert_eq!(config.api.port, 3000);

        let err = AppConfig::from_lookup_without_database(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn in_memory_still_reads_a_supplied_database() {
        let config = AppConfig::from_lookup_without_database(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://u@h/db"),
        ]))
        .unwrap();
        assert_eq!(config.database().unwrap().url, "postgres://u@h/db");

        let err = AppConfig::from_lookup_without_database(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DB_HOST", "db.local"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DB_USER")));
    }

    #[test]
    fn rejects_unparsable_port() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://u@h/db"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }
}
