//! Application configuration
//!
//! Values are read from environment variables, after `.env` has been loaded.

use std::{env, fmt, str::FromStr};

use tracing::warn;

use crate::utils::{app_error::AppError, pagination::Page};

pub const SECRET_KEY_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    /// Database used when `DATABASE_URL` is not set.
    pub fn database_name(&self) -> &'static str {
        match self {
            Environment::Development => "flasky-dev",
            Environment::Testing => "flasky-test",
            Environment::Production => "flasky",
        }
    }
}

impl FromStr for Environment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "default" => Ok(Environment::Development),
            "testing" => Ok(Environment::Testing),
            "production" => Ok(Environment::Production),
            other => Err(AppError::Config(format!("unknown FLASKY_CONFIG `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone)]
pub struct Config {
    pub environment: Environment,
    /// `PostgreSQL` connection URL
    pub database_url: String,
    /// AES-256 key used to seal tokens, exactly 32 bytes
    pub secret_key: String,
    /// Whoever registers with this address becomes an administrator
    pub admin_email: Option<String>,
    pub posts_per_page: i64,
    pub comments_per_page: i64,
    /// Lifetime of account confirmation tokens, in seconds
    pub confirmation_ttl: i64,
    /// Lifetime of API auth tokens, in seconds
    pub auth_token_ttl: i64,
    pub log_format: LogFormat,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("database_url", &self.database_url)
            .field("secret_key", &"<redacted>")
            .field("admin_email", &self.admin_email)
            .field("posts_per_page", &self.posts_per_page)
            .field("comments_per_page", &self.comments_per_page)
            .field("confirmation_ttl", &self.confirmation_ttl)
            .field("auth_token_ttl", &self.auth_token_ttl)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("FLASKY_CONFIG") {
            Some(name) => name.parse()?,
            None => Environment::Development,
        };

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgresql://{}:{}@{}:5432/{}",
                lookup("POSTGRES_USERNAME").unwrap_or_default(),
                lookup("POSTGRES_PASSWORD").unwrap_or_default(),
                lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string()),
                environment.database_name()
            ),
        };

        let secret_key = lookup("SECRET_KEY")
            .ok_or_else(|| AppError::Config("SECRET_KEY must be set".to_string()))?;
        check_secret_key(&secret_key)?;

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            environment,
            database_url,
            secret_key,
            admin_email: lookup("FLASKY_ADMIN").map(|email| email.to_lowercase()),
            posts_per_page: parse_or(&lookup, "FLASKY_POSTS_PER_PAGE", 20),
            comments_per_page: parse_or(&lookup, "FLASKY_COMMENTS_PER_PAGE", 30),
            confirmation_ttl: parse_or(&lookup, "FLASKY_CONFIRMATION_TTL_SECS", 3600),
            auth_token_ttl: parse_or(&lookup, "FLASKY_AUTH_TOKEN_TTL_SECS", 3600),
            log_format,
        })
    }

    /// Configuration for tests and embedders that never touch `PostgreSQL`.
    pub fn testing(secret_key: &str) -> Result<Self, AppError> {
        check_secret_key(secret_key)?;
        Ok(Self {
            environment: Environment::Testing,
            database_url: String::new(),
            secret_key: secret_key.to_string(),
            admin_email: None,
            posts_per_page: 20,
            comments_per_page: 30,
            confirmation_ttl: 3600,
            auth_token_ttl: 3600,
            log_format: LogFormat::Pretty,
        })
    }

    /// Page of posts starting at `offset`.
    pub fn posts_page(&self, offset: i64) -> Page {
        Page::new(offset, self.posts_per_page)
    }

    pub fn comments_page(&self, offset: i64) -> Page {
        Page::new(offset, self.comments_per_page)
    }

    pub fn secret_key_bytes(&self) -> Result<[u8; SECRET_KEY_LEN], AppError> {
        self.secret_key
            .as_bytes()
            .try_into()
            .map_err(|_| AppError::Config("SECRET_KEY must be 32 bytes long".to_string()))
    }
}

fn check_secret_key(secret_key: &str) -> Result<(), AppError> {
    if secret_key.len() != SECRET_KEY_LEN {
        return Err(AppError::Config(
            "SECRET_KEY must be 32 bytes long".to_string(),
        ));
    }
    Ok(())
}

fn parse_or<F>(lookup: &F, key: &str, default: i64) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value.parse().unwrap_or_else(|e| {
            warn!("Ignoring {key}=`{value}` : {e}");
            default
        }),
        None => default,
    }
}
