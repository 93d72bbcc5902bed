//! Run configuration.
//!
//! All environment variables are read once, here, and validated before any
//! network call is made.

use std::fmt;
use std::time::Duration;

use crate::error::{ReaperError, Result};

pub const DEFAULT_API_URL: &str = "https://hub.docker.com/v2";
pub const DEFAULT_NAMESPACE: &str = "scylladb";
pub const DEFAULT_REPOSITORY: &str = "gocql-extended-ci";

pub const ENV_TOKEN: &str = "DOCKERHUB_TOKEN";
pub const ENV_USERNAME: &str = "DOCKERHUB_USERNAME";
pub const ENV_PASSWORD: &str = "DOCKERHUB_PASSWORD";
pub const ENV_RETENTION_DAYS: &str = "DELETE_AFTER_DAYS";
pub const ENV_API_URL: &str = "DOCKERHUB_API_URL";
pub const ENV_REPOSITORY: &str = "DOCKERHUB_REPOSITORY";
pub const ENV_TIMEOUT_SECS: &str = "DOCKERHUB_TIMEOUT_SECS";

/// How the bearer token for the run is obtained
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Pre-issued token, used as-is
    Token(String),
    /// Exchanged for a token through the login endpoint
    Login { username: String, password: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// `namespace/repository` coordinate of the image repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub namespace: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn parse(s: &str) -> Option<Self> {
        let (namespace, name) = s.trim().split_once('/')?;
        if namespace.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }
}

impl Default for RepositoryRef {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            name: DEFAULT_REPOSITORY.to_string(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Validated configuration for a single reaper run
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    pub credentials: Credentials,
    pub retention_days: u32,
    pub api_url: String,
    pub repository: RepositoryRef,
    /// Per-request timeout; `None` keeps the HTTP client's default
    pub timeout: Option<Duration>,
}

impl ReaperConfig {
    pub fn new(credentials: Credentials, retention_days: u32) -> Self {
        Self {
            credentials,
            retention_days,
            api_url: DEFAULT_API_URL.to_string(),
            repository: RepositoryRef::default(),
            timeout: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        // Token wins over a username/password pair
        let credentials = match (get(ENV_TOKEN), get(ENV_USERNAME), get(ENV_PASSWORD)) {
            (Some(token), _, _) => Credentials::Token(token),
            (None, Some(username), Some(password)) => Credentials::Login { username, password },
            (None, Some(_), None) => {
                return Err(ReaperError::Config(format!(
                    "{} is set but {} is missing",
                    ENV_USERNAME, ENV_PASSWORD
                )));
            }
            _ => {
                return Err(ReaperError::Config(format!(
                    "set {} or both {} and {}",
                    ENV_TOKEN, ENV_USERNAME, ENV_PASSWORD
                )));
            }
        };

        let retention_raw = get(ENV_RETENTION_DAYS)
            .ok_or_else(|| ReaperError::Config(format!("{} is not set", ENV_RETENTION_DAYS)))?;
        let retention_days = retention_raw.parse::<u32>().map_err(|_| {
            ReaperError::Config(format!(
                "{} must be a non-negative number of days, got '{}'",
                ENV_RETENTION_DAYS, retention_raw
            ))
        })?;

        let api_url = get(ENV_API_URL)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let repository = match get(ENV_REPOSITORY) {
            Some(raw) => RepositoryRef::parse(&raw).ok_or_else(|| {
                ReaperError::Config(format!(
                    "{} must look like 'namespace/repository', got '{}'",
                    ENV_REPOSITORY, raw
                ))
            })?,
            None => RepositoryRef::default(),
        };

        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                    ReaperError::Config(format!(
                        "{} must be a positive number of seconds, got '{}'",
                        ENV_TIMEOUT_SECS, raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            credentials,
            retention_days,
            api_url,
            repository,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_token_config_with_defaults() {
        let config =
            ReaperConfig::from_lookup(lookup(&[(ENV_TOKEN, "abc"), (ENV_RETENTION_DAYS, "30")]))
                .unwrap();

        assert_eq!(config.credentials, Credentials::Token("abc".to_string()));
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.repository.to_string(), "scylladb/gocql-extended-ci");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_login_config() {
        let config = ReaperConfig::from_lookup(lookup(&[
            (ENV_USERNAME, "bot"),
            (ENV_PASSWORD, "secret"),
            (ENV_RETENTION_DAYS, "7"),
            (ENV_API_URL, "http://localhost:8080/v2/"),
            (ENV_REPOSITORY, "acme/nightly"),
            (ENV_TIMEOUT_SECS, "15"),
        ]))
        .unwrap();

        assert_eq!(
            config.credentials,
            Credentials::Login {
                username: "bot".to_string(),
                password: "secret".to_string(),
            }
        );
        assert_eq!(config.api_url, "http://localhost:8080/v2");
        assert_eq!(config.repository.namespace, "acme");
        assert_eq!(config.repository.name, "nightly");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_token_takes_precedence() {
        let config = ReaperConfig::from_lookup(lookup(&[
            (ENV_TOKEN, "abc"),
            (ENV_USERNAME, "bot"),
            (ENV_PASSWORD, "secret"),
            (ENV_RETENTION_DAYS, "1"),
        ]))
        .unwrap();

        assert!(matches!(config.credentials, Credentials::Token(_)));
    }

    #[test]
    fn test_missing_variables_fail() {
        let err = ReaperConfig::from_lookup(lookup(&[(ENV_RETENTION_DAYS, "30")])).unwrap_err();
        assert!(matches!(err, ReaperError::Config(_)));

        let err = ReaperConfig::from_lookup(lookup(&[(ENV_TOKEN, "abc")])).unwrap_err();
        assert!(matches!(err, ReaperError::Config(_)));

        let err = ReaperConfig::from_lookup(lookup(&[
            (ENV_USERNAME, "bot"),
            (ENV_RETENTION_DAYS, "30"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ReaperError::Config(_)));

        // Empty counts as unset
        let err = ReaperConfig::from_lookup(lookup(&[(ENV_TOKEN, " "), (ENV_RETENTION_DAYS, "30")]))
            .unwrap_err();
        assert!(matches!(err, ReaperError::Config(_)));
    }

    #[test]
    fn test_invalid_values_fail() {
        for days in ["-1", "thirty", "1.5"] {
            let err =
                ReaperConfig::from_lookup(lookup(&[(ENV_TOKEN, "abc"), (ENV_RETENTION_DAYS, days)]))
                    .unwrap_err();
            assert!(matches!(err, ReaperError::Config(_)), "accepted {}", days);
        }

        let err = ReaperConfig::from_lookup(lookup(&[
            (ENV_TOKEN, "abc"),
            (ENV_RETENTION_DAYS, "30"),
            (ENV_REPOSITORY, "no-slash"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ReaperError::Config(_)));

        let err = ReaperConfig::from_lookup(lookup(&[
            (ENV_TOKEN, "abc"),
            (ENV_RETENTION_DAYS, "30"),
            (ENV_TIMEOUT_SECS, "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ReaperError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", Credentials::Token("abc123".to_string()));
        assert!(!debug.contains("abc123"));

        let debug = format!(
            "{:?}",
            Credentials::Login {
                username: "bot".to_string(),
                password: "hunter2".to_string(),
            }
        );
        assert!(debug.contains("bot"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_parse_repository_ref() {
        assert!(RepositoryRef::parse("a/b").is_some());
        assert!(RepositoryRef::parse("a/b/c").is_none());
        assert!(RepositoryRef::parse("/b").is_none());
        assert!(RepositoryRef::parse("a/").is_none());
    }
}
