use anyhow::{Context, Result};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use crate::scope::{is_cluster_wide, is_valid_namespace, resolve_scope};
use crate::types::Config;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9000";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 30;

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config() -> Result<Config> {
    load_config_with_env(&SystemEnvironment)
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    // Unset and empty both mean cluster-wide
    let watch_namespace = env.get_var("WATCH_NAMESPACE").unwrap_or_default();
    let namespaces = resolve_scope(&watch_namespace);
    if !is_cluster_wide(&namespaces) {
        if let Some(bad) = namespaces.iter().find(|ns| !is_valid_namespace(ns)) {
            anyhow::bail!("Invalid WATCH_NAMESPACE: {:?} is not a namespace name", bad);
        }
    }

    let listen_addr: SocketAddr = env
        .get_var("LISTEN_ADDR")
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
        .parse()
        .context("Invalid LISTEN_ADDR")?;

    let query_timeout = secs_var(env, "QUERY_TIMEOUT_SECS", DEFAULT_QUERY_TIMEOUT_SECS)?;
    let scrape_timeout = secs_var(env, "SCRAPE_TIMEOUT_SECS", DEFAULT_SCRAPE_TIMEOUT_SECS)?;

    Ok(Config {
        namespaces,
        listen_addr,
        query_timeout,
        scrape_timeout,
    })
}

fn secs_var<E: EnvironmentProvider>(env: &E, key: &str, default: u64) -> Result<Duration> {
    let secs: u64 = match env.get_var(key) {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", key))?,
        None => default,
    };
    if secs == 0 {
        anyhow::bail!("Invalid {}: must be greater than zero", key);
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_loading_with_env() {
        let env = MockEnvironment::new()
            .with_var("WATCH_NAMESPACE", "default,kube-system,monitoring")
            .with_var("LISTEN_ADDR", "127.0.0.1:9100")
            .with_var("QUERY_TIMEOUT_SECS", "3")
            .with_var("SCRAPE_TIMEOUT_SECS", "12");

        let config = load_config_with_env(&env).unwrap();

        assert_eq!(config.namespaces, vec!["default", "kube-system", "monitoring"]);
        assert_eq!(config.listen_addr, "127.0.0.1:9100".parse().unwrap());
        assert_eq!(config.query_timeout, Duration::from_secs(3));
        assert_eq!(config.scrape_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_config_loading_defaults() {
        let config = load_config_with_env(&MockEnvironment::new()).unwrap();

        assert_eq!(config.namespaces, vec![""]); // cluster-wide
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR.parse().unwrap());
        assert_eq!(config.query_timeout, Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS));
        assert_eq!(config.scrape_timeout, Duration::from_secs(DEFAULT_SCRAPE_TIMEOUT_SECS));
    }

    #[test]
    fn test_single_watch_namespace() {
        let env = MockEnvironment::new().with_var("WATCH_NAMESPACE", " team-a ");
        let config = load_config_with_env(&env).unwrap();
        assert_eq!(config.namespaces, vec!["team-a"]);
    }

    #[test]
    fn test_invalid_listen_addr() {
        let env = MockEnvironment::new().with_var("LISTEN_ADDR", "not-an-addr");
        let result = load_config_with_env(&env);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("LISTEN_ADDR"));
    }

    #[test]
    fn test_invalid_timeouts() {
        let env = MockEnvironment::new().with_var("QUERY_TIMEOUT_SECS", "soon");
        let result = load_config_with_env(&env);
        assert!(result.unwrap_err().to_string().contains("QUERY_TIMEOUT_SECS"));

        let env = MockEnvironment::new().with_var("SCRAPE_TIMEOUT_SECS", "0");
        let result = load_config_with_env(&env);
        assert!(result.unwrap_err().to_string().contains("SCRAPE_TIMEOUT_SECS"));
    }

    #[test]
    fn test_invalid_watch_namespace() {
        for descriptor in ["team-a,team/b", "team a", "Team-A"] {
            let env = MockEnvironment::new().with_var("WATCH_NAMESPACE", descriptor);
            let result = load_config_with_env(&env);
            assert!(result.unwrap_err().to_string().contains("WATCH_NAMESPACE"));
        }
    }
}
