//! Server configuration from the environment.

use anyhow::Context;
use std::net::SocketAddr;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on (`SERVER_ADDR`)
    pub addr: SocketAddr,
    /// Seed for every room's shuffles (`HARMONIES_SEED`); random when unset
    pub seed: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.into())
            .parse::<SocketAddr>()
            .context("SERVER_ADDR is not a socket address")?;
        let seed = lookup("HARMONIES_SEED")
            .map(|s| s.parse::<u64>())
            .transpose()
            .context("HARMONIES_SEED is not an unsigned integer")?;
        Ok(Self { addr, seed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_overrides() {
        let config =
            config(&[("SERVER_ADDR", "127.0.0.1:9000"), ("HARMONIES_SEED", "42")]).unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_bad_values() {
        assert!(config(&[("SERVER_ADDR", "nowhere")]).is_err());
        assert!(config(&[("HARMONIES_SEED", "-1")]).is_err());
    }
}
