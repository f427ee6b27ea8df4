//! Process configuration

/// Environment variable consulted when a request carries no connection
/// parameters. Comma-separated list of cluster URLs.
pub const ELASTICSEARCH_URL_ENV: &str = "ELASTICSEARCH_URL";

/// Cluster address used when `ELASTICSEARCH_URL` is unset or empty.
pub const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8888;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolve default-client addresses from the value of `ELASTICSEARCH_URL`.
///
/// Entries are trimmed and empty ones skipped; with nothing left the
/// local default is used.
pub fn default_addresses(env_value: Option<&str>) -> Vec<String> {
    let addresses: Vec<String> = env_value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();

    if addresses.is_empty() {
        vec![DEFAULT_ELASTICSEARCH_URL.to_string()]
    } else {
        addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_addr() {
        assert_eq!(ServerConfig::default().bind_addr(), "0.0.0.0:8888");
        assert_eq!(ServerConfig::new("127.0.0.1", 9000).bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_default_addresses_fallback() {
        assert_eq!(default_addresses(None), vec![DEFAULT_ELASTICSEARCH_URL]);
        assert_eq!(default_addresses(Some("")), vec![DEFAULT_ELASTICSEARCH_URL]);
        assert_eq!(default_addresses(Some(" , ")), vec![DEFAULT_ELASTICSEARCH_URL]);
    }

    #[test]
    fn test_default_addresses_from_env_value() {
        assert_eq!(
            default_addresses(Some("http://es1:9200, http://es2:9200,")),
            vec!["http://es1:9200", "http://es2:9200"]
        );
    }
}
