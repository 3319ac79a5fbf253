use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // HTTP API settings
    pub listen_addr: String,

    // Storage settings; in-memory store when no path is set
    pub db_path: Option<String>,

    // Upstream ipstack settings
    pub ipstack_base_url: String,
    pub ipstack_api_key: String,
    pub ipstack_timeout_ms: u64,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            db_path: None,
            ipstack_base_url: "https://api.ipstack.com".to_string(),
            ipstack_api_key: String::new(),
            ipstack_timeout_ms: 5000,
            debug: false,
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let listen_addr =
        std::env::var("GEOCACHE_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let db_path = std::env::var("GEOCACHE_DB_PATH").ok();

    let ipstack_base_url = std::env::var("IPSTACK_BASE_URL")
        .unwrap_or_else(|_| "https://api.ipstack.com".to_string());

    let ipstack_api_key = std::env::var("IPSTACK_API_KEY").unwrap_or_default();

    let ipstack_timeout_ms = std::env::var("IPSTACK_TIMEOUT_MS")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .unwrap_or(5000);

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        listen_addr,
        db_path,
        ipstack_base_url,
        ipstack_api_key,
        ipstack_timeout_ms,
        debug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert!(cfg.db_path.is_none());
        assert_eq!(cfg.ipstack_base_url, "https://api.ipstack.com");
        assert_eq!(cfg.ipstack_timeout_ms, 5000);
        assert!(!cfg.debug);
    }
}
