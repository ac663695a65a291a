use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CachePolicy;
use crate::{ClientError, ClientResult};

const DEFAULT_CONFIG_NAME: &str = "fabrica.json";

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CacheSettings {
    pub fresh_for_ms: u64,
    pub purge_after_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            fresh_for_ms: 30_000,
            purge_after_ms: 300_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    pub default_page_size: u32,
    /// Advisory to the transport; timeouts come back as ordinary network
    /// errors.
    pub request_timeout_ms: u64,
    pub cache: CacheSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            request_timeout_ms: 15_000,
            cache: CacheSettings::default(),
        }
    }
}

impl ClientConfig {
    /// Read `fabrica.json` from `base_dir`, writing the defaults on first
    /// run.
    pub fn load_or_init(base_dir: &Path) -> ClientResult<Self> {
        fs::create_dir_all(base_dir)
            .map_err(|err| ClientError::config(format!("create config dir: {err}")))?;
        let config_path = base_dir.join(DEFAULT_CONFIG_NAME);
        if config_path.exists() {
            let raw = fs::read_to_string(&config_path)
                .map_err(|err| ClientError::config(format!("read config: {err}")))?;
            let config: ClientConfig = serde_json::from_str(&raw)
                .map_err(|err| ClientError::config(err.to_string()))?;
            config.validate()?;
            return Ok(config);
        }
        let default = ClientConfig::default();
        let payload = serde_json::to_string_pretty(&default)
            .map_err(|err| ClientError::config(format!("serialize config: {err}")))?;
        fs::write(&config_path, payload)
            .map_err(|err| ClientError::config(format!("write config: {err}")))?;
        Ok(default)
    }

    fn validate(&self) -> ClientResult<()> {
        if self.default_page_size == 0 {
            return Err(ClientError::config("default_page_size must be positive"));
        }
        Ok(())
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            fresh_for: Duration::from_millis(self.cache.fresh_for_ms),
            purge_after: Duration::from_millis(self.cache.purge_after_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::ClientConfig;
    use tempfile::tempdir;

    #[test]
    fn first_run_writes_defaults_and_reloads_them() {
        let dir = tempdir().expect("tempdir");
        let written = ClientConfig::load_or_init(dir.path()).expect("init");
        assert_eq!(written.default_page_size, 25);
        let reloaded = ClientConfig::load_or_init(dir.path()).expect("reload");
        assert_eq!(reloaded.default_page_size, written.default_page_size);
        assert_eq!(reloaded.cache.fresh_for_ms, written.cache.fresh_for_ms);
    }

    #[test]
    fn a_zero_page_size_is_rejected() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("fabrica.json"),
            r#"{"default_page_size":0,"request_timeout_ms":1000,"cache":{"fresh_for_ms":1,"purge_after_ms":2}}"#,
        )
        .expect("write");
        assert!(ClientConfig::load_or_init(dir.path()).is_err());
    }
}
