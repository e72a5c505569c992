use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable overriding [`SystemConfig::buffer_size`].
pub const STORE_BUFFER_ENV: &str = "STOREFRONT_STORE_BUFFER";

/// Runtime settings of a [`StorefrontSystem`](super::StorefrontSystem).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemConfig {
    /// Capacity of each store's request channel. Callers wait when it is full.
    pub buffer_size: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self { buffer_size: 32 }
    }
}

impl SystemConfig {
    /// Defaults, with the buffer size taken from `STOREFRONT_STORE_BUFFER` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(STORE_BUFFER_ENV) {
            config.apply_buffer_size(&raw);
        }
        config
    }

    fn apply_buffer_size(&mut self, raw: &str) {
        match raw.trim().parse::<usize>() {
            Ok(size) if size > 0 => self.buffer_size = size,
            _ => warn!(value = raw, "Ignoring invalid {STORE_BUFFER_ENV}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_buffer_size_keeps_default() {
        let mut config = SystemConfig::default();
        config.apply_buffer_size("0");
        config.apply_buffer_size("many");
        assert_eq!(config.buffer_size, 32);

        config.apply_buffer_size(" 128 ");
        assert_eq!(config.buffer_size, 128);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: SystemConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SystemConfig::default());

        let config: SystemConfig = serde_json::from_str(r#"{"bufferSize": 8}"#).unwrap();
        assert_eq!(config.buffer_size, 8);
    }
}
