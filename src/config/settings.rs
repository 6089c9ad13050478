use crate::error::{BlockchainError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::sync::{PoisonError, RwLock};

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

static DEFAULT_DB_PATH: &str = "blocks.db";
static DEFAULT_GENESIS_ADDRESS: &str = "genesis";

pub const DEFAULT_TARGET_BITS: u32 = 16;
pub const DEFAULT_GENESIS_REWARD: u64 = 100;

const DB_PATH_KEY: &str = "LEDGER_DB_PATH";
const GENESIS_ADDRESS_KEY: &str = "GENESIS_ADDRESS";
const TARGET_BITS_KEY: &str = "LEDGER_TARGET_BITS";
const GENESIS_REWARD_KEY: &str = "LEDGER_GENESIS_REWARD";

/// Parameters a chain is created and extended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSettings {
    /// Leading zero bits the proof-of-work hash must have.
    pub target_bits: u32,
    /// Value of the genesis coinbase output.
    pub genesis_reward: u64,
}

impl Default for ChainSettings {
    fn default() -> Self {
        ChainSettings {
            target_bits: DEFAULT_TARGET_BITS,
            genesis_reward: DEFAULT_GENESIS_REWARD,
        }
    }
}

pub struct Config {
    inner: RwLock<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Seeds the configuration from the process environment.
    pub fn new() -> Config {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Config {
        let mut map = HashMap::new();
        map.insert(
            String::from(DB_PATH_KEY),
            lookup(DB_PATH_KEY).unwrap_or_else(|| String::from(DEFAULT_DB_PATH)),
        );
        map.insert(
            String::from(GENESIS_ADDRESS_KEY),
            lookup(GENESIS_ADDRESS_KEY).unwrap_or_else(|| String::from(DEFAULT_GENESIS_ADDRESS)),
        );
        for key in [TARGET_BITS_KEY, GENESIS_REWARD_KEY] {
            if let Some(value) = lookup(key) {
                map.insert(String::from(key), value);
            }
        }

        Config {
            inner: RwLock::new(map),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.insert(String::from(key), value);
    }

    pub fn get_db_path(&self) -> String {
        self.get(DB_PATH_KEY)
            .unwrap_or_else(|| String::from(DEFAULT_DB_PATH))
    }

    pub fn set_db_path(&self, path: String) {
        self.set(DB_PATH_KEY, path);
    }

    pub fn get_genesis_address(&self) -> String {
        self.get(GENESIS_ADDRESS_KEY)
            .unwrap_or_else(|| String::from(DEFAULT_GENESIS_ADDRESS))
    }

    pub fn set_genesis_address(&self, address: String) {
        self.set(GENESIS_ADDRESS_KEY, address);
    }

    pub fn get_target_bits(&self) -> Result<u32> {
        let Some(raw) = self.get(TARGET_BITS_KEY) else {
            return Ok(DEFAULT_TARGET_BITS);
        };
        let bits: u32 = raw
            .parse()
            .map_err(|e| BlockchainError::Config(format!("{TARGET_BITS_KEY}={raw}: {e}")))?;
        if bits == 0 || bits >= 256 {
            return Err(BlockchainError::Config(format!(
                "{TARGET_BITS_KEY} must be between 1 and 255, got {bits}"
            )));
        }
        Ok(bits)
    }

    pub fn set_target_bits(&self, bits: u32) {
        self.set(TARGET_BITS_KEY, bits.to_string());
    }

    pub fn get_genesis_reward(&self) -> Result<u64> {
        match self.get(GENESIS_REWARD_KEY) {
            Some(raw) => raw
                .parse()
                .map_err(|e| BlockchainError::Config(format!("{GENESIS_REWARD_KEY}={raw}: {e}"))),
            None => Ok(DEFAULT_GENESIS_REWARD),
        }
    }

    /// Chain parameters assembled from the current configuration.
    pub fn chain_settings(&self) -> Result<ChainSettings> {
        Ok(ChainSettings {
            target_bits: self.get_target_bits()?,
            genesis_reward: self.get_genesis_reward()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let pairs: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| pairs.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_with(&[]);
        assert_eq!(config.get_db_path(), DEFAULT_DB_PATH);
        assert_eq!(config.get_genesis_address(), DEFAULT_GENESIS_ADDRESS);
        assert_eq!(config.chain_settings().unwrap(), ChainSettings::default());
    }

    #[test]
    fn test_values_from_lookup() {
        let config = config_with(&[
            (DB_PATH_KEY, "/tmp/ledger"),
            (TARGET_BITS_KEY, "8"),
            (GENESIS_REWARD_KEY, "250"),
        ]);
        assert_eq!(config.get_db_path(), "/tmp/ledger");
        let settings = config.chain_settings().unwrap();
        assert_eq!(settings.target_bits, 8);
        assert_eq!(settings.genesis_reward, 250);
    }

    #[test]
    fn test_invalid_target_bits_rejected() {
        let config = config_with(&[(TARGET_BITS_KEY, "300")]);
        assert!(matches!(
            config.get_target_bits(),
            Err(BlockchainError::Config(_))
        ));

        let config = config_with(&[(TARGET_BITS_KEY, "lots")]);
        assert!(config.get_target_bits().is_err());
    }

    #[test]
    fn test_setters_override() {
        let config = config_with(&[]);
        config.set_db_path("elsewhere".to_string());
        config.set_genesis_address("Alice".to_string());
        config.set_target_bits(4);
        assert_eq!(config.get_db_path(), "elsewhere");
        assert_eq!(config.get_genesis_address(), "Alice");
        assert_eq!(config.get_target_bits().unwrap(), 4);
    }
}
