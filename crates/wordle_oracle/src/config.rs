//! # Oracle Configuration
//!
//! Loaded once at startup. A config file (TOML, or the deploy script's JSON)
//! supplies the defaults; CLI flags and environment variables override it.
//!
//! ```toml
//! rpc_url = "http://127.0.0.1:8545"
//! contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
//! private_key = "0x..."
//! poll_interval_ms = 1000
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;
use wordle_oracle_chain::Address;
use wordle_oracle_core::Word;
use zeroize::Zeroizing;

use crate::error::ConfigError;

/// Default location of the config file.
pub const DEFAULT_CONFIG_PATH: &str = "oracle.toml";

/// Default poll period.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Names the contract interface must expose when an ABI is supplied.
const REQUIRED_ABI_ENTRIES: [&str; 3] = ["GameStarted", "PendingGuess", "fulfillGuess"];

/// On-disk layout. snake_case for TOML, camelCase aliases for the deploy script's JSON.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default, alias = "rpcUrl")]
    rpc_url: Option<String>,
    #[serde(default, alias = "contractAddress")]
    contract_address: Option<String>,
    #[serde(default, alias = "oraclePrivateKey")]
    private_key: Option<String>,
    #[serde(default, alias = "pollIntervalMs")]
    poll_interval_ms: Option<u64>,
    #[serde(default, alias = "rpcTimeoutMs")]
    rpc_timeout_ms: Option<u64>,
    #[serde(default, alias = "startBlock")]
    start_block: Option<u64>,
    #[serde(default, alias = "wordList")]
    word_list: Option<Vec<String>>,
    #[serde(default)]
    abi: Option<serde_json::Value>,
}

/// Values that take precedence over the config file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// RPC endpoint.
    pub rpc_url: Option<String>,
    /// Game contract address.
    pub contract_address: Option<String>,
    /// Oracle signing key.
    pub private_key: Option<String>,
    /// Poll period in milliseconds.
    pub poll_interval_ms: Option<u64>,
    /// Per-call RPC timeout in milliseconds.
    pub rpc_timeout_ms: Option<u64>,
    /// Block to resume after instead of the current head.
    pub start_block: Option<u64>,
}

/// Validated oracle configuration.
#[derive(Clone)]
pub struct OracleConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Game contract.
    pub contract_address: Address,
    /// Oracle signing key, wiped on drop.
    pub private_key: Zeroizing<String>,
    /// Poll period.
    pub poll_interval: Duration,
    /// Per-call RPC timeout; `None` waits forever.
    pub rpc_timeout: Option<Duration>,
    /// Resume after this block instead of the head at startup.
    pub start_block: Option<u64>,
    /// Secret candidates; `None` uses the built-in list.
    pub word_list: Option<Vec<String>>,
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConfig")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("contract_address", &self.contract_address)
            .field("private_key", &"<redacted>")
            .field("poll_interval", &self.poll_interval)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("start_block", &self.start_block)
            .field("word_list", &self.word_list.as_ref().map(Vec::len))
            .finish()
    }
}

impl OracleConfig {
    /// Loads the config file (if any) and applies overrides.
    ///
    /// With `path == None` the default `oracle.toml` is read when present;
    /// an explicit path must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is missing, unreadable or
    /// malformed, or when a required value is absent or invalid.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let raw = match path {
            Some(path) => read_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    read_file(default)?
                } else {
                    RawConfig::default()
                }
            }
        };
        Self::from_raw(raw, overrides)
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on syntax errors or invalid values.
    pub fn from_toml_str(text: &str, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let raw = toml::from_str(text).map_err(|e| ConfigError::Malformed {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        Self::from_raw(raw, overrides)
    }

    /// Parses deploy-script JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on syntax errors or invalid values.
    pub fn from_json_str(text: &str, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let raw = serde_json::from_str(text).map_err(|e| ConfigError::Malformed {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        Self::from_raw(raw, overrides)
    }

    fn from_raw(raw: RawConfig, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let rpc_url = overrides
            .rpc_url
            .or(raw.rpc_url)
            .ok_or(ConfigError::MissingField("rpc_url"))?;
        let rpc_url = Url::parse(rpc_url.trim()).map_err(|e| ConfigError::Invalid {
            field: "rpc_url",
            reason: e.to_string(),
        })?;

        let contract_address = overrides
            .contract_address
            .or(raw.contract_address)
            .ok_or(ConfigError::MissingField("contract_address"))?;
        let contract_address: Address =
            contract_address
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid {
                    field: "contract_address",
                    reason: format!("{e}"),
                })?;

        let private_key = Zeroizing::new(
            overrides
                .private_key
                .or(raw.private_key)
                .ok_or(ConfigError::MissingField("private_key"))?,
        );
        validate_private_key(&private_key)?;

        let poll_interval_ms = overrides
            .poll_interval_ms
            .or(raw.poll_interval_ms)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        let rpc_timeout = match overrides.rpc_timeout_ms.or(raw.rpc_timeout_ms) {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    field: "rpc_timeout_ms",
                    reason: "must be greater than zero".to_string(),
                })
            }
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        };

        if let Some(words) = &raw.word_list {
            validate_word_list(words)?;
        }

        if let Some(abi) = &raw.abi {
            validate_abi(abi)?;
        }

        Ok(Self {
            rpc_url,
            contract_address,
            private_key,
            poll_interval: Duration::from_millis(poll_interval_ms),
            rpc_timeout,
            start_block: overrides.start_block.or(raw.start_block),
            word_list: raw.word_list,
        })
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    } else {
        toml::from_str(&text).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| ConfigError::Malformed {
        path: path.to_path_buf(),
        reason,
    })
}

fn validate_private_key(key: &str) -> Result<(), ConfigError> {
    let hex = key.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        // Never echo the key back.
        return Err(ConfigError::Invalid {
            field: "private_key",
            reason: "expected 32 bytes of hex".to_string(),
        });
    }
    Ok(())
}

fn validate_word_list(words: &[String]) -> Result<(), ConfigError> {
    if words.is_empty() {
        return Err(ConfigError::Invalid {
            field: "word_list",
            reason: "must contain at least one word".to_string(),
        });
    }
    for word in words {
        Word::parse(word.trim()).map_err(|e| ConfigError::Invalid {
            field: "word_list",
            reason: format!("{word:?}: {e}"),
        })?;
    }
    Ok(())
}

/// Accepts JSON ABI (`[{"type": "event", "name": ...}]`) and human-readable
/// ABI (`["event GameStarted(address indexed player)"]`).
fn validate_abi(abi: &serde_json::Value) -> Result<(), ConfigError> {
    let entries = abi.as_array().ok_or_else(|| ConfigError::Invalid {
        field: "abi",
        reason: "expected an array".to_string(),
    })?;

    let declares = |name: &str| {
        entries.iter().any(|entry| match entry {
            serde_json::Value::String(signature) => signature
                .split(|c: char| c.is_whitespace() || c == '(')
                .any(|token| token == name),
            serde_json::Value::Object(item) => {
                item.get("name").and_then(serde_json::Value::as_str) == Some(name)
            }
            _ => false,
        })
    };

    for name in REQUIRED_ABI_ENTRIES {
        if !declares(name) {
            return Err(ConfigError::Invalid {
                field: "abi",
                reason: format!("missing {name}"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn toml_config() -> String {
        format!(
            "rpc_url = \"http://127.0.0.1:8545\"\ncontract_address = \"{CONTRACT}\"\nprivate_key = \"{KEY}\"\n"
        )
    }

    #[test]
    fn test_toml_defaults() {
        let config = OracleConfig::from_toml_str(&toml_config(), ConfigOverrides::default()).unwrap();
        assert_eq!(config.rpc_url.as_str(), "http://127.0.0.1:8545/");
        assert_eq!(config.contract_address, CONTRACT.parse::<Address>().unwrap());
        assert_eq!(config.poll_interval, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
        assert_eq!(config.rpc_timeout, None);
        assert_eq!(config.start_block, None);
        assert!(config.word_list.is_none());
    }

    #[test]
    fn test_deploy_script_json() {
        let json = format!(
            r#"{{
                "rpcUrl": "http://localhost:8545",
                "contractAddress": "{CONTRACT}",
                "oraclePrivateKey": "{KEY}",
                "abi": [
                    "event GameStarted(address indexed player)",
                    "event PendingGuess(address indexed player, bytes5 guess, uint256 attempt)",
                    "function fulfillGuess(address player, uint8[5] hints, bool won, bool gameOver)"
                ]
            }}"#
        );
        let config = OracleConfig::from_json_str(&json, ConfigOverrides::default()).unwrap();
        assert_eq!(config.rpc_url.host_str(), Some("localhost"));
    }

    #[test]
    fn test_json_abi_objects() {
        let abi = serde_json::json!([
            {"type": "event", "name": "GameStarted"},
            {"type": "event", "name": "PendingGuess"},
            {"type": "function", "name": "fulfillGuess"}
        ]);
        assert!(validate_abi(&abi).is_ok());

        let partial = serde_json::json!([{"type": "event", "name": "GameStarted"}]);
        assert!(matches!(
            validate_abi(&partial),
            Err(ConfigError::Invalid { field: "abi", .. })
        ));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ConfigOverrides {
            rpc_url: Some("http://10.0.0.1:8545".to_string()),
            poll_interval_ms: Some(250),
            start_block: Some(42),
            ..ConfigOverrides::default()
        };
        let config = OracleConfig::from_toml_str(&toml_config(), overrides).unwrap();
        assert_eq!(config.rpc_url.host_str(), Some("10.0.0.1"));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.start_block, Some(42));
    }

    #[test]
    fn test_missing_fields() {
        let result = OracleConfig::from_toml_str("", ConfigOverrides::default());
        assert!(matches!(result, Err(ConfigError::MissingField("rpc_url"))));

        let only_url = "rpc_url = \"http://127.0.0.1:8545\"";
        let result = OracleConfig::from_toml_str(only_url, ConfigOverrides::default());
        assert!(matches!(result, Err(ConfigError::MissingField("contract_address"))));
    }

    #[test]
    fn test_invalid_values() {
        let bad_key = toml_config().replace(KEY, "0x1234");
        let err = OracleConfig::from_toml_str(&bad_key, ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "private_key", .. }));
        assert!(!err.to_string().contains("1234"));

        let zero_poll = format!("{}poll_interval_ms = 0\n", toml_config());
        assert!(matches!(
            OracleConfig::from_toml_str(&zero_poll, ConfigOverrides::default()),
            Err(ConfigError::Invalid { field: "poll_interval_ms", .. })
        ));

        let bad_words = format!("{}word_list = [\"REACT\", \"NOPE\"]\n", toml_config());
        assert!(matches!(
            OracleConfig::from_toml_str(&bad_words, ConfigOverrides::default()),
            Err(ConfigError::Invalid { field: "word_list", .. })
        ));
    }

    #[test]
    fn test_malformed_and_missing_file() {
        assert!(matches!(
            OracleConfig::from_toml_str("rpc_url = ", ConfigOverrides::default()),
            Err(ConfigError::Malformed { .. })
        ));

        let path = std::env::temp_dir().join("wordle_oracle_does_not_exist.toml");
        assert!(matches!(
            OracleConfig::load(Some(&path), ConfigOverrides::default()),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("wordle_oracle_{}.toml", std::process::id()));
        fs::write(&path, format!("{}rpc_timeout_ms = 5000\n", toml_config())).unwrap();

        let config = OracleConfig::load(Some(&path), ConfigOverrides::default()).unwrap();
        assert_eq!(config.rpc_timeout, Some(Duration::from_secs(5)));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = OracleConfig::from_toml_str(&toml_config(), ConfigOverrides::default()).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(&KEY[2..]));
        assert!(rendered.contains("<redacted>"));
    }
}
