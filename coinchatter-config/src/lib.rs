//! Loader for coinchatter configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first: inline YAML snippets and files in the order
//! they were attached, then `COINCHATTER__<SECTION>__<KEY>` environment
//! variables. String values may reference `${VAR}` placeholders, expanded after
//! merging. Every field has a default, so an empty configuration is valid.
use coinchatter_common::LogFormat;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "COINCHATTER";

/// Keys whose environment overrides are taken verbatim, so an all-digit token
/// stays a string instead of going through numeric parsing.
const VERBATIM_ENV_KEYS: &[&str] = &[
    "twitter.auth_token",
    "twitter.base_url",
    "twitter.search_path",
    "collect.language",
    "collect.output_dir",
    "log.dir",
    "log.filter",
];

fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}__{}", key.replace('.', "__").to_ascii_uppercase())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CoinchatterConfig {
    pub twitter: TwitterConfig,
    pub collect: CollectConfig,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub auth_token: Option<String>,
    pub base_url: String,
    pub search_path: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            base_url: "https://api.twitter.com".into(),
            search_path: "2/tweets/search/all".into(),
            page_size: 100,
            timeout_secs: 30,
        }
    }
}

impl TwitterConfig {
    /// The bearer token, unless it is blank or an unresolved `${VAR}` placeholder.
    pub fn bearer_token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.contains("${"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    pub language: String,
    pub max_tweets_per_coin_per_hour: usize,
    pub segment_days: u32,
    pub output_dir: PathBuf,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            language: "en".into(),
            max_tweets_per_coin_per_hour: 100,
            segment_days: 10,
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `text` or `json`; anything else fails to load.
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub filter: String,
    pub stderr: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            filter: "info".into(),
            stderr: true,
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => break,
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate wiring (YAML files + env overrides).
pub struct CoinchatterConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CoinchatterConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinchatterConfigLoader {
    /// ```
    /// use coinchatter_config::CoinchatterConfigLoader;
    ///
    /// let config = CoinchatterConfigLoader::new()
    ///     .with_yaml_str("collect:\n  segment_days: 5")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.collect.segment_days, 5);
    /// assert_eq!(config.collect.max_tweets_per_coin_per_hour, 100);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Layer environment overrides on top, expand `${VAR}` placeholders, and
    /// deserialize into [`CoinchatterConfig`].
    ///
    /// ```
    /// use coinchatter_config::CoinchatterConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_BEARER", "from-env"); }
    ///
    /// let config = CoinchatterConfigLoader::new()
    ///     .with_yaml_str("twitter:\n  auth_token: \"${DOC_BEARER}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.twitter.auth_token.as_deref(), Some("from-env"));
    ///
    /// unsafe { std::env::remove_var("DOC_BEARER"); }
    /// ```
    pub fn load(self) -> Result<CoinchatterConfig, ConfigError> {
        let mut builder = self.builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
        for key in VERBATIM_ENV_KEYS {
            if let Ok(raw) = std::env::var(env_var_name(key)) {
                builder = builder.set_override(*key, raw)?;
            }
        }
        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
