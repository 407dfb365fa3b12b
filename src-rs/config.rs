use std::env;
use std::time::Duration;

use crate::helpers::load_keys;
use crate::llm::{VendorSpec, KNOWN_VENDORS};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// A vendor whose credential was present at startup.
#[derive(Clone, Debug)]
pub struct VendorConfig {
    pub spec: &'static VendorSpec,
    pub api_keys: Vec<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct RouterConfig {
    pub host: String,
    pub port: u16,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// Fixes the default-routing sequence when set.
    pub provider_seed: Option<u64>,
    pub vendors: Vec<VendorConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            provider_seed: None,
            vendors: Vec::new(),
        }
    }
}

impl RouterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let vendors = KNOWN_VENDORS
            .iter()
            .filter_map(|spec| {
                let api_keys = load_keys(&lookup, spec.key_var);
                if api_keys.is_empty() {
                    return None;
                }
                Some(VendorConfig {
                    spec,
                    api_keys,
                    base_url: get(spec.base_url_var).unwrap_or_else(|| spec.default_base_url.to_string()),
                    model: get(spec.model_var).unwrap_or_else(|| spec.default_model.to_string()),
                })
            })
            .collect();

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
            temperature: parse_or(get("LLM_TEMPERATURE"), "LLM_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_or(get("LLM_MAX_TOKENS"), "LLM_MAX_TOKENS", defaults.max_tokens)?,
            timeout: Duration::from_secs(parse_or(
                get("LLM_TIMEOUT_SECS"),
                "LLM_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            provider_seed: get("PROVIDER_SEED")
                .map(|raw| parse_value(&raw, "PROVIDER_SEED"))
                .transpose()?,
            vendors,
        })
    }

    pub fn vendor(&self, name: &str) -> Option<&VendorConfig> {
        self.vendors.iter().find(|v| v.spec.name == name)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, fallback: T) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => parse_value(&raw, key),
        None => Ok(fallback),
    }
}

fn parse_value<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
