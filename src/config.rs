use std::collections::BTreeMap;
use std::time::Duration;

use crate::{Result, VecforgeError};

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Environment view: an optional dotenv layer over the process environment.
/// Dotenv entries win so a config file can pin values for local runs.
#[derive(Clone, Default)]
pub struct Env {
    overrides: BTreeMap<String, String>,
}

impl Env {
    pub fn from_dotenv(contents: &str) -> Self {
        Self {
            overrides: contents.lines().filter_map(dotenv_pair).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(key) {
            return Some(value.clone());
        }
        std::env::var(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key))
    }
}

/// One dotenv line to a key/value pair. Comments, blank lines, bare words,
/// empty keys and empty values all yield nothing.
fn dotenv_pair(raw_line: &str) -> Option<(String, String)> {
    let line = raw_line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = unquote(value.trim());
    if key.is_empty() || value.trim().is_empty() {
        return None;
    }

    Some((key.to_string(), value.to_string()))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Per-provider connection settings, resolved once at startup.
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
}

impl ProviderSettings {
    fn resolve(env: &Env, key_names: &[&str], url_names: &[&str]) -> Result<Self> {
        let api_key = env.first_of(key_names).ok_or_else(|| {
            VecforgeError::Config(format!(
                "missing api key: set one of {}",
                key_names.join(", ")
            ))
        })?;
        let base_url = env
            .first_of(url_names)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self { api_key, base_url })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub listen: String,
    pub request_timeout: Duration,
    pub qwen: ProviderSettings,
    pub wanx: ProviderSettings,
}

impl Config {
    /// Resolves the full configuration, failing fast on absent credentials
    /// so a misconfigured server never accepts traffic.
    pub fn from_env(env: &Env) -> Result<Self> {
        let qwen = ProviderSettings::resolve(
            env,
            &["QWEN_API_KEY", "DASHSCOPE_API_KEY"],
            &["QWEN_BASE_URL", "DASHSCOPE_BASE_URL"],
        )?;
        let wanx = ProviderSettings::resolve(
            env,
            &["WANX_API_KEY", "DASHSCOPE_API_KEY"],
            &["WANX_BASE_URL", "DASHSCOPE_BASE_URL"],
        )?;

        let listen = env
            .get("VECFORGE_LISTEN")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());

        let timeout_secs = match env.get("VECFORGE_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                VecforgeError::Config(format!(
                    "invalid VECFORGE_REQUEST_TIMEOUT_SECS: {raw:?} is not a number of seconds"
                ))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            listen,
            request_timeout: Duration::from_secs(timeout_secs),
            qwen,
            wanx,
        })
    }
}
