// common_utils/src/lib.rs

use serde::Deserialize;
use std::str::FromStr;
use tracing::{info, warn};

pub const DEFAULT_LLM_URL: &str = "http://localhost:8282";
pub const DEFAULT_MODEL: &str = "atlas-ai21-jamba-1.5-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_LLM_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8383";

// One config struct for the whole gate
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GateConfig {
    pub llm_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub llm_timeout_ms: u64,
    pub listen_addr: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        load_default_config()
    }
}

impl GateConfig {
    /// Defaults, overridden by any `MEMGATE_*` variables present in the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GateConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = load_default_config();

        if let Some(url) = lookup("MEMGATE_LLM_URL") {
            config.llm_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("MEMGATE_MODEL") {
            config.model = model;
        }
        if let Some(addr) = lookup("MEMGATE_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        override_parsed(&lookup, "MEMGATE_TEMPERATURE", &mut config.temperature);
        override_parsed(&lookup, "MEMGATE_MAX_TOKENS", &mut config.max_tokens);
        override_parsed(&lookup, "MEMGATE_LLM_TIMEOUT_MS", &mut config.llm_timeout_ms);

        info!(llm_url = %config.llm_url, model = %config.model, "[Config] Gate configuration loaded");
        config
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.llm_url)
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else { return };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => warn!(key, value = %raw, "[Config] Ignoring unparsable override, keeping default"),
    }
}

// Defaults point at the local completion service
pub fn load_default_config() -> GateConfig {
    GateConfig {
        llm_url: DEFAULT_LLM_URL.to_string(),
        model: DEFAULT_MODEL.to_string(),
        temperature: DEFAULT_TEMPERATURE,
        max_tokens: DEFAULT_MAX_TOKENS,
        llm_timeout_ms: DEFAULT_LLM_TIMEOUT_MS,
        listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
    }
}
