use std::{
    path::PathBuf,
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::http::{
    RetryPolicy,
    DEFAULT_MAX_ATTEMPTS,
};
use crate::persistence::{
    get_data_file_path,
    load_json_or_default,
};

pub const CONFIG_FILE: &str = "config.json";

/// Application settings. Read from `config.json` in the app data directory,
/// then overridden by `KOSAKATA_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub vocabulary_root: PathBuf,
    pub bind: String,
    pub api_url: String,
    pub model: String,
    pub max_attempts: usize,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub log_json: bool,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vocabulary_root: PathBuf::from("vocabulary"),
            bind: "127.0.0.1:3001".to_string(),
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-3-haiku-20240307".to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: 2000,
            request_timeout_secs: 120,
            log_json: false,
            api_key: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let mut config: AppConfig = load_json_or_default(&Self::path());
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    pub fn path() -> PathBuf {
        get_data_file_path(CONFIG_FILE)
    }

    /// Applies overrides from `lookup` (the process environment in `load`).
    /// Values that fail to parse are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(root) = non_empty("KOSAKATA_VOCAB_ROOT") {
            self.vocabulary_root = PathBuf::from(root);
        }
        if let Some(bind) = non_empty("KOSAKATA_BIND") {
            self.bind = bind;
        }
        if let Some(url) = non_empty("KOSAKATA_API_URL") {
            self.api_url = url;
        }
        if let Some(model) = non_empty("KOSAKATA_MODEL") {
            self.model = model;
        }
        if let Some(attempts) =
            non_empty("KOSAKATA_MAX_ATTEMPTS").and_then(|v| v.trim().parse::<usize>().ok())
        {
            self.max_attempts = attempts.max(1);
        }
        if let Some(log_json) = non_empty("KOSAKATA_LOG_JSON") {
            match log_json.as_str() {
                "1" | "true" | "TRUE" | "yes" | "YES" => self.log_json = true,
                "0" | "false" | "FALSE" | "no" | "NO" => self.log_json = false,
                _ => {}
            }
        }
        if let Some(key) = non_empty("KOSAKATA_API_KEY").or_else(|| non_empty("ANTHROPIC_API_KEY")) {
            self.api_key = Some(key);
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
