use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const SUPPORTED_LOCALES: &[&str] = &["zh-CN", "en"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_network_enabled")]
    pub network_enabled: bool,
    #[serde(default = "default_cache_generated_lessons")]
    pub cache_generated_lessons: bool,
    #[serde(default = "default_voices")]
    pub voices: Vec<VoiceCommand>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_locale() -> String {
    "zh-CN".to_string()
}
fn default_gemini_model() -> String {
    "gemini-3-flash-preview".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_network_enabled() -> bool {
    true
}
fn default_cache_generated_lessons() -> bool {
    true
}
fn default_voices() -> Vec<VoiceCommand> {
    vec![VoiceCommand {
        program: "espeak-ng".to_string(),
        args: vec![
            "-v".to_string(),
            "pt-pt".to_string(),
            "-s".to_string(),
            "140".to_string(),
        ],
    }]
}
fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            gemini_model: default_gemini_model(),
            api_key_env: default_api_key_env(),
            network_enabled: default_network_enabled(),
            cache_generated_lessons: default_cache_generated_lessons(),
            voices: default_voices(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lusodrill")
            .join("config.toml")
    }

    /// Reset values that would leave the app unusable back to defaults.
    pub fn validate(&mut self) {
        if !SUPPORTED_LOCALES.contains(&self.locale.as_str()) {
            self.locale = default_locale();
        }
        if self.gemini_model.trim().is_empty() {
            self.gemini_model = default_gemini_model();
        }
        if self.api_key_env.trim().is_empty() {
            self.api_key_env = default_api_key_env();
        }
        self.voices.retain(|v| !v.program.trim().is_empty());
        if self.log_filter.trim().is_empty() {
            self.log_filter = default_log_filter();
        }
    }
}
