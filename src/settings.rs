use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "MURPHY";
const FALLBACK_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub model: String,
    pub api_base: String,
    pub api_key: Option<String>,
    pub db_path: String,
    pub fun_meter: u8,
    pub history_limit: usize,
}

impl Settings {
    /// Defaults overlaid by `MURPHY_*` variables from the process environment.
    pub fn load() -> Result<Self> {
        let mut settings = Self::build(Environment::with_prefix(ENV_PREFIX))?;
        if settings.api_key.is_none() {
            settings.api_key = std::env::var(FALLBACK_KEY_VAR).ok();
        }
        Ok(settings)
    }

    fn build(env: Environment) -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("model", "gemini-1.5-flash-latest")?
            .set_default("api_base", "https://generativelanguage.googleapis.com/v1beta")?
            .set_default("db_path", "data/history.sqlite")?
            .set_default("fun_meter", 50)?
            .set_default("history_limit", 20)?
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        if settings.fun_meter > 100 {
            bail!("fun_meter must be 0-100, got {}", settings.fun_meter);
        }
        if settings.history_limit < 1 {
            bail!("history_limit must be at least 1");
        }
        Ok(settings)
    }

    #[cfg(test)]
    fn from_map(vars: &[(&str, &str)]) -> Result<Self> {
        let map: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::build(Environment::with_prefix(ENV_PREFIX).source(Some(map)))
    }

    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Ok(key),
            None => bail!("No API key: set MURPHY_API_KEY or {}", FALLBACK_KEY_VAR),
        }
    }
}
