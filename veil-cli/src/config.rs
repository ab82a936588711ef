use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use veil_core::model::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT};
use veil_core::{Locale, ModelConfig};
use veil_extract::DEFAULT_MAX_CONCURRENCY;
use veil_ingest::DEFAULT_MAX_CHARS;

use crate::state::ensure_veil_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelSection,
    pub extraction: ExtractionSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    pub locale: Locale,
    pub max_chunk_chars: usize,
    pub max_concurrency: usize,
    /// IANA zone deciding which calendar year year-less dates fall in
    pub timezone: String,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            max_chunk_chars: DEFAULT_MAX_CHARS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timezone: "Asia/Shanghai".to_string(),
        }
    }
}

impl Config {
    /// Assemble the model settings for one run.
    pub fn model_config(&self, credential: String, locale: Locale) -> ModelConfig {
        ModelConfig::new(&self.model.endpoint, credential, &self.model.model, locale)
            .with_temperature(self.model.temperature)
            .with_timeout(Duration::from_secs(self.model.timeout_secs))
    }

    /// Current calendar year in the configured zone.
    pub fn reference_year(&self) -> Result<i32> {
        let tz: Tz = self
            .extraction
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {e}", self.extraction.timezone))?;
        Ok(Utc::now().with_timezone(&tz).year())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_veil_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[model]
model = "gpt-4o-mini"

[extraction]
locale = "en"
"#,
        )
        .unwrap();
        assert_eq!(cfg.model.model, "gpt-4o-mini");
        assert_eq!(cfg.model.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.extraction.locale, Locale::En);
        assert_eq!(cfg.extraction.max_chunk_chars, 8000);
        assert_eq!(cfg.extraction.max_concurrency, 5);
    }

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(s.contains("[model]"));
        assert!(s.contains("[extraction]"));
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.extraction.timezone, "Asia/Shanghai");
        assert_eq!(back.extraction.locale, Locale::Zh);
    }

    #[test]
    fn test_model_config_carries_settings() {
        let mut cfg = Config::default();
        cfg.model.timeout_secs = 30;
        let mc = cfg.model_config("sk-test".to_string(), Locale::En);
        assert_eq!(mc.timeout, Duration::from_secs(30));
        assert_eq!(mc.locale, Locale::En);
        assert!(mc.validate().is_ok());
    }

    #[test]
    fn test_bad_timezone_is_reported() {
        let mut cfg = Config::default();
        cfg.extraction.timezone = "Mars/Olympus".to_string();
        assert!(cfg.reference_year().is_err());
        cfg.extraction.timezone = "America/Chicago".to_string();
        assert!(cfg.reference_year().unwrap() >= 2024);
    }
}
