// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{CrewError, Result};
use crate::llm::Provider;
use crate::validator::{ChapterBounds, SplitMode};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "BOOK_CREW";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
    pub validation: ValidationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// `provider/model`, e.g. `gemini/gemini-1.5-flash` or `groq/llama-3.3-70b-versatile`.
    pub name: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub results: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub topic: String,
    pub idea: Option<String>,
    pub max_validation_retries: usize,
    pub crew_file: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_chapters: usize,
    pub max_chapters: usize,
    pub min_words: usize,
    pub max_words: usize,
    pub split_mode: SplitMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub summary: bool,
    pub pretty: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini/gemini-1.5-flash".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            results: 5,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topic: "Frontend Development Masterclass for Developers".to_string(),
            idea: Some("Mastering Landing Pages for Frontend Developers".to_string()),
            max_validation_retries: 3,
            crew_file: None,
            verbose: true,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let bounds = ChapterBounds::default();
        Self {
            min_chapters: bounds.min_chapters,
            max_chapters: bounds.max_chapters,
            min_words: bounds.min_words,
            max_words: bounds.max_words,
            split_mode: SplitMode::default(),
        }
    }
}

impl ValidationConfig {
    pub fn bounds(&self) -> ChapterBounds {
        ChapterBounds::new(
            self.min_chapters,
            self.max_chapters,
            self.min_words,
            self.max_words,
        )
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output/book.md"),
            summary: false,
            pretty: true,
        }
    }
}

impl Config {
    /// An explicit path must exist; without one the default file is optional
    /// and `BOOK_CREW__*` variables still apply on top of the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_fallback(path, Path::new(DEFAULT_CONFIG_PATH))
    }

    fn load_with_fallback(path: Option<&Path>, fallback: &Path) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(fallback).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| CrewError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| CrewError::Config(e.to_string()))?;

        config.apply_legacy_env();
        config.validate()?;
        Ok(config)
    }

    /// `MODEL`, `GEMINI_API_KEY` and `SERPER_API_KEY` (plus the provider's own
    /// key variable) fill in whatever the layered sources left unset.
    fn apply_legacy_env(&mut self) {
        let prefixed_model = format!("{}__MODEL__NAME", ENV_PREFIX);
        if env::var(&prefixed_model).is_err()
            && let Ok(model) = env::var("MODEL")
            && !model.trim().is_empty()
        {
            self.model.name = model.trim().to_string();
        }

        if self.model.api_key.is_none() {
            let provider = Provider::from_model(&self.model.name);
            self.model.api_key = env::var(provider.api_key_env())
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        if self.search.api_key.is_none() {
            self.search.api_key = env::var("SERPER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.name.trim().is_empty() {
            return Err(CrewError::Config("model.name must not be empty".to_string()));
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(CrewError::Config(format!(
                "model.temperature must be within 0.0-2.0, got {}",
                self.model.temperature
            )));
        }

        if self.model.timeout_secs == 0 {
            return Err(CrewError::Config(
                "model.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.search.results == 0 {
            return Err(CrewError::Config(
                "search.results must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.topic.trim().is_empty() {
            return Err(CrewError::Config("pipeline.topic must not be empty".to_string()));
        }

        self.validation.bounds().check()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.validation.bounds(), ChapterBounds::default());
        assert_eq!(config.pipeline.max_validation_retries, 3);
        assert_eq!(config.validation.split_mode, SplitMode::Substring);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("book.toml");
        fs::write(
            &path,
            "[pipeline]\ntopic = \"Rust for Data Engineers\"\n\n[validation]\nmin_chapters = 4\nmax_chapters = 5\nsplit_mode = \"line_anchored\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.pipeline.topic, "Rust for Data Engineers");
        assert_eq!(config.validation.min_chapters, 4);
        assert_eq!(config.validation.max_chapters, 5);
        assert_eq!(config.validation.min_words, 300);
        assert_eq!(config.validation.split_mode, SplitMode::LineAnchored);
        assert_eq!(config.output.path, PathBuf::from("output/book.md"));
    }

    #[test]
    fn test_missing_default_file_keeps_env_layer() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("default.toml");

        // SAFETY: no other test reads or writes this variable.
        unsafe { env::set_var("BOOK_CREW__SEARCH__RESULTS", "7") };
        let loaded = Config::load_with_fallback(None, &missing);
        unsafe { env::remove_var("BOOK_CREW__SEARCH__RESULTS") };

        let config = loaded.unwrap();
        assert_eq!(config.search.results, 7);
        assert_eq!(config.validation.bounds(), ChapterBounds::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut config = Config::default();
        config.validation.min_words = 500;
        config.validation.max_words = 400;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_topic() {
        let mut config = Config::default();
        config.pipeline.topic = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_temperature_out_of_range() {
        let mut config = Config::default();
        config.model.temperature = 3.5;
        assert!(config.validate().is_err());
    }
}
