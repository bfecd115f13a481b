// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub artifact_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub parallel_workers: usize,
    pub capability_timeout_secs: u64,
    pub max_file_size_mb: usize,
    pub skip_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub vision_model: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub page_size: usize,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TALENT_SCAN")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: PathBuf::from("data/records"),
                artifact_dir: PathBuf::from("data/artifacts"),
            },
            pipeline: PipelineConfig {
                parallel_workers: 4,
                capability_timeout_secs: 120,
                max_file_size_mb: 20,
                skip_patterns: vec![".git/*".to_string(), "*.zip".to_string()],
            },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.groq.com/openai/v1".to_string(),
                chat_model: "openai/gpt-oss-120b".to_string(),
                vision_model: "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            },
            search: SearchConfig { page_size: 20 },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.parallel_workers == 0 {
            return Err(PipelineError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.capability_timeout_secs == 0 {
            return Err(PipelineError::Config(
                "capability_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.search.page_size == 0 {
            return Err(PipelineError::Config(
                "page_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.parallel_workers, 4);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default_config();
        config.pipeline.parallel_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = Config::default_config();
        config.search.page_size = 0;
        assert!(config.validate().is_err());
    }
}
