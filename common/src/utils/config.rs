use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

/// Paragraph prefix considered by the span search when nothing else is configured.
pub const DEFAULT_SPAN_WINDOW: usize = 1000;

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "default_span_window")]
    pub span_window: usize,
    #[serde(default)]
    pub question_fallback: bool,
    #[serde(default)]
    pub max_workers: Option<usize>,
    #[serde(default)]
    pub ordered: bool,
    #[serde(default = "default_progress")]
    pub progress: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            span_window: default_span_window(),
            question_fallback: false,
            max_workers: None,
            ordered: false,
            progress: default_progress(),
        }
    }
}

fn default_span_window() -> usize {
    DEFAULT_SPAN_WINDOW
}

fn default_progress() -> bool {
    true
}

/// Load settings from an optional `preprocess.*` file in the working directory
/// and `PREPROCESS_*` environment variables.
pub fn get_config() -> Result<AppConfig, AppError> {
    let config = Config::builder()
        .add_source(File::with_name("preprocess").required(false))
        .add_source(Environment::with_prefix("PREPROCESS").try_parsing(true))
        .build()?;

    Ok(config.try_deserialize()?)
}

/// Same as [`get_config`] but reads an explicit file, which must exist.
pub fn get_config_from(path: &Path) -> Result<AppConfig, AppError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(Environment::with_prefix("PREPROCESS").try_parsing(true))
        .build()?;

    Ok(config.try_deserialize()?)
}
