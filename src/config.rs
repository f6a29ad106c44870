// Run configuration: built once from the parsed command line and then
// passed by reference to the client and the pipeline.

use crate::cli::{AnalysisType, Cli};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Name of the directory created next to the input file when no
/// `--output-dir` is given.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "output";

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub file: PathBuf,
    /// Base URL without a trailing slash.
    pub api_url: String,
    pub api_key: String,
    pub output_dir: PathBuf,
    pub analysis_type: AnalysisType,
}

impl ScanConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(&cli.api_url)?;
        let api_key = cli.api_key.as_str();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let output_dir = cli
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&cli.file));

        Ok(ScanConfig {
            file: cli.file.clone(),
            api_url,
            api_key: api_key.to_string(),
            output_dir,
            analysis_type: cli.analysis_type,
        })
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ConfigError::MissingApiUrl);
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidApiUrl(url.to_string()));
    }
    Ok(url.to_string())
}

/// `<dir of file>/output`, or `./output` for a bare file name.
pub fn default_output_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(DEFAULT_OUTPUT_DIR_NAME),
        _ => PathBuf::from(DEFAULT_OUTPUT_DIR_NAME),
    }
}
