use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mobsf-scan",
    version,
    about = "Upload an app package to MobSF, run static and/or dynamic analysis, and fetch the JSON and PDF reports"
)]
pub struct Cli {
    #[arg(help = "Path to the app package to scan")]
    pub file: PathBuf,
    #[arg(long, help = "API key for the MobSF REST API, sent as the Authorization header")]
    pub api_key: String,
    #[arg(long, help = "Base URL of the MobSF REST API, e.g. http://localhost:8000/api/v1")]
    pub api_url: String,
    #[arg(long, value_enum, default_value_t = AnalysisType::Both, help = "Type of analysis to perform")]
    pub analysis_type: AnalysisType,
    #[arg(
        long,
        help = "Directory for mob_sf_report.json and mob_sf_report.pdf [default: <file dir>/output]"
    )]
    pub output_dir: Option<PathBuf>,
    #[arg(short, long, help = "Log request details to stderr")]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisType {
    Static,
    Dynamic,
    Both,
}

impl AnalysisType {
    pub fn includes_static(self) -> bool {
        matches!(self, AnalysisType::Static | AnalysisType::Both)
    }

    pub fn includes_dynamic(self) -> bool {
        matches!(self, AnalysisType::Dynamic | AnalysisType::Both)
    }
}
