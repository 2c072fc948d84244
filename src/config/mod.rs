pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::{AnalysisConfig, MonitoringConfig};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "tow-dashboard")]
#[command(about = "Intervention time dashboards for towing service records")]
pub struct CliConfig {
    /// JSON document with `fields` and `records`
    #[arg(long)]
    pub input: Option<String>,

    /// Directory the SVG dashboards are written to
    #[arg(long)]
    pub output_path: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入 TOML 配置 (若有指定)，再套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(input) = &self.input {
            config.source.input_path = input.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.report.output_path = output_path.clone();
        }
        if self.monitor || self.json_logs {
            let monitoring = config.monitoring.get_or_insert_with(MonitoringConfig::default);
            monitoring.enabled |= self.monitor;
            monitoring.json_logs |= self.json_logs;
        }

        Ok(config)
    }
}
