pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::AnalysisConfig};
pub use crate::core::{etl::EtlEngine, pipeline::ReportPipeline};
pub use domain::model::{Cell, Table};
pub use utils::error::{EtlError, Result};
