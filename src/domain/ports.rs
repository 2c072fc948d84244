use crate::config::toml_config::{ColumnConfig, IntervalConfig, LabelRule, ReportConfig};
use crate::domain::model::Table;
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<String>;
}

pub trait ConfigProvider {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn columns(&self) -> &ColumnConfig;
    fn label_rules(&self) -> &[LabelRule];
    fn interval(&self) -> &IntervalConfig;
    fn report(&self) -> &ReportConfig;
}

pub trait Pipeline {
    fn extract(&self) -> Result<Table>;
    fn transform(&self, table: Table) -> Result<Table>;
    /// Renders the reports and returns where they were written.
    fn load(&self, table: &Table) -> Result<Vec<String>>;
}
