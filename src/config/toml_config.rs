use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub source: SourceConfig,
    pub columns: ColumnConfig,
    pub normalization: NormalizationConfig,
    pub interval: IntervalConfig,
    pub report: ReportConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub input_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input_path: "data.json".to_string(),
        }
    }
}

/// Source column identifiers consumed by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub vehicle_status: String,
    pub weather: String,
    pub incident_date: String,
    pub notification_time: String,
    pub intervention_time: String,
    pub district: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            vehicle_status: "ARAC_DURUMU".to_string(),
            weather: "HAVA_DURUMU".to_string(),
            incident_date: "TARIH".to_string(),
            notification_time: "BILDIRIM_SAATI".to_string(),
            intervention_time: "MUDAHALE_SAATI".to_string(),
            district: "ILCE".to_string(),
        }
    }
}

impl ColumnConfig {
    /// 將邏輯欄位名稱 (例如 "weather") 對應到實際的欄位識別碼
    pub fn resolve(&self, logical: &str) -> Option<&str> {
        match logical {
            "vehicle_status" => Some(self.vehicle_status.as_str()),
            "weather" => Some(self.weather.as_str()),
            "incident_date" => Some(self.incident_date.as_str()),
            "notification_time" => Some(self.notification_time.as_str()),
            "intervention_time" => Some(self.intervention_time.as_str()),
            "district" => Some(self.district.as_str()),
            _ => None,
        }
    }

    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("columns.vehicle_status", self.vehicle_status.as_str()),
            ("columns.weather", self.weather.as_str()),
            ("columns.incident_date", self.incident_date.as_str()),
            ("columns.notification_time", self.notification_time.as_str()),
            ("columns.intervention_time", self.intervention_time.as_str()),
            ("columns.district", self.district.as_str()),
        ]
    }
}

/// One substring rewrite. `column` names a logical column, see
/// [`ColumnConfig::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRule {
    pub column: String,
    pub from: String,
    pub to: String,
}

impl LabelRule {
    pub fn new(column: &str, from: &str, to: &str) -> Self {
        Self {
            column: column.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub rules: Vec<LabelRule>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                LabelRule::new("vehicle_status", "ARIZALI", "Arızalı"),
                LabelRule::new("vehicle_status", "KAZALI", "Kazalı"),
                LabelRule::new("vehicle_status", "Hasarlı", "Kazalı"),
                LabelRule::new("weather", "AÇIK", "Açık"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub min_minutes: f64,
    pub max_minutes: f64,
    pub time_format: String,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            min_minutes: 0.0,
            max_minutes: 300.0,
            time_format: "%H:%M:%S".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: String,
    pub histogram_bins: usize,
    pub moving_average_windows: Vec<usize>,
    pub intervention_filename: String,
    pub weekly_filename: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            histogram_bins: 30,
            moving_average_windows: vec![3, 5],
            intervention_filename: "intervention_time_analysis.svg".to_string(),
            weekly_filename: "weekly_analysis.svg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: bool,
}

impl AnalysisConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.json_logs).unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("source.input_path", &self.source.input_path)?;
        validation::validate_path("report.output_path", &self.report.output_path)?;

        let entries = self.columns.entries();
        for (field, name) in entries {
            validation::validate_non_empty_string(field, name)?;
        }
        let names: Vec<&str> = entries.iter().map(|(_, name)| *name).collect();
        validation::validate_unique("columns", &names)?;

        for (i, rule) in self.normalization.rules.iter().enumerate() {
            let field = format!("normalization.rules[{}]", i);
            if self.columns.resolve(&rule.column).is_none() {
                return Err(EtlError::InvalidConfigValueError {
                    field: format!("{}.column", field),
                    value: rule.column.clone(),
                    reason: "Unknown column. Valid columns: vehicle_status, weather, incident_date, notification_time, intervention_time, district".to_string(),
                });
            }
            validation::validate_non_empty_string(&format!("{}.from", field), &rule.from)?;
        }

        if !self.interval.min_minutes.is_finite() || !self.interval.max_minutes.is_finite() {
            return Err(EtlError::InvalidConfigValueError {
                field: "interval".to_string(),
                value: format!("{}..{}", self.interval.min_minutes, self.interval.max_minutes),
                reason: "Bounds must be finite numbers".to_string(),
            });
        }
        if self.interval.min_minutes > self.interval.max_minutes {
            return Err(EtlError::InvalidConfigValueError {
                field: "interval.min_minutes".to_string(),
                value: self.interval.min_minutes.to_string(),
                reason: format!(
                    "Must not exceed interval.max_minutes ({})",
                    self.interval.max_minutes
                ),
            });
        }
        validation::validate_non_empty_string("interval.time_format", &self.interval.time_format)?;

        validation::validate_positive_number("report.histogram_bins", self.report.histogram_bins, 1)?;
        for window in &self.report.moving_average_windows {
            validation::validate_positive_number("report.moving_average_windows", *window, 1)?;
        }
        validation::validate_file_extensions(
            "report.filenames",
            &[
                self.report.intervention_filename.clone(),
                self.report.weekly_filename.clone(),
            ],
            &["svg"],
        )?;

        Ok(())
    }
}

impl ConfigProvider for AnalysisConfig {
    fn input_path(&self) -> &str {
        &self.source.input_path
    }

    fn output_path(&self) -> &str {
        &self.report.output_path
    }

    fn columns(&self) -> &ColumnConfig {
        &self.columns
    }

    fn label_rules(&self) -> &[LabelRule] {
        &self.normalization.rules
    }

    fn interval(&self) -> &IntervalConfig {
        &self.interval
    }

    fn report(&self) -> &ReportConfig {
        &self.report
    }
}

impl Validate for AnalysisConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
