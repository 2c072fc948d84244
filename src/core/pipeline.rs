use crate::core::{calendar, interval, loader, normalize};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::Table;
use crate::report::{render_intervention_report, render_weekly_report};
use crate::utils::error::{EtlError, Result};

/// Load → normalize → intervals → calendar, then the two dashboards.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    fn extract(&self) -> Result<Table> {
        tracing::debug!("Reading records from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path())?;
        let table = loader::load_table(&bytes)?;

        tracing::debug!(
            "Loaded {} records with {} columns",
            table.len(),
            table.columns().len()
        );
        Ok(table)
    }

    fn transform(&self, table: Table) -> Result<Table> {
        let columns = self.config.columns();

        // 標籤清理
        let table = normalize::normalize_labels(table, columns, self.config.label_rules())?;
        tracing::debug!("Labels normalized ({} rules)", self.config.label_rules().len());

        // 計算介入時間並過濾
        let table = interval::compute_intervals(table, columns, self.config.interval())?;
        if table.is_empty() {
            return Err(EtlError::empty("the intervention time filter"));
        }

        // 週次欄位
        let table = calendar::add_calendar_columns(table, &columns.incident_date)?;
        tracing::debug!(
            "Transformed table: {} records, {} columns",
            table.len(),
            table.columns().len()
        );
        Ok(table)
    }

    fn load(&self, table: &Table) -> Result<Vec<String>> {
        let report = self.config.report();

        let intervention = render_intervention_report(table, self.config.columns(), report)?;
        let weekly = render_weekly_report(table, report)?;

        let mut written = Vec::with_capacity(2);
        for (filename, document) in [
            (&report.intervention_filename, intervention),
            (&report.weekly_filename, weekly),
        ] {
            tracing::debug!("Writing {} ({} bytes)", filename, document.len());
            written.push(self.storage.write_file(filename, document.as_bytes())?);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::AnalysisConfig;
    use crate::domain::model::{Cell, DURATION_MINUTES, YEAR_WEEK};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockStorage {
        files: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let storage = Self::default();
            storage
                .files
                .borrow_mut()
                .insert(path.to_string(), data.as_bytes().to_vec());
            storage
        }

        fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.borrow().get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files.borrow().get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            self.files.borrow_mut().insert(path.to_string(), data.to_vec());
            Ok(format!("mock/{}", path))
        }
    }

    const DATA: &str = r#"{
        "fields": [
            {"id": "_id"}, {"id": "TARIH"}, {"id": "BILDIRIM_SAATI"}, {"id": "MUDAHALE_SAATI"},
            {"id": "ARAC_DURUMU"}, {"id": "HAVA_DURUMU"}, {"id": "ILCE"}
        ],
        "records": [
            [1, "2024-01-10", "10:00:00", "10:15:30", "ARIZALI", "AÇIK KAPALI", "KADIKÖY"],
            [2, "2024-01-10", "23:50:00", "00:10:00", "KAZALI", "YAĞMURLU", "ÜSKÜDAR"],
            [3, "2024-01-16", "08:00:00", "08:45:00", "Hasarlı", "AÇIK", "ÜSKÜDAR"]
        ]
    }"#;

    fn pipeline(data: &str) -> ReportPipeline<MockStorage, AnalysisConfig> {
        ReportPipeline::new(MockStorage::with_file("data.json", data), AnalysisConfig::default())
    }

    #[test]
    fn test_extract_reads_configured_input() {
        let table = pipeline(DATA).extract().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns().len(), 7);
    }

    #[test]
    fn test_extract_missing_file_is_io_error() {
        let p = ReportPipeline::new(MockStorage::default(), AnalysisConfig::default());
        assert!(matches!(p.extract(), Err(EtlError::IoError(_))));
    }

    #[test]
    fn test_transform_end_to_end() {
        let p = pipeline(DATA);
        let table = p.transform(p.extract().unwrap()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns().len(), 7 + 3 + 4);

        let status: Vec<String> = table.column("ARAC_DURUMU").unwrap().map(|c| c.to_string()).collect();
        assert_eq!(status, vec!["Arızalı", "Kazalı"]);
        let weather: Vec<String> = table.column("HAVA_DURUMU").unwrap().map(|c| c.to_string()).collect();
        assert_eq!(weather, vec!["Açık KAPALI", "Açık"]);

        let minutes: Vec<f64> = table.column(DURATION_MINUTES).unwrap().filter_map(Cell::as_f64).collect();
        assert_eq!(minutes, vec![15.5, 45.0]);
        let weeks: Vec<String> = table.column(YEAR_WEEK).unwrap().map(|c| c.to_string()).collect();
        assert_eq!(weeks, vec!["2024-W02", "2024-W03"]);
    }

    #[test]
    fn test_transform_all_rows_filtered_is_empty_result() {
        let data = r#"{
            "fields": [{"id": "TARIH"}, {"id": "BILDIRIM_SAATI"}, {"id": "MUDAHALE_SAATI"},
                       {"id": "ARAC_DURUMU"}, {"id": "HAVA_DURUMU"}, {"id": "ILCE"}],
            "records": [["2024-01-10", "23:50:00", "00:10:00", "KAZALI", "AÇIK", "ŞİŞLİ"]]
        }"#;
        let p = pipeline(data);
        let result = p.transform(p.extract().unwrap());
        assert!(matches!(result, Err(EtlError::EmptyResultError { .. })));
    }

    #[test]
    fn test_load_writes_both_reports() {
        let p = pipeline(DATA);
        let table = p.transform(p.extract().unwrap()).unwrap();

        let written = p.load(&table).unwrap();

        assert_eq!(
            written,
            vec![
                "mock/intervention_time_analysis.svg".to_string(),
                "mock/weekly_analysis.svg".to_string()
            ]
        );
        let weekly = p.storage.get_file("weekly_analysis.svg").unwrap();
        assert!(String::from_utf8(weekly).unwrap().contains("2024-W03"));
    }
}
