use crate::config::toml_config::{ColumnConfig, IntervalConfig};
use crate::domain::model::{
    Cell, Table, DURATION_MINUTES, INTERVENTION_DATETIME, NOTIFICATION_DATETIME,
};
use crate::utils::error::{EtlError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parses an incident date, keeping only the calendar date of timestamp
/// forms.
pub fn parse_incident_date(value: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    let value = value.trim();
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(err) => DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(|ts| ts.date())
            .ok_or(err),
    }
}

/// Minutes from notification to intervention, both taken on the incident
/// date. An intervention clock time earlier than the notification yields a
/// negative duration; there is no midnight rollover. Sub-second parts are
/// kept to the nanosecond so the bound filter sees the exact value.
pub fn duration_minutes(notification: NaiveDateTime, intervention: NaiveDateTime) -> f64 {
    let delta = intervention - notification;
    (delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9) / 60.0
}

fn parse_error(column: &str, row: usize, cell: &Cell, reason: impl ToString) -> EtlError {
    EtlError::ParseError {
        column: column.to_string(),
        row,
        value: cell.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_time(column: &str, row: usize, cell: &Cell, format: &str) -> Result<NaiveTime> {
    let text = cell
        .as_text()
        .ok_or_else(|| parse_error(column, row, cell, "expected a time-of-day string"))?;
    NaiveTime::parse_from_str(text.trim(), format).map_err(|e| parse_error(column, row, cell, e))
}

/// Converts the incident date column to dates, appends the notification and
/// intervention timestamps plus the duration in minutes, and drops rows
/// whose duration falls outside `[min_minutes, max_minutes]`.
///
/// A single unparsable value fails the whole batch.
pub fn compute_intervals(table: Table, columns: &ColumnConfig, config: &IntervalConfig) -> Result<Table> {
    let date_column = columns.incident_date.as_str();
    let table = table.map_column(date_column, |row, cell| match cell {
        Cell::Date(_) => Ok(cell),
        Cell::Text(ref text) => parse_incident_date(text)
            .map(Cell::Date)
            .map_err(|e| parse_error(date_column, row, &cell, e)),
        _ => Err(parse_error(date_column, row, &cell, "expected a date string")),
    })?;

    let date_idx = table.column_index(date_column)?;
    let notification_idx = table.column_index(&columns.notification_time)?;
    let intervention_idx = table.column_index(&columns.intervention_time)?;

    let mut notified = Vec::with_capacity(table.len());
    let mut intervened = Vec::with_capacity(table.len());
    let mut durations = Vec::with_capacity(table.len());

    for (row, cells) in table.rows().iter().enumerate() {
        let date = cells[date_idx]
            .as_date()
            .ok_or_else(|| parse_error(date_column, row, &cells[date_idx], "expected a date"))?;
        let notification = parse_time(
            &columns.notification_time,
            row,
            &cells[notification_idx],
            &config.time_format,
        )?;
        let intervention = parse_time(
            &columns.intervention_time,
            row,
            &cells[intervention_idx],
            &config.time_format,
        )?;

        let notification_at = date.and_time(notification);
        let intervention_at = date.and_time(intervention);

        notified.push(Cell::Timestamp(notification_at));
        intervened.push(Cell::Timestamp(intervention_at));
        durations.push(Cell::Float(duration_minutes(notification_at, intervention_at)));
    }

    let before = table.len();
    let table = table
        .with_column(NOTIFICATION_DATETIME, notified)?
        .with_column(INTERVENTION_DATETIME, intervened)?
        .with_column(DURATION_MINUTES, durations)?;

    let duration_idx = table.column_index(DURATION_MINUTES)?;
    let (min, max) = (config.min_minutes, config.max_minutes);
    let table = table.retain_rows(|row| {
        row[duration_idx]
            .as_f64()
            .map(|d| d >= min && d <= max)
            .unwrap_or(false)
    });

    let dropped = before - table.len();
    if dropped > 0 {
        tracing::info!(
            "Dropped {} of {} records with intervention time outside [{}, {}] minutes",
            dropped,
            before,
            min,
            max
        );
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn table(rows: &[(&str, &str, &str)]) -> Table {
        Table::new(
            vec![
                "TARIH".to_string(),
                "BILDIRIM_SAATI".to_string(),
                "MUDAHALE_SAATI".to_string(),
            ],
            rows.iter()
                .map(|(d, n, i)| vec![text(d), text(n), text(i)])
                .collect(),
        )
        .unwrap()
    }

    fn run(t: Table) -> Result<Table> {
        compute_intervals(t, &ColumnConfig::default(), &IntervalConfig::default())
    }

    fn durations(t: &Table) -> Vec<f64> {
        t.column(DURATION_MINUTES)
            .unwrap()
            .filter_map(Cell::as_f64)
            .collect()
    }

    #[test]
    fn test_fractional_minutes() {
        let result = run(table(&[("2024-01-10", "10:00:00", "10:15:30")])).unwrap();

        assert_eq!(durations(&result), vec![15.5]);
        assert_eq!(
            result.columns(),
            &[
                "TARIH",
                "BILDIRIM_SAATI",
                "MUDAHALE_SAATI",
                NOTIFICATION_DATETIME,
                INTERVENTION_DATETIME,
                DURATION_MINUTES
            ]
        );
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(result.rows()[0][0], Cell::Date(date));
        assert_eq!(
            result.rows()[0][3],
            Cell::Timestamp(date.and_hms_opt(10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let result = run(table(&[
            ("2024-01-10", "10:00:00", "10:00:00"),
            ("2024-01-10", "08:00:00", "13:00:00"),
            ("2024-01-10", "08:00:00", "13:00:01"),
            ("2024-01-10", "10:00:01", "10:00:00"),
        ]))
        .unwrap();

        assert_eq!(durations(&result), vec![0.0, 300.0]);
    }

    #[test]
    fn test_bounds_just_outside_are_dropped() {
        let config = IntervalConfig {
            time_format: "%H:%M:%S%.f".to_string(),
            ..IntervalConfig::default()
        };
        let result = compute_intervals(
            table(&[
                ("2024-01-10", "10:00:00", "10:00:00"),
                ("2024-01-10", "10:00:00", "15:00:00"),
                ("2024-01-10", "10:00:00", "15:00:00.0005"),
                ("2024-01-10", "10:00:00.0005", "10:00:00"),
                ("2024-01-10", "10:00:00", "15:00:00.000001"),
                ("2024-01-10", "10:00:00.250", "10:00:00.500"),
            ]),
            &ColumnConfig::default(),
            &config,
        )
        .unwrap();

        let kept = durations(&result);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0], 0.0);
        assert_eq!(kept[1], 300.0);
        assert!((kept[2] - 0.25 / 60.0).abs() < 1e-12);
        assert!(kept.iter().all(|d| (0.0..=300.0).contains(d)));
    }

    #[test]
    fn test_duration_keeps_sub_millisecond_precision() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let at = |h, m, s, micro| date.and_hms_micro_opt(h, m, s, micro).unwrap();

        assert!(duration_minutes(at(10, 0, 0, 0), at(15, 0, 0, 500)) > 300.0);
        assert!(duration_minutes(at(10, 0, 0, 500), at(10, 0, 0, 0)) < 0.0);
        assert_eq!(duration_minutes(at(10, 0, 0, 0), at(10, 15, 30, 0)), 15.5);
    }

    #[test]
    fn test_no_midnight_rollover() {
        let result = run(table(&[
            ("2024-01-10", "23:50:00", "00:10:00"),
            ("2024-01-10", "09:00:00", "09:30:00"),
        ]))
        .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(durations(&result), vec![30.0]);

        let notified = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(23, 50, 0)
            .unwrap();
        let intervened = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(0, 10, 0)
            .unwrap();
        assert_eq!(duration_minutes(notified, intervened), -1420.0);
    }

    #[test]
    fn test_row_count_never_grows() {
        let input = table(&[
            ("2024-01-10", "10:00:00", "10:05:00"),
            ("2024-01-11", "10:00:00", "18:00:00"),
            ("2024-01-12", "12:00:00", "11:00:00"),
        ]);
        let before = input.len();
        let result = run(input).unwrap();
        assert!(result.len() <= before);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_bad_time_is_parse_error() {
        let err = run(table(&[
            ("2024-01-10", "10:00:00", "10:05:00"),
            ("2024-01-10", "10:00", "10:05:00"),
        ]))
        .unwrap_err();

        match err {
            EtlError::ParseError { column, row, value, .. } => {
                assert_eq!(column, "BILDIRIM_SAATI");
                assert_eq!(row, 1);
                assert_eq!(value, "10:00");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_null_time_is_parse_error() {
        let t = Table::new(
            vec![
                "TARIH".to_string(),
                "BILDIRIM_SAATI".to_string(),
                "MUDAHALE_SAATI".to_string(),
            ],
            vec![vec![text("2024-01-10"), text("10:00:00"), Cell::Null]],
        )
        .unwrap();
        assert!(matches!(run(t), Err(EtlError::ParseError { .. })));
    }

    #[test]
    fn test_bad_date_is_parse_error() {
        let err = run(table(&[("10/01/2024", "10:00:00", "10:05:00")])).unwrap_err();
        assert!(matches!(err, EtlError::ParseError { ref column, .. } if column == "TARIH"));
    }

    #[test]
    fn test_incident_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2023, 2, 3).unwrap();
        assert_eq!(parse_incident_date("2023-02-03").unwrap(), expected);
        assert_eq!(parse_incident_date("2023-02-03T00:00:00").unwrap(), expected);
        assert_eq!(parse_incident_date("2023-02-03 14:30:00.250").unwrap(), expected);
        assert!(parse_incident_date("03.02.2023").is_err());
    }

    #[test]
    fn test_custom_bounds() {
        let config = IntervalConfig {
            min_minutes: 10.0,
            max_minutes: 20.0,
            ..IntervalConfig::default()
        };
        let result = compute_intervals(
            table(&[
                ("2024-01-10", "10:00:00", "10:05:00"),
                ("2024-01-10", "10:00:00", "10:15:00"),
                ("2024-01-10", "10:00:00", "10:25:00"),
            ]),
            &ColumnConfig::default(),
            &config,
        )
        .unwrap();
        assert_eq!(durations(&result), vec![15.0]);
    }
}
