use crate::domain::model::{Cell, Table, ISO_WEEK, WEEKDAY, YEAR, YEAR_WEEK};
use crate::utils::error::{EtlError, Result};
use chrono::{Datelike, NaiveDate};

/// Weekday names in display order, Monday first, as `%A` formats them.
pub const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// `"{year}-W{week:02}"`. The year is the calendar year, not the ISO
/// week-year, so 2021-01-01 (ISO week 53 of 2020) is labelled `2021-W53`.
pub fn year_week_label(date: NaiveDate) -> String {
    format!("{}-W{:02}", date.year(), date.iso_week().week())
}

/// Appends year, ISO week, year-week label and weekday name derived from the
/// incident date column, which must already hold parsed dates.
pub fn add_calendar_columns(table: Table, date_column: &str) -> Result<Table> {
    let dates = table
        .column(date_column)?
        .enumerate()
        .map(|(row, cell)| {
            cell.as_date().ok_or_else(|| {
                EtlError::format(format!(
                    "column '{}' row {} holds '{}' instead of a parsed date",
                    date_column, row, cell
                ))
            })
        })
        .collect::<Result<Vec<NaiveDate>>>()?;

    let years = dates.iter().map(|d| Cell::Int(i64::from(d.year()))).collect();
    let weeks = dates
        .iter()
        .map(|d| Cell::Int(i64::from(d.iso_week().week())))
        .collect();
    let labels = dates.iter().map(|d| Cell::Text(year_week_label(*d))).collect();
    let weekdays = dates
        .iter()
        .map(|d| Cell::Text(d.format("%A").to_string()))
        .collect();

    table
        .with_column(YEAR, years)?
        .with_column(ISO_WEEK, weeks)?
        .with_column(YEAR_WEEK, labels)?
        .with_column(WEEKDAY, weekdays)
}
