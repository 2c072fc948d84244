use crate::core::calendar::WEEKDAY_ORDER;
use crate::domain::model::{Cell, Table, DURATION_MINUTES, WEEKDAY, YEAR_WEEK};
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Linear interpolation between the closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Trailing mean; `None` for the first `window - 1` points.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                None
            } else {
                mean(&values[i + 1 - window..=i])
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over `[min, max]`; the last bin includes `max`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (max - min) / bins as f64;

    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        result[idx].count += 1;
    }
    result
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Box-plot figures with whiskers at the furthest points within 1.5 IQR.
pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    let q1 = quantile(values, 0.25)?;
    let median = quantile(values, 0.5)?;
    let q3 = quantile(values, 0.75)?;
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = values.iter().copied().filter(|v| *v >= low_fence && *v <= high_fence);
    let whisker_low = inside.clone().fold(f64::INFINITY, f64::min);
    let whisker_high = inside.fold(f64::NEG_INFINITY, f64::max);
    let mut outliers: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v < low_fence || *v > high_fence)
        .collect();
    outliers.sort_by(f64::total_cmp);

    Some(BoxSummary {
        q1,
        median,
        q3,
        whisker_low,
        whisker_high,
        outliers,
    })
}

fn group_key(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Null => None,
        other => Some(other.to_string()),
    }
}

/// Duration values of every row, in row order.
pub fn durations(table: &Table) -> Result<Vec<f64>> {
    table
        .column(DURATION_MINUTES)?
        .enumerate()
        .map(|(row, cell)| {
            cell.as_f64().ok_or_else(|| {
                EtlError::format(format!("row {} has no numeric {}", row, DURATION_MINUTES))
            })
        })
        .collect()
}

/// Values of `value` grouped by `key`, sorted by key. Rows with a null key
/// are left out of every group.
pub fn group_values(table: &Table, key: &str, value: &str) -> Result<BTreeMap<String, Vec<f64>>> {
    let key_idx = table.column_index(key)?;
    let value_idx = table.column_index(value)?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        let (Some(k), Some(v)) = (group_key(&row[key_idx]), row[value_idx].as_f64()) else {
            continue;
        };
        groups.entry(k).or_default().push(v);
    }
    Ok(groups)
}

/// Mean of `value` per `key`, ascending by mean (ties by key).
pub fn group_mean(table: &Table, key: &str, value: &str) -> Result<Vec<(String, f64)>> {
    let mut means: Vec<(String, f64)> = group_values(table, key, value)?
        .into_iter()
        .filter_map(|(k, values)| mean(&values).map(|m| (k, m)))
        .collect();
    means.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    Ok(means)
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPoint {
    pub label: String,
    pub mean_minutes: f64,
    pub count: usize,
}

/// One point per year-week label, ordered by the label text.
pub fn weekly_summary(table: &Table) -> Result<Vec<WeeklyPoint>> {
    Ok(group_values(table, YEAR_WEEK, DURATION_MINUTES)?
        .into_iter()
        .filter_map(|(label, values)| {
            mean(&values).map(|mean_minutes| WeeklyPoint {
                label,
                mean_minutes,
                count: values.len(),
            })
        })
        .collect())
}

/// Mean duration per weekday, Monday first; `None` for days without data.
pub fn weekday_means(table: &Table) -> Result<Vec<(&'static str, Option<f64>)>> {
    let groups = group_values(table, WEEKDAY, DURATION_MINUTES)?;
    Ok(WEEKDAY_ORDER
        .iter()
        .map(|name| (*name, groups.get(*name).and_then(|values| mean(values))))
        .collect())
}
