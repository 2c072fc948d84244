use crate::config::toml_config::ReportConfig;
use crate::core::stats::{moving_average, weekday_means, weekly_summary};
use crate::domain::model::Table;
use crate::report::chart::{self, AxisLabels, Series};
use crate::utils::error::{EtlError, Result};
use plotters::style::{RGBColor, BLUE, GREEN, RED};

pub const TITLE: &str = "Towing Services - Weekly Analysis";

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
const MOVING_AVERAGE_COLORS: [RGBColor; 4] = [RED, GREEN, PURPLE, ORANGE];

/// Show roughly ten week labels whatever the series length.
pub fn tick_step(points: usize) -> usize {
    (points / 10).max(1)
}

/// Weekly mean, weekly count, weekday mean (Monday first) and the moving
/// average trend, as one 2×2 SVG dashboard.
pub fn render_weekly_report(table: &Table, report: &ReportConfig) -> Result<String> {
    let weekly = weekly_summary(table)?;
    if weekly.is_empty() {
        return Err(EtlError::empty("rendering the weekly report"));
    }

    let labels: Vec<String> = weekly.iter().map(|w| w.label.clone()).collect();
    let means: Vec<f64> = weekly.iter().map(|w| w.mean_minutes).collect();
    let counts: Vec<Option<f64>> = weekly.iter().map(|w| Some(w.count as f64)).collect();
    let step = tick_step(weekly.len());

    let (days, day_means): (Vec<String>, Vec<Option<f64>>) = weekday_means(table)?
        .into_iter()
        .map(|(day, m)| (day.to_string(), m))
        .unzip();

    let window_labels: Vec<String> = report
        .moving_average_windows
        .iter()
        .map(|w| format!("{}-Week Moving Average", w))
        .collect();
    let mut trend = vec![Series {
        label: "Weekly Average",
        values: means.iter().copied().map(Some).collect(),
        color: LIGHT_BLUE,
        width: 2,
        opacity: 0.5,
        markers: false,
    }];
    for (i, (window, label)) in report
        .moving_average_windows
        .iter()
        .zip(&window_labels)
        .enumerate()
    {
        trend.push(Series {
            label,
            values: moving_average(&means, *window),
            color: MOVING_AVERAGE_COLORS[i % MOVING_AVERAGE_COLORS.len()],
            width: 2,
            opacity: 1.0,
            markers: false,
        });
    }

    let svg = chart::render_dashboard((1600, 1200), TITLE, |panels| {
        chart::line_chart(
            &panels[0],
            &AxisLabels {
                title: "Weekly Average Intervention Times",
                x: "Week",
                y: "Average Intervention Time (minutes)",
            },
            &labels,
            &[Series {
                label: "Weekly Average",
                values: means.iter().copied().map(Some).collect(),
                color: BLUE,
                width: 1,
                opacity: 1.0,
                markers: true,
            }],
            step,
            false,
        )?;

        chart::bar_chart(
            &panels[1],
            &AxisLabels {
                title: "Weekly Total Towing Count",
                x: "Week",
                y: "Total Towing Count",
            },
            &labels,
            &counts,
            ORANGE,
            0.7,
            step,
        )?;

        chart::bar_chart(
            &panels[2],
            &AxisLabels {
                title: "Average Intervention Times by Day of Week",
                x: "Day of Week",
                y: "Average Intervention Time (minutes)",
            },
            &days,
            &day_means,
            PURPLE,
            0.7,
            1,
        )?;

        chart::line_chart(
            &panels[3],
            &AxisLabels {
                title: "Intervention Time Trend Analysis",
                x: "Week",
                y: "Intervention Time (minutes)",
            },
            &labels,
            &trend,
            step,
            true,
        )
    })?;

    tracing::debug!("Weekly report: {} weeks", weekly.len());
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Cell, DURATION_MINUTES, WEEKDAY, YEAR_WEEK};

    fn table(rows: &[(&str, &str, f64)]) -> Table {
        Table::new(
            vec![YEAR_WEEK.to_string(), WEEKDAY.to_string(), DURATION_MINUTES.to_string()],
            rows.iter()
                .map(|(w, d, m)| vec![Cell::Text(w.to_string()), Cell::Text(d.to_string()), Cell::Float(*m)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_tick_step() {
        assert_eq!(tick_step(3), 1);
        assert_eq!(tick_step(25), 2);
        assert_eq!(tick_step(104), 10);
    }

    #[test]
    fn test_report_contains_all_panels() {
        let svg = render_weekly_report(
            &table(&[
                ("2024-W01", "Monday", 10.0),
                ("2024-W02", "Wednesday", 20.0),
                ("2024-W03", "Friday", 30.0),
            ]),
            &ReportConfig::default(),
        )
        .unwrap();

        assert!(svg.contains(TITLE));
        assert!(svg.contains("Weekly Average Intervention Times"));
        assert!(svg.contains("Weekly Total Towing Count"));
        assert!(svg.contains("Average Intervention Times by Day of Week"));
        assert!(svg.contains("3-Week Moving Average"));
        assert!(svg.contains("5-Week Moving Average"));
        assert!(svg.contains("2024-W03"));
        assert!(svg.contains("Monday"));
        assert!(svg.find("Monday") < svg.find("Sunday"));
    }

    #[test]
    fn test_empty_table_is_empty_result_error() {
        let result = render_weekly_report(&table(&[]), &ReportConfig::default());
        assert!(matches!(result, Err(EtlError::EmptyResultError { .. })));
    }
}
