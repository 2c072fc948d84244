use crate::config::toml_config::{ColumnConfig, ReportConfig};
use crate::core::stats::{box_summary, durations, group_mean, group_values, histogram, mean, median};
use crate::domain::model::{Table, DURATION_MINUTES};
use crate::report::chart::{self, AxisLabels, Marker};
use crate::utils::error::{EtlError, Result};
use plotters::style::{RGBColor, GREEN, RED};

pub const TITLE: &str = "Towing Services - Intervention Time Analysis";

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);

/// Distribution histogram, box plot by vehicle status and mean duration by
/// district and by weather, as one 2×2 SVG dashboard.
pub fn render_intervention_report(table: &Table, columns: &ColumnConfig, report: &ReportConfig) -> Result<String> {
    if table.is_empty() {
        return Err(EtlError::empty("rendering the intervention time report"));
    }
    let minutes = durations(table)?;
    let (Some(avg), Some(mid)) = (mean(&minutes), median(&minutes)) else {
        return Err(EtlError::empty("rendering the intervention time report"));
    };

    let bins = histogram(&minutes, report.histogram_bins);
    let boxes = group_values(table, &columns.vehicle_status, DURATION_MINUTES)?
        .into_iter()
        .filter_map(|(status, values)| box_summary(&values).map(|summary| (status, summary)))
        .collect::<Vec<_>>();
    let (districts, district_means): (Vec<String>, Vec<f64>) =
        group_mean(table, &columns.district, DURATION_MINUTES)?.into_iter().unzip();
    let (weather, weather_means): (Vec<String>, Vec<Option<f64>>) = group_mean(table, &columns.weather, DURATION_MINUTES)?
        .into_iter()
        .map(|(name, m)| (name, Some(m)))
        .unzip();

    let svg = chart::render_dashboard((1500, 1200), TITLE, |panels| {
        chart::histogram_chart(
            &panels[0],
            &AxisLabels {
                title: "Intervention Time Distribution",
                x: "Intervention Time (minutes)",
                y: "Frequency",
            },
            &bins,
            &[
                Marker {
                    value: avg,
                    color: RED,
                    label: format!("Average: {:.1} min", avg),
                },
                Marker {
                    value: mid,
                    color: GREEN,
                    label: format!("Median: {:.1} min", mid),
                },
            ],
            SKY_BLUE,
        )?;

        chart::box_chart(
            &panels[1],
            &AxisLabels {
                title: "Intervention Times by Vehicle Status",
                x: "Vehicle Status",
                y: "Intervention Time (minutes)",
            },
            &boxes,
        )?;

        chart::horizontal_bar_chart(
            &panels[2],
            &AxisLabels {
                title: "Average Intervention Times by District",
                x: "Average Intervention Time (minutes)",
                y: "",
            },
            &districts,
            &district_means,
            LIGHT_CORAL,
        )?;

        chart::bar_chart(
            &panels[3],
            &AxisLabels {
                title: "Average Intervention Times by Weather",
                x: "Weather Condition",
                y: "Average Intervention Time (minutes)",
            },
            &weather,
            &weather_means,
            LIGHT_GREEN,
            1.0,
            1,
        )
    })?;

    tracing::debug!(
        "Intervention report: {} records, average {:.1} min, median {:.1} min",
        minutes.len(),
        avg,
        mid
    );
    Ok(svg)
}
