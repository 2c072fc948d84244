use crate::core::stats::{BoxSummary, HistogramBin};
use crate::utils::error::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

pub type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

const FONT: &str = "sans-serif";
const BOX_COLOR: RGBColor = RGBColor(31, 119, 180);
const MEDIAN_COLOR: RGBColor = RGBColor(44, 160, 44);
const OUTLIER_COLOR: RGBColor = RGBColor(68, 68, 68);

pub struct AxisLabels<'a> {
    pub title: &'a str,
    pub x: &'a str,
    pub y: &'a str,
}

/// A series drawn over the categories of a line chart. Missing values
/// break the line.
pub struct Series<'a> {
    pub label: &'a str,
    pub values: Vec<Option<f64>>,
    pub color: RGBColor,
    pub width: u32,
    pub opacity: f64,
    pub markers: bool,
}

/// Vertical reference line on a histogram.
pub struct Marker {
    pub value: f64,
    pub color: RGBColor,
    pub label: String,
}

/// Renders a titled dashboard into an SVG string. `draw` receives the 2×2
/// panels row-major.
pub fn render_dashboard<F>(size: (u32, u32), title: &str, draw: F) -> Result<String>
where
    F: FnOnce(&[Area<'_>]) -> Result<()>,
{
    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE)?;
        let body = root.titled(title, (FONT, 28))?;
        let panels = body.split_evenly((2, 2));
        draw(&panels)?;
        root.present()?;
    }
    Ok(buffer)
}

fn upper_range(max: f64) -> Range<f64> {
    if max > 0.0 {
        0.0..max * 1.1
    } else {
        0.0..1.0
    }
}

fn padded_range(lo: f64, hi: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

/// Label for a segment centre, shown only on every `step`-th category.
fn category_label(categories: &[String], value: &SegmentValue<i32>, step: usize) -> String {
    match value {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .filter(|i| i % step.max(1) == 0)
            .and_then(|i| categories.get(i))
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Label for a numeric tick that falls on a category index.
fn index_label(categories: &[String], x: f64) -> String {
    let index = x.round();
    if index < 0.0 || (x - index).abs() > 1e-6 {
        return String::new();
    }
    categories.get(index as usize).cloned().unwrap_or_default()
}

/// Splits a series into unbroken stretches of present values.
fn contiguous_runs(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push((i, *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn legend_line(color: RGBColor) -> impl Fn((i32, i32)) -> PathElement<(i32, i32)> {
    move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
}

pub fn bar_chart(
    area: &Area<'_>,
    labels: &AxisLabels,
    categories: &[String],
    values: &[Option<f64>],
    color: RGBColor,
    opacity: f64,
    tick_step: usize,
) -> Result<()> {
    let max = values.iter().flatten().copied().fold(0.0, f64::max);
    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, (FONT, 20))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..categories.len() as i32).into_segmented(), upper_range(max))?;

    let format = |v: &SegmentValue<i32>| category_label(categories, v, tick_step);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.len() + 1)
        .x_label_formatter(&format)
        .x_desc(labels.x)
        .y_desc(labels.y)
        .draw()?;

    chart.draw_series(values.iter().enumerate().filter_map(|(i, value)| {
        let i = i as i32;
        value.map(|v| {
            Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                color.mix(opacity).filled(),
            )
        })
    }))?;
    Ok(())
}

/// Horizontal bars, first category at the bottom.
pub fn horizontal_bar_chart(
    area: &Area<'_>,
    labels: &AxisLabels,
    categories: &[String],
    values: &[f64],
    color: RGBColor,
) -> Result<()> {
    let max = values.iter().copied().fold(0.0, f64::max);
    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, (FONT, 20))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(140)
        .build_cartesian_2d(upper_range(max), (0..categories.len() as i32).into_segmented())?;

    let format = |v: &SegmentValue<i32>| category_label(categories, v, 1);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(categories.len() + 1)
        .y_label_formatter(&format)
        .x_desc(labels.x)
        .y_desc(labels.y)
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let i = i as i32;
        Rectangle::new(
            [(0.0, SegmentValue::Exact(i)), (*v, SegmentValue::Exact(i + 1))],
            color.filled(),
        )
    }))?;
    Ok(())
}

pub fn line_chart(
    area: &Area<'_>,
    labels: &AxisLabels,
    categories: &[String],
    series: &[Series],
    tick_step: usize,
    legend: bool,
) -> Result<()> {
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.values.iter().flatten().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, (FONT, 20))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..categories.len() as i32).into_segmented(), padded_range(lo, hi))?;

    let format = |v: &SegmentValue<i32>| category_label(categories, v, tick_step);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.len() + 1)
        .x_label_formatter(&format)
        .x_desc(labels.x)
        .y_desc(labels.y)
        .draw()?;

    for s in series {
        let style = s.color.mix(s.opacity).stroke_width(s.width);
        for (n, run) in contiguous_runs(&s.values).into_iter().enumerate() {
            let points: Vec<(SegmentValue<i32>, f64)> = run
                .into_iter()
                .map(|(i, v)| (SegmentValue::CenterOf(i as i32), v))
                .collect();
            let drawn = chart.draw_series(LineSeries::new(points.clone(), style))?;
            if n == 0 {
                drawn.label(s.label).legend(legend_line(s.color));
            }
            if s.markers {
                chart.draw_series(points.into_iter().map(|p| Circle::new(p, 4, s.color.filled())))?;
            }
        }
    }

    if legend {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }
    Ok(())
}

pub fn histogram_chart(
    area: &Area<'_>,
    labels: &AxisLabels,
    bins: &[HistogramBin],
    markers: &[Marker],
    color: RGBColor,
) -> Result<()> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Ok(());
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let y_range = upper_range(max_count);
    let top = y_range.end;
    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, (FONT, 20))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(first.start..last.end, y_range)?;
    chart
        .configure_mesh()
        .x_desc(labels.x)
        .y_desc(labels.y)
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], color.mix(0.7).filled())
    }))?;
    chart.draw_series(
        bins.iter()
            .map(|b| Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLACK.stroke_width(1))),
    )?;

    for marker in markers {
        chart
            .draw_series(LineSeries::new(
                vec![(marker.value, 0.0), (marker.value, top)],
                marker.color.stroke_width(2),
            ))?
            .label(marker.label.as_str())
            .legend(legend_line(marker.color));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

/// Box plots on a numeric x axis where category `i` sits at `x = i`.
pub fn box_chart(area: &Area<'_>, labels: &AxisLabels, groups: &[(String, BoxSummary)]) -> Result<()> {
    let names: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();
    let lo = groups
        .iter()
        .flat_map(|(_, b)| b.outliers.iter().copied().chain([b.whisker_low]))
        .fold(f64::INFINITY, f64::min);
    let hi = groups
        .iter()
        .flat_map(|(_, b)| b.outliers.iter().copied().chain([b.whisker_high]))
        .fold(f64::NEG_INFINITY, f64::max);

    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, (FONT, 20))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(names.len() as f64 - 0.5), padded_range(lo.min(0.0), hi))?;

    let format = |x: &f64| index_label(&names, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len() + 1)
        .x_label_formatter(&format)
        .x_desc(labels.x)
        .y_desc(labels.y)
        .draw()?;

    let stroke = BOX_COLOR.stroke_width(2);
    for (i, (_, s)) in groups.iter().enumerate() {
        let x = i as f64;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.25, s.q1), (x + 0.25, s.q3)],
            stroke,
        )))?;
        chart.draw_series([
            PathElement::new(vec![(x, s.whisker_low), (x, s.q1)], stroke),
            PathElement::new(vec![(x, s.q3), (x, s.whisker_high)], stroke),
            PathElement::new(vec![(x - 0.12, s.whisker_low), (x + 0.12, s.whisker_low)], stroke),
            PathElement::new(vec![(x - 0.12, s.whisker_high), (x + 0.12, s.whisker_high)], stroke),
            PathElement::new(
                vec![(x - 0.25, s.median), (x + 0.25, s.median)],
                MEDIAN_COLOR.stroke_width(3),
            ),
        ])?;
        chart.draw_series(
            s.outliers
                .iter()
                .map(|v| Circle::new((x, *v), 3, OUTLIER_COLOR.filled())),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weeks(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("2024-W{:02}", i)).collect()
    }

    #[test]
    fn test_category_label_thins_ticks() {
        let categories = weeks(25);
        assert_eq!(category_label(&categories, &SegmentValue::CenterOf(0), 2), "2024-W01");
        assert_eq!(category_label(&categories, &SegmentValue::CenterOf(1), 2), "");
        assert_eq!(category_label(&categories, &SegmentValue::CenterOf(24), 2), "2024-W25");
        assert_eq!(category_label(&categories, &SegmentValue::CenterOf(25), 1), "");
        assert_eq!(category_label(&categories, &SegmentValue::Exact(0), 1), "");
    }

    #[test]
    fn test_index_label_only_on_whole_ticks() {
        let names = vec!["Arızalı".to_string(), "Kazalı".to_string()];
        assert_eq!(index_label(&names, 0.0), "Arızalı");
        assert_eq!(index_label(&names, 1.0), "Kazalı");
        assert_eq!(index_label(&names, 0.5), "");
        assert_eq!(index_label(&names, -0.5), "");
        assert_eq!(index_label(&names, 2.0), "");
    }

    #[test]
    fn test_missing_values_break_the_line() {
        let runs = contiguous_runs(&[None, Some(1.0), Some(2.0), None, Some(4.0)]);
        assert_eq!(runs, vec![vec![(1, 1.0), (2, 2.0)], vec![(4, 4.0)]]);
        assert!(contiguous_runs(&[None, None]).is_empty());
    }

    #[test]
    fn test_ranges_never_collapse() {
        assert_eq!(upper_range(0.0), 0.0..1.0);
        assert_eq!(padded_range(f64::INFINITY, f64::NEG_INFINITY), 0.0..1.0);
        let flat = padded_range(5.0, 5.0);
        assert!(flat.start < 5.0 && flat.end > 5.0);
    }

    #[test]
    fn test_line_chart_draws_legend_and_labels() {
        let categories = weeks(5);
        let svg = render_dashboard((1200, 900), "Trend", |panels| {
            line_chart(
                &panels[0],
                &AxisLabels {
                    title: "Intervention Time Trend Analysis",
                    x: "Week",
                    y: "Minutes",
                },
                &categories,
                &[Series {
                    label: "3-Week Moving Average",
                    values: vec![None, None, Some(2.0), Some(3.0), Some(4.0)],
                    color: RED,
                    width: 2,
                    opacity: 1.0,
                    markers: false,
                }],
                1,
                true,
            )
        })
        .unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Intervention Time Trend Analysis"));
        assert!(svg.contains("3-Week Moving Average"));
        assert!(svg.contains("2024-W05"));
    }

    #[test]
    fn test_bar_chart_skips_missing_values() {
        let categories = vec!["Monday".to_string(), "Tuesday".to_string()];
        let svg = render_dashboard((800, 600), "Days", |panels| {
            bar_chart(
                &panels[0],
                &AxisLabels {
                    title: "By Day",
                    x: "Day",
                    y: "Minutes",
                },
                &categories,
                &[Some(12.0), None],
                RED,
                0.7,
                1,
            )
        })
        .unwrap();

        assert!(svg.contains("Monday"));
        assert!(svg.contains("Tuesday"));
    }
}
