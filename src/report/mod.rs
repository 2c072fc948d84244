// Presentation layer: plotters dashboards rendered to SVG from the enriched table.

pub mod chart;
pub mod intervention;
pub mod weekly;

pub use intervention::render_intervention_report;
pub use weekly::render_weekly_report;
