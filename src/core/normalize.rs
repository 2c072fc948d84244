use crate::config::toml_config::{ColumnConfig, LabelRule};
use crate::domain::model::{Cell, Table};
use crate::utils::error::{EtlError, Result};

/// Applies substring rewrites in rule order. Every occurrence is replaced,
/// so a later rule sees the output of the earlier ones on the same column.
pub fn normalize_labels(table: Table, columns: &ColumnConfig, rules: &[LabelRule]) -> Result<Table> {
    let mut table = table;
    for rule in rules {
        let column = columns.resolve(&rule.column).ok_or_else(|| {
            EtlError::format(format!("unknown normalization column '{}'", rule.column))
        })?;
        tracing::debug!("Normalizing {}: '{}' -> '{}'", column, rule.from, rule.to);

        table = table.map_column(column, |_, cell| {
            Ok(match cell {
                Cell::Text(s) if s.contains(&rule.from) => Cell::Text(s.replace(&rule.from, &rule.to)),
                other => other,
            })
        })?;
    }
    Ok(table)
}
