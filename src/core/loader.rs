use crate::domain::model::{Cell, Table};
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

/// Builds a [`Table`] from a `{"fields": [{"id": ..}, ..], "records": [[..], ..]}`
/// document. Rows whose arity differs from the field count are rejected.
pub fn load_table(bytes: &[u8]) -> Result<Table> {
    let document: Value = serde_json::from_slice(bytes)?;
    table_from_value(document)
}

pub fn table_from_value(document: Value) -> Result<Table> {
    let Value::Object(mut root) = document else {
        return Err(EtlError::format("document must be a JSON object"));
    };

    let fields = match root.remove("fields") {
        Some(Value::Array(fields)) => fields,
        Some(_) => return Err(EtlError::format("'fields' must be an array")),
        None => return Err(EtlError::format("missing 'fields' member")),
    };
    let records = match root.remove("records") {
        Some(Value::Array(records)) => records,
        Some(_) => return Err(EtlError::format("'records' must be an array")),
        None => return Err(EtlError::format("missing 'records' member")),
    };

    let columns = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            field
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| EtlError::format(format!("field {} has no string 'id'", i)))
        })
        .collect::<Result<Vec<String>>>()?;

    tracing::debug!("id columns: {:?}", columns);

    let mut rows = Vec::with_capacity(records.len());
    for (i, record) in records.into_iter().enumerate() {
        let Value::Array(values) = record else {
            return Err(EtlError::format(format!("record {} is not an array", i)));
        };
        if values.len() != columns.len() {
            return Err(EtlError::format(format!(
                "record {} has {} values but there are {} fields",
                i,
                values.len(),
                columns.len()
            )));
        }
        let row = values
            .into_iter()
            .map(|value| scalar_cell(i, value))
            .collect::<Result<Vec<Cell>>>()?;
        rows.push(row);
    }

    Table::new(columns, rows)
}

// 所有欄位載入時都視為不透明字串，只有 null 保留
fn scalar_cell(row: usize, value: Value) -> Result<Cell> {
    match value {
        Value::Null => Ok(Cell::Null),
        Value::String(s) => Ok(Cell::Text(s)),
        Value::Number(n) => Ok(Cell::Text(n.to_string())),
        Value::Bool(b) => Ok(Cell::Text(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err(EtlError::format(format!(
            "record {} contains a nested value",
            row
        ))),
    }
}
