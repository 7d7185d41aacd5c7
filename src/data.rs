//! Raw table loading and the cleaning stage

use crate::error::PipelineError;
use std::collections::HashSet;
use std::path::Path;

/// One cell of a customer table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A numeric predictor value
    Number(f64),
    /// The binary label, always 0 or 1 after cleaning
    Int(i64),
    /// An identifier or categorical value
    Text(String),
    /// A value that is absent or failed coercion
    Missing,
}

impl Value {
    /// Numeric view of the cell; text and missing cells have none.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

/// An uncleaned table as loaded from disk: column names plus string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Which attributes play which role in the pipeline.
///
/// Constructed once (normally from the CLI) and passed by value into the
/// stages that need it; no stage reads ambient configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRoles {
    /// Unique customer identifier column
    pub identifier: String,
    /// Binary churn label column
    pub label: String,
    /// Columns coerced to numeric predictors
    pub numeric: Vec<String>,
}

impl ColumnRoles {
    /// Roles with all names normalized the same way cleaning normalizes
    /// the table's column names (trimmed, lowercased).
    fn normalized(&self) -> ColumnRoles {
        ColumnRoles {
            identifier: normalize_name(&self.identifier),
            label: normalize_name(&self.label),
            numeric: self.numeric.iter().map(|c| normalize_name(c)).collect(),
        }
    }
}

/// One cleaned row, values aligned to the owning dataset's attribute order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub values: Vec<Value>,
}

/// An ordered sequence of cleaned records sharing one attribute schema.
///
/// Invariants after [`clean`]: every record has one value per attribute,
/// the identifier attribute is unique across records, and the label
/// attribute holds only `Value::Int(0)` or `Value::Int(1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Normalized attribute names, in original column order
    pub attributes: Vec<String>,
    pub records: Vec<Record>,
    /// The (normalized) roles this dataset was cleaned with
    pub roles: ColumnRoles,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of an attribute, if the dataset has it.
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == name)
    }

    /// The label column as plain integers.
    pub fn labels(&self) -> Vec<i64> {
        let idx = self
            .attribute_index(&self.roles.label)
            .expect("cleaned dataset always has its label attribute");
        self.records
            .iter()
            .map(|r| match r.values[idx] {
                Value::Int(v) => v,
                _ => unreachable!("cleaned label is always an integer"),
            })
            .collect()
    }

    /// Render the dataset back into a raw string table.
    ///
    /// Used to feed a cleaned dataset through [`clean`] again; cleaning is
    /// idempotent, so the round trip is lossless.
    pub fn to_raw(&self) -> RawTable {
        let rows = self
            .records
            .iter()
            .map(|r| {
                r.values
                    .iter()
                    .map(|v| match v {
                        Value::Number(n) => format!("{}", n),
                        Value::Int(i) => format!("{}", i),
                        Value::Text(t) => t.clone(),
                        Value::Missing => String::new(),
                    })
                    .collect()
            })
            .collect();
        RawTable {
            columns: self.attributes.clone(),
            rows,
        }
    }
}

/// Row counts observed while cleaning, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleaningReport {
    /// Rows in the raw table
    pub rows_loaded: usize,
    /// Rows left after dropping ones with missing critical values
    pub rows_after_missing_drop: usize,
    /// Rows left after dropping duplicate identifiers
    pub rows_after_dedup: usize,
}

/// Load a raw CSV table.
///
/// # Arguments
/// * `path` - Path to the CSV file, first row taken as the header
pub fn load_raw_table<P: AsRef<Path>>(path: P) -> crate::Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path.as_ref())?;

    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // Short rows are padded so every row has one cell per column
        let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        row.resize(columns.len(), String::new());
        row.truncate(columns.len());
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

/// Clean a raw customer table into a typed [`Dataset`].
///
/// Column names are trimmed and lowercased; the designated numeric columns
/// and the label are coerced (uncoercible cells become missing); rows with
/// a missing critical value (identifier, numeric predictor, label) are
/// silently dropped; duplicate identifiers keep their first occurrence.
/// The row-count deltas are returned in the [`CleaningReport`].
///
/// Fails with a data error if the identifier or label column is entirely
/// absent, or if no rows survive cleaning.
pub fn clean(raw: &RawTable, roles: &ColumnRoles) -> crate::Result<(Dataset, CleaningReport)> {
    let roles = roles.normalized();
    let attributes: Vec<String> = raw.columns.iter().map(|c| normalize_name(c)).collect();

    let id_idx = attributes
        .iter()
        .position(|a| *a == roles.identifier)
        .ok_or_else(|| {
            PipelineError::Data(format!("identifier column '{}' not found", roles.identifier))
        })?;
    let label_idx = attributes
        .iter()
        .position(|a| *a == roles.label)
        .ok_or_else(|| PipelineError::Data(format!("label column '{}' not found", roles.label)))?;

    // Numeric roles naming columns the table does not have are skipped,
    // matching the per-column presence guard of the source pipeline.
    let critical: Vec<usize> = attributes
        .iter()
        .enumerate()
        .filter(|(_, a)| {
            **a == roles.identifier || **a == roles.label || roles.numeric.contains(*a)
        })
        .map(|(i, _)| i)
        .collect();

    let rows_loaded = raw.rows.len();

    let mut coerced: Vec<Record> = Vec::with_capacity(rows_loaded);
    for row in &raw.rows {
        let values = attributes
            .iter()
            .enumerate()
            .map(|(i, attr)| {
                let cell = row.get(i).map(|c| c.trim()).unwrap_or("");
                if i == label_idx {
                    coerce_label(cell)
                } else if roles.numeric.contains(attr) {
                    coerce_number(cell)
                } else if cell.is_empty() {
                    Value::Missing
                } else {
                    Value::Text(cell.to_string())
                }
            })
            .collect();
        coerced.push(Record { values });
    }

    // Drop rows with missing critical values
    coerced.retain(|r| critical.iter().all(|&i| !r.values[i].is_missing()));
    let rows_after_missing_drop = coerced.len();

    // Drop duplicate identifiers, keeping the first occurrence
    let mut seen = HashSet::new();
    coerced.retain(|r| {
        let key = match &r.values[id_idx] {
            Value::Text(id) => id.clone(),
            Value::Number(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Missing => return false,
        };
        seen.insert(key)
    });
    let rows_after_dedup = coerced.len();

    if coerced.is_empty() {
        return Err(PipelineError::Data("no rows survived cleaning".to_string()).into());
    }

    let report = CleaningReport {
        rows_loaded,
        rows_after_missing_drop,
        rows_after_dedup,
    };

    Ok((
        Dataset {
            attributes,
            records: coerced,
            roles,
        },
        report,
    ))
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn coerce_number(cell: &str) -> Value {
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Value::Number(v),
        _ => Value::Missing,
    }
}

/// Coerce a label cell to 0/1; anything else is missing and the row will
/// be dropped, keeping the dataset's label invariant.
fn coerce_label(cell: &str) -> Value {
    match cell.parse::<f64>() {
        Ok(v) if v == 0.0 => Value::Int(0),
        Ok(v) if v == 1.0 => Value::Int(1),
        _ => Value::Missing,
    }
}
