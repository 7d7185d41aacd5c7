//! Dummy encoding of a cleaned dataset into a fixed feature schema

use crate::data::{Dataset, Value};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// One output column of the feature schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureColumn {
    /// A numeric attribute passed through unchanged
    Numeric { attribute: String },
    /// An indicator for one non-baseline category of a categorical attribute
    Indicator { attribute: String, category: String },
}

impl FeatureColumn {
    /// Rendered column name, `attribute` or `attribute_category`.
    pub fn name(&self) -> String {
        match self {
            FeatureColumn::Numeric { attribute } => attribute.clone(),
            FeatureColumn::Indicator { attribute, category } => {
                format!("{}_{}", attribute, category)
            }
        }
    }
}

/// The ordered output columns fixed at encoding time.
///
/// The same schema must be threaded through training and every later
/// encode/predict call; it is never re-derived from new data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub columns: Vec<FeatureColumn>,
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name()).collect()
    }
}

/// A dense feature matrix with its row-aligned 0/1 label vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    /// rows = samples, columns = feature schema
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }
}

/// Fit a feature schema against a cleaned dataset.
///
/// Numeric attributes contribute one column each, in attribute order. A
/// categorical attribute with k distinct observed values (first-occurrence
/// order) contributes k-1 indicator columns; the first-seen category is the
/// implicit baseline and gets no column, matching standard dummy encoding.
/// The identifier and label attributes are not features.
pub fn fit_schema(dataset: &Dataset) -> FeatureSchema {
    let roles = &dataset.roles;
    let mut columns = Vec::new();

    for (idx, attr) in dataset.attributes.iter().enumerate() {
        if *attr == roles.identifier || *attr == roles.label {
            continue;
        }
        if roles.numeric.contains(attr) {
            columns.push(FeatureColumn::Numeric {
                attribute: attr.clone(),
            });
            continue;
        }

        // Distinct categories in first-occurrence order; missing cells
        // contribute no category.
        let mut categories: Vec<String> = Vec::new();
        for record in &dataset.records {
            if let Some(text) = record.values[idx].as_text() {
                if !categories.iter().any(|c| c == text) {
                    categories.push(text.to_string());
                }
            }
        }
        for category in categories.into_iter().skip(1) {
            columns.push(FeatureColumn::Indicator {
                attribute: attr.clone(),
                category,
            });
        }
    }

    FeatureSchema { columns }
}

/// Encode a dataset against an existing schema.
///
/// Alignment rules: a category unseen at fit time maps to all-zero
/// indicators for its attribute, and a schema column whose attribute is
/// absent from the dataset is filled with 0. The output width is always
/// exactly the schema length, so training, evaluation, and later inference
/// consume identically shaped feature vectors.
pub fn encode(dataset: &Dataset, schema: &FeatureSchema) -> crate::Result<FeatureMatrix> {
    let n = dataset.len();
    let d = schema.len();

    // Resolve each schema column to an attribute index once
    let sources: Vec<Option<usize>> = schema
        .columns
        .iter()
        .map(|col| match col {
            FeatureColumn::Numeric { attribute } => dataset.attribute_index(attribute),
            FeatureColumn::Indicator { attribute, .. } => dataset.attribute_index(attribute),
        })
        .collect();

    let mut features = Array2::<f64>::zeros((n, d));
    for (row_idx, record) in dataset.records.iter().enumerate() {
        for (col_idx, col) in schema.columns.iter().enumerate() {
            let value = match sources[col_idx] {
                Some(attr_idx) => &record.values[attr_idx],
                None => &Value::Missing,
            };
            features[[row_idx, col_idx]] = match col {
                FeatureColumn::Numeric { .. } => value.as_number().unwrap_or(0.0),
                FeatureColumn::Indicator { category, .. } => match value.as_text() {
                    Some(text) if text == category => 1.0,
                    _ => 0.0,
                },
            };
        }
    }

    let labels = Array1::from_iter(dataset.labels().into_iter().map(|l| l as f64));

    Ok(FeatureMatrix { features, labels })
}
