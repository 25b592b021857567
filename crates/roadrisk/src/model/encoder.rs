//! One-hot encoding of categorical features with numeric passthrough.
//!
//! Layout of an encoded row: for each categorical feature, one slot per
//! category seen during fitting (sorted) plus a trailing unknown slot; then
//! one slot per numeric feature. Missing categorical values form their own
//! category. Missing numeric values encode as [`MISSING_NUMERIC`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::features::FeatureRow;
use super::matrix::Matrix;
use crate::error::{Result, RoadriskError};
use crate::table::{Cell, Table, Value};

/// Category standing for a missing categorical value.
pub const MISSING_CATEGORY: &str = "<missing>";

/// Encoded value of a missing numeric feature.
pub const MISSING_NUMERIC: f64 = -1.0;

/// How one feature is encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodedFeature {
    Categorical { name: String, categories: Vec<String> },
    Numeric { name: String },
}

impl EncodedFeature {
    pub fn name(&self) -> &str {
        match self {
            EncodedFeature::Categorical { name, .. } | EncodedFeature::Numeric { name } => name,
        }
    }

    /// Number of encoded slots.
    pub fn width(&self) -> usize {
        match self {
            EncodedFeature::Categorical { categories, .. } => categories.len() + 1,
            EncodedFeature::Numeric { .. } => 1,
        }
    }

    fn encode_into(&self, cell: &Cell, out: &mut [f64]) {
        match self {
            EncodedFeature::Categorical { categories, .. } => {
                let key = category_key(cell);
                let slot = categories
                    .binary_search_by(|c| c.as_str().cmp(key.as_str()))
                    .unwrap_or(categories.len());
                out[slot] = 1.0;
            }
            EncodedFeature::Numeric { .. } => {
                out[0] = cell.as_ref().and_then(Value::as_f64).unwrap_or(MISSING_NUMERIC);
            }
        }
    }
}

fn category_key(cell: &Cell) -> String {
    match cell {
        None => MISSING_CATEGORY.to_string(),
        Some(Value::Text(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Fitted encoder over an ordered feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    /// Selected features in their configured order.
    features: Vec<String>,
    /// Categorical block first, then numeric block.
    encoded: Vec<EncodedFeature>,
}

impl FeatureEncoder {
    /// Fit on the given feature columns of `table`.
    ///
    /// Integer and float columns pass through as numbers; every other
    /// column, including one with no present values, is categorical.
    pub fn fit(table: &Table, features: &[String]) -> Result<Self> {
        let mut categorical = Vec::new();
        let mut numeric = Vec::new();

        for name in features {
            let column = table.column(name).ok_or_else(|| RoadriskError::MissingFeature(name.clone()))?;
            if column.observed_type().is_numeric() {
                numeric.push(EncodedFeature::Numeric { name: name.clone() });
            } else {
                let categories: BTreeSet<String> = column.values.iter().map(category_key).collect();
                debug!(feature = %name, categories = categories.len(), "Fitted categorical feature");
                categorical.push(EncodedFeature::Categorical {
                    name: name.clone(),
                    categories: categories.into_iter().collect(),
                });
            }
        }

        categorical.extend(numeric);
        Ok(Self {
            features: features.to_vec(),
            encoded: categorical,
        })
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn encoded_features(&self) -> &[EncodedFeature] {
        &self.encoded
    }

    /// Total encoded width.
    pub fn width(&self) -> usize {
        self.encoded.iter().map(EncodedFeature::width).sum()
    }

    /// Encode every row of `table`.
    pub fn transform(&self, table: &Table) -> Result<Matrix> {
        let columns = self
            .encoded
            .iter()
            .map(|f| {
                table
                    .column(f.name())
                    .ok_or_else(|| RoadriskError::MissingFeature(f.name().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut matrix = Matrix::zeros(table.row_count(), self.width());
        for row in 0..table.row_count() {
            let out = matrix.row_mut(row);
            let mut offset = 0;
            for (feature, column) in self.encoded.iter().zip(&columns) {
                let width = feature.width();
                feature.encode_into(&column.values[row], &mut out[offset..offset + width]);
                offset += width;
            }
        }
        Ok(matrix)
    }

    /// Encode a single record. Every selected feature must be present as a key.
    pub fn transform_row(&self, row: &FeatureRow) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.width()];
        let mut offset = 0;
        for feature in &self.encoded {
            let cell = row
                .get(feature.name())
                .ok_or_else(|| RoadriskError::MissingFeature(feature.name().to_string()))?;
            let width = feature.width();
            feature.encode_into(cell, &mut out[offset..offset + width]);
            offset += width;
        }
        Ok(out)
    }
}
