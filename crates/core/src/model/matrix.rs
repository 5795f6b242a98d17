use std::collections::BTreeSet;

use phenomap_protocol::{AnnotationHeader, HeaderKey, HeatmapData, VariantHeader};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::labels::derive_labels;
use crate::config::Extractors;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data retrieval failed: {0}")]
    Retrieval(String),
    #[error("missing '{0}' object/attribute in data")]
    MissingField(&'static str),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("significance {axis} count is {found}, expected {expected}")]
    Shape {
        axis: &'static str,
        expected: usize,
        found: usize,
    },
}

impl LoadError {
    /// Data-format errors are fatal for the fetch; retrieval errors leave
    /// the previous matrix on screen.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, Self::Retrieval(_))
    }
}

/// A displayed column: one annotation node.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub header: AnnotationHeader,
    pub key: HeaderKey,
    pub label: String,
}

/// A displayed row: one genotype variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub header: VariantHeader,
    pub key: HeaderKey,
    /// Allele with markup stripped.
    pub allele: String,
    /// Label derived from the attributes that differ between variants.
    pub derived_label: String,
    /// Label after the row formatter.
    pub label: String,
}

/// Observed p-value extremes. Seeded outside `[0, 1]` so a matrix with no
/// data keeps `min > max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremes {
    pub min: f64,
    pub max: f64,
}

impl Extremes {
    pub const UNSET: Self = Self { min: 2.0, max: -2.0 };

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    fn include(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }
}

/// The matrix of one fetch, transposed for display: annotations run along
/// the columns, variants down the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixModel {
    annotations: Vec<Annotation>,
    variants: Vec<Variant>,
    /// `pvalues[annotation][variant]`, `None` for no data.
    pvalues: Vec<Vec<Option<f64>>>,
    extremes: Extremes,
    title: String,
    pegged_rows: BTreeSet<usize>,
    pegged_columns: BTreeSet<usize>,
}

impl MatrixModel {
    /// Decode and load a raw matrix fetch response.
    pub fn from_slice(data: &[u8], extractors: &dyn Extractors) -> Result<Self, LoadError> {
        let payload: Value = serde_json::from_slice(data)?;
        Self::load(&payload, extractors)
    }

    /// Validate a matrix fetch response and load its `heatmap` object.
    pub fn load(payload: &Value, extractors: &dyn Extractors) -> Result<Self, LoadError> {
        let success = payload
            .get("success")
            .ok_or(LoadError::MissingField("success"))?;
        if success.as_bool() != Some(true) {
            let reason = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("server reported failure");
            return Err(LoadError::Retrieval(reason.to_string()));
        }
        let heatmap = payload
            .get("heatmap")
            .ok_or(LoadError::MissingField("heatmap"))?;
        for field in ["row_headers", "column_headers", "significance"] {
            if heatmap.get(field).is_none() {
                return Err(LoadError::MissingField(field));
            }
        }
        let data = HeatmapData::deserialize(heatmap)?;
        Self::from_data(data, extractors)
    }

    /// Build from an already decoded `heatmap` object.
    pub fn from_data(data: HeatmapData, extractors: &dyn Extractors) -> Result<Self, LoadError> {
        let HeatmapData {
            row_headers,
            column_headers,
            significance,
        } = data;

        if significance.len() != row_headers.len() {
            return Err(LoadError::Shape {
                axis: "row",
                expected: row_headers.len(),
                found: significance.len(),
            });
        }
        if let Some(row) = significance
            .iter()
            .find(|row| row.len() != column_headers.len())
        {
            return Err(LoadError::Shape {
                axis: "column",
                expected: column_headers.len(),
                found: row.len(),
            });
        }

        let pvalues = significance
            .iter()
            .map(|row| row.iter().map(|cell| extractors.pvalue(cell)).collect())
            .collect();
        let annotations = row_headers
            .into_iter()
            .map(|header| Annotation {
                key: extractors.column_key(&header),
                label: extractors.column_label(&header),
                header,
            })
            .collect();
        let variants = column_headers
            .into_iter()
            .map(|header| Variant {
                key: extractors.row_key(&header),
                header,
                allele: String::new(),
                derived_label: String::new(),
                label: String::new(),
            })
            .collect();

        let mut model = Self {
            annotations,
            variants,
            pvalues,
            extremes: Extremes::UNSET,
            title: String::new(),
            pegged_rows: BTreeSet::new(),
            pegged_columns: BTreeSet::new(),
        };
        model.process_data(extractors);
        Ok(model)
    }

    /// Recompute extremes and row labels, and drop all pegs.
    pub fn process_data(&mut self, extractors: &dyn Extractors) {
        self.pegged_rows.clear();
        self.pegged_columns.clear();

        let mut extremes = Extremes::UNSET;
        for value in self.pvalues.iter().flatten().flatten() {
            extremes.include(*value);
        }
        self.extremes = extremes;

        let headers: Vec<VariantHeader> = self.variants.iter().map(|v| v.header.clone()).collect();
        let derived = derive_labels(&headers);
        for ((variant, label), allele) in self
            .variants
            .iter_mut()
            .zip(derived.labels)
            .zip(derived.alleles)
        {
            variant.label = extractors.row_label(&variant.header, &label);
            variant.derived_label = label;
            variant.allele = allele;
        }
        self.title = derived.title;

        tracing::debug!(
            rows = self.variants.len(),
            columns = self.annotations.len(),
            min = self.extremes.min,
            max = self.extremes.max,
            "processed heatmap data"
        );
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn num_rows(&self) -> usize {
        self.variants.len()
    }

    pub fn num_columns(&self) -> usize {
        self.annotations.len()
    }

    /// p-value for a displayed `(row, column)`.
    pub fn pvalue(&self, row: usize, column: usize) -> Option<f64> {
        self.pvalues.get(column)?.get(row).copied().flatten()
    }

    pub fn extremes(&self) -> Extremes {
        self.extremes
    }

    /// Gene symbol of the first variant.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn toggle_row_peg(&mut self, row: usize) -> bool {
        toggle(&mut self.pegged_rows, row)
    }

    pub fn toggle_column_peg(&mut self, column: usize) -> bool {
        toggle(&mut self.pegged_columns, column)
    }

    pub fn is_row_pegged(&self, row: usize) -> bool {
        self.pegged_rows.contains(&row)
    }

    pub fn is_column_pegged(&self, column: usize) -> bool {
        self.pegged_columns.contains(&column)
    }

    /// A cell is painted with the highlighted gradient when its row or
    /// column is pegged.
    pub fn is_highlighted(&self, row: usize, column: usize) -> bool {
        self.is_row_pegged(row) || self.is_column_pegged(column)
    }
}

fn toggle(set: &mut BTreeSet<usize>, index: usize) -> bool {
    if set.remove(&index) {
        false
    } else {
        set.insert(index);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultExtractors;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "success": true,
            "heatmap": {
                "row_headers": [
                    {"k": 10, "v": "Body weight"},
                    {"k": 11, "v": "Hearing"},
                    {"k": "IMPC_EYE_001", "v": "Eye morphology"}
                ],
                "column_headers": [
                    {"k": 1, "g": "Cib2", "a": "Cib2<sup>tm1a(EUCOMM)Wtsi</sup>", "s": "B6N", "c": "WTSI", "i": "Wtsi"},
                    {"k": 2, "g": "Cib2", "a": "Cib2<sup>tm1b(EUCOMM)Wtsi</sup>", "s": "B6N", "c": "WTSI", "i": "Wtsi"}
                ],
                "significance": [
                    [0.5, null],
                    [0.0001, -1],
                    [null, 0.75]
                ]
            }
        })
    }

    #[test]
    fn load_transposes_and_computes_extremes() {
        let model = MatrixModel::load(&payload(), &DefaultExtractors).expect("load");
        assert_eq!(model.num_columns(), 3);
        assert_eq!(model.num_rows(), 2);
        assert_eq!(model.pvalue(0, 1), Some(0.0001));
        assert_eq!(model.pvalue(1, 1), None);
        assert_eq!(model.pvalue(1, 2), Some(0.75));
        assert_eq!(model.pvalue(5, 0), None);
        assert_eq!(model.extremes().min, 0.0001);
        assert_eq!(model.extremes().max, 0.75);
        assert_eq!(model.title(), "Cib2");
        assert_eq!(model.variants()[0].label, "Conditional ready");
        assert_eq!(model.variants()[1].allele, "tm1b(EUCOMM)Wtsi");
        assert_eq!(model.annotations()[2].label, "Eye morphology");
    }

    #[test]
    fn unsuccessful_response_is_a_retrieval_error() {
        let err = MatrixModel::load(&json!({"success": false}), &DefaultExtractors)
            .expect_err("failure");
        assert!(matches!(err, LoadError::Retrieval(_)));
        assert!(!err.is_format_error());
    }

    #[test]
    fn missing_fields_are_format_errors() {
        let err = MatrixModel::load(&json!({"heatmap": {}}), &DefaultExtractors)
            .expect_err("missing success");
        assert!(matches!(err, LoadError::MissingField("success")));

        let err = MatrixModel::load(&json!({"success": true}), &DefaultExtractors)
            .expect_err("missing heatmap");
        assert!(matches!(err, LoadError::MissingField("heatmap")));

        let mut body = payload();
        if let Some(heatmap) = body.get_mut("heatmap").and_then(Value::as_object_mut) {
            heatmap.remove("significance");
        }
        let err = MatrixModel::load(&body, &DefaultExtractors).expect_err("missing grid");
        assert!(matches!(err, LoadError::MissingField("significance")));
        assert!(err.is_format_error());
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let mut body = payload();
        body["heatmap"]["significance"][1] = json!([0.1]);
        let err = MatrixModel::load(&body, &DefaultExtractors).expect_err("shape");
        assert!(matches!(
            err,
            LoadError::Shape {
                axis: "column",
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn undecodable_body_is_a_json_error() {
        let err = MatrixModel::from_slice(b"{not json", &DefaultExtractors).expect_err("json");
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn all_no_data_keeps_extremes_invalid() {
        let mut body = payload();
        body["heatmap"]["significance"] = json!([[null, null], [-1, null], [null, null]]);
        let model = MatrixModel::load(&body, &DefaultExtractors).expect("load");
        assert_eq!(model.extremes(), Extremes::UNSET);
        assert!(!model.extremes().is_valid());
    }

    #[test]
    fn pegs_toggle_and_clear_on_reprocess() {
        let mut model = MatrixModel::load(&payload(), &DefaultExtractors).expect("load");
        assert!(model.toggle_row_peg(1));
        assert!(model.toggle_column_peg(0));
        assert!(model.is_highlighted(1, 2));
        assert!(model.is_highlighted(0, 0));
        assert!(!model.is_highlighted(0, 2));
        assert!(!model.toggle_column_peg(0));
        model.process_data(&DefaultExtractors);
        assert!(!model.is_highlighted(1, 2));
    }

    struct Upper;

    impl Extractors for Upper {
        fn column_label(&self, header: &AnnotationHeader) -> String {
            header.value.to_uppercase()
        }

        fn row_label(&self, variant: &VariantHeader, derived: &str) -> String {
            format!("{derived} [{}]", variant.key)
        }
    }

    #[test]
    fn custom_extractors_apply_at_load() {
        let model = MatrixModel::load(&payload(), &Upper).expect("load");
        assert_eq!(model.annotations()[1].label, "HEARING");
        assert_eq!(model.variants()[1].label, "Cre-excised deletion [2]");
        assert_eq!(model.variants()[1].derived_label, "Cre-excised deletion");
    }
}
