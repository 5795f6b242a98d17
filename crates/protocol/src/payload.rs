//! Server payloads consumed by the heatmap engine.
//!
//! Field names on the wire are the single-letter keys the REST service
//! emits; the Rust side uses descriptive names with `#[serde(rename)]`.
//!
//! The server's `row_headers` describe annotation nodes (procedures,
//! parameters, ontology terms) and its `column_headers` describe genotype
//! variants. The grid displays them transposed: annotations run along the
//! horizontal axis and variants down the vertical axis.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a header node or genotype. The service emits integers
/// for procedure/genotype ids and strings for parameter keys and ontology
/// term ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderKey {
    Int(i64),
    Text(String),
}

impl HeaderKey {
    /// The integral value of this key, if it has one. Textual keys that
    /// spell an integer (`"12"`) count as integral.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for HeaderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for HeaderKey {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for HeaderKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for HeaderKey {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// An annotation node: displayed as a column header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationHeader {
    #[serde(rename = "k")]
    pub key: HeaderKey,
    #[serde(rename = "v", default)]
    pub value: String,
    /// Any additional fields, kept for caller-supplied extractors.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A genotype variant (colony): displayed as a row header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantHeader {
    /// Genotype id.
    #[serde(rename = "k")]
    pub key: HeaderKey,
    #[serde(rename = "g", default)]
    pub symbol: String,
    /// Allele symbol, possibly with the allele part wrapped in `<sup>`.
    #[serde(rename = "a", default)]
    pub allele: String,
    #[serde(rename = "s", default)]
    pub strain: String,
    #[serde(rename = "c", default)]
    pub centre: String,
    #[serde(rename = "i", default)]
    pub ilar: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `heatmap` object of a matrix fetch response.
///
/// `significance[a][v]` is the cell for annotation `a` and variant `v`;
/// cells are numbers in `[0, 1]`, `null`, or (for custom extractors)
/// arbitrary JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapData {
    pub row_headers: Vec<AnnotationHeader>,
    pub column_headers: Vec<VariantHeader>,
    pub significance: Vec<Vec<Value>>,
}

/// Detail fetch response for one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailsResponse {
    pub success: bool,
    #[serde(default)]
    pub details: Option<Vec<Detail>>,
}

/// One significant parameter behind a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    /// Parameter key.
    #[serde(rename = "k", default)]
    pub parameter_key: Option<HeaderKey>,
    #[serde(rename = "n", default)]
    pub parameter_name: String,
    /// Mammalian phenotype term.
    #[serde(rename = "t", default)]
    pub term: String,
    #[serde(rename = "p", default)]
    pub pvalue: Option<f64>,
    /// Selection outcome code, see [`SelectionOutcome`].
    #[serde(rename = "o", default)]
    pub outcome: Option<i64>,
    /// Procedure name; only present in ontological mode.
    #[serde(rename = "a", default, skip_serializing_if = "Option::is_none")]
    pub procedure: Option<String>,
    /// Ontology term id; only present in ontological mode.
    #[serde(rename = "m", default, skip_serializing_if = "Option::is_none")]
    pub mp_id: Option<HeaderKey>,
}

/// The annotation call attached to a detail row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionOutcome {
    Increased,
    Decreased,
    Abnormal,
    Inferred,
}

impl SelectionOutcome {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Increased),
            2 => Some(Self::Decreased),
            3 => Some(Self::Abnormal),
            4 => Some(Self::Inferred),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increased => "increased",
            Self::Decreased => "decreased",
            Self::Abnormal => "abnormal",
            Self::Inferred => "inferred",
        }
    }
}

impl std::fmt::Display for SelectionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_key_accepts_numbers_and_strings() {
        let keys: Vec<HeaderKey> =
            serde_json::from_str(r#"[12, "IMPC_BWT_001", "7"]"#).unwrap_or_default();
        assert_eq!(keys[0], HeaderKey::Int(12));
        assert_eq!(keys[1], HeaderKey::from("IMPC_BWT_001"));
        assert_eq!(keys[0].as_int(), Some(12));
        assert_eq!(keys[1].as_int(), None);
        assert_eq!(keys[2].as_int(), Some(7));
    }

    #[test]
    fn variant_header_from_wire_names() {
        let json = r#"{"k": 4, "g": "Akt2", "a": "Akt2<sup>tm1a(EUCOMM)Wtsi</sup>",
                       "s": "C57BL/6N", "c": "WTSI", "i": "Wtsi", "z": 1}"#;
        let v: VariantHeader = serde_json::from_str(json).expect("variant");
        assert_eq!(v.key, HeaderKey::Int(4));
        assert_eq!(v.symbol, "Akt2");
        assert_eq!(v.ilar, "Wtsi");
        assert!(v.extra.contains_key("z"));
    }

    #[test]
    fn details_without_optional_fields() {
        let json = r#"{"success": true, "details": [{"k": "P1", "n": "Weight", "t": "increased weight", "p": 0.0001, "o": 1}]}"#;
        let resp: DetailsResponse = serde_json::from_str(json).expect("details");
        let details = resp.details.unwrap_or_default();
        assert_eq!(details.len(), 1);
        assert!(details[0].procedure.is_none());
        assert_eq!(
            details[0].outcome.and_then(SelectionOutcome::from_code),
            Some(SelectionOutcome::Increased)
        );
    }

    #[test]
    fn details_missing_array_is_none() {
        let resp: DetailsResponse =
            serde_json::from_str(r#"{"success": true}"#).expect("details");
        assert!(resp.details.is_none());
    }

    #[test]
    fn outcome_codes() {
        assert_eq!(SelectionOutcome::from_code(3).map(SelectionOutcome::as_str), Some("abnormal"));
        assert_eq!(SelectionOutcome::from_code(0), None);
        assert_eq!(SelectionOutcome::Inferred.to_string(), "inferred");
    }
}
