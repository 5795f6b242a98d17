use phenomap_protocol::{Detail, HeaderKey, Point, SelectionOutcome};
use serde::Serialize;

use crate::config::VizUrl;
use crate::model::PopupContent;
use crate::precision::format_pvalue;

/// Minimum gap kept between the popup and the window edges.
pub const POPUP_PADDING: f64 = 50.0;

pub const LOADING_DETAILS: &str = "Loading details...";
pub const NO_SIGNIFICANT_PARAMETERS: &str =
    "No significant parameters under current p-value threshold";

/// One parameter row of the detail popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupRow {
    /// Procedure name; ontological mode only.
    pub procedure: Option<String>,
    pub parameter: String,
    pub term: String,
    pub outcome: Option<SelectionOutcome>,
    pub pvalue: Option<String>,
    /// Visualisation page opened when the row is clicked.
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupTable {
    pub ontological: bool,
    pub headers: Vec<&'static str>,
    pub rows: Vec<PopupRow>,
}

/// What the popup currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "body")]
pub enum PopupView {
    Message(String),
    Warning(String),
    Table(PopupTable),
}

/// Build the popup body for the session content of genotype `gid`.
pub fn popup_view(content: &PopupContent, gid: &HeaderKey, viz: &dyn VizUrl) -> PopupView {
    match content {
        PopupContent::Loading => PopupView::Message(LOADING_DETAILS.into()),
        PopupContent::Failed(message) => PopupView::Warning(message.clone()),
        PopupContent::Details(details) if details.is_empty() => {
            PopupView::Message(NO_SIGNIFICANT_PARAMETERS.into())
        }
        PopupContent::Details(details) => PopupView::Table(popup_table(details, gid, viz)),
    }
}

/// Ontological details are recognised by the procedure field on the first
/// row.
pub fn popup_table(details: &[Detail], gid: &HeaderKey, viz: &dyn VizUrl) -> PopupTable {
    let ontological = details.first().is_some_and(|d| d.procedure.is_some());
    let mut headers = Vec::with_capacity(5);
    if ontological {
        headers.push("Procedure");
    }
    headers.extend(["Parameter", "MP annotation", "", "p-value"]);

    let rows = details
        .iter()
        .map(|detail| {
            let target = if ontological {
                detail.mp_id.as_ref()
            } else {
                detail.parameter_key.as_ref()
            };
            PopupRow {
                procedure: if ontological {
                    Some(detail.procedure.clone().unwrap_or_default())
                } else {
                    None
                },
                parameter: detail.parameter_name.clone(),
                term: detail.term.clone(),
                outcome: detail.outcome.and_then(SelectionOutcome::from_code),
                pvalue: format_pvalue(detail.pvalue),
                link: target.map(|kind| viz.url(gid, kind)),
            }
        })
        .collect();

    PopupTable {
        ontological,
        headers,
        rows,
    }
}

/// Place a popup of `size` near `pointer`, shifting it left/up by any
/// overflow past the `window` edges (including [`POPUP_PADDING`]).
pub fn popup_position(pointer: Point, size: (f64, f64), window: (f64, f64)) -> Point {
    let mut position = pointer;
    let overflow_x = pointer.x + size.0 + POPUP_PADDING - window.0;
    if overflow_x > 0.0 {
        position.x -= overflow_x;
    }
    let overflow_y = pointer.y + size.1 + POPUP_PADDING - window.1;
    if overflow_y > 0.0 {
        position.y -= overflow_y;
    }
    position
}
