//! REST resource URLs and the request handles returned to the host.

use phenomap_protocol::HeaderKey;
use serde::Serialize;

use crate::config::Mode;
use crate::model::DetailTicket;

/// Matrix fetch for one slice of the annotation tree. `key` is `None` for
/// the overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRequest {
    pub generation: u64,
    pub key: Option<HeaderKey>,
    pub label: Option<String>,
    pub url: String,
}

/// Detail fetch for the popup of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub ticket: DetailTicket,
    pub url: String,
}

/// `<json><mode>/heatmap?mgiid=<id>[&type=<key>]`
pub fn matrix_url(json_base: &str, mode: Mode, mgi_id: &str, kind: Option<&HeaderKey>) -> String {
    let mut url = format!("{json_base}{}/heatmap?mgiid={mgi_id}", mode.path());
    if let Some(kind) = kind {
        url.push_str(&format!("&type={kind}"));
    }
    url
}

/// `<json><mode>/details[/parameter]?gid=<gid>&type=<type>&threshold=<t>`.
/// Procedural parameters (non-integer types) have their own resource.
pub fn details_url(
    json_base: &str,
    mode: Mode,
    gid: &HeaderKey,
    kind: &HeaderKey,
    threshold: f64,
) -> String {
    let parameter = if mode == Mode::Procedural && kind.as_int().is_none() {
        "/parameter"
    } else {
        ""
    };
    format!(
        "{json_base}{}/details{parameter}?gid={gid}&type={kind}&threshold={threshold}",
        mode.path()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_urls() {
        assert_eq!(
            matrix_url("rest/", Mode::Procedural, "MGI:104874", None),
            "rest/procedural/heatmap?mgiid=MGI:104874"
        );
        assert_eq!(
            matrix_url("rest/", Mode::Ontological, "MGI:104874", Some(&HeaderKey::from("MP:0005378"))),
            "rest/ontological/heatmap?mgiid=MGI:104874&type=MP:0005378"
        );
    }

    #[test]
    fn details_urls() {
        assert_eq!(
            details_url("rest/", Mode::Procedural, &HeaderKey::Int(3), &HeaderKey::Int(12), 0.0001),
            "rest/procedural/details?gid=3&type=12&threshold=0.0001"
        );
        assert_eq!(
            details_url("rest/", Mode::Procedural, &HeaderKey::Int(3), &HeaderKey::from("IMPC_BWT_001_001"), 0.05),
            "rest/procedural/details/parameter?gid=3&type=IMPC_BWT_001_001&threshold=0.05"
        );
        assert_eq!(
            details_url("rest/", Mode::Ontological, &HeaderKey::Int(3), &HeaderKey::from("MP:0005378"), 0.05),
            "rest/ontological/details?gid=3&type=MP:0005378&threshold=0.05"
        );
    }
}
