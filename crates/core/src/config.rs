//! Construction-time configuration, validated eagerly.

use phenomap_protocol::{AnnotationHeader, HeaderKey, VariantHeader};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::color::{ColorEndpoints, ColorError, Endpoint};

pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_JSON_BASE: &str = "rest/";
pub const DEFAULT_JSSRC_BASE: &str = "js/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid heatmap host: no container identifier")]
    MissingContainer,
    #[error("invalid MGI identifier")]
    InvalidMgiId,
    #[error("invalid visualisation target URL generator")]
    MissingVizUrl,
    #[error("invalid page size: {0}")]
    InvalidPageSize(usize),
    #[error("invalid colour option: {0}")]
    InvalidColour(#[from] ColorError),
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// Which grouping of annotations is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Ontological,
    Procedural,
}

impl Mode {
    /// Anything other than `"ontological"` selects procedural mode.
    pub fn from_option(mode: Option<&str>) -> Self {
        match mode {
            Some("ontological") => Self::Ontological,
            _ => Self::Procedural,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Ontological => Self::Procedural,
            Self::Procedural => Self::Ontological,
        }
    }

    /// Path segment of the REST resources for this mode.
    pub fn path(self) -> &'static str {
        match self {
            Self::Ontological => "ontological",
            Self::Procedural => "procedural",
        }
    }
}

/// Maps a `(genotype id, annotation type)` pair to the URL of the
/// visualisation page for that cell.
pub trait VizUrl {
    fn url(&self, gid: &HeaderKey, kind: &HeaderKey) -> String;
}

impl<F> VizUrl for F
where
    F: Fn(&HeaderKey, &HeaderKey) -> String,
{
    fn url(&self, gid: &HeaderKey, kind: &HeaderKey) -> String {
        self(gid, kind)
    }
}

/// Display formatters and field extractors. Override only what differs
/// from the service's default payload shape.
pub trait Extractors {
    /// Label of a displayed column (annotation node).
    fn column_label(&self, header: &AnnotationHeader) -> String {
        header.value.clone()
    }

    /// Label of a displayed row, given the label derived from the
    /// differences between variants.
    fn row_label(&self, _variant: &VariantHeader, derived: &str) -> String {
        derived.to_string()
    }

    fn column_key(&self, header: &AnnotationHeader) -> HeaderKey {
        header.key.clone()
    }

    fn row_key(&self, variant: &VariantHeader) -> HeaderKey {
        variant.key.clone()
    }

    /// p-value held by a raw significance cell; `None` marks no data.
    fn pvalue(&self, cell: &Value) -> Option<f64> {
        default_pvalue(cell)
    }
}

/// The payload shape emitted by the REST service.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractors;

impl Extractors for DefaultExtractors {}

/// Numbers in `[0, 1]` are p-values; `null`, negative sentinels and
/// anything else are no data.
pub fn default_pvalue(cell: &Value) -> Option<f64> {
    cell.as_f64().filter(|p| (0.0..=1.0).contains(p))
}

/// Options object as supplied by the host page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapOptions {
    pub container: Option<String>,
    pub mgiid: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub ncol: Option<usize>,
    #[serde(default)]
    pub url: UrlOptions,
    #[serde(default)]
    pub colours: ColourOptions,
}

impl HeatmapOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlOptions {
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub jssrc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColourOptions {
    pub significant: Option<String>,
    pub insignificant: Option<String>,
    pub highlighted_significant: Option<String>,
    pub highlighted_insignificant: Option<String>,
}

/// Validated configuration owned by the heatmap coordinator.
pub struct HeatmapConfig {
    pub container: String,
    pub mgi_id: String,
    pub mode: Mode,
    pub page_size: usize,
    /// REST base, always ending with `/`.
    pub json_base: String,
    /// Script base, always ending with `/`; the manual lives next to it.
    pub jssrc_base: String,
    pub endpoints: ColorEndpoints,
    pub viz: Box<dyn VizUrl>,
    pub extractors: Box<dyn Extractors>,
}

impl std::fmt::Debug for HeatmapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeatmapConfig")
            .field("container", &self.container)
            .field("mgi_id", &self.mgi_id)
            .field("mode", &self.mode)
            .field("page_size", &self.page_size)
            .field("json_base", &self.json_base)
            .field("jssrc_base", &self.jssrc_base)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl HeatmapConfig {
    /// Validate `options` and the injected URL generator.
    pub fn new(options: HeatmapOptions, viz: Option<Box<dyn VizUrl>>) -> Result<Self, ConfigError> {
        let container = options
            .container
            .filter(|c| !c.trim().is_empty())
            .ok_or(ConfigError::MissingContainer)?;
        let mgi_id = options
            .mgiid
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::InvalidMgiId)?;
        let viz = viz.ok_or(ConfigError::MissingVizUrl)?;

        let page_size = options.ncol.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::InvalidPageSize(page_size));
        }

        let mut endpoints = ColorEndpoints::default();
        let colours = [
            (Endpoint::Significant, options.colours.significant),
            (Endpoint::Insignificant, options.colours.insignificant),
            (
                Endpoint::HighlightedSignificant,
                options.colours.highlighted_significant,
            ),
            (
                Endpoint::HighlightedInsignificant,
                options.colours.highlighted_insignificant,
            ),
        ];
        for (endpoint, spec) in colours {
            if let Some(spec) = spec {
                endpoints.set(endpoint, &spec)?;
            }
        }

        Ok(Self {
            container,
            mgi_id,
            mode: Mode::from_option(options.mode.as_deref()),
            page_size,
            json_base: end_with_slash(options.url.json.as_deref().unwrap_or(DEFAULT_JSON_BASE)),
            jssrc_base: end_with_slash(options.url.jssrc.as_deref().unwrap_or(DEFAULT_JSSRC_BASE)),
            endpoints,
            viz,
            extractors: Box::new(DefaultExtractors),
        })
    }

    /// Replace the default formatters/extractors.
    pub fn with_extractors(mut self, extractors: Box<dyn Extractors>) -> Self {
        self.extractors = extractors;
        self
    }

    /// Location of the user manual linked from the navigation bar.
    pub fn manual_url(&self) -> String {
        format!("{}../manual.html", self.jssrc_base)
    }
}

fn end_with_slash(s: &str) -> String {
    if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{s}/")
    }
}
