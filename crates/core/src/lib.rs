//! Engine behind the phenotype heatmap: matrix model, colour mapping,
//! threshold slider, navigation and popup state, and the render-command
//! views consumed by every front end.

pub mod color;
pub mod config;
pub mod debounce;
pub mod error;
pub mod heatmap;
pub mod input;
pub mod model;
pub mod precision;
pub mod request;
pub mod slider;
pub mod svg;
pub mod views;

pub use config::{DefaultExtractors, Extractors, HeatmapConfig, HeatmapOptions, Mode, VizUrl};
pub use error::HeatmapError;
pub use heatmap::{Action, GeneDetail, Heatmap, LoadOutcome, LoadStatus};
