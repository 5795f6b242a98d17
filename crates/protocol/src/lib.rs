pub mod commands;
pub mod payload;
pub mod theme;
pub mod types;

pub use commands::{HitTarget, RenderCommand, TextAlign};
pub use payload::{
    AnnotationHeader, Detail, DetailsResponse, HeaderKey, HeatmapData, SelectionOutcome,
    VariantHeader,
};
pub use theme::{Fill, ThemeToken};
pub use types::{Point, Rect, Rgb, Rgba};
