pub mod labels;
pub mod matrix;
pub mod navigation;
pub mod popup;

pub use labels::{VariantDiff, VariantLabels, derive_labels};
pub use matrix::{Annotation, Extremes, LoadError, MatrixModel, Variant};
pub use navigation::{Breadcrumb, NavigationStack, cell_type, drill_target};
pub use popup::{Applied, DetailTicket, PopupContent, PopupSession, PopupToken};
