pub mod grid;
pub mod popup;
pub mod sections;

pub use grid::{GridStyle, grid_size, hit_test, render_grid};
pub use popup::{PopupRow, PopupTable, PopupView, popup_position, popup_table, popup_view};
pub use sections::{Section, paginate};
