use serde::{Deserialize, Serialize};

use crate::theme::{Fill, ThemeToken};
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` for the grid. Renderers (SVG,
/// terminal, the host page through the WASM bridge) consume this list
/// sequentially; each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle. `hit` identifies what the rectangle stands
    /// for so the host can route pointer events back to the engine.
    DrawRect {
        rect: Rect,
        fill: Fill,
        border: Option<ThemeToken>,
        hit: Option<HitTarget>,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Begin a logical group (one grid section, the notice area).
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

/// What a rectangle on screen maps back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitTarget {
    /// A displayed column header (an annotation node), indexed into the
    /// full column axis, not the section.
    ColumnHeader { column: usize },
    /// A p-value cell: `row` is the variant, `column` the annotation.
    Cell { row: usize, column: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
