use serde::{Deserialize, Serialize};

use crate::types::Rgb;

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    SectionBorder,

    // Column headers (annotation nodes)
    HeaderBackground,
    HeaderText,
    DrillableHeaderText,
    PaddingHeader,

    // Row headers (genotype variants)
    RowHeaderBackground,
    RowHeaderText,

    CellText,
    NoData,
    NoticeText,
}

/// Fill for a rectangle: either a themed token or a concrete colour
/// computed by the engine (gradient and threshold cells).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fill {
    Token(ThemeToken),
    Rgb(Rgb),
}

impl From<ThemeToken> for Fill {
    fn from(token: ThemeToken) -> Self {
        Self::Token(token)
    }
}

impl From<Rgb> for Fill {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb)
    }
}
