use phenomap_protocol::{
    Fill, HitTarget, Point, Rect, RenderCommand, TextAlign, ThemeToken,
};

use super::sections::{Section, paginate};
use crate::color::{CellColor, ColorMapper, ColorMode};
use crate::config::Mode;
use crate::model::{MatrixModel, cell_type, drill_target};
use crate::precision::format_pvalue;

pub const COLUMN_WIDTH: f64 = 102.0;
pub const ROW_HEIGHT: f64 = 47.0;
pub const ROW_HEADER_WIDTH: f64 = 204.0;
pub const HEADER_HEIGHT: f64 = 47.0;
pub const SECTION_GAP: f64 = 12.0;
const FONT_SIZE: f64 = 11.0;

pub const NO_SUBCATEGORY: &str = "No subcategory found";

/// How cells are coloured and which headers drill down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStyle {
    pub mode: Mode,
    pub color_mode: ColorMode,
}

fn section_height(rows: usize) -> f64 {
    HEADER_HEIGHT + rows as f64 * ROW_HEIGHT
}

/// Pixel size of the rendered grid.
pub fn grid_size(model: &MatrixModel, page_size: usize) -> (f64, f64) {
    let width = ROW_HEADER_WIDTH + page_size as f64 * COLUMN_WIDTH;
    let sections = paginate(model.num_columns(), page_size).len();
    if sections == 0 {
        return (width, ROW_HEIGHT);
    }
    let height = sections as f64 * (section_height(model.num_rows()) + SECTION_GAP) - SECTION_GAP;
    (width, height)
}

/// Emit the paged grid: one group per section with a header row and one
/// row per variant.
pub fn render_grid(
    model: &MatrixModel,
    page_size: usize,
    mapper: &ColorMapper,
    style: GridStyle,
) -> Vec<RenderCommand> {
    let sections = paginate(model.num_columns(), page_size);
    if sections.is_empty() {
        return render_notice(page_size);
    }

    let cells = model.num_rows() * page_size + page_size + 1;
    let mut commands = Vec::with_capacity(sections.len() * (cells * 2 + 2));
    for section in &sections {
        let top = section.index as f64 * (section_height(model.num_rows()) + SECTION_GAP);
        render_section(&mut commands, model, section, top, mapper, style);
    }
    commands
}

fn render_notice(page_size: usize) -> Vec<RenderCommand> {
    let width = ROW_HEADER_WIDTH + page_size as f64 * COLUMN_WIDTH;
    vec![
        RenderCommand::BeginGroup {
            id: "notice".into(),
            label: None,
        },
        RenderCommand::DrawText {
            position: Point::new(width / 2.0, ROW_HEIGHT / 2.0),
            text: NO_SUBCATEGORY.into(),
            color: ThemeToken::NoticeText,
            font_size: FONT_SIZE,
            align: TextAlign::Center,
        },
        RenderCommand::EndGroup,
    ]
}

fn render_section(
    commands: &mut Vec<RenderCommand>,
    model: &MatrixModel,
    section: &Section,
    top: f64,
    mapper: &ColorMapper,
    style: GridStyle,
) {
    commands.push(RenderCommand::BeginGroup {
        id: format!("section-{}", section.index),
        label: None,
    });

    // Corner cell above the row headers.
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, top, ROW_HEADER_WIDTH, HEADER_HEIGHT),
        fill: ThemeToken::HeaderBackground.into(),
        border: Some(ThemeToken::SectionBorder),
        hit: None,
    });

    let annotations = model.annotations();
    for (offset, column) in section.columns().enumerate() {
        let x = ROW_HEADER_WIDTH + offset as f64 * COLUMN_WIDTH;
        let annotation = &annotations[column];
        let drillable = drill_target(&annotation.key, style.mode).is_some();
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(x, top, COLUMN_WIDTH, HEADER_HEIGHT),
            fill: ThemeToken::HeaderBackground.into(),
            border: Some(ThemeToken::SectionBorder),
            hit: drillable.then_some(HitTarget::ColumnHeader { column }),
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(x + COLUMN_WIDTH / 2.0, top + HEADER_HEIGHT / 2.0),
            text: annotation.label.clone(),
            color: if drillable {
                ThemeToken::DrillableHeaderText
            } else {
                ThemeToken::HeaderText
            },
            font_size: FONT_SIZE,
            align: TextAlign::Center,
        });
    }

    for pad in 0..section.padding {
        let x = ROW_HEADER_WIDTH + (section.size + pad) as f64 * COLUMN_WIDTH;
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(x, top, COLUMN_WIDTH, HEADER_HEIGHT),
            fill: ThemeToken::PaddingHeader.into(),
            border: None,
            hit: None,
        });
    }

    for (row, variant) in model.variants().iter().enumerate() {
        let y = top + HEADER_HEIGHT + row as f64 * ROW_HEIGHT;
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(0.0, y, ROW_HEADER_WIDTH, ROW_HEIGHT),
            fill: ThemeToken::RowHeaderBackground.into(),
            border: Some(ThemeToken::SectionBorder),
            hit: None,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(8.0, y + ROW_HEIGHT / 2.0),
            text: variant.label.clone(),
            color: ThemeToken::RowHeaderText,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
        });

        for (offset, column) in section.columns().enumerate() {
            let x = ROW_HEADER_WIDTH + offset as f64 * COLUMN_WIDTH;
            let pvalue = model.pvalue(row, column);
            let highlighted = model.is_highlighted(row, column);
            let fill = match mapper.cell_color(pvalue, style.color_mode, highlighted) {
                CellColor::Rgb(rgb) => Fill::Rgb(rgb),
                CellColor::NoData => Fill::Token(ThemeToken::NoData),
            };
            let interactive =
                pvalue.is_some() && cell_type(&annotations[column].key).is_some();
            commands.push(RenderCommand::DrawRect {
                rect: Rect::new(x, y, COLUMN_WIDTH, ROW_HEIGHT),
                fill,
                border: Some(ThemeToken::SectionBorder),
                hit: interactive.then_some(HitTarget::Cell { row, column }),
            });
            if let Some(text) = format_pvalue(pvalue) {
                commands.push(RenderCommand::DrawText {
                    position: Point::new(x + COLUMN_WIDTH / 2.0, y + ROW_HEIGHT / 2.0),
                    text,
                    color: ThemeToken::CellText,
                    font_size: FONT_SIZE,
                    align: TextAlign::Center,
                });
            }
        }
    }

    commands.push(RenderCommand::EndGroup);
}

/// Locate the target under a point of the grid, mirroring the hit regions
/// emitted by [`render_grid`].
pub fn hit_test(commands: &[RenderCommand], point: Point) -> Option<HitTarget> {
    commands.iter().rev().find_map(|cmd| match cmd {
        RenderCommand::DrawRect {
            rect,
            hit: Some(hit),
            ..
        } if rect.contains(point) => Some(*hit),
        _ => None,
    })
}
