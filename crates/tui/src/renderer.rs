use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use phenomap_core::Heatmap;
use phenomap_core::precision::format_pvalue;
use phenomap_core::views::grid::{COLUMN_WIDTH, ROW_HEIGHT};
use phenomap_core::views::hit_test;
use phenomap_protocol::{Fill, HitTarget, Point, RenderCommand, TextAlign, ThemeToken};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};

/// Terminal cells per grid column and per grid row.
const CELL_COLS: f64 = 12.0;
const CELL_ROWS: f64 = 2.0;

const THRESHOLDS: [&str; 4] = ["0.0001", "0.001", "0.01", "0.05"];

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Background => Color::Black,
        ThemeToken::SectionBorder => Color::DarkGray,
        ThemeToken::HeaderBackground => Color::Rgb(40, 40, 40),
        ThemeToken::HeaderText => Color::Gray,
        ThemeToken::DrillableHeaderText => Color::LightBlue,
        ThemeToken::PaddingHeader => Color::Rgb(25, 25, 25),
        ThemeToken::RowHeaderBackground => Color::Rgb(30, 30, 30),
        ThemeToken::RowHeaderText => Color::White,
        ThemeToken::CellText => Color::Black,
        ThemeToken::NoData => Color::DarkGray,
        ThemeToken::NoticeText => Color::Gray,
    }
}

fn fill_to_color(fill: Fill) -> Color {
    match fill {
        Fill::Token(token) => theme_to_color(token),
        Fill::Rgb(rgb) => Color::Rgb(rgb.r, rgb.g, rgb.b),
    }
}

fn sx() -> f64 {
    CELL_COLS / COLUMN_WIDTH
}

fn sy() -> f64 {
    CELL_ROWS / ROW_HEIGHT
}

/// Draw render commands into `area`, scrolled down by `scroll` terminal
/// rows.
fn draw_commands(buf: &mut Buffer, area: Rect, commands: &[RenderCommand], scroll: u16) {
    let to_cell = |x: f64, y: f64| -> (i32, i32) {
        (
            (x * sx()).round() as i32,
            (y * sy()).round() as i32 - i32::from(scroll),
        )
    };
    let in_area = |col: i32, row: i32| -> Option<(u16, u16)> {
        let (col, row) = (u16::try_from(col).ok()?, u16::try_from(row).ok()?);
        (col < area.width && row < area.height).then_some((area.x + col, area.y + row))
    };

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect { rect, fill, .. } => {
                let (c0, r0) = to_cell(rect.x, rect.y);
                let (c1, r1) = to_cell(rect.right(), rect.bottom());
                let bg = fill_to_color(*fill);
                for row in r0..r1.max(r0 + 1) {
                    // Leave a one-column gutter so neighbouring cells stay apart.
                    for col in c0..(c1 - 1).max(c0 + 1) {
                        if let Some((x, y)) = in_area(col, row) {
                            buf[(x, y)].set_char(' ').set_bg(bg);
                        }
                    }
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                ..
            } => {
                let (cx, row) = to_cell(position.x, position.y - 1.0);
                let len = text.chars().count() as i32;
                let max = match align {
                    TextAlign::Left => i32::from(area.width),
                    _ => CELL_COLS as i32 - 1,
                };
                let shown = len.min(max);
                let start = match align {
                    TextAlign::Left => cx,
                    TextAlign::Center => cx - shown / 2,
                    TextAlign::Right => cx - shown,
                };
                for (i, ch) in text.chars().take(shown as usize).enumerate() {
                    if let Some((x, y)) = in_area(start + i as i32, row) {
                        buf[(x, y)].set_char(ch).set_fg(theme_to_color(*color));
                    }
                }
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

/// Grid point under a terminal cell of the content area.
fn grid_point(content: Rect, column: u16, row: u16, scroll: u16) -> Option<Point> {
    let col = column.checked_sub(content.x)?;
    let row = row.checked_sub(content.y)? + scroll;
    Some(Point::new(
        (f64::from(col) + 0.5) / sx(),
        (f64::from(row) + 0.5) / sy(),
    ))
}

fn describe(heatmap: &Heatmap, target: HitTarget) -> String {
    let Some(matrix) = heatmap.matrix() else {
        return String::new();
    };
    match target {
        HitTarget::ColumnHeader { column } => matrix
            .annotations()
            .get(column)
            .map(|a| format!("{} ({})", a.label, a.key))
            .unwrap_or_default(),
        HitTarget::Cell { row, column } => {
            let variant = matrix.variants().get(row).map_or("", |v| v.label.as_str());
            let annotation = matrix.annotations().get(column).map_or("", |a| a.label.as_str());
            let pvalue = format_pvalue(matrix.pvalue(row, column)).unwrap_or_default();
            let link = heatmap.click_cell(row, column).unwrap_or_default();
            format!("{variant} × {annotation}: p = {pvalue}  {link}")
        }
    }
}

pub fn render_tui(heatmap: &mut Heatmap) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let started = Instant::now();
    let mut scroll: u16 = 0;
    let mut threshold_index = 0;
    let mut status = String::new();

    loop {
        heatmap.poll(started.elapsed());
        let commands = heatmap.render();
        let (_, grid_height) = heatmap.grid_size();
        let max_scroll = (grid_height * sy()).ceil() as u16;

        let mut content_area = Rect::default();
        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, 1);
            let mode = if heatmap.is_gradient() {
                "gradient".to_string()
            } else {
                format!("p < {}", heatmap.slider().text())
            };
            let header = Block::default()
                .title(format!(
                    " phenomap: {} | {} | g gradient | t threshold | click peg | q quit ",
                    heatmap.title(),
                    mode
                ))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            content_area = Rect::new(0, 1, area.width, area.height.saturating_sub(2));
            let block = Block::default()
                .borders(Borders::NONE)
                .style(Style::default().bg(Color::Black));
            frame.render_widget(block, content_area);
            draw_commands(frame.buffer_mut(), content_area, &commands, scroll);

            let status_area = Rect::new(0, area.height.saturating_sub(1), area.width, 1);
            let footer = Block::default()
                .title(status.as_str())
                .style(Style::default().fg(Color::Gray).bg(Color::Black));
            frame.render_widget(footer, status_area);
        })?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('g') => heatmap.set_gradient(!heatmap.is_gradient()),
                KeyCode::Char('t') => {
                    threshold_index = (threshold_index + 1) % THRESHOLDS.len();
                    heatmap.set_threshold_text(THRESHOLDS[threshold_index], started.elapsed());
                }
                KeyCode::Up => scroll = scroll.saturating_sub(1),
                KeyCode::Down => scroll = (scroll + 1).min(max_scroll),
                KeyCode::PageUp => scroll = scroll.saturating_sub(content_area.height),
                KeyCode::PageDown => scroll = (scroll + content_area.height).min(max_scroll),
                _ => {}
            },
            Event::Mouse(mouse) => {
                let target = grid_point(content_area, mouse.column, mouse.row, scroll)
                    .and_then(|p| hit_test(&commands, p));
                match mouse.kind {
                    MouseEventKind::Moved => {
                        status = target.map(|t| describe(heatmap, t)).unwrap_or_default();
                    }
                    MouseEventKind::Down(MouseButton::Left) => match target {
                        Some(HitTarget::Cell { row, .. }) => {
                            heatmap.toggle_row_peg(row);
                        }
                        Some(HitTarget::ColumnHeader { column }) => {
                            heatmap.toggle_column_peg(column);
                        }
                        None => {}
                    },
                    MouseEventKind::ScrollDown => scroll = (scroll + 1).min(max_scroll),
                    MouseEventKind::ScrollUp => scroll = scroll.saturating_sub(1),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
