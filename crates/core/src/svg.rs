//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use phenomap_protocol::{Fill, RenderCommand, TextAlign, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64) -> String {
    let mut svg = String::with_capacity(commands.len() * 120);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:Verdana,sans-serif">"#,
    ));
    svg.push_str(&format!(
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        resolve_color(ThemeToken::Background),
    ));

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect, fill, border, ..
            } => {
                let fill = match fill {
                    Fill::Token(token) => resolve_color(*token).to_string(),
                    Fill::Rgb(rgb) => rgb.to_hex(),
                };
                let stroke = border
                    .map(|b| format!(r#" stroke="{}" stroke-width="1""#, resolve_color(b)))
                    .unwrap_or_default();
                svg.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}"{stroke}/>"#,
                    rect.x, rect.y, rect.w, rect.h,
                ));
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}" dominant-baseline="middle">{}</text>"#,
                    position.x,
                    position.y,
                    resolve_color(*color),
                    escape_xml(text),
                ));
            }
            RenderCommand::BeginGroup { id, .. } => {
                svg.push_str(&format!(r#"<g id="{}">"#, escape_xml(id)));
            }
            RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }

    svg.push_str("</svg>");
    svg
}

fn resolve_color(token: ThemeToken) -> &'static str {
    match token {
        ThemeToken::Background => "#ffffff",
        ThemeToken::SectionBorder => "#dddddd",
        ThemeToken::HeaderBackground => "#f5f5f5",
        ThemeToken::HeaderText | ThemeToken::RowHeaderText | ThemeToken::CellText => "#333333",
        ThemeToken::DrillableHeaderText => "#0066cc",
        ThemeToken::PaddingHeader => "#fafafa",
        ThemeToken::RowHeaderBackground => "#eeeeee",
        ThemeToken::NoData => "#cccccc",
        ThemeToken::NoticeText => "#999999",
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use phenomap_protocol::{Point, Rect, Rgb};

    #[test]
    fn basic_svg_output() {
        let commands = vec![
            RenderCommand::BeginGroup {
                id: "section-0".into(),
                label: None,
            },
            RenderCommand::DrawRect {
                rect: Rect::new(10.0, 20.0, 102.0, 47.0),
                fill: Rgb::new(0x00, 0x99, 0xff).into(),
                border: Some(ThemeToken::SectionBorder),
                hit: None,
            },
            RenderCommand::EndGroup,
        ];
        let svg = render_svg(&commands, 800.0, 400.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r##"fill="#0099ff""##));
        assert!(svg.contains(r#"<g id="section-0">"#));
    }

    #[test]
    fn escapes_xml_entities() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 0.0),
            text: "Akt2<tm1a(EUCOMM)Wtsi> & co".into(),
            color: ThemeToken::RowHeaderText,
            font_size: 11.0,
            align: TextAlign::Left,
        }];
        let svg = render_svg(&commands, 400.0, 100.0);
        assert!(svg.contains("Akt2&lt;tm1a(EUCOMM)Wtsi&gt; &amp; co"));
    }
}
