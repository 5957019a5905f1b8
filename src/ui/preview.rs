use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::preview::{VariantKey, DATE_SECTIONS};

/// Split `text` into (before, inside, after) by display-cell columns.
fn split_columns(text: &str, column: usize, length: usize) -> (&str, &str, &str) {
    let mut start = text.len();
    let mut end = text.len();
    let mut cells = 0;
    for (idx, ch) in text.char_indices() {
        if cells >= column && start == text.len() {
            start = idx;
        }
        if cells >= column + length {
            end = idx;
            break;
        }
        cells += ch.width().unwrap_or(0);
    }
    let end = end.max(start);
    (&text[..start], &text[start..end], &text[end..])
}

fn is_rule(text: &str) -> bool {
    text.starts_with('─')
}

pub fn render_preview(f: &mut Frame, app: &mut App, area: Rect) {
    let key = app.preview.active_key();
    let mut title = format!(" {} ", key.label());
    if key == VariantKey::Date {
        let date = app.preview.date_view();
        let section = date.current_section();
        title = format!(" {} › {} ({}) ", key.label(), DATE_SECTIONS[section], date.section_sizes()[section]);
    }

    let theme = &app.theme;
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);

    app.preview.resize(inner.width as usize, inner.height as usize);
    app.preview.prepare_frame(inner.height as usize);

    let theme = &app.theme;
    let nav = app.preview.nav();
    let link = nav.rendered_link.and_then(|i| nav.links.get(i));
    let cursor = nav.cursor_line();
    let headers = &nav.header_lines;

    let lines: Vec<Line> = nav
        .lines
        .iter()
        .enumerate()
        .skip(nav.scroll_offset)
        .take(inner.height as usize)
        .map(|(idx, source)| {
            let mut style = Style::default().fg(theme.foreground);
            if headers.binary_search(&idx).is_ok() {
                style = style.fg(theme.header).add_modifier(Modifier::BOLD);
            } else if !source.is_addressable() && is_rule(&source.text) {
                style = style.fg(theme.muted);
            }
            if idx == cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }

            match link.filter(|l| l.line == idx) {
                Some(l) => {
                    let (before, inside, after) = split_columns(&source.text, l.column, l.length);
                    let link_style = style.fg(theme.link).add_modifier(Modifier::UNDERLINED);
                    Line::from(vec![
                        Span::styled(before.to_string(), style),
                        Span::styled(inside.to_string(), link_style),
                        Span::styled(after.to_string(), style),
                    ])
                }
                None => Line::from(Span::styled(source.text.clone(), style)),
            }
        })
        .collect();

    let body = if nav.is_empty() {
        Paragraph::new(Line::from(Span::styled(" no cards: / to search, a for all notes", Style::default().fg(theme.muted))))
    } else {
        Paragraph::new(lines)
    };
    f.render_widget(body.block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_columns_ascii() {
        assert_eq!(split_columns("see [[A]] now", 4, 5), ("see ", "[[A]]", " now"));
        assert_eq!(split_columns("[[A]]", 0, 5), ("", "[[A]]", ""));
    }

    #[test]
    fn test_split_columns_wide_chars() {
        assert_eq!(split_columns("日本 [[A]]", 5, 5), ("日本 ", "[[A]]", ""));
    }

    #[test]
    fn test_split_columns_out_of_range() {
        assert_eq!(split_columns("abc", 10, 2), ("abc", "", ""));
    }
}
