use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

const POPUP_WIDTH: u16 = 56;
const POPUP_MAX_VISIBLE_ITEMS: usize = 12;

/// Window of `visible` rows that keeps `selected` on screen.
fn scroll_for(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    selected.saturating_sub(visible - 1)
}

fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        if out.width() + 2 > width {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

pub fn render_history_dialog(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = f.area();
    let items = &app.history_items;

    let visible = items.len().min(POPUP_MAX_VISIBLE_ITEMS);
    let popup_width = POPUP_WIDTH.min(area.width.saturating_sub(2));
    let popup_height = (visible as u16 + 2).min(area.height.saturating_sub(2));
    let popup_area = Rect::new(
        area.x + area.width.saturating_sub(popup_width) / 2,
        area.y + area.height.saturating_sub(popup_height) / 2,
        popup_width,
        popup_height,
    );
    f.render_widget(Clear, popup_area);

    let selected = app.history_cursor.index();
    let scroll = scroll_for(selected, visible);
    let name_width = (popup_width as usize).saturating_sub(16);

    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible)
        .map(|(i, item)| {
            let marker = if item.current { "● " } else { "  " };
            let mut style = Style::default().fg(theme.foreground);
            if i == selected {
                style = style.bg(theme.primary).fg(theme.dialog_background).add_modifier(Modifier::BOLD);
            }
            Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.info)),
                Span::styled(format!("{:<8}", item.variant.label()), Style::default().fg(theme.muted)),
                Span::styled(truncate(&item.title, name_width), style),
            ])
        })
        .collect();

    let dialog = Paragraph::new(lines).block(
        Block::default()
            .title(" History ")
            .title_bottom(Line::from(Span::styled(" j/k: move, Enter: go, Esc: close ", Style::default().fg(theme.muted))).right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .style(Style::default().bg(theme.dialog_background)),
    );
    f.render_widget(dialog, popup_area);
}
