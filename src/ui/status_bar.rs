use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, DialogState};
use crate::preview::StatusMessage;

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let statusbar = &theme.statusbar;
    let preview = &app.preview;

    let brand = Span::styled(" notedeck ", Style::default().fg(statusbar.brand).add_modifier(Modifier::BOLD));
    let separator = || Span::styled("›", Style::default().fg(statusbar.separator));

    let mode_text = match app.dialog {
        DialogState::History => "history",
        DialogState::Prompt(_) => "input",
        DialogState::Help => "help",
        DialogState::None => preview.active_key().label(),
    };
    let mode = Span::styled(format!(" {} ", mode_text), Style::default().fg(statusbar.mode));
    let title = Span::styled(format!(" {}", preview.title()), Style::default().fg(statusbar.foreground));

    let mut left_content = vec![brand, separator(), mode, separator(), title];
    if let Some(message) = preview.status() {
        let color = match message {
            StatusMessage::Info(_) => theme.info,
            StatusMessage::Error(_) => theme.error,
        };
        left_content.push(Span::styled(" › ", Style::default().fg(statusbar.separator)));
        left_content.push(Span::styled(
            message.text().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    let active = preview.active();
    let card_count = active.card_count();
    let position = if card_count == 0 {
        "0/0".to_string()
    } else {
        format!("{}/{}", active.selected_card_index() + 1, card_count)
    };

    let handle = preview.history();
    let history = handle.borrow();
    let place = match history.position() {
        Some((current, total)) => format!(" {}/{} ", current, total),
        None => " ".to_string(),
    };
    let arrows = format!(
        "{}{}{}",
        if history.can_go_back() { "‹" } else { " " },
        place,
        if history.can_go_forward() { "›" } else { " " }
    );
    drop(history);

    let right_content = vec![
        Span::styled(format!("{}  ", arrows), Style::default().fg(theme.muted)),
        Span::styled(format!("card {}", position), Style::default().fg(statusbar.mode)),
        Span::styled("  ? help ", Style::default().fg(statusbar.mode)),
    ];

    let left_width: usize = left_content.iter().map(|s| s.width()).sum();
    let right_width: usize = right_content.iter().map(|s| s.width()).sum();
    let middle_padding = (area.width as usize).saturating_sub(left_width + right_width);
    let bg_style = Style::default().bg(statusbar.background);

    let mut spans = left_content;
    spans.push(Span::styled(" ".repeat(middle_padding), bg_style));
    spans.extend(right_content);

    let status_bar = Paragraph::new(Line::from(spans)).style(bg_style);
    f.render_widget(status_bar, area);
}
