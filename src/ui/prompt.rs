use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, PromptKind};

const DIALOG_HEIGHT: u16 = 3;
const MAX_WIDTH: u16 = 60;

/// One-line input box anchored to the bottom of the preview.
pub fn render_prompt(f: &mut Frame, app: &App, kind: PromptKind, content_area: Rect) {
    let theme = &app.theme;

    let dialog_width = MAX_WIDTH.min(content_area.width.saturating_sub(2));
    let dialog_x = content_area.x + 1;
    let dialog_y = content_area
        .y
        .saturating_add(content_area.height)
        .saturating_sub(DIALOG_HEIGHT + 1);
    let dialog_area = Rect::new(dialog_x, dialog_y, dialog_width, DIALOG_HEIGHT);

    f.render_widget(Clear, dialog_area);

    let query = &app.input_buffer;
    let available_width = (dialog_width as usize).saturating_sub(4);
    let display_query = if query.chars().count() > available_width {
        let skip = query.chars().count() - available_width;
        format!("...{}", query.chars().skip(skip + 3).collect::<String>())
    } else {
        query.clone()
    };

    let input_line = Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(display_query, Style::default().fg(theme.foreground)),
        Span::styled("_", Style::default().fg(theme.primary).add_modifier(Modifier::SLOW_BLINK)),
    ]);

    let dialog = Paragraph::new(vec![input_line]).block(
        Block::default()
            .title(kind.title())
            .title_bottom(Line::from(Span::styled(kind.hint(), Style::default().fg(theme.muted))).right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .style(Style::default().bg(theme.dialog_background)),
    );

    f.render_widget(dialog, dialog_area);
}
