mod history_dialog;
mod preview;
mod prompt;
mod status_bar;
mod theme;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub use theme::Theme;

use crate::app::{App, DialogState};

const HELP: &[(&str, &str)] = &[
    ("j / k", "next / previous line"),
    ("J / K", "next / previous card"),
    ("} / {", "next / previous header"),
    (") / (", "next / previous section (date view)"),
    ("g / G", "top / bottom"),
    ("Ctrl-d / Ctrl-u", "half page down / up"),
    ("Tab / S-Tab", "highlight next / previous link"),
    ("Enter", "follow link"),
    ("b / f", "back / forward"),
    ("H", "history"),
    ("x", "toggle todo"),
    ("D", "toggle #done"),
    ("t", "toggle tag"),
    ("@", "toggle date"),
    ("/", "search"),
    ("a", "all notes"),
    ("o", "open note by title"),
    ("c", "compose selected note"),
    ("d", "show a day"),
    ("e", "edit in $EDITOR"),
    ("r", "reload"),
    ("F T M Y", "frontmatter, title, markdown, tags"),
    ("q", "quit"),
];

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    preview::render_preview(f, app, chunks[0]);
    status_bar::render_status_bar(f, app, chunks[1]);

    match app.dialog {
        DialogState::None => {}
        DialogState::History => history_dialog::render_history_dialog(f, app),
        DialogState::Prompt(kind) => prompt::render_prompt(f, app, kind, chunks[0]),
        DialogState::Help => render_help(f, app),
    }
}

fn render_help(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = f.area();
    let width = 52u16.min(area.width.saturating_sub(2));
    let height = (HELP.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    f.render_widget(Clear, popup);

    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!(" {:<16}", keys), Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)),
                Span::styled(*action, Style::default().fg(theme.foreground)),
            ])
        })
        .collect();

    let help = Paragraph::new(lines).block(
        Block::default()
            .title(" Keys ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .style(Style::default().bg(theme.dialog_background)),
    );
    f.render_widget(help, popup);
}
