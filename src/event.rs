use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crate::app::{App, DialogState, PromptKind};
use crate::preview::DisplayToggle;
use crate::shell;
use crate::ui::ui;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// What the loop has to do after a key, beyond updating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Edit,
}

pub fn run_app(terminal: &mut Tui, app: &mut App) -> io::Result<()> {
    loop {
        if app.needs_full_clear {
            terminal.clear()?;
            app.needs_full_clear = false;
        }
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match handle_key(app, key) {
                Action::None => {}
                Action::Quit => return Ok(()),
                Action::Edit => edit_externally(terminal, app)?,
            },
            Event::Resize(_, _) => app.needs_full_clear = true,
            _ => {}
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

/// Hand the terminal to the editor, then take it back and reload everything.
fn edit_externally(terminal: &mut Tui, app: &mut App) -> io::Result<()> {
    let Some((path, line)) = app.preview.editor_target() else {
        app.preview.set_info("nothing to edit here");
        return Ok(());
    };
    let editor = shell::editor_command(app.config.editor.as_deref());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    let status = shell::run_editor(&editor, &path, line);
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    app.needs_full_clear = true;

    match status {
        Ok(status) if status.success() => info!(path = %path.display(), "editor closed"),
        Ok(status) => app.preview.set_info(format!("{editor} exited with {status}")),
        Err(err) => {
            warn!(editor = %editor, error = %err, "failed to run editor");
            app.preview.set_info(format!("could not run {editor}: {err}"));
        }
    }
    app.preview.refresh();
    Ok(())
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    match app.dialog {
        DialogState::Prompt(_) => handle_prompt_key(app, key),
        DialogState::History => handle_history_key(app, key),
        DialogState::Help => app.close_dialog(),
        DialogState::None => return handle_preview_key(app, key),
    }
    Action::None
}

fn handle_prompt_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Enter => app.submit_prompt(),
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('H') => app.close_dialog(),
        KeyCode::Char('j') | KeyCode::Down => app.history_next(),
        KeyCode::Char('k') | KeyCode::Up => app.history_prev(),
        KeyCode::Char('g') | KeyCode::Home => app.history_cursor.first(),
        KeyCode::Char('G') | KeyCode::End => app.history_cursor.last(app.history_items.len()),
        KeyCode::Enter => app.confirm_history(),
        _ => {}
    }
}

fn handle_preview_key(app: &mut App, key: KeyEvent) -> Action {
    let preview = &mut app.preview;
    preview.clear_status();

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('d') => preview.page_down(),
            KeyCode::Char('u') => preview.page_up(),
            _ => {}
        }
        return Action::None;
    }

    match key.code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => preview.move_down(),
        KeyCode::Char('k') | KeyCode::Up => preview.move_up(),
        KeyCode::Char('J') => preview.card_down(),
        KeyCode::Char('K') => preview.card_up(),
        KeyCode::Char('}') => preview.next_header(),
        KeyCode::Char('{') => preview.prev_header(),
        KeyCode::Char(')') => preview.section_down(),
        KeyCode::Char('(') => preview.section_up(),
        KeyCode::Char('g') | KeyCode::Home => preview.goto_top(),
        KeyCode::Char('G') | KeyCode::End => preview.goto_bottom(),
        KeyCode::Tab => preview.highlight_next_link(),
        KeyCode::BackTab => preview.highlight_prev_link(),
        KeyCode::Enter => preview.open_link(),
        KeyCode::Char('b') | KeyCode::Left => preview.nav_back(),
        KeyCode::Char('f') | KeyCode::Right => preview.nav_forward(),
        KeyCode::Char('x') => preview.toggle_todo(),
        KeyCode::Char('D') => preview.append_done(),
        KeyCode::Char('a') => preview.open_all(),
        KeyCode::Char('c') => preview.open_compose(),
        KeyCode::Char('r') => preview.refresh(),
        KeyCode::Char('F') => preview.toggle_display(DisplayToggle::Frontmatter),
        KeyCode::Char('T') => preview.toggle_display(DisplayToggle::Title),
        KeyCode::Char('M') => preview.toggle_display(DisplayToggle::Markdown),
        KeyCode::Char('Y') => preview.toggle_display(DisplayToggle::GlobalTags),
        KeyCode::Char('e') => return Action::Edit,
        KeyCode::Char('H') => app.open_history_dialog(),
        KeyCode::Char('/') => app.open_prompt(PromptKind::Search),
        KeyCode::Char('t') => app.open_prompt(PromptKind::Tag),
        KeyCode::Char('@') => app.open_prompt(PromptKind::Date),
        KeyCode::Char('d') => app.open_prompt(PromptKind::ViewDate),
        KeyCode::Char('o') => app.open_prompt(PromptKind::OpenTitle),
        KeyCode::Char('?') => app.dialog = DialogState::Help,
        _ => {}
    }
    Action::None
}
