use chrono::{Local, NaiveDate};

use crate::config::Config;
use crate::markup;
use crate::preview::{HistoryItem, ListCursor, Preview};
use crate::ui::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Search,
    Tag,
    Date,
    ViewDate,
    OpenTitle,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            PromptKind::Search => " Search ",
            PromptKind::Tag => " Toggle tag ",
            PromptKind::Date => " Toggle date ",
            PromptKind::ViewDate => " Show day ",
            PromptKind::OpenTitle => " Open note ",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            PromptKind::Date | PromptKind::ViewDate => " YYYY-MM-DD, empty for today ",
            _ => " Enter: ok, Esc: cancel ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    None,
    History,
    Prompt(PromptKind),
    Help,
}

pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub preview: Preview,
    pub dialog: DialogState,
    pub input_buffer: String,
    pub history_items: Vec<HistoryItem>,
    pub history_cursor: ListCursor,
    pub should_quit: bool,
    pub needs_full_clear: bool,
}

/// Empty input means today.
fn prompt_date(input: &str) -> Option<NaiveDate> {
    if input.trim().is_empty() {
        return Some(Local::now().date_naive());
    }
    markup::parse_date(input)
}

impl App {
    pub fn new(config: Config, preview: Preview) -> Self {
        Self {
            config,
            theme: Theme::default(),
            preview,
            dialog: DialogState::None,
            input_buffer: String::new(),
            history_items: Vec::new(),
            history_cursor: ListCursor::new(),
            should_quit: false,
            needs_full_clear: false,
        }
    }

    pub fn open_history_dialog(&mut self) {
        self.history_items = self.preview.show_history();
        if self.history_items.is_empty() {
            self.preview.set_info("history is empty");
            return;
        }
        let current = self.history_items.iter().position(|item| item.current).unwrap_or(0);
        self.history_cursor.set(current, self.history_items.len());
        self.dialog = DialogState::History;
    }

    pub fn history_next(&mut self) {
        self.history_cursor.next(self.history_items.len());
    }

    pub fn history_prev(&mut self) {
        self.history_cursor.prev();
    }

    pub fn confirm_history(&mut self) {
        let position = self.history_cursor.selected(&self.history_items).map(|item| item.position);
        self.close_dialog();
        if let Some(position) = position {
            self.preview.jump_history(position);
        }
    }

    pub fn open_prompt(&mut self, kind: PromptKind) {
        self.input_buffer.clear();
        self.dialog = DialogState::Prompt(kind);
    }

    pub fn close_dialog(&mut self) {
        self.dialog = DialogState::None;
        self.input_buffer.clear();
    }

    pub fn submit_prompt(&mut self) {
        let DialogState::Prompt(kind) = self.dialog else {
            return;
        };
        let input = std::mem::take(&mut self.input_buffer);
        self.close_dialog();
        match kind {
            PromptKind::Search => self.preview.open_search(&input),
            PromptKind::Tag => self.preview.toggle_inline_tag(&input),
            PromptKind::OpenTitle => {
                if !input.trim().is_empty() {
                    self.preview.open_by_title(input.trim());
                }
            }
            PromptKind::Date | PromptKind::ViewDate => match prompt_date(&input) {
                Some(date) if kind == PromptKind::Date => self.preview.toggle_inline_date(date),
                Some(date) => self.preview.open_date(date),
                None => self.preview.set_info(format!("not a date: {}", input.trim())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::{history, PreviewDisplayState, VariantKey};
    use crate::render::MarkdownRenderer;
    use crate::shell::SystemOpener;
    use crate::store::memory::MemoryStore;

    fn app(store: &MemoryStore) -> App {
        let preview = Preview::new(
            Box::new(store.clone()),
            Box::new(MarkdownRenderer::new()),
            Box::new(SystemOpener),
            history::shared(50),
            PreviewDisplayState::default(),
        );
        App::new(Config::default(), preview)
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_note("a", "---\ntitle: A\n---\nline @2024-05-01")
            .with_note("b", "---\ntitle: B\n---\nother")
    }

    #[test]
    fn test_search_prompt_opens_pick_view() {
        let store = store();
        let mut app = app(&store);
        app.preview.open_all();
        app.open_prompt(PromptKind::Search);
        app.input_buffer.push_str("other");
        app.submit_prompt();
        assert_eq!(app.dialog, DialogState::None);
        assert_eq!(app.preview.active_key(), VariantKey::Pick);
    }

    #[test]
    fn test_bad_date_reports_and_stays() {
        let store = store();
        let mut app = app(&store);
        app.preview.open_all();
        app.open_prompt(PromptKind::ViewDate);
        app.input_buffer.push_str("tomorrow-ish");
        app.submit_prompt();
        assert_eq!(app.preview.active_key(), VariantKey::CardList);
        assert!(app.preview.status().is_some());

        app.open_prompt(PromptKind::ViewDate);
        app.input_buffer.push_str("2024-05-01");
        app.submit_prompt();
        assert_eq!(app.preview.active_key(), VariantKey::Date);
    }

    #[test]
    fn test_history_dialog_selects_entry() {
        let store = store();
        let mut app = app(&store);
        app.open_history_dialog();
        assert_eq!(app.dialog, DialogState::None);

        app.preview.open_all();
        app.preview.open_by_title("B");
        app.open_history_dialog();
        assert_eq!(app.dialog, DialogState::History);
        assert_eq!(app.history_items.len(), 1);
        app.history_next();
        app.confirm_history();
        assert_eq!(app.dialog, DialogState::None);
        assert_eq!(app.preview.active().title(), "All notes");
    }

    #[test]
    fn test_empty_date_is_today() {
        assert_eq!(prompt_date(""), Some(Local::now().date_naive()));
        assert_eq!(prompt_date("@2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(prompt_date("2023-02-29"), None);
    }
}
