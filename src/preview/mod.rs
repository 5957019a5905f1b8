//! The preview pane: cards rendered into addressable lines, a cursor that
//! moves through them, links, line edits, and back/forward history.

pub mod history;
mod line_ops;
pub mod lines;
pub mod links;
pub mod list_cursor;
pub mod nav;
pub mod partition;
pub mod variants;

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, warn};

pub use history::{HistoryItem, NavEntry, SharedNavHistory, DEFAULT_HISTORY_LIMIT};
pub use lines::Target;
pub use links::{Link, LinkTarget};
pub use list_cursor::ListCursor;
pub use nav::{DisplayToggle, PreviewDisplayState, PreviewNavState};
pub use variants::{
    Card, CardListPreview, ComposePreview, DatePreview, PickPreview, PreviewVariant, VariantKey,
    DATE_SECTIONS,
};

use crate::markup;
use crate::render::LineRenderer;
use crate::shell::Opener;
use crate::store::{LineFilter, Note, NoteId, NoteStore, SearchOptions, StoreError};

const SEARCH_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

impl StatusMessage {
    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Info(text) | StatusMessage::Error(text) => text,
        }
    }
}

struct Variants {
    card_list: CardListPreview,
    pick: PickPreview,
    compose: ComposePreview,
    date: DatePreview,
}

impl Variants {
    fn get(&self, key: VariantKey) -> &dyn PreviewVariant {
        match key {
            VariantKey::CardList => &self.card_list,
            VariantKey::Pick => &self.pick,
            VariantKey::Compose => &self.compose,
            VariantKey::Date => &self.date,
        }
    }

    fn get_mut(&mut self, key: VariantKey) -> &mut dyn PreviewVariant {
        match key {
            VariantKey::CardList => &mut self.card_list,
            VariantKey::Pick => &mut self.pick,
            VariantKey::Compose => &mut self.compose,
            VariantKey::Date => &mut self.date,
        }
    }
}

/// Cards for the date view plus how many belong to each section.
struct DateCards {
    cards: Vec<Card>,
    sizes: [usize; 3],
}

pub struct Preview {
    store: Box<dyn NoteStore>,
    renderer: Box<dyn LineRenderer>,
    opener: Box<dyn Opener>,
    variants: Variants,
    active: VariantKey,
    width: usize,
    height: usize,
    status: Option<StatusMessage>,
}

impl Preview {
    pub fn new(
        store: Box<dyn NoteStore>,
        renderer: Box<dyn LineRenderer>,
        opener: Box<dyn Opener>,
        history: SharedNavHistory,
        display: PreviewDisplayState,
    ) -> Self {
        let variants = Variants {
            card_list: CardListPreview::new(history.clone(), display),
            pick: PickPreview::new(history.clone(), display),
            compose: ComposePreview::new(history.clone(), display),
            date: DatePreview::new(history, display),
        };
        Self {
            store,
            renderer,
            opener,
            variants,
            active: VariantKey::CardList,
            width: 80,
            height: 24,
            status: None,
        }
    }

    pub fn active(&self) -> &dyn PreviewVariant {
        self.variants.get(self.active)
    }

    fn active_mut(&mut self) -> &mut dyn PreviewVariant {
        self.variants.get_mut(self.active)
    }

    pub fn active_key(&self) -> VariantKey {
        self.active
    }

    pub fn nav(&self) -> &PreviewNavState {
        self.active().nav()
    }

    pub fn display(&self) -> &PreviewDisplayState {
        self.active().display()
    }

    pub fn history(&self) -> SharedNavHistory {
        self.active().history()
    }

    pub fn date_view(&self) -> &DatePreview {
        &self.variants.date
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage::Info(text.into()));
    }

    fn report(&mut self, context: &str, err: &StoreError) {
        warn!(error = %err, "{context}");
        self.status = Some(StatusMessage::Error(format!("{context}: {err}")));
    }

    /// Text of the status bar's title slot: variant-specific.
    pub fn title(&self) -> String {
        match self.active {
            VariantKey::Date => self.variants.date.display_title(),
            VariantKey::Pick => format!("/{}", self.variants.pick.query()),
            _ => self.active().title().to_string(),
        }
    }

    fn layout(&mut self) {
        let width = self.width;
        let renderer = self.renderer.as_ref();
        self.variants.get_mut(self.active).layout(width, renderer);
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.height = height;
        if width != self.width {
            self.width = width;
            self.layout();
        }
    }

    /// Called right before painting with the pane's inner height.
    pub fn prepare_frame(&mut self, height: usize) {
        self.height = height;
        let nav = self.active_mut().nav_mut();
        nav.ensure_cursor_visible(height);
        nav.snapshot_rendered_link();
    }

    pub fn toggle_display(&mut self, which: DisplayToggle) {
        self.active_mut().display_mut().toggle(which);
        self.layout();
    }

    // movement

    pub fn move_down(&mut self) {
        self.active_mut().nav_mut().move_down();
    }

    pub fn move_up(&mut self) {
        self.active_mut().nav_mut().move_up();
    }

    pub fn card_down(&mut self) {
        self.active_mut().nav_mut().card_down();
    }

    pub fn card_up(&mut self) {
        self.active_mut().nav_mut().card_up();
    }

    pub fn next_header(&mut self) {
        self.active_mut().nav_mut().next_header();
    }

    pub fn prev_header(&mut self) {
        self.active_mut().nav_mut().prev_header();
    }

    pub fn goto_top(&mut self) {
        self.active_mut().nav_mut().goto_top();
    }

    pub fn goto_bottom(&mut self) {
        self.active_mut().nav_mut().goto_bottom();
    }

    pub fn page_down(&mut self) {
        for _ in 0..self.height.max(1) / 2 {
            if !self.active_mut().nav_mut().move_down() {
                break;
            }
        }
    }

    pub fn page_up(&mut self) {
        for _ in 0..self.height.max(1) / 2 {
            if !self.active_mut().nav_mut().move_up() {
                break;
            }
        }
    }

    pub fn section_down(&mut self) {
        if self.active == VariantKey::Date {
            self.variants.date.section_down();
        }
    }

    pub fn section_up(&mut self) {
        if self.active == VariantKey::Date {
            self.variants.date.section_up();
        }
    }

    pub fn sync_card_index_from_cursor(&mut self) {
        self.active_mut().nav_mut().sync_card_index_from_cursor();
    }

    pub fn resolve_target(&self) -> Option<Target> {
        self.nav().resolve_target()
    }

    pub fn selected_card(&self) -> Option<&Card> {
        let active = self.active();
        active.cards().get(active.selected_card_index())
    }

    // history

    fn restore(&mut self, entry: NavEntry) {
        self.active = entry.variant;
        self.active_mut().restore(&entry);
        self.layout();
    }

    pub fn nav_back(&mut self) {
        if let Some(entry) = self.active().history_back() {
            self.restore(entry);
        }
    }

    pub fn nav_forward(&mut self) {
        if let Some(entry) = self.active().history_forward() {
            self.restore(entry);
        }
    }

    /// Entries most recent first, the current one marked.
    pub fn show_history(&self) -> Vec<HistoryItem> {
        self.history().borrow().items()
    }

    pub fn jump_history(&mut self, position: usize) {
        if let Some(entry) = self.active().history_jump(position) {
            self.restore(entry);
        }
    }

    // links

    fn refresh_links(&mut self) -> &[Link] {
        let nav = self.active_mut().nav_mut();
        nav.links = links::extract_links(&nav.lines);
        &nav.links
    }

    fn highlight_link(&mut self, pick: fn(usize, Option<usize>) -> Option<usize>) {
        let len = self.refresh_links().len();
        let nav = self.active_mut().nav_mut();
        let Some(index) = pick(len, nav.rendered_link) else {
            return;
        };
        let line = nav.links[index].line;
        nav.highlighted_link = Some(index);
        nav.place_cursor_near(line);
    }

    pub fn highlight_next_link(&mut self) {
        self.highlight_link(links::next_index);
    }

    pub fn highlight_prev_link(&mut self) {
        self.highlight_link(links::prev_index);
    }

    /// Follow the highlighted link, or the first link on the cursor line.
    pub fn open_link(&mut self) {
        let cursor = self.nav().cursor_line();
        let highlighted = self.nav().highlighted_link;
        let links = self.refresh_links();
        let link = highlighted
            .and_then(|i| links.get(i))
            .or_else(|| links.iter().find(|l| l.line == cursor))
            .cloned();
        if let Some(link) = link {
            self.follow_link(&link);
        }
    }

    pub fn follow_link(&mut self, link: &Link) {
        match link.target() {
            LinkTarget::Note(title) => match self.store.find_by_title(title) {
                Ok(note) => self.show_single(note),
                Err(err) => debug!(title, error = %err, "link target not found"),
            },
            LinkTarget::Url(url) => {
                if let Err(err) = self.opener.open(url) {
                    warn!(url, error = %err, "failed to open url");
                    self.status = Some(StatusMessage::Error(format!("could not open {url}: {err}")));
                }
            }
        }
    }

    fn show_single(&mut self, note: Note) {
        let title = note.title.clone();
        self.show(VariantKey::CardList, title, vec![Card::Note(note)]);
    }

    /// Record where we are, then switch to `key` showing `cards`.
    fn show(&mut self, key: VariantKey, title: String, cards: Vec<Card>) {
        self.active().push_history();
        self.switch_to(key, title, cards);
    }

    /// Switch views without touching history. Callers push first, and only
    /// then change any variant-specific state of the target.
    fn switch_to(&mut self, key: VariantKey, title: String, cards: Vec<Card>) {
        self.active = key;
        self.active_mut().set_cards(title, cards);
        self.layout();
    }

    // views

    pub fn open_notes(&mut self, title: impl Into<String>, notes: Vec<Note>) {
        let cards = notes.into_iter().map(Card::Note).collect();
        self.show(VariantKey::CardList, title.into(), cards);
    }

    pub fn open_all(&mut self) {
        match self.store.all_notes() {
            Ok(notes) => self.open_notes("All notes", notes),
            Err(err) => self.report("could not list notes", &err),
        }
    }

    pub fn open_by_title(&mut self, title: &str) {
        match self.store.find_by_title(title) {
            Ok(note) => self.show_single(note),
            Err(err) => self.report("could not open note", &err),
        }
    }

    pub fn open_note_id(&mut self, id: &NoteId) {
        match self.store.get(id) {
            Ok(note) => self.show_single(note),
            Err(err) => self.report("could not open note", &err),
        }
    }

    pub fn open_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let options = SearchOptions { limit: Some(SEARCH_LIMIT), filter: LineFilter::Any };
        match self.store.search(query, &options) {
            Ok(hits) if hits.is_empty() => self.set_info(format!("no matches for {query}")),
            Ok(hits) => {
                self.active().push_history();
                self.variants.pick.set_query(query);
                let cards = hits.into_iter().map(Card::Pick).collect();
                self.switch_to(VariantKey::Pick, query.to_string(), cards);
            }
            Err(err) => self.report("search failed", &err),
        }
    }

    /// Compose the note under the selected card from its children.
    pub fn open_compose(&mut self) {
        let Some(parent) = self.selected_card().map(|c| c.note_id().clone()) else {
            return;
        };
        match self.store.compose_children(&parent) {
            Ok(composed) => {
                let title = composed.note.title.clone();
                self.active().push_history();
                self.variants.compose.set_parent(parent, composed.source_map);
                self.switch_to(VariantKey::Compose, title, vec![Card::Note(composed.note)]);
            }
            Err(err) => self.report("could not compose", &err),
        }
    }

    fn date_cards(&self, date: NaiveDate) -> Result<DateCards, StoreError> {
        let token = markup::date_token(date);
        let tagged = SearchOptions { limit: Some(SEARCH_LIMIT), filter: LineFilter::NotOpenTodo };
        let todo = SearchOptions { limit: Some(SEARCH_LIMIT), filter: LineFilter::OpenTodo };
        let tag_hits = self.store.search(&token, &tagged)?;
        let todo_hits = self.store.search(&token, &todo)?;
        let notes = self.store.notes_dated(date)?;

        let sizes = [tag_hits.len(), todo_hits.len(), notes.len()];
        let cards = tag_hits
            .into_iter()
            .chain(todo_hits)
            .map(Card::Pick)
            .chain(notes.into_iter().map(Card::Note))
            .collect();
        Ok(DateCards { cards, sizes })
    }

    pub fn open_date(&mut self, date: NaiveDate) {
        match self.date_cards(date) {
            Ok(found) if found.cards.is_empty() => {
                self.set_info(format!("nothing on {}", date.format("%Y-%m-%d")));
            }
            Ok(found) => {
                self.active().push_history();
                self.variants.date.set_date(date, found.sizes);
                self.switch_to(VariantKey::Date, markup::date_token(date), found.cards);
            }
            Err(err) => self.report("could not load date", &err),
        }
    }

    /// Fetch the active cards again, keeping the cursor where it is.
    pub fn reload(&mut self) {
        let result: Result<Vec<Card>, StoreError> = match self.active {
            VariantKey::CardList => self.reload_card_list(),
            VariantKey::Pick => {
                let options = SearchOptions { limit: Some(SEARCH_LIMIT), filter: LineFilter::Any };
                self.store
                    .search(self.variants.pick.query(), &options)
                    .map(|hits| hits.into_iter().map(Card::Pick).collect())
            }
            VariantKey::Compose => self.reload_compose(),
            VariantKey::Date => match self.variants.date.date() {
                Some(date) => self.date_cards(date).map(|found| {
                    self.variants.date.set_sizes(found.sizes);
                    found.cards
                }),
                None => Ok(Vec::new()),
            },
        };
        match result {
            Ok(cards) => {
                self.active_mut().refresh_cards(cards);
                self.layout();
            }
            Err(err) => self.report("reload failed", &err),
        }
    }

    fn reload_card_list(&self) -> Result<Vec<Card>, StoreError> {
        let mut cards = Vec::new();
        for card in self.active().cards() {
            match self.store.get(card.note_id()) {
                Ok(note) => cards.push(Card::Note(note)),
                Err(StoreError::NotFound(id)) => debug!(id = %id, "note gone, dropping card"),
                Err(err) => return Err(err),
            }
        }
        Ok(cards)
    }

    fn reload_compose(&mut self) -> Result<Vec<Card>, StoreError> {
        let Some(parent) = self.variants.compose.parent_id().cloned() else {
            return Ok(Vec::new());
        };
        let composed = self.store.compose_children(&parent)?;
        self.variants.compose.set_parent(parent, composed.source_map);
        Ok(vec![Card::Note(composed.note)])
    }

    /// Rescan the store for outside changes, then reload.
    pub fn refresh(&mut self) {
        match self.store.refresh() {
            Ok(()) => self.reload(),
            Err(err) => self.report("refresh failed", &err),
        }
    }

    /// File and 1-indexed file line for the external editor: the cursor's
    /// source line when it has one, else the top of the selected card.
    pub fn editor_target(&self) -> Option<(PathBuf, usize)> {
        let (id, content_line) = match self.resolve_target() {
            Some(target) => (target.note_id, target.content_line),
            None => (self.selected_card()?.note_id().clone(), 1),
        };
        let note = self.store.get(&id).ok()?;
        let path = note.path.clone()?;
        Some((path, note.frontmatter.len() + content_line))
    }
}
