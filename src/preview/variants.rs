//! The four kinds of preview. They differ in where their cards come from and
//! how card lines map back to files; movement and history are shared.

use chrono::NaiveDate;

use super::history::{NavEntry, SharedNavHistory};
use super::lines::SourceLine;
use super::nav::{PreviewDisplayState, PreviewNavState};
use super::partition::{frame, CardLine, CardPartition, SectionPartition, SECTION_COUNT};
use crate::markup;
use crate::render::LineRenderer;
use crate::store::{Note, NoteId, PickHit, SourceMap};

#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    Note(Note),
    Pick(PickHit),
}

impl Card {
    pub fn title(&self) -> &str {
        match self {
            Card::Note(note) => &note.title,
            Card::Pick(hit) => &hit.title,
        }
    }

    pub fn note_id(&self) -> &NoteId {
        match self {
            Card::Note(note) => &note.id,
            Card::Pick(hit) => &hit.note,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKey {
    CardList,
    Pick,
    Compose,
    Date,
}

impl VariantKey {
    pub fn label(self) -> &'static str {
        match self {
            VariantKey::CardList => "notes",
            VariantKey::Pick => "pick",
            VariantKey::Compose => "compose",
            VariantKey::Date => "date",
        }
    }
}

/// Where the cursor goes after the next layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Placement {
    #[default]
    Keep,
    Reset,
    Restore { cursor: usize, scroll: usize },
}

/// What every variant owns: its own nav/display pair, its cards, and a
/// handle on the history shared by the whole preview.
#[derive(Debug)]
pub struct VariantState {
    pub nav: PreviewNavState,
    pub display: PreviewDisplayState,
    history: SharedNavHistory,
    cards: Vec<Card>,
    title: String,
    placement: Placement,
}

impl VariantState {
    pub fn new(history: SharedNavHistory, display: PreviewDisplayState) -> Self {
        Self {
            nav: PreviewNavState::default(),
            display,
            history,
            cards: Vec::new(),
            title: String::new(),
            placement: Placement::Keep,
        }
    }

    fn base_entry(&self, key: VariantKey) -> NavEntry {
        let mut entry = NavEntry::new(key, self.title.clone(), self.cards.clone());
        entry.selected_card_index = self.nav.selected_card_index();
        entry.cursor_line = self.nav.cursor_line();
        entry.scroll_offset = self.nav.scroll_offset;
        entry
    }

    fn restore_base(&mut self, entry: &NavEntry) {
        self.title = entry.title.clone();
        self.cards = entry.cards.clone();
        self.placement = Placement::Restore { cursor: entry.cursor_line, scroll: entry.scroll_offset };
    }
}

/// Body lines of a note card, addressed through `remap` when the note is
/// a composite.
fn note_lines(
    note: &Note,
    width: usize,
    display: &PreviewDisplayState,
    renderer: &dyn LineRenderer,
    remap: Option<&SourceMap>,
) -> Vec<CardLine> {
    renderer
        .render(note, width, display)
        .into_iter()
        .map(|rendered| {
            let line = match (rendered.source_line, remap) {
                (Some(n), Some(map)) => match map.resolve(n) {
                    Some((child, path, line)) => {
                        SourceLine::addressed(rendered.text, child.clone(), line, path.map(Into::into))
                    }
                    None => SourceLine::plain(rendered.text),
                },
                (Some(n), None) => SourceLine::addressed(rendered.text, note.id.clone(), n, note.path.clone()),
                (None, _) => SourceLine::plain(rendered.text),
            };
            CardLine::new(line, rendered.header)
        })
        .collect()
}

fn pick_lines(hit: &PickHit) -> Vec<CardLine> {
    hit.lines
        .iter()
        .map(|pick| {
            let text = format!("{:>4}  {}", pick.line, pick.text.trim_end());
            CardLine::new(SourceLine::addressed(text, hit.note.clone(), pick.line, hit.path.clone()), false)
        })
        .collect()
}

pub trait PreviewVariant {
    fn key(&self) -> VariantKey;

    fn state(&self) -> &VariantState;

    fn state_mut(&mut self) -> &mut VariantState;

    fn nav(&self) -> &PreviewNavState {
        &self.state().nav
    }

    fn nav_mut(&mut self) -> &mut PreviewNavState {
        &mut self.state_mut().nav
    }

    fn display(&self) -> &PreviewDisplayState {
        &self.state().display
    }

    fn display_mut(&mut self) -> &mut PreviewDisplayState {
        &mut self.state_mut().display
    }

    fn history(&self) -> SharedNavHistory {
        self.state().history.clone()
    }

    fn cards(&self) -> &[Card] {
        &self.state().cards
    }

    fn title(&self) -> &str {
        &self.state().title
    }

    fn card_count(&self) -> usize {
        self.state().cards.len()
    }

    fn selected_card_index(&self) -> usize {
        self.state().nav.selected_card_index()
    }

    /// Replace the cards; the cursor goes back to the top on the next layout.
    fn set_cards(&mut self, title: String, cards: Vec<Card>) {
        let state = self.state_mut();
        state.title = title;
        state.cards = cards;
        state.placement = Placement::Reset;
    }

    /// Replace the cards but keep the cursor where it is, for reloads.
    fn refresh_cards(&mut self, cards: Vec<Card>) {
        let state = self.state_mut();
        state.cards = cards;
        state.placement = Placement::Keep;
    }

    fn card_lines(&self, card: &Card, width: usize, renderer: &dyn LineRenderer) -> Vec<CardLine> {
        let display = self.display();
        let body = match card {
            Card::Note(note) => note_lines(note, width, display, renderer, None),
            Card::Pick(hit) => pick_lines(hit),
        };
        let title = if display.show_title { card.title() } else { "" };
        frame(title, width, body)
    }

    /// Rebuild the source-line table and card ranges from the cards.
    fn layout(&mut self, width: usize, renderer: &dyn LineRenderer) {
        let partition = CardPartition::build(self.cards(), |card| self.card_lines(card, width, renderer));
        let state = self.state_mut();
        state.nav.install(partition);
        match std::mem::take(&mut state.placement) {
            Placement::Keep => {
                if !state.nav.is_content_line(state.nav.cursor_line()) {
                    state.nav.goto_top();
                }
            }
            Placement::Reset => state.nav.reset_position(),
            Placement::Restore { cursor, scroll } => {
                state.nav.set_cursor_line(cursor);
                state.nav.scroll_offset = scroll.min(state.nav.lines.len().saturating_sub(1));
            }
        }
        self.after_layout();
    }

    fn after_layout(&mut self) {}

    fn snapshot(&self) -> NavEntry {
        self.state().base_entry(self.key())
    }

    fn restore(&mut self, entry: &NavEntry) {
        self.state_mut().restore_base(entry);
    }

    /// Record this view before leaving it for another one.
    fn push_history(&self) {
        self.state().history.borrow_mut().push(|| self.snapshot());
    }

    fn history_back(&self) -> Option<NavEntry> {
        self.state().history.borrow_mut().back(|| self.snapshot())
    }

    fn history_forward(&self) -> Option<NavEntry> {
        self.state().history.borrow_mut().forward(|| self.snapshot())
    }

    fn history_jump(&self, position: usize) -> Option<NavEntry> {
        self.state().history.borrow_mut().jump(position, || self.snapshot())
    }
}

/// One or more note cards.
#[derive(Debug)]
pub struct CardListPreview {
    state: VariantState,
}

impl CardListPreview {
    pub fn new(history: SharedNavHistory, display: PreviewDisplayState) -> Self {
        Self { state: VariantState::new(history, display) }
    }
}

impl PreviewVariant for CardListPreview {
    fn key(&self) -> VariantKey {
        VariantKey::CardList
    }

    fn state(&self) -> &VariantState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VariantState {
        &mut self.state
    }
}

/// Search hits, one card per note, one line per matching content line.
#[derive(Debug)]
pub struct PickPreview {
    state: VariantState,
    query: String,
}

impl PickPreview {
    pub fn new(history: SharedNavHistory, display: PreviewDisplayState) -> Self {
        Self { state: VariantState::new(history, display), query: String::new() }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }
}

impl PreviewVariant for PickPreview {
    fn key(&self) -> VariantKey {
        VariantKey::Pick
    }

    fn state(&self) -> &VariantState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VariantState {
        &mut self.state
    }

    fn snapshot(&self) -> NavEntry {
        let mut entry = self.state.base_entry(self.key());
        entry.pick_query = Some(self.query.clone());
        entry
    }

    fn restore(&mut self, entry: &NavEntry) {
        self.state.restore_base(entry);
        self.query = entry.pick_query.clone().unwrap_or_default();
    }
}

/// A parent note assembled from its children. Lines resolve to the child
/// they came from, so edits land in the child's file.
#[derive(Debug)]
pub struct ComposePreview {
    state: VariantState,
    parent_id: Option<NoteId>,
    source_map: SourceMap,
}

impl ComposePreview {
    pub fn new(history: SharedNavHistory, display: PreviewDisplayState) -> Self {
        Self {
            state: VariantState::new(history, display),
            parent_id: None,
            source_map: SourceMap::default(),
        }
    }

    pub fn parent_id(&self) -> Option<&NoteId> {
        self.parent_id.as_ref()
    }

    pub fn set_parent(&mut self, id: NoteId, source_map: SourceMap) {
        self.parent_id = Some(id);
        self.source_map = source_map;
    }
}

impl PreviewVariant for ComposePreview {
    fn key(&self) -> VariantKey {
        VariantKey::Compose
    }

    fn state(&self) -> &VariantState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VariantState {
        &mut self.state
    }

    fn card_lines(&self, card: &Card, width: usize, renderer: &dyn LineRenderer) -> Vec<CardLine> {
        let display = self.display();
        let body = match card {
            Card::Note(note) => note_lines(note, width, display, renderer, Some(&self.source_map)),
            Card::Pick(hit) => pick_lines(hit),
        };
        let title = if display.show_title { card.title() } else { "" };
        frame(title, width, body)
    }

    fn snapshot(&self) -> NavEntry {
        let mut entry = self.state.base_entry(self.key());
        entry.compose_parent_id = self.parent_id.clone();
        entry.compose_source_map = Some(self.source_map.clone());
        entry
    }

    fn restore(&mut self, entry: &NavEntry) {
        self.state.restore_base(entry);
        self.parent_id = entry.compose_parent_id.clone();
        self.source_map = entry.compose_source_map.clone().unwrap_or_default();
    }
}

/// Human-readable names of the date view sections, in card order.
pub const DATE_SECTIONS: [&str; SECTION_COUNT] = ["tagged", "todo", "notes"];

/// Everything for one day: lines tagged with the date, open todos due that
/// day, and notes dated that day.
#[derive(Debug)]
pub struct DatePreview {
    state: VariantState,
    date: Option<NaiveDate>,
    sizes: [usize; SECTION_COUNT],
    sections: SectionPartition,
}

impl DatePreview {
    pub fn new(history: SharedNavHistory, display: PreviewDisplayState) -> Self {
        Self {
            state: VariantState::new(history, display),
            date: None,
            sizes: [0; SECTION_COUNT],
            sections: SectionPartition::default(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Cards in each section, in section order.
    pub fn section_sizes(&self) -> [usize; SECTION_COUNT] {
        self.sizes
    }

    pub fn set_date(&mut self, date: NaiveDate, sizes: [usize; SECTION_COUNT]) {
        self.date = Some(date);
        self.sizes = sizes;
    }

    pub fn set_sizes(&mut self, sizes: [usize; SECTION_COUNT]) {
        self.sizes = sizes;
    }

    /// Section under the cursor. Off content, the selected card decides.
    pub fn current_section(&self) -> usize {
        let nav = &self.state.nav;
        if nav.is_content_line(nav.cursor_line()) {
            self.sections.section_for_line(nav.cursor_line())
        } else {
            self.sections.section_for_card(nav.selected_card_index())
        }
    }

    pub fn section_down(&mut self) -> bool {
        let section = self.current_section();
        match self.sections.neighbour_start(section, true) {
            Some(card) => self.state.nav.select_card(card),
            None => false,
        }
    }

    pub fn section_up(&mut self) -> bool {
        let section = self.current_section();
        let start = self.sections.card_range(section).map(|r| r.start);
        // first go to the top of the current section, then to the previous one
        if start.is_some_and(|s| s < self.selected_card_index()) {
            return start.is_some_and(|s| self.state.nav.select_card(s));
        }
        match self.sections.neighbour_start(section, false) {
            Some(card) => self.state.nav.select_card(card),
            None => false,
        }
    }

    pub fn display_title(&self) -> String {
        match self.date {
            Some(date) => markup::date_token(date),
            None => String::new(),
        }
    }
}

impl PreviewVariant for DatePreview {
    fn key(&self) -> VariantKey {
        VariantKey::Date
    }

    fn state(&self) -> &VariantState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut VariantState {
        &mut self.state
    }

    fn after_layout(&mut self) {
        self.sections = SectionPartition::from_sizes(self.sizes, &self.state.nav.card_line_ranges);
    }

    fn snapshot(&self) -> NavEntry {
        let mut entry = self.state.base_entry(self.key());
        entry.date = self.date;
        entry.section_sizes = Some(self.sizes);
        entry
    }

    fn restore(&mut self, entry: &NavEntry) {
        self.state.restore_base(entry);
        self.date = entry.date;
        self.sizes = entry.section_sizes.unwrap_or([0, 0, entry.cards.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::history;
    use crate::render::MarkdownRenderer;
    use crate::store::compose::ComposeSpan;
    use crate::store::PickLine;
    use std::path::PathBuf;

    fn note(id: &str, body: &str) -> Note {
        Note::parse(NoteId::new(id), Some(PathBuf::from(format!("/n/{id}.md"))), id, body)
    }

    fn hit(id: &str, lines: &[(usize, &str)]) -> PickHit {
        PickHit {
            note: NoteId::new(id),
            title: id.to_string(),
            path: Some(PathBuf::from(format!("/n/{id}.md"))),
            lines: lines.iter().map(|&(line, text)| PickLine { line, text: text.into() }).collect(),
        }
    }

    #[test]
    fn test_note_card_lines_carry_provenance() {
        let mut list = CardListPreview::new(history::shared(50), PreviewDisplayState::default());
        list.set_cards("t".into(), vec![Card::Note(note("n1", "---\ntitle: One\n---\na\nb"))]);
        list.layout(40, &MarkdownRenderer::new());

        let nav = list.nav();
        assert!(nav.lines[0].text.contains("One"));
        assert_eq!(nav.lines[1].note_id, Some(NoteId::new("n1")));
        assert_eq!(nav.lines[1].content_line, Some(1));
        assert_eq!(nav.lines[2].content_line, Some(2));
        assert_eq!(nav.cursor_line(), 1);
    }

    #[test]
    fn test_hidden_title_leaves_plain_rule() {
        let mut display = PreviewDisplayState::default();
        display.show_title = false;
        let mut list = CardListPreview::new(history::shared(50), display);
        list.set_cards("t".into(), vec![Card::Note(note("n1", "a"))]);
        list.layout(20, &MarkdownRenderer::new());
        assert!(list.nav().lines[0].text.chars().all(|c| c == '─'));
    }

    #[test]
    fn test_pick_lines_address_matched_lines() {
        let mut pick = PickPreview::new(history::shared(50), PreviewDisplayState::default());
        pick.set_cards("q".into(), vec![Card::Pick(hit("n2", &[(4, "- [ ] call"), (9, "call back")]))]);
        pick.layout(40, &MarkdownRenderer::new());
        let target = pick.nav().resolve_target().unwrap();
        assert_eq!(target.note_id, NoteId::new("n2"));
        assert_eq!(target.content_line, 4);
    }

    #[test]
    fn test_compose_lines_resolve_to_children() {
        let mut compose = ComposePreview::new(history::shared(50), PreviewDisplayState::default());
        let spans = vec![ComposeSpan {
            start: 2,
            len: 2,
            child: NoteId::new("child"),
            path: Some(PathBuf::from("/n/child.md")),
            child_start: 1,
        }];
        compose.set_parent(NoteId::new("parent"), SourceMap::new(spans));
        compose.set_cards("Parent".into(), vec![Card::Note(note("parent", "## Child\nx\ny"))]);
        compose.layout(40, &MarkdownRenderer::new());

        let lines = &compose.nav().lines;
        assert!(!lines[1].is_addressable());
        assert_eq!(lines[2].note_id, Some(NoteId::new("child")));
        assert_eq!(lines[3].content_line, Some(2));
        assert_eq!(lines[3].path, Some(PathBuf::from("/n/child.md")));
    }

    #[test]
    fn test_date_sections_follow_cards() {
        let mut date = DatePreview::new(history::shared(50), PreviewDisplayState::default());
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        date.set_date(day, [1, 0, 2]);
        date.set_cards(
            "day".into(),
            vec![
                Card::Pick(hit("a", &[(1, "x @2024-05-01")])),
                Card::Note(note("b", "b")),
                Card::Note(note("c", "c")),
            ],
        );
        date.layout(30, &MarkdownRenderer::new());
        assert_eq!(date.current_section(), 0);
        assert!(date.section_down());
        assert_eq!(date.selected_card_index(), 1);
        assert_eq!(date.current_section(), 2);
        assert!(!date.section_down());
        assert!(date.state_mut().nav.card_down());
        assert!(date.section_up());
        assert_eq!(date.selected_card_index(), 1);
        assert!(date.section_up());
        assert_eq!(date.selected_card_index(), 0);

        // by line inside a card, by the following card on a separator
        date.nav_mut().set_cursor_line(9);
        assert_eq!(date.current_section(), 2);
        date.nav_mut().set_cursor_line(3);
        assert_eq!(date.selected_card_index(), 1);
        assert_eq!(date.current_section(), 2);
    }

    #[test]
    fn test_snapshot_restore_keeps_position() {
        let shared = history::shared(50);
        let mut pick = PickPreview::new(shared, PreviewDisplayState::default());
        pick.set_query("call");
        pick.set_cards(
            "call".into(),
            vec![Card::Pick(hit("a", &[(1, "call"), (2, "call")])), Card::Pick(hit("b", &[(3, "call")]))],
        );
        let renderer = MarkdownRenderer::new();
        pick.layout(30, &renderer);
        pick.nav_mut().card_down();
        let entry = pick.snapshot();
        assert_eq!(entry.pick_query.as_deref(), Some("call"));
        assert_eq!(entry.selected_card_index, 1);

        pick.set_query("other");
        pick.set_cards("other".into(), vec![Card::Pick(hit("c", &[(1, "other")]))]);
        pick.layout(30, &renderer);
        pick.restore(&entry);
        pick.layout(30, &renderer);
        assert_eq!(pick.query(), "call");
        assert_eq!(pick.selected_card_index(), 1);
        assert_eq!(pick.nav().cursor_line(), entry.cursor_line);
    }
}
