//! The note store: where cards come from and where line edits go.
//!
//! Every line address used here is 1-indexed and relative to the note body,
//! i.e. the text after the frontmatter block detected by [`Frontmatter::parse`].

pub mod compose;
mod error;
pub mod frontmatter;
pub mod fs;
#[cfg(test)]
pub mod memory;

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::markup;

pub use compose::{Composed, SourceMap};
pub use error::StoreError;
pub use frontmatter::Frontmatter;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub path: Option<PathBuf>,
    /// Raw frontmatter lines including both `---` delimiters.
    pub frontmatter: Vec<String>,
    pub tags: Vec<String>,
    pub date: Option<NaiveDate>,
    pub parent: Option<String>,
    pub body: String,
}

impl Note {
    /// Split raw file content into frontmatter and body. `fallback_title`
    /// is used when the frontmatter carries no title.
    pub fn parse(id: NoteId, path: Option<PathBuf>, fallback_title: &str, raw: &str) -> Self {
        let (fm, content_start) = Frontmatter::parse(raw);
        let lines: Vec<&str> = raw.lines().collect();
        let fm = fm.unwrap_or_default();

        Self {
            id,
            title: fm.title.unwrap_or_else(|| fallback_title.to_string()),
            path,
            frontmatter: lines[..content_start].iter().map(|l| l.to_string()).collect(),
            tags: fm.tags,
            date: fm.date.as_deref().and_then(markup::parse_date),
            parent: fm.parent,
            body: lines[content_start..].join("\n"),
        }
    }

    /// Content line `line` (1-indexed).
    pub fn line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1).and_then(|i| self.body.lines().nth(i))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickLine {
    pub line: usize,
    pub text: String,
}

/// One note's worth of search matches.
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub note: NoteId,
    pub title: String,
    pub path: Option<PathBuf>,
    pub lines: Vec<PickLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineFilter {
    #[default]
    Any,
    OpenTodo,
    NotOpenTodo,
}

impl LineFilter {
    pub fn accepts(self, line: &str) -> bool {
        match self {
            LineFilter::Any => true,
            LineFilter::OpenTodo => markup::is_open_todo(line),
            LineFilter::NotOpenTodo => !markup::is_open_todo(line),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub limit: Option<usize>,
    pub filter: LineFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOp {
    SetChecked(bool),
    AddCheckbox,
    AddToken(String),
    RemoveToken(String),
}

impl LineOp {
    pub fn apply(&self, line: &str) -> String {
        match self {
            LineOp::SetChecked(checked) => markup::set_checked(line, *checked),
            LineOp::AddCheckbox => markup::add_checkbox(line),
            LineOp::AddToken(token) => markup::add_token(line, token),
            LineOp::RemoveToken(token) => markup::remove_token(line, token),
        }
    }
}

pub trait NoteStore {
    fn all_notes(&self) -> Result<Vec<Note>, StoreError>;

    fn get(&self, id: &NoteId) -> Result<Note, StoreError>;

    /// Case-insensitive lookup by title, falling back to the id.
    fn find_by_title(&self, title: &str) -> Result<Note, StoreError>;

    fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<PickHit>, StoreError>;

    /// Raw content line `line` (1-indexed, post-frontmatter).
    fn read_line(&self, id: &NoteId, line: usize) -> Result<String, StoreError>;

    fn mutate_line(&mut self, id: &NoteId, line: usize, op: &LineOp) -> Result<(), StoreError>;

    fn compose_children(&self, parent: &NoteId) -> Result<Composed, StoreError>;

    fn notes_dated(&self, date: NaiveDate) -> Result<Vec<Note>, StoreError>;

    /// Pick up changes made outside the store (e.g. by an external editor).
    fn refresh(&mut self) -> Result<(), StoreError>;
}

pub(crate) fn query_words(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

pub(crate) fn line_matches(line: &str, words: &[String]) -> bool {
    let lower = line.to_lowercase();
    !words.is_empty() && words.iter().all(|w| lower.contains(w.as_str()))
}

/// Group matching `(note index, line)` pairs into hits in note order.
pub(crate) fn collect_hits(
    notes: &[Note],
    mut matches: Vec<(usize, usize)>,
    options: &SearchOptions,
) -> Vec<PickHit> {
    matches.sort_unstable();
    matches.dedup();

    let mut hits: Vec<PickHit> = Vec::new();
    let mut total = 0;
    for (note_idx, line) in matches {
        if options.limit.is_some_and(|limit| total >= limit) {
            break;
        }
        let Some(note) = notes.get(note_idx) else { continue };
        let Some(text) = note.line(line) else { continue };
        if !options.filter.accepts(text) {
            continue;
        }
        let pick = PickLine { line, text: text.to_string() };
        match hits.last_mut() {
            Some(hit) if hit.note == note.id => hit.lines.push(pick),
            _ => hits.push(PickHit {
                note: note.id.clone(),
                title: note.title.clone(),
                path: note.path.clone(),
                lines: vec![pick],
            }),
        }
        total += 1;
    }
    hits
}

pub(crate) fn find_by_title<'a>(notes: &'a [Note], title: &str) -> Option<&'a Note> {
    let title = title.trim();
    notes
        .iter()
        .find(|n| n.title.eq_ignore_ascii_case(title))
        .or_else(|| notes.iter().find(|n| n.id.as_str().eq_ignore_ascii_case(title)))
}

pub(crate) fn children_of<'a>(notes: &'a [Note], parent: &Note) -> Vec<&'a Note> {
    let mut children: Vec<&Note> = notes
        .iter()
        .filter(|n| n.id != parent.id)
        .filter(|n| {
            n.parent.as_deref().is_some_and(|p| {
                p == parent.id.as_str() || p.eq_ignore_ascii_case(&parent.title)
            })
        })
        .collect();
    children.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    children
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, raw: &str) -> Note {
        Note::parse(NoteId::new(id), None, id, raw)
    }

    #[test]
    fn test_note_lines_are_post_frontmatter() {
        let n = note("a", "---\ntitle: Alpha\n---\nfirst\nsecond");
        assert_eq!(n.title, "Alpha");
        assert_eq!(n.frontmatter, vec!["---", "title: Alpha", "---"]);
        assert_eq!(n.line(1), Some("first"));
        assert_eq!(n.line(2), Some("second"));
        assert_eq!(n.line(0), None);
        assert_eq!(n.line(3), None);
    }

    #[test]
    fn test_note_without_frontmatter_uses_fallback_title() {
        let n = note("inbox", "just text");
        assert_eq!(n.title, "inbox");
        assert!(n.frontmatter.is_empty());
        assert_eq!(n.line(1), Some("just text"));
    }

    #[test]
    fn test_collect_hits_groups_and_filters() {
        let notes = vec![
            note("a", "- [ ] pay @2024-01-15\nnote @2024-01-15"),
            note("b", "- [x] done @2024-01-15"),
        ];
        let matches = vec![(1, 1), (0, 2), (0, 1), (0, 1)];
        let options = SearchOptions { limit: None, filter: LineFilter::NotOpenTodo };
        let hits = collect_hits(&notes, matches, &options);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].note, NoteId::new("a"));
        assert_eq!(hits[0].lines, vec![PickLine { line: 2, text: "note @2024-01-15".into() }]);
        assert_eq!(hits[1].lines[0].line, 1);
    }

    #[test]
    fn test_children_match_parent_by_id_or_title() {
        let parent = note("projects", "---\ntitle: Projects\n---\n");
        let notes = vec![
            parent.clone(),
            note("b", "---\ntitle: Beta\nparent: projects\n---\nx"),
            note("a", "---\ntitle: Alpha\nparent: PROJECTS\n---\ny"),
            note("c", "---\ntitle: Gamma\n---\nz"),
        ];
        let titles: Vec<&str> = children_of(&notes, &parent).iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
    }
}
