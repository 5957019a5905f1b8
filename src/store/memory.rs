//! In-memory store for exercising the preview without touching disk.
//! Clones share state, so a test can keep a handle after boxing one.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use chrono::NaiveDate;

use super::{
    children_of, collect_hits, compose, find_by_title, line_matches, query_words, Composed,
    LineOp, Note, NoteId, NoteStore, PickHit, SearchOptions, StoreError,
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    notes: Rc<RefCell<Vec<Note>>>,
    offline: Rc<Cell<bool>>,
    mutations: Rc<RefCell<Vec<(NoteId, usize, LineOp)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note from raw file text; its path is `/notes/<id>.md`.
    pub fn with_note(self, id: &str, raw: &str) -> Self {
        let path = PathBuf::from(format!("/notes/{id}.md"));
        self.notes.borrow_mut().push(Note::parse(NoteId::new(id), Some(path), id, raw));
        self
    }

    /// While offline every call fails with an I/O error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn mutations(&self) -> Vec<(NoteId, usize, LineOp)> {
        self.mutations.borrow().clone()
    }

    pub fn body(&self, id: &str) -> Option<String> {
        self.notes.borrow().iter().find(|n| n.id.as_str() == id).map(|n| n.body.clone())
    }

    pub fn remove(&self, id: &str) {
        self.notes.borrow_mut().retain(|n| n.id.as_str() != id);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline.get() {
            return Err(StoreError::io("/notes", std::io::Error::other("store offline")));
        }
        Ok(())
    }

    fn note(&self, id: &NoteId) -> Result<Note, StoreError> {
        self.notes
            .borrow()
            .iter()
            .find(|n| &n.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl NoteStore for MemoryStore {
    fn all_notes(&self) -> Result<Vec<Note>, StoreError> {
        self.check()?;
        Ok(self.notes.borrow().clone())
    }

    fn get(&self, id: &NoteId) -> Result<Note, StoreError> {
        self.check()?;
        self.note(id)
    }

    fn find_by_title(&self, title: &str) -> Result<Note, StoreError> {
        self.check()?;
        find_by_title(&self.notes.borrow(), title)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(title.into()))
    }

    fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<PickHit>, StoreError> {
        self.check()?;
        let words = query_words(query);
        let notes = self.notes.borrow();
        let mut matches = Vec::new();
        for (idx, note) in notes.iter().enumerate() {
            for (i, text) in note.body.lines().enumerate() {
                if line_matches(text, &words) {
                    matches.push((idx, i + 1));
                }
            }
        }
        Ok(collect_hits(&notes, matches, options))
    }

    fn read_line(&self, id: &NoteId, line: usize) -> Result<String, StoreError> {
        self.check()?;
        self.note(id)?
            .line(line)
            .map(str::to_string)
            .ok_or_else(|| StoreError::LineOutOfRange { id: id.clone(), line })
    }

    fn mutate_line(&mut self, id: &NoteId, line: usize, op: &LineOp) -> Result<(), StoreError> {
        self.check()?;
        let mut notes = self.notes.borrow_mut();
        let note = notes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut lines: Vec<String> = note.body.lines().map(str::to_string).collect();
        let slot = line
            .checked_sub(1)
            .and_then(|i| lines.get_mut(i))
            .ok_or_else(|| StoreError::LineOutOfRange { id: id.clone(), line })?;
        let updated = op.apply(slot);
        *slot = updated;
        note.body = lines.join("\n");
        self.mutations.borrow_mut().push((id.clone(), line, op.clone()));
        Ok(())
    }

    fn compose_children(&self, parent: &NoteId) -> Result<Composed, StoreError> {
        self.check()?;
        let parent = self.note(parent)?;
        let notes = self.notes.borrow();
        let children = children_of(&notes, &parent);
        if children.is_empty() {
            return Err(StoreError::NoChildren(parent.id.clone()));
        }
        Ok(compose::compose(&parent, &children))
    }

    fn notes_dated(&self, date: NaiveDate) -> Result<Vec<Note>, StoreError> {
        self.check()?;
        Ok(self.notes.borrow().iter().filter(|n| n.date == Some(date)).cloned().collect())
    }

    fn refresh(&mut self) -> Result<(), StoreError> {
        self.check()
    }
}
