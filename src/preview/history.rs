//! Browser-style back/forward over whole preview states.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use tracing::debug;

use super::variants::{Card, VariantKey};
use crate::store::{NoteId, SourceMap};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Everything needed to put a preview back the way it was.
#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry {
    pub variant: VariantKey,
    pub title: String,
    pub cards: Vec<Card>,
    pub selected_card_index: usize,
    pub cursor_line: usize,
    pub scroll_offset: usize,
    /// Query that produced the pick results, for the pick view.
    pub pick_query: Option<String>,
    pub compose_parent_id: Option<NoteId>,
    pub compose_source_map: Option<SourceMap>,
    pub date: Option<NaiveDate>,
    pub section_sizes: Option<[usize; 3]>,
}

impl NavEntry {
    pub fn new(variant: VariantKey, title: impl Into<String>, cards: Vec<Card>) -> Self {
        Self {
            variant,
            title: title.into(),
            cards,
            selected_card_index: 0,
            cursor_line: 0,
            scroll_offset: 0,
            pick_query: None,
            compose_parent_id: None,
            compose_source_map: None,
            date: None,
            section_sizes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    pub position: usize,
    pub title: String,
    pub variant: VariantKey,
    pub current: bool,
}

/// `index` is the entry for the state on screen, except right after a
/// `push`: then the screen shows a newer state that has not been recorded
/// yet (`live`), and `index` is the last entry.
#[derive(Debug)]
pub struct NavHistory {
    entries: Vec<NavEntry>,
    index: Option<usize>,
    live: bool,
    limit: usize,
}

pub type SharedNavHistory = Rc<RefCell<NavHistory>>;

pub fn shared(limit: usize) -> SharedNavHistory {
    Rc::new(RefCell::new(NavHistory::new(limit)))
}

impl Default for NavHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl NavHistory {
    pub fn new(limit: usize) -> Self {
        Self { entries: Vec::new(), index: None, live: false, limit: limit.max(1) }
    }

    /// 1-based position of the state on screen and the total, counting a
    /// live state that has not been recorded yet.
    pub fn position(&self) -> Option<(usize, usize)> {
        let idx = self.index?;
        let total = self.entries.len();
        Some(if self.live { (total + 1, total + 1) } else { (idx + 1, total) })
    }

    pub fn can_go_back(&self) -> bool {
        match self.index {
            Some(i) => i > 0 || self.live,
            None => false,
        }
    }

    pub fn can_go_forward(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.entries.len())
    }

    /// Drop the oldest entries beyond the limit; returns how many went.
    fn enforce_limit(&mut self) -> usize {
        let excess = self.entries.len().saturating_sub(self.limit);
        if excess > 0 {
            self.entries.drain(..excess);
            self.index = self.index.map(|i| i.saturating_sub(excess));
        }
        excess
    }

    /// Record the state being left on the way to a new one.
    pub fn push(&mut self, current: impl FnOnce() -> NavEntry) {
        let entry = current();
        if entry.cards.is_empty() {
            return;
        }
        if let Some(idx) = self.index {
            self.entries.truncate(idx + 1);
        }
        self.entries.push(entry);
        self.index = Some(self.entries.len() - 1);
        self.live = true;
        self.enforce_limit();
        debug!(len = self.entries.len(), index = ?self.index, "history push");
    }

    /// Save the on-screen state into the history so it can be returned to.
    /// Returns how many old entries were evicted to make room.
    fn record_current(&mut self, current: NavEntry) -> usize {
        if self.live {
            self.entries.push(current);
            self.live = false;
            self.index = Some(self.entries.len() - 1);
            return self.enforce_limit();
        }
        if let Some(idx) = self.index {
            self.entries[idx] = current;
        }
        0
    }

    pub fn back(&mut self, current: impl FnOnce() -> NavEntry) -> Option<NavEntry> {
        self.index?;
        self.record_current(current());
        let idx = self.index?;
        if idx == 0 {
            return None;
        }
        self.index = Some(idx - 1);
        debug!(index = idx - 1, "history back");
        self.entries.get(idx - 1).cloned()
    }

    pub fn forward(&mut self, current: impl FnOnce() -> NavEntry) -> Option<NavEntry> {
        let idx = self.index?;
        if idx + 1 >= self.entries.len() {
            return None;
        }
        self.entries[idx] = current();
        self.index = Some(idx + 1);
        debug!(index = idx + 1, "history forward");
        self.entries.get(idx + 1).cloned()
    }

    /// Jump straight to `position`, recording the on-screen state first.
    pub fn jump(&mut self, position: usize, current: impl FnOnce() -> NavEntry) -> Option<NavEntry> {
        let idx = self.index?;
        if position >= self.entries.len() || (position == idx && !self.live) {
            return None;
        }
        let dropped = self.record_current(current());
        let position = position.checked_sub(dropped)?;
        self.index = Some(position);
        debug!(index = position, "history jump");
        self.entries.get(position).cloned()
    }

    /// Most recent first. The unrecorded live state is not listed.
    pub fn items(&self) -> Vec<HistoryItem> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .map(|(position, entry)| HistoryItem {
                position,
                title: entry.title.clone(),
                variant: entry.variant,
                current: !self.live && self.index == Some(position),
            })
            .collect()
    }
}
