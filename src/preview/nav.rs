use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::links::Link;
use super::lines::{resolve_target, SourceLine, Target};
use super::partition::CardPartition;

/// How the line renderer is asked to draw a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewDisplayState {
    pub show_frontmatter: bool,
    pub show_title: bool,
    pub show_global_tags: bool,
    pub render_markdown: bool,
}

impl Default for PreviewDisplayState {
    fn default() -> Self {
        Self {
            show_frontmatter: false,
            show_title: true,
            show_global_tags: false,
            render_markdown: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayToggle {
    Frontmatter,
    Title,
    GlobalTags,
    Markdown,
}

impl PreviewDisplayState {
    pub fn toggle(&mut self, which: DisplayToggle) {
        let flag = match which {
            DisplayToggle::Frontmatter => &mut self.show_frontmatter,
            DisplayToggle::Title => &mut self.show_title,
            DisplayToggle::GlobalTags => &mut self.show_global_tags,
            DisplayToggle::Markdown => &mut self.render_markdown,
        };
        *flag = !*flag;
    }
}

/// Cursor, scroll and the rendered buffer of one preview.
///
/// The cursor is only written through methods that re-derive the selected
/// card afterwards, so the two cannot drift apart. The one exception is a
/// card jump, which selects the card explicitly before placing the cursor.
#[derive(Debug, Clone, Default)]
pub struct PreviewNavState {
    pub scroll_offset: usize,
    cursor_line: usize,
    selected_card: usize,
    pub card_line_ranges: Vec<Range<usize>>,
    pub header_lines: Vec<usize>,
    pub lines: Vec<SourceLine>,
    pub links: Vec<Link>,
    pub highlighted_link: Option<usize>,
    pub rendered_link: Option<usize>,
}

impl PreviewNavState {
    pub fn cursor_line(&self) -> usize {
        self.cursor_line
    }

    pub fn selected_card_index(&self) -> usize {
        self.selected_card
    }

    pub fn card_count(&self) -> usize {
        self.card_line_ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Swap in a freshly rendered buffer. Content changed, so any link
    /// highlight is dropped; the cursor is clamped and the card re-derived.
    pub fn install(&mut self, partition: CardPartition) {
        self.lines = partition.lines;
        self.card_line_ranges = partition.ranges;
        self.header_lines = partition.headers;
        self.links.clear();
        self.highlighted_link = None;
        let last = self.lines.len().saturating_sub(1);
        self.cursor_line = self.cursor_line.min(last);
        self.scroll_offset = self.scroll_offset.min(last);
        self.selected_card = self.selected_card.min(self.card_count().saturating_sub(1));
        self.sync_card_index_from_cursor();
    }

    /// Called when a frame is painted: the painted link is the one selected now.
    pub fn snapshot_rendered_link(&mut self) {
        self.rendered_link = self.highlighted_link;
    }

    pub fn set_cursor_line(&mut self, line: usize) {
        self.cursor_line = line.min(self.lines.len().saturating_sub(1));
        self.sync_card_index_from_cursor();
    }

    /// Like `set_cursor_line`, but a frame line of a card moves on to the
    /// nearest content line of that card.
    pub fn place_cursor_near(&mut self, line: usize) {
        let range = self.card_line_ranges.get(self.range_at_or_after(line)).cloned();
        let target = match range {
            Some(r) if r.start <= line && r.len() >= 3 => line.clamp(r.start + 1, r.end - 2),
            _ => line,
        };
        self.set_cursor_line(target);
    }

    /// Index of the first range whose end lies past `line`.
    fn range_at_or_after(&self, line: usize) -> usize {
        self.card_line_ranges.partition_point(|r| r.end <= line)
    }

    /// Strictly inside a card: not its first or last line.
    pub fn is_content_line(&self, line: usize) -> bool {
        self.card_line_ranges
            .get(self.range_at_or_after(line))
            .is_some_and(|r| r.start < line && line + 1 < r.end)
    }

    pub fn sync_card_index_from_cursor(&mut self) {
        let cursor = self.cursor_line;
        let idx = self.range_at_or_after(cursor);
        let Some(range) = self.card_line_ranges.get(idx) else {
            return;
        };
        if range.start <= cursor || idx > 0 {
            // inside the range, or in the gap that precedes it
            self.selected_card = idx;
        }
    }

    pub fn move_down(&mut self) -> bool {
        let next = (self.cursor_line + 1..self.lines.len()).find(|&i| self.is_content_line(i));
        match next {
            Some(line) => {
                self.set_cursor_line(line);
                true
            }
            None => false,
        }
    }

    pub fn move_up(&mut self) -> bool {
        let prev = (0..self.cursor_line).rev().find(|&i| self.is_content_line(i));
        match prev {
            Some(line) => {
                self.set_cursor_line(line);
                true
            }
            None => false,
        }
    }

    pub fn select_card(&mut self, card: usize) -> bool {
        let Some(range) = self.card_line_ranges.get(card).cloned() else {
            return false;
        };
        self.selected_card = card;
        self.cursor_line = (range.start + 1).min(range.end.saturating_sub(1));
        true
    }

    pub fn card_down(&mut self) -> bool {
        self.select_card(self.selected_card + 1)
    }

    pub fn card_up(&mut self) -> bool {
        match self.selected_card.checked_sub(1) {
            Some(card) => self.select_card(card),
            None => false,
        }
    }

    pub fn next_header(&mut self) -> bool {
        let cursor = self.cursor_line;
        match self.header_lines.iter().copied().find(|&h| h > cursor) {
            Some(line) => {
                self.set_cursor_line(line);
                true
            }
            None => false,
        }
    }

    pub fn prev_header(&mut self) -> bool {
        let cursor = self.cursor_line;
        match self.header_lines.iter().rev().copied().find(|&h| h < cursor) {
            Some(line) => {
                self.set_cursor_line(line);
                true
            }
            None => false,
        }
    }

    pub fn first_content_line(&self) -> Option<usize> {
        (0..self.lines.len()).find(|&i| self.is_content_line(i))
    }

    pub fn last_content_line(&self) -> Option<usize> {
        (0..self.lines.len()).rev().find(|&i| self.is_content_line(i))
    }

    pub fn goto_top(&mut self) {
        if let Some(line) = self.first_content_line() {
            self.set_cursor_line(line);
        }
    }

    pub fn goto_bottom(&mut self) {
        if let Some(line) = self.last_content_line() {
            self.set_cursor_line(line);
        }
    }

    /// Put the cursor on the first content line and scroll to the top.
    pub fn reset_position(&mut self) {
        self.scroll_offset = 0;
        self.selected_card = 0;
        self.cursor_line = 0;
        self.goto_top();
    }

    pub fn ensure_cursor_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor_line < self.scroll_offset {
            self.scroll_offset = self.cursor_line;
        } else if self.cursor_line >= self.scroll_offset + height {
            self.scroll_offset = self.cursor_line + 1 - height;
        }
    }

    pub fn resolve_target(&self) -> Option<Target> {
        resolve_target(&self.lines, self.cursor_line)
    }

    pub fn card_range(&self, card: usize) -> Option<Range<usize>> {
        self.card_line_ranges.get(card).cloned()
    }
}
