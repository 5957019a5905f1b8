//! Laying cards out one after another and remembering which lines belong to
//! which card (and, for the date view, which cards belong to which section).

use std::ops::Range;

use unicode_width::UnicodeWidthStr;

use super::lines::SourceLine;

const PLACEHOLDER: &str = "(empty)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLine {
    pub line: SourceLine,
    pub header: bool,
}

impl CardLine {
    pub fn new(line: SourceLine, header: bool) -> Self {
        Self { line, header }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(SourceLine::plain(text), false)
    }
}

/// Wrap a card body between a title rule and a closing rule. The body always
/// has at least one line so every card has a content line.
pub fn frame(title: &str, width: usize, mut body: Vec<CardLine>) -> Vec<CardLine> {
    if body.is_empty() {
        body.push(CardLine::plain(PLACEHOLDER));
    }
    let head = if title.is_empty() { "──".to_string() } else { format!("── {} ", title) };
    let fill = width.saturating_sub(head.width());
    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(CardLine::plain(format!("{}{}", head, "─".repeat(fill))));
    lines.extend(body);
    lines.push(CardLine::plain("─".repeat(width.max(2))));
    lines
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPartition {
    pub lines: Vec<SourceLine>,
    pub ranges: Vec<Range<usize>>,
    pub headers: Vec<usize>,
}

impl CardPartition {
    /// Concatenate every card's lines, one blank separator between cards.
    pub fn build<C>(cards: &[C], mut render: impl FnMut(&C) -> Vec<CardLine>) -> Self {
        let mut partition = Self::default();
        for (i, card) in cards.iter().enumerate() {
            if i > 0 {
                partition.lines.push(SourceLine::plain(""));
            }
            let start = partition.lines.len();
            let mut body = render(card);
            if body.is_empty() {
                body.push(CardLine::plain(PLACEHOLDER));
            }
            for card_line in body {
                if card_line.header {
                    partition.headers.push(partition.lines.len());
                }
                partition.lines.push(card_line.line);
            }
            partition.ranges.push(start..partition.lines.len());
        }
        partition
    }
}

pub const SECTION_COUNT: usize = 3;

/// Three consecutive groups of cards, addressed by card index and by line.
/// Anything outside every range belongs to the last section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionPartition {
    cards: [Range<usize>; SECTION_COUNT],
    lines: [Range<usize>; SECTION_COUNT],
}

impl SectionPartition {
    pub fn from_card_ranges(cards: [Range<usize>; SECTION_COUNT], card_lines: &[Range<usize>]) -> Self {
        let lines = cards.clone().map(|r| {
            if r.is_empty() {
                return 0..0;
            }
            match (card_lines.get(r.start), card_lines.get(r.end - 1)) {
                (Some(first), Some(last)) => first.start..last.end,
                _ => 0..0,
            }
        });
        Self { cards, lines }
    }

    pub fn from_sizes(sizes: [usize; SECTION_COUNT], card_lines: &[Range<usize>]) -> Self {
        let mut start = 0;
        let cards = sizes.map(|size| {
            let range = start..start + size;
            start += size;
            range
        });
        Self::from_card_ranges(cards, card_lines)
    }

    pub fn card_range(&self, section: usize) -> Option<Range<usize>> {
        self.cards.get(section).cloned()
    }

    pub fn section_for_card(&self, card: usize) -> usize {
        self.cards.iter().position(|r| r.contains(&card)).unwrap_or(SECTION_COUNT - 1)
    }

    pub fn section_for_line(&self, line: usize) -> usize {
        self.lines.iter().position(|r| r.contains(&line)).unwrap_or(SECTION_COUNT - 1)
    }

    /// First card of the nearest non-empty section after/before `section`.
    pub fn neighbour_start(&self, section: usize, forward: bool) -> Option<usize> {
        let candidates: Vec<usize> = if forward {
            (section + 1..SECTION_COUNT).collect()
        } else {
            (0..section).rev().collect()
        };
        candidates.into_iter().find(|&s| !self.cards[s].is_empty()).map(|s| self.cards[s].start)
    }
}
