//! Turning a note into display lines that remember which content line they
//! came from.

mod markdown;

pub use markdown::MarkdownRenderer;

use crate::preview::PreviewDisplayState;
use crate::store::Note;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: String,
    /// 1-indexed content line (post-frontmatter) this display line shows.
    pub source_line: Option<usize>,
    pub header: bool,
}

impl RenderedLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), source_line: None, header: false }
    }
}

pub trait LineRenderer {
    /// Must emit one entry per display line. Wrapped continuations repeat the
    /// source line of the line they continue.
    fn render(&self, note: &Note, width: usize, display: &PreviewDisplayState) -> Vec<RenderedLine>;
}
