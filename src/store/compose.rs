//! Composite notes: a parent note assembled from its children, plus the map
//! that sends each composite line back to the child line it came from.

use std::path::{Path, PathBuf};

use super::{Note, NoteId};

/// `len` composite lines starting at composite line `start` come from
/// `child` lines starting at `child_start`. All numbers are 1-indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeSpan {
    pub start: usize,
    pub len: usize,
    pub child: NoteId,
    pub path: Option<PathBuf>,
    pub child_start: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMap {
    spans: Vec<ComposeSpan>,
}

impl SourceMap {
    pub fn new(spans: Vec<ComposeSpan>) -> Self {
        Self { spans }
    }

    pub fn resolve(&self, line: usize) -> Option<(&NoteId, Option<&Path>, usize)> {
        self.spans
            .iter()
            .find(|s| s.start <= line && line < s.start + s.len)
            .map(|s| (&s.child, s.path.as_deref(), s.child_start + (line - s.start)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    pub note: Note,
    pub source_map: SourceMap,
}

/// Concatenate the children under a `## title` heading each. Headings and the
/// blank lines between children map to nothing.
pub fn compose(parent: &Note, children: &[&Note]) -> Composed {
    let mut body: Vec<String> = Vec::new();
    let mut spans = Vec::new();

    for child in children {
        if !body.is_empty() {
            body.push(String::new());
        }
        body.push(format!("## {}", child.title));
        let start = body.len() + 1;
        let before = body.len();
        body.extend(child.body.lines().map(str::to_string));
        let len = body.len() - before;
        if len > 0 {
            spans.push(ComposeSpan {
                start,
                len,
                child: child.id.clone(),
                path: child.path.clone(),
                child_start: 1,
            });
        }
    }

    let note = Note {
        id: parent.id.clone(),
        title: parent.title.clone(),
        path: None,
        frontmatter: Vec::new(),
        tags: parent.tags.clone(),
        date: parent.date,
        parent: None,
        body: body.join("\n"),
    };

    Composed { note, source_map: SourceMap::new(spans) }
}
