use std::path::PathBuf;

use crate::store::NoteId;

/// One display line and, when it shows note content, where that content lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub text: String,
    pub note_id: Option<NoteId>,
    /// 1-indexed, post-frontmatter, same addressing as the store.
    pub content_line: Option<usize>,
    pub path: Option<PathBuf>,
}

impl SourceLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), note_id: None, content_line: None, path: None }
    }

    pub fn addressed(text: impl Into<String>, note_id: NoteId, line: usize, path: Option<PathBuf>) -> Self {
        Self { text: text.into(), note_id: Some(note_id), content_line: Some(line), path }
    }

    pub fn is_addressable(&self) -> bool {
        self.note_id.is_some() && self.content_line.is_some()
    }
}

/// Where a line-level edit should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub note_id: NoteId,
    pub content_line: usize,
    pub path: Option<PathBuf>,
}

pub fn resolve_target(lines: &[SourceLine], cursor: usize) -> Option<Target> {
    let line = lines.get(cursor)?;
    Some(Target {
        note_id: line.note_id.clone()?,
        content_line: line.content_line?,
        path: line.path.clone(),
    })
}
