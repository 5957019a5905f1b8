//! Notes stored as `*.md` files under one directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};

use super::{
    children_of, collect_hits, compose, find_by_title, line_matches, query_words, Composed,
    Frontmatter, LineOp, Note, NoteId, NoteStore, PickHit, SearchOptions, StoreError,
};
use crate::search::SearchIndex;

pub struct FsStore {
    root: PathBuf,
    notes: Vec<Note>,
    index: SearchIndex,
}

impl FsStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut store = Self { root: root.into(), notes: Vec::new(), index: SearchIndex::new() };
        store.refresh()?;
        Ok(store)
    }

    /// The id a file under the root would have: relative path, no extension.
    pub fn id_for(&self, path: &Path) -> Option<NoteId> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let without_ext = relative.with_extension("");
        let parts: Vec<String> = without_ext
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(NoteId(parts.join("/")))
    }

    fn path_for(&self, id: &NoteId) -> PathBuf {
        self.root.join(format!("{}.md", id.as_str()))
    }

    fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), StoreError> {
        let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if hidden {
                continue;
            }
            if path.is_dir() {
                Self::collect_files(&path, out)?;
            } else if path.extension().is_some_and(|ext| ext == "md") {
                out.push(path);
            }
        }
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Note, StoreError> {
        let raw = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let id = self
            .id_for(path)
            .ok_or_else(|| StoreError::NotFound(path.display().to_string()))?;
        let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        Ok(Note::parse(id, Some(path.to_path_buf()), &stem, &raw))
    }

    fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|n| &n.id == id)
    }

    /// Re-read one note from disk into the cache and the index.
    fn reload_note(&mut self, id: &NoteId) -> Result<Note, StoreError> {
        let note = self.load(&self.path_for(id))?;
        match self.position(id) {
            Some(idx) => {
                self.index.update_note(idx, &note.body);
                self.notes[idx] = note.clone();
            }
            None => {
                self.index.index_note(self.notes.len(), &note.body);
                self.notes.push(note.clone());
            }
        }
        Ok(note)
    }
}

/// Replace content line `line` of `raw`, keeping every other byte intact.
pub(crate) fn rewrite_line(raw: &str, line: usize, op: &LineOp) -> Option<String> {
    let (_, content_start) = Frontmatter::parse(raw);
    let target = content_start + line.checked_sub(1)?;
    let mut out = String::with_capacity(raw.len() + 16);
    let mut found = false;

    for (i, chunk) in raw.split_inclusive('\n').enumerate() {
        if i != target {
            out.push_str(chunk);
            continue;
        }
        let ending = if chunk.ends_with("\r\n") {
            "\r\n"
        } else if chunk.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        out.push_str(&op.apply(&chunk[..chunk.len() - ending.len()]));
        out.push_str(ending);
        found = true;
    }
    found.then_some(out)
}

impl NoteStore for FsStore {
    fn all_notes(&self) -> Result<Vec<Note>, StoreError> {
        let mut notes = self.notes.clone();
        notes.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(notes)
    }

    fn get(&self, id: &NoteId) -> Result<Note, StoreError> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.load(&path)
    }

    fn find_by_title(&self, title: &str) -> Result<Note, StoreError> {
        let found = find_by_title(&self.notes, title)
            .ok_or_else(|| StoreError::NotFound(title.to_string()))?;
        self.get(&found.id)
    }

    fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<PickHit>, StoreError> {
        let words = query_words(query);
        let candidates = self.index.candidates(query).unwrap_or_else(|| {
            self.notes
                .iter()
                .enumerate()
                .flat_map(|(idx, n)| (1..=n.body.lines().count()).map(move |line| (idx, line)))
                .collect()
        });
        let matches = candidates
            .into_iter()
            .filter(|&(idx, line)| {
                self.notes[idx].line(line).is_some_and(|text| line_matches(text, &words))
            })
            .collect();
        let hits = collect_hits(&self.notes, matches, options);
        debug!(query, hits = hits.len(), "search");
        Ok(hits)
    }

    fn read_line(&self, id: &NoteId, line: usize) -> Result<String, StoreError> {
        let note = self.get(id)?;
        note.line(line)
            .map(str::to_string)
            .ok_or_else(|| StoreError::LineOutOfRange { id: id.clone(), line })
    }

    fn mutate_line(&mut self, id: &NoteId, line: usize, op: &LineOp) -> Result<(), StoreError> {
        let path = self.path_for(id);
        let raw = fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(id.to_string()),
            _ => StoreError::io(&path, e),
        })?;
        let updated = rewrite_line(&raw, line, op)
            .ok_or_else(|| StoreError::LineOutOfRange { id: id.clone(), line })?;
        fs::write(&path, updated).map_err(|e| StoreError::io(&path, e))?;
        info!(note = %id, line, ?op, "line updated");
        self.reload_note(id)?;
        Ok(())
    }

    fn compose_children(&self, parent: &NoteId) -> Result<Composed, StoreError> {
        let parent = self.get(parent)?;
        let children = children_of(&self.notes, &parent);
        if children.is_empty() {
            return Err(StoreError::NoChildren(parent.id));
        }
        Ok(compose::compose(&parent, &children))
    }

    fn notes_dated(&self, date: NaiveDate) -> Result<Vec<Note>, StoreError> {
        let mut notes: Vec<Note> = self.notes.iter().filter(|n| n.date == Some(date)).cloned().collect();
        notes.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(notes)
    }

    fn refresh(&mut self) -> Result<(), StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::MissingRoot(self.root.clone()));
        }
        let mut files = Vec::new();
        Self::collect_files(&self.root, &mut files)?;
        files.sort();

        self.notes.clear();
        self.index.clear();
        for path in files {
            let note = self.load(&path)?;
            self.index.index_note(self.notes.len(), &note.body);
            self.notes.push(note);
        }
        info!(root = %self.root.display(), notes = self.notes.len(), "notes loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LineFilter;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, FsStore) {
        let dir = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            write(dir.path(), rel, content);
        }
        let store = FsStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_rewrite_line_targets_post_frontmatter_line() {
        let raw = "---\ntitle: T\n---\nfirst\n- [ ] second\r\nthird";
        let out = rewrite_line(raw, 2, &LineOp::SetChecked(true)).unwrap();
        assert_eq!(out, "---\ntitle: T\n---\nfirst\n- [x] second\r\nthird");
        let out = rewrite_line(raw, 3, &LineOp::AddToken("#done".into())).unwrap();
        assert!(out.ends_with("third #done"));
        assert!(rewrite_line(raw, 4, &LineOp::AddCheckbox).is_none());
        assert!(rewrite_line(raw, 0, &LineOp::AddCheckbox).is_none());
    }

    #[test]
    fn test_open_loads_nested_notes_and_skips_hidden() {
        let (_dir, store) = store_with(&[
            ("inbox.md", "hello"),
            ("work/plan.md", "---\ntitle: The Plan\n---\nstep one"),
            (".trash/old.md", "gone"),
            ("readme.txt", "not a note"),
        ]);
        let notes = store.all_notes().unwrap();
        let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["inbox", "work/plan"]);
        assert_eq!(store.find_by_title("the plan").unwrap().id, NoteId::new("work/plan"));
        assert_eq!(store.find_by_title("work/plan").unwrap().title, "The Plan");
        assert!(matches!(store.find_by_title("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_mutate_line_rewrites_file_and_reindexes() {
        let (dir, mut store) = store_with(&[("todo.md", "---\ntags: [a]\n---\n# Today\n- [ ] ship it\n")]);
        let id = NoteId::new("todo");
        assert_eq!(store.read_line(&id, 2).unwrap(), "- [ ] ship it");

        store.mutate_line(&id, 2, &LineOp::AddToken("#done".into())).unwrap();
        let raw = fs::read_to_string(dir.path().join("todo.md")).unwrap();
        assert_eq!(raw, "---\ntags: [a]\n---\n# Today\n- [ ] ship it #done\n");

        let hits = store.search("#done", &SearchOptions::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].lines[0].line, 2);

        let err = store.mutate_line(&id, 9, &LineOp::AddCheckbox).unwrap_err();
        assert!(matches!(err, StoreError::LineOutOfRange { line: 9, .. }));
    }

    #[test]
    fn test_search_filters_todos() {
        let (_dir, store) = store_with(&[(
            "day.md",
            "- [ ] pay rent @2024-01-15\nlunch with sam @2024-01-15\n- [x] old @2024-01-15",
        )]);
        let todo = SearchOptions { limit: None, filter: LineFilter::OpenTodo };
        let hits = store.search("@2024-01-15", &todo).unwrap();
        assert_eq!(hits[0].lines.len(), 1);
        assert_eq!(hits[0].lines[0].line, 1);

        let other = SearchOptions { limit: None, filter: LineFilter::NotOpenTodo };
        let lines: Vec<usize> = store.search("@2024-01-15", &other).unwrap()[0].lines.iter().map(|l| l.line).collect();
        assert_eq!(lines, vec![2, 3]);
    }

    #[test]
    fn test_compose_and_dated_notes() {
        let (_dir, store) = store_with(&[
            ("p.md", "---\ntitle: Parent\n---\n"),
            ("c.md", "---\ntitle: Child\nparent: p\ndate: 2024-01-15\n---\nchild line"),
            ("lonely.md", "nothing"),
        ]);
        let composed = store.compose_children(&NoteId::new("p")).unwrap();
        assert_eq!(composed.note.body, "## Child\nchild line");
        let (id, _, line) = composed.source_map.resolve(2).unwrap();
        assert_eq!((id.as_str(), line), ("c", 1));
        assert!(matches!(
            store.compose_children(&NoteId::new("lonely")),
            Err(StoreError::NoChildren(_))
        ));

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let dated = store.notes_dated(date).unwrap();
        assert_eq!(dated.len(), 1);
        assert_eq!(dated[0].title, "Child");
    }

    #[test]
    fn test_refresh_picks_up_external_edits() {
        let (dir, mut store) = store_with(&[("a.md", "one")]);
        write(dir.path(), "b.md", "two");
        assert_eq!(store.all_notes().unwrap().len(), 1);
        store.refresh().unwrap();
        assert_eq!(store.all_notes().unwrap().len(), 2);
    }
}
