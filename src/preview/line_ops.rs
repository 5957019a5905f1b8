//! Edits to the source line under the cursor. The rendered buffer is never
//! patched in place: the store writes the file and the cards are reloaded.

use chrono::NaiveDate;
use tracing::debug;

use super::Preview;
use crate::markup::{self, Checkbox};
use crate::store::LineOp;

fn toggle_token(line: &str, token: String) -> LineOp {
    if markup::has_token(line, &token) {
        LineOp::RemoveToken(token)
    } else {
        LineOp::AddToken(token)
    }
}

impl Preview {
    /// Resolve the cursor, read the line it shows, let `choose` pick an edit
    /// from the raw text, apply it through the store and reload.
    fn mutate_at_cursor(&mut self, choose: impl FnOnce(&str) -> Option<LineOp>) {
        let Some(target) = self.resolve_target() else {
            return;
        };
        let line = match self.store.read_line(&target.note_id, target.content_line) {
            Ok(line) => line,
            Err(err) => return self.report("could not read line", &err),
        };
        let Some(op) = choose(&line) else {
            return;
        };
        if let Err(err) = self.store.mutate_line(&target.note_id, target.content_line, &op) {
            return self.report("could not update line", &err);
        }
        debug!(note = %target.note_id, line = target.content_line, ?op, "line updated");
        self.reload();
    }

    pub fn toggle_todo(&mut self) {
        self.mutate_at_cursor(|line| {
            Some(match markup::checkbox(line) {
                Some(Checkbox::Open) => LineOp::SetChecked(true),
                Some(Checkbox::Checked) => LineOp::SetChecked(false),
                None => LineOp::AddCheckbox,
            })
        });
    }

    /// Toggle the `#done` tag.
    pub fn append_done(&mut self) {
        self.mutate_at_cursor(|line| Some(toggle_token(line, markup::tag_token(markup::DONE_TAG))));
    }

    pub fn toggle_inline_tag(&mut self, name: &str) {
        let name = name.trim().trim_start_matches('#');
        if name.is_empty() || name.contains(char::is_whitespace) {
            return;
        }
        let token = markup::tag_token(name);
        self.mutate_at_cursor(|line| Some(toggle_token(line, token)));
    }

    pub fn toggle_inline_date(&mut self, date: NaiveDate) {
        let token = markup::date_token(date);
        self.mutate_at_cursor(|line| Some(toggle_token(line, token)));
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::preview::{history, PreviewDisplayState, StatusMessage, VariantKey};
    use crate::render::MarkdownRenderer;
    use crate::shell::Opener;
    use crate::store::memory::MemoryStore;
    use crate::store::NoteId;

    struct NoOpener;

    impl Opener for NoOpener {
        fn open(&self, _target: &str) -> io::Result<()> {
            Ok(())
        }
    }

    fn preview(store: &MemoryStore) -> Preview {
        Preview::new(
            Box::new(store.clone()),
            Box::new(MarkdownRenderer::new()),
            Box::new(NoOpener),
            history::shared(history::DEFAULT_HISTORY_LIMIT),
            PreviewDisplayState::default(),
        )
    }

    fn tasks() -> MemoryStore {
        MemoryStore::new().with_note("n1", "---\ntitle: Tasks\n---\nintro\n\nlist:\n- [ ] ship it\nnotes")
    }

    #[test]
    fn test_toggle_todo_targets_source_line() {
        let store = tasks();
        let mut preview = preview(&store);
        preview.open_by_title("Tasks");
        for _ in 0..3 {
            preview.move_down();
        }
        let target = preview.resolve_target().unwrap();
        assert_eq!(target.note_id, NoteId::new("n1"));
        assert_eq!(target.content_line, 4);
        assert_eq!(target.path.as_deref(), Some(std::path::Path::new("/notes/n1.md")));

        preview.toggle_todo();
        assert_eq!(store.mutations(), vec![(NoteId::new("n1"), 4, LineOp::SetChecked(true))]);
        assert!(store.body("n1").unwrap().contains("- [x] ship it"));
        // reloaded, cursor still on the same line
        assert_eq!(preview.resolve_target().unwrap().content_line, 4);
        assert!(preview.nav().lines[preview.nav().cursor_line()].text.contains("ship it"));

        preview.toggle_todo();
        assert!(store.body("n1").unwrap().contains("- [ ] ship it"));
    }

    #[test]
    fn test_plain_line_gains_checkbox() {
        let store = tasks();
        let mut preview = preview(&store);
        preview.open_by_title("Tasks");
        preview.toggle_todo();
        assert_eq!(store.mutations()[0].2, LineOp::AddCheckbox);
        assert!(store.body("n1").unwrap().starts_with("- [ ] intro"));
    }

    #[test]
    fn test_tag_and_date_toggle_back_and_forth() {
        let store = tasks();
        let mut preview = preview(&store);
        preview.open_by_title("Tasks");
        preview.toggle_inline_tag("#urgent");
        assert!(store.body("n1").unwrap().starts_with("intro #urgent"));
        preview.toggle_inline_tag("urgent");
        assert!(store.body("n1").unwrap().starts_with("intro\n"));

        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        preview.toggle_inline_date(day);
        assert!(store.body("n1").unwrap().starts_with("intro @2024-05-01"));
        preview.append_done();
        assert!(store.body("n1").unwrap().starts_with("intro @2024-05-01 #done"));
        preview.append_done();
        assert!(store.body("n1").unwrap().starts_with("intro @2024-05-01\n"));

        preview.toggle_inline_tag("  ");
        preview.toggle_inline_tag("two words");
        assert_eq!(store.mutations().len(), 5);
    }

    #[test]
    fn test_non_addressable_cursor_is_a_no_op() {
        let store = MemoryStore::new();
        let mut preview = preview(&store);
        preview.toggle_todo();
        preview.append_done();
        assert!(store.mutations().is_empty());
        assert_eq!(preview.status(), None);
    }

    #[test]
    fn test_failed_store_keeps_preview_state() {
        let store = tasks();
        let mut preview = preview(&store);
        preview.open_by_title("Tasks");
        preview.move_down();
        let cursor = preview.nav().cursor_line();
        let lines = preview.nav().lines.clone();

        store.set_offline(true);
        preview.toggle_todo();
        assert!(matches!(preview.status(), Some(StatusMessage::Error(_))));
        assert!(store.mutations().is_empty());
        assert_eq!(preview.nav().cursor_line(), cursor);
        assert_eq!(preview.nav().lines, lines);
    }

    #[test]
    fn test_compose_edit_lands_in_child() {
        let store = MemoryStore::new()
            .with_note("p", "---\ntitle: Parent\n---\nbody")
            .with_note("c", "---\ntitle: Child\nparent: p\n---\nfirst\n- [ ] second");
        let mut preview = preview(&store);
        preview.open_by_title("Parent");
        preview.open_compose();
        assert_eq!(preview.active_key(), VariantKey::Compose);
        // heading, first, second
        preview.move_down();
        preview.move_down();
        preview.toggle_todo();
        assert_eq!(store.mutations(), vec![(NoteId::new("c"), 2, LineOp::SetChecked(true))]);
        assert!(store.body("c").unwrap().ends_with("- [x] second"));
        assert_eq!(store.body("p").unwrap(), "body");
        assert_eq!(preview.active_key(), VariantKey::Compose);
    }
}
