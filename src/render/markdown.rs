use unicode_width::UnicodeWidthChar;

use super::{LineRenderer, RenderedLine};
use crate::markup::{self, Checkbox};
use crate::preview::{links, PreviewDisplayState};
use crate::store::Note;

const MIN_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn is_header(line: &str) -> bool {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with(' ')
}

/// Light markdown dressing. Wikilinks and URLs are left untouched so links
/// can be found in the rendered text.
fn style_line(line: &str) -> String {
    if is_header(line) {
        return line.trim_start_matches('#').trim_start().to_string();
    }
    let indent = &line[..line.len() - line.trim_start().len()];
    let trimmed = line.trim_start();

    let body = match markup::checkbox(line) {
        Some(state) => {
            let mark = if state == Checkbox::Checked { "☑" } else { "☐" };
            format!("{} {}", mark, trimmed[5..].trim_start())
        }
        None => match ["- ", "* ", "+ "].iter().find_map(|b| trimmed.strip_prefix(b)) {
            Some(rest) => format!("• {}", rest),
            None => trimmed.to_string(),
        },
    };
    format!("{}{}", indent, strip_emphasis(&body))
}

/// Drop `**`, `__` and backticks everywhere except inside links.
fn strip_emphasis(text: &str) -> String {
    let strip = |s: &str| s.replace("**", "").replace("__", "").replace('`', "");
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in links::link_spans(text) {
        out.push_str(&strip(&text[last..span.start]));
        out.push_str(&text[span.clone()]);
        last = span.end;
    }
    out.push_str(&strip(&text[last..]));
    out
}

/// Break `text` into pieces no wider than `width`, preferring whitespace.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut last_space: Option<usize> = None;

    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if current_width + w > width && !current.is_empty() {
            match last_space {
                Some(at) if at > 0 => {
                    let rest = current.split_off(at + 1);
                    pieces.push(current.trim_end().to_string());
                    current = rest;
                }
                _ => pieces.push(std::mem::take(&mut current)),
            }
            current_width = current.chars().map(|c| c.width().unwrap_or(0)).sum();
            last_space = None;
        }
        if ch == ' ' {
            last_space = Some(current.len());
        }
        current.push(ch);
        current_width += w;
    }
    pieces.push(current);
    pieces
}

impl LineRenderer for MarkdownRenderer {
    fn render(&self, note: &Note, width: usize, display: &PreviewDisplayState) -> Vec<RenderedLine> {
        let width = width.max(MIN_WIDTH);
        let mut out = Vec::new();

        if display.show_frontmatter {
            out.extend(note.frontmatter.iter().map(RenderedLine::plain));
        }
        if display.show_global_tags && !note.tags.is_empty() {
            let tags: Vec<String> = note.tags.iter().map(|t| markup::tag_token(t)).collect();
            out.push(RenderedLine::plain(tags.join(" ")));
        }

        let mut in_code_block = false;
        for (i, line) in note.body.lines().enumerate() {
            let source = i + 1;
            let fence = line.trim_start().starts_with("```");
            let header = !in_code_block && !fence && is_header(line);
            let text = if display.render_markdown && !in_code_block && !fence {
                style_line(line)
            } else {
                line.to_string()
            };
            if fence {
                in_code_block = !in_code_block;
            }

            for (n, piece) in wrap(&text, width).into_iter().enumerate() {
                out.push(RenderedLine { text: piece, source_line: Some(source), header: header && n == 0 });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NoteId;

    fn note(raw: &str) -> Note {
        Note::parse(NoteId::new("n"), None, "n", raw)
    }

    fn display(markdown: bool) -> PreviewDisplayState {
        PreviewDisplayState { render_markdown: markdown, ..Default::default() }
    }

    #[test]
    fn test_source_lines_skip_frontmatter() {
        let n = note("---\ntitle: T\ntags: [a, b]\n---\n# Head\n- [ ] task\nplain");
        let lines = MarkdownRenderer.render(&n, 80, &display(true));
        let sources: Vec<Option<usize>> = lines.iter().map(|l| l.source_line).collect();
        assert_eq!(sources, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(lines[0].text, "Head");
        assert!(lines[0].header);
        assert_eq!(lines[1].text, "☐ task");
        assert!(!lines[1].header);
    }

    #[test]
    fn test_frontmatter_and_tags_have_no_provenance() {
        let n = note("---\ntags: [a, b]\n---\nbody");
        let state = PreviewDisplayState {
            show_frontmatter: true,
            show_global_tags: true,
            ..Default::default()
        };
        let lines = MarkdownRenderer.render(&n, 80, &state);
        assert_eq!(lines.len(), 5);
        assert!(lines[..4].iter().all(|l| l.source_line.is_none()));
        assert_eq!(lines[3].text, "#a #b");
        assert_eq!(lines[4].source_line, Some(1));
    }

    #[test]
    fn test_raw_mode_keeps_text_and_code_blocks_have_no_headers() {
        let n = note("# Title\n```\n# not a header\n```\n**bold** [[Link]]");
        let lines = MarkdownRenderer.render(&n, 80, &display(false));
        assert_eq!(lines[0].text, "# Title");
        assert!(lines[0].header);
        assert!(!lines[2].header);
        assert_eq!(lines[4].text, "**bold** [[Link]]");

        let styled = MarkdownRenderer.render(&n, 80, &display(true));
        assert_eq!(styled[4].text, "bold [[Link]]");
        assert_eq!(styled[2].text, "# not a header");
    }

    #[test]
    fn test_styling_leaves_urls_intact() {
        let n = note("- read https://x.io/a__b and `cargo doc`\n**https://y.io/p**");
        let lines = MarkdownRenderer.render(&n, 80, &display(true));
        assert_eq!(lines[0].text, "• read https://x.io/a__b and cargo doc");
        assert_eq!(lines[1].text, "https://y.io/p");
    }

    #[test]
    fn test_wrapped_lines_repeat_source() {
        let n = note("alpha beta gamma delta epsilon");
        let lines = MarkdownRenderer.render(&n, 12, &display(false));
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.source_line == Some(1)));
        assert_eq!(lines[0].text, "alpha beta");
    }

    #[test]
    fn test_is_header() {
        assert!(is_header("# a"));
        assert!(is_header("### a"));
        assert!(!is_header("#tag"));
        assert!(!is_header("####### a"));
    }
}
