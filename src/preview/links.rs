//! Links found in rendered preview text: `[[wikilinks]]` and bare URLs.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use unicode_width::UnicodeWidthStr;

use super::lines::SourceLine;

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[\[[^\[\]\n]+\]\]|https?://[^\s<>()\[\]]+").expect("link pattern is valid")
    })
}

/// A link span in the rendered buffer. `column` and `length` are in display
/// cells so the painter can underline it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget<'a> {
    /// Title of the note a wikilink points at, alias and `#heading` removed.
    Note(&'a str),
    Url(&'a str),
}

impl Link {
    pub fn target(&self) -> LinkTarget<'_> {
        match self.text.strip_prefix("[[").and_then(|t| t.strip_suffix("]]")) {
            Some(inner) => {
                let target = inner.split('|').next().unwrap_or(inner);
                let target = target.split('#').next().unwrap_or(target);
                LinkTarget::Note(target.trim())
            }
            None => LinkTarget::Url(&self.text),
        }
    }
}

/// Byte ranges of the links in `text`. Trailing punctuation and emphasis
/// markers are not part of a URL.
pub fn link_spans(text: &str) -> Vec<Range<usize>> {
    link_pattern()
        .find_iter(text)
        .filter_map(|m| {
            let found = m.as_str();
            let kept = if found.starts_with("[[") {
                found
            } else {
                found.trim_end_matches(['.', ',', ';', ':', '!', '?', '\'', '"', '*', '`'])
            };
            (!kept.is_empty()).then(|| m.start()..m.start() + kept.len())
        })
        .collect()
}

pub fn extract_from_text(text: &str, line: usize) -> Vec<Link> {
    link_spans(text)
        .into_iter()
        .map(|span| Link {
            text: text[span.clone()].to_string(),
            line,
            column: text[..span.start].width(),
            length: text[span].width(),
        })
        .collect()
}

/// Links in document order.
pub fn extract_links(lines: &[SourceLine]) -> Vec<Link> {
    lines
        .iter()
        .enumerate()
        .flat_map(|(i, line)| extract_from_text(&line.text, i))
        .collect()
}

/// Cyclic successor of `anchor`; with no anchor the first link.
pub fn next_index(len: usize, anchor: Option<usize>) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match anchor {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    })
}

/// Cyclic predecessor of `anchor`; with no anchor the last link.
pub fn prev_index(len: usize, anchor: Option<usize>) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match anchor {
        Some(i) if i > 0 && i <= len => i - 1,
        _ => len - 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_wikilinks_and_urls_in_order() {
        let lines = vec![
            SourceLine::plain("see [[Project Plan#Goals|plan]] and https://example.com/a."),
            SourceLine::plain("nothing here"),
            SourceLine::plain("[[Inbox]]"),
        ];
        let links = extract_links(&lines);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].text, "[[Project Plan#Goals|plan]]");
        assert_eq!((links[0].line, links[0].column), (0, 4));
        assert_eq!(links[1].text, "https://example.com/a");
        assert_eq!(links[1].length, 21);
        assert_eq!((links[2].line, links[2].column), (2, 0));
    }

    #[test]
    fn test_targets() {
        let wiki = extract_from_text("[[Project Plan#Goals|plan]]", 0);
        assert_eq!(wiki[0].target(), LinkTarget::Note("Project Plan"));
        let url = extract_from_text("(http://x.io/y)", 0);
        assert_eq!(url[0].target(), LinkTarget::Url("http://x.io/y"));
        assert_eq!(url[0].column, 1);
    }

    #[test]
    fn test_url_stops_before_emphasis_markers() {
        let text = "**https://x.io/a__b** and `https://y.io`";
        let spans = link_spans(text);
        assert_eq!(&text[spans[0].clone()], "https://x.io/a__b");
        assert_eq!(&text[spans[1].clone()], "https://y.io");
    }

    #[test]
    fn test_columns_are_display_cells() {
        let links = extract_from_text("日本 [[Note]]", 0);
        assert_eq!(links[0].column, 5);
        assert_eq!(links[0].length, 8);
    }

    #[test]
    fn test_cycling_wraps_both_ways() {
        assert_eq!(next_index(3, Some(2)), Some(0));
        assert_eq!(next_index(3, Some(0)), Some(1));
        assert_eq!(next_index(3, None), Some(0));
        assert_eq!(prev_index(3, Some(0)), Some(2));
        assert_eq!(prev_index(3, Some(2)), Some(1));
        assert_eq!(prev_index(3, None), Some(2));
        assert_eq!(next_index(0, None), None);
        assert_eq!(prev_index(0, Some(1)), None);
    }
}
