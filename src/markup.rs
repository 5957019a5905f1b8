//! Inline markup recognised on a single note line: task checkboxes,
//! `#tag` tokens and `@YYYY-MM-DD` date tokens.

use chrono::NaiveDate;

pub const DONE_TAG: &str = "done";
const DATE_FORMAT: &str = "%Y-%m-%d";
const BULLETS: [&str; 3] = ["- ", "* ", "+ "];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkbox {
    Open,
    Checked,
}

fn indent_len(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Returns the checkbox state of a task line such as `  - [ ] buy milk`.
pub fn checkbox(line: &str) -> Option<Checkbox> {
    let trimmed = line.trim_start();
    let rest = BULLETS.iter().find_map(|b| trimmed.strip_prefix(b))?;
    if rest.starts_with("[ ]") {
        Some(Checkbox::Open)
    } else if rest.starts_with("[x]") || rest.starts_with("[X]") {
        Some(Checkbox::Checked)
    } else {
        None
    }
}

pub fn is_open_todo(line: &str) -> bool {
    checkbox(line) == Some(Checkbox::Open)
}

pub fn set_checked(line: &str, checked: bool) -> String {
    if checkbox(line).is_none() {
        return line.to_string();
    }
    // bullet and its space are ASCII, so the box starts two bytes after the indent
    let box_start = indent_len(line) + 2;
    let mark = if checked { "[x]" } else { "[ ]" };
    format!("{}{}{}", &line[..box_start], mark, &line[box_start + 3..])
}

/// Turns a plain line (or plain bullet) into an open task, keeping indentation.
pub fn add_checkbox(line: &str) -> String {
    if checkbox(line).is_some() {
        return line.to_string();
    }
    let indent = &line[..indent_len(line)];
    let trimmed = line.trim_start();
    for bullet in BULLETS {
        if let Some(body) = trimmed.strip_prefix(bullet) {
            return format!("{}{}[ ] {}", indent, bullet, body);
        }
    }
    format!("{}- [ ] {}", indent, trimmed)
}

pub fn tag_token(name: &str) -> String {
    format!("#{}", name.trim().trim_start_matches('#'))
}

pub fn date_token(date: NaiveDate) -> String {
    format!("@{}", date.format(DATE_FORMAT))
}

/// Accepts `2024-01-15` or `@2024-01-15`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim().trim_start_matches('@'), DATE_FORMAT).ok()
}

fn find_token(line: &str, token: &str) -> Option<usize> {
    if token.is_empty() {
        return None;
    }
    line.match_indices(token).map(|(idx, _)| idx).find(|&idx| {
        let end = idx + token.len();
        let before_ok = line[..idx].chars().next_back().map_or(true, char::is_whitespace);
        let after_ok = line[end..].chars().next().map_or(true, char::is_whitespace);
        before_ok && after_ok
    })
}

/// True when `token` appears as a whole whitespace-delimited word.
pub fn has_token(line: &str, token: &str) -> bool {
    find_token(line, token).is_some()
}

pub fn add_token(line: &str, token: &str) -> String {
    if has_token(line, token) {
        return line.to_string();
    }
    let base = line.trim_end();
    if base.trim_start().is_empty() {
        format!("{}{}", base, token)
    } else {
        format!("{} {}", base, token)
    }
}

/// Removes every whole-word occurrence of `token` together with one adjacent
/// whitespace character.
pub fn remove_token(line: &str, token: &str) -> String {
    let mut out = line.to_string();
    while let Some(start) = find_token(&out, token) {
        let end = start + token.len();
        let (cut_start, cut_end) = match out[..start].char_indices().next_back() {
            Some((prev, _)) => (prev, end),
            None => {
                let next_len = out[end..].chars().next().map_or(0, char::len_utf8);
                (start, end + next_len)
            }
        };
        out.replace_range(cut_start..cut_end, "");
    }
    out
}
