//! List detection and conversion on plain text.
//!
//! Surrogate text is plain lines separated by `\n`; these helpers decide
//! whether it reads as a numbered or bulleted list and rewrite the markers.
//! Everything here is a pure string transform.

/// Bullet markers recognised on input. `•` is the one we write.
const BULLET_MARKERS: [char; 3] = ['•', '-', '*'];

/// Share of non-blank lines that must carry a marker, in tenths.
const LIST_THRESHOLD_TENTHS: usize = 7;

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').filter(|line| !line.trim().is_empty())
}

/// Strip a leading `<digits>.` marker; returns the rest (starting at the
/// character after the dot).
fn strip_number_marker(line: &str) -> Option<&str> {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix('.')
}

fn strip_bullet_marker(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    match chars.next() {
        Some(c) if BULLET_MARKERS.contains(&c) => Some(chars.as_str()),
        _ => None,
    }
}

fn starts_with_whitespace(rest: &str) -> bool {
    rest.chars().next().is_some_and(char::is_whitespace)
}

fn is_numbered_line(line: &str) -> bool {
    strip_number_marker(line.trim()).is_some_and(starts_with_whitespace)
}

fn is_bullet_line(line: &str) -> bool {
    strip_bullet_marker(line.trim()).is_some_and(starts_with_whitespace)
}

fn mostly(text: &str, predicate: impl Fn(&str) -> bool) -> bool {
    let mut total = 0;
    let mut matching = 0;
    for line in non_blank_lines(text) {
        total += 1;
        if predicate(line) {
            matching += 1;
        }
    }
    if total == 0 {
        return false;
    }
    // ceil(total * 0.7) without floats
    let needed = (total * LIST_THRESHOLD_TENTHS).div_ceil(10);
    matching >= needed
}

/// At least 70% of non-blank lines start with `<n>. `.
pub fn is_numbered_list(text: &str) -> bool {
    mostly(text, is_numbered_line)
}

/// At least 70% of non-blank lines start with `• `, `- ` or `* `.
pub fn is_bullet_list(text: &str) -> bool {
    mostly(text, is_bullet_line)
}

/// Number non-blank lines sequentially from 1. Blank lines are dropped.
pub fn convert_to_numbered_list(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    non_blank_lines(text)
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix non-blank lines with `• `. Blank lines are dropped.
pub fn convert_to_bullet_list(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    non_blank_lines(text)
        .map(|line| format!("• {}", line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip one numbered marker, then one bullet marker, from every line.
///
/// Leading whitespace before a marker and whitespace after it go too.
/// Lines without a marker are kept as they are.
pub fn convert_to_plain_text(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    text.split('\n')
        .map(|line| {
            let line = match strip_number_marker(line.trim_start()) {
                Some(rest) => rest.trim_start(),
                None => line,
            };
            match strip_bullet_marker(line.trim_start()) {
                Some(rest) => rest.trim_start(),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered-list command: numbered text goes back to plain, anything else
/// becomes numbered (bullets are stripped first so markers never stack).
pub fn toggle_numbered_list(text: &str) -> String {
    if is_numbered_list(text) {
        return convert_to_plain_text(text);
    }
    if is_bullet_list(text) {
        return convert_to_numbered_list(&convert_to_plain_text(text));
    }
    convert_to_numbered_list(text)
}

/// Bullet-list command, symmetric to [`toggle_numbered_list`].
pub fn toggle_bullet_list(text: &str) -> String {
    if is_bullet_list(text) {
        return convert_to_plain_text(text);
    }
    if is_numbered_list(text) {
        return convert_to_bullet_list(&convert_to_plain_text(text));
    }
    convert_to_bullet_list(text)
}
