//! Text primitives shared by the rewrite passes.
//!
//! Byte-offset helpers that carry no knowledge of import or tag syntax.

/// Identifier characters for JS/TS names (ASCII plus `$`).
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Whether `name` is a plain identifier usable as a binding or tag name.
pub fn is_identifier(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        None => false,
        Some(first) if first.is_ascii_digit() => false,
        Some(_) => bytes.iter().all(|&b| is_ident_byte(b)),
    }
}

/// Find all occurrences of `term` in `text` that are not part of a longer
/// identifier on either side.
///
/// - `Loader2` in `icon={Loader2}` matches
/// - `Loader2` in `Loader2Icon` or `MyLoader2` does not
pub fn find_word_matches(text: &str, term: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut matches = Vec::new();

    if term.is_empty() || term.len() > text.len() {
        return matches;
    }

    let mut start = 0;
    while let Some(pos) = text[start..].find(term) {
        let abs = start + pos;
        let end = abs + term.len();

        let left_ok = abs == 0 || !is_ident_byte(bytes[abs - 1]);
        let right_ok = end >= bytes.len() || !is_ident_byte(bytes[end]);

        if left_ok && right_ok {
            matches.push(abs);
        }

        start = abs + term.len();
    }

    matches
}

/// The line ending used by `text`: `"\r\n"` if its first line break is CRLF.
pub fn line_ending(text: &str) -> &'static str {
    match text.find('\n') {
        Some(pos) if pos > 0 && text.as_bytes()[pos - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}

/// 1-indexed line number of a byte offset.
pub fn line_of(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Byte offset of the start of the line containing `offset`.
pub fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map(|p| p + 1).unwrap_or(0)
}

/// Byte offset just past the line break ending the line containing `offset`
/// (or the end of text when the line is the last one).
pub fn line_end_inclusive(text: &str, offset: usize) -> usize {
    match text[offset..].find('\n') {
        Some(p) => offset + p + 1,
        None => text.len(),
    }
}

/// Number of lines as an editor would show them.
pub fn count_lines(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.lines().count()
    }
}

/// Apply non-overlapping `(start, end, replacement)` edits to `text`.
///
/// Edits are applied from the highest offset down so earlier offsets stay
/// valid. Overlapping edits are dropped (the first one claimed wins).
pub fn apply_edits(text: &str, edits: &[(usize, usize, String)]) -> String {
    let mut claimed: Vec<&(usize, usize, String)> = Vec::new();
    for edit in edits {
        if claimed.iter().any(|c| edit.0 < c.1 && edit.1 > c.0) {
            continue;
        }
        claimed.push(edit);
    }

    claimed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut result = text.to_string();
    for (start, end, replacement) in claimed {
        result.replace_range(*start..*end, replacement);
    }
    result
}
