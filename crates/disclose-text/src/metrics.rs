//! Visible-width measurement and small text helpers.
//!
//! Terminal output routinely mixes printable text with SGR escape sequences
//! and zero-width characters. The functions here strip the invisible parts
//! so that layout code can reason about on-screen columns. Double-width
//! glyphs (emoji, CJK) are not accounted for.

use std::borrow::Cow;

/// The soft hyphen, an invisible character marking an optional break point.
pub(crate) const SOFT_HYPHEN: char = '\u{ad}';

/// The word joiner, a zero-width character that never occupies a column.
const WORD_JOINER: char = '\u{2060}';

const ESC: char = '\u{1b}';
const CSI_C1: char = '\u{9b}';

/// Removes control-introducer sequences and word joiners from the text.
///
/// A control sequence is `ESC [` or the single-byte C1 introducer `\u{9b}`,
/// followed by parameter bytes in `0x30..=0x3F` and one final byte in
/// `0x40..=0x7E`. Malformed sequences (a missing final byte) are left in
/// place. Stripping is idempotent: running it over already-stripped text is
/// a no-op and returns the input unchanged.
pub fn strip_controls(text: &str) -> Cow<'_, str> {
    let mut out = String::new();
    let mut changed = false;
    let mut rest = text;

    while let Some(pos) = rest.find([ESC, CSI_C1, WORD_JOINER]) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let c = tail.chars().next().unwrap_or(ESC);
        let c_len = c.len_utf8();

        match c {
            WORD_JOINER => {
                changed = true;
                rest = &tail[c_len..];
            }
            CSI_C1 => match csi_end(&tail[c_len..]) {
                Some(end) => {
                    changed = true;
                    rest = &tail[c_len + end..];
                }
                None => {
                    out.push(c);
                    rest = &tail[c_len..];
                }
            },
            _ => {
                // ESC only introduces a sequence when followed by '['.
                if tail[c_len..].starts_with('[') {
                    match csi_end(&tail[c_len + 1..]) {
                        Some(end) => {
                            changed = true;
                            rest = &tail[c_len + 1 + end..];
                        }
                        None => {
                            out.push(c);
                            rest = &tail[c_len..];
                        }
                    }
                } else {
                    out.push(c);
                    rest = &tail[c_len..];
                }
            }
        }
    }

    if !changed {
        return Cow::Borrowed(text);
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Finds the byte offset just past a control sequence body, or `None` if
/// the body is malformed (a byte outside the parameter range before any
/// final byte, or end of input).
fn csi_end(s: &str) -> Option<usize> {
    for (i, c) in s.char_indices() {
        match c as u32 {
            0x30..=0x3f => continue,
            0x40..=0x7e => return Some(i + c.len_utf8()),
            _ => return None,
        }
    }
    None
}

/// Computes the visible length of the text on the terminal.
///
/// Control sequences and word joiners are discarded before counting; every
/// remaining char counts as one column. Double-wide glyphs are not handled.
///
/// # Example
///
/// ```rust
/// use disclose_text::visible_length;
///
/// assert_eq!(visible_length("hello"), 5);
/// assert_eq!(visible_length("\x1b[31mred\x1b[0m"), 3);
/// ```
pub fn visible_length(text: &str) -> usize {
    strip_controls(text).chars().count()
}

/// Checks whether the text consists of whitespace only (or is empty).
pub fn is_spacing_only(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Formats a column label for humane presentation.
///
/// Runs of underscores or breaking spaces collapse to a single space, and
/// the standalone word `pct` (case-insensitive) becomes `%`.
///
/// # Example
///
/// ```rust
/// use disclose_text::format_label;
///
/// assert_eq!(format_label("esp_rate"), "esp rate");
/// assert_eq!(format_label("growth_pct"), "growth %");
/// ```
pub fn format_label(label: &str) -> String {
    let mut collapsed = String::with_capacity(label.len());
    let mut in_gap = false;
    for c in label.chars() {
        if c == '_' || is_breaking_space(c) {
            if !in_gap {
                collapsed.push(' ');
                in_gap = true;
            }
        } else {
            collapsed.push(c);
            in_gap = false;
        }
    }
    replace_pct(&collapsed)
}

/// Replaces standalone occurrences of `pct` with `%`.
fn replace_pct(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, word) in text.split(' ').enumerate() {
        if index > 0 {
            out.push(' ');
        }
        if word.eq_ignore_ascii_case("pct") {
            out.push('%');
        } else {
            out.push_str(word);
        }
    }
    out
}

/// Checks whether the char is breaking whitespace, i.e. whitespace that a
/// reflowed line may end on. Excludes the no-break space family.
pub(crate) fn is_breaking_space(c: char) -> bool {
    matches!(
        c,
        '\u{09}'..='\u{0d}'
            | ' '
            | '\u{85}'
            | '\u{2000}'..='\u{2006}'
            | '\u{2008}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{205f}'
            | '\u{3000}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_length() {
        assert_eq!(visible_length(""), 0);
        assert_eq!(visible_length("hello"), 5);
        assert_eq!(visible_length("héllo"), 5);
    }

    #[test]
    fn sgr_sequences_are_invisible() {
        assert_eq!(visible_length("\x1b[1mbold\x1b[0m"), 4);
        assert_eq!(visible_length("\x1b[1;38;5;202mhot\x1b[39;0m"), 3);
    }

    #[test]
    fn c1_introducer_is_invisible() {
        assert_eq!(visible_length("\u{9b}31mred"), 3);
    }

    #[test]
    fn word_joiner_is_invisible() {
        assert_eq!(visible_length("a\u{2060}b"), 2);
    }

    #[test]
    fn soft_hyphen_is_visible() {
        // The reflow engine resolves soft hyphens itself; measurement
        // counts them like any other char.
        assert_eq!(visible_length("ab\u{ad}cd"), 5);
    }

    #[test]
    fn bare_escape_is_kept() {
        assert_eq!(visible_length("a\x1bb"), 3);
        assert_eq!(strip_controls("a\x1bb"), "a\u{1b}b");
    }

    #[test]
    fn malformed_sequence_is_kept() {
        // No final byte: nothing to strip.
        assert_eq!(strip_controls("\x1b[12"), "\x1b[12");
        assert_eq!(strip_controls("\x1b[\u{e9}m"), "\x1b[\u{e9}m");
    }

    #[test]
    fn stripping_is_idempotent() {
        let once = strip_controls("\x1b[1mx\x1b[0m y\u{2060}z").into_owned();
        let twice = strip_controls(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn untouched_input_borrows() {
        assert!(matches!(strip_controls("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn spacing_only() {
        assert!(is_spacing_only(""));
        assert!(is_spacing_only(" \t\n"));
        assert!(!is_spacing_only(" x "));
    }

    #[test]
    fn label_underscores_collapse() {
        assert_eq!(format_label("esp__rate"), "esp rate");
        assert_eq!(format_label("a_b c"), "a b c");
    }

    #[test]
    fn label_pct_becomes_percent_sign() {
        assert_eq!(format_label("pct"), "%");
        assert_eq!(format_label("growth_PCT"), "growth %");
        // Not standalone: left alone.
        assert_eq!(format_label("pctx"), "pctx");
    }
}
