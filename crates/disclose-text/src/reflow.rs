//! Greedy text reflow with hyphenation-aware break points.
//!
//! The tokenizer splits a paragraph into spaces, word-like runs, and dash
//! runs; break points fall after an interior hyphen joining two words,
//! after a soft hyphen, and around em-dash runs. Line packing is greedy
//! and measures tokens with [`visible_length`], so embedded SGR sequences
//! never distort the layout. Matching every feature of a full text-wrap
//! library is an explicit non-goal.

use crate::metrics::{is_breaking_space, visible_length, SOFT_HYPHEN};

/// A single reflow token: either one collapsed space or an unbreakable run.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Space,
    Word(String),
}

/// Checks whether the char counts as word-or-punctuation for the purpose
/// of dash-run breaks.
fn is_word_or_punct(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '!' | '"' | '\'' | '&' | '.' | ',' | '?' | '“' | '”' | '‘' | '’')
}

fn is_letter(c: char) -> bool {
    c.is_alphabetic()
}

/// Splits a paragraph into tokens.
///
/// Runs of breaking whitespace collapse into a single [`Token::Space`].
/// Word runs end before whitespace, after a hyphen flanked by two letters
/// on each side, after a soft hyphen (which stays on the token), and
/// before a run of two or more hyphens that follows a word character. A
/// dash run preceded by a word character forms its own token.
fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if is_breaking_space(chars[i]) {
            while i < chars.len() && is_breaking_space(chars[i]) {
                i += 1;
            }
            tokens.push(Token::Space);
            continue;
        }

        let start = i;
        while i < chars.len() {
            let c = chars[i];
            if is_breaking_space(c) {
                break;
            }
            if c == SOFT_HYPHEN {
                i += 1;
                break;
            }
            if c == '-' {
                let run = chars[i..].iter().take_while(|&&d| d == '-').count();
                let after_word = i > 0 && is_word_or_punct(chars[i - 1]);
                if run >= 2 && after_word {
                    if i > start {
                        // The word ends just before the dash run.
                        break;
                    }
                    // The dash run is a token of its own.
                    i += run;
                    break;
                }
                if run == 1 && hyphen_breaks(&chars, i) {
                    i += 1;
                    break;
                }
                // Dashes absorbed into the surrounding word.
                i += run;
                continue;
            }
            i += 1;
        }

        if i > start {
            tokens.push(Token::Word(chars[start..i].iter().collect()));
        }
    }

    tokens
}

/// A single hyphen is a break point when flanked by at least two letters
/// on each side, as in a hyphenated compound word.
fn hyphen_breaks(chars: &[char], i: usize) -> bool {
    i >= 2
        && is_letter(chars[i - 2])
        && is_letter(chars[i - 1])
        && i + 2 < chars.len()
        && is_letter(chars[i + 1])
        && is_letter(chars[i + 2])
}

/// Reflows text that may contain embedded SGR escape sequences to a given
/// maximum width.
///
/// The engine is stateless apart from its configured width; per-call width
/// overrides are plain parameters, so concurrent or nested use is safe.
///
/// # Example
///
/// ```rust
/// use disclose_text::Reflow;
///
/// let reflow = Reflow::new(5);
/// assert_eq!(reflow.wrap("ab ab ab", None), vec!["ab ab", "ab"]);
/// assert_eq!(reflow.wrap("short", Some(40)), vec!["short"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reflow {
    max_width: usize,
}

impl Reflow {
    /// Creates an engine with the given default maximum width.
    pub fn new(max_width: usize) -> Self {
        Reflow { max_width }
    }

    /// The configured default maximum width.
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Wraps the text, preserving paragraphs separated by a blank line.
    ///
    /// Each paragraph wraps independently; an empty string separates the
    /// output of consecutive paragraphs. Lines carry no terminator.
    pub fn wrap(&self, text: &str, max_width: Option<usize>) -> Vec<String> {
        let mut lines = Vec::new();
        for (index, paragraph) in text.split("\n\n").enumerate() {
            if index > 0 {
                lines.push(String::new());
            }
            lines.extend(self.wrap_paragraph(paragraph, max_width));
        }
        lines
    }

    /// Wraps a single paragraph to the override width or, if none is
    /// given, the configured width. Intra-paragraph whitespace runs
    /// normalize to a single space. Lines carry no terminator.
    pub fn wrap_paragraph(&self, text: &str, max_width: Option<usize>) -> Vec<String> {
        let max_width = max_width.unwrap_or(self.max_width);
        let mut lines = Vec::new();
        let mut line: Vec<String> = Vec::new();
        let mut width = 0usize;

        for token in tokenize(text) {
            let token = match token {
                Token::Space => {
                    // No leading spaces on a line.
                    if !line.is_empty() {
                        line.push(" ".to_string());
                        width += 1;
                    }
                    continue;
                }
                Token::Word(word) => word,
            };

            let token_width = visible_length(&token);
            let fits = width + token_width <= max_width;

            width = trim_trailing_space(&mut line, width, fits);
            width = resolve_trailing_hyphen(&mut line, width, fits);
            if !fits && !line.is_empty() {
                lines.push(line.concat());
            }

            if fits {
                line.push(token);
                width += token_width;
            } else {
                line.clear();
                line.push(token);
                width = token_width;
            }
        }

        // Flush the last line with the same trailing-token resolution.
        width = trim_trailing_space(&mut line, width, false);
        let _ = resolve_trailing_hyphen(&mut line, width, false);
        if !line.is_empty() {
            lines.push(line.concat());
        }

        lines
    }

    /// Fills the text to the engine's width, terminating it with a newline.
    pub fn fill(&self, text: &str, max_width: Option<usize>) -> String {
        let mut filled = self.wrap(text, max_width).join("\n");
        filled.push('\n');
        filled
    }
}

/// Drops a trailing space token when the next token no longer fits.
fn trim_trailing_space(line: &mut Vec<String>, width: usize, fits: bool) -> usize {
    if fits || line.last().map(String::as_str) != Some(" ") {
        return width;
    }
    line.pop();
    width - 1
}

/// Resolves a trailing soft hyphen: dropped when the line still has room,
/// rendered as a literal hyphen when the line is about to end.
fn resolve_trailing_hyphen(line: &mut [String], width: usize, fits: bool) -> usize {
    let Some(last) = line.last_mut() else {
        return width;
    };
    if !last.ends_with(SOFT_HYPHEN) {
        return width;
    }
    last.pop();
    if fits {
        width - 1
    } else {
        last.push('-');
        width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill5(text: &str) -> String {
        Reflow::new(5).fill(text, None)
    }

    #[test]
    fn short_and_oversized_words() {
        assert_eq!(fill5("abc"), "abc\n");
        assert_eq!(fill5("abcd"), "abcd\n");
        assert_eq!(fill5("abcde"), "abcde\n");
        // A single unsplittable token may exceed the width.
        assert_eq!(fill5("abcdef"), "abcdef\n");
    }

    #[test]
    fn spaces_versus_newlines() {
        assert_eq!(fill5("ab ab ab"), "ab ab\nab\n");
        assert_eq!(fill5("ab abc ab"), "ab\nabc\nab\n");
    }

    #[test]
    fn trailing_space_is_trimmed() {
        assert_eq!(fill5("a ab zz"), "a ab\nzz\n");
    }

    #[test]
    fn hyphenated_words_break_after_hyphen() {
        assert_eq!(fill5("abcd-efg"), "abcd-\nefg\n");
    }

    #[test]
    fn soft_hyphen_becomes_hard_on_break() {
        assert_eq!(fill5("abcd\u{ad}efg"), "abcd-\nefg\n");
    }

    #[test]
    fn soft_hyphen_vanishes_when_line_fits() {
        assert_eq!(fill5("ab\u{ad}cd"), "abcd\n");
    }

    #[test]
    fn dash_runs_break_after_word() {
        assert_eq!(fill5("ab--cd"), "ab--\ncd\n");
        assert_eq!(fill5("ab -- cd"), "ab --\ncd\n");
    }

    #[test]
    fn paragraphs_keep_blank_separator() {
        let reflow = Reflow::new(10);
        assert_eq!(
            reflow.wrap("one two\n\nthree", None),
            vec!["one two", "", "three"]
        );
    }

    #[test]
    fn exact_scenario_from_contract() {
        let reflow = Reflow::new(5);
        assert_eq!(reflow.wrap("aaaaa bbbbb", None), vec!["aaaaa", "bbbbb"]);
    }

    #[test]
    fn width_override_does_not_stick() {
        let reflow = Reflow::new(5);
        assert_eq!(reflow.wrap("ab ab ab", Some(2)), vec!["ab", "ab", "ab"]);
        // The configured width is untouched by the override.
        assert_eq!(reflow.wrap("ab ab ab", None), vec!["ab ab", "ab"]);
    }

    #[test]
    fn escape_sequences_do_not_count() {
        let reflow = Reflow::new(5);
        let lines = reflow.wrap("\x1b[1mab\x1b[0m ab", None);
        assert_eq!(lines, vec!["\x1b[1mab\x1b[0m ab"]);
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(fill5("ab   ab"), "ab ab\n");
        assert_eq!(fill5("ab \t ab"), "ab ab\n");
    }

    mod tokenizer {
        use super::*;

        fn words(text: &str) -> Vec<String> {
            tokenize(text)
                .into_iter()
                .map(|t| match t {
                    Token::Space => " ".to_string(),
                    Token::Word(w) => w,
                })
                .collect()
        }

        #[test]
        fn plain_words_and_spaces() {
            assert_eq!(words("ab cd"), vec!["ab", " ", "cd"]);
        }

        #[test]
        fn hyphen_splits_compounds_only() {
            assert_eq!(words("abcd-efg"), vec!["abcd-", "efg"]);
            // One-letter flank: no break point.
            assert_eq!(words("a-bc"), vec!["a-bc"]);
            assert_eq!(words("12-34"), vec!["12-34"]);
        }

        #[test]
        fn soft_hyphen_ends_token() {
            assert_eq!(words("ab\u{ad}cd"), vec!["ab\u{ad}", "cd"]);
        }

        #[test]
        fn dash_run_after_word_stands_alone() {
            assert_eq!(words("ab--cd"), vec!["ab", "--", "cd"]);
            // After a space the dashes belong to the following word.
            assert_eq!(words("ab --cd"), vec!["ab", " ", "--cd"]);
        }
    }
}
