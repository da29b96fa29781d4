//! The markup parser: a streaming tag scanner plus a pending-element stack.
//!
//! The grammar is deliberately constrained: the nine tags of [`Tag`], no
//! attributes, no comments, no doctypes, no processing instructions. Two
//! HTML conveniences are honored, matching how report prose is written:
//! a `<p>` closes implicitly when a block tag opens inside it, and a
//! `<li>` closes implicitly before a sibling `<li>` or its list's end tag.
//! Everything else that deviates from the grammar fails the parse.

use disclose_text::is_spacing_only;
use thiserror::Error;

use crate::ast::{Block, Inline, ListItem, Tag};

/// The ways a parse can fail. Parsing never recovers silently; every error
/// names the offending construct.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A tag name outside the supported vocabulary.
    #[error("<{0}> is not a valid tag")]
    UnknownTag(String),
    /// A start tag carrying attributes.
    #[error("markup does not support attributes such as those in {0:?}")]
    Attributes(String),
    /// An HTML comment.
    #[error("markup does not support HTML comments such as <!--{0}-->")]
    Comment(String),
    /// A doctype or other `<!...>` declaration.
    #[error("markup does not support declarations such as <!{0}>")]
    Declaration(String),
    /// A `<?...>` processing instruction.
    #[error("markup does not support processing instructions such as <?{0}>")]
    ProcessingInstruction(String),
    /// A tag that never opened (`<` without a closing `>`).
    #[error("markup ends inside the tag {0:?}")]
    UnterminatedTag(String),
    /// Non-whitespace text in a container that does not accept text.
    #[error("text other than spacing {0:?} outside <li> or <p>")]
    StrayText(String),
    /// A tag that is not allowed inside the currently open element.
    #[error("<{tag}> may not appear inside <{parent}>")]
    MisplacedTag {
        /// The tag being opened.
        tag: Tag,
        /// The element it would land in.
        parent: Tag,
    },
    /// A tag that cannot stand on its own at the top level.
    #[error("<{0}> cannot be the outermost element")]
    Outermost(Tag),
    /// An end tag that does not match the most recently opened element.
    #[error("got </{found}> where </{expected}> expected")]
    MismatchedEnd {
        /// The end tag encountered.
        found: Tag,
        /// The element that is actually open.
        expected: Tag,
    },
    /// An end tag with no matching open element.
    #[error("got </{0}> when no tag has been opened")]
    OrphanEnd(Tag),
    /// One or more elements left open at end of input.
    #[error("markup is missing {0} closing tag(s)")]
    Unclosed(usize),
}

/// Parses markup into a sequence of blocks.
///
/// # Example
///
/// ```rust
/// use disclose_markup::{parse, Block, Inline};
///
/// let blocks = parse("<p>Hello <strong>World</strong></p>").unwrap();
/// assert_eq!(
///     blocks,
///     vec![Block::p(vec![
///         Inline::text("Hello "),
///         Inline::strong("World"),
///     ])]
/// );
/// ```
pub fn parse(text: &str) -> Result<Vec<Block>, ParseError> {
    let mut parser = Parser::new();
    for event in Scanner::new(text.trim()) {
        match event? {
            Event::Start(tag) => parser.handle_start(tag)?,
            Event::End(tag) => parser.handle_end(tag)?,
            Event::Text(data) => parser.handle_text(&data)?,
        }
    }
    parser.finish()
}

// ======================================================================
// Scanning

/// A parse-relevant event produced by the scanner. Constructs the grammar
/// rejects outright (comments, declarations, attributes) surface as errors
/// from the scanner itself.
#[derive(Debug)]
enum Event {
    Start(Tag),
    End(Tag),
    Text(String),
}

/// A streaming scanner over markup source.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    /// The end event queued behind a self-closing start tag.
    queued: Option<Event>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner {
            input,
            pos: 0,
            queued: None,
        }
    }

    fn scan_tag(&mut self, rest: &'a str) -> Result<Event, ParseError> {
        // rest starts at '<'.
        let body = &rest[1..];

        if let Some(comment) = body.strip_prefix("!--") {
            let content = match comment.find("-->") {
                Some(end) => {
                    self.pos += 1 + 3 + end + 3;
                    &comment[..end]
                }
                None => {
                    self.pos = self.input.len();
                    comment
                }
            };
            return Err(ParseError::Comment(content.to_string()));
        }

        if body.starts_with('!') || body.starts_with('?') {
            let is_decl = body.starts_with('!');
            let content = match body.find('>') {
                Some(end) => {
                    self.pos += 1 + end + 1;
                    &body[1..end]
                }
                None => {
                    self.pos = self.input.len();
                    &body[1..]
                }
            };
            return Err(if is_decl {
                ParseError::Declaration(content.to_string())
            } else {
                ParseError::ProcessingInstruction(content.to_string())
            });
        }

        let Some(end) = body.find('>') else {
            self.pos = self.input.len();
            return Err(ParseError::UnterminatedTag(rest.to_string()));
        };
        let inside = &body[..end];
        self.pos += 1 + end + 1;

        if let Some(name) = inside.strip_prefix('/') {
            let name = name.trim();
            let tag = Tag::from_name(name)
                .ok_or_else(|| ParseError::UnknownTag(name.to_string()))?;
            return Ok(Event::End(tag));
        }

        // XHTML-style `<tag/>` counts as a start tag followed at once by
        // its end tag, so a self-closed void element still trips the
        // orphan-end check.
        let (body, self_closing) = match inside.strip_suffix('/') {
            Some(stripped) => (stripped, true),
            None => (inside, false),
        };

        let name_len = body
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(body.len());
        let (name, attrs) = body.split_at(name_len);
        if !attrs.trim().is_empty() {
            return Err(ParseError::Attributes(format!("<{inside}>")));
        }
        let tag =
            Tag::from_name(name).ok_or_else(|| ParseError::UnknownTag(name.to_string()))?;
        if self_closing {
            self.queued = Some(Event::End(tag));
        }
        Ok(Event::Start(tag))
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Event, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.queued.take() {
            return Some(Ok(event));
        }
        if self.pos >= self.input.len() {
            return None;
        }
        let rest = &self.input[self.pos..];

        match rest.find('<') {
            Some(0) => {
                // A '<' that cannot open a tag is literal text.
                let opens_tag = rest[1..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
                if opens_tag {
                    Some(self.scan_tag(rest))
                } else {
                    self.pos += 1;
                    Some(Ok(Event::Text("<".to_string())))
                }
            }
            Some(lt) => {
                self.pos += lt;
                Some(Ok(Event::Text(decode_entities(&rest[..lt]))))
            }
            None => {
                self.pos = self.input.len();
                Some(Ok(Event::Text(decode_entities(rest))))
            }
        }
    }
}

/// Decodes the predefined entities and numeric character references.
/// Unrecognized references stay literal.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail[1..].find(';') {
            Some(semi) => {
                let name = &tail[1..semi + 1];
                match decode_entity(name) {
                    Some(c) => {
                        out.push(c);
                        rest = &tail[semi + 2..];
                    }
                    None => {
                        out.push('&');
                        rest = &tail[1..];
                    }
                }
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => return Some('&'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "quot" => return Some('"'),
        "apos" => return Some('\''),
        _ => {}
    }
    let digits = name.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse().ok()?
    };
    char::from_u32(code)
}

// ======================================================================
// Building the tree

/// A child accumulated under a pending element.
#[derive(Debug)]
enum Child {
    Text(String),
    Inline(Inline),
    Item(ListItem),
    Block(Block),
}

/// An element currently being parsed. A `tag` of `None` marks the
/// synthetic document root.
#[derive(Debug)]
struct Pending {
    tag: Option<Tag>,
    children: Vec<Child>,
}

impl Pending {
    fn new(tag: Option<Tag>) -> Self {
        Pending {
            tag,
            children: Vec::new(),
        }
    }

    fn add_text(&mut self, data: &str) {
        if let Some(Child::Text(last)) = self.children.last_mut() {
            last.push_str(data);
        } else {
            self.children.push(Child::Text(data.to_string()));
        }
    }

    /// The element's children as a single text run.
    fn text(self) -> String {
        let mut text = String::new();
        for child in self.children {
            if let Child::Text(t) = child {
                text.push_str(&t);
            }
        }
        text
    }

    /// The element's children as inline fragments.
    fn fragments(self) -> Vec<Inline> {
        self.children
            .into_iter()
            .filter_map(|child| match child {
                Child::Text(t) => Some(Inline::Text(t)),
                Child::Inline(inline) => Some(inline),
                _ => None,
            })
            .collect()
    }

    /// The element's children as list items.
    fn items(self) -> Vec<ListItem> {
        self.children
            .into_iter()
            .filter_map(|child| match child {
                Child::Item(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    /// Builds the finished node for this element. The legality checks in
    /// the parser guarantee the children match the tag's traits.
    fn instantiate(self) -> Child {
        match self.tag {
            Some(Tag::Em) => Child::Inline(Inline::Emphasis(self.text())),
            Some(Tag::Strong) => Child::Inline(Inline::Strong(self.text())),
            Some(Tag::H1) => Child::Block(Block::h1(self.text())),
            Some(Tag::H2) => Child::Block(Block::h2(self.text())),
            Some(Tag::Hr) => Child::Block(Block::Rule),
            Some(Tag::Li) => Child::Item(ListItem::new(self.fragments())),
            Some(Tag::P) | None => Child::Block(Block::p(self.fragments())),
            Some(Tag::Ol) => Child::Block(Block::ol(self.items())),
            Some(Tag::Ul) => Child::Block(Block::ul(self.items())),
        }
    }
}

/// The stack of open elements.
struct Parser {
    pending: Vec<Pending>,
}

impl Parser {
    fn new() -> Self {
        Parser {
            pending: Vec::new(),
        }
    }

    fn top_tag(&self) -> Option<Tag> {
        self.pending.last().and_then(|p| p.tag)
    }

    /// Closes the most recently opened element, attaching it to its
    /// parent. Closing the outermost element re-roots its result under a
    /// fresh synthetic root so parsing can continue with siblings.
    fn stop_pending(&mut self) {
        let Some(pending) = self.pending.pop() else {
            return;
        };
        let node = pending.instantiate();
        if self.pending.is_empty() {
            self.pending.push(Pending::new(None));
        }
        if let Some(parent) = self.pending.last_mut() {
            parent.children.push(node);
        }
    }

    fn handle_start(&mut self, tag: Tag) -> Result<(), ParseError> {
        // Open the outermost element on demand.
        if self.pending.is_empty() {
            if tag.is_inline() {
                self.pending.push(Pending::new(Some(Tag::P)));
            } else if tag.is_block() {
                self.pending.push(Pending::new(None));
            } else {
                return Err(ParseError::Outermost(tag));
            }
        }

        // Handle implicitly closed <p> and <li>.
        match self.top_tag() {
            Some(Tag::P) if tag.is_block() => self.stop_pending(),
            Some(Tag::Li) if tag == Tag::Li => self.stop_pending(),
            _ => {}
        }

        // If the currently open element allows this tag, open it.
        let top = self.top_tag();
        let allowed = match top {
            None => tag.is_block(),
            Some(parent) => {
                (parent.has_inline() && tag.is_inline())
                    || (parent.has_list_item() && tag == Tag::Li)
            }
        };
        if allowed {
            self.pending.push(Pending::new(Some(tag)));
            if tag.is_void() {
                self.stop_pending();
            }
            return Ok(());
        }

        match top {
            None => Err(ParseError::Outermost(tag)),
            Some(parent) => Err(ParseError::MisplacedTag { tag, parent }),
        }
    }

    fn handle_end(&mut self, tag: Tag) -> Result<(), ParseError> {
        if self.pending.len() < 2 {
            return Err(ParseError::OrphanEnd(tag));
        }

        // Handle an implicitly closed <li>.
        if self.top_tag() == Some(Tag::Li) && tag.has_list_item() {
            self.stop_pending();
            if self.pending.len() < 2 {
                return Err(ParseError::OrphanEnd(tag));
            }
        }

        match self.top_tag() {
            Some(open) if open == tag => {
                self.stop_pending();
                Ok(())
            }
            Some(open) => Err(ParseError::MismatchedEnd {
                found: tag,
                expected: open,
            }),
            None => Err(ParseError::OrphanEnd(tag)),
        }
    }

    fn handle_text(&mut self, data: &str) -> Result<(), ParseError> {
        if self.pending.is_empty() {
            self.pending.push(Pending::new(Some(Tag::P)));
        }

        if self.top_tag().is_some_and(Tag::has_text) {
            if let Some(top) = self.pending.last_mut() {
                top.add_text(data);
            }
            return Ok(());
        }

        // Spacing between elements is tolerated and dropped.
        if is_spacing_only(data) {
            Ok(())
        } else {
            Err(ParseError::StrayText(data.trim().to_string()))
        }
    }

    fn finish(mut self) -> Result<Vec<Block>, ParseError> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }
        if self.pending.len() != 1 {
            return Err(ParseError::Unclosed(self.pending.len() - 1));
        }

        let root = self.pending.pop().unwrap_or_else(|| Pending::new(None));
        match root.tag {
            None => Ok(root
                .children
                .into_iter()
                .filter_map(|child| match child {
                    Child::Block(block) => Some(block),
                    _ => None,
                })
                .collect()),
            Some(_) => match root.instantiate() {
                Child::Block(block) => Ok(vec![block]),
                // The only tagged root is the implicit paragraph, which
                // always instantiates to a block.
                _ => Ok(Vec::new()),
            },
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn plain_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 .,!?]{1,40}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn paragraph_round_trips(text in plain_text()) {
            let source = format!("<p>{}</p>", text);
            let blocks = parse(&source).unwrap();
            // Leading/trailing spacing is part of the paragraph text.
            prop_assert_eq!(blocks, vec![Block::text(text)]);
        }

        #[test]
        fn lists_accumulate_items(items in prop::collection::vec("[a-z]{1,10}", 1..8)) {
            let mut source = "<ol>".to_string();
            for item in &items {
                source.push_str("<li>");
                source.push_str(item);
            }
            source.push_str("</ol>");
            let blocks = parse(&source).unwrap();
            let expected = Block::ol(items.iter().map(|item| ListItem::text(item.as_str())).collect());
            prop_assert_eq!(blocks, vec![expected]);
        }

        #[test]
        fn strong_and_em_alternate(a in "[a-z]{1,10}", b in "[a-z]{1,10}") {
            let source = format!("<p><strong>{a}</strong> and <em>{b}</em></p>");
            let blocks = parse(&source).unwrap();
            prop_assert_eq!(
                blocks,
                vec![Block::p(vec![
                    Inline::strong(a),
                    Inline::text(" and "),
                    Inline::em(b),
                ])]
            );
        }
    }
}
