//! The markup vocabulary: tags, their structural traits, and the AST.
//!
//! The tag set is closed. Block tags (`h1`, `h2`, `hr`, `ol`, `ul`, `p`)
//! occupy full lines of their own; inline tags (`em`, `strong`) modify
//! spans of text inside a block; `li` only ever appears inside a list.
//! Every tag carries a fixed [`Traits`] bitset that drives both parsing
//! legality and rendering.

use std::fmt;

/// The traits of markup elements, combined into per-tag bitsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traits(u8);

impl Traits {
    /// The element contains inline children.
    pub const HAS_INLINE: Traits = Traits(1 << 0);
    /// The element contains list items.
    pub const HAS_LIST_ITEM: Traits = Traits(1 << 1);
    /// The element contains text.
    pub const HAS_TEXT: Traits = Traits(1 << 2);
    /// The element is block content.
    pub const IS_BLOCK: Traits = Traits(1 << 3);
    /// The element is inline content.
    pub const IS_INLINE: Traits = Traits(1 << 4);
    /// The element is void: it has no children and no end tag.
    pub const IS_VOID: Traits = Traits(1 << 5);

    /// Checks whether every trait in `other` is present in `self`.
    pub const fn contains(self, other: Traits) -> bool {
        self.0 & other.0 == other.0
    }

    /// Combines two trait sets.
    pub const fn union(self, other: Traits) -> Traits {
        Traits(self.0 | other.0)
    }
}

impl std::ops::BitOr for Traits {
    type Output = Traits;

    fn bitor(self, other: Traits) -> Traits {
        self.union(other)
    }
}

/// The closed set of supported tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Tag {
    Em,
    H1,
    H2,
    Hr,
    Li,
    Ol,
    P,
    Strong,
    Ul,
}

impl Tag {
    /// Resolves a tag name as it appears in markup source.
    pub fn from_name(name: &str) -> Option<Tag> {
        match name {
            "em" => Some(Tag::Em),
            "h1" => Some(Tag::H1),
            "h2" => Some(Tag::H2),
            "hr" => Some(Tag::Hr),
            "li" => Some(Tag::Li),
            "ol" => Some(Tag::Ol),
            "p" => Some(Tag::P),
            "strong" => Some(Tag::Strong),
            "ul" => Some(Tag::Ul),
            _ => None,
        }
    }

    /// The tag's name as it appears in markup source.
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Em => "em",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::Hr => "hr",
            Tag::Li => "li",
            Tag::Ol => "ol",
            Tag::P => "p",
            Tag::Strong => "strong",
            Tag::Ul => "ul",
        }
    }

    /// The tag's fixed trait set.
    pub const fn traits(self) -> Traits {
        match self {
            Tag::Em | Tag::Strong => Traits::HAS_TEXT.union(Traits::IS_INLINE),
            Tag::H1 | Tag::H2 => Traits::HAS_TEXT.union(Traits::IS_BLOCK),
            Tag::Hr => Traits::IS_BLOCK.union(Traits::IS_VOID),
            Tag::Li => Traits::HAS_INLINE.union(Traits::HAS_TEXT),
            Tag::Ol | Tag::Ul => Traits::HAS_LIST_ITEM.union(Traits::IS_BLOCK),
            Tag::P => Traits::HAS_INLINE
                .union(Traits::HAS_TEXT)
                .union(Traits::IS_BLOCK),
        }
    }

    /// Whether elements with this tag contain inline elements.
    pub const fn has_inline(self) -> bool {
        self.traits().contains(Traits::HAS_INLINE)
    }

    /// Whether elements with this tag contain list items.
    pub const fn has_list_item(self) -> bool {
        self.traits().contains(Traits::HAS_LIST_ITEM)
    }

    /// Whether elements with this tag contain text.
    pub const fn has_text(self) -> bool {
        self.traits().contains(Traits::HAS_TEXT)
    }

    /// Whether elements with this tag are blocks.
    pub const fn is_block(self) -> bool {
        self.traits().contains(Traits::IS_BLOCK)
    }

    /// Whether elements with this tag are inline.
    pub const fn is_inline(self) -> bool {
        self.traits().contains(Traits::IS_INLINE)
    }

    /// Whether elements with this tag are void.
    pub const fn is_void(self) -> bool {
        self.traits().contains(Traits::IS_VOID)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A heading level. Only two levels exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    /// Top-level heading, `<h1>`.
    H1,
    /// Second-level heading, `<h2>`.
    H2,
}

impl HeadingLevel {
    /// The tag for this level.
    pub const fn tag(self) -> Tag {
        match self {
            HeadingLevel::H1 => Tag::H1,
            HeadingLevel::H2 => Tag::H2,
        }
    }

    /// The char used for the full-width rule above terminal headings.
    pub const fn rule_char(self) -> char {
        match self {
            HeadingLevel::H1 => '━',
            HeadingLevel::H2 => '─',
        }
    }
}

/// Inline content: a span of text, possibly emphasized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text.
    Text(String),
    /// Emphasized text, `<em>`.
    Emphasis(String),
    /// Strongly emphasized text, `<strong>`.
    Strong(String),
}

impl Inline {
    /// Creates plain text.
    pub fn text(text: impl Into<String>) -> Inline {
        Inline::Text(text.into())
    }

    /// Creates `<em>` content.
    pub fn em(text: impl Into<String>) -> Inline {
        Inline::Emphasis(text.into())
    }

    /// Creates `<strong>` content.
    pub fn strong(text: impl Into<String>) -> Inline {
        Inline::Strong(text.into())
    }
}

/// A list item: a sequence of inline fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// The item's inline fragments, in source order.
    pub fragments: Vec<Inline>,
}

impl ListItem {
    /// Creates an item from its fragments.
    pub fn new(fragments: Vec<Inline>) -> ListItem {
        ListItem { fragments }
    }

    /// Creates an item holding a single text fragment.
    pub fn text(text: impl Into<String>) -> ListItem {
        ListItem {
            fragments: vec![Inline::Text(text.into())],
        }
    }
}

/// Block content: markup that occupies one or more full lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A heading with its level and title text.
    Heading {
        /// The heading level.
        level: HeadingLevel,
        /// The title text.
        text: String,
    },
    /// A paragraph of inline fragments.
    Paragraph {
        /// The paragraph's inline fragments, in source order.
        fragments: Vec<Inline>,
    },
    /// An ordered or unordered list.
    List {
        /// True for `<ol>`, false for `<ul>`.
        ordered: bool,
        /// The list's items, in source order.
        items: Vec<ListItem>,
    },
    /// A horizontal rule, `<hr>`.
    Rule,
}

impl Block {
    /// Creates an `<h1>` heading.
    pub fn h1(text: impl Into<String>) -> Block {
        Block::Heading {
            level: HeadingLevel::H1,
            text: text.into(),
        }
    }

    /// Creates an `<h2>` heading.
    pub fn h2(text: impl Into<String>) -> Block {
        Block::Heading {
            level: HeadingLevel::H2,
            text: text.into(),
        }
    }

    /// Creates a paragraph from its fragments.
    pub fn p(fragments: Vec<Inline>) -> Block {
        Block::Paragraph { fragments }
    }

    /// Creates a paragraph holding a single text fragment.
    pub fn text(text: impl Into<String>) -> Block {
        Block::Paragraph {
            fragments: vec![Inline::Text(text.into())],
        }
    }

    /// Creates an ordered list.
    pub fn ol(items: Vec<ListItem>) -> Block {
        Block::List {
            ordered: true,
            items,
        }
    }

    /// Creates an unordered list.
    pub fn ul(items: Vec<ListItem>) -> Block {
        Block::List {
            ordered: false,
            items,
        }
    }

    /// The block's tag.
    pub const fn tag(&self) -> Tag {
        match self {
            Block::Heading {
                level: HeadingLevel::H1,
                ..
            } => Tag::H1,
            Block::Heading {
                level: HeadingLevel::H2,
                ..
            } => Tag::H2,
            Block::Paragraph { .. } => Tag::P,
            Block::List { ordered: true, .. } => Tag::Ol,
            Block::List { ordered: false, .. } => Tag::Ul,
            Block::Rule => Tag::Hr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_fixed_per_tag() {
        assert!(Tag::P.is_block());
        assert!(Tag::P.has_inline());
        assert!(Tag::P.has_text());
        assert!(!Tag::P.is_void());

        assert!(Tag::Em.is_inline());
        assert!(!Tag::Em.is_block());
        assert!(Tag::Em.has_text());
        assert!(!Tag::Em.has_inline());

        assert!(Tag::Hr.is_void());
        assert!(Tag::Hr.is_block());

        assert!(Tag::Ol.has_list_item());
        assert!(!Tag::Ol.has_text());

        assert!(Tag::Li.has_inline());
        assert!(Tag::Li.has_text());
        assert!(!Tag::Li.is_block());
        assert!(!Tag::Li.is_inline());
    }

    #[test]
    fn tag_names_round_trip() {
        for tag in [
            Tag::Em,
            Tag::H1,
            Tag::H2,
            Tag::Hr,
            Tag::Li,
            Tag::Ol,
            Tag::P,
            Tag::Strong,
            Tag::Ul,
        ] {
            assert_eq!(Tag::from_name(tag.name()), Some(tag));
        }
        assert_eq!(Tag::from_name("div"), None);
    }

    #[test]
    fn block_tags_match_construction() {
        assert_eq!(Block::h1("t").tag(), Tag::H1);
        assert_eq!(Block::h2("t").tag(), Tag::H2);
        assert_eq!(Block::text("t").tag(), Tag::P);
        assert_eq!(Block::ol(vec![]).tag(), Tag::Ol);
        assert_eq!(Block::ul(vec![]).tag(), Tag::Ul);
        assert_eq!(Block::Rule.tag(), Tag::Hr);
    }
}
