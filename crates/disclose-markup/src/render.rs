//! Rendering parsed markup to HTML source or terminal lines.
//!
//! Renderers implement [`MarkupRenderer`] and declare their output shape
//! through the associated `Output` type: HTML renders to one `String` per
//! block, the terminal renders to a `Vec` of lines without terminators.
//! Dispatch happens by matching on the node in [`Block::render_with`].

use console::Style;
use disclose_text::Reflow;

use crate::ast::{Block, HeadingLevel, Inline, ListItem};

/// The protocol shared by all markup renderers.
pub trait MarkupRenderer {
    /// The rendered form of one block.
    type Output;

    /// Renders a heading.
    fn render_heading(&self, level: HeadingLevel, text: &str) -> Self::Output;
    /// Renders a complete list.
    fn render_list(&self, ordered: bool, items: &[ListItem]) -> Self::Output;
    /// Renders one list item, without its marker.
    fn render_list_item(&self, item: &ListItem) -> Self::Output;
    /// Renders a paragraph.
    fn render_paragraph(&self, fragments: &[Inline]) -> Self::Output;
    /// Renders a horizontal rule.
    fn render_rule(&self) -> Self::Output;
    /// Renders strongly emphasized text to inline form.
    fn render_strong(&self, text: &str) -> String;
    /// Renders emphasized text to inline form.
    fn render_emphasis(&self, text: &str) -> String;

    /// Reduces a sequence of inline fragments to a single string.
    fn reduce(&self, fragments: &[Inline]) -> String {
        fragments
            .iter()
            .map(|fragment| match fragment {
                Inline::Text(text) => text.clone(),
                Inline::Emphasis(text) => self.render_emphasis(text),
                Inline::Strong(text) => self.render_strong(text),
            })
            .collect()
    }
}

impl Block {
    /// Renders this block with the given renderer.
    pub fn render_with<R: MarkupRenderer + ?Sized>(&self, renderer: &R) -> R::Output {
        match self {
            Block::Heading { level, text } => renderer.render_heading(*level, text),
            Block::Paragraph { fragments } => renderer.render_paragraph(fragments),
            Block::List { ordered, items } => renderer.render_list(*ordered, items),
            Block::Rule => renderer.render_rule(),
        }
    }
}

/// The two output shapes renderers produce, unified for document assembly.
pub trait BlockOutput {
    /// Appends this block's lines to the document.
    fn append_to(self, lines: &mut Vec<String>);
}

impl BlockOutput for String {
    fn append_to(self, lines: &mut Vec<String>) {
        lines.push(self);
    }
}

impl BlockOutput for Vec<String> {
    fn append_to(self, lines: &mut Vec<String>) {
        lines.extend(self);
    }
}

/// Renders blocks to a flat sequence of lines without terminators.
pub fn render_lines<R>(blocks: &[Block], renderer: &R) -> Vec<String>
where
    R: MarkupRenderer,
    R::Output: BlockOutput,
{
    let mut lines = Vec::new();
    for block in blocks {
        block.render_with(renderer).append_to(&mut lines);
    }
    lines
}

/// Renders blocks to a single newline-terminated string.
pub fn render_to_string<R>(blocks: &[Block], renderer: &R) -> String
where
    R: MarkupRenderer,
    R::Output: BlockOutput,
{
    let lines = render_lines(blocks, renderer);
    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

// ======================================================================

/// Renders markup back to HTML source, one string per block.
///
/// Text passes through verbatim. Escaping the characters `<`, `>`, and `&`
/// is the caller's responsibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl MarkupRenderer for HtmlRenderer {
    type Output = String;

    fn render_heading(&self, level: HeadingLevel, text: &str) -> String {
        let tag = level.tag();
        format!("<{tag}>{text}</{tag}>")
    }

    fn render_list(&self, ordered: bool, items: &[ListItem]) -> String {
        let tag = if ordered { "ol" } else { "ul" };
        let items: String = items.iter().map(|item| self.render_list_item(item)).collect();
        format!("<{tag}>{items}</{tag}>")
    }

    fn render_list_item(&self, item: &ListItem) -> String {
        format!("<li>{}</li>", self.reduce(&item.fragments))
    }

    fn render_paragraph(&self, fragments: &[Inline]) -> String {
        format!(
            "<p style=\"max-width: 70ch;\">{}</p>",
            self.reduce(fragments)
        )
    }

    fn render_rule(&self) -> String {
        "<hr>".to_string()
    }

    fn render_strong(&self, text: &str) -> String {
        format!("<strong>{text}</strong>")
    }

    fn render_emphasis(&self, text: &str) -> String {
        format!("<em>{text}</em>")
    }
}

// ======================================================================

/// Renders markup to terminal lines, one `Vec<String>` per block.
///
/// Paragraph and list-item text reflows to the configured line width,
/// capped at [`TerminalRenderer::MAX_LINE_WIDTH`] columns; rules and
/// heading underlines span the full line width. Strong emphasis renders
/// as SGR bold unless `use_sgr` is off, emphasis as `*text*`.
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    line_width: usize,
    use_sgr: bool,
    reflow: Reflow,
}

impl TerminalRenderer {
    /// The absolute cap on reflowed text width. Longer lines get hard to
    /// read even on wider terminals.
    pub const MAX_LINE_WIDTH: usize = 70;

    /// Creates a renderer for the given line width.
    pub fn new(line_width: usize, use_sgr: bool) -> Self {
        TerminalRenderer {
            line_width,
            use_sgr,
            reflow: Reflow::new(Self::MAX_LINE_WIDTH),
        }
    }

    /// The configured line width.
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    /// A copy of this renderer with a different line width.
    pub fn with_line_width(&self, line_width: usize) -> Self {
        TerminalRenderer {
            line_width,
            ..self.clone()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.use_sgr {
            Style::new()
                .bold()
                .force_styling(true)
                .apply_to(text)
                .to_string()
        } else {
            text.to_string()
        }
    }
}

impl MarkupRenderer for TerminalRenderer {
    type Output = Vec<String>;

    fn render_heading(&self, level: HeadingLevel, text: &str) -> Vec<String> {
        vec![
            level.rule_char().to_string().repeat(self.line_width),
            self.bold(text),
            String::new(),
        ]
    }

    fn render_list(&self, ordered: bool, items: &[ListItem]) -> Vec<String> {
        let mut lines = Vec::new();
        for (item_index, item) in items.iter().enumerate() {
            for (line_index, line) in self.render_list_item(item).into_iter().enumerate() {
                let prefix = if line_index > 0 {
                    "    ".to_string()
                } else if ordered {
                    // Two-digit ordinal field, so items 1-99 share the
                    // four-column prefix of the continuation indent.
                    format!("{:2}. ", item_index + 1)
                } else {
                    "  • ".to_string()
                };
                lines.push(prefix + &line);
            }
        }
        lines.push(String::new());
        lines
    }

    fn render_list_item(&self, item: &ListItem) -> Vec<String> {
        let width = self
            .line_width
            .min(Self::MAX_LINE_WIDTH)
            .saturating_sub(4);
        self.reflow
            .wrap(&self.reduce(&item.fragments), Some(width))
    }

    fn render_paragraph(&self, fragments: &[Inline]) -> Vec<String> {
        let width = self.line_width.min(Self::MAX_LINE_WIDTH);
        let mut lines = self.reflow.wrap(&self.reduce(fragments), Some(width));
        lines.push(String::new());
        lines
    }

    fn render_rule(&self) -> Vec<String> {
        vec!["─".repeat(self.line_width)]
    }

    fn render_strong(&self, text: &str) -> String {
        self.bold(text)
    }

    fn render_emphasis(&self, text: &str) -> String {
        format!("*{text}*")
    }
}
