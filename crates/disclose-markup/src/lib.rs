//! A deliberately small markup language for report prose.
//!
//! The vocabulary covers nine HTML tags: `p`, `h1`, `h2`, `hr`, `ol`,
//! `ul`, `li`, `em`, and `strong` — enough for the explanatory text of a
//! data report, and nothing more. [`parse`] turns markup source into a
//! tree of [`Block`] values, tolerating the two idiomatic shortcuts of
//! hand-written HTML (implicitly closed `<p>` and `<li>`) while rejecting
//! attributes, comments, and unknown tags outright.
//!
//! Rendering goes through the [`MarkupRenderer`] trait: [`HtmlRenderer`]
//! produces HTML source again, [`TerminalRenderer`] produces reflowed,
//! optionally SGR-styled lines for the terminal.
//!
//! # Example
//!
//! ```rust
//! use disclose_markup::{parse, render_lines, TerminalRenderer};
//!
//! let blocks = parse("<p>All <strong>fine</strong></p>").unwrap();
//! let lines = render_lines(&blocks, &TerminalRenderer::new(40, false));
//! assert_eq!(lines, vec!["All fine", ""]);
//! ```

mod ast;
mod parser;
mod render;

pub use ast::{Block, HeadingLevel, Inline, ListItem, Tag, Traits};
pub use parser::{parse, ParseError};
pub use render::{
    render_lines, render_to_string, BlockOutput, HtmlRenderer, MarkupRenderer,
    TerminalRenderer,
};
