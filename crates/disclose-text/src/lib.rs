//! ANSI-aware text measurement and reflow.
//!
//! This crate provides the low-level text plumbing shared by the terminal
//! renderers: computing the *visible* width of strings that may contain
//! embedded SGR escape sequences, and reflowing prose to a maximum width
//! while honoring hyphenation points and soft hyphens.
//!
//! # Example
//!
//! ```rust
//! use disclose_text::{visible_length, Reflow};
//!
//! // Escape sequences don't count toward visible width.
//! assert_eq!(visible_length("\x1b[1mbold\x1b[0m"), 4);
//!
//! let reflow = Reflow::new(5);
//! assert_eq!(reflow.wrap("aaaaa bbbbb", None), vec!["aaaaa", "bbbbb"]);
//! ```

mod metrics;
mod reflow;

pub use metrics::{format_label, is_spacing_only, strip_controls, visible_length};
pub use reflow::Reflow;
