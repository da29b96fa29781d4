//! Typed data tables and their presentation.
//!
//! A [`Table`] holds index levels and data columns of typed, optional
//! cells. Three formatters turn it into output: [`TextTableFormatter`]
//! produces fixed-width text for terminals (optionally with SGR styling,
//! row shading, and column highlights) and LaTeX `tabular` sources, and
//! [`HtmlTableFormatter`] produces `<table>` strings.
//!
//! Tables comparing self-reported CSAM report counts against NCMEC's
//! figures get their period-over-period outliers highlighted
//! automatically; see [`Severity`].
//!
//! # Example
//!
//! ```rust
//! use disclose_table::{Column, ColumnData, Table, TextTableFormatter};
//!
//! let table = Table::new(
//!     Vec::new(),
//!     vec![Column::new("reports", ColumnData::Int(vec![Some(870), Some(1_320)]))],
//! )
//! .unwrap();
//! let (text, width) = TextTableFormatter::new().format_text(&table).unwrap();
//! assert_eq!(width, 7);
//! assert_eq!(text, "Reports\n    870\n  1,320");
//! ```

mod data;
mod html;
mod outlier;
mod text;

pub use data::{
    format_nulls, Align, Column, ColumnData, Period, Table, TableError, Vertical, VerticalKind,
};
pub use html::{Caption, HtmlTableFormatter};
pub use outlier::{maybe_has_outliers, Severity};
pub use text::TextTableFormatter;
