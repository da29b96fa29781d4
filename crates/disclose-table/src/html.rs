//! HTML table formatting.
//!
//! The output is a plain `<table>` string: tabular numerals, an optional
//! caption (italic unless it already carries markup), `<th>` cells for
//! index levels, per-cell alignment, constant column highlights, and the
//! outlier colors for report-comparison tables.

use disclose_markup::{Block, HtmlRenderer, Inline, MarkupRenderer};
use disclose_text::format_label;

use crate::data::{group_thousands, Column, ColumnData, Table, TableError, Vertical, VerticalKind};
use crate::outlier::{maybe_has_outliers, Severity, DELTA_PERCENT, NCMEC, REPORTS};
use crate::text::calc_precision;

const HIGHLIGHT_CSS: &str = "background-color: #ffffb3;";
const START_CSS: &str = "text-align: start;";

/// A table caption. Plain text renders in italics; markup fragments carry
/// their own emphasis and render upright.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Caption<'a> {
    /// Plain caption text.
    Text(&'a str),
    /// Inline markup, reduced through the HTML renderer.
    Markup(&'a [Inline]),
}

/// Formats tables as HTML `<table>` strings.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlTableFormatter {
    /// The marker for null cells.
    pub not_available: String,
    /// Whether to emit the header row.
    pub show_column_header: bool,
    /// Whether to include the index levels.
    pub show_row_header: bool,
    /// Names of columns to highlight with a constant background.
    pub highlights: Vec<String>,
    /// Significant digits for float columns.
    pub significant_digits: u32,
}

impl Default for HtmlTableFormatter {
    fn default() -> Self {
        HtmlTableFormatter {
            not_available: "⋯".to_string(),
            show_column_header: true,
            show_row_header: true,
            highlights: Vec::new(),
            significant_digits: 3,
        }
    }
}

impl HtmlTableFormatter {
    /// Creates a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats the table, with an optional [`Caption`].
    pub fn format(
        &self,
        table: &Table,
        caption: Option<Caption<'_>>,
    ) -> Result<String, TableError> {
        for highlight in &self.highlights {
            table.require_vertical(highlight)?;
        }

        let verticals: Vec<Vertical<'_>> = table
            .verticals()
            .filter(|v| self.show_row_header || v.kind == VerticalKind::Column)
            .collect();

        let mut html = String::new();
        html.push_str("<table style=\"font-variant-numeric: tabular-nums;\">\n");

        if let Some(caption) = caption {
            let (text, italic) = match caption {
                Caption::Text(text) => (text.to_string(), true),
                Caption::Markup(fragments) => (HtmlRenderer.reduce(fragments), false),
            };
            let mut style =
                "caption-side: top; font-size: 1.1em; margin-bottom: 2ex;".to_string();
            if italic {
                style.push_str(" font-style: italic;");
            }
            html.push_str(&format!("<caption style=\"{style}\">{text}</caption>\n"));
        }

        if self.show_column_header {
            html.push_str("<thead>\n<tr>");
            for vertical in &verticals {
                let label = format_label(vertical.column.display_name());
                html.push_str(&format!("<th>{label}</th>"));
            }
            html.push_str("</tr>\n</thead>\n");
        }

        let cells: Vec<Vec<String>> = verticals
            .iter()
            .map(|vertical| self.format_cells(vertical.column))
            .collect();
        let outlier_css = self.outlier_css(table);
        let names: Vec<&str> = verticals
            .iter()
            .map(|v| v.column.display_name())
            .collect();

        html.push_str("<tbody>\n");
        for row in 0..table.row_count() {
            html.push_str("<tr>");
            for (position, vertical) in verticals.iter().enumerate() {
                let tag = match vertical.kind {
                    VerticalKind::Index => "th",
                    VerticalKind::Column => "td",
                };

                let mut styles: Vec<&str> = Vec::new();
                if !vertical.column.data.is_numeric() {
                    styles.push(START_CSS);
                }
                if let Some(css) = outlier_css.as_ref().and_then(|rows| {
                    let name = names[position];
                    let applies = name == REPORTS || name == DELTA_PERCENT || name == NCMEC;
                    (applies && !rows[row].is_empty()).then_some(rows[row])
                }) {
                    styles.push(css);
                }
                if self.highlights.iter().any(|h| h == names[position]) {
                    styles.push(HIGHLIGHT_CSS);
                }

                let cell = &cells[position][row];
                if styles.is_empty() {
                    html.push_str(&format!("<{tag}>{cell}</{tag}>"));
                } else {
                    let style = styles.join(" ");
                    html.push_str(&format!("<{tag} style=\"{style}\">{cell}</{tag}>"));
                }
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");

        Ok(html)
    }

    /// Formats the table's schema with a `Table <strong>name</strong>
    /// with N rows` caption, hiding both headers.
    pub fn format_schema(&self, table: &Table, name: Option<&str>) -> Result<String, TableError> {
        let fragments = match table.summarize(name) {
            Block::Paragraph { fragments } => fragments,
            _ => Vec::new(),
        };
        let formatter = HtmlTableFormatter {
            show_column_header: false,
            show_row_header: false,
            highlights: Vec::new(),
            ..self.clone()
        };
        formatter.format(&table.schema(), Some(Caption::Markup(&fragments)))
    }

    /// Per-row outlier CSS, when the heuristic identifies the table as a
    /// report comparison.
    fn outlier_css(&self, table: &Table) -> Option<Vec<&'static str>> {
        if !maybe_has_outliers(table) {
            return None;
        }
        let percentages = table.vertical(DELTA_PERCENT)?.data.as_floats()?;
        Some(
            percentages
                .iter()
                .map(|&value| Severity::classify(value).map_or("", Severity::css))
                .collect(),
        )
    }

    /// Formats one vertical's cells by type, grouping thousands in both
    /// integers and floats.
    fn format_cells(&self, column: &Column) -> Vec<String> {
        let na = &self.not_available;
        match &column.data {
            ColumnData::Bool(cells) => cells
                .iter()
                .map(|cell| match cell {
                    None => na.clone(),
                    Some(true) => "true".to_string(),
                    Some(false) => "false".to_string(),
                })
                .collect(),
            ColumnData::Int(cells) => cells
                .iter()
                .map(|cell| {
                    cell.map_or_else(|| na.clone(), |v| group_thousands(&v.to_string()))
                })
                .collect(),
            ColumnData::Float(cells) => {
                let precision = calc_precision(cells, self.significant_digits);
                cells
                    .iter()
                    .map(|cell| {
                        cell.map_or_else(
                            || na.clone(),
                            |v| group_thousands(&format!("{v:.precision$}")),
                        )
                    })
                    .collect()
            }
            ColumnData::Period(cells) => cells
                .iter()
                .map(|cell| cell.map_or_else(|| na.clone(), |p| p.to_string()))
                .collect(),
            ColumnData::Str(cells) => cells
                .iter()
                .map(|cell| cell.clone().unwrap_or_else(|| na.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_table() {
        let table = Table::new(
            Vec::new(),
            vec![
                Column::new("name", ColumnData::Str(vec![Some("a".to_string())])),
                Column::new("n", ColumnData::Int(vec![Some(1234)])),
            ],
        )
        .unwrap();
        let html = HtmlTableFormatter::new().format(&table, None).unwrap();
        assert_eq!(
            html,
            "<table style=\"font-variant-numeric: tabular-nums;\">\n\
             <thead>\n\
             <tr><th>name</th><th>n</th></tr>\n\
             </thead>\n\
             <tbody>\n\
             <tr><td style=\"text-align: start;\">a</td><td>1,234</td></tr>\n\
             </tbody>\n\
             </table>"
        );
    }

    #[test]
    fn levels_render_as_header_cells() {
        let table = Table::new(
            vec![Column::new(
                "year",
                ColumnData::Int(vec![Some(2023)]),
            )],
            vec![Column::new("n", ColumnData::Int(vec![Some(1)]))],
        )
        .unwrap();
        let html = HtmlTableFormatter::new().format(&table, None).unwrap();
        assert!(html.contains("<tr><th>2,023</th><td>1</td></tr>"));
    }

    #[test]
    fn plain_caption_is_italic() {
        let table = Table::new(Vec::new(), Vec::new()).unwrap();
        let html = HtmlTableFormatter::new()
            .format(&table, Some(Caption::Text("All platforms")))
            .unwrap();
        assert!(html.contains(
            "<caption style=\"caption-side: top; font-size: 1.1em; \
             margin-bottom: 2ex; font-style: italic;\">All platforms</caption>"
        ));
    }

    #[test]
    fn markup_caption_is_not_italic() {
        let table = Table::new(Vec::new(), Vec::new()).unwrap();
        let fragments = [Inline::text("Table "), Inline::strong("espc")];
        let html = HtmlTableFormatter::new()
            .format(&table, Some(Caption::Markup(&fragments)))
            .unwrap();
        assert!(html.contains("Table <strong>espc</strong></caption>"));
        assert!(!html.contains("font-style: italic"));
    }

    #[test]
    fn caption_text_mentioning_tags_stays_italic() {
        let table = Table::new(Vec::new(), Vec::new()).unwrap();
        let html = HtmlTableFormatter::new()
            .format(&table, Some(Caption::Text("how <em> is rendered")))
            .unwrap();
        assert!(html.contains("font-style: italic"));
    }

    #[test]
    fn header_labels_are_humanized() {
        let table = Table::new(
            Vec::new(),
            vec![Column::new("esp_rate_pct", ColumnData::Float(vec![None]))],
        )
        .unwrap();
        let html = HtmlTableFormatter::new().format(&table, None).unwrap();
        assert!(html.contains("<th>esp rate %</th>"));
        assert!(html.contains("<td>⋯</td>"));
    }

    #[test]
    fn outlier_rows_get_css() {
        let table = Table::new(
            Vec::new(),
            vec![
                Column::new("reports", ColumnData::Int(vec![Some(10), Some(20)])),
                Column::new("Δ%", ColumnData::Float(vec![Some(2.0), Some(50.0)])),
                Column::new("NCMEC", ColumnData::Int(vec![Some(11), Some(44)])),
            ],
        )
        .unwrap();
        let html = HtmlTableFormatter::new().format(&table, None).unwrap();
        let rows: Vec<&str> = html.lines().filter(|l| l.starts_with("<tr><td")).collect();
        assert_eq!(rows[0], "<tr><td>10</td><td>2.00</td><td>11</td></tr>");
        assert_eq!(
            rows[1],
            "<tr>\
             <td style=\"color: #f4002a; background-color: #ffe8e7;\">20</td>\
             <td style=\"color: #f4002a; background-color: #ffe8e7;\">50.00</td>\
             <td style=\"color: #f4002a; background-color: #ffe8e7;\">44</td>\
             </tr>"
        );
    }

    #[test]
    fn column_highlight_follows_outlier_css() {
        let table = Table::new(
            Vec::new(),
            vec![
                Column::new("reports", ColumnData::Int(vec![Some(20)])),
                Column::new("Δ%", ColumnData::Float(vec![Some(50.0)])),
                Column::new("NCMEC", ColumnData::Int(vec![Some(44)])),
            ],
        )
        .unwrap();
        let formatter = HtmlTableFormatter {
            highlights: vec!["NCMEC".to_string()],
            ..HtmlTableFormatter::default()
        };
        let html = formatter.format(&table, None).unwrap();
        assert!(html.contains(
            "<td style=\"color: #f4002a; background-color: #ffe8e7; \
             background-color: #ffffb3;\">44</td>"
        ));
    }

    #[test]
    fn unknown_highlight_is_an_error() {
        let table = Table::new(Vec::new(), Vec::new()).unwrap();
        let formatter = HtmlTableFormatter {
            highlights: vec!["ghost".to_string()],
            ..HtmlTableFormatter::default()
        };
        assert_eq!(
            formatter.format(&table, None),
            Err(TableError::UnknownColumn("ghost".to_string()))
        );
    }

    #[test]
    fn schema_summary() {
        let table = Table::new(
            vec![Column::new(
                "year",
                ColumnData::Int(vec![Some(2022), Some(2023)]),
            )],
            vec![Column::new(
                "rate",
                ColumnData::Float(vec![Some(0.5), None]),
            )],
        )
        .unwrap();
        let html = HtmlTableFormatter::new()
            .format_schema(&table, Some("espc"))
            .unwrap();
        assert!(html.contains("Table <strong>espc</strong> with 2 rows"));
        assert!(!html.contains("<thead>"));
        assert!(html.contains(">index<"));
        assert!(html.contains(">column<"));
        assert!(html.contains(">(no nulls)<"));
        assert!(html.contains(">(1 null)<"));
        // Rich caption: no italics.
        assert!(!html.contains("font-style: italic"));
    }
}
