//! Fixed-width table formatting for terminals and LaTeX.
//!
//! The pipeline formats each vertical by type, sizes columns from titles
//! and cells, wraps titles into a multi-line header, pads cells, and then
//! optionally layers SGR styling on top: outlier colors first, then
//! column highlights and row shading, since backgrounds may span more
//! than one column.

use disclose_text::{visible_length, Reflow};

use crate::data::{group_thousands, Align, Column, ColumnData, Table, TableError};
use crate::outlier::{maybe_has_outliers, Severity, DELTA_PERCENT, NCMEC, REPORTS};

const SGR_BOLD: &str = "1";
const SGR_PLAIN: &str = "0";
const ROWSHADE_HEADER: &str = "48;5;253";
const ROWSHADE_BODY: &str = "48;5;255";
const COLUMN_HIGHLIGHT: &str = "48;5;229";
const BACKGROUND_RESET: &str = "49";

/// Wraps an SGR code sequence in its `ESC [`/`m` framing.
pub(crate) fn sgr(code: &str) -> String {
    format!("\x1b[{code}m")
}

/// Formats tables as fixed-width text.
///
/// All options are plain fields; build one with [`Default`] and override
/// what differs:
///
/// ```rust
/// use disclose_table::TextTableFormatter;
///
/// let formatter = TextTableFormatter {
///     use_sgr: true,
///     use_rowshade: true,
///     ..TextTableFormatter::default()
/// };
/// # let _ = formatter;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TextTableFormatter {
    /// The marker for null cells.
    pub not_available: String,
    /// The separator between columns.
    pub column_separator: String,
    /// Appended to every body row, before the newline.
    pub row_terminator: String,
    /// Appended to the last header row, before the newline.
    pub header_terminator: String,
    /// The presentation label for the `Δ%` column.
    pub delta_percent: String,
    /// Whether to emit SGR escape sequences at all.
    pub use_sgr: bool,
    /// Whether to shade the header and every other body row.
    pub use_rowshade: bool,
    /// Names of columns to highlight with a constant background.
    pub highlights: Vec<String>,
    /// Whether to include the header rows.
    pub show_column_header: bool,
    /// Whether to include the index levels.
    pub show_row_header: bool,
    /// Significant digits for float columns.
    pub significant_digits: u32,
}

impl Default for TextTableFormatter {
    fn default() -> Self {
        TextTableFormatter {
            not_available: "⋯⋯".to_string(),
            column_separator: "   ".to_string(),
            row_terminator: String::new(),
            header_terminator: String::new(),
            delta_percent: DELTA_PERCENT.to_string(),
            use_sgr: false,
            use_rowshade: false,
            highlights: Vec::new(),
            show_column_header: true,
            show_row_header: true,
            significant_digits: 3,
        }
    }
}

impl TextTableFormatter {
    /// Creates a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats the table as fixed-width text, returning the text and the
    /// table's width in columns. The text carries no trailing newline.
    pub fn format_text(&self, table: &Table) -> Result<(String, usize), TableError> {
        for highlight in &self.highlights {
            table.require_vertical(highlight)?;
        }

        let verticals: Vec<&Column> = if self.show_row_header {
            table.levels().iter().chain(table.columns()).collect()
        } else {
            table.columns().iter().collect()
        };
        let names: Vec<&str> = verticals.iter().map(|c| c.display_name()).collect();

        // Titles and their minimum widths, i.e. their longest words.
        let titles: Vec<String> = names
            .iter()
            .map(|name| format_title(name, &self.delta_percent))
            .collect();
        let mut widths: Vec<usize> = titles
            .iter()
            .map(|title| {
                title
                    .split_whitespace()
                    .map(|word| word.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        // Format cells by column type and fold cell widths into the
        // column widths.
        let cells: Vec<Vec<String>> = verticals
            .iter()
            .map(|column| self.format_column(column))
            .collect();
        for (width, column) in widths.iter_mut().zip(&cells) {
            let cell_width = column.iter().map(|c| visible_length(c)).max().unwrap_or(0);
            *width = (*width).max(cell_width);
        }

        // Wrap each title to its column width, pad the shorter ones with
        // leading blank lines, and transpose into header rows.
        // The per-column width is always passed explicitly.
        let reflow = Reflow::new(80);
        let wrapped: Vec<Vec<String>> = titles
            .iter()
            .zip(&widths)
            .map(|(title, &width)| reflow.wrap(title, Some(width)))
            .collect();
        let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(0);
        let mut header: Vec<Vec<String>> = (0..line_count)
            .map(|line| {
                wrapped
                    .iter()
                    .zip(&widths)
                    .map(|(lines, &width)| {
                        let pad_lines = line_count - lines.len();
                        let text = if line < pad_lines {
                            ""
                        } else {
                            &lines[line - pad_lines]
                        };
                        pad(text, width, Align::Start)
                    })
                    .collect()
            })
            .collect();

        // Pad body cells, start-aligned for text and end-aligned else.
        let mut body: Vec<Vec<String>> = cells
            .iter()
            .zip(&verticals)
            .zip(&widths)
            .map(|((column, vertical), &width)| {
                column
                    .iter()
                    .map(|cell| pad(cell, width, vertical.data.alignment()))
                    .collect()
            })
            .collect();

        let table_width = widths.iter().sum::<usize>()
            + widths.len().saturating_sub(1) * self.column_separator.chars().count()
            + self
                .row_terminator
                .chars()
                .count()
                .max(self.header_terminator.chars().count());

        // Colorize text before backgrounds, since the latter may span
        // more than one column.
        if self.use_sgr && maybe_has_outliers(table) {
            inject_outlier_sgr(&verticals, &names, &mut body);
        }
        if self.use_sgr && (self.use_rowshade || !self.highlights.is_empty()) {
            add_background_colors(
                &mut header,
                &mut body,
                &names,
                self.use_rowshade,
                &self.highlights,
            );
        }

        // Render down to a string, without trailing newline.
        let sep = &self.column_separator;
        let row_break = format!("{}\n", self.row_terminator);
        let body_text = (0..table.row_count())
            .map(|row| {
                body.iter()
                    .map(|column| column[row].as_str())
                    .collect::<Vec<_>>()
                    .join(sep)
            })
            .collect::<Vec<_>>()
            .join(&row_break);

        let text = if self.show_column_header {
            let bold = if self.use_sgr { sgr(SGR_BOLD) } else { String::new() };
            let plain = if self.use_sgr { sgr(SGR_PLAIN) } else { String::new() };
            let header_text = header
                .iter()
                .map(|row| row.join(sep))
                .collect::<Vec<_>>()
                .join(&row_break);
            format!(
                "{bold}{header_text}{plain}{}\n{body_text}{}",
                self.header_terminator, self.row_terminator
            )
        } else {
            format!("{body_text}{}", self.row_terminator)
        };

        Ok((text, table_width))
    }

    /// Formats the table with a bold title centered above it.
    pub fn format_table(&self, table: &Table, title: Option<&str>) -> Result<String, TableError> {
        let (text, width) = self.format_text(table)?;
        let Some(title) = title else {
            return Ok(text);
        };

        let slack = width as i64 - visible_length(title) as i64;
        let indent = " ".repeat((slack.div_euclid(2) - 1).max(0) as usize);
        let title = if self.use_sgr {
            format!("{}{title}{}", sgr(SGR_BOLD), sgr(SGR_PLAIN))
        } else {
            title.to_string()
        };
        Ok(format!("{indent}{title}\n\n{text}"))
    }

    /// Formats the table as a LaTeX `tabular` environment.
    pub fn format_latex(&self, table: &Table) -> Result<String, TableError> {
        let latex = TextTableFormatter {
            not_available: "$\\cdots$".to_string(),
            column_separator: "  &  ".to_string(),
            row_terminator: "  \\\\".to_string(),
            header_terminator: "  \\\\ \\hline".to_string(),
            delta_percent: "\\Delta\\%".to_string(),
            use_sgr: false,
            use_rowshade: false,
            highlights: Vec::new(),
            show_column_header: self.show_column_header,
            show_row_header: self.show_row_header,
            significant_digits: self.significant_digits,
        };
        let (body, _) = latex.format_text(table)?;

        let vertical_count = if self.show_row_header {
            table.levels().len() + table.columns().len()
        } else {
            table.columns().len()
        };
        let alignment = "r".repeat(vertical_count);
        Ok(format!(
            "\\begin{{tabular}}{{{alignment}}}\n{body}\n\\end{{tabular}}"
        ))
    }

    /// Formats one vertical's cells by type. Null cells render as the
    /// null marker regardless of type.
    fn format_column(&self, column: &Column) -> Vec<String> {
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
                        cell.map_or_else(|| na.clone(), |v| format!("{v:.precision$}"))
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

/// Picks a float precision so that the smallest nonzero magnitude shows
/// the requested number of significant digits. All-null and all-zero
/// columns get no decimals.
pub(crate) fn calc_precision(cells: &[Option<f64>], significant_digits: u32) -> usize {
    let mut min_magnitude = f64::INFINITY;
    for value in cells.iter().flatten() {
        let magnitude = value.abs();
        if magnitude > 0.0 && magnitude.is_finite() && magnitude < min_magnitude {
            min_magnitude = magnitude;
        }
    }
    if !min_magnitude.is_finite() {
        return 0;
    }
    let logmin = min_magnitude.log10().floor() as i64;
    (i64::from(significant_digits) - logmin - 1).max(0) as usize
}

/// Formats a column name for presentation: `_pct` reads as ` percent`,
/// underscores as spaces, the delta column shows its configured label,
/// and names starting with an ASCII lowercase letter get title-cased.
pub(crate) fn format_title(name: &str, delta_percent: &str) -> String {
    let title = name.replace("_pct", " percent").replace('_', " ");
    if title == DELTA_PERCENT {
        return delta_percent.to_string();
    }
    match title.chars().next() {
        Some(c) if c.is_ascii_lowercase() => title_case(&title),
        _ => title,
    }
}

/// Uppercases the first letter of every word, lowercasing the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut boundary = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if boundary {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(c);
            boundary = true;
        }
    }
    out
}

/// Pads the text to the width, measuring visible length only.
fn pad(text: &str, width: usize, align: Align) -> String {
    let gap = width.saturating_sub(visible_length(text));
    match align {
        Align::Start => format!("{text}{}", " ".repeat(gap)),
        Align::End => format!("{}{text}", " ".repeat(gap)),
    }
}

/// Injects outlier SGR codes into the report-comparison cells: the color
/// opens on the `reports` cell and closes after the `NCMEC` cell, which
/// colors the whole run of adjacent cells in between.
fn inject_outlier_sgr(verticals: &[&Column], names: &[&str], body: &mut [Vec<String>]) {
    let position = |name| names.iter().position(|&n| n == name);
    let (Some(reports), Some(delta), Some(ncmec)) = (
        position(REPORTS),
        position(DELTA_PERCENT),
        position(NCMEC),
    ) else {
        return;
    };
    let Some(percentages) = verticals[delta].data.as_floats() else {
        return;
    };

    for (row, &value) in percentages.iter().enumerate() {
        let Some((open, close)) = Severity::classify(value).and_then(Severity::sgr) else {
            continue;
        };
        body[reports][row].insert_str(0, &sgr(open));
        body[ncmec][row].push_str(&sgr(close));
    }
}

/// Adds rowshade and constant column highlights to padded cells. A
/// highlight spanning adjacent columns opens once and closes once, and
/// rowshade resumes in the column gap after a highlight run ends.
fn add_background_colors(
    header: &mut [Vec<String>],
    body: &mut [Vec<String>],
    names: &[&str],
    use_rowshade: bool,
    highlights: &[String],
) {
    if use_rowshade {
        for row in header.iter_mut() {
            if let Some(first) = row.first_mut() {
                first.insert_str(0, &sgr(ROWSHADE_HEADER));
            }
            if let Some(last) = row.last_mut() {
                last.push_str(&sgr(BACKGROUND_RESET));
            }
        }
    }

    let mut previous: Option<usize> = None;
    let mut previous_highlight = false;

    for column in 0..body.len() {
        let current_highlight = highlights.iter().any(|h| h == names[column]);

        if !previous_highlight && current_highlight {
            // Enable highlight, which also covers rowshade for all rows.
            for cell in &mut body[column] {
                cell.insert_str(0, &sgr(COLUMN_HIGHLIGHT));
            }
        } else if previous_highlight && !current_highlight {
            // Disable highlight in the previous column; resume rowshade
            // there so that it covers the column gap.
            if let Some(p) = previous {
                for cell in &mut body[p] {
                    cell.push_str(&sgr(BACKGROUND_RESET));
                }
                if use_rowshade {
                    for cell in body[p].iter_mut().skip(1).step_by(2) {
                        cell.push_str(&sgr(ROWSHADE_BODY));
                    }
                }
            }
        } else if previous.is_none() && use_rowshade {
            // Enable rowshade in the first column.
            for cell in body[column].iter_mut().skip(1).step_by(2) {
                cell.insert_str(0, &sgr(ROWSHADE_BODY));
            }
        }

        previous = Some(column);
        previous_highlight = current_highlight;
    }

    if previous_highlight {
        if let Some(p) = previous {
            for cell in &mut body[p] {
                cell.push_str(&sgr(BACKGROUND_RESET));
            }
        }
    } else if use_rowshade {
        if let Some(p) = previous {
            for cell in body[p].iter_mut().skip(1).step_by(2) {
                cell.push_str(&sgr(BACKGROUND_RESET));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Period;

    fn sample() -> Table {
        Table::new(
            vec![Column::new(
                "period",
                ColumnData::Period(vec![Some(Period::Year(2022)), Some(Period::Year(2023))]),
            )],
            vec![
                Column::new("reports", ColumnData::Int(vec![Some(100), Some(1000)])),
                Column::new(
                    "esp_rate",
                    ColumnData::Float(vec![Some(0.0421), Some(0.00532)]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn plain_layout() {
        let (text, width) = TextTableFormatter::new().format_text(&sample()).unwrap();
        assert_eq!(width, 26);
        let expected = format!(
            "{}Esp    \n\
             Period   Reports   Rate   \n\
             \x20 2022       100   0.04210\n\
             \x20 2023     1,000   0.00532",
            " ".repeat(19)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn title_formatting() {
        assert_eq!(format_title("esp_rate", "Δ%"), "Esp Rate");
        assert_eq!(format_title("growth_pct", "Δ%"), "Growth Percent");
        assert_eq!(format_title("Δ%", "change"), "change");
        assert_eq!(format_title("NCMEC", "Δ%"), "NCMEC");
        assert_eq!(format_title("reports", "Δ%"), "Reports");
    }

    #[test]
    fn precision_follows_smallest_magnitude() {
        assert_eq!(calc_precision(&[Some(0.0421), Some(0.00532)], 3), 5);
        assert_eq!(calc_precision(&[Some(4.21)], 3), 2);
        assert_eq!(calc_precision(&[Some(421.0)], 3), 0);
        assert_eq!(calc_precision(&[Some(1234.0)], 3), 0);
        // All-null and all-zero columns have no decimals.
        assert_eq!(calc_precision(&[None, None], 3), 0);
        assert_eq!(calc_precision(&[Some(0.0)], 3), 0);
        assert_eq!(calc_precision(&[], 3), 0);
    }

    #[test]
    fn null_markers_everywhere() {
        let table = Table::new(
            Vec::new(),
            vec![
                Column::new("ok", ColumnData::Bool(vec![Some(true), None])),
                Column::new("n", ColumnData::Int(vec![None, Some(7)])),
            ],
        )
        .unwrap();
        let (text, _) = TextTableFormatter::new().format_text(&table).unwrap();
        assert_eq!(text, "Ok     N \ntrue   ⋯⋯\n\x20 ⋯⋯    7");
    }

    #[test]
    fn empty_table_renders_empty_body() {
        let table = Table::new(Vec::new(), Vec::new()).unwrap();
        let (text, width) = TextTableFormatter::new().format_text(&table).unwrap();
        assert_eq!(width, 0);
        assert_eq!(text, "\n");
    }

    #[test]
    fn headers_can_be_hidden() {
        let table = Table::new(
            Vec::new(),
            vec![Column::new("n", ColumnData::Int(vec![Some(1), Some(2)]))],
        )
        .unwrap();
        let formatter = TextTableFormatter {
            show_column_header: false,
            ..TextTableFormatter::default()
        };
        let (text, _) = formatter.format_text(&table).unwrap();
        assert_eq!(text, "1\n2");
    }

    #[test]
    fn row_header_can_be_hidden() {
        let formatter = TextTableFormatter {
            show_row_header: false,
            ..TextTableFormatter::default()
        };
        let (text, _) = formatter.format_text(&sample()).unwrap();
        assert!(!text.contains("Period"));
        assert!(text.contains("Reports"));
    }

    #[test]
    fn unknown_highlight_is_an_error() {
        let formatter = TextTableFormatter {
            highlights: vec!["nope".to_string()],
            ..TextTableFormatter::default()
        };
        assert_eq!(
            formatter.format_text(&sample()),
            Err(TableError::UnknownColumn("nope".to_string()))
        );
    }

    #[test]
    fn header_is_bold_with_sgr() {
        let table = Table::new(
            Vec::new(),
            vec![Column::new("n", ColumnData::Int(vec![Some(1)]))],
        )
        .unwrap();
        let formatter = TextTableFormatter {
            use_sgr: true,
            ..TextTableFormatter::default()
        };
        let (text, _) = formatter.format_text(&table).unwrap();
        assert_eq!(text, "\x1b[1mN\x1b[0m\n1");
    }

    #[test]
    fn outlier_sgr_spans_reports_to_ncmec() {
        let table = Table::new(
            Vec::new(),
            vec![
                Column::new("reports", ColumnData::Int(vec![Some(10), Some(20)])),
                Column::new(
                    "Δ%",
                    ColumnData::Float(vec![Some(2.0), Some(50.0)]),
                ),
                Column::new("NCMEC", ColumnData::Int(vec![Some(11), Some(44)])),
            ],
        )
        .unwrap();
        let formatter = TextTableFormatter {
            use_sgr: true,
            ..TextTableFormatter::default()
        };
        let (text, _) = formatter.format_text(&table).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // Row with a low difference stays unstyled.
        assert_eq!(lines[1], "     10    2.00      11");
        // Row with a high difference opens color on reports, closes
        // after NCMEC.
        assert_eq!(
            lines[2],
            "\x1b[1;38;5;160m     20   50.00      44\x1b[39;0m"
        );
    }

    #[test]
    fn rowshade_alternates_rows() {
        let table = Table::new(
            Vec::new(),
            vec![Column::new(
                "n",
                ColumnData::Int(vec![Some(1), Some(2), Some(3)]),
            )],
        )
        .unwrap();
        let formatter = TextTableFormatter {
            use_sgr: true,
            use_rowshade: true,
            ..TextTableFormatter::default()
        };
        let (text, _) = formatter.format_text(&table).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // Bold opens before the rowshade prefix and closes after its reset.
        assert_eq!(lines[0], "\x1b[1m\x1b[48;5;253mN\x1b[49m\x1b[0m");
        assert_eq!(lines[1], "1");
        assert_eq!(lines[2], "\x1b[48;5;255m2\x1b[49m");
        assert_eq!(lines[3], "3");
    }

    #[test]
    fn highlight_run_opens_and_closes_once() {
        let table = Table::new(
            Vec::new(),
            vec![
                Column::new("a", ColumnData::Int(vec![Some(1)])),
                Column::new("b", ColumnData::Int(vec![Some(2)])),
                Column::new("c", ColumnData::Int(vec![Some(3)])),
                Column::new("d", ColumnData::Int(vec![Some(4)])),
            ],
        )
        .unwrap();
        let formatter = TextTableFormatter {
            use_sgr: true,
            highlights: vec!["b".to_string(), "c".to_string()],
            ..TextTableFormatter::default()
        };
        let (text, _) = formatter.format_text(&table).unwrap();
        let body = text.lines().nth(1).unwrap();
        assert_eq!(body, "1   \x1b[48;5;229m2   3\x1b[49m   4");
    }

    #[test]
    fn titled_table_is_centered() {
        let table = Table::new(
            Vec::new(),
            vec![Column::new(
                "platform_name",
                ColumnData::Str(vec![Some("Discord".to_string())]),
            )],
        )
        .unwrap();
        let text = TextTableFormatter::new()
            .format_table(&table, Some("ESPs"))
            .unwrap();
        // The column is 8 wide (its longest title word), so the title
        // indents by (8 - 4) / 2 - 1 = 1 space and the title wraps.
        assert_eq!(text, " ESPs\n\nPlatform\nName    \nDiscord ");
    }

    #[test]
    fn untitled_table_passes_through() {
        let formatter = TextTableFormatter::new();
        let (text, _) = formatter.format_text(&sample()).unwrap();
        assert_eq!(formatter.format_table(&sample(), None).unwrap(), text);
    }

    #[test]
    fn latex_output() {
        let table = Table::new(
            Vec::new(),
            vec![Column::new(
                "n",
                ColumnData::Int(vec![Some(1), None]),
            )],
        )
        .unwrap();
        let text = TextTableFormatter::new().format_latex(&table).unwrap();
        assert_eq!(
            text,
            "\\begin{tabular}{r}\n\
             N         \\\\ \\hline\n\
             \x20      1  \\\\\n\
             $\\cdots$  \\\\\n\
             \\end{tabular}"
        );
    }
}
