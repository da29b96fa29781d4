//! The typed table model.
//!
//! A [`Table`] is a collection of named, typed verticals: index-like
//! *levels* followed by data *columns*, all of equal length. Cells are
//! optional throughout; a `None` renders as the formatter's null marker.

use std::fmt;

use disclose_markup::{Block, Inline};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The ways table construction and lookup can fail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    /// A vertical whose length differs from the table's row count.
    #[error("vertical {name:?} has {found} rows where {expected} were expected")]
    UnequalLength {
        /// The vertical's name, empty if unnamed.
        name: String,
        /// The row count established by the first vertical.
        expected: usize,
        /// The offending vertical's row count.
        found: usize,
    },
    /// A column name that does not exist in the table.
    #[error("table has no column named {0:?}")]
    UnknownColumn(String),
}

/// A reporting period: a year, a half-year, or a quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// A calendar year.
    Year(i32),
    /// A half-year; `half` is 1 or 2.
    Half {
        /// The calendar year.
        year: i32,
        /// The half within the year, 1 or 2.
        half: u8,
    },
    /// A quarter; `quarter` is 1 through 4.
    Quarter {
        /// The calendar year.
        year: i32,
        /// The quarter within the year, 1 through 4.
        quarter: u8,
    },
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Year(year) => write!(f, "{year:04}"),
            Period::Half { year, half } => write!(f, "{year:04} H{half}"),
            Period::Quarter { year, quarter } => write!(f, "{year:04} Q{quarter}"),
        }
    }
}

/// Horizontal alignment of formatted cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Left-aligned (in left-to-right scripts).
    Start,
    /// Right-aligned (in left-to-right scripts).
    End,
}

/// A vertical's cells, typed. Every cell is optional.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Boolean cells.
    Bool(Vec<Option<bool>>),
    /// Integer cells.
    Int(Vec<Option<i64>>),
    /// Floating-point cells.
    Float(Vec<Option<f64>>),
    /// Reporting-period cells.
    Period(Vec<Option<Period>>),
    /// Free-form text cells.
    Str(Vec<Option<String>>),
}

impl ColumnData {
    /// The number of cells.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Bool(cells) => cells.len(),
            ColumnData::Int(cells) => cells.len(),
            ColumnData::Float(cells) => cells.len(),
            ColumnData::Period(cells) => cells.len(),
            ColumnData::Str(cells) => cells.len(),
        }
    }

    /// Whether the vertical has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of null cells.
    pub fn null_count(&self) -> usize {
        match self {
            ColumnData::Bool(cells) => cells.iter().filter(|c| c.is_none()).count(),
            ColumnData::Int(cells) => cells.iter().filter(|c| c.is_none()).count(),
            ColumnData::Float(cells) => cells.iter().filter(|c| c.is_none()).count(),
            ColumnData::Period(cells) => cells.iter().filter(|c| c.is_none()).count(),
            ColumnData::Str(cells) => cells.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// The name of the cells' type.
    pub const fn dtype(&self) -> &'static str {
        match self {
            ColumnData::Bool(_) => "bool",
            ColumnData::Int(_) => "int",
            ColumnData::Float(_) => "float",
            ColumnData::Period(_) => "period",
            ColumnData::Str(_) => "str",
        }
    }

    /// The alignment of formatted cells in fixed-width output. Everything
    /// but free-form text aligns to the end.
    pub const fn alignment(&self) -> Align {
        match self {
            ColumnData::Str(_) => Align::Start,
            _ => Align::End,
        }
    }

    /// Whether the cells are numbers (or booleans, which count as 0/1).
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnData::Bool(_) | ColumnData::Int(_) | ColumnData::Float(_)
        )
    }

    /// The float cells, if this is a float vertical.
    pub fn as_floats(&self) -> Option<&[Option<f64>]> {
        match self {
            ColumnData::Float(cells) => Some(cells),
            _ => None,
        }
    }
}

/// A named vertical.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// The vertical's name, if any.
    pub name: Option<String>,
    /// The vertical's cells.
    pub data: ColumnData,
}

impl Column {
    /// Creates a named vertical.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Column {
        Column {
            name: Some(name.into()),
            data,
        }
    }

    /// Creates an unnamed vertical.
    pub fn unnamed(data: ColumnData) -> Column {
        Column { name: None, data }
    }

    /// The vertical's name, or the empty string if unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Whether a vertical serves as an index level or a data column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalKind {
    /// An index level.
    Index,
    /// A data column.
    Column,
}

impl VerticalKind {
    /// The kind's name as used in schema summaries.
    pub const fn as_str(self) -> &'static str {
        match self {
            VerticalKind::Index => "index",
            VerticalKind::Column => "column",
        }
    }
}

/// One vertical of a table along with its kind and position.
#[derive(Debug, Clone, Copy)]
pub struct Vertical<'a> {
    /// Whether this is a level or a column.
    pub kind: VerticalKind,
    /// The position within levels or within columns.
    pub position: usize,
    /// The vertical itself.
    pub column: &'a Column,
}

/// A table: zero or more index levels followed by data columns, all of
/// the same length.
///
/// # Example
///
/// ```rust
/// use disclose_table::{Column, ColumnData, Table};
///
/// let table = Table::new(
///     vec![Column::new("country", ColumnData::Str(vec![
///         Some("US".to_string()),
///         Some("CA".to_string()),
///     ]))],
///     vec![Column::new("reports", ColumnData::Int(vec![Some(21_751_085), Some(2_260)]))],
/// )
/// .unwrap();
/// assert_eq!(table.row_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    levels: Vec<Column>,
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table, validating that all verticals have equal length.
    pub fn new(levels: Vec<Column>, columns: Vec<Column>) -> Result<Table, TableError> {
        let mut expected: Option<usize> = None;
        for column in levels.iter().chain(&columns) {
            let found = column.data.len();
            match expected {
                None => expected = Some(found),
                Some(expected) if expected != found => {
                    return Err(TableError::UnequalLength {
                        name: column.display_name().to_string(),
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(Table { levels, columns })
    }

    fn new_unchecked(levels: Vec<Column>, columns: Vec<Column>) -> Table {
        Table { levels, columns }
    }

    /// The number of rows.
    pub fn row_count(&self) -> usize {
        self.levels
            .first()
            .or_else(|| self.columns.first())
            .map_or(0, |column| column.data.len())
    }

    /// The index levels.
    pub fn levels(&self) -> &[Column] {
        &self.levels
    }

    /// The data columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// All verticals in presentation order: levels first, then columns.
    pub fn verticals(&self) -> impl Iterator<Item = Vertical<'_>> {
        let levels = self.levels.iter().enumerate().map(|(position, column)| Vertical {
            kind: VerticalKind::Index,
            position,
            column,
        });
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(position, column)| Vertical {
                kind: VerticalKind::Column,
                position,
                column,
            });
        levels.chain(columns)
    }

    /// Looks up a vertical by name, levels included.
    pub fn vertical(&self, name: &str) -> Option<&Column> {
        self.levels
            .iter()
            .chain(&self.columns)
            .find(|column| column.name.as_deref() == Some(name))
    }

    /// Looks up a vertical by name, failing with [`TableError::UnknownColumn`].
    pub fn require_vertical(&self, name: &str) -> Result<&Column, TableError> {
        self.vertical(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    /// Summarizes the table's shape: one row per vertical with its kind,
    /// name, type, and null count.
    ///
    /// The null count comes pre-phrased as `(no nulls)`, `(1 null)`, or
    /// `(N nulls)`. The resulting table is meant to render without
    /// column or row headers.
    pub fn schema(&self) -> Table {
        let mut kinds = Vec::new();
        let mut names = Vec::new();
        let mut colons = Vec::new();
        let mut dtypes = Vec::new();
        let mut nulls = Vec::new();
        for vertical in self.verticals() {
            kinds.push(Some(vertical.kind.as_str().to_string()));
            names.push(Some(vertical.column.display_name().to_string()));
            colons.push(Some(":".to_string()));
            dtypes.push(Some(vertical.column.data.dtype().to_string()));
            nulls.push(Some(format_nulls(vertical.column.data.null_count())));
        }
        Table::new_unchecked(
            Vec::new(),
            vec![
                Column::new("kind", ColumnData::Str(kinds)),
                Column::new("name", ColumnData::Str(names)),
                Column::unnamed(ColumnData::Str(colons)),
                Column::new("dtype", ColumnData::Str(dtypes)),
                Column::new("nulls", ColumnData::Str(nulls)),
            ],
        )
    }

    /// Builds the caption paragraph `Table <strong>name</strong> with N
    /// rows` describing this table.
    pub fn summarize(&self, name: Option<&str>) -> Block {
        let mut fragments = vec![Inline::text("Table ")];
        if let Some(name) = name {
            fragments.push(Inline::strong(name));
            fragments.push(Inline::text(" "));
        }
        fragments.push(Inline::text(format!(
            "with {} rows",
            group_thousands(&self.row_count().to_string())
        )));
        Block::p(fragments)
    }
}

/// Phrases a null count: `(no nulls)`, `(1 null)`, `(7 nulls)`.
pub fn format_nulls(count: usize) -> String {
    match count {
        0 => "(no nulls)".to_string(),
        1 => "(1 null)".to_string(),
        n => format!("({n} nulls)"),
    }
}

/// Groups the integer digits of a formatted number with commas. The input
/// may carry a sign and a fractional part.
pub(crate) fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (digits, fraction) = match rest.find('.') {
        Some(dot) => (&rest[..dot], &rest[dot..]),
        None => (rest, ""),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, c) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}{fraction}")
}
