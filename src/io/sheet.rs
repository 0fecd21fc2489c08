use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::error::Result;

/// Workbook handle opened from the filesystem.
pub type FileWorkbook = Xlsx<BufReader<File>>;

/// Opens the workbook at `path` for reading.
pub fn open(path: &Path) -> Result<FileWorkbook> {
    let workbook: FileWorkbook = open_workbook(path)?;
    Ok(workbook)
}

/// Typed view over a single worksheet cell.
///
/// Text keeps its original spacing; callers decide whether to trim.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Other(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Whether the cell holds a string (as opposed to a number or nothing).
    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }

    /// Trimmed textual rendering; empty for blank cells.
    pub fn trimmed(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) | Cell::Other(value) => value.trim().to_string(),
            Cell::Number(value) => value.to_string(),
        }
    }

    /// Attempts to read the cell as an integer. Numbers must be integral and
    /// text must consist of an integer literal.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Number(value) if value.fract() == 0.0 && value.is_finite() => Some(*value as i64),
            Cell::Text(value) => value.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl From<&DataType> for Cell {
    fn from(value: &DataType) -> Self {
        match value {
            DataType::Empty => Cell::Empty,
            DataType::String(value) => Cell::Text(value.clone()),
            DataType::Float(value) => Cell::Number(*value),
            DataType::Int(value) => Cell::Number(*value as f64),
            other => Cell::Other(cell_to_string(Some(other))),
        }
    }
}

/// Reads a sheet's cell values, returning `None` when the sheet is absent.
pub fn read_range<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Option<Range<DataType>>> {
    match workbook.worksheet_range(name) {
        Some(range) => Ok(Some(range?)),
        None => Ok(None),
    }
}

/// Reads a sheet's formulas, returning `None` when the sheet is absent.
pub fn read_formulas<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Option<Range<String>>> {
    match workbook.worksheet_formula(name) {
        Some(range) => Ok(Some(range?)),
        None => Ok(None),
    }
}

/// Cell at absolute zero-based `(row, column)` coordinates.
pub fn cell_at(range: &Range<DataType>, row: u32, column: u32) -> Cell {
    range
        .get_value((row, column))
        .map(Cell::from)
        .unwrap_or(Cell::Empty)
}

/// A sheet flattened into trimmed text cells with blank rows and columns
/// removed. Every row has the same width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetGrid {
    rows: Vec<Vec<String>>,
}

impl SheetGrid {
    /// Builds a grid from raw rows, dropping rows and columns that contain
    /// only blank cells.
    pub fn from_rows(raw: Vec<Vec<String>>) -> Self {
        let width = raw.iter().map(Vec::len).max().unwrap_or(0);
        let rows: Vec<Vec<String>> = raw
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row.iter().map(|cell| cell.trim().to_string()).collect();
                cells.resize(width, String::new());
                cells
            })
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        let kept_columns: Vec<usize> = (0..width)
            .filter(|&column| rows.iter().any(|row| !row[column].is_empty()))
            .collect();

        let rows = rows
            .into_iter()
            .map(|row| kept_columns.iter().map(|&column| row[column].clone()).collect())
            .collect();

        Self { rows }
    }

    /// Builds a grid from a calamine range, rendering each cell as text.
    pub fn from_range(range: &Range<DataType>) -> Self {
        let raw = range
            .rows()
            .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
            .collect();
        Self::from_rows(raw)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// First row, conventionally holding column headers.
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// Rows after the header.
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Non-empty cells in row-major order.
    pub fn non_empty_cells(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
    }
}

/// Loads `name` as a [`SheetGrid`]; `None` when the sheet does not exist.
pub fn read_grid<R: Read + Seek>(workbook: &mut Xlsx<R>, name: &str) -> Result<Option<SheetGrid>> {
    let Some(range) = read_range(workbook, name)? else {
        return Ok(None);
    };
    let grid = SheetGrid::from_range(&range);
    debug!(sheet = name, rows = grid.rows().len(), "sheet loaded as grid");
    Ok(Some(grid))
}

pub fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn blank_rows_and_columns_are_dropped() {
        let grid = SheetGrid::from_rows(strings(&[
            &["", "Barrera", "", "Concepto"],
            &["", "  ", "", ""],
            &["", " Uno ", "", "Dos"],
            &["", "Tres"],
        ]));

        assert_eq!(
            grid.rows(),
            strings(&[&["Barrera", "Concepto"], &["Uno", "Dos"], &["Tres", ""]]).as_slice()
        );
        assert_eq!(grid.header(), ["Barrera", "Concepto"]);
        assert_eq!(grid.body().len(), 2);
    }

    #[test]
    fn empty_grid_has_no_header() {
        let grid = SheetGrid::from_rows(strings(&[&["", " "], &[]]));
        assert!(grid.is_empty());
        assert!(grid.header().is_empty());
        assert!(grid.body().is_empty());
    }

    #[test]
    fn integer_parse_accepts_integral_numbers_and_digit_text() {
        assert_eq!(Cell::Number(3.0).as_integer(), Some(3));
        assert_eq!(Cell::text(" 2 ").as_integer(), Some(2));
        assert_eq!(Cell::Number(2.5).as_integer(), None);
        assert_eq!(Cell::text("dos").as_integer(), None);
        assert_eq!(Cell::Empty.as_integer(), None);
    }

    #[test]
    fn trimmed_renders_numbers_without_fraction() {
        assert_eq!(Cell::Number(3.0).trimmed(), "3");
        assert_eq!(Cell::text("  A ").trimmed(), "A");
        assert_eq!(Cell::text("   ").trimmed(), "");
    }
}
