//! In-memory worksheet model
//!
//! Report builders write into a [`ReportSheet`] instead of a
//! `rust_xlsxwriter::Worksheet` directly. The model supports what the
//! writer cannot do after the fact: reading cells back, inserting and
//! deleting rows (shifting everything below), and rejecting overlapping
//! merges up front. [`ReportSheet::write_to`] flushes the finished grid.
//!
//! Rows are 1-based like A1 references; columns are 0-based indices
//! displayed as letters.

use crate::style::CellStyle;
use rust_xlsxwriter::{Format, Worksheet, XlsxError};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Last row Excel can address
pub const MAX_ROW: u32 = 1_048_576;
/// Last column index Excel can address (XFD)
pub const MAX_COLUMN: u16 = 16_383;

/// Worksheet model error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("Invalid column reference: '{0}'")]
    InvalidColumn(String),

    #[error("Invalid cell reference: '{0}'")]
    InvalidCell(String),

    #[error("Invalid range: '{0}'")]
    InvalidRange(String),

    #[error("Row {0} is outside the worksheet")]
    RowOutOfRange(u32),

    #[error("Merge {new} overlaps existing merge {existing}")]
    MergeOverlap { new: String, existing: String },

    #[error("Cannot merge a single cell: {0}")]
    SingleCellMerge(String),
}

// ============================================================================
// Coordinates
// ============================================================================

/// Worksheet column (0 = A)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column(u16);

impl Column {
    pub const A: Column = Column(0);
    pub const B: Column = Column(1);
    pub const C: Column = Column(2);

    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Column from letters known at compile time ("A", "BK", "CJ").
    ///
    /// Panics on anything but upper-case ASCII letters, which makes an
    /// invalid constant table a build failure.
    pub const fn from_letters(letters: &str) -> Self {
        let bytes = letters.as_bytes();
        assert!(!bytes.is_empty() && bytes.len() <= 3, "column letters");
        let mut n: u32 = 0;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            assert!(b >= b'A' && b <= b'Z', "column letters");
            n = n * 26 + (b - b'A' + 1) as u32;
            i += 1;
        }
        Self((n - 1) as u16)
    }

    /// Parse column letters, case-insensitive
    pub fn parse(letters: &str) -> Result<Self, SheetError> {
        let trimmed = letters.trim();
        if trimmed.is_empty() || trimmed.len() > 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SheetError::InvalidColumn(letters.to_string()));
        }
        let n = trimmed
            .to_ascii_uppercase()
            .bytes()
            .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A' + 1));
        if n - 1 > u32::from(MAX_COLUMN) {
            return Err(SheetError::InvalidColumn(letters.to_string()));
        }
        Ok(Self((n - 1) as u16))
    }

    pub const fn index(&self) -> u16 {
        self.0
    }

    /// Column `n` places to the right
    pub const fn offset(&self, n: u16) -> Self {
        Self(self.0 + n)
    }

    /// Convert to Excel letters (0 -> A, 25 -> Z, 26 -> AA)
    pub fn letters(&self) -> String {
        let mut result = String::new();
        let mut n = u32::from(self.0);
        loop {
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            if n < 26 {
                break;
            }
            n = n / 26 - 1;
        }
        result
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.letters())
    }
}

/// Single cell address, e.g. `D8`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub column: Column,
    /// 1-based row
    pub row: u32,
}

impl CellRef {
    pub const fn new(column: Column, row: u32) -> Self {
        Self { column, row }
    }

    pub fn parse(reference: &str) -> Result<Self, SheetError> {
        let trimmed = reference.trim().replace('$', "");
        let split = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| SheetError::InvalidCell(reference.to_string()))?;
        let (letters, digits) = trimmed.split_at(split);
        let column = Column::parse(letters).map_err(|_| SheetError::InvalidCell(reference.to_string()))?;
        let row: u32 = digits
            .parse()
            .map_err(|_| SheetError::InvalidCell(reference.to_string()))?;
        if row == 0 || row > MAX_ROW {
            return Err(SheetError::InvalidCell(reference.to_string()));
        }
        Ok(Self { column, row })
    }

    fn key(&self) -> (u32, u16) {
        (self.row, self.column.index())
    }

    fn from_key((row, col): (u32, u16)) -> Self {
        Self::new(Column::new(col), row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// Rectangular range, always stored top-left to bottom-right
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl CellRange {
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            first: CellRef::new(a.column.min(b.column), a.row.min(b.row)),
            last: CellRef::new(a.column.max(b.column), a.row.max(b.row)),
        }
    }

    /// Range on a single row
    pub fn row_span(first: Column, last: Column, row: u32) -> Self {
        Self::new(CellRef::new(first, row), CellRef::new(last, row))
    }

    /// Range in a single column
    pub fn column_span(column: Column, first_row: u32, last_row: u32) -> Self {
        Self::new(CellRef::new(column, first_row), CellRef::new(column, last_row))
    }

    /// Parse `A1:CJ7` or a single cell `B8`
    pub fn parse(range: &str) -> Result<Self, SheetError> {
        let invalid = || SheetError::InvalidRange(range.to_string());
        let mut parts = range.split(':');
        let first = parts.next().ok_or_else(invalid)?;
        let first = CellRef::parse(first).map_err(|_| invalid())?;
        let last = match parts.next() {
            Some(last) => CellRef::parse(last).map_err(|_| invalid())?,
            None => first,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::new(first, last))
    }

    pub fn is_single_cell(&self) -> bool {
        self.first == self.last
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.first.row..=self.last.row).contains(&cell.row)
            && (self.first.column..=self.last.column).contains(&cell.column)
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        self.first.row <= other.last.row
            && other.first.row <= self.last.row
            && self.first.column <= other.last.column
            && other.first.column <= self.last.column
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellRef> {
        let (first, last) = (self.first, self.last);
        (first.row..=last.row).flat_map(move |row| {
            (first.column.index()..=last.column.index()).map(move |col| CellRef::new(Column::new(col), row))
        })
    }

    /// Whether `cell` lies on the outer edge of the range, per side
    fn edges(&self, cell: CellRef) -> (bool, bool, bool, bool) {
        (
            cell.row == self.first.row,
            cell.row == self.last.row,
            cell.column == self.first.column,
            cell.column == self.last.column,
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}:{}", self.first, self.last)
        }
    }
}

// ============================================================================
// Cells
// ============================================================================

/// Content of one cell
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Formula including the leading `=`
    Formula(String),
}

impl CellValue {
    pub fn formula(formula: impl Into<String>) -> Self {
        Self::Formula(formula.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_formula(&self) -> Option<&str> {
        match self {
            Self::Formula(f) => Some(f),
            _ => None,
        }
    }

    /// Characters a reader sees, used for column auto-sizing
    fn display_width(&self) -> usize {
        match self {
            Self::Text(t) => t.chars().count(),
            Self::Number(n) => format!("{n}").len(),
            Self::Formula(_) => 6,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

// ============================================================================
// Sheet
// ============================================================================

/// A worksheet being assembled
#[derive(Clone, Debug, Default)]
pub struct ReportSheet {
    name: String,
    cells: BTreeMap<(u32, u16), CellValue>,
    styles: BTreeMap<(u32, u16), CellStyle>,
    merges: Vec<CellRange>,
    row_heights: BTreeMap<u32, f64>,
    column_widths: BTreeMap<u16, f64>,
    freeze: Option<CellRef>,
}

impl ReportSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the content of a cell, replacing what was there
    pub fn set(&mut self, cell: CellRef, value: impl Into<CellValue>) {
        self.cells.insert(cell.key(), value.into());
    }

    pub fn get(&self, cell: CellRef) -> Option<&CellValue> {
        self.cells.get(&cell.key())
    }

    /// Look up a cell by A1 reference; invalid references read as empty
    pub fn value(&self, reference: &str) -> Option<&CellValue> {
        CellRef::parse(reference).ok().and_then(|cell| self.get(cell))
    }

    /// Merge a range. Overlapping an existing merge is an error.
    pub fn merge(&mut self, range: CellRange) -> Result<(), SheetError> {
        if range.is_single_cell() {
            return Err(SheetError::SingleCellMerge(range.to_string()));
        }
        if let Some(existing) = self.merges.iter().find(|m| m.intersects(&range)) {
            return Err(SheetError::MergeOverlap {
                new: range.to_string(),
                existing: existing.to_string(),
            });
        }
        self.merges.push(range);
        Ok(())
    }

    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    /// The merge whose top-left cell is `cell`, if any
    pub fn merge_at(&self, cell: CellRef) -> Option<&CellRange> {
        self.merges.iter().find(|m| m.first == cell)
    }

    /// Apply `update` to the style of every cell in `range`
    pub fn style_range(&mut self, range: CellRange, mut update: impl FnMut(&mut CellStyle)) {
        for cell in range.cells() {
            update(self.styles.entry(cell.key()).or_default());
        }
    }

    /// Apply `update` to every cell, telling it which outer edges the cell sits on
    pub fn style_range_edges(
        &mut self,
        range: CellRange,
        mut update: impl FnMut(&mut CellStyle, (bool, bool, bool, bool)),
    ) {
        for cell in range.cells() {
            let edges = range.edges(cell);
            update(self.styles.entry(cell.key()).or_default(), edges);
        }
    }

    pub fn style(&self, cell: CellRef) -> Option<&CellStyle> {
        self.styles.get(&cell.key())
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub fn set_column_width(&mut self, column: Column, width: f64) {
        self.column_widths.insert(column.index(), width);
    }

    pub fn column_width(&self, column: Column) -> Option<f64> {
        self.column_widths.get(&column.index()).copied()
    }

    /// Freeze rows above and columns left of `cell`
    pub fn set_freeze_panes(&mut self, cell: CellRef) {
        self.freeze = Some(cell);
    }

    pub fn freeze_panes(&self) -> Option<CellRef> {
        self.freeze
    }

    /// Highest row holding a value, style, merge or explicit height (0 when empty)
    pub fn highest_row(&self) -> u32 {
        let cells = self.cells.keys().map(|(row, _)| *row);
        let styles = self.styles.keys().map(|(row, _)| *row);
        let merges = self.merges.iter().map(|m| m.last.row);
        let heights = self.row_heights.keys().copied();
        cells.chain(styles).chain(merges).chain(heights).max().unwrap_or(0)
    }

    /// Rightmost column holding a value or merge
    pub fn highest_column(&self) -> Option<Column> {
        let cells = self.cells.keys().map(|(_, col)| *col);
        let merges = self.merges.iter().map(|m| m.last.column.index());
        cells.chain(merges).max().map(Column::new)
    }

    /// Widest displayed content in a column, ignoring merged cells
    pub fn content_width(&self, column: Column) -> usize {
        self.cells
            .iter()
            .filter(|((_, col), _)| *col == column.index())
            .filter(|((row, col), _)| {
                let cell = CellRef::from_key((*row, *col));
                !self.merges.iter().any(|m| m.contains(cell))
            })
            .map(|(_, value)| value.display_width())
            .max()
            .unwrap_or(0)
    }

    /// Insert a blank row at `row`, moving it and everything below down by one
    pub fn insert_row(&mut self, row: u32) -> Result<(), SheetError> {
        if row == 0 || row >= MAX_ROW {
            return Err(SheetError::RowOutOfRange(row));
        }
        let shift = |r: u32| if r >= row { r + 1 } else { r };
        self.cells = shift_keys(std::mem::take(&mut self.cells), |r| Some(shift(r)));
        self.styles = shift_keys(std::mem::take(&mut self.styles), |r| Some(shift(r)));
        self.row_heights = std::mem::take(&mut self.row_heights)
            .into_iter()
            .map(|(r, h)| (shift(r), h))
            .collect();
        for merge in &mut self.merges {
            if merge.first.row >= row {
                merge.first.row += 1;
                merge.last.row += 1;
            } else if merge.last.row >= row {
                merge.last.row += 1;
            }
        }
        if let Some(freeze) = &mut self.freeze {
            freeze.row = shift(freeze.row);
        }
        Ok(())
    }

    /// Delete `row`, moving everything below it up by one
    pub fn remove_row(&mut self, row: u32) -> Result<(), SheetError> {
        if row == 0 || row > MAX_ROW {
            return Err(SheetError::RowOutOfRange(row));
        }
        let shift = |r: u32| match r.cmp(&row) {
            std::cmp::Ordering::Less => Some(r),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(r - 1),
        };
        self.cells = shift_keys(std::mem::take(&mut self.cells), shift);
        self.styles = shift_keys(std::mem::take(&mut self.styles), shift);
        self.row_heights = std::mem::take(&mut self.row_heights)
            .into_iter()
            .filter_map(|(r, h)| shift(r).map(|r| (r, h)))
            .collect();
        self.merges = std::mem::take(&mut self.merges)
            .into_iter()
            .filter_map(|mut merge| {
                if merge.first.row > row {
                    merge.first.row -= 1;
                    merge.last.row -= 1;
                } else if merge.last.row >= row {
                    if merge.first.row == merge.last.row {
                        return None;
                    }
                    merge.last.row -= 1;
                }
                (!merge.is_single_cell()).then_some(merge)
            })
            .collect();
        Ok(())
    }

    /// Flush the grid into a `rust_xlsxwriter` worksheet
    pub fn write_to(&self, worksheet: &mut Worksheet) -> Result<(), XlsxError> {
        worksheet.set_name(&self.name)?;

        for (&col, &width) in &self.column_widths {
            worksheet.set_column_width(col, width)?;
        }
        for (&row, &height) in &self.row_heights {
            worksheet.set_row_height(row - 1, height)?;
        }

        for merge in &self.merges {
            let format = self.format_at(merge.first);
            let text = self.get(merge.first).and_then(CellValue::as_text).unwrap_or("");
            worksheet.merge_range(
                merge.first.row - 1,
                merge.first.column.index(),
                merge.last.row - 1,
                merge.last.column.index(),
                text,
                &format,
            )?;
            match self.get(merge.first) {
                Some(CellValue::Number(n)) => {
                    worksheet.write_number_with_format(merge.first.row - 1, merge.first.column.index(), *n, &format)?;
                }
                Some(CellValue::Formula(f)) => {
                    worksheet.write_formula_with_format(
                        merge.first.row - 1,
                        merge.first.column.index(),
                        f.as_str(),
                        &format,
                    )?;
                }
                _ => {}
            }
        }

        let keys: BTreeSet<(u32, u16)> = self.cells.keys().chain(self.styles.keys()).copied().collect();
        for key in keys {
            let cell = CellRef::from_key(key);
            if self.merges.iter().any(|m| m.contains(cell)) {
                continue;
            }
            let format = self.format_at(cell);
            let (row, col) = (cell.row - 1, cell.column.index());
            match self.get(cell) {
                Some(CellValue::Text(t)) => {
                    worksheet.write_string_with_format(row, col, t.as_str(), &format)?;
                }
                Some(CellValue::Number(n)) => {
                    worksheet.write_number_with_format(row, col, *n, &format)?;
                }
                Some(CellValue::Formula(f)) => {
                    worksheet.write_formula_with_format(row, col, f.as_str(), &format)?;
                }
                None => {
                    worksheet.write_blank(row, col, &format)?;
                }
            }
        }

        if let Some(freeze) = self.freeze {
            worksheet.set_freeze_panes(freeze.row - 1, freeze.column.index())?;
        }

        Ok(())
    }

    fn format_at(&self, cell: CellRef) -> Format {
        self.style(cell).map_or_else(Format::new, CellStyle::to_format)
    }
}

fn shift_keys<V>(
    map: BTreeMap<(u32, u16), V>,
    shift: impl Fn(u32) -> Option<u32>,
) -> BTreeMap<(u32, u16), V> {
    map.into_iter()
        .filter_map(|((row, col), value)| shift(row).map(|row| ((row, col), value)))
        .collect()
}
