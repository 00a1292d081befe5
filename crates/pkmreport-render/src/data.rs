//! Clinic rows, total row placement and the legend footer
//!
//! The body is written top-down with a [`RowCursor`] threaded through each
//! step: one row per clinic from row 8, the total row one below the cursor,
//! then the legend two rows below that.

use crate::columns::{ColumnMap, Period, PeriodBlock, NAME_COLUMN, NO_COLUMN, TARGET_COLUMN};
use crate::sheet::{CellRange, CellRef, ReportSheet, SheetError};
use crate::style::{HAlign, Palette, StyleBuilder, VAlign};
use crate::total::add_total_row;
use pkmreport_core::{
    ClinicStatRow, Metric, PeriodMetrics, ReportError, ReportRequest, ReportType, StatisticsCalculator,
    DATA_START_ROW,
};
use tracing::debug;

/// Legend lines written under the total row
pub const LEGEND: [&str; 5] = [
    "KETERANGAN:",
    "L = Laki-laki, P = Perempuan",
    "TOTAL = Jumlah penderita yang dilayani",
    "TS = Target Sasaran (jumlah penderita yang mendapat pelayanan sesuai standar)",
    "%S = Persentase Sasaran (TOTAL terhadap SASARAN tahunan)",
];

/// Next row to write in the body.
///
/// Only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowCursor(u32);

impl RowCursor {
    /// Cursor at the first data row
    pub const fn start() -> Self {
        Self(DATA_START_ROW)
    }

    pub const fn at(row: u32) -> Self {
        Self(row)
    }

    pub const fn row(&self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn advance(self, rows: u32) -> Self {
        Self(self.0 + rows)
    }
}

impl Default for RowCursor {
    fn default() -> Self {
        Self::start()
    }
}

/// Where the body ended up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyLayout {
    /// Cursor after the last clinic row, before the total row
    pub data_end: RowCursor,
    /// Row holding the totals
    pub total_row: u32,
    /// First legend row, when a footer was written
    pub footer_row: Option<u32>,
    /// Cursor after everything the body wrote
    pub end: RowCursor,
}

/// Remove every row from `from_row` down.
///
/// Rows are deleted one at a time at `from_row` until nothing remains at or
/// below it. Returns how many rows were removed.
pub fn clear_stale_rows(sheet: &mut ReportSheet, from_row: u32) -> Result<usize, SheetError> {
    let mut remaining = sheet.highest_row().saturating_sub(from_row.saturating_sub(1));
    let mut removed = 0;
    while remaining > 0 && sheet.highest_row() >= from_row {
        sheet.remove_row(from_row)?;
        remaining -= 1;
        removed += 1;
    }
    if removed > 0 {
        debug!(removed, from_row, "cleared stale rows");
    }
    Ok(removed)
}

/// Metrics shown for one block of one clinic; missing data is zero
fn block_metrics(
    block: &PeriodBlock,
    clinic: &ClinicStatRow,
    request: &ReportRequest,
    stats: &dyn StatisticsCalculator,
) -> PeriodMetrics {
    if !request.report_type.uses_statistics() {
        return PeriodMetrics::zero();
    }
    let (year, disease) = (request.year, request.disease);
    match block.period {
        Period::Month(month) => stats.monthly(clinic, month, year, disease),
        Period::Quarter(quarter) => stats.quarterly(clinic, quarter, year, disease),
        Period::Year => stats.yearly(clinic, year, disease),
    }
    .unwrap_or_default()
}

/// Write one clinic at the cursor row
pub fn write_clinic_row(
    sheet: &mut ReportSheet,
    map: &ColumnMap,
    request: &ReportRequest,
    index: usize,
    clinic: &ClinicStatRow,
    stats: &dyn StatisticsCalculator,
    cursor: RowCursor,
) {
    let row = cursor.row();
    sheet.set(CellRef::new(NO_COLUMN, row), index as f64);
    sheet.set(CellRef::new(NAME_COLUMN, row), clinic.name.as_str());
    sheet.set(CellRef::new(TARGET_COLUMN, row), clinic.target);

    for block in map.blocks() {
        let metrics = block_metrics(&block, clinic, request, stats);
        for metric in Metric::ALL {
            sheet.set(CellRef::new(block.column(metric), row), metrics.get(metric));
        }
    }
}

/// Write every clinic from the cursor down, returning the cursor past the last one
pub fn write_clinic_rows(
    sheet: &mut ReportSheet,
    map: &ColumnMap,
    request: &ReportRequest,
    clinics: &[ClinicStatRow],
    stats: &dyn StatisticsCalculator,
    cursor: RowCursor,
) -> RowCursor {
    clinics.iter().enumerate().fold(cursor, |cursor, (i, clinic)| {
        write_clinic_row(sheet, map, request, i + 1, clinic, stats, cursor);
        cursor.advance(1)
    })
}

fn style_data_rows(
    sheet: &mut ReportSheet,
    map: &ColumnMap,
    last_row: u32,
    palette: &Palette,
) -> Result<(), ReportError> {
    let region = CellRange::new(
        CellRef::new(NO_COLUMN, DATA_START_ROW),
        CellRef::new(map.last_column(), last_row),
    );
    let names = CellRange::column_span(NAME_COLUMN, DATA_START_ROW, last_row);

    let mut builder = StyleBuilder::with_policy(sheet, palette.policy)
        .apply_data_cell_style(&region.to_string())
        .set_alignment(&names.to_string(), HAlign::Left, VAlign::Center);
    if map.report_type() != ReportType::Puskesmas {
        for block in map.blocks() {
            let column = block.column(Metric::Percentage);
            let range = CellRange::column_span(column, DATA_START_ROW, last_row);
            builder = builder.set_percentage_format(&range.to_string(), 2);
        }
    }
    builder.finish()?;
    Ok(())
}

/// Write the legend in column A starting at `row`.
///
/// The lines overflow into the empty cells to their right, so they do not
/// widen the auto-sized name column.
pub fn write_footer(sheet: &mut ReportSheet, row: u32, palette: &Palette) -> Result<(), ReportError> {
    for (offset, line) in (0u32..).zip(LEGEND) {
        sheet.set(CellRef::new(NO_COLUMN, row + offset), line);
    }
    let last_row = row + LEGEND.len() as u32 - 1;
    let range = CellRange::column_span(NO_COLUMN, row, last_row);
    StyleBuilder::with_policy(sheet, palette.policy)
        .apply_complete_footer_style(&range.to_string())
        .finish()?;
    Ok(())
}

/// Write the whole body below the header block.
///
/// Clears anything left from an earlier render, writes one row per clinic,
/// the total row and, when `include_footer` is set, the legend.
pub fn build_body(
    sheet: &mut ReportSheet,
    map: &ColumnMap,
    request: &ReportRequest,
    clinics: &[ClinicStatRow],
    stats: &dyn StatisticsCalculator,
    palette: &Palette,
    include_footer: bool,
) -> Result<BodyLayout, ReportError> {
    clear_stale_rows(sheet, DATA_START_ROW)?;

    let data_end = write_clinic_rows(sheet, map, request, clinics, stats, RowCursor::start());
    debug!(clinics = clinics.len(), cursor = data_end.row(), "wrote clinic rows");
    if !clinics.is_empty() {
        style_data_rows(sheet, map, data_end.row() - 1, palette)?;
    }

    let total_row = add_total_row(sheet, map, data_end, palette)?;
    let mut end = data_end.advance(1);

    let footer_row = if include_footer {
        let row = end.row() + 2;
        write_footer(sheet, row, palette)?;
        end = RowCursor::at(row + LEGEND.len() as u32);
        Some(row)
    } else {
        None
    };

    Ok(BodyLayout {
        data_end,
        total_row,
        footer_row,
        end,
    })
}
