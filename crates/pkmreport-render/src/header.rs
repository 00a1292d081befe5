//! Header block (rows 1-7)
//!
//! ```text
//! row 1   title, merged across the report width
//! row 2   subtitle (report kind and year)
//! row 4-7 NO | NAMA PUSKESMAS | SASARAN, each merged vertically
//! row 4-5 period labels (month names, TRIWULAN I-IV, TOTAL TAHUN)
//! row 6-7 L | P | TOTAL | TS | %S under every period
//! ```
//!
//! The "all" report needs two label rows: row 4 names the section
//! (BULANAN, TRIWULAN) and row 5 the individual month or quarter.

use crate::columns::{ColumnMap, Period, PeriodBlock, NAME_COLUMN, NO_COLUMN, TARGET_COLUMN};
use crate::sheet::{CellRange, CellRef, Column, ReportSheet, SheetError};
use crate::style::{Palette, StyleBuilder};
use pkmreport_core::{DiseaseType, Metric, ReportError, ReportType};
use tracing::debug;

pub const TITLE_ROW: u32 = 1;
pub const SUBTITLE_ROW: u32 = 2;
pub const HEADER_FIRST_ROW: u32 = 4;
pub const PERIOD_DETAIL_ROW: u32 = 5;
pub const CATEGORY_ROW: u32 = 6;
pub const HEADER_LAST_ROW: u32 = 7;

/// Roman numeral for quarters 1-4; anything else comes back as decimal
pub fn to_roman(number: u32) -> String {
    match number {
        1 => "I".to_string(),
        2 => "II".to_string(),
        3 => "III".to_string(),
        4 => "IV".to_string(),
        other => other.to_string(),
    }
}

/// Label of a period block
pub fn period_label(period: Period, year: i32) -> String {
    match period {
        Period::Month(month) => month.name().to_string(),
        Period::Quarter(quarter) => format!("TRIWULAN {}", to_roman(u32::from(quarter.number()))),
        Period::Year => format!("TOTAL TAHUN {year}"),
    }
}

/// Report title for row 1
pub fn title(disease: DiseaseType) -> String {
    format!("LAPORAN PELAYANAN KESEHATAN PENDERITA {}", disease.label())
}

/// Subtitle for row 2
pub fn subtitle(report_type: ReportType, year: i32) -> String {
    format!("{} TAHUN {year}", report_type.label())
}

fn write_merged(
    sheet: &mut ReportSheet,
    range: CellRange,
    text: impl Into<String>,
) -> Result<(), SheetError> {
    sheet.set(range.first, text.into());
    sheet.merge(range)
}

/// Write the header block for a report.
///
/// Fails with a merge overlap when the sheet already carries a header.
pub fn setup_headers(
    sheet: &mut ReportSheet,
    map: &ColumnMap,
    disease: DiseaseType,
    year: i32,
    palette: &Palette,
) -> Result<(), ReportError> {
    let report_type = map.report_type();
    let last = map.last_column();
    debug!(%report_type, %disease, year, last_column = %last, "writing header block");

    write_merged(sheet, CellRange::row_span(NO_COLUMN, last, TITLE_ROW), title(disease))?;
    write_merged(
        sheet,
        CellRange::row_span(NO_COLUMN, last, SUBTITLE_ROW),
        subtitle(report_type, year),
    )?;

    for (column, label) in [
        (NO_COLUMN, "NO"),
        (NAME_COLUMN, "NAMA PUSKESMAS"),
        (TARGET_COLUMN, "SASARAN"),
    ] {
        write_merged(
            sheet,
            CellRange::column_span(column, HEADER_FIRST_ROW, HEADER_LAST_ROW),
            label,
        )?;
    }

    let blocks = map.blocks();
    match report_type {
        ReportType::All => write_sectioned_period_labels(sheet, &blocks, year)?,
        ReportType::Monthly | ReportType::Quarterly | ReportType::Puskesmas => {
            for block in &blocks {
                write_merged(
                    sheet,
                    block_label_range(block, HEADER_FIRST_ROW),
                    period_label(block.period, year),
                )?;
            }
        }
    }

    for block in &blocks {
        write_category_labels(sheet, block)?;
    }

    let header_range = CellRange::new(
        CellRef::new(NO_COLUMN, HEADER_FIRST_ROW),
        CellRef::new(last, HEADER_LAST_ROW),
    );
    let title_range = CellRange::new(CellRef::new(NO_COLUMN, TITLE_ROW), CellRef::new(last, SUBTITLE_ROW));
    StyleBuilder::with_policy(sheet, palette.policy)
        .set_title_style(&title_range.to_string())
        .set_row_height(TITLE_ROW, 24.0)
        .apply_complete_header_style(&header_range.to_string(), &palette.header_fill)
        .set_row_height(HEADER_FIRST_ROW, 20.0)
        .set_row_height(PERIOD_DETAIL_ROW, 20.0)
        .finish()?;

    Ok(())
}

/// Label merged over the block's five columns from `top_row` down to row 5
fn block_label_range(block: &PeriodBlock, top_row: u32) -> CellRange {
    CellRange::new(
        CellRef::new(block.first(), top_row),
        CellRef::new(block.last(), PERIOD_DETAIL_ROW),
    )
}

fn write_sectioned_period_labels(
    sheet: &mut ReportSheet,
    blocks: &[PeriodBlock],
    year: i32,
) -> Result<(), SheetError> {
    let section = |wanted: fn(&Period) -> bool| -> Option<(Column, Column)> {
        let mut selected = blocks.iter().filter(|b| wanted(&b.period));
        let first = selected.next()?;
        let last = selected.last().unwrap_or(first);
        Some((first.first(), last.last()))
    };

    let months = section(|p| matches!(p, Period::Month(_)));
    let quarters = section(|p| matches!(p, Period::Quarter(_)));
    for (span, label) in [(months, "BULANAN"), (quarters, "TRIWULAN")] {
        if let Some((first, last)) = span {
            write_merged(sheet, CellRange::row_span(first, last, HEADER_FIRST_ROW), label)?;
        }
    }

    for block in blocks {
        let top_row = match block.period {
            Period::Year => HEADER_FIRST_ROW,
            Period::Month(_) | Period::Quarter(_) => PERIOD_DETAIL_ROW,
        };
        write_merged(sheet, block_label_range(block, top_row), period_label(block.period, year))?;
    }
    Ok(())
}

fn write_category_labels(sheet: &mut ReportSheet, block: &PeriodBlock) -> Result<(), SheetError> {
    for metric in Metric::ALL {
        let column = block.column(metric);
        write_merged(
            sheet,
            CellRange::column_span(column, CATEGORY_ROW, HEADER_LAST_ROW),
            metric.label(),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header_sheet(report_type: ReportType) -> ReportSheet {
        let mut sheet = ReportSheet::new("t");
        setup_headers(
            &mut sheet,
            &ColumnMap::new(report_type),
            DiseaseType::Ht,
            2024,
            &Palette::default(),
        )
        .unwrap();
        sheet
    }

    fn text<'a>(sheet: &'a ReportSheet, cell: &str) -> Option<&'a str> {
        sheet.value(cell).and_then(|v| v.as_text())
    }

    fn merged(sheet: &ReportSheet, range: &str) -> bool {
        sheet.merges().contains(&CellRange::parse(range).unwrap())
    }

    #[test]
    fn roman_numerals() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(5), "5");
        assert_eq!(to_roman(0), "0");
    }

    #[test]
    fn title_and_identity_columns() {
        let sheet = header_sheet(ReportType::Monthly);
        assert_eq!(text(&sheet, "A1"), Some("LAPORAN PELAYANAN KESEHATAN PENDERITA HIPERTENSI"));
        assert_eq!(text(&sheet, "A2"), Some("REKAPITULASI BULANAN TAHUN 2024"));
        assert!(merged(&sheet, "A1:BK1"));
        assert!(merged(&sheet, "A4:A7"));
        assert!(merged(&sheet, "B4:B7"));
        assert_eq!(text(&sheet, "C4"), Some("SASARAN"));
    }

    #[test]
    fn monthly_period_and_category_labels() {
        let sheet = header_sheet(ReportType::Monthly);
        assert_eq!(text(&sheet, "D4"), Some("JANUARI"));
        assert!(merged(&sheet, "D4:H5"));
        assert_eq!(text(&sheet, "BG4"), Some("DESEMBER"));
        assert_eq!(text(&sheet, "D6"), Some("L"));
        assert_eq!(text(&sheet, "H6"), Some("%S"));
        assert!(merged(&sheet, "F6:F7"));
        assert_eq!(sheet.highest_column(), Some(map_last(ReportType::Monthly)));
    }

    #[test]
    fn quarterly_labels() {
        let sheet = header_sheet(ReportType::Quarterly);
        assert_eq!(text(&sheet, "D4"), Some("TRIWULAN I"));
        assert_eq!(text(&sheet, "S4"), Some("TRIWULAN IV"));
        assert_eq!(text(&sheet, "X4"), Some("TOTAL TAHUN 2024"));
        assert!(merged(&sheet, "X4:AB5"));
        assert_eq!(sheet.highest_column(), Some(map_last(ReportType::Quarterly)));
    }

    #[test]
    fn all_report_has_section_row() {
        let sheet = header_sheet(ReportType::All);
        assert_eq!(text(&sheet, "D4"), Some("BULANAN"));
        assert!(merged(&sheet, "D4:BK4"));
        assert_eq!(text(&sheet, "D5"), Some("JANUARI"));
        assert!(merged(&sheet, "D5:H5"));
        assert_eq!(text(&sheet, "BL4"), Some("TRIWULAN"));
        assert_eq!(text(&sheet, "BL5"), Some("TRIWULAN I"));
        assert_eq!(text(&sheet, "CF4"), Some("TOTAL TAHUN 2024"));
        assert!(merged(&sheet, "CF4:CJ5"));
        assert_eq!(text(&sheet, "CJ6"), Some("%S"));
        assert_eq!(sheet.highest_column(), Some(map_last(ReportType::All)));
    }

    #[test]
    fn header_is_styled() {
        let sheet = header_sheet(ReportType::Quarterly);
        let style = sheet.style(CellRef::parse("AB7").unwrap()).unwrap();
        assert!(style.bold);
        assert_eq!(style.fill, Some(0xD9E1F2));
        assert_eq!(sheet.row_height(TITLE_ROW), Some(24.0));
    }

    #[test]
    fn second_setup_fails_with_overlap() {
        let mut sheet = header_sheet(ReportType::Monthly);
        let err = setup_headers(
            &mut sheet,
            &ColumnMap::new(ReportType::Monthly),
            DiseaseType::Ht,
            2024,
            &Palette::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Sheet(_)));
    }

    fn map_last(report_type: ReportType) -> Column {
        ColumnMap::new(report_type).last_column()
    }
}
