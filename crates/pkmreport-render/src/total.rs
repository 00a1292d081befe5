//! Total row
//!
//! The total row holds spreadsheet formulas rather than values computed
//! here, so a workbook stays consistent when a reader edits a data cell.
//! Percentages are recomputed from the summed totals and the summed target
//! (`IF(target>0, ROUND(total/target*100, 2), 0)`) instead of being summed.

use crate::columns::{ColumnMap, NAME_COLUMN, NO_COLUMN, TARGET_COLUMN};
use crate::data::RowCursor;
use crate::sheet::{CellRange, CellRef, CellValue, Column, ReportSheet};
use crate::style::{Palette, StyleBuilder};
use pkmreport_core::{Metric, ReportError, ReportType, DATA_START_ROW};
use tracing::debug;

/// `=SUM(<col>8:<col><last_row>)`
pub fn sum_formula(column: Column, last_row: u32) -> String {
    format!("=SUM({column}{DATA_START_ROW}:{column}{last_row})")
}

/// Percentage of the target served, guarded against a zero target
pub fn percentage_formula(total_column: Column, target_column: Column, row: u32) -> String {
    format!(
        "=IF({target_column}{row}>0, ROUND(({total_column}{row}/{target_column}{row})*100,2), 0)"
    )
}

/// Insert the total row one below `cursor` and fill it.
///
/// The row is inserted rather than overwritten, so anything already below
/// it moves down by one. Returns the total row number.
pub fn add_total_row(
    sheet: &mut ReportSheet,
    map: &ColumnMap,
    cursor: RowCursor,
    palette: &Palette,
) -> Result<u32, ReportError> {
    let total_row = cursor.row() + 1;
    let last_data_row = total_row - 1;
    let report_type = map.report_type();
    debug!(%report_type, total_row, "adding total row");

    sheet.insert_row(total_row)?;
    sheet.set(CellRef::new(NAME_COLUMN, total_row), "TOTAL");

    match report_type {
        ReportType::Puskesmas => {
            sheet.set(CellRef::new(TARGET_COLUMN, total_row), 0.0);
            for block in map.blocks() {
                for column in block.columns {
                    sheet.set(CellRef::new(column, total_row), 0.0);
                }
            }
        }
        ReportType::All | ReportType::Monthly | ReportType::Quarterly => {
            sheet.set(
                CellRef::new(TARGET_COLUMN, total_row),
                CellValue::formula(sum_formula(TARGET_COLUMN, last_data_row)),
            );
            for block in map.blocks() {
                for metric in Metric::ALL {
                    let formula = if metric.is_summable() {
                        sum_formula(block.column(metric), last_data_row)
                    } else {
                        percentage_formula(block.column(Metric::Total), TARGET_COLUMN, total_row)
                    };
                    sheet.set(CellRef::new(block.column(metric), total_row), CellValue::formula(formula));
                }
            }
        }
    }

    let range = CellRange::row_span(NO_COLUMN, map.last_column(), total_row);
    let mut builder = StyleBuilder::with_policy(sheet, palette.policy)
        .apply_total_row_style(&range.to_string(), &palette.total_fill);
    if report_type != ReportType::Puskesmas {
        for block in map.blocks() {
            let cell = CellRef::new(block.column(Metric::Percentage), total_row);
            builder = builder.set_percentage_format(&cell.to_string(), 2);
        }
    }
    builder.finish()?;

    Ok(total_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::BorderStyle;
    use pretty_assertions::assert_eq;

    fn formula<'a>(sheet: &'a ReportSheet, cell: &str) -> &'a str {
        sheet.value(cell).and_then(CellValue::as_formula).unwrap()
    }

    #[test]
    fn formula_text() {
        let d = Column::from_letters("D");
        assert_eq!(sum_formula(d, 10), "=SUM(D8:D10)");
        assert_eq!(
            percentage_formula(Column::from_letters("F"), Column::C, 11),
            "=IF(C11>0, ROUND((F11/C11)*100,2), 0)"
        );
    }

    #[test]
    fn total_row_sits_one_below_cursor() {
        let mut sheet = ReportSheet::new("t");
        let map = ColumnMap::new(ReportType::Quarterly);
        let total_row = add_total_row(&mut sheet, &map, RowCursor::at(10), &Palette::default()).unwrap();

        assert_eq!(total_row, 11);
        assert_eq!(sheet.value("B11").and_then(CellValue::as_text), Some("TOTAL"));
        assert_eq!(formula(&sheet, "C11"), "=SUM(C8:C10)");
        assert_eq!(formula(&sheet, "D11"), "=SUM(D8:D10)");
        assert_eq!(formula(&sheet, "G11"), "=SUM(G8:G10)");
        assert_eq!(formula(&sheet, "H11"), "=IF(C11>0, ROUND((F11/C11)*100,2), 0)");
        assert_eq!(formula(&sheet, "AB11"), "=IF(C11>0, ROUND((Z11/C11)*100,2), 0)");
        assert_eq!(sheet.row_height(11), Some(28.0));
    }

    #[test]
    fn total_percentages_share_data_format() {
        let mut sheet = ReportSheet::new("t");
        let map = ColumnMap::new(ReportType::Quarterly);
        add_total_row(&mut sheet, &map, RowCursor::at(10), &Palette::default()).unwrap();

        let format = |cell: &str| {
            sheet
                .style(CellRef::parse(cell).unwrap())
                .and_then(|s| s.num_format.clone())
        };
        for block in map.blocks() {
            let cell = CellRef::new(block.column(Metric::Percentage), 11).to_string();
            assert_eq!(format(&cell).as_deref(), Some("0.00\"%\""), "{cell}");
        }
        assert_eq!(format("F11"), None);
    }

    #[test]
    fn bad_total_fill_keeps_bold_borders_and_height() {
        let mut sheet = ReportSheet::new("t");
        let map = ColumnMap::new(ReportType::Quarterly);
        let palette = Palette {
            total_fill: "teal".into(),
            ..Palette::default()
        };
        add_total_row(&mut sheet, &map, RowCursor::at(10), &palette).unwrap();

        let style = sheet.style(CellRef::parse("D11").unwrap()).unwrap();
        assert!(style.bold);
        assert_eq!(style.fill, None);
        assert_eq!(style.borders.bottom, Some(BorderStyle::Thin));
        assert_eq!(sheet.row_height(11), Some(28.0));
    }

    #[test]
    fn empty_data_sums_row_eight_only() {
        let mut sheet = ReportSheet::new("t");
        let map = ColumnMap::new(ReportType::Monthly);
        let total_row = add_total_row(&mut sheet, &map, RowCursor::start(), &Palette::default()).unwrap();

        assert_eq!(total_row, 9);
        assert_eq!(formula(&sheet, "C9"), "=SUM(C8:C8)");
        assert_eq!(formula(&sheet, "BJ9"), "=SUM(BJ8:BJ8)");
    }

    #[test]
    fn insertion_shifts_rows_below() {
        let mut sheet = ReportSheet::new("t");
        sheet.set(CellRef::parse("B9").unwrap(), "legend");
        let map = ColumnMap::new(ReportType::Monthly);
        add_total_row(&mut sheet, &map, RowCursor::start(), &Palette::default()).unwrap();
        assert_eq!(sheet.value("B10").and_then(CellValue::as_text), Some("legend"));
    }

    #[test]
    fn template_total_row_is_literal_zeros() {
        let mut sheet = ReportSheet::new("t");
        let map = ColumnMap::new(ReportType::Puskesmas);
        let total_row = add_total_row(&mut sheet, &map, RowCursor::at(9), &Palette::default()).unwrap();

        assert_eq!(total_row, 10);
        assert_eq!(sheet.value("C10"), Some(&CellValue::Number(0.0)));
        for block in map.blocks() {
            for column in block.columns {
                assert_eq!(sheet.get(CellRef::new(column, 10)), Some(&CellValue::Number(0.0)));
            }
        }
        let h10 = sheet.style(CellRef::parse("H10").unwrap()).unwrap();
        assert_eq!(h10.num_format, None);
    }
}
