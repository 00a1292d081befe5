//! # pkmreport-render
//!
//! Excel workbook builders for HT/DM Puskesmas reports.
//!
//! This crate provides:
//! - An in-memory worksheet model with row insertion and merge checking
//! - The fixed column layout of every report type
//! - Header, clinic row, total row and legend builders
//! - Chainable styling with an explicit failure policy
//! - The `ExcelReportRenderer`, serializing through `rust_xlsxwriter`
//!
//! ## Example
//!
//! ```rust
//! use pkmreport_core::{
//!     ClinicStatRow, DiseaseType, Month, PeriodMetrics, RecordedStatistics, ReportRenderer,
//!     ReportRequest, ReportType,
//! };
//! use pkmreport_render::ExcelReportRenderer;
//!
//! let clinics = vec![ClinicStatRow::new("Puskesmas Sukajadi", 1200.0).with_month(
//!     Month::new(1).unwrap(),
//!     PeriodMetrics::new(10.0, 5.0, 15.0, 12.0, 1.25),
//! )];
//! let request = ReportRequest::new(DiseaseType::Ht, 2024, ReportType::Monthly);
//! let stats = RecordedStatistics::new(2024, DiseaseType::Ht);
//!
//! let renderer = ExcelReportRenderer::new();
//! let sheet = renderer.build_sheet(&request, &clinics, &stats).unwrap();
//! assert_eq!(sheet.value("D8").and_then(|v| v.as_number()), Some(10.0));
//!
//! let xlsx_bytes = renderer.render(&request, &clinics, &stats).unwrap();
//! assert!(!xlsx_bytes.is_empty());
//! ```

pub mod columns;
pub mod data;
pub mod excel;
pub mod header;
pub mod sheet;
pub mod style;
pub mod total;

pub use columns::{ColumnMap, Period, PeriodBlock};
pub use data::{build_body, BodyLayout, RowCursor};
pub use excel::ExcelReportRenderer;
pub use header::setup_headers;
pub use sheet::{CellRange, CellRef, CellValue, Column, ReportSheet, SheetError};
pub use style::{Palette, StyleBuilder, StyleError, StyleFailurePolicy, StyleOutcome};
pub use total::add_total_row;

use pkmreport_core::ReportError;

impl From<SheetError> for ReportError {
    fn from(error: SheetError) -> Self {
        ReportError::Sheet(error.to_string())
    }
}

impl From<StyleError> for ReportError {
    fn from(error: StyleError) -> Self {
        ReportError::Style(error.to_string())
    }
}
