//! Excel report renderer
//!
//! Builds one worksheet per export:
//!
//! ```text
//! rows 1-7   header block (title, subtitle, period and category labels)
//! rows 8..   one row per Puskesmas
//! next row   blank, then TOTAL (SUM formulas, %S recomputed from totals)
//! +2 rows    legend
//! ```
//!
//! The sheet is assembled in a [`ReportSheet`] first, so tests can inspect
//! cells and formulas through [`ExcelReportRenderer::build_sheet`] without
//! unpacking the xlsx archive.

use crate::columns::{ColumnMap, NAME_COLUMN, NO_COLUMN, TARGET_COLUMN};
use crate::data::build_body;
use crate::header::{setup_headers, title};
use crate::sheet::{CellRef, ReportSheet};
use crate::style::{Palette, StyleBuilder, StyleFailurePolicy};
use pkmreport_core::{
    ClinicStatRow, ReportConfig, ReportError, ReportRenderer, ReportRequest, StatisticsCalculator,
    DATA_START_ROW,
};
use rust_xlsxwriter::{DocProperties, Workbook};
use tracing::{debug, info};

/// Width of each metric column
const METRIC_COLUMN_WIDTH: f64 = 7.0;

/// Excel report renderer
#[derive(Clone, Debug)]
pub struct ExcelReportRenderer {
    /// Worksheet tab name
    pub sheet_name: String,
    /// Document author property
    pub author: String,
    /// Header block fill
    pub header_color: String,
    /// Total row fill
    pub total_color: String,
    /// Whether to write the legend under the total row
    pub include_footer: bool,
    /// Whether to freeze the identity columns and header rows
    pub freeze_panes: bool,
    /// How styling failures are handled
    pub style_policy: StyleFailurePolicy,
}

impl Default for ExcelReportRenderer {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

impl ExcelReportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer configured from a loaded config file
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            sheet_name: config.sheet_name.clone(),
            author: config.author.clone(),
            header_color: config.header_color.clone(),
            total_color: config.total_color.clone(),
            include_footer: config.include_footer,
            freeze_panes: config.freeze_panes,
            style_policy: if config.strict_styles {
                StyleFailurePolicy::Abort
            } else {
                StyleFailurePolicy::LogAndContinue
            },
        }
    }

    /// Set the worksheet tab name
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Set the document author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the header fill colour (`#RRGGBB`)
    pub fn header_color(mut self, hex: impl Into<String>) -> Self {
        self.header_color = hex.into();
        self
    }

    /// Set the total row fill colour (`#RRGGBB`)
    pub fn total_color(mut self, hex: impl Into<String>) -> Self {
        self.total_color = hex.into();
        self
    }

    /// Leave out the legend
    pub fn no_footer(mut self) -> Self {
        self.include_footer = false;
        self
    }

    /// Do not freeze panes
    pub fn no_freeze(mut self) -> Self {
        self.freeze_panes = false;
        self
    }

    /// Fail the export on the first styling error
    pub fn strict_styles(mut self) -> Self {
        self.style_policy = StyleFailurePolicy::Abort;
        self
    }

    fn palette(&self) -> Palette {
        Palette {
            header_fill: self.header_color.clone(),
            total_fill: self.total_color.clone(),
            policy: self.style_policy,
        }
    }

    /// Assemble the report in memory
    pub fn build_sheet(
        &self,
        request: &ReportRequest,
        clinics: &[ClinicStatRow],
        stats: &dyn StatisticsCalculator,
    ) -> Result<ReportSheet, ReportError> {
        let map = ColumnMap::new(request.report_type);
        let palette = self.palette();
        let mut sheet = ReportSheet::new(self.sheet_name.as_str());

        setup_headers(&mut sheet, &map, request.disease, request.year, &palette)?;
        let layout = build_body(&mut sheet, &map, request, clinics, stats, &palette, self.include_footer)?;
        debug!(total_row = layout.total_row, footer_row = ?layout.footer_row, "body written");

        self.size_columns(&mut sheet, &map, &palette)?;
        if self.freeze_panes {
            sheet.set_freeze_panes(CellRef::new(TARGET_COLUMN.offset(1), DATA_START_ROW));
        }
        Ok(sheet)
    }

    fn size_columns(&self, sheet: &mut ReportSheet, map: &ColumnMap, palette: &Palette) -> Result<(), ReportError> {
        let name = NAME_COLUMN.letters();
        let mut builder = StyleBuilder::with_policy(sheet, palette.policy)
            .set_column_width(&NO_COLUMN.letters(), 5.0)
            .auto_size_columns(&name, &name)
            .set_column_width(&TARGET_COLUMN.letters(), 10.0);
        for block in map.blocks() {
            for column in block.columns {
                builder = builder.set_column_width(&column.letters(), METRIC_COLUMN_WIDTH);
            }
        }
        builder.finish()?;
        Ok(())
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(
        &self,
        request: &ReportRequest,
        clinics: &[ClinicStatRow],
        stats: &dyn StatisticsCalculator,
    ) -> Result<Vec<u8>, ReportError> {
        let sheet = self.build_sheet(request, clinics, stats)?;

        let mut workbook = Workbook::new();
        let properties = DocProperties::new()
            .set_title(&title(request.disease))
            .set_subject(&format!("{} {}", request.report_type.label(), request.year))
            .set_author(&self.author);
        workbook.set_properties(&properties);

        let worksheet = workbook.add_worksheet();
        sheet
            .write_to(worksheet)
            .map_err(|e| ReportError::Format(format!("Failed to write worksheet: {e}")))?;

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| ReportError::Format(format!("Failed to create Excel: {e}")))?;

        info!(
            report_type = %request.report_type,
            disease = %request.disease,
            year = request.year,
            clinics = clinics.len(),
            bytes = buffer.len(),
            "rendered workbook"
        );
        Ok(buffer)
    }
}

impl ReportRenderer for ExcelReportRenderer {
    type Output = Vec<u8>;

    fn render(
        &self,
        request: &ReportRequest,
        clinics: &[ClinicStatRow],
        stats: &dyn StatisticsCalculator,
    ) -> Result<Vec<u8>, ReportError> {
        self.render_to_bytes(request, clinics, stats)
    }
}
