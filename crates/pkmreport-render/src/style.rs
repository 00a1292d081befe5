//! Cell styling
//!
//! Every styling operation exists twice:
//!
//! - a free `try_*` function returning `Result<_, StyleError>`, for callers
//!   that want to handle one failure themselves;
//! - a chainable [`StyleBuilder`] method that runs the same function and
//!   hands failures to an explicit [`StyleFailurePolicy`].
//!
//! With [`StyleFailurePolicy::LogAndContinue`] a malformed range or colour is
//! logged and skipped, so one bad call never aborts a large export. With
//! [`StyleFailurePolicy::Abort`] the first failure stops the chain and is
//! returned from [`StyleBuilder::finish`].
//!
//! Styles overwrite attributes rather than accumulate them: applying the
//! same operation twice leaves the sheet as applying it once.
//!
//! ## Example
//!
//! ```rust
//! use pkmreport_render::sheet::ReportSheet;
//! use pkmreport_render::style::{BorderStyle, StyleBuilder};
//!
//! let mut sheet = ReportSheet::new("Laporan");
//! let outcome = StyleBuilder::new(&mut sheet)
//!     .set_header_style("A4:C7", 11.0)
//!     .set_background_color("A4:C7", "#D9E1F2")
//!     .set_borders("A4:C7", BorderStyle::Thin)
//!     .set_background_color("A4:C7", "not-a-colour")
//!     .finish()
//!     .unwrap();
//! assert_eq!(outcome.applied.len(), 3);
//! assert_eq!(outcome.failures.len(), 1);
//! ```

use crate::sheet::{CellRange, Column, ReportSheet, SheetError};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern};
use thiserror::Error;
use tracing::warn;

const BLACK: u32 = 0x000000;
const WHITE: u32 = 0xFFFFFF;

/// Styling error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("Invalid colour '{0}' (expected #RRGGBB)")]
    InvalidColor(String),

    #[error("Invalid {what}: {value}")]
    InvalidValue { what: &'static str, value: f64 },
}

// ============================================================================
// Style attributes
// ============================================================================

/// Border line style
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    None,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
}

impl From<BorderStyle> for FormatBorder {
    fn from(style: BorderStyle) -> Self {
        match style {
            BorderStyle::None => FormatBorder::None,
            BorderStyle::Thin => FormatBorder::Thin,
            BorderStyle::Medium => FormatBorder::Medium,
            BorderStyle::Thick => FormatBorder::Thick,
            BorderStyle::Dashed => FormatBorder::Dashed,
            BorderStyle::Dotted => FormatBorder::Dotted,
            BorderStyle::Double => FormatBorder::Double,
        }
    }
}

/// Horizontal alignment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical alignment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Borders of one cell
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Borders {
    pub top: Option<BorderStyle>,
    pub bottom: Option<BorderStyle>,
    pub left: Option<BorderStyle>,
    pub right: Option<BorderStyle>,
    pub color: Option<u32>,
}

/// Visual attributes of one cell; `None` leaves the writer's default
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub font_size: Option<f64>,
    pub font_color: Option<u32>,
    pub fill: Option<u32>,
    pub borders: Borders,
    pub h_align: Option<HAlign>,
    pub v_align: Option<VAlign>,
    pub wrap: bool,
    pub num_format: Option<String>,
}

impl CellStyle {
    /// Build the `rust_xlsxwriter` format for this style
    pub fn to_format(&self) -> Format {
        let mut format = Format::new();
        if self.bold {
            format = format.set_bold();
        }
        if self.italic {
            format = format.set_italic();
        }
        if let Some(size) = self.font_size {
            format = format.set_font_size(size);
        }
        if let Some(color) = self.font_color {
            format = format.set_font_color(Color::RGB(color));
        }
        if let Some(fill) = self.fill {
            format = format
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(fill));
        }

        let borders = &self.borders;
        if let Some(top) = borders.top {
            format = format.set_border_top(top.into());
        }
        if let Some(bottom) = borders.bottom {
            format = format.set_border_bottom(bottom.into());
        }
        if let Some(left) = borders.left {
            format = format.set_border_left(left.into());
        }
        if let Some(right) = borders.right {
            format = format.set_border_right(right.into());
        }
        if let Some(color) = borders.color {
            format = format.set_border_color(Color::RGB(color));
        }

        if let Some(align) = self.h_align {
            format = format.set_align(match align {
                HAlign::Left => FormatAlign::Left,
                HAlign::Center => FormatAlign::Center,
                HAlign::Right => FormatAlign::Right,
            });
        }
        if let Some(align) = self.v_align {
            format = format.set_align(match align {
                VAlign::Top => FormatAlign::Top,
                VAlign::Center => FormatAlign::VerticalCenter,
                VAlign::Bottom => FormatAlign::Bottom,
            });
        }
        if self.wrap {
            format = format.set_text_wrap();
        }
        if let Some(num_format) = &self.num_format {
            format = format.set_num_format(num_format);
        }
        format
    }
}

/// Parse `#RRGGBB` or `RRGGBB` into an RGB value
pub fn parse_color(hex: &str) -> Result<u32, StyleError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StyleError::InvalidColor(hex.to_string()));
    }
    u32::from_str_radix(digits, 16).map_err(|_| StyleError::InvalidColor(hex.to_string()))
}

fn positive(what: &'static str, value: f64) -> Result<f64, StyleError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(StyleError::InvalidValue { what, value })
    }
}

// ============================================================================
// Fallible operations
// ============================================================================

/// Parse `range` and apply `update` to every cell in it
pub fn try_style(
    sheet: &mut ReportSheet,
    range: &str,
    update: impl FnMut(&mut CellStyle),
) -> Result<CellRange, StyleError> {
    let parsed = CellRange::parse(range)?;
    sheet.style_range(parsed, update);
    Ok(parsed)
}

pub fn try_header_style(sheet: &mut ReportSheet, range: &str, font_size: f64) -> Result<(), StyleError> {
    let size = positive("font size", font_size)?;
    try_style(sheet, range, |s| {
        s.bold = true;
        s.font_size = Some(size);
        s.h_align = Some(HAlign::Center);
        s.v_align = Some(VAlign::Center);
        s.wrap = true;
    })?;
    Ok(())
}

pub fn try_title_style(sheet: &mut ReportSheet, range: &str) -> Result<(), StyleError> {
    try_style(sheet, range, |s| {
        s.bold = true;
        s.font_size = Some(14.0);
        s.h_align = Some(HAlign::Center);
        s.v_align = Some(VAlign::Center);
    })?;
    Ok(())
}

pub fn try_footer_style(sheet: &mut ReportSheet, range: &str) -> Result<(), StyleError> {
    try_style(sheet, range, |s| {
        s.italic = true;
        s.font_size = Some(9.0);
        s.h_align = Some(HAlign::Left);
    })?;
    Ok(())
}

pub fn try_background_color(sheet: &mut ReportSheet, range: &str, hex: &str) -> Result<(), StyleError> {
    let color = parse_color(hex)?;
    try_style(sheet, range, |s| s.fill = Some(color))?;
    Ok(())
}

/// Border on every side of every cell
pub fn try_borders(sheet: &mut ReportSheet, range: &str, style: BorderStyle) -> Result<(), StyleError> {
    try_style(sheet, range, |s| {
        s.borders = Borders {
            top: Some(style),
            bottom: Some(style),
            left: Some(style),
            right: Some(style),
            color: Some(BLACK),
        };
    })?;
    Ok(())
}

/// Border around the outside of the range only
pub fn try_outline_borders(sheet: &mut ReportSheet, range: &str, style: BorderStyle) -> Result<(), StyleError> {
    let parsed = CellRange::parse(range)?;
    sheet.style_range_edges(parsed, |s, (top, bottom, left, right)| {
        if top {
            s.borders.top = Some(style);
        }
        if bottom {
            s.borders.bottom = Some(style);
        }
        if left {
            s.borders.left = Some(style);
        }
        if right {
            s.borders.right = Some(style);
        }
        s.borders.color = Some(BLACK);
    });
    Ok(())
}

pub fn try_alignment(
    sheet: &mut ReportSheet,
    range: &str,
    horizontal: HAlign,
    vertical: VAlign,
) -> Result<(), StyleError> {
    try_style(sheet, range, |s| {
        s.h_align = Some(horizontal);
        s.v_align = Some(vertical);
    })?;
    Ok(())
}

pub fn try_text_wrap(sheet: &mut ReportSheet, range: &str) -> Result<(), StyleError> {
    try_style(sheet, range, |s| s.wrap = true)?;
    Ok(())
}

/// Fit each column in `start..=end` to its widest unmerged value
pub fn try_auto_size_columns(sheet: &mut ReportSheet, start: &str, end: &str) -> Result<(), StyleError> {
    let first = Column::parse(start)?;
    let last = Column::parse(end)?;
    for index in first.index().min(last.index())..=first.index().max(last.index()) {
        let column = Column::new(index);
        let width = (sheet.content_width(column) + 2).clamp(6, 60);
        sheet.set_column_width(column, width as f64);
    }
    Ok(())
}

pub fn try_column_width(sheet: &mut ReportSheet, column: &str, width: f64) -> Result<(), StyleError> {
    let column = Column::parse(column)?;
    sheet.set_column_width(column, positive("column width", width)?);
    Ok(())
}

pub fn try_row_height(sheet: &mut ReportSheet, row: u32, height: f64) -> Result<(), StyleError> {
    if row == 0 {
        return Err(SheetError::RowOutOfRange(row).into());
    }
    sheet.set_row_height(row, positive("row height", height)?);
    Ok(())
}

pub fn try_merge_cells(sheet: &mut ReportSheet, range: &str) -> Result<(), StyleError> {
    sheet.merge(CellRange::parse(range)?)?;
    Ok(())
}

pub fn try_number_format(sheet: &mut ReportSheet, range: &str, format: &str) -> Result<(), StyleError> {
    try_style(sheet, range, |s| s.num_format = Some(format.to_string()))?;
    Ok(())
}

/// Percentages are stored as 0-100 values, so the `%` is a literal suffix
pub fn try_percentage_format(sheet: &mut ReportSheet, range: &str, decimals: u8) -> Result<(), StyleError> {
    if decimals > 10 {
        return Err(StyleError::InvalidValue {
            what: "decimal places",
            value: f64::from(decimals),
        });
    }
    let format = if decimals == 0 {
        "0\"%\"".to_string()
    } else {
        format!("0.{}\"%\"", "0".repeat(usize::from(decimals)))
    };
    try_number_format(sheet, range, &format)
}

// ============================================================================
// Builder
// ============================================================================

/// What to do when a styling operation fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StyleFailurePolicy {
    /// Log a warning, record the failure and keep applying later operations
    #[default]
    LogAndContinue,
    /// Stop at the first failure and return it from `finish`
    Abort,
}

/// A styling operation that failed under `LogAndContinue`
#[derive(Clone, Debug, PartialEq)]
pub struct StyleFailure {
    pub operation: String,
    pub error: StyleError,
}

/// Result of a styling chain
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleOutcome {
    /// Descriptions of the operations that were applied, in order
    pub applied: Vec<String>,
    /// Operations that failed and were skipped
    pub failures: Vec<StyleFailure>,
}

/// Fill colours and failure policy shared by the report builders
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub header_fill: String,
    pub total_fill: String,
    pub policy: StyleFailurePolicy,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            header_fill: "#D9E1F2".into(),
            total_fill: "#2E86AB".into(),
            policy: StyleFailurePolicy::LogAndContinue,
        }
    }
}

/// Chainable styling over one sheet
pub struct StyleBuilder<'s> {
    sheet: &'s mut ReportSheet,
    policy: StyleFailurePolicy,
    applied: Vec<String>,
    failures: Vec<StyleFailure>,
    aborted: Option<StyleError>,
}

impl<'s> StyleBuilder<'s> {
    pub fn new(sheet: &'s mut ReportSheet) -> Self {
        Self::with_policy(sheet, StyleFailurePolicy::default())
    }

    pub fn with_policy(sheet: &'s mut ReportSheet, policy: StyleFailurePolicy) -> Self {
        Self {
            sheet,
            policy,
            applied: Vec::new(),
            failures: Vec::new(),
            aborted: None,
        }
    }

    /// Operations applied so far
    pub fn log(&self) -> &[String] {
        &self.applied
    }

    /// Failures recorded so far
    pub fn failures(&self) -> &[StyleFailure] {
        &self.failures
    }

    /// End the chain
    pub fn finish(self) -> Result<StyleOutcome, StyleError> {
        match self.aborted {
            Some(error) => Err(error),
            None => Ok(StyleOutcome {
                applied: self.applied,
                failures: self.failures,
            }),
        }
    }

    fn run(
        mut self,
        operation: String,
        apply: impl FnOnce(&mut ReportSheet) -> Result<(), StyleError>,
    ) -> Self {
        if self.aborted.is_some() {
            return self;
        }
        match apply(&mut *self.sheet) {
            Ok(()) => self.applied.push(operation),
            Err(error) => match self.policy {
                StyleFailurePolicy::LogAndContinue => {
                    warn!(%operation, %error, "style operation skipped");
                    self.failures.push(StyleFailure { operation, error });
                }
                StyleFailurePolicy::Abort => self.aborted = Some(error),
            },
        }
        self
    }

    pub fn set_header_style(self, range: &str, font_size: f64) -> Self {
        self.run(format!("header style {range} ({font_size}pt)"), |sheet| {
            try_header_style(sheet, range, font_size)
        })
    }

    pub fn set_title_style(self, range: &str) -> Self {
        self.run(format!("title style {range}"), |sheet| try_title_style(sheet, range))
    }

    pub fn set_footer_style(self, range: &str) -> Self {
        self.run(format!("footer style {range}"), |sheet| try_footer_style(sheet, range))
    }

    pub fn set_background_color(self, range: &str, hex: &str) -> Self {
        self.run(format!("background {hex} on {range}"), |sheet| {
            try_background_color(sheet, range, hex)
        })
    }

    pub fn set_borders(self, range: &str, style: BorderStyle) -> Self {
        self.run(format!("{style:?} borders on {range}"), |sheet| try_borders(sheet, range, style))
    }

    pub fn set_outline_borders(self, range: &str, style: BorderStyle) -> Self {
        self.run(format!("{style:?} outline on {range}"), |sheet| {
            try_outline_borders(sheet, range, style)
        })
    }

    pub fn set_alignment(self, range: &str, horizontal: HAlign, vertical: VAlign) -> Self {
        self.run(format!("align {horizontal:?}/{vertical:?} on {range}"), |sheet| {
            try_alignment(sheet, range, horizontal, vertical)
        })
    }

    pub fn set_text_wrap(self, range: &str) -> Self {
        self.run(format!("wrap text on {range}"), |sheet| try_text_wrap(sheet, range))
    }

    pub fn auto_size_columns(self, start: &str, end: &str) -> Self {
        self.run(format!("auto-size columns {start}:{end}"), |sheet| {
            try_auto_size_columns(sheet, start, end)
        })
    }

    pub fn set_column_width(self, column: &str, width: f64) -> Self {
        self.run(format!("column {column} width {width}"), |sheet| {
            try_column_width(sheet, column, width)
        })
    }

    pub fn set_row_height(self, row: u32, height: f64) -> Self {
        self.run(format!("row {row} height {height}"), |sheet| try_row_height(sheet, row, height))
    }

    pub fn merge_cells(self, range: &str) -> Self {
        self.run(format!("merge {range}"), |sheet| try_merge_cells(sheet, range))
    }

    pub fn set_number_format(self, range: &str, format: &str) -> Self {
        self.run(format!("number format '{format}' on {range}"), |sheet| {
            try_number_format(sheet, range, format)
        })
    }

    pub fn set_percentage_format(self, range: &str, decimals: u8) -> Self {
        self.run(format!("percentage format ({decimals} dp) on {range}"), |sheet| {
            try_percentage_format(sheet, range, decimals)
        })
    }

    /// Header font, fill, thin borders and centring.
    ///
    /// Each part is its own operation, so a bad colour only loses the fill.
    pub fn apply_complete_header_style(self, range: &str, hex: &str) -> Self {
        self.set_header_style(range, 10.0)
            .set_background_color(range, hex)
            .set_borders(range, BorderStyle::Thin)
            .set_alignment(range, HAlign::Center, VAlign::Center)
    }

    /// Bold white 10pt on `hex`, thin black borders, centred, row height 28
    pub fn apply_total_row_style(self, range: &str, hex: &str) -> Self {
        self.run(format!("total row font {range}"), |sheet| {
            try_style(sheet, range, |s| {
                s.bold = true;
                s.font_size = Some(10.0);
                s.font_color = Some(WHITE);
            })?;
            Ok(())
        })
        .set_background_color(range, hex)
        .set_borders(range, BorderStyle::Thin)
        .set_alignment(range, HAlign::Center, VAlign::Center)
        .run(format!("total row height {range}"), |sheet| {
            let parsed = CellRange::parse(range)?;
            for row in parsed.first.row..=parsed.last.row {
                try_row_height(sheet, row, 28.0)?;
            }
            Ok(())
        })
    }

    /// Thin borders and centred 10pt values
    pub fn apply_data_cell_style(self, range: &str) -> Self {
        self.run(format!("data font {range}"), |sheet| {
            try_style(sheet, range, |s| s.font_size = Some(10.0))?;
            Ok(())
        })
        .set_borders(range, BorderStyle::Thin)
        .set_alignment(range, HAlign::Center, VAlign::Center)
    }

    pub fn apply_complete_footer_style(self, range: &str) -> Self {
        self.set_footer_style(range)
            .run(format!("clear footer decoration {range}"), |sheet| {
                try_style(sheet, range, |s| {
                    s.borders = Borders::default();
                    s.fill = None;
                    s.wrap = false;
                })?;
                Ok(())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellRef;
    use pretty_assertions::assert_eq;

    fn style_at<'a>(sheet: &'a ReportSheet, cell: &str) -> &'a CellStyle {
        sheet.style(CellRef::parse(cell).unwrap()).unwrap()
    }

    #[test]
    fn parse_color_accepts_hash_and_bare() {
        assert_eq!(parse_color("#2E86AB").unwrap(), 0x2E86AB);
        assert_eq!(parse_color("ffffff").unwrap(), 0xFFFFFF);
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#GGGGGG").is_err());
    }

    #[test]
    fn set_borders_twice_equals_once() {
        let mut once = ReportSheet::new("a");
        StyleBuilder::new(&mut once).set_borders("A1:C3", BorderStyle::Thin);
        let mut twice = ReportSheet::new("b");
        StyleBuilder::new(&mut twice)
            .set_borders("A1:C3", BorderStyle::Thin)
            .set_borders("A1:C3", BorderStyle::Thin);

        for cell in CellRange::parse("A1:C3").unwrap().cells() {
            assert_eq!(once.style(cell), twice.style(cell));
        }
    }

    #[test]
    fn failures_are_logged_and_chain_continues() {
        let mut sheet = ReportSheet::new("t");
        let outcome = StyleBuilder::new(&mut sheet)
            .set_borders("not a range", BorderStyle::Thin)
            .set_background_color("A1", "#zzzzzz")
            .set_text_wrap("B2")
            .finish()
            .unwrap();

        assert_eq!(outcome.applied, vec!["wrap text on B2".to_string()]);
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(outcome.failures[1].error, StyleError::InvalidColor(_)));
        assert!(style_at(&sheet, "B2").wrap);
    }

    #[test]
    fn abort_policy_stops_at_first_failure() {
        let mut sheet = ReportSheet::new("t");
        let result = StyleBuilder::with_policy(&mut sheet, StyleFailurePolicy::Abort)
            .set_column_width("B", -1.0)
            .set_text_wrap("B2")
            .finish();

        assert!(matches!(result, Err(StyleError::InvalidValue { what: "column width", .. })));
        assert!(sheet.style(CellRef::parse("B2").unwrap()).is_none());
    }

    #[test]
    fn outline_only_touches_edges() {
        let mut sheet = ReportSheet::new("t");
        StyleBuilder::new(&mut sheet).set_outline_borders("A1:C3", BorderStyle::Medium);

        let corner = style_at(&sheet, "A1");
        assert_eq!(corner.borders.top, Some(BorderStyle::Medium));
        assert_eq!(corner.borders.left, Some(BorderStyle::Medium));
        assert_eq!(corner.borders.right, None);
        let middle = style_at(&sheet, "B2");
        assert_eq!(middle.borders.top, None);
        assert_eq!(middle.borders.bottom, None);
    }

    #[test]
    fn total_row_style_attributes() {
        let mut sheet = ReportSheet::new("t");
        StyleBuilder::new(&mut sheet)
            .apply_total_row_style("A11:AB11", "#2E86AB")
            .finish()
            .unwrap();

        let style = style_at(&sheet, "D11");
        assert!(style.bold);
        assert_eq!(style.font_size, Some(10.0));
        assert_eq!(style.font_color, Some(0xFFFFFF));
        assert_eq!(style.fill, Some(0x2E86AB));
        assert_eq!(style.borders.left, Some(BorderStyle::Thin));
        assert_eq!(style.h_align, Some(HAlign::Center));
        assert_eq!(sheet.row_height(11), Some(28.0));
    }

    #[test]
    fn bad_total_fill_keeps_rest_of_total_style() {
        let mut sheet = ReportSheet::new("t");
        let outcome = StyleBuilder::new(&mut sheet)
            .apply_total_row_style("A11:AB11", "teal")
            .finish()
            .unwrap();

        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(outcome.failures[0].error, StyleError::InvalidColor(_)));
        let style = style_at(&sheet, "D11");
        assert!(style.bold);
        assert_eq!(style.font_color, Some(0xFFFFFF));
        assert_eq!(style.fill, None);
        assert_eq!(style.borders.left, Some(BorderStyle::Thin));
        assert_eq!(style.h_align, Some(HAlign::Center));
        assert_eq!(sheet.row_height(11), Some(28.0));
    }

    #[test]
    fn bad_header_fill_keeps_borders_and_alignment() {
        let mut sheet = ReportSheet::new("t");
        let outcome = StyleBuilder::new(&mut sheet)
            .apply_complete_header_style("A4:C7", "navy")
            .finish()
            .unwrap();

        assert_eq!(outcome.applied.len(), 3);
        assert_eq!(outcome.failures.len(), 1);
        let style = style_at(&sheet, "B6");
        assert!(style.bold);
        assert_eq!(style.fill, None);
        assert_eq!(style.borders.top, Some(BorderStyle::Thin));
        assert_eq!(style.v_align, Some(VAlign::Center));
    }

    #[test]
    fn percentage_format_strings() {
        let mut sheet = ReportSheet::new("t");
        try_percentage_format(&mut sheet, "H8", 2).unwrap();
        assert_eq!(style_at(&sheet, "H8").num_format.as_deref(), Some("0.00\"%\""));
        try_percentage_format(&mut sheet, "H9", 0).unwrap();
        assert_eq!(style_at(&sheet, "H9").num_format.as_deref(), Some("0\"%\""));
        assert!(try_percentage_format(&mut sheet, "H9", 11).is_err());
    }

    #[test]
    fn auto_size_uses_widest_value() {
        let mut sheet = ReportSheet::new("t");
        sheet.set(CellRef::parse("B8").unwrap(), "Puskesmas Sukamaju Kidul");
        sheet.set(CellRef::parse("C8").unwrap(), 5.0);
        try_auto_size_columns(&mut sheet, "B", "C").unwrap();
        assert_eq!(sheet.column_width(Column::B), Some(26.0));
        assert_eq!(sheet.column_width(Column::C), Some(6.0));
    }

    #[test]
    fn merge_cells_reports_overlap() {
        let mut sheet = ReportSheet::new("t");
        let outcome = StyleBuilder::new(&mut sheet)
            .merge_cells("A1:C1")
            .merge_cells("B1:D1")
            .finish()
            .unwrap();
        assert_eq!(outcome.applied.len(), 1);
        assert!(matches!(
            outcome.failures[0].error,
            StyleError::Sheet(SheetError::MergeOverlap { .. })
        ));
    }

    #[test]
    fn style_to_format_builds() {
        let style = CellStyle {
            bold: true,
            fill: Some(0x2E86AB),
            font_color: Some(WHITE),
            borders: Borders {
                top: Some(BorderStyle::Thin),
                color: Some(BLACK),
                ..Borders::default()
            },
            h_align: Some(HAlign::Center),
            v_align: Some(VAlign::Center),
            num_format: Some("0.00".into()),
            ..CellStyle::default()
        };
        let _format = style.to_format();
    }
}
