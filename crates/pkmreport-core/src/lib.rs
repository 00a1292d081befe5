//! # pkmreport-core
//!
//! Core domain model and traits for the pkmreport workbook engine.
//!
//! This crate provides:
//! - Domain types: `DiseaseType`, `ReportType`, `Month`, `Quarter`, `Metric`,
//!   `PeriodMetrics`, `ClinicStatRow`, `ReportRequest`
//! - Core traits: `StatisticsCalculator`, `ReportRenderer`
//! - Report configuration (`ReportConfig`)
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use pkmreport_core::{ClinicStatRow, Month, PeriodMetrics, ReportRequest};
//!
//! let clinic = ClinicStatRow::new("Puskesmas Sukajadi", 1200.0).with_month(
//!     Month::new(1).unwrap(),
//!     PeriodMetrics::new(10.0, 5.0, 15.0, 12.0, 80.0),
//! );
//! let request = ReportRequest::new("ht".parse().unwrap(), 2024, "monthly".parse().unwrap());
//! assert_eq!(request.year, 2024);
//! assert_eq!(clinic.monthly.len(), 1);
//! ```

pub mod stats;

pub use stats::{RecordedStatistics, RollupStatistics, StatisticsDataset};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// First worksheet row that holds clinic data; rows 1-7 are the header block.
pub const DATA_START_ROW: u32 = 8;

// ============================================================================
// Disease and report type
// ============================================================================

/// Tracked disease programme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiseaseType {
    /// Hipertensi
    Ht,
    /// Diabetes Melitus
    Dm,
}

impl DiseaseType {
    /// Short code used in file names and CLI flags
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ht => "ht",
            Self::Dm => "dm",
        }
    }

    /// Upper-case label printed in report titles
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ht => "HIPERTENSI",
            Self::Dm => "DIABETES MELITUS",
        }
    }
}

impl fmt::Display for DiseaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DiseaseType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ht" | "hipertensi" | "hypertension" => Ok(Self::Ht),
            "dm" | "diabetes" | "diabetes melitus" => Ok(Self::Dm),
            other => Err(ReportError::UnknownDisease(other.to_string())),
        }
    }
}

/// Shape of the exported workbook.
///
/// The set is closed: an unknown name fails at parse time instead of
/// producing a workbook with missing period columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// 12 months, 4 quarters and the yearly total (A-CJ)
    All,
    /// 12 months (A-BK)
    Monthly,
    /// 4 quarters and the yearly total in the compact layout (A-AB)
    Quarterly,
    /// Blank per-clinic template with the monthly layout (A-BK)
    Puskesmas,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [Self::All, Self::Monthly, Self::Quarterly, Self::Puskesmas];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Puskesmas => "puskesmas",
        }
    }

    /// Subtitle label printed on row 2
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "REKAPITULASI BULANAN, TRIWULAN DAN TAHUNAN",
            Self::Monthly => "REKAPITULASI BULANAN",
            Self::Quarterly => "REKAPITULASI TRIWULAN",
            Self::Puskesmas => "TEMPLATE PUSKESMAS",
        }
    }

    /// Whether rows are filled from a statistics calculator.
    ///
    /// The puskesmas template is written with zeros for manual distribution.
    pub fn uses_statistics(&self) -> bool {
        !matches!(self, Self::Puskesmas)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "puskesmas" => Ok(Self::Puskesmas),
            other => Err(ReportError::UnknownReportType(other.to_string())),
        }
    }
}

// ============================================================================
// Periods
// ============================================================================

const MONTH_NAMES: [&str; 12] = [
    "JANUARI",
    "FEBRUARI",
    "MARET",
    "APRIL",
    "MEI",
    "JUNI",
    "JULI",
    "AGUSTUS",
    "SEPTEMBER",
    "OKTOBER",
    "NOVEMBER",
    "DESEMBER",
];

/// Calendar month, 1..=12
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(u8);

impl Month {
    pub fn new(number: u8) -> Result<Self, ReportError> {
        if (1..=12).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ReportError::InvalidPeriod(format!("month {number}")))
        }
    }

    /// All months in calendar order
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12).map(Month)
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Indonesian month name, upper case
    pub fn name(&self) -> &'static str {
        MONTH_NAMES[usize::from(self.0 - 1)]
    }

    pub fn quarter(&self) -> Quarter {
        Quarter((self.0 - 1) / 3 + 1)
    }
}

impl TryFrom<u8> for Month {
    type Error = ReportError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0
    }
}

/// Quarter ("triwulan"), 1..=4
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quarter(u8);

impl Quarter {
    pub fn new(number: u8) -> Result<Self, ReportError> {
        if (1..=4).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ReportError::InvalidPeriod(format!("quarter {number}")))
        }
    }

    pub fn all() -> impl Iterator<Item = Quarter> {
        (1..=4).map(Quarter)
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// The three months covered by this quarter
    pub fn months(&self) -> impl Iterator<Item = Month> {
        let first = (self.0 - 1) * 3 + 1;
        (first..first + 3).map(Month)
    }
}

impl TryFrom<u8> for Quarter {
    type Error = ReportError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quarter> for u8 {
    fn from(quarter: Quarter) -> Self {
        quarter.0
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// One of the five values reported for every period
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    /// L (laki-laki)
    Male,
    /// P (perempuan)
    Female,
    Total,
    /// TS, patients meeting the service standard
    TargetAchieved,
    /// %S
    Percentage,
}

impl Metric {
    /// Metrics in column order
    pub const ALL: [Metric; 5] = [
        Self::Male,
        Self::Female,
        Self::Total,
        Self::TargetAchieved,
        Self::Percentage,
    ];

    /// Position inside a period's five-column block
    pub fn index(&self) -> usize {
        match self {
            Self::Male => 0,
            Self::Female => 1,
            Self::Total => 2,
            Self::TargetAchieved => 3,
            Self::Percentage => 4,
        }
    }

    /// Category label printed on header rows 6-7
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "L",
            Self::Female => "P",
            Self::Total => "TOTAL",
            Self::TargetAchieved => "TS",
            Self::Percentage => "%S",
        }
    }

    /// Whether the total row sums this metric (percentages are recomputed)
    pub fn is_summable(&self) -> bool {
        !matches!(self, Self::Percentage)
    }
}

/// Aggregated values for one clinic and one period.
///
/// Every field defaults to zero when the source omits it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodMetrics {
    pub male: f64,
    pub female: f64,
    pub total: f64,
    pub target_achieved: f64,
    pub percentage: f64,
}

impl PeriodMetrics {
    pub const fn new(male: f64, female: f64, total: f64, target_achieved: f64, percentage: f64) -> Self {
        Self {
            male,
            female,
            total,
            target_achieved,
            percentage,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0)
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Male => self.male,
            Metric::Female => self.female,
            Metric::Total => self.total,
            Metric::TargetAchieved => self.target_achieved,
            Metric::Percentage => self.percentage,
        }
    }

    /// Values in column order (L, P, TOTAL, TS, %S)
    pub fn values(&self) -> [f64; 5] {
        Metric::ALL.map(|m| self.get(m))
    }
}

/// Round to two decimals, as the workbook's `ROUND(...,2)` does
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of the yearly target served, 0 when the target is 0
pub fn target_percentage(total: f64, target: f64) -> f64 {
    if target > 0.0 {
        round2(total / target * 100.0)
    } else {
        0.0
    }
}

// ============================================================================
// Clinic rows
// ============================================================================

/// One Puskesmas row of the report
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicStatRow {
    /// Clinic display name
    pub name: String,
    /// Yearly target ("sasaran")
    #[serde(default)]
    pub target: f64,
    /// Recorded metrics keyed by month number
    #[serde(default)]
    pub monthly: BTreeMap<u8, PeriodMetrics>,
    /// Recorded metrics keyed by quarter number
    #[serde(default)]
    pub quarterly: BTreeMap<u8, PeriodMetrics>,
    /// Recorded yearly metrics
    #[serde(default)]
    pub yearly: Option<PeriodMetrics>,
}

impl ClinicStatRow {
    pub fn new(name: impl Into<String>, target: f64) -> Self {
        Self {
            name: name.into(),
            target,
            ..Self::default()
        }
    }

    pub fn with_month(mut self, month: Month, metrics: PeriodMetrics) -> Self {
        self.monthly.insert(month.number(), metrics);
        self
    }

    pub fn with_quarter(mut self, quarter: Quarter, metrics: PeriodMetrics) -> Self {
        self.quarterly.insert(quarter.number(), metrics);
        self
    }

    pub fn with_year(mut self, metrics: PeriodMetrics) -> Self {
        self.yearly = Some(metrics);
        self
    }

    pub fn month(&self, month: Month) -> Option<&PeriodMetrics> {
        self.monthly.get(&month.number())
    }

    pub fn quarter(&self, quarter: Quarter) -> Option<&PeriodMetrics> {
        self.quarterly.get(&quarter.number())
    }
}

/// What to export
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub disease: DiseaseType,
    pub year: i32,
    pub report_type: ReportType,
}

impl ReportRequest {
    pub fn new(disease: DiseaseType, year: i32, report_type: ReportType) -> Self {
        Self {
            disease,
            year,
            report_type,
        }
    }

    /// Conventional download file name, e.g. `laporan_ht_monthly_2024.xlsx`
    pub fn file_name(&self) -> String {
        format!(
            "laporan_{}_{}_{}.xlsx",
            self.disease.code(),
            self.report_type.as_str(),
            self.year
        )
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Source of aggregated clinic statistics.
///
/// Returning `None` (or metrics with missing fields) is not an error: the
/// report writes zeros for anything the calculator does not supply.
pub trait StatisticsCalculator {
    fn monthly(&self, clinic: &ClinicStatRow, month: Month, year: i32, disease: DiseaseType)
        -> Option<PeriodMetrics>;

    fn quarterly(
        &self,
        clinic: &ClinicStatRow,
        quarter: Quarter,
        year: i32,
        disease: DiseaseType,
    ) -> Option<PeriodMetrics>;

    fn yearly(&self, clinic: &ClinicStatRow, year: i32, disease: DiseaseType) -> Option<PeriodMetrics>;
}

/// Output rendering
pub trait ReportRenderer {
    type Output;

    /// Render the clinic rows for a request
    fn render(
        &self,
        request: &ReportRequest,
        clinics: &[ClinicStatRow],
        stats: &dyn StatisticsCalculator,
    ) -> Result<Self::Output, ReportError>;
}

// ============================================================================
// Configuration
// ============================================================================

/// Workbook presentation settings, usually loaded from a TOML file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Worksheet tab name
    pub sheet_name: String,
    /// Document author property
    pub author: String,
    /// Header block fill colour (`#RRGGBB`)
    pub header_color: String,
    /// Total row fill colour (`#RRGGBB`)
    pub total_color: String,
    /// Write the legend under the total row
    pub include_footer: bool,
    /// Freeze the identity columns and header rows
    pub freeze_panes: bool,
    /// Abort the export on the first styling failure instead of logging it
    pub strict_styles: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Laporan".into(),
            author: "Dinas Kesehatan".into(),
            header_color: "#D9E1F2".into(),
            total_color: "#2E86AB".into(),
            include_footer: true,
            freeze_panes: true,
            strict_styles: false,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Report generation error
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown report type: {0} (expected all, monthly, quarterly or puskesmas)")]
    UnknownReportType(String),

    #[error("Unknown disease type: {0} (expected ht or dm)")]
    UnknownDisease(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Worksheet error: {0}")]
    Sheet(String),

    #[error("Style error: {0}")]
    Style(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn report_type_parses_closed_set() {
        for report_type in ReportType::ALL {
            assert_eq!(report_type.as_str().parse::<ReportType>().unwrap(), report_type);
        }
        assert_eq!(" Monthly ".parse::<ReportType>().unwrap(), ReportType::Monthly);
    }

    #[test]
    fn unknown_report_type_is_an_error() {
        let err = "weekly".parse::<ReportType>().unwrap_err();
        assert!(matches!(err, ReportError::UnknownReportType(ref s) if s == "weekly"));
    }

    #[test]
    fn disease_aliases() {
        assert_eq!("HT".parse::<DiseaseType>().unwrap(), DiseaseType::Ht);
        assert_eq!("diabetes".parse::<DiseaseType>().unwrap(), DiseaseType::Dm);
        assert!("asthma".parse::<DiseaseType>().is_err());
        assert_eq!(DiseaseType::Dm.label(), "DIABETES MELITUS");
    }

    #[test]
    fn month_bounds_and_quarters() {
        assert!(Month::new(0).is_err());
        assert!(Month::new(13).is_err());
        assert_eq!(Month::all().count(), 12);
        assert_eq!(Month::new(6).unwrap().name(), "JUNI");
        assert_eq!(Month::new(6).unwrap().quarter().number(), 2);
        assert_eq!(Month::new(12).unwrap().quarter().number(), 4);
    }

    #[test]
    fn quarter_months() {
        let q3: Vec<u8> = Quarter::new(3).unwrap().months().map(|m| m.number()).collect();
        assert_eq!(q3, vec![7, 8, 9]);
        assert!(Quarter::new(5).is_err());
    }

    #[test]
    fn metric_order_and_labels() {
        let labels: Vec<&str> = Metric::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["L", "P", "TOTAL", "TS", "%S"]);
        for (i, metric) in Metric::ALL.iter().enumerate() {
            assert_eq!(metric.index(), i);
        }
        assert!(!Metric::Percentage.is_summable());
    }

    #[test]
    fn period_metrics_default_missing_fields() {
        let metrics: PeriodMetrics = serde_json::from_str(r#"{"male": 3, "total": 7}"#).unwrap();
        assert_eq!(metrics.values(), [3.0, 0.0, 7.0, 0.0, 0.0]);
    }

    #[test]
    fn clinic_row_from_json() {
        let json = r#"{
            "name": "Puskesmas Kota",
            "target": 500,
            "monthly": {"1": {"male": 10, "female": 5, "total": 15, "target_achieved": 12, "percentage": 80}},
            "quarterly": {"2": {"total": 40}}
        }"#;
        let row: ClinicStatRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.target, 500.0);
        assert_eq!(row.month(Month::new(1).unwrap()).unwrap().target_achieved, 12.0);
        assert_eq!(row.quarter(Quarter::new(2).unwrap()).unwrap().total, 40.0);
        assert!(row.yearly.is_none());
    }

    #[test]
    fn target_percentage_guards_zero() {
        assert_eq!(target_percentage(15.0, 0.0), 0.0);
        assert_eq!(target_percentage(1.0, 3.0), 33.33);
    }

    #[test]
    fn request_file_name() {
        let request = ReportRequest::new(DiseaseType::Dm, 2025, ReportType::Quarterly);
        assert_eq!(request.file_name(), "laporan_dm_quarterly_2025.xlsx");
    }

    #[test]
    fn config_defaults_fill_missing_keys() {
        let config: ReportConfig = serde_json::from_str(r#"{"sheet_name": "HT 2024"}"#).unwrap();
        assert_eq!(config.sheet_name, "HT 2024");
        assert_eq!(config.total_color, "#2E86AB");
        assert!(config.include_footer);
    }
}
