//! Fixed column layout of the report workbooks
//!
//! Every report shares the identity columns `A` (no), `B` (clinic name) and
//! `C` (target), followed by five-column period blocks in the order
//! L, P, TOTAL, TS, %S:
//!
//! ```text
//! all        A-C | D-BK 12 months | BL-CE 4 quarters | CF-CJ year
//! monthly    A-C | D-BK 12 months
//! quarterly  A-C | D-W 4 quarters | X-AB year
//! puskesmas  A-C | D-BK 12 months (blank template)
//! ```
//!
//! The tables are constants; [`ColumnMap::blocks`] is the single place that
//! decides which blocks a report type shows, and the header, data and total
//! builders all iterate it.

use crate::sheet::Column;
use pkmreport_core::{Metric, Month, Quarter, ReportType};
use serde::Serialize;

/// Row number column
pub const NO_COLUMN: Column = Column::A;
/// Clinic name column
pub const NAME_COLUMN: Column = Column::B;
/// Yearly target ("sasaran") column
pub const TARGET_COLUMN: Column = Column::C;

const fn block(letters: [&str; 5]) -> [Column; 5] {
    [
        Column::from_letters(letters[0]),
        Column::from_letters(letters[1]),
        Column::from_letters(letters[2]),
        Column::from_letters(letters[3]),
        Column::from_letters(letters[4]),
    ]
}

const MONTH_COLUMNS: [[Column; 5]; 12] = [
    block(["D", "E", "F", "G", "H"]),
    block(["I", "J", "K", "L", "M"]),
    block(["N", "O", "P", "Q", "R"]),
    block(["S", "T", "U", "V", "W"]),
    block(["X", "Y", "Z", "AA", "AB"]),
    block(["AC", "AD", "AE", "AF", "AG"]),
    block(["AH", "AI", "AJ", "AK", "AL"]),
    block(["AM", "AN", "AO", "AP", "AQ"]),
    block(["AR", "AS", "AT", "AU", "AV"]),
    block(["AW", "AX", "AY", "AZ", "BA"]),
    block(["BB", "BC", "BD", "BE", "BF"]),
    block(["BG", "BH", "BI", "BJ", "BK"]),
];

const QUARTER_COLUMNS: [[Column; 5]; 4] = [
    block(["BL", "BM", "BN", "BO", "BP"]),
    block(["BQ", "BR", "BS", "BT", "BU"]),
    block(["BV", "BW", "BX", "BY", "BZ"]),
    block(["CA", "CB", "CC", "CD", "CE"]),
];

const TOTAL_COLUMNS: [Column; 5] = block(["CF", "CG", "CH", "CI", "CJ"]);

const QUARTER_ONLY_COLUMNS: [[Column; 5]; 4] = [
    block(["D", "E", "F", "G", "H"]),
    block(["I", "J", "K", "L", "M"]),
    block(["N", "O", "P", "Q", "R"]),
    block(["S", "T", "U", "V", "W"]),
];

const QUARTER_TOTAL_COLUMNS: [Column; 5] = block(["X", "Y", "Z", "AA", "AB"]);

/// Rightmost column written for a report type
pub fn last_column(report_type: ReportType) -> Column {
    match report_type {
        ReportType::All => Column::from_letters("CJ"),
        ReportType::Monthly | ReportType::Puskesmas => Column::from_letters("BK"),
        ReportType::Quarterly => Column::from_letters("AB"),
    }
}

/// Reporting period of one block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Month(Month),
    Quarter(Quarter),
    Year,
}

/// Five adjacent columns holding one period's metrics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PeriodBlock {
    pub period: Period,
    pub columns: [Column; 5],
}

impl PeriodBlock {
    pub fn column(&self, metric: Metric) -> Column {
        self.columns[metric.index()]
    }

    pub fn first(&self) -> Column {
        self.columns[0]
    }

    pub fn last(&self) -> Column {
        self.columns[4]
    }
}

/// Column assignments for one report type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    report_type: ReportType,
}

impl ColumnMap {
    pub fn new(report_type: ReportType) -> Self {
        Self { report_type }
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Month block in the wide layout (all, monthly, puskesmas)
    pub fn month_columns(&self, month: Month) -> [Column; 5] {
        MONTH_COLUMNS[usize::from(month.number() - 1)]
    }

    /// Quarter block in the wide layout (all)
    pub fn quarter_columns(&self, quarter: Quarter) -> [Column; 5] {
        QUARTER_COLUMNS[usize::from(quarter.number() - 1)]
    }

    /// Yearly block in the wide layout (all)
    pub fn total_columns(&self) -> [Column; 5] {
        TOTAL_COLUMNS
    }

    /// Quarter block in the compact quarterly layout
    pub fn quarter_only_columns(&self, quarter: Quarter) -> [Column; 5] {
        QUARTER_ONLY_COLUMNS[usize::from(quarter.number() - 1)]
    }

    /// Yearly block in the compact quarterly layout
    pub fn quarter_total_columns(&self) -> [Column; 5] {
        QUARTER_TOTAL_COLUMNS
    }

    /// Column of one metric of one month
    pub fn month_column(&self, month: Month, metric: Metric) -> Column {
        self.month_columns(month)[metric.index()]
    }

    pub fn last_column(&self) -> Column {
        last_column(self.report_type)
    }

    /// Period blocks shown by this report type, left to right
    pub fn blocks(&self) -> Vec<PeriodBlock> {
        let map = *self;
        let months = Month::all().map(move |m| PeriodBlock {
            period: Period::Month(m),
            columns: map.month_columns(m),
        });
        match self.report_type {
            ReportType::Monthly | ReportType::Puskesmas => months.collect(),
            ReportType::Quarterly => Quarter::all()
                .map(|q| PeriodBlock {
                    period: Period::Quarter(q),
                    columns: map.quarter_only_columns(q),
                })
                .chain(std::iter::once(PeriodBlock {
                    period: Period::Year,
                    columns: map.quarter_total_columns(),
                }))
                .collect(),
            ReportType::All => months
                .chain(Quarter::all().map(|q| PeriodBlock {
                    period: Period::Quarter(q),
                    columns: map.quarter_columns(q),
                }))
                .chain(std::iter::once(PeriodBlock {
                    period: Period::Year,
                    columns: map.total_columns(),
                }))
                .collect(),
        }
    }
}
