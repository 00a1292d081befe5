//! Bundled statistics calculators
//!
//! The report builders only see the [`StatisticsCalculator`] trait. Two
//! implementations read the metrics carried on each [`ClinicStatRow`]:
//!
//! - [`RecordedStatistics`] returns exactly what was recorded.
//! - [`RollupStatistics`] fills quarters and the year from the recorded
//!   months when those periods were not recorded themselves.
//!
//! [`StatisticsDataset`] is the JSON document the CLI loads.

use crate::{
    target_percentage, ClinicStatRow, DiseaseType, Month, PeriodMetrics, Quarter, ReportError,
    StatisticsCalculator,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A year of clinic statistics for one disease programme
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatisticsDataset {
    pub year: i32,
    pub disease: DiseaseType,
    #[serde(default)]
    pub clinics: Vec<ClinicStatRow>,
}

impl StatisticsDataset {
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json)
            .map_err(|e| ReportError::InvalidData(format!("statistics dataset: {e}")))
    }

    /// Calculator returning the recorded values of this dataset
    pub fn recorded(&self) -> RecordedStatistics {
        RecordedStatistics::new(self.year, self.disease)
    }

    /// Calculator deriving missing quarters and the year from months
    pub fn rollup(&self) -> RollupStatistics {
        RollupStatistics::new(self.year, self.disease)
    }
}

/// Returns the metrics recorded on the clinic row.
///
/// Requests for another year or disease yield `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordedStatistics {
    year: i32,
    disease: DiseaseType,
}

impl RecordedStatistics {
    pub fn new(year: i32, disease: DiseaseType) -> Self {
        Self { year, disease }
    }

    fn covers(&self, year: i32, disease: DiseaseType) -> bool {
        let covered = self.year == year && self.disease == disease;
        if !covered {
            debug!(year, %disease, "no recorded statistics for request");
        }
        covered
    }
}

impl StatisticsCalculator for RecordedStatistics {
    fn monthly(
        &self,
        clinic: &ClinicStatRow,
        month: Month,
        year: i32,
        disease: DiseaseType,
    ) -> Option<PeriodMetrics> {
        if !self.covers(year, disease) {
            return None;
        }
        clinic.month(month).copied()
    }

    fn quarterly(
        &self,
        clinic: &ClinicStatRow,
        quarter: Quarter,
        year: i32,
        disease: DiseaseType,
    ) -> Option<PeriodMetrics> {
        if !self.covers(year, disease) {
            return None;
        }
        clinic.quarter(quarter).copied()
    }

    fn yearly(&self, clinic: &ClinicStatRow, year: i32, disease: DiseaseType) -> Option<PeriodMetrics> {
        if !self.covers(year, disease) {
            return None;
        }
        clinic.yearly
    }
}

/// Recorded values first, otherwise sums of the recorded months.
///
/// Summed periods get their percentage recomputed against the clinic target,
/// the same way the workbook's total row computes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollupStatistics {
    recorded: RecordedStatistics,
}

impl RollupStatistics {
    pub fn new(year: i32, disease: DiseaseType) -> Self {
        Self {
            recorded: RecordedStatistics::new(year, disease),
        }
    }

    fn sum_months(clinic: &ClinicStatRow, months: impl Iterator<Item = Month>) -> Option<PeriodMetrics> {
        let mut found = false;
        let mut sum = PeriodMetrics::zero();
        for metrics in months.filter_map(|m| clinic.month(m)) {
            found = true;
            sum.male += metrics.male;
            sum.female += metrics.female;
            sum.total += metrics.total;
            sum.target_achieved += metrics.target_achieved;
        }
        if !found {
            return None;
        }
        sum.percentage = target_percentage(sum.total, clinic.target);
        Some(sum)
    }
}

impl StatisticsCalculator for RollupStatistics {
    fn monthly(
        &self,
        clinic: &ClinicStatRow,
        month: Month,
        year: i32,
        disease: DiseaseType,
    ) -> Option<PeriodMetrics> {
        self.recorded.monthly(clinic, month, year, disease)
    }

    fn quarterly(
        &self,
        clinic: &ClinicStatRow,
        quarter: Quarter,
        year: i32,
        disease: DiseaseType,
    ) -> Option<PeriodMetrics> {
        if !self.recorded.covers(year, disease) {
            return None;
        }
        clinic
            .quarter(quarter)
            .copied()
            .or_else(|| Self::sum_months(clinic, quarter.months()))
    }

    fn yearly(&self, clinic: &ClinicStatRow, year: i32, disease: DiseaseType) -> Option<PeriodMetrics> {
        if !self.recorded.covers(year, disease) {
            return None;
        }
        clinic.yearly.or_else(|| Self::sum_months(clinic, Month::all()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn month(n: u8) -> Month {
        Month::new(n).unwrap()
    }

    fn clinic() -> ClinicStatRow {
        ClinicStatRow::new("Puskesmas Cibeunying", 200.0)
            .with_month(month(1), PeriodMetrics::new(10.0, 5.0, 15.0, 12.0, 7.5))
            .with_month(month(2), PeriodMetrics::new(4.0, 6.0, 10.0, 8.0, 5.0))
            .with_month(month(4), PeriodMetrics::new(1.0, 1.0, 2.0, 2.0, 1.0))
    }

    #[test]
    fn recorded_returns_row_values() {
        let stats = RecordedStatistics::new(2024, DiseaseType::Ht);
        let row = clinic();
        assert_eq!(
            stats.monthly(&row, month(2), 2024, DiseaseType::Ht),
            Some(PeriodMetrics::new(4.0, 6.0, 10.0, 8.0, 5.0))
        );
        assert_eq!(stats.monthly(&row, month(3), 2024, DiseaseType::Ht), None);
        assert_eq!(stats.quarterly(&row, Quarter::new(1).unwrap(), 2024, DiseaseType::Ht), None);
    }

    #[test]
    fn recorded_ignores_other_year_or_disease() {
        let stats = RecordedStatistics::new(2024, DiseaseType::Ht);
        let row = clinic();
        assert_eq!(stats.monthly(&row, month(1), 2023, DiseaseType::Ht), None);
        assert_eq!(stats.monthly(&row, month(1), 2024, DiseaseType::Dm), None);
    }

    #[test]
    fn rollup_sums_quarter_from_months() {
        let stats = RollupStatistics::new(2024, DiseaseType::Ht);
        let q1 = stats
            .quarterly(&clinic(), Quarter::new(1).unwrap(), 2024, DiseaseType::Ht)
            .unwrap();
        assert_eq!(q1, PeriodMetrics::new(14.0, 11.0, 25.0, 20.0, 12.5));
    }

    #[test]
    fn rollup_prefers_recorded_quarter() {
        let stats = RollupStatistics::new(2024, DiseaseType::Ht);
        let recorded = PeriodMetrics::new(1.0, 1.0, 2.0, 1.0, 50.0);
        let row = clinic().with_quarter(Quarter::new(1).unwrap(), recorded);
        assert_eq!(
            stats.quarterly(&row, Quarter::new(1).unwrap(), 2024, DiseaseType::Ht),
            Some(recorded)
        );
    }

    #[test]
    fn rollup_year_and_empty_quarter() {
        let stats = RollupStatistics::new(2024, DiseaseType::Ht);
        let year = stats.yearly(&clinic(), 2024, DiseaseType::Ht).unwrap();
        assert_eq!(year.total, 27.0);
        assert_eq!(year.percentage, 13.5);
        assert_eq!(stats.quarterly(&clinic(), Quarter::new(3).unwrap(), 2024, DiseaseType::Ht), None);
    }

    #[test]
    fn dataset_from_json() {
        let json = r#"{
            "year": 2024,
            "disease": "dm",
            "clinics": [{"name": "Puskesmas A", "target": 100}]
        }"#;
        let dataset = StatisticsDataset::from_json(json).unwrap();
        assert_eq!(dataset.disease, DiseaseType::Dm);
        assert_eq!(dataset.clinics.len(), 1);
        assert!(StatisticsDataset::from_json("{").is_err());
    }
}
