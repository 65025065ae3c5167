//! Official coefficient tables: valorization and profitability series, life
//! expectancy, population averages and the statutory minimum pension
//!
//! Tables arrive either from the caller (already parsed, possibly partial) or from the
//! compiled-in snapshot in [`defaults`]. The [`TableResolver`] merges the two and fills
//! every year the engine needs, so a missing year never reads as zero.

mod defaults;
mod resolver;

pub use defaults::{default_tables, SNAPSHOT_VERSION};
pub use resolver::{ResolvedTables, TableResolver};

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::profile::{ByGender, Gender};

/// Year-indexed multiplicative factors (1.04 = +4%)
pub type YearFactors = BTreeMap<i32, f64>;

/// Coefficient tables as supplied by a caller or the default snapshot
///
/// Every field may be absent in a caller override; absent parts fall back to the
/// defaults during resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTables {
    /// Main account valorization applied at the close of each year
    #[serde(default)]
    pub valorization_indices: YearFactors,

    /// Subaccount profitability applied at the close of each year
    #[serde(default)]
    pub profitability_indices: YearFactors,

    #[serde(default)]
    pub life_expectancy_months: LifeExpectancyTable,

    #[serde(default)]
    pub average_monthly_pension: Option<ByGender<f64>>,

    #[serde(default)]
    pub minimum_monthly_pension: Option<MinimumPension>,

    #[serde(default)]
    pub metadata: Option<TableMetadata>,
}

/// Statutory minimum pension with the date it took effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimumPension {
    pub amount: f64,
    pub effective_date: NaiveDate,
}

/// Provenance of a table set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub source: String,
    pub version: String,
    pub last_updated: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

/// Expected remaining payout months by gender and retirement age
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifeExpectancyTable {
    #[serde(default)]
    pub male: BTreeMap<u32, u32>,
    #[serde(default)]
    pub female: BTreeMap<u32, u32>,
}

impl LifeExpectancyTable {
    pub fn for_gender(&self, gender: Gender) -> &BTreeMap<u32, u32> {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }

    fn for_gender_mut(&mut self, gender: Gender) -> &mut BTreeMap<u32, u32> {
        match gender {
            Gender::Male => &mut self.male,
            Gender::Female => &mut self.female,
        }
    }

    /// Months for the exact age, or the nearest defined age for the gender
    ///
    /// On a tie the lower age wins.
    pub fn months(&self, gender: Gender, age: u32) -> Result<u32, TableError> {
        let table = self.for_gender(gender);
        let below = table.range(..=age).next_back();
        let above = table.range(age..).next();

        let months = match (below, above) {
            (Some((&lo_age, &lo)), Some((&hi_age, &hi))) => {
                if age - lo_age <= hi_age - age {
                    lo
                } else {
                    hi
                }
            }
            (Some((_, &m)), None) | (None, Some((_, &m))) => m,
            (None, None) => return Err(TableError::EmptyLifeExpectancy(gender)),
        };

        Ok(months)
    }

    /// Overlay another table age by age
    pub fn merged_with(&self, other: &LifeExpectancyTable) -> Self {
        let mut merged = self.clone();
        for gender in [Gender::Male, Gender::Female] {
            merged
                .for_gender_mut(gender)
                .extend(other.for_gender(gender).iter().map(|(&a, &m)| (a, m)));
        }
        merged
    }

    fn validate(&self) -> Result<(), TableError> {
        for gender in [Gender::Male, Gender::Female] {
            let table = self.for_gender(gender);
            if table.is_empty() {
                return Err(TableError::EmptyLifeExpectancy(gender));
            }
            if let Some((&age, &months)) = table.iter().find(|&(_, &m)| m == 0) {
                return Err(TableError::NonPositiveLifeExpectancy { gender, age, months });
            }
        }
        Ok(())
    }
}

/// Factor for `year`, falling back to the nearest defined year
///
/// Years before the series use its first factor, years after it use the latest one,
/// and interior gaps take the closer neighbour (the earlier year on a tie).
pub fn nearest_factor(series: &YearFactors, year: i32) -> Option<f64> {
    let below = series.range(..=year).next_back();
    let above = series.range(year..).next();

    match (below, above) {
        (Some((&lo_year, &lo)), Some((&hi_year, &hi))) => {
            if year - lo_year <= hi_year - year {
                Some(lo)
            } else {
                Some(hi)
            }
        }
        (Some((_, &f)), None) | (None, Some((_, &f))) => Some(f),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(i32, f64)]) -> YearFactors {
        points.iter().copied().collect()
    }

    #[test]
    fn test_nearest_factor_exact_and_edges() {
        let s = series(&[(2020, 1.05), (2021, 1.06), (2025, 1.03)]);

        assert_eq!(nearest_factor(&s, 2021), Some(1.06));
        // Before range: earliest
        assert_eq!(nearest_factor(&s, 2010), Some(1.05));
        // Beyond range: latest
        assert_eq!(nearest_factor(&s, 2060), Some(1.03));
    }

    #[test]
    fn test_nearest_factor_interior_gap() {
        let s = series(&[(2020, 1.05), (2024, 1.03)]);

        assert_eq!(nearest_factor(&s, 2021), Some(1.05));
        assert_eq!(nearest_factor(&s, 2023), Some(1.03));
        // Tie goes to the earlier year
        assert_eq!(nearest_factor(&s, 2022), Some(1.05));
        assert_eq!(nearest_factor(&YearFactors::new(), 2022), None);
    }

    #[test]
    fn test_life_expectancy_nearest_age() {
        let mut table = LifeExpectancyTable::default();
        table.male.insert(60, 250);
        table.male.insert(65, 210);
        table.female.insert(60, 254);

        assert_eq!(table.months(Gender::Male, 65).unwrap(), 210);
        assert_eq!(table.months(Gender::Male, 62).unwrap(), 250);
        assert_eq!(table.months(Gender::Male, 64).unwrap(), 210);
        assert_eq!(table.months(Gender::Male, 90).unwrap(), 210);
        assert_eq!(table.months(Gender::Female, 67).unwrap(), 254);
    }

    #[test]
    fn test_life_expectancy_empty_gender_fails_loudly() {
        let mut table = LifeExpectancyTable::default();
        table.male.insert(65, 210);

        assert_eq!(
            table.months(Gender::Female, 60),
            Err(TableError::EmptyLifeExpectancy(Gender::Female))
        );
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_life_expectancy_merge_overlays_ages() {
        let mut base = LifeExpectancyTable::default();
        base.male.insert(65, 210);
        base.male.insert(66, 203);

        let mut overlay = LifeExpectancyTable::default();
        overlay.male.insert(65, 220);
        overlay.female.insert(60, 260);

        let merged = base.merged_with(&overlay);
        assert_eq!(merged.male[&65], 220);
        assert_eq!(merged.male[&66], 203);
        assert_eq!(merged.female[&60], 260);
    }

    #[test]
    fn test_tables_deserialize_partial_override() {
        let raw = r#"{
            "valorization_indices": {"2030": 1.05, "2031": 1.045},
            "life_expectancy_months": {"female": {"60": 260}}
        }"#;
        let tables: CoefficientTables = serde_json::from_str(raw).unwrap();

        assert_eq!(tables.valorization_indices.get(&2030), Some(&1.05));
        assert!(tables.profitability_indices.is_empty());
        assert!(tables.life_expectancy_months.male.is_empty());
        assert_eq!(tables.life_expectancy_months.female.get(&60), Some(&260));
        assert!(tables.average_monthly_pension.is_none());
    }
}
