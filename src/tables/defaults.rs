//! Compiled-in coefficient snapshot
//!
//! Historical valorization 2015-2024 as published, forecasts to 2031, then a flat
//! long-run assumption to 2080. Built once on first use and never written afterwards.

use std::sync::LazyLock;

use chrono::NaiveDate;

use super::{CoefficientTables, LifeExpectancyTable, MinimumPension, TableMetadata, YearFactors};
use crate::profile::ByGender;

/// Version tag of the compiled-in snapshot
pub const SNAPSHOT_VERSION: &str = "2025.03";

const LAST_PROJECTED_YEAR: i32 = 2080;

/// Main account valorization: published 2015-2024, forecast 2025-2031
const VALORIZATION: [(i32, f64); 17] = [
    (2015, 1.0407),
    (2016, 1.0039),
    (2017, 1.0464),
    (2018, 1.0529),
    (2019, 1.0643),
    (2020, 1.0486),
    (2021, 1.0524),
    (2022, 1.1086),
    (2023, 1.1439),
    (2024, 1.1266),
    (2025, 1.0580),
    (2026, 1.0520),
    (2027, 1.0480),
    (2028, 1.0450),
    (2029, 1.0430),
    (2030, 1.0420),
    (2031, 1.0410),
];
const LONG_RUN_VALORIZATION: f64 = 1.04;

/// Subaccount profitability, usually below main account valorization
const PROFITABILITY: [(i32, f64); 7] = [
    (2024, 1.0350),
    (2025, 1.0380),
    (2026, 1.0360),
    (2027, 1.0350),
    (2028, 1.0340),
    (2029, 1.0330),
    (2030, 1.0330),
];
const LONG_RUN_PROFITABILITY: f64 = 1.035;

/// First age covered by the life expectancy arrays
const LIFE_TABLE_FIRST_AGE: u32 = 50;

// Remaining payout months, ages 50..=85
const MALE_MONTHS: [u32; 36] = [
    330, 321, 313, 304, 296, 288, 279, 271, 263, 255, // 50-59
    247, 239, 232, 224, 217, 210, 203, 196, 189, 182, // 60-69
    175, 169, 162, 156, 150, 144, 138, 132, 126, 121, // 70-79
    115, 110, 105, 100, 95, 91, // 80-85
];
const FEMALE_MONTHS: [u32; 36] = [
    366, 354, 342, 330, 320, 309, 298, 287, 276, 265, // 50-59
    254, 246, 238, 230, 222, 214, 206, 198, 190, 183, // 60-69
    175, 168, 161, 154, 147, 140, 134, 128, 122, 116, // 70-79
    110, 105, 99, 94, 89, 85, // 80-85
];

const MINIMUM_PENSION_AMOUNT: f64 = 1780.96;

const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(d) => d,
        None => panic!("invalid snapshot date"),
    }
}

const MINIMUM_PENSION_EFFECTIVE: NaiveDate = date(2025, 3, 1);
const SNAPSHOT_UPDATED: NaiveDate = date(2025, 3, 1);

static DEFAULT_TABLES: LazyLock<CoefficientTables> = LazyLock::new(build_snapshot);

/// The process-wide default tables
pub fn default_tables() -> &'static CoefficientTables {
    &DEFAULT_TABLES
}

fn series(points: &[(i32, f64)], long_run: f64) -> YearFactors {
    let mut factors: YearFactors = points.iter().copied().collect();
    let last = points.last().map(|&(y, _)| y).unwrap_or(LAST_PROJECTED_YEAR);
    factors.extend((last + 1..=LAST_PROJECTED_YEAR).map(|y| (y, long_run)));
    factors
}

fn life_table(months: &[u32]) -> std::collections::BTreeMap<u32, u32> {
    months
        .iter()
        .enumerate()
        .map(|(i, &m)| (LIFE_TABLE_FIRST_AGE + i as u32, m))
        .collect()
}

fn build_snapshot() -> CoefficientTables {
    CoefficientTables {
        valorization_indices: series(&VALORIZATION, LONG_RUN_VALORIZATION),
        profitability_indices: series(&PROFITABILITY, LONG_RUN_PROFITABILITY),
        life_expectancy_months: LifeExpectancyTable {
            male: life_table(&MALE_MONTHS),
            female: life_table(&FEMALE_MONTHS),
        },
        average_monthly_pension: Some(ByGender::new(3500.0, 2800.0)),
        minimum_monthly_pension: Some(MinimumPension {
            amount: MINIMUM_PENSION_AMOUNT,
            effective_date: MINIMUM_PENSION_EFFECTIVE,
        }),
        metadata: Some(TableMetadata {
            source: "compiled-in snapshot".to_string(),
            version: SNAPSHOT_VERSION.to_string(),
            last_updated: SNAPSHOT_UPDATED,
            description: Some(
                "Published valorization 2015-2024, forecasts 2025-2031, long-run 4% to 2080"
                    .to_string(),
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Gender;

    #[test]
    fn test_snapshot_covers_projection_horizon() {
        let tables = default_tables();

        assert_eq!(tables.valorization_indices.keys().next(), Some(&2015));
        assert_eq!(tables.valorization_indices.keys().last(), Some(&2080));
        assert_eq!(tables.valorization_indices[&2023], 1.1439);
        assert_eq!(tables.valorization_indices[&2050], LONG_RUN_VALORIZATION);
        assert_eq!(tables.profitability_indices[&2024], 1.035);
        assert_eq!(tables.profitability_indices[&2080], LONG_RUN_PROFITABILITY);
    }

    #[test]
    fn test_snapshot_factors_strictly_positive() {
        let tables = default_tables();
        assert!(tables.valorization_indices.values().all(|&f| f > 0.0));
        assert!(tables.profitability_indices.values().all(|&f| f > 0.0));
        assert!(tables.life_expectancy_months.validate().is_ok());
    }

    #[test]
    fn test_snapshot_life_expectancy_anchor_points() {
        let life = &default_tables().life_expectancy_months;

        assert_eq!(life.months(Gender::Male, 65).unwrap(), 210);
        assert_eq!(life.months(Gender::Female, 60).unwrap(), 254);
        assert_eq!(life.male.len(), 36);
        assert_eq!(life.female.keys().last(), Some(&85));
    }

    #[test]
    fn test_snapshot_is_shared() {
        assert!(std::ptr::eq(default_tables(), default_tables()));
    }
}
