//! Merge caller tables with the defaults and fill every year the engine needs

use log::debug;

use super::{
    default_tables, nearest_factor, CoefficientTables, LifeExpectancyTable, MinimumPension,
    YearFactors, SNAPSHOT_VERSION,
};
use crate::config::EngineConfig;
use crate::error::TableError;
use crate::profile::{ByGender, Gender};

const VALORIZATION: &str = "valorization";
const PROFITABILITY: &str = "profitability";

/// Fully populated, read-only tables for one calculation
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTables {
    first_year: i32,
    last_year: i32,
    valorization: YearFactors,
    profitability: YearFactors,
    life_expectancy: LifeExpectancyTable,
    average_monthly_pension: ByGender<f64>,
    minimum_monthly_pension: MinimumPension,
    version: String,
    extrapolated_years: Vec<i32>,
}

impl ResolvedTables {
    /// Main account factor for a year inside the resolved range
    pub fn valorization(&self, year: i32) -> Result<f64, TableError> {
        self.valorization
            .get(&year)
            .copied()
            .ok_or(TableError::MissingFactor { series: VALORIZATION, year })
    }

    /// Subaccount factor for a year inside the resolved range
    pub fn profitability(&self, year: i32) -> Result<f64, TableError> {
        self.profitability
            .get(&year)
            .copied()
            .ok_or(TableError::MissingFactor { series: PROFITABILITY, year })
    }

    pub fn life_expectancy_months(&self, gender: Gender, age: u32) -> Result<u32, TableError> {
        self.life_expectancy.months(gender, age)
    }

    pub fn average_monthly_pension(&self, gender: Gender) -> f64 {
        *self.average_monthly_pension.get(gender)
    }

    pub fn minimum_monthly_pension(&self) -> &MinimumPension {
        &self.minimum_monthly_pension
    }

    /// Version of the table set (caller metadata, else the snapshot version)
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Years whose factor was not supplied and came from a fallback
    pub fn extrapolated_years(&self) -> &[i32] {
        &self.extrapolated_years
    }

    pub fn year_range(&self) -> (i32, i32) {
        (self.first_year, self.last_year)
    }
}

/// Resolves caller overrides against a base table set
#[derive(Debug, Clone)]
pub struct TableResolver<'a> {
    base: &'a CoefficientTables,
    long_run_valorization: f64,
    long_run_profitability: f64,
}

impl TableResolver<'static> {
    /// Resolver backed by the compiled-in snapshot
    pub fn with_defaults(config: &EngineConfig) -> Self {
        TableResolver::new(default_tables(), config)
    }
}

impl<'a> TableResolver<'a> {
    pub fn new(base: &'a CoefficientTables, config: &EngineConfig) -> Self {
        Self {
            base,
            long_run_valorization: config.long_run_valorization,
            long_run_profitability: config.long_run_profitability,
        }
    }

    /// Produce tables covering every year in `first_year..=last_year`
    ///
    /// Caller values win over base values year by year. A year missing from the merged
    /// series takes the nearest defined year; if neither side has any data the
    /// configured long-run factor applies.
    pub fn resolve(
        &self,
        overrides: Option<&CoefficientTables>,
        first_year: i32,
        last_year: i32,
    ) -> Result<ResolvedTables, TableError> {
        let empty = CoefficientTables::default();
        let overrides = overrides.unwrap_or(&empty);

        let mut extrapolated_years = Vec::new();
        let valorization = fill_series(
            VALORIZATION,
            &merge_series(VALORIZATION, &self.base.valorization_indices, &overrides.valorization_indices)?,
            first_year,
            last_year,
            self.long_run_valorization,
            &mut extrapolated_years,
        )?;
        let profitability = fill_series(
            PROFITABILITY,
            &merge_series(PROFITABILITY, &self.base.profitability_indices, &overrides.profitability_indices)?,
            first_year,
            last_year,
            self.long_run_profitability,
            &mut extrapolated_years,
        )?;
        extrapolated_years.sort_unstable();
        extrapolated_years.dedup();

        let life_expectancy = self
            .base
            .life_expectancy_months
            .merged_with(&overrides.life_expectancy_months);
        life_expectancy.validate()?;

        let average_monthly_pension = overrides
            .average_monthly_pension
            .clone()
            .or_else(|| self.base.average_monthly_pension.clone())
            .ok_or(TableError::MissingBaseline("average monthly pension"))?;
        for value in [average_monthly_pension.male, average_monthly_pension.female] {
            check_amount("average monthly pension", value)?;
        }

        let minimum_monthly_pension = overrides
            .minimum_monthly_pension
            .or(self.base.minimum_monthly_pension)
            .ok_or(TableError::MissingBaseline("minimum monthly pension"))?;
        check_amount("minimum monthly pension", minimum_monthly_pension.amount)?;

        let version = overrides
            .metadata
            .as_ref()
            .or(self.base.metadata.as_ref())
            .map(|m| m.version.clone())
            .unwrap_or_else(|| SNAPSHOT_VERSION.to_string());

        if !extrapolated_years.is_empty() {
            debug!(
                "resolved {}..={} with {} extrapolated year(s)",
                first_year,
                last_year,
                extrapolated_years.len()
            );
        }

        Ok(ResolvedTables {
            first_year,
            last_year,
            valorization,
            profitability,
            life_expectancy,
            average_monthly_pension,
            minimum_monthly_pension,
            version,
            extrapolated_years,
        })
    }
}

fn check_factor(series: &'static str, year: i32, factor: f64) -> Result<(), TableError> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(TableError::NonPositiveFactor { series, year, factor })
    }
}

fn check_amount(name: &'static str, value: f64) -> Result<(), TableError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TableError::NonPositiveAmount { name, value })
    }
}

fn merge_series(
    series: &'static str,
    base: &YearFactors,
    overrides: &YearFactors,
) -> Result<YearFactors, TableError> {
    let mut merged = base.clone();
    merged.extend(overrides.iter().map(|(&y, &f)| (y, f)));
    for (&year, &factor) in &merged {
        check_factor(series, year, factor)?;
    }
    Ok(merged)
}

fn fill_series(
    series: &'static str,
    merged: &YearFactors,
    first_year: i32,
    last_year: i32,
    long_run: f64,
    extrapolated: &mut Vec<i32>,
) -> Result<YearFactors, TableError> {
    if merged.is_empty() {
        check_factor(series, first_year, long_run)?;
    }

    let mut filled = YearFactors::new();
    for year in first_year..=last_year {
        let factor = match merged.get(&year) {
            Some(&f) => f,
            None => {
                extrapolated.push(year);
                nearest_factor(merged, year).unwrap_or(long_run)
            }
        };
        filled.insert(year, factor);
    }
    Ok(filled)
}
