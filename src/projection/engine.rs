//! Year-by-year contribution accumulation with year-close revaluation

use crate::config::EngineConfig;
use crate::error::TableError;
use crate::profile::UserProfile;
use crate::tables::ResolvedTables;
use super::ledger::{AccumulationOutcome, YearlyLedgerEntry};
use super::state::AccumulationState;

/// Walks a contribution timeline against resolved tables
///
/// The engine holds only shared references and keeps no state between runs, so the
/// same instance can be reused for counterfactual and goal-search runs.
#[derive(Debug, Clone, Copy)]
pub struct AccumulationEngine<'a> {
    tables: &'a ResolvedTables,
    config: &'a EngineConfig,
}

impl<'a> AccumulationEngine<'a> {
    pub fn new(tables: &'a ResolvedTables, config: &'a EngineConfig) -> Self {
        Self { tables, config }
    }

    /// Monthly salary for a contribution year
    ///
    /// Years up to and including the as-of year use today's salary unchanged; later
    /// years compound it at the configured growth rate.
    pub fn projected_salary(&self, profile: &UserProfile, year: i32) -> f64 {
        let years_ahead = year - profile.as_of_year;
        if years_ahead <= 0 {
            profile.gross_salary
        } else {
            profile.gross_salary * (1.0 + self.config.salary_growth_rate).powi(years_ahead)
        }
    }

    /// Run the accumulation for every year in `work_start_year..work_end_year`
    pub fn accumulate(&self, profile: &UserProfile) -> Result<AccumulationOutcome, TableError> {
        let mut state = AccumulationState::from_profile(profile);
        let mut ledger = Vec::with_capacity(profile.total_work_years() as usize);

        while state.year < profile.work_end_year {
            let entry = self.close_year(profile, &mut state)?;
            ledger.push(entry);
            state.advance_year();
        }

        Ok(AccumulationOutcome {
            ledger,
            main_balance: state.main_balance,
            sub_balance: state.sub_balance,
        })
    }

    /// Contribute for the state's year, revalue at year close and record the entry
    fn close_year(
        &self,
        profile: &UserProfile,
        state: &mut AccumulationState,
    ) -> Result<YearlyLedgerEntry, TableError> {
        let year = state.year;
        let projected_salary = self.projected_salary(profile, year);
        let contribution_base = projected_salary * profile.contributing_fraction();

        let annual_base = contribution_base * 12.0;
        let main_contribution = annual_base * self.config.main_contribution_rate;
        let sub_contribution = annual_base * self.config.sub_contribution_rate;

        let valorization = self.tables.valorization(year)?;
        let profitability = self.tables.profitability(year)?;

        state.credit(main_contribution, sub_contribution);
        state.revalue(valorization, profitability);

        Ok(YearlyLedgerEntry {
            year,
            projected_salary,
            contribution_base_salary: contribution_base,
            main_contribution,
            sub_contribution,
            valorization_factor_applied: valorization,
            profitability_factor_applied: profitability,
            main_balance_after: state.main_balance,
            sub_balance_after: state.sub_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Gender;
    use crate::tables::{CoefficientTables, TableResolver};
    use approx::assert_relative_eq;

    fn test_profile() -> UserProfile {
        UserProfile {
            age: 35,
            gender: Gender::Male,
            gross_salary: 8000.0,
            work_start_year: 2010,
            work_end_year: 2054,
            existing_main_account_balance: 0.0,
            existing_subaccount_balance: 0.0,
            sick_leave_days_per_year: 0.0,
            desired_monthly_pension: None,
            as_of_year: 2025,
        }
    }

    /// Flat tables: valorization 1.05 and profitability 1.02 for every year
    fn flat_tables(config: &EngineConfig) -> ResolvedTables {
        let base = default_like_base();
        TableResolver::new(&base, config).resolve(None, 2000, 2100).unwrap()
    }

    fn default_like_base() -> CoefficientTables {
        let mut base = crate::tables::default_tables().clone();
        base.valorization_indices = [(2000, 1.05)].into_iter().collect();
        base.profitability_indices = [(2000, 1.02)].into_iter().collect();
        base
    }

    #[test]
    fn test_one_ledger_entry_per_contribution_year() {
        let config = EngineConfig::default();
        let tables = flat_tables(&config);
        let engine = AccumulationEngine::new(&tables, &config);

        let outcome = engine.accumulate(&test_profile()).unwrap();

        assert_eq!(outcome.years(), 44);
        assert_eq!(outcome.ledger.first().unwrap().year, 2010);
        assert_eq!(outcome.ledger.last().unwrap().year, 2053);
        assert_eq!(outcome.main_balance, outcome.ledger.last().unwrap().main_balance_after);
    }

    #[test]
    fn test_past_salary_flat_future_salary_compounds() {
        let config = EngineConfig::default();
        let tables = flat_tables(&config);
        let engine = AccumulationEngine::new(&tables, &config);
        let profile = test_profile();

        assert_eq!(engine.projected_salary(&profile, 2010), 8000.0);
        assert_eq!(engine.projected_salary(&profile, 2025), 8000.0);
        assert_relative_eq!(engine.projected_salary(&profile, 2026), 8480.0, max_relative = 1e-12);
        assert_relative_eq!(
            engine.projected_salary(&profile, 2035),
            8000.0 * 1.06_f64.powi(10),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_first_year_contribution_split_and_revaluation() {
        let config = EngineConfig::default();
        let tables = flat_tables(&config);
        let engine = AccumulationEngine::new(&tables, &config);

        let outcome = engine.accumulate(&test_profile()).unwrap();
        let first = &outcome.ledger[0];

        // 8000 * 12 = 96000 annual base
        assert_relative_eq!(first.main_contribution, 96_000.0 * 0.1222, max_relative = 1e-12);
        assert_relative_eq!(first.sub_contribution, 96_000.0 * 0.0730, max_relative = 1e-12);
        assert_relative_eq!(first.main_balance_after, 11_731.2 * 1.05, max_relative = 1e-12);
        assert_relative_eq!(first.sub_balance_after, 7_008.0 * 1.02, max_relative = 1e-12);
        assert_eq!(first.valorization_factor_applied, 1.05);
    }

    #[test]
    fn test_sick_leave_reduces_every_contribution_base() {
        let config = EngineConfig::default();
        let tables = flat_tables(&config);
        let engine = AccumulationEngine::new(&tables, &config);

        let healthy = engine.accumulate(&test_profile()).unwrap();
        let mut sick_profile = test_profile();
        sick_profile.sick_leave_days_per_year = 36.5;
        let sick = engine.accumulate(&sick_profile).unwrap();

        for (h, s) in healthy.ledger.iter().zip(&sick.ledger) {
            assert_eq!(h.projected_salary, s.projected_salary);
            assert_relative_eq!(s.contribution_base_salary, h.contribution_base_salary * 0.9, max_relative = 1e-12);
        }
        assert_relative_eq!(sick.total_capital(), healthy.total_capital() * 0.9, max_relative = 1e-9);
    }

    #[test]
    fn test_existing_balances_are_seeded_and_revalued() {
        let config = EngineConfig::default();
        let tables = flat_tables(&config);
        let engine = AccumulationEngine::new(&tables, &config);

        let mut profile = test_profile();
        profile.work_start_year = 2020;
        profile.work_end_year = 2022;
        profile.existing_main_account_balance = 100_000.0;
        profile.existing_subaccount_balance = 10_000.0;

        let with_seed = engine.accumulate(&profile).unwrap();
        profile.existing_main_account_balance = 0.0;
        profile.existing_subaccount_balance = 0.0;
        let without_seed = engine.accumulate(&profile).unwrap();

        assert_relative_eq!(
            with_seed.main_balance - without_seed.main_balance,
            100_000.0 * 1.05 * 1.05,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            with_seed.sub_balance - without_seed.sub_balance,
            10_000.0 * 1.02 * 1.02,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_zero_contribution_years_keeps_seed_only() {
        let config = EngineConfig::default();
        let tables = flat_tables(&config);
        let engine = AccumulationEngine::new(&tables, &config);

        let mut profile = test_profile();
        profile.work_end_year = profile.work_start_year;

        let outcome = engine.accumulate(&profile).unwrap();
        assert!(outcome.ledger.is_empty());
        assert_eq!(outcome.total_capital(), 0.0);
    }

    #[test]
    fn test_year_outside_resolved_range_is_reported() {
        let config = EngineConfig::default();
        let base = default_like_base();
        let tables = TableResolver::new(&base, &config).resolve(None, 2010, 2030).unwrap();
        let engine = AccumulationEngine::new(&tables, &config);

        let err = engine.accumulate(&test_profile()).unwrap_err();
        assert_eq!(err, TableError::MissingFactor { series: "valorization", year: 2031 });
    }
}
