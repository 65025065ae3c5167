//! Annuitization and derived benefit metrics
//!
//! Metrics that need a counterfactual (sick-leave impact, years to work longer)
//! re-run the pure accumulation engine with a modified profile rather than patching
//! intermediate state.

mod annuity;
mod goal;

pub use annuity::{annuitize, round_currency, Annuity};
pub use goal::{search_additional_years, GoalOutcome};

use log::debug;

use crate::config::{EngineConfig, FloorPolicy};
use crate::error::TableError;
use crate::profile::UserProfile;
use crate::projection::{AccumulationEngine, AccumulationOutcome};
use crate::result::{CalculationResult, PensionCapital, SanityStatus};
use crate::tables::ResolvedTables;

/// One accumulation run together with its annuity
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub outcome: AccumulationOutcome,
    pub annuity: Annuity,
}

/// Benefit result before sanity checks, plus the raw goal search outcome
#[derive(Debug, Clone, PartialEq)]
pub struct BenefitAssessment {
    /// Result with an empty warning list and `SanityStatus::Ok`
    pub result: CalculationResult,
    pub goal: Option<GoalOutcome>,
}

/// Computes the benefit and its metrics for a normalized profile
#[derive(Debug, Clone, Copy)]
pub struct BenefitCalculator<'a> {
    engine: AccumulationEngine<'a>,
    tables: &'a ResolvedTables,
    config: &'a EngineConfig,
}

impl<'a> BenefitCalculator<'a> {
    pub fn new(tables: &'a ResolvedTables, config: &'a EngineConfig) -> Self {
        Self {
            engine: AccumulationEngine::new(tables, config),
            tables,
            config,
        }
    }

    /// Accumulate and annuitize a single profile
    pub fn project(&self, profile: &UserProfile) -> Result<Projection, TableError> {
        let outcome = self.engine.accumulate(profile)?;
        let annuity = annuitize(&outcome, profile, self.tables)?;
        Ok(Projection { outcome, annuity })
    }

    pub fn monthly_pension(&self, profile: &UserProfile) -> Result<f64, TableError> {
        Ok(self.project(profile)?.annuity.monthly_pension)
    }

    /// Full metric set for a profile
    pub fn assess(&self, profile: &UserProfile) -> Result<BenefitAssessment, TableError> {
        let Projection { outcome, annuity } = self.project(profile)?;
        let monthly_pension = annuity.monthly_pension;

        let final_year_projected_salary =
            round_currency(self.engine.projected_salary(profile, profile.work_end_year - 1));
        let replacement_rate_percent =
            round_currency(monthly_pension / final_year_projected_salary * 100.0);

        let sick_leave_impact_monthly = self.sick_leave_impact(profile, monthly_pension)?;

        let floor = self.tables.minimum_monthly_pension().amount;
        let minimum_pension_gap =
            (monthly_pension < floor).then(|| round_currency(floor - monthly_pension));
        let guaranteed_monthly_pension = self.guaranteed_pension(profile, monthly_pension, floor);

        let goal = match profile.desired_monthly_pension {
            Some(desired) => Some(search_additional_years(
                profile,
                desired,
                monthly_pension,
                &self.config.goal_search,
                |extended| self.monthly_pension(extended),
            )?),
            None => None,
        };

        let years_ahead = (profile.work_end_year - profile.as_of_year).max(0);
        let monthly_pension_todays_money =
            round_currency(monthly_pension / (1.0 + self.config.inflation_rate).powi(years_ahead));

        debug!(
            "assessed: capital={:.2} months={} pension={:.2} replacement={:.2}%",
            annuity.total_capital, annuity.life_expectancy_months, monthly_pension, replacement_rate_percent
        );

        let result = CalculationResult {
            monthly_pension,
            monthly_pension_todays_money,
            final_year_projected_salary,
            replacement_rate_percent,
            sick_leave_impact_monthly,
            minimum_pension_gap,
            guaranteed_monthly_pension,
            years_to_work_longer: goal.and_then(|g| g.additional_years()),
            pension_capital: PensionCapital {
                main_account: round_currency(outcome.main_balance),
                subaccount: round_currency(outcome.sub_balance),
                total: round_currency(annuity.total_capital),
            },
            total_work_years: profile.total_work_years(),
            retirement_year: profile.work_end_year,
            retirement_age: annuity.retirement_age,
            life_expectancy_months: annuity.life_expectancy_months,
            as_of_year: profile.as_of_year,
            tables_version: self.tables.version().to_string(),
            sanity_status: SanityStatus::Ok,
            audit_trail: outcome.ledger,
            warnings: Vec::new(),
        };

        Ok(BenefitAssessment { result, goal })
    }

    /// Pension with reported sick leave minus the zero-sick-leave counterfactual
    fn sick_leave_impact(&self, profile: &UserProfile, monthly_pension: f64) -> Result<f64, TableError> {
        if profile.sick_leave_days_per_year == 0.0 {
            return Ok(0.0);
        }
        let healthy = self.monthly_pension(&profile.without_sick_leave())?;
        Ok(round_currency(monthly_pension - healthy))
    }

    fn guaranteed_pension(&self, profile: &UserProfile, monthly_pension: f64, floor: f64) -> Option<f64> {
        match &self.config.floor_policy {
            FloorPolicy::ReportOnly => None,
            FloorPolicy::Guarantee { min_contribution_years } => {
                let required = *min_contribution_years.get(profile.gender);
                (profile.total_work_years() >= required).then(|| monthly_pension.max(floor))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ByGender, Gender};
    use crate::tables::TableResolver;
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

    fn resolved(config: &EngineConfig) -> ResolvedTables {
        TableResolver::with_defaults(config).resolve(None, 1990, 2080).unwrap()
    }

    #[test]
    fn test_pension_is_capital_over_life_expectancy() {
        let config = EngineConfig::default();
        let tables = resolved(&config);
        let calc = BenefitCalculator::new(&tables, &config);

        let projection = calc.project(&test_profile()).unwrap();

        // Born 1990, contributions stop in 2054: age 64
        assert_eq!(projection.annuity.retirement_age, 64);
        assert_eq!(projection.annuity.life_expectancy_months, 217);
        assert_eq!(
            projection.annuity.monthly_pension,
            round_currency(projection.outcome.total_capital() / 217.0)
        );
    }

    #[test]
    fn test_replacement_rate_uses_last_contribution_year_salary() {
        let config = EngineConfig::default();
        let tables = resolved(&config);
        let result = BenefitCalculator::new(&tables, &config)
            .assess(&test_profile())
            .unwrap()
            .result;

        assert_relative_eq!(
            result.final_year_projected_salary,
            8000.0 * 1.06_f64.powi(28),
            max_relative = 1e-6
        );
        assert_relative_eq!(
            result.replacement_rate_percent,
            result.monthly_pension / result.final_year_projected_salary * 100.0,
            epsilon = 0.01
        );
        assert_eq!(result.audit_trail.len(), 44);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_zero_sick_leave_has_exactly_zero_impact() {
        let config = EngineConfig::default();
        let tables = resolved(&config);
        let result = BenefitCalculator::new(&tables, &config)
            .assess(&test_profile())
            .unwrap()
            .result;

        assert_eq!(result.sick_leave_impact_monthly, 0.0);
        assert!(result.sick_leave_impact_monthly.is_sign_positive());
    }

    #[test]
    fn test_minimum_gap_reported_without_raising_benefit() {
        let config = EngineConfig::default();
        let tables = resolved(&config);
        let mut profile = test_profile();
        profile.gross_salary = 500.0;
        profile.work_start_year = 2020;
        profile.work_end_year = 2030;

        let result = BenefitCalculator::new(&tables, &config).assess(&profile).unwrap().result;

        let gap = result.minimum_pension_gap.unwrap();
        assert!(result.monthly_pension < 1780.96);
        assert_relative_eq!(gap + result.monthly_pension, 1780.96, epsilon = 0.011);
        assert_eq!(result.guaranteed_monthly_pension, None);
    }

    #[test]
    fn test_guarantee_policy_requires_contribution_years() {
        let mut config = EngineConfig::default();
        config.floor_policy = FloorPolicy::Guarantee {
            min_contribution_years: ByGender::new(25, 20),
        };
        let tables = resolved(&config);
        let calc = BenefitCalculator::new(&tables, &config);

        let mut short = test_profile();
        short.gross_salary = 500.0;
        short.work_start_year = 2020;
        short.work_end_year = 2030;
        let short_result = calc.assess(&short).unwrap().result;
        assert_eq!(short_result.guaranteed_monthly_pension, None);

        let mut long = short.clone();
        long.work_start_year = 2000;
        long.work_end_year = 2030;
        let long_result = calc.assess(&long).unwrap().result;
        assert!(long_result.monthly_pension < 1780.96);
        assert_eq!(long_result.guaranteed_monthly_pension, Some(1780.96));
    }

    #[test]
    fn test_todays_money_deflates_by_inflation() {
        let config = EngineConfig::default();
        let tables = resolved(&config);
        let result = BenefitCalculator::new(&tables, &config)
            .assess(&test_profile())
            .unwrap()
            .result;

        assert_relative_eq!(
            result.monthly_pension_todays_money,
            result.monthly_pension / 1.025_f64.powi(29),
            epsilon = 0.01
        );
    }
}
