//! Plausibility checks on a computed result
//!
//! Checks only append warnings and escalate [`SanityStatus`]; computed amounts are
//! never touched.

use log::info;

use crate::config::EngineConfig;
use crate::profile::UserProfile;
use crate::result::{CalculationResult, SanityStatus};
use crate::tables::ResolvedTables;

/// Compares results against population baselines and input plausibility
#[derive(Debug, Clone, Copy)]
pub struct SanityChecker<'a> {
    config: &'a EngineConfig,
}

impl<'a> SanityChecker<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, result: &mut CalculationResult, profile: &UserProfile, tables: &ResolvedTables) {
        let bands = &self.config.sanity;
        let pension = result.monthly_pension;
        // Averages and the realistic ceiling are today's amounts
        let todays = result.monthly_pension_todays_money;
        let gender = profile.gender;
        let mut status = SanityStatus::Ok;
        let mut warnings = Vec::new();

        let average = tables.average_monthly_pension(gender);
        if todays > average * bands.high_multiple_of_average {
            warnings.push(format!(
                "Monthly pension in today's money {todays:.2} is more than {}x the {} average of {average:.2} - implausibly high, verify inputs",
                bands.high_multiple_of_average,
                gender.as_str()
            ));
            status.escalate(SanityStatus::Uncertain);
        } else if todays < average * bands.low_fraction_of_average {
            warnings.push(format!(
                "Monthly pension in today's money {todays:.2} is below {}x the {} average of {average:.2} - implausibly low",
                bands.low_fraction_of_average,
                gender.as_str()
            ));
            status.escalate(SanityStatus::Uncertain);
        }

        if todays > bands.max_realistic_pension {
            warnings.push(format!(
                "Monthly pension in today's money {todays:.2} exceeds the realistic maximum of {:.2}",
                bands.max_realistic_pension
            ));
            status.escalate(SanityStatus::Uncertain);
        }

        let rate = result.replacement_rate_percent;
        if rate < bands.min_replacement_rate {
            warnings.push(format!(
                "Replacement rate {rate:.1}% is below {:.0}% - consider working longer",
                bands.min_replacement_rate
            ));
            status.escalate(SanityStatus::Warning);
        } else if rate > bands.max_replacement_rate {
            warnings.push(format!(
                "Replacement rate {rate:.1}% is above {:.0}% - check the assumptions",
                bands.max_replacement_rate
            ));
            status.escalate(SanityStatus::Warning);
        }

        if pension > result.final_year_projected_salary {
            warnings.push("Pension exceeds the final projected salary - check the inputs".to_string());
            status.escalate(SanityStatus::Uncertain);
        }

        if result.minimum_pension_gap.is_some() {
            let floor = tables.minimum_monthly_pension();
            warnings.push(format!(
                "Pension is below the statutory minimum of {:.2} (effective {})",
                floor.amount, floor.effective_date
            ));
            status.escalate(SanityStatus::Warning);
        }

        let existing = profile.existing_main_account_balance + profile.existing_subaccount_balance;
        let ceiling = self.plausible_existing_balance(profile);
        if existing > ceiling {
            warnings.push(format!(
                "Existing balances ({existing:.2}) exceed what the reported salary could have accumulated ({ceiling:.2})"
            ));
            status.escalate(SanityStatus::Warning);
        }

        info!("sanity check: {:?} ({} finding(s))", status, warnings.len());
        result.warnings.extend(warnings);
        result.sanity_status.escalate(status);
    }

    /// Upper bound for balances built from the reported salary since work began
    fn plausible_existing_balance(&self, profile: &UserProfile) -> f64 {
        let years_so_far = (profile.as_of_year - profile.work_start_year).max(1) as f64;
        profile.gross_salary
            * 12.0
            * self.config.total_contribution_rate()
            * years_so_far
            * self.config.sanity.balance_plausibility_multiple
    }
}
