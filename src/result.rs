//! Calculation result returned to callers

use serde::{Deserialize, Serialize};

use crate::projection::YearlyLedgerEntry;

/// Final capital by account
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PensionCapital {
    pub main_account: f64,
    pub subaccount: f64,
    pub total: f64,
}

/// Overall plausibility of a result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanityStatus {
    /// No plausibility concerns
    #[default]
    Ok,
    /// Result is plausible but notable
    Warning,
    /// Result is likely driven by wrong inputs
    Uncertain,
}

impl SanityStatus {
    /// Raise the status to at least `other`
    pub fn escalate(&mut self, other: SanityStatus) {
        if other > *self {
            *self = other;
        }
    }
}

/// Complete, immutable outcome of one calculation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Monthly benefit at retirement, nominal, rounded half-even to cents
    pub monthly_pension: f64,

    /// Monthly benefit deflated to the as-of year
    pub monthly_pension_todays_money: f64,

    /// Monthly salary projected for the last contribution year
    pub final_year_projected_salary: f64,

    pub replacement_rate_percent: f64,

    /// Pension with reported sick leave minus pension without any (<= 0)
    pub sick_leave_impact_monthly: f64,

    /// Shortfall to the statutory minimum; absent when the floor is met
    pub minimum_pension_gap: Option<f64>,

    /// Benefit topped up to the floor, only under a guarantee floor policy
    pub guaranteed_monthly_pension: Option<f64>,

    /// Extra years needed to reach the desired pension; absent when no goal was
    /// given, the goal is already met, or it is unreachable within the search horizon
    pub years_to_work_longer: Option<u32>,

    pub pension_capital: PensionCapital,

    pub total_work_years: u32,
    pub retirement_year: i32,
    pub retirement_age: u32,
    pub life_expectancy_months: u32,
    pub as_of_year: i32,
    pub tables_version: String,

    pub sanity_status: SanityStatus,

    pub audit_trail: Vec<YearlyLedgerEntry>,

    pub warnings: Vec<String>,
}
