//! Engine configuration: contribution policy, growth assumptions and check bands
//!
//! Every struct implements `Default` with the statutory values and derives serde with
//! `#[serde(default)]`, so a partial JSON document overrides only the fields it names.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::profile::ByGender;

/// Share of gross salary credited to the main account (12.22%)
pub const MAIN_CONTRIBUTION_RATE: f64 = 0.1222;

/// Share of gross salary credited to the subaccount (7.30%)
pub const SUB_CONTRIBUTION_RATE: f64 = 0.0730;

/// Default nominal annual salary growth for years after the as-of year
pub const DEFAULT_SALARY_GROWTH_RATE: f64 = 0.06;

/// Configuration for a calculation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Main account contribution rate
    pub main_contribution_rate: f64,

    /// Subaccount contribution rate
    pub sub_contribution_rate: f64,

    /// Annual salary growth applied after the as-of year
    pub salary_growth_rate: f64,

    /// Annual inflation used to express the pension in today's money
    pub inflation_rate: f64,

    /// Statutory retirement age by gender (default career end)
    pub retirement_age: ByGender<u32>,

    /// Valorization factor assumed when no series data exists at all
    pub long_run_valorization: f64,

    /// Profitability factor assumed when no series data exists at all
    pub long_run_profitability: f64,

    pub goal_search: GoalSearchConfig,

    pub floor_policy: FloorPolicy,

    pub validation: ValidationConfig,

    pub sanity: SanityConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            main_contribution_rate: MAIN_CONTRIBUTION_RATE,
            sub_contribution_rate: SUB_CONTRIBUTION_RATE,
            salary_growth_rate: DEFAULT_SALARY_GROWTH_RATE,
            inflation_rate: 0.025,
            retirement_age: ByGender::new(65, 60),
            long_run_valorization: 1.04,
            long_run_profitability: 1.035,
            goal_search: GoalSearchConfig::default(),
            floor_policy: FloorPolicy::default(),
            validation: ValidationConfig::default(),
            sanity: SanityConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Statutory total contribution rate (main + sub)
    pub fn total_contribution_rate(&self) -> f64 {
        self.main_contribution_rate + self.sub_contribution_rate
    }
}

/// Limits for the years-to-work-longer search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalSearchConfig {
    /// Maximum number of additional years tried
    pub max_additional_years: u32,

    /// Optional wall-clock budget; exceeding it counts as "unreachable"
    pub time_budget: Option<Duration>,
}

impl Default for GoalSearchConfig {
    fn default() -> Self {
        Self {
            max_additional_years: 20,
            time_budget: None,
        }
    }
}

/// How the statutory minimum pension is applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FloorPolicy {
    /// Report the gap to the floor only
    #[default]
    ReportOnly,
    /// Also report a guaranteed benefit topped up to the floor for careers
    /// with at least the given number of contribution years
    Guarantee { min_contribution_years: ByGender<u32> },
}

impl FloorPolicy {
    /// Polish statutory eligibility: 25 years for men, 20 for women
    pub fn statutory_guarantee() -> Self {
        FloorPolicy::Guarantee {
            min_contribution_years: ByGender::new(25, 20),
        }
    }
}

/// Bands used by the input validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_age: i64,
    pub max_age: i64,
    /// Ages below this (but valid) draw a warning
    pub young_age_warning: i64,
    /// Careers starting before this age draw a warning
    pub min_working_age: i64,
    /// Retirement more than this many years off the statutory age draws a warning
    pub retirement_deviation_years: i64,
    /// Career end further ahead than this draws a warning
    pub far_future_years: i64,
    pub low_salary: f64,
    pub high_salary: f64,
    pub high_main_balance: f64,
    pub high_sub_balance: f64,
    pub max_sick_leave_days: f64,
    pub high_sick_leave_days: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_age: 16,
            max_age: 100,
            young_age_warning: 20,
            min_working_age: 16,
            retirement_deviation_years: 10,
            far_future_years: 50,
            low_salary: 3000.0,
            high_salary: 100_000.0,
            high_main_balance: 5_000_000.0,
            high_sub_balance: 2_000_000.0,
            max_sick_leave_days: 365.0,
            high_sick_leave_days: 100.0,
        }
    }
}

/// Bands used by the result sanity checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    /// Pension in today's money above this multiple of the gender average is implausibly high
    pub high_multiple_of_average: f64,
    /// Pension below this fraction of the gender average is implausibly low
    pub low_fraction_of_average: f64,
    pub min_replacement_rate: f64,
    pub max_replacement_rate: f64,
    /// Absolute ceiling for a realistic monthly pension in today's money
    pub max_realistic_pension: f64,
    /// Existing balances above this multiple of the contributions the reported
    /// salary could have produced so far are implausible
    pub balance_plausibility_multiple: f64,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            high_multiple_of_average: 3.0,
            low_fraction_of_average: 0.3,
            min_replacement_rate: 15.0,
            max_replacement_rate: 100.0,
            max_realistic_pension: 20_000.0,
            balance_plausibility_multiple: 3.0,
        }
    }
}
