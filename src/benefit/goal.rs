//! Bounded search for the extra working years needed to reach a desired pension

use std::time::Instant;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::GoalSearchConfig;
use crate::error::TableError;
use crate::profile::UserProfile;

/// Outcome of a goal search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GoalOutcome {
    /// The projected pension already meets the goal
    AlreadyMet,
    /// The goal is met after working this many additional years
    Reached { additional_years: u32, monthly_pension: f64 },
    /// No tried extension met the goal
    Unreachable {
        tried_years: u32,
        best_monthly_pension: f64,
        timed_out: bool,
    },
}

impl GoalOutcome {
    pub fn additional_years(&self) -> Option<u32> {
        match self {
            GoalOutcome::Reached { additional_years, .. } => Some(*additional_years),
            _ => None,
        }
    }
}

/// Extend the career one year at a time until `pension_for` meets `desired`
///
/// `pension_for` must be a pure function of the profile it is given. The search stops
/// after `max_additional_years` attempts or when the optional time budget runs out.
pub fn search_additional_years<F>(
    profile: &UserProfile,
    desired: f64,
    current_pension: f64,
    limits: &GoalSearchConfig,
    mut pension_for: F,
) -> Result<GoalOutcome, TableError>
where
    F: FnMut(&UserProfile) -> Result<f64, TableError>,
{
    if current_pension >= desired {
        return Ok(GoalOutcome::AlreadyMet);
    }

    let started = Instant::now();
    let mut best = current_pension;
    let mut tried = 0;

    for extra in 1..=limits.max_additional_years {
        if let Some(budget) = limits.time_budget {
            if started.elapsed() > budget {
                warn!("goal search stopped by time budget after {tried} year(s)");
                return Ok(GoalOutcome::Unreachable {
                    tried_years: tried,
                    best_monthly_pension: best,
                    timed_out: true,
                });
            }
        }

        let extended = profile.with_work_end_year(profile.work_end_year + extra as i32);
        let pension = pension_for(&extended)?;
        tried = extra;
        best = best.max(pension);
        debug!("goal search: +{extra} year(s) -> {pension:.2}");

        if pension >= desired {
            return Ok(GoalOutcome::Reached {
                additional_years: extra,
                monthly_pension: pension,
            });
        }
    }

    Ok(GoalOutcome::Unreachable {
        tried_years: tried,
        best_monthly_pension: best,
        timed_out: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Gender;
    use std::time::Duration;

    fn profile() -> UserProfile {
        UserProfile {
            age: 40,
            gender: Gender::Female,
            gross_salary: 6000.0,
            work_start_year: 2005,
            work_end_year: 2045,
            existing_main_account_balance: 0.0,
            existing_subaccount_balance: 0.0,
            sick_leave_days_per_year: 0.0,
            desired_monthly_pension: None,
            as_of_year: 2025,
        }
    }

    /// 100 per year worked beyond 2045, on top of 1000
    fn linear_pension(p: &UserProfile) -> Result<f64, TableError> {
        Ok(1000.0 + 100.0 * (p.work_end_year - 2045) as f64)
    }

    #[test]
    fn test_goal_already_met() {
        let outcome = search_additional_years(&profile(), 900.0, 1000.0, &GoalSearchConfig::default(), linear_pension)
            .unwrap();
        assert_eq!(outcome, GoalOutcome::AlreadyMet);
        assert_eq!(outcome.additional_years(), None);
    }

    #[test]
    fn test_smallest_sufficient_extension() {
        let outcome = search_additional_years(&profile(), 1250.0, 1000.0, &GoalSearchConfig::default(), linear_pension)
            .unwrap();

        assert_eq!(
            outcome,
            GoalOutcome::Reached { additional_years: 3, monthly_pension: 1300.0 }
        );
    }

    #[test]
    fn test_unreachable_goal_is_bounded() {
        let mut calls = 0;
        let limits = GoalSearchConfig { max_additional_years: 20, time_budget: None };

        let outcome = search_additional_years(&profile(), 1_000_000.0, 1000.0, &limits, |p| {
            calls += 1;
            linear_pension(p)
        })
        .unwrap();

        assert_eq!(calls, 20);
        assert_eq!(
            outcome,
            GoalOutcome::Unreachable { tried_years: 20, best_monthly_pension: 3000.0, timed_out: false }
        );
    }

    #[test]
    fn test_exhausted_time_budget_counts_as_unreachable() {
        let limits = GoalSearchConfig {
            max_additional_years: 20,
            time_budget: Some(Duration::ZERO),
        };

        let outcome = search_additional_years(&profile(), 1_000_000.0, 1000.0, &limits, |p| {
            std::thread::sleep(Duration::from_millis(1));
            linear_pension(p)
        })
        .unwrap();

        match outcome {
            GoalOutcome::Unreachable { timed_out, tried_years, .. } => {
                assert!(timed_out);
                assert!(tried_years < 20);
            }
            other => panic!("expected unreachable, got {other:?}"),
        }
    }

    #[test]
    fn test_table_errors_propagate() {
        let err = search_additional_years(&profile(), 2000.0, 1000.0, &GoalSearchConfig::default(), |_| {
            Err(TableError::MissingFactor { series: "valorization", year: 2046 })
        })
        .unwrap_err();

        assert_eq!(err, TableError::MissingFactor { series: "valorization", year: 2046 });
    }
}
