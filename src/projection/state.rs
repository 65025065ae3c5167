//! Running account balances during accumulation

use crate::profile::UserProfile;

/// Balances of both accounts at a point in the contribution timeline
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulationState {
    /// Year being simulated
    pub year: i32,

    /// Main account balance (valorized)
    pub main_balance: f64,

    /// Subaccount balance (profitability-indexed)
    pub sub_balance: f64,
}

impl AccumulationState {
    /// Seed balances from the profile before the first simulated year
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            year: profile.work_start_year,
            main_balance: profile.existing_main_account_balance,
            sub_balance: profile.existing_subaccount_balance,
        }
    }

    /// Add the year's contributions
    pub fn credit(&mut self, main_contribution: f64, sub_contribution: f64) {
        self.main_balance += main_contribution;
        self.sub_balance += sub_contribution;
    }

    /// Apply year-close revaluation to both accounts
    pub fn revalue(&mut self, valorization: f64, profitability: f64) {
        self.main_balance *= valorization;
        self.sub_balance *= profitability;
    }

    pub fn advance_year(&mut self) {
        self.year += 1;
    }

    pub fn total(&self) -> f64 {
        self.main_balance + self.sub_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_contribution_then_revaluation_order() {
        let mut state = AccumulationState {
            year: 2020,
            main_balance: 1000.0,
            sub_balance: 500.0,
        };

        state.credit(100.0, 50.0);
        state.revalue(1.10, 1.02);
        state.advance_year();

        assert_eq!(state.year, 2021);
        assert_relative_eq!(state.main_balance, 1210.0, max_relative = 1e-12);
        assert_relative_eq!(state.sub_balance, 561.0, max_relative = 1e-12);
        assert_relative_eq!(state.total(), 1771.0, max_relative = 1e-12);
    }
}
