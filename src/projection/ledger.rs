//! Audit trail structures for accumulation

use serde::{Deserialize, Serialize};

/// One contribution year in the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyLedgerEntry {
    pub year: i32,

    /// Monthly salary before the sick-leave reduction
    pub projected_salary: f64,

    /// Monthly salary the contributions are levied on
    pub contribution_base_salary: f64,

    pub main_contribution: f64,
    pub sub_contribution: f64,

    pub valorization_factor_applied: f64,
    pub profitability_factor_applied: f64,

    // Balances after contributions and year-close revaluation
    pub main_balance_after: f64,
    pub sub_balance_after: f64,
}

impl YearlyLedgerEntry {
    pub fn total_contribution(&self) -> f64 {
        self.main_contribution + self.sub_contribution
    }

    pub fn total_balance_after(&self) -> f64 {
        self.main_balance_after + self.sub_balance_after
    }
}

/// Result of walking the contribution timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationOutcome {
    pub ledger: Vec<YearlyLedgerEntry>,
    pub main_balance: f64,
    pub sub_balance: f64,
}

impl AccumulationOutcome {
    pub fn total_capital(&self) -> f64 {
        self.main_balance + self.sub_balance
    }

    /// Sum of contributions paid in, before revaluation
    pub fn total_contributions(&self) -> f64 {
        self.ledger.iter().map(|e| e.total_contribution()).sum()
    }

    pub fn years(&self) -> usize {
        self.ledger.len()
    }
}
