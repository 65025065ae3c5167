//! Conversion of accumulated capital into a monthly benefit

use crate::error::TableError;
use crate::profile::UserProfile;
use crate::projection::AccumulationOutcome;
use crate::tables::ResolvedTables;

/// Round to currency precision using round-half-even
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round_ties_even() / 100.0
}

/// Annuitized benefit for one accumulation outcome
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annuity {
    pub total_capital: f64,
    pub retirement_age: u32,
    pub life_expectancy_months: u32,
    /// Rounded to cents
    pub monthly_pension: f64,
}

/// Divide total capital by the expected payout months at the retirement age
pub fn annuitize(
    outcome: &AccumulationOutcome,
    profile: &UserProfile,
    tables: &ResolvedTables,
) -> Result<Annuity, TableError> {
    let total_capital = outcome.total_capital();
    let retirement_age = profile.retirement_age();
    let life_expectancy_months = tables.life_expectancy_months(profile.gender, retirement_age)?;

    Ok(Annuity {
        total_capital,
        retirement_age,
        life_expectancy_months,
        monthly_pension: round_currency(total_capital / life_expectancy_months as f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_currency(2.125), 2.12);
        assert_eq!(round_currency(0.375), 0.38);
        assert_eq!(round_currency(0.625), 0.62);
        assert_eq!(round_currency(1000.0), 1000.0);
        assert_eq!(round_currency(1234.5678), 1234.57);
        assert_eq!(round_currency(0.0), 0.0);
    }
}
