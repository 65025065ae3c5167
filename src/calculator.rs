//! Request orchestration: validate, resolve tables, project, annuitize, check
//!
//! The calculator holds the engine configuration and the base coefficient tables and
//! is otherwise stateless, so a single instance can serve any number of concurrent
//! requests.

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::benefit::{BenefitCalculator, GoalOutcome};
use crate::config::EngineConfig;
use crate::error::PensionError;
use crate::profile::{ProfileCandidate, UserProfile};
use crate::result::CalculationResult;
use crate::sanity::SanityChecker;
use crate::tables::{default_tables, CoefficientTables, TableResolver};
use crate::validation::InputValidator;

/// One calculation: raw profile, optional table overrides and the as-of year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub profile: ProfileCandidate,

    /// Partial or complete tables; missing parts fall back to the base tables
    #[serde(default)]
    pub tables: Option<CoefficientTables>,

    /// Year the inputs describe; salary stays flat up to and including it
    pub as_of_year: i32,
}

impl CalculationRequest {
    pub fn new(profile: ProfileCandidate, as_of_year: i32) -> Self {
        Self { profile, tables: None, as_of_year }
    }

    pub fn with_tables(mut self, tables: CoefficientTables) -> Self {
        self.tables = Some(tables);
        self
    }
}

/// Pension calculator with pre-loaded configuration and base tables
///
/// # Example
/// ```ignore
/// let calculator = PensionCalculator::default();
/// let request = CalculationRequest::new(
///     ProfileCandidate::new(35, "male", 8000.0, 2010).with_work_end_year(2054),
///     2025,
/// );
/// let result = calculator.calculate(&request)?;
/// ```
#[derive(Debug, Clone)]
pub struct PensionCalculator {
    config: EngineConfig,
    /// Replaces the compiled-in snapshot when set
    base_tables: Option<CoefficientTables>,
}

impl PensionCalculator {
    /// Calculator backed by the compiled-in table snapshot
    pub fn new(config: EngineConfig) -> Self {
        Self { config, base_tables: None }
    }

    /// Calculator backed by an operator-supplied base table set
    pub fn with_base_tables(config: EngineConfig, base_tables: CoefficientTables) -> Self {
        Self {
            config,
            base_tables: Some(base_tables),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn base_tables(&self) -> &CoefficientTables {
        self.base_tables.as_ref().unwrap_or_else(|| default_tables())
    }

    /// Validate a raw request and compute its result
    pub fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResult, PensionError> {
        let validator = InputValidator::new(&self.config, request.as_of_year);
        let validated = validator.validate(&request.profile)?;

        info!(
            "calculating pension: age={} gender={} salary={:.2} years={}..{}",
            validated.profile.age,
            validated.profile.gender.as_str(),
            validated.profile.gross_salary,
            validated.profile.work_start_year,
            validated.profile.work_end_year
        );

        self.run(&validated.profile, request.tables.as_ref(), validated.warnings)
    }

    /// Compute the result for an already normalized profile, skipping input validation
    pub fn calculate_profile(
        &self,
        profile: &UserProfile,
        tables: Option<&CoefficientTables>,
    ) -> Result<CalculationResult, PensionError> {
        self.run(profile, tables, Vec::new())
    }

    /// Calculate many requests in parallel; results keep the input order
    pub fn calculate_batch(&self, requests: &[CalculationRequest]) -> Vec<Result<CalculationResult, PensionError>> {
        requests.par_iter().map(|request| self.calculate(request)).collect()
    }

    fn run(
        &self,
        profile: &UserProfile,
        overrides: Option<&CoefficientTables>,
        warnings: Vec<String>,
    ) -> Result<CalculationResult, PensionError> {
        // Goal search may extend the career by up to max_additional_years
        let last_year = i32::try_from(self.config.goal_search.max_additional_years)
            .ok()
            .and_then(|extra| profile.work_end_year.checked_add(extra - 1))
            .ok_or(PensionError::HorizonOutOfRange {
                work_end_year: profile.work_end_year,
            })?;
        let tables = TableResolver::new(self.base_tables(), &self.config).resolve(
            overrides,
            profile.work_start_year,
            last_year,
        )?;

        let assessment = BenefitCalculator::new(&tables, &self.config).assess(profile)?;
        let mut result = assessment.result;
        result.warnings = warnings;

        if let (Some(GoalOutcome::Unreachable { tried_years, best_monthly_pension, timed_out }), Some(desired)) =
            (assessment.goal, profile.desired_monthly_pension)
        {
            warn!("desired pension {desired:.2} unreachable (best {best_monthly_pension:.2})");
            let horizon = if timed_out {
                format!("{tried_years} additional year(s) before the search time budget ran out")
            } else {
                format!("{tried_years} additional year(s)")
            };
            result.warnings.push(format!(
                "Desired pension {desired:.2} is not reachable within {horizon}; best projected pension is {best_monthly_pension:.2}"
            ));
        }

        SanityChecker::new(&self.config).check(&mut result, profile, &tables);

        info!(
            "pension calculated: {:.2}/month at age {} (replacement {:.2}%, status {:?})",
            result.monthly_pension, result.retirement_age, result.replacement_rate_percent, result.sanity_status
        );

        Ok(result)
    }
}

impl Default for PensionCalculator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
