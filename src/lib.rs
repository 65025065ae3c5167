//! Pension Projection - retirement benefit engine for a notional defined-contribution scheme
//!
//! This library provides:
//! - Input validation with complete error reporting and advisory warnings
//! - Coefficient table resolution (valorization, profitability, life expectancy)
//! - Year-by-year accumulation of the main account and subaccount
//! - Annuitization, replacement rate, sick-leave impact and goal search
//! - Plausibility checks against population baselines
//! - Parallel batch calculation

pub mod benefit;
pub mod calculator;
pub mod config;
pub mod error;
pub mod profile;
pub mod projection;
pub mod result;
pub mod sanity;
pub mod tables;
pub mod validation;

// Re-export commonly used types
pub use calculator::{CalculationRequest, PensionCalculator};
pub use config::{EngineConfig, FloorPolicy};
pub use error::{PensionError, TableError, ValidationError};
pub use profile::{Gender, ProfileCandidate, UserProfile};
pub use result::{CalculationResult, SanityStatus};
pub use tables::{default_tables, CoefficientTables};
