//! Accumulation of contributions across a working career

mod state;
mod engine;
mod ledger;

pub use state::AccumulationState;
pub use engine::AccumulationEngine;
pub use ledger::{AccumulationOutcome, YearlyLedgerEntry};
