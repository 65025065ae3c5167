//! Pension Projection CLI
//!
//! Runs one calculation for a profile read from JSON and prints the result

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use serde::de::DeserializeOwned;

use pension_projection::{
    CalculationRequest, CalculationResult, CoefficientTables, EngineConfig, PensionCalculator, PensionError,
    ProfileCandidate,
};

#[derive(Parser, Debug)]
#[command(
    name = "pension_projection",
    about = "Project a monthly pension from a notional defined-contribution account history"
)]
struct Cli {
    #[arg(long, help = "Profile JSON (age, gender, gross_salary, work_start_year, ...)")]
    profile: PathBuf,

    #[arg(long, help = "Coefficient table overrides JSON; missing parts use the built-in snapshot")]
    tables: Option<PathBuf>,

    #[arg(long, help = "Engine configuration JSON; missing fields keep their defaults")]
    config: Option<PathBuf>,

    #[arg(long, help = "Year the inputs describe, defaults to the current year")]
    as_of: Option<i32>,

    #[arg(long, help = "Write the yearly ledger to this CSV file")]
    ledger_csv: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Print the full result as JSON instead of a summary")]
    json: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("unable to open {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("unable to parse {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let profile: ProfileCandidate = read_json(&cli.profile)?;
    let tables: Option<CoefficientTables> = cli.tables.as_deref().map(read_json).transpose()?;
    let config: EngineConfig = match cli.config.as_deref() {
        Some(path) => read_json(path)?,
        None => EngineConfig::default(),
    };
    let as_of_year = cli.as_of.unwrap_or_else(|| chrono::Local::now().year());

    let calculator = PensionCalculator::new(config);
    let request = CalculationRequest { profile, tables, as_of_year };

    let result = match calculator.calculate(&request) {
        Ok(result) => result,
        Err(PensionError::Validation(validation)) => {
            eprintln!("Input rejected ({} error(s)):", validation.errors.len());
            for error in &validation.errors {
                eprintln!("  {error}");
            }
            std::process::exit(2);
        }
        Err(err) => return Err(err).context("calculation failed"),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    if let Some(path) = cli.ledger_csv.as_deref() {
        write_ledger(path, &result)?;
        println!("\nLedger written to {}", path.display());
    }

    Ok(())
}

fn print_summary(result: &CalculationResult) {
    println!("Pension Projection (tables {}, as of {})", result.tables_version, result.as_of_year);
    println!("==========================================\n");

    println!("Retirement:");
    println!("  Year: {}  Age: {}", result.retirement_year, result.retirement_age);
    println!("  Contribution years: {}", result.total_work_years);
    println!("  Life expectancy: {} months", result.life_expectancy_months);
    println!();

    println!("Capital:");
    println!("  Main account: {:>14.2}", result.pension_capital.main_account);
    println!("  Subaccount:   {:>14.2}", result.pension_capital.subaccount);
    println!("  Total:        {:>14.2}", result.pension_capital.total);
    println!();

    println!("Benefit:");
    println!("  Monthly pension:        {:>12.2}", result.monthly_pension);
    println!("  In today's money:       {:>12.2}", result.monthly_pension_todays_money);
    println!("  Final projected salary: {:>12.2}", result.final_year_projected_salary);
    println!("  Replacement rate:       {:>11.2}%", result.replacement_rate_percent);
    println!("  Sick leave impact:      {:>12.2}", result.sick_leave_impact_monthly);
    if let Some(gap) = result.minimum_pension_gap {
        println!("  Gap to minimum:         {:>12.2}", gap);
    }
    if let Some(guaranteed) = result.guaranteed_monthly_pension {
        println!("  Guaranteed pension:     {:>12.2}", guaranteed);
    }
    if let Some(years) = result.years_to_work_longer {
        println!("  Work longer by:         {:>12} year(s)", years);
    }
    println!("  Sanity status: {:?}", result.sanity_status);
    println!();

    println!("{:>5} {:>12} {:>12} {:>10} {:>10} {:>8} {:>8} {:>14} {:>14}",
        "Year", "Salary", "Base", "MainContr", "SubContr", "Valor", "Profit", "Main", "Sub");
    println!("{}", "-".repeat(105));

    for row in result.audit_trail.iter().take(10) {
        println!("{:>5} {:>12.2} {:>12.2} {:>10.2} {:>10.2} {:>8.4} {:>8.4} {:>14.2} {:>14.2}",
            row.year,
            row.projected_salary,
            row.contribution_base_salary,
            row.main_contribution,
            row.sub_contribution,
            row.valorization_factor_applied,
            row.profitability_factor_applied,
            row.main_balance_after,
            row.sub_balance_after,
        );
    }
    if result.audit_trail.len() > 10 {
        println!("... ({} more years)", result.audit_trail.len() - 10);
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }
}

fn write_ledger(path: &Path, result: &CalculationResult) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("unable to create {}", path.display()))?;
    for row in &result.audit_trail {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
