//! Run pension calculations for every profile in a CSV file
//!
//! Outputs one summary row per profile; rejected profiles are written with their
//! error instead of a pension

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pension_projection::{CalculationRequest, PensionCalculator, PensionError, ProfileCandidate};

#[derive(Parser, Debug)]
#[command(name = "run_batch", about = "Batch pension projection over a CSV of profiles")]
struct Cli {
    #[arg(long, default_value = "profiles.csv")]
    input: PathBuf,

    #[arg(long, default_value = "batch_projection_output.csv")]
    output: PathBuf,

    #[arg(long, help = "Year the inputs describe, defaults to the current year")]
    as_of: Option<i32>,
}

/// Raw CSV row; cells stay text so the validator can report bad values per row
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    #[serde(default)]
    age: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    gross_salary: Option<String>,
    #[serde(default)]
    work_start_year: Option<String>,
    #[serde(default)]
    work_end_year: Option<String>,
    #[serde(default)]
    main_account_balance: Option<String>,
    #[serde(default)]
    subaccount_balance: Option<String>,
    #[serde(default)]
    sick_leave_days_per_year: Option<String>,
    #[serde(default)]
    desired_monthly_pension: Option<String>,
}

impl CsvRow {
    fn to_candidate(&self) -> ProfileCandidate {
        ProfileCandidate {
            age: cell(&self.age),
            gender: self.gender.as_deref().map(|g| Value::from(g.trim())),
            gross_salary: cell(&self.gross_salary),
            work_start_year: cell(&self.work_start_year),
            work_end_year: cell(&self.work_end_year),
            existing_main_account_balance: cell(&self.main_account_balance),
            existing_subaccount_balance: cell(&self.subaccount_balance),
            sick_leave_days_per_year: cell(&self.sick_leave_days_per_year),
            desired_monthly_pension: cell(&self.desired_monthly_pension),
        }
    }
}

/// Numeric cell as a JSON number when it parses, otherwise as text
fn cell(raw: &Option<String>) -> Option<Value> {
    let text = raw.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::from(int));
    }
    match text.parse::<f64>() {
        Ok(number) if number.is_finite() => Some(Value::from(number)),
        _ => Some(Value::from(text)),
    }
}

fn read_rows<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<CsvRow>> {
    reader
        .deserialize::<CsvRow>()
        .collect::<Result<Vec<_>, _>>()
        .context("malformed profile row")
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    id: String,
    retirement_year: Option<i32>,
    retirement_age: Option<u32>,
    monthly_pension: Option<f64>,
    monthly_pension_todays_money: Option<f64>,
    replacement_rate_percent: Option<f64>,
    total_capital: Option<f64>,
    minimum_pension_gap: Option<f64>,
    years_to_work_longer: Option<u32>,
    sanity_status: Option<String>,
    warning_count: usize,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let as_of_year = cli.as_of.unwrap_or_else(|| chrono::Local::now().year());

    let start = Instant::now();
    println!("Loading profiles from {}...", cli.input.display());

    let reader =
        csv::Reader::from_path(&cli.input).with_context(|| format!("unable to open {}", cli.input.display()))?;
    let rows = read_rows(reader)?;
    println!("Loaded {} profiles in {:?}", rows.len(), start.elapsed());

    let requests: Vec<CalculationRequest> = rows
        .iter()
        .map(|row| CalculationRequest::new(row.to_candidate(), as_of_year))
        .collect();

    println!("Running calculations...");
    let calc_start = Instant::now();
    let calculator = PensionCalculator::default();
    let results = calculator.calculate_batch(&requests);
    println!("Calculations complete in {:?}", calc_start.elapsed());

    let mut writer =
        csv::Writer::from_path(&cli.output).with_context(|| format!("unable to create {}", cli.output.display()))?;
    let mut rejected = 0;
    let mut pension_total = 0.0;

    for (row, outcome) in rows.iter().zip(&results) {
        let summary = match outcome {
            Ok(result) => {
                pension_total += result.monthly_pension;
                SummaryRow {
                    id: row.id.clone(),
                    retirement_year: Some(result.retirement_year),
                    retirement_age: Some(result.retirement_age),
                    monthly_pension: Some(result.monthly_pension),
                    monthly_pension_todays_money: Some(result.monthly_pension_todays_money),
                    replacement_rate_percent: Some(result.replacement_rate_percent),
                    total_capital: Some(result.pension_capital.total),
                    minimum_pension_gap: result.minimum_pension_gap,
                    years_to_work_longer: result.years_to_work_longer,
                    sanity_status: Some(format!("{:?}", result.sanity_status).to_lowercase()),
                    warning_count: result.warnings.len(),
                    error: None,
                }
            }
            Err(err) => {
                rejected += 1;
                let message = match err {
                    PensionError::Validation(validation) => validation
                        .errors
                        .iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join("; "),
                    other => other.to_string(),
                };
                SummaryRow {
                    id: row.id.clone(),
                    retirement_year: None,
                    retirement_age: None,
                    monthly_pension: None,
                    monthly_pension_todays_money: None,
                    replacement_rate_percent: None,
                    total_capital: None,
                    minimum_pension_gap: None,
                    years_to_work_longer: None,
                    sanity_status: None,
                    warning_count: 0,
                    error: Some(message),
                }
            }
        };
        writer.serialize(summary)?;
    }
    writer.flush()?;

    println!("Output written to {}", cli.output.display());

    let accepted = results.len() - rejected;
    println!("\nBatch Summary:");
    println!("  Profiles:  {}", results.len());
    println!("  Accepted:  {}", accepted);
    println!("  Rejected:  {}", rejected);
    if accepted > 0 {
        println!("  Average monthly pension: {:.2}", pension_total / accepted as f64);
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILES: &str = "\
id,age,gender,gross_salary,work_start_year,work_end_year,main_account_balance,subaccount_balance,sick_leave_days_per_year,desired_monthly_pension
a,35,male,8000,2010,2054,0,0,,
b,thirty,female,6500.50,2008,,,,12,
c,40,Female, 7000 ,2005,,1000.5,,,9000
";

    #[test]
    fn test_malformed_cell_rejects_only_its_row() {
        let rows = read_rows(csv::Reader::from_reader(PROFILES.as_bytes())).unwrap();
        assert_eq!(rows.len(), 3);

        let requests: Vec<_> = rows
            .iter()
            .map(|row| CalculationRequest::new(row.to_candidate(), 2025))
            .collect();
        let results = PensionCalculator::default().calculate_batch(&requests);

        assert!(results[0].is_ok());
        assert!(results[2].is_ok());
        match &results[1] {
            Err(PensionError::Validation(validation)) => {
                assert_eq!(validation.errors.len(), 1);
                assert_eq!(validation.errors[0].field, "age");
                assert_eq!(validation.errors[0].reason, "must be an integer");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_cells_keep_numeric_types() {
        assert_eq!(cell(&Some("35".to_string())), Some(Value::from(35)));
        assert_eq!(cell(&Some(" 7000.5 ".to_string())), Some(Value::from(7000.5)));
        assert_eq!(cell(&Some("n/a".to_string())), Some(Value::from("n/a")));
        assert_eq!(cell(&Some("".to_string())), None);
        assert_eq!(cell(&None), None);
    }
}
