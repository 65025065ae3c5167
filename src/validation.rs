//! Input validation for calculation requests
//!
//! Blocking rules accumulate into a single [`ValidationError`]; the validator never
//! stops at the first failure. Non-blocking findings become warnings that travel
//! with the computed result.

use log::{info, warn};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::{FieldError, ValidationError};
use crate::profile::{Gender, ProfileCandidate, UserProfile};

/// A normalized profile plus the warnings raised while validating it
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProfile {
    pub profile: UserProfile,
    pub warnings: Vec<String>,
}

/// Validates raw candidates against the configured bands
#[derive(Debug, Clone, Copy)]
pub struct InputValidator<'a> {
    config: &'a EngineConfig,
    as_of_year: i32,
}

impl<'a> InputValidator<'a> {
    pub fn new(config: &'a EngineConfig, as_of_year: i32) -> Self {
        Self { config, as_of_year }
    }

    pub fn validate(&self, candidate: &ProfileCandidate) -> Result<ValidatedProfile, ValidationError> {
        let bands = &self.config.validation;
        let as_of = self.as_of_year as i64;
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // Age
        let age = required_int(&candidate.age, "age", &mut errors)
            .filter(|&age| {
                let in_range = age >= bands.min_age && age <= bands.max_age;
                if !in_range {
                    errors.push(FieldError::new(
                        "age",
                        format!("must be between {} and {}, got {}", bands.min_age, bands.max_age, age),
                    ));
                }
                in_range
            });
        if let Some(age) = age {
            if age < bands.young_age_warning {
                warnings.push(format!("Very young age ({age}) - please verify the input"));
            }
        }

        // Gender
        let gender = match candidate.gender.as_ref() {
            None | Some(Value::Null) => {
                errors.push(FieldError::new("gender", "is required"));
                None
            }
            Some(value) => {
                let parsed = value.as_str().and_then(Gender::parse);
                if parsed.is_none() {
                    errors.push(FieldError::new("gender", "must be one of: male, female"));
                }
                parsed
            }
        };

        // Salary
        let gross_salary = required_number(&candidate.gross_salary, "gross_salary", &mut errors)
            .filter(|&salary| {
                if salary <= 0.0 {
                    errors.push(FieldError::new("gross_salary", "must be a positive amount"));
                }
                salary > 0.0
            });
        if let Some(salary) = gross_salary {
            if salary < bands.low_salary {
                warnings.push(format!(
                    "Low gross salary ({salary:.2}) - below the typical minimum wage of {:.2}",
                    bands.low_salary
                ));
            } else if salary > bands.high_salary {
                warnings.push(format!("Very high gross salary ({salary:.2}) - please verify the input"));
            }
        }

        // Career start
        let birth_year = age.map(|age| as_of - age);
        let work_start_year = required_int(&candidate.work_start_year, "work_start_year", &mut errors)
            .filter(|&start| {
                if start > as_of {
                    errors.push(FieldError::new(
                        "work_start_year",
                        format!("must not be in the future (as-of year {as_of}), got {start}"),
                    ));
                    return false;
                }
                match birth_year {
                    Some(birth) if start < birth => {
                        errors.push(FieldError::new(
                            "work_start_year",
                            format!("precedes the birth year {birth} implied by age"),
                        ));
                        false
                    }
                    _ => true,
                }
            });
        if let (Some(start), Some(birth)) = (work_start_year, birth_year) {
            let age_at_start = start - birth;
            if age_at_start < bands.min_working_age {
                warnings.push(format!(
                    "Work started at age {age_at_start}, before age {} - please verify the input",
                    bands.min_working_age
                ));
            }
        }

        // Career end
        let work_end_year = optional_int(&candidate.work_end_year, "work_end_year", &mut errors)
            .filter(|&end| {
                let mut valid = true;
                if let Some(start) = work_start_year {
                    if end <= start {
                        errors.push(FieldError::new("work_end_year", "must be after work_start_year"));
                        valid = false;
                    }
                }
                if end <= as_of {
                    errors.push(FieldError::new(
                        "work_end_year",
                        format!("must be after the as-of year {as_of}"),
                    ));
                    valid = false;
                }
                // Retirement beyond the maximum age has no life expectancy or horizon
                let latest = birth_year.unwrap_or(as_of) + bands.max_age;
                if end > latest {
                    errors.push(FieldError::new(
                        "work_end_year",
                        format!("must not be later than {latest} (retirement by age {})", bands.max_age),
                    ));
                    valid = false;
                }
                valid
            });
        if let Some(end) = work_end_year {
            if end > as_of + bands.far_future_years {
                warnings.push(format!("Very distant work end year ({end}) - please verify the input"));
            }
            if let (Some(birth), Some(gender)) = (birth_year, gender) {
                let statutory = *self.config.retirement_age.get(gender) as i64;
                let retirement_age = end - birth;
                if retirement_age < statutory - bands.retirement_deviation_years {
                    warnings.push(format!(
                        "Early retirement at age {retirement_age} (statutory age: {statutory})"
                    ));
                } else if retirement_age > statutory + bands.retirement_deviation_years {
                    warnings.push(format!(
                        "Late retirement at age {retirement_age} (statutory age: {statutory})"
                    ));
                }
            }
        }

        // Existing balances
        let main_balance = self.balance(
            &candidate.existing_main_account_balance,
            "existing_main_account_balance",
            "main account",
            bands.high_main_balance,
            &mut errors,
            &mut warnings,
        );
        let sub_balance = self.balance(
            &candidate.existing_subaccount_balance,
            "existing_subaccount_balance",
            "subaccount",
            bands.high_sub_balance,
            &mut errors,
            &mut warnings,
        );
        if let (Some(main), Some(sub)) = (main_balance, sub_balance) {
            if sub > main {
                warnings.push("Subaccount balance exceeds main account balance - unusual".to_string());
            }
        }

        // Sick leave
        let sick_leave = optional_number(&candidate.sick_leave_days_per_year, "sick_leave_days_per_year", &mut errors)
            .filter(|&days| {
                let in_range = (0.0..=bands.max_sick_leave_days).contains(&days);
                if !in_range {
                    errors.push(FieldError::new(
                        "sick_leave_days_per_year",
                        format!("must be between 0 and {}, got {days}", bands.max_sick_leave_days),
                    ));
                }
                in_range
            });
        if let Some(days) = sick_leave {
            if days > bands.high_sick_leave_days {
                warnings.push(format!(
                    "Very high sick leave ({days} days/year) - strong impact on the pension"
                ));
            }
        }

        // Goal
        let desired = optional_number(&candidate.desired_monthly_pension, "desired_monthly_pension", &mut errors)
            .filter(|&amount| {
                if amount <= 0.0 {
                    errors.push(FieldError::new("desired_monthly_pension", "must be a positive amount"));
                }
                amount > 0.0
            });

        if !errors.is_empty() {
            warn!("profile validation failed with {} error(s)", errors.len());
            for error in &errors {
                warn!("  - {error}");
            }
            return Err(ValidationError::new(errors));
        }

        // All required fields are present once no errors were recorded
        let (Some(age), Some(gender), Some(gross_salary), Some(work_start_year)) =
            (age, gender, gross_salary, work_start_year)
        else {
            return Err(ValidationError::new(vec![FieldError::new("profile", "is incomplete")]));
        };

        let (Ok(work_start_year), Ok(work_end_year)) = (
            i32::try_from(work_start_year),
            work_end_year.map(i32::try_from).transpose(),
        ) else {
            return Err(ValidationError::new(vec![FieldError::new("work_end_year", "is out of range")]));
        };

        let work_end_year = match work_end_year {
            Some(end) => end,
            None => {
                let statutory_year = (as_of - age) as i32 + *self.config.retirement_age.get(gender) as i32;
                if statutory_year > self.as_of_year {
                    statutory_year
                } else {
                    warnings.push(format!(
                        "Statutory retirement year {statutory_year} has passed - projecting one more year to {}",
                        self.as_of_year + 1
                    ));
                    self.as_of_year + 1
                }
            }
        };

        let profile = UserProfile {
            age: age as u32,
            gender,
            gross_salary,
            work_start_year,
            work_end_year,
            existing_main_account_balance: main_balance.unwrap_or(0.0),
            existing_subaccount_balance: sub_balance.unwrap_or(0.0),
            sick_leave_days_per_year: sick_leave.unwrap_or(0.0),
            desired_monthly_pension: desired,
            as_of_year: self.as_of_year,
        };

        info!("profile validated (warnings: {})", warnings.len());
        Ok(ValidatedProfile { profile, warnings })
    }

    fn balance(
        &self,
        value: &Option<Value>,
        field: &str,
        label: &str,
        high: f64,
        errors: &mut Vec<FieldError>,
        warnings: &mut Vec<String>,
    ) -> Option<f64> {
        if is_missing(value) {
            warnings.push(format!("Existing {label} balance not provided - assuming 0"));
            return None;
        }
        let amount = optional_number(value, field, errors)?;
        if amount < 0.0 {
            errors.push(FieldError::new(field, "must not be negative"));
            return None;
        }
        if amount > high {
            warnings.push(format!("Very high {label} balance ({amount:.2}) - please verify the input"));
        }
        Some(amount)
    }
}

fn is_missing(value: &Option<Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn optional_int(value: &Option<Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<i64> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => {
            let parsed = v.as_i64();
            if parsed.is_none() {
                errors.push(FieldError::new(field, "must be an integer"));
            }
            parsed
        }
    }
}

fn required_int(value: &Option<Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<i64> {
    if is_missing(value) {
        errors.push(FieldError::new(field, "is required"));
        return None;
    }
    optional_int(value, field, errors)
}

fn optional_number(value: &Option<Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => {
            let parsed = v.as_f64().filter(|n| n.is_finite());
            if parsed.is_none() {
                errors.push(FieldError::new(field, "must be a number"));
            }
            parsed
        }
    }
}

fn required_number(value: &Option<Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    if is_missing(value) {
        errors.push(FieldError::new(field, "is required"));
        return None;
    }
    optional_number(value, field, errors)
}
