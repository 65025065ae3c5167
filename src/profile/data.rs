//! Profile data structures for a single pension projection

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gender of the insured person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse the wire representation ("male" / "female", case-insensitive)
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// A pair of values keyed by gender
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByGender<T> {
    pub male: T,
    pub female: T,
}

impl<T> ByGender<T> {
    pub fn new(male: T, female: T) -> Self {
        Self { male, female }
    }

    pub fn get(&self, gender: Gender) -> &T {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }

    pub fn get_mut(&mut self, gender: Gender) -> &mut T {
        match gender {
            Gender::Male => &mut self.male,
            Gender::Female => &mut self.female,
        }
    }
}

/// Raw, loosely typed profile as received from the caller
///
/// Every field is kept as an untyped JSON value so that the validator can report
/// type mismatches ("age must be an integer") alongside range violations instead
/// of failing at deserialization time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileCandidate {
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub gender: Option<Value>,
    #[serde(default)]
    pub gross_salary: Option<Value>,
    #[serde(default)]
    pub work_start_year: Option<Value>,
    #[serde(default)]
    pub work_end_year: Option<Value>,
    #[serde(default, alias = "zus_account_balance")]
    pub existing_main_account_balance: Option<Value>,
    #[serde(default, alias = "zus_subaccount_balance")]
    pub existing_subaccount_balance: Option<Value>,
    #[serde(default)]
    pub sick_leave_days_per_year: Option<Value>,
    #[serde(default, alias = "desired_pension")]
    pub desired_monthly_pension: Option<Value>,
}

impl ProfileCandidate {
    /// Create a candidate with the four mandatory fields filled in
    pub fn new(age: i64, gender: &str, gross_salary: f64, work_start_year: i64) -> Self {
        Self {
            age: Some(Value::from(age)),
            gender: Some(Value::from(gender)),
            gross_salary: Some(Value::from(gross_salary)),
            work_start_year: Some(Value::from(work_start_year)),
            ..Default::default()
        }
    }

    pub fn with_work_end_year(mut self, year: i64) -> Self {
        self.work_end_year = Some(Value::from(year));
        self
    }

    pub fn with_balances(mut self, main: f64, sub: f64) -> Self {
        self.existing_main_account_balance = Some(Value::from(main));
        self.existing_subaccount_balance = Some(Value::from(sub));
        self
    }

    pub fn with_sick_leave_days(mut self, days: f64) -> Self {
        self.sick_leave_days_per_year = Some(Value::from(days));
        self
    }

    pub fn with_desired_pension(mut self, amount: f64) -> Self {
        self.desired_monthly_pension = Some(Value::from(amount));
        self
    }
}

/// Normalized, validated profile consumed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Age in completed years at the as-of year
    pub age: u32,

    pub gender: Gender,

    /// Monthly gross salary in currency units
    pub gross_salary: f64,

    pub work_start_year: i32,

    /// First year without contributions (exclusive end of the career)
    pub work_end_year: i32,

    pub existing_main_account_balance: f64,

    pub existing_subaccount_balance: f64,

    pub sick_leave_days_per_year: f64,

    pub desired_monthly_pension: Option<f64>,

    /// Calendar year treated as "now"; later years use projected salary
    pub as_of_year: i32,
}

impl UserProfile {
    /// Birth year implied by age at the as-of year
    pub fn birth_year(&self) -> i32 {
        self.as_of_year - self.age as i32
    }

    /// Age reached in the year contributions stop
    pub fn retirement_age(&self) -> u32 {
        (self.work_end_year - self.birth_year()).max(0) as u32
    }

    /// Number of contribution years simulated by the engine
    pub fn total_work_years(&self) -> u32 {
        (self.work_end_year - self.work_start_year).max(0) as u32
    }

    /// Age at which the career started
    pub fn age_at_work_start(&self) -> i32 {
        self.work_start_year - self.birth_year()
    }

    /// Same profile with the career extended (or shortened) to the given end year
    pub fn with_work_end_year(&self, work_end_year: i32) -> Self {
        Self {
            work_end_year,
            ..self.clone()
        }
    }

    /// Same profile with sick leave removed, used for the counterfactual run
    pub fn without_sick_leave(&self) -> Self {
        Self {
            sick_leave_days_per_year: 0.0,
            ..self.clone()
        }
    }

    /// Fraction of a working year still contributing after sick leave
    pub fn contributing_fraction(&self) -> f64 {
        1.0 - self.sick_leave_days_per_year / 365.0
    }
}
