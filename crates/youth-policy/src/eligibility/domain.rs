use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Upper bound accepted for a self-reported age.
pub const MAX_PROFILE_AGE: i64 = 120;
/// Upper bound accepted for annual income, in 10,000 KRW units.
pub const MAX_PROFILE_INCOME: i64 = 1_000_000;

/// Failures raised while building profiles, programs, or ranking settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("unknown sort policy '{value}' (expected popularity, benefit, or difficulty)")]
    Configuration { value: String },
}

impl EligibilityError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Immutable catalog entry describing one support program and its requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub category: String,
    pub min_age: u32,
    pub max_age: u32,
    pub max_income: u32,
    pub needs_non_homeowner: bool,
    pub employment_required: bool,
    pub benefit: String,
    pub popularity: i32,
    pub difficulty: i32,
    pub why_fit: String,
    pub apply_url: String,
}

impl Program {
    pub fn validate(&self) -> Result<(), EligibilityError> {
        if self.name.trim().is_empty() {
            return Err(EligibilityError::validation(
                "name",
                "program name must not be empty",
            ));
        }
        if self.min_age > self.max_age {
            return Err(EligibilityError::validation(
                "min_age",
                format!(
                    "{}: min_age {} exceeds max_age {}",
                    self.name, self.min_age, self.max_age
                ),
            ));
        }
        Ok(())
    }

    /// Length of the benefit text in characters, used as a ranking proxy.
    pub fn benefit_len(&self) -> usize {
        self.benefit.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HousingStatus {
    NonHomeowner,
    Homeowner,
}

impl HousingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            HousingStatus::NonHomeowner => "non-homeowner",
            HousingStatus::Homeowner => "homeowner",
        }
    }
}

impl fmt::Display for HousingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HousingStatus {
    type Err = EligibilityError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_choice(raw).as_str() {
            "non-homeowner" | "nonhomeowner" | "renter" | "무주택" => Ok(Self::NonHomeowner),
            "homeowner" | "owner" | "주택보유" => Ok(Self::Homeowner),
            _ => Err(EligibilityError::validation(
                "housing_status",
                format!("'{}' is not one of non-homeowner, homeowner", raw.trim()),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentStatus {
    Employed,
    JobSeeking,
    SelfEmployed,
}

impl EmploymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "employed",
            EmploymentStatus::JobSeeking => "job-seeking",
            EmploymentStatus::SelfEmployed => "self-employed",
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmploymentStatus {
    type Err = EligibilityError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_choice(raw).as_str() {
            "employed" | "취업" => Ok(Self::Employed),
            "job-seeking" | "jobseeking" | "unemployed" | "미취업/구직" | "미취업" | "구직" => {
                Ok(Self::JobSeeking)
            }
            "self-employed" | "selfemployed" | "freelance" | "freelancer" | "자영업/프리랜서"
            | "자영업" | "프리랜서" => Ok(Self::SelfEmployed),
            _ => Err(EligibilityError::validation(
                "employment_status",
                format!(
                    "'{}' is not one of employed, job-seeking, self-employed",
                    raw.trim()
                ),
            )),
        }
    }
}

fn normalize_choice(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['_', ' '], "-")
}

/// Self-reported applicant profile, validated once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Profile {
    age: u32,
    income: u32,
    housing_status: HousingStatus,
    employment_status: EmploymentStatus,
}

impl Profile {
    pub fn new(
        age: i64,
        income: i64,
        housing_status: HousingStatus,
        employment_status: EmploymentStatus,
    ) -> Result<Self, EligibilityError> {
        if !(0..=MAX_PROFILE_AGE).contains(&age) {
            return Err(EligibilityError::validation(
                "age",
                format!("{age} is outside 0..={MAX_PROFILE_AGE}"),
            ));
        }
        if !(0..=MAX_PROFILE_INCOME).contains(&income) {
            return Err(EligibilityError::validation(
                "income",
                format!("{income} is outside 0..={MAX_PROFILE_INCOME}"),
            ));
        }

        Ok(Self {
            age: age as u32,
            income: income as u32,
            housing_status,
            employment_status,
        })
    }

    /// Builds a profile from raw text fields such as CLI arguments or form values.
    pub fn parse(
        age: &str,
        income: &str,
        housing_status: &str,
        employment_status: &str,
    ) -> Result<Self, EligibilityError> {
        Self::new(
            parse_whole("age", age)?,
            parse_whole("income", income)?,
            housing_status.parse()?,
            employment_status.parse()?,
        )
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn income(&self) -> u32 {
        self.income
    }

    pub fn housing_status(&self) -> HousingStatus {
        self.housing_status
    }

    pub fn employment_status(&self) -> EmploymentStatus {
        self.employment_status
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "age {} / income {} / {} / {}",
            self.age, self.income, self.housing_status, self.employment_status
        )
    }
}

fn parse_whole(field: &'static str, raw: &str) -> Result<i64, EligibilityError> {
    raw.trim().parse::<i64>().map_err(|_| {
        EligibilityError::validation(field, format!("'{}' is not a whole number", raw.trim()))
    })
}

/// A numeric profile field as sent by clients: a JSON integer, numeric text,
/// or anything else, which fails validation instead of deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Whole(i64),
    Text(String),
    Other(serde_json::Value),
}

impl NumericInput {
    fn resolve(&self, field: &'static str) -> Result<i64, EligibilityError> {
        match self {
            NumericInput::Whole(value) => Ok(*value),
            NumericInput::Text(raw) => parse_whole(field, raw),
            NumericInput::Other(value) => Err(EligibilityError::validation(
                field,
                format!("{value} is not a whole number"),
            )),
        }
    }
}

/// Profile fields as they arrive over the wire, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub age: NumericInput,
    pub income: NumericInput,
    pub housing_status: String,
    pub employment_status: String,
}

impl TryFrom<ProfileInput> for Profile {
    type Error = EligibilityError;

    fn try_from(input: ProfileInput) -> Result<Self, Self::Error> {
        Profile::new(
            input.age.resolve("age")?,
            input.income.resolve("income")?,
            input.housing_status.parse()?,
            input.employment_status.parse()?,
        )
    }
}
