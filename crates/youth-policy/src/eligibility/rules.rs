use super::domain::{EmploymentStatus, HousingStatus, Profile, Program};
use super::ScoredProgram;

/// Number of predicates; a program scoring this many is fully eligible.
pub const MAX_SCORE: u8 = 4;

enum Check {
    Met(String),
    Missed(String),
}

/// Evaluates all four predicates in fixed order. None of them short-circuits,
/// so every mismatch is reported together.
pub fn score(program: &Program, profile: &Profile) -> ScoredProgram {
    let checks = [
        age_fit(program, profile),
        income_fit(program, profile),
        housing_requirement(program, profile),
        employment_requirement(program, profile),
    ];

    let mut eligibility_score = 0;
    let mut satisfied = Vec::new();
    let mut failed = Vec::new();
    for check in checks {
        match check {
            Check::Met(label) => {
                eligibility_score += 1;
                satisfied.push(label);
            }
            Check::Missed(label) => failed.push(label),
        }
    }

    ScoredProgram {
        program: program.clone(),
        eligibility_score,
        satisfied,
        failed,
    }
}

fn age_fit(program: &Program, profile: &Profile) -> Check {
    if (program.min_age..=program.max_age).contains(&profile.age()) {
        Check::Met("age fit".to_string())
    } else {
        Check::Missed(format!("age {}~{}", program.min_age, program.max_age))
    }
}

fn income_fit(program: &Program, profile: &Profile) -> Check {
    if profile.income() <= program.max_income {
        Check::Met("income fit".to_string())
    } else {
        Check::Missed(format!("income cap {}", program.max_income))
    }
}

fn housing_requirement(program: &Program, profile: &Profile) -> Check {
    if !program.needs_non_homeowner {
        return Check::Met("housing irrelevant".to_string());
    }
    match profile.housing_status() {
        HousingStatus::NonHomeowner => Check::Met("non-homeowner requirement met".to_string()),
        HousingStatus::Homeowner => Check::Missed("non-homeowner status required".to_string()),
    }
}

fn employment_requirement(program: &Program, profile: &Profile) -> Check {
    if !program.employment_required {
        return Check::Met("employment irrelevant".to_string());
    }
    match profile.employment_status() {
        EmploymentStatus::Employed => Check::Met("employment requirement met".to_string()),
        EmploymentStatus::JobSeeking | EmploymentStatus::SelfEmployed => {
            Check::Missed("employment required".to_string())
        }
    }
}
