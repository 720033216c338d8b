use crate::eligibility::domain::{EmploymentStatus, HousingStatus, Profile, Program};

pub(super) fn program(name: &str) -> Program {
    Program {
        name: name.to_string(),
        category: "지원제도".to_string(),
        min_age: 19,
        max_age: 34,
        max_income: 7500,
        needs_non_homeowner: false,
        employment_required: false,
        benefit: "benefit".to_string(),
        popularity: 3,
        difficulty: 3,
        why_fit: "fit".to_string(),
        apply_url: "https://www.go.kr".to_string(),
    }
}

pub(super) fn ranked_program(name: &str, popularity: i32, difficulty: i32, benefit: &str) -> Program {
    Program {
        popularity,
        difficulty,
        benefit: benefit.to_string(),
        ..program(name)
    }
}

pub(super) fn profile(age: i64, income: i64) -> Profile {
    Profile::new(
        age,
        income,
        HousingStatus::NonHomeowner,
        EmploymentStatus::Employed,
    )
    .expect("valid profile")
}

pub(super) fn profile_with(
    housing: HousingStatus,
    employment: EmploymentStatus,
) -> Profile {
    Profile::new(27, 2800, housing, employment).expect("valid profile")
}

pub(super) fn names(entries: &[crate::eligibility::ScoredProgram]) -> Vec<&str> {
    entries
        .iter()
        .map(|entry| entry.program.name.as_str())
        .collect()
}
