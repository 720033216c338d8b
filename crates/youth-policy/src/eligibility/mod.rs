//! Profile scoring against the program catalog.
//!
//! Every program is checked against four predicates (age, income, housing,
//! employment). Programs meeting all four are fully eligible, programs missing
//! exactly one are near misses, and each bucket is ranked by a [`SortPolicy`].

pub mod domain;
mod ranking;
mod rules;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::catalog::ProgramCatalog;

pub use domain::{
    EligibilityError, EmploymentStatus, HousingStatus, NumericInput, Profile, ProfileInput,
    Program,
};
pub use ranking::{classify_and_rank, Classification, SortPolicy};
pub use rules::{score, MAX_SCORE};

/// A program paired with the outcome of scoring it against one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredProgram {
    pub program: Program,
    pub eligibility_score: u8,
    pub satisfied: Vec<String>,
    pub failed: Vec<String>,
}

impl ScoredProgram {
    pub fn is_fully_eligible(&self) -> bool {
        self.eligibility_score == MAX_SCORE
    }

    pub fn is_near_miss(&self) -> bool {
        self.eligibility_score + 1 == MAX_SCORE
    }
}

/// Stateless evaluator over a shared, read-only catalog.
#[derive(Debug, Clone)]
pub struct EligibilityEngine {
    catalog: Arc<ProgramCatalog>,
}

impl EligibilityEngine {
    pub fn new(catalog: Arc<ProgramCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ProgramCatalog {
        &self.catalog
    }

    pub fn evaluate(&self, profile: &Profile, policy: SortPolicy) -> Classification {
        let classification = classify_and_rank(self.catalog.programs(), profile, policy);
        debug!(
            %profile,
            %policy,
            evaluated = classification.evaluated,
            fully_eligible = classification.fully_eligible.len(),
            near_miss = classification.near_miss.len(),
            "classified catalog for profile"
        );
        classification
    }

    /// Same as [`evaluate`](Self::evaluate) with the policy given by name;
    /// `None` selects the default policy.
    pub fn evaluate_named(
        &self,
        profile: &Profile,
        policy: Option<&str>,
    ) -> Result<Classification, EligibilityError> {
        let policy = match policy {
            Some(raw) => raw.parse()?,
            None => SortPolicy::default(),
        };
        Ok(self.evaluate(profile, policy))
    }
}
