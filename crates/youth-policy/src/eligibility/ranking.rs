use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{EligibilityError, Profile, Program};
use super::rules::{self, MAX_SCORE};
use super::ScoredProgram;

/// Ranking strategy applied independently to each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortPolicy {
    /// Most popular first, ties by name.
    #[default]
    Popularity,
    /// Longest benefit description first, ties by popularity.
    BenefitSize,
    /// Easiest application first, ties by popularity.
    DifficultyAscending,
}

impl SortPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            SortPolicy::Popularity => "popularity",
            SortPolicy::BenefitSize => "benefit-size",
            SortPolicy::DifficultyAscending => "difficulty",
        }
    }

    fn compare(self, a: &ScoredProgram, b: &ScoredProgram) -> Ordering {
        let (a, b) = (&a.program, &b.program);
        match self {
            SortPolicy::Popularity => b
                .popularity
                .cmp(&a.popularity)
                .then_with(|| a.name.cmp(&b.name)),
            SortPolicy::BenefitSize => b
                .benefit_len()
                .cmp(&a.benefit_len())
                .then_with(|| b.popularity.cmp(&a.popularity)),
            SortPolicy::DifficultyAscending => a
                .difficulty
                .cmp(&b.difficulty)
                .then_with(|| b.popularity.cmp(&a.popularity)),
        }
    }
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortPolicy {
    type Err = EligibilityError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().replace('_', "-").as_str() {
            "popularity" | "popular" | "인기도" => Ok(Self::Popularity),
            "benefit" | "benefit-size" | "혜택 크기(설명 길이)" | "혜택 크기" => {
                Ok(Self::BenefitSize)
            }
            "difficulty" | "difficulty-asc" | "easiest" | "난이도(쉬운 순)" | "난이도" => {
                Ok(Self::DifficultyAscending)
            }
            _ => Err(EligibilityError::Configuration {
                value: raw.trim().to_string(),
            }),
        }
    }
}

/// Ranked buckets for one profile. Programs scoring two or less are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub policy: SortPolicy,
    pub evaluated: usize,
    pub fully_eligible: Vec<ScoredProgram>,
    pub near_miss: Vec<ScoredProgram>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.fully_eligible.is_empty() && self.near_miss.is_empty()
    }

    /// Both buckets capped to `n` entries each.
    pub fn top(&self, n: usize) -> (&[ScoredProgram], &[ScoredProgram]) {
        let fully = &self.fully_eligible[..n.min(self.fully_eligible.len())];
        let near = &self.near_miss[..n.min(self.near_miss.len())];
        (fully, near)
    }
}

pub fn classify_and_rank(
    programs: &[Program],
    profile: &Profile,
    policy: SortPolicy,
) -> Classification {
    let mut fully_eligible = Vec::new();
    let mut near_miss = Vec::new();

    for scored in programs.iter().map(|program| rules::score(program, profile)) {
        if scored.eligibility_score == MAX_SCORE {
            fully_eligible.push(scored);
        } else if scored.eligibility_score == MAX_SCORE - 1 {
            near_miss.push(scored);
        }
    }

    // `sort_by` is stable, so remaining ties keep catalog order.
    fully_eligible.sort_by(|a, b| policy.compare(a, b));
    near_miss.sort_by(|a, b| policy.compare(a, b));

    Classification {
        policy,
        evaluated: programs.len(),
        fully_eligible,
        near_miss,
    }
}
