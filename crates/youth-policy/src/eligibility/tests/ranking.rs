use std::sync::Arc;

use super::common::*;
use crate::catalog::ProgramCatalog;
use crate::eligibility::domain::EligibilityError;
use crate::eligibility::{classify_and_rank, EligibilityEngine, SortPolicy};

#[test]
fn empty_catalog_yields_empty_buckets() {
    for policy in [
        SortPolicy::Popularity,
        SortPolicy::BenefitSize,
        SortPolicy::DifficultyAscending,
    ] {
        let classification = classify_and_rank(&[], &profile(27, 2800), policy);
        assert!(classification.fully_eligible.is_empty());
        assert!(classification.near_miss.is_empty());
        assert!(classification.is_empty());
        assert_eq!(classification.evaluated, 0);
    }
}

#[test]
fn partition_drops_scores_of_two_or_less() {
    let fits = program("fits");
    let mut near = program("near");
    near.max_income = 1000;
    let mut weak = program("weak");
    weak.max_income = 1000;
    weak.min_age = 40;
    weak.max_age = 50;

    let classification = classify_and_rank(
        &[weak, near, fits],
        &profile(27, 2800),
        SortPolicy::Popularity,
    );

    assert_eq!(names(&classification.fully_eligible), vec!["fits"]);
    assert_eq!(names(&classification.near_miss), vec!["near"]);
    assert_eq!(classification.evaluated, 3);
}

#[test]
fn buckets_are_disjoint_and_bounded_by_catalog() {
    let catalog = ProgramCatalog::sample();
    for (age, income) in [(18, 0), (27, 2800), (27, 4500), (34, 9000), (40, 100)] {
        let classification =
            classify_and_rank(catalog.programs(), &profile(age, income), SortPolicy::Popularity);
        let fully = names(&classification.fully_eligible);
        let near = names(&classification.near_miss);

        assert!(fully.len() + near.len() <= catalog.len());
        assert!(fully.iter().all(|name| !near.contains(name)));
        assert!(classification.fully_eligible.iter().all(|p| p.eligibility_score == 4));
        assert!(classification.near_miss.iter().all(|p| p.eligibility_score == 3));
    }
}

#[test]
fn popularity_breaks_ties_by_name() {
    let programs = vec![
        ranked_program("charlie", 4, 1, "b"),
        ranked_program("alpha", 5, 1, "b"),
        ranked_program("bravo", 4, 1, "b"),
        ranked_program("able", 5, 1, "b"),
    ];

    let classification =
        classify_and_rank(&programs, &profile(27, 2800), SortPolicy::Popularity);

    assert_eq!(
        names(&classification.fully_eligible),
        vec!["able", "alpha", "bravo", "charlie"]
    );
}

#[test]
fn benefit_size_counts_characters_then_popularity() {
    let programs = vec![
        // Six characters but eighteen bytes.
        ranked_program("korean", 1, 1, "최대오백만원"),
        ranked_program("long", 1, 1, "ten chars!"),
        ranked_program("short-popular", 5, 1, "1234567"),
        ranked_program("short", 2, 1, "abcdefg"),
    ];

    let classification =
        classify_and_rank(&programs, &profile(27, 2800), SortPolicy::BenefitSize);

    assert_eq!(
        names(&classification.fully_eligible),
        vec!["long", "short-popular", "short", "korean"]
    );
}

#[test]
fn difficulty_sorts_easiest_first_then_popularity() {
    let programs = vec![
        ranked_program("hard", 5, 3, "b"),
        ranked_program("easy-unpopular", 1, 1, "b"),
        ranked_program("easy-popular", 4, 1, "b"),
        ranked_program("medium", 5, 2, "b"),
    ];

    let classification = classify_and_rank(
        &programs,
        &profile(27, 2800),
        SortPolicy::DifficultyAscending,
    );

    assert_eq!(
        names(&classification.fully_eligible),
        vec!["easy-popular", "easy-unpopular", "medium", "hard"]
    );
}

#[test]
fn remaining_ties_keep_catalog_order() {
    let programs = vec![
        ranked_program("zulu", 3, 2, "b"),
        ranked_program("yankee", 3, 2, "b"),
        ranked_program("xray", 3, 2, "b"),
    ];

    let classification = classify_and_rank(
        &programs,
        &profile(27, 2800),
        SortPolicy::DifficultyAscending,
    );

    assert_eq!(
        names(&classification.fully_eligible),
        vec!["zulu", "yankee", "xray"]
    );
}

#[test]
fn near_miss_bucket_is_sorted_independently() {
    let mut low = ranked_program("low", 1, 1, "b");
    low.max_income = 100;
    let mut high = ranked_program("high", 5, 1, "b");
    high.max_income = 100;
    let fits = ranked_program("fits", 2, 1, "b");

    let classification = classify_and_rank(
        &[low, fits, high],
        &profile(27, 2800),
        SortPolicy::Popularity,
    );

    assert_eq!(names(&classification.near_miss), vec!["high", "low"]);
    assert_eq!(names(&classification.fully_eligible), vec!["fits"]);
}

#[test]
fn sort_policy_parses_known_names() {
    assert_eq!("popularity".parse::<SortPolicy>(), Ok(SortPolicy::Popularity));
    assert_eq!("Benefit_Size".parse::<SortPolicy>(), Ok(SortPolicy::BenefitSize));
    assert_eq!(
        "난이도(쉬운 순)".parse::<SortPolicy>(),
        Ok(SortPolicy::DifficultyAscending)
    );
    assert_eq!(
        "혜택 크기(설명 길이)".parse::<SortPolicy>(),
        Ok(SortPolicy::BenefitSize)
    );
}

#[test]
fn unknown_sort_policy_is_a_configuration_error() {
    let err = "alphabetical".parse::<SortPolicy>().expect_err("rejected");
    assert_eq!(
        err,
        EligibilityError::Configuration {
            value: "alphabetical".to_string()
        }
    );
}

#[test]
fn top_caps_each_bucket() {
    let programs: Vec<_> = (0..5)
        .map(|i| ranked_program(&format!("p{i}"), i, 1, "b"))
        .collect();
    let classification =
        classify_and_rank(&programs, &profile(27, 2800), SortPolicy::Popularity);

    let (fully, near) = classification.top(2);
    assert_eq!(names(fully), vec!["p4", "p3"]);
    assert!(near.is_empty());
    assert_eq!(classification.top(10).0.len(), 5);
}

#[test]
fn engine_evaluates_named_policy() {
    let engine = EligibilityEngine::new(Arc::new(ProgramCatalog::sample()));

    let classification = engine
        .evaluate_named(&profile(27, 2800), Some("difficulty"))
        .expect("known policy");

    assert_eq!(classification.policy, SortPolicy::DifficultyAscending);
    assert_eq!(
        names(&classification.fully_eligible),
        vec![
            "내일배움카드",
            "청년월세지원",
            "청년도약계좌",
            "청년 전월세보증금 대출",
            "국민취업지원제도"
        ]
    );
    assert!(engine
        .evaluate_named(&profile(27, 2800), Some("random"))
        .is_err());
}
