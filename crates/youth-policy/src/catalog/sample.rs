use crate::eligibility::Program;

struct SampleRow {
    name: &'static str,
    category: &'static str,
    min_age: u32,
    max_age: u32,
    max_income: u32,
    needs_non_homeowner: bool,
    employment_required: bool,
    benefit: &'static str,
    popularity: i32,
    difficulty: i32,
    why_fit: &'static str,
    apply_url: &'static str,
}

const SAMPLE_ROWS: [SampleRow; 5] = [
    SampleRow {
        name: "청년도약계좌",
        category: "금융상품",
        min_age: 19,
        max_age: 34,
        max_income: 7500,
        needs_non_homeowner: false,
        employment_required: false,
        benefit: "5년간 최대 5천만원 목돈 + 정부 기여금",
        popularity: 5,
        difficulty: 3,
        why_fit: "자산형성 시작 사회초년생 적합",
        apply_url: "https://www.fss.or.kr",
    },
    SampleRow {
        name: "청년 전월세보증금 대출",
        category: "금융상품",
        min_age: 19,
        max_age: 34,
        max_income: 5000,
        needs_non_homeowner: true,
        employment_required: false,
        benefit: "수도권 최대 1.2억원, 금리 2~3%",
        popularity: 4,
        difficulty: 3,
        why_fit: "무주택 청년 주거안정",
        apply_url: "https://www.hf.go.kr",
    },
    SampleRow {
        name: "내일배움카드",
        category: "지원제도",
        min_age: 19,
        max_age: 34,
        max_income: 6000,
        needs_non_homeowner: false,
        employment_required: false,
        benefit: "최대 500만원 직업훈련비 지원",
        popularity: 5,
        difficulty: 2,
        why_fit: "역량 강화/이직 준비",
        apply_url: "https://www.hrd.go.kr",
    },
    SampleRow {
        name: "국민취업지원제도",
        category: "지원제도",
        min_age: 19,
        max_age: 34,
        max_income: 4000,
        needs_non_homeowner: false,
        employment_required: false,
        benefit: "구직활동 지원금 + 취업알선",
        popularity: 4,
        difficulty: 3,
        why_fit: "청년 구직자 소득지원",
        apply_url: "https://www.kua.go.kr",
    },
    SampleRow {
        name: "청년월세지원",
        category: "생활지원",
        min_age: 19,
        max_age: 34,
        max_income: 3900,
        needs_non_homeowner: true,
        employment_required: false,
        benefit: "월 최대 20만원, 12개월 지원(지자체별 상이)",
        popularity: 5,
        difficulty: 2,
        why_fit: "월세 거주 청년 주거비 경감",
        apply_url: "https://www.bokjiro.go.kr",
    },
];

/// Built-in catalog used when no external catalog is configured or readable.
pub fn sample_programs() -> Vec<Program> {
    SAMPLE_ROWS
        .iter()
        .map(|row| Program {
            name: row.name.to_string(),
            category: row.category.to_string(),
            min_age: row.min_age,
            max_age: row.max_age,
            max_income: row.max_income,
            needs_non_homeowner: row.needs_non_homeowner,
            employment_required: row.employment_required,
            benefit: row.benefit.to_string(),
            popularity: row.popularity,
            difficulty: row.difficulty,
            why_fit: row.why_fit.to_string(),
            apply_url: row.apply_url.to_string(),
        })
        .collect()
}
