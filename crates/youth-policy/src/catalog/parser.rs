use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::CatalogError;
use crate::eligibility::Program;

pub(crate) fn parse_programs<R: Read>(reader: R) -> Result<Vec<Program>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut programs = Vec::new();

    for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        let program = Program::from(record?);
        // Header is line 1.
        program
            .validate()
            .map_err(|source| CatalogError::InvalidRow {
                line: index + 2,
                source,
            })?;
        programs.push(program);
    }

    Ok(programs)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    name: String,
    #[serde(default)]
    category: String,
    min_age: u32,
    max_age: u32,
    max_income: u32,
    #[serde(deserialize_with = "flexible_bool")]
    needs_non_homeowner: bool,
    #[serde(deserialize_with = "flexible_bool")]
    employment_required: bool,
    #[serde(default)]
    benefit: String,
    #[serde(default)]
    popularity: i32,
    #[serde(default)]
    difficulty: i32,
    #[serde(default)]
    why_fit: String,
    #[serde(default)]
    apply_url: String,
}

impl From<CatalogRow> for Program {
    fn from(row: CatalogRow) -> Self {
        Program {
            name: row.name,
            category: row.category,
            min_age: row.min_age,
            max_age: row.max_age,
            max_income: row.max_income,
            needs_non_homeowner: row.needs_non_homeowner,
            employment_required: row.employment_required,
            benefit: row.benefit,
            popularity: row.popularity,
            difficulty: row.difficulty,
            why_fit: row.why_fit,
            apply_url: row.apply_url,
        }
    }
}

/// Spreadsheet exports write booleans in several spellings.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, got '{other}'"
        ))),
    }
}
