pub mod links;
mod parser;
mod sample;

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::eligibility::{EligibilityError, Program};

pub use links::{LinkPolicy, WITHHELD_LINK};
pub use sample::sample_programs;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read program catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid program catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid program on line {line}: {source}")]
    InvalidRow {
        line: usize,
        #[source]
        source: EligibilityError,
    },
}

/// Origin of the programs held by a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogSource {
    File {
        path: PathBuf,
    },
    BuiltInSample {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Inline,
}

/// Ordered, read-only collection of programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramCatalog {
    source: CatalogSource,
    programs: Vec<Program>,
}

impl ProgramCatalog {
    /// Wraps caller-provided programs after validating each one.
    pub fn from_programs(programs: Vec<Program>) -> Result<Self, EligibilityError> {
        for program in &programs {
            program.validate()?;
        }
        Ok(Self {
            source: CatalogSource::Inline,
            programs,
        })
    }

    pub fn sample() -> Self {
        Self {
            source: CatalogSource::BuiltInSample { reason: None },
            programs: sample_programs(),
        }
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Program> {
        self.programs.iter().find(|program| program.name == name)
    }
}

pub struct CatalogLoader;

impl CatalogLoader {
    /// Loads the configured catalog, falling back to the built-in sample when no
    /// path is given or the file cannot be used.
    pub fn load(path: Option<&Path>) -> ProgramCatalog {
        let Some(path) = path else {
            info!("no catalog path configured; using built-in sample catalog");
            return ProgramCatalog::sample();
        };

        match Self::load_strict(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "catalog unusable; falling back to built-in sample");
                ProgramCatalog {
                    source: CatalogSource::BuiltInSample {
                        reason: Some(err.to_string()),
                    },
                    programs: sample_programs(),
                }
            }
        }
    }

    pub fn load_strict<P: AsRef<Path>>(path: P) -> Result<ProgramCatalog, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let programs = parser::parse_programs(file)?;
        info!(path = %path.display(), programs = programs.len(), "loaded program catalog");
        Ok(ProgramCatalog {
            source: CatalogSource::File {
                path: path.to_path_buf(),
            },
            programs,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<ProgramCatalog, CatalogError> {
        let programs = parser::parse_programs(reader)?;
        Ok(ProgramCatalog {
            source: CatalogSource::Inline,
            programs,
        })
    }
}
