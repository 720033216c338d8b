//! Eligibility matching for public youth-support programs.
//!
//! Profiles are scored against a program catalog, classified into fully
//! eligible and near-miss buckets, ranked by a sort policy, and explained by a
//! keyword coach that can optionally delegate to an external assistant.

pub mod advisor;
pub mod catalog;
pub mod coach;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod telemetry;
