//! HTTP-facing service wiring the engine, the coach, and session storage.

pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use router::advisor_router;
pub use service::{
    AdvisorError, CatalogView, CoachMessageRequest, PolicyAdvisorService, RankedProgramView,
    RecommendationRequest, RecommendationView,
};
