use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{CatalogSource, LinkPolicy, ProgramCatalog};
use crate::coach::{ChatSession, Coach, CoachQuery, CoachReply, SessionError, SessionId, SessionStore};
use crate::eligibility::{
    Classification, EligibilityEngine, EligibilityError, Profile, ProfileInput, Program,
    ScoredProgram, SortPolicy,
};

/// Request body for ranking the catalog against a profile.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    #[serde(flatten)]
    pub profile: ProfileInput,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default = "default_show_near_miss")]
    pub show_near_miss: bool,
}

/// Request body for one coach message.
#[derive(Debug, Clone, Deserialize)]
pub struct CoachMessageRequest {
    #[serde(flatten)]
    pub profile: ProfileInput,
    #[serde(default)]
    pub sort_by: Option<String>,
    pub query: String,
    #[serde(default)]
    pub use_assistant: bool,
}

fn default_show_near_miss() -> bool {
    true
}

/// Ranked program plus whether its link passed the allow-list.
#[derive(Debug, Clone, Serialize)]
pub struct RankedProgramView {
    #[serde(flatten)]
    pub scored: ScoredProgram,
    pub link_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationView {
    pub profile: Profile,
    pub policy: SortPolicy,
    pub evaluated: usize,
    pub fully_eligible: Vec<RankedProgramView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_miss: Option<Vec<RankedProgramView>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogView<'a> {
    pub source: &'a CatalogSource,
    pub programs: &'a [Program],
}

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
    #[error("session {0} not found")]
    SessionNotFound(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Service composing the eligibility engine, the coach, and session storage.
pub struct PolicyAdvisorService<S> {
    engine: EligibilityEngine,
    coach: Arc<Coach>,
    sessions: Arc<S>,
}

impl<S> PolicyAdvisorService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(catalog: Arc<ProgramCatalog>, coach: Coach, sessions: Arc<S>) -> Self {
        Self {
            engine: EligibilityEngine::new(catalog),
            coach: Arc::new(coach),
            sessions,
        }
    }

    pub fn catalog(&self) -> CatalogView<'_> {
        let catalog = self.engine.catalog();
        CatalogView {
            source: catalog.source(),
            programs: catalog.programs(),
        }
    }

    fn links(&self) -> &LinkPolicy {
        self.coach.responder().links()
    }

    /// Scores the whole catalog for one profile. Hiding near misses only affects
    /// the returned view.
    pub fn recommend(
        &self,
        request: RecommendationRequest,
    ) -> Result<RecommendationView, AdvisorError> {
        let profile = Profile::try_from(request.profile)?;
        let classification = self
            .engine
            .evaluate_named(&profile, request.sort_by.as_deref())?;

        let Classification {
            policy,
            evaluated,
            fully_eligible,
            near_miss,
        } = classification;

        Ok(RecommendationView {
            profile,
            policy,
            evaluated,
            fully_eligible: self.views(fully_eligible),
            near_miss: request.show_near_miss.then(|| self.views(near_miss)),
        })
    }

    fn views(&self, entries: Vec<ScoredProgram>) -> Vec<RankedProgramView> {
        entries
            .into_iter()
            .map(|scored| RankedProgramView {
                link_verified: self.links().is_allowed(&scored.program.apply_url),
                scored,
            })
            .collect()
    }

    pub fn open_session(&self) -> Result<ChatSession, AdvisorError> {
        let session = self.sessions.insert(ChatSession::new())?;
        info!(session = %session.id().0, "opened coach session");
        Ok(session)
    }

    pub fn session(&self, id: &SessionId) -> Result<ChatSession, AdvisorError> {
        self.sessions
            .fetch(id)?
            .ok_or_else(|| AdvisorError::SessionNotFound(id.0.clone()))
    }

    /// Runs one coach turn and appends its user and assistant turns to the
    /// stored transcript. Overlapping turns on one session each land intact.
    pub async fn ask(
        &self,
        id: &SessionId,
        request: CoachMessageRequest,
    ) -> Result<CoachReply, AdvisorError> {
        let mut session = self.session(id)?;
        let recorded_before = session.transcript().len();
        let profile = Profile::try_from(request.profile)?;
        let classification = self
            .engine
            .evaluate_named(&profile, request.sort_by.as_deref())?;

        let reply = self
            .coach
            .answer(
                &mut session,
                CoachQuery {
                    query: &request.query,
                    profile: &profile,
                    classification: &classification,
                    catalog: self.engine.catalog().programs(),
                    use_assistant: request.use_assistant,
                },
            )
            .await;

        let new_turns = session.transcript()[recorded_before..].to_vec();
        self.sessions.append(id, new_turns)?;
        Ok(reply)
    }
}
