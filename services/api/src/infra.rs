use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use youth_policy::catalog::{CatalogLoader, LinkPolicy, ProgramCatalog};
use youth_policy::coach::{
    ChatSession, ChatTurn, Coach, GatewayError, KeywordResponder, OpenAiGateway, SessionError,
    SessionId, SessionStore,
};
use youth_policy::config::AssistantConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, ChatSession>>>,
}

impl InMemorySessionStore {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<SessionId, ChatSession>>, SessionError> {
        self.sessions
            .lock()
            .map_err(|_| SessionError::Unavailable("session store mutex poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: ChatSession) -> Result<ChatSession, SessionError> {
        let mut guard = self.guard()?;
        if guard.contains_key(session.id()) {
            return Err(SessionError::Conflict);
        }
        guard.insert(session.id().clone(), session.clone());
        Ok(session)
    }

    fn append(&self, id: &SessionId, turns: Vec<ChatTurn>) -> Result<(), SessionError> {
        let mut guard = self.guard()?;
        match guard.get_mut(id) {
            Some(session) => {
                session.extend(turns);
                Ok(())
            }
            None => Err(SessionError::NotFound),
        }
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<ChatSession>, SessionError> {
        Ok(self.guard()?.get(id).cloned())
    }
}

/// Loads the catalog at `path`, falling back to the built-in sample.
pub(crate) fn load_catalog(path: Option<&Path>) -> ProgramCatalog {
    CatalogLoader::load(path)
}

/// Rule-based coach, with the OpenAI-compatible gateway attached when a key is configured.
pub(crate) fn build_coach(config: &AssistantConfig) -> Result<Coach, GatewayError> {
    let coach = Coach::new(KeywordResponder::new(LinkPolicy::default()))
        .with_context_top_n(config.context_top_n);

    if !config.is_enabled() {
        return Ok(coach);
    }

    let gateway = OpenAiGateway::from_config(config)?;
    Ok(coach.with_gateway(Arc::new(gateway)))
}
