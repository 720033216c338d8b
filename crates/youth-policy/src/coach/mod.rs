//! Conversational coach: keyword rules with optional assistant delegation.

pub mod gateway;
pub mod responder;
pub mod session;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::DEFAULT_CONTEXT_TOP_N;
use crate::eligibility::{Classification, Profile, Program};

pub use gateway::{
    AssistantContext, AssistantGateway, AssistantRequest, GatewayError, OpenAiGateway,
};
pub use responder::KeywordResponder;
pub use session::{ChatRole, ChatSession, ChatTurn, SessionError, SessionId, SessionStore};

/// How a reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachMode {
    Rules,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoachReply {
    pub text: String,
    pub mode: CoachMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_cause: Option<String>,
}

/// Inputs for one chat turn.
#[derive(Debug, Clone, Copy)]
pub struct CoachQuery<'a> {
    pub query: &'a str,
    pub profile: &'a Profile,
    pub classification: &'a Classification,
    pub catalog: &'a [Program],
    pub use_assistant: bool,
}

#[derive(Debug, Clone)]
pub struct Coach {
    responder: KeywordResponder,
    gateway: Option<Arc<dyn AssistantGateway>>,
    context_top_n: usize,
}

impl Coach {
    pub fn new(responder: KeywordResponder) -> Self {
        Self {
            responder,
            gateway: None,
            context_top_n: DEFAULT_CONTEXT_TOP_N,
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn AssistantGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_context_top_n(mut self, top_n: usize) -> Self {
        self.context_top_n = top_n.max(1);
        self
    }

    pub fn assistant_available(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn responder(&self) -> &KeywordResponder {
        &self.responder
    }

    /// Answers one query and records both sides of the exchange in `session`.
    /// Assistant failures never propagate: the rule-based answer is returned
    /// with the cause appended.
    pub async fn answer(&self, session: &mut ChatSession, query: CoachQuery<'_>) -> CoachReply {
        session.push(ChatRole::User, query.query);

        let rules_answer = || {
            self.responder.respond(
                query.query,
                &query.classification.fully_eligible,
                &query.classification.near_miss,
                query.catalog,
                query.profile,
            )
        };

        let reply = match (&self.gateway, query.use_assistant) {
            (Some(gateway), true) => {
                let context = AssistantContext::new(
                    query.profile,
                    query.classification,
                    self.context_top_n,
                    self.responder.links(),
                );
                let request = AssistantRequest::new(&context, query.query);
                match gateway.complete(&request).await {
                    Ok(text) => CoachReply {
                        text,
                        mode: CoachMode::Assistant,
                        fallback_cause: None,
                    },
                    Err(err) => {
                        warn!(session = %session.id().0, error = %err, "assistant failed; answering with rules");
                        CoachReply {
                            text: format!(
                                "Assistant unavailable; answering with rules.\n\n{}\n\n(error: {err})",
                                rules_answer()
                            ),
                            mode: CoachMode::Rules,
                            fallback_cause: Some(err.to_string()),
                        }
                    }
                }
            }
            (None, true) => {
                warn!(session = %session.id().0, "assistant requested but not configured; answering with rules");
                CoachReply {
                    text: rules_answer(),
                    mode: CoachMode::Rules,
                    fallback_cause: Some(GatewayError::MissingApiKey.to_string()),
                }
            }
            (_, false) => CoachReply {
                text: rules_answer(),
                mode: CoachMode::Rules,
                fallback_cause: None,
            },
        };

        info!(session = %session.id().0, mode = ?reply.mode, "coach replied");
        session.push(ChatRole::Assistant, reply.text.clone());
        reply
    }
}
