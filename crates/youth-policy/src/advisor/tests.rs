use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use async_trait::async_trait;
use tower::ServiceExt;

use super::*;
use crate::catalog::{LinkPolicy, ProgramCatalog};
use crate::coach::{
    AssistantGateway, AssistantRequest, ChatRole, ChatSession, ChatTurn, Coach, GatewayError,
    KeywordResponder, SessionError, SessionId, SessionStore,
};

#[derive(Default)]
struct MemorySessions {
    sessions: Mutex<HashMap<SessionId, ChatSession>>,
}

impl SessionStore for MemorySessions {
    fn insert(&self, session: ChatSession) -> Result<ChatSession, SessionError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        if guard.contains_key(session.id()) {
            return Err(SessionError::Conflict);
        }
        guard.insert(session.id().clone(), session.clone());
        Ok(session)
    }

    fn append(&self, id: &SessionId, turns: Vec<ChatTurn>) -> Result<(), SessionError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        match guard.get_mut(id) {
            Some(session) => {
                session.extend(turns);
                Ok(())
            }
            None => Err(SessionError::NotFound),
        }
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<ChatSession>, SessionError> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

struct BrokenSessions;

impl SessionStore for BrokenSessions {
    fn insert(&self, _session: ChatSession) -> Result<ChatSession, SessionError> {
        Err(SessionError::Unavailable("disk full".to_string()))
    }

    fn append(&self, _id: &SessionId, _turns: Vec<ChatTurn>) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("disk full".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<ChatSession>, SessionError> {
        Err(SessionError::Unavailable("disk full".to_string()))
    }
}

fn service<S: SessionStore + 'static>(sessions: S) -> Arc<PolicyAdvisorService<S>> {
    Arc::new(PolicyAdvisorService::new(
        Arc::new(ProgramCatalog::sample()),
        Coach::new(KeywordResponder::new(LinkPolicy::default())),
        Arc::new(sessions),
    ))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("body serializes")))
        .expect("request builds")
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

fn profile_body() -> Value {
    json!({
        "age": 27,
        "income": 4500,
        "housing_status": "non-homeowner",
        "employment_status": "job-seeking",
    })
}

#[tokio::test]
async fn recommendations_return_both_buckets() {
    let router = advisor_router(service(MemorySessions::default()));
    let mut body = profile_body();
    body["sort_by"] = json!("popularity");

    let response = router
        .oneshot(json_request("POST", "/api/v1/recommendations", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["policy"], "popularity");
    assert_eq!(payload["evaluated"], 5);
    let fully: Vec<&str> = payload["fully_eligible"]
        .as_array()
        .expect("array")
        .iter()
        .map(|entry| entry["program"]["name"].as_str().expect("name"))
        .collect();
    assert_eq!(fully, vec!["내일배움카드", "청년도약계좌", "청년 전월세보증금 대출"]);
    let near = payload["near_miss"].as_array().expect("near miss shown");
    assert_eq!(near.len(), 2);
    assert_eq!(near[0]["program"]["name"], "청년월세지원");
    assert_eq!(near[0]["failed"][0], "income cap 3900");
    assert_eq!(near[0]["link_verified"], true);
}

#[tokio::test]
async fn hidden_near_miss_is_omitted() {
    let router = advisor_router(service(MemorySessions::default()));
    let mut body = profile_body();
    body["show_near_miss"] = json!(false);

    let response = router
        .oneshot(json_request("POST", "/api/v1/recommendations", body))
        .await
        .expect("router responds");

    let payload = body_json(response).await;
    assert!(payload.get("near_miss").is_none());
}

#[tokio::test]
async fn unknown_sort_policy_is_unprocessable() {
    let router = advisor_router(service(MemorySessions::default()));
    let mut body = profile_body();
    body["sort_by"] = json!("alphabetical");

    let response = router
        .oneshot(json_request("POST", "/api/v1/recommendations", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = body_json(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error text")
        .contains("alphabetical"));
}

#[tokio::test]
async fn negative_age_is_unprocessable() {
    let router = advisor_router(service(MemorySessions::default()));
    let mut body = profile_body();
    body["age"] = json!(-3);

    let response = router
        .oneshot(json_request("POST", "/api/v1/recommendations", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn coach_session_round_trip_keeps_transcript() {
    let service = service(MemorySessions::default());
    let router = advisor_router(service.clone());

    let created = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/coach/sessions", json!({})))
        .await
        .expect("router responds");
    assert_eq!(created.status(), StatusCode::CREATED);
    let session_id = body_json(created).await["session_id"]
        .as_str()
        .expect("session id")
        .to_string();

    let mut message = profile_body();
    message["query"] = json!("무주택인데 받을 수 있는 지원은?");
    let reply = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/coach/sessions/{session_id}/messages"),
            message,
        ))
        .await
        .expect("router responds");
    assert_eq!(reply.status(), StatusCode::OK);
    let reply = body_json(reply).await;
    assert_eq!(reply["mode"], "rules");
    assert!(reply["text"]
        .as_str()
        .expect("reply text")
        .contains("Housing-related programs first."));

    let transcript = router
        .oneshot(
            Request::get(format!("/api/v1/coach/sessions/{session_id}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(transcript.status(), StatusCode::OK);
    let transcript = body_json(transcript).await;
    let turns = transcript["transcript"].as_array().expect("turns");
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[1]["role"], "assistant");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let router = advisor_router(service(MemorySessions::default()));

    let response = router
        .oneshot(
            Request::get("/api/v1/coach/sessions/sess-missing")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_store_failure_is_internal_error() {
    let router = advisor_router(service(BrokenSessions));

    let response = router
        .oneshot(json_request("POST", "/api/v1/coach/sessions", json!({})))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn programs_lists_catalog_with_source() {
    let router = advisor_router(service(MemorySessions::default()));

    let response = router
        .oneshot(
            Request::get("/api/v1/programs")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["source"]["kind"], "built_in_sample");
    assert_eq!(payload["programs"].as_array().expect("programs").len(), 5);
}

#[test]
fn recommend_rejects_unknown_employment_label() {
    let service = service(MemorySessions::default());
    let request: RecommendationRequest = serde_json::from_value(json!({
        "age": 27,
        "income": 2800,
        "housing_status": "non-homeowner",
        "employment_status": "retired",
    }))
    .expect("request deserializes");

    let err = service.recommend(request).expect_err("employment rejected");
    assert!(matches!(err, AdvisorError::Eligibility(_)));
}

#[tokio::test]
async fn non_numeric_income_is_a_json_validation_error() {
    let router = advisor_router(service(MemorySessions::default()));
    let mut body = profile_body();
    body["income"] = json!("lots");

    let response = router
        .oneshot(json_request("POST", "/api/v1/recommendations", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let payload = body_json(response).await;
    assert_eq!(
        payload["error"],
        "invalid income: 'lots' is not a whole number"
    );
}

#[tokio::test]
async fn numeric_text_income_is_accepted() {
    let router = advisor_router(service(MemorySessions::default()));
    let mut body = profile_body();
    body["income"] = json!("4500");

    let response = router
        .oneshot(json_request("POST", "/api/v1/recommendations", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_profile_field_keeps_json_error_shape() {
    let router = advisor_router(service(MemorySessions::default()));
    let body = json!({ "age": 27, "housing_status": "homeowner", "employment_status": "employed" });

    let response = router
        .oneshot(json_request("POST", "/api/v1/recommendations", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = body_json(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error text")
        .contains("income"));
}

/// Suspends once before answering so overlapping turns interleave.
#[derive(Debug)]
struct YieldingGateway;

#[async_trait]
impl AssistantGateway for YieldingGateway {
    async fn complete(&self, request: &AssistantRequest) -> Result<String, GatewayError> {
        tokio::task::yield_now().await;
        Ok(format!("answer to {}", request.question))
    }
}

fn coach_message(query: &str) -> CoachMessageRequest {
    let mut body = profile_body();
    body["query"] = json!(query);
    body["use_assistant"] = json!(true);
    serde_json::from_value(body).expect("request deserializes")
}

#[tokio::test]
async fn overlapping_messages_keep_every_turn() {
    let service = Arc::new(PolicyAdvisorService::new(
        Arc::new(ProgramCatalog::sample()),
        Coach::new(KeywordResponder::new(LinkPolicy::default()))
            .with_gateway(Arc::new(YieldingGateway)),
        Arc::new(MemorySessions::default()),
    ));
    let session = service.open_session().expect("session opened");
    let id = session.id().clone();

    let (first, second) = tokio::join!(
        service.ask(&id, coach_message("first")),
        service.ask(&id, coach_message("second"))
    );
    first.expect("first turn answered");
    second.expect("second turn answered");

    let stored = service.session(&id).expect("session stored");
    assert_eq!(stored.transcript().len(), 4);
    let user_turns: Vec<&str> = stored
        .transcript()
        .iter()
        .filter(|turn| turn.role == ChatRole::User)
        .map(|turn| turn.text.as_str())
        .collect();
    assert!(user_turns.contains(&"first"));
    assert!(user_turns.contains(&"second"));
}
