//! REST API server for the expense agent
//!
//! Exposes chat and ledger summaries over HTTP. Every session has its own
//! ledger behind its own mutex, so messages for one session are processed
//! one at a time while different sessions proceed independently.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::classifier::IntentClassifier;
use crate::config::SessionLimits;
use crate::conversational::{ConversationSession, MODEL_ERROR_MESSAGE};
use crate::error::AgentError;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

struct SessionEntry {
    session: Arc<Mutex<ConversationSession>>,
    last_seen: Instant,
}

type SessionMap = HashMap<Uuid, SessionEntry>;

#[derive(Clone)]
pub struct ApiState {
    pub classifier: Arc<IntentClassifier>,
    limits: SessionLimits,
    sessions: Arc<RwLock<SessionMap>>,
}

impl ApiState {
    pub fn new(classifier: Arc<IntentClassifier>, limits: SessionLimits) -> Self {
        Self {
            classifier,
            limits,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Live session lookup; touching a session resets its idle clock.
    async fn find_session(&self, session_id: Uuid) -> Option<Arc<Mutex<ConversationSession>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&session_id)?;

        if entry.last_seen.elapsed() >= self.limits.idle_timeout {
            sessions.remove(&session_id);
            info!(session_id = %session_id, "Session expired");
            return None;
        }

        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Look up a session, opening it when missing. The banner is returned
    /// only for freshly opened sessions.
    async fn session(&self, session_id: Uuid) -> (Arc<Mutex<ConversationSession>>, Option<String>) {
        if let Some(existing) = self.find_session(session_id).await {
            return (existing, None);
        }

        let (session, banner) =
            ConversationSession::open(session_id, self.classifier.clone()).await;

        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get_mut(&session_id) {
            existing.last_seen = Instant::now();
            return (existing.session.clone(), None);
        }

        self.evict(&mut sessions);

        let session = Arc::new(Mutex::new(session));
        sessions.insert(
            session_id,
            SessionEntry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        info!(session_id = %session_id, "Session opened");
        (session, Some(banner))
    }

    /// Drop idle sessions, then the least recently used ones until there is
    /// room for one more.
    fn evict(&self, sessions: &mut SessionMap) {
        let idle_timeout = self.limits.idle_timeout;
        sessions.retain(|session_id, entry| {
            let live = entry.last_seen.elapsed() < idle_timeout;
            if !live {
                info!(session_id = %session_id, "Session expired");
            }
            live
        });

        while sessions.len() >= self.limits.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            warn!(session_id = %oldest, "Session evicted, session limit reached");
        }
    }
}

/// =============================
/// Helpers — Session Ids
/// =============================

fn stable_uuid_from_string(input: &str) -> Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

/// UUID strings are used as is, other strings hash to a stable UUID, and a
/// missing id starts a new session.
fn parse_session_id(value: Option<&str>) -> Uuid {
    match value {
        Some(v) if !v.trim().is_empty() => {
            Uuid::parse_str(v.trim()).unwrap_or_else(|_| stable_uuid_from_string(v.trim()))
        }
        _ => Uuid::new_v4(),
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    // Blank input never opens or touches a session
    if req.message.trim().is_empty() {
        let session_id = req
            .session_id
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_session_id(Some(v)));
        return (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "session_id": session_id,
                "reply": null,
            }))),
        );
    }

    let session_id = parse_session_id(req.session_id.as_deref());
    let (session, banner) = state.session(session_id).await;

    let mut session = session.lock().await;
    match session.respond(&req.message).await {
        Ok(Some(response)) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "session_id": session_id,
                "banner": banner,
                "intent": response.intent,
                "similarity": response.similarity,
                "reply": response.reply,
                "logged": response.logged,
            }))),
        ),
        Ok(None) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "session_id": session_id,
                "banner": banner,
                "reply": null,
            }))),
        ),
        Err(AgentError::ModelUnavailable(detail)) => {
            warn!(session_id = %session_id, "Embedding model unavailable: {}", detail);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error(MODEL_ERROR_MESSAGE.to_string())),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!("Chat handler failed: {}", e))),
        ),
    }
}

/// =============================
/// Summary Endpoint
/// =============================

async fn summary_handler(
    State(state): State<ApiState>,
    Path(raw_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    let session_id = parse_session_id(Some(&raw_id));

    let Some(session) = state.find_session(session_id).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(AgentError::SessionNotFound(session_id).to_string())),
        );
    };

    let summary = session.lock().await.summary();
    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "session_id": session_id,
            "total": summary.total,
            "rendered": summary.rendered_items(),
            "line_items": summary.line_items,
        }))),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/sessions/:id/summary", get(summary_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
