use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::chat::ChatTurn;
use crate::schema::SchemaSummary;
use crate::web::state::AppState;

/// A chat turn as shown to clients, with its result already rendered.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub user_text: String,
    pub generated_sql: String,
    pub rendered_result: String,
    pub asked_at: DateTime<Utc>,
}

impl From<&ChatTurn> for HistoryEntry {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            user_text: turn.user_text.clone(),
            generated_sql: turn.generated_sql.clone(),
            rendered_result: turn.rendered_result(),
            asked_at: turn.asked_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub selected_schema_id: Option<u32>,
    pub connected: bool,
    pub history_len: usize,
    pub history_capacity: usize,
    pub schema_count: usize,
}

pub async fn list_schemas(state: State<Arc<AppState>>) -> Json<Vec<SchemaSummary>> {
    Json(state.registry.list())
}

pub async fn history(state: State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    let turns = state.chat.list().await;
    Json(turns.iter().map(HistoryEntry::from).collect())
}

pub async fn system_status(state: State<Arc<AppState>>) -> Json<SystemStatus> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(state.startup_time).num_seconds();
    let snapshot = state.db_session.snapshot();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        selected_schema_id: snapshot.schema_id,
        connected: snapshot.is_connected(),
        history_len: state.chat.len().await,
        history_capacity: state.chat.capacity().await,
        schema_count: state.registry.len(),
    })
}
