use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use minijinja::context;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::api::HistoryEntry;
use crate::db::{SchemaSelection, DESELECT_ID};
use crate::error::{AppError, Result};
use crate::web::state::AppState;
use crate::web::templates::render_template;

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub nl_query: String,
}

/// Browsers post the id as a number; hand-written clients sometimes quote it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SchemaIdParam {
    Number(i64),
    Text(String),
}

impl SchemaIdParam {
    fn parse(&self) -> Result<i64> {
        match self {
            SchemaIdParam::Number(id) => Ok(*id),
            SchemaIdParam::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| AppError::not_found(format!("Unknown schema id {}", text))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDbRequest {
    pub id: SchemaIdParam,
}

/// Chat page: history oldest first, the database picker and the selected schema.
pub async fn home(state: State<Arc<AppState>>) -> Result<Html<String>> {
    let turns = state.chat.list().await;
    let chat_history: Vec<HistoryEntry> = turns.iter().map(HistoryEntry::from).collect();

    let session = state.db_session.snapshot();
    let schema = session
        .schema_id
        .and_then(|id| state.registry.get(i64::from(id)).ok());
    let db_id = session.schema_id.map(i64::from).unwrap_or(DESELECT_ID);

    let page = render_template(
        &state.template_env,
        "home.html",
        context! {
            chat_history => chat_history,
            databases => state.registry.list(),
            db_id => db_id,
            schema => schema,
            notice => session.notice,
        },
    )?;
    Ok(Html(page))
}

pub async fn submit(state: State<Arc<AppState>>, Form(form): Form<ChatForm>) -> Redirect {
    let question = form.nl_query.trim();
    if question.is_empty() {
        debug!("Ignoring empty question");
        return Redirect::to("/");
    }

    state.submit(question).await;
    Redirect::to("/")
}

pub async fn update_db_id(
    state: State<Arc<AppState>>,
    Json(payload): Json<UpdateDbRequest>,
) -> Result<Response> {
    let id = payload.id.parse()?;
    info!("Schema selection requested: {}", id);

    match state.select_schema(SchemaSelection::from_id(id)).await {
        Ok(()) => {}
        Err(e @ AppError::NotFound(_)) => return Err(e),
        // Shown inline on the next render
        Err(e) => warn!("Schema selection failed: {}", e),
    }

    Ok(Redirect::to("/").into_response())
}
