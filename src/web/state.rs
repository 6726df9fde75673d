use crate::chat::{ChatSession, ChatTurn};
use crate::config::AppConfig;
use crate::db::{Connector, DatabaseSession, SchemaSelection};
use crate::error::Result;
use crate::llm::Translator;
use crate::query;
use crate::schema::SchemaRegistry;
use crate::web::templates::init_templates;
use minijinja::Environment;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub template_env: Environment<'static>,
    pub registry: Arc<SchemaRegistry>,
    pub db_session: DatabaseSession,
    pub translator: Translator,
    pub chat: ChatSession,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        registry: Arc<SchemaRegistry>,
        connector: Arc<dyn Connector>,
        translator: Translator,
    ) -> Result<Self> {
        let template_env = init_templates()?;
        let db_session = DatabaseSession::new(Arc::clone(&registry), connector);
        let chat = ChatSession::new(config.chat.history_capacity);

        Ok(Self {
            config,
            template_env,
            registry,
            db_session,
            translator,
            chat,
            startup_time: chrono::Utc::now(),
        })
    }

    /// Translates the question against the selected schema, runs the SQL if a
    /// database is connected, and records the turn.
    ///
    /// The session is read once up front, so the schema text the model sees
    /// and the connection the SQL runs on always belong to the same selection.
    pub async fn submit(&self, question: &str) -> ChatTurn {
        let session = self.db_session.snapshot();
        debug!(
            "Submitting question against schema {:?}: {}",
            session.schema_id, question
        );

        let sql = self.translator.translate(&session.schema_text, question).await;
        let outcome = query::execute(&sql, &session).await;

        let turn = ChatTurn::new(question.to_string(), sql, outcome);
        self.chat.record(turn.clone()).await;
        info!("Recorded chat turn");
        turn
    }

    pub async fn select_schema(&self, selection: SchemaSelection) -> Result<()> {
        self.db_session.select(selection).await
    }
}
