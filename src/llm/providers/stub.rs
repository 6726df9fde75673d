use crate::llm::{LlmError, SqlGenerator};
use async_trait::async_trait;
use tracing::debug;

/// Offline stand-in for the hosted model. Returns the configured SQL, or a
/// query that just echoes the question back.
pub struct StubProvider {
    fixed_sql: Option<String>,
}

impl StubProvider {
    pub fn new(fixed_sql: Option<String>) -> Self {
        Self { fixed_sql }
    }
}

#[async_trait]
impl SqlGenerator for StubProvider {
    async fn generate_sql(&self, question: &str, _schema: &str) -> Result<String, LlmError> {
        let sql = match &self.fixed_sql {
            Some(sql) => sql.clone(),
            None => format!("SELECT '{}' AS question", question.replace('\'', "''")),
        };
        debug!("Stub provider answering with: {}", sql);
        Ok(sql)
    }
}
