use minijinja::HtmlEscape;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use super::render_table;
use crate::db::SessionSnapshot;

/// Result of running a generated statement, kept apart from its markup so
/// templates decide how failures look.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// No database selected; nothing was run.
    NotExecuted,
    Rendered { html: String },
    Failed { message: String },
}

impl ExecutionOutcome {
    pub const PLACEHOLDER: &'static str = "<p></p>";

    pub fn to_html(&self) -> String {
        match self {
            ExecutionOutcome::NotExecuted => Self::PLACEHOLDER.to_string(),
            ExecutionOutcome::Rendered { html } => html.clone(),
            ExecutionOutcome::Failed { message } => format!(
                "<p>Error: Unable to execute the query in database. {}</p>",
                HtmlEscape(message)
            ),
        }
    }
}

/// Runs `sql` verbatim on the snapshot's connection. Failures are returned as
/// [`ExecutionOutcome::Failed`], never propagated.
pub async fn execute(sql: &str, session: &SessionSnapshot) -> ExecutionOutcome {
    let Some(client) = session.client() else {
        return ExecutionOutcome::NotExecuted;
    };

    let start = Instant::now();
    match client.execute_query(sql).await {
        Ok(result) => {
            info!(
                "Query returned {} rows in {}ms",
                result.row_count(),
                start.elapsed().as_millis()
            );
            ExecutionOutcome::Rendered {
                html: render_table(&result),
            }
        }
        Err(e) => {
            warn!("Query failed: {}", e);
            ExecutionOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}
