//! Database access: one connection at a time to the selected preset schema.
//!
//! The [`Connector`] opens a [`DatabaseClient`] for a database name; the
//! [`DatabaseSession`] owns whichever client is currently active.

#[cfg(test)]
pub mod mock;
mod postgres;
mod session;
mod types;

pub use postgres::PostgresConnector;
pub use session::{DatabaseSession, SchemaSelection, SessionSnapshot, DESELECT_ID};
pub use types::{QueryResult, Row};

use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the database. Display is the bare cause, so callers
/// can wrap it in their own user-facing sentence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    #[error("{0}")]
    Connect(String),

    #[error("{0}")]
    Query(String),

    #[error("statement does not return rows")]
    NotTabular,

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection is already closed")]
    Closed,
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        AppError::connection(e.to_string())
    }
}

/// An open connection to one database.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Result column names of `sql`, learned without running it.
    async fn describe(&self, sql: &str) -> Result<Vec<String>, DbError>;

    /// Runs `sql` verbatim and returns every row in text form.
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, DbError>;

    /// Upper bound on [`DatabaseClient::execute_query`].
    fn query_timeout(&self) -> Duration;

    /// Releases the connection. A second close reports [`DbError::Closed`].
    async fn close(&self) -> Result<(), DbError>;

    /// Describes `sql`, refuses it if it yields no columns, then runs it.
    /// Both steps share one deadline.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult, DbError> {
        let timeout = self.query_timeout();
        let run = async {
            let columns = self.describe(sql).await?;
            if columns.is_empty() {
                return Err(DbError::NotTabular);
            }
            let rows = self.fetch_rows(sql).await?;
            Ok::<_, DbError>(QueryResult::new(columns, rows))
        };

        tokio::time::timeout(timeout, run)
            .await
            .map_err(|_| DbError::Timeout(timeout))?
    }
}

/// Opens connections by database name; credentials live in the implementor.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, db_name: &str) -> Result<Arc<dyn DatabaseClient>, DbError>;
}
