use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Executor, Row as SqlxRow, Statement, ValueRef};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{Connector, DatabaseClient, DbError, Row};
use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};

/// Opens single-connection pools against the configured PostgreSQL host.
pub struct PostgresConnector {
    user: String,
    password: String,
    host: String,
    port: u16,
    role: Option<String>,
    read_only: bool,
    connect_timeout: Duration,
    query_timeout: Duration,
}

impl PostgresConnector {
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let require = |value: &Option<String>, key: &str| {
            value
                .clone()
                .ok_or_else(|| AppError::configuration(format!("{} is not set", key)))
        };

        Ok(Self {
            user: require(&config.user, "database.user")?,
            password: require(&config.password, "database.password")?,
            host: require(&config.host, "database.host")?,
            port: config.port,
            role: config.role.clone(),
            read_only: config.read_only,
            connect_timeout: config.connect_timeout(),
            query_timeout: config.query_timeout(),
        })
    }

    fn connect_options(&self, db_name: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(db_name)
            .application_name("nl2sql-chat")
    }

    /// Statements run on every fresh connection before it is handed out.
    fn session_setup(&self) -> Vec<String> {
        let mut statements = Vec::new();
        if let Some(role) = &self.role {
            statements.push(format!("SET ROLE {}", quote_ident(role)));
        }
        if self.read_only {
            statements.push("SET default_transaction_read_only = on".to_string());
        }
        // The client-side deadline only abandons the wait; this stops the backend.
        statements.push(format!(
            "SET statement_timeout = {}",
            self.query_timeout.as_millis()
        ));
        statements
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl Connector for PostgresConnector {
    async fn connect(&self, db_name: &str) -> std::result::Result<Arc<dyn DatabaseClient>, DbError> {
        debug!("Connecting to {}:{} database {}", self.host, self.port, db_name);
        let setup = Arc::new(self.session_setup());

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(self.connect_timeout)
            .after_connect(move |conn, _meta| {
                let setup = Arc::clone(&setup);
                Box::pin(async move {
                    for statement in setup.iter() {
                        (&mut *conn).execute(statement.as_str()).await?;
                    }
                    Ok(())
                })
            })
            .connect_with(self.connect_options(db_name))
            .await
            .map_err(|e| DbError::Connect(map_connection_error(&e, &self.host, self.port, db_name)))?;

        info!("Connected to database {}", db_name);
        Ok(Arc::new(PostgresClient {
            pool,
            db_name: db_name.to_string(),
            query_timeout: self.query_timeout,
        }))
    }
}

#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
    db_name: String,
    query_timeout: Duration,
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn describe(&self, sql: &str) -> std::result::Result<Vec<String>, DbError> {
        // Preparing the statement yields its result columns without running it.
        let statement = (&self.pool)
            .prepare(sql)
            .await
            .map_err(|e| DbError::Query(format_query_error(&e)))?;
        Ok(statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect())
    }

    async fn fetch_rows(&self, sql: &str) -> std::result::Result<Vec<Row>, DbError> {
        let start = Instant::now();

        // The simple query protocol returns every value in text form.
        let rows = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::Query(format_query_error(&e)))?;

        debug!(
            "Query on {} returned {} rows in {}ms",
            self.db_name,
            rows.len(),
            start.elapsed().as_millis()
        );
        Ok(rows.iter().map(convert_row).collect())
    }

    fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    async fn close(&self) -> std::result::Result<(), DbError> {
        if self.pool.is_closed() {
            return Err(DbError::Closed);
        }
        self.pool.close().await;
        info!("Connection to database {} closed", self.db_name);
        Ok(())
    }
}

fn convert_row(row: &PgRow) -> Row {
    (0..row.len())
        .map(|i| match row.try_get_raw(i) {
            Ok(value) if value.is_null() => None,
            Ok(value) => Some(match value.as_str() {
                Ok(text) => text.to_string(),
                Err(e) => {
                    warn!("Column {} is not valid text: {}", i, e);
                    "<binary>".to_string()
                }
            }),
            Err(e) => {
                warn!("Failed to read column {}: {}", i, e);
                None
            }
        })
        .collect()
}

fn map_connection_error(error: &sqlx::Error, host: &str, port: u16, database: &str) -> String {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        format!("Cannot connect to {host}:{port}. Check that the server is running.")
    } else if error_str.contains("password authentication failed") {
        "Authentication failed. Check the database credentials.".to_string()
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        format!("Database '{database}' does not exist.")
    } else if matches!(error, sqlx::Error::PoolTimedOut) {
        format!("Connection to {host}:{port} timed out.")
    } else {
        error.to_string()
    }
}

/// Database message plus any detail/hint PostgreSQL attached.
fn format_query_error(error: &sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut message = db_error.message().to_string();
    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            message.push_str("\nDETAIL: ");
            message.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            message.push_str("\nHINT: ");
            message.push_str(hint);
        }
    }
    message
}
