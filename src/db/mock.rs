//! In-memory database used by tests.
//!
//! Understands `SELECT * FROM <table>` against fixture tables and tracks how
//! many connections are open so tests can check the one-connection rule.
//! `SET`, DDL and plain DML describe to no columns, like they do in
//! PostgreSQL.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Connector, DatabaseClient, DbError, QueryResult, Row};

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

const NO_COLUMN_PREFIXES: &[&str] = &["SET ", "CREATE ", "DROP ", "INSERT ", "UPDATE ", "DELETE "];

#[derive(Default)]
struct Tracker {
    open: Mutex<Vec<(usize, String)>>,
    executed: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    double_closes: AtomicUsize,
}

#[derive(Default)]
pub struct FakeConnector {
    tables: Arc<HashMap<String, QueryResult>>,
    delays: Arc<HashMap<String, Duration>>,
    failing: HashSet<String>,
    query_timeout: Option<Duration>,
    close_delay: Option<Duration>,
    tracker: Arc<Tracker>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: &[&str], rows: Vec<Row>) -> Self {
        let result = QueryResult::new(columns.iter().map(|c| c.to_string()).collect(), rows);
        Arc::make_mut(&mut self.tables).insert(name.to_uppercase(), result);
        self
    }

    /// Reading `name` takes `delay` before any rows come back.
    pub fn with_slow_table(mut self, name: &str, columns: &[&str], delay: Duration) -> Self {
        self = self.with_table(name, columns, Vec::new());
        Arc::make_mut(&mut self.delays).insert(name.to_uppercase(), delay);
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Closing a client waits this long, like a pool draining a busy connection.
    pub fn with_slow_close(mut self, delay: Duration) -> Self {
        self.close_delay = Some(delay);
        self
    }

    pub fn failing_for(mut self, db_name: &str) -> Self {
        self.failing.insert(db_name.to_string());
        self
    }

    pub fn open_connections(&self) -> usize {
        self.tracker.open.lock().unwrap().len()
    }

    pub fn open_databases(&self) -> Vec<String> {
        self.tracker
            .open
            .lock()
            .unwrap()
            .iter()
            .map(|(_, db)| db.clone())
            .collect()
    }

    pub fn double_closes(&self) -> usize {
        self.tracker.double_closes.load(Ordering::SeqCst)
    }

    /// Every SQL string any client actually ran (described-only ones excluded).
    pub fn executed(&self) -> Vec<String> {
        self.tracker.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, db_name: &str) -> Result<Arc<dyn DatabaseClient>, DbError> {
        if self.failing.contains(db_name) {
            return Err(DbError::Connect(format!(
                "Database '{}' does not exist.",
                db_name
            )));
        }

        // Yield so concurrent selections genuinely interleave.
        tokio::task::yield_now().await;

        let id = self.tracker.next_id.fetch_add(1, Ordering::SeqCst);
        self.tracker
            .open
            .lock()
            .unwrap()
            .push((id, db_name.to_string()));

        Ok(Arc::new(FakeClient {
            id,
            tables: Arc::clone(&self.tables),
            delays: Arc::clone(&self.delays),
            query_timeout: self.query_timeout.unwrap_or(DEFAULT_QUERY_TIMEOUT),
            close_delay: self.close_delay,
            tracker: Arc::clone(&self.tracker),
            closed: AtomicBool::new(false),
        }))
    }
}

pub struct FakeClient {
    id: usize,
    tables: Arc<HashMap<String, QueryResult>>,
    delays: Arc<HashMap<String, Duration>>,
    query_timeout: Duration,
    close_delay: Option<Duration>,
    tracker: Arc<Tracker>,
    closed: AtomicBool,
}

impl FakeClient {
    fn table_name(sql: &str) -> Option<String> {
        let normalized = sql.trim().trim_end_matches(';').trim();
        let upper = normalized.to_uppercase();
        let rest = upper.strip_prefix("SELECT * FROM ")?;
        let name = rest.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        Some(name.to_string())
    }

    fn returns_no_columns(sql: &str) -> bool {
        let upper = sql.trim_start().to_uppercase();
        NO_COLUMN_PREFIXES.iter().any(|p| upper.starts_with(p))
    }

    fn lookup(&self, sql: &str) -> Result<&QueryResult, DbError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DbError::Closed);
        }

        let name = Self::table_name(sql)
            .ok_or_else(|| DbError::Query(format!("syntax error at or near \"{}\"", sql)))?;

        self.tables.get(&name).ok_or_else(|| {
            DbError::Query(format!(
                "relation \"{}\" does not exist",
                name.to_lowercase()
            ))
        })
    }
}

#[async_trait]
impl DatabaseClient for FakeClient {
    async fn describe(&self, sql: &str) -> Result<Vec<String>, DbError> {
        if Self::returns_no_columns(sql) {
            return Ok(Vec::new());
        }
        Ok(self.lookup(sql)?.columns.clone())
    }

    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, DbError> {
        self.tracker.executed.lock().unwrap().push(sql.to_string());

        let rows = self.lookup(sql)?.rows.clone();
        if let Some(delay) = Self::table_name(sql).and_then(|name| self.delays.get(&name)) {
            tokio::time::sleep(*delay).await;
        }
        Ok(rows)
    }

    fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    async fn close(&self) -> Result<(), DbError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            self.tracker.double_closes.fetch_add(1, Ordering::SeqCst);
            return Err(DbError::Closed);
        }
        if let Some(delay) = self.close_delay {
            tokio::time::sleep(delay).await;
        }
        self.tracker
            .open
            .lock()
            .unwrap()
            .retain(|(id, _)| *id != self.id);
        Ok(())
    }
}
