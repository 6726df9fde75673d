use serde::Serialize;

/// One result row; `None` is SQL NULL. Values keep PostgreSQL's text form.
pub type Row = Vec<Option<String>>;

/// Full result set of a query, in the order the database returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
