use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::query::ExecutionOutcome;

/// One question with the SQL generated for it and what running it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub user_text: String,
    pub generated_sql: String,
    pub outcome: ExecutionOutcome,
    pub asked_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(user_text: String, generated_sql: String, outcome: ExecutionOutcome) -> Self {
        Self {
            user_text,
            generated_sql,
            outcome,
            asked_at: Utc::now(),
        }
    }

    /// Result as an HTML fragment: a table, an error paragraph or `<p></p>`.
    pub fn rendered_result(&self) -> String {
        self.outcome.to_html()
    }
}

/// Insertion-ordered turns, never longer than `capacity`. The oldest turn
/// is evicted when a new one would exceed it.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    turns: VecDeque<ChatTurn>,
    capacity: usize,
}

impl ChatHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn record(&mut self, turn: ChatTurn) {
        self.turns.push_back(turn);
        if self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Oldest first.
    pub fn list(&self) -> Vec<ChatTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Process-wide history behind a lock. The lock is only held for the push
/// or the copy, never across translation or query execution.
pub struct ChatSession {
    history: Mutex<ChatHistory>,
}

impl ChatSession {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: Mutex::new(ChatHistory::new(capacity)),
        }
    }

    pub async fn record(&self, turn: ChatTurn) {
        self.history.lock().await.record(turn);
    }

    pub async fn list(&self) -> Vec<ChatTurn> {
        self.history.lock().await.list()
    }

    pub async fn len(&self) -> usize {
        self.history.lock().await.len()
    }

    pub async fn capacity(&self) -> usize {
        self.history.lock().await.capacity()
    }
}
