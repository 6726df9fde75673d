//! In-memory chat transcript shared by all requests.

mod history;

pub use history::{ChatHistory, ChatSession, ChatTurn};
