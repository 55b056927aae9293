//! Taskpad core types and utilities

pub mod store;
pub mod task;
pub mod validation;

pub use store::{FileTokenStore, MemoryTokenStore, TokenPair, TokenStore};
pub use task::{Task, TaskDraft, TaskPage};
pub use validation::{validate_title, TitleError, TITLE_MAX_LEN};
