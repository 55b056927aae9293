//! Taskpad HTTP client
//!
//! Two collaborating pieces: the [`session::SessionStore`] owns credential
//! state and the token endpoints, and the [`gateway::Gateway`] is the single
//! choke point for authenticated calls, recovering from token expiry with a
//! single refresh-and-retry cycle.

pub mod client;
pub mod error;
pub mod gateway;
pub mod session;
pub mod tasks;
pub mod types;

pub use client::{TaskClient, TaskClientBuilder};
pub use error::ClientError;
pub use gateway::{Gateway, Interceptor, Verdict};
pub use session::SessionStore;
