//! randomuser harness - resilient HTTP test harness
//!
//! A retrying client for the randomuser.me person endpoint, an undoable
//! command runner with lifecycle observers, and composable validation
//! strategies for the records it returns.

pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod common;
pub mod testing;
pub mod validation;

// Re-export commonly used types for tests
pub use api::{UserApi, UserQuery, UserResponse};
pub use client::{ClientConfig, ResilientClient};
pub use common::{Config, Error, Result};
