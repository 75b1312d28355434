//! JiraBridge JIRA Integration
//!
//! REST client that turns ticket operations into Jira API calls and
//! normalizes the answers into core models.

pub mod auth;
pub mod client;
pub mod error;
pub mod jql;
pub mod types;

pub use client::{JiraClient, JiraRequest};
pub use error::{Error, Result};
pub use types::*;
