//! JiraBridge core
//!
//! Ticket data model and process configuration shared by the Jira client and
//! the server façades.

pub mod error;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
