//! Operation layer over the Jira client

pub mod limit;
pub mod service;

pub use service::{TicketService, RECENT_DAYS};
