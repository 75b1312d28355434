//! JiraBridge server library
//!
//! Ticket operations plus the HTTP and MCP façades, exposed as a library for
//! testing.

pub mod api;
pub mod mcp;
pub mod tickets;

pub use api::{router, start_server, AppState};
pub use mcp::McpServer;
pub use tickets::TicketService;
