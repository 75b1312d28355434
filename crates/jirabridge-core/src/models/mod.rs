pub mod config;
pub mod ticket;
pub mod transition;

pub use config::{Config, JiraConfig, LimitConfig, ServerConfig};
pub use ticket::{StatusChange, Ticket, TicketDetail, TicketRef, TicketSummary, User, UserView};
pub use transition::{Transition, TransitionTarget};
