//! Workflow transition model

use serde::{Deserialize, Serialize};

/// A status change currently allowed for a ticket.
///
/// The set depends on the ticket's workflow state in Jira and is only valid
/// at the moment it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub name: String,
    pub to: TransitionTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionTarget {
    pub name: String,
    pub description: Option<String>,
}

impl Transition {
    /// True when `requested` names either the target status or the
    /// transition itself, ignoring case.
    pub fn matches(&self, requested: &str) -> bool {
        let requested = requested.trim();
        self.to.name.eq_ignore_ascii_case(requested) || self.name.eq_ignore_ascii_case(requested)
    }
}

/// First transition in `transitions` that leads to `requested`.
pub fn find_transition<'a>(transitions: &'a [Transition], requested: &str) -> Option<&'a Transition> {
    transitions.iter().find(|t| t.matches(requested))
}
