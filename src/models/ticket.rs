//! JSON bodies exchanged with the DutyCalls API.

use serde::{Deserialize, Serialize};

/// Ticket status written by the status-update operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// The ticket is closed.
    Closed,
    /// The ticket is reopened without acknowledgement.
    Unacknowledged,
}

impl TicketStatus {
    /// Returns the literal sent to the API.
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Closed => "closed",
            TicketStatus::Unacknowledged => "unacknowledged",
        }
    }
}

/// Body of `PUT ticket/status`.
///
/// The comment is always present, even when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBody {
    /// Target status.
    pub status: TicketStatus,
    /// Free-text comment accompanying the change.
    pub comment: String,
}

/// Reference to a ticket as returned by ticket creation.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketRef {
    /// SID of the ticket.
    pub sid: String,

    /// Channel the ticket lives in.
    #[serde(default)]
    pub channel: Option<String>,
}

/// Response of `POST ticket`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTicketsResponse {
    /// Created tickets; the first one is the reply.
    #[serde(alias = "Tickets")]
    pub tickets: Vec<TicketRef>,
}

/// Response of `GET ticket`.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketsResponse {
    /// Ticket records, relayed without interpretation.
    #[serde(alias = "Tickets")]
    pub tickets: Vec<serde_json::Value>,
}

/// Response of `GET ticket/hit`.
#[derive(Debug, Clone, Deserialize)]
pub struct HitsResponse {
    /// Hit records, relayed without interpretation.
    #[serde(alias = "Hits")]
    pub hits: Vec<serde_json::Value>,
}
