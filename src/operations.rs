//! The operation table.
//!
//! Each [`Handler`] names one exposed operation and knows its HTTP shape:
//! method, path below the base address, which status codes count as
//! success, and how the JSON response becomes the reply. [`Handler::build`]
//! decodes the operation parameters and produces an [`Operation`] ready for
//! the client to execute.

use std::fmt;

use reqwest::Method;
use serde::Serialize;

use crate::error::BridgeError;
use crate::models::{
    CreatedTicketsResponse, HitsResponse, NewHitParams, NewTicketParams, SidParams, StatusBody,
    StatusTicketParams, StatusTicketsParams, TicketStatus, TicketsResponse,
};

/// An operation the module exposes, selected by the request's `handler` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Create a ticket in a channel.
    NewTicket,
    /// Fetch the ticket(s) matching a SID.
    GetTicket,
    /// Fetch all tickets.
    GetTickets,
    /// Close one ticket.
    CloseTicket,
    /// Mark one ticket unacknowledged.
    UnackTicket,
    /// Close several tickets.
    CloseTickets,
    /// Mark several tickets unacknowledged.
    UnackTickets,
    /// Attach a hit to a ticket.
    NewHit,
    /// Fetch the hits of a ticket.
    GetHits,
}

impl Handler {
    /// Every handler, in table order.
    pub const ALL: [Handler; 9] = [
        Handler::NewTicket,
        Handler::GetTicket,
        Handler::GetTickets,
        Handler::CloseTicket,
        Handler::UnackTicket,
        Handler::CloseTickets,
        Handler::UnackTickets,
        Handler::NewHit,
        Handler::GetHits,
    ];

    /// Looks up a handler by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    /// Returns the wire name of the handler.
    pub fn name(self) -> &'static str {
        match self {
            Handler::NewTicket => "new-ticket",
            Handler::GetTicket => "get-ticket",
            Handler::GetTickets => "get-tickets",
            Handler::CloseTicket => "close-ticket",
            Handler::UnackTicket => "unack-ticket",
            Handler::CloseTickets => "close-tickets",
            Handler::UnackTickets => "unack-tickets",
            Handler::NewHit => "new-hit",
            Handler::GetHits => "get-hits",
        }
    }

    /// Returns the HTTP method used by the handler.
    pub fn method(self) -> Method {
        match self {
            Handler::NewTicket | Handler::NewHit => Method::POST,
            Handler::GetTicket | Handler::GetTickets | Handler::GetHits => Method::GET,
            Handler::CloseTicket
            | Handler::UnackTicket
            | Handler::CloseTickets
            | Handler::UnackTickets => Method::PUT,
        }
    }

    /// Returns the path below the base address.
    pub fn path(self) -> &'static str {
        match self {
            Handler::NewTicket | Handler::GetTicket | Handler::GetTickets => "ticket",
            Handler::CloseTicket
            | Handler::UnackTicket
            | Handler::CloseTickets
            | Handler::UnackTickets => "ticket/status",
            Handler::NewHit | Handler::GetHits => "ticket/hit",
        }
    }

    /// Returns which status codes the handler accepts as success.
    pub fn expect(self) -> Expect {
        match self {
            Handler::GetTicket | Handler::GetTickets => Expect::Ok,
            _ => Expect::Success,
        }
    }

    /// Returns how the handler turns a response body into a reply.
    pub fn extract(self) -> Extract {
        match self {
            Handler::NewTicket => Extract::FirstTicketSid,
            Handler::GetTicket | Handler::GetTickets => Extract::Tickets,
            Handler::GetHits => Extract::Hits,
            Handler::CloseTicket
            | Handler::UnackTicket
            | Handler::CloseTickets
            | Handler::UnackTickets
            | Handler::NewHit => Extract::Nothing,
        }
    }

    fn status(self) -> Option<TicketStatus> {
        match self {
            Handler::CloseTicket | Handler::CloseTickets => Some(TicketStatus::Closed),
            Handler::UnackTicket | Handler::UnackTickets => Some(TicketStatus::Unacknowledged),
            _ => None,
        }
    }

    /// Decodes the request payload and builds the outbound operation.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::BadData` if the payload lacks the fields the
    /// handler needs or a body cannot be encoded as JSON.
    pub fn build(self, data: &[u8]) -> Result<Operation, BridgeError> {
        let mut op = Operation::new(self);

        match self {
            Handler::NewTicket => {
                let params: NewTicketParams = self.decode(data, "a CHANNEL (string) and TICKET (thing)")?;
                op.query.push(("channel", params.channel));
                op.body = Some(params.ticket);
            }
            Handler::GetTicket | Handler::GetHits => {
                let params: SidParams = self.decode(data, "a SID (string)")?;
                op.query.push(("sid", params.sid));
            }
            Handler::GetTickets => {}
            Handler::CloseTicket | Handler::UnackTicket => {
                let params: StatusTicketParams =
                    self.decode(data, "a SID (string) and optional COMMENT (string)")?;
                op.query.push(("sid", params.sid));
                op.body = Some(self.status_body(params.comment)?);
            }
            Handler::CloseTickets | Handler::UnackTickets => {
                let params: StatusTicketsParams = self.decode(
                    data,
                    "a list of SIDs (list of strings) and optional COMMENT (string)",
                )?;
                op.query
                    .extend(params.sids.into_iter().map(|sid| ("sid", sid)));
                op.body = Some(self.status_body(params.comment)?);
            }
            Handler::NewHit => {
                let params: NewHitParams = self.decode(data, "a SID (string) and HIT (thing)")?;
                op.query.push(("sid", params.sid));
                op.body = Some(params.hit);
            }
        }

        Ok(op)
    }

    fn decode<T>(self, data: &[u8], expecting: &str) -> Result<T, BridgeError>
    where
        T: serde::de::DeserializeOwned,
    {
        rmp_serde::from_slice(data).map_err(|e| {
            BridgeError::bad_data(format!(
                "failed to unpack {} request; expecting {} ({})",
                self.name(),
                expecting,
                e
            ))
        })
    }

    fn status_body(self, comment: Option<String>) -> Result<serde_json::Value, BridgeError> {
        let status = self
            .status()
            .ok_or_else(|| BridgeError::bad_data(format!("{} does not change status", self.name())))?;
        let body = StatusBody {
            status,
            comment: comment.unwrap_or_default(),
        };
        serde_json::to_value(body)
            .map_err(|e| BridgeError::bad_data(format!("failed to JSON marshal status ({})", e)))
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Status codes accepted as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Any 2xx code.
    Success,
    /// Exactly 200.
    Ok,
}

impl Expect {
    /// Returns true if `status` counts as success.
    pub fn accepts(self, status: u16) -> bool {
        match self {
            Expect::Success => status / 100 == 2,
            Expect::Ok => status == 200,
        }
    }
}

/// How a successful response body becomes the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// The body is ignored; the reply is empty.
    Nothing,
    /// The SID of the first record in `tickets`.
    FirstTicketSid,
    /// The `tickets` list.
    Tickets,
    /// The `hits` list.
    Hits,
}

impl Extract {
    /// Decodes `body` into the reply.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::BadData` if the body does not have the expected
    /// shape, or the ticket list is empty for [`Extract::FirstTicketSid`].
    pub fn reply(self, body: &[u8]) -> Result<Reply, BridgeError> {
        match self {
            Extract::Nothing => Ok(Reply::Empty),
            Extract::FirstTicketSid => {
                let response: CreatedTicketsResponse = serde_json::from_slice(body)?;
                response
                    .tickets
                    .into_iter()
                    .next()
                    .map(|ticket| Reply::Sid(ticket.sid))
                    .ok_or_else(|| BridgeError::bad_data("response contains no tickets"))
            }
            Extract::Tickets => {
                let response: TicketsResponse = serde_json::from_slice(body)?;
                Ok(Reply::Records(response.tickets))
            }
            Extract::Hits => {
                let response: HitsResponse = serde_json::from_slice(body)?;
                Ok(Reply::Records(response.hits))
            }
        }
    }
}

/// The value sent back to the host on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// No payload; encoded as nil.
    Empty,
    /// A ticket SID.
    Sid(String),
    /// Ticket or hit records.
    Records(Vec<serde_json::Value>),
}

/// A fully resolved outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// The handler this operation was built from.
    pub handler: Handler,
    /// HTTP method.
    pub method: Method,
    /// Path below the base address.
    pub path: &'static str,
    /// Query parameters; keys may repeat.
    pub query: Vec<(&'static str, String)>,
    /// JSON body, if the operation sends one.
    pub body: Option<serde_json::Value>,
    /// Accepted status codes.
    pub expect: Expect,
    /// Reply extraction.
    pub extract: Extract,
}

impl Operation {
    fn new(handler: Handler) -> Self {
        Self {
            handler,
            method: handler.method(),
            path: handler.path(),
            query: Vec::new(),
            body: None,
            expect: handler.expect(),
            extract: handler.extract(),
        }
    }
}
