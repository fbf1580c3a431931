//! Operation parameters decoded from module-request payloads.
//!
//! Every request payload is a MessagePack map carrying a `handler` name
//! plus the fields of the selected operation. Free-form payloads (tickets,
//! hits) are kept as JSON values and forwarded verbatim.

use serde::Deserialize;

/// The part of a module request common to every operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    /// Name of the operation to perform (e.g., `"new-ticket"`).
    #[serde(default)]
    pub handler: Option<String>,
}

/// Parameters for `new-ticket`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTicketParams {
    /// Channel the ticket is created in.
    pub channel: String,

    /// Ticket payload, forwarded as the JSON body.
    pub ticket: serde_json::Value,
}

/// Parameters for operations addressing a single ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct SidParams {
    /// SID of the ticket.
    pub sid: String,
}

/// Parameters for `close-ticket` and `unack-ticket`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusTicketParams {
    /// SID of the ticket.
    pub sid: String,

    /// Optional comment; an absent comment is sent as `""`.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Parameters for `close-tickets` and `unack-tickets`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusTicketsParams {
    /// SIDs of the tickets.
    pub sids: Vec<String>,

    /// Optional comment; an absent comment is sent as `""`.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Parameters for `new-hit`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewHitParams {
    /// SID of the ticket the hit is attached to.
    pub sid: String,

    /// Hit payload, forwarded as the JSON body.
    pub hit: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pack(value: serde_json::Value) -> Vec<u8> {
        rmp_serde::to_vec_named(&value).unwrap()
    }

    #[test]
    fn test_envelope_ignores_operation_fields() {
        let data = pack(json!({"handler": "get-ticket", "sid": "S1"}));
        let envelope: Envelope = rmp_serde::from_slice(&data).unwrap();
        assert_eq!(envelope.handler.as_deref(), Some("get-ticket"));
    }

    #[test]
    fn test_envelope_without_handler() {
        let data = pack(json!({"sid": "S1"}));
        let envelope: Envelope = rmp_serde::from_slice(&data).unwrap();
        assert!(envelope.handler.is_none());
    }

    #[test]
    fn test_new_ticket_keeps_payload() {
        let data = pack(json!({
            "handler": "new-ticket",
            "channel": "ops",
            "ticket": {"title": "disk full", "body": "90%", "tags": ["a", 1]}
        }));
        let params: NewTicketParams = rmp_serde::from_slice(&data).unwrap();
        assert_eq!(params.channel, "ops");
        assert_eq!(
            params.ticket,
            json!({"title": "disk full", "body": "90%", "tags": ["a", 1]})
        );
    }

    #[test]
    fn test_status_comment_is_optional() {
        let data = pack(json!({"sids": ["S1", "S2"]}));
        let params: StatusTicketsParams = rmp_serde::from_slice(&data).unwrap();
        assert_eq!(params.sids, vec!["S1", "S2"]);
        assert!(params.comment.is_none());
    }

    #[test]
    fn test_sid_is_required() {
        let data = pack(json!({"handler": "get-hits"}));
        assert!(rmp_serde::from_slice::<SidParams>(&data).is_err());
    }
}
