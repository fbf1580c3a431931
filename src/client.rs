//! HTTP client for the DutyCalls API.
//!
//! This module provides the `DutyCallsClient` struct, which executes a
//! resolved [`Operation`] against the API: it joins the base address with
//! the operation path, attaches query parameters, JSON body and basic
//! authentication, performs the call, and classifies the response.
//!
//! # Failures
//!
//! - Transport failures (DNS, refused connection, timeout) become
//!   `BridgeError::Operation`. They are not retried.
//! - A response whose status the operation does not accept becomes
//!   `BridgeError::Upstream` carrying the raw body and status code.
//! - Unreadable or unexpected bodies become `BridgeError::BadData`.
//!
//! # Security
//!
//! The password is never logged and is stripped from transport errors.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::config::{Credentials, Settings};
use crate::error::BridgeError;
use crate::operations::{Operation, Reply};

/// HTTP client for the DutyCalls API.
///
/// Credentials are passed per call so that a configuration change applies
/// to the next operation without rebuilding the client.
#[derive(Clone)]
pub struct DutyCallsClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,
}

impl DutyCallsClient {
    /// Creates a new client from process settings.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Config` if the HTTP client fails to initialize.
    pub fn new(settings: &Settings) -> Result<Self, BridgeError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.http_timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| BridgeError::invalid_config(format!("failed to build HTTP client ({})", e)))?;

        Ok(Self { http })
    }

    /// Appends `path` to the path of `base`, segment by segment.
    ///
    /// `https://h/api` and `https://h/api/` both yield `https://h/api/ticket`
    /// for the path `ticket`.
    pub fn endpoint(base: &Url, path: &str) -> Result<Url, BridgeError> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);

        url.path_segments_mut()
            .map_err(|_| BridgeError::bad_data(format!("failed to parse URI ({})", base)))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));

        Ok(url)
    }

    /// Executes `op` with `creds` and returns the decoded reply.
    ///
    /// # Errors
    ///
    /// See the module documentation for how failures are classified.
    pub async fn invoke(&self, creds: &Credentials, op: &Operation) -> Result<Reply, BridgeError> {
        let url = Self::endpoint(&creds.base_url()?, op.path)?;

        tracing::debug!(
            handler = %op.handler,
            method = %op.method,
            path = %op.path,
            "Making DutyCalls API request"
        );

        let mut req = self
            .http
            .request(op.method.clone(), url)
            .basic_auth(&creds.login, Some(&creds.password));

        if !op.query.is_empty() {
            req = req.query(&op.query);
        }

        if let Some(body) = &op.body {
            let json = serde_json::to_vec(body)
                .map_err(|e| BridgeError::bad_data(format!("failed to JSON marshal body ({})", e)))?;
            req = req.header(CONTENT_TYPE, "application/json").body(json);
        }

        let response = req.send().await.map_err(|e| {
            let message = BridgeError::sanitize_message(&e.to_string(), &creds.password);
            tracing::warn!(handler = %op.handler, error = %message, "DutyCalls request failed");
            BridgeError::Operation(message)
        })?;
        let status = response.status().as_u16();

        let body = response.bytes().await.map_err(|e| {
            BridgeError::bad_data(format!(
                "failed to read bytes from response ({})",
                BridgeError::sanitize_message(&e.to_string(), &creds.password)
            ))
        })?;

        tracing::trace!(status, body = %String::from_utf8_lossy(&body), "DutyCalls API response");

        if !op.expect.accepts(status) {
            tracing::debug!(handler = %op.handler, status, "DutyCalls API rejected request");
            return Err(BridgeError::upstream(
                status,
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }

        op.extract.reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::operations::Handler;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds(uri: &str) -> Credentials {
        Credentials {
            login: "ops".to_string(),
            password: "s3cret".to_string(),
            uri: uri.to_string(),
        }
    }

    fn pack(value: serde_json::Value) -> Vec<u8> {
        rmp_serde::to_vec_named(&value).unwrap()
    }

    fn client() -> DutyCallsClient {
        DutyCallsClient::new(&Settings::default()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_path() {
        let base = Url::parse("https://dutycalls.me/api").unwrap();
        assert_eq!(
            DutyCallsClient::endpoint(&base, "ticket/hit").unwrap().as_str(),
            "https://dutycalls.me/api/ticket/hit"
        );

        let base = Url::parse("https://dutycalls.me/api/").unwrap();
        assert_eq!(
            DutyCallsClient::endpoint(&base, "ticket").unwrap().as_str(),
            "https://dutycalls.me/api/ticket"
        );

        let base = Url::parse("http://localhost:8080").unwrap();
        assert_eq!(
            DutyCallsClient::endpoint(&base, "ticket/status").unwrap().as_str(),
            "http://localhost:8080/ticket/status"
        );
    }

    #[tokio::test]
    async fn test_new_ticket_returns_first_sid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ticket"))
            .and(query_param("channel", "ops"))
            .and(basic_auth("ops", "s3cret"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"title": "disk full"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "tickets": [{"sid": "T1", "channel": "ops"}, {"sid": "T2", "channel": "ops"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let op = Handler::NewTicket
            .build(&pack(json!({"channel": "ops", "ticket": {"title": "disk full"}})))
            .unwrap();
        let reply = client()
            .invoke(&creds(&format!("{}/api", server.uri())), &op)
            .await
            .unwrap();

        assert_eq!(reply, Reply::Sid("T1".to_string()));
    }

    #[tokio::test]
    async fn test_new_ticket_empty_list_is_bad_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tickets": []})))
            .mount(&server)
            .await;

        let op = Handler::NewTicket
            .build(&pack(json!({"channel": "ops", "ticket": {}})))
            .unwrap();
        let err = client().invoke(&creds(&server.uri()), &op).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadData);
    }

    #[tokio::test]
    async fn test_get_ticket_requires_exact_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ticket"))
            .and(query_param("sid", "S1"))
            .respond_with(ResponseTemplate::new(203).set_body_json(json!({"tickets": []})))
            .mount(&server)
            .await;

        let op = Handler::GetTicket.build(&pack(json!({"sid": "S1"}))).unwrap();
        let err = client().invoke(&creds(&server.uri()), &op).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.status(), Some(203));
    }

    #[tokio::test]
    async fn test_get_tickets_returns_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ticket"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tickets": [{"sid": "A", "title": "one"}, {"sid": "B", "title": "two"}]
            })))
            .mount(&server)
            .await;

        let op = Handler::GetTickets.build(&pack(json!({}))).unwrap();
        let reply = client().invoke(&creds(&server.uri()), &op).await.unwrap();

        assert_eq!(
            reply,
            Reply::Records(vec![
                json!({"sid": "A", "title": "one"}),
                json!({"sid": "B", "title": "two"})
            ])
        );
    }

    #[tokio::test]
    async fn test_close_tickets_sends_all_sids() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/ticket/status"))
            .and(query_param("sid", "S1"))
            .and(query_param("sid", "S2"))
            .and(body_json(json!({"status": "closed", "comment": "done"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let op = Handler::CloseTickets
            .build(&pack(json!({"sids": ["S1", "S2"], "comment": "done"})))
            .unwrap();
        let reply = client().invoke(&creds(&server.uri()), &op).await.unwrap();

        assert_eq!(reply, Reply::Empty);
    }

    #[tokio::test]
    async fn test_new_hit_ignores_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ticket/hit"))
            .and(query_param("sid", "S1"))
            .and(body_json(json!({"summary": "again"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
            .mount(&server)
            .await;

        let op = Handler::NewHit
            .build(&pack(json!({"sid": "S1", "hit": {"summary": "again"}})))
            .unwrap();
        let reply = client().invoke(&creds(&server.uri()), &op).await.unwrap();

        assert_eq!(reply, Reply::Empty);
    }

    #[tokio::test]
    async fn test_get_hits_upstream_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ticket/hit"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let op = Handler::GetHits.build(&pack(json!({"sid": "S1"}))).unwrap();
        let err = client().invoke(&creds(&server.uri()), &op).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("boom (500)"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let op = Handler::GetHits.build(&pack(json!({"sid": "S1"}))).unwrap();
        let err = client().invoke(&creds(&server.uri()), &op).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadData);
    }

    #[tokio::test]
    async fn test_connection_refused_is_operation_error() {
        // Bind then drop a listener so the port is closed.
        let uri = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };

        let op = Handler::GetTickets.build(&pack(json!({}))).unwrap();
        let err = client().invoke(&creds(&uri), &op).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Operation);
        assert!(!err.to_string().contains("s3cret"));
    }
}
