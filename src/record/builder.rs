//! Request and response record construction

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::flatten::{decode_body, flatten_pairs};
use crate::fingerprint::ArtifactKind;
use crate::transaction::{TransactionRequest, TransactionResponse};

/// Seconds since the Unix epoch with microsecond precision
pub fn epoch_seconds<Tz: TimeZone>(at: &DateTime<Tz>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

/// Persisted form of a request-observed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Capture time, epoch seconds
    pub timestamp: f64,
    /// HTTP method
    pub method: String,
    /// Full URL
    pub url: String,
    /// URL path
    pub path: String,
    /// Query parameters
    pub query: BTreeMap<String, String>,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Request cookies
    pub cookies: BTreeMap<String, String>,
    /// Body text, `null` when empty
    pub content: Option<String>,
}

impl RequestRecord {
    /// Build the record for a request captured at `captured_at`
    pub fn build<Tz: TimeZone>(request: &TransactionRequest, captured_at: &DateTime<Tz>) -> Self {
        Self {
            timestamp: epoch_seconds(captured_at),
            method: request.method().to_string(),
            url: request.url().to_string(),
            path: request.path().to_string(),
            query: flatten_pairs(request.query()),
            headers: flatten_pairs(request.headers().iter().cloned()),
            cookies: flatten_pairs(request.cookies()),
            content: decode_body(request.body()),
        }
    }
}

/// Persisted form of a response-observed event
///
/// Self-contained: the request side is copied from the same transaction so
/// the artifact can be read without its request counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Capture time of the response, epoch seconds
    pub timestamp: f64,
    /// HTTP method of the paired request
    pub method: String,
    /// Full URL of the paired request
    pub url: String,
    /// URL path
    pub path: String,
    /// Query parameters
    pub query: BTreeMap<String, String>,
    /// Paired request headers
    pub request_headers: BTreeMap<String, String>,
    /// Paired request cookies
    pub request_cookies: BTreeMap<String, String>,
    /// Paired request body text
    pub request_content: Option<String>,
    /// Capture time of the paired request, `null` if it was never stamped
    pub request_timestamp: Option<f64>,
    /// Status code
    pub status_code: u16,
    /// Reason phrase
    pub reason: String,
    /// Response headers
    pub response_headers: BTreeMap<String, String>,
    /// Cookies set by the response
    pub response_cookies: BTreeMap<String, String>,
    /// Response body text, `null` when empty
    pub response_content: Option<String>,
    /// Paired request URL
    pub request_url: String,
    /// Paired request method
    pub request_method: String,
}

impl ResponseRecord {
    /// Build the record for a response captured at `now`
    pub fn build<Tz, Tr>(
        request: &TransactionRequest,
        request_captured_at: Option<&DateTime<Tr>>,
        response: &TransactionResponse,
        now: &DateTime<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tr: TimeZone,
    {
        Self {
            timestamp: epoch_seconds(now),
            method: request.method().to_string(),
            url: request.url().to_string(),
            path: request.path().to_string(),
            query: flatten_pairs(request.query()),
            request_headers: flatten_pairs(request.headers().iter().cloned()),
            request_cookies: flatten_pairs(request.cookies()),
            request_content: decode_body(request.body()),
            request_timestamp: request_captured_at.map(epoch_seconds),
            status_code: response.status(),
            reason: response.reason().to_string(),
            response_headers: flatten_pairs(response.headers().iter().cloned()),
            response_cookies: flatten_pairs(response.cookies()),
            response_content: decode_body(response.body()),
            request_url: request.url().to_string(),
            request_method: request.method().to_string(),
        }
    }
}

/// Either kind of record, as found on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredRecord {
    /// Response artifact
    Response(ResponseRecord),
    /// Request artifact
    Request(RequestRecord),
}

impl StoredRecord {
    /// Artifact kind of this record
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Request(_) => ArtifactKind::Request,
            Self::Response(_) => ArtifactKind::Response,
        }
    }

    /// URL the record was captured for
    pub fn url(&self) -> &str {
        match self {
            Self::Request(record) => &record.url,
            Self::Response(record) => &record.url,
        }
    }

    /// HTTP method of the captured request
    pub fn method(&self) -> &str {
        match self {
            Self::Request(record) => &record.method,
            Self::Response(record) => &record.method,
        }
    }

    /// Capture time, epoch seconds
    pub fn timestamp(&self) -> f64 {
        match self {
            Self::Request(record) => record.timestamp,
            Self::Response(record) => record.timestamp,
        }
    }
}

impl From<RequestRecord> for StoredRecord {
    fn from(record: RequestRecord) -> Self {
        Self::Request(record)
    }
}

impl From<ResponseRecord> for StoredRecord {
    fn from(record: ResponseRecord) -> Self {
        Self::Response(record)
    }
}
