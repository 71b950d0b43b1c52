//! Transaction handle threaded through both capture handlers
//!
//! The engine builds a [`Transaction`] when a request is intercepted, passes
//! it mutably to the request handler (which stamps the capture instant on it)
//! and later, with the response attached, to the response handler.

use std::io;

use bytes::Bytes;
use chrono::{DateTime, Local};
use cookie::Cookie;
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::{HeaderMap, Request, Response, Uri};

use crate::{FlowscribeError, Result};

/// Request side of an intercepted transaction
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    method: String,
    url: String,
    uri: Uri,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl TransactionRequest {
    /// Create a request from its parts
    ///
    /// # Errors
    ///
    /// Returns error if `url` is not an absolute URL with a host
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Option<Bytes>,
    ) -> Result<Self> {
        let url = url.into();
        let uri: Uri = url
            .parse()
            .map_err(|e| FlowscribeError::InvalidUrl(format!("{url}: {e}")))?;

        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(FlowscribeError::InvalidUrl(format!(
                "{url}: not an absolute URL"
            )));
        }

        Ok(Self {
            method: method.into(),
            url,
            uri,
            headers,
            body,
        })
    }

    /// Convert a buffered `hyper` request
    ///
    /// Origin-form URIs (as seen after TLS interception) are completed from
    /// the `Host` header using `fallback_scheme`.
    ///
    /// # Errors
    ///
    /// Returns error if no absolute URL can be derived
    pub fn from_hyper(request: &Request<Bytes>, fallback_scheme: &str) -> Result<Self> {
        let uri = request.uri();
        let url = if uri.authority().is_some() {
            uri.to_string()
        } else {
            let host = request
                .headers()
                .get(hyper::header::HOST)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| {
                    FlowscribeError::InvalidUrl(format!("{uri}: no authority and no Host header"))
                })?;
            let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
            format!("{fallback_scheme}://{host}{path}")
        };

        Self::new(
            request.method().as_str(),
            url,
            header_pairs(request.headers()),
            Some(request.body().clone()),
        )
    }

    /// HTTP method as received
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Full URL as received
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL path without the query
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Network location of the URL (`host` or `host:port`, userinfo removed)
    pub fn host(&self) -> &str {
        self.uri.authority().map_or("", |authority| {
            let netloc = authority.as_str();
            netloc.rsplit_once('@').map_or(netloc, |(_, host)| host)
        })
    }

    /// Decoded query parameters in URL order
    pub fn query(&self) -> Vec<(String, String)> {
        self.uri.query().map(parse_query).unwrap_or_default()
    }

    /// Headers in received order and case
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Cookies from every `Cookie` header, malformed fragments skipped
    pub fn cookies(&self) -> Vec<(String, String)> {
        headers_named(&self.headers, "cookie")
            .flat_map(|value| Cookie::split_parse(value))
            .filter_map(std::result::Result::ok)
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect()
    }

    /// Raw body bytes, if the engine captured any
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// Response side of an intercepted transaction
#[derive(Debug, Clone)]
pub struct TransactionResponse {
    status: u16,
    reason: String,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl TransactionResponse {
    /// Create a response from its parts
    pub fn new(
        status: u16,
        reason: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Option<Bytes>,
    ) -> Self {
        Self {
            status,
            reason: reason.into(),
            headers,
            body,
        }
    }

    /// Convert a buffered `hyper` response
    ///
    /// HTTP/1 reason phrases are not kept by `hyper`; the canonical phrase
    /// for the status code is used instead.
    pub fn from_hyper(response: &Response<Bytes>) -> Self {
        let status = response.status();
        Self::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            header_pairs(response.headers()),
            Some(response.body().clone()),
        )
    }

    /// Status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Headers in received order and case
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Cookies set by every `Set-Cookie` header, name to value
    pub fn cookies(&self) -> Vec<(String, String)> {
        headers_named(&self.headers, "set-cookie")
            .filter_map(|value| Cookie::parse(value).ok())
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect()
    }

    /// Raw body bytes, if the engine captured any
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// One in-flight request/response pair
///
/// Owned by the engine's connection task, so the capture instant stored here
/// is never shared with other transactions.
#[derive(Debug, Clone)]
pub struct Transaction {
    request: TransactionRequest,
    response: Option<TransactionResponse>,
    captured_at: Option<DateTime<Local>>,
}

impl Transaction {
    /// Start a transaction for an intercepted request
    pub fn new(request: TransactionRequest) -> Self {
        Self {
            request,
            response: None,
            captured_at: None,
        }
    }

    /// Attach the upstream response
    pub fn set_response(&mut self, response: TransactionResponse) {
        self.response = Some(response);
    }

    /// Builder form of [`Transaction::set_response`]
    #[must_use]
    pub fn with_response(mut self, response: TransactionResponse) -> Self {
        self.set_response(response);
        self
    }

    /// Request side
    pub fn request(&self) -> &TransactionRequest {
        &self.request
    }

    /// Response side, once attached
    pub fn response(&self) -> Option<&TransactionResponse> {
        self.response.as_ref()
    }

    /// Instant the request handler captured this transaction
    pub fn captured_at(&self) -> Option<DateTime<Local>> {
        self.captured_at
    }

    /// Remember when the request was captured
    pub fn stamp_capture(&mut self, at: DateTime<Local>) {
        self.captured_at = Some(at);
    }
}

/// Collect a streaming `hyper` body into one buffer
///
/// # Errors
///
/// Returns error if the body stream fails
pub async fn buffer_body<B>(body: B) -> Result<Bytes>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    body.collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| FlowscribeError::Io(io::Error::other(format!("body read failed: {e}"))))
}

/// Parse a query string with form-urlencoded rules, keeping blank values
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn headers_named<'a>(
    headers: &'a [(String, String)],
    name: &'a str,
) -> impl Iterator<Item = &'a str> {
    headers
        .iter()
        .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
