//! The request facade: build, dispatch, decode.
//!
//! # Design
//! `Ajax` holds only its transport and carries no mutable state between
//! calls, so one instance can be shared by any number of concurrent tasks.
//! Each call is split into [`build_request`], which produces an
//! `HttpRequest` without touching the network, and [`parse_response`],
//! which interprets the `HttpResponse`. `Ajax::request` runs the transport
//! between the two; hosts that do their own I/O can call the halves
//! directly.

use log::debug;

use crate::decode::{decode, Decoded};
use crate::error::{AjaxError, Result};
use crate::http::{FetchPolicy, HttpMethod, HttpRequest, HttpResponse};
use crate::serialize::{append_query, serialize, FormData};
use crate::transport::{ReqwestTransport, Transport, TransportConfig};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Result of a dispatched request: either the decoded body, or the
/// untouched response when the caller asked for it raw.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Decoded(Decoded),
    Raw(HttpResponse),
}

impl Reply {
    pub fn into_decoded(self) -> Option<Decoded> {
        match self {
            Reply::Decoded(d) => Some(d),
            Reply::Raw(_) => None,
        }
    }

    pub fn into_raw(self) -> Option<HttpResponse> {
        match self {
            Reply::Raw(r) => Some(r),
            Reply::Decoded(_) => None,
        }
    }
}

/// Stateless request facade over a [`Transport`].
#[derive(Debug, Clone)]
pub struct Ajax<T> {
    transport: T,
}

impl Ajax<ReqwestTransport> {
    /// Facade over a [`ReqwestTransport`] with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(ReqwestTransport::new(TransportConfig::default())?))
    }
}

impl<T: Transport> Ajax<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `url` with `data` appended as the query string.
    pub async fn get(&self, url: &str, data: &FormData, raw_response: bool) -> Result<Reply> {
        self.request(url, "GET", data, raw_response).await
    }

    /// POST `data` as a URL-encoded body to `url`.
    pub async fn post(&self, url: &str, data: &FormData, raw_response: bool) -> Result<Reply> {
        self.request(url, "POST", data, raw_response).await
    }

    /// Send one request with any of GET, POST, DELETE or PUT (any case).
    ///
    /// An invalid method fails before the transport is touched. With
    /// `raw_response` the response comes back as-is, without status or
    /// content-type checks.
    pub async fn request(
        &self,
        url: &str,
        method: &str,
        data: &FormData,
        raw_response: bool,
    ) -> Result<Reply> {
        let request = build_request(url, method, data)?;
        debug!("{} {}", request.method, request.url);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(AjaxError::Transport)?;
        parse_response(response, raw_response).await
    }
}

/// Build the outbound request for `method` without sending it.
///
/// GET carries the serialized data in the query string; every other method
/// carries it as the body.
pub fn build_request(url: &str, method: &str, data: &FormData) -> Result<HttpRequest> {
    let method: HttpMethod = method.parse()?;
    let serialized = serialize(data);

    let (url, body) = match method {
        HttpMethod::Get => (append_query(url, &serialized), None),
        _ => (url.to_string(), Some(serialized)),
    };

    Ok(HttpRequest {
        method,
        url,
        headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
        body,
        policy: FetchPolicy::default(),
    })
}

/// Interpret a response: hand it back untouched when `raw_response` is set,
/// otherwise reject non-2xx statuses and decode by content type.
pub async fn parse_response(response: HttpResponse, raw_response: bool) -> Result<Reply> {
    if raw_response {
        return Ok(Reply::Raw(response));
    }
    if !response.is_success() {
        return Err(AjaxError::HttpError {
            status: response.status,
            status_text: response.status_text,
        });
    }
    decode(response).await.map(Reply::Decoded)
}
