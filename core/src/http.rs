//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! facade builds `HttpRequest` values and decodes `HttpResponse` values; a
//! `Transport` (or the host itself) is responsible for the actual I/O.
//!
//! All fields use owned types so a request can be handed to any transport
//! without lifetime concerns.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::Deserialize;

use crate::error::AjaxError;

/// HTTP method accepted by the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive. Surrounding whitespace is not stripped, so `"get "` is
/// rejected.
impl FromStr for HttpMethod {
    type Err = AjaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            "PUT" => Ok(HttpMethod::Put),
            _ => Err(AjaxError::InvalidMethod(s.to_string())),
        }
    }
}

/// Cross-origin behaviour requested for an outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Cors,
    NoCors,
    SameOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Default,
    NoStore,
    NoCache,
}

/// Which targets receive the caller's cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsMode {
    Omit,
    SameOrigin,
    Include,
}

/// Per-request fetch policy. The facade always sends the default:
/// cors, no-cache, same-origin credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub mode: RequestMode,
    pub cache: CachePolicy,
    pub credentials: CredentialsMode,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            mode: RequestMode::Cors,
            cache: CachePolicy::NoCache,
            credentials: CredentialsMode::SameOrigin,
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by [`build_request`](crate::client::build_request). `url` already
/// carries the query string for GET requests.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub policy: FetchPolicy,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    /// True for statuses in `200..=299`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}
