//! The seam between the facade and the network.
//!
//! # Design
//! The facade only builds `HttpRequest` values and interprets
//! `HttpResponse` values. Whatever actually moves bytes implements
//! [`Transport`]; [`ReqwestTransport`] is the default. A transport returns
//! every response it receives, whatever the status; only failures that
//! prevent a response from arriving are errors.

use std::sync::Arc;

use async_trait::async_trait;
use log::trace;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use url::Url;

use crate::error::{AjaxError, Result, TransportError};
use crate::http::{CachePolicy, CredentialsMode, HttpMethod, HttpRequest, HttpResponse, RequestMode};

const DEFAULT_USER_AGENT: &str = concat!("ajax-core/", env!("CARGO_PKG_VERSION"));

/// Executes one request and returns the response as data.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Configuration for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Origin the requests are considered to come from. Relative URLs
    /// resolve against it, and it decides which targets are same-origin for
    /// credentials and which get an `Origin` header in cors mode. `None`
    /// treats every target as same-origin and requires absolute URLs.
    pub origin: Option<Url>,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            origin: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TransportConfig {
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// Default transport over a `reqwest::Client`.
///
/// Cookies live in a jar owned by the transport and are forwarded according
/// to each request's [`CredentialsMode`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: TransportConfig,
    cookies: Arc<Jar>,
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .cookie_store(false)
            .build()
            .map_err(AjaxError::transport)?;
        Ok(Self {
            client,
            config,
            cookies: Arc::new(Jar::default()),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn resolve(&self, raw: &str) -> std::result::Result<Url, url::ParseError> {
        match &self.config.origin {
            Some(base) => base.join(raw),
            None => Url::parse(raw),
        }
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        match &self.config.origin {
            Some(origin) => origin.origin() == url.origin(),
            None => true,
        }
    }

    fn sends_credentials(&self, mode: CredentialsMode, url: &Url) -> bool {
        match mode {
            CredentialsMode::Omit => false,
            CredentialsMode::SameOrigin => self.is_same_origin(url),
            CredentialsMode::Include => true,
        }
    }

    fn outbound_headers(
        &self,
        request: &HttpRequest,
        url: &Url,
    ) -> std::result::Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            headers.append(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        if request.policy.cache == CachePolicy::NoCache {
            for name in ["cache-control", "pragma"] {
                if !headers.contains_key(name) {
                    headers.insert(name, HeaderValue::from_static("no-cache"));
                }
            }
        }

        if request.policy.mode == RequestMode::Cors && !self.is_same_origin(url) {
            if let Some(origin) = &self.config.origin {
                headers.insert(
                    "origin",
                    HeaderValue::from_str(&origin.origin().ascii_serialization())?,
                );
            }
        }

        if self.sends_credentials(request.policy.credentials, url) {
            if let Some(cookie) = self.cookies.cookies(url) {
                headers.insert("cookie", cookie);
            }
        }

        Ok(headers)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let url = self.resolve(&request.url)?;
        let headers = self.outbound_headers(&request, &url)?;

        trace!("{} {} ({} headers)", request.method, url, headers.len());

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url.clone())
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await?;

        if self.sends_credentials(request.policy.credentials, &url) {
            let mut set_cookies = response.headers().get_all("set-cookie").iter();
            self.cookies.set_cookies(&mut set_cookies, &url);
        }

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?;

        trace!("{} {} -> {}", request.method, url, status.as_u16());

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Put => Method::PUT,
    }
}
