//! Stateless HTTP request facade.
//!
//! # Overview
//! Sends GET/POST/DELETE/PUT requests with URL-encoded form data and
//! decodes responses by content type (JSON, text, multipart form, raw
//! bytes). The actual I/O goes through a [`Transport`]; the default is
//! [`ReqwestTransport`].
//!
//! # Design
//! - [`Ajax`] holds only its transport; calls share no state.
//! - Each call is split into [`build_request`] (no I/O) and
//!   [`parse_response`], so hosts that run the round-trip themselves get
//!   the same serialization and decoding.
//! - Form data is an insertion-ordered `serde_json::Map`; nested mappings
//!   flatten to bracketed keys (`a[b]=1`).
//! - Every failure surfaces as an [`AjaxError`]; nothing is retried.
//!
//! ```no_run
//! # async fn demo() -> ajax_core::Result<()> {
//! use ajax_core::{form_data, Ajax};
//!
//! let ajax = Ajax::with_defaults()?;
//! let data = form_data(&serde_json::json!({"q": "rust", "page": 2}))?;
//! let reply = ajax.get("https://example.com/search", &data, false).await?;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod decode;
pub mod error;
pub mod http;
pub mod serialize;
pub mod transport;

pub use client::{build_request, parse_response, Ajax, Reply};
pub use decode::{decode, Decoded, FormPart, MultipartForm};
pub use error::{AjaxError, Result, TransportError};
pub use http::{CachePolicy, CredentialsMode, FetchPolicy, HttpMethod, HttpRequest, HttpResponse, RequestMode};
pub use serialize::{append_query, form_data, serialize, FormData};
pub use transport::{ReqwestTransport, Transport, TransportConfig};
