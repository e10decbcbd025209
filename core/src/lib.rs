//! Blocking HTTP convenience client with typed response decoding.
//!
//! # Overview
//! Issues GET and POST requests (raw, form, JSON and XML bodies), buffers
//! the response and writes it into a caller-owned [`Output`]: raw bytes,
//! text, or any `serde` type decoded from JSON or XML. Responses can also be
//! streamed straight to a file with [`HttpClient::download`].
//!
//! # Design
//! - `HttpClient` wraps a `ureq::Agent`; TLS, pooling, DNS and redirects are
//!   the agent's business.
//! - `Output` is a sum type over the four decoding modes, so the decoder is
//!   one exhaustive `match` and structured targets stay statically typed.
//! - `get*`, `post*` and `download` require status 200. `request` returns
//!   the status and headers and leaves interpretation to the caller.
//! - The free functions re-exported from `shared` use a lazily built client
//!   that skips certificate validation. See the `shared` module docs.
//!
//! ```no_run
//! use httputil::{HttpClient, Output};
//! use serde::Deserialize;
//!
//! #[derive(Default, Deserialize)]
//! struct Status {
//!     healthy: bool,
//! }
//!
//! let client = HttpClient::new();
//! let mut status = Status::default();
//! client.get("https://example.com/status", Output::json(&mut status))?;
//! # Ok::<(), httputil::HttpError>(())
//! ```

pub mod client;
pub mod decode;
pub mod error;
pub mod http;
pub mod shared;

pub use client::{HttpClient, HttpClientBuilder, DEFAULT_MAX_BODY_SIZE};
pub use decode::{decode, Output, OutputKind, StructuredTarget};
pub use error::HttpError;
pub use http::{Headers, ResponseHead};
pub use shared::{
    default_client, download, get, get_with_header, post_form, post_json, post_with_header,
    post_xml, request,
};
