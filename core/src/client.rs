//! Blocking HTTP client with typed response decoding.
//!
//! # Design
//! `HttpClient` holds a `ureq::Agent` and a body size limit, nothing else,
//! so it is cheap to clone and safe to share between threads. Every call is
//! one linear pass: build the request, send it, buffer the body, then either
//! decode it or stream it to disk. Non-2xx statuses are plain data from the
//! transport's point of view; status enforcement happens here, before the
//! body is decoded.

use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, trace};
use ureq::http::{self, HeaderName, HeaderValue, Method};
use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::decode::{decode, Output};
use crate::error::{ensure_ok, HttpError};
use crate::http::{collect_headers, ResponseHead};

/// Upper bound on a buffered response body, 64 MiB.
pub const DEFAULT_MAX_BODY_SIZE: u64 = 64 * 1024 * 1024;

const CONTENT_TYPE: &str = "Content-Type";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const APPLICATION_JSON: &str = "application/json";
const APPLICATION_XML: &str = "application/xml";

/// Synchronous HTTP client.
///
/// All methods block the calling thread until the exchange completes.
/// Timeouts, redirects and connection reuse are whatever the wrapped agent
/// is configured with.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: Agent,
    max_body_size: u64,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Client with certificate validation enabled.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Wrap a caller-configured agent.
    ///
    /// The agent should be built with `http_status_as_error(false)`;
    /// otherwise non-2xx responses come back as `HttpError::Transport`
    /// instead of `HttpError::Status`. Custom methods passed to `request`
    /// also need `allow_non_standard_methods(true)`.
    pub fn from_agent(agent: Agent) -> Self {
        Self {
            agent,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Send a request and decode the body into `out`, whatever the status.
    ///
    /// Headers are set, not appended: a later entry for a name replaces an
    /// earlier one. When decoding fails the returned `HttpError::Decode`
    /// carries the response status and headers.
    pub fn request(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&mut dyn Read>,
        out: Output<'_>,
    ) -> Result<ResponseHead, HttpError> {
        let BufferedResponse { head, body } = self.exchange(method, url, headers, body)?;
        match decode(&body, out) {
            Ok(()) => Ok(head),
            Err(e) => Err(e.with_response(head)),
        }
    }

    pub fn get(&self, url: &str, out: Output<'_>) -> Result<(), HttpError> {
        self.get_with_header(url, &[], out)
    }

    /// GET with extra headers. Anything but 200 is `HttpError::Status`.
    pub fn get_with_header(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        out: Output<'_>,
    ) -> Result<(), HttpError> {
        self.fetch_ok("GET", url, headers, None, out)
    }

    /// POST `form` as `application/x-www-form-urlencoded`.
    ///
    /// `form` can be any serde value that flattens to key/value pairs: a
    /// map, a slice of tuples or a struct of scalars.
    pub fn post_form<F>(&self, url: &str, form: &F, out: Output<'_>) -> Result<(), HttpError>
    where
        F: Serialize + ?Sized,
    {
        let encoded =
            serde_urlencoded::to_string(form).map_err(|e| HttpError::Encode(e.to_string()))?;
        self.post_with_header(
            url,
            &[(CONTENT_TYPE, FORM_URLENCODED)],
            &mut encoded.as_bytes(),
            out,
        )
    }

    pub fn post_json<B>(&self, url: &str, body: &B, out: Output<'_>) -> Result<(), HttpError>
    where
        B: Serialize + ?Sized,
    {
        let encoded = serde_json::to_vec(body).map_err(|e| HttpError::Encode(e.to_string()))?;
        self.post_with_header(
            url,
            &[(CONTENT_TYPE, APPLICATION_JSON)],
            &mut encoded.as_slice(),
            out,
        )
    }

    /// POST `body` serialized as XML. The root element is named after the
    /// serialized type.
    pub fn post_xml<B>(&self, url: &str, body: &B, out: Output<'_>) -> Result<(), HttpError>
    where
        B: Serialize + ?Sized,
    {
        let encoded =
            quick_xml::se::to_string(body).map_err(|e| HttpError::Encode(e.to_string()))?;
        self.post_with_header(
            url,
            &[(CONTENT_TYPE, APPLICATION_XML)],
            &mut encoded.as_bytes(),
            out,
        )
    }

    pub fn post_with_header(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &mut dyn Read,
        out: Output<'_>,
    ) -> Result<(), HttpError> {
        self.fetch_ok("POST", url, headers, Some(body), out)
    }

    /// GET `url` and stream the body into `save_path`, returning the number
    /// of bytes written.
    ///
    /// The file is created or truncated only after a 200 response. If the
    /// transfer fails midway the partial file stays on disk.
    pub fn download(&self, url: &str, save_path: impl AsRef<Path>) -> Result<u64, HttpError> {
        let response = self.send("GET", url, &[], None)?;
        ensure_ok(response.status().as_u16())?;

        let file = File::create(save_path.as_ref()).map_err(HttpError::Filesystem)?;
        let mut writer = BufWriter::new(file);
        let mut reader = response.into_body().into_reader();

        let written = copy_body(&mut reader, &mut writer)?;
        writer.flush().map_err(HttpError::Filesystem)?;

        debug!(url, bytes = written, "download complete");
        Ok(written)
    }

    fn fetch_ok(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&mut dyn Read>,
        out: Output<'_>,
    ) -> Result<(), HttpError> {
        let BufferedResponse { head, body } = self.exchange(method, url, headers, body)?;
        ensure_ok(head.status)?;
        decode(&body, out)
    }

    fn exchange(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&mut dyn Read>,
    ) -> Result<BufferedResponse, HttpError> {
        let mut response = self.send(method, url, headers, body)?;
        let head = ResponseHead {
            status: response.status().as_u16(),
            headers: collect_headers(response.headers()),
        };
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_body_size)
            .read_to_vec()?;
        trace!(url, status = head.status, bytes = body.len(), "buffered response body");
        Ok(BufferedResponse { head, body })
    }

    fn send(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&mut dyn Read>,
    ) -> Result<http::Response<ureq::Body>, HttpError> {
        let method = Method::from_bytes(method.as_bytes()).map_err(invalid_request)?;
        debug!(%method, url, "sending request");

        let response = match body {
            Some(reader) => {
                let mut payload = Vec::new();
                reader.read_to_end(&mut payload).map_err(ureq::Error::Io)?;
                self.agent.run(build_request(method, url, headers, payload)?)?
            }
            None => self.agent.run(build_request(method, url, headers, ())?)?,
        };

        debug!(url, status = response.status().as_u16(), "received response");
        Ok(response)
    }
}

struct BufferedResponse {
    head: ResponseHead,
    body: Vec<u8>,
}

fn build_request<B>(
    method: Method,
    url: &str,
    headers: &[(&str, &str)],
    body: B,
) -> Result<http::Request<B>, HttpError> {
    let mut request = http::Request::builder()
        .method(method)
        .uri(url)
        .body(body)
        .map_err(invalid_request)?;
    let uri = request.uri();
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(HttpError::InvalidRequest(format!(
            "{url}: absolute URL with scheme and host required"
        )));
    }
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(invalid_request)?;
        let value = HeaderValue::from_str(value).map_err(invalid_request)?;
        request.headers_mut().insert(name, value);
    }
    Ok(request)
}

/// Copy the response body to `writer`, keeping read failures (transport)
/// apart from write failures (filesystem).
fn copy_body(reader: &mut impl Read, writer: &mut impl Write) -> Result<u64, HttpError> {
    let mut buf = [0u8; 16 * 1024];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(written),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ureq::Error::Io(e).into()),
        };
        writer.write_all(&buf[..n]).map_err(HttpError::Filesystem)?;
        written += n as u64;
    }
}

fn invalid_request(err: impl ToString) -> HttpError {
    HttpError::InvalidRequest(err.to_string())
}

/// Builder for `HttpClient`.
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    accept_invalid_certs: bool,
    user_agent: Option<String>,
    max_body_size: u64,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            user_agent: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl HttpClientBuilder {
    /// Skip TLS certificate validation.
    ///
    /// Only for trusted networks and tests: with this set, any host can
    /// impersonate any other.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Largest response body `request`, `get*` and `post*` will buffer.
    /// Longer bodies fail with `HttpError::Transport`. Does not apply to
    /// `download`.
    pub fn max_body_size(mut self, limit: u64) -> Self {
        self.max_body_size = limit;
        self
    }

    pub fn build(self) -> HttpClient {
        let mut config = Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true);
        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent.as_str());
        }
        if self.accept_invalid_certs {
            config = config.tls_config(TlsConfig::builder().disable_verification(true).build());
        }

        HttpClient {
            agent: config.build().new_agent(),
            max_body_size: self.max_body_size,
        }
    }
}
