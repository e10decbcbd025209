//! Process-wide default client and free-function shortcuts.
//!
//! # Warning
//! The shared client **does not validate TLS certificates**. It exists for
//! trusted networks, local services and tests, where self-signed
//! certificates are common. Do not use these functions to talk to hosts
//! across an untrusted network; build an `HttpClient` with
//! `HttpClient::new()` instead.
//!
//! The client is built on first use and lives until the process exits.
//! Every function here forwards to the matching `HttpClient` method
//! unchanged.

use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::client::HttpClient;
use crate::decode::Output;
use crate::error::HttpError;
use crate::http::ResponseHead;

static DEFAULT_CLIENT: Lazy<HttpClient> = Lazy::new(|| {
    HttpClient::builder()
        .danger_accept_invalid_certs(true)
        .build()
});

/// The shared client. Certificate validation is disabled.
pub fn default_client() -> &'static HttpClient {
    &DEFAULT_CLIENT
}

pub fn request(
    method: &str,
    url: &str,
    headers: &[(&str, &str)],
    body: Option<&mut dyn Read>,
    out: Output<'_>,
) -> Result<ResponseHead, HttpError> {
    default_client().request(method, url, headers, body, out)
}

pub fn get(url: &str, out: Output<'_>) -> Result<(), HttpError> {
    default_client().get(url, out)
}

pub fn get_with_header(
    url: &str,
    headers: &[(&str, &str)],
    out: Output<'_>,
) -> Result<(), HttpError> {
    default_client().get_with_header(url, headers, out)
}

pub fn post_form<F>(url: &str, form: &F, out: Output<'_>) -> Result<(), HttpError>
where
    F: Serialize + ?Sized,
{
    default_client().post_form(url, form, out)
}

pub fn post_json<B>(url: &str, body: &B, out: Output<'_>) -> Result<(), HttpError>
where
    B: Serialize + ?Sized,
{
    default_client().post_json(url, body, out)
}

pub fn post_xml<B>(url: &str, body: &B, out: Output<'_>) -> Result<(), HttpError>
where
    B: Serialize + ?Sized,
{
    default_client().post_xml(url, body, out)
}

pub fn post_with_header(
    url: &str,
    headers: &[(&str, &str)],
    body: &mut dyn Read,
    out: Output<'_>,
) -> Result<(), HttpError> {
    default_client().post_with_header(url, headers, body, out)
}

pub fn download(url: &str, save_path: impl AsRef<Path>) -> Result<u64, HttpError> {
    default_client().download(url, save_path)
}
