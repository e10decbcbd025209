//! Plain-data views of what came back from the transport.
//!
//! # Design
//! Response headers are flattened into a `HashMap<String, String>` with one
//! value per name. Repeated headers collapse to the last value the
//! transport reported; callers that need every value should use
//! `HttpClient::from_agent` and the agent directly.

use std::collections::HashMap;

use ureq::http::HeaderMap;

/// Response headers, one value per name.
pub type Headers = HashMap<String, String>;

/// Status line and headers of a completed exchange.
///
/// Returned by `HttpClient::request` after the body has been decoded into
/// the caller's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub headers: Headers,
}

impl ResponseHead {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Collapse a transport header map into `Headers`, last value wins.
pub(crate) fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::with_capacity(map.keys_len());
    for (name, value) in map {
        headers.insert(
            name.as_str().to_string(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    headers
}
