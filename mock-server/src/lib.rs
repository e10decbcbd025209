use std::collections::{BTreeMap, HashMap};

use axum::{
    body::Bytes,
    extract::{Form, Path},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

/// Largest body `/bytes/{n}` will produce.
pub const MAX_GENERATED_BYTES: usize = 16 * 1024 * 1024;

/// Fixture document served by `/fixture/json` and `/fixture/xml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub name: String,
    pub size: u32,
    pub tags: Vec<String>,
}

impl Widget {
    pub fn sample() -> Self {
        Self {
            name: "gear".to_string(),
            size: 12,
            tags: vec!["metal".to_string(), "round".to_string()],
        }
    }
}

pub const WIDGET_XML: &str =
    "<Widget><name>gear</name><size>12</size><tags>metal</tags><tags>round</tags></Widget>";

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", get(status).post(status))
        .route("/echo", post(echo))
        .route("/form", post(form))
        .route("/bytes/{len}", get(bytes))
        .route("/headers", get(headers))
        .route("/fixture/json", get(fixture_json))
        .route("/fixture/xml", get(fixture_xml))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Deterministic byte pattern served by `/bytes/{n}`.
pub fn byte_pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn echo(headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// Decode the form and re-encode it with keys in sorted order.
async fn form(Form(fields): Form<BTreeMap<String, String>>) -> Result<String, StatusCode> {
    serde_urlencoded::to_string(&fields).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn bytes(Path(len): Path<usize>) -> Result<Response, StatusCode> {
    if len > MAX_GENERATED_BYTES {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        byte_pattern(len),
    )
        .into_response())
}

/// Reflect request headers as JSON and add a repeated `x-multi` header.
async fn headers(request_headers: HeaderMap) -> impl IntoResponse {
    let seen: HashMap<String, String> = request_headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();
    (
        AppendHeaders([
            ("x-multi", "one".to_string()),
            ("x-multi", "two".to_string()),
            ("x-request-id", Uuid::new_v4().to_string()),
        ]),
        Json(seen),
    )
}

async fn fixture_json() -> Json<Widget> {
    Json(Widget::sample())
}

async fn fixture_xml() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/xml")], WIDGET_XML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_serializes_to_json() {
        let json = serde_json::to_value(Widget::sample()).unwrap();
        assert_eq!(json["name"], "gear");
        assert_eq!(json["size"], 12);
        assert_eq!(json["tags"][1], "round");
    }

    #[test]
    fn byte_pattern_wraps_at_251() {
        let bytes = byte_pattern(300);
        assert_eq!(bytes.len(), 300);
        assert_eq!(bytes[250], 250);
        assert_eq!(bytes[251], 0);
    }

    #[test]
    fn empty_byte_pattern() {
        assert!(byte_pattern(0).is_empty());
    }

    #[test]
    fn sorted_form_encoding() {
        let fields = BTreeMap::from([
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ]);
        assert_eq!(serde_urlencoded::to_string(&fields).unwrap(), "a=1&b=2");
    }
}
