//! Response body decoding into caller-owned outputs.
//!
//! # Design
//! `Output` is the caller's mutable reference, tagged with how the body must
//! be interpreted. Raw bytes and text are plain assignments. The structured
//! variants are built by generic constructors that capture a typed `&mut T`,
//! so serde deserializes straight into the caller's type and the decoder
//! itself stays non-generic.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// How a response body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    RawBytes,
    Text,
    Json,
    Xml,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputKind::RawBytes => "bytes",
            OutputKind::Text => "text",
            OutputKind::Json => "json",
            OutputKind::Xml => "xml",
        };
        f.write_str(name)
    }
}

/// Legacy integer codes: 0 bytes, 1 text, 2 JSON, 3 XML.
impl TryFrom<i32> for OutputKind {
    type Error = HttpError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(OutputKind::RawBytes),
            1 => Ok(OutputKind::Text),
            2 => Ok(OutputKind::Json),
            3 => Ok(OutputKind::Xml),
            other => Err(HttpError::UnsupportedKind(other.to_string())),
        }
    }
}

impl FromStr for OutputKind {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bytes" | "raw" => Ok(OutputKind::RawBytes),
            "text" | "string" => Ok(OutputKind::Text),
            "json" => Ok(OutputKind::Json),
            "xml" => Ok(OutputKind::Xml),
            _ => Err(HttpError::UnsupportedKind(s.to_string())),
        }
    }
}

type DecodeFn<'a> = Box<dyn FnOnce(&[u8]) -> Result<(), HttpError> + 'a>;

/// Deserializer bound to a caller's target, built by [`Output::json`] or
/// [`Output::xml`].
///
/// It can only be obtained from those constructors:
///
/// ```compile_fail
/// use httputil::{Output, StructuredTarget};
///
/// let out = Output::Json(StructuredTarget(Box::new(|_: &[u8]| Ok(()))));
/// ```
pub struct StructuredTarget<'a>(DecodeFn<'a>);

/// A caller-owned location that a response body is written into.
///
/// ```
/// use httputil::Output;
///
/// let mut text = String::new();
/// httputil::decode(b"hello", Output::Text(&mut text)).unwrap();
/// assert_eq!(text, "hello");
/// ```
pub enum Output<'a> {
    /// Copy the body verbatim.
    Bytes(&'a mut Vec<u8>),
    /// Decode the body as UTF-8, replacing invalid sequences.
    Text(&'a mut String),
    /// Deserialize the body as JSON. Build with [`Output::json`].
    Json(StructuredTarget<'a>),
    /// Deserialize the body as XML. Build with [`Output::xml`].
    Xml(StructuredTarget<'a>),
}

impl<'a> Output<'a> {
    pub fn bytes(out: &'a mut Vec<u8>) -> Self {
        Output::Bytes(out)
    }

    pub fn text(out: &'a mut String) -> Self {
        Output::Text(out)
    }

    /// Deserialize a JSON body into `out`. `out` is only replaced when the
    /// whole body parses.
    pub fn json<T>(out: &'a mut T) -> Self
    where
        T: DeserializeOwned + 'a,
    {
        Output::Json(StructuredTarget(Box::new(move |raw| {
            *out = serde_json::from_slice(raw).map_err(HttpError::decode)?;
            Ok(())
        })))
    }

    /// Deserialize an XML body into `out`. `out` is only replaced when the
    /// whole body parses.
    pub fn xml<T>(out: &'a mut T) -> Self
    where
        T: DeserializeOwned + 'a,
    {
        Output::Xml(StructuredTarget(Box::new(move |raw| {
            let text = std::str::from_utf8(raw).map_err(HttpError::decode)?;
            *out = quick_xml::de::from_str(text).map_err(HttpError::decode)?;
            Ok(())
        })))
    }

    pub fn kind(&self) -> OutputKind {
        match self {
            Output::Bytes(_) => OutputKind::RawBytes,
            Output::Text(_) => OutputKind::Text,
            Output::Json(_) => OutputKind::Json,
            Output::Xml(_) => OutputKind::Xml,
        }
    }
}

impl fmt::Debug for Output<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Output").field(&self.kind()).finish()
    }
}

/// Write a fully buffered body into `out`.
pub fn decode(raw: &[u8], out: Output<'_>) -> Result<(), HttpError> {
    match out {
        Output::Bytes(buf) => {
            buf.clear();
            buf.extend_from_slice(raw);
            Ok(())
        }
        Output::Text(text) => {
            *text = String::from_utf8_lossy(raw).into_owned();
            Ok(())
        }
        Output::Json(target) | Output::Xml(target) => (target.0)(raw),
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        value: i32,
        tags: Vec<String>,
    }

    fn sample() -> Payload {
        Payload {
            name: "widget".to_string(),
            value: 42,
            tags: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[test]
    fn bytes_copied_verbatim() {
        let raw = [0u8, 159, 146, 150, 255];
        let mut out = vec![9, 9, 9, 9, 9, 9, 9];
        decode(&raw, Output::bytes(&mut out)).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn empty_bytes_clear_output() {
        let mut out = b"stale".to_vec();
        decode(&[], Output::bytes(&mut out)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn text_decodes_utf8() {
        let mut out = String::from("stale");
        decode("héllo".as_bytes(), Output::text(&mut out)).unwrap();
        assert_eq!(out, "héllo");
    }

    #[test]
    fn text_replaces_invalid_sequences() {
        let mut out = String::new();
        decode(&[b'a', 0xff, b'b'], Output::text(&mut out)).unwrap();
        assert_eq!(out, "a\u{fffd}b");
    }

    #[test]
    fn json_round_trip() {
        let raw = serde_json::to_vec(&sample()).unwrap();
        let mut out = Payload::default();
        decode(&raw, Output::json(&mut out)).unwrap();
        assert_eq!(out, sample());
    }

    #[test]
    fn json_into_untyped_value() {
        let mut out = serde_json::Value::Null;
        decode(br#"{"nested":{"list":[1,2]}}"#, Output::json(&mut out)).unwrap();
        assert_eq!(out["nested"]["list"][1], 2);
    }

    #[test]
    fn malformed_json_is_decode_error_and_leaves_target() {
        let mut out = sample();
        let err = decode(b"not json", Output::json(&mut out)).unwrap_err();
        assert!(matches!(err, HttpError::Decode { status: None, .. }));
        assert_eq!(out, sample());
    }

    #[test]
    fn json_shape_mismatch_is_decode_error() {
        let mut out = Payload::default();
        let err = decode(br#"{"name":1}"#, Output::json(&mut out)).unwrap_err();
        assert!(matches!(err, HttpError::Decode { .. }));
    }

    #[test]
    fn xml_round_trip() {
        let xml = quick_xml::se::to_string(&sample()).unwrap();
        let mut out = Payload::default();
        decode(xml.as_bytes(), Output::xml(&mut out)).unwrap();
        assert_eq!(out, sample());
    }

    #[test]
    fn malformed_xml_is_decode_error() {
        let mut out = Payload::default();
        let err = decode(b"<Payload><name>x</Payload>", Output::xml(&mut out)).unwrap_err();
        assert!(matches!(err, HttpError::Decode { .. }));
    }

    #[test]
    fn non_utf8_xml_is_decode_error() {
        let mut out = Payload::default();
        let err = decode(&[b'<', 0xff, b'>'], Output::xml(&mut out)).unwrap_err();
        assert!(matches!(err, HttpError::Decode { .. }));
    }

    #[test]
    fn output_reports_kind() {
        let mut bytes = Vec::new();
        let mut text = String::new();
        let mut value = Payload::default();
        assert_eq!(Output::bytes(&mut bytes).kind(), OutputKind::RawBytes);
        assert_eq!(Output::text(&mut text).kind(), OutputKind::Text);
        assert_eq!(Output::json(&mut value).kind(), OutputKind::Json);
        assert_eq!(Output::xml(&mut value).kind(), OutputKind::Xml);
    }

    #[test]
    fn legacy_codes_map_to_kinds() {
        assert_eq!(OutputKind::try_from(0).unwrap(), OutputKind::RawBytes);
        assert_eq!(OutputKind::try_from(1).unwrap(), OutputKind::Text);
        assert_eq!(OutputKind::try_from(2).unwrap(), OutputKind::Json);
        assert_eq!(OutputKind::try_from(3).unwrap(), OutputKind::Xml);
    }

    #[test]
    fn unknown_code_is_unsupported() {
        let err = OutputKind::try_from(7).unwrap_err();
        assert!(matches!(err, HttpError::UnsupportedKind(ref k) if k == "7"));
        assert!(matches!(
            OutputKind::try_from(-1),
            Err(HttpError::UnsupportedKind(_))
        ));
    }

    #[test]
    fn kind_names_parse_and_display() {
        for kind in [
            OutputKind::RawBytes,
            OutputKind::Text,
            OutputKind::Json,
            OutputKind::Xml,
        ] {
            assert_eq!(kind.to_string().parse::<OutputKind>().unwrap(), kind);
        }
        assert_eq!("JSON".parse::<OutputKind>().unwrap(), OutputKind::Json);
        assert!(matches!(
            "yaml".parse::<OutputKind>(),
            Err(HttpError::UnsupportedKind(_))
        ));
    }
}
