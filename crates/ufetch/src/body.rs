//! Request data and wire body encoding

use std::fmt;
use std::io;

use futures::stream::BoxStream;
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::multipart::MultipartForm;

/// Chunked body supplied by the caller
pub type BodyStream = BoxStream<'static, io::Result<Vec<u8>>>;

/// Data attached to a request
///
/// For GET and HEAD a JSON object (or form params) is merged into the query
/// string. For every other method the data becomes the request body.
pub enum RequestData {
    /// Any JSON value; serialized to JSON text and tagged `application/json`
    Json(Value),
    /// Pre-serialized text sent as is, without a JSON content type
    Text(String),
    /// Binary payload
    Bytes(Vec<u8>),
    /// URL-encoded form parameters
    Form(Vec<(String, String)>),
    /// `multipart/form-data` payload
    Multipart(MultipartForm),
    /// Streamed payload
    Stream(BodyStream),
}

impl fmt::Debug for RequestData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestData::Json(value) => f.debug_tuple("Json").field(value).finish(),
            RequestData::Text(text) => f.debug_tuple("Text").field(text).finish(),
            RequestData::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            RequestData::Form(pairs) => f.debug_tuple("Form").field(pairs).finish(),
            RequestData::Multipart(form) => f.debug_tuple("Multipart").field(form).finish(),
            RequestData::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl RequestData {
    /// Serialize any value into JSON data
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(RequestData::Json(serde_json::to_value(value)?))
    }

    /// Serialize a struct or sequence of pairs into form parameters
    pub fn form<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(value)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(RequestData::Form(
            url::form_urlencoded::parse(encoded.as_bytes())
                .into_owned()
                .collect(),
        ))
    }

    /// JSON null, which counts as no data at all
    pub fn is_null(&self) -> bool {
        matches!(self, RequestData::Json(Value::Null))
    }

    /// Shapes that are sent untouched and never tagged as JSON
    pub fn is_passthrough(&self) -> bool {
        !matches!(self, RequestData::Json(_))
    }

    /// Key/value pairs to merge into a read-style query string
    ///
    /// Only JSON objects and form parameters have a query representation.
    pub fn query_pairs(&self) -> Option<Vec<(String, String)>> {
        match self {
            RequestData::Json(Value::Object(map)) => Some(
                map.iter()
                    .map(|(key, value)| (key.clone(), query_value(value)))
                    .collect(),
            ),
            RequestData::Form(pairs) => Some(pairs.clone()),
            _ => None,
        }
    }
}

/// Text form of a JSON value inside a query string
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

impl From<Value> for RequestData {
    fn from(value: Value) -> Self {
        RequestData::Json(value)
    }
}

impl From<serde_json::Map<String, Value>> for RequestData {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        RequestData::Json(Value::Object(map))
    }
}

impl From<String> for RequestData {
    fn from(text: String) -> Self {
        RequestData::Text(text)
    }
}

impl From<&str> for RequestData {
    fn from(text: &str) -> Self {
        RequestData::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RequestData {
    fn from(bytes: Vec<u8>) -> Self {
        RequestData::Bytes(bytes)
    }
}

impl From<MultipartForm> for RequestData {
    fn from(form: MultipartForm) -> Self {
        RequestData::Multipart(form)
    }
}

impl From<BodyStream> for RequestData {
    fn from(stream: BodyStream) -> Self {
        RequestData::Stream(stream)
    }
}

/// Encoded body handed to the transport
pub enum WireBody {
    /// JSON text
    Json(String),
    /// Caller-supplied text
    Text(String),
    /// Binary payload
    Bytes(Vec<u8>),
    /// `application/x-www-form-urlencoded` text
    Form(String),
    /// Rendered multipart payload
    Multipart {
        /// `multipart/form-data` type including the part boundary
        content_type: String,
        /// Rendered body
        body: Vec<u8>,
    },
    /// Streamed payload
    Stream(BodyStream),
}

impl fmt::Debug for WireBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireBody::Json(text) => f.debug_tuple("Json").field(text).finish(),
            WireBody::Text(text) => f.debug_tuple("Text").field(text).finish(),
            WireBody::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            WireBody::Form(text) => f.debug_tuple("Form").field(text).finish(),
            WireBody::Multipart { content_type, body } => f
                .debug_struct("Multipart")
                .field("content_type", content_type)
                .field("len", &body.len())
                .finish(),
            WireBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl WireBody {
    /// Content type a transport sets when the request carries none
    ///
    /// Matches what the browser `fetch()` primitive derives from its body
    /// types. Binary and streamed bodies have no implied type.
    pub fn implied_content_type(&self) -> Option<String> {
        match self {
            WireBody::Json(_) => Some("application/json".to_string()),
            WireBody::Text(_) => Some("text/plain;charset=UTF-8".to_string()),
            WireBody::Form(_) => {
                Some("application/x-www-form-urlencoded;charset=UTF-8".to_string())
            }
            WireBody::Multipart { content_type, .. } => Some(content_type.clone()),
            WireBody::Bytes(_) | WireBody::Stream(_) => None,
        }
    }

    /// Collect the body into memory, draining a stream if needed
    pub async fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            WireBody::Json(text) | WireBody::Text(text) | WireBody::Form(text) => {
                Ok(text.into_bytes())
            }
            WireBody::Bytes(bytes) => Ok(bytes),
            WireBody::Multipart { body, .. } => Ok(body),
            WireBody::Stream(stream) => {
                stream
                    .try_fold(Vec::new(), |mut acc, chunk| async move {
                        acc.extend_from_slice(&chunk);
                        Ok(acc)
                    })
                    .await
            }
        }
    }
}

/// Turn request data into a wire body
///
/// Only meaningful for methods other than GET and HEAD; the dispatcher skips
/// it for read-style methods. Absent data and JSON null produce no body.
pub fn encode(data: Option<RequestData>) -> Result<Option<WireBody>> {
    let Some(data) = data.filter(|data| !data.is_null()) else {
        return Ok(None);
    };

    let body = match data {
        RequestData::Json(value) => WireBody::Json(serde_json::to_string(&value)?),
        RequestData::Text(text) => WireBody::Text(text),
        RequestData::Bytes(bytes) => WireBody::Bytes(bytes),
        RequestData::Form(pairs) => WireBody::Form(
            serde_urlencoded::to_string(&pairs)
                .map_err(|e| Error::Serialization(e.to_string()))?,
        ),
        RequestData::Multipart(form) => WireBody::Multipart {
            content_type: form.content_type(),
            body: form.to_bytes(),
        },
        RequestData::Stream(stream) => WireBody::Stream(stream),
    };

    Ok(Some(body))
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_encode_none_has_no_body() {
        assert!(encode(None).expect("Encoding succeeds").is_none());
    }

    #[test]
    fn test_encode_object_as_json() {
        let body = encode(Some(json!({"foo": "bar"}).into()))
            .expect("Encoding succeeds")
            .expect("Body is present");
        match body {
            WireBody::Json(text) => assert_eq!(text, r#"{"foo":"bar"}"#),
            other => panic!("Expected JSON body, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_raw_text_passes_through() {
        let body = encode(Some("raw text".into()))
            .expect("Encoding succeeds")
            .expect("Body is present");
        match body {
            WireBody::Text(text) => assert_eq!(text, "raw text"),
            other => panic!("Expected text body, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_json_string_is_quoted() {
        let body = encode(Some(RequestData::Json(json!("quoted"))))
            .expect("Encoding succeeds")
            .expect("Body is present");
        assert!(matches!(body, WireBody::Json(ref text) if text == "\"quoted\""));
    }

    #[test]
    fn test_encode_form_pairs() {
        let data = RequestData::form(&[("a", "1"), ("b", "x y")]).expect("Valid form");
        let body = encode(Some(data))
            .expect("Encoding succeeds")
            .expect("Body is present");
        match body {
            WireBody::Form(text) => assert_eq!(text, "a=1&b=x+y"),
            other => panic!("Expected form body, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_bytes_untouched() {
        let body = encode(Some(vec![0u8, 159, 146, 150].into()))
            .expect("Encoding succeeds")
            .expect("Body is present");
        assert!(matches!(body, WireBody::Bytes(ref b) if b == &[0u8, 159, 146, 150]));
        assert_eq!(body.implied_content_type(), None);
    }

    #[test]
    fn test_multipart_implied_content_type() {
        let form = MultipartForm::new().text("a", "b");
        let content_type = form.content_type();
        assert!(content_type.ends_with(form.boundary()));
        let body = encode(Some(form.into()))
            .expect("Encoding succeeds")
            .expect("Body is present");
        assert_eq!(body.implied_content_type(), Some(content_type));
    }

    #[test]
    fn test_encode_null_has_no_body() {
        let data = RequestData::Json(json!(null));
        assert!(data.is_null());
        assert!(encode(Some(data)).expect("Encoding succeeds").is_none());
        assert!(!RequestData::Json(json!(0)).is_null());
    }

    #[test]
    fn test_passthrough_shapes() {
        assert!(!RequestData::Json(json!({})).is_passthrough());
        assert!(RequestData::Text(String::new()).is_passthrough());
        assert!(RequestData::Bytes(Vec::new()).is_passthrough());
        assert!(RequestData::Form(Vec::new()).is_passthrough());
        assert!(RequestData::Multipart(MultipartForm::new()).is_passthrough());
    }

    #[test]
    fn test_query_pairs_from_object() {
        let data = RequestData::Json(json!({
            "page": 1,
            "q": "rust",
            "tags": ["a", "b"],
            "none": null,
            "flag": true
        }));
        let mut pairs = data.query_pairs().expect("Objects have query pairs");
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("flag".to_string(), "true".to_string()),
                ("none".to_string(), "null".to_string()),
                ("page".to_string(), "1".to_string()),
                ("q".to_string(), "rust".to_string()),
                ("tags".to_string(), "a,b".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_absent_for_text_and_arrays() {
        assert!(RequestData::Text("a=b".to_string()).query_pairs().is_none());
        assert!(RequestData::Json(json!([1, 2])).query_pairs().is_none());
    }

    #[tokio::test]
    async fn test_stream_body_is_collected() {
        let chunks: Vec<io::Result<Vec<u8>>> = vec![Ok(b"hel".to_vec()), Ok(b"lo".to_vec())];
        let stream: BodyStream = futures::stream::iter(chunks).boxed();
        let body = encode(Some(stream.into()))
            .expect("Encoding succeeds")
            .expect("Body is present");
        let bytes = body.into_bytes().await.expect("Stream drains");
        assert_eq!(bytes, b"hello");
    }
}
