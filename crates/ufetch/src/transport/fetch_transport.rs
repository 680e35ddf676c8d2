//! Browser transport using the native `fetch()` API

use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::{apply_implied_content_type, cancellable, Transport, TransportRequest};
use crate::error::TransportError;
use crate::response::Response;

#[wasm_bindgen::prelude::wasm_bindgen]
extern "C" {
    #[wasm_bindgen::prelude::wasm_bindgen(js_name = "fetch")]
    fn js_fetch(input: &web_sys::Request) -> js_sys::Promise;
}

/// Transport backed by the global `fetch()` of the browser or worker
///
/// Entries of [`super::RequestOptions::extensions`] are copied onto the
/// `RequestInit` object, so keys such as `credentials`, `mode` or `cache` work
/// as they do in JavaScript.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

fn js_error(err: JsValue) -> TransportError {
    TransportError::Other(format!("{:?}", err))
}

fn to_js(value: &Value) -> Option<JsValue> {
    match value {
        Value::Null => Some(JsValue::NULL),
        Value::Bool(b) => Some(JsValue::from_bool(*b)),
        Value::Number(n) => n.as_f64().map(JsValue::from_f64),
        Value::String(s) => Some(JsValue::from_str(s)),
        other => js_sys::JSON::parse(&other.to_string()).ok(),
    }
}

async fn read_response(response: web_sys::Response) -> Result<Response, TransportError> {
    let status = response.status();

    let mut headers = HeaderMap::new();
    if let Some(entries) = js_sys::try_iter(&response.headers()).map_err(js_error)? {
        for entry in entries {
            let entry = js_sys::Array::from(&entry.map_err(js_error)?);
            let (Some(name), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string())
            else {
                continue;
            };
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::debug!("Skipping unparseable response header {}", name),
            }
        }
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(js_error)?)
        .await
        .map_err(|e| TransportError::Other(format!("Failed to read body: {:?}", e)))?;
    let body = js_sys::Uint8Array::new(&buffer).to_vec();

    Ok(Response::new(status, headers, body))
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: TransportRequest) -> Result<Response, TransportError> {
        let TransportRequest {
            method,
            url,
            mut headers,
            body,
            options,
        } = request;

        let init = web_sys::RequestInit::new();
        init.set_method(method.as_str());

        if let Some(body) = body {
            apply_implied_content_type(&mut headers, &body);
            let bytes = body
                .into_bytes()
                .await
                .map_err(|e| TransportError::Other(format!("Failed to read body: {}", e)))?;
            let array = js_sys::Uint8Array::from(bytes.as_slice());
            init.set_body(&array.into());
        }

        for (key, value) in &options.extensions {
            if let Some(value) = to_js(value) {
                js_sys::Reflect::set(&init, &JsValue::from_str(key), &value).map_err(js_error)?;
            }
        }

        let controller = match options.cancel {
            Some(_) => Some(web_sys::AbortController::new().map_err(js_error)?),
            None => None,
        };
        if let Some(controller) = &controller {
            init.set_signal(Some(&controller.signal()));
        }

        let request = web_sys::Request::new_with_str_and_init(&url, &init)
            .map_err(|e| TransportError::Build(format!("Failed to create request: {:?}", e)))?;

        let request_headers = request.headers();
        for (name, value) in headers.iter() {
            let value = value
                .to_str()
                .map_err(|e| TransportError::Build(e.to_string()))?;
            request_headers
                .append(name.as_str(), value)
                .map_err(|e| TransportError::Build(format!("Failed to set header: {:?}", e)))?;
        }

        let fetch = async {
            let value = JsFuture::from(js_fetch(&request))
                .await
                .map_err(|e| TransportError::Connection(format!("Fetch failed: {:?}", e)))?;
            let response: web_sys::Response = value
                .dyn_into()
                .map_err(|_| TransportError::Other("Response is not a web_sys::Response".into()))?;
            read_response(response).await
        };

        let result = cancellable(options.cancel.as_ref(), fetch).await;
        if let (Err(TransportError::Cancelled), Some(controller)) = (&result, &controller) {
            controller.abort();
        }
        result
    }
}
