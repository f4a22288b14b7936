//! HTTP transport for generation requests
//!
//! The client only needs "POST this JSON, give me status and body".
//! [`FetchTransport`] does that with the browser's `fetch`; tests plug in
//! their own implementation.

use async_trait::async_trait;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// The request never produced an HTTP response
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Status and raw body of an HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one JSON POST request
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, TransportError>;
}

/// `window.fetch` transport
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, TransportError> {
        let window = web_sys::window().ok_or_else(|| TransportError("No window available".to_string()))?;

        let opts = web_sys::RequestInit::new();
        opts.set_method("POST");
        opts.set_body(&wasm_bindgen::JsValue::from_str(&body));

        let headers = web_sys::Headers::new()
            .map_err(|_| TransportError("Failed to create headers".to_string()))?;
        headers
            .set("Content-Type", "application/json")
            .map_err(|_| TransportError("Failed to set headers".to_string()))?;
        opts.set_headers(headers.as_ref());

        let resp = JsFuture::from(window.fetch_with_str_and_init(url, &opts))
            .await
            .map_err(|e| TransportError(format!("Network error - please check your connection ({:?})", e)))?;
        let resp: web_sys::Response = resp
            .dyn_into()
            .map_err(|_| TransportError("Response invalid".to_string()))?;

        let status = resp.status();
        let text_promise = resp
            .text()
            .map_err(|_| TransportError("Failed to read response".to_string()))?;
        let body = JsFuture::from(text_promise)
            .await
            .map_err(|_| TransportError("Failed to read response".to_string()))?
            .as_string()
            .unwrap_or_default();

        Ok(HttpResponse { status, body })
    }
}
