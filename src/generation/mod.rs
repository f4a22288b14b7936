//! Generation client
//!
//! - `prompts`: prompt templates per user action
//! - `markdown`: display spans for generated text
//! - `client`: request building and response/error mapping
//! - `transport`: the HTTP seam (`fetch` in the browser)

pub mod client;
pub mod markdown;
pub mod prompts;
pub mod transport;

pub use client::{parse_response, GenerationClient, GenerationError, GenerationRequest, GEMINI_API_URL};
pub use markdown::{format_spans, TextSpan};
pub use prompts::{PromptKind, Tone};
pub use transport::{FetchTransport, HttpResponse, HttpTransport, TransportError};
