// End-to-end enhance flow: capture, generate with a mock API, write back

mod common;

use std::cell::RefCell;

use async_trait::async_trait;
use common::FakePage;
use futures::executor::block_on;
use serde_json::{json, Value};

use levelup_wasm::flow::{GenerationFlow, RequestState};
use levelup_wasm::generation::{
    GenerationClient, GenerationError, HttpResponse, HttpTransport, PromptKind, TransportError,
};
use levelup_wasm::selection::{replace_selection, ReplacementPath, SelectionSession, SelectionTracker};
use levelup_wasm::storage::{self, KeyValueStore, MemoryStore};
use levelup_wasm::LevelUpError;

/// Replies with a fixed response and records every request body
struct MockApi {
    status: u16,
    body: Value,
    sent: RefCell<Vec<Value>>,
}

impl MockApi {
    fn replying(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            sent: RefCell::new(Vec::new()),
        }
    }

    fn with_text(text: &str) -> Self {
        Self::replying(200, json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}))
    }

    fn calls(&self) -> usize {
        self.sent.borrow().len()
    }
}

#[async_trait(?Send)]
impl HttpTransport for MockApi {
    async fn post_json(&self, _url: &str, body: String) -> Result<HttpResponse, TransportError> {
        let parsed = serde_json::from_str(&body).map_err(|e| TransportError(e.to_string()))?;
        self.sent.borrow_mut().push(parsed);
        Ok(HttpResponse {
            status: self.status,
            body: self.body.to_string(),
        })
    }
}

fn configured_settings() -> MemoryStore {
    let store = MemoryStore::new();
    block_on(store.set(json!({"apiKey": "test-key", "temperature": 0.9, "markdown": true}))).unwrap();
    store
}

fn run(
    client: &GenerationClient<MockApi>,
    settings: &MemoryStore,
    history: &MemoryStore,
    kind: PromptKind,
    original: &str,
) -> (Result<String, LevelUpError>, Vec<RequestState>) {
    let flow = GenerationFlow {
        client,
        settings_store: settings,
        history_store: history,
    };
    let mut states = Vec::new();
    let result = block_on(flow.run(kind, original, None, |s| states.push(s.clone())));
    (result, states)
}

#[test]
fn test_enhance_selection_and_replace() {
    let mut page = FakePage::new();
    let (para, nodes) = page.add_block(&["fix my essey"]);
    page.select(nodes[0], 0, 12);

    let mut tracker = SelectionTracker::new();
    let mut session = SelectionSession::new();
    let ticket = tracker.pointer_released();
    tracker.settle(ticket, &page, &mut session);

    let original = session.text_for_action().unwrap();
    session.begin_request().unwrap();

    let client = GenerationClient::new(MockApi::with_text("Please correct the grammar in my essay."));
    let settings = configured_settings();
    let history = MemoryStore::new();
    let (result, states) = run(&client, &settings, &history, PromptKind::Enhance, &original);
    session.finish_request();

    let text = result.unwrap();
    assert_eq!(text, "Please correct the grammar in my essay.");
    assert_eq!(states.len(), 2);
    assert!(matches!(states[0], RequestState::Pending { .. }));
    assert!(matches!(&states[1], RequestState::Success { markdown: true, .. }));

    // Prompt carries the selection and the configured temperature
    let sent = client.transport().sent.borrow();
    let prompt = sent[0]["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("fix my essey"));
    assert_eq!(sent[0]["generationConfig"]["temperature"], 0.9);
    drop(sent);

    let path = replace_selection(&mut page, &mut session, &text).unwrap();
    assert_eq!(path, ReplacementPath::StoredAnchor);
    assert_eq!(page.element_text(para), "Please correct the grammar in my essay.");
    assert!(!page.has_selection());

    let saved = block_on(storage::load_history(&history)).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved.entries()[0].original, "fix my essey");
    assert_eq!(saved.entries()[0].enhanced, "Please correct the grammar in my essay.");
}

#[test]
fn test_rate_limit_fails_without_history() {
    let client = GenerationClient::new(MockApi::replying(429, json!({"error": {"code": 429}})));
    let settings = configured_settings();
    let history = MemoryStore::new();

    let (result, states) = run(&client, &settings, &history, PromptKind::Enhance, "fix my essey");

    assert_eq!(
        result,
        Err(LevelUpError::Generation(GenerationError::RateLimited))
    );
    assert_eq!(states.len(), 2);
    match states.last() {
        Some(RequestState::Failure { message, .. }) => {
            assert_eq!(message, "Rate limit exceeded. Please try again later.")
        }
        other => panic!("expected failure state, got {:?}", other),
    }
    assert!(states.last().map(RequestState::is_terminal).unwrap_or(false));
    assert!(block_on(storage::load_history(&history)).unwrap().is_empty());
}

#[test]
fn test_missing_credential_never_calls_api() {
    let client = GenerationClient::new(MockApi::with_text("unused"));
    let settings = MemoryStore::new();
    let history = MemoryStore::new();

    let (result, states) = run(&client, &settings, &history, PromptKind::Meaning, "ephemeral");

    assert_eq!(
        result,
        Err(LevelUpError::Generation(GenerationError::MissingCredential))
    );
    assert_eq!(client.transport().calls(), 0);
    assert!(matches!(states.last(), Some(RequestState::Failure { .. })));
}

#[test]
fn test_meaning_is_recorded_as_meaning() {
    let client = GenerationClient::new(MockApi::with_text("short-lived"));
    let settings = configured_settings();
    let history = MemoryStore::new();

    run(&client, &settings, &history, PromptKind::Meaning, "ephemeral").0.unwrap();

    let stored = history.snapshot();
    assert_eq!(stored["historyPrompts"][0]["type"], "meaning");
}

#[test]
fn test_regenerate_raises_temperature_capped() {
    let client = GenerationClient::new(MockApi::with_text("again"));
    let settings = configured_settings();
    let history = MemoryStore::new();

    run(&client, &settings, &history, PromptKind::Regenerate, "text").0.unwrap();

    let sent = client.transport().sent.borrow();
    assert_eq!(sent[0]["generationConfig"]["temperature"], 1.0);
}

#[test]
fn test_second_request_rejected_while_pending() {
    let mut session: SelectionSession<common::NodeId, common::ElementId> = SelectionSession::new();
    session.begin_request().unwrap();
    assert_eq!(session.begin_request(), Err(LevelUpError::RequestPending));
    session.finish_request();
    assert!(session.begin_request().is_ok());
}

#[test]
fn test_whitespace_original_fails_before_request() {
    let client = GenerationClient::new(MockApi::with_text("unused"));
    let settings = configured_settings();
    let history = MemoryStore::new();

    let (result, states) = run(&client, &settings, &history, PromptKind::Enhance, "   ");
    assert_eq!(result, Err(LevelUpError::NoSelection));
    assert_eq!(client.transport().calls(), 0);
    assert_eq!(states.len(), 2);
}
