//! Content script controller
//!
//! Owns the page-side state (selection session, tracker, toolbar, result
//! dialog, timers) and exposes the same actions to JS. All state sits in one
//! thread-local controller; event handlers borrow it briefly and never
//! across an `await`.
//!
//! Handlers that tear down the widget that invoked them defer the work with
//! `spawn_local`, so a closure is never dropped while it is running.

use std::cell::RefCell;

use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Element, KeyboardEvent, MouseEvent, Node};

use super::dom::WebPage;
use super::helpers::{alert, serialize, to_js_error};
use super::toolbar::{DialogAction, FloatingToolbar, LoadingIndicator, ResultDialog, ToolbarAction};
use crate::error::LevelUpError;
use crate::flow::{GenerationFlow, RequestState};
use crate::generation::{FetchTransport, GenerationClient, PromptKind, Tone};
use crate::models::messages::{ExtensionMessage, MessageResponse};
use crate::models::settings::Settings;
use crate::selection::{
    replace_selection, HostError, ReplacementPath, SelectionSession, SelectionTracker, TrackerAction, DEBOUNCE_MS, LIVENESS_POLL_MS,
};
use crate::storage::{self, ChromeStorage};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["navigator", "clipboard"], js_name = writeText)]
    fn clipboard_write_text(text: &str) -> Result<js_sys::Promise, JsValue>;
}

struct ContentController {
    session: SelectionSession<Node, Element>,
    tracker: SelectionTracker,
    settings: Settings,
    toolbar: Option<FloatingToolbar>,
    loading: Option<LoadingIndicator>,
    dialog: Option<ResultDialog>,
    debounce_timer: Option<i32>,
    debounce_callback: Option<Closure<dyn FnMut()>>,
    liveness_timer: Option<i32>,
    liveness_callback: Option<Closure<dyn FnMut()>>,
    lifecycle_listener: Option<js_sys::Function>,
    /// Original text of the last generation, for tone and regenerate
    last_original: Option<String>,
    _listeners: Vec<Closure<dyn FnMut(web_sys::Event)>>,
}

thread_local! {
    static CONTROLLER: RefCell<Option<ContentController>> = const { RefCell::new(None) };
}

fn with_controller<R>(f: impl FnOnce(&mut ContentController) -> R) -> Option<R> {
    CONTROLLER.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

fn not_initialized() -> LevelUpError {
    LevelUpError::Host(HostError::Dom("content script not initialized".to_string()))
}

impl ContentController {
    fn new() -> Self {
        Self {
            session: SelectionSession::new(),
            tracker: SelectionTracker::new(),
            settings: Settings::default(),
            toolbar: None,
            loading: None,
            dialog: None,
            debounce_timer: None,
            debounce_callback: None,
            liveness_timer: None,
            liveness_callback: None,
            lifecycle_listener: None,
            last_original: None,
            _listeners: Vec::new(),
        }
    }

    fn apply(&mut self, action: TrackerAction, page: &WebPage) {
        match action {
            TrackerAction::ShowToolbar(position) => {
                self.remove_toolbar();
                match FloatingToolbar::show(page.document(), position, |action| {
                    spawn_local(async move { on_toolbar_action(action) });
                }) {
                    Ok(toolbar) => {
                        self.toolbar = Some(toolbar);
                        self.start_liveness_poll();
                    }
                    Err(e) => warn!("Error creating floating bar: {:?}", e),
                }
            }
            TrackerAction::DismissToolbar => self.dismiss_toolbar(),
            TrackerAction::None => {}
        }
    }

    fn start_liveness_poll(&mut self) {
        let Some(window) = web_sys::window() else { return };
        self.stop_liveness_poll();

        let callback = Closure::<dyn FnMut()>::new(|| spawn_local(async { poll_liveness() }));
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            LIVENESS_POLL_MS,
        ) {
            Ok(handle) => self.liveness_timer = Some(handle),
            Err(e) => warn!("Failed to start selection check: {:?}", e),
        }
        self.liveness_callback = Some(callback);
    }

    fn stop_liveness_poll(&mut self) {
        if let (Some(window), Some(handle)) = (web_sys::window(), self.liveness_timer.take()) {
            window.clear_interval_with_handle(handle);
        }
    }

    fn clear_debounce(&mut self) {
        if let (Some(window), Some(handle)) = (web_sys::window(), self.debounce_timer.take()) {
            window.clear_timeout_with_handle(handle);
        }
        self.debounce_callback = None;
    }

    fn remove_dialog(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            dialog.remove();
        }
    }

    /// Whether `target` is inside one of our widgets
    fn owns(&self, target: Option<&Node>) -> bool {
        self.toolbar.as_ref().is_some_and(|t| t.contains(target))
            || self.dialog.as_ref().is_some_and(|d| d.contains(target))
    }

    fn remove_toolbar(&mut self) {
        if let Some(toolbar) = self.toolbar.take() {
            toolbar.remove();
        }
    }

    /// Remove the toolbar and both of its timers
    fn dismiss_toolbar(&mut self) {
        self.remove_toolbar();
        self.stop_liveness_poll();
        self.clear_debounce();
        self.tracker.toolbar_dismissed();
    }

    fn render_state(&mut self, state: &RequestState) {
        if let Some(loading) = self.loading.take() {
            loading.remove();
        }
        let Some(page) = WebPage::current() else { return };
        match state {
            RequestState::Pending { message, .. } => {
                self.remove_dialog();
                match LoadingIndicator::show(page.document(), message) {
                    Ok(indicator) => self.loading = Some(indicator),
                    Err(e) => warn!("Failed to show loading indicator: {:?}", e),
                }
            }
            RequestState::Success {
                kind,
                original_text,
                text,
                markdown,
            } => {
                self.remove_dialog();
                match ResultDialog::show(page.document(), *kind, original_text, text, *markdown, |action| {
                    spawn_local(async move { on_dialog_action(action) });
                }) {
                    Ok(dialog) => self.dialog = Some(dialog),
                    Err(e) => warn!("Failed to show result dialog: {:?}", e),
                }
            }
            RequestState::Failure { .. } => {}
        }
    }
}

fn on_pointer_up(event: MouseEvent) {
    let Some(window) = web_sys::window() else { return };
    let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
    with_controller(|c| {
        // Selecting text inside the dialog must not replace the anchor
        if c.owns(target.as_ref()) {
            return;
        }
        c.clear_debounce();
        let ticket = c.tracker.pointer_released();
        let callback = Closure::<dyn FnMut()>::new(move || spawn_local(async move { settle_selection(ticket) }));
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            DEBOUNCE_MS,
        ) {
            Ok(handle) => {
                c.debounce_timer = Some(handle);
                c.debounce_callback = Some(callback);
            }
            Err(e) => warn!("Failed to schedule selection check: {:?}", e),
        }
    });
}

fn settle_selection(ticket: u64) {
    let Some(page) = WebPage::current() else { return };
    with_controller(|c| {
        c.debounce_timer = None;
        c.debounce_callback = None;
        let action = c.tracker.settle(ticket, &page, &mut c.session);
        c.apply(action, &page);
    });
}

fn poll_liveness() {
    let Some(page) = WebPage::current() else { return };
    with_controller(|c| {
        let action = c.tracker.poll_liveness(&page);
        c.apply(action, &page);
    });
}

fn on_pointer_down(event: MouseEvent) {
    let Some(page) = WebPage::current() else { return };
    let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
    with_controller(|c| {
        let inside = c.owns(target.as_ref());
        let action = c.tracker.pointer_pressed(&page, inside);
        c.apply(action, &page);
    });
}

fn on_key_down(event: KeyboardEvent) {
    if !(event.alt_key() && event.key() == "i") {
        return;
    }
    let Some(page) = WebPage::current() else { return };
    with_controller(|c| match c.tracker.shortcut(&page, &mut c.session) {
        Ok(action) => c.apply(action, &page),
        Err(_) => alert("Select text first to use the Improve feature"),
    });
}

fn on_toolbar_action(action: ToolbarAction) {
    info!("Toolbar action: {:?}", action);
    let result = match action {
        ToolbarAction::Enhance => start_generation(PromptKind::Enhance, None, None),
        ToolbarAction::Meaning => start_generation(PromptKind::Meaning, None, None),
        ToolbarAction::Copy => copy_captured_text(),
    };
    if let Err(e) = result {
        with_controller(|c| c.dismiss_toolbar());
        alert(&e.to_string());
    }
}

fn on_dialog_action(action: DialogAction) {
    info!("Dialog action: {:?}", action);
    let Some((layout, original, result)) = with_controller(|c| {
        c.dialog
            .as_ref()
            .map(|d| (*d.layout(), d.original().to_string(), d.result().to_string()))
    })
    .flatten() else {
        return;
    };

    let outcome = match action {
        DialogAction::CopyOriginal => {
            spawn_local(copy_to_clipboard(original));
            Ok(())
        }
        DialogAction::CopyResult => {
            spawn_local(copy_to_clipboard(result));
            Ok(())
        }
        DialogAction::Insert => {
            with_controller(|c| c.remove_dialog());
            insert_text(&result).map(|_| ())
        }
        DialogAction::Regenerate => start_generation(layout.regenerate_kind, None, Some(original)),
        DialogAction::ApplyContext(context) => start_generation(layout.context_kind, Some(context), Some(original)),
        DialogAction::Tone { tone, context } => start_generation(PromptKind::Tone(tone), context, Some(original)),
        DialogAction::Close => {
            with_controller(|c| c.remove_dialog());
            Ok(())
        }
    };
    if let Err(e) = outcome {
        alert(&e.to_string());
    }
}

async fn copy_to_clipboard(text: String) {
    let outcome = match clipboard_write_text(&text) {
        Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
        Err(e) => Err(e),
    };
    match outcome {
        Ok(()) => info!("Text copied to clipboard"),
        Err(e) => {
            warn!("Failed to copy text: {:?}", e);
            alert("Failed to copy text. Please try again.");
        }
    }
}

fn copy_captured_text() -> Result<(), LevelUpError> {
    let text = with_controller(|c| c.session.text_for_action()).ok_or_else(not_initialized)??;
    spawn_local(async move {
        copy_to_clipboard(text).await;
        with_controller(|c| c.dismiss_toolbar());
    });
    Ok(())
}

/// Write `text` over the captured selection
fn insert_text(text: &str) -> Result<ReplacementPath, LevelUpError> {
    let mut page = WebPage::current().ok_or_else(not_initialized)?;
    with_controller(|c| {
        c.dismiss_toolbar();
        replace_selection(&mut page, &mut c.session, text)
    })
    .ok_or_else(not_initialized)?
}

/// Hand a lifecycle state to the loading indicator and the JS listener.
///
/// The listener is called outside the controller borrow so it may call
/// back into the module.
fn publish_state(state: &RequestState) {
    let listener = with_controller(|c| {
        c.render_state(state);
        c.lifecycle_listener.clone()
    })
    .flatten();

    if let Some(listener) = listener {
        match serialize(state, "Failed to serialize request state") {
            Ok(value) => {
                if let Err(e) = listener.call1(&JsValue::NULL, &value) {
                    warn!("Lifecycle listener threw: {:?}", e);
                }
            }
            Err(e) => warn!("{:?}", e),
        }
    }
}

/// Start a generation for the captured selection (or `text`, when given).
///
/// Rejected while another request is pending.
fn start_generation(kind: PromptKind, context: Option<String>, text: Option<String>) -> Result<(), LevelUpError> {
    let original = with_controller(|c| -> Result<String, LevelUpError> {
        let original = match text {
            Some(t) if !t.trim().is_empty() => t,
            Some(_) => return Err(LevelUpError::NoSelection),
            None => c.session.text_for_action()?,
        };
        c.session.begin_request()?;
        c.dismiss_toolbar();
        c.remove_dialog();
        c.last_original = Some(original.clone());
        Ok(original)
    })
    .ok_or_else(not_initialized)??;

    spawn_local(async move {
        let client = GenerationClient::new(FetchTransport);
        let settings_store = ChromeStorage::sync();
        let history_store = ChromeStorage::local();
        let flow = GenerationFlow {
            client: &client,
            settings_store: &settings_store,
            history_store: &history_store,
        };

        let result = flow.run(kind, &original, context.as_deref(), publish_state).await;
        with_controller(|c| c.session.finish_request());

        if let Err(e) = result {
            alert(&e.to_string());
        }
    });
    Ok(())
}

fn last_original() -> Result<String, LevelUpError> {
    with_controller(|c| c.last_original.clone())
        .ok_or_else(not_initialized)?
        .ok_or(LevelUpError::NoSelection)
}

/// Decide the reply to a runtime message and the text to enhance, if any
pub fn content_message_response(message: &serde_json::Value) -> (MessageResponse, Option<String>) {
    match ExtensionMessage::parse(message) {
        Ok(ExtensionMessage::ImproveSelectedText { text }) => (MessageResponse::processing(), Some(text)),
        Ok(other) => {
            warn!("Content script ignoring {} message", other.action());
            (MessageResponse::unknown_action(), None)
        }
        Err(e) => {
            warn!("Rejected message: {}", e);
            (MessageResponse::unknown_action(), None)
        }
    }
}

// ============================================================================
// WASM API Functions
// ============================================================================

/// Install the content script's page listeners and load settings
#[wasm_bindgen(js_name = initContentScript)]
pub fn init_content_script() -> Result<(), JsValue> {
    let document = WebPage::current()
        .ok_or_else(|| JsValue::from_str("No document available"))?
        .document()
        .clone();

    let mut controller = ContentController::new();

    let mouseup = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
        if let Ok(event) = event.dyn_into::<MouseEvent>() {
            on_pointer_up(event);
        }
    });
    document.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
    controller._listeners.push(mouseup);

    let mousedown = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
        if let Ok(event) = event.dyn_into::<MouseEvent>() {
            on_pointer_down(event);
        }
    });
    document.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
    controller._listeners.push(mousedown);

    let keydown = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
        if let Ok(event) = event.dyn_into::<KeyboardEvent>() {
            on_key_down(event);
        }
    });
    document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    controller._listeners.push(keydown);

    CONTROLLER.with(|cell| *cell.borrow_mut() = Some(controller));

    spawn_local(async {
        match storage::load_settings(&ChromeStorage::sync()).await {
            Ok(settings) => {
                info!("Settings loaded, API key: {}", settings.credential_summary());
                with_controller(|c| c.settings = settings);
            }
            Err(e) => warn!("Error accessing Chrome storage: {}", e),
        }
    });

    info!("LevelUp content script initialized");
    Ok(())
}

/// Apply a `chrome.storage.onChanged` payload to the cached settings
#[wasm_bindgen(js_name = applySettingsChanges)]
pub fn apply_settings_changes(changes: JsValue) -> Result<bool, JsValue> {
    let changes = storage::chrome::js_to_json(changes).map_err(to_js_error)?;
    Ok(with_controller(|c| c.settings.apply_changes(&changes)).unwrap_or(false))
}

/// Current cached settings (for rendering decisions such as markdown)
#[wasm_bindgen(js_name = getCachedSettings)]
pub fn get_cached_settings() -> Result<JsValue, JsValue> {
    let settings = with_controller(|c| c.settings.clone()).unwrap_or_default();
    serialize(&settings, "Failed to serialize settings")
}

/// Subscribe to request lifecycle states (`pending`, `success`, `failure`)
#[wasm_bindgen(js_name = setLifecycleListener)]
pub fn set_lifecycle_listener(listener: js_sys::Function) {
    with_controller(|c| c.lifecycle_listener = Some(listener));
}

#[wasm_bindgen(js_name = enhanceSelection)]
pub fn enhance_selection(context: Option<String>) -> Result<(), JsValue> {
    start_generation(PromptKind::Enhance, context, None).map_err(to_js_error)
}

#[wasm_bindgen(js_name = meaningOfSelection)]
pub fn meaning_of_selection(context: Option<String>) -> Result<(), JsValue> {
    start_generation(PromptKind::Meaning, context, None).map_err(to_js_error)
}

/// Rewrite the last original text in one of the dialog's tones
#[wasm_bindgen(js_name = applyTone)]
pub fn apply_tone(tone: &str, context: Option<String>) -> Result<(), JsValue> {
    let tone = Tone::parse(tone).ok_or_else(|| JsValue::from_str(&format!("Unknown tone: {}", tone)))?;
    let original = last_original().map_err(to_js_error)?;
    start_generation(PromptKind::Tone(tone), context, Some(original)).map_err(to_js_error)
}

/// Produce a fresh version of the last enhanced prompt
#[wasm_bindgen]
pub fn reprompt(context: Option<String>) -> Result<(), JsValue> {
    let original = last_original().map_err(to_js_error)?;
    start_generation(PromptKind::Reprompt, context, Some(original)).map_err(to_js_error)
}

/// Rewrite the last original text at a higher temperature
#[wasm_bindgen]
pub fn regenerate(context: Option<String>) -> Result<(), JsValue> {
    let original = last_original().map_err(to_js_error)?;
    start_generation(PromptKind::Regenerate, context, Some(original)).map_err(to_js_error)
}

/// Replace the captured selection with `text`; returns the strategy used
#[wasm_bindgen(js_name = insertResult)]
pub fn insert_result(text: &str) -> Result<JsValue, JsValue> {
    match insert_text(text) {
        Ok(path) => serialize(&path, "Failed to serialize replacement path"),
        Err(e) => {
            alert(&e.to_string());
            Err(to_js_error(e))
        }
    }
}

#[wasm_bindgen(js_name = copySelection)]
pub fn copy_selection() -> Result<(), JsValue> {
    copy_captured_text().map_err(to_js_error)
}

#[wasm_bindgen(js_name = dismissToolbar)]
pub fn dismiss_toolbar() {
    with_controller(|c| c.dismiss_toolbar());
}

#[wasm_bindgen(js_name = closeResultDialog)]
pub fn close_result_dialog() {
    with_controller(|c| c.remove_dialog());
}

/// Handle a message from the background worker; returns the reply payload
#[wasm_bindgen(js_name = handleContentMessage)]
pub fn handle_content_message(message: JsValue) -> Result<JsValue, JsValue> {
    let message = storage::chrome::js_to_json(message).map_err(to_js_error)?;
    let (response, text) = content_message_response(&message);

    if let Some(text) = text {
        info!("Improving text from context menu ({} chars)", text.chars().count());
        if let Err(e) = start_generation(PromptKind::Enhance, None, Some(text)) {
            alert(&e.to_string());
        }
    }

    serialize(&response, "Failed to serialize response")
}
