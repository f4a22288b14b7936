//! WASM build test
//!
//! Exercises the web-sys page host in a real browser.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use levelup_wasm::api::{DialogAction, FloatingToolbar, ResultDialog, WebPage};
use levelup_wasm::generation::{PromptKind, Tone};
use levelup_wasm::selection::{
    replace_selection, DocumentHost, FloatingAnchorPosition, ReplacementPath, SelectionSession, SelectionTracker,
    TrackerAction,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Event, EventInit, HtmlElement, HtmlTextAreaElement, Node};

wasm_bindgen_test_configure!(run_in_browser);

/// Append a paragraph and select `[start, end)` of its text
fn select_in_paragraph(page: &WebPage, text: &str, start: u32, end: u32) -> (web_sys::Element, Node) {
    let document = page.document();
    let para = document.create_element("p").unwrap();
    para.set_text_content(Some(text));
    document.body().unwrap().append_child(&para).unwrap();

    let node = para.first_child().unwrap();
    let range = document.create_range().unwrap();
    range.set_start(&node, start).unwrap();
    range.set_end(&node, end).unwrap();

    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    selection.remove_all_ranges().unwrap();
    selection.add_range(&range).unwrap();
    (para, node)
}

#[wasm_bindgen_test]
fn test_page_available() {
    assert!(WebPage::current().is_some());
}

#[wasm_bindgen_test]
fn test_live_selection_is_read() {
    let page = WebPage::current().unwrap();
    let (para, node) = select_in_paragraph(&page, "hello browser world", 6, 13);

    assert_eq!(page.selection_text(), "browser");
    let range = page.live_range().unwrap();
    assert_eq!(range.start.node, node);
    assert_eq!((range.start.offset, range.end.offset), (6, 13));
    assert!(page.boundaries_valid(&range));
    assert_eq!(page.selection_element(), Some(para.clone()));

    para.remove();
    assert!(!page.boundaries_valid(&range));
}

#[wasm_bindgen_test]
fn test_capture_and_replace_in_document() {
    let mut page = WebPage::current().unwrap();
    let (para, _) = select_in_paragraph(&page, "please fix my essey now", 7, 19);

    let mut tracker = SelectionTracker::new();
    let mut session = SelectionSession::new();
    let ticket = tracker.pointer_released();
    assert!(matches!(tracker.settle(ticket, &page, &mut session), TrackerAction::ShowToolbar(_)));

    let path = replace_selection(&mut page, &mut session, "fix my essay").unwrap();
    assert_eq!(path, ReplacementPath::StoredAnchor);
    assert_eq!(para.text_content().unwrap(), "please fix my essay now");
    assert_eq!(page.selection_text(), "");
    para.remove();
}

#[wasm_bindgen_test]
fn test_textarea_value_is_replaced() {
    let mut page = WebPage::current().unwrap();
    let document = page.document().clone();
    let area: HtmlTextAreaElement = document.create_element("textarea").unwrap().dyn_into().unwrap();
    area.set_value("draft one two");
    document.body().unwrap().append_child(&area).unwrap();
    area.focus().unwrap();
    area.set_selection_range(6, 9).unwrap();

    let form = page.form_selection().unwrap();
    assert_eq!((form.start, form.end), (6, 9));

    let mut tracker = SelectionTracker::new();
    let mut session = SelectionSession::new();
    tracker.shortcut(&page, &mut session).unwrap();
    assert_eq!(session.captured_text(), "one");

    replace_selection(&mut page, &mut session, "1").unwrap();
    assert_eq!(area.value(), "draft 1 two");
    area.remove();
}

/// Click the dialog button with the given id
fn click_dialog_button(document: &web_sys::Document, id: &str) {
    let button: HtmlElement = document
        .query_selector(&format!("[data-levelup-dialog='{}']", id))
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    button.click();
}

#[wasm_bindgen_test]
fn test_toolbar_mousedown_keeps_selection() {
    let page = WebPage::current().unwrap();
    let document = page.document().clone();
    let toolbar = FloatingToolbar::show(&document, FloatingAnchorPosition { x: 10.0, y: 10.0 }, |_| {}).unwrap();

    let button = document.query_selector("[data-levelup-action='enhance']").unwrap().unwrap();
    let init = EventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    let press = Event::new_with_event_init_dict("mousedown", &init).unwrap();
    button.dispatch_event(&press).unwrap();

    assert!(press.default_prevented());
    toolbar.remove();
}

#[wasm_bindgen_test]
fn test_meaning_dialog_renders_markdown() {
    let page = WebPage::current().unwrap();
    let document = page.document().clone();
    let dialog = ResultDialog::show(
        &document,
        PromptKind::Meaning,
        "ephemeral",
        "**Short-lived**\nlasting a day",
        true,
        |_| {},
    )
    .unwrap();

    let result = document.query_selector(".levelup-text-improved").unwrap().unwrap();
    assert_eq!(result.text_content().unwrap(), "Short-livedlasting a day");
    let strong = result.query_selector("strong").unwrap().unwrap();
    assert_eq!(strong.text_content().unwrap(), "Short-lived");
    assert!(result.query_selector("br").unwrap().is_some());

    // Meaning results are read, not inserted
    assert!(document.query_selector("[data-levelup-dialog='insert']").unwrap().is_none());
    assert!(document.query_selector(".levelup-tone-btn").unwrap().is_none());
    dialog.remove();
}

#[wasm_bindgen_test]
fn test_enhance_dialog_reports_actions() {
    let page = WebPage::current().unwrap();
    let document = page.document().clone();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let dialog = ResultDialog::show(
        &document,
        PromptKind::Enhance,
        "fix my essey",
        "Please correct my essay.",
        false,
        move |action| sink.borrow_mut().push(action),
    )
    .unwrap();
    assert_eq!(dialog.result(), "Please correct my essay.");

    click_dialog_button(&document, "toggle-context");
    let context: HtmlTextAreaElement = document
        .query_selector(".levelup-context-input")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    context.set_value("for a cover letter");

    click_dialog_button(&document, "tone:Professional");
    click_dialog_button(&document, "apply-context");
    click_dialog_button(&document, "insert");

    assert_eq!(
        *seen.borrow(),
        vec![
            DialogAction::Tone {
                tone: Tone::Professional,
                context: Some("for a cover letter".into())
            },
            DialogAction::ApplyContext("for a cover letter".into()),
            DialogAction::Insert,
        ]
    );
    dialog.remove();
    assert!(document.query_selector(".levelup-dialog").unwrap().is_none());
}
