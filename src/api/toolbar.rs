//! Floating toolbar, loading indicator and result dialog
//!
//! Small DOM widgets owned by the content controller. Widgets report clicks
//! as [`ToolbarAction`]s and [`DialogAction`]s; the controller decides what
//! they do.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlTextAreaElement, MouseEvent, Node};

use crate::generation::{format_spans, PromptKind, TextSpan, Tone};
use crate::selection::FloatingAnchorPosition;

const ACTION_ATTR: &str = "data-levelup-action";
const DIALOG_ATTR: &str = "data-levelup-dialog";

/// Buttons on the floating toolbar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarAction {
    Enhance,
    Copy,
    Meaning,
}

impl ToolbarAction {
    const ALL: [ToolbarAction; 3] = [ToolbarAction::Enhance, ToolbarAction::Copy, ToolbarAction::Meaning];

    fn id(&self) -> &'static str {
        match self {
            ToolbarAction::Enhance => "enhance",
            ToolbarAction::Copy => "copy",
            ToolbarAction::Meaning => "meaning",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ToolbarAction::Enhance => "Enhance Prompt",
            ToolbarAction::Copy => "Copy Text",
            ToolbarAction::Meaning => "Get Meaning",
        }
    }

    fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }
}

/// The toolbar shown above a settled selection
pub struct FloatingToolbar {
    root: HtmlElement,
    _on_click: Closure<dyn FnMut(MouseEvent)>,
    _on_mousedown: Closure<dyn FnMut(Event)>,
}

impl FloatingToolbar {
    /// Build the toolbar at `position` and attach it to `<body>`
    pub fn show<F>(document: &Document, position: FloatingAnchorPosition, on_action: F) -> Result<Self, JsValue>
    where
        F: Fn(ToolbarAction) + 'static,
    {
        let root: HtmlElement = document.create_element("div")?.dyn_into()?;
        root.set_class_name("levelup-floating-bar");
        root.set_attribute(
            "style",
            &format!(
                "position: fixed; left: {}px; top: {}px; z-index: 2147483647; display: flex; gap: 4px;",
                position.x, position.y
            ),
        )?;

        for action in ToolbarAction::ALL {
            let button = document.create_element("button")?;
            button.set_class_name("levelup-toolbar-button");
            button.set_attribute("title", action.title())?;
            button.set_attribute(ACTION_ATTR, action.id())?;
            button.set_text_content(Some(action.title()));
            root.append_child(&button)?;
        }

        let on_click = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let action = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(&format!("[{}]", ACTION_ATTR)).ok().flatten())
                .and_then(|el| el.get_attribute(ACTION_ATTR))
                .and_then(|id| ToolbarAction::from_id(&id));
            if let Some(action) = action {
                event.prevent_default();
                event.stop_propagation();
                on_action(action);
            }
        });
        root.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;

        // Pressing a button must not collapse the page selection
        let on_mousedown = Closure::<dyn FnMut(Event)>::new(|event: Event| {
            event.prevent_default();
            event.stop_propagation();
        });
        root.add_event_listener_with_callback("mousedown", on_mousedown.as_ref().unchecked_ref())?;

        append_to_body(document, &root)?;

        Ok(Self {
            root,
            _on_click: on_click,
            _on_mousedown: on_mousedown,
        })
    }

    /// Whether `target` is inside the toolbar
    pub fn contains(&self, target: Option<&Node>) -> bool {
        self.root.contains(target)
    }

    pub fn remove(self) {
        self.root.remove();
    }
}

/// "Working on it" notice shown while a request is pending
pub struct LoadingIndicator {
    root: HtmlElement,
}

impl LoadingIndicator {
    pub fn show(document: &Document, message: &str) -> Result<Self, JsValue> {
        let root: HtmlElement = document.create_element("div")?.dyn_into()?;
        root.set_class_name("levelup-loading");
        root.set_attribute(
            "style",
            "position: fixed; right: 20px; bottom: 20px; z-index: 2147483647;",
        )?;

        let status = document.create_element("div")?;
        status.set_class_name("levelup-status");
        status.set_text_content(Some(message));
        root.append_child(&status)?;

        append_to_body(document, &root)?;
        Ok(Self { root })
    }

    pub fn remove(self) {
        self.root.remove();
    }
}

/// Buttons on the result dialog
#[derive(Clone, Debug, PartialEq)]
pub enum DialogAction {
    CopyOriginal,
    CopyResult,
    /// Replace the captured selection with the result
    Insert,
    /// Ask again for the same original
    Regenerate,
    /// Run again with extra context typed into the dialog
    ApplyContext(String),
    Tone { tone: Tone, context: Option<String> },
    Close,
}

impl DialogAction {
    /// Decode a clicked button; `context` is the context box's current text.
    ///
    /// Applying an empty context does nothing.
    pub fn from_id(id: &str, context: &str) -> Option<Self> {
        let context = context.trim();
        match id {
            "copy-original" => Some(DialogAction::CopyOriginal),
            "copy-result" => Some(DialogAction::CopyResult),
            "insert" => Some(DialogAction::Insert),
            "regenerate" => Some(DialogAction::Regenerate),
            "close" => Some(DialogAction::Close),
            "apply-context" if context.is_empty() => None,
            "apply-context" => Some(DialogAction::ApplyContext(context.to_string())),
            _ => {
                let tone = id.strip_prefix("tone:").and_then(Tone::parse)?;
                Some(DialogAction::Tone {
                    tone,
                    context: (!context.is_empty()).then(|| context.to_string()),
                })
            }
        }
    }
}

/// Labels and follow-up requests for one kind of result
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DialogLayout {
    pub title: &'static str,
    pub original_label: &'static str,
    pub result_label: &'static str,
    pub context_prompt: &'static str,
    pub apply_label: &'static str,
    /// `None` when the result is not meant to replace the selection
    pub insert_label: Option<&'static str>,
    pub shows_tones: bool,
    /// Request run by the regenerate button
    pub regenerate_kind: PromptKind,
    /// Request run when context is applied
    pub context_kind: PromptKind,
}

impl DialogLayout {
    pub fn for_kind(kind: PromptKind) -> Self {
        if kind.is_meaning() {
            DialogLayout {
                title: "Text Meaning",
                original_label: "Original Text",
                result_label: "Meaning",
                context_prompt: "Add additional context to improve the meaning",
                apply_label: "Get Specific Meaning",
                insert_label: None,
                shows_tones: false,
                regenerate_kind: PromptKind::Meaning,
                context_kind: PromptKind::Meaning,
            }
        } else {
            DialogLayout {
                title: "Enhance Prompt",
                original_label: "Original Prompt",
                result_label: "Enhanced Prompt",
                context_prompt: "Add additional context to improve the results",
                apply_label: "Apply",
                insert_label: Some("Insert Enhanced Prompt"),
                shows_tones: true,
                regenerate_kind: PromptKind::Reprompt,
                context_kind: PromptKind::Enhance,
            }
        }
    }
}

/// Dialog showing a finished generation next to its original
pub struct ResultDialog {
    root: HtmlElement,
    layout: DialogLayout,
    original: String,
    result: String,
    _on_click: Closure<dyn FnMut(MouseEvent)>,
}

impl ResultDialog {
    /// Build the dialog for a `kind` result and attach it to `<body>`
    pub fn show<F>(
        document: &Document,
        kind: PromptKind,
        original: &str,
        result: &str,
        markdown: bool,
        on_action: F,
    ) -> Result<Self, JsValue>
    where
        F: Fn(DialogAction) + 'static,
    {
        let layout = DialogLayout::for_kind(kind);

        let root = html_element(document, "div", "levelup-dialog dark-theme")?;
        root.set_attribute(
            "style",
            "position: fixed; left: 50%; top: 50%; transform: translate(-50%, -50%); z-index: 2147483647;",
        )?;

        let header = html_element(document, "div", "levelup-dialog-header")?;
        let title = html_element(document, "div", "levelup-dialog-title")?;
        title.set_text_content(Some(layout.title));
        header.append_child(&title)?;
        header.append_child(&button(document, "close", "\u{2715}")?.into())?;
        root.append_child(&header)?;

        let content = html_element(document, "div", "levelup-dialog-content")?;

        // Original text with its context box
        let original_section = section(document, layout.original_label, &[("copy-original", "Copy")])?;
        let original_text = html_element(document, "div", "levelup-text-input")?;
        original_text.set_text_content(Some(original));
        original_section.append_child(&original_text)?;

        let toggle = button(document, "toggle-context", "Add Context")?;
        toggle.set_class_name("levelup-add-context");
        original_section.append_child(&toggle)?;

        let context_box = html_element(document, "div", "levelup-context-container")?;
        context_box.set_hidden(true);
        let context_header = html_element(document, "div", "levelup-context-header")?;
        context_header.set_text_content(Some(layout.context_prompt));
        context_box.append_child(&context_header)?;
        let context_input: HtmlTextAreaElement = document.create_element("textarea")?.dyn_into()?;
        context_input.set_class_name("levelup-context-input");
        context_input.set_rows(3);
        context_box.append_child(&context_input)?;
        context_box.append_child(&button(document, "apply-context", layout.apply_label)?.into())?;
        original_section.append_child(&context_box)?;
        content.append_child(&original_section)?;

        // Result, formatted
        let result_section = section(
            document,
            layout.result_label,
            &[("regenerate", "Regenerate"), ("copy-result", "Copy")],
        )?;
        let result_text = html_element(document, "div", "levelup-text-improved")?;
        append_spans(document, &result_text, &format_spans(result, markdown))?;
        result_section.append_child(&result_text)?;
        content.append_child(&result_section)?;

        if layout.shows_tones {
            let tones = html_element(document, "div", "levelup-tone-buttons")?;
            for tone in Tone::ALL {
                let tone_button = button(document, &format!("tone:{}", tone.label()), tone.label())?;
                tone_button.set_class_name("levelup-tone-btn");
                tones.append_child(&tone_button)?;
            }
            content.append_child(&tones)?;
        }
        root.append_child(&content)?;

        if let Some(label) = layout.insert_label {
            let actions = html_element(document, "div", "levelup-dialog-actions")?;
            let insert = button(document, "insert", label)?;
            insert.set_class_name("levelup-insert-btn");
            actions.append_child(&insert)?;
            root.append_child(&actions)?;
        }

        let on_click = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let Some(id) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(&format!("[{}]", DIALOG_ATTR)).ok().flatten())
                .and_then(|el| el.get_attribute(DIALOG_ATTR))
            else {
                return;
            };
            event.stop_propagation();

            if id == "toggle-context" {
                let opening = context_box.hidden();
                context_box.set_hidden(!opening);
                toggle.set_text_content(Some(if opening { "Hide Context" } else { "Add Context" }));
                return;
            }
            if let Some(action) = DialogAction::from_id(&id, &context_input.value()) {
                on_action(action);
            }
        });
        root.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;

        append_to_body(document, &root)?;

        Ok(Self {
            root,
            layout,
            original: original.to_string(),
            result: result.to_string(),
            _on_click: on_click,
        })
    }

    pub fn layout(&self) -> &DialogLayout {
        &self.layout
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    /// Whether `target` is inside the dialog
    pub fn contains(&self, target: Option<&Node>) -> bool {
        self.root.contains(target)
    }

    pub fn remove(self) {
        self.root.remove();
    }
}

fn append_to_body(document: &Document, element: &HtmlElement) -> Result<(), JsValue> {
    let body = document.body().ok_or_else(|| JsValue::from_str("Document has no body"))?;
    body.append_child(element)?;
    Ok(())
}

fn html_element(document: &Document, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
    let element: HtmlElement = document.create_element(tag)?.dyn_into()?;
    element.set_class_name(class);
    Ok(element)
}

fn button(document: &Document, id: &str, label: &str) -> Result<HtmlElement, JsValue> {
    let element = html_element(document, "button", "levelup-copy-btn")?;
    element.set_attribute(DIALOG_ATTR, id)?;
    element.set_text_content(Some(label));
    Ok(element)
}

/// A labelled section whose header carries `buttons` (`(id, label)` pairs)
fn section(document: &Document, label: &str, buttons: &[(&str, &str)]) -> Result<HtmlElement, JsValue> {
    let section = html_element(document, "div", "levelup-section")?;
    let header = html_element(document, "div", "levelup-section-header")?;
    let title = html_element(document, "div", "levelup-section-label")?;
    title.set_text_content(Some(label));
    header.append_child(&title)?;
    for (id, text) in buttons {
        header.append_child(&button(document, id, text)?.into())?;
    }
    section.append_child(&header)?;
    Ok(section)
}

fn append_spans(document: &Document, parent: &HtmlElement, spans: &[TextSpan]) -> Result<(), JsValue> {
    for span in spans {
        match span {
            TextSpan::Plain(text) => {
                parent.append_child(&document.create_text_node(text))?;
            }
            TextSpan::Strong(text) => {
                let strong = document.create_element("strong")?;
                strong.set_text_content(Some(text));
                parent.append_child(&strong)?;
            }
            TextSpan::LineBreak => {
                parent.append_child(&document.create_element("br")?.into())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_buttons_decode() {
        assert_eq!(DialogAction::from_id("insert", ""), Some(DialogAction::Insert));
        assert_eq!(DialogAction::from_id("copy-result", "ignored"), Some(DialogAction::CopyResult));
        assert_eq!(DialogAction::from_id("nonsense", ""), None);
    }

    #[test]
    fn test_apply_context_needs_text() {
        assert_eq!(DialogAction::from_id("apply-context", "   "), None);
        assert_eq!(
            DialogAction::from_id("apply-context", " for a newsletter "),
            Some(DialogAction::ApplyContext("for a newsletter".into()))
        );
    }

    #[test]
    fn test_tone_carries_optional_context() {
        assert_eq!(
            DialogAction::from_id("tone:Casual", ""),
            Some(DialogAction::Tone {
                tone: Tone::Casual,
                context: None
            })
        );
        assert_eq!(
            DialogAction::from_id("tone:Technical", "rust devs"),
            Some(DialogAction::Tone {
                tone: Tone::Technical,
                context: Some("rust devs".into())
            })
        );
        assert_eq!(DialogAction::from_id("tone:Angry", ""), None);
    }

    #[test]
    fn test_layout_per_kind() {
        let enhance = DialogLayout::for_kind(PromptKind::Tone(Tone::Creative));
        assert!(enhance.shows_tones);
        assert_eq!(enhance.insert_label, Some("Insert Enhanced Prompt"));
        assert_eq!(enhance.regenerate_kind, PromptKind::Reprompt);
        assert_eq!(enhance.context_kind, PromptKind::Enhance);

        let meaning = DialogLayout::for_kind(PromptKind::Meaning);
        assert!(!meaning.shows_tones);
        assert!(meaning.insert_label.is_none());
        assert_eq!(meaning.regenerate_kind, PromptKind::Meaning);
    }
}
