//! Browser implementation of [`DocumentHost`]
//!
//! Wraps `window.getSelection()`, DOM ranges and form controls. Every range
//! built here is created fresh from stored boundaries; live ranges are only
//! read, never kept.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlTextAreaElement, Node, Selection, Window};

use crate::selection::{Boundary, DocumentHost, FormSelection, HostError, RangeBoundaries, SelectionRect};

/// The page the content script runs in
pub struct WebPage {
    window: Window,
    document: Document,
}

fn dom_err(e: wasm_bindgen::JsValue) -> HostError {
    HostError::Dom(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

/// Length of a node in range-offset units
fn node_length(node: &Node) -> u32 {
    match node.node_type() {
        Node::TEXT_NODE | Node::CDATA_SECTION_NODE | Node::COMMENT_NODE | Node::PROCESSING_INSTRUCTION_NODE => node
            .node_value()
            .map(|v| v.encode_utf16().count() as u32)
            .unwrap_or(0),
        _ => node.child_nodes().length(),
    }
}

impl WebPage {
    pub fn current() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn selection(&self) -> Option<Selection> {
        self.window.get_selection().ok().flatten()
    }

    fn first_range(&self) -> Option<web_sys::Range> {
        let selection = self.selection()?;
        if selection.range_count() == 0 {
            return None;
        }
        selection.get_range_at(0).ok()
    }

    fn insert_text(&self, range: &web_sys::Range, text: &str) -> Result<(), HostError> {
        range.delete_contents().map_err(dom_err)?;
        let node = self.document.create_text_node(text);
        range.insert_node(&node).map_err(dom_err)
    }

    /// Notify page scripts that a control's value changed
    fn dispatch_input(element: &Element) {
        let init = web_sys::EventInit::new();
        init.set_bubbles(true);
        if let Ok(event) = web_sys::Event::new_with_event_init_dict("input", &init) {
            let _ = element.dispatch_event(&event);
        }
    }
}

impl DocumentHost for WebPage {
    type Node = Node;
    type Element = Element;

    fn selection_text(&self) -> String {
        self.selection().map(|s| String::from(s.to_string())).unwrap_or_default()
    }

    fn live_range(&self) -> Option<RangeBoundaries<Node>> {
        let range = self.first_range()?;
        Some(RangeBoundaries::new(
            Boundary::new(range.start_container().ok()?, range.start_offset().ok()?),
            Boundary::new(range.end_container().ok()?, range.end_offset().ok()?),
        ))
    }

    fn selection_element(&self) -> Option<Element> {
        self.selection()?.anchor_node()?.parent_element()
    }

    fn form_selection(&self) -> Option<FormSelection<Element>> {
        let active = self.document.active_element()?;
        let (value, start, end) = if let Some(input) = active.dyn_ref::<HtmlInputElement>() {
            (input.value(), input.selection_start().ok()??, input.selection_end().ok()??)
        } else if let Some(area) = active.dyn_ref::<HtmlTextAreaElement>() {
            (area.value(), area.selection_start().ok()??, area.selection_end().ok()??)
        } else {
            return None;
        };
        if start == end {
            return None;
        }
        Some(FormSelection {
            element: active,
            value,
            start,
            end,
        })
    }

    fn selection_rect(&self) -> Option<SelectionRect> {
        let rect = self.first_range()?.get_bounding_client_rect();
        Some(SelectionRect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        })
    }

    fn viewport_size(&self) -> (f64, f64) {
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (width, height)
    }

    fn is_form_control(&self, element: &Element) -> bool {
        element.is_instance_of::<HtmlInputElement>() || element.is_instance_of::<HtmlTextAreaElement>()
    }

    fn form_value(&self, element: &Element) -> Option<String> {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            Some(input.value())
        } else {
            element.dyn_ref::<HtmlTextAreaElement>().map(|area| area.value())
        }
    }

    fn boundaries_valid(&self, range: &RangeBoundaries<Node>) -> bool {
        [&range.start, &range.end]
            .iter()
            .all(|b| b.node.is_connected() && b.offset <= node_length(&b.node))
    }

    fn replace_range(&mut self, range: &RangeBoundaries<Node>, text: &str) -> Result<(), HostError> {
        let dom_range = self.document.create_range().map_err(dom_err)?;
        dom_range.set_start(&range.start.node, range.start.offset).map_err(dom_err)?;
        dom_range.set_end(&range.end.node, range.end.offset).map_err(dom_err)?;
        self.insert_text(&dom_range, text)
    }

    fn replace_live_selection(&mut self, text: &str) -> Result<(), HostError> {
        let range = self.first_range().ok_or(HostError::NoRange)?;
        self.insert_text(&range, text)
    }

    fn set_form_value(&mut self, element: &Element, value: &str) -> Result<(), HostError> {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else {
            return Err(HostError::NotFormControl);
        }
        Self::dispatch_input(element);
        Ok(())
    }

    fn replace_element_contents(&mut self, element: &Element, text: &str) -> Result<(), HostError> {
        if !element.is_connected() {
            return Err(HostError::StaleBoundary);
        }
        let range = self.document.create_range().map_err(dom_err)?;
        range.select_node_contents(element).map_err(dom_err)?;
        self.insert_text(&range, text)
    }

    fn clear_selection(&mut self) {
        if let Some(selection) = self.selection() {
            if let Err(e) = selection.remove_all_ranges() {
                log::warn!("Could not clear selection: {:?}", e);
            }
        }
    }
}
