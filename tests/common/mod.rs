//! In-memory page for selection tests
//!
//! A flat document of elements, each holding text nodes, plus form controls
//! with a value. Offsets are character offsets; tests use ASCII text so
//! they match the UTF-16 offsets a browser would report.

#![allow(dead_code)]

use levelup_wasm::selection::{Boundary, DocumentHost, FormSelection, HostError, RangeBoundaries, SelectionRect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementId(pub usize);

struct TextNode {
    content: String,
    parent: ElementId,
    attached: bool,
}

struct FakeElement {
    form_value: Option<String>,
    attached: bool,
}

pub struct FakePage {
    texts: Vec<TextNode>,
    elements: Vec<FakeElement>,
    selection: Option<RangeBoundaries<NodeId>>,
    focused_form: Option<(ElementId, u32, u32)>,
    pub rect: Option<SelectionRect>,
    pub viewport: (f64, f64),
    pub input_events: usize,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            texts: Vec::new(),
            elements: Vec::new(),
            selection: None,
            focused_form: None,
            rect: Some(SelectionRect {
                left: 120.0,
                top: 300.0,
                width: 80.0,
                height: 18.0,
            }),
            viewport: (1280.0, 720.0),
            input_events: 0,
        }
    }

    /// Add a block element (e.g. `<p>`) with one text node per string
    pub fn add_block(&mut self, texts: &[&str]) -> (ElementId, Vec<NodeId>) {
        let element = ElementId(self.elements.len());
        self.elements.push(FakeElement {
            form_value: None,
            attached: true,
        });
        let nodes = texts
            .iter()
            .map(|t| {
                self.texts.push(TextNode {
                    content: t.to_string(),
                    parent: element,
                    attached: true,
                });
                NodeId(self.texts.len() - 1)
            })
            .collect();
        (element, nodes)
    }

    /// Add an `<input>`/`<textarea>` with a value
    pub fn add_form_control(&mut self, value: &str) -> ElementId {
        self.elements.push(FakeElement {
            form_value: Some(value.to_string()),
            attached: true,
        });
        ElementId(self.elements.len() - 1)
    }

    /// Select `[start, end)` within one text node
    pub fn select(&mut self, node: NodeId, start: u32, end: u32) {
        self.focused_form = None;
        self.selection = Some(RangeBoundaries::new(Boundary::new(node, start), Boundary::new(node, end)));
    }

    /// Select from one text node to another
    pub fn select_across(&mut self, start: (NodeId, u32), end: (NodeId, u32)) {
        self.focused_form = None;
        self.selection = Some(RangeBoundaries::new(
            Boundary::new(start.0, start.1),
            Boundary::new(end.0, end.1),
        ));
    }

    /// Focus a form control with `[start, end)` selected inside it
    pub fn select_in_form(&mut self, element: ElementId, start: u32, end: u32) {
        self.selection = None;
        self.focused_form = Some((element, start, end));
    }

    /// Collapse every selection
    pub fn deselect(&mut self) {
        self.selection = None;
        self.focused_form = None;
    }

    /// Detach a text node from the document, as a page script re-render would
    pub fn detach_node(&mut self, node: NodeId) {
        self.texts[node.0].attached = false;
    }

    pub fn detach_element(&mut self, element: ElementId) {
        self.elements[element.0].attached = false;
        for text in self.texts.iter_mut().filter(|t| t.parent == element) {
            text.attached = false;
        }
    }

    pub fn node_text(&self, node: NodeId) -> &str {
        &self.texts[node.0].content
    }

    /// Visible text of an element
    pub fn element_text(&self, element: ElementId) -> String {
        if let Some(value) = &self.elements[element.0].form_value {
            return value.clone();
        }
        self.texts
            .iter()
            .filter(|t| t.parent == element && t.attached)
            .map(|t| t.content.as_str())
            .collect()
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some() || self.focused_form.is_some()
    }

    fn node_len(&self, node: NodeId) -> u32 {
        self.texts[node.0].content.chars().count() as u32
    }

    fn valid(&self, range: &RangeBoundaries<NodeId>) -> bool {
        [&range.start, &range.end].iter().all(|b| {
            self.texts.get(b.node.0).map(|t| t.attached).unwrap_or(false) && b.offset <= self.node_len(b.node)
        })
    }

    fn range_text(&self, range: &RangeBoundaries<NodeId>) -> String {
        let (start, end) = (&range.start, &range.end);
        if start.node == end.node {
            return char_slice(&self.texts[start.node.0].content, start.offset, end.offset);
        }
        let mut out = char_slice(&self.texts[start.node.0].content, start.offset, self.node_len(start.node));
        for index in start.node.0 + 1..end.node.0 {
            out.push_str(&self.texts[index].content);
        }
        out.push_str(&char_slice(&self.texts[end.node.0].content, 0, end.offset));
        out
    }

    fn write_range(&mut self, range: &RangeBoundaries<NodeId>, text: &str) {
        let (start, end) = (range.start.clone(), range.end.clone());
        if start.node == end.node {
            let content = &self.texts[start.node.0].content;
            let updated = format!(
                "{}{}{}",
                char_slice(content, 0, start.offset),
                text,
                char_slice(content, end.offset, u32::MAX)
            );
            self.texts[start.node.0].content = updated;
            return;
        }
        let head = char_slice(&self.texts[start.node.0].content, 0, start.offset);
        self.texts[start.node.0].content = format!("{}{}", head, text);
        for index in start.node.0 + 1..end.node.0 {
            self.texts[index].content.clear();
        }
        let tail = char_slice(&self.texts[end.node.0].content, end.offset, u32::MAX);
        self.texts[end.node.0].content = tail;
    }
}

fn char_slice(s: &str, start: u32, end: u32) -> String {
    s.chars()
        .skip(start as usize)
        .take(end.saturating_sub(start) as usize)
        .collect()
}

impl DocumentHost for FakePage {
    type Node = NodeId;
    type Element = ElementId;

    fn selection_text(&self) -> String {
        match &self.selection {
            Some(range) if self.valid(range) => self.range_text(range),
            _ => String::new(),
        }
    }

    fn live_range(&self) -> Option<RangeBoundaries<NodeId>> {
        self.selection.clone().filter(|r| self.valid(r))
    }

    fn selection_element(&self) -> Option<ElementId> {
        let range = self.selection.as_ref()?;
        Some(self.texts[range.start.node.0].parent)
    }

    fn form_selection(&self) -> Option<FormSelection<ElementId>> {
        let (element, start, end) = self.focused_form?;
        if start == end {
            return None;
        }
        Some(FormSelection {
            element,
            value: self.elements[element.0].form_value.clone()?,
            start,
            end,
        })
    }

    fn selection_rect(&self) -> Option<SelectionRect> {
        self.selection.as_ref().and(self.rect)
    }

    fn viewport_size(&self) -> (f64, f64) {
        self.viewport
    }

    fn is_form_control(&self, element: &ElementId) -> bool {
        self.elements[element.0].form_value.is_some()
    }

    fn form_value(&self, element: &ElementId) -> Option<String> {
        self.elements[element.0].form_value.clone()
    }

    fn boundaries_valid(&self, range: &RangeBoundaries<NodeId>) -> bool {
        self.valid(range)
    }

    fn replace_range(&mut self, range: &RangeBoundaries<NodeId>, text: &str) -> Result<(), HostError> {
        if !self.valid(range) {
            return Err(HostError::StaleBoundary);
        }
        self.write_range(range, text);
        Ok(())
    }

    fn replace_live_selection(&mut self, text: &str) -> Result<(), HostError> {
        let range = self.live_range().ok_or(HostError::NoRange)?;
        self.write_range(&range, text);
        Ok(())
    }

    fn set_form_value(&mut self, element: &ElementId, value: &str) -> Result<(), HostError> {
        let el = &mut self.elements[element.0];
        match &mut el.form_value {
            Some(current) => {
                *current = value.to_string();
                self.input_events += 1;
                Ok(())
            }
            None => Err(HostError::NotFormControl),
        }
    }

    fn replace_element_contents(&mut self, element: &ElementId, text: &str) -> Result<(), HostError> {
        if !self.elements[element.0].attached {
            return Err(HostError::StaleBoundary);
        }
        let mut first = true;
        for node in self.texts.iter_mut().filter(|t| t.parent == *element && t.attached) {
            if first {
                node.content = text.to_string();
                first = false;
            } else {
                node.content.clear();
            }
        }
        if first {
            self.texts.push(TextNode {
                content: text.to_string(),
                parent: *element,
                attached: true,
            });
        }
        Ok(())
    }

    fn clear_selection(&mut self) {
        self.deselect();
    }
}
