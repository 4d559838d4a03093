//! ==============================================================================
//! dom.rs - programmatic document tree and listener registry
//! ==============================================================================
//!
//! purpose:
//!     the views build their output as nodes instead of markup strings.
//!     text and attribute values are escaped only when serialized, so a
//!     button named `<b>"x"</b>` can never break the page.
//!
//! listeners:
//!     click handlers are registered per element id and carry a small
//!     view-model (Action). handlers whose element has left the tree are
//!     dropped whenever a subtree is replaced.
//!
//! relationships:
//!     - used by: views/* (render + dispatch), main.rs (text/html output)
//!     - uses: domain.rs (ids and pins inside the view-models)
//!
//! ==============================================================================

use crate::domain::ButtonId;
use std::collections::{HashMap, HashSet};

const VOID_TAGS: &[&str] = &["br", "input", "hr", "img", "meta"];
const BLOCK_TAGS: &[&str] = &["body", "div", "p", "h1", "h2", "h3", "form", "section", "select"];

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

impl Node {
    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&html_escape(t)),
            Node::Element(e) => e.write_html(out),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_string(), attrs: Vec::new(), children: Vec::new() }
    }

    // --- builders ---

    pub fn with_id(self, id: &str) -> Self {
        self.with_attr("id", id)
    }

    pub fn with_class(self, class: &str) -> Self {
        self.with_attr("class", class)
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// boolean attribute such as `selected` or `disabled`
    pub fn with_flag(self, name: &str) -> Self {
        self.with_attr(name, "")
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    // --- accessors ---

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|x| x == class))
            .unwrap_or(false)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn set_children(&mut self, children: Vec<Node>) -> Vec<Node> {
        std::mem::replace(&mut self.children, children)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    // --- search ---

    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find(pred))
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        for child in self.children.iter_mut() {
            if let Node::Element(e) = child {
                if let Some(found) = e.find_mut(pred) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if pred(self) {
            out.push(self);
        }
        for c in self.child_elements() {
            c.find_all(pred, out);
        }
    }

    pub fn by_id(&self, id: &str) -> Option<&Element> {
        self.find(&|e| e.id() == Some(id))
    }

    fn collect_ids(&self, out: &mut HashSet<String>) {
        if let Some(id) = self.id() {
            out.insert(id.to_string());
        }
        for c in self.child_elements() {
            c.collect_ids(out);
        }
    }

    // --- serialization ---

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for c in &self.children {
            c.write_html(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            if !v.is_empty() {
                out.push_str("=\"");
                out.push_str(&html_escape(v));
                out.push('"');
            }
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        for c in &self.children {
            c.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    /// concatenated text of all descendants, like the dom property
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for c in &self.children {
            match c {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => out.push_str(&e.text_content()),
            }
        }
        out
    }

    /// readable rendering for a terminal: one line per block, controls bracketed
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn write_text(&self, out: &mut String) {
        let block = BLOCK_TAGS.contains(&self.tag.as_str());
        if block {
            out.push('\n');
        }
        match self.tag.as_str() {
            "button" => {
                out.push_str(" [");
                out.push_str(self.text_content().trim());
                out.push_str("] ");
            }
            "input" => {
                out.push_str(" [");
                out.push_str(self.attr("value").unwrap_or(""));
                out.push_str("] ");
            }
            "option" => {
                let marker = if self.has_attr("selected") { "*" } else { "-" };
                out.push_str(&format!("\n  {} {}", marker, self.text_content().trim()));
                if self.has_attr("disabled") {
                    out.push_str(" (disabled)");
                }
            }
            _ => {
                for c in &self.children {
                    match c {
                        Node::Text(t) => {
                            let collapsed = t.split_whitespace().collect::<Vec<_>>().join(" ");
                            if !collapsed.is_empty() {
                                if !out.ends_with(['\n', ' ']) && !out.is_empty() {
                                    out.push(' ');
                                }
                                out.push_str(&collapsed);
                            }
                        }
                        Node::Element(e) => e.write_text(out),
                    }
                }
            }
        }
        if block {
            out.push('\n');
        }
    }
}

/// escape html special characters to prevent xss
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ==============================================================================
// view-models carried by listeners
// ==============================================================================

/// state a toggle button needs to flip itself
#[derive(Clone, Debug, PartialEq)]
pub struct ToggleModel {
    pub id: ButtonId,
    pub gpio_pin: u8,
    /// state currently shown
    pub state: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ButtonModel {
    pub id: ButtonId,
    pub name: String,
    pub gpio_pin: u8,
}

/// an open inline edit form and the markup it replaced
#[derive(Clone, Debug, PartialEq)]
pub struct EditModel {
    pub button: ButtonModel,
    pub original: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Toggle(ToggleModel),
    Edit(ButtonModel),
    Delete(ButtonId),
    SaveEdit(EditModel),
    CancelEdit,
    SubmitAdd,
}

// ==============================================================================
// document
// ==============================================================================

#[derive(Clone, Debug)]
pub struct Document {
    root: Element,
    listeners: HashMap<String, Action>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root, listeners: HashMap::new() }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.root.by_id(id)
    }

    /// mutable access for attribute and text updates; use
    /// `replace_children` when elements are removed
    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.root.find_mut(&|e| e.id() == Some(id))
    }

    /// replace an element's children, returning the old ones
    pub fn replace_children(&mut self, id: &str, children: Vec<Node>) -> Option<Vec<Node>> {
        let old = self.element_mut(id)?.set_children(children);
        self.prune_listeners();
        Some(old)
    }

    pub fn set_text(&mut self, id: &str, text: &str) -> bool {
        self.replace_children(id, vec![Node::Text(text.to_string())]).is_some()
    }

    /// first element with `class` whose `data-id` matches
    pub fn item(&self, class: &str, data_id: &str) -> Option<&Element> {
        self.root
            .find(&|e| e.has_class(class) && e.attr("data-id") == Some(data_id))
    }

    pub fn replace_item_children(
        &mut self,
        class: &str,
        data_id: &str,
        children: Vec<Node>,
    ) -> Option<Vec<Node>> {
        let old = self
            .root
            .find_mut(&|e| e.has_class(class) && e.attr("data-id") == Some(data_id))?
            .set_children(children);
        self.prune_listeners();
        Some(old)
    }

    // --- listeners ---

    pub fn on_click(&mut self, id: &str, action: Action) {
        self.listeners.insert(id.to_string(), action);
    }

    pub fn listener(&self, id: &str) -> Option<&Action> {
        self.listeners.get(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn prune_listeners(&mut self) {
        let mut ids = HashSet::new();
        self.root.collect_ids(&mut ids);
        self.listeners.retain(|id, _| ids.contains(id));
    }

    // --- form values ---

    /// current value of an input or select; `None` if the element is missing
    pub fn value_of(&self, id: &str) -> Option<String> {
        let el = self.element(id)?;
        let value = match el.tag() {
            "select" => {
                let options: Vec<&Element> = el.child_elements().filter(|o| o.tag() == "option").collect();
                options
                    .iter()
                    .find(|o| o.has_attr("selected"))
                    .or_else(|| options.first())
                    .and_then(|o| o.attr("value"))
                    .unwrap_or("")
                    .to_string()
            }
            _ => el.attr("value").unwrap_or("").to_string(),
        };
        Some(value)
    }

    /// set an input value or select the option carrying `value`
    pub fn set_value(&mut self, id: &str, value: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        if el.tag() == "select" {
            for child in el.children.iter_mut() {
                if let Node::Element(opt) = child {
                    if opt.attr("value") == Some(value) && !opt.has_attr("disabled") {
                        opt.set_attr("selected", "");
                    } else {
                        opt.remove_attr("selected");
                    }
                }
            }
        } else {
            el.set_attr("value", value);
        }
        true
    }

    /// clear every input and select inside a form
    pub fn reset_form(&mut self, form_id: &str) -> bool {
        let Some(form) = self.element(form_id) else {
            return false;
        };
        let mut fields = Vec::new();
        form.find_all(&|e| matches!(e.tag(), "input" | "select"), &mut fields);
        let ids: Vec<String> = fields.iter().filter_map(|f| f.id().map(str::to_string)).collect();
        for id in ids {
            self.set_value(&id, "");
        }
        true
    }

    pub fn to_html(&self) -> String {
        self.root.outer_html()
    }

    pub fn to_text(&self) -> String {
        self.root.render_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        Document::new(
            Element::new("body").with_child(
                Element::new("div")
                    .with_id("list")
                    .with_child(Element::new("button").with_id("b1").with_text("x")),
            ),
        )
    }

    #[test]
    fn test_escaping_text_and_attributes() {
        let el = Element::new("span")
            .with_attr("title", "a\"b'c")
            .with_text("<b>Tom & Jerry</b>");
        assert_eq!(
            el.outer_html(),
            "<span title=\"a&quot;b&#39;c\">&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;</span>"
        );
    }

    #[test]
    fn test_void_and_flag_attributes() {
        let el = Element::new("input").with_id("n").with_attr("value", "v").with_flag("required");
        assert_eq!(el.outer_html(), "<input id=\"n\" value=\"v\" required>");
    }

    #[test]
    fn test_replacing_children_drops_dead_listeners() {
        let mut doc = page();
        doc.on_click("b1", Action::CancelEdit);
        assert_eq!(doc.listener_count(), 1);
        doc.set_text("list", "gone");
        assert_eq!(doc.listener_count(), 0);
        assert_eq!(doc.element("list").map(|e| e.text_content()), Some("gone".to_string()));
    }

    #[test]
    fn test_select_value_defaults_to_first_option() {
        let mut doc = Document::new(
            Element::new("select")
                .with_id("pins")
                .with_child(Element::new("option").with_attr("value", "").with_text("pick"))
                .with_child(Element::new("option").with_attr("value", "4").with_text("GPIO 4")),
        );
        assert_eq!(doc.value_of("pins").as_deref(), Some(""));
        assert!(doc.set_value("pins", "4"));
        assert_eq!(doc.value_of("pins").as_deref(), Some("4"));
        doc.set_value("pins", "99");
        assert_eq!(doc.value_of("pins").as_deref(), Some(""));
    }

    #[test]
    fn test_item_lookup_by_data_id() {
        let mut doc = Document::new(
            Element::new("div")
                .with_child(Element::new("div").with_class("row").with_attr("data-id", "it's").with_text("a")),
        );
        assert!(doc.item("row", "it's").is_some());
        let old = doc.replace_item_children("row", "it's", vec![Node::from("b")]).unwrap();
        assert_eq!(old, vec![Node::Text("a".into())]);
        assert!(doc.item("row", "missing").is_none());
    }

    #[test]
    fn test_render_text_brackets_controls() {
        let doc = page();
        assert_eq!(doc.to_text(), "[x]");
    }
}
