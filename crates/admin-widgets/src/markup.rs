//! In-memory element tree rendered by widgets.
//!
//! Widgets write into an [`Element`] owned by the caller. The tree
//! serializes to HTML with [`Element::to_html`]; text and attribute values
//! are escaped on output, so widgets never build markup strings by hand.

use admin_model::escape_html;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Builder form of [`Element::set_attr`].
    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::add_class`].
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    #[must_use]
    pub fn child(mut self, element: Element) -> Self {
        self.children.push(Node::Element(element));
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }

    /// Add each whitespace separated class not already present.
    pub fn add_class(&mut self, classes: &str) {
        let mut current: Vec<String> = self
            .get_attr("class")
            .map(|existing| existing.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        for class in classes.split_whitespace() {
            if !current.iter().any(|existing| existing == class) {
                current.push(class.to_string());
            }
        }
        self.set_attr("class", current.join(" "));
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn push(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Drop all children and attributes, keeping the tag.
    pub fn clear(&mut self) {
        self.attrs.clear();
        self.children.clear();
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First descendant (depth first) with the given tag.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        for element in self.elements() {
            if element.tag == tag {
                return Some(element);
            }
            if let Some(found) = element.find(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// HTML of the children only, as `innerHTML` would report it.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.write_html(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        for node in &self.children {
            node.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl Node {
    fn write_html(&self, out: &mut String) {
        match self {
            Self::Element(element) => element.write_html(out),
            Self::Text(text) => out.push_str(&escape_html(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_elements() {
        let element = Element::new("div")
            .class("row")
            .child(Element::new("span").text("a < b"))
            .child(Element::new("input").attr("value", "\"x\""));
        assert_eq!(
            element.to_html(),
            "<div class=\"row\"><span>a &lt; b</span><input value=\"&quot;x&quot;\"></div>"
        );
    }

    #[test]
    fn classes_are_deduplicated() {
        let mut element = Element::new("p").class("a b");
        element.add_class("b c");
        assert_eq!(element.get_attr("class"), Some("a b c"));
        assert!(element.has_class("c"));
    }

    #[test]
    fn clear_resets_content() {
        let mut element = Element::new("td").class("x").text("old");
        element.clear();
        element.push_text("new");
        assert_eq!(element.to_html(), "<td>new</td>");
    }
}
