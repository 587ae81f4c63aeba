#![forbid(unsafe_code)]

//! Minimal HTML-like markup for [`NodeTree`].
//!
//! The format covers what a rich-text note needs and nothing more:
//!
//! - elements with lowercase ASCII tag names and double-quoted attributes
//! - void `br`/`hr` elements (`<br>` or `<br/>`), any element may self-close
//! - text with `&amp; &lt; &gt; &quot; &apos; &nbsp;` and numeric references
//!
//! Serialization covers the root's children only (the root is the editable
//! container itself), so `from_markup(tree.to_markup())` rebuilds an
//! equivalent tree. Adjacent text runs merge into one text node on parse.

use crate::error::MarkupError;
use crate::tree::{NodeId, NodeKind, NodeTree};

const VOID_TAGS: &[&str] = &["br", "hr"];

fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

impl NodeTree {
    /// Serialize the children of the root.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root()) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize one node and its subtree.
    #[must_use]
    pub fn node_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => escape_into(text, false, out),
            Some(NodeKind::Element { tag, attrs }) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                let children = self.children(id);
                if is_void(tag) && children.is_empty() {
                    return;
                }
                for &child in children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            None => {}
        }
    }

    /// Parse markup into a fresh tree whose root holds the parsed nodes.
    pub fn from_markup(input: &str) -> Result<NodeTree, MarkupError> {
        Parser::new(input).run()
    }
}

fn escape_into(raw: &str, attribute: bool, out: &mut String) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    tree: NodeTree,
    /// Open elements; the root is always at the bottom.
    stack: Vec<NodeId>,
    text: String,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        let tree = NodeTree::new();
        let root = tree.root();
        Self {
            input,
            pos: 0,
            tree,
            stack: vec![root],
            text: String::new(),
        }
    }

    fn run(mut self) -> Result<NodeTree, MarkupError> {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("</") {
                self.flush_text()?;
                self.close_tag()?;
            } else if rest.starts_with('<') {
                self.flush_text()?;
                self.open_tag()?;
            } else if rest.starts_with('&') {
                let ch = self.entity()?;
                self.text.push(ch);
            } else {
                let end = rest.find(['<', '&']).unwrap_or(rest.len());
                self.text.push_str(&rest[..end]);
                self.pos += end;
            }
        }
        self.flush_text()?;

        if self.stack.len() > 1 {
            let top = self.current();
            let tag = self.tree.tag(top).unwrap_or_default().to_owned();
            return Err(MarkupError::Unclosed { tag });
        }
        Ok(self.tree)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.tree.root())
    }

    fn flush_text(&mut self) -> Result<(), MarkupError> {
        if self.text.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.text);
        let parent = self.current();
        self.tree.append_text(parent, text)?;
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn name(&mut self, extra: &[char]) -> String {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || extra.contains(&c)))
            .unwrap_or(rest.len());
        self.pos += end;
        rest[..end].to_ascii_lowercase()
    }

    fn open_tag(&mut self) -> Result<(), MarkupError> {
        let start = self.pos;
        self.pos += 1;
        let tag = self.name(&['-']);
        if tag.is_empty() {
            return Err(MarkupError::InvalidTagName { position: start });
        }
        let parent = self.current();
        let element = self.tree.append_element(parent, tag.as_str())?;

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(MarkupError::UnexpectedEof { position: self.pos });
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                return Ok(());
            }
            if rest.starts_with('>') {
                self.pos += 1;
                if !is_void(&tag) {
                    self.stack.push(element);
                }
                return Ok(());
            }
            let (name, value) = self.attribute()?;
            self.tree.set_attr(element, name, value)?;
        }
    }

    fn attribute(&mut self) -> Result<(String, String), MarkupError> {
        let start = self.pos;
        let name = self.name(&['-', '_', ':']);
        if name.is_empty() {
            return Err(MarkupError::MalformedAttribute { position: start });
        }
        self.skip_whitespace();
        if !self.rest().starts_with('=') {
            return Ok((name, String::new()));
        }
        self.pos += 1;
        self.skip_whitespace();
        if self.rest().is_empty() {
            return Err(MarkupError::UnexpectedEof { position: self.pos });
        }
        if !self.rest().starts_with('"') {
            return Err(MarkupError::MalformedAttribute { position: self.pos });
        }
        self.pos += 1;

        let mut value = String::new();
        loop {
            let rest = self.rest();
            match rest.find(['"', '&']) {
                None => return Err(MarkupError::UnexpectedEof { position: self.input.len() }),
                Some(i) if rest.as_bytes()[i] == b'"' => {
                    value.push_str(&rest[..i]);
                    self.pos += i + 1;
                    return Ok((name, value));
                }
                Some(i) => {
                    value.push_str(&rest[..i]);
                    self.pos += i;
                    value.push(self.entity()?);
                }
            }
        }
    }

    fn close_tag(&mut self) -> Result<(), MarkupError> {
        let start = self.pos;
        self.pos += 2;
        let found = self.name(&['-']);
        if found.is_empty() {
            return Err(MarkupError::InvalidTagName { position: start });
        }
        self.skip_whitespace();
        match self.rest().chars().next() {
            None => return Err(MarkupError::UnexpectedEof { position: self.pos }),
            Some('>') => self.pos += 1,
            Some(_) => return Err(MarkupError::InvalidTagName { position: start }),
        }

        if is_void(&found) {
            return Ok(());
        }
        if self.stack.len() <= 1 {
            return Err(MarkupError::UnexpectedClose {
                found,
                position: start,
            });
        }
        let top = self.current();
        let expected = self.tree.tag(top).unwrap_or_default();
        if expected != found {
            return Err(MarkupError::MismatchedClose {
                expected: expected.to_owned(),
                found,
                position: start,
            });
        }
        self.stack.pop();
        Ok(())
    }

    /// Decode a character reference starting at `&`.
    fn entity(&mut self) -> Result<char, MarkupError> {
        let start = self.pos;
        let rest = self.rest();
        let Some(end) = rest
            .char_indices()
            .take(12)
            .find(|&(_, c)| c == ';')
            .map(|(i, _)| i)
        else {
            return Err(MarkupError::UnknownEntity { position: start });
        };
        let name = &rest[1..end];
        let ch = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => numeric_reference(name),
        };
        let ch = ch.ok_or(MarkupError::UnknownEntity { position: start })?;
        self.pos += end + 1;
        Ok(ch)
    }
}

fn numeric_reference(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(markup: &str) -> String {
        NodeTree::from_markup(markup).unwrap().to_markup()
    }

    #[test]
    fn parses_nested_elements() {
        let tree = NodeTree::from_markup("<p>Hello <b>world</b></p>").unwrap();
        let root = tree.root();
        let p = tree.children(root)[0];
        assert_eq!(tree.tag(p), Some("p"));
        assert_eq!(tree.children(p).len(), 2);
        let b = tree.children(p)[1];
        assert_eq!(tree.text_content(b), "world");
    }

    #[test]
    fn serializes_back_verbatim() {
        for markup in [
            "A",
            "<p>one</p><p>two</p>",
            "<ul><li>a</li><li>b</li></ul>",
            "<p style=\"text-align: center\">x<br>y</p>",
            "<h1>Welcome</h1><br><p>text</p>",
        ] {
            assert_eq!(round_trip(markup), markup);
        }
    }

    #[test]
    fn void_and_self_closing_elements() {
        assert_eq!(round_trip("a<br/>b<hr>c"), "a<br>b<hr>c");
        assert_eq!(round_trip("<span/>"), "<span></span>");
        assert_eq!(round_trip("a</br>b"), "ab");
    }

    #[test]
    fn entities_decode_and_reencode() {
        let tree = NodeTree::from_markup("a &amp; b &lt;c&gt; &#65;&#x42; &quot;").unwrap();
        let text = tree.children(tree.root())[0];
        assert_eq!(tree.text(text), Some("a & b <c> AB \""));
        assert_eq!(tree.to_markup(), "a &amp; b &lt;c&gt; AB \"");
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut tree = NodeTree::new();
        let p = tree.append_element(tree.root(), "p").unwrap();
        tree.set_attr(p, "title", "say \"hi\" & go").unwrap();
        let markup = tree.to_markup();
        assert_eq!(markup, "<p title=\"say &quot;hi&quot; &amp; go\"></p>");
        let back = NodeTree::from_markup(&markup).unwrap();
        let p2 = back.children(back.root())[0];
        assert_eq!(back.attr(p2, "title"), Some("say \"hi\" & go"));
    }

    #[test]
    fn tag_names_are_lowercased() {
        assert_eq!(round_trip("<P>x</p>"), "<p>x</p>");
    }

    #[test]
    fn boolean_attribute_gets_empty_value() {
        assert_eq!(round_trip("<p hidden>x</p>"), "<p hidden=\"\">x</p>");
    }

    #[test]
    fn rejects_mismatched_close() {
        let err = NodeTree::from_markup("<p><b>x</p>").unwrap_err();
        assert_eq!(
            err,
            MarkupError::MismatchedClose {
                expected: "b".into(),
                found: "p".into(),
                position: 7,
            }
        );
    }

    #[test]
    fn rejects_unclosed_and_stray_close() {
        assert_eq!(
            NodeTree::from_markup("<p>x").unwrap_err(),
            MarkupError::Unclosed { tag: "p".into() }
        );
        assert!(matches!(
            NodeTree::from_markup("x</p>").unwrap_err(),
            MarkupError::UnexpectedClose { .. }
        ));
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(matches!(
            NodeTree::from_markup("<p class=\"a").unwrap_err(),
            MarkupError::UnexpectedEof { .. }
        ));
        assert!(matches!(
            NodeTree::from_markup("<p").unwrap_err(),
            MarkupError::UnexpectedEof { .. }
        ));
        assert!(matches!(
            NodeTree::from_markup("< p>").unwrap_err(),
            MarkupError::InvalidTagName { position: 0 }
        ));
    }

    #[test]
    fn rejects_unknown_entity() {
        assert_eq!(
            NodeTree::from_markup("a &bogus; b").unwrap_err(),
            MarkupError::UnknownEntity { position: 2 }
        );
        assert!(NodeTree::from_markup("fish & chips").is_err());
    }

    #[test]
    fn empty_input_is_empty_document() {
        let tree = NodeTree::from_markup("").unwrap();
        assert!(tree.children(tree.root()).is_empty());
        assert_eq!(tree.to_markup(), "");
    }
}
