//! Record extraction from preprocessed output.

use super::node::RecordNode;
use super::value::AttributeValue;
use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\+?([A-Za-z0-9_]+)\]$").expect("open tag pattern is valid"));
static CLOSE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[/([A-Za-z0-9_]+)\]$").expect("close tag pattern is valid"));
static KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("key pattern is valid"));

/// Reads the top-level records of a preprocessed text.
///
/// `[+tag]` blocks are read as `tag` blocks. A closing tag that does not match the
/// innermost open block closes blocks up to the matching one; a closing tag with no
/// open match is ignored, and blocks still open at the end are closed there.
/// Attributes outside any block are dropped.
pub fn extract_records(text: &str) -> Vec<RecordNode> {
    let mut extractor = Extractor::default();
    for line in text.lines() {
        extractor.line(line);
    }
    extractor.finish()
}

#[derive(Default)]
struct Extractor {
    stack: Vec<RecordNode>,
    roots: Vec<RecordNode>,
    /// Attribute whose quoted or raw value continues on the next line.
    pending: Option<(String, String)>,
}

impl Extractor {
    fn line(&mut self, line: &str) {
        if let Some((key, mut value)) = self.pending.take() {
            value.push('\n');
            value.push_str(line);
            self.attribute(key, value);
            return;
        }

        let trimmed = line.trim();
        if let Some(caps) = OPEN_TAG.captures(trimmed) {
            self.stack.push(RecordNode::new(&caps[1]));
        } else if let Some(caps) = CLOSE_TAG.captures(trimmed) {
            self.close(&caps[1]);
        } else if let Some((key, value)) = trimmed.split_once('=') {
            let key = key.trim();
            if KEY.is_match(key) {
                self.attribute(key.to_string(), value.trim_start().to_string());
            }
        }
    }

    fn attribute(&mut self, key: String, value: String) {
        if !is_complete(&value) {
            self.pending = Some((key, value));
            return;
        }
        if let Some(node) = self.stack.last_mut() {
            node.attributes.insert(key, AttributeValue::parse(&value));
        }
    }

    fn close(&mut self, tag: &str) {
        if !self.stack.iter().any(|node| node.tag == tag) {
            return;
        }
        while let Some(node) = self.stack.pop() {
            let done = node.tag == tag;
            self.attach(node);
            if done {
                break;
            }
        }
    }

    fn attach(&mut self, node: RecordNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn finish(mut self) -> Vec<RecordNode> {
        if let Some((key, value)) = self.pending.take() {
            if let Some(node) = self.stack.last_mut() {
                node.attributes.insert(key, AttributeValue::String(value));
            }
        }
        while let Some(node) = self.stack.pop() {
            self.attach(node);
        }
        self.roots
    }
}

/// Whether every `"..."` and `<<...>>` in the value is closed.
fn is_complete(value: &str) -> bool {
    let mut in_quotes = false;
    let mut in_raw = false;
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '>' if in_raw && chars.peek() == Some(&'>') => {
                chars.next();
                in_raw = false;
            }
            '<' if !in_quotes && !in_raw && chars.peek() == Some(&'<') => {
                chars.next();
                in_raw = true;
            }
            '"' if !in_raw => in_quotes = !in_quotes,
            _ => {}
        }
    }
    !in_quotes && !in_raw
}
