use super::value::AttributeValue;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordNode {
    pub tag: String,
    pub attributes: IndexMap<String, AttributeValue>,
    pub children: Vec<RecordNode>,
}

impl RecordNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: RecordNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// The `id` attribute, whatever its type.
    pub fn id(&self) -> Option<String> {
        self.get("id").map(AttributeValue::to_string)
    }

    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a RecordNode> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// This node and its descendants with the given tag, depth first.
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a RecordNode> {
        let mut found = Vec::new();
        self.collect(tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, tag: &str, found: &mut Vec<&'a RecordNode>) {
        if self.tag == tag {
            found.push(self);
        }
        for child in &self.children {
            child.collect(tag, found);
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "\t".repeat(depth);
        writeln!(f, "{}[{}]", indent, self.tag)?;
        for (key, value) in &self.attributes {
            writeln!(f, "{}\t{}={}", indent, key, render_value(value))?;
        }
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        writeln!(f, "{}[/{}]", indent, self.tag)
    }
}

fn render_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::String(s)
            if s.contains(['"', '\n']) || s.trim() != s || s.parse::<i64>().is_ok() =>
        {
            format!("\"{}\"", s.replace('"', "\"\""))
        }
        other => other.to_string(),
    }
}

/// Writes the node back as tab-indented WML.
impl fmt::Display for RecordNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> RecordNode {
        RecordNode::new("unit_type")
            .with_attribute("id", "Elvish Fighter")
            .with_attribute("hitpoints", 33i64)
            .with_attribute("note", "say \"hi\"")
            .with_child(RecordNode::new("attack").with_attribute("damage", 5i64))
    }

    #[test]
    fn writes_tab_indented_wml() {
        assert_eq!(
            unit().to_string(),
            "[unit_type]\n\tid=Elvish Fighter\n\thitpoints=33\n\tnote=\"say \"\"hi\"\"\"\n\t[attack]\n\t\tdamage=5\n\t[/attack]\n[/unit_type]\n"
        );
    }

    #[test]
    fn finds_nested_nodes() {
        let root = RecordNode::new("units").with_child(unit()).with_child(unit());
        assert_eq!(root.find_all("attack").len(), 2);
        assert_eq!(root.children_named("unit_type").count(), 2);
        assert_eq!(root.children[0].id().as_deref(), Some("Elvish Fighter"));
        assert!(root.id().is_none());
    }

    #[test]
    fn serializes_attributes_in_source_order() {
        let json = serde_json::to_string(&unit()).unwrap();
        assert_eq!(
            json,
            r#"{"tag":"unit_type","attributes":{"id":"Elvish Fighter","hitpoints":33,"note":"say \"hi\""},"children":[{"tag":"attack","attributes":{"damage":5},"children":[]}]}"#
        );
    }
}
