use crate::wml::location::SourceSite;
use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: String,
    /// Body text between the header line and `#enddef`, minus `#arg` blocks.
    pub body: String,
    pub params: Vec<String>,
    /// Keyword parameters and their default text, in declaration order.
    pub defaults: IndexMap<String, String>,
    pub doc: Option<String>,
    pub textdomain: Option<String>,
    /// Where the `#define` line is.
    pub site: SourceSite,
}

impl MacroDefinition {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            params: Vec::new(),
            defaults: IndexMap::new(),
            doc: None,
            textdomain: None,
            site: SourceSite::default(),
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_site(mut self, site: SourceSite) -> Self {
        self.site = site;
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// `NAME[p1, p2, key=default]`, or just `NAME` for a macro without parameters.
    pub fn signature(&self) -> String {
        if self.params.is_empty() && self.defaults.is_empty() {
            return self.name.clone();
        }
        let params = self
            .params
            .iter()
            .cloned()
            .chain(self.defaults.iter().map(|(k, v)| format!("{}={}", k, v.trim())));
        format!("{}[{}]", self.name, params.collect::<Vec<_>>().join(", "))
    }

    /// Fills the body template.
    ///
    /// `positional` must hold exactly [arity](Self::arity) values. Keyword parameters
    /// take the value from `keywords` when supplied there and their default otherwise.
    /// Only `{NAME}` placeholders naming a parameter are replaced; the body is scanned
    /// once, so placeholders inside substituted values are left for the next pass.
    pub fn substitute(&self, positional: &[String], keywords: &IndexMap<String, String>) -> String {
        let value_of = |name: &str| -> Option<&str> {
            if let Some(i) = self.params.iter().position(|p| p == name) {
                return positional.get(i).map(String::as_str);
            }
            if self.defaults.contains_key(name) {
                return keywords
                    .get(name)
                    .or_else(|| self.defaults.get(name))
                    .map(String::as_str);
            }
            None
        };

        let mut expanded = String::with_capacity(self.body.len());
        let mut rest = self.body.as_str();
        while let Some(open) = rest.find('{') {
            expanded.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => match value_of(&after[..close]) {
                    Some(value) => {
                        expanded.push_str(value);
                        rest = &after[close + 1..];
                    }
                    None => {
                        expanded.push('{');
                        rest = after;
                    }
                },
                None => {
                    expanded.push('{');
                    rest = after;
                }
            }
        }
        expanded.push_str(rest);
        expanded
    }
}

impl fmt::Display for MacroDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#define {}", self.name)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        writeln!(f)?;
        for (name, value) in &self.defaults {
            writeln!(f, "#arg {}\n{}\n#endarg", name, value)?;
        }
        write!(f, "{}#enddef", self.body)
    }
}
