//! Dotted version numbers for `#ifver`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("empty version")]
    Empty,
    #[error("invalid version component '{0}'")]
    InvalidComponent(String),
    #[error("unknown comparison operator '{0}'")]
    UnknownOperator(String),
}

/// A version as a tuple of integers. Missing trailing components compare as 0,
/// so `1.18` equals `1.18.0`.
#[derive(Debug, Clone)]
pub struct Version(Vec<u64>);

impl Version {
    pub fn new(components: impl Into<Vec<u64>>) -> Self {
        Self(components.into())
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl FromStr for Version {
    type Err = VersionError;

    /// Each component keeps its leading digits, so `1.19.0+dev` reads as `1.19.0`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VersionError::Empty);
        }
        text.split('.')
            .map(|component| {
                let digits_end = component
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(component.len());
                component[..digits_end]
                    .parse::<u64>()
                    .map_err(|_| VersionError::InvalidComponent(component.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Version)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| {
                let a = self.0.get(i).copied().unwrap_or(0);
                let b = other.0.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FromStr for VersionOp {
    type Err = VersionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "=" | "==" => Ok(VersionOp::Eq),
            "!=" => Ok(VersionOp::Ne),
            "<" => Ok(VersionOp::Lt),
            "<=" => Ok(VersionOp::Le),
            ">" => Ok(VersionOp::Gt),
            ">=" => Ok(VersionOp::Ge),
            other => Err(VersionError::UnknownOperator(other.to_string())),
        }
    }
}

impl VersionOp {
    /// Whether `lhs OP rhs` holds.
    pub fn holds(&self, lhs: &Version, rhs: &Version) -> bool {
        let ordering = lhs.cmp(rhs);
        match self {
            VersionOp::Eq => ordering.is_eq(),
            VersionOp::Ne => ordering.is_ne(),
            VersionOp::Lt => ordering.is_lt(),
            VersionOp::Le => ordering.is_le(),
            VersionOp::Gt => ordering.is_gt(),
            VersionOp::Ge => ordering.is_ge(),
        }
    }
}
