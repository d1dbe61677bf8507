//! Conditional inclusion stack.

use super::directive::DirectiveKind;
use crate::wml::location::SourceSite;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    Ifdef,
    Ifndef,
    Ifhave,
    Ifnhave,
    Ifver,
    Ifnver,
}

impl ConditionalKind {
    pub fn from_directive(kind: DirectiveKind) -> Option<Self> {
        match kind {
            DirectiveKind::Ifdef => Some(ConditionalKind::Ifdef),
            DirectiveKind::Ifndef => Some(ConditionalKind::Ifndef),
            DirectiveKind::Ifhave => Some(ConditionalKind::Ifhave),
            DirectiveKind::Ifnhave => Some(ConditionalKind::Ifnhave),
            DirectiveKind::Ifver => Some(ConditionalKind::Ifver),
            DirectiveKind::Ifnver => Some(ConditionalKind::Ifnver),
            _ => None,
        }
    }

    /// The `n` forms emit their content when the test fails.
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            ConditionalKind::Ifndef | ConditionalKind::Ifnhave | ConditionalKind::Ifnver
        )
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ConditionalKind::Ifdef => "ifdef",
            ConditionalKind::Ifndef => "ifndef",
            ConditionalKind::Ifhave => "ifhave",
            ConditionalKind::Ifnhave => "ifnhave",
            ConditionalKind::Ifver => "ifver",
            ConditionalKind::Ifnver => "ifnver",
        }
    }
}

impl fmt::Display for ConditionalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalFrame {
    pub kind: ConditionalKind,
    pub active: bool,
    /// Set once the frame's `#else` has been seen.
    pub else_seen: bool,
    pub site: SourceSite,
}

/// Content is emitted only while every frame is active.
#[derive(Debug, Clone, Default)]
pub struct ConditionalStack {
    frames: Vec<ConditionalFrame>,
}

impl ConditionalStack {
    pub fn push(&mut self, frame: ConditionalFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<ConditionalFrame> {
        self.frames.pop()
    }

    /// `#else`: inverts the innermost frame. Returns false on an empty stack or
    /// when the frame already had its `#else`.
    pub fn flip(&mut self) -> bool {
        match self.frames.last_mut() {
            Some(frame) if !frame.else_seen => {
                frame.active = !frame.active;
                frame.else_seen = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.frames.iter().all(|frame| frame.active)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drops frames above `depth`, returning the outermost one dropped.
    pub fn truncate(&mut self, depth: usize) -> Option<ConditionalFrame> {
        if self.frames.len() <= depth {
            return None;
        }
        self.frames.drain(depth..).next()
    }
}
