//! Structured diagnostic addenda for type-relation queries.
//!
//! When an assignability query fails, the engine records *why* as a tree of
//! message strings: each recursive comparison that contributes to the failure
//! appends its reason to a child addendum. The tree is write-only during a
//! query; on failure the caller attaches it to its own diagnostic sink, on
//! success it is dropped. Formatting into user-facing text is the caller's
//! job; this type only flattens to indented lines on request.

use crate::limits::MAX_DIAGNOSTIC_DEPTH;
use serde::Serialize;

/// A tree of structured failure reasons produced by a type query.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DiagnosticAddendum {
    messages: Vec<String>,
    children: Vec<DiagnosticAddendum>,
}

impl DiagnosticAddendum {
    pub fn new() -> Self {
        DiagnosticAddendum {
            messages: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append a message to this node.
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Create a child addendum and return a mutable handle to it.
    ///
    /// Children created speculatively and never written to are harmless;
    /// they contribute no messages and are skipped when rendering.
    pub fn create_addendum(&mut self) -> &mut DiagnosticAddendum {
        self.children.push(DiagnosticAddendum::new());
        let index = self.children.len() - 1;
        &mut self.children[index]
    }

    /// Graft an independently built addendum onto this node.
    ///
    /// Used when a caller probes alternatives into a scratch addendum and
    /// only attaches the surviving one (e.g. union-destination matching).
    pub fn add_addendum(&mut self, addendum: DiagnosticAddendum) {
        self.children.push(addendum);
    }

    /// Total number of messages in this node and all descendants.
    pub fn message_count(&self) -> usize {
        self.messages.len()
            + self
                .children
                .iter()
                .map(DiagnosticAddendum::message_count)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.message_count() == 0
    }

    /// Flatten the tree into indented display lines, one level of indentation
    /// per tree depth, skipping empty subtrees. Rendering stops at
    /// [`MAX_DIAGNOSTIC_DEPTH`]; the tree itself is unbounded.
    pub fn flatten(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.flatten_into(&mut lines, 0);
        lines
    }

    fn flatten_into(&self, lines: &mut Vec<String>, depth: u32) {
        if depth > MAX_DIAGNOSTIC_DEPTH {
            return;
        }
        for message in &self.messages {
            let indent = "  ".repeat(depth as usize);
            lines.push(format!("{indent}{message}"));
        }
        for child in &self.children {
            if !child.is_empty() {
                // Children indent under their parent's messages; a node that
                // carries no message of its own does not add a level.
                let child_depth = if self.messages.is_empty() {
                    depth
                } else {
                    depth + 1
                };
                child.flatten_into(lines, child_depth);
            }
        }
    }
}
