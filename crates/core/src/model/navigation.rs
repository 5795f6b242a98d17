use phenomap_protocol::HeaderKey;
use serde::{Deserialize, Serialize};

use crate::config::Mode;

pub const ROOT_LABEL: &str = "Overview";

/// One breadcrumb. The root entry has no key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub key: Option<HeaderKey>,
    pub label: String,
}

impl Breadcrumb {
    pub fn root() -> Self {
        Self {
            key: None,
            label: ROOT_LABEL.to_string(),
        }
    }
}

/// The matrix slice reached by drilling into a column with `key`.
/// Integer keys drill in both modes; other keys only in ontological mode.
pub fn drill_target(key: &HeaderKey, mode: Mode) -> Option<HeaderKey> {
    match (key.as_int(), mode) {
        (Some(id), _) => Some(HeaderKey::Int(id)),
        (None, Mode::Ontological) => Some(key.clone()),
        (None, Mode::Procedural) => None,
    }
}

/// The detail type of a cell under a column with `key`. Cells react in
/// both modes, whether or not their column header drills down.
pub fn cell_type(key: &HeaderKey) -> Option<HeaderKey> {
    match (key.as_int(), key) {
        (Some(id), _) => Some(HeaderKey::Int(id)),
        (None, HeaderKey::Text(text)) if text.is_empty() => None,
        (None, _) => Some(key.clone()),
    }
}

/// Breadcrumb path through the annotation groupings. Re-entering a node
/// already on the path truncates back to it, so keys never repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationStack {
    entries: Vec<Breadcrumb>,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationStack {
    pub fn new() -> Self {
        Self {
            entries: vec![Breadcrumb::root()],
        }
    }

    /// Truncate to the topmost entry with `key`, or append a new entry.
    pub fn push(&mut self, key: HeaderKey, label: impl Into<String>) {
        let found = self
            .entries
            .iter()
            .rposition(|entry| entry.key.as_ref() == Some(&key));
        match found {
            Some(index) => {
                tracing::debug!(%key, depth = index, "breadcrumb truncated");
                self.entries.truncate(index + 1);
            }
            None => {
                let label = label.into();
                tracing::debug!(%key, %label, "breadcrumb pushed");
                self.entries.push(Breadcrumb {
                    key: Some(key),
                    label,
                });
            }
        }
    }

    /// Drop everything above the root.
    pub fn pop_to_root(&mut self) {
        self.entries.truncate(1);
    }

    pub fn reset(&mut self) {
        self.entries = vec![Breadcrumb::root()];
    }

    pub fn entries(&self) -> &[Breadcrumb] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the root entry is always present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key of the node currently displayed; `None` at the overview.
    pub fn current_key(&self) -> Option<&HeaderKey> {
        self.entries.last().and_then(|entry| entry.key.as_ref())
    }
}
