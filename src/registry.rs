//! Process-once registry of annotated elements and their dispatch state.

use std::collections::HashMap;

use crate::dom::{Document, NodeId};

/// Per-element dispatch state.
///
/// `Done` is reached once a handler ran (or the element was short-circuited); re-entry is
/// prevented by the registry entry itself, not by this state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementState {
    /// Seen and marked, not yet classified.
    Registered,
    /// Admitted to the CSS tier.
    CssActive,
    /// Waiting for the engine to finish loading.
    AwaitingEngine,
    /// Engine handler running.
    EngineActive,
    /// Terminal.
    Done,
}

/// Which elements have been registered for dispatch.
///
/// Entries are keyed by generational [`NodeId`], so the registry never keeps a node alive: once a
/// node is disposed its entry simply stops matching anything, and [`Self::prune`] drops it.
#[derive(Clone, Debug, Default)]
pub struct ElementRegistry {
    entries: HashMap<NodeId, ElementState>,
}

impl ElementRegistry {
    /// `true` when `el` already has a processing record.
    pub fn has_processed(&self, el: NodeId) -> bool {
        self.entries.contains_key(&el)
    }

    /// Check-then-mark in one step. Returns `false` (and changes nothing) when `el` was already
    /// registered.
    pub fn mark_processed(&mut self, el: NodeId) -> bool {
        if self.entries.contains_key(&el) {
            return false;
        }
        self.entries.insert(el, ElementState::Registered);
        true
    }

    /// Current state of a registered element.
    pub fn state(&self, el: NodeId) -> Option<ElementState> {
        self.entries.get(&el).copied()
    }

    /// Move a registered element to `state`. Unregistered elements are ignored.
    pub fn set_state(&mut self, el: NodeId, state: ElementState) {
        if let Some(s) = self.entries.get_mut(&el) {
            *s = state;
        }
    }

    /// Elements currently in `state`, in no particular order.
    pub fn in_state(&self, state: ElementState) -> Vec<NodeId> {
        self.entries
            .iter()
            .filter(|(_, s)| **s == state)
            .map(|(n, _)| *n)
            .collect()
    }

    /// Number of processing records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries whose node no longer exists.
    pub fn prune(&mut self, doc: &Document) {
        self.entries.retain(|n, _| doc.contains(*n));
    }

    /// Forget everything (teardown).
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "../tests/unit/registry/registry.rs"]
mod tests;
