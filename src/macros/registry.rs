//! Macro table with generation-stamped handles

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortcut placeholder meaning "no binding" in the persisted table
pub const SHORTCUT_NONE: &str = "None";

/// A single user-defined macro: a shortcut that sends `action` down the
/// serial line when fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroEntry {
    /// Human-readable name shown in confirmations (may be empty)
    #[serde(default)]
    pub label: String,
    /// Accelerator spec, e.g. "ctrl+shift+F1", or "None" when unbound
    #[serde(default)]
    pub shortcut: String,
    /// Raw action string in the escape grammar, compiled at fire time
    pub action: String,
}

impl MacroEntry {
    pub fn new(
        label: impl Into<String>,
        shortcut: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            shortcut: shortcut.into(),
            action: action.into(),
        }
    }

    /// Whether the entry carries a bindable shortcut spec
    pub fn has_shortcut(&self) -> bool {
        !self.shortcut.is_empty() && self.shortcut != SHORTCUT_NONE
    }

    /// Name used in the fire confirmation: the label, or the shortcut
    /// spec when the label is empty
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.shortcut
        } else {
            &self.label
        }
    }
}

/// Stable handle to a macro entry.
///
/// The epoch stamps the registry generation that issued the handle, so a
/// handle outlives a table replacement without ever resolving against the
/// wrong entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacroId {
    epoch: u64,
    index: usize,
}

impl MacroId {
    /// Position of the entry within its generation
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Errors from registry lookups
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Index past the end of the live macro table
    #[error("macro index {index} out of range (table holds {len})")]
    OutOfRange { index: usize, len: usize },
    /// Handle issued by a generation that has since been replaced
    #[error("stale macro handle from generation {epoch}")]
    StaleHandle { epoch: u64 },
}

/// Ordered collection of the configured macros
#[derive(Debug, Default)]
pub struct MacroRegistry {
    entries: Vec<MacroEntry>,
    epoch: u64,
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole table, invalidating every previously issued
    /// handle. Returns the old entries so the caller controls when they
    /// are dropped.
    pub fn replace(&mut self, entries: Vec<MacroEntry>) -> Vec<MacroEntry> {
        self.epoch += 1;
        std::mem::replace(&mut self.entries, entries)
    }

    /// Drop all entries, invalidating every previously issued handle
    pub fn clear(&mut self) -> Vec<MacroEntry> {
        self.replace(Vec::new())
    }

    /// Number of live entries
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, in load order
    pub fn get(&self, index: usize) -> Result<&MacroEntry, RegistryError> {
        self.entries.get(index).ok_or(RegistryError::OutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Handle for the entry at `index` in the current generation
    pub fn id_at(&self, index: usize) -> Result<MacroId, RegistryError> {
        if index < self.entries.len() {
            Ok(MacroId {
                epoch: self.epoch,
                index,
            })
        } else {
            Err(RegistryError::OutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }

    /// Resolve a handle issued by [`id_at`](Self::id_at)
    pub fn resolve(&self, id: MacroId) -> Result<&MacroEntry, RegistryError> {
        if id.epoch != self.epoch {
            return Err(RegistryError::StaleHandle { epoch: id.epoch });
        }
        self.get(id.index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MacroEntry> {
        self.entries.iter()
    }
}
