//! Macro engine - escape compiler, registry, and firing lifecycle

mod context;
mod escape;
mod registry;

pub use context::{MacroContext, Notifier, Transport, TriggerBinder};
pub use escape::parse_action;
pub use registry::{MacroEntry, MacroId, MacroRegistry, RegistryError, SHORTCUT_NONE};
