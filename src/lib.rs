//! serialpad
//!
//! Keyboard macro engine for serial terminals: global shortcuts bound to
//! user-defined byte sequences. Firing a shortcut compiles the macro's
//! action string (literal text, C-style escapes, hexadecimal byte
//! literals) into an exact byte buffer and writes it to the open serial
//! port, then surfaces a transient confirmation.
//!
//! # Features
//! - Escape-grammar compiler from action strings to byte buffers
//! - Generation-stamped macro registry with atomic bulk replace
//! - Global shortcut binding, with paired unbind on every replace
//! - TOML-persisted macro table and serial settings
//! - Transient confirmation message after every fire

pub mod core;
pub mod hotkey;
pub mod macros;
pub mod serial;

pub use crate::core::config::Config;
pub use crate::core::events::{AppEvent, ChannelNotifier};
pub use crate::macros::{
    parse_action, MacroContext, MacroEntry, MacroId, MacroRegistry, RegistryError,
};
pub use crate::serial::SerialLink;
