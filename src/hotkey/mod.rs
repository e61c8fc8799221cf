//! Hotkey module - global shortcut binding and dispatch

mod handler;

pub use handler::{parse_hotkey, HotkeyBinder, HotkeyDispatcher};
