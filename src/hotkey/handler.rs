//! Global hotkey registration and dispatch
//!
//! [`HotkeyBinder`] implements the trigger-binding seam over the OS
//! global-hotkey layer; [`HotkeyDispatcher`] drains hotkey events and
//! forwards macro fires onto the app event channel. The two halves share
//! the hotkey-id map so a binding installed through the context is
//! immediately routable.

use crate::core::events::AppEvent;
use crate::macros::{MacroId, TriggerBinder};
use anyhow::{anyhow, Context, Result};
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Binds accelerator specs to macro handles via the OS global-hotkey layer
pub struct HotkeyBinder {
    /// Kept alive for the lifetime of the registrations
    manager: GlobalHotKeyManager,
    /// Spec -> registered hotkey, needed again at unregister time
    bound: HashMap<String, HotKey>,
    /// Hotkey id -> macro handle, shared with the dispatcher
    targets: Arc<Mutex<HashMap<u32, MacroId>>>,
}

impl HotkeyBinder {
    pub fn new() -> Result<Self> {
        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;
        Ok(Self {
            manager,
            bound: HashMap::new(),
            targets: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Dispatcher half: shares the id map, owns the event sender
    pub fn dispatcher(&self, event_tx: mpsc::UnboundedSender<AppEvent>) -> HotkeyDispatcher {
        HotkeyDispatcher {
            targets: Arc::clone(&self.targets),
            event_tx,
        }
    }
}

impl TriggerBinder for HotkeyBinder {
    fn bind(&mut self, spec: &str, id: MacroId) -> Result<()> {
        let hotkey = parse_hotkey(spec).ok_or_else(|| anyhow!("Unparseable shortcut: {}", spec))?;

        // Last-registered wins: drop any previous binding for this spec
        if self.bound.contains_key(spec) {
            self.unbind(spec);
        }

        self.manager
            .register(hotkey)
            .with_context(|| format!("Failed to register shortcut {}", spec))?;
        self.targets.lock().insert(hotkey.id(), id);
        self.bound.insert(spec.to_string(), hotkey);
        info!("Registered shortcut {} for macro {}", spec, id.index());
        Ok(())
    }

    fn unbind(&mut self, spec: &str) {
        if let Some(hotkey) = self.bound.remove(spec) {
            if let Err(e) = self.manager.unregister(hotkey) {
                warn!("Failed to unregister shortcut {}: {}", spec, e);
            }
            self.targets.lock().remove(&hotkey.id());
            debug!("Unregistered shortcut {}", spec);
        }
    }
}

/// Drains global hotkey events and forwards macro fires to the app channel
pub struct HotkeyDispatcher {
    targets: Arc<Mutex<HashMap<u32, MacroId>>>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl HotkeyDispatcher {
    /// Process pending hotkey events (call from the event loop)
    pub fn process_events(&self) {
        while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            debug!("Hotkey event: {:?}", event);

            // Only respond to key press, not release
            if event.state != HotKeyState::Pressed {
                continue;
            }

            let target = self.targets.lock().get(&event.id).copied();
            if let Some(id) = target {
                if let Err(e) = self.event_tx.send(AppEvent::MacroTriggered(id)) {
                    error!("Failed to send macro trigger event: {}", e);
                }
            }
        }
    }
}

/// Parse an accelerator spec like "ctrl+shift+F1" into a HotKey
pub fn parse_hotkey(spec: &str) -> Option<HotKey> {
    let mut modifiers = Modifiers::empty();
    let mut code = None;

    for part in spec.split('+') {
        match part.trim().to_uppercase().as_str() {
            "CTRL" | "CONTROL" => modifiers |= Modifiers::CONTROL,
            "ALT" | "OPTION" => modifiers |= Modifiers::ALT,
            "SHIFT" => modifiers |= Modifiers::SHIFT,
            "SUPER" | "CMD" | "META" | "WIN" => modifiers |= Modifiers::META,
            key => {
                if code.is_some() {
                    warn!("Shortcut {} names more than one key", spec);
                    return None;
                }
                code = Some(parse_key(key, spec)?);
            }
        }
    }

    let code = code?;
    Some(HotKey::new(Some(modifiers), code))
}

/// Parse a single key name (already uppercased)
fn parse_key(key: &str, spec: &str) -> Option<Code> {
    let code = match key {
        "A" => Code::KeyA,
        "B" => Code::KeyB,
        "C" => Code::KeyC,
        "D" => Code::KeyD,
        "E" => Code::KeyE,
        "F" => Code::KeyF,
        "G" => Code::KeyG,
        "H" => Code::KeyH,
        "I" => Code::KeyI,
        "J" => Code::KeyJ,
        "K" => Code::KeyK,
        "L" => Code::KeyL,
        "M" => Code::KeyM,
        "N" => Code::KeyN,
        "O" => Code::KeyO,
        "P" => Code::KeyP,
        "Q" => Code::KeyQ,
        "R" => Code::KeyR,
        "S" => Code::KeyS,
        "T" => Code::KeyT,
        "U" => Code::KeyU,
        "V" => Code::KeyV,
        "W" => Code::KeyW,
        "X" => Code::KeyX,
        "Y" => Code::KeyY,
        "Z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "F1" => Code::F1,
        "F2" => Code::F2,
        "F3" => Code::F3,
        "F4" => Code::F4,
        "F5" => Code::F5,
        "F6" => Code::F6,
        "F7" => Code::F7,
        "F8" => Code::F8,
        "F9" => Code::F9,
        "F10" => Code::F10,
        "F11" => Code::F11,
        "F12" => Code::F12,
        "F13" => Code::F13,
        "F14" => Code::F14,
        "F15" => Code::F15,
        "F16" => Code::F16,
        "F17" => Code::F17,
        "F18" => Code::F18,
        "F19" => Code::F19,
        "F20" => Code::F20,
        "F21" => Code::F21,
        "F22" => Code::F22,
        "F23" => Code::F23,
        "F24" => Code::F24,
        "ENTER" | "RETURN" => Code::Enter,
        "TAB" => Code::Tab,
        "SPACE" => Code::Space,
        "ESC" | "ESCAPE" => Code::Escape,
        "BACKSPACE" => Code::Backspace,
        "DELETE" | "DEL" => Code::Delete,
        "INSERT" => Code::Insert,
        "HOME" => Code::Home,
        "END" => Code::End,
        "PAGEUP" => Code::PageUp,
        "PAGEDOWN" => Code::PageDown,
        "UP" => Code::ArrowUp,
        "DOWN" => Code::ArrowDown,
        "LEFT" => Code::ArrowLeft,
        "RIGHT" => Code::ArrowRight,
        _ => {
            warn!("Unknown key name {} in shortcut {}", key, spec);
            return None;
        }
    };

    Some(code)
}
