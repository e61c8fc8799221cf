//! Application event definitions

use crate::macros::{MacroId, Notifier};
use std::time::Duration;
use tokio::sync::mpsc;

/// Application-wide events for inter-module communication
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A bound shortcut fired for this macro
    MacroTriggered(MacroId),

    /// Transient status message with an advisory display duration
    Notice { text: String, duration: Duration },
}

/// Notifier that forwards confirmations onto the app event channel
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, text: &str, duration: Duration) {
        let _ = self.tx.send(AppEvent::Notice {
            text: text.to_string(),
            duration,
        });
    }
}
