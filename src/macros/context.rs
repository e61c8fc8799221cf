//! Macro lifecycle: install, fire, tear down
//!
//! [`MacroContext`] is owned by the application root and wires the
//! registry to its three collaborators: the trigger binder (global
//! shortcuts), the transport (serial line) and the notifier (transient
//! status messages). All mutation funnels through it, so the
//! unbind-then-free ordering holds across every table replacement.

use super::escape::parse_action;
use super::registry::{MacroEntry, MacroId, MacroRegistry, RegistryError};
use std::time::Duration;
use tracing::{debug, warn};

/// Registers and removes global trigger bindings for macro handles.
///
/// Every successful `bind` must see a matching `unbind` before the entry
/// behind the handle is dropped.
pub trait TriggerBinder {
    fn bind(&mut self, spec: &str, id: MacroId) -> anyhow::Result<()>;
    fn unbind(&mut self, spec: &str);
}

/// Emits raw bytes on the open serial connection. Best effort: callers
/// do not inspect the outcome.
pub trait Transport {
    fn send(&mut self, bytes: &[u8]);
}

/// Surfaces a transient confirmation message; `duration` is advisory
/// display time.
pub trait Notifier {
    fn notify(&self, text: &str, duration: Duration);
}

/// Owns the macro table and drives its lifecycle against the collaborator
/// seams.
pub struct MacroContext {
    registry: MacroRegistry,
    binder: Box<dyn TriggerBinder>,
    transport: Box<dyn Transport>,
    notifier: Box<dyn Notifier>,
    confirmation: Duration,
}

impl MacroContext {
    pub fn new(
        binder: Box<dyn TriggerBinder>,
        transport: Box<dyn Transport>,
        notifier: Box<dyn Notifier>,
        confirmation: Duration,
    ) -> Self {
        Self {
            registry: MacroRegistry::new(),
            binder,
            transport,
            notifier,
            confirmation,
        }
    }

    /// Replace the whole macro table.
    ///
    /// The new entries are fully materialized before any old state is
    /// touched; old trigger bindings are removed before the old entries
    /// are dropped; the new shortcuts are bound last. An entry whose
    /// shortcut fails to register stays in the table without a binding.
    pub fn install(&mut self, entries: Vec<MacroEntry>) {
        self.unbind_all();
        let old = self.registry.replace(entries);
        drop(old);
        self.bind_all();
        debug!("Installed macro table with {} entries", self.registry.count());
    }

    /// Remove every macro and its binding
    pub fn clear(&mut self) {
        self.unbind_all();
        let old = self.registry.clear();
        drop(old);
    }

    /// Number of live macros
    pub fn count(&self) -> usize {
        self.registry.count()
    }

    /// Entry at `index`, in load order
    pub fn get(&self, index: usize) -> Result<&MacroEntry, RegistryError> {
        self.registry.get(index)
    }

    /// Handle for the entry at `index` in the current generation
    pub fn id_at(&self, index: usize) -> Result<MacroId, RegistryError> {
        self.registry.id_at(index)
    }

    /// Live entries in firing order
    pub fn entries(&self) -> impl Iterator<Item = &MacroEntry> {
        self.registry.iter()
    }

    /// Fire the macro behind `id`: compile its action string, send the
    /// bytes down the serial line, and confirm to the user. Empty
    /// buffers are not transmitted but still confirmed.
    pub fn trigger(&mut self, id: MacroId) -> Result<(), RegistryError> {
        let entry = self.registry.resolve(id)?;
        let buffer = parse_action(&entry.action);
        let message = format!("Macro \"{}\" sent!", entry.display_name());
        debug!(
            "Macro \"{}\" compiled to {} bytes",
            entry.display_name(),
            buffer.len()
        );

        if !buffer.is_empty() {
            self.transport.send(&buffer);
        }
        self.notifier.notify(&message, self.confirmation);
        Ok(())
    }

    /// Fire the macro at `index` in the current table
    pub fn trigger_index(&mut self, index: usize) -> Result<(), RegistryError> {
        let id = self.registry.id_at(index)?;
        self.trigger(id)
    }

    fn bind_all(&mut self) {
        for index in 0..self.registry.count() {
            let Ok(id) = self.registry.id_at(index) else {
                break;
            };
            let Ok(entry) = self.registry.get(index) else {
                break;
            };
            if !entry.has_shortcut() {
                continue;
            }
            if let Err(e) = self.binder.bind(&entry.shortcut, id) {
                warn!("Failed to bind shortcut {}: {}", entry.shortcut, e);
            }
        }
    }

    fn unbind_all(&mut self) {
        for entry in self.registry.iter() {
            if entry.has_shortcut() {
                self.binder.unbind(&entry.shortcut);
            }
        }
    }
}

impl Drop for MacroContext {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Shared call log so ordering across collaborators is assertable
    #[derive(Clone, Default)]
    struct CallLog(Arc<Mutex<Vec<String>>>);

    impl CallLog {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().clone()
        }
    }

    struct FakeBinder {
        log: CallLog,
        bound_ids: Arc<Mutex<Vec<MacroId>>>,
    }

    impl TriggerBinder for FakeBinder {
        fn bind(&mut self, spec: &str, id: MacroId) -> anyhow::Result<()> {
            self.log.push(format!("bind {}", spec));
            self.bound_ids.lock().push(id);
            Ok(())
        }

        fn unbind(&mut self, spec: &str) {
            self.log.push(format!("unbind {}", spec));
        }
    }

    struct FakeTransport {
        log: CallLog,
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    impl Transport for FakeTransport {
        fn send(&mut self, bytes: &[u8]) {
            self.log.push("send");
            self.sent.lock().push(bytes.to_vec());
        }
    }

    struct FakeNotifier {
        log: CallLog,
        messages: Arc<Mutex<Vec<(String, Duration)>>>,
    }

    impl Notifier for FakeNotifier {
        fn notify(&self, text: &str, duration: Duration) {
            self.log.push("notify");
            self.messages.lock().push((text.to_string(), duration));
        }
    }

    struct Harness {
        context: MacroContext,
        log: CallLog,
        bound_ids: Arc<Mutex<Vec<MacroId>>>,
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        messages: Arc<Mutex<Vec<(String, Duration)>>>,
    }

    fn harness() -> Harness {
        let log = CallLog::default();
        let bound_ids = Arc::new(Mutex::new(Vec::new()));
        let sent = Arc::new(Mutex::new(Vec::new()));
        let messages = Arc::new(Mutex::new(Vec::new()));
        let context = MacroContext::new(
            Box::new(FakeBinder {
                log: log.clone(),
                bound_ids: Arc::clone(&bound_ids),
            }),
            Box::new(FakeTransport {
                log: log.clone(),
                sent: Arc::clone(&sent),
            }),
            Box::new(FakeNotifier {
                log: log.clone(),
                messages: Arc::clone(&messages),
            }),
            Duration::from_millis(800),
        );
        Harness {
            context,
            log,
            bound_ids,
            sent,
            messages,
        }
    }

    #[test]
    fn test_install_binds_every_shortcut() {
        let mut h = harness();
        h.context.install(vec![
            MacroEntry::new("a", "ctrl+F1", "x"),
            MacroEntry::new("b", "ctrl+F2", "y"),
        ]);
        assert_eq!(h.log.entries(), vec!["bind ctrl+F1", "bind ctrl+F2"]);
        assert_eq!(h.context.count(), 2);
    }

    #[test]
    fn test_install_skips_placeholder_shortcuts() {
        let mut h = harness();
        h.context.install(vec![
            MacroEntry::new("a", "None", "x"),
            MacroEntry::new("b", "", "y"),
            MacroEntry::new("c", "ctrl+F3", "z"),
        ]);
        assert_eq!(h.log.entries(), vec!["bind ctrl+F3"]);
        assert_eq!(h.context.count(), 3);
    }

    #[test]
    fn test_reinstall_unbinds_old_before_binding_new() {
        let mut h = harness();
        h.context
            .install(vec![MacroEntry::new("a", "ctrl+F1", "x")]);
        h.context
            .install(vec![MacroEntry::new("b", "ctrl+F2", "y")]);
        assert_eq!(
            h.log.entries(),
            vec!["bind ctrl+F1", "unbind ctrl+F1", "bind ctrl+F2"]
        );
    }

    #[test]
    fn test_trigger_sends_compiled_bytes() {
        let mut h = harness();
        h.context
            .install(vec![MacroEntry::new("greet", "ctrl+F1", "Hello\\n")]);
        h.context.trigger_index(0).unwrap();
        assert_eq!(h.sent.lock().as_slice(), &[b"Hello\n".to_vec()]);
        let messages = h.messages.lock();
        assert_eq!(messages[0].0, "Macro \"greet\" sent!");
        assert_eq!(messages[0].1, Duration::from_millis(800));
    }

    #[test]
    fn test_trigger_empty_action_notifies_without_send() {
        let mut h = harness();
        h.context
            .install(vec![MacroEntry::new("noop", "ctrl+F1", "")]);
        h.context.trigger_index(0).unwrap();
        assert!(h.sent.lock().is_empty());
        assert_eq!(h.messages.lock().len(), 1);
    }

    #[test]
    fn test_trigger_label_falls_back_to_shortcut() {
        let mut h = harness();
        h.context
            .install(vec![MacroEntry::new("", "ctrl+F9", "x")]);
        h.context.trigger_index(0).unwrap();
        assert_eq!(h.messages.lock()[0].0, "Macro \"ctrl+F9\" sent!");
    }

    #[test]
    fn test_trigger_stale_handle_fails() {
        let mut h = harness();
        h.context
            .install(vec![MacroEntry::new("a", "ctrl+F1", "x")]);
        let old_id = h.bound_ids.lock()[0];
        h.context
            .install(vec![MacroEntry::new("b", "ctrl+F2", "y")]);
        assert!(matches!(
            h.context.trigger(old_id),
            Err(RegistryError::StaleHandle { .. })
        ));
        assert!(h.sent.lock().is_empty());
    }

    #[test]
    fn test_trigger_out_of_range() {
        let mut h = harness();
        h.context
            .install(vec![MacroEntry::new("a", "ctrl+F1", "x")]);
        assert_eq!(
            h.context.trigger_index(1),
            Err(RegistryError::OutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_clear_unbinds_everything() {
        let mut h = harness();
        h.context.install(vec![
            MacroEntry::new("a", "ctrl+F1", "x"),
            MacroEntry::new("b", "ctrl+F2", "y"),
        ]);
        h.context.clear();
        assert_eq!(h.context.count(), 0);
        let log = h.log.entries();
        assert_eq!(
            &log[2..],
            &["unbind ctrl+F1".to_string(), "unbind ctrl+F2".to_string()]
        );
    }

    #[test]
    fn test_drop_unbinds() {
        let h = harness();
        let log = h.log.clone();
        let mut context = h.context;
        context.install(vec![MacroEntry::new("a", "ctrl+F1", "x")]);
        drop(context);
        assert_eq!(log.entries().last().unwrap(), "unbind ctrl+F1");
    }
}
