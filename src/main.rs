//! serialpad - Entry Point
//!
//! Loads the configuration, opens the serial port, installs the macro
//! table and runs the event loop that turns global shortcuts into serial
//! byte bursts.

use anyhow::Result;
use serialpad::{
    core::{
        config::Config,
        events::{AppEvent, ChannelNotifier},
    },
    hotkey::HotkeyBinder,
    macros::MacroContext,
    serial::SerialLink,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often pending hotkey events are drained
const HOTKEY_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting serialpad");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded ({} macros) from {:?}",
        config.macros.len(),
        Config::config_path()?
    );

    // Open the serial line
    let link = SerialLink::open(&config.serial)?;

    // Create event channel
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    // Global hotkey layer: the binder goes into the context, the
    // dispatcher stays here to feed the channel
    let binder = HotkeyBinder::new()?;
    let dispatcher = binder.dispatcher(event_tx.clone());

    // Build the macro context and install the persisted table
    let mut context = MacroContext::new(
        Box::new(binder),
        Box::new(link),
        Box::new(ChannelNotifier::new(event_tx)),
        Duration::from_millis(config.notify.duration_ms),
    );
    context.install(config.macros);
    info!("Installed {} macros", context.count());

    // Event loop: drain hotkey events, fire macros, surface notices
    let mut poll = tokio::time::interval(HOTKEY_POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            _ = poll.tick() => {
                dispatcher.process_events();
            }
            Some(event) = event_rx.recv() => {
                match event {
                    AppEvent::MacroTriggered(id) => {
                        if let Err(e) = context.trigger(id) {
                            warn!("Dropped macro trigger: {}", e);
                        }
                    }
                    AppEvent::Notice { text, duration } => {
                        info!("{} (shown for {:?})", text, duration);
                    }
                }
            }
        }
    }

    // Unbind everything before the table goes away
    context.clear();
    Ok(())
}
