//! Serial port transport
//!
//! Opens the configured port and writes macro byte buffers to it. Sends
//! are best effort: a failed write is logged and the buffer dropped, the
//! caller never blocks on the outcome.

use crate::core::config::SerialConfig;
use crate::macros::Transport;
use anyhow::{bail, Context, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// An open serial connection
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialLink {
    /// Open the port described by `config`
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(data_bits(config.data_bits)?)
            .parity(parity(&config.parity)?)
            .stop_bits(stop_bits(config.stop_bits)?)
            .flow_control(flow_control(&config.flow_control)?)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open()
            .with_context(|| format!("Failed to open serial port {}", config.port))?;

        info!(
            "Opened serial port {} at {} baud",
            config.port, config.baud_rate
        );

        Ok(Self {
            port,
            name: config.port.clone(),
        })
    }
}

impl Transport for SerialLink {
    fn send(&mut self, bytes: &[u8]) {
        match self.port.write_all(bytes).and_then(|()| self.port.flush()) {
            Ok(()) => debug!("Sent {} bytes to {}", bytes.len(), self.name),
            Err(e) => warn!("Serial write to {} failed: {}", self.name, e),
        }
    }
}

fn data_bits(bits: u8) -> Result<DataBits> {
    match bits {
        5 => Ok(DataBits::Five),
        6 => Ok(DataBits::Six),
        7 => Ok(DataBits::Seven),
        8 => Ok(DataBits::Eight),
        _ => bail!("Unsupported data bits: {}", bits),
    }
}

fn parity(name: &str) -> Result<Parity> {
    match name.to_lowercase().as_str() {
        "none" => Ok(Parity::None),
        "odd" => Ok(Parity::Odd),
        "even" => Ok(Parity::Even),
        _ => bail!("Unsupported parity: {}", name),
    }
}

fn stop_bits(bits: u8) -> Result<StopBits> {
    match bits {
        1 => Ok(StopBits::One),
        2 => Ok(StopBits::Two),
        _ => bail!("Unsupported stop bits: {}", bits),
    }
}

fn flow_control(name: &str) -> Result<FlowControl> {
    match name.to_lowercase().as_str() {
        "none" => Ok(FlowControl::None),
        "software" | "xonxoff" => Ok(FlowControl::Software),
        "hardware" | "rtscts" => Ok(FlowControl::Hardware),
        _ => bail!("Unsupported flow control: {}", name),
    }
}
