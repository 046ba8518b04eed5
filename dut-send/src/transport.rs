// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial transport to the DUT console.

use anyhow::{Context, Result};
use serialport::{ClearBuffer, SerialPort};
use std::io::{self, Read, Write};
use std::time::Duration;

use dut_common::ByteChannel;

/// Default read timeout for serial operations in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Serial console of the DUT.
pub struct Transport {
    port: Box<dyn SerialPort>,
}

impl Transport {
    /// Open `port_name` at `baudrate`. `name` only labels the DUT in errors.
    pub fn open(name: &str, port_name: &str, baudrate: u32, timeout_ms: u64) -> Result<Self> {
        println!("Initializing {} console on {}", name, port_name);

        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(timeout_ms))
            .open()
            .with_context(|| {
                format!(
                    "Failed to connect to {}, port: {}, baudrate: {}",
                    name, port_name, baudrate
                )
            })?;

        tracing::debug!(port = port_name, baudrate, timeout_ms, "serial port open");
        Ok(Self { port })
    }

    /// Get the port name.
    pub fn port_name(&self) -> String {
        self.port.name().unwrap_or_else(|| "?".to_string())
    }
}

impl ByteChannel for Transport {
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        let n = self.port.write(data)?;
        self.port.flush()?;
        Ok(n)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.port.clear(ClearBuffer::Input).map_err(io::Error::from)
    }
}
