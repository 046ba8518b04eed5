// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

use dut_common::{FixedDelay, UploadConfig, Verification, BYTES_PER_LINE};

use crate::commands::{self, SendJob};
use crate::transport::{Transport, DEFAULT_TIMEOUT_MS};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "dut-send")]
#[command(about = "Send a file to a DUT over its serial console")]
pub struct Cli {
    /// Name of the DUT, used in messages
    #[arg(long, default_value = "Dut")]
    pub name: String,

    /// Serial port (e.g., /dev/ttyUSB1)
    #[arg(long = "serial_port", visible_alias = "serial-port", default_value = "/dev/ttyUSB1")]
    pub serial_port: String,

    /// How fast data is sent over the serial line
    #[arg(long, default_value_t = 115200)]
    pub baudrate: u32,

    /// Run mode
    #[arg(short, long, value_enum, default_value_t = Mode::Local)]
    pub mode: Mode,

    /// Full path to the local source file (e.g., /home/test.txt)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Full path to the destination on the DUT (e.g., /test.txt)
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Do not show upload progress
    #[arg(short, long)]
    pub quiet: bool,

    /// Source bytes per echo command
    #[arg(long, default_value_t = BYTES_PER_LINE, value_parser = parse_bytes_per_line)]
    pub bytes_per_line: usize,

    /// Pause after each command, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub settle_ms: u64,

    /// Pause after the last chunk, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub drain_ms: u64,

    /// Serial read timeout, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Check the exit status of every command with `echo $?`
    #[arg(long)]
    pub verify: bool,

    /// Print the commands instead of opening the serial port
    #[arg(long)]
    pub dry_run: bool,

    /// Log level when DUT_SEND_LOG is not set
    #[arg(long)]
    pub log_level: Option<tracing::Level>,
}

fn parse_bytes_per_line(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Run modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Send a local file to the DUT
    Local,
}

impl Cli {
    /// Build the transfer job, checking the arguments local mode needs.
    pub fn job(&self) -> Result<SendJob> {
        let (Some(source), Some(destination)) = (&self.source, &self.destination) else {
            bail!("\"local\" mode required: \"--source\" and \"--destination\"");
        };

        Ok(SendJob {
            source: source.clone(),
            destination: destination.clone(),
            config: UploadConfig {
                bytes_per_line: self.bytes_per_line,
                verify: if self.verify {
                    Verification::StatusProbe
                } else {
                    Verification::Disabled
                },
            },
            pacing: FixedDelay {
                settle: Duration::from_millis(self.settle_ms),
                drain: Duration::from_millis(self.drain_ms),
            },
            quiet: self.quiet,
        })
    }
}

/// Execute the parsed CLI command. Returns whether the transfer completed.
pub fn run(cli: Cli, cancel: &AtomicBool) -> Result<bool> {
    match cli.mode {
        Mode::Local => {
            // Validate before touching the serial port
            let job = cli.job()?;
            if cli.dry_run {
                return commands::dry_run(&job);
            }

            let mut transport =
                Transport::open(&cli.name, &cli.serial_port, cli.baudrate, cli.timeout_ms)?;
            tracing::info!(port = %transport.port_name(), "console ready");
            commands::send_file(&mut transport, &job, cancel)
        }
    }
}
