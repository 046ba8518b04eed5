// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Send a file to a device under test through its serial shell.
//!
//! Usage:
//!   dut-send --serial_port /dev/ttyUSB1 --source app.bin --destination /tmp/app.bin
//!   dut-send -s app.bin -d /tmp/app.bin --verify --quiet
//!   dut-send -s app.bin -d /tmp/app.bin --dry-run

mod cli;
mod commands;
mod transport;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dut_common::UploadError;

const LOG_ENV: &str = "DUT_SEND_LOG";
const DASH: &str = "========================================";

fn init_logging(level: Option<tracing::Level>) {
    match EnvFilter::builder().with_env_var(LOG_ENV).try_from_env() {
        Ok(filter) => tracing_subscriber::fmt().with_env_filter(filter).init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(level.unwrap_or(tracing::Level::WARN))
            .init(),
    }
}

fn report_interrupt() -> ExitCode {
    eprintln!("\nAborted requested (Ctrl-C pressed). Stopping...");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let args = cli::Cli::parse();
    init_logging(args.log_level);

    // First Ctrl-C stops after the chunk in flight, a second one exits at once
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_flag.swap(true, Ordering::SeqCst) {
            std::process::exit(1);
        }
    }) {
        tracing::warn!("cannot install Ctrl-C handler: {}", e);
    }

    match cli::run(args, &cancel) {
        Ok(_) if cancel.load(Ordering::SeqCst) => report_interrupt(),
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if let Some(UploadError::Interrupted { .. }) = e.downcast_ref::<UploadError>() {
                return report_interrupt();
            }
            eprintln!("{}", DASH);
            eprintln!("ERROR = {:#}", e);
            eprintln!("{}", DASH);
            ExitCode::FAILURE
        }
    }
}
