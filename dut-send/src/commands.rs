// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations for sending files to the DUT.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use dut_common::{
    ByteChannel, FixedDelay, MemoryChannel, NoDelay, Observer, Pacer, Silent, TransferReport,
    UploadConfig, Uploader,
};

/// Everything needed for one local-mode transfer.
#[derive(Debug, Clone)]
pub struct SendJob {
    pub source: PathBuf,
    pub destination: String,
    pub config: UploadConfig,
    pub pacing: FixedDelay,
    pub quiet: bool,
}

/// Progress bar shown while chunks are written.
struct BarProgress {
    pb: ProgressBar,
}

impl BarProgress {
    fn new() -> Result<Self> {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                )?
                .progress_chars("#>-"),
        );
        Ok(Self { pb })
    }
}

impl Observer for BarProgress {
    fn on_start(&mut self, total: usize) {
        self.pb.set_length(total as u64);
    }

    fn on_progress(&mut self, sent: usize, _total: usize) {
        self.pb.set_position(sent as u64);
    }

    fn on_finish(&mut self, report: &TransferReport) {
        if report.is_complete() {
            self.pb.finish();
        } else {
            self.pb.abandon();
        }
    }
}

/// Send `job.source` to the DUT over `channel`.
///
/// Returns whether every byte was handed to the channel.
pub fn send_file<C: ByteChannel + ?Sized>(
    channel: &mut C,
    job: &SendJob,
    cancel: &AtomicBool,
) -> Result<bool> {
    send_with(channel, job.pacing, job, cancel)
}

/// Print the commands a transfer would write instead of sending them.
pub fn dry_run(job: &SendJob) -> Result<bool> {
    let mut channel = MemoryChannel::new();
    let quiet = SendJob {
        quiet: true,
        ..job.clone()
    };
    let complete = send_with(&mut channel, NoDelay, &quiet, &AtomicBool::new(false))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(channel.written())?;
    stdout.flush()?;
    Ok(complete)
}

fn send_with<C: ByteChannel + ?Sized, P: Pacer>(
    channel: &mut C,
    pacer: P,
    job: &SendJob,
    cancel: &AtomicBool,
) -> Result<bool> {
    if !job.quiet {
        println!("Starting send: {} over UART...", job.source.display());
    }

    let mut uploader = Uploader::new(channel, pacer, job.config).with_cancel(cancel);
    let report = if job.quiet {
        uploader.upload_file(&job.source, &job.destination, &mut Silent)?
    } else {
        let mut bar = BarProgress::new()?;
        uploader.upload_file(&job.source, &job.destination, &mut bar)?
    };

    if report.is_complete() {
        if !job.quiet {
            println!(
                "Uploaded {} bytes from {} to {}",
                report.sent,
                job.source.display(),
                job.destination
            );
            println!("Transfer complete");
        }
    } else {
        eprintln!(
            "[ERROR] Incomplete Transfer ({} of {} bytes)",
            report.sent, report.total
        );
    }

    Ok(report.is_complete())
}
