// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Chunked hex uploader.
//!
//! Replicates a local file on the DUT by truncating the destination and then
//! appending the content [`BYTES_PER_LINE`] bytes at a time with `echo -ne`.
//! Nothing is read back unless [`Verification::StatusProbe`] is enabled, so a
//! complete report only means every chunk was handed to the channel.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::channel::{self, ByteChannel};
use crate::pacing::Pacer;
use crate::protocol::{
    self, parse_status_reply, ShellCommand, BYTES_PER_LINE, MAX_STATUS_REPLY,
    STATUS_REPLY_TERMINATOR,
};
use crate::transfer_fsm::{Event, InvalidTransition, Phase};

/// How the uploader checks that the remote shell accepted each command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verification {
    /// Fire and forget.
    #[default]
    Disabled,
    /// Send `echo $?` after every command and stop on a non-zero status.
    StatusProbe,
}

/// Uploader settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadConfig {
    pub bytes_per_line: usize,
    pub verify: Verification,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            bytes_per_line: BYTES_PER_LINE,
            verify: Verification::Disabled,
        }
    }
}

impl UploadConfig {
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.bytes_per_line == 0 {
            return Err(UploadError::InvalidConfig("bytes per line must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read {}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("serial channel error")]
    Channel(#[from] io::Error),
    #[error("transfer interrupted after {sent} of {total} bytes")]
    Interrupted { sent: usize, total: usize },
    #[error("invalid upload configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    State(#[from] InvalidTransition),
}

/// Outcome of a transfer that ran to the end of its send loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferReport {
    /// Bytes handed to the channel.
    pub sent: usize,
    /// Size of the source.
    pub total: usize,
    /// Append commands written.
    pub chunks: usize,
    /// The shell reported a non-zero exit status for one of the commands.
    pub rejected: bool,
}

impl TransferReport {
    pub fn is_complete(&self) -> bool {
        self.sent == self.total && !self.rejected
    }
}

/// Receives transfer progress. All methods default to doing nothing.
pub trait Observer {
    fn on_start(&mut self, _total: usize) {}
    fn on_progress(&mut self, _sent: usize, _total: usize) {}
    fn on_finish(&mut self, _report: &TransferReport) {}
}

/// Observer that reports nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Observer for Silent {}

/// Sends files over a [`ByteChannel`] as shell `echo` commands.
pub struct Uploader<'a, C: ByteChannel + ?Sized, P: Pacer> {
    channel: &'a mut C,
    pacer: P,
    config: UploadConfig,
    cancel: Option<&'a AtomicBool>,
    phase: Phase,
}

impl<'a, C: ByteChannel + ?Sized, P: Pacer> Uploader<'a, C, P> {
    pub fn new(channel: &'a mut C, pacer: P, config: UploadConfig) -> Self {
        Self {
            channel,
            pacer,
            config,
            cancel: None,
            phase: Phase::Idle,
        }
    }

    /// Stop before the next chunk once `flag` is set.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Phase reached by the most recent transfer.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Read `source` and replicate it at `destination` on the DUT.
    ///
    /// The source is read completely before anything is written, so a
    /// missing or unreadable file never touches the remote side.
    pub fn upload_file(
        &mut self,
        source: &Path,
        destination: &str,
        observer: &mut dyn Observer,
    ) -> Result<TransferReport, UploadError> {
        self.begin()?;

        let data = match fs::read(source) {
            Ok(data) => data,
            Err(e) => {
                self.fail();
                return Err(UploadError::SourceRead {
                    path: source.to_path_buf(),
                    source: e,
                });
            }
        };
        info!(source = %source.display(), destination, bytes = data.len(), "source loaded");

        self.run(&data, destination, observer)
    }

    /// Replicate `data` at `destination` on the DUT.
    pub fn upload_bytes(
        &mut self,
        data: &[u8],
        destination: &str,
        observer: &mut dyn Observer,
    ) -> Result<TransferReport, UploadError> {
        self.begin()?;
        self.run(data, destination, observer)
    }

    fn begin(&mut self) -> Result<(), UploadError> {
        self.phase = Phase::Idle;
        if let Err(e) = self.config.validate() {
            self.fail();
            return Err(e);
        }
        self.step(Event::Start)
    }

    fn run(
        &mut self,
        data: &[u8],
        destination: &str,
        observer: &mut dyn Observer,
    ) -> Result<TransferReport, UploadError> {
        match self.send(data, destination, observer) {
            Ok(report) => Ok(report),
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }

    fn send(
        &mut self,
        data: &[u8],
        destination: &str,
        observer: &mut dyn Observer,
    ) -> Result<TransferReport, UploadError> {
        let total = data.len();
        let bytes_per_line = self.config.bytes_per_line;
        self.step(Event::SourceLoaded {
            chunks: protocol::chunk_count(total, bytes_per_line),
        })?;
        observer.on_start(total);

        self.write_command(&protocol::render_truncate(destination))?;
        self.pacer.settle();
        let truncated = self.verify_previous()?;
        self.step(Event::Truncated)?;

        let mut sent = 0;
        let mut chunks = 0;
        let mut rejected = !truncated;
        if truncated {
            for chunk in protocol::chunks(data, bytes_per_line) {
                if self.cancelled() {
                    return Err(UploadError::Interrupted { sent, total });
                }

                self.write_command(&protocol::render_append(destination, chunk))?;
                self.pacer.settle();
                if !self.verify_previous()? {
                    rejected = true;
                    break;
                }

                sent += chunk.len();
                chunks += 1;
                self.step(Event::ChunkSent)?;
                observer.on_progress(sent, total);
            }
        }

        self.step(Event::Finish)?;
        self.pacer.drain();
        self.step(Event::Drained)?;

        let report = TransferReport {
            sent,
            total,
            chunks,
            rejected,
        };
        if report.is_complete() {
            info!(sent, chunks, destination, "transfer complete");
        } else {
            warn!(sent, total, destination, "transfer incomplete");
        }
        observer.on_finish(&report);
        Ok(report)
    }

    fn write_command(&mut self, wire: &str) -> Result<(), UploadError> {
        debug!(len = wire.len(), "write command");
        self.channel.write_all(wire.as_bytes())?;
        Ok(())
    }

    /// Ask the shell whether the last command succeeded. Always `true` when
    /// verification is disabled.
    fn verify_previous(&mut self) -> Result<bool, UploadError> {
        if self.config.verify == Verification::Disabled {
            return Ok(true);
        }

        self.channel.clear_input()?;
        self.write_command(&ShellCommand::StatusProbe.to_wire())?;
        let reply = channel::read_until(
            &mut *self.channel,
            STATUS_REPLY_TERMINATOR,
            MAX_STATUS_REPLY,
        )?;

        match parse_status_reply(&reply) {
            Some(0) => Ok(true),
            Some(status) => {
                warn!(status, "remote command failed");
                Ok(false)
            }
            None => {
                warn!(reply = %String::from_utf8_lossy(&reply), "no exit status in probe reply");
                Ok(true)
            }
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn step(&mut self, event: Event) -> Result<(), UploadError> {
        self.phase = self.phase.advance(event)?;
        Ok(())
    }

    fn fail(&mut self) {
        // Already terminal phases keep their outcome
        if let Ok(next) = self.phase.advance(Event::Fail) {
            self.phase = next;
        }
    }
}
