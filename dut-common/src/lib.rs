// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Common types and logic for dut-send.
//!
//! Everything here is independent of the serial hardware:
//! - `protocol`: shell command rendering, hex escaping and chunking
//! - `channel`: the byte channel seam plus an in-memory implementation
//! - `pacing`: delays between console writes
//! - `transfer_fsm`: transfer lifecycle
//! - `upload`: the chunked hex uploader

pub mod channel;
pub mod pacing;
pub mod protocol;
pub mod transfer_fsm;
pub mod upload;

// Re-export commonly used types
pub use channel::{ByteChannel, MemoryChannel};
pub use pacing::{FixedDelay, NoDelay, Pacer};
pub use protocol::{ShellCommand, BYTES_PER_LINE, DRAIN_INTERVAL, SETTLE_INTERVAL};
pub use transfer_fsm::Phase;
pub use upload::{
    Observer, Silent, TransferReport, UploadConfig, UploadError, Uploader, Verification,
};
