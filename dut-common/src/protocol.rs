// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Shell command protocol spoken to the DUT console.
//!
//! File content travels as `echo -ne` commands whose argument is a run of
//! `\xHH` escapes. The remote shell expands the escapes and appends the raw
//! bytes to the destination file.

use std::fmt::Write as _;
use std::time::Duration;

use thiserror::Error;

// --- Transfer constants ---

/// Source bytes carried by a single append command.
pub const BYTES_PER_LINE: usize = 200;

/// Pause after every command written to the console.
pub const SETTLE_INTERVAL: Duration = Duration::from_millis(500);

/// Pause after the last chunk so the UART can finish shifting it out.
pub const DRAIN_INTERVAL: Duration = Duration::from_secs(2);

/// Marks the end of the reply to a status probe.
pub const STATUS_REPLY_TERMINATOR: &[u8] = b"\n\n";

/// Bytes read back after a status probe before giving up on the terminator.
pub const MAX_STATUS_REPLY: usize = 512;

const ESCAPE_PREFIX: &str = "\\x";
const TOKEN_LEN: usize = 4; // "\xHH"

// --- Hex escaping ---

/// Render `data` as a run of uppercase `\xHH` escapes.
pub fn escape_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * TOKEN_LEN);
    for byte in data {
        // Writing to a String cannot fail
        let _ = write!(out, "\\x{:02X}", byte);
    }
    out
}

/// Errors produced while decoding an escaped payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload length {0} is not a multiple of 4")]
    Length(usize),
    #[error("token at offset {0} does not start with \\x")]
    Prefix(usize),
    #[error("token at offset {0} is not uppercase hex")]
    Digit(usize),
}

/// Decode a run of `\xHH` escapes back into bytes.
///
/// Only the exact form produced by [`escape_bytes`] is accepted: lowercase
/// digits and any other escape sequence are rejected.
pub fn decode_escaped(literal: &str) -> Result<Vec<u8>, DecodeError> {
    let raw = literal.as_bytes();
    if raw.len() % TOKEN_LEN != 0 {
        return Err(DecodeError::Length(raw.len()));
    }

    let mut out = Vec::with_capacity(raw.len() / TOKEN_LEN);
    for (i, token) in raw.chunks_exact(TOKEN_LEN).enumerate() {
        let offset = i * TOKEN_LEN;
        if &token[..2] != ESCAPE_PREFIX.as_bytes() {
            return Err(DecodeError::Prefix(offset));
        }
        let hi = hex_digit(token[2]).ok_or(DecodeError::Digit(offset))?;
        let lo = hex_digit(token[3]).ok_or(DecodeError::Digit(offset))?;
        out.push(hi << 4 | lo);
    }
    Ok(out)
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// --- Chunking ---

/// Number of append commands needed for `len` bytes.
pub fn chunk_count(len: usize, bytes_per_line: usize) -> usize {
    len.div_ceil(bytes_per_line)
}

/// Split `data` into ordered, non-overlapping slices of at most
/// `bytes_per_line` bytes. The last slice may be shorter.
///
/// # Panics
/// Panics if `bytes_per_line` is zero.
pub fn chunks(data: &[u8], bytes_per_line: usize) -> std::slice::Chunks<'_, u8> {
    data.chunks(bytes_per_line)
}

// --- Commands ---

const STATUS_PROBE: &str = "echo $?\r";

/// Wire form of a truncate command for `destination`.
pub fn render_truncate(destination: &str) -> String {
    format!("\necho -ne > {}\n", destination)
}

/// Wire form of an append command carrying `payload`.
pub fn render_append(destination: &str, payload: &[u8]) -> String {
    format!("\necho -ne \"{}\" >> {}\n", escape_bytes(payload), destination)
}

/// A command written to the remote shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Create the destination file, or empty it if it exists.
    Truncate { destination: String },
    /// Append raw bytes to the destination file.
    Append { destination: String, payload: Vec<u8> },
    /// Ask the shell for the exit status of the previous command.
    StatusProbe,
}

impl ShellCommand {
    /// Render the command exactly as it is written to the console.
    pub fn to_wire(&self) -> String {
        match self {
            ShellCommand::Truncate { destination } => render_truncate(destination),
            ShellCommand::Append {
                destination,
                payload,
            } => render_append(destination, payload),
            ShellCommand::StatusProbe => STATUS_PROBE.to_string(),
        }
    }

    /// Recognise a command previously rendered with [`ShellCommand::to_wire`].
    pub fn parse(wire: &str) -> Option<ShellCommand> {
        if wire == STATUS_PROBE {
            return Some(ShellCommand::StatusProbe);
        }

        let body = wire.strip_prefix("\necho -ne ")?.strip_suffix('\n')?;

        if let Some(destination) = body.strip_prefix("> ") {
            return Some(ShellCommand::Truncate {
                destination: destination.to_string(),
            });
        }

        let rest = body.strip_prefix('"')?;
        let (literal, tail) = rest.split_once('"')?;
        let destination = tail.strip_prefix(" >> ")?;
        let payload = decode_escaped(literal).ok()?;
        Some(ShellCommand::Append {
            destination: destination.to_string(),
            payload,
        })
    }
}

/// Extract the exit status from the bytes read back after a status probe.
///
/// The console echoes the probe itself and usually prints a prompt after the
/// answer, so the status is taken from the last line that holds nothing but
/// an integer.
pub fn parse_status_reply(reply: &[u8]) -> Option<i32> {
    let text = String::from_utf8_lossy(reply);
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| is_integer(line))
        .last()
        .and_then(|line| line.parse().ok())
}

fn is_integer(line: &str) -> bool {
    let digits = line.strip_prefix('-').unwrap_or(line);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
