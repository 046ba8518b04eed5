// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Byte channel abstraction between the uploader and the DUT console.

use std::collections::VecDeque;
use std::io;

/// Duplex byte stream to the remote shell.
///
/// Reads are expected to block for at most the channel's configured timeout
/// and return `Ok(None)` when nothing arrived in time.
pub trait ByteChannel {
    /// Write some of `data`, returning how many bytes were accepted.
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Read a single byte, or `None` on timeout.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Discard anything received but not yet read.
    fn clear_input(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Write all of `data`.
    fn write_all(&mut self, mut data: &[u8]) -> io::Result<()> {
        while !data.is_empty() {
            match self.write_bytes(data) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "channel accepted no bytes",
                    ))
                }
                Ok(n) => data = &data[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for &mut C {
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write_bytes(data)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn clear_input(&mut self) -> io::Result<()> {
        (**self).clear_input()
    }
}

/// Read until the received bytes end with `terminator`, a read times out, or
/// `limit` bytes have arrived.
///
/// Whatever arrived before stopping is returned; an empty buffer means the
/// remote side stayed silent.
pub fn read_until<C: ByteChannel + ?Sized>(
    channel: &mut C,
    terminator: &[u8],
    limit: usize,
) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    while line.len() < limit {
        let Some(byte) = channel.read_byte()? else {
            break;
        };
        line.push(byte);
        if line.ends_with(terminator) {
            break;
        }
    }
    Ok(line)
}

/// In-memory channel that records writes and serves scripted replies.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    written: Vec<u8>,
    replies: VecDeque<u8>,
    max_write: Option<usize>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to be returned by subsequent reads.
    pub fn push_reply(&mut self, reply: &[u8]) {
        self.replies.extend(reply);
    }

    /// Accept at most `max` bytes per write call, like a busy UART driver.
    pub fn with_max_write(mut self, max: usize) -> Self {
        self.max_write = Some(max);
        self
    }

    /// Every byte written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Written bytes decoded as text.
    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }
}

impl ByteChannel for MemoryChannel {
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<usize> {
        let n = self.max_write.map_or(data.len(), |max| max.min(data.len()));
        self.written.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.replies.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_all_handles_short_writes() {
        let mut channel = MemoryChannel::new().with_max_write(3);
        channel.write_all(b"hello world").unwrap();
        assert_eq!(channel.written(), b"hello world");
    }

    #[test]
    fn write_all_fails_when_nothing_is_accepted() {
        let mut channel = MemoryChannel::new().with_max_write(0);
        let err = channel.write_all(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn read_until_stops_at_terminator() {
        let mut channel = MemoryChannel::new();
        channel.push_reply(b"0\n\nleftover");
        assert_eq!(read_until(&mut channel, b"\n\n", 64).unwrap(), b"0\n\n");
        assert_eq!(channel.read_byte().unwrap(), Some(b'l'));
    }

    #[test]
    fn read_until_returns_partial_on_timeout() {
        let mut channel = MemoryChannel::new();
        channel.push_reply(b"0\r\n# ");
        assert_eq!(read_until(&mut channel, b"\n\n", 64).unwrap(), b"0\r\n# ");
    }

    #[test]
    fn read_until_stops_at_limit_on_endless_output() {
        let mut channel = MemoryChannel::new();
        channel.push_reply(&[b'x'; 100]);
        assert_eq!(read_until(&mut channel, b"\n\n", 16).unwrap(), vec![b'x'; 16]);
        assert_eq!(channel.read_byte().unwrap(), Some(b'x'));
    }
}
