// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for shell command rendering and hex escaping.

use dut_common::protocol::{
    chunk_count, chunks, decode_escaped, escape_bytes, parse_status_reply, render_append,
    render_truncate, DecodeError, ShellCommand, BYTES_PER_LINE, DRAIN_INTERVAL,
    SETTLE_INTERVAL,
};
use std::time::Duration;

// --- Constants ---

#[test]
fn test_default_bytes_per_line() {
    assert_eq!(BYTES_PER_LINE, 200);
}

#[test]
fn test_default_intervals() {
    assert_eq!(SETTLE_INTERVAL, Duration::from_millis(500));
    assert_eq!(DRAIN_INTERVAL, Duration::from_secs(2));
}

// --- Hex escaping ---

#[test]
fn test_escape_is_uppercase_and_zero_padded() {
    assert_eq!(escape_bytes(&[0x41, 0x0A, 0xFF]), "\\x41\\x0A\\xFF");
    assert_eq!(escape_bytes(&[0x00, 0x0b]), "\\x00\\x0B");
}

#[test]
fn test_escape_empty() {
    assert_eq!(escape_bytes(&[]), "");
}

#[test]
fn test_escape_every_byte_value_decodes_back() {
    let all: Vec<u8> = (0..=255).collect();
    let literal = escape_bytes(&all);
    assert_eq!(literal.len(), 256 * 4);
    assert_eq!(decode_escaped(&literal).unwrap(), all);
}

#[test]
fn test_decode_rejects_lowercase_hex() {
    assert_eq!(decode_escaped("\\xff"), Err(DecodeError::Digit(0)));
}

#[test]
fn test_decode_rejects_truncated_token() {
    assert_eq!(decode_escaped("\\x41\\x"), Err(DecodeError::Length(6)));
}

// --- Chunking ---

#[test]
fn test_chunk_count_rounds_up() {
    assert_eq!(chunk_count(0, 200), 0);
    assert_eq!(chunk_count(1, 200), 1);
    assert_eq!(chunk_count(200, 200), 1);
    assert_eq!(chunk_count(201, 200), 2);
    assert_eq!(chunk_count(450, 200), 3);
}

#[test]
fn test_chunks_cover_input_in_order() {
    let data: Vec<u8> = (0..=255).cycle().take(450).collect();
    let parts: Vec<&[u8]> = chunks(&data, 200).collect();
    let sizes: Vec<usize> = parts.iter().map(|c| c.len()).collect();
    assert_eq!(sizes, vec![200, 200, 50]);
    assert_eq!(parts.concat(), data);
}

#[test]
fn test_chunks_of_empty_input() {
    assert_eq!(chunks(&[], 200).count(), 0);
}

// --- Command rendering ---

#[test]
fn test_truncate_wire_format() {
    assert_eq!(render_truncate("/tmp/fw.bin"), "\necho -ne > /tmp/fw.bin\n");
}

#[test]
fn test_append_wire_format() {
    assert_eq!(
        render_append("/tmp/fw.bin", b"A\n\xFF"),
        "\necho -ne \"\\x41\\x0A\\xFF\" >> /tmp/fw.bin\n"
    );
}

#[test]
fn test_status_probe_wire_format() {
    assert_eq!(ShellCommand::StatusProbe.to_wire(), "echo $?\r");
}

#[test]
fn test_parse_recognises_rendered_commands() {
    let commands = [
        ShellCommand::Truncate {
            destination: "/data/a.txt".into(),
        },
        ShellCommand::Append {
            destination: "/data/a.txt".into(),
            payload: vec![0x00, 0x22, 0x5C, 0xFF],
        },
        ShellCommand::StatusProbe,
    ];
    for cmd in commands {
        assert_eq!(ShellCommand::parse(&cmd.to_wire()), Some(cmd));
    }
}

#[test]
fn test_parse_rejects_foreign_lines() {
    assert_eq!(ShellCommand::parse("ls -l\n"), None);
    assert_eq!(ShellCommand::parse("\necho -ne \"\\x4\" >> /a\n"), None);
}

// --- Status replies ---

#[test]
fn test_status_reply_plain() {
    assert_eq!(parse_status_reply(b"0\n\n"), Some(0));
}

#[test]
fn test_status_reply_with_echo_and_prompt() {
    assert_eq!(parse_status_reply(b"echo $?\r\n1\r\n/ # "), Some(1));
}

#[test]
fn test_status_reply_negative() {
    assert_eq!(parse_status_reply(b"-1\r\n"), Some(-1));
}

#[test]
fn test_status_reply_without_number() {
    assert_eq!(parse_status_reply(b""), None);
    assert_eq!(parse_status_reply(b"echo $?\r\n/ # "), None);
}
