// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Transfer lifecycle FSM - pure logic without I/O.
//!
//! The uploader drives a [`Phase`] through [`Event`]s. Any event that does
//! not fit the current phase is rejected, so ordering mistakes such as an
//! append before the truncate surface as errors instead of corrupt files.

use thiserror::Error;

/// Where a transfer currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// Reading the source file.
    Initializing,
    /// Source loaded, truncate command pending or in flight.
    Truncating { chunks: usize },
    /// `chunk` of `of` append commands written.
    Sending { chunk: usize, of: usize },
    /// Loop finished, waiting for the UART to empty.
    Draining,
    Done,
    Failed,
}

/// Inputs to the transfer FSM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Start,
    /// Source read; `chunks` append commands will follow.
    SourceLoaded { chunks: usize },
    Truncated,
    ChunkSent,
    /// Leave the send loop, whether or not every chunk went out.
    Finish,
    Drained,
    Fail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("event {event:?} is not valid in phase {phase:?}")]
pub struct InvalidTransition {
    pub phase: Phase,
    pub event: Event,
}

impl Phase {
    /// Terminal phases never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    /// Apply `event` and return the next phase.
    pub fn advance(self, event: Event) -> Result<Phase, InvalidTransition> {
        let next = match (self, event) {
            (phase, Event::Fail) if !phase.is_terminal() => Phase::Failed,
            (Phase::Idle, Event::Start) => Phase::Initializing,
            (Phase::Initializing, Event::SourceLoaded { chunks }) => Phase::Truncating { chunks },
            (Phase::Truncating { chunks }, Event::Truncated) => Phase::Sending {
                chunk: 0,
                of: chunks,
            },
            (Phase::Sending { chunk, of }, Event::ChunkSent) if chunk < of => Phase::Sending {
                chunk: chunk + 1,
                of,
            },
            (Phase::Sending { .. }, Event::Finish) => Phase::Draining,
            (Phase::Draining, Event::Drained) => Phase::Done,
            (phase, event) => return Err(InvalidTransition { phase, event }),
        };
        Ok(next)
    }
}
