// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Write pacing.
//!
//! The console has no flow control, so the uploader waits a fixed time after
//! each command instead of waiting for an acknowledgment.

use std::thread;
use std::time::Duration;

use crate::protocol::{DRAIN_INTERVAL, SETTLE_INTERVAL};

/// Decides how long to wait between console writes.
pub trait Pacer {
    /// Called after every command written to the console.
    fn settle(&mut self);

    /// Called once after the last chunk.
    fn drain(&mut self);
}

/// Sleep for fixed intervals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDelay {
    pub settle: Duration,
    pub drain: Duration,
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self {
            settle: SETTLE_INTERVAL,
            drain: DRAIN_INTERVAL,
        }
    }
}

impl Pacer for FixedDelay {
    fn settle(&mut self) {
        thread::sleep(self.settle);
    }

    fn drain(&mut self) {
        thread::sleep(self.drain);
    }
}

/// Never wait.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

impl Pacer for NoDelay {
    fn settle(&mut self) {}

    fn drain(&mut self) {}
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn settle(&mut self) {
        (**self).settle()
    }

    fn drain(&mut self) {
        (**self).drain()
    }
}
