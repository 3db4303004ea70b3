//! Per-dose "taken" flags.
//!
//! Confirming a dose flips the first untaken flag (oldest first; the user
//! does not pick a slot). The slate only empties when a telemetry publish
//! reporting it is acknowledged, and flags and count reset together, so
//! the count always equals the number of set flags.

use crate::config::SLATE_SIZE;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DoseSlate {
    taken: [bool; SLATE_SIZE],
    confirmed: u8,
}

impl DoseSlate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the first untaken dose and return its slot. A full slate is
    /// left untouched and reported as [`Error::DoseSlateExhausted`].
    pub fn confirm_next(&mut self) -> Result<usize> {
        let slot = self.taken.iter().position(|t| !t).ok_or(Error::DoseSlateExhausted)?;
        self.taken[slot] = true;
        self.confirmed += 1;
        Ok(slot)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_taken(&self, slot: usize) -> bool {
        self.taken.get(slot).copied().unwrap_or(false)
    }

    pub fn confirmed_count(&self) -> u8 {
        self.confirmed
    }

    /// Any dose confirmed since the last reset.
    pub fn any_confirmed(&self) -> bool {
        self.confirmed > 0
    }

    pub fn untaken(&self) -> impl Iterator<Item = usize> + '_ {
        self.taken.iter().enumerate().filter(|(_, t)| !**t).map(|(i, _)| i)
    }
}
