//! Single-flight guards for audio playback and remote checks.

use serde::Serialize;

/// A flag that admits one operation at a time.
///
/// A request arriving while another is in flight is dropped, not queued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SingleFlight {
    in_flight: bool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot. Returns false if something is already in flight.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Release the slot. Safe to call when idle.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }
}
