//! RF-433 fixed-code line protocol 1.
//!
//! With base pulse T (~350 µs):
//!   - bit 0: high T,  low 3T
//!   - bit 1: high 3T, low T
//!   - sync:  high T,  low 31T (sent after the data bits)
//!
//! [`Rf1Decoder`] arms on a sync, collects bit pairs, and reports the code
//! on the next sync once at least [`MIN_BITS`] were read. [`Rf1Pulses`]
//! yields one frame (bits MSB first, then sync) for the transmitter.

use crate::radio::RfCode;

/// The only line protocol handled here.
pub const PROTOCOL: u8 = 1;

/// Base pulse used by most protocol-1 remotes (µs).
pub const DEFAULT_PULSE_US: u16 = 350;

pub const SYNC_FACTOR: u32 = 31;
pub const TOLERANCE_PCT: u32 = 40;
pub const MIN_BITS: u8 = 8;
pub const MAX_BITS: u8 = 32;

/// Edges closer than this are receiver noise (µs).
pub const GLITCH_US: u32 = 80;

fn near(x: u32, target: u32) -> bool {
    x.abs_diff(target) <= target.saturating_mul(TOLERANCE_PCT) / 100
}

/// Edge-timing decoder. Fed with the duration of each level as it ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rf1Decoder {
    /// Base pulse taken from the last sync; `None` until armed.
    pulse_us: Option<u32>,
    high_us: Option<u32>,
    value: u32,
    bits: u8,
}

impl Rf1Decoder {
    pub const fn new() -> Self {
        Self {
            pulse_us: None,
            high_us: None,
            value: 0,
            bits: 0,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pulse_us.is_some()
    }

    fn disarm(&mut self) {
        self.pulse_us = None;
        self.value = 0;
        self.bits = 0;
    }

    /// `was_high`: level that just ended; `dt_us`: its duration.
    pub fn feed(&mut self, was_high: bool, dt_us: u32) -> Option<RfCode> {
        if was_high {
            self.high_us = Some(dt_us);
            return None;
        }
        let high = self.high_us.take()?;

        let t = dt_us / SYNC_FACTOR;
        if t > 0 && near(high, t) {
            let done = match self.pulse_us {
                Some(pulse) if self.bits >= MIN_BITS => Some(RfCode::new(
                    self.value,
                    self.bits,
                    PROTOCOL,
                    u16::try_from(pulse).unwrap_or(u16::MAX),
                )),
                _ => None,
            };
            self.pulse_us = Some(t);
            self.value = 0;
            self.bits = 0;
            return done;
        }

        let pulse = self.pulse_us?;
        let long = pulse.saturating_mul(3);
        let bit = if near(high, pulse) && near(dt_us, long) {
            0
        } else if near(high, long) && near(dt_us, pulse) {
            1
        } else {
            self.disarm();
            return None;
        };
        if self.bits == MAX_BITS {
            self.disarm();
            return None;
        }
        self.value = (self.value << 1) | bit;
        self.bits += 1;
        None
    }
}

/// `true` when `code` can be sent with protocol 1.
pub fn can_send(code: &RfCode) -> bool {
    code.protocol == PROTOCOL
        && code.bit_length > 0
        && code.bit_length <= MAX_BITS
        && code.pulse_length_us > 0
}

/// High/low durations of one frame as `(is_high, µs)`.
#[derive(Clone, Debug)]
pub struct Rf1Pulses {
    code: RfCode,
    index: usize,
}

impl Rf1Pulses {
    pub fn new(code: &RfCode) -> Self {
        Self {
            code: *code,
            index: 0,
        }
    }

    fn bits(&self) -> usize {
        usize::from(self.code.bit_length.min(MAX_BITS))
    }
}

impl Iterator for Rf1Pulses {
    type Item = (bool, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.index;
        let len = 2 * self.bits() + 2;
        if i >= len {
            return None;
        }
        self.index += 1;

        let t = u32::from(self.code.pulse_length_us);
        let high = i % 2 == 0;
        if i >= len - 2 {
            return Some(if high { (true, t) } else { (false, SYNC_FACTOR * t) });
        }
        let n = self.bits() - 1 - i / 2;
        let one = self.code.value & (1 << n) != 0;
        Some(match (one, high) {
            (true, true) | (false, false) => (high, 3 * t),
            _ => (high, t),
        })
    }
}
