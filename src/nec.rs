//! NEC infrared line code.
//!
//! A frame is a 9 ms mark and a 4.5 ms space followed by 32 bits, LSB
//! first: address, address complement (or the high address byte for
//! extended NEC), command, command complement. Each bit is a 562 µs mark
//! and a 562 µs (0) or 1687 µs (1) space; a closing mark ends the frame.
//!
//! [`NecDecoder`] consumes edge timings from a demodulating (active-low)
//! receiver; [`NecPulses`] yields the mark/space durations to transmit.

use crate::radio::{ir_protocol, IrCode};

// Receive windows (µs)
const GLITCH_US: u32 = 120;
const LDR_LOW: (u32, u32) = (7_500, 10_500);
const LDR_HIGH: (u32, u32) = (3_700, 5_300);
const BIT_LOW: (u32, u32) = (360, 760);
const BIT0_HIGH: (u32, u32) = (310, 810);
const BIT1_HIGH: (u32, u32) = (1_190, 2_190);

// Transmit timings (µs)
pub const LEADER_MARK_US: u32 = 9_000;
pub const LEADER_SPACE_US: u32 = 4_500;
pub const BIT_MARK_US: u32 = 562;
pub const ZERO_SPACE_US: u32 = 562;
pub const ONE_SPACE_US: u32 = 1_687;

/// Marks and spaces in one frame: leader, 32 bits, closing mark.
pub const FRAME_PULSES: usize = 2 + 2 * 32 + 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Idle,
    LdrLow,
    LdrHigh,
    BitLow { n: u8, v: u32 },
    BitHigh { n: u8, v: u32 },
}

/// NEC frame decoder. Repeat frames are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NecDecoder {
    state: State,
}

impl Default for NecDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NecDecoder {
    pub const fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    fn within(x: u32, r: (u32, u32)) -> bool {
        x >= r.0 && x <= r.1
    }

    /// Check the command complement and build the code. The address is
    /// 8-bit when its complement matches, otherwise extended 16-bit.
    fn frame(v: u32) -> Option<IrCode> {
        let [a, an, c, cn] = v.to_le_bytes();
        if c ^ cn != 0xFF {
            return None;
        }
        let address = if a ^ an == 0xFF {
            u16::from(a)
        } else {
            u16::from_le_bytes([a, an])
        };
        Some(IrCode::new(ir_protocol::NEC, address, u16::from(c)))
    }

    /// Feed one edge: `level_low` is the line level after the edge, `dt_us`
    /// the time since the previous edge. Returns a code on the edge that
    /// completes a valid frame.
    pub fn feed(&mut self, level_low: bool, dt_us: u32) -> Option<IrCode> {
        if dt_us < GLITCH_US {
            return None;
        }
        use State::*;
        self.state = match self.state {
            Idle if level_low => LdrLow,
            Idle => Idle,
            LdrLow if !level_low && Self::within(dt_us, LDR_LOW) => LdrHigh,
            LdrHigh if level_low && Self::within(dt_us, LDR_HIGH) => BitLow { n: 0, v: 0 },
            BitLow { n, v } if !level_low && Self::within(dt_us, BIT_LOW) => BitHigh { n, v },
            BitHigh { n, mut v } if level_low => {
                if Self::within(dt_us, BIT1_HIGH) {
                    v |= 1u32 << n;
                } else if !Self::within(dt_us, BIT0_HIGH) {
                    self.state = Idle;
                    return None;
                }
                if n == 31 {
                    self.state = Idle;
                    return Self::frame(v);
                }
                BitLow { n: n + 1, v }
            }
            // A new leader may start right after a broken frame.
            _ if level_low => LdrLow,
            _ => Idle,
        };
        None
    }
}

/// 32-bit payload for `code`, LSB first on the wire. Only the low command
/// byte is sent.
pub fn frame_bits(code: &IrCode) -> u32 {
    let [addr_lo, addr_hi] = code.address.to_le_bytes();
    let addr_hi = if code.address <= 0xFF { !addr_lo } else { addr_hi };
    let cmd = code.command as u8;
    u32::from_le_bytes([addr_lo, addr_hi, cmd, !cmd])
}

/// Mark/space durations of one frame as `(is_mark, µs)`.
#[derive(Clone, Debug)]
pub struct NecPulses {
    bits: u32,
    index: usize,
}

impl NecPulses {
    pub fn new(code: &IrCode) -> Self {
        Self::from_bits(frame_bits(code))
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self { bits, index: 0 }
    }
}

impl Iterator for NecPulses {
    type Item = (bool, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.index;
        if i >= FRAME_PULSES {
            return None;
        }
        self.index += 1;

        Some(match i {
            0 => (true, LEADER_MARK_US),
            1 => (false, LEADER_SPACE_US),
            i if i % 2 == 0 => (true, BIT_MARK_US),
            i => {
                let n = (i - 3) / 2;
                if self.bits & (1 << n) != 0 {
                    (false, ONE_SPACE_US)
                } else {
                    (false, ZERO_SPACE_US)
                }
            }
        })
    }
}
