//! Captured radio codes and the RF re-send scheduler.
//!
//! The RF-433 and IR front-ends are opaque services: they hand over decoded
//! codes and accept codes to transmit. This module only holds the data.

use crate::config::{IR_RECORD_SIZE, RF_SEND_INTERVAL_MS};

/// IR protocol identifiers (IRremote numbering).
pub mod ir_protocol {
    pub const UNKNOWN: u8 = 0;
    pub const NEC: u8 = 8;
    /// Erased storage.
    pub const BLANK: u8 = 0xFF;
}

/// Decoded IR signal: protocol, address, command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrCode {
    pub protocol: u8,
    pub address: u16,
    pub command: u16,
}

impl IrCode {
    pub const fn new(protocol: u8, address: u16, command: u16) -> Self {
        Self {
            protocol,
            address,
            command,
        }
    }

    /// Storage record: `[protocol][addr_lo][addr_hi][cmd_lo][cmd_hi]`.
    pub fn to_bytes(&self) -> [u8; IR_RECORD_SIZE] {
        let [addr_lo, addr_hi] = self.address.to_le_bytes();
        let [cmd_lo, cmd_hi] = self.command.to_le_bytes();
        [self.protocol, addr_lo, addr_hi, cmd_lo, cmd_hi]
    }

    pub fn from_bytes(bytes: &[u8; IR_RECORD_SIZE]) -> Self {
        Self {
            protocol: bytes[0],
            address: u16::from_le_bytes([bytes[1], bytes[2]]),
            command: u16::from_le_bytes([bytes[3], bytes[4]]),
        }
    }

    /// `true` for erased or never-decoded records.
    pub fn is_blank(&self) -> bool {
        matches!(self.protocol, ir_protocol::UNKNOWN | ir_protocol::BLANK)
    }
}

/// Captured RF-433 fixed code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfCode {
    /// Code bits, right-aligned, MSB sent first.
    pub value: u32,
    /// Number of bits in `value`.
    pub bit_length: u8,
    /// Line protocol number.
    pub protocol: u8,
    /// Base pulse length (µs).
    pub pulse_length_us: u16,
}

impl RfCode {
    pub const fn new(value: u32, bit_length: u8, protocol: u8, pulse_length_us: u16) -> Self {
        Self {
            value,
            bit_length,
            protocol,
            pulse_length_us,
        }
    }
}

/// Edge gap in µs for the line decoders. Gaps beyond `u32::MAX` (about
/// 71 minutes) saturate instead of wrapping.
pub fn edge_gap_us(elapsed_us: u64) -> u32 {
    u32::try_from(elapsed_us).unwrap_or(u32::MAX)
}

/// Fires at a fixed interval while enabled. The first poll after
/// [`RepeatSender::start`] fires immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepeatSender {
    interval_ms: u64,
    last_sent_ms: Option<u64>,
    enabled: bool,
}

impl Default for RepeatSender {
    fn default() -> Self {
        Self::new(RF_SEND_INTERVAL_MS)
    }
}

impl RepeatSender {
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_sent_ms: None,
            enabled: false,
        }
    }

    pub fn start(&mut self) {
        self.enabled = true;
        self.last_sent_ms = None;
    }

    pub fn stop(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `true` when a transmission is due at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if !self.enabled {
            return false;
        }
        let due = match self.last_sent_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if due {
            self.last_sent_ms = Some(now_ms);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ir_record_is_little_endian() {
        let code = IrCode::new(7, 0x1234, 0xABCD);
        assert_eq!(code.to_bytes(), [7, 0x34, 0x12, 0xCD, 0xAB]);
        assert_eq!(IrCode::from_bytes(&code.to_bytes()), code);
    }

    #[test]
    fn blank_detection() {
        assert!(IrCode::from_bytes(&[0xFF; IR_RECORD_SIZE]).is_blank());
        assert!(IrCode::new(ir_protocol::UNKNOWN, 1, 2).is_blank());
        assert!(!IrCode::new(ir_protocol::NEC, 0, 0).is_blank());
    }

    #[test]
    fn edge_gap_saturates() {
        assert_eq!(edge_gap_us(562), 562);
        assert_eq!(edge_gap_us(u64::from(u32::MAX)), u32::MAX);
        assert_eq!(edge_gap_us(u64::from(u32::MAX) + 1), u32::MAX);
        // ~2 hours idle while listening.
        assert_eq!(edge_gap_us(7_200_000_000), u32::MAX);
    }

    #[test]
    fn repeat_sender_idle_until_started() {
        let mut sender = RepeatSender::default();
        assert!(!sender.poll(0));
        assert!(!sender.poll(1_000));
    }

    #[test]
    fn repeat_sender_fires_on_interval() {
        let mut sender = RepeatSender::default();
        sender.start();
        assert!(sender.poll(1_000));
        assert!(!sender.poll(1_005));
        assert!(!sender.poll(1_299));
        assert!(sender.poll(1_300));
        assert!(!sender.poll(1_400));
        assert!(sender.poll(1_650));
    }

    #[test]
    fn repeat_sender_stop_and_restart() {
        let mut sender = RepeatSender::new(300);
        sender.start();
        assert!(sender.poll(0));
        sender.stop();
        assert!(!sender.is_enabled());
        assert!(!sender.poll(600));
        sender.start();
        assert!(sender.poll(601));
    }
}
