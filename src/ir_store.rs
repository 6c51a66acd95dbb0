//! Learned IR codes - a fixed table of 5-byte records.
//!
//! Storage image layout (little-endian fields):
//!
//! ```text
//! offset 0..5            reserved
//! offset slot*5 + 5      [protocol][addr_lo][addr_hi][cmd_lo][cmd_hi]
//! ```
//!
//! The table is kept in RAM and persisted as one blob by the firmware
//! (see `storage.rs` in the binary). A dirty flag tracks unsaved changes.

use crate::config::{IR_RECORD_BASE, IR_RECORD_SIZE, IR_STORAGE_LEN, MAX_IR_SIGNALS};
use crate::error::{Error, Result};
use crate::radio::IrCode;

/// Erased byte value.
const ERASED: u8 = 0xFF;

/// In-memory copy of the IR slot storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrSlotTable {
    image: [u8; IR_STORAGE_LEN],
    /// Slot the next capture is written to.
    next_slot: usize,
    /// True if the image differs from flash.
    dirty: bool,
}

impl Default for IrSlotTable {
    fn default() -> Self {
        Self::new()
    }
}

impl IrSlotTable {
    /// Create an erased table.
    pub const fn new() -> Self {
        Self {
            image: [ERASED; IR_STORAGE_LEN],
            next_slot: 0,
            dirty: false,
        }
    }

    /// Rebuild a table from a persisted image.
    ///
    /// Short images are padded with erased bytes, extra bytes are ignored.
    /// Captures resume at the first blank slot.
    pub fn from_image(data: &[u8]) -> Self {
        let mut table = Self::new();
        let len = data.len().min(IR_STORAGE_LEN);
        table.image[..len].copy_from_slice(&data[..len]);
        table.next_slot = (0..MAX_IR_SIGNALS)
            .find(|&slot| table.read(slot).map(|c| c.is_blank()).unwrap_or(false))
            .unwrap_or(0);
        table
    }

    /// Raw image for persisting.
    pub fn as_bytes(&self) -> &[u8] {
        &self.image
    }

    pub const fn capacity(&self) -> usize {
        MAX_IR_SIGNALS
    }

    fn offset(slot: usize) -> Result<usize> {
        if slot >= MAX_IR_SIGNALS {
            return Err(Error::SlotOutOfRange {
                slot,
                capacity: MAX_IR_SIGNALS,
            });
        }
        Ok(IR_RECORD_BASE + slot * IR_RECORD_SIZE)
    }

    /// Write `code` into `slot`.
    pub fn write(&mut self, slot: usize, code: &IrCode) -> Result<()> {
        let offset = Self::offset(slot)?;
        self.write_record(offset, code);
        debug!(
            "IR slot {} <- proto={} addr={:#x} cmd={:#x}",
            slot,
            code.protocol,
            code.address,
            code.command
        );
        Ok(())
    }

    /// Store the record at a checked `offset`; dirty only on change.
    fn write_record(&mut self, offset: usize, code: &IrCode) {
        let record = code.to_bytes();
        let dst = &mut self.image[offset..offset + IR_RECORD_SIZE];
        if *dst != record {
            dst.copy_from_slice(&record);
            self.dirty = true;
        }
    }

    /// Read the raw record in `slot` (may be blank).
    pub fn read(&self, slot: usize) -> Result<IrCode> {
        let offset = Self::offset(slot)?;
        let mut record = [0u8; IR_RECORD_SIZE];
        record.copy_from_slice(&self.image[offset..offset + IR_RECORD_SIZE]);
        Ok(IrCode::from_bytes(&record))
    }

    /// Read a learned code; blank slots are an error.
    pub fn code(&self, slot: usize) -> Result<IrCode> {
        let code = self.read(slot)?;
        if code.is_blank() {
            return Err(Error::BlankSlot(slot));
        }
        Ok(code)
    }

    /// Store a capture in the round-robin slot and advance it.
    /// Returns the slot written.
    pub fn store_next(&mut self, code: &IrCode) -> usize {
        let slot = self.next_slot;
        self.write_record(IR_RECORD_BASE + slot * IR_RECORD_SIZE, code);
        self.next_slot = (slot + 1) % MAX_IR_SIGNALS;
        slot
    }

    pub fn next_slot(&self) -> usize {
        self.next_slot
    }

    /// Number of slots holding a learned code.
    pub fn occupied(&self) -> usize {
        (0..MAX_IR_SIGNALS)
            .filter(|&slot| self.code(slot).is_ok())
            .count()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::ir_protocol;

    #[test]
    fn new_table_is_blank() {
        let table = IrSlotTable::new();
        assert_eq!(table.occupied(), 0);
        assert!(!table.is_dirty());
        assert_eq!(table.as_bytes().len(), 25);
        for slot in 0..MAX_IR_SIGNALS {
            assert!(table.read(slot).unwrap().is_blank());
            assert_eq!(table.code(slot), Err(Error::BlankSlot(slot)));
        }
    }

    #[test]
    fn write_read_slot_two() {
        let mut table = IrSlotTable::new();
        let code = IrCode::new(7, 0x1234, 0xABCD);
        table.write(2, &code).unwrap();
        assert_eq!(table.read(2).unwrap(), code);
        assert!(table.is_dirty());
    }

    #[test]
    fn record_lands_at_slot_offset() {
        let mut table = IrSlotTable::new();
        table.write(2, &IrCode::new(7, 0x1234, 0xABCD)).unwrap();
        assert_eq!(&table.as_bytes()[15..20], &[7, 0x34, 0x12, 0xCD, 0xAB]);
        // Reserved header and neighbours untouched.
        assert_eq!(&table.as_bytes()[..5], &[0xFF; 5]);
        assert_eq!(&table.as_bytes()[10..15], &[0xFF; 5]);
        assert_eq!(&table.as_bytes()[20..25], &[0xFF; 5]);
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let mut table = IrSlotTable::new();
        let err = Error::SlotOutOfRange {
            slot: 4,
            capacity: 4,
        };
        assert_eq!(table.write(4, &IrCode::new(8, 1, 2)), Err(err));
        assert_eq!(table.read(4), Err(err));
        assert!(table.read(usize::MAX).is_err());
        assert!(!table.is_dirty());
    }

    #[test]
    fn rewriting_same_code_stays_clean() {
        let mut table = IrSlotTable::new();
        let code = IrCode::new(ir_protocol::NEC, 0x00FF, 0x0045);
        table.write(0, &code).unwrap();
        table.mark_clean();
        table.write(0, &code).unwrap();
        assert!(!table.is_dirty());
    }

    #[test]
    fn store_next_is_round_robin() {
        let mut table = IrSlotTable::new();
        for i in 0..5u16 {
            let slot = table.store_next(&IrCode::new(ir_protocol::NEC, i, i));
            assert_eq!(slot, usize::from(i) % MAX_IR_SIGNALS);
        }
        assert_eq!(table.code(0).unwrap().command, 4);
        assert_eq!(table.code(1).unwrap().command, 1);
        assert_eq!(table.next_slot(), 1);
        assert_eq!(table.occupied(), 4);
    }

    #[test]
    fn store_next_wraps_without_leaving_the_table() {
        let mut table = IrSlotTable::new();
        for i in 0..(3 * MAX_IR_SIGNALS as u16) {
            let slot = table.store_next(&IrCode::new(ir_protocol::NEC, 0x10, i));
            assert!(slot < MAX_IR_SIGNALS);
            assert_eq!(table.code(slot).unwrap().command, i);
        }
        assert_eq!(&table.as_bytes()[..IR_RECORD_BASE], &[0xFF; 5]);
        assert_eq!(table.as_bytes().len(), IR_STORAGE_LEN);
        assert!(table.is_dirty());
    }

    #[test]
    fn image_roundtrip_resumes_at_first_blank() {
        let mut table = IrSlotTable::new();
        table.store_next(&IrCode::new(ir_protocol::NEC, 1, 1));
        table.store_next(&IrCode::new(ir_protocol::NEC, 2, 2));

        let restored = IrSlotTable::from_image(table.as_bytes());
        assert_eq!(restored.code(1).unwrap(), IrCode::new(ir_protocol::NEC, 2, 2));
        assert_eq!(restored.next_slot(), 2);
        assert!(!restored.is_dirty());
    }

    #[test]
    fn from_short_image_pads_erased() {
        let restored = IrSlotTable::from_image(&[0, 0, 0, 0, 0, 8, 1, 0, 2, 0]);
        assert_eq!(restored.code(0).unwrap(), IrCode::new(8, 1, 2));
        assert!(restored.read(1).unwrap().is_blank());
        assert_eq!(restored.next_slot(), 1);
    }

    #[test]
    fn full_table_resumes_at_zero() {
        let mut table = IrSlotTable::new();
        for i in 0..4u16 {
            table.store_next(&IrCode::new(ir_protocol::NEC, i, i));
        }
        assert_eq!(IrSlotTable::from_image(table.as_bytes()).next_slot(), 0);
    }
}
