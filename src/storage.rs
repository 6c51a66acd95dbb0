//! Persistent storage for learned IR codes.
//!
//! Uses the nRF52840's internal flash via `sequential-storage` crate to
//! keep the IR slot image across power cycles.
//!
//! Storage layout:
//!   - One map item under `KEY_IR_SLOTS` holding the raw slot image
//!     (`[reserved 5][slot0 5][slot1 5]...`, see `ir_store`).
//!   - Items are appended sequentially; the flash pages are managed by
//!     `sequential-storage` which handles wear levelling and GC.

use defmt::{debug, error, info};
use embedded_storage_async::nor_flash::NorFlash;
use ir433_tool::config::{IR_STORAGE_LEN, STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use ir433_tool::{Error, IrSlotTable, Result};

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

/// Key for the IR slot image in the map storage.
const KEY_IR_SLOTS: u8 = 0x01;

/// Scratch buffer size: item header + image, rounded up to the word size.
const BUF_SIZE: usize = 64;

/// Load the IR slot table from flash. Missing or unreadable data yields an
/// erased table.
pub async fn load(flash: &mut impl NorFlash) -> IrSlotTable {
    let mut buf = [0u8; BUF_SIZE];

    match sequential_storage::map::fetch_item::<u8, &[u8], _>(
        flash,
        STORAGE_START..STORAGE_END,
        &mut sequential_storage::cache::NoCache::new(),
        &mut buf,
        &KEY_IR_SLOTS,
    )
    .await
    {
        Ok(Some(data)) => {
            let table = IrSlotTable::from_image(data);
            info!(
                "Loaded {} IR codes from flash ({} bytes)",
                table.occupied(),
                data.len()
            );
            table
        }
        Ok(None) => {
            info!("No IR codes in flash");
            IrSlotTable::new()
        }
        Err(e) => {
            error!("Flash read error: {:?}", defmt::Debug2Format(&e));
            IrSlotTable::new()
        }
    }
}

/// Persist the IR slot table if it changed since the last save.
pub async fn save(flash: &mut impl NorFlash, table: &mut IrSlotTable) -> Result<()> {
    if !table.is_dirty() {
        debug!("IR slots: no changes to save");
        return Ok(());
    }

    let mut buf = [0u8; BUF_SIZE];
    let mut image = [0u8; IR_STORAGE_LEN];
    image.copy_from_slice(table.as_bytes());
    let item: &[u8] = &image;

    match sequential_storage::map::store_item::<u8, &[u8], _>(
        flash,
        STORAGE_START..STORAGE_END,
        &mut sequential_storage::cache::NoCache::new(),
        &mut buf,
        &KEY_IR_SLOTS,
        &item,
    )
    .await
    {
        Ok(_) => {
            info!("Saved {} IR codes to flash", table.occupied());
            table.mark_clean();
            Ok(())
        }
        Err(e) => {
            error!("Flash write error: {:?}", defmt::Debug2Format(&e));
            Err(Error::Storage)
        }
    }
}
