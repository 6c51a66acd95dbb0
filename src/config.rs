//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, calibration values and
//! menu layout constants live here so they can be tuned in one place.

// Battery sensing

/// Upper divider resistor (kΩ) between the cell and the ADC pin.
pub const R1: f32 = 9.74;

/// Lower divider resistor (kΩ) between the ADC pin and ground.
pub const R2: f32 = 1.003;

/// ADC reference voltage (V).
pub const VREF: f32 = 1.024;

/// Per-board calibration factor applied to the computed voltage.
pub const VOLTAGE_COEF: f32 = 1.004455;

/// Number of samples intended for averaging. The sampler takes one reading.
pub const VOLTAGE_SAMPLE_COUNT: usize = 10;

/// Pin voltage at a full-scale nRF SAADC reading: 0.6 V internal reference
/// at gain 1/2. The battery channel in `main.rs` is configured to match.
pub const SAADC_FULL_SCALE_V: f32 = 1.2;

/// Full-scale reading of the 12-bit battery ADC.
pub const ADC_MAX: i32 = 4095;

/// At or above this voltage the battery is shown green.
pub const BATTERY_GOOD_V: f32 = 3.8;

/// At or above this voltage (and below `BATTERY_GOOD_V`) the battery is orange.
pub const BATTERY_LOW_V: f32 = 3.5;

/// Interval between battery samples in the control loop (ms).
pub const BATTERY_CHECK_INTERVAL_MS: u64 = 2_000;

// Menu layout

pub const MAIN_PAGES_COUNT: u8 = 2;
pub const RF_PAGES_COUNT: u8 = 4;
pub const IR_PAGES_COUNT: u8 = 2;

// IR slot storage

/// Number of IR codes that can be learned.
pub const MAX_IR_SIGNALS: usize = 4;

/// Size of one serialized IR record: protocol, address (LE), command (LE).
pub const IR_RECORD_SIZE: usize = 5;

/// Byte offset of slot 0. Bytes before it are reserved.
pub const IR_RECORD_BASE: usize = 5;

/// Size of the persisted storage image.
pub const IR_STORAGE_LEN: usize = IR_RECORD_BASE + IR_RECORD_SIZE * MAX_IR_SIGNALS;

/// Flash page index where IR slot storage starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 250;

/// Number of flash pages reserved for IR slot storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 2;

// RF-433

/// Interval between transmissions while repeat-sending (ms).
pub const RF_SEND_INTERVAL_MS: u64 = 300;

// Effects

/// Minimum time between breathing steps (ms).
pub const BREATH_DELAY_MS: u64 = 10;

/// Brightness change per breathing step.
pub const BREATH_STEP: i16 = 5;

/// Default vibration pulse: intensity, duration (ms), repeat, pause (ms).
pub const VIBRO_DEFAULT_INTENSITY: u8 = 120;
pub const VIBRO_DEFAULT_DURATION_MS: u64 = 100;
pub const VIBRO_DEFAULT_REPEAT: u8 = 1;
pub const VIBRO_DEFAULT_PAUSE_MS: u64 = 150;

/// Page-change pulse: intensity, duration (ms), pause (ms). Repeat is page + 1.
pub const VIBRO_PAGE_INTENSITY: u8 = 150;
pub const VIBRO_PAGE_DURATION_MS: u64 = 100;
pub const VIBRO_PAGE_PAUSE_MS: u64 = 120;

/// Long buzz used to signal a rejected action.
pub const VIBRO_ERROR_INTENSITY: u8 = 255;
pub const VIBRO_ERROR_DURATION_MS: u64 = 400;

// Buttons & control loop

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Holding OK at least this long sends `Back` instead of `Select` (ms).
pub const LONG_PRESS_MS: u64 = 600;

/// Control loop period (ms).
pub const TICK_MS: u64 = 5;

// GPIO pin assignments (nRF52840 board defaults)
//
// These are logical names; the concrete `embassy_nrf::peripherals::*` are
// picked in `main.rs`.  Adjust for your custom PCB.
//
//   Button OK      → P0.11
//   Button UP      → P0.12
//   Button DOWN    → P0.24
//   LED red        → P0.13  (PWM0 ch0)
//   LED green      → P0.14  (PWM0 ch1)
//   LED blue       → P0.15  (PWM0 ch2)
//   Vibration      → P0.16  (PWM0 ch3)
//   RF TX          → P0.17
//   RF RX          → P0.19
//   IR TX          → P0.20  (PWM1 ch0, 38 kHz carrier)
//   IR RX          → P0.21
//   Battery sense  → P0.02  (AIN0)

/// PWM counter top for the LED/motor channels; 8-bit levels map 1:1.
pub const PWM_MAX_DUTY: u16 = 255;

/// IR carrier frequency (Hz).
pub const IR_CARRIER_HZ: u32 = 38_000;
