//! Host-testable library for the ir433-tool remote.
//!
//! All UI and storage logic lives here so it can be tested on the host
//! (no embedded hardware required): menu paging, LED breathing, vibration
//! patterns, battery color ladder, IR slot table, the NEC and RF-433
//! line codes, and the application controller that ties them together.
//!
//! Usage: `cargo test --lib` / `cargo test --test integration`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and links this crate for its logic. Hardware seams are the
//! `embedded-hal` PWM traits, so the same code drives the real LED/motor
//! channels and the recording mocks in tests.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod app;
pub mod battery;
pub mod config;
pub mod error;
pub mod ir_store;
pub mod led;
pub mod menu;
pub mod nec;
pub mod radio;
pub mod rf_pulse;
pub mod vibro;

pub use app::{Action, Activity, App};
pub use error::{Error, Result};
pub use ir_store::IrSlotTable;
pub use led::{Breath, Rgb, RgbLed};
pub use menu::{ButtonEvent, MenuState, Pager};
pub use nec::{NecDecoder, NecPulses};
pub use radio::{IrCode, RepeatSender, RfCode};
pub use rf_pulse::{Rf1Decoder, Rf1Pulses};
pub use vibro::{Vibro, VibroMotor, VibroPattern};
