//! Battery voltage conversion and the status-color ladder.
//!
//! The cell is measured through a resistor divider on a 12-bit ADC input:
//!
//! ```text
//! V = VOLTAGE_COEF × (raw / 4095 × VREF) × (1 + R1 / R2)
//! ```

use crate::config::{
    ADC_MAX, BATTERY_GOOD_V, BATTERY_LOW_V, R1, R2, SAADC_FULL_SCALE_V, VOLTAGE_COEF, VREF,
};
use crate::led::Rgb;

/// Convert one raw ADC sample to the battery voltage.
///
/// Samples outside `0..=4095` read as 0 V.
pub fn voltage_from_raw(raw: i32) -> f32 {
    voltage_at_full_scale(raw, VREF)
}

/// Convert one raw sample taken with an ADC whose 4095 reading is
/// `full_scale_v` at the pin.
pub fn voltage_at_full_scale(raw: i32, full_scale_v: f32) -> f32 {
    if !(0..=ADC_MAX).contains(&raw) {
        return 0.0;
    }
    VOLTAGE_COEF * ((raw as f32 / ADC_MAX as f32) * full_scale_v) * (1.0 + (R1 / R2))
}

/// Convert one nRF SAADC sample (internal reference, gain 1/2).
pub fn voltage_from_saadc(raw: i32) -> f32 {
    voltage_at_full_scale(raw, SAADC_FULL_SCALE_V)
}

/// Voltage reported for a full-scale sample.
pub fn full_scale_voltage() -> f32 {
    voltage_from_raw(ADC_MAX)
}

/// Discrete charge tier shown on the status LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryLevel {
    /// ≥ 3.8 V
    Good,
    /// ≥ 3.5 V
    Low,
    Critical,
}

impl BatteryLevel {
    pub fn from_voltage(volts: f32) -> Self {
        if volts >= BATTERY_GOOD_V {
            BatteryLevel::Good
        } else if volts >= BATTERY_LOW_V {
            BatteryLevel::Low
        } else {
            BatteryLevel::Critical
        }
    }

    pub const fn color(self) -> Rgb {
        match self {
            BatteryLevel::Good => Rgb::GREEN,
            BatteryLevel::Low => Rgb::ORANGE,
            BatteryLevel::Critical => Rgb::RED,
        }
    }
}

/// Status color for a battery voltage.
pub fn battery_color(volts: f32) -> Rgb {
    BatteryLevel::from_voltage(volts).color()
}
