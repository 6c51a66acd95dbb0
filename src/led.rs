//! RGB status LED - color palette, PWM output and the breathing animation.
//!
//! The LED is three independent PWM channels (common-cathode RGB LED).
//! Colors are 8-bit per channel and map onto the channel's full duty range.

use embedded_hal::pwm::{Error as _, SetDutyCycle};

use crate::battery;
use crate::config::{BREATH_DELAY_MS, BREATH_STEP};
use crate::error::{Error, Result};

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const ORANGE: Rgb = Rgb::new(255, 150, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `brightness / 255`.
    pub fn scaled(self, brightness: u8) -> Self {
        let scale = |c: u8| ((u16::from(c) * u16::from(brightness)) / 255) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }
}

/// Write an 8-bit level to a PWM channel.
pub(crate) fn set_level<P: SetDutyCycle>(pin: &mut P, level: u8) -> Result<()> {
    pin.set_duty_cycle_fraction(u16::from(level), 255)
        .map_err(|e| Error::from(e.kind()))
}

/// Three PWM channels driving one RGB LED.
pub struct RgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    current: Rgb,
}

impl<R, G, B> RgbLed<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    pub fn new(red: R, green: G, blue: B) -> Self {
        Self {
            red,
            green,
            blue,
            current: Rgb::OFF,
        }
    }

    /// Drive all three channels.
    pub fn set_color(&mut self, color: Rgb) -> Result<()> {
        set_level(&mut self.red, color.r)?;
        set_level(&mut self.green, color.g)?;
        set_level(&mut self.blue, color.b)?;
        self.current = color;
        Ok(())
    }

    pub fn off(&mut self) -> Result<()> {
        self.set_color(Rgb::OFF)
    }

    /// Last color written.
    pub fn color(&self) -> Rgb {
        self.current
    }

    /// Show the battery tier color for `volts`.
    pub fn show_battery(&mut self, volts: f32) -> Result<()> {
        self.set_color(battery::battery_color(volts))
    }

    /// Advance `state` and write the new frame if one is due.
    pub fn breathe(&mut self, state: &mut Breath, now_ms: u64, color: Rgb) -> Result<()> {
        if let Some(frame) = state.tick(now_ms, color) {
            self.set_color(frame)?;
        }
        Ok(())
    }

    pub fn release(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }
}

/// Breathing animation state.
///
/// Brightness walks between 0 and 255 in `step` increments, one step per
/// `delay_ms`, flipping direction at either bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Breath {
    last_ms: u64,
    brightness: i16,
    direction: i16,
    delay_ms: u64,
    step: i16,
}

impl Default for Breath {
    fn default() -> Self {
        Self::new()
    }
}

impl Breath {
    pub const fn new() -> Self {
        Self::with_timing(BREATH_DELAY_MS, BREATH_STEP)
    }

    pub const fn with_timing(delay_ms: u64, step: i16) -> Self {
        Self {
            last_ms: 0,
            brightness: 0,
            direction: 1,
            delay_ms,
            step,
        }
    }

    pub fn brightness(&self) -> u8 {
        self.brightness as u8
    }

    /// `1` while brightening, `-1` while dimming.
    pub fn direction(&self) -> i8 {
        self.direction as i8
    }

    /// Restart from dark, brightening.
    pub fn reset(&mut self) {
        *self = Self::with_timing(self.delay_ms, self.step);
    }

    /// Advance one step if more than `delay_ms` has passed since the last
    /// step. Returns the scaled color when a step was taken.
    pub fn tick(&mut self, now_ms: u64, color: Rgb) -> Option<Rgb> {
        if now_ms.saturating_sub(self.last_ms) <= self.delay_ms {
            return None;
        }

        self.brightness += self.direction * self.step;
        if self.brightness <= 0 || self.brightness >= 255 {
            self.direction = -self.direction;
            self.brightness = self.brightness.clamp(0, 255);
        }
        self.last_ms = now_ms;

        Some(color.scaled(self.brightness as u8))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::convert::Infallible;
    use heapless::Vec;

    /// PWM channel that records every duty value written to it.
    pub(crate) struct RecordingPwm {
        pub max: u16,
        pub history: Vec<u16, 512>,
    }

    impl RecordingPwm {
        pub(crate) fn new(max: u16) -> Self {
            Self {
                max,
                history: Vec::new(),
            }
        }

        pub(crate) fn last(&self) -> Option<u16> {
            self.history.last().copied()
        }
    }

    impl embedded_hal::pwm::ErrorType for RecordingPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for RecordingPwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> core::result::Result<(), Infallible> {
            let _ = self.history.push(duty);
            Ok(())
        }
    }

    fn led() -> RgbLed<RecordingPwm, RecordingPwm, RecordingPwm> {
        RgbLed::new(
            RecordingPwm::new(255),
            RecordingPwm::new(255),
            RecordingPwm::new(255),
        )
    }

    // ════════════════════════════════════════════════════════════════════════
    // Color Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn scaled_full_and_zero() {
        assert_eq!(Rgb::ORANGE.scaled(255), Rgb::ORANGE);
        assert_eq!(Rgb::ORANGE.scaled(0), Rgb::OFF);
    }

    #[test]
    fn scaled_half() {
        assert_eq!(Rgb::new(255, 150, 10).scaled(128), Rgb::new(128, 75, 5));
    }

    #[test]
    fn set_color_writes_each_channel() {
        let mut led = led();
        led.set_color(Rgb::ORANGE).unwrap();
        assert_eq!(led.color(), Rgb::ORANGE);

        let (r, g, b) = led.release();
        assert_eq!(r.last(), Some(255));
        assert_eq!(g.last(), Some(150));
        assert_eq!(b.last(), Some(0));
    }

    #[test]
    fn set_color_scales_to_channel_range() {
        let mut led = RgbLed::new(
            RecordingPwm::new(1000),
            RecordingPwm::new(1000),
            RecordingPwm::new(1000),
        );
        led.set_color(Rgb::new(255, 0, 51)).unwrap();
        let (r, g, b) = led.release();
        assert_eq!(r.last(), Some(1000));
        assert_eq!(g.last(), Some(0));
        assert_eq!(b.last(), Some(200));
    }

    #[test]
    fn show_battery_drives_tier_color() {
        let mut led = led();
        led.show_battery(4.0).unwrap();
        assert_eq!(led.color(), Rgb::GREEN);
        led.show_battery(3.6).unwrap();
        assert_eq!(led.color(), Rgb::ORANGE);
        led.show_battery(3.0).unwrap();
        assert_eq!(led.color(), Rgb::RED);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Breathing Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn breath_waits_for_delay() {
        let mut breath = Breath::new();
        assert_eq!(breath.tick(5, Rgb::GREEN), None);
        assert_eq!(breath.tick(10, Rgb::GREEN), None);
        assert_eq!(breath.tick(11, Rgb::GREEN), Some(Rgb::GREEN.scaled(5)));
        assert_eq!(breath.tick(21, Rgb::GREEN), None);
        assert_eq!(breath.tick(22, Rgb::GREEN), Some(Rgb::GREEN.scaled(10)));
    }

    #[test]
    fn breath_peaks_once_then_dims() {
        let mut breath = Breath::new();
        let mut now = 0;
        let mut peaks = 0;

        while breath.direction() == 1 {
            now += 11;
            breath.tick(now, Rgb::BLUE);
            if breath.brightness() == 255 {
                peaks += 1;
            }
        }
        assert_eq!(peaks, 1);
        assert_eq!(breath.brightness(), 255);

        now += 11;
        breath.tick(now, Rgb::BLUE);
        assert_eq!(breath.brightness(), 250);
    }

    #[test]
    fn breath_clamps_with_uneven_step() {
        let mut breath = Breath::with_timing(0, 7);
        for now in 1..2_000 {
            breath.tick(now, Rgb::RED);
            let b = breath.brightness;
            assert!((0..=255).contains(&b));
        }
    }

    #[test]
    fn breath_reset_restarts_dark() {
        let mut breath = Breath::new();
        breath.tick(100, Rgb::RED);
        breath.reset();
        assert_eq!(breath.brightness(), 0);
        assert_eq!(breath.direction(), 1);
    }

    #[test]
    fn led_breathe_writes_only_on_step() {
        let mut led = led();
        let mut breath = Breath::new();
        led.breathe(&mut breath, 5, Rgb::RED).unwrap();
        led.breathe(&mut breath, 11, Rgb::RED).unwrap();
        let (r, _, _) = led.release();
        assert_eq!(r.history.len(), 1);
        assert_eq!(r.last(), Some(5));
    }
}
