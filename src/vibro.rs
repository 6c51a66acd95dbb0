//! Vibration motor - non-blocking pulse/pause patterns.
//!
//! A pattern drives the motor at `intensity` for `duration_ms`, switches it
//! off for `pause_ms`, and repeats until `repeat` pulses have been played.
//! [`Vibro::update`] must be polled from the control loop.

use embedded_hal::pwm::SetDutyCycle;

use crate::config::{
    VIBRO_DEFAULT_DURATION_MS, VIBRO_DEFAULT_INTENSITY, VIBRO_DEFAULT_PAUSE_MS,
    VIBRO_DEFAULT_REPEAT, VIBRO_ERROR_DURATION_MS, VIBRO_ERROR_INTENSITY, VIBRO_PAGE_DURATION_MS,
    VIBRO_PAGE_INTENSITY, VIBRO_PAGE_PAUSE_MS,
};
use crate::error::Result;
use crate::led::set_level;

/// Parameters of one vibration pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VibroPattern {
    pub intensity: u8,
    pub duration_ms: u64,
    pub repeat: u8,
    pub pause_ms: u64,
}

impl Default for VibroPattern {
    fn default() -> Self {
        Self::new(
            VIBRO_DEFAULT_INTENSITY,
            VIBRO_DEFAULT_DURATION_MS,
            VIBRO_DEFAULT_REPEAT,
            VIBRO_DEFAULT_PAUSE_MS,
        )
    }
}

impl VibroPattern {
    pub const fn new(intensity: u8, duration_ms: u64, repeat: u8, pause_ms: u64) -> Self {
        Self {
            intensity,
            duration_ms,
            repeat,
            pause_ms,
        }
    }

    /// Tactile page indicator: one pulse per page number (1-based).
    pub const fn page_indicator(page: u8) -> Self {
        Self::new(
            VIBRO_PAGE_INTENSITY,
            VIBRO_PAGE_DURATION_MS,
            page.saturating_add(1),
            VIBRO_PAGE_PAUSE_MS,
        )
    }

    /// `count` default pulses.
    pub const fn pulses(count: u8) -> Self {
        Self::new(
            VIBRO_DEFAULT_INTENSITY,
            VIBRO_DEFAULT_DURATION_MS,
            count,
            VIBRO_DEFAULT_PAUSE_MS,
        )
    }

    /// Single long buzz for a rejected action.
    pub const fn error() -> Self {
        Self::new(VIBRO_ERROR_INTENSITY, VIBRO_ERROR_DURATION_MS, 1, 0)
    }
}

/// Vibration state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Vibro {
    active: bool,
    start_ms: u64,
    duration_ms: u64,
    intensity: u8,
    repeat_count: u8,
    pause_ms: u64,
    waiting_pause: bool,
}

impl Vibro {
    pub const fn new() -> Self {
        Self {
            active: false,
            start_ms: 0,
            duration_ms: 0,
            intensity: 0,
            repeat_count: 0,
            pause_ms: 0,
            waiting_pause: false,
        }
    }

    /// (Re)start a pattern; the first pulse begins immediately.
    ///
    /// A pattern with `repeat == 0` stops any running pattern.
    pub fn start(&mut self, pattern: VibroPattern, now_ms: u64) {
        *self = Self {
            active: pattern.repeat > 0,
            start_ms: now_ms,
            duration_ms: pattern.duration_ms,
            intensity: pattern.intensity,
            repeat_count: pattern.repeat,
            pause_ms: pattern.pause_ms,
            waiting_pause: false,
        };
    }

    /// Advance the pulse/pause phases.
    pub fn update(&mut self, now_ms: u64) {
        if !self.active {
            return;
        }

        let elapsed = now_ms.saturating_sub(self.start_ms);
        if !self.waiting_pause {
            if elapsed >= self.duration_ms {
                self.waiting_pause = true;
                self.start_ms = now_ms;
            }
        } else if elapsed >= self.pause_ms {
            self.repeat_count = self.repeat_count.saturating_sub(1);
            if self.repeat_count == 0 {
                self.active = false;
                self.waiting_pause = false;
            } else {
                self.waiting_pause = false;
                self.start_ms = now_ms;
            }
        }
    }

    pub fn stop(&mut self) {
        *self = Self::new();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pulses left, including the one in progress.
    pub fn remaining(&self) -> u8 {
        self.repeat_count
    }

    /// Motor level the current phase asks for.
    pub fn level(&self) -> u8 {
        if self.active && !self.waiting_pause {
            self.intensity
        } else {
            0
        }
    }
}

/// PWM-driven vibration motor.
///
/// Writes only when the requested level changes, so [`VibroMotor::sync`]
/// can run every loop iteration.
pub struct VibroMotor<P> {
    pin: P,
    level: Option<u8>,
}

impl<P: SetDutyCycle> VibroMotor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, level: None }
    }

    /// Apply the level `vibro` currently asks for.
    pub fn sync(&mut self, vibro: &Vibro) -> Result<()> {
        let level = vibro.level();
        if self.level != Some(level) {
            set_level(&mut self.pin, level)?;
            self.level = Some(level);
        }
        Ok(())
    }

    pub fn start(&mut self, vibro: &mut Vibro, pattern: VibroPattern, now_ms: u64) -> Result<()> {
        vibro.start(pattern, now_ms);
        self.sync(vibro)
    }

    pub fn update(&mut self, vibro: &mut Vibro, now_ms: u64) -> Result<()> {
        vibro.update(now_ms);
        self.sync(vibro)
    }

    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::tests::RecordingPwm;
    use heapless::Vec;

    /// Poll every `step_ms` until the pattern ends; return (on, off) phase
    /// lengths in order.
    fn trace(pattern: VibroPattern, step_ms: u64) -> Vec<(bool, u64), 32> {
        let mut vibro = Vibro::new();
        vibro.start(pattern, 0);

        let mut phases: Vec<(bool, u64), 32> = Vec::new();
        let mut on = vibro.level() > 0;
        let mut since = 0;
        let mut now = 0;

        while vibro.is_active() {
            now += step_ms;
            vibro.update(now);
            let level_on = vibro.level() > 0;
            if level_on != on || !vibro.is_active() {
                phases.push((on, now - since)).unwrap();
                on = level_on;
                since = now;
            }
            assert!(now < 10_000, "pattern never finished");
        }
        phases
    }

    #[test]
    fn default_pattern() {
        let p = VibroPattern::default();
        assert_eq!(p, VibroPattern::new(120, 100, 1, 150));
    }

    #[test]
    fn page_indicator_repeats_page_plus_one() {
        assert_eq!(VibroPattern::page_indicator(0).repeat, 1);
        assert_eq!(VibroPattern::page_indicator(3).repeat, 4);
        assert_eq!(VibroPattern::page_indicator(255).repeat, 255);
        assert_eq!(VibroPattern::page_indicator(2).intensity, 150);
    }

    #[test]
    fn start_drives_motor_immediately() {
        let mut vibro = Vibro::new();
        assert_eq!(vibro.level(), 0);
        vibro.start(VibroPattern::new(100, 50, 3, 20), 1_000);
        assert!(vibro.is_active());
        assert_eq!(vibro.level(), 100);
        assert_eq!(vibro.remaining(), 3);
    }

    #[test]
    fn three_pulses_two_pauses() {
        let phases = trace(VibroPattern::new(100, 50, 3, 20), 10);
        assert_eq!(
            phases.as_slice(),
            &[
                (true, 50),
                (false, 20),
                (true, 50),
                (false, 20),
                (true, 50),
                (false, 20),
            ]
        );
        let pulses = phases.iter().filter(|(on, _)| *on).count();
        assert_eq!(pulses, 3);
    }

    #[test]
    fn ends_inactive_and_silent() {
        let mut vibro = Vibro::new();
        vibro.start(VibroPattern::new(100, 50, 1, 20), 0);
        vibro.update(50);
        assert!(vibro.is_active());
        assert_eq!(vibro.level(), 0);
        vibro.update(70);
        assert!(!vibro.is_active());
        assert_eq!(vibro.level(), 0);
        assert_eq!(vibro.remaining(), 0);
    }

    #[test]
    fn restart_replaces_running_pattern() {
        let mut vibro = Vibro::new();
        vibro.start(VibroPattern::new(100, 50, 3, 20), 0);
        vibro.update(50);
        assert_eq!(vibro.level(), 0);

        vibro.start(VibroPattern::new(200, 10, 1, 0), 55);
        assert_eq!(vibro.level(), 200);
        assert_eq!(vibro.remaining(), 1);
        vibro.update(65);
        vibro.update(65);
        assert!(!vibro.is_active());
    }

    #[test]
    fn zero_repeat_does_not_start() {
        let mut vibro = Vibro::new();
        vibro.start(VibroPattern::new(100, 50, 0, 20), 0);
        assert!(!vibro.is_active());
        assert_eq!(vibro.level(), 0);
    }

    #[test]
    fn update_when_idle_is_noop() {
        let mut vibro = Vibro::new();
        vibro.update(1_000);
        assert_eq!(vibro, Vibro::new());
    }

    #[test]
    fn motor_writes_only_on_change() {
        let mut motor = VibroMotor::new(RecordingPwm::new(255));
        let mut vibro = Vibro::new();

        motor.start(&mut vibro, VibroPattern::new(100, 50, 2, 20), 0).unwrap();
        for now in (10..=200).step_by(10) {
            motor.update(&mut vibro, now).unwrap();
        }

        let pwm = motor.release();
        assert_eq!(pwm.history.as_slice(), &[100, 0, 100, 0]);
    }
}
