//! `embedded-hal` PWM channel view over an nRF `SimplePwm`.
//!
//! One PWM peripheral drives four outputs (LED red/green/blue + vibration
//! motor). Each output gets its own `SetDutyCycle` handle sharing the
//! peripheral through a `RefCell`; all handles live in the control task.

use core::cell::RefCell;
use core::convert::Infallible;

use embassy_nrf::peripherals;
use embassy_nrf::pwm::SimplePwm;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

pub type FeedbackPwm = SimplePwm<'static, peripherals::PWM0>;

/// One channel of the shared feedback PWM.
pub struct PwmChannel {
    pwm: &'static RefCell<FeedbackPwm>,
    channel: usize,
}

impl PwmChannel {
    pub fn new(pwm: &'static RefCell<FeedbackPwm>, channel: usize) -> Self {
        Self { pwm, channel }
    }
}

impl ErrorType for PwmChannel {
    type Error = Infallible;
}

impl SetDutyCycle for PwmChannel {
    fn max_duty_cycle(&self) -> u16 {
        self.pwm.borrow().max_duty()
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.pwm.borrow_mut().set_duty(self.channel, duty);
        Ok(())
    }
}
