//! NEC infrared front-end: edge-timing receiver and carrier transmitter.
//!
//! Receive: the demodulating IR receiver (active-low) is sampled by edge
//! timestamps and fed to [`NecDecoder`]. Capture is one-shot:
//! the task is armed by `Action::ListenIr(true)` and disarms itself after
//! delivering one code.
//!
//! Transmit: [`NecPulses`] marks are 38 kHz carrier bursts on PWM1, spaces
//! are carrier off.

use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::Input;
use embassy_nrf::peripherals;
use embassy_nrf::pwm::{Prescaler, SimplePwm};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use ir433_tool::config::IR_CARRIER_HZ;
use ir433_tool::radio::{edge_gap_us, ir_protocol};
use ir433_tool::{IrCode, NecDecoder, NecPulses};

pub type ListenSignal = Signal<CriticalSectionRawMutex, bool>;
pub type IrCaptureSender = Sender<'static, CriticalSectionRawMutex, IrCode, 2>;
pub type IrSendReceiver = Receiver<'static, CriticalSectionRawMutex, IrCode, 2>;

/// Receiver task.
#[embassy_executor::task]
pub async fn ir_rx_task(
    mut pin: Input<'static>,
    listen: &'static ListenSignal,
    captured: IrCaptureSender,
) -> ! {
    loop {
        // Wait until armed.
        while !listen.wait().await {}
        info!("IR: listening");

        let mut decoder = NecDecoder::new();
        let mut last_edge = Instant::now();

        loop {
            match select(pin.wait_for_any_edge(), listen.wait()).await {
                Either::First(()) => {
                    let now = Instant::now();
                    let dt = edge_gap_us(now.duration_since(last_edge).as_micros());
                    last_edge = now;

                    if let Some(code) = decoder.feed(pin.is_low(), dt) {
                        info!("IR: decoded addr={:#x} cmd={:#x}", code.address, code.command);
                        captured.send(code).await;
                        break;
                    }
                }
                Either::Second(true) => debug!("IR: already listening"),
                Either::Second(false) => {
                    info!("IR: listen cancelled");
                    break;
                }
            }
        }
    }
}

pub type IrPwm = SimplePwm<'static, peripherals::PWM1>;

/// Configure PWM1 channel 0 as the 38 kHz carrier, initially off.
fn init_carrier(pwm: &mut IrPwm) {
    pwm.set_prescaler(Prescaler::Div1);
    pwm.set_max_duty((16_000_000 / IR_CARRIER_HZ) as u16);
    pwm.set_duty(0, 0);
}

/// Carrier on (`mark`) or off for `us`.
async fn pulse(pwm: &mut IrPwm, mark: bool, us: u32) {
    // ~33% duty carrier.
    let duty = if mark { pwm.max_duty() / 3 } else { 0 };
    pwm.set_duty(0, duty);
    Timer::after(Duration::from_micros(u64::from(us))).await;
}

/// Transmitter task.
#[embassy_executor::task]
pub async fn ir_tx_task(mut pwm: IrPwm, requests: IrSendReceiver) -> ! {
    init_carrier(&mut pwm);

    loop {
        let code = requests.receive().await;
        if code.protocol != ir_protocol::NEC {
            warn!("IR: protocol {} not supported for send", code.protocol);
            continue;
        }

        for (mark, us) in NecPulses::new(&code) {
            pulse(&mut pwm, mark, us).await;
        }
        pwm.set_duty(0, 0);
        info!("IR: sent addr={:#x} cmd={:#x}", code.address, code.command);
    }
}
