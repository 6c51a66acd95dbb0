//! RF-433 front-end for fixed-code remotes (line protocol 1, see
//! `ir433_tool::rf_pulse`).
//!
//! The receiver feeds edge timings to [`Rf1Decoder`]; the transmitter
//! bit-bangs [`Rf1Pulses`] on the data pin `TX_REPEATS` times.

use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Input, Output};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_time::{Duration, Instant, Timer};
use ir433_tool::radio::edge_gap_us;
use ir433_tool::rf_pulse::{self, GLITCH_US};
use ir433_tool::{Rf1Decoder, Rf1Pulses, RfCode};

use crate::ir_nec::ListenSignal;

pub type RfCaptureSender = Sender<'static, CriticalSectionRawMutex, RfCode, 2>;
pub type RfSendReceiver = Receiver<'static, CriticalSectionRawMutex, RfCode, 2>;

const TX_REPEATS: usize = 10;

/// Receiver task. One-shot: armed by `true` on `listen`, disarmed after a
/// capture or by `false`.
#[embassy_executor::task]
pub async fn rf_rx_task(
    mut pin: Input<'static>,
    listen: &'static ListenSignal,
    captured: RfCaptureSender,
) -> ! {
    loop {
        while !listen.wait().await {}
        info!("RF: listening");

        let mut decoder = Rf1Decoder::new();
        let mut was_high = pin.is_high();
        let mut last_edge = Instant::now();

        loop {
            match select(pin.wait_for_any_edge(), listen.wait()).await {
                Either::First(()) => {
                    let now = Instant::now();
                    let dt = edge_gap_us(now.duration_since(last_edge).as_micros());
                    if dt < GLITCH_US {
                        continue;
                    }
                    last_edge = now;

                    let code = decoder.feed(was_high, dt);
                    was_high = pin.is_high();
                    if let Some(code) = code {
                        info!("RF: decoded {} ({} bits)", code.value, code.bit_length);
                        captured.send(code).await;
                        break;
                    }
                }
                Either::Second(true) => debug!("RF: already listening"),
                Either::Second(false) => {
                    info!("RF: listen cancelled");
                    break;
                }
            }
        }
    }
}

async fn level(pin: &mut Output<'static>, high: bool, us: u32) {
    if high {
        pin.set_high();
    } else {
        pin.set_low();
    }
    Timer::after(Duration::from_micros(u64::from(us))).await;
}

/// Transmitter task.
#[embassy_executor::task]
pub async fn rf_tx_task(mut pin: Output<'static>, requests: RfSendReceiver) -> ! {
    pin.set_low();

    loop {
        let code = requests.receive().await;
        if !rf_pulse::can_send(&code) {
            warn!("RF: cannot send {}", code);
            continue;
        }

        for _ in 0..TX_REPEATS {
            for (high, us) in Rf1Pulses::new(&code) {
                level(&mut pin, high, us).await;
            }
        }
        pin.set_low();
        info!("RF: sent {} ({} bits)", code.value, code.bit_length);
    }
}
