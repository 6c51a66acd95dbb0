//! GPIO button input with async debouncing.
//!
//! Three physical buttons (active-low with internal pull-up):
//!   - OK   - short press: SELECT, long press: BACK
//!   - UP   - previous page
//!   - DOWN - next page
//!
//! Each button is handled by an async task that waits for a GPIO edge,
//! debounces it, and sends a `ButtonEvent` to the control loop channel.

use defmt::info;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;
use ir433_tool::config::{BUTTON_DEBOUNCE_MS, LONG_PRESS_MS};
use ir433_tool::ButtonEvent;

/// Depth of the button event channel.
pub const BUTTON_QUEUE: usize = 4;

pub type ButtonSender = Sender<'static, CriticalSectionRawMutex, ButtonEvent, BUTTON_QUEUE>;

/// Run a single button polling loop.
///
/// Waits for the pin to go low (pressed), debounces, then either sends
/// `short` on release or `long` once the press outlasts `LONG_PRESS_MS`.
/// Buttons without a long action send `short` immediately.
pub async fn button_task<P>(
    mut btn: P,
    short: ButtonEvent,
    long: Option<ButtonEvent>,
    tx: ButtonSender,
) -> !
where
    P: Wait + InputPin,
{
    loop {
        // Wait for falling edge (button press, active-low).
        let _ = btn.wait_for_falling_edge().await;

        // Debounce: wait and re-check.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        if !btn.is_low().unwrap_or(false) {
            continue;
        }

        let event = match long {
            None => short,
            Some(long) => {
                let hold = Duration::from_millis(LONG_PRESS_MS - BUTTON_DEBOUNCE_MS);
                match select(btn.wait_for_rising_edge(), Timer::after(hold)).await {
                    Either::First(_) => short,
                    Either::Second(()) => long,
                }
            }
        };

        info!("Button: {}", event);
        tx.send(event).await;

        // Wait for release to avoid repeat triggers.
        if btn.is_low().unwrap_or(false) {
            let _ = btn.wait_for_rising_edge().await;
        }
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
    }
}
