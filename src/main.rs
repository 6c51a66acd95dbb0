//! ir433-tool firmware - nRF52840 entry point.
//!
//! Task layout:
//!   - three button tasks feeding `BUTTONS`
//!   - RF-433 and IR receive/transmit tasks (see `rf433`, `ir_nec`)
//!   - the control loop in `main`: owns the `App`, the feedback PWM
//!     (RGB LED + vibration motor), the battery ADC and the flash
//!
//! The control loop wakes on every button event and every `TICK_MS`.

#![no_std]
#![no_main]

mod buttons;
mod ir_nec;
mod pwm;
mod rf433;
mod storage;

use core::cell::RefCell;

use defmt::{error, info, warn};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::bind_interrupts;
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::nvmc::Nvmc;
use embassy_nrf::pwm::{Prescaler, SimplePwm};
use embassy_nrf::saadc::{self, ChannelConfig, Gain, Reference, Resolution, Saadc};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};
use ir433_tool::battery;
use ir433_tool::config::{BATTERY_CHECK_INTERVAL_MS, PWM_MAX_DUTY, TICK_MS};
use ir433_tool::{Action, App, ButtonEvent, IrCode, RfCode, RgbLed, VibroMotor};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::buttons::{ButtonSender, BUTTON_QUEUE};
use crate::ir_nec::ListenSignal;
use crate::pwm::{FeedbackPwm, PwmChannel};

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
});

static BUTTONS: Channel<CriticalSectionRawMutex, ButtonEvent, BUTTON_QUEUE> = Channel::new();

static RF_CAPTURED: Channel<CriticalSectionRawMutex, RfCode, 2> = Channel::new();
static IR_CAPTURED: Channel<CriticalSectionRawMutex, IrCode, 2> = Channel::new();
static RF_TX: Channel<CriticalSectionRawMutex, RfCode, 2> = Channel::new();
static IR_TX: Channel<CriticalSectionRawMutex, IrCode, 2> = Channel::new();

static RF_LISTEN: ListenSignal = Signal::new();
static IR_LISTEN: ListenSignal = Signal::new();

static FEEDBACK_PWM: StaticCell<RefCell<FeedbackPwm>> = StaticCell::new();

type Flash = BlockingAsync<Nvmc<'static>>;

#[embassy_executor::task(pool_size = 3)]
async fn button(
    pin: Input<'static>,
    short: ButtonEvent,
    long: Option<ButtonEvent>,
    tx: ButtonSender,
) -> ! {
    buttons::button_task(pin, short, long, tx).await
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Hand an action to the radio tasks or the flash.
async fn dispatch(action: Action, app: &mut App, flash: &mut Flash) {
    match action {
        Action::ListenRf(on) => RF_LISTEN.signal(on),
        Action::ListenIr(on) => IR_LISTEN.signal(on),
        Action::SendRf(code) => {
            if RF_TX.try_send(code).is_err() {
                warn!("RF: transmitter busy, dropped send");
            }
        }
        Action::SendIr(code) => {
            if IR_TX.try_send(code).is_err() {
                warn!("IR: transmitter busy, dropped send");
            }
        }
        Action::SaveIrSlots => {
            if let Err(e) = storage::save(flash, app.ir_slots_mut()).await {
                error!("IR slots not saved: {}", e);
            }
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("ir433-tool starting");

    // ── Storage ──────────────────────────────────────────────────────────
    let mut flash: Flash = BlockingAsync::new(Nvmc::new(p.NVMC));
    let slots = storage::load(&mut flash).await;
    let mut app = App::new(slots);

    // ── Feedback PWM: R, G, B, vibration motor ───────────────────────────
    let mut feedback = SimplePwm::new_4ch(p.PWM0, p.P0_13, p.P0_14, p.P0_15, p.P0_16);
    feedback.set_prescaler(Prescaler::Div16);
    feedback.set_max_duty(PWM_MAX_DUTY);
    let feedback: &'static RefCell<FeedbackPwm> = FEEDBACK_PWM.init(RefCell::new(feedback));

    let mut led = RgbLed::new(
        PwmChannel::new(feedback, 0),
        PwmChannel::new(feedback, 1),
        PwmChannel::new(feedback, 2),
    );
    let mut motor = VibroMotor::new(PwmChannel::new(feedback, 3));
    if let Err(e) = led.off() {
        warn!("LED init failed: {}", e);
    }

    // ── Battery ADC ──────────────────────────────────────────────────────
    // 0.6 V internal reference at gain 1/2: 1.2 V full scale (SAADC_FULL_SCALE_V).
    let mut adc_config = saadc::Config::default();
    adc_config.resolution = Resolution::_12BIT;
    let mut battery_channel = ChannelConfig::single_ended(p.P0_02);
    battery_channel.reference = Reference::INTERNAL;
    battery_channel.gain = Gain::GAIN1_2;
    let mut adc = Saadc::new(p.SAADC, Irqs, adc_config, [battery_channel]);
    adc.calibrate().await;

    // ── Buttons ──────────────────────────────────────────────────────────
    let ok = Input::new(p.P0_11, Pull::Up);
    let up = Input::new(p.P0_12, Pull::Up);
    let down = Input::new(p.P0_24, Pull::Up);
    let tx = BUTTONS.sender();
    spawner.must_spawn(button(ok, ButtonEvent::Select, Some(ButtonEvent::Back), tx));
    spawner.must_spawn(button(up, ButtonEvent::Up, None, tx));
    spawner.must_spawn(button(down, ButtonEvent::Down, None, tx));

    // ── Radios ───────────────────────────────────────────────────────────
    let rf_rx = Input::new(p.P0_19, Pull::None);
    let rf_tx = Output::new(p.P0_17, Level::Low, OutputDrive::Standard);
    spawner.must_spawn(rf433::rf_rx_task(rf_rx, &RF_LISTEN, RF_CAPTURED.sender()));
    spawner.must_spawn(rf433::rf_tx_task(rf_tx, RF_TX.receiver()));

    let ir_rx = Input::new(p.P0_21, Pull::Up);
    let ir_tx = SimplePwm::new_1ch(p.PWM1, p.P0_20);
    spawner.must_spawn(ir_nec::ir_rx_task(ir_rx, &IR_LISTEN, IR_CAPTURED.sender()));
    spawner.must_spawn(ir_nec::ir_tx_task(ir_tx, IR_TX.receiver()));

    info!("Ready - {} IR codes stored", app.ir_slots().occupied());

    // ── Control loop ─────────────────────────────────────────────────────
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    let mut next_battery_ms = 0u64;

    loop {
        let button = match select(BUTTONS.receive(), ticker.next()).await {
            Either::First(event) => Some(event),
            Either::Second(()) => None,
        };
        let now = now_ms();

        if let Some(event) = button {
            if let Some(action) = app.handle_button(event, now) {
                dispatch(action, &mut app, &mut flash).await;
            }
        }

        while let Ok(code) = RF_CAPTURED.try_receive() {
            if let Some(action) = app.on_rf_received(code, now) {
                dispatch(action, &mut app, &mut flash).await;
            }
        }
        while let Ok(code) = IR_CAPTURED.try_receive() {
            if let Some(action) = app.on_ir_received(code, now) {
                dispatch(action, &mut app, &mut flash).await;
            }
        }

        if let Some(action) = app.poll(now) {
            dispatch(action, &mut app, &mut flash).await;
        }

        if let Err(e) = motor.sync(app.vibro()) {
            warn!("Vibration motor: {}", e);
        }
        if let Some(color) = app.led_frame(now) {
            if let Err(e) = led.set_color(color) {
                warn!("LED: {}", e);
            }
        }

        if now >= next_battery_ms {
            next_battery_ms = now + BATTERY_CHECK_INTERVAL_MS;
            let mut buf = [0i16; 1];
            adc.sample(&mut buf).await;
            let volts = battery::voltage_from_saadc(i32::from(buf[0]));
            info!("Battery: {} V (raw {})", volts, buf[0]);
            app.set_battery_voltage(volts);
        }
    }
}
