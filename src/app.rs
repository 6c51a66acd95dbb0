//! Application controller - menu state machine for the remote.
//!
//! Owns every piece of UI state (menu, page counters, effect states, RF
//! capture, IR slot table) and turns button presses and radio captures into
//! [`Action`]s for the firmware. Nothing here touches hardware; the control
//! loop feeds in the current time and applies the outputs.
//!
//! ## Pages
//!
//! ```text
//! Main   0 RF433         1 IR
//! RF     0 Capture       1 Send      2 Repeat    3 Back
//! IR     0 Capture       1 Replay
//! ```
//!
//! SELECT activates the page; while an activity runs (listening, repeat
//! sending, slot selection) the page is "selected" and UP/DOWN no longer
//! change pages. BACK (long press) ends the activity or returns to Main.

use crate::battery;
use crate::config::{IR_PAGES_COUNT, MAIN_PAGES_COUNT, MAX_IR_SIGNALS, RF_PAGES_COUNT};
use crate::error::Error;
use crate::ir_store::IrSlotTable;
use crate::led::{Breath, Rgb};
use crate::menu::{ButtonEvent, MenuState, Pager};
use crate::radio::{IrCode, RepeatSender, RfCode};
use crate::vibro::{Vibro, VibroPattern};

/// Page numbers per menu.
pub mod pages {
    pub const MAIN_RF: u8 = 0;
    pub const MAIN_IR: u8 = 1;

    pub const RF_CAPTURE: u8 = 0;
    pub const RF_SEND: u8 = 1;
    pub const RF_REPEAT: u8 = 2;
    pub const RF_BACK: u8 = 3;

    pub const IR_CAPTURE: u8 = 0;
    pub const IR_REPLAY: u8 = 1;
}

/// Commands for the radio front-ends and storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Arm (`true`) or cancel (`false`) a one-shot RF capture.
    ListenRf(bool),
    /// Arm (`true`) or cancel (`false`) a one-shot IR capture.
    ListenIr(bool),
    /// Transmit an RF code.
    SendRf(RfCode),
    /// Transmit an IR code.
    SendIr(IrCode),
    /// Persist the IR slot table.
    SaveIrSlots,
}

/// Activity running on the current page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activity {
    Idle,
    Listening,
    Repeating,
    SlotSelect,
}

pub struct App {
    menu: MenuState,
    main_page: Pager,
    rf_page: Pager,
    ir_page: Pager,
    ir_slot: Pager,
    activity: Activity,

    rf_capture: Option<RfCode>,
    rf_repeat: RepeatSender,
    ir_slots: IrSlotTable,

    vibro: Vibro,
    breath: Breath,
    battery_color: Rgb,
    /// Solid color last handed out by `led_frame`.
    solid: Option<Rgb>,
}

impl App {
    pub fn new(ir_slots: IrSlotTable) -> Self {
        Self {
            menu: MenuState::Main,
            main_page: Pager::new(MAIN_PAGES_COUNT),
            rf_page: Pager::new(RF_PAGES_COUNT),
            ir_page: Pager::new(IR_PAGES_COUNT),
            ir_slot: Pager::new(MAX_IR_SIGNALS as u8),
            activity: Activity::Idle,
            rf_capture: None,
            rf_repeat: RepeatSender::default(),
            ir_slots,
            vibro: Vibro::new(),
            breath: Breath::new(),
            battery_color: Rgb::GREEN,
            solid: None,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn menu(&self) -> MenuState {
        self.menu
    }

    /// Page index within the current menu.
    pub fn page(&self) -> u8 {
        self.pager().page()
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn is_page_selected(&self) -> bool {
        self.activity != Activity::Idle
    }

    /// Slot highlighted during IR replay slot selection.
    pub fn selected_slot(&self) -> usize {
        usize::from(self.ir_slot.page())
    }

    pub fn rf_capture(&self) -> Option<&RfCode> {
        self.rf_capture.as_ref()
    }

    pub fn ir_slots(&self) -> &IrSlotTable {
        &self.ir_slots
    }

    pub fn ir_slots_mut(&mut self) -> &mut IrSlotTable {
        &mut self.ir_slots
    }

    pub fn vibro(&self) -> &Vibro {
        &self.vibro
    }

    pub fn battery_color(&self) -> Rgb {
        self.battery_color
    }

    fn pager(&self) -> &Pager {
        match self.menu {
            MenuState::Main => &self.main_page,
            MenuState::Rf => &self.rf_page,
            MenuState::Ir => &self.ir_page,
        }
    }

    fn pager_mut(&mut self) -> &mut Pager {
        match self.menu {
            MenuState::Main => &mut self.main_page,
            MenuState::Rf => &mut self.rf_page,
            MenuState::Ir => &mut self.ir_page,
        }
    }

    // ── Inputs ─────────────────────────────────────────────────────────────

    /// React to a debounced button press.
    pub fn handle_button(&mut self, event: ButtonEvent, now_ms: u64) -> Option<Action> {
        debug!("Button {:?} in {:?}/{}", event, self.menu, self.page());

        if event == ButtonEvent::Back {
            return self.back(now_ms);
        }

        match self.activity {
            Activity::Idle => match event {
                ButtonEvent::Up | ButtonEvent::Down => {
                    let pulse = self.pager_mut().navigate(event);
                    self.pulse(pulse, now_ms);
                    None
                }
                _ => self.activate(now_ms),
            },
            Activity::Listening => {
                if event != ButtonEvent::Select {
                    return None;
                }
                self.activity = Activity::Idle;
                info!("Capture cancelled");
                Some(self.listen_action(false))
            }
            Activity::Repeating => {
                if event == ButtonEvent::Select {
                    self.stop_repeat();
                }
                None
            }
            Activity::SlotSelect => match event {
                ButtonEvent::Up | ButtonEvent::Down => {
                    let pulse = self.ir_slot.navigate(event);
                    self.pulse(pulse, now_ms);
                    None
                }
                _ => self.send_selected_slot(now_ms),
            },
        }
    }

    /// A code arrived from the RF receiver.
    pub fn on_rf_received(&mut self, code: RfCode, now_ms: u64) -> Option<Action> {
        if self.menu != MenuState::Rf || self.activity != Activity::Listening {
            debug!("RF code ignored (not listening)");
            return None;
        }
        info!(
            "RF captured: value={} bits={} proto={} pulse={}us",
            code.value, code.bit_length, code.protocol, code.pulse_length_us
        );
        self.rf_capture = Some(code);
        self.activity = Activity::Idle;
        self.vibro.start(VibroPattern::pulses(2), now_ms);
        None
    }

    /// A code arrived from the IR receiver.
    pub fn on_ir_received(&mut self, code: IrCode, now_ms: u64) -> Option<Action> {
        if self.menu != MenuState::Ir || self.activity != Activity::Listening {
            debug!("IR code ignored (not listening)");
            return None;
        }
        if code.is_blank() {
            warn!("IR capture with unknown protocol dropped");
            self.vibro.start(VibroPattern::error(), now_ms);
            self.activity = Activity::Idle;
            return None;
        }
        let slot = self.ir_slots.store_next(&code);
        info!(
            "IR captured into slot {}: proto={} addr={} cmd={}",
            slot, code.protocol, code.address, code.command
        );
        self.ir_slot.set(slot as u8);
        self.activity = Activity::Idle;
        self.vibro
            .start(VibroPattern::page_indicator(slot as u8), now_ms);
        Some(Action::SaveIrSlots)
    }

    /// Record a fresh battery reading.
    pub fn set_battery_voltage(&mut self, volts: f32) {
        let color = battery::battery_color(volts);
        if color != self.battery_color {
            info!("Battery tier changed: {} V", volts);
        }
        self.battery_color = color;
    }

    // ── Periodic ───────────────────────────────────────────────────────────

    /// Advance timers. Call every loop iteration.
    pub fn poll(&mut self, now_ms: u64) -> Option<Action> {
        self.vibro.update(now_ms);

        if self.activity == Activity::Repeating && self.rf_repeat.poll(now_ms) {
            return self.rf_capture.map(Action::SendRf);
        }
        None
    }

    /// Next LED frame, if the LED needs updating.
    ///
    /// Solid blue while listening, solid orange while repeat-sending,
    /// otherwise breathing in the battery color.
    pub fn led_frame(&mut self, now_ms: u64) -> Option<Rgb> {
        let solid = match self.activity {
            Activity::Listening => Some(Rgb::BLUE),
            Activity::Repeating => Some(Rgb::ORANGE),
            Activity::Idle | Activity::SlotSelect => None,
        };

        match solid {
            Some(color) if self.solid == Some(color) => None,
            Some(color) => {
                self.solid = Some(color);
                Some(color)
            }
            None => {
                self.solid = None;
                self.breath.tick(now_ms, self.battery_color)
            }
        }
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn pulse(&mut self, pattern: Option<VibroPattern>, now_ms: u64) {
        if let Some(pattern) = pattern {
            self.vibro.start(pattern, now_ms);
        }
    }

    fn reject(&mut self, reason: Error, now_ms: u64) {
        warn!("Rejected: {:?}", reason);
        self.vibro.start(VibroPattern::error(), now_ms);
    }

    fn listen_action(&self, on: bool) -> Action {
        match self.menu {
            MenuState::Ir => Action::ListenIr(on),
            _ => Action::ListenRf(on),
        }
    }

    fn enter(&mut self, menu: MenuState, now_ms: u64) {
        info!("Menu {:?} -> {:?}", self.menu, menu);
        self.menu = menu;
        self.activity = Activity::Idle;
        self.vibro.start(VibroPattern::default(), now_ms);
    }

    fn stop_repeat(&mut self) {
        self.rf_repeat.stop();
        self.activity = Activity::Idle;
        info!("RF repeat stopped");
    }

    /// SELECT on an idle page.
    fn activate(&mut self, now_ms: u64) -> Option<Action> {
        let page = self.page();
        match self.menu {
            MenuState::Main => {
                let target = if page == pages::MAIN_RF {
                    MenuState::Rf
                } else {
                    MenuState::Ir
                };
                self.enter(target, now_ms);
                None
            }
            MenuState::Rf => match page {
                pages::RF_CAPTURE => {
                    info!("RF listening");
                    self.activity = Activity::Listening;
                    Some(Action::ListenRf(true))
                }
                pages::RF_SEND => match self.rf_capture {
                    Some(code) => Some(Action::SendRf(code)),
                    None => {
                        self.reject(Error::NothingCaptured, now_ms);
                        None
                    }
                },
                pages::RF_REPEAT => {
                    if self.rf_capture.is_none() {
                        self.reject(Error::NothingCaptured, now_ms);
                        return None;
                    }
                    info!("RF repeat started");
                    self.rf_repeat.start();
                    self.activity = Activity::Repeating;
                    None
                }
                _ => {
                    self.enter(MenuState::Main, now_ms);
                    None
                }
            },
            MenuState::Ir => match page {
                pages::IR_CAPTURE => {
                    info!("IR listening");
                    self.activity = Activity::Listening;
                    Some(Action::ListenIr(true))
                }
                _ => {
                    self.activity = Activity::SlotSelect;
                    let slot = self.ir_slot.page();
                    self.vibro
                        .start(VibroPattern::page_indicator(slot), now_ms);
                    None
                }
            },
        }
    }

    fn send_selected_slot(&mut self, now_ms: u64) -> Option<Action> {
        match self.ir_slots.code(self.selected_slot()) {
            Ok(code) => Some(Action::SendIr(code)),
            Err(e) => {
                self.reject(e, now_ms);
                None
            }
        }
    }

    /// Long press: end the running activity, else go up one menu level.
    fn back(&mut self, now_ms: u64) -> Option<Action> {
        match self.activity {
            Activity::Listening => {
                self.activity = Activity::Idle;
                Some(self.listen_action(false))
            }
            Activity::Repeating => {
                self.stop_repeat();
                None
            }
            Activity::SlotSelect => {
                self.activity = Activity::Idle;
                None
            }
            Activity::Idle => {
                if self.menu != MenuState::Main {
                    self.enter(MenuState::Main, now_ms);
                }
                None
            }
        }
    }
}
