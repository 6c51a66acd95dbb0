//! Menu navigation - page counters driven by the up/down buttons.

use crate::vibro::VibroPattern;

/// Top-level menu the device is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuState {
    Main,
    Rf,
    Ir,
}

/// Physical button events (after debouncing).
///
///   - UP/DOWN: previous / next page
///   - SELECT: short press of OK, context-dependent action
///   - BACK: long press of OK
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    Up,
    Down,
    Select,
    Back,
}

/// Previous page, wrapping from 0 to `count - 1`.
pub fn page_prev(page: u8, count: u8) -> u8 {
    let count = u16::from(count.max(1));
    ((u16::from(page) + count - 1) % count) as u8
}

/// Next page, wrapping from `count - 1` to 0.
pub fn page_next(page: u8, count: u8) -> u8 {
    let count = u16::from(count.max(1));
    ((u16::from(page) + 1) % count) as u8
}

/// Apply one round of button clicks to `page`.
///
/// Both inputs are honoured when pressed together. Returns the tactile
/// page-indicator pulse when anything was clicked.
pub fn menu_buttons(page: &mut u8, count: u8, up: bool, down: bool) -> Option<VibroPattern> {
    let mut changed = false;
    if up {
        *page = page_prev(*page, count);
        changed = true;
    }
    if down {
        *page = page_next(*page, count);
        changed = true;
    }
    changed.then(|| VibroPattern::page_indicator(*page))
}

/// One page counter with a fixed page count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    page: u8,
    count: u8,
}

impl Pager {
    pub const fn new(count: u8) -> Self {
        Self {
            page: 0,
            count: if count == 0 { 1 } else { count },
        }
    }

    pub fn page(&self) -> u8 {
        self.page
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    /// Jump to `page`, wrapped into range.
    pub fn set(&mut self, page: u8) {
        self.page = page % self.count;
    }

    /// Handle an Up/Down event; other events are ignored.
    pub fn navigate(&mut self, event: ButtonEvent) -> Option<VibroPattern> {
        let up = event == ButtonEvent::Up;
        let down = event == ButtonEvent::Down;
        menu_buttons(&mut self.page, self.count, up, down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_from_zero() {
        let mut page = 0;
        let pulse = menu_buttons(&mut page, 4, false, true);
        assert_eq!(page, 1);
        assert_eq!(pulse, Some(VibroPattern::page_indicator(1)));
        assert_eq!(pulse.unwrap().repeat, 2);
    }

    #[test]
    fn up_from_zero_wraps() {
        let mut page = 0;
        let pulse = menu_buttons(&mut page, 4, true, false);
        assert_eq!(page, 3);
        assert_eq!(pulse.unwrap().repeat, 4);
    }

    #[test]
    fn down_from_last_wraps() {
        assert_eq!(page_next(3, 4), 0);
        assert_eq!(page_next(1, 2), 0);
    }

    #[test]
    fn no_click_no_pulse() {
        let mut page = 2;
        assert_eq!(menu_buttons(&mut page, 4, false, false), None);
        assert_eq!(page, 2);
    }

    #[test]
    fn up_and_down_together_cancel_but_pulse() {
        let mut page = 2;
        let pulse = menu_buttons(&mut page, 4, true, true);
        assert_eq!(page, 2);
        assert_eq!(pulse.unwrap().repeat, 3);
    }

    #[test]
    fn single_page_stays_put() {
        assert_eq!(page_next(0, 1), 0);
        assert_eq!(page_prev(0, 1), 0);
        assert_eq!(page_prev(0, 0), 0);
    }

    #[test]
    fn large_counts_do_not_overflow() {
        assert_eq!(page_prev(0, 255), 254);
        assert_eq!(page_next(254, 255), 0);
    }

    #[test]
    fn pager_navigates_and_ignores_select() {
        let mut pager = Pager::new(2);
        assert!(pager.navigate(ButtonEvent::Select).is_none());
        assert!(pager.navigate(ButtonEvent::Back).is_none());
        assert_eq!(pager.page(), 0);

        pager.navigate(ButtonEvent::Down);
        assert_eq!(pager.page(), 1);
        pager.navigate(ButtonEvent::Down);
        assert_eq!(pager.page(), 0);
        pager.navigate(ButtonEvent::Up);
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn pager_set_wraps() {
        let mut pager = Pager::new(4);
        pager.set(6);
        assert_eq!(pager.page(), 2);
        assert_eq!(Pager::new(0).count(), 1);
    }
}
