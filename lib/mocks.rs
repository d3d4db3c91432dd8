//! Test doubles for the hardware traits. Each mock is a cheap handle onto
//! shared state so a test keeps a clone for inspection after handing one to
//! the code under test.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayMs;

use crate::ack::{AckInput, AckLatch};
use crate::display::DisplayAdapter;
use crate::indicator::{Indicator, Phase};
use crate::sampler::{AnalogInput, Channel, Sample};
use crate::timer::{Counter, Overflows};

/// Ordered record of hardware events shared between mocks.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Resting level returned once a channel's queue runs dry.
pub const IDLE_LIGHT: Sample = 1000;

#[derive(Default)]
struct AdcState {
    selected: Option<Channel>,
    front: VecDeque<Sample>,
    back: VecDeque<Sample>,
    front_conversions: usize,
    back_conversions: usize,
}

#[derive(Clone)]
pub struct MockAdc {
    state: Rc<RefCell<AdcState>>,
    journal: Journal,
}

impl MockAdc {
    pub fn new() -> Self {
        MockAdc::sharing(&journal())
    }

    pub fn sharing(journal: &Journal) -> Self {
        MockAdc {
            state: Rc::new(RefCell::new(AdcState::default())),
            journal: journal.clone(),
        }
    }

    pub fn push(&self, channel: Channel, samples: &[Sample]) {
        let mut state = self.state.borrow_mut();
        let queue = match channel {
            Channel::Front => &mut state.front,
            Channel::Back => &mut state.back,
        };
        queue.extend(samples.iter().copied());
    }

    pub fn conversions(&self, channel: Channel) -> usize {
        let state = self.state.borrow();
        match channel {
            Channel::Front => state.front_conversions,
            Channel::Back => state.back_conversions,
        }
    }

    pub fn selected(&self) -> Option<Channel> {
        self.state.borrow().selected
    }
}

impl AnalogInput for MockAdc {
    fn select(&mut self, channel: Channel) {
        self.state.borrow_mut().selected = Some(channel);
    }

    fn convert(&mut self) -> Sample {
        let mut state = self.state.borrow_mut();
        let channel = state.selected.expect("conversion without a selected channel");
        self.journal
            .borrow_mut()
            .push(format!("convert {:?}", channel));
        match channel {
            Channel::Front => {
                state.front_conversions += 1;
                state.front.pop_front().unwrap_or(IDLE_LIGHT)
            }
            Channel::Back => {
                state.back_conversions += 1;
                state.back.pop_front().unwrap_or(IDLE_LIGHT)
            }
        }
    }
}

struct CounterState {
    range: u32,
    value: u32,
    enabled: bool,
    pending: u32,
}

#[derive(Clone)]
pub struct MockCounter {
    state: Rc<RefCell<CounterState>>,
    journal: Journal,
}

impl MockCounter {
    pub fn new(range: u32) -> Self {
        MockCounter::sharing(range, &journal())
    }

    pub fn sharing(range: u32, journal: &Journal) -> Self {
        MockCounter {
            state: Rc::new(RefCell::new(CounterState {
                range,
                value: 0,
                enabled: false,
                pending: 0,
            })),
            journal: journal.clone(),
        }
    }

    /// Let `ticks` pass. Rollovers raise the pending flag, as the hardware
    /// does while the overflow interrupt is masked.
    pub fn advance(&self, ticks: u32) {
        let mut state = self.state.borrow_mut();
        if !state.enabled {
            return;
        }
        let total = state.value as u64 + ticks as u64;
        state.pending += (total / state.range as u64) as u32;
        state.value = (total % state.range as u64) as u32;
    }

    /// Run the overflow interrupt for every pending rollover.
    pub fn service_overflow(&self, overflows: &Overflows) {
        let mut state = self.state.borrow_mut();
        for _ in 0..state.pending {
            overflows.record();
        }
        state.pending = 0;
    }

    pub fn enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    pub fn value(&self) -> u32 {
        self.state.borrow().value
    }
}

impl Counter for MockCounter {
    fn enable(&mut self) {
        self.state.borrow_mut().enabled = true;
        self.journal.borrow_mut().push("timer enable".into());
    }

    fn disable(&mut self) {
        self.state.borrow_mut().enabled = false;
        self.journal.borrow_mut().push("timer disable".into());
    }

    fn reset(&mut self) {
        self.state.borrow_mut().value = 0;
    }

    fn count(&self) -> u32 {
        self.state.borrow().value
    }

    fn overflow_pending(&self) -> bool {
        self.state.borrow().pending > 0
    }

    fn clear_overflow(&mut self) {
        self.state.borrow_mut().pending = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Clear,
    Cursor(u8),
    Text(String),
    Hex(u8),
}

#[derive(Clone)]
pub struct MockDisplay {
    events: Rc<RefCell<Vec<Screen>>>,
}

impl MockDisplay {
    pub fn new() -> Self {
        MockDisplay {
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<Screen> {
        self.events.borrow().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Screen::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.texts().pop()
    }

    pub fn forget(&self) {
        self.events.borrow_mut().clear();
    }
}

impl DisplayAdapter for MockDisplay {
    type Error = ();

    fn clear(&mut self) -> Result<(), ()> {
        self.events.borrow_mut().push(Screen::Clear);
        Ok(())
    }

    fn set_cursor(&mut self, position: u8) -> Result<(), ()> {
        self.events.borrow_mut().push(Screen::Cursor(position));
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), ()> {
        self.events.borrow_mut().push(Screen::Text(text.into()));
        Ok(())
    }

    fn write_hex_byte(&mut self, byte: u8) -> Result<(), ()> {
        self.events.borrow_mut().push(Screen::Hex(byte));
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockIndicator {
    phases: Rc<RefCell<Vec<Phase>>>,
}

impl MockIndicator {
    pub fn new() -> Self {
        MockIndicator {
            phases: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.phases.borrow().clone()
    }

    pub fn current(&self) -> Option<Phase> {
        self.phases.borrow().last().copied()
    }
}

impl Indicator for MockIndicator {
    fn show(&mut self, phase: Phase) {
        self.phases.borrow_mut().push(phase);
    }
}

#[derive(Clone)]
pub struct MockDelay {
    total_ms: Rc<RefCell<u64>>,
}

impl MockDelay {
    pub fn new() -> Self {
        MockDelay {
            total_ms: Rc::new(RefCell::new(0)),
        }
    }

    pub fn total_ms(&self) -> u64 {
        *self.total_ms.borrow()
    }
}

impl DelayMs<u32> for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        *self.total_ms.borrow_mut() += ms as u64;
    }
}

#[derive(Clone)]
pub struct MockAck {
    enabled: Rc<RefCell<bool>>,
    toggles: Rc<RefCell<usize>>,
}

impl MockAck {
    pub fn new() -> Self {
        MockAck {
            enabled: Rc::new(RefCell::new(false)),
            toggles: Rc::new(RefCell::new(0)),
        }
    }

    pub fn enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    /// Mask changes made through [`AckInput`].
    pub fn toggles(&self) -> usize {
        *self.toggles.borrow()
    }

    /// Falling edge on the button. Dropped while masked, otherwise latched,
    /// after which the handler masks the line itself. Returns whether the
    /// edge was latched.
    pub fn press(&self, latch: &AckLatch) -> bool {
        if !self.enabled() {
            return false;
        }
        latch.set();
        *self.enabled.borrow_mut() = false;
        true
    }
}

impl AckInput for MockAck {
    fn enable_edge_interrupt(&mut self) {
        *self.enabled.borrow_mut() = true;
        *self.toggles.borrow_mut() += 1;
    }

    fn disable_edge_interrupt(&mut self) {
        *self.enabled.borrow_mut() = false;
        *self.toggles.borrow_mut() += 1;
    }
}
