use core::convert::Infallible;
use stm32g0xx_hal::hal::digital::v2::OutputPin;
use stm32g0xx_hal::stm32::EXTI;

use crate::ack::{line_pending, AckInput, AckLatch};
use crate::indicator::{Indicator, Phase};

/// Acknowledgement button on an EXTI line already routed to its pin for the
/// falling edge. Only the interrupt mask is toggled here.
pub struct AckButton<P> {
    _pin: P,
    mask: u32,
}

impl<P> AckButton<P> {
    pub fn new(pin: P, line: u8) -> (Self, AckIrq) {
        let mask = 1 << line;
        let mut button = AckButton { _pin: pin, mask };
        button.disable_edge_interrupt();
        (button, AckIrq { mask })
    }
}

impl<P> AckInput for AckButton<P> {
    fn enable_edge_interrupt(&mut self) {
        let exti = unsafe { &(*EXTI::ptr()) };
        // Drop presses seen while masked
        exti.fpr1.write(|w| unsafe { w.bits(self.mask) });
        exti.imr1.modify(|r, w| unsafe { w.bits(r.bits() | self.mask) });
    }

    fn disable_edge_interrupt(&mut self) {
        let exti = unsafe { &(*EXTI::ptr()) };
        exti.imr1.modify(|r, w| unsafe { w.bits(r.bits() & !self.mask) });
    }
}

/// Edge interrupt side of [`AckButton`].
pub struct AckIrq {
    mask: u32,
}

impl AckIrq {
    /// Latch the press and mask the line until the next report. Edges of the
    /// other lines sharing the vector are left alone.
    pub fn on_edge(&mut self, latch: &AckLatch) {
        let exti = unsafe { &(*EXTI::ptr()) };
        if !line_pending(exti.fpr1.read().bits(), self.mask) {
            return;
        }
        exti.fpr1.write(|w| unsafe { w.bits(self.mask) });
        exti.imr1.modify(|r, w| unsafe { w.bits(r.bits() & !self.mask) });
        latch.set();
    }
}

pub struct StatusLeds<A, D> {
    armed: A,
    detected: D,
}

impl<A, D> StatusLeds<A, D>
where
    A: OutputPin<Error = Infallible>,
    D: OutputPin<Error = Infallible>,
{
    pub fn new(armed: A, detected: D) -> Self {
        let mut leds = StatusLeds { armed, detected };
        leds.show(Phase::Measuring);
        leds
    }

    fn set(&mut self, armed: bool, detected: bool) {
        if armed {
            self.armed.set_high().ok();
        } else {
            self.armed.set_low().ok();
        }
        if detected {
            self.detected.set_high().ok();
        } else {
            self.detected.set_low().ok();
        }
    }
}

impl<A, D> Indicator for StatusLeds<A, D>
where
    A: OutputPin<Error = Infallible>,
    D: OutputPin<Error = Infallible>,
{
    fn show(&mut self, phase: Phase) {
        match phase {
            Phase::Calibrating => self.set(true, true),
            Phase::Measuring => self.set(false, false),
            Phase::Armed => self.set(true, false),
            Phase::Detected => self.set(false, true),
        }
    }
}
