use stm32g0xx_hal::rcc::Rcc;
use stm32g0xx_hal::stm32::{RCC, TIM3};

use crate::timer::Counter;

/// TIM3 as a free-running 16-bit gate timer. Every rollover raises the
/// update interrupt, which feeds the overflow count.
pub struct GateTimer {
    timer: TIM3,
}

impl GateTimer {
    pub fn new(pac_timer: TIM3, prescaler: u16, rcc: &mut Rcc) -> Self {
        GateTimer::enable_clock_and_reset(rcc);
        let mut timer = GateTimer { timer: pac_timer };
        timer.configure(prescaler);
        timer
    }

    /// Handle for the update interrupt handler.
    pub fn irq(&self) -> OverflowIrq {
        OverflowIrq { _private: () }
    }

    fn configure(&mut self, prescaler: u16) {
        // Up-counting, stopped
        self.timer.cr1.write(|w| w.cen().clear_bit());
        self.timer.psc.write(|w| unsafe { w.psc().bits(prescaler) });
        // Set ARR to max value
        self.timer
            .arr
            .write(|w| unsafe { w.arr_l().bits(u16::max_value()) });

        // Trigger update event to load the registers
        self.timer.cr1.modify(|_, w| w.urs().set_bit());
        self.timer.egr.write(|w| w.ug().set_bit());
        self.timer.cr1.modify(|_, w| w.urs().clear_bit());

        self.timer.sr.modify(|_, w| w.uif().clear_bit());
        self.timer.dier.write(|w| w.uie().set_bit());
    }

    fn enable_clock_and_reset(_: &mut Rcc) {
        let rcc = unsafe { &(*RCC::ptr()) };
        rcc.apbenr1.modify(|_, w| w.tim3en().set_bit());
        rcc.apbrstr1.modify(|_, w| w.tim3rst().set_bit());
        rcc.apbrstr1.modify(|_, w| w.tim3rst().clear_bit());
    }
}

impl Counter for GateTimer {
    fn enable(&mut self) {
        self.timer.cr1.modify(|_, w| w.cen().set_bit());
    }

    fn disable(&mut self) {
        self.timer.cr1.modify(|_, w| w.cen().clear_bit());
    }

    fn reset(&mut self) {
        self.timer.cnt.reset();
    }

    fn count(&self) -> u32 {
        self.timer.cnt.read().cnt_l().bits() as u32
    }

    fn overflow_pending(&self) -> bool {
        self.timer.sr.read().uif().bit_is_set()
    }

    fn clear_overflow(&mut self) {
        self.timer.sr.modify(|_, w| w.uif().clear_bit());
    }
}

/// Update interrupt side of [`GateTimer`]. Only touches the status register.
pub struct OverflowIrq {
    _private: (),
}

impl OverflowIrq {
    pub fn unpend(&mut self) {
        let timer = unsafe { &(*TIM3::ptr()) };
        timer.sr.modify(|_, w| w.uif().clear_bit());
    }
}
