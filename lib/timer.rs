//! Gate timer built from a free-running hardware counter and an overflow
//! count kept by the counter's update interrupt.
//!
//! The counter keeps running while the main flow reads it, so the count and
//! the overflow total are sampled inside a critical section. Masking the
//! interrupt alone is not enough: a rollover can still happen during the read
//! and leave its interrupt pending. [`TimerService::elapsed_ticks`] checks the
//! hardware overflow flag after reading the counter and, when it is set,
//! re-reads the counter and counts the pending rollover itself.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::TimerConfig;

/// Rollover total shared with the timer interrupt.
///
/// Only load and store are used, the target core has no read-modify-write
/// atomics. The interrupt is the only incrementer and the main flow only
/// clears while holding a critical section.
pub struct Overflows(AtomicU32);

impl Overflows {
    pub const fn new() -> Self {
        Overflows(AtomicU32::new(0))
    }

    /// Called from the overflow interrupt.
    pub fn record(&self) {
        let n = self.0.load(Ordering::Relaxed);
        self.0.store(n.wrapping_add(1), Ordering::Release);
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    fn clear(&self) {
        self.0.store(0, Ordering::Release);
    }
}

/// Hardware side of the gate timer.
pub trait Counter {
    fn enable(&mut self);
    fn disable(&mut self);
    /// Zero the counter register.
    fn reset(&mut self);
    fn count(&self) -> u32;
    /// Rollover happened but its interrupt has not been serviced yet.
    fn overflow_pending(&self) -> bool;
    fn clear_overflow(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerState {
    pub overflow_count: u32,
    pub running: bool,
}

pub struct TimerService<'a, C> {
    counter: C,
    overflows: &'a Overflows,
    running: bool,
    config: TimerConfig,
}

impl<'a, C> TimerService<'a, C>
where
    C: Counter,
{
    pub fn new(counter: C, overflows: &'a Overflows, config: TimerConfig) -> Self {
        let mut timer = TimerService {
            counter,
            overflows,
            running: false,
            config,
        };
        timer.counter.disable();
        timer.reset();
        timer
    }

    /// Zero everything and let the counter run. Calling this while running
    /// restarts the measurement.
    pub fn start(&mut self) {
        let counter = &mut self.counter;
        let overflows = self.overflows;
        critical_section::with(|_| {
            counter.reset();
            counter.clear_overflow();
            overflows.clear();
            counter.enable();
        });
        self.running = true;
    }

    /// Freeze the counter. The overflow total is kept until [`reset`].
    ///
    /// [`reset`]: TimerService::reset
    pub fn stop(&mut self) {
        self.counter.disable();
        self.running = false;
    }

    pub fn reset(&mut self) {
        let counter = &mut self.counter;
        let overflows = self.overflows;
        critical_section::with(|_| {
            counter.reset();
            counter.clear_overflow();
            overflows.clear();
        });
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            overflow_count: self.overflows.get(),
            running: self.running,
        }
    }

    pub fn elapsed_ticks(&self) -> u64 {
        let counter = &self.counter;
        let overflows = self.overflows;
        let (rollovers, count) = critical_section::with(|_| {
            let count = counter.count();
            let rollovers = overflows.get();
            if counter.overflow_pending() {
                // The flag was raised before this point, so a fresh read is
                // from after the rollover.
                (rollovers.wrapping_add(1), counter.count())
            } else {
                (rollovers, count)
            }
        });
        rollovers as u64 * self.config.counter_range as u64 + count as u64
    }

    pub fn elapsed_ms(&self) -> f32 {
        ticks_to_ms(self.elapsed_ticks(), &self.config)
    }
}

/// `overflows * (range / ticks_per_ms) + count / ticks_per_ms`, computed on
/// the combined tick total so the result never decreases as ticks grow.
pub fn ticks_to_ms(ticks: u64, config: &TimerConfig) -> f32 {
    ticks as f32 / config.ticks_per_ms()
}
