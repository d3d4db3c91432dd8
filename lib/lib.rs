#![cfg_attr(not(test), no_std)]

#[cfg(feature = "defmt")]
use core::sync::atomic::{AtomicUsize, Ordering};

#[macro_use]
mod macros;

pub mod ack;
pub mod calibration;
pub mod config;
pub mod display;
pub mod error;
pub mod indicator;
pub mod machine;
pub mod monitor;
pub mod sampler;
pub mod timer;
pub mod velocity;

#[cfg(target_os = "none")]
pub mod hw;

#[cfg(test)]
mod mocks;

pub use ack::{AckInput, AckLatch};
pub use calibration::{Calibrator, ThresholdSet};
pub use config::Config;
pub use display::{DisplayAdapter, TextLcd};
pub use indicator::{Indicator, Phase};
pub use machine::{Board, MeasurementStateMachine, State};
pub use monitor::RawMonitor;
pub use sampler::{AnalogInput, AnalogSampler, Channel, Sample};
pub use timer::{Counter, Overflows, TimerService, TimerState};
pub use velocity::{Outcome, VelocityResult};

/// Overflow count of the gate timer, written by the timer interrupt.
pub static OVERFLOWS: Overflows = Overflows::new();
/// Acknowledgement latch, written by the button interrupt.
pub static ACK: AckLatch = AckLatch::new();

#[cfg(feature = "defmt")]
static COUNT: AtomicUsize = AtomicUsize::new(0);
#[cfg(feature = "defmt")]
defmt::timestamp!("{=usize}", {
    let n = COUNT.load(Ordering::Relaxed);
    COUNT.store(n + 1, Ordering::Relaxed);
    n
});
