//! STM32G070 board binding.

mod adc;
mod helper;
mod input;
mod lcd;
mod timers;

pub use adc::GateAdc;
pub use helper::*;
pub use input::{AckButton, AckIrq, StatusLeds};
pub use lcd::{IliError, IliLcd};
pub use timers::{GateTimer, OverflowIrq};
