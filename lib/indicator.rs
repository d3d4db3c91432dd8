/// Phase shown on the status LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Calibrating,
    /// Waiting for the front gate, LEDs off.
    Measuring,
    /// Front gate broken, timer running.
    Armed,
    /// Back gate broken, result on screen.
    Detected,
}

pub trait Indicator {
    fn show(&mut self, phase: Phase);
}

/// For boards without status LEDs.
pub struct NoIndicator;

impl Indicator for NoIndicator {
    fn show(&mut self, _phase: Phase) {}
}
