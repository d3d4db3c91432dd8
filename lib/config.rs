//! Construction-time configuration of the measurement engine.
//!
//! Delays give the operator time to read each status line before the next
//! one replaces it.

/// How the calibration sum is turned into a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThresholdDivisor {
    /// `sum / (samples + 1)`, which places the threshold slightly below the
    /// resting mean. This is what deployed devices do.
    SamplesPlusOne,
    /// `sum / samples`, the plain mean.
    Samples,
}

impl ThresholdDivisor {
    pub fn divisor(self, samples: u16) -> u32 {
        match self {
            ThresholdDivisor::SamplesPlusOne => samples as u32 + 1,
            ThresholdDivisor::Samples => (samples as u32).max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationConfig {
    /// Conversions summed per channel.
    pub samples: u16,
    pub divisor: ThresholdDivisor,
    /// Pause after sampling, before "Calibration done" is shown.
    pub settle_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerConfig {
    /// Counter increments per second.
    pub tick_hz: u32,
    /// Number of counter values before a rollover, 2^16 for a 16-bit timer.
    pub counter_range: u32,
}

impl TimerConfig {
    pub fn ticks_per_ms(&self) -> f32 {
        self.tick_hz as f32 / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Distance between the two light gates.
    pub gate_distance_cm: f32,
    pub calibration: CalibrationConfig,
    pub timer: TimerConfig,
    /// Pause between "Calibration done" and the threshold readout.
    pub startup_settle_ms: u32,
    /// How long the thresholds stay on screen before measuring starts.
    pub threshold_display_ms: u32,
    /// How long "Bullet detected" stays on screen before the numbers.
    pub detection_banner_ms: u32,
    /// Give up on the back gate after this long. `None` waits forever.
    pub timing_timeout_ms: Option<u32>,
}

impl Config {
    pub const DEFAULT: Config = Config {
        gate_distance_cm: 23.0,
        calibration: CalibrationConfig {
            samples: 20,
            divisor: ThresholdDivisor::SamplesPlusOne,
            settle_ms: 1600,
        },
        timer: TimerConfig {
            tick_hz: 4_000_000,
            counter_range: 1 << 16,
        },
        startup_settle_ms: 1600,
        threshold_display_ms: 3200,
        detection_banner_ms: 800,
        timing_timeout_ms: None,
    };
}

impl Default for Config {
    fn default() -> Self {
        Config::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_device_constants() {
        let config = Config::default();
        assert_eq!(config.gate_distance_cm, 23.0);
        assert_eq!(config.calibration.samples, 20);
        assert_eq!(config.timer.ticks_per_ms(), 4000.0);
        assert_eq!(config.timing_timeout_ms, None);
    }

    #[test]
    fn divisor_variants() {
        assert_eq!(ThresholdDivisor::SamplesPlusOne.divisor(20), 21);
        assert_eq!(ThresholdDivisor::Samples.divisor(20), 20);
        assert_eq!(ThresholdDivisor::Samples.divisor(0), 1);
    }
}
