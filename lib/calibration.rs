use embedded_hal::blocking::delay::DelayMs;

use crate::config::CalibrationConfig;
use crate::display::DisplayAdapter;
use crate::error::{Error, Result};
use crate::indicator::{Indicator, Phase};
use crate::sampler::{AnalogInput, AnalogSampler, Channel, Sample};

/// Per gate trigger levels. A gate counts as broken when its reading drops
/// below its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThresholdSet {
    pub front: Sample,
    pub back: Sample,
}

impl ThresholdSet {
    pub fn for_channel(&self, channel: Channel) -> Sample {
        match channel {
            Channel::Front => self.front,
            Channel::Back => self.back,
        }
    }

    /// Whether `sample` on `channel` means the gate is broken.
    pub fn is_triggered(&self, channel: Channel, sample: Sample) -> bool {
        sample < self.for_channel(channel)
    }
}

/// Derives thresholds from the resting light level of both gates. Runs with
/// nothing in the gates.
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Calibrator { config }
    }

    pub fn calibrate<A, D, I, T>(
        &self,
        sampler: &mut AnalogSampler<A>,
        display: &mut D,
        indicator: &mut I,
        delay: &mut T,
    ) -> Result<ThresholdSet, D::Error>
    where
        A: AnalogInput,
        D: DisplayAdapter,
        I: Indicator,
        T: DelayMs<u32>,
    {
        indicator.show(Phase::Calibrating);
        display.show_status("Calibrating...").map_err(Error::Lcd)?;

        let mut levels = [0; 2];
        for (level, channel) in levels.iter_mut().zip(Channel::ALL.iter()) {
            *level = self.threshold(sampler, *channel);
        }
        let thresholds = ThresholdSet {
            front: levels[0],
            back: levels[1],
        };

        delay.delay_ms(self.config.settle_ms);
        indicator.show(Phase::Measuring);
        display.show_status("Calibration done").map_err(Error::Lcd)?;

        info!(
            "calibrated: front {=u16}, back {=u16}",
            thresholds.front,
            thresholds.back
        );
        Ok(thresholds)
    }

    fn threshold<A: AnalogInput>(
        &self,
        sampler: &mut AnalogSampler<A>,
        channel: Channel,
    ) -> Sample {
        sampler.select(channel);
        let sum: u32 = (0..self.config.samples)
            .map(|_| sampler.sample(channel) as u32)
            .sum();
        (sum / self.config.divisor.divisor(self.config.samples)) as Sample
    }
}
