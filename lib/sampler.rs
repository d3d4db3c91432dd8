/// Normalized intensity reading, 0..=1023.
pub type Sample = u16;

pub const SAMPLE_MAX: Sample = 1023;

/// Light gate selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Front,
    Back,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Front, Channel::Back];
}

/// Hardware side of the sampler: one multiplexed converter.
pub trait AnalogInput {
    fn select(&mut self, channel: Channel);
    /// Blocks until one conversion of the selected input finishes.
    fn convert(&mut self) -> Sample;
}

/// Owns the converter and its channel selector. Every sample is preceded by
/// an explicit selection, the selector is never assumed to persist.
pub struct AnalogSampler<A> {
    adc: A,
    selected: Option<Channel>,
}

impl<A> AnalogSampler<A>
where
    A: AnalogInput,
{
    pub fn new(adc: A) -> Self {
        AnalogSampler {
            adc,
            selected: None,
        }
    }

    pub fn select(&mut self, channel: Channel) {
        self.adc.select(channel);
        self.selected = Some(channel);
    }

    pub fn sample(&mut self, channel: Channel) -> Sample {
        self.select(channel);
        self.adc.convert().min(SAMPLE_MAX)
    }

    pub fn selected(&self) -> Option<Channel> {
        self.selected
    }
}
