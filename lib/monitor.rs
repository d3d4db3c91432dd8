//! Raw reading monitor for lining up the gates with their light sources.
//! Shows the live reading of one channel instead of measuring.

use core::convert::Infallible;
use embedded_hal::blocking::delay::DelayMs;

use crate::display::{line, DisplayAdapter, LINE_WIDTH};
use crate::error::{Error, Result};
use crate::sampler::{AnalogInput, AnalogSampler, Channel, Sample};

pub const REFRESH_MS: u32 = 200;

pub struct RawMonitor<A, D, T> {
    sampler: AnalogSampler<A>,
    display: D,
    delay: T,
    channel: Channel,
}

impl<A, D, T> RawMonitor<A, D, T>
where
    A: AnalogInput,
    D: DisplayAdapter,
    T: DelayMs<u32>,
{
    pub fn new(adc: A, display: D, delay: T, channel: Channel) -> Self {
        let mut sampler = AnalogSampler::new(adc);
        sampler.select(channel);
        RawMonitor {
            sampler,
            display,
            delay,
            channel,
        }
    }

    /// Decimal reading on line one, raw hex on line two.
    pub fn step(&mut self) -> Result<Sample, D::Error> {
        let sample = self.sampler.sample(self.channel);
        let label = match self.channel {
            Channel::Front => "Fr",
            Channel::Back => "Bc",
        };
        let text = line::<D::Error>(format_args!("{}: {}", label, sample))?;

        self.display.show_status(&text).map_err(Error::Lcd)?;
        self.display.set_cursor(LINE_WIDTH).map_err(Error::Lcd)?;
        self.display.write_text("0x").map_err(Error::Lcd)?;
        for byte in sample.to_be_bytes().iter() {
            self.display.write_hex_byte(*byte).map_err(Error::Lcd)?;
        }

        self.delay.delay_ms(REFRESH_MS);
        Ok(sample)
    }

    pub fn run(&mut self) -> Result<Infallible, D::Error> {
        loop {
            self.step()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockAdc, MockDelay, MockDisplay, Screen};

    #[test]
    fn shows_decimal_and_hex() {
        let adc = MockAdc::new();
        adc.push(Channel::Front, &[812]);
        let display = MockDisplay::new();
        let delay = MockDelay::new();
        let mut monitor =
            RawMonitor::new(adc.clone(), display.clone(), delay.clone(), Channel::Front);

        assert_eq!(monitor.step().unwrap(), 812);

        assert_eq!(
            display.events(),
            vec![
                Screen::Clear,
                Screen::Cursor(0),
                Screen::Text("Fr: 812".into()),
                Screen::Cursor(LINE_WIDTH),
                Screen::Text("0x".into()),
                Screen::Hex(0x03),
                Screen::Hex(0x2c),
            ]
        );
        assert_eq!(delay.total_ms(), REFRESH_MS as u64);
        assert_eq!(adc.conversions(Channel::Back), 0);
    }

    #[test]
    fn back_channel_label() {
        let adc = MockAdc::new();
        adc.push(Channel::Back, &[5]);
        let display = MockDisplay::new();
        let mut monitor = RawMonitor::new(adc, display.clone(), MockDelay::new(), Channel::Back);

        monitor.step().unwrap();
        assert_eq!(display.texts()[0], "Bc: 5");
    }
}
