use stm32g0xx_hal::analog::adc::Adc as HalAdc;
use stm32g0xx_hal::hal::adc::Channel as AdcChannel;
use stm32g0xx_hal::hal::blocking::delay::DelayUs;
use stm32g0xx_hal::rcc::Rcc;
use stm32g0xx_hal::stm32::{ADC, RCC};

use crate::sampler::{AnalogInput, Channel, Sample};

/// ADC with both gate photodiodes on its input multiplexer. Conversions are
/// software triggered, one at a time.
pub struct GateAdc<F, B> {
    adc: ADC,
    _front: F,
    _back: B,
}

impl<F, B> GateAdc<F, B>
where
    F: AdcChannel<HalAdc, ID = u8>,
    B: AdcChannel<HalAdc, ID = u8>,
{
    pub fn new<D: DelayUs<u8>>(
        pac_adc: ADC,
        front: F,
        back: B,
        rcc: &mut Rcc,
        delay: &mut D,
    ) -> Self {
        GateAdc::<F, B>::enable_clock_and_reset(rcc);
        let mut adc = GateAdc {
            adc: pac_adc,
            _front: front,
            _back: back,
        };
        adc.disable();
        adc.enable_vreg(delay);
        adc.calibrate();
        adc.enable();
        adc.configure();
        adc
    }

    fn channel_mask(channel: Channel) -> u32 {
        match channel {
            Channel::Front => 1 << F::channel(),
            Channel::Back => 1 << B::channel(),
        }
    }

    fn configure(&mut self) {
        self.adc.cfgr1.write(|w| unsafe {
            // Software trigger
            w.exten().bits(0b00);
            // Right alignment
            w.align().clear_bit();
            // 12-bit resolution
            w.res().bits(0b00);
            // Single conversion
            w.cont().clear_bit()
        });
        // 160.5 cycles, the photodiode outputs are high impedance
        self.adc.smpr.write(|w| unsafe { w.smp1().bits(0b111) });
    }

    fn enable_clock_and_reset(_: &mut Rcc) {
        let rcc = unsafe { &(*RCC::ptr()) };
        rcc.apbenr2.modify(|_, w| w.adcen().set_bit());
        rcc.apbrstr2.modify(|_, w| w.adcrst().set_bit());
        rcc.apbrstr2.modify(|_, w| w.adcrst().clear_bit());
    }

    fn enable_vreg<D: DelayUs<u8>>(&mut self, delay: &mut D) {
        self.adc.cr.modify(|_, w| w.advregen().set_bit());
        // Max starting time declared by stm32g070 datasheet is 20 us
        delay.delay_us(20);
    }

    fn enable(&mut self) {
        self.adc.isr.write(|w| w.adrdy().set_bit());
        self.adc.cr.modify(|_, w| w.aden().set_bit());
        while self.adc.isr.read().adrdy().bit_is_clear() {}
    }

    fn disable(&mut self) {
        let cr = self.adc.cr.read();
        if cr.aden().bit_is_clear() {
            return;
        }
        if cr.adstart().bit_is_set() {
            self.adc.cr.modify(|_, w| w.adstp().set_bit());
        }
        self.adc.cr.modify(|_, w| w.addis().set_bit());
        while self.adc.cr.read().aden().bit_is_set() {}
        self.adc.isr.write(|w| w.adrdy().set_bit());
    }

    fn calibrate(&mut self) {
        self.adc.cr.modify(|_, w| w.adcal().set_bit());
        while self.adc.isr.read().eocal().bit_is_clear() {}
        self.adc.isr.write(|w| w.eocal().set_bit());
    }
}

impl<F, B> AnalogInput for GateAdc<F, B>
where
    F: AdcChannel<HalAdc, ID = u8>,
    B: AdcChannel<HalAdc, ID = u8>,
{
    fn select(&mut self, channel: Channel) {
        let mask = GateAdc::<F, B>::channel_mask(channel);
        self.adc.isr.write(|w| w.ccrdy().set_bit());
        self.adc.chselr().write(|w| unsafe { w.bits(mask) });
        // Channel configuration is applied asynchronously
        while self.adc.isr.read().ccrdy().bit_is_clear() {}
        self.adc.isr.write(|w| w.ccrdy().set_bit());
    }

    fn convert(&mut self) -> Sample {
        self.adc.isr.write(|w| {
            w.eoc().set_bit();
            w.eos().set_bit()
        });
        self.adc.cr.modify(|_, w| w.adstart().set_bit());
        while self.adc.isr.read().eoc().bit_is_clear() {}
        // 12-bit result scaled to 0..=1023
        (self.adc.dr.read().bits() as u16 & 0x0fff) >> 2
    }
}
