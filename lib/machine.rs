//! Measurement cycle.
//!
//! ```text
//! Idle --front gate--> Armed --> Timing --back gate--> Reporting --> AwaitingAck --button--> Idle
//! ```
//!
//! The machine is driven by [`MeasurementStateMachine::step`], one poll per
//! call. [`MeasurementStateMachine::run`] polls forever; there is no terminal
//! state. Gate polling is a busy loop on the converter, and by default the
//! back gate is awaited without a timeout.

use core::convert::Infallible;
use embedded_hal::blocking::delay::DelayMs;

use crate::ack::{AckInput, AckLatch};
use crate::calibration::{Calibrator, ThresholdSet};
use crate::config::Config;
use crate::display::{line, DisplayAdapter};
use crate::error::{Error, Result};
use crate::indicator::{Indicator, Phase};
use crate::sampler::{AnalogInput, AnalogSampler, Channel};
use crate::timer::{Counter, Overflows, TimerService, TimerState};
use crate::velocity::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Polling the front gate.
    Idle,
    /// Front gate broken, timer started.
    Armed,
    /// Polling the back gate.
    Timing,
    /// Outcome on screen.
    Reporting,
    /// Waiting for the operator button.
    AwaitingAck,
}

/// Hardware the machine runs on.
pub struct Board<A, C, D, K, I, T> {
    pub adc: A,
    pub counter: C,
    pub display: D,
    pub ack: K,
    pub indicator: I,
    pub delay: T,
}

pub struct MeasurementStateMachine<'a, A, C, D, K, I, T> {
    config: Config,
    thresholds: ThresholdSet,
    sampler: AnalogSampler<A>,
    timer: TimerService<'a, C>,
    display: D,
    ack_input: K,
    ack: &'a AckLatch,
    indicator: I,
    delay: T,
    state: State,
    outcome: Option<Outcome>,
}

impl<'a, A, C, D, K, I, T> MeasurementStateMachine<'a, A, C, D, K, I, T>
where
    A: AnalogInput,
    C: Counter,
    D: DisplayAdapter,
    K: AckInput,
    I: Indicator,
    T: DelayMs<u32>,
{
    /// Calibrate, show the thresholds and enter `Idle`. Nothing may be in the
    /// gates while this runs.
    pub fn start(
        config: Config,
        board: Board<A, C, D, K, I, T>,
        overflows: &'a Overflows,
        ack: &'a AckLatch,
    ) -> Result<Self, D::Error> {
        let Board {
            adc,
            counter,
            mut display,
            ack: ack_input,
            mut indicator,
            mut delay,
        } = board;

        let mut sampler = AnalogSampler::new(adc);
        let thresholds = Calibrator::new(config.calibration).calibrate(
            &mut sampler,
            &mut display,
            &mut indicator,
            &mut delay,
        )?;
        delay.delay_ms(config.startup_settle_ms);

        let board = Board {
            adc: sampler,
            counter,
            display,
            ack: ack_input,
            indicator,
            delay,
        };
        let mut machine = Self::assemble(config, board, overflows, ack, thresholds);

        let front = line::<D::Error>(format_args!("Th fr: {}", thresholds.front))?;
        let back = line::<D::Error>(format_args!("Th br: {}", thresholds.back))?;
        machine.display.show_lines(&front, &back).map_err(Error::Lcd)?;
        machine.delay.delay_ms(config.threshold_display_ms);
        machine.display.show_status("Measuring").map_err(Error::Lcd)?;

        Ok(machine)
    }

    /// Enter `Idle` with known thresholds, skipping calibration.
    pub fn with_thresholds(
        config: Config,
        board: Board<A, C, D, K, I, T>,
        overflows: &'a Overflows,
        ack: &'a AckLatch,
        thresholds: ThresholdSet,
    ) -> Self {
        let Board {
            adc,
            counter,
            display,
            ack: ack_input,
            indicator,
            delay,
        } = board;
        let board = Board {
            adc: AnalogSampler::new(adc),
            counter,
            display,
            ack: ack_input,
            indicator,
            delay,
        };
        Self::assemble(config, board, overflows, ack, thresholds)
    }

    fn assemble(
        config: Config,
        board: Board<AnalogSampler<A>, C, D, K, I, T>,
        overflows: &'a Overflows,
        ack: &'a AckLatch,
        thresholds: ThresholdSet,
    ) -> Self {
        let mut machine = MeasurementStateMachine {
            config,
            thresholds,
            sampler: board.adc,
            timer: TimerService::new(board.counter, overflows, config.timer),
            display: board.display,
            ack_input: board.ack,
            ack,
            indicator: board.indicator,
            delay: board.delay,
            state: State::Idle,
            outcome: None,
        };
        machine.ack_input.disable_edge_interrupt();
        machine.sampler.select(Channel::Front);
        machine.indicator.show(Phase::Measuring);
        machine
    }

    pub fn run(&mut self) -> Result<Infallible, D::Error> {
        loop {
            self.step()?;
        }
    }

    /// Poll once and return the state reached.
    pub fn step(&mut self) -> Result<State, D::Error> {
        self.state = match self.state {
            State::Idle => self.poll_front(),
            State::Armed => State::Timing,
            State::Timing => self.poll_back()?,
            State::Reporting => {
                self.ack_input.enable_edge_interrupt();
                State::AwaitingAck
            }
            State::AwaitingAck => self.poll_ack()?,
        };
        Ok(self.state)
    }

    fn poll_front(&mut self) -> State {
        let sample = self.sampler.sample(Channel::Front);
        if !self.thresholds.is_triggered(Channel::Front, sample) {
            return State::Idle;
        }

        self.sampler.select(Channel::Back);
        self.timer.start();
        self.indicator.show(Phase::Armed);
        debug!("front gate broken ({=u16})", sample);
        State::Armed
    }

    fn poll_back(&mut self) -> Result<State, D::Error> {
        let sample = self.sampler.sample(Channel::Back);
        if self.thresholds.is_triggered(Channel::Back, sample) {
            self.timer.stop();
            let elapsed_ms = self.timer.elapsed_ms();
            self.timer.reset();
            self.report(Outcome::measure(self.config.gate_distance_cm, elapsed_ms))?;
            return Ok(State::Reporting);
        }

        if let Some(timeout_ms) = self.config.timing_timeout_ms {
            let elapsed_ms = self.timer.elapsed_ms();
            if elapsed_ms >= timeout_ms as f32 {
                self.timer.stop();
                self.timer.reset();
                self.report(Outcome::TimedOut { elapsed_ms })?;
                return Ok(State::Reporting);
            }
        }

        Ok(State::Timing)
    }

    fn poll_ack(&mut self) -> Result<State, D::Error> {
        if !self.ack.take() {
            return Ok(State::AwaitingAck);
        }

        self.ack_input.disable_edge_interrupt();
        self.sampler.select(Channel::Front);
        self.indicator.show(Phase::Measuring);
        self.display.show_status("Measuring").map_err(Error::Lcd)?;
        info!("acknowledged, measuring");
        Ok(State::Idle)
    }

    fn report(&mut self, outcome: Outcome) -> Result<(), D::Error> {
        self.indicator.show(Phase::Detected);
        self.outcome = Some(outcome);

        let time = line::<D::Error>(format_args!("T[ms]: {:.3}", outcome.elapsed_ms()))?;
        let shown = match outcome {
            Outcome::Measured(result) => {
                info!(
                    "{=f32} cm/s over {=f32} ms",
                    result.velocity_cm_per_s,
                    result.elapsed_ms
                );
                self.show_detected()?;
                let velocity =
                    line::<D::Error>(format_args!("V[cm/s]: {:.1}", result.velocity_cm_per_s))?;
                self.display.show_lines(&time, &velocity)
            }
            Outcome::Degenerate { .. } => {
                warn!("gates tripped within one tick");
                self.show_detected()?;
                self.display.show_lines(&time, "V[cm/s]: ---")
            }
            Outcome::TimedOut { .. } => {
                warn!("back gate timed out");
                self.display.show_lines("No back gate", &time)
            }
        };
        shown.map_err(Error::Lcd)
    }

    fn show_detected(&mut self) -> Result<(), D::Error> {
        self.display.show_status("Bullet detected").map_err(Error::Lcd)?;
        self.delay.delay_ms(self.config.detection_banner_ms);
        Ok(())
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn thresholds(&self) -> ThresholdSet {
        self.thresholds
    }

    /// Outcome of the latest completed timing phase.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn selected_channel(&self) -> Option<Channel> {
        self.sampler.selected()
    }
}
