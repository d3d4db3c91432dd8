#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VelocityResult {
    pub elapsed_ms: f32,
    pub velocity_cm_per_s: f32,
}

impl VelocityResult {
    /// `None` when no time elapsed, the division would be undefined.
    pub fn from_elapsed(gate_distance_cm: f32, elapsed_ms: f32) -> Option<Self> {
        if !(elapsed_ms > 0.0) {
            return None;
        }
        Some(VelocityResult {
            elapsed_ms,
            velocity_cm_per_s: gate_distance_cm / (elapsed_ms / 1000.0),
        })
    }
}

/// What a finished timing phase reports.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Measured(VelocityResult),
    /// Both gates tripped within the same tick.
    Degenerate { elapsed_ms: f32 },
    /// The back gate never tripped within the configured timeout.
    TimedOut { elapsed_ms: f32 },
}

impl Outcome {
    pub fn measure(gate_distance_cm: f32, elapsed_ms: f32) -> Self {
        match VelocityResult::from_elapsed(gate_distance_cm, elapsed_ms) {
            Some(result) => Outcome::Measured(result),
            None => Outcome::Degenerate { elapsed_ms },
        }
    }

    pub fn elapsed_ms(&self) -> f32 {
        match *self {
            Outcome::Measured(result) => result.elapsed_ms,
            Outcome::Degenerate { elapsed_ms } | Outcome::TimedOut { elapsed_ms } => elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_ms_over_23_cm() {
        let result = VelocityResult::from_elapsed(23.0, 100.0).unwrap();
        assert_eq!(result.elapsed_ms, 100.0);
        assert!((result.velocity_cm_per_s - 230.0).abs() < 1e-3);
    }

    #[test]
    fn zero_elapsed_is_degenerate() {
        assert_eq!(VelocityResult::from_elapsed(23.0, 0.0), None);
        assert_eq!(
            Outcome::measure(23.0, 0.0),
            Outcome::Degenerate { elapsed_ms: 0.0 }
        );
    }

    #[test]
    fn measured_outcome_keeps_elapsed() {
        let outcome = Outcome::measure(23.0, 2.5);
        assert_eq!(outcome.elapsed_ms(), 2.5);
        match outcome {
            Outcome::Measured(result) => assert!((result.velocity_cm_per_s - 9200.0).abs() < 1e-2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
