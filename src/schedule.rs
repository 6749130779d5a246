//! Learning rate schedules.

/// How the learning rate changes as training progresses.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LearningRateSchedule {
    /// The learning rate never changes.
    Constant,
    /// Multiplies the learning rate by `factor` after every `every`
    /// training steps.
    StepDecay { every: u64, factor: f64 },
}

impl Default for LearningRateSchedule {
    /// Halves the learning rate every 60000 steps.
    fn default() -> Self {
        LearningRateSchedule::StepDecay {
            every: 60_000,
            factor: 0.5,
        }
    }
}

impl LearningRateSchedule {
    /// Returns the learning rate to use after `step` steps have completed,
    /// given the current `rate`.
    pub fn next_rate(&self, step: u64, rate: f64) -> f64 {
        match *self {
            LearningRateSchedule::Constant => rate,
            LearningRateSchedule::StepDecay { every, factor } => {
                if every > 0 && step > 0 && step % every == 0 {
                    rate * factor
                } else {
                    rate
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant() {
        let schedule = LearningRateSchedule::Constant;
        assert_eq!(schedule.next_rate(60_000, 0.3), 0.3);
    }

    #[test]
    fn default_halves_every_60000() {
        let schedule = LearningRateSchedule::default();
        assert_eq!(schedule.next_rate(59_999, 0.5), 0.5);
        assert_eq!(schedule.next_rate(60_000, 0.5), 0.25);
        assert_eq!(schedule.next_rate(60_001, 0.25), 0.25);
        assert_eq!(schedule.next_rate(120_000, 0.25), 0.125);
    }

    #[test]
    fn zero_interval_never_decays() {
        let schedule = LearningRateSchedule::StepDecay {
            every: 0,
            factor: 0.5,
        };
        assert_eq!(schedule.next_rate(10, 1.0), 1.0);
    }

    #[test]
    fn serde_round_trip() {
        let schedule = LearningRateSchedule::StepDecay {
            every: 100,
            factor: 0.75,
        };
        let json = serde_json::to_string(&schedule).unwrap();
        let parsed: LearningRateSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schedule);
    }
}
