//! Utilities for training neural networks.

use crate::error::{Error, Result};
use crate::feed_forward::Network;

use rand::rngs::StdRng;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::info;

/// A builder for training networks using stochastic gradient descent.
///
/// Each training step draws one example uniformly at random and feeds it to
/// `Network::train_step`. `R` is the network's weight source and `S` the
/// source used to pick examples.
#[derive(Debug)]
pub struct Trainer<R = StdRng, S = StdRng> {
    network: Network<R>,
    rng: S,
    logging: Logging,
    stop_condition: StopCondition,
    evaluation_interval: usize,
}

/// The outcome of a training run.
#[derive(Copy, Clone, Debug)]
pub struct Report {
    /// The number of training steps taken in this run.
    pub steps: usize,
    /// The final mean squared error over the training examples.
    pub error: f64,
    /// The final accuracy over the training examples, as computed by
    /// `Network::accuracy`.
    pub accuracy: f64,
}

impl<R, S: Rng> Trainer<R, S> {
    /// Creates a new Trainer instance.
    ///
    /// `rng` chooses the example used at every step. The trainer is
    /// initialized with some default values. These defaults are:
    ///
    /// * Stops after 1000 training steps.
    /// * Evaluates the training error every 1000 steps.
    /// * Logs on training completion.
    pub fn new(network: Network<R>, rng: S) -> Self {
        Trainer {
            network,
            rng,
            logging: Logging::Completion,
            stop_condition: StopCondition::Steps(1000),
            evaluation_interval: 1000,
        }
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the condition to finish training.
    pub fn stop_condition<C>(mut self, condition: C) -> Self
    where
        C: Into<StopCondition>,
    {
        self.stop_condition = condition.into();
        self
    }

    /// Sets how many steps pass between evaluations of the training error.
    pub fn evaluation_interval(mut self, steps: usize) -> Self {
        self.evaluation_interval = steps.max(1);
        self
    }

    /// Trains the network using the provided labelled data.
    ///
    /// The provided `examples` should be a list of labelled data, where each
    /// element takes the form `(network input, expected output)`.
    ///
    /// Returns:
    ///   The trained network and a summary of the run, or an error if the
    ///   examples don't fit the network.
    pub fn train<I, O>(mut self, examples: &[(I, O)]) -> Result<(Network<R>, Report)>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
    {
        self.validate(examples)?;

        let start_time = Instant::now();
        let mut steps = 0;
        let mut error = None;
        while !self.stop_condition.should_stop(steps, error, start_time) {
            let (input, target) = &examples[self.rng.gen_range(0..examples.len())];
            self.network.train_step(input.as_ref(), target.as_ref())?;
            steps += 1;

            if steps % self.evaluation_interval == 0 {
                let mse = self.network.mean_square_error(examples)?;
                self.logging
                    .evaluation(steps, mse, self.network.learning_rate());
                error = Some(mse);
            }
        }

        let report = Report {
            steps,
            error: self.network.mean_square_error(examples)?,
            accuracy: self.network.accuracy(examples)?,
        };
        self.logging.completion(&report, start_time);
        Ok((self.network, report))
    }

    /// Verifies that the examples fit the network, returning an error if
    /// something is wrong.
    fn validate<I, O>(&self, examples: &[(I, O)]) -> Result<()>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
    {
        let output_width = self
            .network
            .output_width()
            .ok_or_else(|| Error::InvalidTopology("the network has no output layer".into()))?;
        if examples.is_empty() {
            return Err(Error::EmptyTrainingSet);
        }
        for (input, target) in examples {
            let (input, target) = (input.as_ref(), target.as_ref());
            if input.len() != self.network.input_width() {
                return Err(Error::shape("input", self.network.input_width(), input.len()));
            }
            if target.len() != output_width {
                return Err(Error::shape("target", output_width, target.len()));
            }
        }
        Ok(())
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be logged at completion
    Completion,
    /// The training error will be logged at every evaluation, as well as a
    /// summary at completion
    Progress,
}

impl Logging {
    /// Performs logging after an evaluation of the training error.
    fn evaluation(&self, steps: usize, error: f64, learning_rate: f64) {
        if let Logging::Progress = self {
            info!(steps, mse = error, learning_rate, "training progress");
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, report: &Report, start_time: Instant) {
        if let Logging::Silent = self {
            return;
        }
        info!(
            steps = report.steps,
            seconds = start_time.elapsed().as_secs_f64(),
            mse = report.error,
            accuracy = report.accuracy,
            "training complete"
        );
    }
}

/// When to stop training
#[derive(Copy, Clone, Debug)]
pub enum StopCondition {
    /// Stops after the provided number of training steps
    Steps(usize),
    /// Stops when an evaluation finds the training error below the provided
    /// threshold
    ErrorThreshold(f64),
    /// Stops after the provided duration
    Duration(Duration),
}

impl From<Duration> for StopCondition {
    fn from(duration: Duration) -> StopCondition {
        StopCondition::Duration(duration)
    }
}

impl StopCondition {
    /// Returns true if training is complete. `error` is the training error
    /// at the most recent evaluation, if there has been one.
    fn should_stop(&self, steps: usize, error: Option<f64>, start_time: Instant) -> bool {
        use self::StopCondition::*;
        match *self {
            Steps(limit) => steps >= limit,
            ErrorThreshold(threshold) => error.map_or(false, |e| e < threshold),
            Duration(duration) => start_time.elapsed() > duration,
        }
    }
}
