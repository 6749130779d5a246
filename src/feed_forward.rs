//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network).
//!
//! # Example
//!
//! Let's train a simple neural network to compute the XOR function:
//!
//! ```
//! # use backprop::feed_forward::Network;
//! # use backprop::layer::LayerKind;
//! use rand::rngs::StdRng;
//! use rand::{Rng, SeedableRng};
//!
//! // Create examples of the XOR function
//! let examples = [([0.0, 0.0], [0.0]),
//!                 ([0.0, 1.0], [1.0]),
//!                 ([1.0, 0.0], [1.0]),
//!                 ([1.0, 1.0], [0.0])];
//!
//! // Two inputs, four hidden units, one output
//! let mut network = Network::new(2, 4, 0.5, StdRng::seed_from_u64(1)).unwrap();
//! network.add_layer(1, LayerKind::Output).unwrap();
//!
//! // Train the network on randomly drawn examples
//! let mut rng = StdRng::seed_from_u64(2);
//! for _ in 0..20_000 {
//!     let (input, target) = &examples[rng.gen_range(0..examples.len())];
//!     network.train_step(input, target).unwrap();
//! }
//!
//! // And verify the network correctly computes XOR!
//! for (input, target) in &examples {
//!     let output = network.infer(input).unwrap();
//!     assert!((output[0] - target[0]).abs() < 0.1);
//! }
//! ```

use crate::error::{Error, Result};
use crate::layer::{Layer, LayerKind};
use crate::schedule::LearningRateSchedule;
use crate::utils::pair_mut;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

/// A Feedforward neural network
///
/// Layer 0 is the first hidden layer and receives the network input
/// directly. Once an output layer is appended it is always the last layer.
///
/// `R` is the source of every initial weight and bias.
#[derive(Clone, Debug)]
pub struct Network<R = StdRng> {
    layers: Vec<Layer>,
    input_width: usize,
    learning_rate: f64,
    train_step_count: u64,
    schedule: LearningRateSchedule,
    /// Set by the first forward pass; the topology can't change after that.
    frozen: bool,
    rng: R,
}

impl<R: Rng> Network<R> {
    /// Creates a new, untrained neural network with a single hidden layer.
    ///
    /// Arguments:
    ///  * `input_width` - the number of inputs to the network.
    ///  * `first_hidden_width` - the number of units in the first hidden layer.
    ///  * `learning_rate` - the initial gradient descent step size.
    ///  * `rng` - the source for every initial weight and bias, including
    ///            those of layers added later.
    pub fn new(
        input_width: usize,
        first_hidden_width: usize,
        learning_rate: f64,
        mut rng: R,
    ) -> Result<Self> {
        if input_width == 0 {
            return Err(Error::InvalidTopology("the network needs at least one input".into()));
        }
        if first_hidden_width == 0 {
            return Err(Error::InvalidTopology("a layer needs at least one unit".into()));
        }
        let first = Layer::new(LayerKind::Hidden, input_width, first_hidden_width, &mut rng);
        Ok(Network {
            layers: vec![first],
            input_width,
            learning_rate,
            train_step_count: 0,
            schedule: LearningRateSchedule::default(),
            frozen: false,
            rng,
        })
    }

    /// Appends a layer of `width` units, fed by the current last layer.
    pub fn add_layer(&mut self, width: usize, kind: LayerKind) -> Result<()> {
        if width == 0 {
            return Err(Error::InvalidTopology("a layer needs at least one unit".into()));
        }
        if self.frozen {
            return Err(Error::InvalidTopology(
                "layers can't be added after the network has run".into(),
            ));
        }
        let last = self
            .layers
            .last()
            .ok_or_else(|| Error::InvalidTopology("the network has no layers".into()))?;
        if last.kind() == LayerKind::Output {
            return Err(Error::InvalidTopology("the output layer must be last".into()));
        }
        let inputs = last.len();
        self.layers.push(Layer::new(kind, inputs, width, &mut self.rng));
        debug!(layer = self.layers.len() - 1, ?kind, inputs, width, "added layer");
        Ok(())
    }
}

impl<R> Network<R> {
    /// Replaces the learning rate schedule applied after each training step.
    pub fn set_schedule(&mut self, schedule: LearningRateSchedule) {
        self.schedule = schedule;
    }

    pub fn schedule(&self) -> LearningRateSchedule {
        self.schedule
    }

    /// Returns the size of the input to the network.
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    /// Returns the size of the output layer, or `None` if the network has no
    /// output layer yet.
    pub fn output_width(&self) -> Option<usize> {
        self.output_layer().ok().map(|i| self.layers[i].len())
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn train_step_count(&self) -> u64 {
        self.train_step_count
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub(crate) fn restore_progress(&mut self, train_step_count: u64, learning_rate: f64) {
        self.train_step_count = train_step_count;
        self.learning_rate = learning_rate;
    }

    /// Feeds `input` forward through every layer.
    ///
    /// Each unit of the first layer receives the whole input vector.
    pub fn forward_pass(&mut self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_width {
            return Err(Error::shape("input", self.input_width, input.len()));
        }
        self.frozen = true;
        self.layers[0].set_inputs(input)?;
        for i in 1..self.layers.len() {
            let (prev, layer) = pair_mut(&mut self.layers, i - 1);
            layer.forward_propagate(prev)?;
        }
        Ok(())
    }

    /// Performs one step of gradient descent on a single example.
    ///
    /// Every layer computes its errors and stages its updates before any
    /// weight changes, so backpropagation always sees the weights the
    /// forward pass used.
    pub fn train_step(&mut self, input: &[f64], target: &[f64]) -> Result<()> {
        let output = self.output_layer()?;
        let output_width = self.layers[output].len();
        if input.len() != self.input_width {
            return Err(Error::shape("input", self.input_width, input.len()));
        }
        if target.len() != output_width {
            return Err(Error::shape("target", output_width, target.len()));
        }

        self.forward_pass(input)?;

        let eta = self.learning_rate;
        self.layers[output].set_target(target)?;
        self.layers[output].back_propagate_output(eta)?;
        for i in (0..output).rev() {
            let (layer, next) = pair_mut(&mut self.layers, i);
            layer.back_propagate_hidden(next, eta)?;
        }
        for layer in &mut self.layers {
            layer.apply_weight_deltas();
        }

        self.train_step_count += 1;
        let rate = self.schedule.next_rate(self.train_step_count, self.learning_rate);
        if rate != self.learning_rate {
            info!(
                step = self.train_step_count,
                from = self.learning_rate,
                to = rate,
                "learning rate decayed"
            );
            self.learning_rate = rate;
        }
        Ok(())
    }

    /// Feeds the provided `input` through the network, returning the output
    /// layer.
    pub fn infer(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let output = self.output_layer()?;
        self.forward_pass(input)?;
        Ok(self.layers[output].outputs())
    }

    /// Scores the network on labelled `examples`.
    ///
    /// Each example scores the mean of `1 - |target - output|` over its
    /// outputs; the result is the mean score over all examples.
    pub fn accuracy<I, O>(&mut self, examples: &[(I, O)]) -> Result<f64>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
    {
        self.mean_over(examples, |output, target| {
            let total: f64 = output
                .iter()
                .zip_eq(target)
                .map(|(o, t)| 1.0 - (t - o).abs())
                .sum();
            total / output.len() as f64
        })
    }

    /// Computes the mean squared error of the network on labelled
    /// `examples`.
    pub fn mean_square_error<I, O>(&mut self, examples: &[(I, O)]) -> Result<f64>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
    {
        self.mean_over(examples, |output, target| {
            let total: f64 = output
                .iter()
                .zip_eq(target)
                .map(|(o, t)| (t - o) * (t - o))
                .sum();
            total / output.len() as f64
        })
    }

    fn mean_over<I, O, F>(&mut self, examples: &[(I, O)], score: F) -> Result<f64>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
        F: Fn(&[f64], &[f64]) -> f64,
    {
        if examples.is_empty() {
            return Err(Error::EmptyTrainingSet);
        }
        let mut total = 0.0;
        for (input, target) in examples {
            let output = self.infer(input.as_ref())?;
            let target = target.as_ref();
            if target.len() != output.len() {
                return Err(Error::shape("target", output.len(), target.len()));
            }
            total += score(&output, target);
        }
        Ok(total / examples.len() as f64)
    }

    /// Returns the index of the output layer.
    fn output_layer(&self) -> Result<usize> {
        match self.layers.last() {
            Some(layer) if layer.kind() == LayerKind::Output => Ok(self.layers.len() - 1),
            _ => Err(Error::InvalidTopology("the network has no output layer".into())),
        }
    }
}
