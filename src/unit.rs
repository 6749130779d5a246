//! A single sigmoid neuron.

use crate::activator::{sigmoid, sigmoid_prime_from_output};
use crate::error::{Error, Result};
use crate::utils::dot;

use itertools::Itertools;
use rand::Rng;

/// The memoized forward-pass values of a unit.
///
/// `weighted_sum` and `output` are only meaningful while `valid` is set.
/// Every mutation of a unit's inputs, weights or bias goes through
/// `Unit::invalidate`, which is the only place this record is cleared.
#[derive(Clone, Copy, Debug, Default)]
struct Activation {
    weighted_sum: f64,
    output: f64,
    valid: bool,
}

/// A weighted-sum-plus-bias neuron with a sigmoid activation.
///
/// The fan-in of a unit is fixed at construction: `inputs`, `weights` and
/// `weight_deltas` always have the same length.
#[derive(Clone, Debug)]
pub struct Unit {
    inputs: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
    /// The staged weight update for the current training step.
    weight_deltas: Vec<f64>,
    /// The backpropagated error signal for the current training step.
    error: f64,
    activation: Activation,
}

impl Unit {
    /// Creates a unit with `num_inputs` inputs, drawing its initial weights
    /// and bias uniformly from `[-0.5, 0.5)`.
    pub fn new<R: Rng>(num_inputs: usize, rng: &mut R) -> Self {
        let weights = (0..num_inputs).map(|_| initial_parameter(rng)).collect();
        let bias = initial_parameter(rng);
        Unit {
            inputs: vec![0.0; num_inputs],
            weights,
            bias,
            weight_deltas: vec![0.0; num_inputs],
            error: 0.0,
            activation: Activation::default(),
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.weights.len()
    }

    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    /// Overwrites the unit's inputs.
    pub fn set_inputs(&mut self, inputs: &[f64]) -> Result<()> {
        if inputs.len() != self.num_inputs() {
            return Err(Error::shape("unit input", self.num_inputs(), inputs.len()));
        }
        self.inputs.copy_from_slice(inputs);
        self.invalidate();
        Ok(())
    }

    /// Returns `dot(inputs, weights) + bias`, recomputing it only if the
    /// unit changed since it was last read.
    pub fn weighted_sum(&mut self) -> f64 {
        self.refresh().weighted_sum
    }

    /// Returns `sigmoid(weighted_sum)`.
    pub fn output(&mut self) -> f64 {
        self.refresh().output
    }

    /// Returns the derivative of the activation at the current output.
    pub fn activation_derivative(&mut self) -> f64 {
        sigmoid_prime_from_output(self.output())
    }

    pub(crate) fn set_error(&mut self, error: f64) {
        self.error = error;
    }

    /// Stages `eta * error * input[j]` as the pending update for every
    /// weight, and applies `eta * error` to the bias immediately.
    pub(crate) fn stage_weight_delta(&mut self, eta: f64) {
        let step = eta * self.error;
        for (delta, input) in self.weight_deltas.iter_mut().zip_eq(&self.inputs) {
            *delta = step * input;
        }
        self.bias += step;
        self.invalidate();
    }

    /// Adds the staged deltas to the weights.
    ///
    /// Must only run once every layer has finished backpropagating, so that
    /// earlier layers see the weights the forward pass used.
    pub(crate) fn apply_weight_delta(&mut self) {
        for (weight, delta) in self.weights.iter_mut().zip_eq(&self.weight_deltas) {
            *weight += delta;
        }
        self.invalidate();
    }

    /// Replaces the trainable parameters. `weights` must match the fan-in.
    pub(crate) fn set_parameters(&mut self, weights: &[f64], bias: f64) {
        self.weights.copy_from_slice(weights);
        self.bias = bias;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.activation.valid = false;
    }

    fn refresh(&mut self) -> Activation {
        if !self.activation.valid {
            let weighted_sum = dot(&self.inputs, &self.weights) + self.bias;
            self.activation = Activation {
                weighted_sum,
                output: sigmoid(weighted_sum),
                valid: true,
            };
        }
        self.activation
    }
}

fn initial_parameter<R: Rng>(rng: &mut R) -> f64 {
    rng.gen::<f64>() - 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_with(weights: &[f64], bias: f64) -> Unit {
        let mut unit = Unit::new(weights.len(), &mut StdRng::seed_from_u64(0));
        unit.set_parameters(weights, bias);
        unit
    }

    #[test]
    fn initial_parameters_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let unit = Unit::new(5, &mut rng);
            assert_eq!(unit.num_inputs(), 5);
            assert_eq!(unit.inputs().len(), 5);
            for &w in unit.weights().iter().chain(Some(&unit.bias())) {
                assert!(w >= -0.5 && w < 0.5);
            }
        }
    }

    #[test]
    fn same_seed_same_unit() {
        let a = Unit::new(4, &mut StdRng::seed_from_u64(11));
        let b = Unit::new(4, &mut StdRng::seed_from_u64(11));
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.bias(), b.bias());
    }

    #[test]
    fn wrong_input_length() {
        let mut unit = unit_with(&[1.0, 1.0], 0.0);
        assert!(matches!(
            unit.set_inputs(&[1.0]),
            Err(Error::ShapeMismatch { expected: 2, actual: 1, .. })
        ));
        assert_eq!(unit.inputs(), &[0.0, 0.0]);
    }

    #[test]
    fn weighted_sum_and_output() {
        let mut unit = unit_with(&[0.5, -1.0], 0.25);
        unit.set_inputs(&[2.0, 1.0]).unwrap();
        assert_eq!(unit.weighted_sum(), 0.25);
        assert_eq!(unit.output(), sigmoid(0.25));
        assert_eq!(unit.activation_derivative(), sigmoid(0.25) * (1.0 - sigmoid(0.25)));
    }

    #[test]
    fn new_inputs_invalidate_cache() {
        let mut unit = unit_with(&[1.0], 0.0);
        unit.set_inputs(&[1.0]).unwrap();
        assert_eq!(unit.weighted_sum(), 1.0);
        unit.set_inputs(&[3.0]).unwrap();
        assert_eq!(unit.weighted_sum(), 3.0);
    }

    #[test]
    fn staging_leaves_weights_alone() {
        let mut unit = unit_with(&[1.0, 2.0], 0.5);
        unit.set_inputs(&[1.0, -2.0]).unwrap();
        unit.set_error(0.5);
        unit.stage_weight_delta(0.25);
        assert_eq!(unit.weights(), &[1.0, 2.0]);
        assert_eq!(unit.bias(), 0.625);

        unit.apply_weight_delta();
        assert_eq!(unit.weights(), &[1.125, 1.75]);
        // Weight and bias changes are visible to the next read.
        assert_eq!(unit.weighted_sum(), -1.75);
    }
}
