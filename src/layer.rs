use crate::error::{Error, Result};
use crate::unit::Unit;

use rand::Rng;

/// The role a layer plays in the network.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    /// An intermediate layer, trained from the errors of the layer after it.
    Hidden,
    /// The final layer, trained against an externally supplied target.
    Output,
}

#[derive(Clone, Debug)]
enum Role {
    Hidden,
    Output { target: Vec<f64> },
}

/// A fully connected layer of sigmoid units.
///
/// Every unit in the layer has the same fan-in: the width of the previous
/// layer, or the width of the network input for the first layer.
#[derive(Clone, Debug)]
pub struct Layer {
    units: Vec<Unit>,
    role: Role,
}

impl Layer {
    /// Initializes a new, untrained layer.
    ///
    /// Arguments:
    ///
    ///  * `kind` - whether this is a hidden or an output layer.
    ///  * `inputs` - the number of inputs to each unit of this layer.
    ///  * `width` - the number of units in this layer.
    ///  * `rng` - the source for the initial weights.
    pub fn new<R: Rng>(kind: LayerKind, inputs: usize, width: usize, rng: &mut R) -> Self {
        let units = (0..width).map(|_| Unit::new(inputs, rng)).collect();
        let role = match kind {
            LayerKind::Hidden => Role::Hidden,
            LayerKind::Output => Role::Output {
                target: vec![0.0; width],
            },
        };
        Layer { units, role }
    }

    pub fn kind(&self) -> LayerKind {
        match self.role {
            Role::Hidden => LayerKind::Hidden,
            Role::Output { .. } => LayerKind::Output,
        }
    }

    /// Returns the number of inputs to each unit of this layer.
    pub fn input_len(&self) -> usize {
        self.units.first().map_or(0, Unit::num_inputs)
    }

    /// Returns the number of units in this layer.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub(crate) fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    /// Returns the activated output of every unit.
    pub fn outputs(&mut self) -> Vec<f64> {
        self.units.iter_mut().map(Unit::output).collect()
    }

    /// Feeds the same `inputs` vector to every unit.
    pub fn set_inputs(&mut self, inputs: &[f64]) -> Result<()> {
        if inputs.len() != self.input_len() {
            return Err(Error::shape("layer input", self.input_len(), inputs.len()));
        }
        for unit in &mut self.units {
            unit.set_inputs(inputs)?;
        }
        Ok(())
    }

    /// Copies the outputs of `prev` into the inputs of every unit.
    pub fn forward_propagate(&mut self, prev: &mut Layer) -> Result<()> {
        let inputs = prev.outputs();
        self.set_inputs(&inputs)
    }

    /// Sets the expected outputs for the next backward pass.
    pub fn set_target(&mut self, expected: &[f64]) -> Result<()> {
        let width = self.len();
        match &mut self.role {
            Role::Output { target } => {
                if expected.len() != width {
                    return Err(Error::shape("target", width, expected.len()));
                }
                target.copy_from_slice(expected);
                Ok(())
            }
            Role::Hidden => Err(Error::InvalidTopology(
                "a hidden layer has no target".into(),
            )),
        }
    }

    /// Computes the error of every unit from the target, and stages its
    /// weight update.
    pub fn back_propagate_output(&mut self, eta: f64) -> Result<()> {
        let target = match &self.role {
            Role::Output { target } => target,
            Role::Hidden => {
                return Err(Error::InvalidTopology(
                    "cannot backpropagate a target through a hidden layer".into(),
                ))
            }
        };
        for (unit, expected) in self.units.iter_mut().zip(target) {
            let error = (expected - unit.output()) * unit.activation_derivative();
            unit.set_error(error);
            unit.stage_weight_delta(eta);
        }
        Ok(())
    }

    /// Computes the error of every unit from the errors of `next`, and
    /// stages its weight update.
    ///
    /// Unit `i` of this layer feeds input `i` of every unit in `next`, so its
    /// error is the sum of those units' errors weighted by their `i`th
    /// weight.
    pub fn back_propagate_hidden(&mut self, next: &Layer, eta: f64) -> Result<()> {
        if next.input_len() != self.len() {
            return Err(Error::shape("next layer fan-in", self.len(), next.input_len()));
        }
        for (i, unit) in self.units.iter_mut().enumerate() {
            let downstream: f64 = next
                .units
                .iter()
                .map(|n| n.error() * n.weights()[i])
                .sum();
            let error = downstream * unit.activation_derivative();
            unit.set_error(error);
            unit.stage_weight_delta(eta);
        }
        Ok(())
    }

    /// Applies every unit's staged weight update.
    pub fn apply_weight_deltas(&mut self) {
        for unit in &mut self.units {
            unit.apply_weight_delta();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layer(kind: LayerKind, inputs: usize, width: usize) -> Layer {
        Layer::new(kind, inputs, width, &mut StdRng::seed_from_u64(5))
    }

    #[test]
    fn shape() {
        let layer = layer(LayerKind::Hidden, 3, 4);
        assert_eq!(layer.len(), 4);
        assert_eq!(layer.input_len(), 3);
        assert_eq!(layer.kind(), LayerKind::Hidden);
        assert!(layer.units().iter().all(|u| u.num_inputs() == 3));
    }

    #[test]
    fn every_unit_sees_full_input() {
        let mut layer = layer(LayerKind::Hidden, 2, 3);
        layer.set_inputs(&[0.25, -1.0]).unwrap();
        for unit in layer.units() {
            assert_eq!(unit.inputs(), &[0.25, -1.0]);
        }
    }

    #[test]
    fn forward_copies_previous_outputs() {
        let mut prev = layer(LayerKind::Hidden, 2, 3);
        let mut next = layer(LayerKind::Output, 3, 2);
        prev.set_inputs(&[1.0, 0.0]).unwrap();
        next.forward_propagate(&mut prev).unwrap();
        let expected = prev.outputs();
        for unit in next.units() {
            assert_eq!(unit.inputs(), &expected[..]);
        }
    }

    #[test]
    fn hidden_layer_has_no_target() {
        let mut layer = layer(LayerKind::Hidden, 2, 2);
        assert!(matches!(
            layer.set_target(&[0.0, 1.0]),
            Err(Error::InvalidTopology(_))
        ));
        assert!(matches!(
            layer.back_propagate_output(0.1),
            Err(Error::InvalidTopology(_))
        ));
    }

    #[test]
    fn target_width_checked() {
        let mut layer = layer(LayerKind::Output, 2, 2);
        assert!(matches!(
            layer.set_target(&[1.0]),
            Err(Error::ShapeMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn output_error_signal() {
        let mut layer = layer(LayerKind::Output, 1, 1);
        layer.units_mut()[0].set_parameters(&[0.0], 0.0);
        layer.set_inputs(&[1.0]).unwrap();
        layer.set_target(&[1.0]).unwrap();
        layer.back_propagate_output(1.0).unwrap();
        // output = 0.5, f' = 0.25
        assert_eq!(layer.units()[0].error(), 0.125);
        assert_eq!(layer.units()[0].bias(), 0.125);
        assert_eq!(layer.units()[0].weights(), &[0.0]);
        layer.apply_weight_deltas();
        assert_eq!(layer.units()[0].weights(), &[0.125]);
    }

    #[test]
    fn hidden_error_signal() {
        let mut hidden = layer(LayerKind::Hidden, 1, 2);
        let mut output = layer(LayerKind::Output, 2, 1);
        for unit in hidden.units_mut() {
            unit.set_parameters(&[0.0], 0.0);
        }
        output.units_mut()[0].set_parameters(&[2.0, -4.0], 0.0);
        output.units_mut()[0].set_error(0.5);
        hidden.set_inputs(&[1.0]).unwrap();
        hidden.back_propagate_hidden(&output, 1.0).unwrap();
        // Both hidden outputs are 0.5, so f' = 0.25.
        assert_eq!(hidden.units()[0].error(), 0.5 * 2.0 * 0.25);
        assert_eq!(hidden.units()[1].error(), 0.5 * -4.0 * 0.25);
    }

    #[test]
    fn hidden_fan_out_checked() {
        let mut hidden = layer(LayerKind::Hidden, 1, 3);
        let output = layer(LayerKind::Output, 2, 1);
        let before: Vec<f64> = hidden.units().iter().map(Unit::bias).collect();
        assert!(matches!(
            hidden.back_propagate_hidden(&output, 1.0),
            Err(Error::ShapeMismatch { expected: 3, actual: 2, .. })
        ));
        let after: Vec<f64> = hidden.units().iter().map(Unit::bias).collect();
        assert_eq!(after, before);
    }
}
