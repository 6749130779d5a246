//! The [logistic sigmoid](https://en.wikipedia.org/wiki/Sigmoid_function)
//! activation function.

/// Evaluates `f(x) = 1 / (1 + e^-x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Evaluates the derivative `f'(x)`.
pub fn sigmoid_prime(x: f64) -> f64 {
    sigmoid_prime_from_output(sigmoid(x))
}

/// Evaluates the derivative `f'(x)`, where `y = f(x)`.
///
/// Note that this function takes in the *output* of the activation
/// function, rather than the input. The sigmoid is its own derivative up to
/// `f * (1 - f)`, so a unit can reuse the activation it already computed on
/// the forward pass.
pub fn sigmoid_prime_from_output(y: f64) -> f64 {
    y * (1.0 - y)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn sigmoid_midpoint() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert_eq!(sigmoid_prime(0.0), 0.25);
    }

    #[test]
    fn sigmoid_saturates() {
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 0.000_001);
        assert!(sigmoid_prime(40.0) < 1e-6);
    }

    proptest! {
        #[test]
        fn derivative_matches_identity(x in -50.0f64..50.0) {
            let s = sigmoid(x);
            prop_assert!((sigmoid_prime(x) - s * (1.0 - s)).abs() < 1e-12);
        }

        #[test]
        fn derivative_matches_finite_difference(x in -8.0f64..8.0) {
            let h = 1e-6;
            let numeric = (sigmoid(x + h) - sigmoid(x - h)) / (2.0 * h);
            prop_assert!((sigmoid_prime(x) - numeric).abs() < 1e-6);
        }

        #[test]
        fn output_in_open_unit_interval(x in -30.0f64..30.0) {
            let s = sigmoid(x);
            prop_assert!(s > 0.0 && s < 1.0);
        }
    }
}
