use std::fmt;

use ndarray::Array2;

/// Added to the sigmoid denominator so it can never be exactly zero.
pub const SIGMOID_EPSILON: f64 = 1e-15;

pub const DEFAULT_LEAKY_RELU_ALPHA: f64 = 0.01;

/// Element-wise nonlinearity paired with its derivative.
#[derive(Debug, Clone, Copy)]
pub enum Activation {
    Sigmoid,
    Relu,
    /// Negative slope coefficient.
    LeakyRelu(f64),
    Tanh,
    /// Arbitrary function pair, `derivative` is evaluated on the pre-activation input.
    Custom {
        name: &'static str,
        function: fn(f64) -> f64,
        derivative: fn(f64) -> f64,
    },
}

impl Activation {
    pub fn leaky_relu() -> Self {
        Activation::LeakyRelu(DEFAULT_LEAKY_RELU_ALPHA)
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp() + SIGMOID_EPSILON)
    }

    fn compute_one(&self, x: f64) -> f64 {
        match *self {
            Activation::Sigmoid => Activation::sigmoid(x),
            Activation::Relu => x.max(0.0),
            Activation::LeakyRelu(alpha) => {
                if x > 0.0 {
                    x
                } else {
                    alpha * x
                }
            }
            Activation::Tanh => x.tanh(),
            Activation::Custom { function, .. } => function(x),
        }
    }

    fn derivative_one(&self, x: f64) -> f64 {
        match *self {
            Activation::Sigmoid => {
                let a = Activation::sigmoid(x);
                a * (1.0 - a)
            }
            Activation::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyRelu(alpha) => {
                if x > 0.0 {
                    1.0
                } else {
                    alpha
                }
            }
            Activation::Tanh => 1.0 - x.tanh().powi(2),
            Activation::Custom { derivative, .. } => derivative(x),
        }
    }

    pub fn compute(&self, x: &Array2<f64>) -> Array2<f64> {
        x.mapv(|v| self.compute_one(v))
    }

    pub fn derivative(&self, x: &Array2<f64>) -> Array2<f64> {
        x.mapv(|v| self.derivative_one(v))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Relu => "relu",
            Activation::LeakyRelu(_) => "leaky relu",
            Activation::Tanh => "tanh",
            Activation::Custom { name, .. } => name,
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::LeakyRelu(alpha) => write!(f, "{} (alpha = {})", self.name(), alpha),
            _ => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_rel_eq_arr2;

    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn sigmoid_compute() {
        let x = arr2(&[[-2.0, -1.0, 0.0, 1.0, 2.0]]);
        let actual = Activation::Sigmoid.compute(&x);
        let expected = arr2(&[[
            0.1192029220221175,
            0.2689414213699951,
            0.5000000000000000,
            0.7310585786300049,
            0.8807970779778823,
        ]]);
        assert_rel_eq_arr2!(actual, expected);
    }

    #[test]
    fn sigmoid_derivative() {
        let x = arr2(&[[-2.0, -1.0, 0.0, 1.0, 2.0]]);
        let actual = Activation::Sigmoid.derivative(&x);
        let expected = arr2(&[[
            0.1049935854035065,
            0.1966119332414819,
            0.2500000000000000,
            0.1966119332414819,
            0.1049935854035066,
        ]]);
        assert_rel_eq_arr2!(actual, expected);
    }

    #[test]
    fn sigmoid_stays_finite_for_large_negative_input() {
        let x = arr2(&[[-1000.0, 1000.0]]);
        let actual = Activation::Sigmoid.compute(&x);
        assert!(actual.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn relu_compute() {
        let x = arr2(&[[-2.0, -1.0, 0.0, 1.0, 2.0]]);
        let actual = Activation::Relu.compute(&x);
        let expected = arr2(&[[0.0, 0.0, 0.0, 1.0, 2.0]]);
        assert_rel_eq_arr2!(actual, expected);
    }

    #[test]
    fn relu_derivative() {
        let x = arr2(&[[-2.0, -1.0, 0.0, 1.0, 2.0]]);
        let actual = Activation::Relu.derivative(&x);
        let expected = arr2(&[[0.0, 0.0, 0.0, 1.0, 1.0]]);
        assert_rel_eq_arr2!(actual, expected);
    }

    #[test]
    fn leaky_relu_compute_and_derivative() {
        let x = arr2(&[[-2.0, 0.0, 3.0]]);
        let leaky = Activation::LeakyRelu(0.1);
        assert_rel_eq_arr2!(leaky.compute(&x), arr2(&[[-0.2, 0.0, 3.0]]));
        assert_rel_eq_arr2!(leaky.derivative(&x), arr2(&[[0.1, 0.1, 1.0]]));
    }

    #[test]
    fn tanh_derivative() {
        let x = arr2(&[[-1.0, 0.0, 0.5]]);
        let actual = Activation::Tanh.derivative(&x);
        let expected = arr2(&[[0.4199743416140261, 1.0, 0.7864477329659274]]);
        assert_rel_eq_arr2!(actual, expected);
    }

    #[test]
    fn custom_activation_uses_given_functions() {
        let square = Activation::Custom {
            name: "square",
            function: |x| x * x,
            derivative: |x| 2.0 * x,
        };
        let x = arr2(&[[-1.0, 3.0]]);
        assert_rel_eq_arr2!(square.compute(&x), arr2(&[[1.0, 9.0]]));
        assert_rel_eq_arr2!(square.derivative(&x), arr2(&[[-2.0, 6.0]]));
        assert_eq!("square", square.to_string());
    }

    #[test]
    fn leaky_relu_display_shows_alpha() {
        assert_eq!("leaky relu (alpha = 0.01)", Activation::leaky_relu().to_string());
    }
}
