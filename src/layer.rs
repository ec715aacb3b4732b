mod dense;

use std::fmt;

use ndarray::{Array2, ArrayView2};

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::history::DenseSnapshot;

pub use dense::Dense;

/// Parameter-free layer applying an [`Activation`] element-wise.
#[derive(Debug, Clone)]
pub struct ActivationLayer {
    activation: Activation,
    input: Option<Array2<f64>>,
    output: Option<Array2<f64>>,
}

impl ActivationLayer {
    pub fn new(activation: Activation) -> Self {
        Self {
            activation,
            input: None,
            output: None,
        }
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn forward(&mut self, input: Array2<f64>) -> Result<Array2<f64>> {
        let output = self.activation.compute(&input);
        self.input = Some(input);
        self.output = Some(output.clone());
        Ok(output)
    }

    pub fn check_backward(&self, gradient_dim: (usize, usize)) -> Result<(usize, usize)> {
        let input = self
            .input
            .as_ref()
            .ok_or(Error::UnpreparedLayer { layer: "activation" })?;
        if gradient_dim != input.dim() {
            return Err(Error::shape_mismatch(
                "activation backward",
                input.shape(),
                &[gradient_dim.0, gradient_dim.1],
            ));
        }
        Ok(gradient_dim)
    }

    /// `learning_rate` is unused; activations have no parameters.
    pub fn backward(
        &mut self,
        output_gradient: ArrayView2<f64>,
        _learning_rate: f64,
    ) -> Result<Array2<f64>> {
        self.check_backward(output_gradient.dim())?;
        let input = self
            .input
            .as_ref()
            .ok_or(Error::UnpreparedLayer { layer: "activation" })?;
        Ok(self.activation.derivative(input) * &output_gradient)
    }
}

/// One link of a network's layer chain.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(Dense),
    Activation(ActivationLayer),
}

impl Layer {
    pub fn dense(input_size: usize, output_size: usize) -> Self {
        Layer::Dense(Dense::new(input_size, output_size))
    }

    pub fn sigmoid() -> Self {
        Layer::from(Activation::Sigmoid)
    }

    pub fn relu() -> Self {
        Layer::from(Activation::Relu)
    }

    pub fn leaky_relu(alpha: f64) -> Self {
        Layer::from(Activation::LeakyRelu(alpha))
    }

    pub fn tanh() -> Self {
        Layer::from(Activation::Tanh)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Dense(_) => "dense",
            Layer::Activation(_) => "activation",
        }
    }

    /// Caches `input` and the produced output for the next [`Layer::backward`].
    pub fn forward(&mut self, input: Array2<f64>) -> Result<Array2<f64>> {
        if input.ncols() == 0 {
            return Err(Error::EmptyBatch {
                operation: "layer forward",
            });
        }
        match self {
            Layer::Dense(layer) => layer.forward(input),
            Layer::Activation(layer) => layer.forward(input),
        }
    }

    pub fn backward(
        &mut self,
        output_gradient: ArrayView2<f64>,
        learning_rate: f64,
    ) -> Result<Array2<f64>> {
        if output_gradient.ncols() == 0 {
            return Err(Error::EmptyBatch {
                operation: "layer backward",
            });
        }
        match self {
            Layer::Dense(layer) => layer.backward(output_gradient, learning_rate),
            Layer::Activation(layer) => layer.backward(output_gradient, learning_rate),
        }
    }

    /// Validates a backward pass without running it, returning the shape of
    /// the input gradient it would produce.
    pub fn check_backward(&self, gradient_dim: (usize, usize)) -> Result<(usize, usize)> {
        if gradient_dim.1 == 0 {
            return Err(Error::EmptyBatch {
                operation: "layer backward",
            });
        }
        match self {
            Layer::Dense(layer) => layer.check_backward(gradient_dim),
            Layer::Activation(layer) => layer.check_backward(gradient_dim),
        }
    }

    pub fn input(&self) -> Option<&Array2<f64>> {
        match self {
            Layer::Dense(layer) => layer.input(),
            Layer::Activation(layer) => layer.input.as_ref(),
        }
    }

    pub fn output(&self) -> Option<&Array2<f64>> {
        match self {
            Layer::Dense(layer) => layer.output(),
            Layer::Activation(layer) => layer.output.as_ref(),
        }
    }

    /// Parameter copy for dense layers, `None` for parameter-free layers.
    pub fn snapshot(&self) -> Option<DenseSnapshot> {
        match self {
            Layer::Dense(layer) => Some(layer.snapshot()),
            Layer::Activation(_) => None,
        }
    }
}

impl From<Dense> for Layer {
    fn from(layer: Dense) -> Self {
        Layer::Dense(layer)
    }
}

impl From<Activation> for Layer {
    fn from(activation: Activation) -> Self {
        Layer::Activation(ActivationLayer::new(activation))
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Dense(layer) => write!(f, "{}", layer),
            Layer::Activation(layer) => write!(f, "{}", layer.activation),
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
    fn activation_backward_uses_cached_input() {
        let mut layer = Layer::relu();
        let output = layer.forward(arr2(&[[-1.0, 2.0], [3.0, -4.0]])).unwrap();
        assert_rel_eq_arr2!(output, arr2(&[[0.0, 2.0], [3.0, 0.0]]));

        let gradient = layer
            .backward(arr2(&[[5.0, 6.0], [7.0, 8.0]]).view(), 0.1)
            .unwrap();
        assert_rel_eq_arr2!(gradient, arr2(&[[0.0, 6.0], [7.0, 0.0]]));
    }

    #[test]
    fn sigmoid_backward_matches_derivative() {
        let mut layer = Layer::sigmoid();
        layer.forward(arr2(&[[0.0]])).unwrap();
        let gradient = layer.backward(arr2(&[[2.0]]).view(), 0.1).unwrap();
        assert_rel_eq_arr2!(gradient, arr2(&[[0.5]]));
    }

    #[test]
    fn backward_before_forward_fails() {
        let mut layer = Layer::tanh();
        let err = layer.backward(arr2(&[[1.0]]).view(), 0.1).unwrap_err();
        assert!(matches!(err, Error::UnpreparedLayer { layer: "activation" }));
    }

    #[test]
    fn activation_backward_rejects_wrong_shape() {
        let mut layer = Layer::tanh();
        layer.forward(arr2(&[[1.0, 2.0]])).unwrap();
        let err = layer.backward(arr2(&[[1.0]]).view(), 0.1).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn check_backward_follows_cached_shapes() {
        let dense = Dense::with_params(Array2::ones((1, 3)), Array2::zeros((1, 1))).unwrap();
        let mut layer = Layer::Dense(dense);
        assert!(matches!(
            layer.check_backward((1, 2)),
            Err(Error::UnpreparedLayer { layer: "dense" })
        ));

        layer.forward(Array2::ones((3, 2))).unwrap();
        let before = layer.snapshot();
        assert_eq!((3, 2), layer.check_backward((1, 2)).unwrap());
        assert!(matches!(
            layer.check_backward((1, 5)),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            layer.check_backward((1, 0)),
            Err(Error::EmptyBatch { .. })
        ));
        assert_eq!(before, layer.snapshot());
    }

    #[test]
    fn empty_batch_is_rejected() {
        let mut layer = Layer::dense(2, 1);
        let err = layer.forward(Array2::zeros((2, 0))).unwrap_err();
        assert!(matches!(err, Error::EmptyBatch { .. }));
    }

    #[test]
    fn forward_caches_input_and_output() {
        let mut layer = Layer::leaky_relu(0.5);
        assert!(layer.input().is_none());
        layer.forward(arr2(&[[-2.0]])).unwrap();
        assert_rel_eq_arr2!(layer.input().unwrap().clone(), arr2(&[[-2.0]]));
        assert_rel_eq_arr2!(layer.output().unwrap().clone(), arr2(&[[-1.0]]));
    }

    #[test]
    fn only_dense_layers_have_snapshots() {
        assert!(Layer::dense(2, 3).snapshot().is_some());
        assert!(Layer::sigmoid().snapshot().is_none());
    }
}
