use std::fmt;

use ndarray::{Array, Array2, ArrayView2, Axis};
use ndarray_rand::rand::{thread_rng, Rng};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;

use crate::error::{Error, Result};
use crate::history::DenseSnapshot;

/// Fully connected layer computing `weights · input + biases`.
///
/// `weights` has shape `(output_size, input_size)` and `biases` has shape
/// `(output_size, 1)`; the bias column is broadcast across every sample.
#[derive(Debug, Clone)]
pub struct Dense {
    weights: Array2<f64>,
    biases: Array2<f64>,
    input: Option<Array2<f64>>,
    output: Option<Array2<f64>>,
}

impl Dense {
    /// Draws every weight and bias from the standard normal distribution.
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Dense::with_rng(input_size, output_size, &mut thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        let weights = Array::random_using((output_size, input_size), StandardNormal, rng);
        let biases = Array::random_using((output_size, 1), StandardNormal, rng);
        Self {
            weights,
            biases,
            input: None,
            output: None,
        }
    }

    pub fn with_params(weights: Array2<f64>, biases: Array2<f64>) -> Result<Self> {
        if biases.dim() != (weights.nrows(), 1) {
            return Err(Error::shape_mismatch(
                "dense parameters",
                weights.shape(),
                biases.shape(),
            ));
        }
        Ok(Self {
            weights,
            biases,
            input: None,
            output: None,
        })
    }

    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn biases(&self) -> &Array2<f64> {
        &self.biases
    }

    pub fn input(&self) -> Option<&Array2<f64>> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&Array2<f64>> {
        self.output.as_ref()
    }

    pub fn forward(&mut self, input: Array2<f64>) -> Result<Array2<f64>> {
        if input.nrows() != self.input_size() {
            return Err(Error::shape_mismatch(
                "dense forward",
                self.weights.shape(),
                input.shape(),
            ));
        }

        let output = self.weights.dot(&input) + &self.biases;
        self.input = Some(input);
        self.output = Some(output.clone());
        Ok(output)
    }

    /// Checks that a gradient of shape `gradient_dim` can be propagated and
    /// returns the shape of the resulting input gradient. Nothing is mutated.
    pub fn check_backward(&self, gradient_dim: (usize, usize)) -> Result<(usize, usize)> {
        let input = self
            .input
            .as_ref()
            .ok_or(Error::UnpreparedLayer { layer: "dense" })?;
        if gradient_dim != (self.output_size(), input.ncols()) {
            return Err(Error::shape_mismatch(
                "dense backward",
                &[self.output_size(), input.ncols()],
                &[gradient_dim.0, gradient_dim.1],
            ));
        }
        Ok(input.dim())
    }

    /// Returns the gradient with respect to the input, then applies one
    /// gradient descent step to the weights and biases.
    pub fn backward(
        &mut self,
        output_gradient: ArrayView2<f64>,
        learning_rate: f64,
    ) -> Result<Array2<f64>> {
        self.check_backward(output_gradient.dim())?;
        let input = self
            .input
            .as_ref()
            .ok_or(Error::UnpreparedLayer { layer: "dense" })?;

        let weights_derivative = output_gradient.dot(&input.t());
        let biases_derivative = output_gradient.sum_axis(Axis(1)).insert_axis(Axis(1));
        // Must use the weights from before this update.
        let inputs_derivative = self.weights.t().dot(&output_gradient);

        self.weights.scaled_add(-learning_rate, &weights_derivative);
        self.biases.scaled_add(-learning_rate, &biases_derivative);
        Ok(inputs_derivative)
    }

    pub fn snapshot(&self) -> DenseSnapshot {
        DenseSnapshot {
            weights: self.weights.clone(),
            biases: self.biases.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &DenseSnapshot) -> Result<()> {
        if snapshot.weights.dim() != self.weights.dim() {
            return Err(Error::shape_mismatch(
                "dense restore",
                self.weights.shape(),
                snapshot.weights.shape(),
            ));
        }
        if snapshot.biases.dim() != self.biases.dim() {
            return Err(Error::shape_mismatch(
                "dense restore",
                self.biases.shape(),
                snapshot.biases.shape(),
            ));
        }
        self.weights.assign(&snapshot.weights);
        self.biases.assign(&snapshot.biases);
        Ok(())
    }
}

impl fmt::Display for Dense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "input size: {}", self.input_size())?;
        writeln!(f, "output size: {}", self.output_size())?;
        writeln!(f, "weights:\n{}", self.weights)?;
        write!(f, "biases:\n{}", self.biases)
    }
}
