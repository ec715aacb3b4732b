use std::fmt;

use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{Error, Result};

/// Predictions are clipped into `[LOG_LOSS_EPSILON, 1 - LOG_LOSS_EPSILON]` before any logarithm.
pub const LOG_LOSS_EPSILON: f64 = 1e-15;

pub type LossFn = fn(ArrayView2<f64>, ArrayView2<f64>) -> f64;
pub type GradientFn = fn(ArrayView2<f64>, ArrayView2<f64>) -> Array2<f64>;

/// Stateless loss and loss-gradient pair comparing a prediction to a target.
///
/// Both operands are laid out feature-rows × sample-columns, and the number of
/// columns is the sample count `m` every variant averages over.
#[derive(Debug, Clone, Copy)]
pub enum Cost {
    /// `sum((prediction - target)^2) / 2m`.
    MeanSquaredError,
    /// Binary cross-entropy.
    LogLoss,
    /// Called only after the shared shape and empty-batch checks pass.
    Custom {
        name: &'static str,
        loss: LossFn,
        gradient: GradientFn,
    },
}

impl Cost {
    fn check(prediction: &ArrayView2<f64>, target: &ArrayView2<f64>) -> Result<f64> {
        if prediction.dim() != target.dim() {
            return Err(Error::shape_mismatch(
                "cost",
                prediction.shape(),
                target.shape(),
            ));
        }
        if target.ncols() == 0 {
            return Err(Error::EmptyBatch { operation: "cost" });
        }
        Ok(target.ncols() as f64)
    }

    fn clip(p: f64) -> f64 {
        p.clamp(LOG_LOSS_EPSILON, 1.0 - LOG_LOSS_EPSILON)
    }

    pub fn loss(&self, prediction: ArrayView2<f64>, target: ArrayView2<f64>) -> Result<f64> {
        let m = Cost::check(&prediction, &target)?;
        let value = match self {
            Cost::MeanSquaredError => {
                Zip::from(&prediction)
                    .and(&target)
                    .fold(0.0, |sum, &p, &t| sum + (p - t).powi(2))
                    / (2.0 * m)
            }
            Cost::LogLoss => {
                let sum = Zip::from(&prediction)
                    .and(&target)
                    .fold(0.0, |sum, &p, &t| {
                        let p = Cost::clip(p);
                        sum + t * p.ln() + (1.0 - t) * (1.0 - p).ln()
                    });
                -sum / m
            }
            Cost::Custom { loss, .. } => loss(prediction, target),
        };
        Ok(value)
    }

    /// Gradient of [`Cost::loss`] with respect to `prediction`, shaped like it.
    pub fn gradient(
        &self,
        prediction: ArrayView2<f64>,
        target: ArrayView2<f64>,
    ) -> Result<Array2<f64>> {
        let m = Cost::check(&prediction, &target)?;
        let gradient = match self {
            Cost::MeanSquaredError => (&prediction - &target) / m,
            Cost::LogLoss => Zip::from(&prediction)
                .and(&target)
                .map_collect(|&p, &t| {
                    let p = Cost::clip(p);
                    -(t / p - (1.0 - t) / (1.0 - p)) / m
                }),
            Cost::Custom { gradient, .. } => gradient(prediction, target),
        };
        Ok(gradient)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cost::MeanSquaredError => "mean squared error",
            Cost::LogLoss => "log loss",
            Cost::Custom { name, .. } => name,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
