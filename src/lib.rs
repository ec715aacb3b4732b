//! Feed-forward neural networks trained with mini-batch gradient descent.
//!
//! Every data matrix is laid out feature-rows × sample-columns: a batch of `m`
//! samples with `n` features is an `n × m` matrix.

pub mod activation;
pub mod config;
pub mod cost;
pub mod data;
pub mod error;
pub mod history;
pub mod layer;
pub mod network;
pub mod observer;

pub use activation::Activation;
pub use config::FitConfig;
pub use cost::Cost;
pub use error::{Error, Result};
pub use history::{ChainSnapshot, DenseSnapshot, TrainingHistory};
pub use layer::{ActivationLayer, Dense, Layer};
pub use network::Network;
pub use observer::{BatchSummary, Observer, TraceObserver};

#[macro_export]
macro_rules! assert_rel_eq_arr2 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w, epsilon = 1e-12, max_relative = 1e-10);
            });
    };
}
