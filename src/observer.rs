use ndarray::Array2;
use tracing::trace;

/// Summary of one processed batch inside [`crate::network::Network::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    /// Zero-based epoch index.
    pub epoch: usize,
    /// Zero-based batch index within the epoch.
    pub index: usize,
    /// Number of sample columns in the batch.
    pub columns: usize,
    pub loss: f64,
}

/// Side channel notified with intermediate values.
/// Implementations only observe; they cannot change what the network computes.
pub trait Observer {
    fn after_forward(&mut self, _layer_index: usize, _output: &Array2<f64>) {}

    fn after_backward(&mut self, _layer_index: usize, _input_gradient: &Array2<f64>) {}

    fn after_batch(&mut self, _summary: &BatchSummary) {}
}

/// Forwards every callback to `tracing` at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceObserver;

impl Observer for TraceObserver {
    fn after_forward(&mut self, layer_index: usize, output: &Array2<f64>) {
        trace!(layer = layer_index + 1, "forward output:\n{}", output);
    }

    fn after_backward(&mut self, layer_index: usize, input_gradient: &Array2<f64>) {
        trace!(layer = layer_index + 1, "backward gradient:\n{}", input_gradient);
    }

    fn after_batch(&mut self, summary: &BatchSummary) {
        trace!(
            epoch = summary.epoch,
            batch = summary.index,
            columns = summary.columns,
            loss = summary.loss,
            "batch done"
        );
    }
}
