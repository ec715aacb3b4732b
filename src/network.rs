use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array2, ArrayView2};
use tracing::{debug, info};

use crate::config::FitConfig;
use crate::cost::Cost;
use crate::data::ColumnBatches;
use crate::error::{Error, Result};
use crate::history::{ChainSnapshot, TrainingHistory};
use crate::layer::Layer;
use crate::observer::{BatchSummary, Observer};

/// Ordered layer chain trained against a single cost.
pub struct Network {
    layers: Vec<Layer>,
    cost: Cost,
    observer: Option<Box<dyn Observer>>,
}

impl Network {
    /// Fails with [`Error::ShapeMismatch`] when consecutive dense layers do not chain.
    /// Activation layers are shape-transparent and skipped by the check.
    pub fn new(layers: Vec<Layer>, cost: Cost) -> Result<Self> {
        let mut previous_output: Option<usize> = None;
        for layer in &layers {
            if let Layer::Dense(dense) = layer {
                if let Some(output_size) = previous_output {
                    if output_size != dense.input_size() {
                        return Err(Error::shape_mismatch(
                            "layer chain",
                            &[output_size],
                            &[dense.input_size()],
                        ));
                    }
                }
                previous_output = Some(dense.output_size());
            }
        }

        Ok(Self {
            layers,
            cost,
            observer: None,
        })
    }

    pub fn with_observer<O: Observer + 'static>(mut self, observer: O) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Runs `input` through every layer in order. Parameters are not touched.
    pub fn forward(&mut self, input: Array2<f64>) -> Result<Array2<f64>> {
        let mut values = input;
        for (index, layer) in self.layers.iter_mut().enumerate() {
            values = layer.forward(values)?;
            if let Some(observer) = self.observer.as_mut() {
                observer.after_forward(index, &values);
            }
        }
        Ok(values)
    }

    pub fn forward_with_loss(
        &mut self,
        input: Array2<f64>,
        target: ArrayView2<f64>,
    ) -> Result<(Array2<f64>, f64)> {
        let prediction = self.forward(input)?;
        let loss = self.cost.loss(prediction.view(), target)?;
        Ok((prediction, loss))
    }

    /// Propagates the cost gradient through the layers in reverse, updating
    /// every dense layer, and returns the gradient with respect to the network input.
    ///
    /// Every layer's cache is checked against the gradient shapes before the
    /// first update, so a failed call leaves all parameters untouched.
    pub fn backward(
        &mut self,
        prediction: ArrayView2<f64>,
        target: ArrayView2<f64>,
        learning_rate: f64,
    ) -> Result<Array2<f64>> {
        let mut gradient = self.cost.gradient(prediction, target)?;
        let mut dim = gradient.dim();
        for layer in self.layers.iter().rev() {
            dim = layer.check_backward(dim)?;
        }

        for (index, layer) in self.layers.iter_mut().enumerate().rev() {
            gradient = layer.backward(gradient.view(), learning_rate)?;
            if let Some(observer) = self.observer.as_mut() {
                observer.after_backward(index, &gradient);
            }
        }
        Ok(gradient)
    }

    /// Mini-batch gradient descent over the columns of `x` and `y`.
    ///
    /// Batches are consecutive column slices visited left to right in every
    /// epoch, without shuffling. Each batch is forwarded, optionally
    /// snapshotted, recorded and then used for one backward update.
    pub fn fit<'a>(
        &mut self,
        x: ArrayView2<'a, f64>,
        y: ArrayView2<'a, f64>,
        config: &FitConfig,
    ) -> Result<TrainingHistory> {
        config.validate()?;
        let batch_size = config.batch_size.unwrap_or(x.ncols());
        let batches = ColumnBatches::new(x, y, batch_size)?;
        let n_batches = batches.len();
        info!(
            epochs = config.epochs,
            batches = n_batches,
            batch_size,
            learning_rate = config.learning_rate,
            "training started"
        );

        let progress = if config.show_progress {
            let bar = ProgressBar::new(config.epochs as u64);
            let template = "{bar:40} {pos}/{len} epochs {msg}";
            if let Ok(style) = ProgressStyle::default_bar().template(template) {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut history = TrainingHistory::new();
        for epoch in 0..config.epochs {
            let mut total_loss = 0.0;
            for (index, (x_batch, y_batch)) in batches.clone().enumerate() {
                let (prediction, loss) = self.forward_with_loss(x_batch.to_owned(), y_batch)?;
                let snapshot = config.save_history.then(|| self.snapshot());
                history.record(loss, snapshot);
                self.backward(prediction.view(), y_batch, config.learning_rate)?;

                total_loss += loss;
                if let Some(observer) = self.observer.as_mut() {
                    observer.after_batch(&BatchSummary {
                        epoch,
                        index,
                        columns: x_batch.ncols(),
                        loss,
                    });
                }
            }

            let mean_loss = total_loss / n_batches as f64;
            debug!(epoch, mean_loss, "epoch finished");
            progress.set_message(format!("loss {:.6}", mean_loss));
            progress.inc(1);
        }
        progress.finish();

        info!(final_loss = ?history.last_loss(), "training finished");
        Ok(history)
    }

    /// Copies the current parameters of every dense layer.
    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot::new(self.layers.iter().map(Layer::snapshot).collect())
    }

    /// Loads parameters taken by [`Network::snapshot`] back into the chain.
    pub fn restore(&mut self, snapshot: &ChainSnapshot) -> Result<()> {
        if snapshot.len() != self.layers.len() {
            return Err(Error::shape_mismatch(
                "network restore",
                &[self.layers.len()],
                &[snapshot.len()],
            ));
        }
        let pairs = self.layers.iter_mut().zip(snapshot.layers());
        for (index, (layer, saved)) in pairs.enumerate() {
            match (layer, saved) {
                (Layer::Dense(dense), Some(saved)) => dense.restore(saved)?,
                (Layer::Activation(_), None) => {}
                (layer, _) => {
                    return Err(Error::SnapshotMismatch {
                        index,
                        layer: layer.kind(),
                    })
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("layers", &self.layers)
            .field("cost", &self.cost)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "number of layers: {}", self.layers.len())?;
        for (index, layer) in self.layers.iter().enumerate() {
            writeln!(f, "\nlayer {} ({}):", index + 1, layer.kind())?;
            writeln!(f, "{}", layer)?;
        }
        write!(f, "\ncost: {}", self.cost)
    }
}
