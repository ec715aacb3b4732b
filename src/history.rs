use ndarray::Array2;

/// Independent copy of one dense layer's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseSnapshot {
    pub weights: Array2<f64>,
    pub biases: Array2<f64>,
}

/// Parameters of a whole layer chain, indexed by layer position.
/// Parameter-free layers hold `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSnapshot {
    layers: Vec<Option<DenseSnapshot>>,
}

impl ChainSnapshot {
    pub fn new(layers: Vec<Option<DenseSnapshot>>) -> Self {
        Self { layers }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, index: usize) -> Option<&DenseSnapshot> {
        self.layers.get(index).and_then(Option::as_ref)
    }

    pub fn layers(&self) -> &[Option<DenseSnapshot>] {
        &self.layers
    }
}

/// Record of a [`crate::network::Network::fit`] run.
///
/// `losses` holds one entry per processed batch. `snapshots` is either empty or
/// parallel to `losses`, each entry taken right before that batch's update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    losses: Vec<f64>,
    snapshots: Vec<ChainSnapshot>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, loss: f64, snapshot: Option<ChainSnapshot>) {
        if let Some(snapshot) = snapshot {
            self.snapshots.push(snapshot);
        }
        self.losses.push(loss);
    }

    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    pub fn snapshots(&self) -> &[ChainSnapshot] {
        &self.snapshots
    }

    pub fn last_loss(&self) -> Option<f64> {
        self.losses.last().copied()
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<ChainSnapshot>) {
        (self.losses, self.snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::arr2;

    #[test]
    fn chain_snapshot_skips_parameter_free_layers() {
        let dense = DenseSnapshot {
            weights: arr2(&[[1.0, 2.0]]),
            biases: arr2(&[[0.5]]),
        };
        let chain = ChainSnapshot::new(vec![Some(dense.clone()), None]);
        assert_eq!(2, chain.len());
        assert_eq!(Some(&dense), chain.layer(0));
        assert_eq!(None, chain.layer(1));
        assert_eq!(None, chain.layer(2));
    }

    #[test]
    fn record_appends_in_order() {
        let mut history = TrainingHistory::new();
        history.record(0.5, None);
        history.record(0.25, None);
        assert_eq!(&[0.5, 0.25], history.losses());
        assert!(history.snapshots().is_empty());
        assert_eq!(Some(0.25), history.last_loss());

        let (losses, snapshots) = history.into_parts();
        assert_eq!(vec![0.5, 0.25], losses);
        assert!(snapshots.is_empty());
    }
}
