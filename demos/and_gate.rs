use ndarray::arr2;
use neurochain::{Cost, FitConfig, Layer, Network, Result, TraceObserver};
use tracing_subscriber::EnvFilter;

// Pass a JSON file with `FitConfig` fields as the first argument to override the defaults.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => FitConfig::from_file(path)?,
        None => FitConfig::new(5000, 0.5)
            .batch_size(4)
            .save_history(false)
            .show_progress(true),
    };

    // x: (n_features, n_samples)
    let x_train = arr2(&[[0.0, 0.0, 1.0, 1.0], [0.0, 1.0, 0.0, 1.0]]);
    let y_train = arr2(&[[0.0, 0.0, 0.0, 1.0]]);

    let mut network = Network::new(vec![Layer::dense(2, 1), Layer::sigmoid()], Cost::LogLoss)?
        .with_observer(TraceObserver);
    println!("{}\n", network);

    let history = network.fit(x_train.view(), y_train.view(), &config)?;
    if let (Some(first), Some(last)) = (history.losses().first(), history.last_loss()) {
        println!("loss: {:.6} -> {:.6}", first, last);
    }

    let y_pred = network.forward(x_train)?;
    println!("predictions: {}", y_pred);
    println!("\n{}", network);
    Ok(())
}
