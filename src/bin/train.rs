use backprop::feed_forward::Network;
use backprop::layer::LayerKind;
use backprop::state::StateStore;
use backprop::trainer::{Logging, StopCondition, Trainer};

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

type Input = [f64; 2];
type Output = [f64; 1];

const XOR: [(Input, Output); 4] = [
    ([0.0, 0.0], [0.0]),
    ([0.0, 1.0], [1.0]),
    ([1.0, 0.0], [1.0]),
    ([1.0, 1.0], [0.0]),
];

fn build(seed: u64) -> Result<Network, backprop::Error> {
    let mut network = Network::new(2, 4, 0.5, StdRng::seed_from_u64(seed))?;
    network.add_layer(1, LayerKind::Output)?;
    Ok(network)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "xor.net".to_string());

    let (mut network, report) = Trainer::new(build(1)?, StdRng::seed_from_u64(3))
        .stop_condition(StopCondition::Steps(20_000))
        .evaluation_interval(2_000)
        .logging(Logging::Progress)
        .train(&XOR)?;
    for (input, target) in &XOR {
        let output = network.infer(input)?;
        info!(?input, ?target, ?output, "xor");
    }

    let store = StateStore::new(&path);
    store.save(&network)?;
    info!(%path, accuracy = report.accuracy, "saved network");

    let mut restored = build(2)?;
    store.load(&mut restored)?;
    for (input, _) in &XOR {
        if restored.infer(input)? != network.infer(input)? {
            return Err(format!("restored network disagrees on {:?}", input).into());
        }
    }
    info!(steps = restored.train_step_count(), "restored network matches");
    Ok(())
}
