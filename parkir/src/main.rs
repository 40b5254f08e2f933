use anyhow::{Context, Result};
use clap::Parser;
use parkir::{
    cli::{self, Args, Mode},
    predict, train,
};
use std::io;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::try_parse().unwrap_or_else(|err| cli::exit_with_usage(err));
    match args.mode {
        Mode::Train(train_args) => {
            train::run(&train_args.source(), train_args.config(), &args.model)?;
            println!("Model trained!");
        }
        Mode::Predict(predict_args) => {
            if predict_args.connection.is_some() {
                debug!("connection string is not used for prediction");
            }
            let artifact = predict::load(&args.model)
                .with_context(|| format!("loading model from {}", args.model.display()))?;
            let prediction = predict::predict(&artifact, predict_args.hour, predict_args.day)
                .context("running prediction")?;
            if predict_args.label {
                println!("{}", prediction.describe());
            } else {
                println!("{}", prediction);
            }
        }
    }
    Ok(())
}
