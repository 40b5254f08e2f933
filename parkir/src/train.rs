use anyhow::{Context, Result};
use parkir_base::{Density, FEATURE_NAMES, Sample};
use parkir_forest::{Artifact, Dataset, ForestError, RandomForest, TrainingConfig};
use std::path::Path;
use tracing::info;

use crate::source::Source;

pub fn dataset(samples: &[Sample]) -> Result<Dataset, ForestError> {
    let mut data = Dataset::with_capacity(FEATURE_NAMES.len(), Density::COUNT, samples.len());
    for sample in samples {
        data.push(&sample.features(), sample.class())?;
    }
    Ok(data)
}

/// Fits a forest on `samples` and wraps it with the label table it was fit against.
pub fn fit(samples: &[Sample], config: TrainingConfig) -> Result<Artifact, ForestError> {
    let data = dataset(samples)?;
    let forest = RandomForest::fit(&config, &data)?;
    let accuracy = forest.accuracy(&data)?;
    info!(
        accuracy,
        trees = forest.n_trees(),
        seed = forest.seed(),
        "training finished"
    );
    Ok(Artifact::new(config, &Density::LABELS, forest))
}

pub fn run(source: &Source, config: TrainingConfig, model: &Path) -> Result<Artifact> {
    let samples = source
        .load()
        .with_context(|| format!("loading samples from {}", source))?;
    let artifact = fit(&samples, config).context("training model")?;
    artifact
        .store(model)
        .with_context(|| format!("storing model to {}", model.display()))?;
    Ok(artifact)
}
