use parkir_base::{Day, Density, Hour, sample};
use parkir_forest::{Artifact, ArtifactError, ForestError};
use std::{fmt, path::Path};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictError {
    #[error(transparent)]
    Forest(#[from] ForestError),
    #[error("model produced unknown class {0}")]
    UnknownClass(usize),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Prediction {
    pub hour: Hour,
    pub day: Day,
    pub density: Density,
}

impl Prediction {
    #[inline]
    pub fn class(&self) -> usize {
        self.density.index()
    }

    /// Class id followed by its label and the day name, e.g. `0 kosong Senin`.
    pub fn describe(&self) -> String {
        format!("{} {} {}", self.class(), self.density, self.day.name())
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.class())
    }
}

/// Loads a model, refusing ones fit against a different label table.
pub fn load(path: &Path) -> Result<Artifact, ArtifactError> {
    Artifact::load(path, &Density::LABELS)
}

pub fn predict(artifact: &Artifact, hour: Hour, day: Day) -> Result<Prediction, PredictError> {
    let class = artifact.forest.predict(&sample::features(hour, day))?;
    let density = artifact
        .label(class)
        .and_then(|label| label.parse::<Density>().ok())
        .ok_or(PredictError::UnknownClass(class))?;
    Ok(Prediction { hour, day, density })
}
