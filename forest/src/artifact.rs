use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{
    error::{ArtifactError, ForestError},
    forest::{RandomForest, TrainingConfig},
};

/// A fitted forest as stored on disk, together with the config it was fit with and
/// the label of every class id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Artifact {
    pub config: TrainingConfig,
    pub labels: Vec<String>,
    pub forest: RandomForest,
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

impl Artifact {
    pub fn new(config: TrainingConfig, labels: &[&str], forest: RandomForest) -> Self {
        Self {
            config,
            labels: labels.iter().map(|s| s.to_string()).collect(),
            forest,
        }
    }

    #[inline]
    pub fn label(&self, class: usize) -> Option<&str> {
        self.labels.get(class).map(String::as_str)
    }

    /// Writes to `<path>.tmp`, then renames it over `path`.
    pub fn store(&self, path: &Path) -> Result<(), ArtifactError> {
        let data = bincode::serialize(self).map_err(ArtifactError::Encode)?;
        let tmp = tmp_path(path);
        let io_err = |source| ArtifactError::Io {
            path: tmp.clone(),
            source,
        };
        let mut file = File::create(&tmp).map_err(io_err)?;
        file.write_all(data.as_slice()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp, path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = data.len(), "model stored");
        Ok(())
    }

    pub fn load(path: &Path, expected_labels: &[&str]) -> Result<Self, ArtifactError> {
        let data = fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: Artifact =
            bincode::deserialize(&data).map_err(|source| ArtifactError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        let invalid = |source| ArtifactError::Invalid {
            path: path.to_path_buf(),
            source,
        };
        artifact.forest.validate().map_err(invalid)?;
        if artifact.forest.n_classes() != artifact.labels.len() {
            return Err(invalid(ForestError::LabelCount {
                n_classes: artifact.forest.n_classes(),
                labels: artifact.labels.len(),
            }));
        }
        if artifact.labels.iter().map(String::as_str).ne(expected_labels.iter().copied()) {
            return Err(ArtifactError::LabelMismatch {
                found: artifact.labels,
                expected: expected_labels.iter().map(|s| s.to_string()).collect(),
            });
        }
        debug!(
            path = %path.display(),
            trees = artifact.forest.n_trees(),
            seed = artifact.forest.seed(),
            "model loaded"
        );
        Ok(artifact)
    }
}
