use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForestError {
    #[error("cannot fit a forest on an empty dataset")]
    EmptyDataset,
    #[error("expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },
    #[error("class {class} is out of range for {n_classes} classes")]
    ClassOutOfRange { class: usize, n_classes: usize },
    #[error("row {row} has a non-finite value in feature {feature}")]
    NonFinite { row: usize, feature: usize },
    #[error("forest must have at least one tree")]
    NoTrees,
    #[error("malformed tree at node {node}: {reason}")]
    Malformed { node: usize, reason: &'static str },
    #[error("tree {tree} is invalid")]
    InvalidTree {
        tree: usize,
        #[source]
        source: Box<ForestError>,
    },
    #[error("forest predicts {n_classes} classes but has {labels} labels")]
    LabelCount { n_classes: usize, labels: usize },
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("cannot access model file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot encode model")]
    Encode(#[source] bincode::Error),
    #[error("cannot decode model file {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },
    #[error("model file {path} is inconsistent")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ForestError,
    },
    #[error("model was trained with labels {found:?}, expected {expected:?}")]
    LabelMismatch {
        found: Vec<String>,
        expected: Vec<String>,
    },
}
