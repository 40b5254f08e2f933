use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    dataset::Dataset,
    error::ForestError,
    tree::{DecisionTree, TreeParams},
};

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaxFeatures {
    Sqrt,
    All,
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let n = match self {
            Self::Sqrt => (n_features as f64).sqrt().floor() as usize,
            Self::All => n_features,
            Self::Count(n) => n.min(n_features),
        };
        n.max(1)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct TrainingConfig {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    /// Drawn from the OS generator when absent.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }
}

/// Bagged ensemble of [`DecisionTree`]s voting by averaged class probabilities.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RandomForest {
    n_features: usize,
    n_classes: usize,
    seed: u64,
    pub(crate) trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(config: &TrainingConfig, data: &Dataset) -> Result<Self, ForestError> {
        if data.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        if config.n_trees == 0 {
            return Err(ForestError::NoTrees);
        }

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
            max_features: config.max_features.resolve(data.n_features()),
        };
        info!(
            seed,
            trees = config.n_trees,
            samples = data.len(),
            "fitting random forest"
        );

        let n = data.len();
        let all: Vec<usize> = (0..n).collect();
        let mut stream = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut trees = Vec::with_capacity(config.n_trees);
        for i in 0..config.n_trees {
            let mut rng = stream.clone();
            stream.jump();
            let tree = if config.bootstrap {
                let indices: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                DecisionTree::fit(data, &indices, &params, &mut rng)
            } else {
                DecisionTree::fit(data, &all, &params, &mut rng)
            };
            debug!(tree = i, nodes = tree.n_nodes(), depth = tree.depth(), "tree fitted");
            trees.push(tree);
        }

        Ok(Self {
            n_features: data.n_features(),
            n_classes: data.n_classes(),
            seed,
            trees,
        })
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn validate(&self) -> Result<(), ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::NoTrees);
        }
        for (tree, t) in self.trees.iter().enumerate() {
            t.validate(self.n_features, self.n_classes)
                .map_err(|source| ForestError::InvalidTree {
                    tree,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ForestError> {
        if row.len() != self.n_features {
            return Err(ForestError::FeatureCount {
                expected: self.n_features,
                got: row.len(),
            });
        }
        let mut probs = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in probs.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        probs.iter_mut().for_each(|p| *p /= n);
        Ok(probs)
    }

    /// Most probable class. Ties go to the lowest class id.
    pub fn predict(&self, row: &[f64]) -> Result<usize, ForestError> {
        let probs = self.predict_proba(row)?;
        let (best, _) = probs
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bp), (i, &p)| {
                if p > bp { (i, p) } else { (bi, bp) }
            });
        Ok(best)
    }

    pub fn accuracy(&self, data: &Dataset) -> Result<f64, ForestError> {
        if data.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        let mut hits = 0;
        for (row, target) in data.iter() {
            if self.predict(row)? == target {
                hits += 1;
            }
        }
        Ok(hits as f64 / data.len() as f64)
    }
}
