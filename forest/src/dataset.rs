use crate::error::ForestError;

/// Row-major feature matrix with one class id per row.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    n_features: usize,
    n_classes: usize,
    values: Vec<f64>,
    targets: Vec<usize>,
}

impl Dataset {
    pub fn new(n_features: usize, n_classes: usize) -> Self {
        Self {
            n_features,
            n_classes,
            values: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn with_capacity(n_features: usize, n_classes: usize, rows: usize) -> Self {
        Self {
            n_features,
            n_classes,
            values: Vec::with_capacity(rows * n_features),
            targets: Vec::with_capacity(rows),
        }
    }

    pub fn push(&mut self, row: &[f64], class: usize) -> Result<(), ForestError> {
        if row.len() != self.n_features {
            return Err(ForestError::FeatureCount {
                expected: self.n_features,
                got: row.len(),
            });
        }
        if class >= self.n_classes {
            return Err(ForestError::ClassOutOfRange {
                class,
                n_classes: self.n_classes,
            });
        }
        if let Some(pos) = row.iter().position(|v| !v.is_finite()) {
            return Err(ForestError::NonFinite {
                row: self.len(),
                feature: pos,
            });
        }
        self.values.extend_from_slice(row);
        self.targets.push(class);
        Ok(())
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
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    #[inline]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.values[index * self.n_features..(index + 1) * self.n_features]
    }

    #[inline]
    pub fn value(&self, index: usize, feature: usize) -> f64 {
        self.values[index * self.n_features + feature]
    }

    #[inline]
    pub fn target(&self, index: usize) -> usize {
        self.targets[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64], usize)> + '_ {
        self.values
            .chunks_exact(self.n_features.max(1))
            .zip(self.targets.iter().copied())
    }
}
