use itertools::Itertools;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{dataset::Dataset, error::ForestError};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probs: Vec<f64>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Number of non-constant features examined per node.
    pub max_features: usize,
}

/// CART classification tree split on Gini impurity. Nodes live in a flat arena, the root at index 0.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct Builder<'a, R: ?Sized> {
    data: &'a Dataset,
    params: &'a TreeParams,
    rng: &'a mut R,
    nodes: Vec<Node>,
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn partition(indices: &mut [usize], mut pred: impl FnMut(usize) -> bool) -> usize {
    let mut mid = 0;
    for i in 0..indices.len() {
        if pred(indices[i]) {
            indices.swap(i, mid);
            mid += 1;
        }
    }
    mid
}

impl<R: Rng + ?Sized> Builder<'_, R> {
    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.data.n_classes()];
        for &i in indices {
            counts[self.data.target(i)] += 1;
        }
        counts
    }

    fn leaf(counts: &[usize], total: usize) -> Node {
        let total = total.max(1) as f64;
        Node::Leaf {
            probs: counts.iter().map(|&c| c as f64 / total).collect(),
        }
    }

    fn build(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let counts = self.class_counts(indices);
        let id = self.nodes.len();
        self.nodes.push(Self::leaf(&counts, indices.len()));

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_deep = self.params.max_depth.is_some_and(|max| depth >= max);
        if pure || too_deep || indices.len() < self.params.min_samples_split {
            return id;
        }
        let Some(split) = self.best_split(indices, &counts) else {
            return id;
        };

        let data = self.data;
        let mid = partition(indices, |i| {
            data.value(i, split.feature) <= split.threshold
        });
        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = self.build(left_indices, depth + 1);
        let right = self.build(right_indices, depth + 1);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn best_split(&mut self, indices: &[usize], counts: &[usize]) -> Option<Split> {
        let mut order: Vec<usize> = (0..self.data.n_features()).collect();
        order.shuffle(&mut *self.rng);

        // Constant features do not count towards `max_features`.
        let mut visited = 0;
        let mut best: Option<Split> = None;
        for feature in order {
            if visited >= self.params.max_features {
                break;
            }
            let Some(split) = self.best_split_on(feature, indices, counts) else {
                continue;
            };
            visited += 1;
            if best.as_ref().is_none_or(|b| split.impurity < b.impurity) {
                best = Some(split);
            }
        }
        best
    }

    fn best_split_on(&self, feature: usize, indices: &[usize], counts: &[usize]) -> Option<Split> {
        let data = self.data;
        let sorted = indices
            .iter()
            .map(|&i| (data.value(i, feature), data.target(i)))
            .sorted_by(|a, b| a.0.total_cmp(&b.0))
            .collect_vec();

        let n = sorted.len();
        let mut left = vec![0; counts.len()];
        let mut right = counts.to_vec();
        let mut best: Option<Split> = None;
        for i in 1..n {
            let (prev, class) = sorted[i - 1];
            left[class] += 1;
            right[class] -= 1;
            let cur = sorted[i].0;
            if cur <= prev {
                continue;
            }
            let impurity = gini(&left, i) * i as f64 + gini(&right, n - i) * (n - i) as f64;
            if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                let mut threshold = prev + (cur - prev) / 2.0;
                if threshold >= cur {
                    threshold = prev;
                }
                best = Some(Split {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }
}

impl DecisionTree {
    /// Fits a tree on the rows of `data` listed in `indices`. Repeated indices weight a row.
    pub fn fit<R: Rng + ?Sized>(
        data: &Dataset,
        indices: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut builder = Builder {
            data,
            params,
            rng,
            nodes: Vec::new(),
        };
        let mut indices = indices.to_vec();
        builder.build(&mut indices, 0);
        DecisionTree {
            nodes: builder.nodes,
        }
    }

    /// Class probabilities of the leaf `row` lands in. `row` must have the fitted feature count.
    pub fn predict_proba(&self, row: &[f64]) -> &[f64] {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => node = if row[*feature] <= *threshold { *left } else { *right },
                Node::Leaf { probs } => return probs,
            }
        }
    }

    /// Checks that children come after their parent and stay in the arena, and that
    /// features and leaf widths fit the given shape.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ForestError> {
        let malformed = |node, reason| ForestError::Malformed { node, reason };
        if self.nodes.is_empty() {
            return Err(malformed(0, "tree has no nodes"));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(malformed(id, "split feature out of range"));
                    }
                    for &child in [left, right] {
                        if child <= id || child >= self.nodes.len() {
                            return Err(malformed(id, "child index out of order"));
                        }
                    }
                }
                Node::Leaf { probs } => {
                    if probs.len() != n_classes {
                        return Err(malformed(id, "leaf width differs from class count"));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn go(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Split { left, right, .. } => 1 + go(nodes, *left).max(go(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }
        go(&self.nodes, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            max_features: 2,
        }
    }

    fn hours() -> Dataset {
        let mut data = Dataset::new(2, 3);
        data.push(&[8.0, 1.0], 0).unwrap();
        data.push(&[12.0, 1.0], 1).unwrap();
        data.push(&[18.0, 1.0], 2).unwrap();
        data
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0, 0], 4), 0.0);
        assert_eq!(gini(&[2, 2, 0], 4), 0.5);
        assert_eq!(gini(&[0, 0, 0], 0), 0.0);
    }

    #[test]
    fn test_fit_separates_classes() {
        let data = hours();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let tree = DecisionTree::fit(&data, &[0, 1, 2], &params(), &mut rng);
        assert_eq!(tree.predict_proba(&[8.0, 1.0]), &[1.0, 0.0, 0.0]);
        assert_eq!(tree.predict_proba(&[12.0, 1.0]), &[0.0, 1.0, 0.0]);
        assert_eq!(tree.predict_proba(&[18.0, 1.0]), &[0.0, 0.0, 1.0]);
        assert_eq!(tree.predict_proba(&[0.0, 1.0]), &[1.0, 0.0, 0.0]);
        assert_eq!(tree.predict_proba(&[23.0, 1.0]), &[0.0, 0.0, 1.0]);
        assert_eq!(tree.n_nodes(), 5);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_constant_feature_is_skipped() {
        // The day column is constant, so a single-feature search must fall through to the hour.
        let data = hours();
        let params = TreeParams {
            max_features: 1,
            ..params()
        };
        for seed in 0..16 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let tree = DecisionTree::fit(&data, &[0, 1, 2], &params, &mut rng);
            assert_eq!(tree.predict_proba(&[8.0, 1.0]), &[1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_zero_gain_split_is_kept() {
        let mut data = Dataset::new(1, 2);
        for (hour, class) in [(1.0, 0), (1.0, 1), (2.0, 0), (2.0, 1)] {
            data.push(&[hour], class).unwrap();
        }
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let tree = DecisionTree::fit(&data, &[0, 1, 2, 3], &params(), &mut rng);
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.predict_proba(&[1.0]), &[0.5, 0.5]);
        assert_eq!(tree.predict_proba(&[2.0]), &[0.5, 0.5]);
    }

    #[test]
    fn test_validate() {
        let data = hours();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let tree = DecisionTree::fit(&data, &[0, 1, 2], &params(), &mut rng);
        assert_eq!(tree.validate(2, 3), Ok(()));
        assert_eq!(
            tree.validate(2, 2),
            Err(ForestError::Malformed {
                node: 1,
                reason: "leaf width differs from class count"
            })
        );

        let empty = DecisionTree { nodes: Vec::new() };
        assert!(empty.validate(2, 3).is_err());

        let looped = DecisionTree {
            nodes: vec![Node::Split {
                feature: 0,
                threshold: 10.0,
                left: 0,
                right: 0,
            }],
        };
        assert_eq!(
            looped.validate(2, 3),
            Err(ForestError::Malformed {
                node: 0,
                reason: "child index out of order"
            })
        );

        let dangling = DecisionTree {
            nodes: vec![
                Node::Split {
                    feature: 0,
                    threshold: 10.0,
                    left: 1,
                    right: 5,
                },
                Node::Leaf {
                    probs: vec![1.0, 0.0, 0.0],
                },
            ],
        };
        assert!(dangling.validate(2, 3).is_err());

        let wide = DecisionTree {
            nodes: vec![
                Node::Split {
                    feature: 2,
                    threshold: 10.0,
                    left: 1,
                    right: 2,
                },
                Node::Leaf {
                    probs: vec![1.0, 0.0, 0.0],
                },
                Node::Leaf {
                    probs: vec![0.0, 1.0, 0.0],
                },
            ],
        };
        assert_eq!(
            wide.validate(2, 3),
            Err(ForestError::Malformed {
                node: 0,
                reason: "split feature out of range"
            })
        );
    }

    #[test]
    fn test_max_depth() {
        let data = hours();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let params = TreeParams {
            max_depth: Some(0),
            ..params()
        };
        let tree = DecisionTree::fit(&data, &[0, 1, 2], &params, &mut rng);
        assert_eq!(tree.n_nodes(), 1);
        let probs = tree.predict_proba(&[8.0, 1.0]);
        assert!(probs.iter().all(|&p| (p - 1.0 / 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_repeated_indices_weight_rows() {
        let mut data = Dataset::new(1, 2);
        data.push(&[1.0], 0).unwrap();
        data.push(&[1.0], 1).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let tree = DecisionTree::fit(&data, &[0, 0, 0, 1], &params(), &mut rng);
        assert_eq!(tree.predict_proba(&[1.0]), &[0.75, 0.25]);
    }
}
