mod cuts;
mod grower;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{BoostErr, Result};

pub(crate) use cuts::FeatureCuts;
pub(crate) use grower::TreeGrower;

/// A node of a regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Rows with `value < threshold` go `left`, the rest (missing values included) go `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A regression tree stored as a flat node list, the root is the first node and
/// children always come after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegTree {
    nodes: Vec<Node>,
}

impl RegTree {
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// The amount of splits on the longest root to leaf path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }

        walk(&self.nodes, 0)
    }

    /// Routes `row` down to a leaf and returns its value.
    pub fn predict(&self, row: ArrayView1<'_, f32>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if f64::from(row[feature]) < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Checks a tree read from an untrusted document can be walked safely.
    pub(crate) fn validate(&self, num_features: usize) -> Result<()> {
        let invalid = |reason: String| {
            Err(BoostErr::InvalidParam {
                name: "trees",
                reason,
            })
        };

        if self.nodes.is_empty() {
            return invalid("tree without nodes".to_string());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { value } if !value.is_finite() => {
                    return invalid(format!("leaf {idx} holds {value}"));
                }
                Node::Split { feature, .. } if feature >= num_features => {
                    return invalid(format!(
                        "node {idx} splits on feature {feature} of {num_features}"
                    ));
                }
                Node::Split { left, right, .. }
                    if left <= idx
                        || right <= idx
                        || left >= self.nodes.len()
                        || right >= self.nodes.len() =>
                {
                    return invalid(format!("node {idx} has out of order children"));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn stump() -> RegTree {
        RegTree::from_nodes(vec![
            Node::Split {
                feature: 1,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: -1.0 },
            Node::Leaf { value: 1.0 },
        ])
    }

    #[test]
    fn routes_rows_by_threshold() {
        let tree = stump();
        assert_eq!(tree.predict(array![9.0, 0.0].view()), -1.0);
        assert_eq!(tree.predict(array![9.0, 0.5].view()), 1.0);
        assert_eq!(tree.predict(array![9.0, f32::NAN].view()), 1.0);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.num_leaves(), 2);
    }

    #[test]
    fn rejects_cycles_and_unknown_features() {
        assert!(stump().validate(2).is_ok());
        assert!(stump().validate(1).is_err());

        let cyclic = RegTree::from_nodes(vec![Node::Split {
            feature: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
        }]);
        assert!(cyclic.validate(1).is_err());
    }
}
