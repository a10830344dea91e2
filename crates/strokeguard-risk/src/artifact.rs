//! The pre-fitted classifier artifact.
//!
//! A fitted tree ensemble exported to JSON: the ordered feature-name list it
//! was trained on, per-feature global importance weights, and the trees
//! themselves. The artifact is loaded once at process startup and validated
//! against the serving schema before any request is served — a width or
//! order mismatch is fatal at load, never a per-request surprise.

use std::path::Path;

use serde::Deserialize;

use crate::{
  Error, Result,
  features::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector},
};

// ─── Tree nodes ──────────────────────────────────────────────────────────────

/// One node of a fitted decision tree. Node 0 is the root; `left`/`right`
/// are indices into the tree's node array.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
  Split {
    feature:   usize,
    threshold: f64,
    left:      usize,
    right:     usize,
  },
  Leaf {
    /// Positive-class probability at this leaf.
    probability: f64,
  },
}

/// A single fitted decision tree.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
  pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
  /// Walk from the root to a leaf. Indices were bounds-checked at load.
  fn score(&self, vector: &FeatureVector) -> f64 {
    let mut index = 0;
    loop {
      match &self.nodes[index] {
        TreeNode::Leaf { probability } => return *probability,
        TreeNode::Split { feature, threshold, left, right } => {
          index = if vector.value(*feature) <= *threshold {
            *left
          } else {
            *right
          };
        }
      }
    }
  }
}

// ─── Artifact ────────────────────────────────────────────────────────────────

/// A fitted, immutable classifier. Constructed once at startup and shared
/// read-only across requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierArtifact {
  /// Feature order the ensemble was fitted on. Must equal
  /// [`FEATURE_NAMES`] exactly.
  pub feature_names: Vec<String>,
  /// Global per-feature importance weights, same order as `feature_names`.
  pub importances:   Vec<f64>,
  pub trees:         Vec<DecisionTree>,
}

impl ClassifierArtifact {
  /// Read and validate an artifact from a JSON file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let raw = std::fs::read_to_string(path)?;
    Self::from_json_str(&raw)
  }

  /// Parse and validate an artifact from a JSON string.
  pub fn from_json_str(raw: &str) -> Result<Self> {
    let artifact: Self = serde_json::from_str(raw)?;
    artifact.validate()?;
    Ok(artifact)
  }

  /// Fail fast on any disagreement with the serving schema or any
  /// structurally broken tree.
  fn validate(&self) -> Result<()> {
    if self.feature_names.len() != FEATURE_COUNT {
      return Err(Error::FeatureCountMismatch {
        expected: FEATURE_COUNT,
        found:    self.feature_names.len(),
      });
    }
    for (index, (found, expected)) in
      self.feature_names.iter().zip(FEATURE_NAMES).enumerate()
    {
      if found.as_str() != expected {
        return Err(Error::FeatureNameMismatch {
          index,
          expected: expected.to_owned(),
          found: found.clone(),
        });
      }
    }
    if self.importances.len() != FEATURE_COUNT {
      return Err(Error::ImportanceCountMismatch {
        expected: FEATURE_COUNT,
        found:    self.importances.len(),
      });
    }
    if self.trees.is_empty() {
      return Err(Error::EmptyEnsemble);
    }

    for (t, tree) in self.trees.iter().enumerate() {
      if tree.nodes.is_empty() {
        return Err(Error::MalformedNode {
          tree:   t,
          node:   0,
          detail: "tree has no nodes".into(),
        });
      }
      for (n, node) in tree.nodes.iter().enumerate() {
        match node {
          TreeNode::Leaf { probability } => {
            if !(0.0..=1.0).contains(probability) {
              return Err(Error::MalformedNode {
                tree:   t,
                node:   n,
                detail: format!("leaf probability {probability} outside [0, 1]"),
              });
            }
          }
          TreeNode::Split { feature, left, right, .. } => {
            if *feature >= FEATURE_COUNT {
              return Err(Error::MalformedNode {
                tree:   t,
                node:   n,
                detail: format!("feature index {feature} out of range"),
              });
            }
            // Children must point strictly forward so every walk
            // terminates.
            if *left >= tree.nodes.len()
              || *right >= tree.nodes.len()
              || *left <= n
              || *right <= n
            {
              return Err(Error::MalformedNode {
                tree:   t,
                node:   n,
                detail: format!("child indices {left}/{right} out of order"),
              });
            }
          }
        }
      }
    }

    Ok(())
  }

  /// Positive-class probability for `vector`: the mean of the per-tree leaf
  /// probabilities. Deterministic, always within [0, 1].
  pub fn predict_proba(&self, vector: &FeatureVector) -> f64 {
    let total: f64 = self.trees.iter().map(|t| t.score(vector)).sum();
    total / self.trees.len() as f64
  }

  /// Global importance weight for a schema index.
  pub fn importance(&self, index: usize) -> f64 { self.importances[index] }
}
