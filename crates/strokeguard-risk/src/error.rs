//! Error types for `strokeguard-risk`.
//!
//! All variants are artifact-load failures: scoring itself is infallible
//! once an artifact has passed validation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot read classifier artifact: {0}")]
  Io(#[from] std::io::Error),

  #[error("cannot parse classifier artifact: {0}")]
  Json(#[from] serde_json::Error),

  #[error("artifact expects {found} features, the serving schema has {expected}")]
  FeatureCountMismatch { expected: usize, found: usize },

  #[error("artifact feature {index} is {found:?}, the serving schema has {expected:?}")]
  FeatureNameMismatch {
    index:    usize,
    expected: String,
    found:    String,
  },

  #[error("artifact carries {found} importance weights, expected {expected}")]
  ImportanceCountMismatch { expected: usize, found: usize },

  #[error("artifact contains no trees")]
  EmptyEnsemble,

  #[error("tree {tree} node {node} is malformed: {detail}")]
  MalformedNode {
    tree:   usize,
    node:   usize,
    detail: String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
