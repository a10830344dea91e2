//! Stroke-risk scoring pipeline: feature extraction, the pre-fitted
//! classifier artifact, and explanation building.
//!
//! The pipeline is pure — it never touches the store or the network. The
//! caller fetches a patient and their most recent visit, and gets back a
//! probability, a thresholded label, and a structured explanation.

pub mod artifact;
pub mod error;
pub mod explain;
pub mod features;
pub mod scorer;

pub use artifact::ClassifierArtifact;
pub use error::{Error, Result};
pub use features::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
pub use scorer::{RISK_THRESHOLD, RiskAssessment, RiskLabel, RiskScorer};
