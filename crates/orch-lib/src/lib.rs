//! Client library for the Edge Orchestrator platform
//!
//! This crate provides the core functionality for:
//! - Classifying service responses into proceed / fail decisions
//! - Building per-application override values and cluster selectors
//! - Validating chart values and parameter templates
//! - Abstract interfaces and records for each backend service
//! - Logging setup

pub mod chart_values;
pub mod error;
pub mod models;
pub mod observability;
pub mod overrides;
pub mod param_template;
pub mod response;
pub mod services;

pub use error::{OrchError, Result};
pub use overrides::{
    build_overrides, build_target_cluster_ids, build_target_labels, merge_overrides,
    OverrideValue, OverrideValues, Scalar, TargetClusters,
};
pub use response::{classify, refine, ApiResponse, StatusOutcome};
