//! Per-application override values and target-cluster selectors
//!
//! Deployment flags arrive as flat `app.prop1.prop2=value` pairs. This
//! module folds them into the nested trees the deployment service expects:
//! - [`build_overrides`] nests values by dotted path with scalar coercion
//! - [`build_target_labels`] groups `app.label=value` pairs, one level deep
//! - [`build_target_cluster_ids`] maps applications to explicit clusters


use crate::error::{OrchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Leaf value of an override tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Coerce a flag value, trying bool, then i32, then finite f64.
    /// Anything else is kept verbatim.
    pub fn coerce(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Ok(i) = raw.parse::<i32>() {
            return Self::Int(i);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::Float(f),
            _ => Self::Str(raw.to_string()),
        }
    }
}

/// A node in an override tree
///
/// The builder only produces `Leaf` and `Node`. `List` and `Null` appear in
/// values read back from the deployment service and are carried through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Leaf(Scalar),
    Node(BTreeMap<String, OverrideValue>),
    List(Vec<OverrideValue>),
    Null,
}

impl OverrideValue {
    /// Look up a dotted path below this node
    pub fn get_path(&self, path: &str) -> Option<&OverrideValue> {
        let mut current = self;
        for segment in path.split('.') {
            match current {
                OverrideValue::Node(children) => current = children.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

/// Override values for one application of a deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideValues {
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, OverrideValue>,
}

impl OverrideValues {
    pub fn new(app_name: impl Into<String>, target_namespace: Option<String>) -> Self {
        Self {
            app_name: app_name.into(),
            target_namespace,
            values: BTreeMap::new(),
        }
    }

    /// Place `value` at the dotted `path`, creating intermediate nodes.
    pub fn set(&mut self, path: &str, value: &str) {
        insert_path(&mut self.values, path, value);
    }

    /// Look up a dotted path in this application's values
    pub fn get(&self, path: &str) -> Option<&OverrideValue> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = self.values.get(head)?;
        match rest {
            Some(rest) => value.get_path(rest),
            None => Some(value),
        }
    }

    /// Deep-merge `other` into `self`; values from `other` win.
    pub fn merge(&mut self, other: OverrideValues) {
        if other.target_namespace.is_some() {
            self.target_namespace = other.target_namespace;
        }
        merge_trees(&mut self.values, other.values);
    }
}

fn insert_path(values: &mut BTreeMap<String, OverrideValue>, path: &str, value: &str) {
    match path.split_once('.') {
        None => {
            values.insert(path.to_string(), OverrideValue::Leaf(Scalar::coerce(value)));
        }
        Some((head, rest)) => {
            let entry = values
                .entry(head.to_string())
                .or_insert_with(|| OverrideValue::Node(BTreeMap::new()));
            // Anything but a node on the way down is replaced: last write wins.
            if !matches!(*entry, OverrideValue::Node(_)) {
                *entry = OverrideValue::Node(BTreeMap::new());
            }
            if let OverrideValue::Node(children) = entry {
                insert_path(children, rest, value);
            }
        }
    }
}

fn merge_trees(into: &mut BTreeMap<String, OverrideValue>, from: BTreeMap<String, OverrideValue>) {
    for (key, incoming) in from {
        match incoming {
            OverrideValue::Node(children) => match into.get_mut(&key) {
                Some(OverrideValue::Node(existing)) => merge_trees(existing, children),
                _ => {
                    into.insert(key, OverrideValue::Node(children));
                }
            },
            leaf => {
                into.insert(key, leaf);
            }
        }
    }
}

/// Split `app.rest` at the first dot, rejecting empty halves.
fn split_app_key<'a>(key: &'a str, kind: &'static str) -> Result<(&'a str, &'a str)> {
    match key.split_once('.') {
        Some((app, rest)) if !app.is_empty() && !rest.is_empty() => Ok((app, rest)),
        _ => Err(OrchError::InvalidFormat {
            kind,
            key: key.to_string(),
        }),
    }
}

/// Build per-application override trees.
///
/// `namespaces` seeds applications with a target namespace; every key in
/// `assignments` must be `<app>.<property path>`. A key with no dot is
/// `InvalidFormat`, and so is one whose application or property half is
/// empty (`.replicas`, `web.`). Output is sorted by application name.
pub fn build_overrides(
    namespaces: &BTreeMap<String, String>,
    assignments: &BTreeMap<String, String>,
) -> Result<Vec<OverrideValues>> {
    let mut by_app: BTreeMap<String, OverrideValues> = namespaces
        .iter()
        .map(|(app, ns)| (app.clone(), OverrideValues::new(app.clone(), Some(ns.clone()))))
        .collect();

    for (key, value) in assignments {
        let (app, path) = split_app_key(key, "property")?;
        by_app
            .entry(app.to_string())
            .or_insert_with(|| OverrideValues::new(app, None))
            .set(path, value);
    }

    Ok(by_app.into_values().collect())
}

/// Merge freshly built overrides into a deployment's existing ones.
///
/// Applications present only in `existing` are kept untouched.
pub fn merge_overrides(
    existing: Vec<OverrideValues>,
    updates: Vec<OverrideValues>,
) -> Vec<OverrideValues> {
    let mut by_app: BTreeMap<String, OverrideValues> = existing
        .into_iter()
        .map(|ov| (ov.app_name.clone(), ov))
        .collect();

    for update in updates {
        match by_app.get_mut(&update.app_name) {
            Some(current) => current.merge(update),
            None => {
                by_app.insert(update.app_name.clone(), update);
            }
        }
    }

    by_app.into_values().collect()
}

/// Target-cluster selector for one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetClusters {
    pub app_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
}

/// Group `app.label=value` pairs into per-application label sets.
///
/// Only the first dot splits; `app.a.b=v` yields label `a.b`.
pub fn build_target_labels(labels: &BTreeMap<String, String>) -> Result<Vec<TargetClusters>> {
    let mut by_app: BTreeMap<String, TargetClusters> = BTreeMap::new();

    for (key, value) in labels {
        let (app, label) = split_app_key(key, "label")?;
        by_app
            .entry(app.to_string())
            .or_insert_with(|| TargetClusters {
                app_name: app.to_string(),
                labels: BTreeMap::new(),
                cluster_id: None,
            })
            .labels
            .insert(label.to_string(), value.clone());
    }

    Ok(by_app.into_values().collect())
}

/// Map `app=cluster-id` pairs to explicit cluster targets
pub fn build_target_cluster_ids(cluster_ids: &BTreeMap<String, String>) -> Vec<TargetClusters> {
    cluster_ids
        .iter()
        .map(|(app, id)| TargetClusters {
            app_name: app.clone(),
            labels: BTreeMap::new(),
            cluster_id: Some(id.clone()),
        })
        .collect()
}
