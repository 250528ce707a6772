//! Gradient-boosted regression model
//!
//! The model is a sum of regression trees on top of a constant base score.
//! It is read from the XGBoost JSON format (see [`xgboost`]) once at startup
//! and is immutable afterwards.

pub mod xgboost;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::features::{PropertyRecord, FEATURE_COUNT};

/// Model load failures
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read model file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model file is not valid XGBoost JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported model: {0}")]
    Unsupported(String),

    #[error("model feature schema does not match the property record: {0}")]
    FeatureMismatch(String),

    #[error("tree {tree} is malformed: {reason}")]
    InvalidTree { tree: usize, reason: String },
}

/// A single tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
        cover: f64,
    },
    Leaf {
        value: f64,
        cover: f64,
    },
}

impl Node {
    pub fn cover(&self) -> f64 {
        match self {
            Node::Split { cover, .. } | Node::Leaf { cover, .. } => *cover,
        }
    }
}

/// Regression tree stored as a flat node array, root at index 0
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Build a tree, checking that every child index points forward.
    ///
    /// Forward-only children rule out cycles, so traversal always ends at a leaf.
    pub fn new(nodes: Vec<Node>) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (idx, node) in nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= FEATURE_COUNT {
                    return Err(format!(
                        "node {} splits on feature {} but only {} features exist",
                        idx, feature, FEATURE_COUNT
                    ));
                }
                for child in [*left, *right] {
                    if child <= idx || child >= nodes.len() {
                        return Err(format!("node {} has invalid child index {}", idx, child));
                    }
                }
            }
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// Child taken by `x` at a split node: `x < threshold` goes left,
    /// missing values follow the default direction.
    pub fn child_for(
        feature_value: f64,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    ) -> usize {
        if feature_value.is_nan() {
            return if default_left { left } else { right };
        }
        if (feature_value as f32) < threshold {
            left
        } else {
            right
        }
    }

    /// Leaf value reached by `x`
    pub fn predict(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                    ..
                } => {
                    idx = Self::child_for(x[*feature], *threshold, *left, *right, *default_left);
                }
            }
        }
    }
}

/// Summary of a loaded model, safe to expose over the API
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub objective: String,
    pub num_trees: usize,
    pub base_score: f64,
    pub feature_names: Vec<String>,
}

/// Loaded tree ensemble
#[derive(Debug, Clone)]
pub struct Model {
    base_score: f64,
    trees: Vec<Tree>,
    objective: String,
}

impl Model {
    pub fn new(base_score: f64, trees: Vec<Tree>, objective: impl Into<String>) -> Self {
        Self {
            base_score,
            trees,
            objective: objective.into(),
        }
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Single forward pass over one record
    pub fn predict(&self, record: &PropertyRecord) -> f64 {
        let x = record.to_features();
        self.base_score + self.trees.iter().map(|tree| tree.predict(&x)).sum::<f64>()
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            objective: self.objective.clone(),
            num_trees: self.trees.len(),
            base_score: self.base_score,
            feature_names: crate::features::FEATURE_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

/// Load an XGBoost JSON model from disk
pub fn load_model(path: &Path) -> Result<Model, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let model = xgboost::parse_model(&raw)?;

    info!(
        path = %path.display(),
        trees = model.trees.len(),
        objective = %model.objective,
        "Loaded price model"
    );

    Ok(model)
}
