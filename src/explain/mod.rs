//! Per-feature attribution of a model prediction
//!
//! The explainer is built once per loaded model. Construction walks every
//! tree to precompute node weights and expected values; explaining a record
//! afterwards only runs the TreeSHAP recursion.

mod treeshap;

use std::sync::Arc;

use serde::Serialize;

use crate::features::{PropertyRecord, FEATURE_COUNT, FEATURE_NAMES};
use crate::model::Model;

/// Baseline plus one signed contribution per feature, in record order
///
/// `baseline + contributions.sum()` reconstructs the prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionResult {
    pub baseline: f64,
    pub contributions: [f64; FEATURE_COUNT],
}

impl AttributionResult {
    pub fn total_impact(&self) -> f64 {
        self.contributions.iter().sum()
    }

    /// Value implied by the attribution (baseline plus all contributions)
    pub fn reconstructed(&self) -> f64 {
        self.baseline + self.total_impact()
    }

    /// Contributions paired with their feature names
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.contributions.iter().copied())
    }
}

struct TreeTables {
    weights: Vec<f64>,
}

/// Reusable attribution engine for one model
pub struct Explainer {
    model: Arc<Model>,
    tables: Vec<TreeTables>,
    baseline: f64,
}

impl Explainer {
    pub fn new(model: Arc<Model>) -> Self {
        let mut tables = Vec::with_capacity(model.trees().len());
        let mut baseline = model.base_score();

        for tree in model.trees() {
            let weights = treeshap::node_weights(tree);
            let means = treeshap::node_means(tree, &weights);
            baseline += means[0];
            tables.push(TreeTables { weights });
        }

        tracing::debug!(trees = tables.len(), baseline, "Built explainer");

        Self {
            model,
            tables,
            baseline,
        }
    }

    /// Average model output over the training distribution
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn explain(&self, record: &PropertyRecord) -> AttributionResult {
        let x = record.to_features();
        let mut contributions = [0.0; FEATURE_COUNT];

        for (tree, tables) in self.model.trees().iter().zip(&self.tables) {
            treeshap::tree_shap(tree, &tables.weights, &x, &mut contributions);
        }

        AttributionResult {
            baseline: self.baseline,
            contributions,
        }
    }
}
