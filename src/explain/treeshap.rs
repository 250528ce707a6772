//! Path-dependent TreeSHAP (Lundberg et al., "Consistent Individualized
//! Feature Attribution for Tree Ensembles", algorithm 2).
//!
//! Node weights are taken from the children's covers so that the fractions
//! flowing down each split always sum to one.

use crate::features::FEATURE_COUNT;
use crate::model::{Node, Tree};

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

fn extend_path(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let unique_depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if unique_depth == 0 { 1.0 } else { 0.0 },
    });

    let depth = unique_depth as f64;
    for i in (0..unique_depth).rev() {
        let weight = path[i].pweight;
        path[i + 1].pweight += one_fraction * weight * (i as f64 + 1.0) / (depth + 1.0);
        path[i].pweight = zero_fraction * weight * (depth - i as f64) / (depth + 1.0);
    }
}

fn unwind_path(path: &mut Vec<PathElement>, path_index: usize) {
    let unique_depth = path.len() - 1;
    let depth = unique_depth as f64;
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[unique_depth].pweight;

    for i in (0..unique_depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * (depth + 1.0) / ((i as f64 + 1.0) * one_fraction);
            next_one_portion = tmp - path[i].pweight * zero_fraction * (depth - i as f64) / (depth + 1.0);
        } else {
            path[i].pweight = path[i].pweight * (depth + 1.0) / (zero_fraction * (depth - i as f64));
        }
    }

    // Only the split descriptors shift down; pweights stay where they were recomputed.
    for i in path_index..unique_depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

fn unwound_path_sum(path: &[PathElement], path_index: usize) -> f64 {
    let unique_depth = path.len() - 1;
    let depth = unique_depth as f64;
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[unique_depth].pweight;
    let mut total = 0.0;

    for i in (0..unique_depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * (depth + 1.0) / ((i as f64 + 1.0) * one_fraction);
            total += tmp;
            next_one_portion = path[i].pweight - tmp * zero_fraction * ((depth - i as f64) / (depth + 1.0));
        } else if zero_fraction != 0.0 {
            total += (path[i].pweight / zero_fraction) / ((depth - i as f64) / (depth + 1.0));
        }
    }

    total
}

/// Cover-weighted mean leaf value below every node, indexed like `tree.nodes()`
pub(crate) fn node_means(tree: &Tree, weights: &[f64]) -> Vec<f64> {
    let nodes = tree.nodes();
    let mut means = vec![0.0; nodes.len()];

    // Children always have higher indices than their parent, so a reverse
    // sweep sees both children before the split that owns them.
    for idx in (0..nodes.len()).rev() {
        match &nodes[idx] {
            Node::Leaf { value, .. } => means[idx] = *value,
            Node::Split { left, right, .. } => {
                let total = weights[idx];
                means[idx] = if total > 0.0 {
                    (weights[*left] * means[*left] + weights[*right] * means[*right]) / total
                } else {
                    0.5 * (means[*left] + means[*right])
                };
            }
        }
    }

    means
}

/// Add the attributions of one tree for input `x` into `phi`
///
/// `weights` must come from [`node_weights`] for the same tree.
pub(crate) fn tree_shap(
    tree: &Tree,
    weights: &[f64],
    x: &[f64; FEATURE_COUNT],
    phi: &mut [f64; FEATURE_COUNT],
) {
    recurse(tree, weights, 0, x, phi, &[], 1.0, 1.0, None);
}

/// Cover used as each node's weight
///
/// For splits this is the sum of the children's covers rather than the stored
/// hessian sum, which XGBoost accumulates in f32.
pub(crate) fn node_weights(tree: &Tree) -> Vec<f64> {
    let nodes = tree.nodes();
    let mut weights = vec![0.0; nodes.len()];
    for idx in (0..nodes.len()).rev() {
        weights[idx] = match &nodes[idx] {
            Node::Leaf { cover, .. } => *cover,
            Node::Split { left, right, .. } => weights[*left] + weights[*right],
        };
    }
    weights
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &Tree,
    weights: &[f64],
    node_idx: usize,
    x: &[f64; FEATURE_COUNT],
    phi: &mut [f64; FEATURE_COUNT],
    parent_path: &[PathElement],
    parent_zero_fraction: f64,
    parent_one_fraction: f64,
    parent_feature: Option<usize>,
) {
    let mut path = Vec::with_capacity(parent_path.len() + 1);
    path.extend_from_slice(parent_path);
    extend_path(&mut path, parent_zero_fraction, parent_one_fraction, parent_feature);

    match tree.node(node_idx) {
        Node::Leaf { value, .. } => {
            for i in 1..path.len() {
                let weight = unwound_path_sum(&path, i);
                let element = path[i];
                if let Some(feature) = element.feature {
                    phi[feature] += weight * (element.one_fraction - element.zero_fraction) * value;
                }
            }
        }
        Node::Split {
            feature,
            threshold,
            left,
            right,
            default_left,
            ..
        } => {
            let hot = Tree::child_for(x[*feature], *threshold, *left, *right, *default_left);
            let cold = if hot == *left { *right } else { *left };

            let weight = weights[node_idx];
            if weight <= 0.0 {
                return;
            }
            let hot_zero_fraction = weights[hot] / weight;
            let cold_zero_fraction = weights[cold] / weight;

            let mut incoming_zero_fraction = 1.0;
            let mut incoming_one_fraction = 1.0;

            // A feature already on the path is undone before it is split on again.
            if let Some(path_index) = path.iter().position(|e| e.feature == Some(*feature)) {
                incoming_zero_fraction = path[path_index].zero_fraction;
                incoming_one_fraction = path[path_index].one_fraction;
                unwind_path(&mut path, path_index);
            }

            recurse(
                tree,
                weights,
                hot,
                x,
                phi,
                &path,
                hot_zero_fraction * incoming_zero_fraction,
                incoming_one_fraction,
                Some(*feature),
            );
            recurse(
                tree,
                weights,
                cold,
                x,
                phi,
                &path,
                cold_zero_fraction * incoming_zero_fraction,
                0.0,
                Some(*feature),
            );
        }
    }
}
