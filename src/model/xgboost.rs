//! XGBoost JSON model reader
//!
//! Only the parts of the schema needed for scalar regression with numeric
//! splits are read; everything else in the file is ignored.

use serde::Deserialize;

use super::{LoadError, Model, Node, Tree};
use crate::features::{FEATURE_COUNT, FEATURE_NAMES};

/// Objectives whose output is the raw margin (identity link)
const IDENTITY_OBJECTIVES: [&str; 4] = [
    "reg:squarederror",
    "reg:absoluteerror",
    "reg:pseudohubererror",
    "reg:quantileerror",
];

#[derive(Debug, Deserialize)]
struct ModelFile {
    learner: Learner,
}

#[derive(Debug, Deserialize)]
struct Learner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: GradientBooster,
    learner_model_param: LearnerModelParam,
    objective: Objective,
}

#[derive(Debug, Deserialize)]
struct GradientBooster {
    name: String,
    #[serde(default)]
    model: Option<GbTreeModel>,
}

#[derive(Debug, Deserialize)]
struct GbTreeModel {
    trees: Vec<TreeJson>,
}

#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    #[serde(default)]
    num_feature: Option<String>,
    #[serde(default)]
    num_class: Option<String>,
    #[serde(default)]
    num_target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Objective {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TreeJson {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f64>,
    default_left: Vec<Flag>,
    sum_hessian: Vec<f64>,
    #[serde(default)]
    split_type: Vec<i64>,
}

/// `default_left` is written as 0/1 by current XGBoost and as booleans by older releases
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

/// Parse `base_score`, which is either `"5E-1"` or, since XGBoost 2.1, `"[5E-1]"`
pub fn parse_base_score(raw: &str) -> Result<f64, LoadError> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let mut values = trimmed.split(',').map(str::trim).filter(|v| !v.is_empty());

    let first = values
        .next()
        .ok_or_else(|| LoadError::Unsupported(format!("empty base_score '{}'", raw)))?;
    if values.next().is_some() {
        return Err(LoadError::Unsupported(format!(
            "multi-target base_score '{}'",
            raw
        )));
    }

    first
        .parse::<f64>()
        .map_err(|_| LoadError::Unsupported(format!("invalid base_score '{}'", raw)))
}

fn parse_count(field: &str, raw: &Option<String>) -> Result<usize, LoadError> {
    match raw {
        None => Ok(0),
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map_err(|_| LoadError::Unsupported(format!("invalid {} '{}'", field, value))),
    }
}

/// Parse a model from XGBoost JSON text
pub fn parse_model(raw: &str) -> Result<Model, LoadError> {
    let file: ModelFile = serde_json::from_str(raw)?;
    let learner = file.learner;

    let objective = learner.objective.name;
    if !IDENTITY_OBJECTIVES.contains(&objective.as_str()) {
        return Err(LoadError::Unsupported(format!(
            "objective '{}' (expected one of {})",
            objective,
            IDENTITY_OBJECTIVES.join(", ")
        )));
    }

    if learner.gradient_booster.name != "gbtree" {
        return Err(LoadError::Unsupported(format!(
            "booster '{}' (only gbtree is supported)",
            learner.gradient_booster.name
        )));
    }

    let params = &learner.learner_model_param;
    if parse_count("num_class", &params.num_class)? > 1 {
        return Err(LoadError::Unsupported("multi-class model".to_string()));
    }
    if parse_count("num_target", &params.num_target)? > 1 {
        return Err(LoadError::Unsupported("multi-target model".to_string()));
    }

    let num_feature = parse_count("num_feature", &params.num_feature)?;
    if num_feature != 0 && num_feature != FEATURE_COUNT {
        return Err(LoadError::FeatureMismatch(format!(
            "model expects {} features, record has {}",
            num_feature, FEATURE_COUNT
        )));
    }

    if !learner.feature_names.is_empty() && learner.feature_names != FEATURE_NAMES {
        return Err(LoadError::FeatureMismatch(format!(
            "model features [{}] differ from [{}]",
            learner.feature_names.join(", "),
            FEATURE_NAMES.join(", ")
        )));
    }

    let base_score = parse_base_score(&params.base_score)?;

    let tree_json = learner
        .gradient_booster
        .model
        .map(|m| m.trees)
        .unwrap_or_default();

    let trees = tree_json
        .into_iter()
        .enumerate()
        .map(|(idx, tree)| {
            convert_tree(tree).map_err(|reason| LoadError::InvalidTree { tree: idx, reason })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Model::new(base_score, trees, objective))
}

fn convert_tree(tree: TreeJson) -> Result<Tree, String> {
    let n = tree.left_children.len();
    let lengths = [
        tree.right_children.len(),
        tree.split_indices.len(),
        tree.split_conditions.len(),
        tree.default_left.len(),
        tree.sum_hessian.len(),
    ];
    if lengths.iter().any(|&len| len != n) {
        return Err(format!(
            "node arrays have inconsistent lengths ({} left children vs {:?})",
            n, lengths
        ));
    }
    if tree.split_type.iter().any(|&t| t != 0) {
        return Err("categorical splits are not supported".to_string());
    }

    let mut nodes = Vec::with_capacity(n);
    for i in 0..n {
        let left = tree.left_children[i];
        let right = tree.right_children[i];
        let cover = tree.sum_hessian[i];

        let node = if left == -1 {
            Node::Leaf {
                value: tree.split_conditions[i],
                cover,
            }
        } else {
            if left < 0 || right < 0 {
                return Err(format!("node {} has negative child index", i));
            }
            let feature = usize::try_from(tree.split_indices[i])
                .map_err(|_| format!("node {} has negative split index", i))?;
            Node::Split {
                feature,
                threshold: tree.split_conditions[i] as f32,
                left: left as usize,
                right: right as usize,
                default_left: tree.default_left[i].is_set(),
                cover,
            }
        };
        nodes.push(node);
    }

    Tree::new(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model_json(objective: &str, feature_names: serde_json::Value) -> String {
        json!({
            "learner": {
                "feature_names": feature_names,
                "gradient_booster": {
                    "name": "gbtree",
                    "model": {
                        "trees": [{
                            "left_children": [1, -1, -1],
                            "right_children": [2, -1, -1],
                            "split_indices": [2, 0, 0],
                            "split_conditions": [80.0, 20000.0, 60000.0],
                            "default_left": [1, 0, 0],
                            "sum_hessian": [100.0, 40.0, 60.0],
                            "split_type": [0, 0, 0]
                        }]
                    }
                },
                "learner_model_param": {
                    "base_score": "[3E5]",
                    "num_class": "0",
                    "num_feature": "8",
                    "num_target": "1"
                },
                "objective": { "name": objective }
            },
            "version": [2, 1, 0]
        })
        .to_string()
    }

    #[test]
    fn test_parse_base_score_forms() {
        assert_eq!(parse_base_score("5E-1").unwrap(), 0.5);
        assert_eq!(parse_base_score("[3E5]").unwrap(), 300000.0);
        assert_eq!(parse_base_score(" [1.25] ").unwrap(), 1.25);
        assert!(parse_base_score("[1,2]").is_err());
        assert!(parse_base_score("[]").is_err());
        assert!(parse_base_score("abc").is_err());
    }

    #[test]
    fn test_parse_model() {
        let model = parse_model(&model_json("reg:squarederror", json!(FEATURE_NAMES))).unwrap();

        assert_eq!(model.base_score(), 300000.0);
        assert_eq!(model.trees().len(), 1);
        assert_eq!(
            model.trees()[0].node(0),
            &Node::Split {
                feature: 2,
                threshold: 80.0,
                left: 1,
                right: 2,
                default_left: true,
                cover: 100.0,
            }
        );
        assert_eq!(
            model.trees()[0].node(2),
            &Node::Leaf {
                value: 60000.0,
                cover: 60.0
            }
        );
    }

    #[test]
    fn test_parse_model_without_feature_names() {
        assert!(parse_model(&model_json("reg:squarederror", json!([]))).is_ok());
    }

    #[test]
    fn test_rejects_reordered_features() {
        let mut names = FEATURE_NAMES.to_vec();
        names.swap(3, 4);
        let err = parse_model(&model_json("reg:squarederror", json!(names))).unwrap_err();
        assert!(matches!(err, LoadError::FeatureMismatch(_)));
    }

    #[test]
    fn test_rejects_non_identity_objective() {
        let err = parse_model(&model_json("reg:gamma", json!(FEATURE_NAMES))).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(_)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(parse_model("not json"), Err(LoadError::Parse(_))));
        assert!(matches!(parse_model("{}"), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_default_left_accepts_booleans() {
        let raw = model_json("reg:squarederror", json!(FEATURE_NAMES))
            .replace("\"default_left\":[1,0,0]", "\"default_left\":[true,false,false]");
        assert!(raw.contains("true,false,false"));
        assert!(parse_model(&raw).is_ok());
    }
}
