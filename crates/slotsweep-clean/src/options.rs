use serde::{Deserialize, Serialize};

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Kind passed to asset discovery.
    pub asset_kind: String,
    /// Commit and refresh the store once after a run that saved anything.
    pub commit_on_change: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        CleanOptions {
            asset_kind: "Prefab".to_string(),
            commit_on_change: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let opts: CleanOptions = serde_json::from_str(r#"{"asset_kind":"Model"}"#).unwrap();
        assert_eq!(opts.asset_kind, "Model");
        assert!(opts.commit_on_change);
    }
}
