use serde::{Deserialize, Serialize};

/// Configuration shared by the diff and patch engines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Maximum nesting depth. At it, diffing falls back to wholesale
    /// replacement; a diff nested past it fails with
    /// `InvalidDiff::DepthExceeded`.
    pub max_depth: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

impl DiffConfig {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        assert_eq!(DiffConfig::default().max_depth, 128);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: DiffConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DiffConfig::default());
        let config: DiffConfig = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(config, DiffConfig::with_max_depth(8));
    }
}
