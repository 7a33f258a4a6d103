use delve_common::EntityKind;

/// Errors from loading or validating a [`DungeonConfig`](crate::DungeonConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0:?}")]
    UnsupportedFormat(String),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors that abort a generation pass before anything is torn down.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("no {0} prefab supplied")]
    MissingPrefab(EntityKind),
}
