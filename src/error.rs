//! Errors carried inside watch snapshots
//!
//! A `LoadError` is data, not control flow: it travels with a
//! `WatchResult` so every consumer of a snapshot sees the same failure.

/// Upstream load failure for one resource class
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("{kind} watch failed: {message}")]
    Watch { kind: String, message: String },

    #[error("snapshot source failed: {message}")]
    Source { message: String },
}

impl LoadError {
    pub fn watch(kind: impl Into<String>, message: impl Into<String>) -> Self {
        LoadError::Watch {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn source(message: impl Into<String>) -> Self {
        LoadError::Source {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = LoadError::watch("ManagedCluster", "forbidden");
        assert_eq!(err.to_string(), "ManagedCluster watch failed: forbidden");

        let err = LoadError::source("bundle.yaml not found");
        assert_eq!(err.to_string(), "snapshot source failed: bundle.yaml not found");
    }
}
