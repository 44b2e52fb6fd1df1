//! Error types for kubedemo

use std::path::PathBuf;

use thiserror::Error;

/// Failures that originate in this program rather than in the cluster client
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("{kind} is missing required field `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("Failed to get latest version of {kind}: {source}")]
    GetLatest {
        kind: &'static str,
        #[source]
        source: kube::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type DemoResult<T> = std::result::Result<T, DemoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = DemoError::MissingField {
            kind: "Service",
            field: "spec.ports",
        };
        assert_eq!(err.to_string(), "Service is missing required field `spec.ports`");
    }

    #[test]
    fn test_manifest_read_keeps_source() {
        use std::error::Error as _;

        let err = DemoError::ManifestRead {
            path: PathBuf::from("demo-deploy.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("demo-deploy.json"));
        assert!(err.source().is_some());
    }
}
