//! Manifest loading
//!
//! Manifests are JSON by default; files ending in `.yaml` or `.yml` are read as YAML.

use std::path::Path;

use kube::Resource;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{DemoError, DemoResult};

/// Read and parse a manifest file into a typed resource
pub async fn load_manifest<K>(path: &Path) -> DemoResult<K>
where
    K: Resource + DeserializeOwned,
{
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DemoError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

    let resource: K = parse_manifest(path, &contents)?;
    debug!(
        path = %path.display(),
        name = ?resource.meta().name,
        "Loaded manifest"
    );
    Ok(resource)
}

/// Parse manifest text, picking the format from the file extension
pub fn parse_manifest<K>(path: &Path, contents: &str) -> DemoResult<K>
where
    K: Resource + DeserializeOwned,
{
    let parse_error = |message: String| DemoError::ManifestParse {
        path: path.to_path_buf(),
        message,
    };

    let resource: K = if is_yaml(path) {
        serde_yaml::from_str(contents).map_err(|e| parse_error(e.to_string()))?
    } else {
        serde_json::from_str(contents).map_err(|e| parse_error(e.to_string()))?
    };

    manifest_name(&resource)?;
    Ok(resource)
}

/// `metadata.name` of a resource, which every manifest here must carry
pub fn manifest_name<K: Resource>(resource: &K) -> DemoResult<String> {
    resource
        .meta()
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .ok_or(DemoError::MissingField {
            kind: "manifest",
            field: "metadata.name",
        })
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}
