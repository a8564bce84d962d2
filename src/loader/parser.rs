//! YAML parser for connector manifests
//!
//! Parses and validates connector YAML files.
//! Supports both built-in connectors (by name) and custom YAML files (by path).

use crate::connectors;
use crate::error::{Error, Result};
use crate::loader::types::{ConnectorManifest, PaginatorManifest, StreamManifest};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Load a connector manifest from a name or file path
///
/// A bare name without path separators or a YAML extension is looked up
/// among the built-in connectors first.
///
/// # Examples
///
/// ```ignore
/// // Load built-in connector by name
/// let manifest = load_connector("dixa")?;
///
/// // Load custom connector from file
/// let manifest = load_connector("./my-connector.yaml")?;
/// ```
pub fn load_connector(path: impl AsRef<Path>) -> Result<ConnectorManifest> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.ends_with(".yaml")
        && !path_str.ends_with(".yml")
    {
        if let Some(yaml) = connectors::get_builtin(&path_str) {
            return load_connector_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            let builtin_list = connectors::list_builtin().join(", ");
            Error::config(format!(
                "Connector '{}' not found. Built-in connectors: {}. Or provide a path to a YAML file.",
                path.display(),
                builtin_list
            ))
        } else {
            Error::config(format!(
                "Failed to read connector file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_connector_from_str(&content)
}

/// Load a connector manifest from a YAML string
pub fn load_connector_from_str(yaml: &str) -> Result<ConnectorManifest> {
    let manifest: ConnectorManifest = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse connector YAML: {e}")))?;

    validate_connector(&manifest)?;
    Ok(manifest)
}

/// Validate a connector manifest
fn validate_connector(manifest: &ConnectorManifest) -> Result<()> {
    if manifest.name.is_empty() {
        return Err(Error::config("Connector name cannot be empty"));
    }

    if manifest.base_url.is_empty() {
        return Err(Error::config("Connector base_url cannot be empty"));
    }

    if manifest.streams.is_empty() {
        return Err(Error::config("Connector must have at least one stream"));
    }

    let stream_names: HashSet<_> = manifest.streams.iter().map(|s| &s.name).collect();
    if stream_names.len() != manifest.streams.len() {
        return Err(Error::config("Duplicate stream names found"));
    }

    if manifest.http.timeout_secs == 0 {
        return Err(Error::config("http.timeout_secs must be positive"));
    }

    for stream in &manifest.streams {
        validate_stream(stream)?;
    }

    Ok(())
}

/// Validate a stream manifest
fn validate_stream(stream: &StreamManifest) -> Result<()> {
    if stream.name.is_empty() {
        return Err(Error::config("Stream name cannot be empty"));
    }

    if stream.request.path.is_empty() {
        return Err(Error::config(format!(
            "Stream '{}' path cannot be empty",
            stream.name
        )));
    }

    if stream.request.start_param.is_empty() || stream.request.end_param.is_empty() {
        return Err(Error::config(format!(
            "Stream '{}' must name both window parameters",
            stream.name
        )));
    }

    if stream.request.start_param == stream.request.end_param {
        return Err(Error::config(format!(
            "Stream '{}' uses '{}' for both window bounds",
            stream.name, stream.request.start_param
        )));
    }

    if let PaginatorManifest::Offset { limit: 0, .. } = stream.paginator {
        return Err(Error::config(format!(
            "Stream '{}' offset paginator needs a positive limit",
            stream.name
        )));
    }

    if stream.primary_key.iter().any(String::is_empty) {
        return Err(Error::config(format!(
            "Stream '{}' has an empty primary key field",
            stream.name
        )));
    }

    Ok(())
}
