//! Built-in connector manifests embedded in the binary
//!
//! Lets users pass `--connector dixa` instead of a file path.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in connector YAML manifests
pub static BUILTIN_CONNECTORS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // Support
        m.insert("dixa", include_str!("../connectors/dixa.yaml"));

        m
    });

/// Get a built-in connector by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_CONNECTORS.get(name).copied()
}

/// Check if a connector name is a built-in connector
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_CONNECTORS.contains_key(name)
}

/// List all built-in connector names, sorted
pub fn list_builtin() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BUILTIN_CONNECTORS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Connector metadata for display
#[derive(Debug, Clone)]
pub struct ConnectorInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub streams: &'static [&'static str],
}

/// Get detailed info about all built-in connectors
pub fn list_builtin_info() -> Vec<ConnectorInfo> {
    vec![ConnectorInfo {
        name: "dixa",
        description: "Dixa conversation and message exports",
        category: "Support",
        streams: &["conversation_export", "message_export"],
    }]
}
