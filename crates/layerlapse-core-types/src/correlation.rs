//! Export-run correlation
//!
//! Every export pass gets a `RunId` so that all log events emitted while
//! hiding layers and writing frames for one document can be grouped.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a single export pass
///
/// New ids are UUIDv7, so they sort by creation time. Serialized as a bare
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an id issued elsewhere, e.g. by a calling tool
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique_uuids() {
        let a = RunId::new();
        let b = RunId::new();

        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = RunId::from_string("run-1".to_string());

        assert_eq!(serde_json::to_string(&id).unwrap(), "\"run-1\"");
        assert_eq!(id.to_string(), "run-1");
    }
}
