use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SnapshotError;

/// Stable name of a single comparable image across test runs.
///
/// Snapshot ids become file names for baselines and diagnostics, so they must
/// be non-empty and free of path separators, `..` and control characters.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Validate `name` and wrap it.
    pub fn new(name: impl Into<String>) -> Result<Self, SnapshotError> {
        let name = name.into();
        if let Some(reason) = rejection_reason(&name) {
            return Err(SnapshotError::InvalidName { name, reason });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the baseline image, e.g. `MatchesViewScreenshot.png`.
    pub fn baseline_file_name(&self) -> String {
        format!("{}.png", self.0)
    }
}

fn rejection_reason(name: &str) -> Option<&'static str> {
    if name.trim().is_empty() {
        Some("must not be empty")
    } else if name.contains('/') || name.contains('\\') {
        Some("must not contain path separators")
    } else if name.contains("..") {
        Some("must not contain '..'")
    } else if name.chars().any(char::is_control) {
        Some("must not contain control characters")
    } else {
        None
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotId({})", self.0)
    }
}

impl FromStr for SnapshotId {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SnapshotId {
    type Error = SnapshotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SnapshotId> for String {
    fn from(id: SnapshotId) -> Self {
        id.0
    }
}

impl AsRef<str> for SnapshotId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
