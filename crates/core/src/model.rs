use serde::{Deserialize, Serialize};

/// One block device as reported by the inventory, possibly enriched with a
/// mount point discovered in the live mount table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BlockDevice {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub fstype: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub mount_point: Option<String>,
    pub size_bytes: u64,
    /// `None` when the inventory did not report a filesystem size.
    #[serde(default)]
    pub fs_size_bytes: Option<u64>,
    /// `None` when the inventory did not report available space.
    #[serde(default)]
    pub fs_avail_bytes: Option<u64>,
}

impl BlockDevice {
    pub fn is_mounted(&self) -> bool {
        self.mount_point.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MountEntry {
    pub mount_point: String,
    pub fstype: String,
    pub source: String,
    pub options: String,
}

/// Selection criteria for a scan. Empty fields impose no constraint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScanFilter {
    /// Exact filesystem type, compared case-insensitively.
    #[serde(default)]
    pub fstype: String,
    /// Human-readable minimum device size such as `1G` or `500M`.
    #[serde(default)]
    pub min_size: String,
    /// Case-sensitive substring of the resolved mount point.
    #[serde(default)]
    pub mount_point: String,
}

/// Normalizes an optional string from the inventory: missing and empty are
/// both absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
