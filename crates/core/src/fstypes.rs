//! Pre-flight validation of scan filters against the kernel's filesystem
//! registry.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::FilterError;
use crate::model::ScanFilter;
use crate::size::parse_min_size;

pub const PROC_FILESYSTEMS: &str = "/proc/filesystems";

/// Filesystem types listed in a `/proc/filesystems`-formatted file, lowercased.
pub fn read_supported_filesystems(path: &Path) -> Result<BTreeSet<String>, FilterError> {
    debug!(path = %path.display(), "reading filesystem registry");
    let contents = fs::read_to_string(path).map_err(|source| FilterError::FsTypeRegistry {
        path: path.display().to_string(),
        source,
    })?;
    let supported = parse_filesystems(&contents);
    debug!(count = supported.len(), "supported filesystems loaded");
    Ok(supported)
}

/// Each line is either `nodev\t<fstype>` or `\t<fstype>`.
pub fn parse_filesystems(contents: &str) -> BTreeSet<String> {
    contents
        .lines()
        .filter_map(|line| line.split_whitespace().last())
        .map(str::to_lowercase)
        .collect()
}

/// Rejects filter values that would make a scan pointless: a malformed
/// minimum size and, when `registry` is given, a filesystem type the kernel
/// does not know.
pub fn validate_scan_filter(
    filter: &ScanFilter,
    registry: Option<&Path>,
) -> Result<(), FilterError> {
    if let Some(registry) = registry.filter(|_| !filter.fstype.is_empty()) {
        debug!(fstype = %filter.fstype, "validating filesystem type");
        let supported = read_supported_filesystems(registry)?;
        if !supported.contains(&filter.fstype.to_lowercase()) {
            return Err(FilterError::UnsupportedFsType {
                value: filter.fstype.clone(),
                supported: supported.into_iter().collect::<Vec<_>>().join(", "),
            });
        }
    }

    if !filter.min_size.trim().is_empty() {
        debug!(min_size = %filter.min_size, "validating min-size");
        parse_min_size(&filter.min_size)?;
    }

    Ok(())
}
