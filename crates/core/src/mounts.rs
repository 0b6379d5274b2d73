use std::io;
use std::path::PathBuf;

use proc_mounts::{MountInfo, MountIter};
use tracing::debug;

use crate::model::MountEntry;

pub const PROC_SELF_MOUNTS: &str = "/proc/self/mounts";

/// Source of the live mount table.
pub trait MountTableProvider {
    fn mounts(&self) -> io::Result<Vec<MountEntry>>;
}

/// Reads a `/proc/mounts`-formatted table.
#[derive(Debug, Clone)]
pub struct ProcMountsProvider {
    path: PathBuf,
}

impl ProcMountsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcMountsProvider {
    fn default() -> Self {
        Self::new(PROC_SELF_MOUNTS)
    }
}

impl MountTableProvider for ProcMountsProvider {
    fn mounts(&self) -> io::Result<Vec<MountEntry>> {
        debug!(path = %self.path.display(), "reading mount table");
        let entries = MountIter::new_from_file(&self.path)?
            .map(|row| row.map(MountEntry::from))
            .collect::<io::Result<Vec<_>>>()?;
        debug!(count = entries.len(), "mount entries loaded");
        Ok(entries)
    }
}

impl From<MountInfo> for MountEntry {
    fn from(info: MountInfo) -> Self {
        Self {
            mount_point: info.dest.to_string_lossy().to_string(),
            fstype: info.fstype,
            source: info.source.to_string_lossy().to_string(),
            options: info.options.join(","),
        }
    }
}
