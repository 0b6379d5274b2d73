use tracing::debug;

use crate::error::Result;
use crate::model::{BlockDevice, ScanFilter};
use crate::size::parse_min_size;

/// A [`ScanFilter`] with its size expression parsed to a byte threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilter {
    pub fstype: String,
    pub min_size_bytes: u64,
    pub mount_point: String,
}

impl ResolvedFilter {
    pub fn resolve(filter: ScanFilter) -> Result<Self> {
        let min_size_bytes = parse_min_size(&filter.min_size)?;
        Ok(Self {
            fstype: filter.fstype,
            min_size_bytes,
            mount_point: filter.mount_point,
        })
    }

    pub fn matches_fstype(&self, device: &BlockDevice) -> bool {
        if self.fstype.is_empty() {
            return true;
        }
        device
            .fstype
            .as_deref()
            .is_some_and(|fstype| fstype.eq_ignore_ascii_case(&self.fstype))
    }

    pub fn matches_min_size(&self, device: &BlockDevice) -> bool {
        self.min_size_bytes == 0 || device.size_bytes >= self.min_size_bytes
    }

    pub fn matches_mount_point(&self, device: &BlockDevice) -> bool {
        if self.mount_point.is_empty() {
            return true;
        }
        device
            .mount_point
            .as_deref()
            .is_some_and(|mount_point| mount_point.contains(&self.mount_point))
    }

    pub fn matches(&self, device: &BlockDevice) -> bool {
        if !self.matches_fstype(device) {
            debug!(device = %device.path, fstype = ?device.fstype, "filtered out by fstype");
            return false;
        }
        if !self.matches_min_size(device) {
            debug!(device = %device.path, size = device.size_bytes, "filtered out by min-size");
            return false;
        }
        if !self.matches_mount_point(device) {
            debug!(
                device = %device.path,
                mount_point = ?device.mount_point,
                "filtered out by mount-point"
            );
            return false;
        }
        true
    }
}

/// Keeps the devices matching every active predicate, in their original order.
pub fn apply_filter(devices: Vec<BlockDevice>, filter: &ResolvedFilter) -> Vec<BlockDevice> {
    devices
        .into_iter()
        .filter(|device| filter.matches(device))
        .collect()
}
