use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{Result, ScanError};
use crate::filter::{apply_filter, ResolvedFilter};
use crate::inventory::{BlockDeviceProvider, LsblkProvider};
use crate::model::{BlockDevice, MountEntry, ScanFilter};
use crate::mounts::{MountTableProvider, ProcMountsProvider};

/// Combines the device inventory with the live mount table and applies a
/// [`ScanFilter`].
#[derive(Debug, Clone)]
pub struct DeviceScanner<D, M> {
    devices: D,
    mounts: M,
}

impl DeviceScanner<LsblkProvider, ProcMountsProvider> {
    /// Scanner backed by `lsblk` and `/proc/self/mounts`.
    pub fn system() -> Self {
        Self::new(LsblkProvider::default(), ProcMountsProvider::default())
    }
}

impl<D, M> DeviceScanner<D, M>
where
    D: BlockDeviceProvider,
    M: MountTableProvider,
{
    pub fn new(devices: D, mounts: M) -> Self {
        Self { devices, mounts }
    }

    pub fn scan(&self, filter: ScanFilter) -> Result<Vec<BlockDevice>> {
        info!(
            fstype = %filter.fstype,
            min_size = %filter.min_size,
            mount_point = %filter.mount_point,
            "starting device scan"
        );
        let filter = ResolvedFilter::resolve(filter)?;

        let mut devices = self.devices.list().map_err(ScanError::Inventory)?;
        info!(count = devices.len(), "block devices discovered");

        let mount_entries = self.mounts.mounts().map_err(ScanError::MountTable)?;
        debug!(count = mount_entries.len(), "mount entries retrieved");

        let mounts_by_source = build_mounts_by_source(mount_entries);
        enrich_with_mounts(&mut devices, &mounts_by_source);

        let total = devices.len();
        let filtered = apply_filter(devices, &filter);
        info!(before = total, after = filtered.len(), "filtering complete");
        Ok(filtered)
    }
}

/// Indexes mount entries by source. When several entries share a source the
/// last one in table order wins.
pub fn build_mounts_by_source(entries: Vec<MountEntry>) -> HashMap<String, MountEntry> {
    let mut by_source = HashMap::with_capacity(entries.len());
    for entry in entries {
        by_source.insert(entry.source.clone(), entry);
    }
    by_source
}

/// Fills in mount points the inventory did not report. Existing mount points
/// are left untouched.
pub fn enrich_with_mounts(
    devices: &mut [BlockDevice],
    mounts_by_source: &HashMap<String, MountEntry>,
) {
    for device in devices.iter_mut().filter(|device| !device.is_mounted()) {
        if let Some(entry) = mounts_by_source.get(&device.path) {
            debug!(
                device = %device.path,
                mount_point = %entry.mount_point,
                "enriched device with mount info"
            );
            device.mount_point = Some(entry.mount_point.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io;

    use super::{build_mounts_by_source, enrich_with_mounts, DeviceScanner};
    use crate::error::{InventoryError, ScanError};
    use crate::inventory::BlockDeviceProvider;
    use crate::model::{BlockDevice, MountEntry, ScanFilter};
    use crate::mounts::MountTableProvider;

    struct FakeDevices {
        devices: Vec<BlockDevice>,
        calls: Cell<usize>,
    }

    impl BlockDeviceProvider for FakeDevices {
        fn list(&self) -> Result<Vec<BlockDevice>, InventoryError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.devices.clone())
        }
    }

    struct FailingDevices;

    impl BlockDeviceProvider for FailingDevices {
        fn list(&self) -> Result<Vec<BlockDevice>, InventoryError> {
            Err(InventoryError::Spawn {
                program: "lsblk".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            })
        }
    }

    struct FakeMounts {
        entries: Vec<MountEntry>,
        calls: Cell<usize>,
    }

    impl MountTableProvider for FakeMounts {
        fn mounts(&self) -> io::Result<Vec<MountEntry>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.entries.clone())
        }
    }

    struct FailingMounts;

    impl MountTableProvider for FailingMounts {
        fn mounts(&self) -> io::Result<Vec<MountEntry>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    fn device(path: &str, mount: Option<&str>) -> BlockDevice {
        BlockDevice {
            name: path.trim_start_matches("/dev/").to_string(),
            path: path.to_string(),
            fstype: Some("ext4".to_string()),
            kind: "part".to_string(),
            mount_point: mount.map(str::to_string),
            size_bytes: 1_000_000_000,
            ..BlockDevice::default()
        }
    }

    fn mount(source: &str, mount_point: &str) -> MountEntry {
        MountEntry {
            mount_point: mount_point.to_string(),
            fstype: "ext4".to_string(),
            source: source.to_string(),
            options: "rw".to_string(),
        }
    }

    fn fakes(
        devices: Vec<BlockDevice>,
        entries: Vec<MountEntry>,
    ) -> DeviceScanner<FakeDevices, FakeMounts> {
        DeviceScanner::new(
            FakeDevices {
                devices,
                calls: Cell::new(0),
            },
            FakeMounts {
                entries,
                calls: Cell::new(0),
            },
        )
    }

    #[test]
    fn enriches_missing_mount_point() {
        let scanner = fakes(vec![device("/dev/sda1", None)], vec![mount("/dev/sda1", "/data")]);
        let result = scanner.scan(ScanFilter::default()).expect("scan succeeds");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].mount_point.as_deref(), Some("/data"));
    }

    #[test]
    fn never_overrides_reported_mount_point() {
        let scanner = fakes(
            vec![device("/dev/sda1", Some("/home"))],
            vec![mount("/dev/sda1", "/data")],
        );
        let result = scanner.scan(ScanFilter::default()).expect("scan succeeds");
        assert_eq!(result[0].mount_point.as_deref(), Some("/home"));
    }

    #[test]
    fn duplicate_sources_resolve_to_last_entry() {
        let by_source = build_mounts_by_source(vec![
            mount("/dev/sda1", "/first"),
            mount("tmpfs", "/run"),
            mount("/dev/sda1", "/second"),
        ]);
        assert_eq!(by_source.len(), 2);

        let mut devices = vec![device("/dev/sda1", None)];
        enrich_with_mounts(&mut devices, &by_source);
        assert_eq!(devices[0].mount_point.as_deref(), Some("/second"));
    }

    #[test]
    fn unmatched_devices_stay_unmounted() {
        let by_source = build_mounts_by_source(vec![mount("tmpfs", "/tmp")]);
        let mut devices = vec![device("/dev/sdb", None)];
        enrich_with_mounts(&mut devices, &by_source);
        assert_eq!(devices[0].mount_point, None);
    }

    #[test]
    fn invalid_min_size_fails_before_providers_run() {
        let scanner = fakes(vec![device("/dev/sda1", None)], Vec::new());
        let filter = ScanFilter {
            min_size: "notasize".to_string(),
            ..ScanFilter::default()
        };
        let err = scanner.scan(filter).unwrap_err();
        match &err {
            ScanError::InvalidMinSize(invalid) => assert_eq!(invalid.value, "notasize"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(scanner.devices.calls.get(), 0);
        assert_eq!(scanner.mounts.calls.get(), 0);
    }

    #[test]
    fn inventory_failure_is_fatal() {
        let scanner = DeviceScanner::new(
            FailingDevices,
            FakeMounts {
                entries: Vec::new(),
                calls: Cell::new(0),
            },
        );
        let err = scanner.scan(ScanFilter::default()).unwrap_err();
        assert!(matches!(err, ScanError::Inventory(_)));
        assert_eq!(err.to_string(), "inventory retrieval failed");
        assert_eq!(scanner.mounts.calls.get(), 0);
    }

    #[test]
    fn mount_table_failure_is_fatal() {
        let scanner = DeviceScanner::new(
            FakeDevices {
                devices: vec![device("/dev/sda1", None)],
                calls: Cell::new(0),
            },
            FailingMounts,
        );
        let err = scanner.scan(ScanFilter::default()).unwrap_err();
        assert!(matches!(err, ScanError::MountTable(_)));
        assert_eq!(err.to_string(), "mount info retrieval failed");
    }

    #[test]
    fn empty_match_is_not_an_error() {
        let scanner = fakes(vec![device("/dev/sda1", None)], Vec::new());
        let filter = ScanFilter {
            fstype: "xfs".to_string(),
            ..ScanFilter::default()
        };
        assert!(scanner.scan(filter).expect("scan succeeds").is_empty());
    }
}
