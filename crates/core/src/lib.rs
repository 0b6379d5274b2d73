pub mod error;
pub mod filter;
pub mod fstypes;
pub mod inventory;
pub mod model;
pub mod mounts;
pub mod scan;
pub mod size;
pub mod table;

pub use error::{FilterError, InvalidMinSize, InventoryError, ScanError};
pub use filter::{apply_filter, ResolvedFilter};
pub use fstypes::{
    parse_filesystems, read_supported_filesystems, validate_scan_filter, PROC_FILESYSTEMS,
};
pub use inventory::{parse_lsblk_output, BlockDeviceProvider, LsblkProvider, LSBLK_COLUMNS};
pub use model::{BlockDevice, MountEntry, ScanFilter};
pub use mounts::{MountTableProvider, ProcMountsProvider, PROC_SELF_MOUNTS};
pub use scan::{build_mounts_by_source, enrich_with_mounts, DeviceScanner};
pub use size::{human_bytes, parse_min_size};
pub use table::render_device_table;
