//! Block device inventory backed by `lsblk --json`.

use std::collections::HashSet;
use std::process::Command;

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::InventoryError;
use crate::model::{non_empty, BlockDevice};

pub const LSBLK_COLUMNS: &str =
    "NAME,PATH,UUID,SERIAL,FSTYPE,TYPE,LABEL,MOUNTPOINT,SIZE,FSSIZE,FSAVAIL";

/// Source of the raw block device list.
pub trait BlockDeviceProvider {
    fn list(&self) -> Result<Vec<BlockDevice>, InventoryError>;
}

#[derive(Debug, Clone)]
pub struct LsblkProvider {
    program: String,
}

impl LsblkProvider {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for LsblkProvider {
    fn default() -> Self {
        Self::new("lsblk")
    }
}

impl BlockDeviceProvider for LsblkProvider {
    fn list(&self) -> Result<Vec<BlockDevice>, InventoryError> {
        debug!(program = %self.program, "running device inventory command");
        let output = Command::new(&self.program)
            .args(["--json", "-b", "-o", LSBLK_COLUMNS])
            .output()
            .map_err(|source| InventoryError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(InventoryError::Status {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let devices = parse_lsblk_output(&output.stdout).map_err(|source| InventoryError::Parse {
            program: self.program.clone(),
            source,
        })?;
        debug!(count = devices.len(), "block devices parsed");
        Ok(devices)
    }
}

#[derive(Debug, Deserialize)]
struct LsblkOutput {
    #[serde(rename = "blockdevices")]
    block_devices: Vec<LsblkDevice>,
}

#[derive(Debug, Deserialize)]
struct LsblkDevice {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    serial: Option<String>,
    #[serde(default)]
    fstype: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    mountpoint: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    fssize: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    fsavail: Option<u64>,
    #[serde(default)]
    children: Vec<LsblkDevice>,
}

/// util-linux before 2.33 prints `-b` sizes as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(NumberOrString::Number(value)) => Ok(Some(value)),
        Some(NumberOrString::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<u64>().map(Some).map_err(|err| {
                serde::de::Error::custom(format!("invalid byte count {text:?}: {err}"))
            })
        }
    }
}

/// Parses `lsblk --json -b` output, flattening nested children depth-first.
pub fn parse_lsblk_output(raw: &[u8]) -> Result<Vec<BlockDevice>, serde_json::Error> {
    let parsed: LsblkOutput = serde_json::from_slice(raw)?;
    let mut devices = Vec::new();
    let mut seen = HashSet::new();
    for entry in parsed.block_devices {
        flatten_into(entry, &mut devices, &mut seen);
    }
    Ok(devices)
}

fn flatten_into(entry: LsblkDevice, out: &mut Vec<BlockDevice>, seen: &mut HashSet<String>) {
    let LsblkDevice {
        name,
        path,
        uuid,
        serial,
        fstype,
        kind,
        label,
        mountpoint,
        size,
        fssize,
        fsavail,
        children,
    } = entry;

    let name = name.unwrap_or_default();
    // Older lsblk releases lack the PATH column.
    let path = non_empty(path).unwrap_or_else(|| {
        if name.is_empty() {
            String::new()
        } else {
            format!("/dev/{name}")
        }
    });

    if path.is_empty() {
        debug!(name = %name, "skipping device without a path");
    } else if !seen.insert(path.clone()) {
        debug!(device = %path, "skipping repeated device path");
    } else {
        out.push(BlockDevice {
            name,
            path,
            uuid: non_empty(uuid),
            serial: non_empty(serial),
            fstype: non_empty(fstype),
            kind: kind.unwrap_or_default(),
            label: non_empty(label),
            mount_point: non_empty(mountpoint),
            size_bytes: size.unwrap_or(0),
            fs_size_bytes: fssize,
            fs_avail_bytes: fsavail,
        });
    }

    for child in children {
        flatten_into(child, out, seen);
    }
}
