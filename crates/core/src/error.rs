use std::io;

use thiserror::Error;

/// Failure of the device inventory command.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Status {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("failed to parse {program} JSON output")]
    Parse {
        program: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
#[error("invalid min-size value {value:?}")]
pub struct InvalidMinSize {
    pub value: String,
    #[source]
    pub source: byte_unit::ParseError,
}

/// Failure of a scan run.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    InvalidMinSize(#[from] InvalidMinSize),

    #[error("inventory retrieval failed")]
    Inventory(#[source] InventoryError),

    #[error("mount info retrieval failed")]
    MountTable(#[source] io::Error),
}

/// Rejection of a filter by the pre-flight check.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    InvalidMinSize(#[from] InvalidMinSize),

    #[error("cannot validate fstype: failed to read {path}")]
    FsTypeRegistry {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unsupported filesystem type {value:?}, supported: {supported}")]
    UnsupportedFsType { value: String, supported: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;
