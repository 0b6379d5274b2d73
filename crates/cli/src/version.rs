use std::env;
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub built: String,
    pub os: String,
    pub arch: String,
}

impl BuildInfo {
    /// Metadata baked in at compile time. Set `DRIVER_SCANNER_COMMIT` and
    /// `DRIVER_SCANNER_BUILD_DATE` when building to fill the commit and date.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("DRIVER_SCANNER_COMMIT")
                .unwrap_or("unknown")
                .to_string(),
            built: option_env!("DRIVER_SCANNER_BUILD_DATE")
                .unwrap_or("unknown")
                .to_string(),
            os: env::consts::OS.to_string(),
            arch: env::consts::ARCH.to_string(),
        }
    }

    pub fn write_to(&self, out: &mut impl Write, short: bool) -> io::Result<()> {
        if short {
            return writeln!(out, "{}", self.version);
        }
        writeln!(out, "driver-scanner version: {}", self.version)?;
        writeln!(out, "Commit: {}", self.commit)?;
        writeln!(out, "Built: {}", self.built)?;
        writeln!(out, "OS/Arch: {}/{}", self.os, self.arch)
    }
}
