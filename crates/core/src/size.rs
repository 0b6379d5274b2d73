use byte_unit::{Byte, UnitType};

use crate::error::InvalidMinSize;

/// Parses a minimum-size expression into a byte threshold. Blank input means
/// no constraint and yields 0.
///
/// Units follow the usual convention: `K`, `M`, `G`, `T` are powers of 1000
/// and `Ki`, `Mi`, `Gi`, `Ti` are powers of 1024. A trailing `B` is optional
/// and case is ignored.
pub fn parse_min_size(value: &str) -> Result<u64, InvalidMinSize> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    Byte::parse_str(trimmed, true)
        .map(|byte| byte.as_u64())
        .map_err(|source| InvalidMinSize {
            value: value.to_string(),
            source,
        })
}

/// Renders a byte count with binary units: one decimal below 10 of a unit
/// (`1.5 GiB`), none from 10 up (`954 MiB`).
pub fn human_bytes(value: u64) -> String {
    if value < 10 {
        return format!("{value} B");
    }
    let adjusted = Byte::from_u64(value).get_appropriate_unit(UnitType::Binary);
    let rounded = (adjusted.get_value() * 10.0 + 0.5).floor() / 10.0;
    let unit = adjusted.get_unit();
    if rounded < 10.0 {
        format!("{rounded:.1} {unit}")
    } else {
        format!("{rounded:.0} {unit}")
    }
}
