use crate::model::BlockDevice;
use crate::size::human_bytes;

const COLUMNS: [&str; 9] = [
    "UUID",
    "SERIAL",
    "DEVICE",
    "FSTYPE",
    "TYPE",
    "MOUNTPOINT",
    "SIZE",
    "FS SIZE",
    "FS AVAIL",
];

const PLACEHOLDER: &str = "-";
const PADDING: usize = 2;

/// Renders devices as a left-aligned text table, one row per device in the
/// given order.
pub fn render_device_table(devices: &[BlockDevice]) -> String {
    let mut rows = Vec::with_capacity(devices.len() + 2);
    rows.push(COLUMNS.map(str::to_string).to_vec());
    rows.push(COLUMNS.map(|title| "-".repeat(title.len())).to_vec());
    rows.extend(devices.iter().map(device_row));

    let mut widths = [0_usize; COLUMNS.len()];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let mut line = String::new();
        for (index, cell) in row.iter().enumerate() {
            line.push_str(cell);
            if index + 1 < row.len() {
                let pad = widths[index] - cell.chars().count() + PADDING;
                line.push_str(&" ".repeat(pad));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn device_row(device: &BlockDevice) -> Vec<String> {
    vec![
        text_or_dash(device.uuid.as_deref()),
        text_or_dash(device.serial.as_deref()),
        text_or_dash(Some(&device.path)),
        text_or_dash(device.fstype.as_deref()),
        text_or_dash(Some(&device.kind)),
        text_or_dash(device.mount_point.as_deref()),
        // lsblk reports 0 when it cannot size the device
        size_or_dash(Some(device.size_bytes).filter(|size| *size > 0)),
        size_or_dash(device.fs_size_bytes),
        size_or_dash(device.fs_avail_bytes),
    ]
}

fn text_or_dash(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn size_or_dash(value: Option<u64>) -> String {
    value
        .map(human_bytes)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
