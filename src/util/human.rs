use chrono::{DateTime, Local};

/// Format bytes/s into a human-readable string: "12.5 MB/s"
pub fn fmt_rate(bytes_per_sec: f64) -> String {
    fmt_bytes_f(bytes_per_sec) + "/s"
}

/// Format a raw byte count into a human-readable string: "12.5 MB"
pub fn fmt_bytes(bytes: u64) -> String {
    fmt_bytes_f(bytes as f64)
}

/// Same as [`fmt_bytes`] for a value already expressed in MiB.
pub fn fmt_mb(mb: f64) -> String {
    fmt_bytes_f(mb * 1_048_576.0)
}

fn fmt_bytes_f(b: f64) -> String {
    const TB: f64 = 1_099_511_627_776.0;
    const GB: f64 = 1_073_741_824.0;
    const MB: f64 = 1_048_576.0;
    const KB: f64 = 1_024.0;
    if b >= TB      { format!("{:.1} TB", b / TB) }
    else if b >= GB { format!("{:.1} GB", b / GB) }
    else if b >= MB { format!("{:.1} MB", b / MB) }
    else if b >= KB { format!("{:.1} KB", b / KB) }
    else            { format!("{:.0} B",  b) }
}

/// Format a percentage with two decimals: "84.52%"
pub fn fmt_pct(pct: f64) -> String {
    format!("{:.2}%", pct)
}

/// Render an API timestamp (RFC 3339, UTC) in local time. Unparseable
/// input is returned unchanged.
pub fn fmt_timestamp(ts: &str) -> String {
    match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_units() {
        assert_eq!(fmt_bytes(512), "512 B");
        assert_eq!(fmt_bytes(1_572_864), "1.5 MB");
        assert_eq!(fmt_mb(2048.0), "2.0 GB");
        assert_eq!(fmt_rate(1024.0), "1.0 KB/s");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(fmt_pct(84.5), "84.50%");
    }

    #[test]
    fn bad_timestamp_passes_through() {
        assert_eq!(fmt_timestamp("yesterday"), "yesterday");
        assert_ne!(fmt_timestamp("2024-05-01T10:00:00Z"), "2024-05-01T10:00:00Z");
    }
}
