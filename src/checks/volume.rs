use super::df::{check_filesystem_levels, FilesystemLevels};
use crate::models::volume::Volume;
use crate::verdict::{State, Verdict};

const MB: f64 = 1_048_576.0;

/// One service per primary volume: (item, volume id). The id is fixed at
/// discovery so a rename keeps the service attached to the same volume.
pub fn discover(volumes: &[Volume]) -> Vec<(String, String)> {
    volumes.iter()
        .filter(|v| v.is_primary())
        .map(|v| (v.item(), v.id.clone()))
        .collect()
}

pub fn check(volume_id: &str, params: &FilesystemLevels, volumes: &[Volume]) -> Verdict {
    let vol = match volumes.iter().find(|v| v.id == volume_id) {
        Some(v) => v,
        None    => return Verdict::unknown(format!("volume id {} not found", volume_id)),
    };

    let mut v = Verdict::new();
    let state = if vol.state == "Ready" { State::Ok } else { State::Warn };
    v.push(state, format!("State: {}", vol.state));

    let size_mb = vol.size as f64 / MB;
    let used_mb = vol.logical_used as f64 / MB;
    let free_mb = vol.free() as f64 / MB;
    let fs = check_filesystem_levels(size_mb, free_mb, used_mb, params);
    v.push(fs.state, fs.text);
    for m in fs.metrics {
        v.metric(m);
    }
    v
}
