//! Hardware lifecycle checks: one aggregate service over all populated
//! components, and one service per component addressed by its path.

use crate::hwpath;
use crate::models::hardware::Hardware;
use crate::verdict::{State, Verdict};
use std::collections::HashMap;

/// Ids of all populated components, ordered by (type, slot, name).
/// `None` when there is nothing to monitor.
pub fn discover_ids(hardware: &[Hardware]) -> Option<Vec<String>> {
    let mut populated: Vec<&Hardware> = hardware.iter().filter(|h| h.is_populated()).collect();
    populated.sort_by(|a, b| (&a.kind, a.slot, &a.name).cmp(&(&b.kind, b.slot, &b.name)));
    let ids: Vec<String> = populated.into_iter().map(|h| h.id.clone()).collect();
    if ids.is_empty() { None } else { Some(ids) }
}

fn label(h: &Hardware) -> &str {
    if h.name.is_empty() { &h.id } else { &h.name }
}

/// CRIT when any tracked component is unhealthy or gone.
pub fn check_ids(ids: &[String], hardware: &[Hardware]) -> Verdict {
    let index: HashMap<&str, &Hardware> = hardware.iter().map(|h| (h.id.as_str(), h)).collect();
    let mut problems: Vec<String> = Vec::new();
    let mut v = Verdict::new();

    for id in ids {
        match index.get(id.as_str()) {
            None => {
                let text = format!("missing item id: {}", id);
                v.detail(text.clone());
                problems.push(text);
            }
            Some(h) => {
                if !h.is_healthy() {
                    problems.push(format!("{}: {}", label(h), h.state_label()));
                }
                v.detail(format!(
                    "Type: {}, Appliance: {}, Slot: {}, Name: {}, Serial#: {}, State: {}",
                    h.kind, h.appliance_id, h.slot, h.name,
                    h.serial_number.as_deref().unwrap_or("unknown"),
                    h.state_label(),
                ));
            }
        }
    }

    if problems.is_empty() {
        v.push(State::Ok, "Everything is in the healthy state");
    } else {
        v.push(State::Crit, format!(
            "There are {} problems in total: {}",
            problems.len(),
            problems.join(", "),
        ));
    }
    v
}

/// Paths of all populated components.
pub fn discover_paths(hardware: &[Hardware]) -> Vec<String> {
    hwpath::resolve(hardware)
        .into_iter()
        .filter(|(_, h)| h.is_populated())
        .map(|(path, _)| path)
        .collect()
}

/// Lifecycle and staleness of the component at `path`, with type specific
/// details.
pub fn check_path(path: &str, hardware: &[Hardware]) -> Verdict {
    let paths = hwpath::resolve(hardware);
    let h = match paths.get(path) {
        Some(h) => *h,
        None    => return Verdict::unknown("Item not found"),
    };

    let mut v = Verdict::new();
    let lifecycle = if h.is_healthy() { State::Ok } else { State::Crit };
    v.push(lifecycle, format!("State: {}", h.state_label()));
    if h.is_stale() {
        v.push(State::Warn, format!("Stale: {}", h.stale_state.as_deref().unwrap_or("unknown")));
    }
    if let Some(details) = h.details().describe() {
        v.push(State::Ok, details);
    }
    v.detail(format!("Type: {}, Name: {}, Slot: {}, Id: {}", h.kind, h.name, h.slot, h.id));
    v.detail(format!("Serial#: {}", h.serial_number.as_deref().unwrap_or("unknown")));
    v
}
