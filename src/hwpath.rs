//! Stable hierarchical names for hardware components.
//!
//! A component's path is its appliance id followed by one short code per
//! level of the parent chain, e.g. `A1/BE:00/Node:01/IO_Module:00`. Paths are
//! derived afresh from every hardware collection.

use crate::models::hardware::Hardware;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("parent chain of hardware {0} contains a cycle")]
    Cycle(String),
}

/// Short code of one path segment: the type (reduced to its capitals and
/// digits when longer than 10 characters) plus the two digit slot, unless
/// the name yields something at least two characters shorter.
pub fn short_code(hw: &Hardware) -> String {
    let kind = if hw.kind.chars().count() > 10 {
        hw.kind.chars().filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit()).collect()
    } else {
        hw.kind.clone()
    };
    let code = format!("{}:{:02}", kind, hw.slot);
    match name_code(&hw.name) {
        Some(refined) if refined.chars().count() + 2 <= code.chars().count() => refined,
        _ => code,
    }
}

/// `Enclosure-LCC1` -> `LCC:01`: the last dash segment with `:0` put in
/// front of a single trailing digit.
fn name_code(name: &str) -> Option<String> {
    let segment = name.rsplit('-').next()?;
    let chars: Vec<char> = segment.chars().collect();
    let n = chars.len();
    if n < 2 || !chars[n - 1].is_ascii_digit() || chars[n - 2].is_ascii_digit() {
        return None;
    }
    let head: String = chars[..n - 1].iter().collect();
    Some(format!("{}:0{}", head, chars[n - 1]))
}

/// Path of `hw` within `index` (all components keyed by id).
pub fn path_of<'a>(hw: &'a Hardware, index: &HashMap<&str, &'a Hardware>) -> Result<String, PathError> {
    let mut segments: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut cur = hw;

    let root = loop {
        if !seen.insert(cur.id.as_str()) {
            return Err(PathError::Cycle(hw.id.clone()));
        }
        let parent_id = match cur.parent_id.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => p,
            None    => break cur.appliance_id.as_str(),
        };
        segments.push(short_code(cur));
        match index.get(parent_id) {
            Some(&parent) => cur = parent,
            None => {
                debug!(id = %cur.id, parent = parent_id, "parent not in collection, rooting at appliance");
                break cur.appliance_id.as_str();
            }
        }
    };

    let mut path = root.to_string();
    for seg in segments.iter().rev() {
        path.push('/');
        path.push_str(seg);
    }
    Ok(path)
}

/// Map every component to its path. Components on a parent cycle are
/// skipped; a repeated path keeps the later component.
pub fn resolve(hardware: &[Hardware]) -> BTreeMap<String, &Hardware> {
    let index: HashMap<&str, &Hardware> = hardware.iter().map(|h| (h.id.as_str(), h)).collect();
    let mut paths = BTreeMap::new();
    for hw in hardware {
        match path_of(hw, &index) {
            Ok(path) => {
                if let Some(prev) = paths.insert(path, hw) {
                    debug!(replaced = %prev.id, by = %hw.id, "hardware path already taken");
                }
            }
            Err(e) => warn!(error = %e, "skipping hardware component"),
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn hw(v: Value) -> Hardware {
        serde_json::from_value(v).unwrap()
    }

    fn sample() -> Vec<Hardware> {
        vec![
            hw(json!({ "id": "app", "name": "PS-Appliance", "type": "Appliance", "slot": null, "appliance_id": "A1" })),
            hw(json!({ "id": "be", "name": "BaseEnclosure", "type": "Base_Enclosure", "slot": 0, "appliance_id": "A1", "parent_id": "app" })),
            hw(json!({ "id": "nb", "name": "BaseEnclosure-NodeB", "type": "Node", "slot": 1, "appliance_id": "A1", "parent_id": "be" })),
            hw(json!({ "id": "io", "name": "BaseEnclosure-NodeB-IoModule0", "type": "IO_Module", "slot": 0, "appliance_id": "A1", "parent_id": "nb" })),
            hw(json!({ "id": "d7", "name": "BaseEnclosure-Drive7", "type": "Drive", "slot": 7, "appliance_id": "A1", "parent_id": "be" })),
            hw(json!({ "id": "ps", "name": "BaseEnclosure-NodeB-PSU0", "type": "Power_Supply", "slot": 0, "appliance_id": "A1", "parent_id": "nb" })),
        ]
    }

    #[test]
    fn long_types_shrink_to_capitals() {
        let h = hw(json!({ "id": "x", "type": "Power_Supply", "slot": 2 }));
        assert_eq!(short_code(&h), "PS:02");
        let h = hw(json!({ "id": "x", "type": "Battery_Backup_Module2", "slot": 0 }));
        assert_eq!(short_code(&h), "BBM2:00");
    }

    #[test]
    fn name_code_wins_only_when_two_shorter() {
        let lcc = hw(json!({ "id": "x", "name": "Enclosure-LCC1", "type": "Controller", "slot": 1 }));
        assert_eq!(short_code(&lcc), "LCC:01");
        // "IoModule:00" is only one character shorter than "IO_Module:00"
        let io = hw(json!({ "id": "x", "name": "Node-IoModule0", "type": "IO_Module", "slot": 0 }));
        assert_eq!(short_code(&io), "IO_Module:00");
    }

    #[test]
    fn name_code_needs_single_trailing_digit() {
        assert_eq!(name_code("Enclosure-LCC1"), Some("LCC:01".into()));
        assert_eq!(name_code("Drive12"), None);
        assert_eq!(name_code("NodeA"), None);
        assert_eq!(name_code("7"), None);
    }

    #[test]
    fn short_code_is_deterministic() {
        for h in sample() {
            assert_eq!(short_code(&h), short_code(&h.clone()));
        }
    }

    #[test]
    fn resolves_full_paths() {
        let hardware = sample();
        let paths = resolve(&hardware);
        let ids: BTreeMap<&str, &str> = paths.iter().map(|(p, h)| (h.id.as_str(), p.as_str())).collect();
        assert_eq!(ids["app"], "A1");
        assert_eq!(ids["be"], "A1/BE:00");
        assert_eq!(ids["nb"], "A1/BE:00/Node:01");
        assert_eq!(ids["io"], "A1/BE:00/Node:01/IO_Module:00");
        assert_eq!(ids["d7"], "A1/BE:00/Drive:07");
        assert_eq!(ids["ps"], "A1/BE:00/Node:01/PS:00");
        assert_eq!(paths.len(), hardware.len());
    }

    #[test]
    fn every_path_ends_with_own_code_or_is_root() {
        let hardware = sample();
        let index: HashMap<&str, &Hardware> = hardware.iter().map(|h| (h.id.as_str(), h)).collect();
        for h in &hardware {
            let path = path_of(h, &index).unwrap();
            if h.parent_id.is_none() {
                assert_eq!(path, h.appliance_id);
            } else {
                assert!(path.ends_with(&format!("/{}", short_code(h))), "{}", path);
            }
        }
    }

    #[test]
    fn cycles_are_detected_and_skipped() {
        let hardware = vec![
            hw(json!({ "id": "a", "type": "Fan", "slot": 0, "appliance_id": "A1", "parent_id": "b" })),
            hw(json!({ "id": "b", "type": "Fan", "slot": 1, "appliance_id": "A1", "parent_id": "a" })),
            hw(json!({ "id": "s", "type": "Fan", "slot": 2, "appliance_id": "A1", "parent_id": "s" })),
            hw(json!({ "id": "r", "type": "Appliance", "appliance_id": "A1" })),
        ];
        let index: HashMap<&str, &Hardware> = hardware.iter().map(|h| (h.id.as_str(), h)).collect();
        assert_eq!(path_of(&hardware[0], &index), Err(PathError::Cycle("a".into())));
        assert_eq!(path_of(&hardware[2], &index), Err(PathError::Cycle("s".into())));
        let paths = resolve(&hardware);
        assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["A1"]);
    }

    #[test]
    fn missing_parent_roots_at_appliance() {
        let hardware = vec![hw(json!({ "id": "f", "type": "Fan", "slot": 4, "appliance_id": "A2", "parent_id": "gone" }))];
        assert!(resolve(&hardware).contains_key("A2/Fan:04"));
    }

    #[test]
    fn shared_root_path_keeps_later_component() {
        let hardware = vec![
            hw(json!({ "id": "be", "name": "BaseEnclosure", "type": "Base_Enclosure", "slot": 0, "appliance_id": "A1" })),
            hw(json!({ "id": "ee", "name": "ExpansionEnclosure", "type": "Expansion_Enclosure", "slot": 1, "appliance_id": "A1" })),
        ];
        let paths = resolve(&hardware);
        let ids: Vec<(&str, &str)> = paths.iter().map(|(p, h)| (p.as_str(), h.id.as_str())).collect();
        assert_eq!(ids, vec![("A1", "ee")]);
    }
}
