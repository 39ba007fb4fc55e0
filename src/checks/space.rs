use super::levels::{DualLevels, Levels, LevelsPredictor};
use crate::models::metrics::SpaceSample;
use crate::util::human::{fmt_bytes, fmt_pct};
use crate::verdict::{Metric, State, Verdict};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceParams {
    /// Levels on physical used space in percent.
    pub perc_used: DualLevels,
}

impl Default for SpaceParams {
    fn default() -> Self {
        Self {
            perc_used: DualLevels { lower: Levels::NoLevels, upper: Levels::Fixed(80.0, 90.0) },
        }
    }
}

pub fn discover(samples: &[SpaceSample]) -> Vec<String> {
    samples.iter().map(|s| s.appliance_id.clone()).collect()
}

pub fn check(item: &str, params: &SpaceParams, predictor: &dyn LevelsPredictor, samples: &[SpaceSample]) -> Verdict {
    let s = match samples.iter().find(|s| s.appliance_id == item) {
        Some(s) => s,
        None    => return Verdict::unknown("Item not found"),
    };
    if s.physical_total == 0 {
        return Verdict::unknown("Physical capacity reported as zero");
    }

    let free = s.physical_total.saturating_sub(s.physical_used);
    let mut v = Verdict::new();
    v.metric(Metric::new("physical_free", free as f64));
    v.metric(Metric::new("physical_used", s.physical_used as f64));
    match s.data_reduction {
        Some(ratio) => {
            v.metric(Metric::new("data_reduction", ratio));
            v.push(State::Ok, format!("Data reduction ratio: {:.2}", ratio));
        }
        None => v.push(State::Ok, "Data reduction ratio: unknown"),
    }

    let pct = s.physical_used as f64 / s.physical_total as f64 * 100.0;
    let outcome = params.perc_used.check(pct, predictor, fmt_pct);
    v.push(outcome.state, format!("Used space: {}{}", fmt_pct(pct), outcome.note));
    v.metric(Metric::new("physical_used_percent", pct).with_levels(outcome.bounds));
    v.detail(format!(
        "Physical: {} used, {} free, {} total",
        fmt_bytes(s.physical_used), fmt_bytes(free), fmt_bytes(s.physical_total),
    ));
    v
}
