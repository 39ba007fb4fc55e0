use crate::models::metrics::PerformanceSample;
use crate::util::human::{fmt_rate, fmt_timestamp};
use crate::verdict::{Metric, State, Verdict};

pub fn discover(samples: &[PerformanceSample]) -> Vec<String> {
    samples.iter().map(|s| s.appliance_id.clone()).collect()
}

pub fn check(item: &str, samples: &[PerformanceSample]) -> Verdict {
    let s = match samples.iter().find(|s| s.appliance_id == item) {
        Some(s) => s,
        None    => return Verdict::unknown("Item not found"),
    };
    let mut v = Verdict::new();
    v.metric(Metric::new("total_iops", s.total_iops));
    v.metric(Metric::new("total_bandwidth", s.total_bandwidth));

    let counters = format!(
        "total_iops: {:.1} IO/s, total_bandwidth: {}",
        s.total_iops,
        fmt_rate(s.total_bandwidth),
    );
    match &s.timestamp {
        Some(ts) => v.push(State::Ok, format!("Timestamp {}: {}", fmt_timestamp(ts), counters)),
        None     => v.push(State::Ok, counters),
    }
    v
}
