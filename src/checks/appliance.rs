use crate::models::appliance::Appliance;
use crate::verdict::{State, Verdict};

pub fn discover(appliances: &[Appliance]) -> Vec<String> {
    appliances.iter().map(|a| a.id.clone()).collect()
}

/// Identity only; the appliance itself is always OK while it exists.
pub fn check(item: &str, appliances: &[Appliance]) -> Verdict {
    let a = match appliances.iter().find(|a| a.id == item) {
        Some(a) => a,
        None    => return Verdict::unknown("Item not found"),
    };
    let mut v = Verdict::new();
    v.push(State::Ok, format!(
        "Name: {}, Model: {}, Node Count: {}, Service Tag: {}",
        a.name.as_deref().unwrap_or("unknown"),
        a.model.as_deref().unwrap_or("unknown"),
        a.node_count.map(|n| n.to_string()).unwrap_or_else(|| "unknown".into()),
        a.service_tag.as_deref().unwrap_or("unknown"),
    ));
    v
}
