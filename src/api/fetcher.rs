use super::session::{Session, Transport};
use crate::util::section::{write_json, write_lines};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::io::Write;
use tracing::{debug, info};

/// Collections emitted on every poll, in query order.
pub const COLLECTIONS: [&str; 3] = ["appliance", "hardware", "volume"];

/// Metric entities queried per appliance when metrics are enabled.
pub const METRIC_ENTITIES: [&str; 2] = ["performance_metrics_by_appliance", "space_metrics_by_appliance"];

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Also query the newest performance and space samples per appliance.
    pub metrics: bool,
}

/// Run one poll: version banner, then every collection, each written to
/// `out` as soon as it arrives. The first failing query ends the poll.
pub fn fetch_all<T: Transport, W: Write>(session: &Session<T>, out: &mut W, opts: FetchOptions) -> Result<()> {
    let spec = session.get("openapi.json").context("metadata query failed")?;
    let info = &spec["info"];
    write_lines(out, "check_mk", Some(' '), &[
        format!("Version: {}", env!("CARGO_PKG_VERSION")),
        format!("AgentOS: {} {}", text(&info["title"]), text(&info["version"])),
    ])?;

    let mut appliance_ids: Vec<String> = Vec::new();
    for name in COLLECTIONS {
        let collection = session.get(&format!("{}?select=*", name))
            .with_context(|| format!("{} query failed", name))?;
        info!(collection = name, records = collection.as_array().map_or(0, Vec::len), "fetched");
        if name == "appliance" {
            appliance_ids = ids(&collection);
        }
        write_json(out, name, &collection)?;
    }

    if opts.metrics {
        for entity in METRIC_ENTITIES {
            let samples = newest_samples(session, entity, &appliance_ids)?;
            write_json(out, entity, &Value::Array(samples))?;
        }
    }
    Ok(())
}

fn newest_samples<T: Transport>(session: &Session<T>, entity: &str, appliance_ids: &[String]) -> Result<Vec<Value>> {
    let mut samples = Vec::new();
    for id in appliance_ids {
        let body = json!({ "entity": entity, "entity_id": id, "interval": "Five_Mins" });
        let series = session.post("metrics/generate", &body)
            .with_context(|| format!("{} query for {} failed", entity, id))?;
        match series.as_array().and_then(|s| s.last()) {
            Some(newest) => samples.push(newest.clone()),
            None         => debug!(entity, appliance = %id, "no samples returned"),
        }
    }
    Ok(samples)
}

fn ids(collection: &Value) -> Vec<String> {
    collection.as_array()
        .map(|items| items.iter().filter_map(|i| i["id"].as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null      => "unknown".to_string(),
        other            => other.to_string(),
    }
}
