//! Agent output blocks: `<<<name>>>` headers followed by the body lines,
//! and the reverse direction that reads a dump back into typed records.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::{debug, warn};

/// The records of one query, in API order.
pub type Collection = Vec<Value>;

pub fn header(name: &str, sep: Option<char>) -> String {
    match sep {
        Some(c) => format!("<<<{}:sep({})>>>", name, c as u32),
        None    => format!("<<<{}>>>", name),
    }
}

/// Write a section whose body is plain text lines.
pub fn write_lines<W: Write>(out: &mut W, name: &str, sep: Option<char>, lines: &[String]) -> io::Result<()> {
    writeln!(out, "{}", header(name, sep))?;
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Write a section whose body is one line of compact JSON.
pub fn write_json<W: Write>(out: &mut W, name: &str, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", header(name, None))?;
    writeln!(out, "{}", value)
}

/// Split an agent dump into its sections. Options after `:` in the header
/// are dropped; repeated sections are concatenated.
pub fn split_sections(dump: &str) -> BTreeMap<String, Vec<String>> {
    let mut sections: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in dump.lines() {
        if let Some(inner) = line.strip_prefix("<<<").and_then(|l| l.strip_suffix(">>>")) {
            let name = inner.split(':').next().unwrap_or(inner).to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        if let Some(name) = &current {
            if let Some(body) = sections.get_mut(name) {
                body.push(line.to_string());
            }
        }
    }
    sections
}

/// Reparse a JSON section body. Malformed input yields an empty collection.
pub fn parse_collection(lines: &[String]) -> Collection {
    let text: String = lines.concat();
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(items)) => items,
        Ok(obj @ Value::Object(_)) => {
            debug!("section body is a single object, treating it as one record");
            vec![obj]
        }
        Ok(other) => {
            warn!(kind = %json_kind(&other), "section body is not a collection");
            Vec::new()
        }
        Err(e) => {
            if !text.trim().is_empty() {
                warn!(error = %e, "cannot parse section body");
            }
            Vec::new()
        }
    }
}

/// Convert raw records into a typed model; records that do not fit the
/// schema are skipped.
pub fn records<T: DeserializeOwned>(collection: &Collection) -> Vec<T> {
    collection.iter()
        .filter_map(|raw| match serde_json::from_value::<T>(raw.clone()) {
            Ok(r)  => Some(r),
            Err(e) => {
                warn!(error = %e, id = %raw.get("id").and_then(serde_json::Value::as_str).unwrap_or("?"), "skipping record");
                None
            }
        })
        .collect()
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null      => "null",
        Value::Bool(_)   => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_)  => "array",
        Value::Object(_) => "object",
    }
}
