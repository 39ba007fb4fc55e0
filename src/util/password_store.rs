use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

/// Resolve a `ID:PATH` reference against a plain-text store whose lines
/// read `ID:SECRET`.
pub fn lookup(reference: &str) -> Result<String> {
    let (id, path) = reference.split_once(':')
        .ok_or_else(|| anyhow!("password reference must look like ID:PATH, got {:?}", reference))?;
    lookup_in(Path::new(path), id)
}

pub fn lookup_in(path: &Path, id: &str) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read password store {}", path.display()))?;
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| *key == id)
        .map(|(_, secret)| secret.to_string())
        .ok_or_else(|| anyhow!("password {:?} not found in {}", id, path.display()))
}
