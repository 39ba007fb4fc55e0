use super::null_as_default;
use serde::Deserialize;

/// One block volume.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Volume {
    pub id:           String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name:         String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind:         String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub appliance_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state:        String,
    /// Provisioned size in bytes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub size:         u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub logical_used: u64,
}

impl Volume {
    pub fn is_primary(&self) -> bool {
        self.kind == "Primary"
    }

    /// Service item: appliance id and volume name.
    pub fn item(&self) -> String {
        format!("{} {}", self.appliance_id, self.name)
    }

    pub fn free(&self) -> u64 {
        self.size.saturating_sub(self.logical_used)
    }
}
