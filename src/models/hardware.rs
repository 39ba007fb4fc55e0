use super::{lenient, null_as_default};
use crate::util::human::fmt_bytes;
use serde::Deserialize;
use serde_json::Value;

/// One hardware component: enclosure, node, drive, fan, SFP, ...
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hardware {
    pub id:              String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name:            String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind:            String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slot:            i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub appliance_id:    String,
    #[serde(default)]
    pub parent_id:       Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
    #[serde(default)]
    pub stale_state:     Option<String>,
    #[serde(default)]
    pub serial_number:   Option<String>,
    #[serde(default)]
    pub extra_details:   Value,
}

impl Hardware {
    pub fn is_healthy(&self) -> bool {
        self.lifecycle_state.as_deref() == Some("Healthy")
    }

    pub fn is_stale(&self) -> bool {
        self.stale_state.as_deref() != Some("Not_Stale")
    }

    /// Slots that report nothing at all, or an empty bay, are not monitored.
    pub fn is_populated(&self) -> bool {
        matches!(self.lifecycle_state.as_deref(), Some(s) if s != "Empty")
    }

    pub fn state_label(&self) -> &str {
        self.lifecycle_state.as_deref().unwrap_or("unknown")
    }

    /// Type specific detail block taken from `extra_details`.
    pub fn details(&self) -> HardwareDetails {
        fn take<T: for<'de> Deserialize<'de> + Default>(v: &Value) -> T {
            serde_json::from_value(v.clone()).unwrap_or_default()
        }
        match self.kind.as_str() {
            "Drive"     => HardwareDetails::Drive(take(&self.extra_details)),
            "Node"      => HardwareDetails::Node(take(&self.extra_details)),
            "IO_Module" => HardwareDetails::IoModule(take(&self.extra_details)),
            "SFP"       => HardwareDetails::Sfp(take(&self.extra_details)),
            _           => HardwareDetails::Other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriveDetails {
    #[serde(deserialize_with = "lenient")]
    pub drive_type:       Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub size:             Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub firmware_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeDetails {
    #[serde(deserialize_with = "lenient")]
    pub cpu_model: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub cpu_cores: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IoModuleDetails {
    #[serde(deserialize_with = "lenient")]
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SfpDetails {
    #[serde(deserialize_with = "lenient")]
    pub connector_type:     Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub mode:               Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub supported_protocol: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub speed:              Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HardwareDetails {
    Drive(DriveDetails),
    Node(NodeDetails),
    IoModule(IoModuleDetails),
    Sfp(SfpDetails),
    Other,
}

fn or_unknown(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("unknown")
}

impl HardwareDetails {
    /// One-line rendering, `None` for types without extra details.
    pub fn describe(&self) -> Option<String> {
        match self {
            HardwareDetails::Drive(d) => Some(format!(
                "Drive type: {}, Size: {}, Firmware: {}",
                or_unknown(&d.drive_type),
                d.size.map(fmt_bytes).unwrap_or_else(|| "unknown".into()),
                or_unknown(&d.firmware_version),
            )),
            HardwareDetails::Node(n) => Some(format!(
                "CPU: {}, Cores: {}",
                or_unknown(&n.cpu_model),
                n.cpu_cores.map(|c| c.to_string()).unwrap_or_else(|| "unknown".into()),
            )),
            HardwareDetails::IoModule(m) => Some(format!("Model: {}", or_unknown(&m.model_name))),
            HardwareDetails::Sfp(s) => Some(format!(
                "Connector: {}, Mode: {}, Protocol: {}, Speed: {}",
                or_unknown(&s.connector_type),
                or_unknown(&s.mode),
                or_unknown(&s.supported_protocol),
                or_unknown(&s.speed),
            )),
            HardwareDetails::Other => None,
        }
    }
}
