use serde::Deserialize;

/// One appliance (node pair) of the cluster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Appliance {
    pub id:          String,
    #[serde(default)]
    pub name:        Option<String>,
    #[serde(default)]
    pub model:       Option<String>,
    #[serde(default)]
    pub node_count:  Option<u32>,
    #[serde(default)]
    pub service_tag: Option<String>,
}
