//! Evaluators turning parsed sections into services and verdicts.

pub mod appliance;
pub mod df;
pub mod hardware;
pub mod levels;
pub mod performance;
pub mod space;
pub mod volume;

use crate::models::appliance::Appliance;
use crate::models::hardware::Hardware;
use crate::models::metrics::{PerformanceSample, SpaceSample};
use crate::models::volume::Volume;
use crate::util::section::{parse_collection, records, split_sections};
use crate::verdict::Verdict;
use df::FilesystemLevels;
use levels::LevelsPredictor;
use space::SpaceParams;

/// Typed view of one agent dump. Every section is validated here once.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    pub appliances:  Vec<Appliance>,
    pub hardware:    Vec<Hardware>,
    pub volumes:     Vec<Volume>,
    pub performance: Vec<PerformanceSample>,
    pub space:       Vec<SpaceSample>,
}

impl Sections {
    pub fn from_dump(dump: &str) -> Self {
        let raw = split_sections(dump);
        let typed = |name: &str| raw.get(name).map(|lines| parse_collection(lines)).unwrap_or_default();
        Self {
            appliances:  records(&typed("appliance")),
            hardware:    records(&typed("hardware")),
            volumes:     records(&typed("volume")),
            performance: records(&typed("performance_metrics_by_appliance")),
            space:       records(&typed("space_metrics_by_appliance")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Service {
    Appliance { id: String },
    Hardware { ids: Vec<String> },
    HardwarePath { path: String },
    Performance { appliance_id: String },
    Space { appliance_id: String },
    Volume { item: String, volume_id: String },
}

impl Service {
    pub fn name(&self) -> String {
        match self {
            Service::Appliance { id }               => format!("Appliance {}", id),
            Service::Hardware { .. }                => "Hardware".to_string(),
            Service::HardwarePath { path }          => format!("Hardware {}", path),
            Service::Performance { appliance_id }   => format!("Performance {}", appliance_id),
            Service::Space { appliance_id }         => format!("Space {}", appliance_id),
            Service::Volume { item, .. }            => format!("Volume {}", item),
        }
    }
}

/// Thresholds and the prediction source used by the evaluators.
pub struct CheckParams<'a> {
    pub space:     &'a SpaceParams,
    pub volume:    &'a FilesystemLevels,
    pub predictor: &'a dyn LevelsPredictor,
}

pub fn discover(sections: &Sections) -> Vec<Service> {
    let mut services: Vec<Service> = Vec::new();
    services.extend(appliance::discover(&sections.appliances).into_iter().map(|id| Service::Appliance { id }));
    if let Some(ids) = hardware::discover_ids(&sections.hardware) {
        services.push(Service::Hardware { ids });
    }
    services.extend(hardware::discover_paths(&sections.hardware).into_iter().map(|path| Service::HardwarePath { path }));
    services.extend(performance::discover(&sections.performance).into_iter().map(|appliance_id| Service::Performance { appliance_id }));
    services.extend(space::discover(&sections.space).into_iter().map(|appliance_id| Service::Space { appliance_id }));
    services.extend(volume::discover(&sections.volumes).into_iter().map(|(item, volume_id)| Service::Volume { item, volume_id }));
    services
}

pub fn evaluate(service: &Service, sections: &Sections, params: &CheckParams<'_>) -> Verdict {
    match service {
        Service::Appliance { id }             => appliance::check(id, &sections.appliances),
        Service::Hardware { ids }             => hardware::check_ids(ids, &sections.hardware),
        Service::HardwarePath { path }        => hardware::check_path(path, &sections.hardware),
        Service::Performance { appliance_id } => performance::check(appliance_id, &sections.performance),
        Service::Space { appliance_id }       => space::check(appliance_id, params.space, params.predictor, &sections.space),
        Service::Volume { volume_id, .. }     => volume::check(volume_id, params.volume, &sections.volumes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::State;
    use levels::NoPrediction;

    const DUMP: &str = r#"<<<check_mk:sep(32)>>>
Version: 0.1.0
AgentOS: PowerStore REST API 3.6.0.0
<<<appliance>>>
[{"id":"A1","name":"PS-A","model":"PowerStore 500T","node_count":2,"service_tag":"XYZ"}]
<<<hardware>>>
[{"id":"be","name":"BaseEnclosure","type":"Base_Enclosure","slot":0,"appliance_id":"A1","parent_id":null,"lifecycle_state":"Healthy","stale_state":"Not_Stale"},{"id":"f0","name":"BaseEnclosure-Fan0","type":"Fan","slot":0,"appliance_id":"A1","parent_id":"be","lifecycle_state":"Failed","stale_state":"Not_Stale"}]
<<<volume>>>
[{"id":"v1","name":"db","type":"Primary","appliance_id":"A1","state":"Ready","size":1073741824,"logical_used":104857600}]
<<<space_metrics_by_appliance>>>
[{"appliance_id":"A1","physical_total":1000,"physical_used":100,"data_reduction":2.0}]
<<<performance_metrics_by_appliance>>>
this is not json
"#;

    #[test]
    fn discovers_services_from_dump() {
        let sections = Sections::from_dump(DUMP);
        let names: Vec<String> = discover(&sections).iter().map(Service::name).collect();
        assert_eq!(names, vec![
            "Appliance A1",
            "Hardware",
            "Hardware A1",
            "Hardware A1/Fan:00",
            "Space A1",
            "Volume A1 db",
        ]);
    }

    #[test]
    fn evaluates_every_service() {
        let sections = Sections::from_dump(DUMP);
        let space = SpaceParams::default();
        let volume = FilesystemLevels::default();
        let params = CheckParams { space: &space, volume: &volume, predictor: &NoPrediction };
        let states: Vec<State> = discover(&sections).iter()
            .map(|s| evaluate(s, &sections, &params).state)
            .collect();
        assert_eq!(states, vec![State::Ok, State::Crit, State::Ok, State::Crit, State::Ok, State::Ok]);
    }

    #[test]
    fn service_from_previous_poll_is_unknown_when_gone() {
        let sections = Sections::from_dump("<<<appliance>>>\n[]\n");
        let space = SpaceParams::default();
        let volume = FilesystemLevels::default();
        let params = CheckParams { space: &space, volume: &volume, predictor: &NoPrediction };
        for service in [
            Service::Appliance { id: "A1".into() },
            Service::Performance { appliance_id: "A1".into() },
            Service::Space { appliance_id: "A1".into() },
            Service::Volume { item: "A1 db".into(), volume_id: "v1".into() },
            Service::HardwarePath { path: "A1".into() },
        ] {
            assert_eq!(evaluate(&service, &sections, &params).state, State::Unknown);
        }
        let hw = evaluate(&Service::Hardware { ids: vec!["be".into()] }, &sections, &params);
        assert_eq!(hw.state, State::Crit);
    }
}
