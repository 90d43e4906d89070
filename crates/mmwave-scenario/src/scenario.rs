//! Scenario assembly
//!
//! [`ScenarioAssembler`] runs the components in a fixed order (layout,
//! periodicity, timing, topology) against one random stream and either
//! returns a complete [`ScenarioDescriptor`] or an error. Nothing partial is
//! ever handed out.

use crate::config::ScenarioConfig;
use crate::engine::EngineParameters;
use crate::geometry::{Obstacle, Position};
use crate::layout::{ObstacleLayoutGenerator, SeededStream, UniformSource};
use crate::periodicity::TransientWindow;
use crate::presets::Presets;
use crate::timing::TimingPlan;
use crate::topology::{DomainSpec, PlannedDomain, RouteEntry, TopologyPlan};
use crate::{Result, ScenarioError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// UE track runs along this street, south of the obstacle area
pub const UE_STREET_Y: f64 = -5.0;
pub const UE_HEIGHT: f64 = 1.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    UserEquipment,
    LteCell,
    MmWaveCell,
}

/// A device placement for the map files and the engine's mobility setup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub kind: DeviceKind,
    /// IMSI for UE devices, cell id for cells
    pub id: u32,
    pub domain_id: String,
    pub position: Position,
}

/// Everything the engine needs to set up one run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDescriptor {
    seed: u64,
    obstacles: Vec<Obstacle>,
    transient: TransientWindow,
    timing: TimingPlan,
    topology: TopologyPlan,
    devices: Vec<Device>,
    engine: EngineParameters,
}

impl ScenarioDescriptor {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn transient(&self) -> &TransientWindow {
        &self.transient
    }

    pub fn timing(&self) -> &TimingPlan {
        &self.timing
    }

    pub fn domains(&self) -> &[PlannedDomain] {
        &self.topology.domains
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.topology.routes
    }

    pub fn topology(&self) -> &TopologyPlan {
        &self.topology
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn engine(&self) -> &EngineParameters {
        &self.engine
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builds scenario descriptors from a validated configuration
#[derive(Clone, Debug)]
pub struct ScenarioAssembler {
    config: ScenarioConfig,
}

impl ScenarioAssembler {
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Domains to plan, falling back to the two-PLMN preset
    fn domain_specs(&self) -> Vec<DomainSpec> {
        if self.config.domains.is_empty() {
            Presets::two_plmn_domains()
        } else {
            self.config.domains.clone()
        }
    }

    /// Assemble using the configured seed
    pub fn assemble(&self) -> Result<ScenarioDescriptor> {
        let mut rng = SeededStream::new(self.config.seed);
        self.assemble_with(&mut rng)
    }

    /// Assemble drawing from a caller-supplied stream
    pub fn assemble_with<R: UniformSource + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<ScenarioDescriptor> {
        let config = &self.config;
        let specs = self.domain_specs();
        check_anchor_area(config, &specs)?;

        let generator = ObstacleLayoutGenerator::new(config.layout_request())?;
        let obstacles = generator.generate(rng)?;

        let transient = config.report_table_periodicity.transient_window();

        let timing = TimingPlan::plan(
            transient.transient_duration_s,
            config.ue_initial_position,
            config.ue_final_position,
            config.mobile_speed,
        )?;

        let topology = TopologyPlan::plan(&specs)?;
        let devices = place_devices(config, &topology.domains);
        let engine = EngineParameters::derive(config, &transient, &timing);

        info!(
            "Assembled scenario: {} obstacles, {} domains, {} routes, sim time {} s",
            obstacles.len(),
            topology.domains.len(),
            topology.routes.len(),
            timing.total_sim_time_s
        );

        Ok(ScenarioDescriptor {
            seed: config.seed,
            obstacles,
            transient,
            timing,
            topology,
            devices,
            engine,
        })
    }
}

/// The obstacle sampling area and the UE track must sit between the cell sites.
///
/// Only the region obstacle origins are drawn from is checked:
/// `[inset, max_x_axis] x [0, max_y_axis]` may not extend past the farthest
/// anchor in x nor reach the nearest anchor row in y. A placed footprint can
/// still grow past it by up to `max_building_size` on either axis. The UE
/// track has to lie within the anchors' x extent.
fn check_anchor_area(config: &ScenarioConfig, specs: &[DomainSpec]) -> Result<()> {
    let anchors: Vec<&Position> = specs.iter().flat_map(|s| s.anchors.iter()).collect();
    if anchors.is_empty() {
        debug!("No anchors given, skipping anchor area check");
        return Ok(());
    }

    let min_x = anchors.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = anchors.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = anchors.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);

    if config.max_x_axis > max_x {
        return Err(ScenarioError::PlacementOutsideAnchors(format!(
            "obstacle area reaches x = {} beyond the last anchor at x = {}",
            config.max_x_axis, max_x
        )));
    }
    if config.max_y_axis >= min_y {
        return Err(ScenarioError::PlacementOutsideAnchors(format!(
            "obstacle area reaches y = {} at or beyond the anchor row at y = {}",
            config.max_y_axis, min_y
        )));
    }
    if config.ue_initial_position < min_x || config.ue_final_position > max_x {
        return Err(ScenarioError::PlacementOutsideAnchors(format!(
            "UE track {}..{} leaves the anchor span {}..{}",
            config.ue_initial_position, config.ue_final_position, min_x, max_x
        )));
    }

    debug!(
        "Obstacle area [{}, {}] x [0, {}] within anchors x {}..{}, y >= {}",
        config.obstacle_area_x_min(),
        config.max_x_axis,
        config.max_y_axis,
        min_x,
        max_x,
        min_y
    );
    Ok(())
}

/// One UE device per domain at the start of the track, then every cell.
/// The first anchor of a domain is its LTE cell, the rest are mmWave cells.
fn place_devices(config: &ScenarioConfig, domains: &[PlannedDomain]) -> Vec<Device> {
    let ue_position = Position::new(config.ue_initial_position, UE_STREET_Y, UE_HEIGHT);
    let mut devices = Vec::new();

    for (index, domain) in domains.iter().enumerate() {
        devices.push(Device {
            kind: DeviceKind::UserEquipment,
            id: index as u32 + 1,
            domain_id: domain.id.clone(),
            position: ue_position,
        });
    }

    let mut cell_id = 1;
    for domain in domains {
        for (index, anchor) in domain.anchors.iter().enumerate() {
            let kind = if index == 0 {
                DeviceKind::LteCell
            } else {
                DeviceKind::MmWaveCell
            };
            devices.push(Device {
                kind,
                id: cell_id,
                domain_id: domain.id.clone(),
                position: *anchor,
            });
            cell_id += 1;
        }
    }
    devices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::RouteDirection;

    #[test]
    fn test_default_assembly() {
        let descriptor = ScenarioAssembler::new(ScenarioConfig::default())
            .unwrap()
            .assemble()
            .unwrap();

        assert_eq!(descriptor.seed(), 3091);
        assert_eq!(descriptor.obstacles().len(), 8);
        assert_eq!(descriptor.transient().window_length, 150);
        assert!((descriptor.timing().total_sim_time_s - 11.24).abs() < 1e-9);
        assert_eq!(descriptor.domains().len(), 2);
        assert_eq!(descriptor.routes().len(), 4);
        assert_eq!(descriptor.engine().crt_period_us, 1600);
    }

    #[test]
    fn test_devices() {
        let descriptor = ScenarioAssembler::new(ScenarioConfig::default())
            .unwrap()
            .assemble()
            .unwrap();
        let devices = descriptor.devices();

        let ues: Vec<_> = devices
            .iter()
            .filter(|d| d.kind == DeviceKind::UserEquipment)
            .collect();
        assert_eq!(ues.len(), 2);
        assert_eq!(ues[0].position, Position::new(90.0, -5.0, 1.6));

        let cell_ids: Vec<u32> = devices
            .iter()
            .filter(|d| d.kind != DeviceKind::UserEquipment)
            .map(|d| d.id)
            .collect();
        assert_eq!(cell_ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            devices.iter().filter(|d| d.kind == DeviceKind::LteCell).count(),
            2
        );
    }

    #[test]
    fn test_area_beyond_anchors_rejected() {
        let config = ScenarioConfig {
            max_x_axis: 200.0,
            ..ScenarioConfig::default()
        };
        let err = ScenarioAssembler::new(config).unwrap().assemble().unwrap_err();
        assert!(matches!(err, ScenarioError::PlacementOutsideAnchors(_)));

        let config = ScenarioConfig {
            max_y_axis: 60.0,
            ..ScenarioConfig::default()
        };
        let err = ScenarioAssembler::new(config).unwrap().assemble().unwrap_err();
        assert!(matches!(err, ScenarioError::PlacementOutsideAnchors(_)));
    }

    #[test]
    fn test_ue_track_outside_anchors_rejected() {
        let config = ScenarioConfig {
            ue_initial_position: 10.0,
            ..ScenarioConfig::default()
        };
        let err = ScenarioAssembler::new(config).unwrap().assemble().unwrap_err();
        assert!(matches!(err, ScenarioError::PlacementOutsideAnchors(_)));
    }

    #[test]
    fn test_overlapping_domains_abort_assembly() {
        let mut second = Presets::secondary_plmn();
        second.ue_pool = Presets::primary_plmn().ue_pool;
        let config = ScenarioConfig {
            domains: vec![Presets::primary_plmn(), second],
            ..ScenarioConfig::default()
        };

        let err = ScenarioAssembler::new(config).unwrap().assemble().unwrap_err();
        assert!(matches!(err, ScenarioError::OverlappingAddressSpace { .. }));
    }

    #[test]
    fn test_motion_errors_rejected_by_assembler() {
        let reversed = ScenarioConfig {
            ue_initial_position: 110.0,
            ue_final_position: 90.0,
            ..ScenarioConfig::default()
        };
        let stopped = ScenarioConfig {
            mobile_speed: 0.0,
            ..ScenarioConfig::default()
        };
        let backwards = ScenarioConfig {
            mobile_speed: -2.0,
            ..ScenarioConfig::default()
        };

        for config in [reversed, stopped, backwards] {
            let err = ScenarioAssembler::new(config).unwrap_err();
            assert!(matches!(err, ScenarioError::InvalidMotionRange { .. }));
        }
    }

    #[test]
    fn test_huge_block_count_is_infeasible() {
        // The second obstacle has nowhere to go, so the count is never reached
        let config = ScenarioConfig {
            num_blocks: usize::MAX / 8,
            max_x_axis: 30.0,
            max_y_axis: 0.0,
            ..ScenarioConfig::default()
        };
        let err = ScenarioAssembler::new(config).unwrap().assemble().unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::LayoutInfeasible {
                index: 1,
                attempts: 100
            }
        ));
    }

    #[test]
    fn test_obstacle_origins_sampled_inside_anchor_area() {
        for seed in 0..50 {
            let config = ScenarioConfig {
                seed,
                ..ScenarioConfig::default()
            };
            let descriptor = ScenarioAssembler::new(config).unwrap().assemble().unwrap();

            for obstacle in descriptor.obstacles() {
                let b = obstacle.bounds;
                assert!(b.x_min >= 30.0 && b.x_min <= 150.0);
                assert!(b.y_min >= 0.0 && b.y_min < 60.0);
                // Footprints grow from their origin by at most the building size
                assert!(b.x_max <= 150.0 + 20.0);
                assert!(b.y_max <= 40.0 + 20.0);
            }
        }
    }

    #[test]
    fn test_domains_without_anchors_skip_area_check() {
        let config = ScenarioConfig {
            max_x_axis: 500.0,
            domains: vec![DomainSpec::new(
                "lab",
                "10.1.0.0/16".parse().unwrap(),
                "10.2.0.0/16".parse().unwrap(),
            )],
            ..ScenarioConfig::default()
        };
        let descriptor = ScenarioAssembler::new(config).unwrap().assemble().unwrap();

        assert_eq!(descriptor.routes().len(), 2);
        assert_eq!(
            descriptor
                .routes()
                .iter()
                .filter(|r| r.direction == RouteDirection::EndpointToPeer)
                .count(),
            1
        );
        assert_eq!(descriptor.devices().len(), 1);
    }
}
