//! Scenario construction for dual-PLMN mmWave multipath experiments
//!
//! This crate derives everything an external network simulator needs before
//! its timed run starts: a non-overlapping obstacle layout, the timing plan
//! implied by the report-table periodicity and the UE track, and the address
//! and static-route plan that gives one multi-homed UE a separate path to the
//! remote host through every access domain.
//!
//! All construction is synchronous and happens once. A single seeded random
//! stream is consumed in a fixed order, so the same configuration always
//! yields the same [`ScenarioDescriptor`].

pub mod config;
pub mod engine;
pub mod geometry;
pub mod layout;
pub mod mapfile;
pub mod periodicity;
pub mod presets;
pub mod scenario;
pub mod timing;
pub mod topology;

// Re-export commonly used types
pub use config::{HandoverMode, ScenarioConfig, SchedulerMode};
pub use engine::EngineParameters;
pub use geometry::{BoxBounds, Obstacle, Position};
pub use layout::{LayoutRequest, ObstacleLayoutGenerator, SeededStream, UniformSource};
pub use periodicity::{ReportPeriodicity, TransientWindow};
pub use presets::Presets;
pub use scenario::{Device, DeviceKind, ScenarioAssembler, ScenarioDescriptor};
pub use timing::{MotionEvent, TimingPlan};
pub use topology::{
    DomainSpec, LinkParams, PlannedDomain, RouteDirection, RouteEntry, TopologyPlan,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Could not place obstacle {index} after {attempts} attempts, area too dense")]
    LayoutInfeasible { index: usize, attempts: u32 },

    #[error("Unrecognized report table periodicity: {0} us")]
    UnrecognizedConfiguration(u32),

    #[error("Invalid motion range: initial {initial}, final {final_position}, speed {speed}")]
    InvalidMotionRange {
        initial: f64,
        final_position: f64,
        speed: f64,
    },

    #[error("Address pools overlap: {first} ({first_domain}) and {second} ({second_domain})")]
    OverlappingAddressSpace {
        first_domain: String,
        first: ipnetwork::Ipv4Network,
        second_domain: String,
        second: ipnetwork::Ipv4Network,
    },

    #[error("Obstacle area does not fit between the anchors: {0}")]
    PlacementOutsideAnchors(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
