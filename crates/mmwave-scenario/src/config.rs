//! Scenario configuration
//!
//! Every tunable of a run lives in one [`ScenarioConfig`]. It is built once
//! (defaults, a JSON file, or CLI overrides on top of either), validated once,
//! and then only read.

use crate::layout::{LayoutRequest, X_INSET};
use crate::periodicity::ReportPeriodicity;
use crate::timing::check_motion_range;
use crate::topology::DomainSpec;
use crate::{Result, ScenarioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Secondary-cell handover policy of the dual-connected UE
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverMode {
    Threshold,
    FixedTtt,
    DynamicTtt,
}

impl HandoverMode {
    /// Numeric code used by the engine's handover attribute
    pub fn code(self) -> u8 {
        match self {
            Self::Threshold => 1,
            Self::FixedTtt => 2,
            Self::DynamicTtt => 3,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Self::Threshold),
            2 => Ok(Self::FixedTtt),
            3 => Ok(Self::DynamicTtt),
            other => Err(ScenarioError::InvalidConfig(format!(
                "unknown handover mode {}",
                other
            ))),
        }
    }

    pub fn engine_name(self) -> &'static str {
        match self {
            Self::Threshold => "THRESHOLD",
            Self::FixedTtt => "FIXED_TTT",
            Self::DynamicTtt => "DYNAMIC_TTT",
        }
    }
}

impl FromStr for HandoverMode {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code);
        }
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "threshold" => Ok(Self::Threshold),
            "fixed_ttt" => Ok(Self::FixedTtt),
            "dynamic_ttt" => Ok(Self::DynamicTtt),
            _ => Err(ScenarioError::InvalidConfig(format!(
                "unknown handover mode '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for HandoverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.engine_name())
    }
}

/// Packet scheduler used by the multipath transport across paths
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerMode {
    RoundRobin,
    MinRtt,
    Blest,
    Ecf,
    PeekABoo,
}

impl SchedulerMode {
    pub fn code(self) -> u8 {
        match self {
            Self::RoundRobin => 0,
            Self::MinRtt => 1,
            Self::Blest => 2,
            Self::Ecf => 3,
            Self::PeekABoo => 4,
        }
    }
}

impl FromStr for SchedulerMode {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "round_robin" | "rr" => Ok(Self::RoundRobin),
            "min_rtt" => Ok(Self::MinRtt),
            "blest" => Ok(Self::Blest),
            "ecf" => Ok(Self::Ecf),
            "peekaboo" | "peek_a_boo" => Ok(Self::PeekABoo),
            _ => Err(ScenarioError::InvalidConfig(format!(
                "unknown scheduler '{}'",
                s
            ))),
        }
    }
}

/// Complete, immutable description of what to build
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    /// Number of obstacles between the mmWave cells
    pub num_blocks: usize,
    /// Maximum X coordinate of the obstacle area
    pub max_x_axis: f64,
    /// Maximum Y coordinate of the obstacle area
    pub max_y_axis: f64,
    pub max_building_size: f64,
    pub report_table_periodicity: ReportPeriodicity,
    pub ue_initial_position: f64,
    pub ue_final_position: f64,
    /// UE speed in m/s
    pub mobile_speed: f64,
    pub handover_mode: HandoverMode,
    pub scheduler: SchedulerMode,
    /// Use noisy, filtered SINR samples instead of the raw measure
    pub noise_and_filter: bool,
    /// Always use LTE for uplink signalling
    pub lte_uplink: bool,
    pub rlc_am_enabled: bool,
    pub outage_threshold_db: f64,
    /// RLC tx buffer, MB
    pub buffer_size_mb: u32,
    pub inter_packet_interval_us: u32,
    pub x2_latency_us: f64,
    pub mme_latency_us: f64,
    /// Directory the map files are written to
    pub out_path: PathBuf,
    /// Access domains; empty means the two-PLMN preset
    pub domains: Vec<DomainSpec>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 3091,
            num_blocks: 8,
            max_x_axis: 150.0,
            max_y_axis: 40.0,
            max_building_size: 20.0,
            report_table_periodicity: ReportPeriodicity::Us1600,
            ue_initial_position: 90.0,
            ue_final_position: 110.0,
            mobile_speed: 2.0,
            handover_mode: HandoverMode::DynamicTtt,
            scheduler: SchedulerMode::RoundRobin,
            noise_and_filter: false,
            lte_uplink: false,
            rlc_am_enabled: true,
            outage_threshold_db: -5.0,
            buffer_size_mb: 20,
            inter_packet_interval_us: 20,
            x2_latency_us: 500.0,
            mme_latency_us: 10000.0,
            out_path: PathBuf::from("./"),
            domains: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    /// Load a configuration from a JSON file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn layout_request(&self) -> LayoutRequest {
        LayoutRequest::new(
            self.max_x_axis,
            self.max_y_axis,
            self.max_building_size,
            self.num_blocks,
        )
    }

    /// Check every field that does not depend on another component
    pub fn validate(&self) -> Result<()> {
        self.layout_request().validate()?;

        check_motion_range(
            self.ue_initial_position,
            self.ue_final_position,
            self.mobile_speed,
        )?;
        if self.buffer_size_mb == 0 {
            return Err(ScenarioError::InvalidConfig(
                "buffer_size_mb must be at least 1".to_string(),
            ));
        }
        if self.inter_packet_interval_us == 0 {
            return Err(ScenarioError::InvalidConfig(
                "inter_packet_interval_us must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("x2_latency_us", self.x2_latency_us),
            ("mme_latency_us", self.mme_latency_us),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ScenarioError::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if !self.outage_threshold_db.is_finite() {
            return Err(ScenarioError::InvalidConfig(
                "outage_threshold_db must be finite".to_string(),
            ));
        }

        let mut ids: Vec<&str> = self.domains.iter().map(|d| d.id.as_str()).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ScenarioError::InvalidConfig(format!(
                "duplicate domain id '{}'",
                pair[0]
            )));
        }

        Ok(())
    }

    /// Lower x bound of the obstacle sampling area
    pub fn obstacle_area_x_min(&self) -> f64 {
        X_INSET
    }
}
