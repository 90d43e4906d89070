//! Attribute values the simulation engine applies before the run
//!
//! These are derived, not tuned: each one follows from the configuration,
//! the transient window and the timing plan.

use crate::config::{HandoverMode, ScenarioConfig, SchedulerMode};
use crate::periodicity::TransientWindow;
use crate::timing::TimingPlan;
use serde::{Deserialize, Serialize};

/// Time-to-trigger used when the handover mode is `FixedTtt`, ms
pub const FIXED_TTT_MS: u32 = 150;

/// S1-U link delay, us
pub const S1U_LATENCY_US: f64 = 1000.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineParameters {
    /// Period of the central report table, us
    pub crt_period_us: u32,
    pub sinr_update_period_us: u32,
    /// Samples discarded before the filter output is used, us
    pub transient_us: u64,
    pub noise_and_filter: bool,
    pub outage_threshold_db: f64,
    pub handover_mode: HandoverMode,
    pub fixed_ttt_ms: u32,
    pub lte_uplink: bool,
    pub rlc_am_enabled: bool,
    pub rlc_buffer_bytes: u64,
    pub x2_latency_us: f64,
    pub s1ap_latency_us: f64,
    pub s1u_latency_us: f64,
    pub scheduler: SchedulerMode,
    pub inter_packet_interval_us: u32,
    pub app_start_s: f64,
    pub client_stop_s: f64,
    pub engine_stop_s: f64,
}

impl EngineParameters {
    pub fn derive(config: &ScenarioConfig, window: &TransientWindow, timing: &TimingPlan) -> Self {
        let periodicity = window.periodicity.as_micros();
        Self {
            crt_period_us: periodicity,
            sinr_update_period_us: periodicity,
            transient_us: window.vector_transient_us,
            noise_and_filter: config.noise_and_filter,
            outage_threshold_db: config.outage_threshold_db,
            handover_mode: config.handover_mode,
            fixed_ttt_ms: FIXED_TTT_MS,
            lte_uplink: config.lte_uplink,
            rlc_am_enabled: config.rlc_am_enabled,
            rlc_buffer_bytes: u64::from(config.buffer_size_mb) * 1024 * 1024,
            x2_latency_us: config.x2_latency_us,
            s1ap_latency_us: config.mme_latency_us,
            s1u_latency_us: S1U_LATENCY_US,
            scheduler: config.scheduler,
            inter_packet_interval_us: config.inter_packet_interval_us,
            app_start_s: timing.transient_duration_s,
            client_stop_s: timing.movement_stop_s,
            engine_stop_s: timing.total_sim_time_s,
        }
    }

    /// Flatten into `(attribute path, value)` pairs in application order
    pub fn attributes(&self) -> Vec<(String, String)> {
        let mut attrs = vec![
            ("LteEnbRrc::SecondaryCellHandoverMode", self.handover_mode.engine_name().to_string()),
            ("LteEnbRrc::FixedTttValue", self.fixed_ttt_ms.to_string()),
            ("LteEnbRrc::CrtPeriod", self.crt_period_us.to_string()),
            ("LteEnbRrc::OutageThreshold", self.outage_threshold_db.to_string()),
            ("MmWaveEnbPhy::UpdateSinrEstimatePeriod", self.sinr_update_period_us.to_string()),
            ("MmWaveEnbPhy::Transient", self.transient_us.to_string()),
            ("MmWaveEnbPhy::NoiseAndFilter", self.noise_and_filter.to_string()),
            ("McUePdcp::LteUplink", self.lte_uplink.to_string()),
            ("MmWaveHelper::RlcAmEnabled", self.rlc_am_enabled.to_string()),
            ("MmWavePointToPointEpcHelper::X2LinkDelay", format!("{}us", self.x2_latency_us)),
            ("MmWavePointToPointEpcHelper::S1apLinkDelay", format!("{}us", self.s1ap_latency_us)),
            ("MmWavePointToPointEpcHelper::S1uLinkDelay", format!("{}us", self.s1u_latency_us)),
            ("MpQuicScheduler::SchedulerType", self.scheduler.code().to_string()),
        ];
        for buffer in [
            "LteRlcUm::MaxTxBufferSize",
            "LteRlcUmLowLat::MaxTxBufferSize",
            "LteRlcAm::MaxTxBufferSize",
        ] {
            attrs.push((buffer, self.rlc_buffer_bytes.to_string()));
        }
        attrs
            .into_iter()
            .map(|(path, value)| (format!("ns3::{}", path), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periodicity::ReportPeriodicity;

    fn derived(config: &ScenarioConfig) -> EngineParameters {
        let window = config.report_table_periodicity.transient_window();
        let timing = TimingPlan::plan(
            window.transient_duration_s,
            config.ue_initial_position,
            config.ue_final_position,
            config.mobile_speed,
        )
        .unwrap();
        EngineParameters::derive(config, &window, &timing)
    }

    #[test]
    fn test_derived_from_defaults() {
        let params = derived(&ScenarioConfig::default());

        assert_eq!(params.crt_period_us, 1600);
        assert_eq!(params.transient_us, 240_000);
        assert_eq!(params.rlc_buffer_bytes, 20 * 1024 * 1024);
        assert_eq!(params.app_start_s, 0.24);
        assert!((params.engine_stop_s - 11.24).abs() < 1e-9);
        assert!((params.client_stop_s - 10.24).abs() < 1e-9);
    }

    #[test]
    fn test_attributes_follow_periodicity() {
        let config = ScenarioConfig {
            report_table_periodicity: ReportPeriodicity::Us25600,
            ..ScenarioConfig::default()
        };
        let attrs = derived(&config).attributes();

        let lookup = |name: &str| {
            attrs
                .iter()
                .find(|(path, _)| path == name)
                .map(|(_, value)| value.clone())
        };
        assert_eq!(lookup("ns3::LteEnbRrc::CrtPeriod").as_deref(), Some("25600"));
        assert_eq!(lookup("ns3::MmWaveEnbPhy::Transient").as_deref(), Some("1280000"));
        assert_eq!(
            lookup("ns3::LteEnbRrc::SecondaryCellHandoverMode").as_deref(),
            Some("DYNAMIC_TTT")
        );
        assert_eq!(lookup("ns3::LteRlcAm::MaxTxBufferSize").as_deref(), Some("20971520"));
    }
}
