//! Preset domains and configurations
//!
//! The two-PLMN layout mirrors a dual-EPC deployment: each PLMN has its own
//! UE pool, its own core network pools and its own link to the remote host,
//! and its cells sit on a row north of the street the UE drives along.

use crate::config::ScenarioConfig;
use crate::geometry::Position;
use crate::periodicity::ReportPeriodicity;
use crate::topology::{DomainSpec, LinkParams};
use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;

/// Height of the cell antennas
pub const CELL_HEIGHT: f64 = 3.0;

fn slash8(first_octet: u8) -> Ipv4Network {
    // A /8 on an aligned base address is always valid
    Ipv4Network::new(Ipv4Addr::new(first_octet, 0, 0, 0), 8)
        .unwrap_or_else(|_| unreachable!("prefix 8 is within range"))
}

/// Domain with an LTE anchor co-located with the first of two mmWave cells
fn plmn(id: &str, ue: u8, link: u8, core: [u8; 3], row_y: f64) -> DomainSpec {
    let first_cell = Position::new(50.0, row_y, CELL_HEIGHT);
    let second_cell = Position::new(150.0, row_y, CELL_HEIGHT);

    let mut spec = DomainSpec::new(id, slash8(ue), slash8(link)).link_params(LinkParams::default());
    for octet in core {
        spec = spec.core_pool(slash8(octet));
    }
    spec.anchor(first_cell).anchor(first_cell).anchor(second_cell)
}

/// Named preset collections
pub struct Presets;

impl Presets {
    /// Primary PLMN: UE pool 7/8, X2 12/8, S1-AP 11/8, S1-U 10/8, host link 1/8
    pub fn primary_plmn() -> DomainSpec {
        plmn("plmn1", 7, 1, [12, 11, 10], 70.0)
    }

    /// Second PLMN: UE pool 8/8, X2 15/8, S1-AP 16/8, S1-U 17/8, host link 2/8
    pub fn secondary_plmn() -> DomainSpec {
        plmn("plmn2", 8, 2, [15, 16, 17], 60.0)
    }

    pub fn two_plmn_domains() -> Vec<DomainSpec> {
        vec![Self::primary_plmn(), Self::secondary_plmn()]
    }

    pub fn single_plmn_domains() -> Vec<DomainSpec> {
        vec![Self::primary_plmn()]
    }

    /// All named configurations, in listing order
    pub fn all() -> Vec<(&'static str, &'static str, ScenarioConfig)> {
        vec![
            (
                "two_plmn",
                "Two PLMNs, 8 obstacles, 1600 us report tables",
                ScenarioConfig {
                    domains: Self::two_plmn_domains(),
                    ..ScenarioConfig::default()
                },
            ),
            (
                "single_plmn",
                "One PLMN baseline, single path to the remote host",
                ScenarioConfig {
                    domains: Self::single_plmn_domains(),
                    ..ScenarioConfig::default()
                },
            ),
            (
                "dense_blocks",
                "Two PLMNs with 16 obstacles between the cells",
                ScenarioConfig {
                    num_blocks: 16,
                    domains: Self::two_plmn_domains(),
                    ..ScenarioConfig::default()
                },
            ),
            (
                "slow_reports",
                "Two PLMNs with 25600 us report tables",
                ScenarioConfig {
                    report_table_periodicity: ReportPeriodicity::Us25600,
                    domains: Self::two_plmn_domains(),
                    ..ScenarioConfig::default()
                },
            ),
        ]
    }

    pub fn by_name(name: &str) -> Option<ScenarioConfig> {
        Self::all()
            .into_iter()
            .find(|(preset, _, _)| *preset == name)
            .map(|(_, _, config)| config)
    }
}
