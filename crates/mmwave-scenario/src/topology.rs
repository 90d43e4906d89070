//! Address and static-route plan for a multi-homed UE
//!
//! Every access domain gets its own UE address pool, its own gateway and a
//! point-to-point link between its packet gateway and the remote host. The
//! UE reaches the host through each domain with a host route on that
//! domain's interface; the host answers with a network route back to the
//! domain's UE pool over the matching link. With `k` domains the UE ends up
//! with `k` disjoint paths to the same host.

use crate::geometry::Position;
use crate::{Result, ScenarioError};
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use tracing::{debug, info};

/// Point-to-point link between a domain gateway and the remote host
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkParams {
    pub latency_ms: f64,
    pub capacity_gbps: f64,
    pub mtu: u32,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            latency_ms: 10.0,
            capacity_gbps: 100.0,
            mtu: 2500,
        }
    }
}

/// One access domain (PLMN) as requested by the caller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainSpec {
    pub id: String,
    /// Pool the UE's interface address is taken from
    pub ue_pool: Ipv4Network,
    /// Pool of the gateway <-> remote host link
    pub link_pool: Ipv4Network,
    /// Core network pools (X2, S1-AP, S1-U); they only take part in the overlap check
    #[serde(default)]
    pub core_pools: Vec<Ipv4Network>,
    pub link: LinkParams,
    /// Cell sites: the LTE anchor first, then the mmWave cells
    #[serde(default)]
    pub anchors: Vec<Position>,
}

impl DomainSpec {
    pub fn new(id: impl Into<String>, ue_pool: Ipv4Network, link_pool: Ipv4Network) -> Self {
        Self {
            id: id.into(),
            ue_pool,
            link_pool,
            core_pools: Vec::new(),
            link: LinkParams::default(),
            anchors: Vec::new(),
        }
    }

    pub fn core_pool(mut self, pool: Ipv4Network) -> Self {
        self.core_pools.push(pool);
        self
    }

    pub fn link_params(mut self, link: LinkParams) -> Self {
        self.link = link;
        self
    }

    pub fn anchor(mut self, position: Position) -> Self {
        self.anchors.push(position);
        self
    }

    fn pools(&self) -> impl Iterator<Item = Ipv4Network> + '_ {
        [self.ue_pool, self.link_pool]
            .into_iter()
            .chain(self.core_pools.iter().copied())
    }

    /// Gateway the UE uses inside this domain (first host of the UE pool)
    pub fn gateway(&self) -> Result<Ipv4Addr> {
        nth_host(&self.ue_pool, 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteDirection {
    EndpointToPeer,
    PeerToEndpoint,
}

impl fmt::Display for RouteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndpointToPeer => write!(f, "endpoint->peer"),
            Self::PeerToEndpoint => write!(f, "peer->endpoint"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub domain_id: String,
    /// Host routes carry a /32, network routes the whole pool
    pub destination: Ipv4Network,
    /// `None` for routes that leave directly on the interface
    pub next_hop: Option<Ipv4Addr>,
    pub interface_index: u32,
    pub direction: RouteDirection,
}

/// Addresses and link data allocated for one domain
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedDomain {
    pub id: String,
    pub ue_pool: Ipv4Network,
    pub ue_address: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub link_pool: Ipv4Network,
    /// Gateway side of the link to the remote host
    pub link_gateway_address: Ipv4Addr,
    /// Remote host side of the link
    pub peer_address: Ipv4Addr,
    pub link: LinkParams,
    /// Interface index on the UE and on the remote host used for this domain
    pub interface_index: u32,
    pub anchors: Vec<Position>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyPlan {
    pub domains: Vec<PlannedDomain>,
    pub routes: Vec<RouteEntry>,
}

impl TopologyPlan {
    pub fn plan(specs: &[DomainSpec]) -> Result<Self> {
        if specs.is_empty() {
            return Err(ScenarioError::InvalidConfig(
                "at least one access domain is required".to_string(),
            ));
        }
        check_disjoint(specs)?;

        // Allocate everything before emitting a single route
        let mut domains = Vec::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            // Interface 0 is loopback on both nodes
            let interface_index = position as u32 + 1;
            let planned = PlannedDomain {
                id: spec.id.clone(),
                ue_pool: spec.ue_pool,
                ue_address: nth_host(&spec.ue_pool, 2)?,
                gateway: spec.gateway()?,
                link_pool: spec.link_pool,
                link_gateway_address: nth_host(&spec.link_pool, 1)?,
                peer_address: nth_host(&spec.link_pool, 2)?,
                link: spec.link,
                interface_index,
                anchors: spec.anchors.clone(),
            };
            debug!(
                "Domain {}: ue {} gateway {} link {} <-> {} on if {}",
                planned.id,
                planned.ue_address,
                planned.gateway,
                planned.link_gateway_address,
                planned.peer_address,
                interface_index
            );
            domains.push(planned);
        }

        let mut routes = Vec::with_capacity(domains.len() * 2);
        for domain in &domains {
            routes.push(RouteEntry {
                domain_id: domain.id.clone(),
                destination: host_network(domain.peer_address),
                next_hop: Some(domain.gateway),
                interface_index: domain.interface_index,
                direction: RouteDirection::EndpointToPeer,
            });
            routes.push(RouteEntry {
                domain_id: domain.id.clone(),
                destination: domain.ue_pool,
                next_hop: None,
                interface_index: domain.interface_index,
                direction: RouteDirection::PeerToEndpoint,
            });
        }

        for route in &routes {
            info!(
                "Route [{}] {} {} via {:?} if {}",
                route.domain_id,
                route.direction,
                route.destination,
                route.next_hop,
                route.interface_index
            );
        }

        Ok(Self { domains, routes })
    }

    pub fn routes_in(&self, direction: RouteDirection) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter().filter(move |r| r.direction == direction)
    }

    /// Number of disjoint UE -> host paths
    pub fn path_count(&self) -> usize {
        self.routes_in(RouteDirection::EndpointToPeer).count()
    }
}

/// Every pool of every domain must be disjoint from every other pool
fn check_disjoint(specs: &[DomainSpec]) -> Result<()> {
    let pools: Vec<(&str, Ipv4Network)> = specs
        .iter()
        .flat_map(|spec| spec.pools().map(move |pool| (spec.id.as_str(), pool)))
        .collect();

    for (i, (first_domain, first)) in pools.iter().enumerate() {
        for (second_domain, second) in pools.iter().skip(i + 1) {
            if first.contains(second.network()) || second.contains(first.network()) {
                return Err(ScenarioError::OverlappingAddressSpace {
                    first_domain: first_domain.to_string(),
                    first: *first,
                    second_domain: second_domain.to_string(),
                    second: *second,
                });
            }
        }
    }
    Ok(())
}

fn nth_host(pool: &Ipv4Network, n: u32) -> Result<Ipv4Addr> {
    if pool.prefix() > 30 {
        return Err(ScenarioError::InvalidConfig(format!(
            "pool {} is too small to hold a gateway and a host",
            pool
        )));
    }
    pool.nth(n).ok_or_else(|| {
        ScenarioError::InvalidConfig(format!("pool {} has no host number {}", pool, n))
    })
}

fn host_network(addr: Ipv4Addr) -> Ipv4Network {
    Ipv4Network::from(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> Ipv4Network {
        s.parse().unwrap()
    }

    fn two_domains() -> Vec<DomainSpec> {
        vec![
            DomainSpec::new("plmn1", net("7.0.0.0/8"), net("1.0.0.0/8")),
            DomainSpec::new("plmn2", net("8.0.0.0/8"), net("2.0.0.0/8")),
        ]
    }

    #[test]
    fn test_two_domains_give_two_paths() {
        let plan = TopologyPlan::plan(&two_domains()).unwrap();

        assert_eq!(plan.routes.len(), 4);
        assert_eq!(plan.routes_in(RouteDirection::EndpointToPeer).count(), 2);
        assert_eq!(plan.routes_in(RouteDirection::PeerToEndpoint).count(), 2);
        assert_eq!(plan.path_count(), 2);
    }

    #[test]
    fn test_endpoint_host_routes() {
        let plan = TopologyPlan::plan(&two_domains()).unwrap();
        let up: Vec<_> = plan.routes_in(RouteDirection::EndpointToPeer).collect();

        assert_eq!(up[0].destination, net("1.0.0.2/32"));
        assert_eq!(up[0].next_hop, Some(Ipv4Addr::new(7, 0, 0, 1)));
        assert_eq!(up[0].interface_index, 1);

        assert_eq!(up[1].destination, net("2.0.0.2/32"));
        assert_eq!(up[1].next_hop, Some(Ipv4Addr::new(8, 0, 0, 1)));
        assert_eq!(up[1].interface_index, 2);
    }

    #[test]
    fn test_peer_network_routes() {
        let plan = TopologyPlan::plan(&two_domains()).unwrap();
        let down: Vec<_> = plan.routes_in(RouteDirection::PeerToEndpoint).collect();

        assert_eq!(down[0].destination, net("7.0.0.0/8"));
        assert_eq!(down[0].next_hop, None);
        assert_eq!(down[0].interface_index, 1);
        assert_eq!(down[1].destination, net("8.0.0.0/8"));
        assert_eq!(down[1].interface_index, 2);
    }

    #[test]
    fn test_address_allocation() {
        let plan = TopologyPlan::plan(&two_domains()).unwrap();
        let d = &plan.domains[1];

        assert_eq!(d.ue_address, Ipv4Addr::new(8, 0, 0, 2));
        assert_eq!(d.gateway, Ipv4Addr::new(8, 0, 0, 1));
        assert_eq!(d.link_gateway_address, Ipv4Addr::new(2, 0, 0, 1));
        assert_eq!(d.peer_address, Ipv4Addr::new(2, 0, 0, 2));
        assert_eq!(d.link.mtu, 2500);
    }

    #[test]
    fn test_overlapping_ue_pools_rejected() {
        let specs = vec![
            DomainSpec::new("plmn1", net("7.0.0.0/8"), net("1.0.0.0/8")),
            DomainSpec::new("plmn2", net("7.1.0.0/16"), net("2.0.0.0/8")),
        ];

        match TopologyPlan::plan(&specs) {
            Err(ScenarioError::OverlappingAddressSpace {
                first_domain,
                second_domain,
                ..
            }) => {
                assert_eq!(first_domain, "plmn1");
                assert_eq!(second_domain, "plmn2");
            }
            other => panic!("expected overlap error, got {other:?}"),
        }
    }

    #[test]
    fn test_overlapping_link_and_core_pools_rejected() {
        let link_clash = vec![
            DomainSpec::new("plmn1", net("7.0.0.0/8"), net("1.0.0.0/8")),
            DomainSpec::new("plmn2", net("8.0.0.0/8"), net("1.0.0.0/24")),
        ];
        assert!(matches!(
            TopologyPlan::plan(&link_clash),
            Err(ScenarioError::OverlappingAddressSpace { .. })
        ));

        let core_clash = vec![
            DomainSpec::new("plmn1", net("7.0.0.0/8"), net("1.0.0.0/8"))
                .core_pool(net("12.0.0.0/8")),
            DomainSpec::new("plmn2", net("8.0.0.0/8"), net("2.0.0.0/8"))
                .core_pool(net("12.0.0.0/8")),
        ];
        assert!(matches!(
            TopologyPlan::plan(&core_clash),
            Err(ScenarioError::OverlappingAddressSpace { .. })
        ));
    }

    #[test]
    fn test_single_and_many_domains() {
        let single = TopologyPlan::plan(&two_domains()[..1]).unwrap();
        assert_eq!(single.routes.len(), 2);

        let many: Vec<_> = (0..4u8)
            .map(|i| {
                DomainSpec::new(
                    format!("plmn{}", i + 1),
                    Ipv4Network::new(Ipv4Addr::new(20 + i, 0, 0, 0), 8).unwrap(),
                    Ipv4Network::new(Ipv4Addr::new(30 + i, 0, 0, 0), 8).unwrap(),
                )
            })
            .collect();
        let plan = TopologyPlan::plan(&many).unwrap();
        assert_eq!(plan.path_count(), 4);
        assert_eq!(plan.routes.last().unwrap().interface_index, 4);
    }

    #[test]
    fn test_empty_and_tiny_pools_rejected() {
        assert!(matches!(
            TopologyPlan::plan(&[]),
            Err(ScenarioError::InvalidConfig(_))
        ));

        let tiny = vec![DomainSpec::new("plmn1", net("7.0.0.0/31"), net("1.0.0.0/8"))];
        assert!(matches!(
            TopologyPlan::plan(&tiny),
            Err(ScenarioError::InvalidConfig(_))
        ));
    }
}
