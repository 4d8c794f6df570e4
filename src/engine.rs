//! Applies an installed action list to a live packet.
//!
//! This is the data-plane half of flow processing: [`table::FlowTable`]
//! decides which entry matched, this module carries out what that entry
//! says to do. Header-rewriting actions mutate the [`PacketView`] in place;
//! [`Action::Output`] accumulates into an [`EgressSet`] for the caller to
//! drain, since a single action list may name more than one egress port.

use crate::action::{Action, ActionList};
use crate::constants::{DEFAULT_MAX_PORTS, OFPP_ALL, OFPP_CONTROLLER, OFPP_FLOOD, OFPP_IN_PORT};
use crate::packet::{IpField, MacField, PacketView, PortField};

/// One requested egress: either a concrete port or "send to controller".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Egress {
    /// Forward out a physical port.
    Port(u16),
    /// Send to the controller, with the max bytes the action requested.
    Controller {
        /// Max bytes of the packet to include in the `PACKET_IN`.
        max_len: u16,
    },
}

/// Accumulates the egress decisions produced by one action list application.
///
/// Bounded at [`DEFAULT_MAX_PORTS`] + 1 (every physical port plus the
/// controller) since `FLOOD`/`ALL` expand to at most that many entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct EgressSet {
    entries: [Option<Egress>; DEFAULT_MAX_PORTS + 1],
    count: usize,
}

impl EgressSet {
    /// An empty egress set.
    #[must_use]
    pub const fn new() -> Self {
        EgressSet { entries: [None; DEFAULT_MAX_PORTS + 1], count: 0 }
    }

    fn push(&mut self, egress: Egress) {
        if self.count < self.entries.len() {
            self.entries[self.count] = Some(egress);
            self.count += 1;
        }
    }

    /// Iterates the accumulated egress decisions.
    pub fn iter(&self) -> impl Iterator<Item = Egress> + '_ {
        self.entries[..self.count].iter().filter_map(|e| *e)
    }

    /// Whether no egress was requested (the packet is effectively dropped).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Applies `actions` to `view` in order, mutating header fields in place and
/// accumulating output decisions into the returned [`EgressSet`].
///
/// `ingress_port` resolves [`crate::constants::OFPP_IN_PORT`] and is used as
/// the exclusion for `FLOOD`/`ALL`. `enabled_ports` lists the live physical
/// port numbers eligible for flood expansion.
pub fn apply(
    actions: &ActionList,
    view: &mut PacketView<'_>,
    ingress_port: u16,
    enabled_ports: &[u16],
) -> EgressSet {
    let mut egress = EgressSet::new();
    let mut header_touched = false;

    for action in actions.iter() {
        match *action {
            Action::Output { port, max_len } => {
                resolve_output(port, max_len, ingress_port, enabled_ports, &mut egress);
            }
            Action::SetVlanVid(vid) => {
                view.set_vlan_vid(vid);
                header_touched = true;
            }
            Action::SetVlanPcp(pcp) => {
                view.set_vlan_pcp(pcp);
                header_touched = true;
            }
            Action::StripVlan => {
                view.strip_vlan();
                header_touched = true;
            }
            Action::SetDlSrc(mac) => view.set_mac(MacField::Src, mac),
            Action::SetDlDst(mac) => view.set_mac(MacField::Dst, mac),
            Action::SetNwSrc(addr) => {
                view.set_ipv4(IpField::Src, addr);
                header_touched = true;
            }
            Action::SetNwDst(addr) => {
                view.set_ipv4(IpField::Dst, addr);
                header_touched = true;
            }
            Action::SetNwTos(tos) => {
                view.set_tos(tos);
                header_touched = true;
            }
            Action::SetTpSrc(port) => {
                view.set_l4_port(PortField::Src, port);
                header_touched = true;
            }
            Action::SetTpDst(port) => {
                view.set_l4_port(PortField::Dst, port);
                header_touched = true;
            }
        }
    }

    if header_touched {
        view.recompute_ip_and_l4_checksums();
    }

    egress
}

fn resolve_output(
    port: u16,
    max_len: u16,
    ingress_port: u16,
    enabled_ports: &[u16],
    egress: &mut EgressSet,
) {
    match port {
        OFPP_IN_PORT => egress.push(Egress::Port(ingress_port)),
        OFPP_CONTROLLER => egress.push(Egress::Controller { max_len }),
        OFPP_FLOOD | OFPP_ALL => {
            for &p in enabled_ports {
                if p != ingress_port {
                    egress.push(Egress::Port(p));
                }
            }
        }
        physical => egress.push(Egress::Port(physical)),
    }
}
