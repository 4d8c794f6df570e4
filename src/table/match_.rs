//! The `Match` predicate: a set of header-field tests against a wildcard mask.
//!
//! This is the host-order counterpart of the wire `ofp_match` structure
//! (encoded/decoded in [`crate::wire::flow_mod`]). A wildcarded field matches
//! anything; IPv4 source/destination additionally carry a prefix length
//! packed into the wildcard bitmask, so a field can be partially wildcarded.

use crate::constants::{
    OFPFW_DL_DST, OFPFW_DL_SRC, OFPFW_DL_TYPE, OFPFW_DL_VLAN, OFPFW_DL_VLAN_PCP, OFPFW_IN_PORT,
    OFPFW_NW_DST_MASK, OFPFW_NW_DST_SHIFT, OFPFW_NW_PROTO, OFPFW_NW_SRC_MASK, OFPFW_NW_SRC_SHIFT,
    OFPFW_NW_TOS, OFPFW_TP_DST, OFPFW_TP_SRC,
};
use crate::packet::PacketView;

/// A flow match: the predicate half of a flow entry.
///
/// Field values are meaningful only when the corresponding `wildcards` bit
/// (or, for the IP fields, prefix-length sub-field) does not fully wildcard
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Match {
    /// `OFPFW_*` bitmask plus packed IP prefix-length sub-fields.
    pub wildcards: u32,
    /// Ingress port, 1-based.
    pub in_port: u16,
    /// Ethernet source address.
    pub dl_src: [u8; 6],
    /// Ethernet destination address.
    pub dl_dst: [u8; 6],
    /// 802.1Q VLAN id (12 bits significant).
    pub dl_vlan: u16,
    /// 802.1Q priority (3 bits significant).
    pub dl_vlan_pcp: u8,
    /// EtherType.
    pub dl_type: u16,
    /// IP ToS/DSCP byte.
    pub nw_tos: u8,
    /// IP protocol number.
    pub nw_proto: u8,
    /// IPv4 source address.
    pub nw_src: u32,
    /// IPv4 destination address.
    pub nw_dst: u32,
    /// TCP/UDP source port.
    pub tp_src: u16,
    /// TCP/UDP destination port.
    pub tp_dst: u16,
}

impl Match {
    /// IP source prefix length in bits, decoded from the wildcard sub-field.
    #[must_use]
    pub const fn nw_src_prefix(&self) -> u32 {
        prefix_len(self.wildcards, OFPFW_NW_SRC_SHIFT, OFPFW_NW_SRC_MASK)
    }

    /// IP destination prefix length in bits, decoded from the wildcard sub-field.
    #[must_use]
    pub const fn nw_dst_prefix(&self) -> u32 {
        prefix_len(self.wildcards, OFPFW_NW_DST_SHIFT, OFPFW_NW_DST_MASK)
    }

    fn field_wildcarded(&self, bit: u32) -> bool {
        self.wildcards & bit != 0
    }

    /// Checks whether a live packet on `ingress_port` satisfies this match.
    #[must_use]
    pub fn matches_packet(&self, view: &PacketView<'_>, ingress_port: u16) -> bool {
        if !self.field_wildcarded(OFPFW_IN_PORT) && self.in_port != ingress_port {
            return false;
        }
        if !self.field_wildcarded(OFPFW_DL_SRC) {
            let Some(src) = packet_dl_src(view) else {
                return false;
            };
            if src != self.dl_src {
                return false;
            }
        }
        if !self.field_wildcarded(OFPFW_DL_DST) {
            let Some(dst) = packet_dl_dst(view) else {
                return false;
            };
            if dst != self.dl_dst {
                return false;
            }
        }
        if !self.field_wildcarded(OFPFW_DL_VLAN) {
            let vlan = packet_dl_vlan(view);
            if vlan != self.dl_vlan {
                return false;
            }
        }
        if !self.field_wildcarded(OFPFW_DL_VLAN_PCP) {
            let pcp = packet_dl_vlan_pcp(view);
            if pcp != self.dl_vlan_pcp {
                return false;
            }
        }
        if !self.field_wildcarded(OFPFW_DL_TYPE) {
            if view.ethertype() != Some(self.dl_type) {
                return false;
            }
        }
        if !self.field_wildcarded(OFPFW_NW_TOS) {
            let Some(tos) = packet_nw_tos(view) else {
                return false;
            };
            if tos != self.nw_tos {
                return false;
            }
        }
        if !self.field_wildcarded(OFPFW_NW_PROTO) {
            if view.ip_proto() != Some(self.nw_proto) {
                return false;
            }
        }
        let src_prefix = self.nw_src_prefix();
        if src_prefix > 0 {
            let Some(src) = packet_nw_src(view) else {
                return false;
            };
            if !prefix_eq(src, self.nw_src, src_prefix) {
                return false;
            }
        }
        let dst_prefix = self.nw_dst_prefix();
        if dst_prefix > 0 {
            let Some(dst) = packet_nw_dst(view) else {
                return false;
            };
            if !prefix_eq(dst, self.nw_dst, dst_prefix) {
                return false;
            }
        }
        if !self.field_wildcarded(OFPFW_TP_SRC) {
            let Some(src) = packet_tp_src(view) else {
                return false;
            };
            if src != self.tp_src {
                return false;
            }
        }
        if !self.field_wildcarded(OFPFW_TP_DST) {
            let Some(dst) = packet_tp_dst(view) else {
                return false;
            };
            if dst != self.tp_dst {
                return false;
            }
        }
        true
    }
}

const fn prefix_len(wildcards: u32, shift: u32, mask: u32) -> u32 {
    let raw = (wildcards & mask) >> shift;
    if raw >= 32 { 0 } else { 32 - raw }
}

fn prefix_eq(a: u32, b: u32, prefix_bits: u32) -> bool {
    if prefix_bits == 0 {
        return true;
    }
    let shift = 32 - prefix_bits;
    let mask = u32::MAX << shift;
    (a & mask) == (b & mask)
}

/// Non-strict match used by `MODIFY`/`DELETE`: succeeds when `entry` is at
/// least as specific as `candidate` everywhere `candidate` does not
/// wildcard, i.e. `entry`'s match is a subset of `candidate`'s.
#[must_use]
pub fn field_match(candidate: &Match, entry: &Match) -> bool {
    macro_rules! check_exact {
        ($bit:expr, $field:ident) => {
            if candidate.wildcards & $bit == 0 {
                if entry.wildcards & $bit != 0 || entry.$field != candidate.$field {
                    return false;
                }
            }
        };
    }

    check_exact!(OFPFW_IN_PORT, in_port);
    check_exact!(OFPFW_DL_SRC, dl_src);
    check_exact!(OFPFW_DL_DST, dl_dst);
    check_exact!(OFPFW_DL_VLAN, dl_vlan);
    check_exact!(OFPFW_DL_VLAN_PCP, dl_vlan_pcp);
    check_exact!(OFPFW_DL_TYPE, dl_type);
    check_exact!(OFPFW_NW_TOS, nw_tos);
    check_exact!(OFPFW_NW_PROTO, nw_proto);
    check_exact!(OFPFW_TP_SRC, tp_src);
    check_exact!(OFPFW_TP_DST, tp_dst);

    let cand_src_prefix = candidate.nw_src_prefix();
    if cand_src_prefix > 0 {
        if entry.nw_src_prefix() < cand_src_prefix
            || !prefix_eq(entry.nw_src, candidate.nw_src, cand_src_prefix)
        {
            return false;
        }
    }
    let cand_dst_prefix = candidate.nw_dst_prefix();
    if cand_dst_prefix > 0 {
        if entry.nw_dst_prefix() < cand_dst_prefix
            || !prefix_eq(entry.nw_dst, candidate.nw_dst, cand_dst_prefix)
        {
            return false;
        }
    }

    true
}

/// Strict match used by `MODIFY_STRICT`/`DELETE_STRICT`: full field equality.
#[must_use]
pub fn exact_match(a: &Match, b: &Match) -> bool {
    a == b
}

fn packet_dl_src(view: &PacketView<'_>) -> Option<[u8; 6]> {
    let bytes = view.as_bytes();
    if bytes.len() < 12 {
        return None;
    }
    Some(bytes[6..12].try_into().unwrap())
}

fn packet_dl_dst(view: &PacketView<'_>) -> Option<[u8; 6]> {
    let bytes = view.as_bytes();
    if bytes.len() < 6 {
        return None;
    }
    Some(bytes[0..6].try_into().unwrap())
}

fn packet_dl_vlan(view: &PacketView<'_>) -> u16 {
    if !view.has_vlan() {
        return 0xFFFF; // OFP_VLAN_NONE
    }
    let bytes = view.as_bytes();
    u16::from_be_bytes([bytes[14], bytes[15]]) & 0x0FFF
}

fn packet_dl_vlan_pcp(view: &PacketView<'_>) -> u8 {
    if !view.has_vlan() {
        return 0;
    }
    let bytes = view.as_bytes();
    (u16::from_be_bytes([bytes[14], bytes[15]]) >> 13) as u8
}

fn packet_nw_tos(view: &PacketView<'_>) -> Option<u8> {
    if view.ethertype() != Some(0x0800) {
        return None;
    }
    let l3 = view.l3_offset();
    view.as_bytes().get(l3 + 1).copied()
}

fn packet_nw_src(view: &PacketView<'_>) -> Option<u32> {
    if view.ethertype() != Some(0x0800) {
        return None;
    }
    let l3 = view.l3_offset();
    let bytes = view.as_bytes();
    if bytes.len() < l3 + 16 {
        return None;
    }
    Some(u32::from_be_bytes(bytes[l3 + 12..l3 + 16].try_into().unwrap()))
}

fn packet_nw_dst(view: &PacketView<'_>) -> Option<u32> {
    if view.ethertype() != Some(0x0800) {
        return None;
    }
    let l3 = view.l3_offset();
    let bytes = view.as_bytes();
    if bytes.len() < l3 + 20 {
        return None;
    }
    Some(u32::from_be_bytes(bytes[l3 + 16..l3 + 20].try_into().unwrap()))
}

fn l4_offset(view: &PacketView<'_>) -> Option<usize> {
    if view.ethertype() != Some(0x0800) {
        return None;
    }
    let l3 = view.l3_offset();
    let ihl = usize::from(*view.as_bytes().get(l3)? & 0x0F) * 4;
    Some(l3 + ihl)
}

fn packet_tp_src(view: &PacketView<'_>) -> Option<u16> {
    let off = l4_offset(view)?;
    let bytes = view.as_bytes();
    if bytes.len() < off + 2 {
        return None;
    }
    Some(u16::from_be_bytes([bytes[off], bytes[off + 1]]))
}

fn packet_tp_dst(view: &PacketView<'_>) -> Option<u16> {
    let off = l4_offset(view)?;
    let bytes = view.as_bytes();
    if bytes.len() < off + 4 {
        return None;
    }
    Some(u16::from_be_bytes([bytes[off + 2], bytes[off + 3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::OFPFW_ALL;

    fn wildcard_all() -> Match {
        Match { wildcards: OFPFW_ALL, ..Match::default() }
    }

    #[test]
    fn all_wildcards_match_any_packet() {
        let mut buf = [0u8; 64];
        let mut len = 64;
        let view = PacketView::new(&mut buf, &mut len);
        let m = wildcard_all();
        assert!(m.matches_packet(&view, 3));
    }

    #[test]
    fn exact_in_port_mismatch_fails() {
        let mut buf = [0u8; 64];
        let mut len = 64;
        let view = PacketView::new(&mut buf, &mut len);
        let m = Match { wildcards: OFPFW_ALL & !crate::constants::OFPFW_IN_PORT, in_port: 2, ..Match::default() };
        assert!(!m.matches_packet(&view, 1));
        assert!(m.matches_packet(&view, 2));
    }

    #[test]
    fn field_match_requires_entry_at_least_as_specific() {
        let candidate = Match {
            wildcards: OFPFW_ALL & !crate::constants::OFPFW_DL_TYPE,
            dl_type: 0x0800,
            ..Match::default()
        };
        let entry_specific = Match {
            wildcards: 0, // fully specified, a subset of candidate
            dl_type: 0x0800,
            ..Match::default()
        };
        let entry_wrong_type = Match { wildcards: 0, dl_type: 0x86DD, ..Match::default() };

        assert!(field_match(&candidate, &entry_specific));
        assert!(!field_match(&candidate, &entry_wrong_type));
    }

    #[test]
    fn ip_prefix_field_match_respects_specificity() {
        let candidate = Match {
            wildcards: (8u32 << crate::constants::OFPFW_NW_DST_SHIFT),
            nw_dst: 0x0a00_0000,
            ..Match::default()
        };
        // entry with /24 on the same network is at least as specific as /24.
        let entry = Match {
            wildcards: (8u32 << crate::constants::OFPFW_NW_DST_SHIFT),
            nw_dst: 0x0a00_0000,
            ..Match::default()
        };
        assert!(field_match(&candidate, &entry));

        // entry with a wider (less specific) wildcard must not match.
        let entry_wide = Match {
            wildcards: (16u32 << crate::constants::OFPFW_NW_DST_SHIFT),
            nw_dst: 0x0a00_0000,
            ..Match::default()
        };
        assert!(!field_match(&candidate, &entry_wide));
    }

    #[test]
    fn exact_match_requires_full_equality() {
        let a = Match { in_port: 1, ..Match::default() };
        let b = Match { in_port: 1, ..Match::default() };
        let c = Match { in_port: 2, ..Match::default() };
        assert!(exact_match(&a, &b));
        assert!(!exact_match(&a, &c));
    }
}
