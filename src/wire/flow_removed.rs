//! `FLOW_REMOVED` encode.

use crate::constants::OFP_HEADER_LEN;
use crate::error::DecodeError;
use crate::table::{FlowEntry, Match};
use crate::wire::flow_mod::{encode_match, OFP_MATCH_LEN};
use crate::wire::header::{MessageType, OfpHeader};

/// Size in bytes of the full `ofp_flow_removed` message.
pub const OFP_FLOW_REMOVED_LEN: usize = OFP_HEADER_LEN + OFP_MATCH_LEN + 40;

/// Why a flow entry was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FlowRemovedReason {
    /// The entry's idle timeout expired.
    IdleTimeout = 0,
    /// The entry's hard timeout expired.
    HardTimeout = 1,
    /// The controller issued a `DELETE`/`DELETE_STRICT` flow mod.
    Delete = 2,
}

/// Encodes a `FLOW_REMOVED` message describing `entry`'s expiry.
pub fn encode_flow_removed(
    pattern: &Match,
    entry: &FlowEntry,
    reason: FlowRemovedReason,
    out: &mut [u8],
) -> Result<usize, DecodeError> {
    if out.len() < OFP_FLOW_REMOVED_LEN {
        return Err(DecodeError::ShortBuffer);
    }
    let header = OfpHeader {
        msg_type: MessageType::FlowRemoved,
        length: OFP_FLOW_REMOVED_LEN as u16,
        xid: 0,
    };
    header.encode(out)?;

    let body = &mut out[OFP_HEADER_LEN..];
    encode_match(pattern, body)?;
    let rest = &mut body[OFP_MATCH_LEN..];
    rest[0..8].copy_from_slice(&entry.cookie.to_be_bytes());
    rest[8..10].copy_from_slice(&entry.priority.to_be_bytes());
    rest[10] = reason as u8;
    rest[11] = 0; // pad
    rest[12..16].copy_from_slice(&0u32.to_be_bytes()); // duration_sec, not tracked (no in-core clock)
    rest[16..20].copy_from_slice(&0u32.to_be_bytes()); // duration_nsec, not tracked
    rest[20..22].copy_from_slice(&entry.idle_timeout.to_be_bytes());
    rest[22..24].fill(0); // pad
    rest[24..32].copy_from_slice(&entry.packet_count.to_be_bytes());
    rest[32..40].copy_from_slice(&entry.byte_count.to_be_bytes());

    Ok(OFP_FLOW_REMOVED_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionList;

    #[test]
    fn encode_flow_removed_carries_counters() {
        let pattern = Match::default();
        let entry = FlowEntry {
            pattern,
            priority: 5,
            cookie: 99,
            actions: ActionList::new(),
            idle_timeout: 30,
            hard_timeout: 0,
            send_flow_rem: true,
            packet_count: 10,
            byte_count: 1500,
        };
        let mut buf = [0u8; OFP_FLOW_REMOVED_LEN];
        let len = encode_flow_removed(&pattern, &entry, FlowRemovedReason::IdleTimeout, &mut buf)
            .unwrap();
        assert_eq!(len, OFP_FLOW_REMOVED_LEN);

        let offset = OFP_HEADER_LEN + OFP_MATCH_LEN;
        assert_eq!(
            u64::from_be_bytes(buf[offset..offset + 8].try_into().unwrap()),
            99
        );
        assert_eq!(buf[offset + 10], FlowRemovedReason::IdleTimeout as u8);
        let packet_count_off = offset + 24;
        assert_eq!(
            u64::from_be_bytes(buf[packet_count_off..packet_count_off + 8].try_into().unwrap()),
            10
        );
    }
}
