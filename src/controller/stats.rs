//! Assembles `STATS_REPLY` bodies from the flow table and port counters.

use crate::action::encode_action;
use crate::config::PortCounters;
use crate::constants::{DEFAULT_MAX_FLOWS, DEFAULT_MAX_PORTS, OFPST_PORT};
use crate::error::DecodeError;
use crate::table::{field_match, FlowTable, Match};
use crate::wire::header::{MessageType, OfpHeader};
use crate::wire::stats::{
    encode_flow_stats_entry, encode_port_stats_entry, encode_table_stats_reply, PortStatsEntry,
    TableStats, OFP_FLOW_STATS_FIXED_LEN, OFP_PORT_STATS_ENTRY_LEN,
};
use crate::constants::OFP_HEADER_LEN;

/// Encodes a `STATS_REPLY` carrying one `ofp_flow_stats` entry per table
/// entry whose match is at least as specific as `filter`. Returns the
/// number of bytes written, or `None` if `out` is too small to hold even
/// one entry's reply header.
pub fn encode_flow_stats_reply(
    xid: u32,
    table: &FlowTable<DEFAULT_MAX_FLOWS>,
    filter: &Match,
    out: &mut [u8],
) -> Result<usize, DecodeError> {
    const STATS_HEADER_BODY_LEN: usize = 4;
    let body_start = OFP_HEADER_LEN + STATS_HEADER_BODY_LEN;
    if out.len() < body_start {
        return Err(DecodeError::ShortBuffer);
    }

    let mut offset = body_start;
    for entry in table.iter() {
        if !field_match(filter, &entry.pattern) {
            continue;
        }
        let mut action_bytes = [0u8; 16 * crate::constants::MAX_ACTIONS];
        let mut action_len = 0;
        for action in entry.actions.iter() {
            let written = encode_action(action, &mut action_bytes[action_len..])
                .map_err(|_| DecodeError::BadLength)?;
            action_len += written;
        }
        let entry_len = OFP_FLOW_STATS_FIXED_LEN + action_len;
        if out.len() < offset + entry_len {
            break; // truncate to what fits; caller's buffer bounds a single reply
        }
        encode_flow_stats_entry(&entry.pattern, entry, action_len, &mut out[offset..])?;
        out[offset + OFP_FLOW_STATS_FIXED_LEN..offset + entry_len]
            .copy_from_slice(&action_bytes[..action_len]);
        offset += entry_len;
    }

    let header = OfpHeader { msg_type: MessageType::StatsReply, length: offset as u16, xid };
    header.encode(out)?;
    out[OFP_HEADER_LEN..body_start][0..2].copy_from_slice(&crate::constants::OFPST_FLOW.to_be_bytes());
    out[OFP_HEADER_LEN..body_start][2..4].fill(0);

    Ok(offset)
}

/// Encodes a `STATS_REPLY` carrying single-table `TABLE` stats.
pub fn encode_table_reply(
    xid: u32,
    table: &FlowTable<DEFAULT_MAX_FLOWS>,
    out: &mut [u8],
) -> Result<usize, DecodeError> {
    let stats = TableStats {
        active_count: table.len() as u32,
        lookup_count: table.lookup_count(),
        matched_count: table.matched_count(),
        max_entries: DEFAULT_MAX_FLOWS as u32,
    };
    encode_table_stats_reply(xid, &stats, out)
}

/// Encodes a `STATS_REPLY` carrying one `ofp_port_stats` entry per enabled port.
pub fn encode_port_reply(
    xid: u32,
    counters: &[(u16, PortCounters); DEFAULT_MAX_PORTS],
    out: &mut [u8],
) -> Result<usize, DecodeError> {
    const STATS_HEADER_BODY_LEN: usize = 4;
    let body_start = OFP_HEADER_LEN + STATS_HEADER_BODY_LEN;
    let total = body_start + counters.len() * OFP_PORT_STATS_ENTRY_LEN;
    if out.len() < total {
        return Err(DecodeError::ShortBuffer);
    }
    let header = OfpHeader { msg_type: MessageType::StatsReply, length: total as u16, xid };
    header.encode(out)?;
    out[OFP_HEADER_LEN..body_start][0..2].copy_from_slice(&OFPST_PORT.to_be_bytes());
    out[OFP_HEADER_LEN..body_start][2..4].fill(0);

    let mut offset = body_start;
    for (port_no, c) in counters {
        let entry = PortStatsEntry {
            port_no: *port_no,
            rx_packets: c.rx_packets,
            tx_packets: c.tx_packets,
            rx_bytes: c.rx_bytes,
            tx_bytes: c.tx_bytes,
            rx_errors: 0,
            tx_errors: 0,
            rx_dropped: c.rx_dropped,
            tx_dropped: c.tx_dropped,
        };
        encode_port_stats_entry(&entry, &mut out[offset..offset + OFP_PORT_STATS_ENTRY_LEN])?;
        offset += OFP_PORT_STATS_ENTRY_LEN;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionList};
    use crate::constants::OFPFW_ALL;
    use crate::table::FlowEntry;

    fn table_with_one_entry() -> FlowTable<DEFAULT_MAX_FLOWS> {
        let mut table = FlowTable::new();
        let mut actions = ActionList::new();
        actions.push(Action::Output { port: 1, max_len: 0 }).unwrap();
        table
            .insert(FlowEntry {
                pattern: Match { wildcards: OFPFW_ALL, ..Match::default() },
                priority: 10,
                cookie: 0,
                actions,
                idle_timeout: 0,
                hard_timeout: 0,
                send_flow_rem: false,
                packet_count: 5,
                byte_count: 500,
            })
            .unwrap();
        table
    }

    #[test]
    fn flow_stats_reply_encodes_at_least_one_entry() {
        let table = table_with_one_entry();
        let filter = Match { wildcards: OFPFW_ALL, ..Match::default() };
        let mut buf = [0u8; 256];
        let len = encode_flow_stats_reply(1, &table, &filter, &mut buf).unwrap();
        assert!(len > OFP_HEADER_LEN + 4);
    }

    #[test]
    fn table_reply_reports_active_count() {
        let table = table_with_one_entry();
        let mut buf = [0u8; 128];
        encode_table_reply(1, &table, &mut buf).unwrap();
    }
}
