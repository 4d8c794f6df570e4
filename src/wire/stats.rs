//! `STATS_REQUEST` decode and `STATS_REPLY` encode for the stats types this
//! core supports: `DESC`, `FLOW`, `TABLE`, `PORT`. `AGGREGATE`, `QUEUE`, and
//! `VENDOR` are acknowledged with an error reply by the caller instead.

use crate::constants::{OFP_HEADER_LEN, OFPST_DESC, OFPST_FLOW, OFPST_PORT, OFPST_TABLE};
use crate::error::DecodeError;
use crate::table::{FlowEntry, Match};
use crate::wire::flow_mod::{encode_match, OFP_MATCH_LEN};
use crate::wire::header::{MessageType, OfpHeader};

const STATS_HEADER_BODY_LEN: usize = 4; // type(2) + flags(2)

/// A decoded `STATS_REQUEST`'s type and transaction id; the type-specific
/// body (e.g. a `FLOW` request's match filter) is left to the caller to
/// decode with the relevant helper once the type is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsRequestHeader {
    /// Transaction id.
    pub xid: u32,
    /// `OFPST_*` stats type requested.
    pub stats_type: u16,
}

/// Decodes the common `STATS_REQUEST` header.
pub fn decode_stats_request_header(data: &[u8]) -> Result<StatsRequestHeader, DecodeError> {
    let header = OfpHeader::decode(data)?;
    if !matches!(header.msg_type, MessageType::StatsRequest) {
        return Err(DecodeError::BadType);
    }
    if data.len() < OFP_HEADER_LEN + STATS_HEADER_BODY_LEN {
        return Err(DecodeError::ShortBuffer);
    }
    let body = &data[OFP_HEADER_LEN..];
    let stats_type = u16::from_be_bytes(body[0..2].try_into().unwrap());
    Ok(StatsRequestHeader { xid: header.xid, stats_type })
}

/// Fixed strings carried in a `DESC` stats reply, each null-padded on the wire.
pub struct DescStrings<'a> {
    /// Manufacturer description (`DESC_STR_LEN` = 256 bytes).
    pub mfr_desc: &'a str,
    /// Hardware description (256 bytes).
    pub hw_desc: &'a str,
    /// Software description (256 bytes).
    pub sw_desc: &'a str,
    /// Serial number (32 bytes).
    pub serial_num: &'a str,
    /// Datapath description (256 bytes).
    pub dp_desc: &'a str,
}

const DESC_STR_LEN: usize = 256;
const SERIAL_NUM_LEN: usize = 32;
/// Total body length of an `OFPST_DESC` reply.
pub const OFP_DESC_STATS_LEN: usize = DESC_STR_LEN * 4 + SERIAL_NUM_LEN;

fn write_padded_str(out: &mut [u8], s: &str) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(out.len());
    out[..n].copy_from_slice(&bytes[..n]);
    out[n..].fill(0);
}

/// Encodes a `STATS_REPLY` carrying `DESC` stats.
pub fn encode_desc_stats_reply(
    xid: u32,
    desc: &DescStrings<'_>,
    out: &mut [u8],
) -> Result<usize, DecodeError> {
    let total = OFP_HEADER_LEN + STATS_HEADER_BODY_LEN + OFP_DESC_STATS_LEN;
    if out.len() < total {
        return Err(DecodeError::ShortBuffer);
    }
    encode_stats_reply_header(xid, OFPST_DESC, total, out)?;
    let body = &mut out[OFP_HEADER_LEN + STATS_HEADER_BODY_LEN..total];
    write_padded_str(&mut body[0..DESC_STR_LEN], desc.mfr_desc);
    write_padded_str(&mut body[DESC_STR_LEN..2 * DESC_STR_LEN], desc.hw_desc);
    write_padded_str(&mut body[2 * DESC_STR_LEN..3 * DESC_STR_LEN], desc.sw_desc);
    write_padded_str(
        &mut body[3 * DESC_STR_LEN..3 * DESC_STR_LEN + SERIAL_NUM_LEN],
        desc.serial_num,
    );
    write_padded_str(&mut body[3 * DESC_STR_LEN + SERIAL_NUM_LEN..], desc.dp_desc);
    Ok(total)
}

fn encode_stats_reply_header(
    xid: u32,
    stats_type: u16,
    total_len: usize,
    out: &mut [u8],
) -> Result<(), DecodeError> {
    let header =
        OfpHeader { msg_type: MessageType::StatsReply, length: total_len as u16, xid };
    header.encode(out)?;
    let body = &mut out[OFP_HEADER_LEN..OFP_HEADER_LEN + STATS_HEADER_BODY_LEN];
    body[0..2].copy_from_slice(&stats_type.to_be_bytes());
    body[2..4].fill(0); // flags: no MORE support, single reply
    Ok(())
}

/// Size of one `ofp_flow_stats` entry excluding its variable action list.
pub const OFP_FLOW_STATS_FIXED_LEN: usize = 2 + 1 + 1 + OFP_MATCH_LEN + 4 + 2 + 2 + 6 + 8 + 8 + 8;

/// Encodes one `ofp_flow_stats` entry (fixed portion; actions are appended
/// by the caller, which already holds the encoded action bytes).
pub fn encode_flow_stats_entry(
    pattern: &Match,
    entry: &FlowEntry,
    action_bytes_len: usize,
    out: &mut [u8],
) -> Result<usize, DecodeError> {
    let len = OFP_FLOW_STATS_FIXED_LEN + action_bytes_len;
    if out.len() < len {
        return Err(DecodeError::ShortBuffer);
    }
    out[0..2].copy_from_slice(&(len as u16).to_be_bytes());
    out[2] = 1; // table_id: single table
    out[3] = 0; // pad
    encode_match(pattern, &mut out[4..4 + OFP_MATCH_LEN])?;
    let rest = &mut out[4 + OFP_MATCH_LEN..len];
    rest[0..4].copy_from_slice(&0u32.to_be_bytes()); // duration_sec, not tracked (no in-core clock)
    rest[4..6].copy_from_slice(&entry.priority.to_be_bytes());
    rest[6..8].copy_from_slice(&entry.idle_timeout.to_be_bytes());
    rest[8..14].fill(0); // pad
    rest[14..22].copy_from_slice(&entry.cookie.to_be_bytes());
    rest[22..30].copy_from_slice(&entry.packet_count.to_be_bytes());
    rest[30..38].copy_from_slice(&entry.byte_count.to_be_bytes());
    Ok(len)
}

/// Per-table statistics (this core models exactly one table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableStats {
    /// Current number of active entries.
    pub active_count: u32,
    /// Total lookups performed.
    pub lookup_count: u64,
    /// Total lookups that found a match.
    pub matched_count: u64,
    /// Table capacity.
    pub max_entries: u32,
}

/// Encodes a `STATS_REPLY` carrying single-table `TABLE` stats.
pub fn encode_table_stats_reply(
    xid: u32,
    stats: &TableStats,
    out: &mut [u8],
) -> Result<usize, DecodeError> {
    const ENTRY_LEN: usize = 1 + 3 + 32 + 4 + 4 + 4 + 4 + 8 + 8; // table_id+pad, name, wildcards, max_entries, active_count, pad, lookup_count, matched_count
    let total = OFP_HEADER_LEN + STATS_HEADER_BODY_LEN + ENTRY_LEN;
    if out.len() < total {
        return Err(DecodeError::ShortBuffer);
    }
    encode_stats_reply_header(xid, OFPST_TABLE, total, out)?;
    let body = &mut out[OFP_HEADER_LEN + STATS_HEADER_BODY_LEN..total];
    body[0] = 1; // table_id
    body[1..4].fill(0);
    write_padded_str(&mut body[4..36], "main");
    body[36..40].copy_from_slice(&crate::constants::OFPFW_ALL.to_be_bytes());
    body[40..44].copy_from_slice(&stats.max_entries.to_be_bytes());
    body[44..48].copy_from_slice(&stats.active_count.to_be_bytes());
    body[48..52].fill(0);
    body[52..60].copy_from_slice(&stats.lookup_count.to_be_bytes());
    body[60..68].copy_from_slice(&stats.matched_count.to_be_bytes());
    Ok(total)
}

/// Per-port statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortStatsEntry {
    /// Port number.
    pub port_no: u16,
    /// Packets received.
    pub rx_packets: u64,
    /// Packets transmitted.
    pub tx_packets: u64,
    /// Bytes received.
    pub rx_bytes: u64,
    /// Bytes transmitted.
    pub tx_bytes: u64,
    /// Receive errors.
    pub rx_errors: u64,
    /// Transmit errors.
    pub tx_errors: u64,
    /// Frames dropped for exceeding the drop policy (e.g. fragment policy).
    pub rx_dropped: u64,
    /// Frames dropped on transmit (e.g. port down).
    pub tx_dropped: u64,
}

/// Size of one `ofp_port_stats` entry.
pub const OFP_PORT_STATS_ENTRY_LEN: usize = 2 + 6 + 8 * 8 + 8; // port_no+pad, 8 counters, crc_err+collisions

/// Encodes a single `ofp_port_stats` entry into `out`.
pub fn encode_port_stats_entry(stats: &PortStatsEntry, out: &mut [u8]) -> Result<(), DecodeError> {
    if out.len() < OFP_PORT_STATS_ENTRY_LEN {
        return Err(DecodeError::ShortBuffer);
    }
    out[0..2].copy_from_slice(&stats.port_no.to_be_bytes());
    out[2..8].fill(0);
    out[8..16].copy_from_slice(&stats.rx_packets.to_be_bytes());
    out[16..24].copy_from_slice(&stats.tx_packets.to_be_bytes());
    out[24..32].copy_from_slice(&stats.rx_bytes.to_be_bytes());
    out[32..40].copy_from_slice(&stats.tx_bytes.to_be_bytes());
    out[40..48].copy_from_slice(&stats.rx_dropped.to_be_bytes());
    out[48..56].copy_from_slice(&stats.tx_dropped.to_be_bytes());
    out[56..64].copy_from_slice(&stats.rx_errors.to_be_bytes());
    out[64..72].copy_from_slice(&stats.tx_errors.to_be_bytes());
    out[72..80].fill(0); // rx_crc_err + collisions, not tracked
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_stats_request_header_reads_type() {
        let mut buf = [0u8; OFP_HEADER_LEN + STATS_HEADER_BODY_LEN];
        let header = OfpHeader { msg_type: MessageType::StatsRequest, length: buf.len() as u16, xid: 9 };
        header.encode(&mut buf).unwrap();
        buf[OFP_HEADER_LEN..OFP_HEADER_LEN + 2].copy_from_slice(&OFPST_FLOW.to_be_bytes());

        let decoded = decode_stats_request_header(&buf).unwrap();
        assert_eq!(decoded.stats_type, OFPST_FLOW);
        assert_eq!(decoded.xid, 9);
    }

    #[test]
    fn desc_stats_reply_pads_strings_to_fixed_width() {
        let desc = DescStrings {
            mfr_desc: "acme",
            hw_desc: "rev1",
            sw_desc: "v1.0",
            serial_num: "0001",
            dp_desc: "lab-switch",
        };
        let mut buf = [0u8; OFP_HEADER_LEN + STATS_HEADER_BODY_LEN + OFP_DESC_STATS_LEN];
        let len = encode_desc_stats_reply(1, &desc, &mut buf).unwrap();
        assert_eq!(len, buf.len());
        let mfr_start = OFP_HEADER_LEN + STATS_HEADER_BODY_LEN;
        assert_eq!(&buf[mfr_start..mfr_start + 4], b"acme");
        assert_eq!(buf[mfr_start + 4], 0);
    }
}
