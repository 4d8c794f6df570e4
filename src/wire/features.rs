//! `FEATURES_REQUEST`/`FEATURES_REPLY` and the `ofp_phy_port` descriptor.

use crate::constants::OFP_HEADER_LEN;
use crate::error::DecodeError;
use crate::wire::header::{MessageType, OfpHeader};

/// Size in bytes of one `ofp_phy_port` entry.
pub const OFP_PHY_PORT_LEN: usize = 48;
/// Size in bytes of the fixed `ofp_switch_features` header (before the port list).
pub const OFP_FEATURES_REPLY_FIXED_LEN: usize = OFP_HEADER_LEN + 24;

/// Port feature/state flags, carried verbatim for the ports this switch models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyPort {
    /// OpenFlow port number, 1-based.
    pub port_no: u16,
    /// MAC address of the port.
    pub hw_addr: [u8; 6],
    /// Human-readable interface name, null-padded to 16 bytes on the wire.
    pub name: [u8; 16],
    /// `OFPPC_*` configuration bits.
    pub config: u32,
    /// `OFPPS_*` state bits.
    pub state: u32,
    /// `OFPPF_*` current feature bits.
    pub curr: u32,
    /// `OFPPF_*` advertised feature bits.
    pub advertised: u32,
    /// `OFPPF_*` supported feature bits.
    pub supported: u32,
    /// `OFPPF_*` peer-advertised feature bits.
    pub peer: u32,
}

/// Decodes one 48-byte `ofp_phy_port` entry.
pub fn decode_phy_port(data: &[u8]) -> Result<PhyPort, DecodeError> {
    if data.len() < OFP_PHY_PORT_LEN {
        return Err(DecodeError::ShortBuffer);
    }
    let mut name = [0u8; 16];
    name.copy_from_slice(&data[8..24]);
    Ok(PhyPort {
        port_no: u16::from_be_bytes(data[0..2].try_into().unwrap()),
        hw_addr: data[2..8].try_into().unwrap(),
        name,
        config: u32::from_be_bytes(data[24..28].try_into().unwrap()),
        state: u32::from_be_bytes(data[28..32].try_into().unwrap()),
        curr: u32::from_be_bytes(data[32..36].try_into().unwrap()),
        advertised: u32::from_be_bytes(data[36..40].try_into().unwrap()),
        supported: u32::from_be_bytes(data[40..44].try_into().unwrap()),
        peer: u32::from_be_bytes(data[44..48].try_into().unwrap()),
    })
}

/// Encodes one 48-byte `ofp_phy_port` entry into `out`.
pub fn encode_phy_port(port: &PhyPort, out: &mut [u8]) -> Result<(), DecodeError> {
    if out.len() < OFP_PHY_PORT_LEN {
        return Err(DecodeError::ShortBuffer);
    }
    out[0..2].copy_from_slice(&port.port_no.to_be_bytes());
    out[2..8].copy_from_slice(&port.hw_addr);
    out[8..24].copy_from_slice(&port.name);
    out[24..28].copy_from_slice(&port.config.to_be_bytes());
    out[28..32].copy_from_slice(&port.state.to_be_bytes());
    out[32..36].copy_from_slice(&port.curr.to_be_bytes());
    out[36..40].copy_from_slice(&port.advertised.to_be_bytes());
    out[40..44].copy_from_slice(&port.supported.to_be_bytes());
    out[44..48].copy_from_slice(&port.peer.to_be_bytes());
    Ok(())
}

/// Decoded `FEATURES_REPLY` fixed fields (the port list is encoded separately
/// by the caller, which knows the live port count at compile time via `MAX_PORTS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeaturesReplyHeader {
    /// Echoes the `FEATURES_REQUEST` transaction id.
    pub xid: u32,
    /// Switch datapath id.
    pub datapath_id: u64,
    /// Maximum number of packet buffers (always 0; this core does not buffer packets).
    pub n_buffers: u32,
    /// Number of flow tables (always 1; this core is single-table).
    pub n_tables: u8,
    /// `OFPC_*` capability bits.
    pub capabilities: u32,
    /// Bitmap of `OFPAT_*` action types this switch can apply.
    pub actions: u32,
}

/// Encodes the `FEATURES_REPLY` header (not including the port list) into `out`.
pub fn encode_features_reply_header(
    reply: &FeaturesReplyHeader,
    port_count: usize,
    out: &mut [u8],
) -> Result<(), DecodeError> {
    let total_len = OFP_FEATURES_REPLY_FIXED_LEN + port_count * OFP_PHY_PORT_LEN;
    if out.len() < OFP_FEATURES_REPLY_FIXED_LEN {
        return Err(DecodeError::ShortBuffer);
    }
    let header = OfpHeader {
        msg_type: MessageType::FeaturesReply,
        length: total_len as u16,
        xid: reply.xid,
    };
    header.encode(out)?;
    let body = &mut out[OFP_HEADER_LEN..];
    body[0..8].copy_from_slice(&reply.datapath_id.to_be_bytes());
    body[8..12].copy_from_slice(&reply.n_buffers.to_be_bytes());
    body[12] = reply.n_tables;
    body[13..16].fill(0);
    body[16..20].copy_from_slice(&reply.capabilities.to_be_bytes());
    body[20..24].copy_from_slice(&reply.actions.to_be_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phy_port_roundtrips() {
        let port = PhyPort {
            port_no: 1,
            hw_addr: [1, 2, 3, 4, 5, 6],
            name: *b"eth0\0\0\0\0\0\0\0\0\0\0\0\0",
            config: 0,
            state: 0,
            curr: 0x40, // OFPPF_1GB_FD
            advertised: 0,
            supported: 0,
            peer: 0,
        };
        let mut buf = [0u8; OFP_PHY_PORT_LEN];
        encode_phy_port(&port, &mut buf).unwrap();
        let decoded = decode_phy_port(&buf).unwrap();
        assert_eq!(decoded, port);
    }

    #[test]
    fn features_reply_header_has_expected_length_for_one_port() {
        let reply = FeaturesReplyHeader {
            xid: 1,
            datapath_id: 0x0102_0304_0506,
            n_buffers: 0,
            n_tables: 1,
            capabilities: crate::constants::OFPC_FLOW_STATS,
            actions: 0,
        };
        let mut buf = [0u8; OFP_FEATURES_REPLY_FIXED_LEN];
        encode_features_reply_header(&reply, 1, &mut buf).unwrap();
        let length = u16::from_be_bytes([buf[2], buf[3]]);
        assert_eq!(length as usize, OFP_FEATURES_REPLY_FIXED_LEN + OFP_PHY_PORT_LEN);
    }
}
