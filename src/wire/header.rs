//! The common `ofp_header` shared by every OpenFlow message.

use crate::constants::{OFP_HEADER_LEN, OFP_VERSION};
use crate::error::DecodeError;

/// OpenFlow message type discriminants (`ofp_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageType {
    /// Symmetric version negotiation.
    Hello = 0,
    /// Symmetric error report.
    Error = 1,
    /// Symmetric liveness probe.
    EchoRequest = 2,
    /// Symmetric liveness reply.
    EchoReply = 3,
    /// Controller to switch experimenter/vendor extension.
    Vendor = 4,
    /// Controller to switch feature query.
    FeaturesRequest = 5,
    /// Switch to controller feature reply.
    FeaturesReply = 6,
    /// Controller to switch config query.
    GetConfigRequest = 7,
    /// Switch to controller config reply.
    GetConfigReply = 8,
    /// Controller to switch config update.
    SetConfig = 9,
    /// Switch to controller packet-in event.
    PacketIn = 10,
    /// Switch to controller flow expiration event.
    FlowRemoved = 11,
    /// Switch to controller port status event.
    PortStatus = 12,
    /// Controller to switch packet injection.
    PacketOut = 13,
    /// Controller to switch flow table modification.
    FlowMod = 14,
    /// Controller to switch port modification.
    PortMod = 15,
    /// Controller to switch stats query.
    StatsRequest = 16,
    /// Switch to controller stats reply.
    StatsReply = 17,
    /// Controller to switch reply-ordering barrier.
    BarrierRequest = 18,
    /// Switch to controller barrier acknowledgement.
    BarrierReply = 19,
    /// Controller to switch queue config query (not supported).
    QueueGetConfigRequest = 20,
    /// Switch to controller queue config reply (not supported).
    QueueGetConfigReply = 21,
}

impl MessageType {
    /// Decodes the wire `type` byte, failing for reserved/unknown values.
    pub const fn from_u8(value: u8) -> Result<Self, DecodeError> {
        Ok(match value {
            0 => MessageType::Hello,
            1 => MessageType::Error,
            2 => MessageType::EchoRequest,
            3 => MessageType::EchoReply,
            4 => MessageType::Vendor,
            5 => MessageType::FeaturesRequest,
            6 => MessageType::FeaturesReply,
            7 => MessageType::GetConfigRequest,
            8 => MessageType::GetConfigReply,
            9 => MessageType::SetConfig,
            10 => MessageType::PacketIn,
            11 => MessageType::FlowRemoved,
            12 => MessageType::PortStatus,
            13 => MessageType::PacketOut,
            14 => MessageType::FlowMod,
            15 => MessageType::PortMod,
            16 => MessageType::StatsRequest,
            17 => MessageType::StatsReply,
            18 => MessageType::BarrierRequest,
            19 => MessageType::BarrierReply,
            20 => MessageType::QueueGetConfigRequest,
            21 => MessageType::QueueGetConfigReply,
            _ => return Err(DecodeError::BadType),
        })
    }
}

/// The 8-byte header prefixing every OpenFlow message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OfpHeader {
    /// Message type.
    pub msg_type: MessageType,
    /// Total message length including this header, in bytes.
    pub length: u16,
    /// Transaction id, echoed back on replies that correlate to a request.
    pub xid: u32,
}

impl OfpHeader {
    /// Decodes the header from the first [`OFP_HEADER_LEN`] bytes of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < OFP_HEADER_LEN {
            return Err(DecodeError::ShortBuffer);
        }
        if data[0] != OFP_VERSION {
            return Err(DecodeError::BadVersion);
        }
        let msg_type = MessageType::from_u8(data[1])?;
        let length = u16::from_be_bytes([data[2], data[3]]);
        if usize::from(length) < OFP_HEADER_LEN {
            return Err(DecodeError::BadLength);
        }
        let xid = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        Ok(OfpHeader { msg_type, length, xid })
    }

    /// Encodes the header into the first [`OFP_HEADER_LEN`] bytes of `out`.
    pub fn encode(&self, out: &mut [u8]) -> Result<(), DecodeError> {
        if out.len() < OFP_HEADER_LEN {
            return Err(DecodeError::ShortBuffer);
        }
        out[0] = OFP_VERSION;
        out[1] = self.msg_type as u8;
        out[2..4].copy_from_slice(&self.length.to_be_bytes());
        out[4..8].copy_from_slice(&self.xid.to_be_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_short_buffer() {
        let buf = [0u8; 4];
        assert_eq!(OfpHeader::decode(&buf), Err(DecodeError::ShortBuffer));
    }

    #[test]
    fn decode_rejects_bad_version() {
        let buf = [0x02, 0, 0, 8, 0, 0, 0, 0];
        assert_eq!(OfpHeader::decode(&buf), Err(DecodeError::BadVersion));
    }

    #[test]
    fn decode_rejects_length_below_header_size() {
        let buf = [0x01, 0, 0, 4, 0, 0, 0, 0];
        assert_eq!(OfpHeader::decode(&buf), Err(DecodeError::BadLength));
    }

    #[test]
    fn encode_then_decode_roundtrips() {
        let header = OfpHeader { msg_type: MessageType::Hello, length: 8, xid: 0xdead_beef };
        let mut buf = [0u8; 8];
        header.encode(&mut buf).unwrap();
        let decoded = OfpHeader::decode(&buf).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let buf = [0x01, 99, 0, 8, 0, 0, 0, 0];
        assert_eq!(OfpHeader::decode(&buf), Err(DecodeError::BadType));
    }
}
