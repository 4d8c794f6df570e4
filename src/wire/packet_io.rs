//! `PACKET_IN` encode and `PACKET_OUT` decode.

use crate::action::{decode_action, ActionList};
use crate::constants::OFP_HEADER_LEN;
use crate::error::DecodeError;
use crate::wire::header::{MessageType, OfpHeader};

/// Why a `PACKET_IN` was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PacketInReason {
    /// No matching flow entry (table miss).
    NoMatch = 0,
    /// A matching flow entry's action list requested `OFPP_CONTROLLER`.
    Action = 1,
}

/// Size in bytes of the fixed `ofp_packet_in` header (before the packet data).
pub const OFP_PACKET_IN_FIXED_LEN: usize = OFP_HEADER_LEN + 10;

/// Encodes a `PACKET_IN` message: fixed header plus up to `miss_send_len`
/// bytes of `frame`. Returns the number of bytes written to `out`.
pub fn encode_packet_in(
    xid: u32,
    in_port: u16,
    reason: PacketInReason,
    frame: &[u8],
    miss_send_len: u16,
    out: &mut [u8],
) -> Result<usize, DecodeError> {
    let send_len = frame.len().min(usize::from(miss_send_len));
    let total = OFP_PACKET_IN_FIXED_LEN + send_len;
    if out.len() < total {
        return Err(DecodeError::ShortBuffer);
    }
    let header = OfpHeader { msg_type: MessageType::PacketIn, length: total as u16, xid };
    header.encode(out)?;

    let body = &mut out[OFP_HEADER_LEN..total];
    body[0..4].copy_from_slice(&0xFFFF_FFFFu32.to_be_bytes()); // buffer_id: none, not buffered
    body[4..6].copy_from_slice(&(frame.len() as u16).to_be_bytes()); // total_len
    body[6..8].copy_from_slice(&in_port.to_be_bytes());
    body[8] = reason as u8;
    body[9] = 0; // pad
    body[10..10 + send_len].copy_from_slice(&frame[..send_len]);

    Ok(total)
}

/// A decoded `PACKET_OUT` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketOut<'a> {
    /// Transaction id.
    pub xid: u32,
    /// Buffer id; this core never has buffered packets, so this must be `0xFFFFFFFF`.
    pub buffer_id: u32,
    /// Port the packet arrived on, or `OFPP_NONE` if injected by the controller.
    pub in_port: u16,
    /// Actions to apply to the packet.
    pub actions: ActionList,
    /// Raw packet data, present when `buffer_id == 0xFFFFFFFF`.
    pub data: &'a [u8],
}

/// Decodes a `PACKET_OUT` message.
pub fn decode_packet_out(data: &[u8]) -> Result<PacketOut<'_>, DecodeError> {
    let header = OfpHeader::decode(data)?;
    if !matches!(header.msg_type, MessageType::PacketOut) {
        return Err(DecodeError::BadType);
    }
    const FIXED_LEN: usize = OFP_HEADER_LEN + 8;
    if data.len() < FIXED_LEN || usize::from(header.length) < FIXED_LEN {
        return Err(DecodeError::BadLength);
    }

    let body = &data[OFP_HEADER_LEN..];
    let buffer_id = u32::from_be_bytes(body[0..4].try_into().unwrap());
    let in_port = u16::from_be_bytes(body[4..6].try_into().unwrap());
    let actions_len = usize::from(u16::from_be_bytes(body[6..8].try_into().unwrap()));

    let actions_start = FIXED_LEN;
    let actions_end = actions_start + actions_len;
    if data.len() < actions_end || usize::from(header.length) < actions_end {
        return Err(DecodeError::BadLength);
    }

    let mut actions = ActionList::new();
    let mut offset = 0;
    while offset < actions_len {
        let (action, consumed) = decode_action(&data[actions_start + offset..actions_end])
            .map_err(|_| DecodeError::BadLength)?;
        actions.push(action).map_err(|_| DecodeError::BadLength)?;
        offset += consumed;
    }

    let packet_data = &data[actions_end..usize::from(header.length)];

    Ok(PacketOut { xid: header.xid, buffer_id, in_port, actions, data: packet_data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    #[test]
    fn encode_packet_in_truncates_to_miss_send_len() {
        let frame = [0xAAu8; 200];
        let mut buf = [0u8; 256];
        let len = encode_packet_in(1, 1, PacketInReason::NoMatch, &frame, 64, &mut buf).unwrap();
        assert_eq!(len, OFP_PACKET_IN_FIXED_LEN + 64);
        let total_len_field = u16::from_be_bytes([buf[OFP_HEADER_LEN + 4], buf[OFP_HEADER_LEN + 5]]);
        assert_eq!(total_len_field, 200);
    }

    #[test]
    fn decode_packet_out_with_no_actions() {
        let mut buf = [0u8; OFP_HEADER_LEN + 8 + 4];
        let header = OfpHeader {
            msg_type: MessageType::PacketOut,
            length: buf.len() as u16,
            xid: 3,
        };
        header.encode(&mut buf).unwrap();
        buf[OFP_HEADER_LEN..OFP_HEADER_LEN + 4].copy_from_slice(&0xFFFF_FFFFu32.to_be_bytes());
        buf[OFP_HEADER_LEN + 4..OFP_HEADER_LEN + 6].copy_from_slice(&1u16.to_be_bytes());
        buf[OFP_HEADER_LEN + 6..OFP_HEADER_LEN + 8].copy_from_slice(&0u16.to_be_bytes());
        buf[OFP_HEADER_LEN + 8..].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let decoded = decode_packet_out(&buf).unwrap();
        assert_eq!(decoded.in_port, 1);
        assert_eq!(decoded.actions.len(), 0);
        assert_eq!(decoded.data, &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn decode_packet_out_with_one_action() {
        let action = Action::Output { port: 2, max_len: 0 };
        let mut action_bytes = [0u8; 8];
        crate::action::encode_action(&action, &mut action_bytes).unwrap();

        let mut buf = [0u8; OFP_HEADER_LEN + 8 + 8];
        let header = OfpHeader {
            msg_type: MessageType::PacketOut,
            length: buf.len() as u16,
            xid: 9,
        };
        header.encode(&mut buf).unwrap();
        buf[OFP_HEADER_LEN..OFP_HEADER_LEN + 4].copy_from_slice(&0xFFFF_FFFFu32.to_be_bytes());
        buf[OFP_HEADER_LEN + 4..OFP_HEADER_LEN + 6].copy_from_slice(&0xFFFFu16.to_be_bytes());
        buf[OFP_HEADER_LEN + 6..OFP_HEADER_LEN + 8].copy_from_slice(&8u16.to_be_bytes());
        buf[OFP_HEADER_LEN + 8..].copy_from_slice(&action_bytes);

        let decoded = decode_packet_out(&buf).unwrap();
        assert_eq!(decoded.actions.len(), 1);
        assert_eq!(decoded.actions.iter().next(), Some(&action));
        assert!(decoded.data.is_empty());
    }
}
