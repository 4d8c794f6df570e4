//! `SET_CONFIG`/`GET_CONFIG_REPLY` codecs.

use crate::constants::OFP_HEADER_LEN;
use crate::error::DecodeError;
use crate::wire::header::{MessageType, OfpHeader};

/// Size in bytes of the `ofp_switch_config` body (excludes the header).
pub const OFP_SWITCH_CONFIG_BODY_LEN: usize = 4;

/// `ofp_config_flags`: how IP fragments are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum FragHandling {
    /// No special handling; fragments are treated as ordinary packets.
    Normal = 0,
    /// Drop IP fragments.
    Drop = 1,
    /// Reassemble fragments before forwarding (not supported by this core).
    Reassemble = 2,
}

impl FragHandling {
    const fn from_u16(value: u16) -> Self {
        match value & 0x3 {
            1 => FragHandling::Drop,
            2 | 3 => FragHandling::Reassemble,
            _ => FragHandling::Normal,
        }
    }
}

/// Decoded `SET_CONFIG` / `GET_CONFIG_REPLY` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchConfigBody {
    /// Fragment handling policy.
    pub flags: FragHandling,
    /// Max bytes of a packet sent to the controller on a miss or explicit send.
    pub miss_send_len: u16,
}

/// Decodes a `SET_CONFIG` message (header + 4-byte body).
pub fn decode_set_config(data: &[u8]) -> Result<SwitchConfigBody, DecodeError> {
    let header = OfpHeader::decode(data)?;
    if !matches!(header.msg_type, MessageType::SetConfig) {
        return Err(DecodeError::BadType);
    }
    if data.len() < OFP_HEADER_LEN + OFP_SWITCH_CONFIG_BODY_LEN {
        return Err(DecodeError::ShortBuffer);
    }
    let body = &data[OFP_HEADER_LEN..];
    let flags = u16::from_be_bytes(body[0..2].try_into().unwrap());
    let miss_send_len = u16::from_be_bytes(body[2..4].try_into().unwrap());
    Ok(SwitchConfigBody { flags: FragHandling::from_u16(flags), miss_send_len })
}

/// Encodes a `GET_CONFIG_REPLY` message into `out`.
pub fn encode_get_config_reply(
    xid: u32,
    config: &SwitchConfigBody,
    out: &mut [u8],
) -> Result<usize, DecodeError> {
    let total = OFP_HEADER_LEN + OFP_SWITCH_CONFIG_BODY_LEN;
    if out.len() < total {
        return Err(DecodeError::ShortBuffer);
    }
    let header =
        OfpHeader { msg_type: MessageType::GetConfigReply, length: total as u16, xid };
    header.encode(out)?;
    let body = &mut out[OFP_HEADER_LEN..total];
    body[0..2].copy_from_slice(&(config.flags as u16).to_be_bytes());
    body[2..4].copy_from_slice(&config.miss_send_len.to_be_bytes());
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_set_config_reads_miss_send_len() {
        let mut buf = [0u8; OFP_HEADER_LEN + OFP_SWITCH_CONFIG_BODY_LEN];
        let header = OfpHeader { msg_type: MessageType::SetConfig, length: buf.len() as u16, xid: 1 };
        header.encode(&mut buf).unwrap();
        buf[OFP_HEADER_LEN..OFP_HEADER_LEN + 2].copy_from_slice(&1u16.to_be_bytes());
        buf[OFP_HEADER_LEN + 2..].copy_from_slice(&128u16.to_be_bytes());

        let decoded = decode_set_config(&buf).unwrap();
        assert_eq!(decoded.flags, FragHandling::Drop);
        assert_eq!(decoded.miss_send_len, 128);
    }

    #[test]
    fn get_config_reply_roundtrips_through_decode_set_config_layout() {
        let cfg = SwitchConfigBody { flags: FragHandling::Normal, miss_send_len: 256 };
        let mut buf = [0u8; OFP_HEADER_LEN + OFP_SWITCH_CONFIG_BODY_LEN];
        let len = encode_get_config_reply(5, &cfg, &mut buf).unwrap();
        assert_eq!(len, buf.len());
        assert_eq!(u16::from_be_bytes([buf[OFP_HEADER_LEN + 2], buf[OFP_HEADER_LEN + 3]]), 256);
    }
}
