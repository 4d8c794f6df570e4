//! `VENDOR` message decode.
//!
//! This core implements no vendor extensions; decoding exists only so the
//! controller dispatcher can recognize a `VENDOR` message and reply with
//! `OFPBRC_BAD_VENDOR` instead of a generic bad-type error.

use crate::constants::OFP_HEADER_LEN;
use crate::error::DecodeError;
use crate::wire::header::{MessageType, OfpHeader};

/// A decoded `VENDOR` message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorMessage {
    /// Transaction id.
    pub xid: u32,
    /// IEEE OUI-derived vendor id.
    pub vendor_id: u32,
}

/// Decodes a `VENDOR` message's header (vendor-specific payload is ignored).
pub fn decode_vendor(data: &[u8]) -> Result<VendorMessage, DecodeError> {
    let header = OfpHeader::decode(data)?;
    if !matches!(header.msg_type, MessageType::Vendor) {
        return Err(DecodeError::BadType);
    }
    if data.len() < OFP_HEADER_LEN + 4 {
        return Err(DecodeError::ShortBuffer);
    }
    let vendor_id = u32::from_be_bytes(data[OFP_HEADER_LEN..OFP_HEADER_LEN + 4].try_into().unwrap());
    Ok(VendorMessage { xid: header.xid, vendor_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_vendor_reads_vendor_id() {
        let mut buf = [0u8; OFP_HEADER_LEN + 4];
        let header = OfpHeader { msg_type: MessageType::Vendor, length: buf.len() as u16, xid: 1 };
        header.encode(&mut buf).unwrap();
        buf[OFP_HEADER_LEN..].copy_from_slice(&0x0000_2320u32.to_be_bytes());

        let decoded = decode_vendor(&buf).unwrap();
        assert_eq!(decoded.vendor_id, 0x0000_2320);
    }
}
