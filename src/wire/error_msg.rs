//! `ERROR` message encode.

use crate::constants::{ERROR_ECHO_LEN, OFP_HEADER_LEN};
use crate::error::{OfError, OfErrorType};
use crate::wire::header::{MessageType, OfpHeader};

/// Encodes an `ERROR` message in reply to a failed request, echoing up to
/// [`ERROR_ECHO_LEN`] bytes of the offending request.
pub fn encode_error(
    xid: u32,
    error: OfError,
    offending_request: &[u8],
    out: &mut [u8],
) -> Result<usize, crate::error::DecodeError> {
    let echo_len = offending_request.len().min(ERROR_ECHO_LEN);
    let total = OFP_HEADER_LEN + 4 + echo_len;
    if out.len() < total {
        return Err(crate::error::DecodeError::ShortBuffer);
    }
    let header = OfpHeader { msg_type: MessageType::Error, length: total as u16, xid };
    header.encode(out)?;

    let (ty, code) = error.to_wire_code();
    let body = &mut out[OFP_HEADER_LEN..total];
    body[0..2].copy_from_slice(&(ty as u16).to_be_bytes());
    body[2..4].copy_from_slice(&code.to_be_bytes());
    body[4..4 + echo_len].copy_from_slice(&offending_request[..echo_len]);

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ActionError, DecodeError};

    #[test]
    fn encode_error_carries_type_and_code() {
        let request = [0x01, 14, 0, 8, 0, 0, 0, 1];
        let mut buf = [0u8; 64];
        let len = encode_error(1, OfError::Action(ActionError::UnsupportedOutPort), &request, &mut buf)
            .unwrap();
        let ty = u16::from_be_bytes([buf[OFP_HEADER_LEN], buf[OFP_HEADER_LEN + 1]]);
        assert_eq!(ty, OfErrorType::BadAction as u16);
        assert_eq!(len, OFP_HEADER_LEN + 4 + request.len());
    }

    #[test]
    fn encode_error_truncates_long_echo() {
        let request = [0u8; ERROR_ECHO_LEN + 50];
        let mut buf = [0u8; 256];
        let len =
            encode_error(1, OfError::Decode(DecodeError::BadLength), &request, &mut buf).unwrap();
        assert_eq!(len, OFP_HEADER_LEN + 4 + ERROR_ECHO_LEN);
    }
}
