//! The action list: the effect half of a flow entry.
//!
//! Each [`Action`] corresponds to one `OFPAT_*` wire action. A flow entry
//! carries a fixed-capacity ordered list ([`ActionList`]) that the
//! [`crate::engine`] module applies in order against a [`PacketView`].

use crate::constants::{
    MAX_ACTIONS, OFPAT_OUTPUT, OFPAT_SET_DL_DST, OFPAT_SET_DL_SRC, OFPAT_SET_NW_DST,
    OFPAT_SET_NW_SRC, OFPAT_SET_NW_TOS, OFPAT_SET_TP_DST, OFPAT_SET_TP_SRC, OFPAT_SET_VLAN_PCP,
    OFPAT_SET_VLAN_VID, OFPAT_STRIP_VLAN, OFPP_CONTROLLER, OFPP_NORMAL, STRIP_VLAN_VID_SENTINEL,
};
use crate::error::{ActionError, ActionResult};

/// A single action applied to a packet in the data plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Emit the packet on `port` (a physical port number or an `OFPP_*` reserved port).
    Output {
        /// Destination port.
        port: u16,
        /// Bytes to send to the controller when `port == OFPP_CONTROLLER`.
        max_len: u16,
    },
    /// Set the 802.1Q VLAN id.
    SetVlanVid(u16),
    /// Set the 802.1Q priority.
    SetVlanPcp(u8),
    /// Strip the 802.1Q header, if present.
    StripVlan,
    /// Set the Ethernet source address.
    SetDlSrc([u8; 6]),
    /// Set the Ethernet destination address.
    SetDlDst([u8; 6]),
    /// Set the IPv4 source address.
    SetNwSrc(u32),
    /// Set the IPv4 destination address.
    SetNwDst(u32),
    /// Set the IP ToS/DSCP byte.
    SetNwTos(u8),
    /// Set the TCP/UDP source port.
    SetTpSrc(u16),
    /// Set the TCP/UDP destination port.
    SetTpDst(u16),
}

impl Action {
    /// Validates and normalizes an action at flow-install time.
    ///
    /// Rejects `Output(OFPP_NORMAL)` (normal L2 switching is out of scope).
    /// Normalizes `SetVlanVid(STRIP_VLAN_VID_SENTINEL)` and `SetVlanVid(0)`
    /// to [`Action::StripVlan`], matching the wire convention that a
    /// VLAN-none set is a strip.
    pub fn validate_for_install(self) -> ActionResult<Action> {
        match self {
            Action::Output { port: OFPP_NORMAL, .. } => Err(ActionError::UnsupportedOutPort),
            Action::SetVlanVid(0 | STRIP_VLAN_VID_SENTINEL) => Ok(Action::StripVlan),
            other => Ok(other),
        }
    }

    /// Whether this action sends the packet to the controller.
    #[must_use]
    pub const fn is_to_controller(&self) -> bool {
        matches!(self, Action::Output { port: OFPP_CONTROLLER, .. })
    }
}

/// A fixed-capacity ordered list of actions, the effect half of a flow entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActionList {
    actions: [Option<Action>; MAX_ACTIONS],
    count: usize,
}

impl ActionList {
    /// An empty action list (matching packets are dropped).
    #[must_use]
    pub const fn new() -> Self {
        ActionList { actions: [None; MAX_ACTIONS], count: 0 }
    }

    /// Appends `action`, validating and normalizing it first.
    ///
    /// Fails with [`ActionError::BadLength`] if the list is already at
    /// [`MAX_ACTIONS`] capacity.
    pub fn push(&mut self, action: Action) -> ActionResult<()> {
        if self.count >= MAX_ACTIONS {
            return Err(ActionError::BadLength);
        }
        let action = action.validate_for_install()?;
        self.actions[self.count] = Some(action);
        self.count += 1;
        Ok(())
    }

    /// Number of actions currently held.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether the list holds no actions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates the actions in install order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions[..self.count].iter().filter_map(Option::as_ref)
    }
}

/// Decodes a single action's `{type, len}` header plus body from `data`,
/// returning the [`Action`] and the number of bytes consumed.
pub fn decode_action(data: &[u8]) -> ActionResult<(Action, usize)> {
    if data.len() < 8 {
        return Err(ActionError::BadLength);
    }
    let ty = u16::from_be_bytes([data[0], data[1]]);
    let len = usize::from(u16::from_be_bytes([data[2], data[3]]));
    if data.len() < len {
        return Err(ActionError::BadLength);
    }
    let body = &data[4..len.max(4)];

    let action = match ty {
        OFPAT_OUTPUT if len == 8 => {
            let port = u16::from_be_bytes([body[0], body[1]]);
            let max_len = u16::from_be_bytes([body[2], body[3]]);
            Action::Output { port, max_len }
        }
        OFPAT_SET_VLAN_VID if len == 8 => {
            Action::SetVlanVid(u16::from_be_bytes([body[0], body[1]]))
        }
        OFPAT_SET_VLAN_PCP if len == 8 => Action::SetVlanPcp(body[0]),
        OFPAT_STRIP_VLAN if len == 8 => Action::StripVlan,
        OFPAT_SET_DL_SRC if len == 16 => Action::SetDlSrc(body[0..6].try_into().unwrap()),
        OFPAT_SET_DL_DST if len == 16 => Action::SetDlDst(body[0..6].try_into().unwrap()),
        OFPAT_SET_NW_SRC if len == 8 => {
            Action::SetNwSrc(u32::from_be_bytes(body[0..4].try_into().unwrap()))
        }
        OFPAT_SET_NW_DST if len == 8 => {
            Action::SetNwDst(u32::from_be_bytes(body[0..4].try_into().unwrap()))
        }
        OFPAT_SET_NW_TOS if len == 8 => Action::SetNwTos(body[0]),
        OFPAT_SET_TP_SRC if len == 8 => Action::SetTpSrc(u16::from_be_bytes([body[0], body[1]])),
        OFPAT_SET_TP_DST if len == 8 => Action::SetTpDst(u16::from_be_bytes([body[0], body[1]])),
        OFPAT_OUTPUT
        | OFPAT_SET_VLAN_VID
        | OFPAT_SET_VLAN_PCP
        | OFPAT_STRIP_VLAN
        | OFPAT_SET_DL_SRC
        | OFPAT_SET_DL_DST
        | OFPAT_SET_NW_SRC
        | OFPAT_SET_NW_DST
        | OFPAT_SET_NW_TOS
        | OFPAT_SET_TP_SRC
        | OFPAT_SET_TP_DST => return Err(ActionError::BadLength),
        _ => return Err(ActionError::UnknownType),
    };
    Ok((action, len))
}

/// Encodes `action` into `out`, returning the number of bytes written.
///
/// `out` must be at least 16 bytes; the exact length written depends on the
/// action (8 bytes for most, 16 for the two MAC-setting actions).
pub fn encode_action(action: &Action, out: &mut [u8]) -> ActionResult<usize> {
    if out.len() < 16 {
        return Err(ActionError::BadLength);
    }
    match *action {
        Action::Output { port, max_len } => {
            write_header(out, OFPAT_OUTPUT, 8);
            out[4..6].copy_from_slice(&port.to_be_bytes());
            out[6..8].copy_from_slice(&max_len.to_be_bytes());
            Ok(8)
        }
        Action::SetVlanVid(vid) => {
            write_header(out, OFPAT_SET_VLAN_VID, 8);
            out[4..6].copy_from_slice(&vid.to_be_bytes());
            out[6..8].fill(0);
            Ok(8)
        }
        Action::SetVlanPcp(pcp) => {
            write_header(out, OFPAT_SET_VLAN_PCP, 8);
            out[4] = pcp;
            out[5..8].fill(0);
            Ok(8)
        }
        Action::StripVlan => {
            write_header(out, OFPAT_STRIP_VLAN, 8);
            out[4..8].fill(0);
            Ok(8)
        }
        Action::SetDlSrc(mac) => {
            write_header(out, OFPAT_SET_DL_SRC, 16);
            out[4..10].copy_from_slice(&mac);
            out[10..16].fill(0);
            Ok(16)
        }
        Action::SetDlDst(mac) => {
            write_header(out, OFPAT_SET_DL_DST, 16);
            out[4..10].copy_from_slice(&mac);
            out[10..16].fill(0);
            Ok(16)
        }
        Action::SetNwSrc(addr) => {
            write_header(out, OFPAT_SET_NW_SRC, 8);
            out[4..8].copy_from_slice(&addr.to_be_bytes());
            Ok(8)
        }
        Action::SetNwDst(addr) => {
            write_header(out, OFPAT_SET_NW_DST, 8);
            out[4..8].copy_from_slice(&addr.to_be_bytes());
            Ok(8)
        }
        Action::SetNwTos(tos) => {
            write_header(out, OFPAT_SET_NW_TOS, 8);
            out[4] = tos;
            out[5..8].fill(0);
            Ok(8)
        }
        Action::SetTpSrc(port) => {
            write_header(out, OFPAT_SET_TP_SRC, 8);
            out[4..6].copy_from_slice(&port.to_be_bytes());
            out[6..8].fill(0);
            Ok(8)
        }
        Action::SetTpDst(port) => {
            write_header(out, OFPAT_SET_TP_DST, 8);
            out[4..6].copy_from_slice(&port.to_be_bytes());
            out[6..8].fill(0);
            Ok(8)
        }
    }
}

fn write_header(out: &mut [u8], ty: u16, len: u16) {
    out[0..2].copy_from_slice(&ty.to_be_bytes());
    out[2..4].copy_from_slice(&len.to_be_bytes());
}
