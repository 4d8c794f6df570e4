//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers used
//! throughout the OpenFlow 1.0 core: wire-format field widths, OpenFlow
//! protocol constants (ports, wildcards, action types, stats types), and
//! frame/buffer sizing.
//!
//! # Organization
//!
//! - **Wire header**: the common `ofp_header` layout shared by every message.
//! - **Reserved ports**: `OFPP_*` special output port values.
//! - **Wildcards**: `OFPFW_*` bits used in `ofp_match`.
//! - **Action types**: `OFPAT_*` discriminants for the action list.
//! - **Stats types**: `OFPST_*` discriminants for `STATS_REQUEST`/`STATS_REPLY`.
//! - **Frame/buffer sizes**: Ethernet frame dimensions shared with the packet view.
//!
//! # Note
//!
//! Per-message wire struct sizes live next to their codec in `wire/`, since
//! they are specific to those structures.

// =============================================================================
// Wire Header
// =============================================================================

/// OpenFlow 1.0 version byte.
pub const OFP_VERSION: u8 = 0x01;

/// Size of the common `ofp_header` in bytes.
pub const OFP_HEADER_LEN: usize = 8;

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Maximum Ethernet frame size including a VLAN tag (1500 + 14 header + 4 VLAN).
pub const MAX_FRAME_SIZE: usize = 1518;

/// Standard Ethernet MTU (Maximum Transmission Unit).
pub const MTU: usize = 1500;

/// Ethernet header size (dst MAC + src MAC + EtherType), untagged.
pub const ETH_HEADER_SIZE: usize = 14;

/// VLAN tag size (TPID + TCI).
pub const VLAN_TAG_SIZE: usize = 4;

/// Minimum Ethernet frame size (excluding FCS).
pub const MIN_FRAME_SIZE: usize = 60;

/// Default `miss_send_len`: bytes of a table-miss frame sent in `PACKET_IN`.
pub const DEFAULT_MISS_SEND_LEN: u16 = 128;

/// Default number of flow table slots.
pub const DEFAULT_MAX_FLOWS: usize = 128;

/// Number of physical OpenFlow ports modeled by this switch.
pub const DEFAULT_MAX_PORTS: usize = 4;

/// Maximum number of actions carried by a single flow entry.
pub const MAX_ACTIONS: usize = 4;

/// Bytes of an offending request echoed back in an `ERROR` message.
pub const ERROR_ECHO_LEN: usize = 64;

// =============================================================================
// Reserved Ports (OFPP_*)
// =============================================================================

/// Send the packet out the input port.
pub const OFPP_IN_PORT: u16 = 0xFFF8;
/// Perform actions in flow table, NOT SUPPORTED in this core (multi-table pipelines).
pub const OFPP_TABLE: u16 = 0xFFF9;
/// Process with normal L2/L3 switching, NOT SUPPORTED — rejected at install time.
pub const OFPP_NORMAL: u16 = 0xFFFA;
/// All physical ports except input port.
pub const OFPP_FLOOD: u16 = 0xFFFB;
/// All physical ports except input port (equivalent to FLOOD in this core).
pub const OFPP_ALL: u16 = 0xFFFC;
/// Send to controller.
pub const OFPP_CONTROLLER: u16 = 0xFFFD;
/// Local openflow "port".
pub const OFPP_LOCAL: u16 = 0xFFFE;
/// Wildcard port used only for flow mod (delete) matching.
pub const OFPP_NONE: u16 = 0xFFFF;

// =============================================================================
// Wildcards (OFPFW_*)
// =============================================================================

/// Switch input port.
pub const OFPFW_IN_PORT: u32 = 1 << 0;
/// VLAN id.
pub const OFPFW_DL_VLAN: u32 = 1 << 1;
/// Ethernet source address.
pub const OFPFW_DL_SRC: u32 = 1 << 2;
/// Ethernet destination address.
pub const OFPFW_DL_DST: u32 = 1 << 3;
/// Ethernet frame type.
pub const OFPFW_DL_TYPE: u32 = 1 << 4;
/// IP protocol.
pub const OFPFW_NW_PROTO: u32 = 1 << 5;
/// TCP/UDP source port.
pub const OFPFW_TP_SRC: u32 = 1 << 6;
/// TCP/UDP destination port.
pub const OFPFW_TP_DST: u32 = 1 << 7;
/// Shift bit for the IP source address wildcard prefix-length sub-field.
pub const OFPFW_NW_SRC_SHIFT: u32 = 8;
/// Mask covering the IP source wildcard prefix-length sub-field (6 bits).
pub const OFPFW_NW_SRC_MASK: u32 = 0x3F << OFPFW_NW_SRC_SHIFT;
/// Shift bit for the IP destination address wildcard prefix-length sub-field.
pub const OFPFW_NW_DST_SHIFT: u32 = 14;
/// Mask covering the IP destination wildcard prefix-length sub-field (6 bits).
pub const OFPFW_NW_DST_MASK: u32 = 0x3F << OFPFW_NW_DST_SHIFT;
/// VLAN priority.
pub const OFPFW_DL_VLAN_PCP: u32 = 1 << 20;
/// IP ToS (DSCP field, 6 bits).
pub const OFPFW_NW_TOS: u32 = 1 << 21;
/// Wildcard everything.
pub const OFPFW_ALL: u32 = (1 << 22) - 1;

// =============================================================================
// Action Types (OFPAT_*)
// =============================================================================

/// Output to switch port.
pub const OFPAT_OUTPUT: u16 = 0;
/// Set the 802.1q VLAN id.
pub const OFPAT_SET_VLAN_VID: u16 = 1;
/// Set the 802.1q priority.
pub const OFPAT_SET_VLAN_PCP: u16 = 2;
/// Strip the 802.1q header.
pub const OFPAT_STRIP_VLAN: u16 = 3;
/// Set Ethernet source address.
pub const OFPAT_SET_DL_SRC: u16 = 4;
/// Set Ethernet destination address.
pub const OFPAT_SET_DL_DST: u16 = 5;
/// Set IP source address.
pub const OFPAT_SET_NW_SRC: u16 = 6;
/// Set IP destination address.
pub const OFPAT_SET_NW_DST: u16 = 7;
/// Set IP ToS (DSCP field, 6 bits).
pub const OFPAT_SET_NW_TOS: u16 = 8;
/// Set TCP/UDP source port.
pub const OFPAT_SET_TP_SRC: u16 = 9;
/// Set TCP/UDP destination port.
pub const OFPAT_SET_TP_DST: u16 = 10;
/// Sentinel VLAN VID reinterpreted at install time as `STRIP_VLAN`.
pub const STRIP_VLAN_VID_SENTINEL: u16 = 0xFFFF;

// =============================================================================
// Stats Types (OFPST_*)
// =============================================================================

/// Switch description.
pub const OFPST_DESC: u16 = 0;
/// Individual flow statistics.
pub const OFPST_FLOW: u16 = 1;
/// Aggregate flow statistics.
pub const OFPST_AGGREGATE: u16 = 2;
/// Flow table statistics.
pub const OFPST_TABLE: u16 = 3;
/// Physical port statistics.
pub const OFPST_PORT: u16 = 4;
/// Queue statistics for a port.
pub const OFPST_QUEUE: u16 = 5;
/// Vendor extension.
pub const OFPST_VENDOR: u16 = 0xFFFF;

// =============================================================================
// Flow Mod Flags
// =============================================================================

/// Send a `FLOW_REMOVED` notification when this flow entry expires or is deleted.
pub const OFPFF_SEND_FLOW_REM: u16 = 1 << 0;
/// Check for overlapping entries before installing (not implemented: treated as no-op).
pub const OFPFF_CHECK_OVERLAP: u16 = 1 << 1;
/// Remove emergency flows when a connection to the controller is lost (not supported).
pub const OFPFF_EMERG: u16 = 1 << 2;

// =============================================================================
// Capabilities
// =============================================================================

/// Switch can report flow statistics.
pub const OFPC_FLOW_STATS: u32 = 1 << 0;
/// Switch can report table statistics.
pub const OFPC_TABLE_STATS: u32 = 1 << 1;
/// Switch can report port statistics.
pub const OFPC_PORT_STATS: u32 = 1 << 2;
