//! A mutable view over an Ethernet frame.
//!
//! [`PacketView`] never reallocates: it borrows a fixed byte slice (sized by
//! the caller for at most `max_frame_len + 4` bytes, to allow one VLAN tag
//! insertion) and a mutable length cell tracking how many of those bytes are
//! currently live frame data. All offset arithmetic for VLAN presence (14 vs
//! 18 byte L3 offset) is centralized here; no other module computes a frame
//! offset directly.
//!
//! # Example
//!
//! ```ignore
//! let mut buf = [0u8; 1522];
//! let mut len = 64usize;
//! let mut view = PacketView::new(&mut buf, &mut len);
//! if view.ethertype() == Some(0x0800) {
//!     view.set_ipv4(IpField::Dst, 0x0a00_0002);
//!     view.recompute_ip_and_l4_checksums();
//! }
//! ```

pub mod checksum;

const ETH_HEADER_LEN: usize = 14;
const VLAN_TAG_LEN: usize = 4;
const VLAN_TPID: u16 = 0x8100;
const ETHERTYPE_IPV4: u16 = 0x0800;
const IP_PROTO_TCP: u8 = 6;
const IP_PROTO_UDP: u8 = 17;

/// Which MAC address field to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacField {
    /// Ethernet destination address.
    Dst,
    /// Ethernet source address.
    Src,
}

/// Which IPv4 address field to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IpField {
    /// IPv4 source address.
    Src,
    /// IPv4 destination address.
    Dst,
}

/// Which transport-layer port field to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortField {
    /// TCP/UDP source port.
    Src,
    /// TCP/UDP destination port.
    Dst,
}

/// A mutable view over an Ethernet frame held in caller-owned storage.
///
/// `buf` must be large enough to hold the frame plus one inserted VLAN tag;
/// `len` tracks the live portion of `buf` and is updated in place by
/// [`insert_vlan`](Self::insert_vlan) and [`strip_vlan`](Self::strip_vlan).
pub struct PacketView<'a> {
    buf: &'a mut [u8],
    len: &'a mut usize,
}

impl<'a> PacketView<'a> {
    /// Wraps `buf`/`len` in a view. `*len` must already be within `buf.len()`.
    pub fn new(buf: &'a mut [u8], len: &'a mut usize) -> Self {
        debug_assert!(*len <= buf.len());
        PacketView { buf, len }
    }

    /// Current frame length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        *self.len
    }

    /// Whether the frame is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self.len == 0
    }

    /// The live frame bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..*self.len]
    }

    fn tpid(&self) -> Option<u16> {
        if *self.len < ETH_HEADER_LEN + 2 {
            return None;
        }
        Some(u16::from_be_bytes([self.buf[12], self.buf[13]]))
    }

    /// Whether an 802.1Q VLAN tag is present immediately after the MACs.
    #[must_use]
    pub fn has_vlan(&self) -> bool {
        self.tpid() == Some(VLAN_TPID)
    }

    /// Byte offset of the VLAN TPID field, if a tag is present.
    #[must_use]
    pub fn vlan_header_offset(&self) -> Option<usize> {
        if self.has_vlan() { Some(12) } else { None }
    }

    /// Offset of the L3 (IP) header: 14 untagged, 18 with a VLAN tag.
    #[must_use]
    pub fn l3_offset(&self) -> usize {
        if self.has_vlan() {
            ETH_HEADER_LEN + VLAN_TAG_LEN
        } else {
            ETH_HEADER_LEN
        }
    }

    /// The effective EtherType: the inner type when a VLAN tag is present.
    #[must_use]
    pub fn ethertype(&self) -> Option<u16> {
        let off = if self.has_vlan() { 16 } else { 12 };
        if *self.len < off + 2 {
            return None;
        }
        Some(u16::from_be_bytes([self.buf[off], self.buf[off + 1]]))
    }

    fn ihl(&self) -> Option<usize> {
        let l3 = self.l3_offset();
        if *self.len < l3 + 1 {
            return None;
        }
        Some(usize::from(self.buf[l3] & 0x0F) * 4)
    }

    fn l4_offset(&self) -> Option<usize> {
        Some(self.l3_offset() + self.ihl()?)
    }

    /// IP protocol number (valid only when [`ethertype`](Self::ethertype) is IPv4).
    #[must_use]
    pub fn ip_proto(&self) -> Option<u8> {
        if self.ethertype() != Some(ETHERTYPE_IPV4) {
            return None;
        }
        let l3 = self.l3_offset();
        if *self.len < l3 + 10 {
            return None;
        }
        Some(self.buf[l3 + 9])
    }

    /// Overwrites the Ethernet source or destination address.
    pub fn set_mac(&mut self, field: MacField, mac: [u8; 6]) {
        let off = match field {
            MacField::Dst => 0,
            MacField::Src => 6,
        };
        if *self.len >= off + 6 {
            self.buf[off..off + 6].copy_from_slice(&mac);
        }
    }

    /// Overwrites the IPv4 source or destination address (does not recompute checksums).
    pub fn set_ipv4(&mut self, field: IpField, addr: u32) {
        let Some(l3) = Some(self.l3_offset()) else {
            return;
        };
        let off = l3 + match field {
            IpField::Src => 12,
            IpField::Dst => 16,
        };
        if *self.len >= off + 4 {
            self.buf[off..off + 4].copy_from_slice(&addr.to_be_bytes());
        }
    }

    /// Overwrites the IPv4 ToS/DSCP byte (does not recompute checksums).
    pub fn set_tos(&mut self, tos: u8) {
        let l3 = self.l3_offset();
        if *self.len >= l3 + 2 {
            self.buf[l3 + 1] = tos;
        }
    }

    /// Overwrites the TCP/UDP source or destination port (does not recompute checksums).
    pub fn set_l4_port(&mut self, field: PortField, port: u16) {
        let Some(l4) = self.l4_offset() else {
            return;
        };
        let off = l4
            + match field {
                PortField::Src => 0,
                PortField::Dst => 2,
            };
        if *self.len >= off + 2 {
            self.buf[off..off + 2].copy_from_slice(&port.to_be_bytes());
        }
    }

    /// Inserts an 802.1Q tag with the given TCI. No-op if already tagged.
    pub fn insert_vlan(&mut self, tci: u16) {
        if self.has_vlan() {
            return;
        }
        let old_len = *self.len;
        let new_len = old_len + VLAN_TAG_LEN;
        if new_len > self.buf.len() {
            return;
        }
        self.buf.copy_within(ETH_HEADER_LEN.., ETH_HEADER_LEN + VLAN_TAG_LEN);
        self.buf[12..14].copy_from_slice(&VLAN_TPID.to_be_bytes());
        self.buf[14..16].copy_from_slice(&tci.to_be_bytes());
        *self.len = new_len;
    }

    /// Removes the 802.1Q tag, if present.
    pub fn strip_vlan(&mut self) {
        if !self.has_vlan() {
            return;
        }
        let old_len = *self.len;
        self.buf.copy_within(ETH_HEADER_LEN + VLAN_TAG_LEN..old_len, ETH_HEADER_LEN);
        *self.len = old_len - VLAN_TAG_LEN;
    }

    /// Sets the 12-bit VLAN id, inserting a tag first if none is present.
    pub fn set_vlan_vid(&mut self, vid: u16) {
        if !self.has_vlan() {
            self.insert_vlan(0);
        }
        let pcp = self.vlan_pcp().unwrap_or(0);
        let tci = (u16::from(pcp) << 13) | (vid & 0x0FFF);
        self.buf[14..16].copy_from_slice(&tci.to_be_bytes());
    }

    /// Sets the 3-bit VLAN priority, inserting a tag first if none is present.
    pub fn set_vlan_pcp(&mut self, pcp: u8) {
        if !self.has_vlan() {
            self.insert_vlan(0);
        }
        let vid = self.vlan_vid().unwrap_or(0);
        let tci = (u16::from(pcp & 0x07) << 13) | (vid & 0x0FFF);
        self.buf[14..16].copy_from_slice(&tci.to_be_bytes());
    }

    fn vlan_vid(&self) -> Option<u16> {
        if !self.has_vlan() {
            return None;
        }
        Some(u16::from_be_bytes([self.buf[14], self.buf[15]]) & 0x0FFF)
    }

    fn vlan_pcp(&self) -> Option<u8> {
        if !self.has_vlan() {
            return None;
        }
        Some((u16::from_be_bytes([self.buf[14], self.buf[15]]) >> 13) as u8)
    }

    /// Recomputes the IPv4 header checksum and, for TCP/UDP, the transport
    /// checksum over the pseudo-header plus segment. UDP checksums are
    /// always recomputed (the stricter of the two policies the spec allows);
    /// a previously-zero UDP checksum is not special-cased.
    pub fn recompute_ip_and_l4_checksums(&mut self) {
        if self.ethertype() != Some(ETHERTYPE_IPV4) {
            return;
        }
        let l3 = self.l3_offset();
        let Some(ihl) = self.ihl() else { return };
        if *self.len < l3 + ihl {
            return;
        }

        self.buf[l3 + 10] = 0;
        self.buf[l3 + 11] = 0;
        let ip_sum = checksum::internet_checksum(&self.buf[l3..l3 + ihl]);
        self.buf[l3 + 10..l3 + 12].copy_from_slice(&ip_sum.to_be_bytes());

        let Some(proto) = self.ip_proto() else { return };
        let l4 = l3 + ihl;
        let src = u32::from_be_bytes(self.buf[l3 + 12..l3 + 16].try_into().unwrap());
        let dst = u32::from_be_bytes(self.buf[l3 + 16..l3 + 20].try_into().unwrap());

        let checksum_off = match proto {
            IP_PROTO_TCP => 16,
            IP_PROTO_UDP => 6,
            _ => return,
        };
        if *self.len < l4 + checksum_off + 2 {
            return;
        }
        let segment = &self.buf[l4..*self.len];
        let sum = checksum::transport_checksum(src, dst, proto, segment, checksum_off);
        let off = l4 + checksum_off;
        self.buf[off..off + 2].copy_from_slice(&sum.to_be_bytes());
    }
}
