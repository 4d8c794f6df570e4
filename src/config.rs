//! Static and runtime configuration surfaces.
//!
//! [`Config`] is built once at startup via its `with_*` builder methods and
//! never changes afterward — it describes the hardware this core is bound
//! to (MAC address, port count, datapath id). [`SwitchConfig`] is the
//! subset of state the controller can mutate at runtime over `SET_CONFIG`
//! and `PORT_MOD`.

use crate::constants::{DEFAULT_MAX_FLOWS, DEFAULT_MAX_PORTS, DEFAULT_MISS_SEND_LEN};
use crate::wire::config::FragHandling;

/// What a port does with frames that arrive while the controller connection
/// is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailState {
    /// Drop all frames (the OpenFlow 1.0 "fail secure" mode).
    Secure,
    /// Forward frames as an ordinary L2 learning switch would (not
    /// implemented by this core; behaves identically to `Secure`).
    Standalone,
}

/// Immutable, hardware-derived switch configuration, assembled once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    mac_address: [u8; 6],
    fail_state: FailState,
    miss_send_len: u16,
    port_enabled: [bool; DEFAULT_MAX_PORTS],
    datapath_id_suffix: u16,
}

impl Config {
    /// Starts a builder with conservative defaults: fail-secure, the
    /// default `miss_send_len`, and every port disabled until explicitly
    /// enabled.
    #[must_use]
    pub const fn new(mac_address: [u8; 6]) -> Self {
        Config {
            mac_address,
            fail_state: FailState::Secure,
            miss_send_len: DEFAULT_MISS_SEND_LEN,
            port_enabled: [false; DEFAULT_MAX_PORTS],
            datapath_id_suffix: 0,
        }
    }

    /// Overrides the switch MAC address used to derive `OFPP_LOCAL`'s identity.
    #[must_use]
    pub const fn with_mac_address(mut self, mac: [u8; 6]) -> Self {
        self.mac_address = mac;
        self
    }

    /// Sets the behavior while disconnected from the controller.
    #[must_use]
    pub const fn with_fail_state(mut self, fail_state: FailState) -> Self {
        self.fail_state = fail_state;
        self
    }

    /// Sets the default `miss_send_len` applied before any `SET_CONFIG`.
    #[must_use]
    pub const fn with_miss_send_len(mut self, len: u16) -> Self {
        self.miss_send_len = len;
        self
    }

    /// Marks `port` (1-based, must be `< DEFAULT_MAX_PORTS` after
    /// subtracting 1) as enabled at startup.
    #[must_use]
    pub const fn with_port_enabled(mut self, port: usize, enabled: bool) -> Self {
        if port >= 1 && port - 1 < DEFAULT_MAX_PORTS {
            self.port_enabled[port - 1] = enabled;
        }
        self
    }

    /// Sets the low 16 bits of the 64-bit datapath id (the high 48 bits are
    /// derived from the MAC address, per convention).
    #[must_use]
    pub const fn with_datapath_id_suffix(mut self, suffix: u16) -> Self {
        self.datapath_id_suffix = suffix;
        self
    }

    /// The switch MAC address.
    #[must_use]
    pub const fn mac_address(&self) -> [u8; 6] {
        self.mac_address
    }

    /// Behavior while disconnected from the controller.
    #[must_use]
    pub const fn fail_state(&self) -> FailState {
        self.fail_state
    }

    /// Whether `port` (1-based) starts enabled.
    #[must_use]
    pub const fn is_port_enabled(&self, port: usize) -> bool {
        port >= 1 && port - 1 < DEFAULT_MAX_PORTS && self.port_enabled[port - 1]
    }

    /// Derives the 64-bit datapath id from the MAC address and suffix.
    #[must_use]
    pub const fn datapath_id(&self) -> u64 {
        let mac = self.mac_address;
        let high = (mac[0] as u64) << 40
            | (mac[1] as u64) << 32
            | (mac[2] as u64) << 24
            | (mac[3] as u64) << 16
            | (mac[4] as u64) << 8
            | (mac[5] as u64);
        (high << 16) | self.datapath_id_suffix as u64
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01])
    }
}

/// Runtime-mutable switch state updated by `SET_CONFIG` and `PORT_MOD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchConfig {
    /// Current fragment-handling policy.
    pub frag_handling: FragHandling,
    /// Current `miss_send_len`.
    pub miss_send_len: u16,
    /// Per-port administrative up/down state (index 0 is port 1).
    pub port_enabled: [bool; DEFAULT_MAX_PORTS],
}

impl SwitchConfig {
    /// Builds runtime config seeded from the immutable [`Config`].
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        SwitchConfig {
            frag_handling: FragHandling::Normal,
            miss_send_len: config.miss_send_len,
            port_enabled: config.port_enabled,
        }
    }

    /// Lists the currently-enabled physical port numbers (1-based).
    pub fn enabled_ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.port_enabled
            .iter()
            .enumerate()
            .filter(|(_, enabled)| **enabled)
            .map(|(i, _)| (i + 1) as u16)
    }
}

/// Per-port data-plane counters, mirrored into `PORT` stats replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortCounters {
    /// Frames received.
    pub rx_packets: u64,
    /// Frames transmitted.
    pub tx_packets: u64,
    /// Bytes received.
    pub rx_bytes: u64,
    /// Bytes transmitted.
    pub tx_bytes: u64,
    /// Frames dropped on receive (e.g. fragment policy, table-full on miss).
    pub rx_dropped: u64,
    /// Frames dropped on transmit (e.g. port disabled).
    pub tx_dropped: u64,
}
