//! The switch facade: owns all per-datapath state and exposes the two entry
//! points embedding code calls — one per packet, one per controller message.
//!
//! [`Switch::on_frame`] is the data-plane path: table lookup, action
//! application, egress. [`Switch::handle_controller_bytes`] is the
//! control-plane path: it intercepts the two message kinds
//! [`crate::controller::dispatch`] cannot handle itself (`PACKET_OUT`, which
//! needs [`FrameDriver`], and `PORT` stats, which need this struct's own
//! counters) and otherwise delegates to `dispatch`.

use crate::action::ActionList;
use crate::config::{Config, PortCounters, SwitchConfig};
use crate::constants::{DEFAULT_MAX_PORTS, MAX_FRAME_SIZE, OFPC_FLOW_STATS, OFPC_PORT_STATS, OFPC_TABLE_STATS, OFPST_PORT};
use crate::controller::barrier::BarrierSequencer;
use crate::controller::stats::encode_port_reply;
use crate::controller::{dispatch, ControllerContext};
use crate::driver::{ConnectionState, ControllerTransport, FrameDriver};
use crate::engine::{self, Egress};
use crate::error::OfError;
use crate::packet::PacketView;
use crate::table::FlowTable;
use crate::wire::features::PhyPort;
use crate::wire::header::{MessageType, OfpHeader};
use crate::wire::packet_io::{decode_packet_out, encode_packet_in, PacketInReason};
use crate::wire::stats::decode_stats_request_header;

/// Headroom every frame buffer reserves for one VLAN tag insertion.
const FRAME_BUF_LEN: usize = MAX_FRAME_SIZE + 4;

/// A complete OpenFlow 1.0 switch datapath: one flow table, runtime config,
/// and per-port counters, generic over flow table capacity. Port count is
/// fixed at [`DEFAULT_MAX_PORTS`], matching [`Config`]/[`SwitchConfig`].
pub struct Switch<const MAX_FLOWS: usize> {
    config: Config,
    switch_config: SwitchConfig,
    table: FlowTable<MAX_FLOWS>,
    barrier: BarrierSequencer,
    port_counters: [PortCounters; DEFAULT_MAX_PORTS],
    scratch: [u8; FRAME_BUF_LEN],
}

impl<const MAX_FLOWS: usize> Switch<MAX_FLOWS> {
    /// Builds a switch from its immutable configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let switch_config = SwitchConfig::from_config(&config);
        Switch {
            config,
            switch_config,
            table: FlowTable::new(),
            barrier: BarrierSequencer::new(),
            port_counters: [PortCounters::default(); DEFAULT_MAX_PORTS],
            scratch: [0u8; FRAME_BUF_LEN],
        }
    }

    /// Read-only access to the flow table, e.g. for diagnostics.
    #[must_use]
    pub const fn table(&self) -> &FlowTable<MAX_FLOWS> {
        &self.table
    }

    fn enabled_port_list(&self) -> ([u16; DEFAULT_MAX_PORTS], usize) {
        let mut ports = [0u16; DEFAULT_MAX_PORTS];
        let mut count = 0;
        for (i, enabled) in self.switch_config.port_enabled.iter().enumerate() {
            if *enabled {
                ports[count] = (i + 1) as u16;
                count += 1;
            }
        }
        (ports, count)
    }

    /// Processes one received Ethernet frame on `ingress_port`.
    ///
    /// On a flow-table hit, applies the matched entry's actions: header
    /// rewrites happen in place, `Output` actions forward through `driver`,
    /// and an `Output(OFPP_CONTROLLER)` results in a `PACKET_IN` sent through
    /// `transport`. A table miss while disconnected from the controller is
    /// dropped; a miss while connected produces a `PACKET_IN` with reason
    /// `NoMatch`, for both `FailState` variants this core supports.
    pub fn on_frame<D: FrameDriver, T: ControllerTransport>(
        &mut self,
        ingress_port: u16,
        frame: &[u8],
        driver: &mut D,
        transport: &mut T,
    ) -> Result<(), OfError> {
        if frame.len() > self.scratch.len() {
            return Ok(()); // oversized frame, silently dropped
        }
        self.scratch[..frame.len()].copy_from_slice(frame);
        let mut len = frame.len();
        let frame_len = len as u32;

        let hit_index = {
            let view = PacketView::new(&mut self.scratch, &mut len);
            self.table.lookup(&view, ingress_port, frame_len)
        };

        let Some(index) = hit_index else {
            let mut miss_frame = [0u8; FRAME_BUF_LEN];
            miss_frame[..len].copy_from_slice(&self.scratch[..len]);
            self.handle_miss(ingress_port, &miss_frame[..len], transport);
            return Ok(());
        };

        let actions: ActionList = self.table.get(index).map(|e| e.actions).unwrap_or_default();
        let (ports, port_count) = self.enabled_port_list();
        let mut view = PacketView::new(&mut self.scratch, &mut len);
        let egress = engine::apply(&actions, &mut view, ingress_port, &ports[..port_count]);
        let bytes_len = view.len();

        let mut out_frame = [0u8; FRAME_BUF_LEN];
        out_frame[..bytes_len].copy_from_slice(&self.scratch[..bytes_len]);

        for e in egress.iter() {
            match e {
                Egress::Port(port) => self.forward(port, &out_frame[..bytes_len], driver),
                Egress::Controller { max_len } => self.send_packet_in(
                    ingress_port,
                    &out_frame[..bytes_len],
                    PacketInReason::Action,
                    max_len,
                    transport,
                ),
            }
        }
        Ok(())
    }

    fn handle_miss<T: ControllerTransport>(&mut self, ingress_port: u16, frame: &[u8], transport: &mut T) {
        if transport.connection_state() != ConnectionState::Established {
            #[cfg(feature = "defmt")]
            defmt::trace!(
                "data-plane miss on port {}: controller not connected, fail-secure drop",
                ingress_port
            );
            self.record_rx_dropped(ingress_port);
            return;
        }
        #[cfg(feature = "defmt")]
        defmt::trace!("data-plane miss on port {}: forwarding to controller", ingress_port);
        let miss_send_len = self.switch_config.miss_send_len;
        self.send_packet_in(ingress_port, frame, PacketInReason::NoMatch, miss_send_len, transport);
    }

    fn forward<D: FrameDriver>(&mut self, port: u16, frame: &[u8], driver: &mut D) {
        if !self.config.is_port_enabled(port as usize) || !driver.link_up(port) {
            self.record_tx_dropped(port);
            return;
        }
        if driver.gmac_write(port, frame).is_ok() {
            self.record_tx(port, frame.len());
        } else {
            self.record_tx_dropped(port);
        }
    }

    fn send_packet_in<T: ControllerTransport>(
        &mut self,
        ingress_port: u16,
        frame: &[u8],
        reason: PacketInReason,
        max_len: u16,
        transport: &mut T,
    ) {
        let mut out = [0u8; FRAME_BUF_LEN];
        if let Ok(len) = encode_packet_in(0, ingress_port, reason, frame, max_len, &mut out) {
            let _ = transport.send_reliable(&out[..len]);
        }
    }

    fn record_tx(&mut self, port: u16, bytes: usize) {
        if let Some(c) = self.port_counters.get_mut(usize::from(port).wrapping_sub(1)) {
            c.tx_packets += 1;
            c.tx_bytes += bytes as u64;
        }
    }

    fn record_tx_dropped(&mut self, port: u16) {
        if let Some(c) = self.port_counters.get_mut(usize::from(port).wrapping_sub(1)) {
            c.tx_dropped += 1;
        }
    }

    fn record_rx_dropped(&mut self, port: u16) {
        if let Some(c) = self.port_counters.get_mut(usize::from(port).wrapping_sub(1)) {
            c.rx_dropped += 1;
        }
    }

    /// Processes one received controller message. `ports` describes the
    /// live port set for `FEATURES_REPLY`; `emit` receives each reply
    /// message in turn (zero, one, or many for paginated stats and
    /// `FLOW_REMOVED` side effects).
    pub fn handle_controller_bytes<D: FrameDriver>(
        &mut self,
        data: &[u8],
        ports: &[PhyPort],
        driver: &mut D,
        mut emit: impl FnMut(&[u8]),
    ) -> Result<(), OfError> {
        let header = OfpHeader::decode(data).map_err(OfError::Decode)?;

        match header.msg_type {
            MessageType::PacketOut => self.handle_packet_out(data, driver),
            MessageType::StatsRequest => {
                let req = decode_stats_request_header(data).map_err(OfError::Decode)?;
                if req.stats_type == OFPST_PORT {
                    self.handle_stats_port(header.xid, &mut emit);
                    Ok(())
                } else {
                    self.dispatch_generic(data, ports, &mut emit)
                }
            }
            _ => self.dispatch_generic(data, ports, &mut emit),
        }
    }

    fn dispatch_generic(
        &mut self,
        data: &[u8],
        ports: &[PhyPort],
        emit: &mut impl FnMut(&[u8]),
    ) -> Result<(), OfError> {
        let datapath_id = self.config.datapath_id();
        let mut ctx = ControllerContext {
            table: &mut self.table,
            switch_config: &mut self.switch_config,
            barrier: &mut self.barrier,
            datapath_id,
            capabilities: OFPC_FLOW_STATS | OFPC_TABLE_STATS | OFPC_PORT_STATS,
            ports,
        };
        dispatch(data, &mut ctx, emit)
    }

    fn handle_stats_port(&self, xid: u32, emit: &mut impl FnMut(&[u8])) {
        let mut counters = [(0u16, PortCounters::default()); DEFAULT_MAX_PORTS];
        for (i, counter) in self.port_counters.iter().enumerate() {
            counters[i] = ((i + 1) as u16, *counter);
        }
        let mut buf = [0u8; 512];
        if let Ok(len) = encode_port_reply(xid, &counters, &mut buf) {
            emit(&buf[..len]);
        }
    }

    fn handle_packet_out<D: FrameDriver>(&mut self, data: &[u8], driver: &mut D) -> Result<(), OfError> {
        let decoded = decode_packet_out(data).map_err(OfError::Decode)?;
        if decoded.data.len() > self.scratch.len() {
            return Ok(());
        }
        self.scratch[..decoded.data.len()].copy_from_slice(decoded.data);
        let mut len = decoded.data.len();
        let (ports, port_count) = self.enabled_port_list();
        let mut view = PacketView::new(&mut self.scratch, &mut len);
        let egress = engine::apply(&decoded.actions, &mut view, decoded.in_port, &ports[..port_count]);
        let bytes_len = view.len();

        let mut out_frame = [0u8; FRAME_BUF_LEN];
        out_frame[..bytes_len].copy_from_slice(&self.scratch[..bytes_len]);
        for e in egress.iter() {
            if let Egress::Port(port) = e {
                self.forward(port, &out_frame[..bytes_len], driver);
            }
            // A controller-injected packet naming OFPP_CONTROLLER as output
            // is a controller bug; this core drops that egress rather than
            // looping the packet back.
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::constants::{OFPFW_ALL, OFPP_NONE};
    use crate::controller::flow_mod::apply_flow_mod;
    use crate::table::Match;
    use crate::wire::flow_mod::{decode_flow_mod, encode_flow_mod, FlowMod, FlowModCommand};

    struct MockDriver {
        sent: [(u16, usize); 8],
        sent_count: usize,
        link: bool,
    }
    impl FrameDriver for MockDriver {
        type Error = ();
        fn gmac_write(&mut self, port: u16, frame: &[u8]) -> Result<(), ()> {
            if self.sent_count < self.sent.len() {
                self.sent[self.sent_count] = (port, frame.len());
                self.sent_count += 1;
            }
            Ok(())
        }
        fn link_up(&self, _port: u16) -> bool {
            self.link
        }
    }

    struct MockTransport {
        state: ConnectionState,
        sent: usize,
    }
    impl ControllerTransport for MockTransport {
        type Error = ();
        fn send_reliable(&mut self, _message: &[u8]) -> Result<(), ()> {
            self.sent += 1;
            Ok(())
        }
        fn connection_state(&self) -> ConnectionState {
            self.state
        }
    }

    fn switch_with_output_flow() -> Switch<16> {
        let config = Config::new([0; 6]).with_port_enabled(1, true).with_port_enabled(2, true);
        let mut switch: Switch<16> = Switch::new(config);

        let mut actions = ActionList::new();
        actions.push(Action::Output { port: 2, max_len: 0 }).unwrap();
        let flow_mod = FlowMod {
            xid: 1,
            pattern: Match { wildcards: OFPFW_ALL, ..Match::default() },
            cookie: 0,
            command: FlowModCommand::Add,
            idle_timeout: 0,
            hard_timeout: 0,
            priority: 1,
            buffer_id: 0xFFFF_FFFF,
            out_port: OFPP_NONE,
            flags: 0,
            actions,
        };
        let mut buf = [0u8; 128];
        let len = encode_flow_mod(&flow_mod, &mut buf).unwrap();
        apply_flow_mod(&mut switch.table, &decode_flow_mod(&buf[..len]).unwrap()).unwrap();
        switch
    }

    #[test]
    fn frame_matching_flow_forwards_to_configured_port() {
        let mut switch = switch_with_output_flow();
        let mut driver = MockDriver { sent: [(0, 0); 8], sent_count: 0, link: true };
        let mut transport = MockTransport { state: ConnectionState::Established, sent: 0 };

        let frame = [0u8; 64];
        switch.on_frame(1, &frame, &mut driver, &mut transport).unwrap();

        assert_eq!(driver.sent_count, 1);
        assert_eq!(driver.sent[0].0, 2);
    }

    #[test]
    fn miss_while_disconnected_is_dropped_not_sent() {
        let config = Config::new([0; 6]).with_port_enabled(1, true);
        let mut switch: Switch<16> = Switch::new(config);
        let mut driver = MockDriver { sent: [(0, 0); 8], sent_count: 0, link: true };
        let mut transport = MockTransport { state: ConnectionState::Disconnected, sent: 0 };

        let frame = [0u8; 64];
        switch.on_frame(1, &frame, &mut driver, &mut transport).unwrap();

        assert_eq!(driver.sent_count, 0);
        assert_eq!(transport.sent, 0);
    }

    #[test]
    fn miss_while_connected_sends_packet_in() {
        let config = Config::new([0; 6]).with_port_enabled(1, true);
        let mut switch: Switch<16> = Switch::new(config);
        let mut driver = MockDriver { sent: [(0, 0); 8], sent_count: 0, link: true };
        let mut transport = MockTransport { state: ConnectionState::Established, sent: 0 };

        let frame = [0u8; 64];
        switch.on_frame(1, &frame, &mut driver, &mut transport).unwrap();

        assert_eq!(transport.sent, 1);
    }

    #[test]
    fn port_stats_request_is_answered_directly_by_switch() {
        let mut switch: Switch<16> = Switch::new(Config::default());
        let mut driver = MockDriver { sent: [(0, 0); 8], sent_count: 0, link: true };

        let mut buf = [0u8; 12];
        let header = OfpHeader { msg_type: MessageType::StatsRequest, length: buf.len() as u16, xid: 1 };
        header.encode(&mut buf).unwrap();
        buf[8..10].copy_from_slice(&OFPST_PORT.to_be_bytes());

        let mut replies = 0;
        switch
            .handle_controller_bytes(&buf, &[], &mut driver, |reply| {
                replies += 1;
                assert_eq!(reply[1], MessageType::StatsReply as u8);
            })
            .unwrap();
        assert_eq!(replies, 1);
    }
}
