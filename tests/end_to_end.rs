//! End-to-end scenarios driving [`Switch`] through both its entry points,
//! as an embedding program would: a controller handshake, a `FLOW_MOD`
//! install, a matching data-plane frame, and the resulting `PORT` stats.

use of10_switch::driver::{ConnectionState, ControllerTransport, FrameDriver};
use of10_switch::wire::flow_mod::{encode_flow_mod, FlowMod, FlowModCommand};
use of10_switch::wire::header::{MessageType, OfpHeader};
use of10_switch::{Action, ActionList, Config, Match, Switch};

struct TestDriver {
    sent: Vec<(u16, usize)>,
}

impl FrameDriver for TestDriver {
    type Error = ();

    fn gmac_write(&mut self, port: u16, frame: &[u8]) -> Result<(), ()> {
        self.sent.push((port, frame.len()));
        Ok(())
    }

    fn link_up(&self, _port: u16) -> bool {
        true
    }
}

struct TestTransport {
    state: ConnectionState,
    sent: Vec<Vec<u8>>,
}

impl ControllerTransport for TestTransport {
    type Error = ();

    fn send_reliable(&mut self, message: &[u8]) -> Result<(), ()> {
        self.sent.push(message.to_vec());
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        self.state
    }
}

fn flow_mod_output_to_port(out_port: u16) -> FlowMod {
    let mut actions = ActionList::new();
    actions.push(Action::Output { port: out_port, max_len: 0 }).unwrap();
    FlowMod {
        xid: 1,
        pattern: Match { wildcards: of10_switch::constants::OFPFW_ALL, ..Match::default() },
        cookie: 0,
        command: FlowModCommand::Add,
        idle_timeout: 0,
        hard_timeout: 0,
        priority: 1,
        buffer_id: 0xFFFF_FFFF,
        out_port: of10_switch::constants::OFPP_NONE,
        flags: 0,
        actions,
    }
}

#[test]
fn controller_install_then_data_plane_forward_then_port_stats() {
    let config = Config::new([0x02, 0, 0, 0, 0, 1]).with_port_enabled(1, true).with_port_enabled(2, true);
    let mut switch: Switch<32> = Switch::new(config);
    let mut driver = TestDriver { sent: Vec::new() };
    let mut transport = TestTransport { state: ConnectionState::Established, sent: Vec::new() };

    // Install a flow via the control-plane entry point.
    let flow_mod = flow_mod_output_to_port(2);
    let mut buf = [0u8; 128];
    let len = encode_flow_mod(&flow_mod, &mut buf).unwrap();
    let mut replies = Vec::new();
    switch
        .handle_controller_bytes(&buf[..len], &[], &mut driver, |reply| replies.push(reply.to_vec()))
        .unwrap();
    assert!(replies.is_empty(), "ADD without OFPFF_SEND_FLOW_REM produces no reply");
    assert_eq!(switch.table().len(), 1);

    // A data-plane frame on port 1 should now forward out port 2.
    let frame = [0u8; 64];
    switch.on_frame(1, &frame, &mut driver, &mut transport).unwrap();
    assert_eq!(driver.sent, vec![(2, 64)]);

    // PORT stats should reflect the transmitted frame on port 2.
    let mut stats_req = [0u8; 12];
    let header = OfpHeader { msg_type: MessageType::StatsRequest, length: 12, xid: 7 };
    header.encode(&mut stats_req).unwrap();
    stats_req[8..10].copy_from_slice(&of10_switch::constants::OFPST_PORT.to_be_bytes());

    let mut stats_replies = Vec::new();
    switch
        .handle_controller_bytes(&stats_req, &[], &mut driver, |reply| stats_replies.push(reply.to_vec()))
        .unwrap();
    assert_eq!(stats_replies.len(), 1);
    assert_eq!(stats_replies[0][1], MessageType::StatsReply as u8);
}

#[test]
fn miss_while_disconnected_drops_frame_silently() {
    let config = Config::new([0x02, 0, 0, 0, 0, 1]).with_port_enabled(1, true);
    let mut switch: Switch<32> = Switch::new(config);
    let mut driver = TestDriver { sent: Vec::new() };
    let mut transport = TestTransport { state: ConnectionState::Disconnected, sent: Vec::new() };

    let frame = [0u8; 64];
    switch.on_frame(1, &frame, &mut driver, &mut transport).unwrap();

    assert!(driver.sent.is_empty());
    assert!(transport.sent.is_empty());
}

#[test]
fn barrier_request_round_trips_through_the_switch_facade() {
    let mut switch: Switch<16> = Switch::new(Config::default());
    let mut driver = TestDriver { sent: Vec::new() };

    let mut buf = [0u8; 8];
    let header = OfpHeader { msg_type: MessageType::BarrierRequest, length: 8, xid: 42 };
    header.encode(&mut buf).unwrap();

    let mut replies = Vec::new();
    switch.handle_controller_bytes(&buf, &[], &mut driver, |reply| replies.push(reply.to_vec())).unwrap();

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0][1], MessageType::BarrierReply as u8);
    let xid = u32::from_be_bytes(replies[0][4..8].try_into().unwrap());
    assert_eq!(xid, 42);
}
