//! Shared test doubles for [`crate::driver::FrameDriver`] and
//! [`crate::driver::ControllerTransport`], used by this crate's own unit
//! tests. Gated on `cfg(test)`, so unavailable outside this crate; the
//! `tests/` integration suite defines its own equivalents.

use crate::constants::DEFAULT_MAX_PORTS;
use crate::driver::{ConnectionState, ControllerTransport, FrameDriver};

/// Maximum number of frames [`RecordingDriver`] remembers per port history.
const RECORDING_CAPACITY: usize = 16;

/// One frame transmitted through [`RecordingDriver::gmac_write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentFrame {
    /// Port it was sent on.
    pub port: u16,
    /// Frame length in bytes.
    pub len: usize,
    /// First bytes of the frame, for assertions on header rewrites.
    pub head: [u8; 16],
}

/// A [`FrameDriver`] that records every transmitted frame instead of
/// touching hardware, and lets tests control per-port link state.
pub struct RecordingDriver {
    sent: [Option<SentFrame>; RECORDING_CAPACITY],
    sent_count: usize,
    link_up: [bool; DEFAULT_MAX_PORTS],
}

impl RecordingDriver {
    /// A driver with every port link up.
    #[must_use]
    pub const fn new() -> Self {
        RecordingDriver {
            sent: [None; RECORDING_CAPACITY],
            sent_count: 0,
            link_up: [true; DEFAULT_MAX_PORTS],
        }
    }

    /// Marks `port` (1-based) as having no link.
    pub fn set_link_down(&mut self, port: u16) {
        if let Some(slot) = self.link_up.get_mut(usize::from(port).wrapping_sub(1)) {
            *slot = false;
        }
    }

    /// Frames sent so far, oldest first.
    pub fn sent(&self) -> impl Iterator<Item = &SentFrame> {
        self.sent[..self.sent_count].iter().filter_map(Option::as_ref)
    }

    /// Number of frames sent so far.
    #[must_use]
    pub const fn sent_count(&self) -> usize {
        self.sent_count
    }
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDriver for RecordingDriver {
    type Error = ();

    fn gmac_write(&mut self, port: u16, frame: &[u8]) -> Result<(), ()> {
        if self.sent_count >= self.sent.len() {
            return Err(());
        }
        let mut head = [0u8; 16];
        let n = frame.len().min(head.len());
        head[..n].copy_from_slice(&frame[..n]);
        self.sent[self.sent_count] = Some(SentFrame { port, len: frame.len(), head });
        self.sent_count += 1;
        Ok(())
    }

    fn link_up(&self, port: u16) -> bool {
        self.link_up.get(usize::from(port).wrapping_sub(1)).copied().unwrap_or(false)
    }
}

/// A [`ControllerTransport`] that records every message sent to the
/// controller and lets tests drive the connection state.
pub struct RecordingTransport {
    state: ConnectionState,
    sent: [Option<[u8; 256]>; RECORDING_CAPACITY],
    sent_len: [usize; RECORDING_CAPACITY],
    sent_count: usize,
}

impl RecordingTransport {
    /// A transport in the given connection state, with no messages sent yet.
    #[must_use]
    pub const fn new(state: ConnectionState) -> Self {
        RecordingTransport {
            state,
            sent: [None; RECORDING_CAPACITY],
            sent_len: [0; RECORDING_CAPACITY],
            sent_count: 0,
        }
    }

    /// Moves the simulated connection to `state`.
    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    /// Number of messages sent so far.
    #[must_use]
    pub const fn sent_count(&self) -> usize {
        self.sent_count
    }

    /// The `index`th message sent, truncated to its recorded length.
    #[must_use]
    pub fn sent(&self, index: usize) -> Option<&[u8]> {
        let buf = self.sent.get(index)?.as_ref()?;
        Some(&buf[..self.sent_len[index]])
    }
}

impl ControllerTransport for RecordingTransport {
    type Error = ();

    fn send_reliable(&mut self, message: &[u8]) -> Result<(), ()> {
        if self.sent_count >= self.sent.len() || message.len() > 256 {
            return Err(());
        }
        let mut buf = [0u8; 256];
        buf[..message.len()].copy_from_slice(message);
        self.sent[self.sent_count] = Some(buf);
        self.sent_len[self.sent_count] = message.len();
        self.sent_count += 1;
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_driver_tracks_sent_frames() {
        let mut driver = RecordingDriver::new();
        driver.gmac_write(2, &[0xAA; 32]).unwrap();
        assert_eq!(driver.sent_count(), 1);
        let sent: [_; 1] = [driver.sent().next().unwrap().port];
        assert_eq!(sent, [2]);
    }

    #[test]
    fn recording_driver_respects_link_down() {
        let mut driver = RecordingDriver::new();
        driver.set_link_down(3);
        assert!(!driver.link_up(3));
        assert!(driver.link_up(1));
    }

    #[test]
    fn recording_transport_tracks_messages_and_state() {
        let mut transport = RecordingTransport::new(ConnectionState::Disconnected);
        assert_eq!(transport.connection_state(), ConnectionState::Disconnected);
        transport.set_state(ConnectionState::Established);
        transport.send_reliable(&[1, 2, 3]).unwrap();
        assert_eq!(transport.sent(0), Some(&[1u8, 2, 3][..]));
    }
}
