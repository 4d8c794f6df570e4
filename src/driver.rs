//! External collaborator traits: the boundaries this core delegates to.
//!
//! [`FrameDriver`] is the data-plane boundary — whatever drives Ethernet
//! frames on and off physical ports. [`ControllerTransport`] is the
//! control-plane boundary — a reliable, ordered byte stream to the
//! controller (TCP in a full deployment, but this core only depends on the
//! trait). Both are implemented against real hardware/sockets outside this
//! crate and against [`crate::testing::RecordingDriver`] in tests.

/// Current state of the control-plane connection to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// No TCP connection established.
    Disconnected,
    /// Connected, `HELLO` not yet exchanged.
    Connecting,
    /// `HELLO` exchanged; normal operation.
    Established,
}

/// The data-plane boundary: sending and receiving Ethernet frames on a
/// physical port.
///
/// Implementations own the underlying MAC/PHY and must not block
/// indefinitely; `gmac_write` returning `Err` means the frame was dropped.
pub trait FrameDriver {
    /// Driver-specific error type.
    type Error;

    /// Transmits `frame` out `port` (1-based).
    fn gmac_write(&mut self, port: u16, frame: &[u8]) -> Result<(), Self::Error>;

    /// Whether `port` currently has link.
    fn link_up(&self, port: u16) -> bool;
}

/// The control-plane boundary: a reliable, ordered transport to the controller.
///
/// Corresponds to a single TCP connection in a full deployment; OpenFlow
/// messages are serialized by the caller and handed to `send_reliable` as
/// opaque bytes.
pub trait ControllerTransport {
    /// Transport-specific error type.
    type Error;

    /// Sends `message` to the controller, blocking until accepted by the
    /// underlying transport's send buffer.
    fn send_reliable(&mut self, message: &[u8]) -> Result<(), Self::Error>;

    /// Current connection state.
    fn connection_state(&self) -> ConnectionState;
}
