//! ISR-safe shared access to a [`Switch`].
//!
//! A typical deployment receives Ethernet frames from an RX interrupt and
//! polls the controller TCP connection from the main loop (or a second
//! interrupt). Both paths need exclusive access to the same [`Switch`],
//! which this wraps in a [`critical_section::Mutex`] so neither path needs
//! a dynamic allocator or an RTOS-specific lock.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::config::Config;
use crate::switch::Switch;

/// A [`Switch`] behind a [`critical_section::Mutex`], safe to place in a
/// `static` and reach from both interrupt and thread context.
pub struct SharedSwitch<const MAX_FLOWS: usize> {
    inner: Mutex<RefCell<Switch<MAX_FLOWS>>>,
}

impl<const MAX_FLOWS: usize> SharedSwitch<MAX_FLOWS> {
    /// Builds a shared switch from its configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        SharedSwitch { inner: Mutex::new(RefCell::new(Switch::new(config))) }
    }

    /// Runs `f` with exclusive access to the inner switch, inside a
    /// critical section. Do not call this again from within `f` — the
    /// inner `RefCell` will panic on the reentrant borrow.
    pub fn with<R>(&self, f: impl FnOnce(&mut Switch<MAX_FLOWS>) -> R) -> R {
        critical_section::with(|cs| {
            let mut switch = self.inner.borrow(cs).borrow_mut();
            f(&mut switch)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ConnectionState;
    use crate::testing::{RecordingDriver, RecordingTransport};

    #[test]
    fn with_grants_exclusive_access_to_the_inner_switch() {
        let shared: SharedSwitch<16> = SharedSwitch::new(Config::default());
        let len = shared.with(|switch| switch.table().len());
        assert_eq!(len, 0);
    }

    #[test]
    fn state_persists_across_separate_with_calls() {
        let shared: SharedSwitch<16> = SharedSwitch::new(Config::default());
        shared.with(|switch| {
            // A no-op frame on an empty table, exercising the same &mut
            // access path a data-plane ISR would use.
            let mut driver = RecordingDriver::new();
            let mut transport = RecordingTransport::new(ConnectionState::Disconnected);
            switch.on_frame(1, &[0u8; 64], &mut driver, &mut transport).unwrap();
        });
        let len = shared.with(|switch| switch.table().len());
        assert_eq!(len, 0);
    }
}
