//! Barrier request/reply sequencing.
//!
//! `BARRIER_REQUEST` guarantees the controller a synchronization point: all
//! messages received before the barrier must be fully processed (and any
//! side effects, like `FLOW_MOD` installs, committed) before the
//! `BARRIER_REPLY` is sent. Since this core processes one message to
//! completion before reading the next, the guarantee is automatic — this
//! sequencer exists only to track the correlating xid and to refuse
//! processing further requests out of order if the caller chooses to.

/// Tracks the single outstanding barrier, if any.
///
/// OpenFlow 1.0 does not pipeline barriers; a well-behaved controller waits
/// for one `BARRIER_REPLY` before sending another `BARRIER_REQUEST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BarrierSequencer {
    pending: bool,
    pending_xid: u32,
}

impl BarrierSequencer {
    /// No barrier outstanding.
    #[must_use]
    pub const fn new() -> Self {
        BarrierSequencer { pending: false, pending_xid: 0 }
    }

    /// Records a new `BARRIER_REQUEST`, returning the xid to echo in the reply.
    ///
    /// Since processing is synchronous, the reply can be emitted
    /// immediately after this call; `pending` exists for callers that
    /// defer the reply past any queued async work.
    pub fn request(&mut self, xid: u32) -> u32 {
        self.pending = true;
        self.pending_xid = xid;
        #[cfg(feature = "defmt")]
        defmt::trace!("barrier pending: xid {}", xid);
        xid
    }

    /// Clears the outstanding barrier after the reply has been sent.
    pub fn complete(&mut self) {
        self.pending = false;
        #[cfg(feature = "defmt")]
        defmt::trace!("barrier complete: xid {}", self.pending_xid);
    }

    /// Whether a barrier reply is still owed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}
