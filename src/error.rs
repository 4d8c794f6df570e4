//! Error types for the OpenFlow 1.0 switch core
//!
//! Errors are organized by domain for better diagnostics:
//! - [`DecodeError`]: wire codec failures (short buffer, bad version/length/type)
//! - [`TableError`]: flow table capacity and lookup failures
//! - [`ActionError`]: install-time action-list validation failures
//!
//! The unified [`OfError`] enum wraps all domain errors plus the OpenFlow
//! `type`/`code` pair the controller expects in an `ERROR` message, and is
//! returned by the controller protocol handler.

// =============================================================================
// Wire Codec Errors
// =============================================================================

/// Wire codec decode errors.
///
/// These occur while parsing bytes received from the controller or, on the
/// data plane, while parsing an Ethernet frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Buffer shorter than the structure being decoded requires.
    ShortBuffer,
    /// `ofp_header.version` is not `OFP_VERSION`.
    BadVersion,
    /// `ofp_header.length` is inconsistent with the buffer or structure.
    BadLength,
    /// `ofp_header.type` is not a recognized message type.
    BadType,
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DecodeError {
    /// Returns a human-readable description of the error.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DecodeError::ShortBuffer => "buffer too short",
            DecodeError::BadVersion => "unsupported OpenFlow version",
            DecodeError::BadLength => "inconsistent message length",
            DecodeError::BadType => "unrecognized message type",
        }
    }
}

// =============================================================================
// Flow Table Errors
// =============================================================================

/// Flow table capacity and lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// The table is at `MAX_FLOWS` capacity; no slot is available.
    TableFull,
    /// No entry matched the lookup or modification request.
    NoMatch,
}

impl core::fmt::Display for TableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TableError {
    /// Returns a human-readable description of the error.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TableError::TableFull => "flow table full",
            TableError::NoMatch => "no matching flow entry",
        }
    }
}

// =============================================================================
// Action Validation Errors
// =============================================================================

/// Install-time action-list validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionError {
    /// An action carries an unrecognized `OFPAT_*` type.
    UnknownType,
    /// `Output(OFPP_NORMAL)` was requested; normal L2 switching is unsupported.
    UnsupportedOutPort,
    /// The action list does not fit in the four-slot budget, or a fixed-size
    /// action's encoded length is wrong.
    BadLength,
}

impl core::fmt::Display for ActionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ActionError {
    /// Returns a human-readable description of the error.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ActionError::UnknownType => "unknown action type",
            ActionError::UnsupportedOutPort => "unsupported output port",
            ActionError::BadLength => "bad action length",
        }
    }
}

// =============================================================================
// Unified Controller-Facing Error
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling by
/// the controller protocol handler, which maps each variant to an OpenFlow
/// `ERROR` message `type`/`code` pair (see [`OfError::to_wire_code`]).
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(OfError::Decode(DecodeError::BadVersion)) => { /* ... */ }
///     Err(OfError::Table(TableError::TableFull)) => { /* ... */ }
///     Err(OfError::Action(ActionError::UnsupportedOutPort)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OfError {
    /// Wire decode error.
    Decode(DecodeError),
    /// Flow table error.
    Table(TableError),
    /// Action validation error.
    Action(ActionError),
    /// The controller sent a `HELLO` we could not negotiate against.
    HelloFailed,
    /// The controller sent a `VENDOR` message; vendor extensions are unsupported.
    BadVendor,
}

impl core::fmt::Display for OfError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OfError::Decode(e) => write!(f, "decode: {}", e.as_str()),
            OfError::Table(e) => write!(f, "table: {}", e.as_str()),
            OfError::Action(e) => write!(f, "action: {}", e.as_str()),
            OfError::HelloFailed => write!(f, "hello failed"),
            OfError::BadVendor => write!(f, "bad vendor"),
        }
    }
}

impl From<DecodeError> for OfError {
    fn from(e: DecodeError) -> Self {
        OfError::Decode(e)
    }
}

impl From<TableError> for OfError {
    fn from(e: TableError) -> Self {
        OfError::Table(e)
    }
}

impl From<ActionError> for OfError {
    fn from(e: ActionError) -> Self {
        OfError::Action(e)
    }
}

/// OpenFlow `ofp_error_type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum OfErrorType {
    /// `OFPET_HELLO_FAILED`
    HelloFailed = 0,
    /// `OFPET_BAD_REQUEST`
    BadRequest = 1,
    /// `OFPET_BAD_ACTION`
    BadAction = 2,
    /// `OFPET_FLOW_MOD_FAILED`
    FlowModFailed = 3,
}

impl OfError {
    /// Maps the error to the `(type, code)` pair carried in an `ERROR` message.
    #[must_use]
    pub const fn to_wire_code(self) -> (OfErrorType, u16) {
        match self {
            OfError::HelloFailed => (OfErrorType::HelloFailed, 0),
            OfError::BadVendor => (OfErrorType::BadRequest, 4), // OFPBRC_BAD_VENDOR
            OfError::Decode(DecodeError::BadVersion) => (OfErrorType::BadRequest, 0),
            OfError::Decode(DecodeError::BadType) => (OfErrorType::BadRequest, 1),
            OfError::Decode(DecodeError::BadLength | DecodeError::ShortBuffer) => {
                (OfErrorType::BadRequest, 6) // OFPBRC_BAD_LEN
            }
            OfError::Action(ActionError::UnknownType) => (OfErrorType::BadAction, 0),
            OfError::Action(ActionError::UnsupportedOutPort) => (OfErrorType::BadAction, 4),
            OfError::Action(ActionError::BadLength) => (OfErrorType::BadAction, 5),
            OfError::Table(TableError::TableFull) => (OfErrorType::FlowModFailed, 1),
            OfError::Table(TableError::NoMatch) => (OfErrorType::FlowModFailed, 2), // OVERLAP-ish
        }
    }
}

/// Result type alias for the unified controller-facing error.
pub type OfResult<T> = core::result::Result<T, OfError>;
/// Result type alias for wire decode operations.
pub type DecodeResult<T> = core::result::Result<T, DecodeError>;
/// Result type alias for flow table operations.
pub type TableResult<T> = core::result::Result<T, TableError>;
/// Result type alias for action validation.
pub type ActionResult<T> = core::result::Result<T, ActionError>;

// =============================================================================
// Unit Tests
// =============================================================================
