//! Embedded OpenFlow 1.0 switch core.
//!
//! A `no_std`, `no_alloc` implementation of the OpenFlow 1.0 control-plane
//! and data-plane core for a single-table SDN switch: wire codecs for every
//! `ofp_*` message family, a fixed-capacity flow table, the
//! packet-processing engine that applies a flow entry's actions, and the
//! [`Switch`] facade tying them together behind the two entry points an
//! embedding program calls — one per received frame, one per received
//! controller message.
//!
//! # Architecture
//!
//! The crate is organized into four layers:
//!
//! 1. **Wire layer** ([`wire`]): byte-level codecs for every `ofp_*` message struct.
//! 2. **Domain layer** ([`action`], [`table`], [`config`]): the typed
//!    representations wire bytes decode into.
//! 3. **Processing layer** ([`engine`], [`controller`]): applies a flow
//!    entry's actions to a frame, and dispatches one decoded controller
//!    message to its handler.
//! 4. **Facade** ([`switch`]): [`Switch`], the single type an embedding
//!    program holds.
//!
//! # Supported Messages
//!
//! - `HELLO`, `ECHO_REQUEST`/`REPLY`, `FEATURES_REQUEST`/`REPLY`,
//!   `GET_CONFIG_REQUEST`/`REPLY`, `SET_CONFIG`
//! - `FLOW_MOD` (`ADD`/`MODIFY`/`MODIFY_STRICT`/`DELETE`/`DELETE_STRICT`), `FLOW_REMOVED`
//! - `PACKET_IN`, `PACKET_OUT`
//! - `STATS_REQUEST`/`REPLY` for `DESC`/`FLOW`/`AGGREGATE`/`TABLE`/`PORT`
//! - `BARRIER_REQUEST`/`REPLY`
//! - `VENDOR` (rejected with an `ERROR`; no vendor extensions are implemented)
//!
//! This core is single-table (`n_tables` is always 1) and does not buffer
//! packets (`n_buffers` is always 0; `PACKET_IN` always carries the
//! possibly-truncated frame inline rather than a buffer id).
//!
//! # Example
//!
//! ```ignore
//! use of10_switch::{Config, Switch};
//!
//! let config = Config::new([0x02, 0, 0, 0, 0, 1]).with_port_enabled(1, true);
//! let mut switch: Switch<128> = Switch::new(config);
//!
//! // Data plane: one call per received Ethernet frame.
//! switch.on_frame(1, &frame, &mut driver, &mut transport)?;
//!
//! // Control plane: one call per received OpenFlow message.
//! switch.handle_controller_bytes(&msg, &ports, &mut driver, |reply| {
//!     let _ = transport.send_reliable(reply);
//! })?;
//! # Ok::<(), of10_switch::error::OfError>(())
//! ```
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for error/message types.
//! - `critical-section`: Enable the ISR-safe [`SharedSwitch`] wrapper, for
//!   sharing one [`Switch`] between a frame-reception interrupt and a
//!   main-loop controller poll.

#![no_std]
#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml's [lints] table.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

// =============================================================================
// Modules
// =============================================================================

pub mod action;
pub mod config;
pub mod constants;
pub mod controller;
pub mod driver;
pub mod engine;
pub mod error;
pub mod packet;
pub mod switch;
pub mod table;
pub mod wire;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use action::{Action, ActionList};
pub use config::{Config, FailState, PortCounters, SwitchConfig};
pub use driver::{ConnectionState, ControllerTransport, FrameDriver};
pub use error::{ActionError, DecodeError, OfError, TableError};
pub use packet::PacketView;
pub use switch::Switch;
pub use table::{FlowEntry, FlowTable, Match};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub use sync::SharedSwitch;
