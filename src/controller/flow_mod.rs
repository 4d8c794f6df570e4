//! `FLOW_MOD` command dispatch: `ADD`/`MODIFY`/`MODIFY_STRICT`/`DELETE`/`DELETE_STRICT`.

use crate::action::Action;
use crate::constants::DEFAULT_MAX_FLOWS;
use crate::error::OfError;
use crate::table::{FlowEntry, FlowTable, Match};
use crate::wire::flow_mod::{FlowMod, FlowModCommand};
use crate::wire::flow_removed::FlowRemovedReason;

/// One flow entry removed as a side effect of a `FLOW_MOD`, paired with the
/// reason, for the caller to turn into a `FLOW_REMOVED` notification.
#[derive(Debug, Clone, Copy)]
pub struct RemovedEntry {
    /// The entry's match, needed since `FlowEntry` does not re-derive it.
    pub pattern: Match,
    /// The removed entry.
    pub entry: FlowEntry,
    /// Why it was removed.
    pub reason: FlowRemovedReason,
}

/// Fixed-capacity list of entries removed by one `FLOW_MOD` application.
///
/// Bounded at [`DEFAULT_MAX_FLOWS`] since a single `DELETE` can, in the
/// worst case, remove every installed entry.
pub struct RemovedList {
    entries: [Option<RemovedEntry>; DEFAULT_MAX_FLOWS],
    count: usize,
}

impl RemovedList {
    const fn new() -> Self {
        RemovedList { entries: [None; DEFAULT_MAX_FLOWS], count: 0 }
    }

    fn push(&mut self, entry: RemovedEntry) {
        if self.count < self.entries.len() {
            self.entries[self.count] = Some(entry);
            self.count += 1;
        }
    }

    /// Iterates the removed entries in removal order.
    pub fn iter(&self) -> impl Iterator<Item = &RemovedEntry> {
        self.entries[..self.count].iter().filter_map(Option::as_ref)
    }
}

/// Result of applying a `FLOW_MOD`.
pub struct FlowModOutcome {
    /// Entries removed by a `DELETE`/`DELETE_STRICT` that requested notification.
    pub removed: RemovedList,
}

/// Applies a decoded `FLOW_MOD` to `table`.
///
/// Validates every action in the request before any mutation, so a request
/// with one invalid action fails atomically. `MODIFY` (non-strict) decides
/// insert-vs-update only after a full table scan: if the scan updates at
/// least one entry, no insert happens; only an entirely-unmatched `MODIFY`
/// falls back to installing a new entry, exactly like `ADD`.
pub fn apply_flow_mod(
    table: &mut FlowTable<DEFAULT_MAX_FLOWS>,
    flow_mod: &FlowMod,
) -> Result<FlowModOutcome, OfError> {
    for action in flow_mod.actions.iter() {
        if let Err(e) = action.validate_for_install() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "flow_mod rejected: invalid action, priority {}",
                flow_mod.priority
            );
            return Err(OfError::Action(e));
        }
    }

    let mut outcome = FlowModOutcome { removed: RemovedList::new() };

    let result = apply_command(table, flow_mod, &mut outcome);
    match result {
        Ok(()) => {
            #[cfg(feature = "defmt")]
            defmt::trace!(
                "flow_mod accepted: command {}, priority {}, cookie {}",
                flow_mod.command as u16,
                flow_mod.priority,
                flow_mod.cookie
            );
            Ok(outcome)
        }
        // install_or_replace already logs the specific rejection reason.
        Err(e) => Err(e),
    }
}

fn apply_command(
    table: &mut FlowTable<DEFAULT_MAX_FLOWS>,
    flow_mod: &FlowMod,
    outcome: &mut FlowModOutcome,
) -> Result<(), OfError> {
    match flow_mod.command {
        FlowModCommand::Add => {
            install_or_replace(table, flow_mod)?;
        }
        FlowModCommand::ModifyStrict => {
            let updated = table.modify_strict(
                &flow_mod.pattern,
                flow_mod.priority,
                flow_mod.actions,
                flow_mod.idle_timeout,
                flow_mod.hard_timeout,
                send_flow_rem(flow_mod.flags),
            );
            if !updated {
                install_or_replace(table, flow_mod)?;
            }
        }
        FlowModCommand::Modify => {
            let updated = table.modify_matching(
                &flow_mod.pattern,
                flow_mod.actions,
                flow_mod.idle_timeout,
                flow_mod.hard_timeout,
                send_flow_rem(flow_mod.flags),
            );
            if updated == 0 {
                install_or_replace(table, flow_mod)?;
            }
        }
        FlowModCommand::Delete => {
            let out_port = restrict_out_port(flow_mod.out_port);
            table.delete_matching(&flow_mod.pattern, out_port, |entry| {
                if entry.send_flow_rem {
                    outcome.removed.push(RemovedEntry {
                        pattern: flow_mod.pattern,
                        entry: *entry,
                        reason: FlowRemovedReason::Delete,
                    });
                }
            });
        }
        FlowModCommand::DeleteStrict => {
            if let Some(entry) =
                table.delete_strict(&flow_mod.pattern, flow_mod.priority, flow_mod.cookie)
            {
                if entry.send_flow_rem {
                    outcome.removed.push(RemovedEntry {
                        pattern: flow_mod.pattern,
                        entry,
                        reason: FlowRemovedReason::Delete,
                    });
                }
            }
        }
    }

    Ok(())
}

fn install_or_replace(
    table: &mut FlowTable<DEFAULT_MAX_FLOWS>,
    flow_mod: &FlowMod,
) -> Result<(), OfError> {
    // An exact duplicate (same match + priority) is replaced rather than
    // rejected as a capacity error, mirroring ADD's idempotent semantics.
    if let Some(index) = table.find_exact(&flow_mod.pattern, flow_mod.priority) {
        table.remove_at(index);
    }
    let entry = FlowEntry {
        pattern: flow_mod.pattern,
        priority: flow_mod.priority,
        cookie: flow_mod.cookie,
        actions: flow_mod.actions,
        idle_timeout: flow_mod.idle_timeout,
        hard_timeout: flow_mod.hard_timeout,
        send_flow_rem: send_flow_rem(flow_mod.flags),
        packet_count: 0,
        byte_count: 0,
    };
    match table.insert(entry) {
        Ok(()) => Ok(()),
        Err(e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "flow_mod rejected: table full, priority {}",
                flow_mod.priority
            );
            Err(OfError::Table(e))
        }
    }
}

fn send_flow_rem(flags: u16) -> bool {
    flags & crate::constants::OFPFF_SEND_FLOW_REM != 0
}

fn restrict_out_port(out_port: u16) -> Option<u16> {
    if out_port == crate::constants::OFPP_NONE {
        None
    } else {
        Some(out_port)
    }
}
