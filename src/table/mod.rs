//! The flow table: a fixed-capacity store of installed flow entries.

mod match_;

pub use match_::{exact_match, field_match, Match};

use crate::action::ActionList;
use crate::error::{TableError, TableResult};
use crate::packet::PacketView;

/// One installed flow entry: a match predicate plus the actions to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlowEntry {
    /// Match predicate.
    pub pattern: Match,
    /// Priority; higher wins when multiple entries match the same packet.
    pub priority: u16,
    /// Controller-supplied opaque cookie, compared only by `delete_strict`'s
    /// identity check; `modify_strict` ignores it.
    pub cookie: u64,
    /// Actions applied on a hit.
    pub actions: ActionList,
    /// Idle timeout in seconds, as requested by the installing `FLOW_MOD`;
    /// reported back in stats but not enforced by this table (expiry by
    /// timeout is driven by an external collaborator, see `delete_matching`/
    /// `delete_strict`).
    pub idle_timeout: u16,
    /// Hard timeout in seconds, as requested by the installing `FLOW_MOD`;
    /// reported back in stats but not enforced by this table.
    pub hard_timeout: u16,
    /// Whether a `FLOW_REMOVED` notification should be sent when this entry
    /// is removed.
    pub send_flow_rem: bool,
    /// Number of packets matched by this entry.
    pub packet_count: u64,
    /// Number of bytes matched by this entry.
    pub byte_count: u64,
}

impl FlowEntry {
    fn matches_candidate_for_flow_mod(&self, candidate: &Match) -> bool {
        field_match(candidate, &self.pattern)
    }
}

/// A fixed-capacity flow table supporting up to `MAX_FLOWS` entries.
///
/// Entries are stored compacted into `0..len`; removal swap-removes the
/// last active entry into the hole so iteration never needs to skip tombstones.
#[derive(Debug, Clone, Copy)]
pub struct FlowTable<const MAX_FLOWS: usize> {
    entries: [Option<FlowEntry>; MAX_FLOWS],
    len: usize,
    lookup_count: u64,
    matched_count: u64,
}

impl<const MAX_FLOWS: usize> FlowTable<MAX_FLOWS> {
    /// An empty flow table.
    #[must_use]
    pub const fn new() -> Self {
        FlowTable { entries: [None; MAX_FLOWS], len: 0, lookup_count: 0, matched_count: 0 }
    }

    /// Number of active entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the table holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the table is at capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == MAX_FLOWS
    }

    /// Iterates active entries in storage order (not priority order).
    pub fn iter(&self) -> impl Iterator<Item = &FlowEntry> {
        self.entries[..self.len].iter().filter_map(Option::as_ref)
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut FlowEntry> {
        self.entries[..self.len].iter_mut().filter_map(Option::as_mut)
    }

    /// Installs a new entry, failing with [`TableError::TableFull`] at capacity.
    pub fn insert(&mut self, entry: FlowEntry) -> TableResult<()> {
        if self.is_full() {
            return Err(TableError::TableFull);
        }
        self.entries[self.len] = Some(entry);
        self.len += 1;
        Ok(())
    }

    /// Finds the index of an exact-match entry (full predicate and priority
    /// equality). Cookie is not part of this identity check; `ADD` and
    /// `MODIFY_STRICT` install/replace by match and priority alone.
    #[must_use]
    pub fn find_exact(&self, pattern: &Match, priority: u16) -> Option<usize> {
        self.iter().position(|e| exact_match(&e.pattern, pattern) && e.priority == priority)
    }

    /// Replaces the action list (and timeouts/flags) of an exact-match entry.
    ///
    /// Returns `true` if an entry was found and updated.
    pub fn modify_strict(
        &mut self,
        pattern: &Match,
        priority: u16,
        actions: ActionList,
        idle_timeout: u16,
        hard_timeout: u16,
        send_flow_rem: bool,
    ) -> bool {
        if let Some(entry) = self
            .iter_mut()
            .find(|e| exact_match(&e.pattern, pattern) && e.priority == priority)
        {
            entry.actions = actions;
            entry.idle_timeout = idle_timeout;
            entry.hard_timeout = hard_timeout;
            entry.send_flow_rem = send_flow_rem;
            true
        } else {
            false
        }
    }

    /// Replaces the action list of every entry whose match is at least as
    /// specific as `candidate` (the non-strict `MODIFY` semantics).
    ///
    /// Returns the number of entries updated.
    pub fn modify_matching(
        &mut self,
        candidate: &Match,
        actions: ActionList,
        idle_timeout: u16,
        hard_timeout: u16,
        send_flow_rem: bool,
    ) -> usize {
        let mut updated = 0;
        for entry in self.iter_mut() {
            if entry.matches_candidate_for_flow_mod(candidate) {
                entry.actions = actions;
                entry.idle_timeout = idle_timeout;
                entry.hard_timeout = hard_timeout;
                entry.send_flow_rem = send_flow_rem;
                updated += 1;
            }
        }
        updated
    }

    /// Removes the entry at `index` via swap-remove, preserving compaction.
    ///
    /// Returns the removed entry.
    pub fn remove_at(&mut self, index: usize) -> Option<FlowEntry> {
        if index >= self.len {
            return None;
        }
        let removed = self.entries[index];
        let last = self.len - 1;
        self.entries[index] = self.entries[last];
        self.entries[last] = None;
        self.len = last;
        removed
    }

    /// Removes every entry whose match is at least as specific as
    /// `candidate`, optionally restricted to entries whose action list
    /// outputs to `out_port` (the non-strict `DELETE` semantics).
    ///
    /// Calls `on_remove` with each removed entry before it is dropped, so
    /// the caller can emit `FLOW_REMOVED` notifications.
    pub fn delete_matching(
        &mut self,
        candidate: &Match,
        out_port: Option<u16>,
        mut on_remove: impl FnMut(&FlowEntry),
    ) -> usize {
        let mut removed_count = 0;
        let mut i = 0;
        while i < self.len {
            let matches = {
                let entry = self.entries[i].as_ref().unwrap();
                entry.matches_candidate_for_flow_mod(candidate)
                    && out_port.is_none_or(|port| {
                        entry.actions.iter().any(|a| {
                            matches!(a, crate::action::Action::Output { port: p, .. } if *p == port)
                        })
                    })
            };
            if matches {
                on_remove(self.entries[i].as_ref().unwrap());
                self.remove_at(i);
                removed_count += 1;
            } else {
                i += 1;
            }
        }
        removed_count
    }

    /// Removes the single entry whose match, priority, and cookie all equal
    /// the request's (the `DELETE_STRICT` identity check).
    pub fn delete_strict(&mut self, pattern: &Match, priority: u16, cookie: u64) -> Option<FlowEntry> {
        let index = self
            .iter()
            .position(|e| exact_match(&e.pattern, pattern) && e.priority == priority && e.cookie == cookie)?;
        self.remove_at(index)
    }

    /// Finds the highest-priority entry matching `view`/`ingress_port`.
    ///
    /// Ties are broken by lower storage index (earliest inserted still
    /// present after compaction wins). Updates lookup/match counters and,
    /// on a hit, the entry's packet/byte counters.
    pub fn lookup(
        &mut self,
        view: &PacketView<'_>,
        ingress_port: u16,
        frame_len: u32,
    ) -> Option<usize> {
        self.lookup_count += 1;
        let mut best: Option<(usize, u16)> = None;
        for (i, entry) in self.iter().enumerate() {
            if entry.pattern.matches_packet(view, ingress_port) {
                match best {
                    Some((_, best_priority)) if best_priority >= entry.priority => {}
                    _ => best = Some((i, entry.priority)),
                }
            }
        }
        if let Some((index, _)) = best {
            self.matched_count += 1;
            if let Some(entry) = self.entries[index].as_mut() {
                entry.packet_count += 1;
                entry.byte_count += u64::from(frame_len);
            }
        }
        best.map(|(index, _)| index)
    }

    /// Entry at `index`, if active.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FlowEntry> {
        if index < self.len { self.entries[index].as_ref() } else { None }
    }

    /// Total lookups performed since creation (for `TABLE` stats).
    #[must_use]
    pub const fn lookup_count(&self) -> u64 {
        self.lookup_count
    }

    /// Total lookups that found a matching entry (for `TABLE` stats).
    #[must_use]
    pub const fn matched_count(&self) -> u64 {
        self.matched_count
    }

}

impl<const MAX_FLOWS: usize> Default for FlowTable<MAX_FLOWS> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::constants::OFPFW_ALL;

    fn entry(priority: u16) -> FlowEntry {
        let mut actions = ActionList::new();
        actions.push(Action::Output { port: 1, max_len: 0 }).unwrap();
        FlowEntry {
            pattern: Match { wildcards: OFPFW_ALL, ..Match::default() },
            priority,
            cookie: 0,
            actions,
            idle_timeout: 0,
            hard_timeout: 0,
            send_flow_rem: false,
            packet_count: 0,
            byte_count: 0,
        }
    }

    #[test]
    fn insert_and_lookup_highest_priority_wins() {
        let mut table: FlowTable<4> = FlowTable::new();
        table.insert(entry(10)).unwrap();
        table.insert(entry(20)).unwrap();

        let mut buf = [0u8; 64];
        let mut len = 64;
        let view = PacketView::new(&mut buf, &mut len);
        let index = table.lookup(&view, 1, 64).unwrap();
        assert_eq!(table.get(index).unwrap().priority, 20);
        assert_eq!(table.matched_count(), 1);
        assert_eq!(table.lookup_count(), 1);
    }

    #[test]
    fn insert_fails_when_table_full() {
        let mut table: FlowTable<1> = FlowTable::new();
        table.insert(entry(1)).unwrap();
        assert_eq!(table.insert(entry(2)), Err(TableError::TableFull));
    }

    #[test]
    fn remove_at_compacts_table() {
        let mut table: FlowTable<3> = FlowTable::new();
        table.insert(entry(1)).unwrap();
        table.insert(entry(2)).unwrap();
        table.insert(entry(3)).unwrap();

        table.remove_at(0);
        assert_eq!(table.len(), 2);
        // Last entry (priority 3) swapped into slot 0.
        assert_eq!(table.get(0).unwrap().priority, 3);
        assert_eq!(table.get(1).unwrap().priority, 2);
    }

    #[test]
    fn delete_strict_requires_cookie_match() {
        let mut table: FlowTable<4> = FlowTable::new();
        let mut a = entry(10);
        a.cookie = 1;
        let mut b = entry(10);
        b.cookie = 2;
        table.insert(a).unwrap();
        table.insert(b).unwrap();

        let pattern = Match { wildcards: OFPFW_ALL, ..Match::default() };
        assert!(table.delete_strict(&pattern, 10, 99).is_none());
        assert_eq!(table.len(), 2);

        let removed = table.delete_strict(&pattern, 10, 2).unwrap();
        assert_eq!(removed.cookie, 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().cookie, 1);
    }

    #[test]
    fn delete_matching_removes_subset_entries() {
        let mut table: FlowTable<4> = FlowTable::new();
        table.insert(entry(1)).unwrap();
        table.insert(entry(2)).unwrap();
        let candidate = Match { wildcards: OFPFW_ALL, ..Match::default() };
        let removed = table.delete_matching(&candidate, None, |_| {});
        assert_eq!(removed, 2);
        assert!(table.is_empty());
    }
}
