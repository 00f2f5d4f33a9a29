//! Per-user editing sessions.

use std::collections::HashMap;

use dragonloot_loot::LootEntry;

/// The item field a chat prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogField {
    Chance,
    Name,
    Amount,
    Lore,
}

impl DialogField {
    pub fn instruction(self) -> &'static str {
        match self {
            DialogField::Chance => "&7Enter chance (0-100)",
            DialogField::Name => "&7Enter custom name",
            DialogField::Amount => "&7Enter amount/range",
            DialogField::Lore => "&7Enter lore (use | for new lines)",
        }
    }
}

/// A user's in-progress edit of one loot record.
///
/// `entry` is a private copy; nothing reaches the loot document until the
/// user saves. `loot_index` is positional and goes stale if the list is
/// reordered meanwhile.
#[derive(Debug, Clone)]
pub struct EditorSession {
    pub loot_index: usize,
    pub entry: LootEntry,
    pub dialog: Option<DialogField>,
    pub awaiting_input: bool,
    pub last_touched_tick: u64,
}

impl EditorSession {
    pub fn new(loot_index: usize, entry: LootEntry, tick: u64) -> Self {
        Self {
            loot_index,
            entry,
            dialog: None,
            awaiting_input: false,
            last_touched_tick: tick,
        }
    }
}

/// Sessions keyed by player UUID.
#[derive(Debug, Default)]
pub struct Sessions {
    by_user: HashMap<String, EditorSession>,
}

impl Sessions {
    pub fn get(&self, uuid: &str) -> Option<&EditorSession> {
        self.by_user.get(uuid)
    }

    pub fn get_mut(&mut self, uuid: &str) -> Option<&mut EditorSession> {
        self.by_user.get_mut(uuid)
    }

    pub fn insert(&mut self, uuid: &str, session: EditorSession) {
        self.by_user.insert(uuid.to_string(), session);
    }

    pub fn remove(&mut self, uuid: &str) -> Option<EditorSession> {
        self.by_user.remove(uuid)
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }

    /// Drop sessions untouched for at least `max_idle` ticks. Returns the
    /// UUIDs removed.
    pub fn evict_idle(&mut self, now: u64, max_idle: u64) -> Vec<String> {
        let stale: Vec<String> = self
            .by_user
            .iter()
            .filter(|(_, s)| now.saturating_sub(s.last_touched_tick) >= max_idle)
            .map(|(uuid, _)| uuid.clone())
            .collect();
        for uuid in &stale {
            self.by_user.remove(uuid);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_not_waiting() {
        let session = EditorSession::new(3, LootEntry::default(), 10);
        assert_eq!(session.loot_index, 3);
        assert!(session.dialog.is_none());
        assert!(!session.awaiting_input);
    }

    #[test]
    fn evicts_only_idle_sessions() {
        let mut sessions = Sessions::default();
        sessions.insert("old", EditorSession::new(0, LootEntry::default(), 100));
        sessions.insert("fresh", EditorSession::new(1, LootEntry::default(), 900));

        let evicted = sessions.evict_idle(1000, 500);
        assert_eq!(evicted, vec!["old".to_string()]);
        assert!(sessions.get("old").is_none());
        assert!(sessions.get("fresh").is_some());
        assert_eq!(sessions.len(), 1);
    }
}
