//! Convocation selection over a club roster.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::Player;

/// RosterSelection
///
/// Holds the roster, the ids ticked so far and the convened players. `convened` only
/// changes on `confirm_selection` or `reset`, so ticking boxes never alters what was
/// last confirmed.
#[derive(Debug, Clone, Default)]
pub struct RosterSelection {
    roster: Vec<Player>,
    selection: HashSet<Uuid>,
    convened: Vec<Player>,
}

impl RosterSelection {
    pub fn new(roster: Vec<Player>) -> Self {
        Self {
            roster,
            ..Self::default()
        }
    }

    /// Roster with a preset selection, e.g. the convocation already saved for a match.
    pub fn with_selection(roster: Vec<Player>, selected: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            roster,
            selection: selected.into_iter().collect(),
            convened: Vec::new(),
        }
    }

    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    pub fn selection(&self) -> &HashSet<Uuid> {
        &self.selection
    }

    pub fn convened(&self) -> &[Player] {
        &self.convened
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selection.contains(&id)
    }

    pub fn select(&mut self, id: Uuid) {
        self.selection.insert(id);
    }

    pub fn deselect(&mut self, id: Uuid) {
        self.selection.remove(&id);
    }

    /// Checkbox behaviour: ticks an unticked id and unticks a ticked one.
    pub fn toggle(&mut self, id: Uuid) {
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
    }

    /// Convened becomes the roster players whose id is selected, in roster order.
    /// Selected ids missing from the roster are ignored.
    pub fn confirm_selection(&mut self) -> &[Player] {
        self.convened = self
            .roster
            .iter()
            .filter(|player| self.selection.contains(&player.id))
            .cloned()
            .collect();
        &self.convened
    }

    /// Clears both the convened list and the selection.
    pub fn reset(&mut self) {
        self.convened.clear();
        self.selection.clear();
    }
}
