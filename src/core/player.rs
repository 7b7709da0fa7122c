//! Player identification and APNAP ordering.
//!
//! ## PlayerId
//!
//! Type-safe player identifier supporting 1-255 players.
//!
//! ## Turn order
//!
//! Whenever several players must act in sequence (each player discards,
//! each player chooses a creature type) the engine walks them in APNAP
//! order: the active player first, then the others in seat order.

use serde::{Deserialize, Serialize};

/// Player identifier supporting 1-255 players.
///
/// Player indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    ///
    /// ```
    /// use ccg_rules::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(3).collect();
    /// assert_eq!(players, vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]);
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// The player seated after this one.
    #[must_use]
    pub fn next(self, player_count: usize) -> PlayerId {
        PlayerId(((self.index() + 1) % player_count) as u8)
    }

    /// All players in APNAP order starting from `active`.
    ///
    /// ```
    /// use ccg_rules::core::PlayerId;
    ///
    /// let order = PlayerId::apnap(PlayerId::new(2), 4);
    /// assert_eq!(order, vec![PlayerId::new(2), PlayerId::new(3), PlayerId::new(0), PlayerId::new(1)]);
    /// ```
    #[must_use]
    pub fn apnap(active: PlayerId, player_count: usize) -> Vec<PlayerId> {
        let mut order = Vec::with_capacity(player_count);
        let mut current = active;
        for _ in 0..player_count {
            order.push(current);
            current = current.next(player_count);
        }
        order
    }

    /// Sort an arbitrary set of players into APNAP order, dropping duplicates.
    #[must_use]
    pub fn sort_apnap(players: &[PlayerId], active: PlayerId, player_count: usize) -> Vec<PlayerId> {
        Self::apnap(active, player_count)
            .into_iter()
            .filter(|p| players.contains(p))
            .collect()
    }

    /// Every other player in seat order.
    pub fn opponents(self, player_count: usize) -> impl Iterator<Item = PlayerId> {
        Self::all(player_count).filter(move |p| *p != self)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}
