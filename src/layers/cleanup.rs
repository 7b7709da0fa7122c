//! Duration expiry hooks.
//!
//! The scheduler calls these at the matching points of the turn. Each takes
//! a state and returns the new state plus a `FloatingEffectExpired` event
//! per removed effect.

use tracing::debug;

use super::floating::{ActiveFloatingEffect, Duration, Modification};
use crate::components::DamageComponent;
use crate::core::{GameState, PlayerId};
use crate::events::GameEvent;

fn expire(
    state: &GameState,
    keep: impl FnMut(&ActiveFloatingEffect) -> bool,
) -> (GameState, Vec<GameEvent>) {
    let mut next = state.clone();
    let removed = next.retain_floating_effects(keep);
    let events = removed
        .iter()
        .map(|effect| GameEvent::FloatingEffectExpired { id: effect.id })
        .collect();
    (next, events)
}

/// End-of-turn cleanup.
///
/// Removes `EndOfTurn` effects and every regeneration shield, counts down
/// `ForTurns` effects (removing those that reach zero), clears marked
/// damage, then sweeps.
#[must_use]
pub fn end_of_turn(state: &GameState) -> (GameState, Vec<GameEvent>) {
    let mut counted = state.clone();
    counted.update_floating_effects(|effect| {
        if let Duration::ForTurns(n) = effect.duration {
            effect.duration = Duration::ForTurns(n.saturating_sub(1));
        }
    });

    let (mut next, mut events) = expire(&counted, |effect| {
        !matches!(effect.duration, Duration::EndOfTurn | Duration::ForTurns(0))
            && effect.modification.modification != Modification::RegenerationShield
    });

    for entity in next.battlefield() {
        next.remove_component::<DamageComponent>(entity);
    }

    let (next, swept) = sweep(&next);
    events.extend(swept);
    debug!(expired = events.len(), turn = state.turn.turn_number, "end of turn cleanup");
    (next, events)
}

/// End of combat: removes `EndOfCombat` effects.
#[must_use]
pub fn end_of_combat(state: &GameState) -> (GameState, Vec<GameEvent>) {
    let (next, events) = expire(state, |effect| effect.duration != Duration::EndOfCombat);
    debug!(expired = events.len(), "end of combat cleanup");
    (next, events)
}

/// Start of `player`'s turn: removes their `UntilYourNextTurn` effects.
#[must_use]
pub fn begin_turn(state: &GameState, player: PlayerId) -> (GameState, Vec<GameEvent>) {
    let (next, events) = expire(state, |effect| {
        !(effect.duration == Duration::UntilYourNextTurn && effect.controller == player)
    });
    debug!(expired = events.len(), %player, "turn start cleanup");
    (next, events)
}

/// Remove effects that no longer apply: source-dependent durations whose
/// condition failed and effects whose objects all left the battlefield.
#[must_use]
pub fn sweep(state: &GameState) -> (GameState, Vec<GameEvent>) {
    let (next, events) = expire(state, |effect| effect.is_active(state));
    if !events.is_empty() {
        debug!(expired = events.len(), "swept inactive floating effects");
    }
    (next, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId};
    use crate::components::CardType;
    use crate::core::{EntityId, GameConfig};
    use crate::layers::{project, FloatingModification};
    use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn with_bear() -> (GameState, EntityId) {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let bear = state
            .spawn_card(&CardDefinition::creature(CardId::new(1), "Bear", 2, 2), P0, ZoneKind::Battlefield)
            .unwrap();
        (state, bear)
    }

    fn pump(state: &mut GameState, bear: EntityId, duration: Duration, controller: PlayerId) {
        state.add_floating_effect(
            FloatingModification::new(Modification::ModifyPowerToughness { power: 1, toughness: 1 }),
            [bear],
            duration,
            None,
            controller,
        );
    }

    #[test]
    fn test_end_of_turn_expiry() {
        let (mut state, bear) = with_bear();
        pump(&mut state, bear, Duration::EndOfTurn, P0);
        pump(&mut state, bear, Duration::Permanent, P0);
        state.insert_component(bear, DamageComponent { amount: 1 }).unwrap();
        assert_eq!(project(&state).power(bear), Some(4));

        let (next, events) = end_of_turn(&state);
        assert_eq!(events.len(), 1);
        assert_eq!(project(&next).power(bear), Some(3));
        assert!(!next.has::<DamageComponent>(bear));
        // Input untouched.
        assert_eq!(project(&state).power(bear), Some(4));
    }

    #[test]
    fn test_regeneration_shields_expire() {
        let (mut state, bear) = with_bear();
        state.add_floating_effect(
            FloatingModification::new(Modification::RegenerationShield),
            [bear],
            Duration::Permanent,
            None,
            P0,
        );
        let (next, _) = end_of_turn(&state);
        assert_eq!(next.floating_effects().count(), 0);
    }

    #[test]
    fn test_for_turns_countdown() {
        let (mut state, bear) = with_bear();
        pump(&mut state, bear, Duration::ForTurns(2), P0);

        let (after_one, events) = end_of_turn(&state);
        assert!(events.is_empty());
        assert_eq!(project(&after_one).power(bear), Some(3));

        let (after_two, events) = end_of_turn(&after_one);
        assert_eq!(events.len(), 1);
        assert_eq!(project(&after_two).power(bear), Some(2));
    }

    #[test]
    fn test_end_of_combat() {
        let (mut state, bear) = with_bear();
        pump(&mut state, bear, Duration::EndOfCombat, P0);
        pump(&mut state, bear, Duration::EndOfTurn, P0);
        let (next, events) = end_of_combat(&state);
        assert_eq!(events.len(), 1);
        assert_eq!(next.floating_effects().count(), 1);
    }

    #[test]
    fn test_begin_turn_only_for_controller() {
        let (mut state, bear) = with_bear();
        pump(&mut state, bear, Duration::UntilYourNextTurn, P1);

        let (next, events) = begin_turn(&state, P0);
        assert!(events.is_empty());
        let (next, events) = begin_turn(&next, P1);
        assert_eq!(events.len(), 1);
        assert_eq!(next.floating_effects().count(), 0);
    }

    #[test]
    fn test_sweep_source_dependent() {
        let (mut state, bear) = with_bear();
        let source = state
            .spawn_card(
                &CardDefinition::new(CardId::new(2), "Banner", [CardType::Artifact]),
                P0,
                ZoneKind::Battlefield,
            )
            .unwrap();
        state.add_floating_effect(
            FloatingModification::new(Modification::ModifyPowerToughness { power: 2, toughness: 0 }),
            [bear],
            Duration::WhileSourceOnBattlefield,
            Some(source),
            P0,
        );
        assert_eq!(project(&state).power(bear), Some(4));

        state
            .move_entity(source, ZoneKey::graveyard(P0), ZonePosition::Top, None)
            .unwrap();
        // Inactive before the sweep already.
        assert_eq!(project(&state).power(bear), Some(2));

        let (next, events) = sweep(&state);
        assert_eq!(events.len(), 1);
        assert_eq!(next.floating_effects().count(), 0);
    }
}
