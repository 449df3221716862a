//! Power-up kinds, stat application, and seeded drop rolls

use serde::{Deserialize, Serialize};

use super::error::{EntityKind, SimError};
use super::grid::Tile;
use super::rules::Ruleset;
use super::state::{Event, Player, PlayerId, RngState, WorldState};

/// Power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// +1 simultaneous bomb
    ExtraBomb,
    /// +1 blast radius
    BlastRadius,
    /// Faster movement
    Speed,
    /// Walk through bombs
    BombPass,
}

/// Apply a collected power-up to a player.
///
/// The inventory count always increments (scoring), the effective stat
/// clamps at the ruleset cap.
pub fn apply_pickup(player: &mut Player, kind: PowerUpKind, rules: &Ruleset) {
    player.inventory.record(kind);
    match kind {
        PowerUpKind::ExtraBomb => {
            player.stats.max_bombs = (player.stats.max_bombs + 1).min(rules.bombs_cap);
        }
        PowerUpKind::BlastRadius => {
            player.stats.blast_radius = (player.stats.blast_radius + 1).min(rules.radius_cap);
        }
        PowerUpKind::Speed => {
            player.stats.move_speed = (player.stats.move_speed + rules.speed_step).min(rules.speed_cap);
        }
        // The capability is read off the inventory count
        PowerUpKind::BombPass => {}
    }
}

/// Roll the drop for a destroyed soft block: either nothing or one kind,
/// picked by weight. Both rolls draw from the world RNG, so identical seeds
/// give identical drops.
pub fn roll_drop(rng: &mut RngState, rules: &Ruleset) -> Option<PowerUpKind> {
    if rng.roll(100) >= rules.drop_chance_pct {
        return None;
    }
    let weights = rules.drop_weights;
    let total = weights.total();
    if total == 0 {
        return None;
    }
    let mut pick = rng.roll(total);
    if pick < weights.extra_bomb {
        return Some(PowerUpKind::ExtraBomb);
    }
    pick -= weights.extra_bomb;
    if pick < weights.blast_radius {
        return Some(PowerUpKind::BlastRadius);
    }
    pick -= weights.blast_radius;
    if pick < weights.speed {
        return Some(PowerUpKind::Speed);
    }
    Some(PowerUpKind::BombPass)
}

/// Collect pickups under living players' center tiles, in ascending player
/// id order. A pickup tile with no matching record is a fatal desync.
pub fn resolve_pickups(world: &mut WorldState, events: &mut Vec<Event>) -> Result<(), SimError> {
    let ids: Vec<PlayerId> = world
        .entities
        .players
        .iter()
        .filter(|p| p.alive)
        .map(|p| p.id)
        .collect();

    for id in ids {
        let tile = world
            .entities
            .player(id)
            .ok_or(SimError::missing(EntityKind::Player, id.0))?
            .tile();
        let kind = match world.grid.get(tile) {
            Some(Tile::PowerUp(kind)) => kind,
            _ => continue,
        };
        world.take_pickup_at(tile)?;
        let rules = world.rules;
        let player = world
            .entities
            .player_mut(id)
            .ok_or(SimError::missing(EntityKind::Player, id.0))?;
        apply_pickup(player, kind, &rules);
        events.push(Event::PowerUpCollected {
            player: id,
            kind,
            pos: tile,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rules::DropWeights;
    use crate::sim::state::{Inventory, PlayerStats};
    use glam::Vec2;

    fn test_player(rules: &Ruleset) -> Player {
        Player::new(PlayerId(1), Vec2::new(1.5, 1.5), rules)
    }

    #[test]
    fn test_apply_increments_stats() {
        let rules = Ruleset::default();
        let mut player = test_player(&rules);

        apply_pickup(&mut player, PowerUpKind::ExtraBomb, &rules);
        assert_eq!(player.stats.max_bombs, rules.bombs_base + 1);

        apply_pickup(&mut player, PowerUpKind::BlastRadius, &rules);
        assert_eq!(player.stats.blast_radius, rules.radius_base + 1);

        apply_pickup(&mut player, PowerUpKind::Speed, &rules);
        assert!((player.stats.move_speed - (rules.speed_base + rules.speed_step)).abs() < 1e-6);

        assert!(!player.has_bomb_pass());
        apply_pickup(&mut player, PowerUpKind::BombPass, &rules);
        assert!(player.has_bomb_pass());
    }

    #[test]
    fn test_stat_clamps_at_cap_inventory_does_not() {
        let rules = Ruleset {
            bombs_cap: 3,
            ..Default::default()
        };
        let mut player = test_player(&rules);

        for _ in 0..5 {
            apply_pickup(&mut player, PowerUpKind::ExtraBomb, &rules);
        }
        assert_eq!(player.stats.max_bombs, 3);
        assert_eq!(player.inventory.count(PowerUpKind::ExtraBomb), 5);
    }

    #[test]
    fn test_speed_clamps_at_cap() {
        let rules = Ruleset::default();
        let mut player = test_player(&rules);
        for _ in 0..20 {
            apply_pickup(&mut player, PowerUpKind::Speed, &rules);
        }
        assert!((player.stats.move_speed - rules.speed_cap).abs() < 1e-6);
    }

    #[test]
    fn test_roll_drop_deterministic() {
        let rules = Ruleset::default();
        let mut a = RngState::new(42);
        let mut b = RngState::new(42);
        for _ in 0..100 {
            assert_eq!(roll_drop(&mut a, &rules), roll_drop(&mut b, &rules));
        }
    }

    #[test]
    fn test_roll_drop_respects_chance() {
        let never = Ruleset {
            drop_chance_pct: 0,
            ..Default::default()
        };
        let always = Ruleset {
            drop_chance_pct: 100,
            ..Default::default()
        };
        let mut rng = RngState::new(7);
        for _ in 0..50 {
            assert_eq!(roll_drop(&mut rng, &never), None);
            assert!(roll_drop(&mut rng, &always).is_some());
        }
    }

    #[test]
    fn test_roll_drop_empty_weight_table() {
        let rules = Ruleset {
            drop_chance_pct: 100,
            drop_weights: DropWeights {
                extra_bomb: 0,
                blast_radius: 0,
                speed: 0,
                bomb_pass: 0,
            },
            ..Default::default()
        };
        let mut rng = RngState::new(7);
        assert_eq!(roll_drop(&mut rng, &rules), None);
    }

    #[test]
    fn test_inventory_counts_per_kind() {
        let mut inv = Inventory::default();
        inv.record(PowerUpKind::Speed);
        inv.record(PowerUpKind::Speed);
        inv.record(PowerUpKind::BombPass);
        assert_eq!(inv.count(PowerUpKind::Speed), 2);
        assert_eq!(inv.count(PowerUpKind::BombPass), 1);
        assert_eq!(inv.count(PowerUpKind::ExtraBomb), 0);
        assert_eq!(inv.total(), 3);
    }

    #[test]
    fn test_default_stats_from_rules() {
        let rules = Ruleset::default();
        let player = test_player(&rules);
        assert_eq!(
            player.stats,
            PlayerStats {
                max_bombs: rules.bombs_base,
                blast_radius: rules.radius_base,
                move_speed: rules.speed_base,
            }
        );
    }
}
