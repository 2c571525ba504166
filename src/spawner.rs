//! Per-level enemy spawn policy.

use std::time::Instant;

use rand::Rng;

use crate::config::{LevelConfig, WorldConfig};
use crate::entities::{EnemyKind, Fighter, IdAllocator};

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnPolicy {
    pub target_enemies: usize,
    pub probability: f64,
    pub kind: EnemyKind,
    /// Forward edge the enemies enter from.
    pub spawn_x: f64,
    /// Exclusive upper limit of the spawn band.
    pub max_y: f64,
}

impl SpawnPolicy {
    pub fn new(level: &LevelConfig, world: &WorldConfig) -> Self {
        SpawnPolicy {
            target_enemies: level.enemy_cap,
            probability: level.spawn_probability,
            kind: level.enemy_kind,
            spawn_x: world.width,
            max_y: (world.height - world.spawn_margin).max(0.0),
        }
    }

    /// One roll per missing enemy; each success yields a new fighter.
    pub fn spawn(
        &self,
        current_enemies: usize,
        ids: &mut IdAllocator,
        now: Instant,
        rng: &mut impl Rng,
    ) -> Vec<Fighter> {
        let deficit = self.target_enemies.saturating_sub(current_enemies);
        let mut spawned = Vec::new();
        for _ in 0..deficit {
            if rng.gen::<f64>() >= self.probability {
                continue;
            }
            let fighter = match self.kind {
                EnemyKind::Basic => {
                    let y = rng.gen::<f64>() * self.max_y;
                    Fighter::enemy(ids.next(), self.spawn_x, y, now)
                }
                EnemyKind::Boss => Fighter::boss(ids.next(), now, rng),
            };
            spawned.push(fighter);
        }
        spawned
    }
}
