//! One level instance and its fixed-rate tick.
//!
//! A tick runs, in order: spawn, update every actor, three collision passes,
//! penetration, cleanup, kill accounting, view sync, game-over evaluation.
//! Nothing is removed from a collection until the pass that marked it has
//! finished iterating.

use std::time::Instant;

use rand::Rng;

use crate::actors::Destructible;
use crate::collaborators::Presentation;
use crate::collision::handle_collisions;
use crate::config::{LevelConfig, WorldConfig};
use crate::entities::{
    Actor, ActorId, Fighter, IdAllocator, LevelKind, LevelStatus, Overlay, Projectile,
};
use crate::error::{GameError, Result};
use crate::spawner::SpawnPolicy;

pub struct LevelEngine {
    kind: LevelKind,
    config: LevelConfig,
    world: WorldConfig,
    spawn_policy: SpawnPolicy,
    status: LevelStatus,
    running: bool,
    ids: IdAllocator,

    friendly_units: Vec<Fighter>,
    enemy_units: Vec<Fighter>,
    player_projectiles: Vec<Projectile>,
    enemy_projectiles: Vec<Projectile>,

    kill_count: u32,
    /// Enemy count after this tick's spawn phase.
    enemy_snapshot: usize,
    shield_shown: bool,
}

impl LevelEngine {
    pub fn new(
        kind: LevelKind,
        config: LevelConfig,
        world: WorldConfig,
        now: Instant,
    ) -> Result<Self> {
        config.validate(kind)?;
        let spawn_policy = SpawnPolicy::new(&config, &world);
        let mut engine = LevelEngine {
            kind,
            config,
            world,
            spawn_policy,
            status: LevelStatus::Initializing,
            running: false,
            ids: IdAllocator::default(),
            friendly_units: Vec::new(),
            enemy_units: Vec::new(),
            player_projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            kill_count: 0,
            enemy_snapshot: 0,
            shield_shown: false,
        };
        engine.initialize_friendly_units(now);
        log::info!(
            "level {:?} constructed: cap {}, spawn p {}, {} kills to advance",
            kind,
            engine.config.enemy_cap,
            engine.config.spawn_probability,
            engine.config.kills_to_advance
        );
        Ok(engine)
    }

    fn initialize_friendly_units(&mut self, now: Instant) {
        let player = Fighter::player(self.ids.next(), self.config.player_health, now);
        self.friendly_units.push(player);
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn kind(&self) -> LevelKind {
        self.kind
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn world(&self) -> &WorldConfig {
        &self.world
    }

    pub fn status(&self) -> LevelStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn kill_count(&self) -> u32 {
        self.kill_count
    }

    pub fn player(&self) -> Option<&Fighter> {
        self.friendly_units.iter().find(|f| f.is_player())
    }

    fn player_mut(&mut self) -> Option<&mut Fighter> {
        self.friendly_units.iter_mut().find(|f| f.is_player())
    }

    /// A player that has been purged counts as destroyed.
    pub fn player_is_destroyed(&self) -> bool {
        self.player().map_or(true, |p| p.is_destroyed())
    }

    pub fn friendly_units(&self) -> &[Fighter] {
        &self.friendly_units
    }

    pub fn enemy_units(&self) -> &[Fighter] {
        &self.enemy_units
    }

    pub fn player_projectiles(&self) -> &[Projectile] {
        &self.player_projectiles
    }

    pub fn enemy_projectiles(&self) -> &[Projectile] {
        &self.enemy_projectiles
    }

    /// In-place access to live enemies; membership only changes through
    /// `add_enemy_unit` and the tick.
    pub fn enemy_units_mut(&mut self) -> &mut [Fighter] {
        &mut self.enemy_units
    }

    /// A fresh id from this level's allocator.
    pub fn next_actor_id(&mut self) -> ActorId {
        self.ids.next()
    }

    /// Every live actor, for drawing.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.friendly_units
            .iter()
            .map(|f| &f.actor)
            .chain(self.enemy_units.iter().map(|f| &f.actor))
            .chain(self.player_projectiles.iter().map(|p| &p.actor))
            .chain(self.enemy_projectiles.iter().map(|p| &p.actor))
    }

    /// Hearts the view should show: health clamped to the starting count.
    pub fn hearts(&self) -> u32 {
        self.player()
            .map_or(0, |p| p.health())
            .min(self.config.player_health)
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Put the level's initial actors and the heart display on screen.
    pub fn initialize_scene(&mut self, presentation: &mut dyn Presentation) -> Result<()> {
        let Some(player) = self.player() else {
            return Err(GameError::LevelConstruction {
                level: self.kind,
                reason: "no player in friendly units".to_string(),
            });
        };
        presentation.render(&player.actor);
        presentation.show_overlay(Overlay::Hearts);
        presentation.update_health_display(self.hearts());
        Ok(())
    }

    pub fn start(&mut self) {
        self.running = true;
        self.status = LevelStatus::Running;
    }

    /// Stop the tick loop; the level keeps its state.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Clear every collection and the kill counter, rebuild the player and
    /// redraw the initial scene.  Leaves the tick loop stopped.
    pub fn reset(&mut self, now: Instant, presentation: &mut dyn Presentation) -> Result<()> {
        self.running = false;
        self.friendly_units.clear();
        self.enemy_units.clear();
        self.player_projectiles.clear();
        self.enemy_projectiles.clear();
        self.kill_count = 0;
        self.enemy_snapshot = 0;
        self.shield_shown = false;
        self.status = LevelStatus::Initializing;
        presentation.clear();
        self.initialize_friendly_units(now);
        log::info!("level {:?} reset", self.kind);
        self.initialize_scene(presentation)
    }

    // ── Input ────────────────────────────────────────────────────────────────

    pub fn move_player_up(&mut self) {
        if let Some(player) = self.player_mut() {
            player.move_up();
        }
    }

    pub fn move_player_down(&mut self) {
        if let Some(player) = self.player_mut() {
            player.move_down();
        }
    }

    pub fn stop_player(&mut self) {
        if let Some(player) = self.player_mut() {
            player.stop();
        }
    }

    /// One player shot per call; ignored while the tick loop is stopped.
    pub fn fire_projectile(
        &mut self,
        now: Instant,
        rng: &mut impl Rng,
        presentation: &mut dyn Presentation,
    ) {
        if !self.running {
            return;
        }
        let ids = &mut self.ids;
        let projectile = self
            .friendly_units
            .iter_mut()
            .find(|f| f.is_player() && !f.is_destroyed())
            .and_then(|p| p.fire_projectile(ids, now, rng));
        if let Some(projectile) = projectile {
            self.add_player_projectile(projectile, presentation);
        }
    }

    /// Let every enemy whose cooldown has elapsed try to fire.
    pub fn generate_enemy_fire(
        &mut self,
        now: Instant,
        rng: &mut impl Rng,
        presentation: &mut dyn Presentation,
    ) {
        if !self.running {
            return;
        }
        let mut fired = Vec::new();
        for enemy in self.enemy_units.iter_mut() {
            if enemy.is_destroyed() || !enemy.can_fire(now) {
                continue;
            }
            if let Some(projectile) = enemy.fire_projectile(&mut self.ids, now, rng) {
                fired.push(projectile);
            }
        }
        for projectile in fired {
            self.add_enemy_projectile(projectile, presentation);
        }
    }

    /// Track a player shot and put it on screen.
    pub fn add_player_projectile(
        &mut self,
        projectile: Projectile,
        presentation: &mut dyn Presentation,
    ) {
        presentation.render(&projectile.actor);
        self.player_projectiles.push(projectile);
    }

    pub fn add_enemy_projectile(
        &mut self,
        projectile: Projectile,
        presentation: &mut dyn Presentation,
    ) {
        presentation.render(&projectile.actor);
        self.enemy_projectiles.push(projectile);
    }

    // ── Tick ─────────────────────────────────────────────────────────────────

    /// Advance one step.  A stopped level returns its status untouched.
    pub fn tick(
        &mut self,
        now: Instant,
        rng: &mut impl Rng,
        presentation: &mut dyn Presentation,
    ) -> LevelStatus {
        if !self.running {
            return self.status;
        }
        self.spawn_enemy_units(now, rng, presentation);
        self.update_actors(rng);
        handle_collisions(
            &mut self.player_projectiles,
            &mut self.enemy_units,
            presentation,
        );
        handle_collisions(
            &mut self.enemy_projectiles,
            &mut self.friendly_units,
            presentation,
        );
        handle_collisions(
            &mut self.friendly_units,
            &mut self.enemy_units,
            presentation,
        );
        self.handle_enemy_penetration();
        self.remove_all_destroyed_actors(presentation);
        self.update_kill_count();
        self.update_level_view(presentation);
        self.check_if_game_over()
    }

    fn spawn_enemy_units(
        &mut self,
        now: Instant,
        rng: &mut impl Rng,
        presentation: &mut dyn Presentation,
    ) {
        let spawned = self
            .spawn_policy
            .spawn(self.enemy_units.len(), &mut self.ids, now, rng);
        for enemy in spawned {
            if let Err(e) = self.add_enemy_unit(enemy, presentation) {
                log::warn!("skipping spawn on level {:?}: {e}", self.kind);
            }
        }
        self.enemy_snapshot = self.enemy_units.len();
    }

    pub fn add_enemy_unit(
        &mut self,
        enemy: Fighter,
        presentation: &mut dyn Presentation,
    ) -> Result<()> {
        if enemy.is_destroyed() {
            return Err(GameError::SpawnRejected(format!(
                "enemy {} is already destroyed",
                enemy.actor.id
            )));
        }
        if self.enemy_units.len() >= self.config.enemy_cap {
            return Err(GameError::SpawnRejected(format!(
                "enemy cap {} reached",
                self.config.enemy_cap
            )));
        }
        presentation.render(&enemy.actor);
        self.enemy_units.push(enemy);
        Ok(())
    }

    fn update_actors(&mut self, rng: &mut impl Rng) {
        for fighter in self.friendly_units.iter_mut() {
            fighter.update_actor(rng);
        }
        for fighter in self.enemy_units.iter_mut() {
            fighter.update_actor(rng);
        }
        for projectile in self.player_projectiles.iter_mut() {
            projectile.update_actor();
        }
        for projectile in self.enemy_projectiles.iter_mut() {
            projectile.update_actor();
        }
    }

    /// An enemy past the player's edge costs the player one health and is
    /// destroyed outright.
    fn handle_enemy_penetration(&mut self) {
        let mut penetrated = 0;
        for enemy in self.enemy_units.iter_mut() {
            if !enemy.is_destroyed() && enemy.actor.x() < 0.0 {
                enemy.destroy();
                penetrated += 1;
            }
        }
        if penetrated == 0 {
            return;
        }
        log::debug!("{penetrated} enemies penetrated the defences");
        if let Some(player) = self.player_mut() {
            for _ in 0..penetrated {
                player.take_damage();
            }
        }
    }

    fn remove_all_destroyed_actors(&mut self, presentation: &mut dyn Presentation) {
        let (width, height) = (self.world.width, self.world.height);
        for projectile in self
            .player_projectiles
            .iter_mut()
            .chain(self.enemy_projectiles.iter_mut())
        {
            let b = projectile.actor.bounds();
            if b.x > width || b.x + b.width < 0.0 || b.y > height || b.y + b.height < 0.0 {
                projectile.destroy();
            }
        }
        remove_destroyed_actors(&mut self.friendly_units, presentation);
        remove_destroyed_actors(&mut self.enemy_units, presentation);
        remove_destroyed_actors(&mut self.player_projectiles, presentation);
        remove_destroyed_actors(&mut self.enemy_projectiles, presentation);
    }

    fn update_kill_count(&mut self) {
        let kills = self.enemy_snapshot.saturating_sub(self.enemy_units.len());
        self.enemy_snapshot = self.enemy_units.len();
        for _ in 0..kills {
            self.kill_count += 1;
            if let Some(player) = self.player_mut() {
                player.increment_kill_count();
            }
        }
    }

    fn update_level_view(&mut self, presentation: &mut dyn Presentation) {
        presentation.update_health_display(self.hearts());
        let shielded = self.enemy_units.iter().any(|e| e.is_shielded());
        if shielded != self.shield_shown {
            if shielded {
                presentation.show_overlay(Overlay::Shield);
            } else {
                presentation.hide_overlay(Overlay::Shield);
            }
            self.shield_shown = shielded;
        }
    }

    /// Loss is checked before the kill threshold.
    fn check_if_game_over(&mut self) -> LevelStatus {
        if self.player_is_destroyed() {
            self.status = LevelStatus::Lost;
        } else if self.kill_count >= self.config.kills_to_advance {
            self.status = LevelStatus::Won;
        }
        self.status
    }
}

fn remove_destroyed_actors<T: Destructible>(
    actors: &mut Vec<T>,
    presentation: &mut dyn Presentation,
) {
    actors.retain(|a| {
        if a.is_destroyed() {
            presentation.remove(a.actor());
            false
        } else {
            true
        }
    });
}
