//! Arena state and the fixed-timestep tick
//!
//! One [`ArenaState`] is a loaded level: its grid, the player, the regular
//! enemies, spikes and heart pickups and (in a boss arena) the boss. [`tick`] advances all of them in a
//! fixed order and records what happened as [`SimEvent`]s for the caller to
//! drain (sound, HUD, overlays).

use serde::{Deserialize, Serialize};

use super::boss::{Boss, DamageOutcome};
use super::clock::{Clock, FixedStepClock};
use super::enemy::Enemy;
use super::hitbox::Hitbox;
use super::items::{HeartPickup, Spike};
use super::player::{Player, PlayerInput};
use super::spawn::{
    arena_heart_spawn_points, boss_arena_player_start, boss_spawn_point, enemy_spawn_points,
    heart_spawn_point, spike_spawn_points,
};
use super::tile::{Solidity, TileGrid};
use crate::consts::SCALE;
use crate::tuning::Tuning;

/// Current phase of the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArenaPhase {
    /// Active gameplay
    Playing,
    /// Boss defeated
    Victory,
    /// Player out of hearts or fell into a pit
    Defeat,
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    PlayerJumped,
    PlayerDamaged { hearts: i32 },
    PlayerFellIntoPit,
    PlayerDefeated,
    /// A spike hurt the player (follows the matching `PlayerDamaged`)
    PlayerSpiked,
    HeartCollected { hearts: i32 },
    EnemyFired,
    EnemyDefeated,
    BossSpawned,
    BossFired,
    BossDamaged { health: i32 },
    BossDying,
    BossDefeated,
    Victory,
}

/// A loaded level and everything in it
#[derive(Debug, Clone)]
pub struct ArenaState {
    /// Seed for every controller's RNG
    pub seed: u64,
    pub grid: TileGrid,
    pub tuning: Tuning,
    pub clock: FixedStepClock,
    pub phase: ArenaPhase,
    pub player: Player,
    /// Regular enemies (in spawn order)
    pub enemies: Vec<Enemy>,
    pub spikes: Vec<Spike>,
    /// Uncollected heart pickups
    pub hearts: Vec<HeartPickup>,
    pub boss: Option<Boss>,
    /// Time at which the pending boss appears
    boss_due_ms: Option<u64>,
    boss_defeated: bool,
    /// Events since the last drain
    pub events: Vec<SimEvent>,
}

impl ArenaState {
    fn with_player(grid: TileGrid, tuning: Tuning, seed: u64, x: f32, y: f32) -> Self {
        let mut player = Player::new(x, y, &tuning.player);
        player.load_level(&grid);
        Self {
            seed,
            clock: FixedStepClock::new(tuning.world.ms_per_tick),
            grid,
            tuning,
            phase: ArenaPhase::Playing,
            player,
            enemies: Vec::new(),
            spikes: Vec::new(),
            hearts: Vec::new(),
            boss: None,
            boss_due_ms: None,
            boss_defeated: false,
            events: Vec::new(),
        }
    }

    /// Regular level: player at the left edge, enemies placed on the ground
    pub fn level(grid: TileGrid, tuning: Tuning, seed: u64) -> Self {
        let mut state = Self::with_player(grid, tuning, seed, 32.0 * SCALE, 100.0 * SCALE);
        state.enemies = enemy_spawn_points(&state.grid, &state.tuning, &Solidity::Ground)
            .into_iter()
            .map(|p| Enemy::new(p.x, p.y, &state.tuning))
            .collect();
        state.place_spikes(false);
        let avoid = state.spike_hitboxes();
        let items = &state.tuning.items;
        state.hearts = heart_spawn_point(&state.grid, items, &avoid, &Solidity::Ground)
            .map(|p| HeartPickup::new(p, items.heart_size, items.heart_heal))
            .into_iter()
            .collect();
        log::info!(
            "Level loaded: {}x{} tiles, {} enemies, {} spikes, {} hearts",
            state.grid.cols(),
            state.grid.rows(),
            state.enemies.len(),
            state.spikes.len(),
            state.hearts.len()
        );
        state
    }

    /// Boss arena: no regular enemies, the boss appears after the intro delay
    pub fn boss_arena(grid: TileGrid, tuning: Tuning, seed: u64) -> Self {
        let start = boss_arena_player_start(&grid);
        let mut state = Self::with_player(grid, tuning, seed, start.x, start.y);
        state.boss_due_ms = Some(state.clock.now_ms() + state.tuning.boss.intro_ms);
        state.place_spikes(true);
        let avoid = state.spike_hitboxes();
        let items = &state.tuning.items;
        state.hearts = arena_heart_spawn_points(&state.grid, items, &avoid, &Solidity::Ground)
            .into_iter()
            .map(|p| HeartPickup::new(p, items.heart_size, items.heart_heal))
            .collect();
        log::info!(
            "Boss arena loaded: {}x{} tiles, boss in {}ms",
            state.grid.cols(),
            state.grid.rows(),
            state.tuning.boss.intro_ms
        );
        state
    }

    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn is_boss_arena(&self) -> bool {
        self.boss_due_ms.is_some() || self.boss.is_some() || self.boss_defeated
    }

    /// Boss intro still running
    pub fn boss_intro_active(&self) -> bool {
        self.boss_due_ms.is_some()
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    fn place_spikes(&mut self, boss_arena: bool) {
        let items = &self.tuning.items;
        let columns = if boss_arena {
            &items.arena_spike_columns
        } else {
            &items.spike_columns
        };
        self.spikes = spike_spawn_points(&self.grid, columns, items.spike_size, &Solidity::Ground)
            .into_iter()
            .map(|p| Spike::new(p, items.spike_size, items.spike_damage))
            .collect();
    }

    fn spike_hitboxes(&self) -> Vec<Hitbox> {
        self.spikes.iter().map(|s| s.hitbox).collect()
    }

    /// Apply damage through the player's cooldown. True if it landed.
    fn hurt_player(&mut self, amount: i32) -> bool {
        if amount > 0 && self.player.take_damage(amount, &self.clock) {
            self.events.push(SimEvent::PlayerDamaged {
                hearts: self.player.hearts(),
            });
            return true;
        }
        false
    }

    fn spawn_boss(&mut self) {
        let at = boss_spawn_point(&self.grid, &self.tuning);
        self.boss = Some(Boss::new(at.x, at.y, &self.grid, &self.tuning, &self.clock, self.seed));
        self.events.push(SimEvent::BossSpawned);
    }

    fn defeat(&mut self) {
        self.phase = ArenaPhase::Defeat;
        self.events.push(SimEvent::PlayerDefeated);
        log::info!("Player defeated at {}ms", self.now_ms());
    }
}

/// Advance the arena by one fixed timestep
pub fn tick(state: &mut ArenaState, input: &PlayerInput) {
    if state.phase != ArenaPhase::Playing {
        return;
    }
    state.clock.step();
    let now = state.clock.now_ms();

    // Player
    if state.player.update(&state.grid, input) {
        state.events.push(SimEvent::PlayerJumped);
    }
    let target = *state.player.hitbox();

    // Enemies
    for enemy in &mut state.enemies {
        if enemy.update(&state.grid, Some(target), &state.clock) {
            state.events.push(SimEvent::EnemyFired);
        }
    }

    // Boss (after its intro)
    if state.boss_due_ms.is_some_and(|due| now >= due) {
        state.boss_due_ms = None;
        state.spawn_boss();
    }
    if let Some(boss) = &mut state.boss {
        if boss.update(&state.grid, Some(target), &state.clock).fired {
            state.events.push(SimEvent::BossFired);
        }
    }

    // Damage to the player. Each source is applied in turn; the cooldown
    // lets at most one through.
    let mut incoming = Vec::new();
    for enemy in &mut state.enemies {
        if enemy.collides_with_body(&target) {
            incoming.push(enemy.contact_damage());
        }
        incoming.push(enemy.check_projectile_collision(&target));
    }
    if let Some(boss) = &mut state.boss {
        if boss.collides_with_body(&target) {
            incoming.push(state.tuning.boss.contact_damage);
        }
        incoming.push(boss.check_projectile_collision(&target));
    }
    for amount in incoming {
        state.hurt_player(amount);
    }
    let spike_damage = state
        .spikes
        .iter()
        .filter(|s| s.touches(&target))
        .map(|s| s.damage)
        .max();
    if let Some(amount) = spike_damage {
        if state.hurt_player(amount) {
            state.events.push(SimEvent::PlayerSpiked);
        }
    }

    // Player attack
    if let Some(attack) = state.player.attack_hitbox() {
        for enemy in &mut state.enemies {
            if !enemy.is_defeated() && enemy.hitbox().intersects(&attack) {
                enemy.defeat();
                state.events.push(SimEvent::EnemyDefeated);
            }
        }
        if let Some(boss) = &mut state.boss {
            if !boss.is_dying() && boss.hitbox().intersects(&attack) {
                match boss.take_damage(state.tuning.player.attack_damage, &state.clock) {
                    DamageOutcome::Hurt { health } => {
                        state.events.push(SimEvent::BossDamaged { health });
                    }
                    DamageOutcome::Killed => {
                        state.events.push(SimEvent::BossDamaged { health: 0 });
                        state.events.push(SimEvent::BossDying);
                    }
                    DamageOutcome::Ignored => {}
                }
            }
        }
    }

    // Pickups
    if !state.player.is_defeated() {
        for heart in &mut state.hearts {
            if heart.try_collect(&target) {
                state.player.heal(heart.heal);
                state.events.push(SimEvent::HeartCollected {
                    hearts: state.player.hearts(),
                });
            }
        }
    }

    // Sweep
    state.enemies.retain(|e| !e.is_defeated());
    state.hearts.retain(|h| !h.is_collected());
    if state.boss.as_ref().is_some_and(Boss::is_dead) {
        state.boss = None;
        state.boss_defeated = true;
        state.phase = ArenaPhase::Victory;
        state.events.push(SimEvent::BossDefeated);
        state.events.push(SimEvent::Victory);
        log::info!("Boss defeated at {}ms", now);
        return;
    }

    // Pit and hearts
    if state.player.fell_into_pit(&state.grid, state.tuning.world.pit_margin) {
        state.events.push(SimEvent::PlayerFellIntoPit);
        state.defeat();
    } else if state.player.is_defeated() {
        state.defeat();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::BossPhase;
    use crate::sim::tile::{AIR, GROUND};

    const TS: f32 = 48.0;

    /// 45 x 14 arena with a floor and walls on both sides
    fn arena_grid() -> TileGrid {
        let mut grid = TileGrid::filled(45, 14, AIR, TS).unwrap();
        grid.fill_span(12, 0..=44, GROUND);
        grid.fill_span(13, 0..=44, GROUND);
        for row in 0..14 {
            grid.fill_span(row, 0..=1, GROUND);
            grid.fill_span(row, 43..=44, GROUND);
        }
        grid
    }

    fn level_grid() -> TileGrid {
        let mut grid = TileGrid::filled(30, 14, AIR, TS).unwrap();
        grid.fill_span(13, 0..=29, GROUND);
        grid
    }

    fn run(state: &mut ArenaState, input: &PlayerInput, ticks: u32) {
        for _ in 0..ticks {
            tick(state, input);
        }
    }

    #[test]
    fn test_boss_appears_after_intro() {
        let mut state = ArenaState::boss_arena(arena_grid(), Tuning::default(), 42);
        assert!(state.boss_intro_active());

        // 4000ms at 5ms per tick
        run(&mut state, &PlayerInput::default(), 799);
        assert!(state.boss.is_none());
        tick(&mut state, &PlayerInput::default());
        assert!(state.boss.is_some());
        assert!(!state.boss_intro_active());
        assert!(state.drain_events().contains(&SimEvent::BossSpawned));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_level_spawns_enemies_on_ground() {
        let mut state = ArenaState::level(level_grid(), Tuning::default(), 1);
        assert_eq!(state.enemies.len(), 3);
        assert!(!state.is_boss_arena());

        run(&mut state, &PlayerInput::default(), 100);
        for enemy in &state.enemies {
            assert!(enemy.body.grounded);
            assert!(enemy.hitbox().bottom() <= 13.0 * TS);
        }
    }

    #[test]
    fn test_attack_defeats_enemy() {
        let mut state = ArenaState::level(level_grid(), Tuning::default(), 1);
        run(&mut state, &PlayerInput::default(), 200);

        // Drop the first enemy right in front of the player
        let player = *state.player.hitbox();
        state.enemies[0].body.hitbox.x = player.right() + 5.0;
        state.enemies[0].body.hitbox.y = player.y + 10.0;
        state.enemies[0].body.x_speed = 0.0;
        state.drain_events();

        tick(
            &mut state,
            &PlayerInput {
                attack: true,
                ..Default::default()
            },
        );
        assert_eq!(state.enemies.len(), 2);
        assert!(state.events.contains(&SimEvent::EnemyDefeated));
    }

    #[test]
    fn test_enemy_contact_hurts_once_per_cooldown() {
        let mut state = ArenaState::level(level_grid(), Tuning::default(), 1);
        run(&mut state, &PlayerInput::default(), 200);
        let player = *state.player.hitbox();
        for enemy in &mut state.enemies {
            enemy.body.hitbox = enemy.body.hitbox.at(player.x, player.y);
            enemy.body.x_speed = 0.0;
        }
        state.drain_events();

        tick(&mut state, &PlayerInput::default());
        assert_eq!(state.player.hearts(), 2);
        assert_eq!(state.events, vec![SimEvent::PlayerDamaged { hearts: 2 }]);

        // 600ms cooldown = 120 ticks
        run(&mut state, &PlayerInput::default(), 119);
        assert_eq!(state.player.hearts(), 2);
        tick(&mut state, &PlayerInput::default());
        assert_eq!(state.player.hearts(), 1);
    }

    #[test]
    fn test_level_places_spikes_and_one_heart() {
        let state = ArenaState::level(level_grid(), Tuning::default(), 1);
        let xs: Vec<f32> = state.spikes.iter().map(|s| s.hitbox.x).collect();
        assert_eq!(xs, vec![6.0 * TS + 12.0, 10.0 * TS + 12.0, 16.0 * TS + 12.0, 21.0 * TS + 12.0]);
        assert!(state.spikes.iter().all(|s| s.hitbox.bottom() == 13.0 * TS));

        assert_eq!(state.hearts.len(), 1);
        let heart = state.hearts[0].hitbox;
        assert_eq!(heart.bottom(), 13.0 * TS - 6.0);
        assert!(state.spikes.iter().all(|s| !s.hitbox.intersects(&heart)));
    }

    #[test]
    fn test_spike_hurts_under_shared_cooldown() {
        let mut state = ArenaState::level(level_grid(), Tuning::default(), 1);
        state.enemies.clear();
        run(&mut state, &PlayerInput::default(), 200);

        let spike = state.spikes[1].hitbox;
        let height = state.player.hitbox().height;
        state.player.body.teleport(spike.x, spike.bottom() - height);
        state.drain_events();

        tick(&mut state, &PlayerInput::default());
        assert_eq!(state.player.hearts(), 2);
        assert_eq!(
            state.events,
            vec![SimEvent::PlayerDamaged { hearts: 2 }, SimEvent::PlayerSpiked]
        );

        // Same 600ms cooldown as contact damage
        run(&mut state, &PlayerInput::default(), 119);
        assert_eq!(state.player.hearts(), 2);
        tick(&mut state, &PlayerInput::default());
        assert_eq!(state.player.hearts(), 1);

        run(&mut state, &PlayerInput::default(), 120);
        assert_eq!(state.phase, ArenaPhase::Defeat);
    }

    #[test]
    fn test_heart_pickup_heals_and_is_swept() {
        let mut state = ArenaState::level(level_grid(), Tuning::default(), 1);
        state.enemies.clear();
        run(&mut state, &PlayerInput::default(), 200);
        assert!(state.player.take_damage(1, &state.clock));
        assert_eq!(state.player.hearts(), 2);

        let heart = state.hearts[0].hitbox;
        let height = state.player.hitbox().height;
        state.player.body.teleport(heart.x, 13.0 * TS - height);
        state.drain_events();

        tick(&mut state, &PlayerInput::default());
        assert_eq!(state.player.hearts(), 3);
        assert_eq!(state.events, vec![SimEvent::HeartCollected { hearts: 3 }]);
        assert!(state.hearts.is_empty());
    }

    #[test]
    fn test_boss_arena_hearts_without_spikes() {
        let state = ArenaState::boss_arena(arena_grid(), Tuning::default(), 1);
        assert!(state.spikes.is_empty());
        assert_eq!(state.hearts.len(), 3);
        assert!(state.hearts.iter().all(|h| h.hitbox.bottom() == 12.0 * TS - 6.0));
    }

    #[test]
    fn test_falling_into_pit_is_defeat() {
        let mut grid = level_grid();
        grid.fill_span(13, 0..=29, AIR);
        let mut state = ArenaState::level(grid, Tuning::default(), 1);
        run(&mut state, &PlayerInput::default(), 1000);
        assert_eq!(state.phase, ArenaPhase::Defeat);
        let events = state.drain_events();
        assert!(events.contains(&SimEvent::PlayerFellIntoPit));
        assert!(events.contains(&SimEvent::PlayerDefeated));

        // Frozen once over
        let ticks = state.clock.ticks;
        tick(&mut state, &PlayerInput::default());
        assert_eq!(state.clock.ticks, ticks);
    }

    #[test]
    fn test_killing_boss_is_victory_after_fade() {
        let mut tuning = Tuning::default();
        tuning.boss.intro_ms = 0;
        tuning.boss.max_health = 1;
        tuning.boss.shot_chance = 0.0;
        let mut state = ArenaState::boss_arena(arena_grid(), tuning, 3);
        tick(&mut state, &PlayerInput::default());

        // Park the player next to the boss, out of contact range
        let boss = *state.boss.as_ref().unwrap().hitbox();
        state.player.body.teleport(boss.x - 31.0, boss.y);
        tick(
            &mut state,
            &PlayerInput {
                attack: true,
                ..Default::default()
            },
        );
        let boss = state.boss.as_ref().unwrap();
        assert!(boss.is_dying());
        assert_eq!(boss.phase(), BossPhase::Retreat);
        assert!(state.events.contains(&SimEvent::BossDying));

        run(&mut state, &PlayerInput::default(), 59);
        assert!(state.boss.is_some());
        assert_eq!(state.phase, ArenaPhase::Playing);
        tick(&mut state, &PlayerInput::default());
        assert!(state.boss.is_none());
        assert_eq!(state.phase, ArenaPhase::Victory);
        assert!(state.events.contains(&SimEvent::Victory));
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = ArenaState::boss_arena(arena_grid(), Tuning::default(), 99);
        let mut b = ArenaState::boss_arena(arena_grid(), Tuning::default(), 99);
        let inputs = [
            PlayerInput::default(),
            PlayerInput {
                right: true,
                ..Default::default()
            },
            PlayerInput {
                right: true,
                jump: true,
                ..Default::default()
            },
        ];
        for i in 0..3000 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input);
            tick(&mut b, input);
        }
        assert_eq!(a.events, b.events);
        assert_eq!(a.player.hitbox(), b.player.hitbox());
        assert_eq!(
            a.boss.as_ref().map(|boss| *boss.hitbox()),
            b.boss.as_ref().map(|boss| *boss.hitbox())
        );
    }
}
