//! Boss controller
//!
//! A timed, distance-driven state machine (Patrol, Chase, Attack, Retreat)
//! on top of a hovering [`KinematicBody`], plus an independent ranged attack
//! and a two-stage dying -> dead lifecycle.
//!
//! State transitions are computed by the pure [`next_state`] function; the
//! controller only feeds it inputs and applies the movement side effects.
//! Retreat is never chosen by the machine itself: it is forced by
//! [`Boss::take_damage`], which may be called at any point between ticks.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{HorizontalBlock, Hover, KinematicBody};
use super::clock::Clock;
use super::hitbox::Hitbox;
use super::projectile::{FieldBounds, Projectile, ProjectileSet};
use super::tile::{Solidity, TileGrid};
use crate::horizontal_sign;
use crate::tuning::{BossTuning, Tuning};

/// Ticks per animation frame
const ANIM_SPEED: u32 = 8;

/// Behavior without its entry timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossPhase {
    Patrol,
    Chase,
    Attack,
    Retreat,
}

/// Current behavior, tagged with the time it was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossState {
    /// Walk between the arena's patrol bounds
    Patrol { since_ms: u64 },
    /// Close in on the target
    Chase { since_ms: u64 },
    /// Charge at the target
    Attack { since_ms: u64 },
    /// Back away after taking a hit
    Retreat { since_ms: u64 },
}

impl BossState {
    pub fn enter(phase: BossPhase, now_ms: u64) -> Self {
        match phase {
            BossPhase::Patrol => BossState::Patrol { since_ms: now_ms },
            BossPhase::Chase => BossState::Chase { since_ms: now_ms },
            BossPhase::Attack => BossState::Attack { since_ms: now_ms },
            BossPhase::Retreat => BossState::Retreat { since_ms: now_ms },
        }
    }

    pub fn phase(&self) -> BossPhase {
        match self {
            BossState::Patrol { .. } => BossPhase::Patrol,
            BossState::Chase { .. } => BossPhase::Chase,
            BossState::Attack { .. } => BossPhase::Attack,
            BossState::Retreat { .. } => BossPhase::Retreat,
        }
    }

    pub fn since_ms(&self) -> u64 {
        match *self {
            BossState::Patrol { since_ms }
            | BossState::Chase { since_ms }
            | BossState::Attack { since_ms }
            | BossState::Retreat { since_ms } => since_ms,
        }
    }

    /// Time spent in this state as of `now_ms`
    #[inline]
    pub fn elapsed(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.since_ms())
    }
}

/// Everything [`next_state`] reads for one decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineInputs {
    pub now_ms: u64,
    /// Horizontal center-to-center distance to the target, `None` without a target
    pub distance: Option<f32>,
    /// Uniform roll in `[0, 1)` for the attack gate
    pub attack_roll: f32,
    /// Attack cooldown has elapsed
    pub attack_ready: bool,
}

/// Pure transition function of the boss state machine
pub fn next_state(state: BossState, inputs: &MachineInputs, tuning: &BossTuning) -> BossState {
    let now = inputs.now_ms;
    let Some(distance) = inputs.distance else {
        return match state {
            BossState::Patrol { .. } => state,
            _ => BossState::Patrol { since_ms: now },
        };
    };
    let elapsed = state.elapsed(now);

    match state {
        BossState::Patrol { .. } if distance < tuning.near_threshold => {
            BossState::Chase { since_ms: now }
        }
        BossState::Chase { .. }
            if distance < tuning.attack_threshold
                && elapsed > tuning.chase_min_ms
                && inputs.attack_ready
                && inputs.attack_roll < tuning.attack_chance =>
        {
            BossState::Attack { since_ms: now }
        }
        BossState::Attack { .. } if elapsed > tuning.attack_duration_ms => {
            BossState::Chase { since_ms: now }
        }
        BossState::Retreat { .. } if elapsed > tuning.retreat_duration_ms => {
            BossState::Chase { since_ms: now }
        }
        _ => state,
    }
}

/// What a damage call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Non-positive amount, already dying, or inside the invulnerability window
    Ignored,
    /// Health reduced, boss retreats
    Hurt { health: i32 },
    /// Health reached zero, death sequence started
    Killed,
}

/// Notable things that happened during one [`Boss::update`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BossTickReport {
    /// `(from, to)` when the machine changed phase this tick, including a
    /// hit-forced Retreat taken since the previous update
    pub transition: Option<(BossPhase, BossPhase)>,
    /// A projectile was emitted this tick
    pub fired: bool,
}

/// Render-side animation counters, reset on every phase change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationCounter {
    pub tick: u32,
    pub index: u32,
}

impl AnimationCounter {
    fn advance(&mut self) {
        self.tick += 1;
        if self.tick >= ANIM_SPEED {
            self.tick = 0;
            self.index = self.index.wrapping_add(1);
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The boss
#[derive(Debug, Clone)]
pub struct Boss {
    pub body: KinematicBody,
    state: BossState,
    /// Phase before a hit forced Retreat, reported on the next update
    forced_from: Option<BossPhase>,
    anim_phase: Option<BossPhase>,
    anim: AnimationCounter,

    patrol_left: f32,
    patrol_right: f32,
    patrolling_right: bool,
    facing_left: bool,

    hover: Hover,
    next_attack_ms: u64,

    health: i32,
    max_health: i32,
    last_hit_ms: Option<u64>,
    dying: bool,
    death_tick: u32,

    last_shot_ms: Option<u64>,
    projectiles: ProjectileSet,
    projectile_margin: f32,

    tuning: BossTuning,
    rng: Pcg32,
}

impl Boss {
    /// Spawn a boss whose sprite's top-left corner is at (`x`, `y`)
    pub fn new(x: f32, y: f32, grid: &TileGrid, tuning: &Tuning, clock: &impl Clock, seed: u64) -> Self {
        let bt = tuning.boss.clone();
        let now = clock.now_ms();
        let ts = grid.tile_size();

        let hitbox = Hitbox::new(x, y, bt.width, bt.height).shrunk(bt.hitbox_inset);
        let mut body = KinematicBody::new(hitbox, Solidity::Flight)
            .with_wall_policy(HorizontalBlock::ReverseDamped(bt.wall_damping));
        body.x_speed = bt.base_speed;

        let patrol_right = (bt.patrol_right_tile as f32 * ts).min(grid.pixel_width());
        let patrol_left = (bt.patrol_left_tile as f32 * ts).min(patrol_right);

        let rows = grid.rows();
        let max_y = rows.saturating_sub(bt.hover_low_rows) as f32 * ts - hitbox.height;
        let min_y = (rows.saturating_sub(bt.hover_high_rows) as f32 * ts - hitbox.height).max(0.0);
        let hover = Hover {
            target_y: hitbox.y,
            smoothing: bt.hover_smoothing,
            max_speed: bt.hover_max_speed,
            min_y,
            max_y: max_y.max(min_y),
            next_retarget_ms: now + bt.hover_first_retarget_ms,
        };

        log::info!(
            "Boss spawned at ({:.0}, {:.0}) with {} health, patrol [{:.0}, {:.0}]",
            hitbox.x,
            hitbox.y,
            bt.max_health,
            patrol_left,
            patrol_right
        );

        Self {
            body,
            state: BossState::Patrol { since_ms: now },
            forced_from: None,
            anim_phase: None,
            anim: AnimationCounter::default(),
            patrol_left,
            patrol_right,
            patrolling_right: true,
            facing_left: false,
            hover,
            next_attack_ms: now + bt.initial_attack_delay_ms,
            health: bt.max_health,
            max_health: bt.max_health,
            last_hit_ms: None,
            dying: false,
            death_tick: 0,
            last_shot_ms: None,
            projectiles: ProjectileSet::new(),
            projectile_margin: tuning.world.projectile_margin,
            tuning: bt,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Advance one tick. `target` is a snapshot of the target's hitbox.
    pub fn update(&mut self, grid: &TileGrid, target: Option<Hitbox>, clock: &impl Clock) -> BossTickReport {
        let now = clock.now_ms();
        let bounds = FieldBounds::for_grid(grid, self.projectile_margin);
        let mut report = BossTickReport::default();

        if self.dying {
            if let Some(from) = self.forced_from.take() {
                report.transition = Some((from, BossPhase::Retreat));
            }
            self.death_tick = self.death_tick.saturating_add(1);
            self.projectiles.update(&bounds, now);
            return report;
        }

        let from = self.forced_from.take().unwrap_or(self.state.phase());
        self.update_state(target, now);
        let to = self.state.phase();
        if from != to {
            report.transition = Some((from, to));
            log::debug!("Boss {:?} -> {:?} at {}ms", from, to, now);
        }

        if self.anim_phase != Some(to) {
            self.anim.reset();
            self.anim_phase = Some(to);
        }

        if let Some(target) = target {
            match to {
                BossPhase::Patrol => self.execute_patrol(),
                BossPhase::Chase => self.execute_chase(&target),
                BossPhase::Attack => self.execute_attack(&target),
                BossPhase::Retreat => self.execute_retreat(&target),
            }
        } else {
            self.execute_patrol();
        }

        self.apply_horizontal(grid);

        if let Some(target) = target {
            self.apply_hover(grid, &target, now);
            report.fired = self.shoot_at(&target, now);
        }

        self.projectiles.update(&bounds, now);
        self.anim.advance();
        report
    }

    fn update_state(&mut self, target: Option<Hitbox>, now: u64) {
        let distance = target.map(|t| (t.center_x() - self.body.hitbox.center_x()).abs());
        let inputs = MachineInputs {
            now_ms: now,
            distance,
            attack_roll: self.rng.random::<f32>(),
            attack_ready: now >= self.next_attack_ms,
        };

        let next = next_state(self.state, &inputs, &self.tuning);
        if next.phase() == BossPhase::Attack && self.state.phase() != BossPhase::Attack {
            let jitter = self.tuning.attack_cooldown_jitter_ms;
            let extra = if jitter > 0 {
                self.rng.random_range(0..jitter)
            } else {
                0
            };
            self.next_attack_ms = now + self.tuning.attack_cooldown_ms + extra;
        }
        self.state = next;
    }

    fn execute_patrol(&mut self) {
        let speed = self.tuning.base_speed;
        let hb = self.body.hitbox;
        if self.patrolling_right {
            self.body.x_speed = speed;
            self.facing_left = false;
            if hb.right() >= self.patrol_right {
                self.patrolling_right = false;
            }
        } else {
            self.body.x_speed = -speed;
            self.facing_left = true;
            if hb.x <= self.patrol_left {
                self.patrolling_right = true;
            }
        }
    }

    fn execute_chase(&mut self, target: &Hitbox) {
        let sign = horizontal_sign(
            self.body.hitbox.center_x(),
            target.center_x(),
            self.tuning.chase_dead_zone,
        );
        self.body.x_speed = sign * self.tuning.charge_speed;
        if sign < 0.0 {
            self.facing_left = true;
        } else if sign > 0.0 {
            self.facing_left = false;
        }
    }

    fn execute_attack(&mut self, target: &Hitbox) {
        let speed = self.tuning.charge_speed * self.tuning.attack_multiplier;
        self.facing_left = target.center_x() < self.body.hitbox.center_x();
        self.body.x_speed = if self.facing_left { -speed } else { speed };
    }

    fn execute_retreat(&mut self, target: &Hitbox) {
        // Back away while still facing the target
        let speed = self.tuning.charge_speed;
        self.facing_left = target.center_x() < self.body.hitbox.center_x();
        self.body.x_speed = if self.facing_left { speed } else { -speed };
    }

    fn apply_horizontal(&mut self, grid: &TileGrid) {
        let outcome = self.body.step_horizontal(grid);
        if outcome.is_blocked() && self.state.phase() == BossPhase::Patrol {
            self.patrolling_right = !self.patrolling_right;
        }

        let hb = &mut self.body.hitbox;
        if hb.x < self.patrol_left {
            hb.x = self.patrol_left;
            self.patrolling_right = true;
        }
        if hb.right() > self.patrol_right {
            hb.x = (self.patrol_right - hb.width).max(self.patrol_left);
            self.patrolling_right = false;
        }
    }

    fn apply_hover(&mut self, grid: &TileGrid, target: &Hitbox, now: u64) {
        if self.hover.retarget_due(now) {
            let spread = self.tuning.hover_offset;
            let offset = if spread > 0.0 {
                self.rng.random_range(-spread..spread)
            } else {
                0.0
            };
            let jitter = self.tuning.hover_retarget_jitter_ms;
            let next_in = self.tuning.hover_retarget_ms
                + if jitter > 0 {
                    self.rng.random_range(0..jitter)
                } else {
                    0
                };
            self.hover.retarget(target.y + offset, now, next_in);
        }
        self.body.step_hover(grid, &self.hover);
    }

    /// Ranged attack, gated by a per-tick roll and its own cooldown
    fn shoot_at(&mut self, target: &Hitbox, now: u64) -> bool {
        if self.rng.random::<f32>() >= self.tuning.shot_chance {
            return false;
        }
        let cooled_down = self
            .last_shot_ms
            .is_none_or(|last| now.saturating_sub(last) > self.tuning.projectile_cooldown_ms);
        if !cooled_down {
            return false;
        }

        let origin = self.body.hitbox.center();
        let Some(dir) = crate::direction_between(origin, target.center()) else {
            return false;
        };

        let projectile = Projectile::new(
            origin,
            dir * self.tuning.projectile_speed,
            self.tuning.projectile_size,
            self.tuning.projectile_damage,
            now,
        )
        .with_max_age(self.tuning.projectile_max_age_ms);
        self.projectiles.spawn(projectile);
        self.last_shot_ms = Some(now);
        log::debug!("Boss fired toward ({:.0}, {:.0})", target.center().x, target.center().y);
        true
    }

    /// Accept a hit. Callable at any time; debounced by the invulnerability window.
    pub fn take_damage(&mut self, amount: i32, clock: &impl Clock) -> DamageOutcome {
        if amount <= 0 || self.dying {
            return DamageOutcome::Ignored;
        }

        let now = clock.now_ms();
        if let Some(last) = self.last_hit_ms {
            if now.saturating_sub(last) < self.tuning.invulnerability_ms {
                return DamageOutcome::Ignored;
            }
        }

        self.health = (self.health - amount).max(0);
        self.last_hit_ms = Some(now);
        if self.forced_from.is_none() && self.state.phase() != BossPhase::Retreat {
            self.forced_from = Some(self.state.phase());
        }
        self.state = BossState::Retreat { since_ms: now };

        if self.health == 0 {
            self.dying = true;
            log::info!("Boss defeated, starting death sequence");
            DamageOutcome::Killed
        } else {
            log::debug!("Boss hit, health {}/{}", self.health, self.max_health);
            DamageOutcome::Hurt {
                health: self.health,
            }
        }
    }

    /// Sum damage from active projectiles touching `target`, deactivating each hit
    pub fn check_projectile_collision(&mut self, target: &Hitbox) -> i32 {
        self.projectiles.check_collision(target)
    }

    /// Body-to-body contact (never while dying)
    pub fn collides_with_body(&self, target: &Hitbox) -> bool {
        !self.dying && self.body.hitbox.intersects(target)
    }

    #[inline]
    pub fn hitbox(&self) -> &Hitbox {
        &self.body.hitbox
    }

    #[inline]
    pub fn state(&self) -> BossState {
        self.state
    }

    #[inline]
    pub fn phase(&self) -> BossPhase {
        self.state.phase()
    }

    #[inline]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[inline]
    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    #[inline]
    pub fn facing_left(&self) -> bool {
        self.facing_left
    }

    #[inline]
    pub fn is_dying(&self) -> bool {
        self.dying
    }

    /// Death sequence finished; the boss may be removed
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dying && self.death_tick >= self.tuning.death_duration_ticks
    }

    /// Ticks since the death sequence began
    #[inline]
    pub fn death_tick(&self) -> u32 {
        self.death_tick
    }

    /// Render opacity: 1 while alive, fading to 0 over the death sequence
    pub fn fade_alpha(&self) -> f32 {
        if !self.dying {
            return 1.0;
        }
        (1.0 - self.death_tick as f32 / self.tuning.death_duration_ticks as f32).max(0.0)
    }

    #[inline]
    pub fn animation(&self) -> AnimationCounter {
        self.anim
    }

    #[inline]
    pub fn projectiles(&self) -> &ProjectileSet {
        &self.projectiles
    }

    /// Patrol bounds in pixels
    #[inline]
    pub fn patrol_bounds(&self) -> (f32, f32) {
        (self.patrol_left, self.patrol_right)
    }

    #[inline]
    pub fn hover_target_y(&self) -> f32 {
        self.hover.target_y
    }

    /// Current pixel velocity (for rendering lean/tilt)
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.body.x_speed, self.body.y_speed)
    }
}
