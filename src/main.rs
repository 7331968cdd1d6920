//! Arena Sim headless runner
//!
//! Loads tuning (optional JSON path as the first argument), plays a regular
//! level and then the boss arena with a scripted autopilot, and logs what
//! happened. `RUST_LOG=debug` shows boss state transitions.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arena Sim (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm surface; there is no wasm runner
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use arena_sim::Tuning;
    use arena_sim::consts::*;
    use arena_sim::sim::{
        AIR, ArenaPhase, ArenaState, GROUND, PLATFORM, PlayerInput, SimEvent, TileGrid, tick,
    };

    /// Wall-clock frame time the runner pretends to render at
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up after this many frames (10 minutes)
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    pub fn run() -> Result<(), Box<dyn Error>> {
        let tuning = match std::env::args().nth(1) {
            Some(path) => Tuning::load(&path)?,
            None => Tuning::default(),
        };
        let seed = std::env::var("ARENA_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(12345);

        let level = ArenaState::level(demo_level(tuning.world.tile_size)?, tuning.clone(), seed);
        let level = play(level);
        summarize("level", &level);

        let arena = ArenaState::boss_arena(demo_boss_arena(tuning.world.tile_size)?, tuning, seed);
        let arena = play(arena);
        summarize("boss arena", &arena);
        Ok(())
    }

    /// Regular level: ground with a gap and a few platforms
    fn demo_level(tile_size: f32) -> Result<TileGrid, Box<dyn Error>> {
        let cols = TILES_IN_WIDTH * 2;
        let mut grid = TileGrid::filled(cols, TILES_IN_HEIGHT, AIR, tile_size)?;
        grid.fill_span(TILES_IN_HEIGHT - 1, 0..=cols - 1, GROUND);
        grid.fill_span(TILES_IN_HEIGHT - 2, 0..=cols - 1, GROUND);
        grid.fill_span(TILES_IN_HEIGHT - 1, 30..=32, AIR);
        grid.fill_span(TILES_IN_HEIGHT - 2, 30..=32, AIR);
        grid.fill_span(8, 8..=11, PLATFORM);
        grid.fill_span(7, 24..=27, PLATFORM);
        Ok(grid)
    }

    /// Boss arena: walls on both sides, a solid floor and two ledges
    fn demo_boss_arena(tile_size: f32) -> Result<TileGrid, Box<dyn Error>> {
        let cols = 45;
        let mut grid = TileGrid::filled(cols, TILES_IN_HEIGHT, AIR, tile_size)?;
        for row in 0..TILES_IN_HEIGHT {
            grid.fill_span(row, 0..=1, GROUND);
            grid.fill_span(row, cols - 2..=cols - 1, GROUND);
        }
        grid.fill_span(TILES_IN_HEIGHT - 1, 0..=cols - 1, GROUND);
        grid.fill_span(TILES_IN_HEIGHT - 2, 0..=cols - 1, GROUND);
        grid.fill_span(8, 8..=12, PLATFORM);
        grid.fill_span(8, 32..=36, PLATFORM);
        Ok(grid)
    }

    /// Run the ticks owed for one frame. The step is the game clock's tick
    /// length, so game time tracks wall time for any `ms_per_tick`.
    fn advance_frame(state: &mut ArenaState, accumulator: &mut f32) {
        let step = state.tuning.world.tick_seconds();
        *accumulator += FRAME_DT;
        let mut substeps = 0;
        while *accumulator >= step && substeps < MAX_SUBSTEPS {
            let input = autopilot(state);
            tick(state, &input);
            *accumulator -= step;
            substeps += 1;
        }
    }

    /// Drive the arena with the fixed-step accumulator until it ends
    fn play(mut state: ArenaState) -> ArenaState {
        let mut accumulator = 0.0;
        let mut frames = 0;

        while state.phase == ArenaPhase::Playing && frames < MAX_FRAMES {
            advance_frame(&mut state, &mut accumulator);

            for event in state.drain_events() {
                match event {
                    SimEvent::PlayerDamaged { hearts } => {
                        log::info!("Player hit ({hearts} hearts left)")
                    }
                    SimEvent::BossDamaged { health } => log::info!("Boss hit ({health} left)"),
                    SimEvent::BossSpawned => log::info!("Boss appeared"),
                    SimEvent::EnemyDefeated => log::info!("Enemy defeated"),
                    SimEvent::PlayerSpiked => log::info!("Player stepped on a spike"),
                    SimEvent::HeartCollected { hearts } => {
                        log::info!("Heart collected ({hearts} hearts)")
                    }
                    other => log::trace!("{other:?}"),
                }
            }
            frames += 1;

            // A regular level is cleared once its enemies are gone
            if !state.is_boss_arena() && state.enemies.is_empty() {
                break;
            }
        }
        state
    }

    /// Walk toward the nearest threat, attack when close, hop now and then
    fn autopilot(state: &ArenaState) -> PlayerInput {
        let me = state.player.hitbox();
        let target = state
            .boss
            .as_ref()
            .map(|boss| *boss.hitbox())
            .or_else(|| {
                state
                    .enemies
                    .iter()
                    .map(|e| *e.hitbox())
                    .min_by(|a, b| {
                        let da = (a.center_x() - me.center_x()).abs();
                        let db = (b.center_x() - me.center_x()).abs();
                        da.total_cmp(&db)
                    })
            });

        let Some(target) = target else {
            return PlayerInput {
                right: true,
                jump: state.clock.ticks % 240 == 0,
                ..Default::default()
            };
        };

        let dx = target.center_x() - me.center_x();
        let reach = state.tuning.player.attack_width + me.width / 2.0;
        PlayerInput {
            left: dx < -reach / 2.0,
            right: dx > reach / 2.0,
            jump: state.clock.ticks % 300 == 0,
            attack: dx.abs() < reach + target.width / 2.0,
        }
    }

    fn summarize(name: &str, state: &ArenaState) {
        log::info!(
            "{name}: {:?} after {:.1}s, {}/{} hearts, {} enemies left, boss {}",
            state.phase,
            state.now_ms() as f32 / 1000.0,
            state.player.hearts(),
            state.player.max_hearts(),
            state.enemies.len(),
            match &state.boss {
                Some(boss) => format!("at {}/{} health", boss.health(), boss.max_health()),
                None if state.is_boss_arena() && !state.boss_intro_active() => "defeated".into(),
                None => "absent".into(),
            }
        );
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn one_second(ms_per_tick: u64) -> u64 {
            let mut tuning = Tuning::default();
            tuning.world.ms_per_tick = ms_per_tick;
            let mut state = ArenaState::boss_arena(demo_boss_arena(tuning.world.tile_size).unwrap(), tuning, 1);
            let mut accumulator = 0.0;
            for _ in 0..60 {
                advance_frame(&mut state, &mut accumulator);
            }
            state.now_ms()
        }

        #[test]
        fn test_game_time_tracks_frames() {
            for ms_per_tick in [5, 10, 16] {
                let now = one_second(ms_per_tick);
                assert!(
                    now + 2 * ms_per_tick >= 1000 && now <= 1000,
                    "{ms_per_tick}ms ticks reached {now}ms"
                );
            }
        }
    }
}
