//! End-to-end scenarios through the public API

use arena_sim::sim::{
    AIR, ArenaPhase, ArenaState, Boss, BossPhase, BossState, GROUND, GridError, Gravity, Hitbox,
    KinematicBody, ManualClock, PlayerInput, SimEvent, Solidity, TileGrid, tick,
};
use arena_sim::{Tuning, TuningError};

const TS: f32 = 48.0;

fn boss_arena_grid() -> TileGrid {
    let mut grid = TileGrid::filled(45, 14, AIR, TS).unwrap();
    grid.fill_span(12, 0..=44, GROUND);
    grid.fill_span(13, 0..=44, GROUND);
    for row in 0..14 {
        grid.fill_span(row, 0..=1, GROUND);
        grid.fill_span(row, 43..=44, GROUND);
    }
    grid
}

fn quiet_tuning() -> Tuning {
    let mut tuning = Tuning::default();
    tuning.boss.shot_chance = 0.0;
    tuning
}

#[test]
fn three_spaced_hits_leave_boss_retreating_at_two() {
    let tuning = quiet_tuning();
    let grid = boss_arena_grid();
    let mut clock = ManualClock::at(10_000);
    let mut boss = Boss::new(1032.0, 420.0, &grid, &tuning, &clock, 5);
    assert_eq!(boss.health(), 5);

    for _ in 0..3 {
        boss.take_damage(1, &clock);
        clock.advance(tuning.boss.invulnerability_ms + 1);
    }
    assert_eq!(boss.health(), 2);
    assert_eq!(boss.phase(), BossPhase::Retreat);
}

#[test]
fn body_resting_on_floor_never_moves_under_gravity() {
    let mut grid = TileGrid::filled(10, 8, AIR, TS).unwrap();
    grid.fill_span(7, 0..=9, GROUND);
    // Bottom edge a hair above the floor: y + 1 never fits
    let start = Hitbox::new(100.0, 7.0 * TS - 60.0 - 0.01, 30.0, 60.0);
    let mut body = KinematicBody::new(start, Solidity::Ground).with_jumps(2);
    let gravity = Gravity {
        acceleration: 0.06,
        jump_speed: -4.2,
    };

    for tick in 1..=100 {
        body.step_gravity(&grid, &gravity);
        assert_eq!(body.hitbox.y, start.y, "moved on tick {tick}");
        assert!(body.grounded, "airborne after tick {tick}");
    }
}

#[test]
fn boss_starts_chasing_when_target_comes_near() {
    let tuning = quiet_tuning();
    let grid = boss_arena_grid();
    let mut clock = ManualClock::at(0);
    let mut boss = Boss::new(1032.0, 420.0, &grid, &tuning, &clock, 5);

    let far = Hitbox::new(160.0, 500.0, 30.0, 60.0);
    for _ in 0..10 {
        boss.update(&grid, Some(far), &clock);
        clock.advance(5);
    }
    assert!(matches!(boss.state(), BossState::Patrol { .. }));

    let near = Hitbox::new(boss.hitbox().x - 200.0, 500.0, 30.0, 60.0);
    let now = 50;
    clock.set(now);
    boss.update(&grid, Some(near), &clock);
    assert_eq!(boss.state(), BossState::Chase { since_ms: now });
}

#[test]
fn boss_arena_spawns_boss_after_intro() {
    let mut state = ArenaState::boss_arena(boss_arena_grid(), Tuning::default(), 7);
    let walk = PlayerInput {
        right: true,
        ..Default::default()
    };
    for _ in 0..(4000 / 5) {
        tick(&mut state, &walk);
    }
    assert_eq!(state.phase, ArenaPhase::Playing);
    assert!(state.boss.is_some());
    assert_eq!(
        state
            .events
            .iter()
            .filter(|e| **e == SimEvent::BossSpawned)
            .count(),
        1
    );
    assert!(state.player.hitbox().x > 3.0 * TS + 15.0);
    assert_eq!(state.player.hearts(), 3);
}

#[test]
fn ragged_grid_is_rejected() {
    let rows = vec![vec![AIR; 4], vec![AIR; 3]];
    assert!(matches!(
        TileGrid::from_rows(&rows, TS),
        Err(GridError::Ragged { row: 1, .. })
    ));
    assert!(matches!(
        TileGrid::from_rows::<Vec<i32>>(&[], TS),
        Err(GridError::Empty)
    ));
}

#[test]
fn tuning_file_overrides_defaults() {
    let dir = std::env::temp_dir().join(format!("arena-sim-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("tuning.json");
    std::fs::write(&path, r#"{ "boss": { "max_health": 9, "intro_ms": 0 } }"#).unwrap();

    let tuning = Tuning::load(&path).unwrap();
    assert_eq!(tuning.boss.max_health, 9);
    assert_eq!(tuning.boss.intro_ms, 0);
    assert_eq!(tuning.player.max_hearts, 3);

    std::fs::write(&path, r#"{ "world": { "tile_size": 0.0 } }"#).unwrap();
    assert!(matches!(
        Tuning::load(&path),
        Err(TuningError::Invalid {
            field: "world.tile_size",
            ..
        })
    ));
    assert_eq!(Tuning::load_or_default(&path).world.tile_size, 48.0);

    std::fs::remove_dir_all(&dir).unwrap();
}
