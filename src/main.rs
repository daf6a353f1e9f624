//! Headless demo running every movement variant on a small hilly map
//!
//! Usage: `motiongen [config.ron]`

use std::rc::Rc;

use motiongen::prelude::*;

/// Simulation step (ms)
const TICK: u32 = 100;
/// Simulated time per scenario (ms)
const SCENARIO_MS: u32 = 60_000;

fn build_map() -> (Rc<HeightField>, Rc<Grid>) {
    let terrain = HeightField::from_fn(64, 64, 1.0, |x, y| {
        (x * 0.15).sin() * 2.0 + (y * 0.1).cos() * 1.5
    });

    // A rock in the middle of the map
    let mut grid = Grid::new(64, 64, 1.0);
    for y in 28..36 {
        for x in 40..44 {
            grid.set_walkable(x, y, false);
        }
    }

    (Rc::new(terrain), Rc::new(grid))
}

fn run_scenario(name: &str, creature: &mut Creature, generator: RandomMovementGenerator) {
    let mut slot = MotionSlot::new();
    slot.start(creature, generator);

    let mut elapsed = 0;
    while elapsed < SCENARIO_MS && slot.update(creature, TICK) {
        creature.tick(TICK);
        elapsed += TICK;
    }
    slot.clear(creature);

    log::info!(
        "{name}: ran {elapsed}ms, ended at {:.1?}, states {:?}",
        creature.position(),
        creature.states()
    );
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match MotionConfig::load_ron(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Config error: {}", e);
                return;
            }
        },
        None => MotionConfig::default(),
    };

    let (terrain, grid) = build_map();
    let spawn = Vec3::new(20.5, 20.5, 0.0);
    let creature = |name: &str| {
        Creature::new(name, spawn, terrain.clone(), grid.clone())
            .with_ai()
            .with_respawn(RespawnPoint {
                position: spawn,
                wander_radius: 8.0,
            })
    };

    let mut wolf = creature("wolf");
    let generator = RandomMovementGenerator::wander_from_respawn(&wolf, &config);
    run_scenario("wander", &mut wolf, generator);

    let mut boar = creature("boar");
    let generator = RandomMovementGenerator::timed_wander(&boar, 20_000, 6.0, &config);
    run_scenario("timed wander", &mut boar, generator);

    let mut drunk = creature("drunk");
    let generator = RandomMovementGenerator::confused_for(&drunk, &config);
    run_scenario("confused", &mut drunk, generator);

    let threat = spawn + Vec3::new(3.0, 0.0, 0.0);
    let mut deer = creature("deer");
    let generator = RandomMovementGenerator::fleeing(threat, &config);
    run_scenario("fleeing", &mut deer, generator);

    let mut rabbit = creature("rabbit");
    rabbit.add_flag(UnitFlags::FLEEING);
    let generator = RandomMovementGenerator::panic(threat, 8_000, &config);
    run_scenario("panic", &mut rabbit, generator);
    log::info!(
        "panic: AI notified {} time(s)",
        rabbit.ai().map_or(0, |ai| ai.fleeing_ended)
    );
}
