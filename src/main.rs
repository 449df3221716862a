//! Blastzone headless demo
//!
//! Runs a short scripted match on a generated arena and logs the event
//! stream, then replays the same script to show digest equality.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("simulation halted: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), blastzone_core::SimError> {
    use blastzone_core::sim::{Direction, Intent, PlayerId, TickIntents, create_world, step};

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    // One player drops a bomb and backs away, one wanders the left column
    let script = |tick: u32, bomber: PlayerId, runner: PlayerId| {
        let mut intents = TickIntents::new();
        intents.set(
            bomber,
            Intent {
                dir: (1..=40).contains(&tick).then_some(Direction::Down),
                place_bomb: tick == 0,
            },
        );
        intents.set(
            runner,
            Intent {
                dir: Some(if tick % 80 < 40 {
                    Direction::Down
                } else {
                    Direction::Left
                }),
                place_bomb: false,
            },
        );
        intents
    };

    let mut world = create_world(13, 11, seed)?;
    let bomber = world.entities.players[0].id;
    let runner = world.entities.players[1].id;

    let mut total_events = 0usize;
    for tick in 0..240u32 {
        let events = step(&mut world, &script(tick, bomber, runner))?;
        if !events.is_empty() {
            // Events are plain serde data; show them in wire form
            let json = serde_json::to_string(&events).unwrap_or_default();
            log::info!("tick {:3}: {}", world.tick - 1, json);
        }
        total_events += events.len();
    }

    let digest = world.digest();
    log::info!(
        "match complete: {} ticks, {} events, digest {} bytes",
        world.tick,
        total_events,
        digest.len()
    );

    // Same seed and script, fresh world: states must agree byte for byte
    let mut replay = create_world(13, 11, seed)?;
    for tick in 0..240u32 {
        step(&mut replay, &script(tick, bomber, runner))?;
    }
    if replay.digest() == digest {
        log::info!("replay digest matches");
    } else {
        log::error!("replay digest diverged");
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation core is platform-neutral; the demo binary is native only
}
