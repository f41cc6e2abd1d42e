//! Duck Range headless runner
//!
//! Plays a session with a simple auto-shooter at nominal frame rate and prints
//! the final state. Usage: `duck-range [seed] [frames] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use duck_range::consts::FRAME_MS;
    use duck_range::sim::{Command, Game, GameEvent};
    use duck_range::Tuning;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 120);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json(&json),
            Err(e) => {
                log::warn!("Could not read {}: {}", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    log::info!("Duck Range (headless) starting with seed {}", seed);
    let mut game = Game::with_tuning(tuning, seed);
    game.handle(Command::Start);

    // The shooter gets its own stream so the game's spawn RNG stays untouched
    let mut shooter = Pcg32::seed_from_u64(seed ^ 0x5EED);
    let (mut shots, mut awards) = (0u32, 0u32);

    for _ in 0..frames {
        game.tick(FRAME_MS);

        // Fire at a random live duck now and then; roughly mimics a player
        if shooter.random_bool(0.04) {
            let live: Vec<u32> = game
                .ducks()
                .iter()
                .filter(|d| !d.is_terminal())
                .map(|d| d.id)
                .collect();
            if !live.is_empty() {
                let id = live[shooter.random_range(0..live.len())];
                shots += 1;
                game.handle(Command::Shoot(id));
            }
        }

        for event in game.drain_events() {
            match event {
                GameEvent::AwardPresented(cert) => {
                    awards += 1;
                    println!(
                        "MASTER HUNTER! score {} accuracy {}% max combo {}x",
                        cert.score, cert.accuracy_percent, cert.max_combo
                    );
                    game.handle(Command::DismissAward);
                }
                other => log::debug!("{:?}", other),
            }
        }
    }

    let snapshot = game.snapshot();
    let session = &snapshot.session;
    println!(
        "After {} frames ({} ms): score {}, hit {}, missed {}, max combo {}, {} shots, {} awards",
        frames,
        game.now_ms(),
        session.score,
        session.ducks_hit,
        session.ducks_missed,
        session.max_combo,
        shots,
        awards
    );
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not serialize snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Rendering front ends embed the library directly
}
