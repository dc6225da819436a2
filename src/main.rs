//! Hopper - Main Entry Point
//!
//! Runs the test arena headless with a scripted player and logs what the
//! avatar does. Pass a frame count as the first argument (default 300).

use hopper_game::{PlayerInput, Signal, Simulation, SimulationConfig};
use hopper_game::level::Level;
use hopper_physics::Angle;

const DEFAULT_FRAMES: u32 = 300;

/// Circle the arena, jumping now and then and diving once in a while.
fn scripted_input(frame: u32) -> PlayerInput {
    let mut input = PlayerInput {
        stick: (30.0, 70.0),
        camera_yaw: Angle(frame.wrapping_mul(0x100) as u16 as i16),
        frame,
        ..Default::default()
    };
    input.buttons.jump = frame % 45 < 4;
    input.buttons.attack = frame % 120 == 60;
    input
}

fn main() {
    env_logger::init();

    let frames = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u32>() {
            Ok(n) => n,
            Err(err) => {
                log::error!("Invalid frame count {:?}: {}", arg, err);
                std::process::exit(2);
            }
        },
        None => DEFAULT_FRAMES,
    };

    log::info!("Hopper starting...");

    let mut simulation = Simulation::new(SimulationConfig::quality_of_life(), Level::test_arena());
    let id = simulation.add_player("Player");

    log::info!(
        "Level {} loaded, {} surfaces",
        simulation.level.name,
        simulation.level.collision.surface_count()
    );

    for frame in 0..frames {
        let events = simulation.tick(&[scripted_input(frame)]);

        for event in events {
            match event.signal {
                Signal::Warp { .. } | Signal::Death => {
                    log::info!("Frame {}: player {} {:?}", frame, event.player, event.signal)
                }
                other => log::trace!("Frame {}: {:?}", frame, other),
            }
        }

        if frame % 30 == 0 {
            if let Some(player) = simulation.get_player(id) {
                let pos = player.position();
                log::info!(
                    "Frame {}: pos=({:.0}, {:.0}, {:.0}) action={:#010x} health={}",
                    frame,
                    pos.x,
                    pos.y,
                    pos.z,
                    player.avatar.action.0,
                    player.health_wedges()
                );
            }
        }
    }

    log::info!("Hopper finished after {} frames", simulation.frame);
}
