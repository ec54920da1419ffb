//! wind-probe: run scenarios headless and sample their wind fields.
//!
//! Usage:
//!   wind-probe run --scenario glider.json --ticks 500 --every 50
//!   wind-probe sample --scenario glider.json --from 0,0,0 --to 500,0,0 --steps 20 --time 3.5

use std::path::PathBuf;
use std::process;

use glam::DVec3;
use serde_json::json;

use updraft_aero::scenario::Scenario;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "sample" => cmd_sample(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "wind-probe: updraft scenario runner and wind sampler\n\
         \n\
         Commands:\n\
         \n\
         run       Step a scenario and print snapshots as JSON lines\n\
         \n\
           --scenario <path>  Scenario JSON file\n\
           --ticks <N>        Physics steps to run (default: 250)\n\
           --every <K>        Print every K-th snapshot (default: 1)\n\
         \n\
         sample    Sample the scenario's wind field along a line\n\
         \n\
           --scenario <path>  Scenario JSON file\n\
           --from <x,y,z>     Line start\n\
           --to <x,y,z>       Line end\n\
           --steps <N>        Segments along the line (default: 10)\n\
           --time <secs>      Wind clock for turbulence (default: 0)\n\
         \n\
         Set RUST_LOG=debug for engine diagnostics.\n"
    );
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_count(args: &[String], name: &str, default: u64) -> u64 {
    match flag(args, name) {
        Some(value) => value.parse().unwrap_or_else(|_| {
            eprintln!("Error: {name} expects a whole number, got {value}");
            process::exit(1);
        }),
        None => default,
    }
}

fn parse_vec3(args: &[String], name: &str) -> DVec3 {
    let Some(value) = flag(args, name) else {
        eprintln!("Error: {name} <x,y,z> is required");
        process::exit(1);
    };
    let parts: Vec<f64> = value.split(',').filter_map(|p| p.trim().parse().ok()).collect();
    if parts.len() != 3 {
        eprintln!("Error: {name} expects three comma-separated numbers, got {value}");
        process::exit(1);
    }
    DVec3::new(parts[0], parts[1], parts[2])
}

fn load_scenario(args: &[String]) -> Scenario {
    let Some(path) = flag(args, "--scenario").map(PathBuf::from) else {
        eprintln!("Error: --scenario <path> is required");
        process::exit(1);
    };
    let text = match std::fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        }
    };
    match Scenario::from_json(&text) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error in {}: {e}", path.display());
            process::exit(1);
        }
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let scenario = load_scenario(args);
    let ticks = parse_count(args, "--ticks", 250);
    let every = parse_count(args, "--every", 1).max(1);

    let mut world = match scenario.build() {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error building scenario: {e}");
            process::exit(1);
        }
    };
    log::info!(
        "running {ticks} ticks at dt={}s",
        world.engine.config().fixed_dt
    );

    for _ in 0..ticks {
        let snapshot = match world.step() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Simulation stopped at tick {}: {e}", world.engine.time().tick);
                process::exit(2);
            }
        };
        if snapshot.time.tick % every != 0 {
            continue;
        }

        let probes: Vec<DVec3> = scenario
            .probes
            .iter()
            .map(|&p| world.engine.sample_wind(p))
            .collect();
        let bodies: Vec<_> = world
            .bodies
            .iter()
            .filter_map(|(name, handle)| {
                world.host.body(*handle).map(|b| {
                    json!({ "name": name, "position": b.pose.position, "velocity": b.velocity })
                })
            })
            .collect();
        let line = json!({ "snapshot": snapshot, "bodies": bodies, "probes": probes });
        println!("{line}");
    }
}

// --- Sample command ---

fn cmd_sample(args: &[String]) {
    let scenario = load_scenario(args);
    let from = parse_vec3(args, "--from");
    let to = parse_vec3(args, "--to");
    let steps = parse_count(args, "--steps", 10).max(1);
    let time: f64 = match flag(args, "--time") {
        Some(value) => value.parse().unwrap_or_else(|_| {
            eprintln!("Error: --time expects seconds, got {value}");
            process::exit(1);
        }),
        None => 0.0,
    };

    let mut world = match scenario.build() {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error building scenario: {e}");
            process::exit(1);
        }
    };
    let Some(wind) = world.engine.wind_mut() else {
        eprintln!("Error: scenario has no wind field");
        process::exit(1);
    };
    wind.set_time(time);

    let points: Vec<DVec3> = (0..=steps)
        .map(|i| from.lerp(to, i as f64 / steps as f64))
        .collect();
    let mut velocities = Vec::with_capacity(points.len());
    wind.sample_velocities(&points, &mut velocities, None);

    for (point, velocity) in points.iter().zip(&velocities) {
        let line = json!({
            "position": point,
            "velocity": velocity,
            "speed": velocity.length(),
            "density": wind.sample_air_density(*point),
            "effectors": wind.effector_velocity(*point),
            "border": wind.border_velocity(*point),
            "turbulence": wind.turbulence_velocity(*point),
        });
        println!("{line}");
    }
}
