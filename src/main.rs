// ============================================
// Luggage Belt - Безоконный прогон уровня
// ============================================
// luggage-belt [level.json] [seconds]

use std::error::Error;

use luggage_belt::{LevelSystem, SimConfig, SimEvent, SimulationSystem, ViewSystem};

/// Тиков симуляции в секунду
const TICK_RATE: u32 = 60;
const DEFAULT_SECONDS: f64 = 30.0;

/// Уровень по умолчанию: вход, прямой участок, поворот направо, выход
const DEMO_LEVEL: &str = r#"{
    "name": "Demo",
    "number": 1,
    "size": [8, 8, 2],
    "hint": "Luggage turns right and leaves through the exit",
    "block_limit": 10,
    "blocks": [
        { "code": "en", "x": 1, "y": 5, "z": 0, "orientation": "r", "deletable": false,
          "count": 5, "colors": ["red", "blue"] },
        { "code": "cf", "x": 2, "y": 5, "z": 0, "orientation": "r" },
        { "code": "cbr", "x": 3, "y": 5, "z": 0, "orientation": "r" },
        { "code": "cf", "x": 3, "y": 4, "z": 0, "orientation": "d" },
        { "code": "ex", "x": 3, "y": 3, "z": 0, "orientation": "d", "deletable": false }
    ]
}"#;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let text = match args.next() {
        Some(path) => std::fs::read_to_string(&path)?,
        None => DEMO_LEVEL.to_string(),
    };
    let seconds = match args.next() {
        Some(s) => s.parse::<f64>()?,
        None => DEFAULT_SECONDS,
    };

    let config = SimConfig::default();
    config.validate()?;
    let mut ctx = LevelSystem::load_json(&text, config)?;

    println!("=== {} (level {}) ===", ctx.level_name, ctx.level_number);
    if let Some(hint) = &ctx.hint {
        println!("{}", hint);
    }

    let ticks = (seconds * TICK_RATE as f64).round() as u32;
    for tick in 0..=ticks {
        let now = tick as f64 / TICK_RATE as f64;
        SimulationSystem::update(&mut ctx, now)?;

        for event in ctx.take_events() {
            match event {
                SimEvent::CargoArrived { id, exit } => println!("[SIM] {:?} arrived at {:?}", id, exit),
                SimEvent::CargoLost(id) => println!("[SIM] {:?} lost", id),
                _ => {}
            }
        }

        if tick % TICK_RATE == 0 {
            let status = ctx.status();
            println!(
                "[SIM] t={:>5.1}s blocks={} placed={}/{} cargo={} arrived={} lost={} belt_mesh={}",
                status.time,
                status.blocks,
                status.placed,
                status.block_limit.map_or("-".to_string(), |l| l.to_string()),
                status.cargo_alive,
                status.arrived,
                status.lost,
                ViewSystem::belt_meshes(&ctx).len(),
            );
        }
    }

    let status = ctx.status();
    for (exit, count) in &status.arrived_per_exit {
        println!("[SIM] exit {:?}: {}", exit, count);
    }
    println!("[SIM] done: {} arrived, {} lost", status.arrived, status.lost);
    Ok(())
}
