//! tree_scene — interactive entry point.

use std::io::{self, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tree_scene::app::{run, AppConfig, InputBackend};
use tree_scene::library::default_images;
use tree_scene::mode::FocusPool;

const DEFAULT_LOG: &str = "tree_scene=info,hand_gesture=info,particle_field=info";

#[derive(Parser, Debug)]
#[command(name = "tree_scene", about = "Hand-gesture driven particle tree")]
struct Cli {
    /// Skip the interactive prompts and run with the options given
    #[arg(long)]
    quick: bool,

    /// Particles generated before photos are added
    #[arg(long, default_value_t = 500)]
    base_count: usize,

    /// Seed for reproducible fields and focus picks
    #[arg(long)]
    seed: Option<u64>,

    /// Consecutive samples a gesture must hold before it counts (1 = off)
    #[arg(long, default_value_t = 1)]
    debounce_samples: u32,

    /// Which particles a pinch may zoom in on
    #[arg(long, value_enum, default_value_t = FocusPool::Field)]
    focus_pool: FocusPool,

    /// Photo reference (repeatable); replaces the bundled demo photos
    #[arg(long = "image")]
    images: Vec<String>,

    /// Hand landmark source
    #[arg(long, value_enum, default_value_t = InputBackend::Sim)]
    input: InputBackend,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG)),
        )
        .init();

    let cli = Cli::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Particle Tree — Hand Gesture Scene Controller       ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    match cli.input {
        InputBackend::Sim  => println!("  Input: keyboard + mouse simulation"),
        InputBackend::Leap => println!("  Input: LeapMotion hardware"),
    }
    println!();

    let mut cfg = config_from(&cli);
    if !cli.quick {
        configure_interactively(&mut cfg);
    }

    println!();
    println!("  Opening preview window…");
    println!("  Hold F = fist (tree)   O = open palm (scatter)   P = pinch (zoom)");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn config_from(cli: &Cli) -> AppConfig {
    let mut cfg = AppConfig {
        seed:             cli.seed,
        debounce_samples: cli.debounce_samples.max(1),
        focus_pool:       cli.focus_pool,
        input:            cli.input,
        ..AppConfig::default()
    };
    cfg.field.base_count = cli.base_count;
    cfg.images = if cli.images.is_empty() { default_images() } else { cli.images.clone() };
    cfg
}

/// Prompt for the common knobs, keeping the current value on empty input.
fn configure_interactively(cfg: &mut AppConfig) {
    println!("  Press Enter to keep the value in brackets.");

    cfg.field.base_count = read_line(&format!("  Base particle count [{}]: ", cfg.field.base_count))
        .trim().parse().unwrap_or(cfg.field.base_count);

    cfg.debounce_samples = read_line(&format!("  Debounce samples, 1 = off [{}]: ", cfg.debounce_samples))
        .trim().parse::<u32>().unwrap_or(cfg.debounce_samples).clamp(1, 30);

    let pool = match cfg.focus_pool { FocusPool::Field => "1", FocusPool::Photos => "2" };
    println!("  Zoom target: 1=any particle  2=photos only");
    cfg.focus_pool = match read_line(&format!("  Choice [{}]: ", pool)).trim() {
        "1" => FocusPool::Field,
        "2" => FocusPool::Photos,
        _   => cfg.focus_pool,
    };

    let seed_shown = cfg.seed.map_or_else(|| "random".to_string(), |s| s.to_string());
    let line = read_line(&format!("  Seed [{}]: ", seed_shown));
    if let Ok(seed) = line.trim().parse() {
        cfg.seed = Some(seed);
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
