//! Print a summary of a generated particle field.

use clap::Parser;
use particle_field::{generate_with, palette, FieldConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "field_stats", version, about = "Summarise a generated particle field")]
struct Args {
    /// Particles generated with no images
    #[arg(long, default_value_t = 500)]
    base_count: usize,

    /// Image reference bound to a photo particle (repeatable)
    #[arg(long = "image")]
    images: Vec<String>,

    /// Seed for a reproducible field
    #[arg(long)]
    seed: Option<u64>,

    /// Number of particles to list individually
    #[arg(long, default_value_t = 8)]
    show: usize,
}

fn main() {
    let args = Args::parse();
    let cfg = FieldConfig { base_count: args.base_count, ..FieldConfig::default() };

    let mut rng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None    => StdRng::from_entropy(),
    };

    let field = match generate_with(&cfg, &args.images, &mut rng) {
        Ok(f)  => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let k = field.kind_counts();
    println!();
    println!("  ┌─ particle field ({} particles)", field.len());
    println!("  │  photo  : {}", k.photo);
    println!("  │  sphere : {}", k.sphere);
    println!("  │  cube   : {}", k.cube);
    println!("  │  cane   : {}", k.cane);
    println!("  │");
    for p in field.iter().take(args.show) {
        println!(
            "  │  {:<6} {:<6} {}  A=({:6.2},{:6.2},{:6.2})  B=({:6.2},{:6.2},{:6.2})  s={:.2}",
            p.id.as_str(), p.kind.name(), palette::to_hex(p.color),
            p.formation_a.x, p.formation_a.y, p.formation_a.z,
            p.formation_b.x, p.formation_b.y, p.formation_b.z,
            p.base_scale,
        );
    }
    println!("  └─");
    println!();
}
