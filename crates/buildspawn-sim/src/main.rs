use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use buildspawn_catalog::loader::load_config_from_str;
use buildspawn_sim::report;
use buildspawn_sim::runner::{self, SimOptions};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut options = SimOptions::default();
    let mut config_path: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;
    let mut cache_dir: Option<PathBuf> = None;
    let mut snapshot_path: Option<PathBuf> = None;
    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => config_path = Some(PathBuf::from(value(&args, &mut i))),
            "--seed" => seed = Some(parse(&args, &mut i)),
            "--radius" => options.radius = parse(&args, &mut i),
            "--ticks" => options.ticks = parse(&args, &mut i),
            "--catalog" => options.catalog_dir = Some(PathBuf::from(value(&args, &mut i))),
            "--cache-dir" => cache_dir = Some(PathBuf::from(value(&args, &mut i))),
            "--snapshot" => snapshot_path = Some(PathBuf::from(value(&args, &mut i))),
            "--region-out" => options.region_out = Some(PathBuf::from(value(&args, &mut i))),
            "--baseline" => baseline_path = Some(PathBuf::from(value(&args, &mut i))),
            "--output" => output_path = Some(PathBuf::from(value(&args, &mut i))),
            "--help" | "-h" => {
                eprintln!("Usage: spawn-sim [OPTIONS]");
                eprintln!("  --config <path>       Spawner config (RON)");
                eprintln!("  --seed <n>            World seed (overrides the config)");
                eprintln!("  --radius <n>          Chunks loaded around the origin (default: 8)");
                eprintln!("  --ticks <n>           Tracker ticks to simulate (default: 1200)");
                eprintln!("  --catalog <dir>       Serve catalog.json and buildings/ from a mirror directory");
                eprintln!("  --cache-dir <dir>     On-disk construction store");
                eprintln!("  --snapshot <path>     Catalog snapshot; resumes from it when present");
                eprintln!("  --region-out <path>   Write the spawn-data region file");
                eprintln!("  --baseline <path>     Compare placements against a saved run");
                eprintln!("  --output <path>       Save this run as a baseline");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    if let Some(path) = &config_path {
        let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Failed to read {}: {}", path.display(), e);
            process::exit(1);
        });
        options.config = load_config_from_str(&text).unwrap_or_else(|e| {
            eprintln!("{}", e);
            process::exit(1);
        });
    }
    if let Some(seed) = seed {
        options.config.world_seed = seed;
    }
    if cache_dir.is_some() {
        options.config.cache_dir = cache_dir;
    }
    if snapshot_path.is_some() {
        options.config.catalog_path = snapshot_path;
    }

    log::info!(
        "Simulating seed {} over {} chunks",
        options.config.world_seed,
        (2 * options.radius + 1).pow(2)
    );
    let result = runner::run(&options).unwrap_or_else(|e| {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    });

    println!("\n## Spawn Simulation\n");
    println!("{}", report::format_markdown(&result));

    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            label: format!("seed-{}", result.world_seed),
            report: result.clone(),
        };
        if let Err(e) = report::save_baseline(path, &baseline) {
            eprintln!("Failed to save baseline: {}", e);
            process::exit(1);
        }
        log::info!("Saved baseline to {}", path.display());
    }

    if let Some(ref path) = baseline_path {
        if let Some(baseline) = report::load_baseline(path) {
            let diffs = report::compare(&result, &baseline);
            println!("{}", report::format_comparison(&diffs));
            if !diffs.is_empty() {
                eprintln!("ERROR: {} placement differences, exiting with code 1", diffs.len());
                process::exit(1);
            }
        } else {
            log::warn!("Baseline file not found: {}", path.display());
        }
    }

    log::info!("Simulation complete.");
}

/// The argument after `args[*i]`, advancing `i`.
fn value(args: &[String], i: &mut usize) -> String {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("Missing value for {}", flag);
            process::exit(1);
        }
    }
}

fn parse<T: FromStr>(args: &[String], i: &mut usize) -> T {
    let flag = args[*i].clone();
    let raw = value(args, i);
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Invalid {} value: {}", flag, raw);
        process::exit(1);
    })
}
