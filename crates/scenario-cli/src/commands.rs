//! CLI command implementations
//!
//! Kept apart from main.rs so configuration resolution can be unit tested.

use crate::ConfigArgs;
use anyhow::{Context, Result};
use mmwave_scenario::mapfile::write_map_files;
use mmwave_scenario::periodicity::resolve;
use mmwave_scenario::{
    HandoverMode, Presets, ReportPeriodicity, RouteDirection, ScenarioAssembler, ScenarioConfig,
    ScenarioDescriptor, SchedulerMode,
};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// File name of the descriptor written by `build`
pub const DESCRIPTOR_FILE: &str = "scenario.json";

/// Implementation of the 'build' command
pub fn cmd_build(args: &ConfigArgs, out: Option<PathBuf>, no_maps: bool) -> Result<()> {
    let config = resolve_config(args)?;
    let out_dir = out.unwrap_or_else(|| config.out_path.clone());
    let descriptor = assemble(config)?;

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let descriptor_path = out_dir.join(DESCRIPTOR_FILE);
    descriptor.write_json(&descriptor_path)?;
    info!("Wrote descriptor to {}", descriptor_path.display());

    if !no_maps {
        for path in write_map_files(&descriptor, &out_dir)? {
            info!("  map: {}", path.display());
        }
    }

    for (path, value) in descriptor.engine().attributes() {
        debug!("  attribute {} = {}", path, value);
    }

    print_summary(&descriptor);
    Ok(())
}

/// Implementation of the 'validate' command
pub fn cmd_validate(args: &ConfigArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let descriptor = assemble(config)?;
    println!(
        "Configuration OK: {} obstacles, {} paths, {:.3} s",
        descriptor.obstacles().len(),
        descriptor.topology().path_count(),
        descriptor.timing().total_sim_time_s
    );
    Ok(())
}

/// Implementation of the 'list' command
pub fn cmd_list() -> Result<()> {
    println!("Available presets:");
    println!("==================");
    for (name, description, _) in Presets::all() {
        println!("  {:<16} - {}", name, description);
    }

    println!("\nReport table periodicities:");
    for periodicity in ReportPeriodicity::ALL {
        println!(
            "  {:<8} - window {} samples",
            periodicity.as_micros(),
            periodicity.window_length()
        );
    }
    Ok(())
}

/// Implementation of the 'periodicity' command
pub fn cmd_periodicity(value: u32) -> Result<()> {
    let window = resolve(value)?;
    println!("periodicity:     {} us", value);
    println!("window:          {} samples", window.window_length);
    println!("vector transient {} us", window.vector_transient_us);
    println!("transient:       {} s", window.transient_duration_s);
    Ok(())
}

fn assemble(config: ScenarioConfig) -> Result<ScenarioDescriptor> {
    let assembler = ScenarioAssembler::new(config)?;
    assembler.assemble().map_err(|e| {
        error!("Scenario assembly failed: {}", e);
        e.into()
    })
}

fn print_summary(descriptor: &ScenarioDescriptor) {
    let timing = descriptor.timing();
    println!("Scenario (seed {})", descriptor.seed());
    println!("  obstacles:  {}", descriptor.obstacles().len());
    println!(
        "  transient:  {} s ({} samples)",
        timing.transient_duration_s,
        descriptor.transient().window_length
    );
    println!("  sim time:   {} s", timing.total_sim_time_s);
    println!(
        "  motion:     start {} s, stop {} s",
        timing.movement_start_s, timing.movement_stop_s
    );
    for route in descriptor.routes() {
        let via = route
            .next_hop
            .map(|hop| format!(" via {}", hop))
            .unwrap_or_default();
        let side = match route.direction {
            RouteDirection::EndpointToPeer => "ue  ",
            RouteDirection::PeerToEndpoint => "host",
        };
        println!(
            "  route [{}] {} {}{} if {}",
            route.domain_id, side, route.destination, via, route.interface_index
        );
    }
}

/// Start from a file, a preset or the defaults, then apply flag overrides
fn resolve_config(args: &ConfigArgs) -> Result<ScenarioConfig> {
    let mut config = match (&args.config, args.preset.as_deref()) {
        (Some(path), _) => ScenarioConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        (None, Some(name)) => match Presets::by_name(name) {
            Some(config) => config,
            None => {
                error!("Unknown preset: {}", name);
                anyhow::bail!("Unknown preset: {}", name);
            }
        },
        (None, None) => ScenarioConfig {
            domains: Presets::two_plmn_domains(),
            ..ScenarioConfig::default()
        },
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(blocks) = args.blocks {
        config.num_blocks = blocks;
    }
    if let Some(value) = args.periodicity {
        config.report_table_periodicity = ReportPeriodicity::from_micros(value)?;
    }
    if let Some(speed) = args.speed {
        config.mobile_speed = speed;
    }
    if let Some(mode) = &args.handover_mode {
        config.handover_mode = mode.parse::<HandoverMode>()?;
    }
    if let Some(scheduler) = &args.scheduler {
        config.scheduler = scheduler.parse::<SchedulerMode>()?;
    }

    config.validate()?;
    Ok(config)
}
