use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};

use splicekit::{init_logging, Config, GcodeParser, PipelineOptions, PostProcessError};
use splicekit_postprocessor::{analyzer, pipeline, profiles};

#[derive(Parser)]
#[command(
    name = "splicekit",
    version,
    about = "Convert multi-color G-code for printing with pre-spliced filament"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a splice recipe and a single-extruder program from multi-tool G-code
    Process {
        /// Input G-code file (multi-tool)
        input: PathBuf,
        /// Output directory (default: same as input file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Extra transition length in mm for color purging
        #[arg(short = 't', long)]
        transition: Option<f64>,
        /// Minimum segment length in mm (smaller segments are merged)
        #[arg(long)]
        min_segment: Option<f64>,
        /// Don't add a pause at the start of the print
        #[arg(long)]
        no_pause: bool,
        /// Color names for tools (e.g. --colors white black red)
        #[arg(long, num_args = 1..)]
        colors: Option<Vec<String>>,
        /// Print the per-segment listing
        #[arg(short, long)]
        verbose: bool,
        /// Configuration file (.toml or .json)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Analyze multi-color G-code and report segment statistics
    Analyze {
        /// Input G-code file
        input: PathBuf,
        /// Save results to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only write JSON, no console report
        #[arg(short, long)]
        quiet: bool,
    },
    /// List filament splice profiles, or show one in detail
    Profiles {
        /// Profile id (e.g. pla, petg_overture)
        id: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Process {
            input,
            output,
            transition,
            min_segment,
            no_pause,
            colors,
            verbose,
            config,
        } => run_process(
            input,
            output,
            transition,
            min_segment,
            no_pause,
            colors,
            verbose,
            config,
        ),
        Command::Analyze {
            input,
            output,
            quiet,
        } => run_analyze(input, output, quiet),
        Command::Profiles { id } => run_profiles(id),
    }
}

/// Load config from an explicit path, the platform default, or built-ins.
fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Ok(Config::load_from_file(&path)?);
    }
    if let Ok(path) = Config::default_path() {
        if path.exists() {
            return Ok(Config::load_from_file(&path)?);
        }
    }
    Ok(Config::default())
}

#[allow(clippy::too_many_arguments)]
fn run_process(
    input: PathBuf,
    output: Option<PathBuf>,
    transition: Option<f64>,
    min_segment: Option<f64>,
    no_pause: bool,
    colors: Option<Vec<String>>,
    verbose: bool,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(config)?;

    let color_list = colors.or_else(|| {
        if config.color_names.is_empty() {
            None
        } else {
            Some(config.color_names.clone())
        }
    });
    let color_names = color_list.map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(index, name)| (index as u32, name))
            .collect::<HashMap<u32, String>>()
    });

    let options = PipelineOptions {
        min_segment_length_mm: min_segment.unwrap_or(config.processing.min_segment_length_mm),
        transition_length_mm: transition.unwrap_or(config.processing.transition_length_mm),
        color_names,
        add_pause_at_start: !no_pause && config.output.add_pause_at_start,
        pause_command: config.output.pause_command.clone(),
    };
    let out_dir = output.or_else(|| config.output.output_directory.clone());

    println!("SpliceKit Post-Processor");
    println!("{}", "=".repeat(40));
    println!("Input: {}", input.display());
    println!();

    let report = pipeline::process_file(&input, out_dir.as_deref(), &options)?;

    let parse = &report.parse_result;
    for warning in &parse.warnings {
        println!("  WARNING: {}", warning);
    }
    println!("  Found {} segments", parse.segments.len());
    println!("  Total extrusion: {:.1} mm", parse.total_length_mm);
    println!("  Colors used: {}", parse.color_count);
    println!("  Layers: {}", parse.layer_count);

    if verbose {
        println!();
        println!("Segments:");
        for (i, segment) in parse.segments.iter().take(20).enumerate() {
            println!(
                "  {}. Color {}: {:.1} mm (lines {}-{})",
                i + 1,
                segment.color_index,
                segment.length_mm,
                segment.start_line,
                segment.end_line
            );
        }
        if parse.segments.len() > 20 {
            println!("  ... and {} more", parse.segments.len() - 20);
        }
    }

    println!();
    println!("  Recipe saved: {}", report.recipe_path.display());
    println!("  Final segments: {}", report.recipe.segment_count);
    println!(
        "  Total filament needed: {:.1} mm ({:.2} m)",
        report.recipe.total_length_mm,
        report.recipe.total_length_mm / 1000.0
    );
    println!();
    println!("  Modified G-code saved: {}", report.gcode_path.display());
    println!(
        "  Tool changes removed: {}",
        report.modify_stats.tool_changes_removed
    );

    println!();
    println!("{}", "=".repeat(40));
    println!("Done! Next steps:");
    println!(
        "  1. Send the recipe to your splicing machine: {}",
        report.recipe_path.display()
    );
    println!(
        "  2. After splicing, print with: {}",
        report.gcode_path.display()
    );

    Ok(())
}

fn run_analyze(input: PathBuf, output: Option<PathBuf>, quiet: bool) -> anyhow::Result<()> {
    let result = GcodeParser::parse_file(&input);
    if !result.errors.is_empty() {
        bail!("{}", result.errors.join("; "));
    }

    let analysis = analyzer::analyze(&result, &input.display().to_string());
    if !quiet {
        print!("{}", analysis.to_report());
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&analysis)?;
        std::fs::write(&path, json)?;
        if !quiet {
            println!("Results saved to: {}", path.display());
        }
    }

    Ok(())
}

fn run_profiles(id: Option<String>) -> anyhow::Result<()> {
    match id {
        None => {
            println!("Available profiles:");
            for id in profiles::list_profiles() {
                if let Some(profile) = profiles::get_profile(id) {
                    println!(
                        "  {}: {} ({}, {}C)",
                        id, profile.name, profile.material, profile.splice_temp_c
                    );
                }
            }
        }
        Some(id) => match profiles::get_profile(&id) {
            Some(profile) => {
                println!("Profile: {}", profile.name);
                println!("  Material: {}", profile.material);
                println!(
                    "  Brand: {}",
                    profile.brand.as_deref().unwrap_or("Generic")
                );
                println!("  Splice temp: {}C", profile.splice_temp_c);
                println!("  Heat time: {}ms", profile.heat_time_ms);
                println!("  Cooling time: {}ms", profile.cooling_time_ms);
                println!("  Compression: {}mm", profile.compression_mm);
                println!("  Compatible with: {}", profile.compatible_with.join(", "));
                if !profile.notes.is_empty() {
                    println!("  Notes: {}", profile.notes);
                }
            }
            None => return Err(PostProcessError::UnknownProfile(id).into()),
        },
    }
    Ok(())
}
