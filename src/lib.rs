//! # SpliceKit
//!
//! A post-processor for printing multi-color models on a single-extruder
//! printer with pre-spliced filament. SpliceKit reads multi-tool G-code from
//! OrcaSlicer, PrusaSlicer, or BambuStudio and produces:
//!
//! - a **splice recipe** (JSON) for the filament-splicing machine, and
//! - a **modified G-code program** with tool changes stripped and an
//!   operator pause for loading the spliced spool.
//!
//! ## Architecture
//!
//! SpliceKit is organized as a workspace:
//!
//! 1. **splicekit-postprocessor** - parsing, recipe generation, rewriting,
//!    analysis, and filament profiles
//! 2. **splicekit-settings** - configuration file handling
//! 3. **splicekit** - the command-line binary that integrates both

pub use splicekit_postprocessor::{
    analyze, generate_recipe, modify_gcode, parse_gcode, process_file, FilamentProfile,
    GcodeAnalysis, GcodeModifier, GcodeParser, ModifyStats, ParseResult, PipelineOptions,
    PipelineReport, PostProcessError, PostProcessResult, RecipeGenerator, Segment,
    SegmentLengthStats, SpliceParams, SpliceRecipe,
};

pub use splicekit_settings::{Config, OutputSettings, ProcessingSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
