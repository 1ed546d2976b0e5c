//! # SpliceKit Post-Processor
//!
//! Converts multi-tool (multi-color) G-code into the two artifacts needed to
//! print with pre-spliced filament on a single-extruder machine:
//!
//! 1. A **splice recipe**: the ordered list of per-color filament lengths for
//!    the splicing machine, produced by tracking cumulative extrusion between
//!    tool changes and merging undersized segments.
//! 2. A **modified G-code program** with tool-change commands stripped and an
//!    optional operator pause inserted after the start sequence.
//!
//! ## Components
//!
//! - [`parser`] — extrusion-state parser: raw lines to [`parser::Segment`]s
//! - [`recipe`] — segment merging, transition insertion, recipe assembly
//! - [`modifier`] — single-extruder rewriting of the original program
//! - [`analyzer`] — segment statistics and splice-performance estimates
//! - [`profiles`] — filament splice profile database
//! - [`pipeline`] — one-call file-to-artifacts driver
//!
//! The parser and the modifier are independent single-pass transforms over
//! the same line sequence and share no state.

use std::io;
use std::path::Path;

pub mod analyzer;
pub mod error;
pub mod modifier;
pub mod parser;
pub mod pipeline;
pub mod profiles;
pub mod recipe;

pub use analyzer::{analyze, GcodeAnalysis, SegmentLengthStats};
pub use error::{PostProcessError, PostProcessResult};
pub use modifier::{modify_gcode, GcodeModifier, ModifyStats};
pub use parser::{parse_gcode, GcodeParser, ParseResult, Segment};
pub use pipeline::{process_file, PipelineOptions, PipelineReport};
pub use profiles::{
    are_compatible, get_profile, list_profiles, profile_for_material, splice_params,
    FilamentProfile, SpliceParams,
};
pub use recipe::{generate_recipe, RecipeGenerator, RecipeMetadata, RecipeSegment, SpliceRecipe};

/// Read a G-code file as a sequence of lines, keeping line terminators.
///
/// Invalid byte sequences are replaced rather than rejected, so a file with a
/// broken thumbnail blob or stray binary still parses. Terminators are kept
/// so the rewriter can pass untouched lines through byte-identical.
pub fn read_gcode_lines(path: &Path) -> io::Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.split_inclusive('\n').map(str::to_string).collect())
}

/// Round a filament length to two decimal places (0.01 mm resolution).
pub(crate) fn round_mm(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
