//! End-to-end post-processing driver.
//!
//! Reads a multi-tool G-code file once, parses it into segments, writes the
//! splice recipe next to it (or into a chosen output directory), and writes
//! the companion single-extruder program. The parser and rewriter both
//! consume the same in-memory line sequence; the file is read exactly once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{PostProcessError, PostProcessResult};
use crate::modifier::{GcodeModifier, ModifyStats};
use crate::parser::{GcodeParser, ParseResult};
use crate::recipe::{RecipeGenerator, SpliceRecipe};

/// Parameters accepted by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Segments shorter than this are merged; `<= 0` disables merging.
    pub min_segment_length_mm: f64,
    /// Extra purge length added at each color boundary.
    pub transition_length_mm: f64,
    /// Color name overrides per tool index.
    pub color_names: Option<HashMap<u32, String>>,
    /// Insert a spool-loading pause after the start sequence.
    pub add_pause_at_start: bool,
    /// Directive used for the pause.
    pub pause_command: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            min_segment_length_mm: 10.0,
            transition_length_mm: 0.0,
            color_names: None,
            add_pause_at_start: true,
            pause_command: "M0".to_string(),
        }
    }
}

impl PipelineOptions {
    fn validate(&self) -> PostProcessResult<()> {
        if self.transition_length_mm < 0.0 {
            return Err(PostProcessError::InvalidParameters(
                "transition length must be >= 0".to_string(),
            ));
        }
        if self.pause_command.trim().is_empty() {
            return Err(PostProcessError::InvalidParameters(
                "pause command must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything the pipeline produced for one input file.
#[derive(Debug)]
pub struct PipelineReport {
    /// Where the recipe document was written.
    pub recipe_path: PathBuf,
    /// Where the rewritten program was written.
    pub gcode_path: PathBuf,
    pub parse_result: ParseResult,
    pub recipe: SpliceRecipe,
    pub modify_stats: ModifyStats,
}

/// Run the full pipeline over one G-code file.
///
/// `output_dir` defaults to the input's directory and is created when
/// missing. Parser errors (an unreadable file) abort before any artifact is
/// written; parser warnings are logged and carried in the report.
pub fn process_file(
    input: &Path,
    output_dir: Option<&Path>,
    options: &PipelineOptions,
) -> PostProcessResult<PipelineReport> {
    options.validate()?;

    let lines = crate::read_gcode_lines(input)?;
    info!(file = %input.display(), lines = lines.len(), "parsing G-code");

    let parse_result = GcodeParser::parse_lines(&lines);
    if !parse_result.errors.is_empty() {
        return Err(PostProcessError::ParseFailed(parse_result.errors.join("; ")));
    }
    for warning in &parse_result.warnings {
        warn!("{}", warning);
    }

    let out_dir = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.to_path_buf()
        }
        None => input.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let recipe_path = out_dir.join(format!("{}_splice_recipe.json", stem));
    let gcode_path = out_dir.join(format!("{}_modified.gcode", stem));

    let generator = RecipeGenerator::new(
        options.color_names.clone(),
        options.transition_length_mm,
        options.min_segment_length_mm,
    );
    let recipe = generator.generate(&parse_result, &input.display().to_string());
    generator.save_recipe(&recipe, &recipe_path)?;
    info!(
        path = %recipe_path.display(),
        segments = recipe.segment_count,
        total_mm = recipe.total_length_mm,
        "splice recipe written"
    );

    let modifier = GcodeModifier::new(options.add_pause_at_start, options.pause_command.clone());
    let (modified, modify_stats) = modifier.modify_lines(&lines);
    std::fs::write(&gcode_path, modified.concat())?;
    info!(
        path = %gcode_path.display(),
        tool_changes_removed = modify_stats.tool_changes_removed,
        "modified G-code written"
    );

    Ok(PipelineReport {
        recipe_path,
        gcode_path,
        parse_result,
        recipe,
        modify_stats,
    })
}
