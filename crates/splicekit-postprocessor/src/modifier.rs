//! Single-extruder rewriting of multi-tool G-code.
//!
//! Produces a program printable with pre-spliced filament: tool-change
//! commands are replaced with comments, and an optional pause is inserted
//! after the start sequence so the operator can load the spliced spool.
//!
//! The rewrite is purely textual and deliberately independent of the
//! extrusion parser; it never fails on malformed extrusion accounting.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PostProcessResult;

/// Counters describing what the rewrite changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyStats {
    /// Tool-select lines replaced with comments.
    pub tool_changes_removed: usize,
    /// Total lines altered.
    pub lines_modified: usize,
    /// Lines in the input program.
    pub total_lines: usize,
}

fn tool_change_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^T\d+").expect("invalid regex pattern"))
}

/// Rewrites G-code for single-extruder printing with pre-spliced filament.
#[derive(Debug, Clone)]
pub struct GcodeModifier {
    add_pause_at_start: bool,
    pause_command: String,
}

impl Default for GcodeModifier {
    fn default() -> Self {
        Self {
            add_pause_at_start: true,
            pause_command: "M0".to_string(),
        }
    }
}

impl GcodeModifier {
    /// Create a modifier.
    ///
    /// `pause_command` is the directive inserted for the spool-loading pause,
    /// typically `M0` or `M600`.
    pub fn new(add_pause_at_start: bool, pause_command: impl Into<String>) -> Self {
        Self {
            add_pause_at_start,
            pause_command: pause_command.into(),
        }
    }

    /// Rewrite a G-code file for single-extruder printing.
    pub fn modify_file(&self, input_path: &Path, output_path: &Path) -> PostProcessResult<ModifyStats> {
        let lines = crate::read_gcode_lines(input_path)?;
        let (modified, stats) = self.modify_lines(&lines);
        std::fs::write(output_path, modified.concat())?;
        Ok(stats)
    }

    /// Rewrite G-code lines for single-extruder printing.
    ///
    /// Input lines are expected to carry their original terminators (as
    /// produced by [`crate::read_gcode_lines`]); untouched lines pass
    /// through byte-identical.
    pub fn modify_lines(&self, lines: &[String]) -> (Vec<String>, ModifyStats) {
        let mut modified = Vec::with_capacity(lines.len() + 16);
        let mut stats = ModifyStats {
            total_lines: lines.len(),
            ..Default::default()
        };

        modified.extend(Self::header().iter().map(|s| s.to_string()));

        let mut pause_added = false;
        let mut found_start_gcode = false;

        for line in lines {
            let stripped = line.trim();

            // Detect the end of the slicer's start sequence
            if !found_start_gcode && stripped.starts_with(';') {
                let upper = stripped.to_uppercase();
                if upper.contains("END_GCODE") || upper.contains("START_GCODE") {
                    found_start_gcode = true;
                }
            }

            // Pause before the first motion after the start sequence, once
            if self.add_pause_at_start
                && !pause_added
                && found_start_gcode
                && (stripped.starts_with("G0") || stripped.starts_with("G1"))
            {
                modified.push("\n".to_string());
                modified.push("; === SPLICEKIT: Load pre-spliced spool now ===\n".to_string());
                modified.push(format!("{} ; Pause for spool loading\n", self.pause_command));
                modified.push("; === Press continue when ready ===\n".to_string());
                modified.push("\n".to_string());
                pause_added = true;
            }

            if tool_change_regex().is_match(stripped) {
                modified.push(format!("; SPLICEKIT: Removed {}\n", stripped));
                stats.tool_changes_removed += 1;
                stats.lines_modified += 1;
            } else {
                modified.push(line.clone());
            }
        }

        (modified, stats)
    }

    /// Header comment block prepended to every rewritten program.
    fn header() -> &'static [&'static str] {
        &[
            "; ============================================\n",
            "; Modified by SpliceKit Post-Processor\n",
            "; \n",
            "; This G-code has been modified for use with\n",
            "; pre-spliced multi-color filament.\n",
            "; \n",
            "; Tool change commands have been removed.\n",
            "; Load your pre-spliced spool before printing.\n",
            "; ============================================\n",
            "\n",
        ]
    }
}

/// Convenience function to rewrite a G-code file with default options.
pub fn modify_gcode(input_path: &Path, output_path: &Path) -> PostProcessResult<ModifyStats> {
    let modifier = GcodeModifier::default();
    modifier.modify_file(input_path, output_path)
}
