//! Multi-tool G-code parsing and extrusion tracking.
//!
//! Reconstructs cumulative filament extrusion from a G-code line stream and
//! splits it into per-color segments at tool-change boundaries. Handles
//! OrcaSlicer, PrusaSlicer, and BambuStudio output: absolute (`M82`) and
//! relative (`M83`) extrusion modes, `G92` coordinate resets, `T<n>` tool
//! selects, and `M600` two-color toggles.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::round_mm;

/// A contiguous run of filament for one color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Tool/color index the run was printed with.
    pub color_index: u32,
    /// Filament length consumed during the run, rounded to 0.01 mm.
    pub length_mm: f64,
    /// 1-based source line where the run began.
    pub start_line: usize,
    /// Source line at which the next boundary was detected, or the line
    /// count at end of file.
    pub end_line: usize,
    /// Layer index active when the run began.
    pub layer_start: u32,
    /// Layer index active when the run ended.
    pub layer_end: u32,
}

/// Result of parsing a G-code file.
///
/// If `errors` is non-empty the segment list is incomplete and must not be
/// used downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    /// Segments in source order.
    pub segments: Vec<Segment>,
    /// Sum of all segment lengths.
    pub total_length_mm: f64,
    /// Number of distinct colors observed (minimum 1).
    pub color_count: usize,
    /// Highest layer index seen, plus one.
    pub layer_count: u32,
    /// Fatal conditions; parsing did not produce usable segments.
    pub errors: Vec<String>,
    /// Advisory conditions; the result is still usable.
    pub warnings: Vec<String>,
}

/// Layer information carried by a comment line.
enum LayerMarker {
    /// `;LAYER:<n>` sets the layer counter.
    Index(u32),
    /// `;LAYER_CHANGE` bumps it by one.
    Advance,
}

/// What a trimmed G-code line means to the extrusion tracker.
///
/// Classification happens once per line; the scan loop then dispatches on
/// the variant instead of re-matching the same line against every pattern.
enum LineClass {
    Blank,
    Comment(Option<LayerMarker>),
    /// `M82` — E values are cumulative totals.
    SetAbsoluteExtrusion,
    /// `M83` — E values are deltas.
    SetRelativeExtrusion,
    /// `T<n>` at line start.
    ToolChange(u32),
    /// `M600` — two-color swap with no explicit index.
    ColorToggle,
    /// `G0`/`G1` motion, with its E parameter if present.
    Move { e: Option<f64> },
    /// `G92` extrusion rebase, with its E parameter if present.
    ExtrusionReset { e: Option<f64> },
    Other,
}

fn tool_change_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^T(\d+)").expect("invalid regex pattern"))
}

fn color_change_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^M600").expect("invalid regex pattern"))
}

fn move_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^G[01]\s").expect("invalid regex pattern"))
}

fn extrusion_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)E([-+]?\d*\.?\d+)").expect("invalid regex pattern"))
}

fn layer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i);LAYER:(\d+)|;LAYER_CHANGE").expect("invalid regex pattern"))
}

/// Extract the E parameter value from a motion or reset line.
fn extrusion_value(line: &str) -> Option<f64> {
    extrusion_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Look for a layer marker anywhere in a comment line.
fn layer_marker(line: &str) -> Option<LayerMarker> {
    let caps = layer_regex().captures(line)?;
    match caps.get(1) {
        Some(index) => index.as_str().parse::<u32>().ok().map(LayerMarker::Index),
        None => Some(LayerMarker::Advance),
    }
}

/// Classify one trimmed line.
fn classify(line: &str) -> LineClass {
    if line.is_empty() {
        return LineClass::Blank;
    }
    if line.starts_with(';') {
        return LineClass::Comment(layer_marker(line));
    }
    if line.starts_with("M82") {
        return LineClass::SetAbsoluteExtrusion;
    }
    if line.starts_with("M83") {
        return LineClass::SetRelativeExtrusion;
    }
    if let Some(caps) = tool_change_regex().captures(line) {
        if let Ok(tool) = caps[1].parse::<u32>() {
            return LineClass::ToolChange(tool);
        }
    }
    if color_change_regex().is_match(line) {
        return LineClass::ColorToggle;
    }
    if move_regex().is_match(line) {
        return LineClass::Move {
            e: extrusion_value(line),
        };
    }
    if line.starts_with("G92") {
        return LineClass::ExtrusionReset {
            e: extrusion_value(line),
        };
    }
    LineClass::Other
}

/// Mutable scan state for one pass over the line stream.
///
/// Constructed fresh per parse call and discarded with the result.
#[derive(Debug)]
struct TrackerState {
    current_tool: u32,
    current_e: f64,
    segment_start_e: f64,
    segment_start_line: usize,
    current_layer: u32,
    segment_start_layer: u32,
    absolute_e: bool,
    seen_tools: BTreeSet<u32>,
}

impl TrackerState {
    fn new() -> Self {
        Self {
            current_tool: 0,
            current_e: 0.0,
            segment_start_e: 0.0,
            segment_start_line: 0,
            current_layer: 0,
            segment_start_layer: 0,
            absolute_e: true,
            seen_tools: BTreeSet::new(),
        }
    }

    /// Whether the in-progress segment has consumed any filament.
    fn has_extruded(&self) -> bool {
        self.current_e > self.segment_start_e
    }

    /// Close the in-progress segment at `end_line`.
    fn close_segment(&self, end_line: usize) -> Segment {
        Segment {
            color_index: self.current_tool,
            length_mm: round_mm(self.current_e - self.segment_start_e),
            start_line: self.segment_start_line,
            end_line,
            layer_start: self.segment_start_layer,
            layer_end: self.current_layer,
        }
    }

    /// Begin a new segment for `tool` at `line_num`.
    fn begin_segment(&mut self, tool: u32, line_num: usize) {
        self.current_tool = tool;
        self.seen_tools.insert(tool);
        self.segment_start_e = self.current_e;
        self.segment_start_line = line_num;
        self.segment_start_layer = self.current_layer;
    }
}

/// Parser for multi-tool G-code files.
#[derive(Debug, Default)]
pub struct GcodeParser;

impl GcodeParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a G-code file and extract splice segments.
    ///
    /// A read failure is surfaced through `ParseResult::errors` rather than
    /// a panic or an `Err`, so callers always get a uniform result shape.
    pub fn parse_file(path: &Path) -> ParseResult {
        let lines = match crate::read_gcode_lines(path) {
            Ok(lines) => lines,
            Err(e) => {
                let mut result = ParseResult::default();
                result.errors.push(format!("Failed to read file: {}", e));
                return result;
            }
        };
        Self::parse_lines(&lines)
    }

    /// Parse G-code lines and extract splice segments.
    pub fn parse_lines(lines: &[String]) -> ParseResult {
        let mut state = TrackerState::new();
        let mut result = ParseResult::default();

        for (index, raw) in lines.iter().enumerate() {
            let line_num = index + 1;
            let line = raw.trim();

            match classify(line) {
                LineClass::Blank | LineClass::Other => {}
                LineClass::Comment(marker) => match marker {
                    Some(LayerMarker::Index(layer)) => state.current_layer = layer,
                    Some(LayerMarker::Advance) => state.current_layer += 1,
                    None => {}
                },
                LineClass::SetAbsoluteExtrusion => state.absolute_e = true,
                LineClass::SetRelativeExtrusion => state.absolute_e = false,
                LineClass::ToolChange(tool) => {
                    // Anything before the very first tool select belongs to
                    // no color; afterwards every boundary closes a segment.
                    if state.has_extruded() || !state.seen_tools.is_empty() {
                        let segment = state.close_segment(line_num - 1);
                        if segment.length_mm > 0.0 {
                            result.segments.push(segment);
                        }
                    }
                    state.begin_segment(tool, line_num);
                }
                LineClass::ColorToggle => {
                    if state.has_extruded() {
                        let segment = state.close_segment(line_num - 1);
                        if segment.length_mm > 0.0 {
                            result.segments.push(segment);
                        }
                    }
                    // M600 carries no index; assume an A/B spool swap
                    let next_tool = (state.current_tool + 1) % 2;
                    state.begin_segment(next_tool, line_num);
                }
                LineClass::Move { e: Some(e_value) } => {
                    if state.absolute_e {
                        // Retractions move E below the running total and
                        // must not reduce the tracked position
                        if e_value > state.current_e {
                            state.current_e = e_value;
                        }
                    } else if e_value > 0.0 {
                        state.current_e += e_value;
                    }
                }
                LineClass::ExtrusionReset { e: Some(new_e) } => {
                    // Shift the segment accumulator by the same delta so the
                    // in-progress segment keeps its accumulated length
                    state.segment_start_e = state.segment_start_e - state.current_e + new_e;
                    state.current_e = new_e;
                }
                LineClass::Move { e: None } | LineClass::ExtrusionReset { e: None } => {}
            }
        }

        // Capture the final segment
        if state.has_extruded() {
            let segment = state.close_segment(lines.len());
            if segment.length_mm > 0.0 {
                result.segments.push(segment);
            }
        }

        result.total_length_mm = result.segments.iter().map(|s| s.length_mm).sum();
        result.color_count = if state.seen_tools.is_empty() {
            1
        } else {
            state.seen_tools.len()
        };
        result.layer_count = state.current_layer + 1;

        if result.segments.is_empty() {
            result.warnings.push("No extrusion segments found".to_string());
        }
        if result.color_count < 2 {
            result
                .warnings
                .push("Single color detected - no splicing needed".to_string());
        }

        debug!(
            segments = result.segments.len(),
            colors = result.color_count,
            layers = result.layer_count,
            total_mm = result.total_length_mm,
            "parse complete"
        );

        result
    }
}

/// Convenience function to parse a G-code file with default settings.
pub fn parse_gcode(path: &Path) -> ParseResult {
    GcodeParser::parse_file(path)
}
