//! Splice recipe generation from parsed segments.
//!
//! Takes the raw segment sequence from the parser, merges runs that are too
//! short to splice reliably, optionally adds purge-transition length at each
//! color boundary, and assembles the JSON recipe document consumed by the
//! splicing machine.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PostProcessResult;
use crate::parser::{ParseResult, Segment};
use crate::round_mm;

/// Recipe document format version.
pub const RECIPE_VERSION: &str = "1.0";

/// One splice in the recipe: a color and the filament length to join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSegment {
    /// Tool/color index.
    pub color: u32,
    /// Filament length in mm.
    pub length_mm: f64,
}

/// Provenance and processing metadata embedded in the recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeMetadata {
    /// Original G-code filename.
    pub source_file: String,
    /// Purge-transition length that was applied per boundary.
    pub transition_length_mm: f64,
    /// Segment count before merging.
    pub original_segments: usize,
    /// How many segments the merge pass absorbed.
    pub merged_segments: usize,
}

/// Complete splice recipe for the machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpliceRecipe {
    pub version: String,
    pub total_length_mm: f64,
    pub segment_count: usize,
    pub color_count: usize,
    /// Ordered splice list; line/layer metadata from parsing is dropped.
    pub segments: Vec<RecipeSegment>,
    /// Stringified color index to human-readable name.
    pub colors: BTreeMap<String, String>,
    pub metadata: RecipeMetadata,
}

/// Default color names for tool indices 0-7.
fn default_color_names() -> HashMap<u32, String> {
    [
        (0, "white"),
        (1, "black"),
        (2, "red"),
        (3, "blue"),
        (4, "green"),
        (5, "yellow"),
        (6, "orange"),
        (7, "purple"),
    ]
    .into_iter()
    .map(|(index, name)| (index, name.to_string()))
    .collect()
}

/// Generates splice recipes from parsed G-code.
#[derive(Debug, Clone)]
pub struct RecipeGenerator {
    color_names: HashMap<u32, String>,
    transition_length_mm: f64,
    min_segment_length_mm: f64,
}

impl Default for RecipeGenerator {
    fn default() -> Self {
        Self {
            color_names: default_color_names(),
            transition_length_mm: 0.0,
            min_segment_length_mm: 10.0,
        }
    }
}

impl RecipeGenerator {
    /// Create a generator.
    ///
    /// `color_names` overrides the default palette per tool index;
    /// `transition_length_mm` is extra purge length added at each boundary;
    /// segments shorter than `min_segment_length_mm` are merged into a
    /// neighbor (a value `<= 0` disables merging).
    pub fn new(
        color_names: Option<HashMap<u32, String>>,
        transition_length_mm: f64,
        min_segment_length_mm: f64,
    ) -> Self {
        Self {
            color_names: color_names.unwrap_or_else(default_color_names),
            transition_length_mm,
            min_segment_length_mm,
        }
    }

    /// Generate a splice recipe from parsed G-code.
    pub fn generate(&self, parse_result: &ParseResult, source_file: &str) -> SpliceRecipe {
        let merged = self.merge_small_segments(&parse_result.segments);
        let adjusted = self.add_transitions(merged);
        let finalized_count = adjusted.len();

        let mut colors = BTreeMap::new();
        for segment in &adjusted {
            let index = segment.color_index;
            colors.entry(index.to_string()).or_insert_with(|| {
                self.color_names
                    .get(&index)
                    .cloned()
                    .unwrap_or_else(|| format!("color_{}", index))
            });
        }

        let segments: Vec<RecipeSegment> = adjusted
            .iter()
            .map(|s| RecipeSegment {
                color: s.color_index,
                length_mm: s.length_mm,
            })
            .collect();

        let total_length: f64 = segments.iter().map(|s| s.length_mm).sum();

        SpliceRecipe {
            version: RECIPE_VERSION.to_string(),
            total_length_mm: round_mm(total_length),
            segment_count: segments.len(),
            color_count: colors.len(),
            segments,
            colors,
            metadata: RecipeMetadata {
                source_file: source_file.to_string(),
                transition_length_mm: self.transition_length_mm,
                original_segments: parse_result.segments.len(),
                merged_segments: parse_result.segments.len() - finalized_count,
            },
        }
    }

    /// Merge segments shorter than the minimum into adjacent segments.
    ///
    /// Single left-to-right scan with one `pending` accumulator. Same-color
    /// neighbors always merge; an undersized run of a different color is
    /// attributed to the previous color. An undersized *leading* run instead
    /// carries forward into the next standalone segment, which keeps its own
    /// color. Correctness depends on the left-to-right order.
    fn merge_small_segments(&self, segments: &[Segment]) -> Vec<Segment> {
        if segments.is_empty() || self.min_segment_length_mm <= 0.0 {
            return segments.to_vec();
        }

        let mut merged = Vec::new();
        let mut pending: Option<Segment> = None;

        for segment in segments {
            let mut prev = match pending.take() {
                None => {
                    pending = Some(segment.clone());
                    continue;
                }
                Some(prev) => prev,
            };

            if segment.color_index == prev.color_index
                || segment.length_mm < self.min_segment_length_mm
            {
                prev.length_mm += segment.length_mm;
                prev.end_line = segment.end_line;
                prev.layer_end = segment.layer_end;
                pending = Some(prev);
            } else if prev.length_mm >= self.min_segment_length_mm {
                merged.push(prev);
                pending = Some(segment.clone());
            } else {
                // Pending is too small to stand alone; fold it into the
                // incoming segment, which keeps its own color
                pending = Some(Segment {
                    color_index: segment.color_index,
                    length_mm: segment.length_mm + prev.length_mm,
                    start_line: prev.start_line,
                    end_line: segment.end_line,
                    layer_start: prev.layer_start,
                    layer_end: segment.layer_end,
                });
            }
        }

        if let Some(prev) = pending {
            merged.push(prev);
        }

        merged
    }

    /// Add transition length to every segment except the last.
    ///
    /// The final segment has no following splice and needs no purge
    /// allowance.
    fn add_transitions(&self, segments: Vec<Segment>) -> Vec<Segment> {
        if self.transition_length_mm <= 0.0 {
            return segments;
        }

        let last = segments.len().saturating_sub(1);
        segments
            .into_iter()
            .enumerate()
            .map(|(i, mut segment)| {
                if i < last {
                    segment.length_mm = round_mm(segment.length_mm + self.transition_length_mm);
                }
                segment
            })
            .collect()
    }

    /// Serialize a recipe to a JSON string.
    pub fn to_json(&self, recipe: &SpliceRecipe, pretty: bool) -> PostProcessResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(recipe)?
        } else {
            serde_json::to_string(recipe)?
        };
        Ok(json)
    }

    /// Save a recipe to a JSON file.
    pub fn save_recipe(&self, recipe: &SpliceRecipe, path: &Path) -> PostProcessResult<()> {
        let json = self.to_json(recipe, true)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Convenience function to generate a recipe with default merging.
pub fn generate_recipe(
    parse_result: &ParseResult,
    source_file: &str,
    transition_length_mm: f64,
) -> SpliceRecipe {
    let generator = RecipeGenerator::new(None, transition_length_mm, 10.0);
    generator.generate(parse_result, source_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(color: u32, length: f64) -> Segment {
        Segment {
            color_index: color,
            length_mm: length,
            start_line: 1,
            end_line: 2,
            layer_start: 0,
            layer_end: 0,
        }
    }

    #[test]
    fn test_chain_of_tiny_segments_folds_into_pending() {
        // Each fold updates pending before the next comparison, so a run of
        // consecutive tiny segments all lands in the same output segment
        let generator = RecipeGenerator::new(None, 0.0, 10.0);
        let merged = generator.merge_small_segments(&[
            segment(0, 50.0),
            segment(1, 2.0),
            segment(0, 3.0),
            segment(1, 1.0),
            segment(1, 60.0),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].color_index, 0);
        assert_eq!(merged[0].length_mm, 56.0);
        assert_eq!(merged[1].color_index, 1);
        assert_eq!(merged[1].length_mm, 60.0);
    }

    #[test]
    fn test_undersized_leading_run_carries_forward() {
        let generator = RecipeGenerator::new(None, 0.0, 20.0);
        let merged =
            generator.merge_small_segments(&[segment(0, 5.0), segment(1, 50.0), segment(0, 30.0)]);
        assert_eq!(merged.len(), 2);
        // The 5mm lead-in was folded into the 50mm segment and took its color
        assert_eq!(merged[0].color_index, 1);
        assert_eq!(merged[0].length_mm, 55.0);
        assert_eq!(merged[1].color_index, 0);
    }

    #[test]
    fn test_color_fallback_name() {
        let generator = RecipeGenerator::default();
        let parse_result = ParseResult {
            segments: vec![segment(9, 40.0)],
            total_length_mm: 40.0,
            color_count: 1,
            layer_count: 1,
            errors: vec![],
            warnings: vec![],
        };
        let recipe = generator.generate(&parse_result, "test.gcode");
        assert_eq!(recipe.colors.get("9").map(String::as_str), Some("color_9"));
    }
}
