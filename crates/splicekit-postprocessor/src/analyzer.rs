//! Segment statistics and splice-performance estimates.
//!
//! Summarizes a parse into length distributions, per-color counts, and rough
//! splice-time / waste-reduction figures, and flags inputs that will splice
//! poorly (many very short segments, excessive segment counts).

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::parser::ParseResult;

/// Average splicer work per joint (heat, cool, handling), in seconds.
const SPLICE_SECONDS_PER_JOINT: f64 = 45.0;
/// Typical purge waste per color change when printing without splicing.
const TRADITIONAL_WASTE_MM: f64 = 50.0;
/// Filament buffer consumed per splice joint.
const SPLICE_BUFFER_MM: f64 = 10.0;

/// Statistics about segment lengths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentLengthStats {
    pub count: usize,
    pub total_mm: f64,
    pub min_mm: f64,
    pub max_mm: f64,
    pub avg_mm: f64,
    pub median_mm: f64,

    /// Segments under 5 mm.
    pub very_short: usize,
    /// 5-20 mm.
    pub short: usize,
    /// 20-100 mm.
    pub medium: usize,
    /// 100-500 mm.
    pub long: usize,
    /// Over 500 mm.
    pub very_long: usize,
}

/// Complete analysis of one G-code file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcodeAnalysis {
    pub filename: String,
    pub segment_stats: SegmentLengthStats,
    pub color_count: usize,
    /// `T<n>` label to segment count.
    pub color_distribution: BTreeMap<String, usize>,
    pub layer_count: u32,
    pub estimated_splice_time_hours: f64,
    pub estimated_waste_reduction_percent: f64,
    pub warnings: Vec<String>,
}

/// Analyze a parse result and return statistics.
pub fn analyze(parse_result: &ParseResult, filename: &str) -> GcodeAnalysis {
    let mut warnings = parse_result.warnings.clone();

    if parse_result.segments.is_empty() {
        warnings.push("No segments found".to_string());
        return GcodeAnalysis {
            filename: filename.to_string(),
            segment_stats: SegmentLengthStats::default(),
            color_count: 0,
            color_distribution: BTreeMap::new(),
            layer_count: 0,
            estimated_splice_time_hours: 0.0,
            estimated_waste_reduction_percent: 0.0,
            warnings,
        };
    }

    let lengths: Vec<f64> = parse_result.segments.iter().map(|s| s.length_mm).collect();
    let mut sorted = lengths.clone();
    sorted.sort_by(f64::total_cmp);

    let count = lengths.len();
    let total: f64 = lengths.iter().sum();
    let mut stats = SegmentLengthStats {
        count,
        total_mm: total,
        min_mm: sorted[0],
        max_mm: sorted[count - 1],
        avg_mm: total / count as f64,
        median_mm: sorted[count / 2],
        ..Default::default()
    };

    for &length in &lengths {
        if length < 5.0 {
            stats.very_short += 1;
        } else if length < 20.0 {
            stats.short += 1;
        } else if length < 100.0 {
            stats.medium += 1;
        } else if length < 500.0 {
            stats.long += 1;
        } else {
            stats.very_long += 1;
        }
    }

    let mut color_distribution = BTreeMap::new();
    for segment in &parse_result.segments {
        *color_distribution
            .entry(format!("T{}", segment.color_index))
            .or_insert(0usize) += 1;
    }

    let splice_time_hours = (count as f64 * SPLICE_SECONDS_PER_JOINT) / 3600.0;

    let traditional_waste = count as f64 * TRADITIONAL_WASTE_MM;
    let splice_waste = count as f64 * SPLICE_BUFFER_MM;
    let waste_reduction = (traditional_waste - splice_waste) / traditional_waste * 100.0;

    if stats.very_short as f64 > stats.count as f64 * 0.2 {
        warnings.push(format!(
            "High proportion of very short segments ({}/{})",
            stats.very_short, stats.count
        ));
    }
    if stats.count > 5000 {
        warnings.push(format!(
            "Very high segment count ({}) - consider simplifying",
            stats.count
        ));
    }

    GcodeAnalysis {
        filename: filename.to_string(),
        segment_stats: stats,
        color_count: parse_result.color_count,
        color_distribution,
        layer_count: parse_result.layer_count,
        estimated_splice_time_hours: round1(splice_time_hours),
        estimated_waste_reduction_percent: round1(waste_reduction),
        warnings,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl GcodeAnalysis {
    /// Render the analysis as a human-readable report.
    pub fn to_report(&self) -> String {
        let stats = &self.segment_stats;
        let denom = stats.count.max(1) as f64;
        let pct = |n: usize| 100.0 * n as f64 / denom;

        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(60));
        let _ = writeln!(out, "SPLICEKIT G-CODE ANALYSIS");
        let _ = writeln!(out, "{}", "=".repeat(60));
        let _ = writeln!(out, "File: {}", self.filename);
        let _ = writeln!(out);

        let _ = writeln!(out, "SEGMENTS");
        let _ = writeln!(out, "  Total count: {}", stats.count);
        let _ = writeln!(
            out,
            "  Total length: {:.1}mm ({:.2}m)",
            stats.total_mm,
            stats.total_mm / 1000.0
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "SEGMENT LENGTHS");
        let _ = writeln!(out, "  Min: {:.1}mm", stats.min_mm);
        let _ = writeln!(out, "  Max: {:.1}mm", stats.max_mm);
        let _ = writeln!(out, "  Average: {:.1}mm", stats.avg_mm);
        let _ = writeln!(out, "  Median: {:.1}mm", stats.median_mm);
        let _ = writeln!(out);

        let _ = writeln!(out, "LENGTH DISTRIBUTION");
        let _ = writeln!(
            out,
            "  Very short (<5mm): {} ({:.1}%)",
            stats.very_short,
            pct(stats.very_short)
        );
        let _ = writeln!(
            out,
            "  Short (5-20mm): {} ({:.1}%)",
            stats.short,
            pct(stats.short)
        );
        let _ = writeln!(
            out,
            "  Medium (20-100mm): {} ({:.1}%)",
            stats.medium,
            pct(stats.medium)
        );
        let _ = writeln!(
            out,
            "  Long (100-500mm): {} ({:.1}%)",
            stats.long,
            pct(stats.long)
        );
        let _ = writeln!(
            out,
            "  Very long (>500mm): {} ({:.1}%)",
            stats.very_long,
            pct(stats.very_long)
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "COLORS");
        let _ = writeln!(out, "  Color count: {}", self.color_count);
        for (tool, count) in &self.color_distribution {
            let _ = writeln!(
                out,
                "    {}: {} segments ({:.1}%)",
                tool,
                count,
                pct(*count)
            );
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "ESTIMATES");
        let _ = writeln!(out, "  Layers: {}", self.layer_count);
        let _ = writeln!(
            out,
            "  Splice prep time: ~{:.1} hours",
            self.estimated_splice_time_hours
        );
        let _ = writeln!(
            out,
            "  Waste reduction vs traditional: ~{:.0}%",
            self.estimated_waste_reduction_percent
        );
        let _ = writeln!(out);

        if !self.warnings.is_empty() {
            let _ = writeln!(out, "WARNINGS");
            for warning in &self.warnings {
                let _ = writeln!(out, "  ! {}", warning);
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "{}", "=".repeat(60));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Segment;

    fn parse_result(lengths: &[f64]) -> ParseResult {
        ParseResult {
            segments: lengths
                .iter()
                .enumerate()
                .map(|(i, &length)| Segment {
                    color_index: (i % 2) as u32,
                    length_mm: length,
                    start_line: i + 1,
                    end_line: i + 2,
                    layer_start: 0,
                    layer_end: 0,
                })
                .collect(),
            total_length_mm: lengths.iter().sum(),
            color_count: 2,
            layer_count: 1,
            errors: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn test_distribution_buckets() {
        let analysis = analyze(&parse_result(&[2.0, 10.0, 50.0, 200.0, 800.0]), "t.gcode");
        let stats = &analysis.segment_stats;
        assert_eq!(stats.very_short, 1);
        assert_eq!(stats.short, 1);
        assert_eq!(stats.medium, 1);
        assert_eq!(stats.long, 1);
        assert_eq!(stats.very_long, 1);
        assert_eq!(stats.min_mm, 2.0);
        assert_eq!(stats.max_mm, 800.0);
        assert_eq!(stats.median_mm, 50.0);
    }

    #[test]
    fn test_short_segment_warning() {
        let analysis = analyze(&parse_result(&[1.0, 2.0, 100.0]), "t.gcode");
        assert!(analysis
            .warnings
            .iter()
            .any(|w| w.starts_with("High proportion of very short segments")));
    }

    #[test]
    fn test_empty_parse_is_all_zero() {
        let empty = ParseResult::default();
        let analysis = analyze(&empty, "empty.gcode");
        assert_eq!(analysis.segment_stats.count, 0);
        assert_eq!(analysis.color_count, 0);
        assert_eq!(analysis.estimated_splice_time_hours, 0.0);
        assert!(analysis.warnings.iter().any(|w| w == "No segments found"));
    }

    #[test]
    fn test_waste_reduction_is_eighty_percent() {
        // 50mm purge vs 10mm buffer per joint
        let analysis = analyze(&parse_result(&[100.0, 100.0]), "t.gcode");
        assert_eq!(analysis.estimated_waste_reduction_percent, 80.0);
    }
}
