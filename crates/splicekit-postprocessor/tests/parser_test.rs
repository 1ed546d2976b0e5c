use splicekit_postprocessor::parser::GcodeParser;

fn lines(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| format!("{}\n", s)).collect()
}

#[test]
fn test_two_tool_absolute_extrusion() {
    let result = GcodeParser::parse_lines(&lines(&[
        "T0",
        "G1 X10 Y10 E50.0 F1200",
        "T1",
        "G1 X20 Y10 E80.0 F1200",
    ]));

    assert!(result.errors.is_empty());
    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.segments[0].color_index, 0);
    assert_eq!(result.segments[0].length_mm, 50.0);
    assert_eq!(result.segments[1].color_index, 1);
    assert_eq!(result.segments[1].length_mm, 30.0);
    assert_eq!(result.color_count, 2);
}

#[test]
fn test_relative_mode_accumulates_deltas() {
    let result = GcodeParser::parse_lines(&lines(&[
        "M83",
        "G1 X1 E10.0",
        "G1 X2 E10.0",
        "G1 X3 E10.0",
    ]));

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].length_mm, 30.0);
    assert_eq!(result.total_length_mm, 30.0);
}

#[test]
fn test_extrusion_reset_preserves_segment_length() {
    let result = GcodeParser::parse_lines(&lines(&[
        "T0",
        "G1 X10 E100.0",
        "G92 E0",
        "G1 X20 E50.0",
    ]));

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].length_mm, 150.0);
}

#[test]
fn test_m600_toggles_between_two_colors() {
    let result = GcodeParser::parse_lines(&lines(&[
        "G1 X1 E50.0",
        "M600",
        "G1 X2 E100.0",
        "M600",
        "G1 X3 E150.0",
    ]));

    assert_eq!(result.segments.len(), 3);
    assert_eq!(result.segments[0].color_index, 0);
    assert_eq!(result.segments[1].color_index, 1);
    assert_eq!(result.segments[2].color_index, 0);
    assert_eq!(result.color_count, 2);
    for segment in &result.segments {
        assert_eq!(segment.length_mm, 50.0);
    }
}

#[test]
fn test_empty_input_warns() {
    let result = GcodeParser::parse_lines(&[]);

    assert!(result.segments.is_empty());
    assert!(result
        .warnings
        .iter()
        .any(|w| w == "No extrusion segments found"));
    assert!(result.errors.is_empty());
    // A file with no tool selects still reports one color
    assert_eq!(result.color_count, 1);
}

#[test]
fn test_retraction_never_reduces_tracked_position() {
    let result = GcodeParser::parse_lines(&lines(&[
        "T0",
        "G1 X10 E50.0",
        "G1 X11 E45.0 ; retract",
        "G1 X12 E48.0 ; partial re-prime",
        "T1",
        "G1 X20 E60.0",
    ]));

    // The retract and re-prime below the running max contribute nothing
    assert_eq!(result.segments[0].length_mm, 50.0);
    assert_eq!(result.segments[1].length_mm, 10.0);
}

#[test]
fn test_negative_relative_delta_is_ignored() {
    let result = GcodeParser::parse_lines(&lines(&[
        "M83",
        "G1 X1 E10.0",
        "G1 X2 E-4.0",
        "G1 X3 E5.0",
    ]));

    assert_eq!(result.segments[0].length_mm, 15.0);
}

#[test]
fn test_back_to_back_tool_changes_emit_no_empty_segment() {
    let result = GcodeParser::parse_lines(&lines(&["T0", "T1", "T2", "G1 X1 E25.0"]));

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].color_index, 2);
    assert_eq!(result.segments[0].length_mm, 25.0);
    // All three tools were still observed
    assert_eq!(result.color_count, 3);
}

#[test]
fn test_tool_select_is_case_insensitive() {
    let result = GcodeParser::parse_lines(&lines(&["t0", "G1 X1 E10.0", "t1", "G1 X2 E20.0"]));

    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.segments[1].color_index, 1);
}

#[test]
fn test_segment_line_boundaries() {
    let result = GcodeParser::parse_lines(&lines(&[
        "T0",             // line 1
        "G1 X10 E50.0",   // line 2
        "T1",             // line 3
        "G1 X20 E80.0",   // line 4
    ]));

    assert_eq!(result.segments[0].start_line, 1);
    assert_eq!(result.segments[0].end_line, 2);
    assert_eq!(result.segments[1].start_line, 3);
    assert_eq!(result.segments[1].end_line, 4);
}

#[test]
fn test_total_length_equals_sum_of_segments() {
    let result = GcodeParser::parse_lines(&lines(&[
        "T0",
        "G1 X10 E12.5",
        "T1",
        "G1 X20 E40.0",
        "T0",
        "G1 X30 E47.25",
    ]));

    let sum: f64 = result.segments.iter().map(|s| s.length_mm).sum();
    assert_eq!(result.total_length_mm, sum);
    assert_eq!(sum, 47.25);
}

#[test]
fn test_mode_switch_mid_program() {
    let result = GcodeParser::parse_lines(&lines(&[
        "M82",
        "G1 X1 E20.0",
        "M83",
        "G1 X2 E5.0",
        "G1 X3 E5.0",
    ]));

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].length_mm, 30.0);
}

#[test]
fn test_unreadable_file_reports_error() {
    let result = GcodeParser::parse_file(std::path::Path::new("/nonexistent/print.gcode"));

    assert!(!result.errors.is_empty());
    assert!(result.errors[0].starts_with("Failed to read file"));
    assert!(result.segments.is_empty());
}
