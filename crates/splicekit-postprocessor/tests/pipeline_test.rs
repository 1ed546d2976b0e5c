use std::fs;

use splicekit_postprocessor::pipeline::{process_file, PipelineOptions};
use splicekit_postprocessor::PostProcessError;

const SAMPLE: &str = "\
; START_GCODE\n\
T0\n\
G1 X10 Y10 E50.0 F1200\n\
T1\n\
G1 X20 Y10 E80.0 F1200\n\
T0\n\
G1 X30 Y10 E130.0 F1200\n\
";

#[test]
fn test_process_writes_both_artifacts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("model.gcode");
    fs::write(&input, SAMPLE).expect("write sample");

    let report = process_file(&input, None, &PipelineOptions::default()).expect("pipeline runs");

    assert_eq!(report.recipe_path, dir.path().join("model_splice_recipe.json"));
    assert_eq!(report.gcode_path, dir.path().join("model_modified.gcode"));
    assert!(report.recipe_path.exists());
    assert!(report.gcode_path.exists());

    assert_eq!(report.parse_result.segments.len(), 3);
    assert_eq!(report.recipe.segment_count, 3);
    assert_eq!(report.recipe.total_length_mm, 130.0);
    assert_eq!(report.modify_stats.tool_changes_removed, 3);

    let recipe_json = fs::read_to_string(&report.recipe_path).expect("recipe readable");
    let value: serde_json::Value = serde_json::from_str(&recipe_json).expect("valid JSON");
    assert_eq!(value["segment_count"], 3);
    assert_eq!(value["colors"]["0"], "white");

    let rewritten = fs::read_to_string(&report.gcode_path).expect("gcode readable");
    assert!(rewritten.contains("; SPLICEKIT: Removed T1"));
    assert!(rewritten.contains("Pause for spool loading"));
}

#[test]
fn test_output_directory_is_created() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("model.gcode");
    fs::write(&input, SAMPLE).expect("write sample");
    let out_dir = dir.path().join("artifacts").join("run1");

    let report =
        process_file(&input, Some(&out_dir), &PipelineOptions::default()).expect("pipeline runs");

    assert!(report.recipe_path.starts_with(&out_dir));
    assert!(report.recipe_path.exists());
    assert!(report.gcode_path.exists());
}

#[test]
fn test_missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("nope.gcode");

    let err = process_file(&missing, None, &PipelineOptions::default())
        .expect_err("missing input must fail");
    assert!(matches!(err, PostProcessError::IoError(_)));
}

#[test]
fn test_invalid_options_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("model.gcode");
    fs::write(&input, SAMPLE).expect("write sample");

    let options = PipelineOptions {
        transition_length_mm: -5.0,
        ..Default::default()
    };
    let err = process_file(&input, None, &options).expect_err("negative transition must fail");
    assert!(matches!(err, PostProcessError::InvalidParameters(_)));
}

#[test]
fn test_transition_and_merge_options_flow_through() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("model.gcode");
    // 50 / 5 / 50 with alternating colors; the 5mm run merges away
    fs::write(
        &input,
        "T0\nG1 X1 E50.0\nT1\nG1 X2 E55.0\nT0\nG1 X3 E105.0\n",
    )
    .expect("write sample");

    let options = PipelineOptions {
        min_segment_length_mm: 20.0,
        transition_length_mm: 10.0,
        ..Default::default()
    };
    let report = process_file(&input, None, &options).expect("pipeline runs");

    assert_eq!(report.recipe.segment_count, 1);
    // Single merged segment gets no transition allowance
    assert_eq!(report.recipe.total_length_mm, 105.0);
    assert_eq!(report.recipe.metadata.merged_segments, 2);
}

#[test]
fn test_single_color_input_still_processes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("mono.gcode");
    fs::write(&input, "G1 X1 E10.0\nG1 X2 E20.0\n").expect("write sample");

    let report = process_file(&input, None, &PipelineOptions::default()).expect("pipeline runs");

    assert_eq!(report.recipe.segment_count, 1);
    assert!(report
        .parse_result
        .warnings
        .iter()
        .any(|w| w.contains("Single color")));
}
