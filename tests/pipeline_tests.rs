//! End-to-end scenarios driven through the public CLI/config/orchestrator
//! surface, covering a directory of mixed plain and gzip files.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use logsift::cli::Cli;
use logsift::config::AppConfig;
use logsift::pipeline::Orchestrator;

fn base_cli(dir: &Path, expression: &str) -> Cli {
    Cli {
        config: None,
        expression: Some(expression.to_string()),
        path: dir.to_path_buf(),
        file_name: None,
        include_patterns: vec![],
        exclude_patterns: vec![],
        ignore_case: false,
        regex: false,
        word_boundary: false,
        strip_quotes: false,
        exact_match: false,
        date_from: None,
        date_to: None,
        time_from: None,
        time_to: None,
        output: Some(dir.join("out.log")),
        no_path: false,
        highlight: false,
        max_file_size_mb: None,
        max_record_size_kb: None,
        workers: Some(2),
        dry_run: false,
        stats: false,
        verbose: 0,
        quiet: true,
    }
}

fn run(cli: Cli) -> (logsift::stats::ProcessingStats, PathBuf) {
    let config = AppConfig::from_cli(cli).unwrap();
    let output_file = config.output.output_file.clone();
    let outcome = Orchestrator::new(config).run(&AtomicBool::new(false)).unwrap();
    (outcome.stats, output_file)
}

#[test]
fn simple_and_expression_matches_across_multiple_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.log"),
        "2025-01-01 10:00:00.000+0000 ERROR Kafka broker down\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b.log"),
        "2025-01-01 10:00:00.000+0000 INFO Kafka producer started\n",
    )
    .unwrap();

    let (stats, output_file) = run(base_cli(dir.path(), "ERROR AND Kafka"));
    assert_eq!(stats.records_matched, 1);
    let content = std::fs::read_to_string(output_file).unwrap();
    assert!(content.contains("broker down"));
}

#[test]
fn date_range_filter_excludes_records_outside_the_window() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.log"),
        "2025-01-05 10:00:00.000+0000 ERROR inside window\n\
         2025-02-05 10:00:00.000+0000 ERROR outside window\n",
    )
    .unwrap();

    let mut cli = base_cli(dir.path(), "ERROR");
    cli.date_from = Some("2025-01-01".to_string());
    cli.date_to = Some("2025-01-31".to_string());
    let (stats, output_file) = run(cli);

    assert_eq!(stats.records_matched, 1);
    let content = std::fs::read_to_string(output_file).unwrap();
    assert!(content.contains("inside window"));
    assert!(!content.contains("outside window"));
}

#[test]
fn word_boundary_rejects_substring_hits_inside_structured_text() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.log"),
        "2025-01-01 10:00:00.000+0000 INFO {\"event\":\"MOVE_SNAPSHOT\"}\n\
         2025-01-01 10:00:01.000+0000 INFO {\"event\":\"MOVE\"}\n",
    )
    .unwrap();

    let mut cli = base_cli(dir.path(), "MOVE");
    cli.word_boundary = true;
    let (stats, output_file) = run(cli);

    assert_eq!(stats.records_matched, 1);
    let content = std::fs::read_to_string(output_file).unwrap();
    assert!(content.contains(r#""event":"MOVE"}"#));
    assert!(!content.contains("MOVE_SNAPSHOT"));
}

#[test]
fn strip_quotes_lets_substring_matching_see_through_quoted_values() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.log"),
        "2025-01-01 10:00:00.000+0000 INFO {\"status\":\"COMPLETED\"}\n",
    )
    .unwrap();

    let mut cli = base_cli(dir.path(), "COMPLETED");
    cli.strip_quotes = true;
    let (stats, _) = run(cli);
    assert_eq!(stats.records_matched, 1);
}

#[test]
fn or_and_not_combine_across_two_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.log"),
        "2025-01-01 10:00:00.000+0000 ERROR connection refused\n\
         2025-01-01 10:00:01.000+0000 ERROR request timeout\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b.log"),
        "2025-01-01 10:00:00.000+0000 WARN slow query\n",
    )
    .unwrap();

    let (stats, output_file) = run(base_cli(dir.path(), "(ERROR OR WARN) AND NOT timeout"));
    assert_eq!(stats.records_matched, 2);
    let content = std::fs::read_to_string(output_file).unwrap();
    assert!(content.contains("connection refused"));
    assert!(content.contains("slow query"));
    assert!(!content.contains("request timeout"));
}

#[test]
fn gzip_and_plain_files_are_processed_side_by_side() {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write as _;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.log"),
        "2025-01-01 10:00:00.000+0000 ERROR plain file hit\n",
    )
    .unwrap();

    let gz_path = dir.path().join("b.log.gz");
    let file = std::fs::File::create(&gz_path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(b"2025-01-01 10:00:00.000+0000 ERROR gzip file hit\n")
        .unwrap();
    encoder.finish().unwrap();

    let (stats, output_file) = run(base_cli(dir.path(), "ERROR"));
    assert_eq!(stats.records_matched, 2);
    let content = std::fs::read_to_string(output_file).unwrap();
    assert!(content.contains("plain file hit"));
    assert!(content.contains("gzip file hit"));
}

#[test]
fn dry_run_reports_eligible_files_without_writing_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.log"), "2025-01-01 10:00:00.000+0000 ERROR x\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a log file").unwrap();

    let mut cli = base_cli(dir.path(), "ERROR");
    cli.dry_run = true;
    let config = AppConfig::from_cli(cli).unwrap();
    let output_file = config.output.output_file.clone();
    let outcome = Orchestrator::new(config).run(&AtomicBool::new(false)).unwrap();

    let summary = outcome.dry_run_summary.unwrap();
    assert_eq!(summary.eligible, 1);
    assert_eq!(summary.skipped, 1);
    assert!(!output_file.exists());
}
