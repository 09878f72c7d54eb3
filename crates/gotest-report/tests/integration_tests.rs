// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests for gotest-report
//!
//! These tests run captured `go test` transcripts through the full pipeline
//! and check the resulting report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use gotest_report::config::{InputFormat, ReportConfig, SubtestMode};
use gotest_report::event::{Event, Outcome};
use gotest_report::parser::parse_events;
use gotest_report::report::{Report, TestOrigin};
use similar_asserts::assert_eq;

/// Get the fixtures directory for test data
fn fixtures_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    Path::new(&manifest_dir).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()))
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
}

fn config() -> ReportConfig {
    ReportConfig::default().with_timestamp(fixed_time)
}

fn report_for(name: &str, config: &ReportConfig) -> Report {
    config
        .run(read_fixture(name).as_bytes())
        .expect("Should build report")
}

fn names(report: &Report, package: &str) -> Vec<String> {
    report
        .package(package)
        .map(|p| p.tests.iter().map(|t| t.name.clone()).collect())
        .unwrap_or_default()
}

/// All output lines in the report, sorted
fn report_lines(report: &Report) -> Vec<String> {
    let mut lines: Vec<String> = report
        .packages
        .iter()
        .flat_map(|p| {
            p.output
                .iter()
                .chain(p.tests.iter().flat_map(|t| t.output.iter()))
                .cloned()
        })
        .collect();
    lines.sort();
    lines
}

/// All output events the parser produced, sorted
fn event_lines(input: &str, format: InputFormat) -> Vec<String> {
    let mut lines: Vec<String> = parse_events(input.as_bytes(), format)
        .expect("Should parse")
        .into_iter()
        .filter_map(|e| match e {
            Event::Output { line, .. } => Some(line),
            _ => None,
        })
        .collect();
    lines.sort();
    lines
}

#[test]
fn test_single_passing_test() {
    let input = "=== RUN TestA\n--- PASS: TestA (0.00s)\nPASS\nok  \tpkg\t0.002s\n";
    let report = config().run(input.as_bytes()).expect("Should build report");

    assert_eq!(report.packages.len(), 1);
    let pkg = &report.packages[0];
    assert_eq!(pkg.name, "pkg");
    assert_eq!(pkg.duration, Duration::from_millis(2));
    assert_eq!(pkg.tests.len(), 1);
    assert_eq!(pkg.tests[0].name, "TestA");
    assert_eq!(pkg.tests[0].outcome, Outcome::Pass);
    assert_eq!(pkg.tests[0].classname, "pkg");
    assert_eq!(report.timestamp, fixed_time());
}

#[test]
fn test_pass_fixture() {
    let report = report_for("01-pass.txt", &config());
    let pkg = report.package("package/name").expect("package");
    assert_eq!(pkg.outcome, Outcome::Pass);
    assert_eq!(pkg.duration, Duration::from_millis(160));
    assert_eq!(names(&report, "package/name"), vec!["TestZ", "TestA"]);
    assert_eq!(pkg.tests[0].duration, Duration::from_millis(60));
    assert!(report.is_successful());
}

#[test]
fn test_fail_fixture_attaches_indented_output() {
    let report = report_for("02-fail.txt", &config());
    let pkg = report.package("package/name").expect("package");
    assert_eq!(pkg.outcome, Outcome::Fail);
    assert_eq!(pkg.failures(), 1);

    let one = pkg.test("TestOne").expect("TestOne");
    assert_eq!(one.outcome, Outcome::Fail);
    assert_eq!(
        one.output,
        vec![
            "\tfile_test.go:11: Error message",
            "\tfile_test.go:11: Longer",
            "\t\terror",
            "\t\tmessage.",
        ]
    );
    assert_eq!(pkg.output, vec!["exit status 1"]);
    assert_eq!(pkg.test("TestTwo").map(|t| t.outcome), Some(Outcome::Pass));
}

#[test]
fn test_skip_fixture() {
    let report = report_for("03-skip.txt", &config());
    let pkg = report.package("package/name").expect("package");
    assert_eq!(pkg.outcome, Outcome::Pass);
    assert_eq!(pkg.skipped(), 1);
    let one = pkg.test("TestOne").expect("TestOne");
    assert_eq!(one.outcome, Outcome::Skip);
    assert_eq!(one.output, vec!["\tfile_test.go:11: Skip message"]);
}

#[test]
fn test_subtests_default_mode() {
    let report = report_for("04-subtests.txt", &config());
    let pkg = report.package("package/subtests").expect("package");
    assert_eq!(
        names(&report, "package/subtests"),
        vec![
            "TestParent",
            "TestParent/ok",
            "TestParent/broken",
            "TestParent/broken/deeper",
            "TestAlone",
        ]
    );
    let levels: Vec<usize> = pkg.tests.iter().map(|t| t.level).collect();
    assert_eq!(levels, vec![0, 1, 1, 2, 0]);
    assert_eq!(pkg.test("TestParent").map(|t| t.outcome), Some(Outcome::Fail));
    assert_eq!(
        pkg.test("TestParent/broken").map(|t| t.output.clone()),
        Some(vec!["    parent_test.go:14: broken case".to_string()])
    );
}

#[test]
fn test_subtests_ignore_parent_results() {
    let config = config().with_subtest_mode(SubtestMode::IgnoreParentResults);
    let report = report_for("04-subtests.txt", &config);
    let pkg = report.package("package/subtests").expect("package");
    assert_eq!(pkg.test("TestParent").map(|t| t.outcome), Some(Outcome::Pass));
    assert_eq!(
        pkg.test("TestParent/broken").map(|t| t.outcome),
        Some(Outcome::Pass)
    );
    assert_eq!(
        pkg.test("TestParent/broken/deeper").map(|t| t.outcome),
        Some(Outcome::Pass)
    );
    assert_eq!(pkg.outcome, Outcome::Fail);
}

#[test]
fn test_subtests_exclude_parents() {
    let config = config().with_subtest_mode(SubtestMode::ExcludeParents);
    let report = report_for("04-subtests.txt", &config);
    let pkg = report.package("package/subtests").expect("package");
    assert_eq!(
        names(&report, "package/subtests"),
        vec!["TestParent/ok", "TestParent/broken/deeper", "TestAlone"]
    );
    assert_eq!(pkg.output, vec!["    parent_test.go:14: broken case"]);
}

#[test]
fn test_parallel_output_follows_cont() {
    let report = report_for("05-parallel.txt", &config());
    let pkg = report.package("package/parallel").expect("package");
    assert_eq!(
        pkg.test("TestA").map(|t| t.output.clone()),
        Some(vec![
            "    a_test.go:10: log from A".to_string(),
            "    a_test.go:12: more from A".to_string(),
        ])
    );
    assert_eq!(
        pkg.test("TestB").map(|t| t.output.clone()),
        Some(vec!["    b_test.go:10: log from B".to_string()])
    );
    assert_eq!(pkg.test("TestB").map(|t| t.outcome), Some(Outcome::Fail));
}

#[test]
fn test_panic_trace_attaches_to_failed_test() {
    let report = report_for("06-panic.txt", &config());
    let pkg = report.package("package/panic").expect("package");
    let test = pkg.test("TestB").expect("TestB");
    assert_eq!(test.outcome, Outcome::Fail);
    assert_eq!(test.output.len(), 7);
    assert_eq!(
        test.output.first().map(String::as_str),
        Some("panic: runtime error: index out of range [recovered]")
    );
    assert_eq!(test.output.last().map(String::as_str), Some("exit status 2"));
    assert!(pkg.output.is_empty());
    assert_eq!(pkg.test_count(), 1);
}

#[test]
fn test_build_errors_become_pseudo_tests() {
    let report = report_for("07-build-errors.txt", &config());
    let order: Vec<&str> = report.packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(order, vec!["package/fine", "package/broken", "package/other"]);

    let fine = report.package("package/fine").expect("fine");
    assert_eq!(fine.outcome, Outcome::Pass);
    assert_eq!(fine.test_count(), 0);

    let broken = report.package("package/broken").expect("broken");
    assert_eq!(broken.outcome, Outcome::Fail);
    assert_eq!(broken.test_count(), 1);
    assert_eq!(broken.errors(), 1);
    let pseudo = broken.build_error().expect("build error");
    assert_eq!(pseudo.name, "package/broken");
    assert_eq!(
        pseudo.origin,
        TestOrigin::BuildError {
            cause: "[build failed]".to_string()
        }
    );
    assert_eq!(
        pseudo.output,
        vec!["./broken.go:3:1: syntax error: non-declaration statement outside function body"]
    );

    let other = report.package("package/other").expect("other");
    assert_eq!(
        other.build_error().map(|t| t.output.clone()),
        Some(vec!["./other_test.go:8:2: undefined: missing".to_string()])
    );
    assert_eq!(report.failures(), 2);
}

#[test]
fn test_build_failure_without_header() {
    let input = "./x.go:1:1: expected 'package', found 'EOF'\nFAIL\tpkg\t[build failed]\n";
    let report = config().run(input.as_bytes()).expect("Should build report");
    let pkg = report.package("pkg").expect("package");
    assert_eq!(pkg.test_count(), 1);
    let pseudo = &pkg.tests[0];
    assert_eq!(pseudo.outcome, Outcome::Fail);
    assert!(pseudo.origin.is_build_error());
    assert_eq!(pseudo.output, vec!["./x.go:1:1: expected 'package', found 'EOF'"]);
}

#[test]
fn test_data_race_fails_test() {
    let report = report_for("08-race.txt", &config());
    let pkg = report.package("package/race").expect("package");
    let test = pkg.test("TestRace").expect("TestRace");
    assert_eq!(test.outcome, Outcome::Fail);
    assert!(test.raced());
    assert_eq!(test.output.len(), 7);
    assert_eq!(test.output[1], "WARNING: DATA RACE");
    assert_eq!(pkg.outcome, Outcome::Fail);
}

#[test]
fn test_coverage_cached_and_empty_packages() {
    let report = report_for("09-coverage-cached.txt", &config());

    let covered = report.package("package/covered").expect("covered");
    assert_eq!(covered.coverage, Some(42.5));
    assert!(!covered.cached);

    let cached = report.package("package/cached").expect("cached");
    assert!(cached.cached);
    assert_eq!(cached.outcome, Outcome::Pass);
    assert_eq!(cached.coverage, None);

    let empty = report.package("package/empty").expect("empty");
    assert_eq!(empty.outcome, Outcome::Skip);
    assert_eq!(empty.test_count(), 0);
    assert!(report.is_successful());
}

#[test]
fn test_benchmarks_are_grouped_and_averaged() {
    let report = report_for("10-benchmarks.txt", &config());
    let pkg = report.package("package/bench").expect("package");
    assert_eq!(names(&report, "package/bench"), vec!["BenchmarkParse", "BenchmarkEncode"]);

    let parse = pkg.test("BenchmarkParse").expect("parse");
    assert_eq!(parse.outcome, Outcome::Pass);
    let stats = parse.benchmark().expect("stats");
    assert_eq!(stats.ns_per_op, 15.0);
    assert_eq!(stats.iterations, 1_000_000);
    assert_eq!(stats.bytes_per_op, 8);
    assert_eq!(stats.allocs_per_op, 1);

    let encode = pkg.test("BenchmarkEncode").expect("encode");
    assert_eq!(encode.benchmark().map(|b| b.mb_per_sec), Some(40.0));
    assert_eq!(encode.output, vec!["    encode_test.go:20: encoded 100 bytes"]);

    assert_eq!(pkg.properties.get("goos").map(String::as_str), Some("linux"));
    assert_eq!(pkg.properties.get("goarch").map(String::as_str), Some("amd64"));
    assert_eq!(pkg.properties.get("pkg").map(String::as_str), Some("package/bench"));
    assert!(pkg.properties.contains_key("cpu"));
}

#[test]
fn test_benchmark_scenario_mean() {
    let input = "BenchmarkX  1000  10 ns/op\nBenchmarkX  1000  20 ns/op\nPASS\nok  \tpkg\t1.000s\n";
    let report = config().run(input.as_bytes()).expect("Should build report");
    let pkg = report.package("pkg").expect("package");
    assert_eq!(pkg.test_count(), 1);
    assert_eq!(pkg.tests[0].benchmark().map(|b| b.ns_per_op), Some(15.0));
}

#[test]
fn test_repeated_test_names() {
    let report = report_for("11-repeated.txt", &config());
    let pkg = report.package("package/repeat").expect("package");
    let outcomes: Vec<Outcome> = pkg.tests.iter().map(|t| t.outcome).collect();
    assert_eq!(outcomes, vec![Outcome::Pass, Outcome::Fail]);
    assert!(pkg.tests[0].output.is_empty());
    assert_eq!(pkg.tests[1].output, vec!["    repeat_test.go:5: second run"]);
}

#[test]
fn test_gojson_fixture() {
    let config = config().with_format(InputFormat::GoJson);
    let report = report_for("12-gojson.jsonl", &config);
    assert_eq!(report.packages.len(), 1);
    let pkg = report.package("package/json").expect("package");
    assert_eq!(pkg.outcome, Outcome::Fail);
    assert_eq!(pkg.duration, Duration::from_millis(30));

    let a = pkg.test("TestA").expect("TestA");
    assert_eq!(a.outcome, Outcome::Pass);
    assert_eq!(a.duration, Duration::from_millis(10));
    assert_eq!(a.output, vec!["    a_test.go:7: hello"]);

    let b = pkg.test("TestB").expect("TestB");
    assert_eq!(b.outcome, Outcome::Fail);
    assert_eq!(b.output, vec!["    b_test.go:9: wrong"]);
    assert!(pkg.output.is_empty());
}

#[test]
fn test_gojson_and_gotest_agree() {
    let text = config()
        .run(
            "=== RUN   TestA\n    a_test.go:7: hello\n--- PASS: TestA (0.01s)\n=== RUN   TestB\n    b_test.go:9: wrong\n--- FAIL: TestB (0.02s)\nFAIL\nFAIL\tpackage/json\t0.030s\n"
                .as_bytes(),
        )
        .expect("Should build report");
    let json = report_for(
        "12-gojson.jsonl",
        &config().with_format(InputFormat::GoJson),
    );
    assert_eq!(text, json);
}

#[test]
fn test_default_package_name_without_summary() {
    let config = config().with_package_name("test/package");
    let report = report_for("13-no-summary.txt", &config);
    assert_eq!(report.packages.len(), 1);
    assert_eq!(report.packages[0].name, "test/package");
    assert_eq!(report.packages[0].tests[0].classname, "test/package");
}

#[test]
fn test_nonverbose_repeated_results_are_all_kept() {
    let report = report_for("14-nonverbose-count.txt", &config());
    let pkg = report.package("package/flaky").expect("package");
    assert_eq!(
        names(&report, "package/flaky"),
        vec![
            "TestFlaky",
            "TestTable",
            "TestTable/case_1",
            "TestFlaky",
            "TestTable",
            "TestTable/case_1",
        ]
    );
    assert!(pkg.tests.iter().all(|t| t.outcome == Outcome::Fail));
    assert_eq!(pkg.failures(), 6);

    let flaky: Vec<_> = pkg.tests.iter().filter(|t| t.name == "TestFlaky").collect();
    assert_eq!(flaky[0].duration, Duration::from_millis(10));
    assert_eq!(flaky[1].duration, Duration::from_millis(20));
    assert_eq!(flaky[0].output, vec!["    flaky_test.go:12: got 3, want 4"]);
    assert_eq!(flaky[1].output, vec!["    flaky_test.go:12: got 5, want 4"]);

    let levels: Vec<usize> = pkg.tests.iter().map(|t| t.level).collect();
    assert_eq!(levels, vec![0, 0, 1, 0, 0, 1]);
}

#[test]
fn test_binary_panic_without_summary_fails_package() {
    let config = config().with_package_name("test/package");
    let report = report_for("15-binary-panic.txt", &config);
    assert_eq!(report.packages.len(), 1);
    let pkg = report.package("test/package").expect("package");
    assert_eq!(pkg.outcome, Outcome::Fail);
    assert_eq!(pkg.test_count(), 3);
    assert_eq!(pkg.failures(), 1);
    assert!(!report.is_successful());

    let pseudo = pkg.test("test/package").expect("run error pseudo-test");
    assert_eq!(pseudo.origin, TestOrigin::RunError);
    assert_eq!(pseudo.outcome, Outcome::Fail);

    assert_eq!(pkg.test("TestSetup").map(|t| t.outcome), Some(Outcome::Pass));
    let crash = pkg.test("TestCrash").expect("TestCrash");
    assert_eq!(crash.output.first().map(String::as_str), Some("panic: boom [recovered]"));
}

#[test]
fn test_empty_input_gives_empty_report() {
    let report = config().run("".as_bytes()).expect("Should build report");
    assert!(report.packages.is_empty());
    assert_eq!(report.tests(), 0);
}

#[test]
fn test_report_properties_and_hostname_pass_through() {
    let config = config()
        .with_hostname("ci-runner")
        .with_property("go.version", "1.22");
    let report = report_for("01-pass.txt", &config);
    assert_eq!(report.hostname.as_deref(), Some("ci-runner"));
    assert_eq!(
        report.properties.get("go.version").map(String::as_str),
        Some("1.22")
    );
}

#[test]
fn test_every_output_line_lands_once() {
    for (fixture, format) in [
        ("01-pass.txt", InputFormat::GoTest),
        ("02-fail.txt", InputFormat::GoTest),
        ("04-subtests.txt", InputFormat::GoTest),
        ("05-parallel.txt", InputFormat::GoTest),
        ("06-panic.txt", InputFormat::GoTest),
        ("07-build-errors.txt", InputFormat::GoTest),
        ("08-race.txt", InputFormat::GoTest),
        ("10-benchmarks.txt", InputFormat::GoTest),
        ("12-gojson.jsonl", InputFormat::GoJson),
        ("14-nonverbose-count.txt", InputFormat::GoTest),
        ("15-binary-panic.txt", InputFormat::GoTest),
    ] {
        let input = read_fixture(fixture);
        let report = config()
            .with_format(format)
            .run(input.as_bytes())
            .expect("Should build report");
        assert_eq!(
            report_lines(&report),
            event_lines(&input, format),
            "output lines differ for {fixture}"
        );
    }
}

#[test]
fn test_report_serializes_to_json() {
    let report = report_for("02-fail.txt", &config());
    let json = serde_json::to_value(&report).expect("Should serialize");
    assert_eq!(json["packages"][0]["name"], "package/name");
    assert_eq!(json["packages"][0]["tests"][0]["outcome"], "fail");
    assert_eq!(json["packages"][0]["tests"][0]["origin"]["kind"], "explicit");
}
