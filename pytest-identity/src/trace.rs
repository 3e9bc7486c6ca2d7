// Copyright (c) The pytest-identity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failed-line extraction from pytest tracebacks.
//!
//! Pytest reports the failing frame as `test_file.py:4: AssertionError`, and
//! prefixes the executed statement that raised with `>`. This module scans a
//! raw traceback for those shapes and recovers the 1-based line number of the
//! most plausible failing statement.

use crate::location::ParsedLocationUrl;
use regex::Regex;
use tracing::debug;

/// Extracts the failed line number from a pytest traceback.
///
/// `location_url` is the test's `python<root>://dotted.name` location, used
/// to derive the file name the traceback lines are matched against. Line
/// numbers are 1-based, matching pytest's own reporting.
///
/// Returns `None` when either input is blank, the URL is malformed, or no
/// matching `file.py:NN:` reference exists in the trace.
pub fn failed_line(stacktrace: &str, location_url: &str) -> Option<u32> {
    if stacktrace.trim().is_empty() || location_url.trim().is_empty() {
        return None;
    }

    let file_name = file_name_from_url(location_url)?;
    debug!(file_name, "derived test file name from location URL");

    let pattern = Regex::new(&format!(r"{}:(\d+):", regex::escape(&file_name))).ok()?;
    line_from_marker(stacktrace, &pattern).or_else(|| line_from_pattern(stacktrace, &pattern))
}

/// Guesses the Python file name from a location URL's dotted path.
///
/// `python<...>://tests.test_mod.test_func` names the module somewhere in the
/// dotted path; conventionally it is the component with a `test_` prefix
/// (packages rarely carry one), falling back to the first component. This is
/// a best-effort heuristic, not a parser: without host-supplied structure the
/// module cannot be identified exactly.
fn file_name_from_url(location_url: &str) -> Option<String> {
    let parsed = ParsedLocationUrl::parse(location_url).ok()?;
    let parts: Vec<&str> = parsed.qualified_name.split('.').collect();
    let module = parts
        .iter()
        .copied()
        .find(|part| is_test_name(part))
        .unwrap_or(parts[0]);
    Some(format!("{module}.py"))
}

fn is_test_name(name: &str) -> bool {
    name.starts_with("test_")
}

/// Marker scan: find the first line whose trimmed text starts with `>` (the
/// statement pytest flags as having raised), then look for a `file.py:NN:`
/// reference in the next few lines, stopping early at an underscores-only
/// section separator.
///
/// If the window misses, the scan continues through the rest of the trace.
/// That unbounded continuation can land in a frame unrelated to the marker;
/// it is kept for compatibility with existing traces that put the reference
/// further down.
fn line_from_marker(stacktrace: &str, pattern: &Regex) -> Option<u32> {
    let lines: Vec<&str> = stacktrace.lines().collect();

    let marker = lines
        .iter()
        .position(|line| line.trim_start().starts_with('>'))?;
    debug!(marker, "found `>` marker line");

    let window_end = (marker + 5).min(lines.len());
    for line in &lines[marker + 1..window_end] {
        if is_section_separator(line) {
            break;
        }
        if let Some(number) = capture_line_number(pattern, line) {
            return Some(number);
        }
    }

    // Window missed; fall back to the rest of the trace.
    lines[marker + 1..]
        .iter()
        .find_map(|line| capture_line_number(pattern, line))
}

/// Pattern scan: collect every `file.py:NN:` occurrence in the trace and
/// return the last one, which pytest typically makes the most specific frame.
fn line_from_pattern(stacktrace: &str, pattern: &Regex) -> Option<u32> {
    pattern
        .captures_iter(stacktrace)
        .filter_map(|captures| captures[1].parse().ok())
        .last()
}

fn is_section_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '_')
}

fn capture_line_number(pattern: &Regex, line: &str) -> Option<u32> {
    pattern.captures(line)?[1].parse().ok()
}
