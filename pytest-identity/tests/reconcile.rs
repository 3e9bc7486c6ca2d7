// Copyright (c) The pytest-identity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end reconciliation flows: a runner reporting failures on one side,
//! source-level lookups on the other.

use camino::Utf8Path;
use indoc::indoc;
use pretty_assertions::assert_eq;
use pytest_identity::{
    FunctionSite, OutcomeDiff, OutcomeDiffStore, ProjectRoots, TestRecord, build_node_id,
    candidate_urls, collect_proxy_path, failed_line, node_id_from_proxy_path, test_key,
};

const LOCATION_URL: &str = "python</proj>://tests.test_mod.TestClass.test_one";

fn site() -> FunctionSite {
    FunctionSite {
        file: "/proj/tests/test_mod.py".into(),
        name: "test_one".to_owned(),
        class_chain: vec!["TestClass".to_owned()],
        qualified_name: "tests.test_mod.TestClass.test_one".to_owned(),
    }
}

fn roots() -> ProjectRoots {
    ProjectRoots {
        content_root: Some("/proj".into()),
        ..ProjectRoots::default()
    }
}

#[test]
fn failure_report_then_source_lookup() {
    let store = OutcomeDiffStore::new();

    // The runner reports a failed test.
    let stacktrace = indoc! {"
        def test_one(self):
        >       assert compute() == 1
        E       assert 2 == 1

        tests/test_mod.py:14: AssertionError

        test_mod.py:14: AssertionError
    "};
    let line = failed_line(stacktrace, LOCATION_URL);
    assert_eq!(line, Some(14));

    let key = test_key(LOCATION_URL, None);
    store.put(
        key,
        OutcomeDiff {
            expected: "1".to_owned(),
            actual: "2".to_owned(),
            failed_line: line,
        },
    );

    // Later, an inspection at the function's definition finds the diff via
    // synthesized candidate URLs.
    let candidates = candidate_urls(&site(), &roots());
    assert!(candidates.contains(&LOCATION_URL.to_owned()));

    let (diff, matched_key) = store.find_with_keys(&candidates, None).unwrap();
    assert_eq!(diff.actual, "2");
    assert_eq!(diff.failed_line, Some(14));
    assert_eq!(matched_key, LOCATION_URL);
}

#[test]
fn parametrized_failure_matches_bare_url_lookup() {
    let store = OutcomeDiffStore::new();

    // Legacy runners report the parametrization with parentheses.
    let key = test_key(LOCATION_URL, Some("test_one(x-y)"));
    assert_eq!(key, format!("{LOCATION_URL}[x-y]"));
    store.put(
        &key,
        OutcomeDiff {
            expected: "'x'".to_owned(),
            actual: "'y'".to_owned(),
            failed_line: None,
        },
    );

    // The source-side lookup has no parametrization, so the bare URL only
    // prefix-matches the stored key.
    let candidates = candidate_urls(&site(), &roots());
    let (diff, matched_key) = store.find_with_keys(&candidates, None).unwrap();
    assert_eq!(diff.actual, "'y'");
    assert_eq!(matched_key, key);
}

#[test]
fn rerun_start_clears_the_stale_diff() {
    let store = OutcomeDiffStore::new();
    let key = test_key(LOCATION_URL, None);
    store.put(&key, OutcomeDiff {
        expected: "1".to_owned(),
        actual: "2".to_owned(),
        failed_line: Some(14),
    });

    // The test starts running again: its entry is dropped immediately, so a
    // lookup racing the re-run sees nothing rather than last run's diff.
    store.remove(&key);

    let candidates = candidate_urls(&site(), &roots());
    assert_eq!(store.find_with_keys(&candidates, None), None);
}

#[test]
fn proxy_chain_reconstructs_the_node_id() {
    // Leaf-to-root proxy names as a test tree reports them, including a
    // parenthesized parametrization and the file node terminator.
    let chain = ["test_one(x-y)", "TestClass", "test_mod.py", "test suite"];
    let proxy_path = collect_proxy_path(chain);
    assert_eq!(proxy_path, vec!["TestClass".to_owned(), "test_one[x-y]".to_owned()]);

    let node_id = node_id_from_proxy_path(
        Utf8Path::new("tests/test_mod.py"),
        &proxy_path,
        Some("test_one[x-y]"),
    );
    assert_eq!(node_id, "tests/test_mod.py::TestClass::test_one[x-y]");

    let record = TestRecord {
        node_id,
        location_url: LOCATION_URL.to_owned(),
        metainfo: Some("test_one[x-y]".to_owned()),
    };
    let json = serde_json::to_string(&record).unwrap();
    assert_eq!(serde_json::from_str::<TestRecord>(&json).unwrap(), record);
}

#[test]
fn concurrent_put_and_remove_never_corrupt_the_store() {
    let store = OutcomeDiffStore::new();
    let diff = OutcomeDiff {
        expected: "1".to_owned(),
        actual: "2".to_owned(),
        failed_line: Some(3),
    };

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..10_000 {
                store.put("k", diff.clone());
            }
        });
        scope.spawn(|| {
            for _ in 0..10_000 {
                store.remove("k");
            }
        });
        scope.spawn(|| {
            for _ in 0..10_000 {
                // Either absent or the one valid value, never a partial one.
                match store.get("k") {
                    Some(observed) => assert_eq!(observed, diff),
                    None => {}
                }
            }
        });
    });

    match store.get("k") {
        Some(observed) => assert_eq!(observed, diff),
        None => {}
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn failed_line_never_panics_and_is_idempotent(
            stacktrace in ".{0,200}",
            url in ".{0,80}",
        ) {
            prop_assert_eq!(
                failed_line(&stacktrace, &url),
                failed_line(&stacktrace, &url)
            );
        }

        #[test]
        fn node_id_is_the_exact_join_of_its_components(
            path in "[a-z][a-z0-9_/]{0,20}\\.py",
            components in prop::collection::vec("[A-Za-z_][A-Za-z0-9_]{0,10}", 1..5),
        ) {
            let id = build_node_id(Utf8Path::new(&path), &components, None);
            let expected = format!("{path}::{}", components.join("::"));
            prop_assert_eq!(id, expected);
        }
    }
}
