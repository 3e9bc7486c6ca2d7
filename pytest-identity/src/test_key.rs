// Copyright (c) The pytest-identity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup keys for the outcome-diff store.

/// Rewrites a trailing `(param)` grouping to pytest's `[param]` bracket
/// notation.
///
/// Some runner versions report parametrized names with parentheses
/// (`test_foo(1-2)`); pytest node ids always use brackets (`test_foo[1-2]`).
/// Names without a trailing parenthesized group pass through unchanged.
pub fn normalize_param_suffix(name: &str) -> String {
    if let Some(stripped) = name.strip_suffix(')')
        && let Some(open) = stripped.rfind('(')
    {
        format!("{}[{}]", &name[..open], &stripped[open + 1..])
    } else {
        name.to_owned()
    }
}

/// Combines a location URL with an optional parametrization metainfo into a
/// single store key.
///
/// A blank metainfo yields the URL unchanged. Otherwise the metainfo is
/// normalized to bracket notation and its bracket suffix (hosts report either
/// a bare `[1]` or the full `test_foo[1]`) is appended to the URL, so both
/// conventions produce the same key.
pub fn test_key(location_url: &str, metainfo: Option<&str>) -> String {
    let Some(meta) = metainfo.map(str::trim).filter(|meta| !meta.is_empty()) else {
        return location_url.to_owned();
    };

    let normalized = normalize_param_suffix(meta);
    let suffix = match normalized.find('[') {
        Some(start) => &normalized[start..],
        None => normalized.as_str(),
    };
    format!("{location_url}{suffix}")
}
