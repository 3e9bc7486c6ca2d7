// Copyright (c) The pytest-identity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical pytest node ids.
//!
//! A node id is pytest's own test identifier:
//! `tests/test_mod.py::TestClass::test_method[param]` — a forward-slash file
//! path followed by a `::`-joined scope hierarchy and an optional bracket
//! suffix for parametrized cases.

use crate::test_key::normalize_param_suffix;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

/// The kind of a syntactic scope in a test file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeKind {
    /// A module (the file itself, or a package directory).
    Module,
    /// A class.
    Class,
    /// A function or method.
    Function,
}

/// One element of a scope chain, as built by a host adapter from its own
/// syntax tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// The scope's kind.
    pub kind: ScopeKind,
    /// The scope's name.
    pub name: String,
}

impl Scope {
    /// Creates a new scope.
    pub fn new(kind: ScopeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// A test's reconciled identity, built transiently per lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    /// The canonical pytest node id.
    pub node_id: String,

    /// The location URL the runner reported for this test.
    pub location_url: String,

    /// The runner-supplied parametrization display suffix, if any.
    pub metainfo: Option<String>,
}

/// Builds a node id from a project-relative file path and a `::` hierarchy.
///
/// With empty `components` the id is just the path. When `metainfo` extends
/// the last component as a literal string prefix (component `test_foo`,
/// metainfo `test_foo[1]`), the last component is replaced by it, carrying
/// the parametrization brackets into the id; a metainfo that does not extend
/// the leaf leaves it unchanged.
pub fn build_node_id<S: AsRef<str>>(
    relative_path: &Utf8Path,
    components: &[S],
    metainfo: Option<&str>,
) -> String {
    let mut parts: Vec<&str> = components.iter().map(AsRef::as_ref).collect();
    if parts.is_empty() {
        return relative_path.as_str().to_owned();
    }

    if let Some(meta) = metainfo.filter(|meta| !meta.is_empty())
        && let Some(last) = parts.last_mut()
        && meta.starts_with(*last)
    {
        *last = meta;
    }

    format!("{relative_path}::{}", parts.join("::"))
}

/// Builds a node id from a host-built scope chain, outermost scope first.
///
/// Module scopes are part of the file path and skipped; class and function
/// scopes become `::` segments.
pub fn node_id_from_scopes(
    relative_path: &Utf8Path,
    scopes: &[Scope],
    metainfo: Option<&str>,
) -> String {
    let components: Vec<&str> = scopes
        .iter()
        .filter(|scope| scope.kind != ScopeKind::Module)
        .map(|scope| scope.name.as_str())
        .collect();
    build_node_id(relative_path, &components, metainfo)
}

/// Collects the scope path from a test-tree proxy name chain, walking from
/// the leaf upward.
///
/// The proxy tree is shaped `root -> file -> class -> ... -> method`; names
/// are collected until the file node (a name ending in `.py`), normalizing
/// `(param)` grouping to pytest's `[param]` brackets. The result is in
/// outer-to-inner order.
///
/// The root node has no test name, so the caller must end the chain before
/// it; when no file node is present, every supplied name is kept, including
/// a root name the caller failed to exclude.
pub fn collect_proxy_path<'a>(names_leaf_to_root: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut parts = Vec::new();
    for name in names_leaf_to_root {
        if name.ends_with(".py") {
            break;
        }
        parts.push(normalize_param_suffix(name));
    }
    parts.reverse();
    parts
}

/// Builds a node id from a proxy path (see [`collect_proxy_path`]), stripping
/// the directory/module components the proxy tree duplicates from the file
/// path.
///
/// Stripping matches positionally from the start of the proxy path against
/// the file's own path components, via a forward-only cursor, and stops at
/// the first mismatch. The final proxy component is never a stripping
/// candidate: a method literally named after its directory or module (a
/// method `test_` in file `test_.py`) must survive, even when the proxy path
/// consists of that single name.
pub fn node_id_from_proxy_path<S: AsRef<str>>(
    relative_path: &Utf8Path,
    proxy_path: &[S],
    metainfo: Option<&str>,
) -> String {
    let path_str = relative_path.as_str();
    let file_components: Vec<&str> = path_str
        .strip_suffix(".py")
        .unwrap_or(path_str)
        .split('/')
        .collect();

    let mut cursor = 0;
    let mut stripped = 0;
    for part in &proxy_path[..proxy_path.len().saturating_sub(1)] {
        match file_components[cursor..]
            .iter()
            .position(|component| *component == part.as_ref())
        {
            Some(offset) => {
                cursor += offset + 1;
                stripped += 1;
            }
            None => break,
        }
    }

    build_node_id(relative_path, &proxy_path[stripped..], metainfo)
}
